// MoodLog - platform/rest.rs
//
// `RecordStore` over the hosted table API (PostgREST dialect):
//
//   select: GET  {url}/rest/v1/{table}?select=..&{col}=eq.{v}&order={col}.desc
//   insert: POST {url}/rest/v1/{table}   body: [record]   Prefer: return=minimal
//
// Every request carries the project's anon key as `apikey` and a bearer
// token: the signed-in user's access token when one is set, otherwise the
// anon key itself. Keys and tokens are never logged.

use crate::core::session::Session;
use crate::core::store::{Query, RecordStore};
use crate::util::constants::{CONNECT_TIMEOUT_SECS, REST_PATH};
use crate::util::error::{ConfigError, StoreError};
use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::Url;
use serde_json::Value;
use std::sync::RwLock;
use std::time::Duration;

/// Blocking HTTP client for the hosted table API.
pub struct RestRecordStore {
    client: Client,
    base_url: Url,
    anon_key: String,
    access_token: RwLock<Option<String>>,
}

/// Parse a project URL, forcing a trailing slash so relative joins append
/// rather than replace the last path segment.
pub fn parse_base_url(url: &str) -> Result<Url, ConfigError> {
    let invalid = |reason: String| ConfigError::ValueOutOfRange {
        field: "store.url".to_string(),
        value: url.to_string(),
        expected: format!("an http(s) URL ({reason})"),
    };

    let mut parsed = Url::parse(url).map_err(|e| invalid(e.to_string()))?;
    if !matches!(parsed.scheme(), "http" | "https") {
        return Err(invalid(format!("unsupported scheme '{}'", parsed.scheme())));
    }
    if !parsed.path().ends_with('/') {
        let path = format!("{}/", parsed.path());
        parsed.set_path(&path);
    }
    Ok(parsed)
}

/// Query-string parameters for a select, in a stable order.
pub fn select_params(query: &Query) -> Vec<(String, String)> {
    let mut params = vec![(
        "select".to_string(),
        query.columns.clone().unwrap_or_else(|| "*".to_string()),
    )];
    for (column, value) in &query.filters {
        params.push((column.clone(), format!("eq.{value}")));
    }
    if let Some(order) = &query.order {
        let direction = if order.ascending { "asc" } else { "desc" };
        params.push(("order".to_string(), format!("{}.{direction}", order.column)));
    }
    params
}

impl RestRecordStore {
    pub fn new(url: &str, anon_key: &str) -> Result<Self, ConfigError> {
        let base_url = parse_base_url(url)?;
        let client = Client::builder()
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            // Reads are unbounded: a stalled request stays pending.
            .timeout(None::<Duration>)
            .build()
            .map_err(|e| ConfigError::ValueOutOfRange {
                field: "store.url".to_string(),
                value: url.to_string(),
                expected: format!("a usable HTTP client configuration ({e})"),
            })?;

        tracing::info!(url = %base_url, "Record store configured");
        Ok(Self {
            client,
            base_url,
            anon_key: anon_key.to_string(),
            access_token: RwLock::new(None),
        })
    }

    /// Endpoint URL for `table`.
    pub fn table_url(&self, table: &str) -> Result<Url, StoreError> {
        self.base_url
            .join(&format!("{REST_PATH}/{table}"))
            .map_err(|e| StoreError::Status {
                operation: "build url",
                table: table.to_string(),
                status: 0,
                body: e.to_string(),
            })
    }

    fn with_auth(&self, request: RequestBuilder) -> RequestBuilder {
        let token = self
            .access_token
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .unwrap_or_else(|| self.anon_key.clone());
        request
            .header("apikey", &self.anon_key)
            .bearer_auth(token)
    }

    fn check_status(
        operation: &'static str,
        table: &str,
        response: Response,
    ) -> Result<Response, StoreError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        // Body is best-effort context for the error banner.
        let body = response.text().unwrap_or_default();
        Err(StoreError::Status {
            operation,
            table: table.to_string(),
            status: status.as_u16(),
            body: body.trim().to_string(),
        })
    }
}

impl RecordStore for RestRecordStore {
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let url = self.table_url(table)?;
        let params = select_params(query);
        tracing::debug!(table, params = ?params, "select");

        let http_err = |source: reqwest::Error| StoreError::Http {
            operation: "select",
            table: table.to_string(),
            source,
        };
        let response = self
            .with_auth(self.client.get(url).query(&params))
            .header("Accept", "application/json")
            .send()
            .map_err(http_err)?;
        let response = Self::check_status("select", table, response)?;

        // An empty body is the store's way of saying "no rows" on some proxies.
        let text = response.text().map_err(http_err)?;
        if text.trim().is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<Value>(&text) {
            Ok(Value::Array(rows)) => Ok(rows),
            Ok(Value::Null) => Ok(Vec::new()),
            Ok(other) => Err(StoreError::Status {
                operation: "select",
                table: table.to_string(),
                status: 200,
                body: format!("expected a JSON array, got {other}"),
            }),
            Err(source) => Err(StoreError::Decode {
                table: table.to_string(),
                source,
            }),
        }
    }

    fn insert(&self, table: &str, record: &Value) -> Result<(), StoreError> {
        let url = self.table_url(table)?;
        tracing::debug!(table, "insert");

        let response = self
            .with_auth(self.client.post(url))
            .header("Prefer", "return=minimal")
            .json(&[record])
            .send()
            .map_err(|source| StoreError::Http {
                operation: "insert",
                table: table.to_string(),
                source,
            })?;
        Self::check_status("insert", table, response)?;
        Ok(())
    }

    fn authorize(&self, session: Option<&Session>) {
        if let Ok(mut guard) = self.access_token.write() {
            *guard = session.map(|s| s.access_token.clone());
        }
    }
}
