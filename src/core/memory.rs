// MoodLog - core/memory.rs
//
// In-memory `RecordStore` for tests and integration harnesses. Compiled
// only for this crate's tests or with the `test-support` feature.

use crate::core::session::Session;
use crate::core::store::{Query, RecordStore};
use crate::util::error::StoreError;
use chrono::{DateTime, Duration, SecondsFormat, TimeZone, Utc};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::Mutex;

/// Process-local `RecordStore` that behaves like the hosted service for the
/// operations MoodLog uses: store-assigned `id` and `created_at`, equality
/// filters, ordering, and one level of `name(columns)` embedding resolved
/// through a `<singular>_id` foreign key.
///
/// Every call is recorded so callers can assert on request counts, and
/// failures can be injected per operation.
#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryInner>,
}

#[derive(Default)]
struct MemoryInner {
    tables: HashMap<String, Vec<Value>>,
    next_id: i64,
    selects: Vec<(String, Query)>,
    inserts: Vec<(String, Value)>,
    fail_selects: bool,
    fail_inserts: bool,
    bearer_user: Option<String>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add rows to `table` exactly as given (no id/timestamp assignment).
    pub fn seed(&self, table: &str, rows: Vec<Value>) {
        self.lock().tables.entry(table.to_string()).or_default().extend(rows);
    }

    /// Make every subsequent select fail with HTTP 503.
    pub fn set_fail_selects(&self, fail: bool) {
        self.lock().fail_selects = fail;
    }

    /// Make every subsequent insert fail with HTTP 503.
    pub fn set_fail_inserts(&self, fail: bool) {
        self.lock().fail_inserts = fail;
    }

    /// Number of select calls issued against `table`, including failed ones.
    pub fn select_count(&self, table: &str) -> usize {
        self.lock().selects.iter().filter(|(t, _)| t == table).count()
    }

    /// Number of insert calls issued against `table`, including failed ones.
    pub fn insert_count(&self, table: &str) -> usize {
        self.lock().inserts.iter().filter(|(t, _)| t == table).count()
    }

    /// Records passed to insert for `table`, in call order.
    pub fn inserted(&self, table: &str) -> Vec<Value> {
        self.lock()
            .inserts
            .iter()
            .filter(|(t, _)| t == table)
            .map(|(_, v)| v.clone())
            .collect()
    }

    /// The most recent query issued against `table`.
    pub fn last_query(&self, table: &str) -> Option<Query> {
        self.lock()
            .selects
            .iter()
            .rev()
            .find(|(t, _)| t == table)
            .map(|(_, q)| q.clone())
    }

    /// User the store was last authorized for.
    pub fn authorized_user(&self) -> Option<String> {
        self.lock().bearer_user.clone()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, MemoryInner> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

/// Fixed origin for store-assigned timestamps; each insert is one second later.
fn clock_origin() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0)
        .single()
        .unwrap_or_default()
}

fn injected_failure(operation: &'static str, table: &str) -> StoreError {
    StoreError::Status {
        operation,
        table: table.to_string(),
        status: 503,
        body: "injected failure".to_string(),
    }
}

impl RecordStore for MemoryStore {
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError> {
        let mut inner = self.lock();
        inner.selects.push((table.to_string(), query.clone()));
        if inner.fail_selects {
            return Err(injected_failure("select", table));
        }

        let mut rows: Vec<Value> = inner
            .tables
            .get(table)
            .map(|rows| {
                rows.iter()
                    .filter(|row| {
                        query
                            .filters
                            .iter()
                            .all(|(col, want)| row.get(col).map(value_text).as_deref() == Some(want.as_str()))
                    })
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| {
                let ord = compare_values(a.get(&order.column), b.get(&order.column));
                if order.ascending {
                    ord
                } else {
                    ord.reverse()
                }
            });
        }

        for embed in query.columns.as_deref().map(embedded_tables).unwrap_or_default() {
            let fk = format!("{}_id", embed.trim_end_matches('s'));
            let referenced = inner.tables.get(&embed).cloned().unwrap_or_default();
            for row in &mut rows {
                let target = row
                    .get(&fk)
                    .and_then(|id| referenced.iter().find(|r| r.get("id") == Some(id)))
                    .cloned()
                    .unwrap_or(Value::Null);
                if let Value::Object(map) = row {
                    map.insert(embed.clone(), target);
                }
            }
        }

        Ok(rows)
    }

    fn insert(&self, table: &str, record: &Value) -> Result<(), StoreError> {
        let mut inner = self.lock();
        inner.inserts.push((table.to_string(), record.clone()));
        if inner.fail_inserts {
            return Err(injected_failure("insert", table));
        }

        let mut row: Map<String, Value> = match record {
            Value::Object(map) => map.clone(),
            other => {
                return Err(StoreError::Status {
                    operation: "insert",
                    table: table.to_string(),
                    status: 400,
                    body: format!("expected a JSON object, got {other}"),
                })
            }
        };

        inner.next_id += 1;
        let id = inner.next_id;
        let created_at = clock_origin() + Duration::seconds(id);
        row.insert("id".to_string(), Value::from(id));
        row.insert(
            "created_at".to_string(),
            Value::from(created_at.to_rfc3339_opts(SecondsFormat::Micros, false)),
        );
        inner.tables.entry(table.to_string()).or_default().push(Value::Object(row));
        Ok(())
    }

    fn authorize(&self, session: Option<&Session>) {
        self.lock().bearer_user = session.map(|s| s.user_id.clone());
    }
}

/// Names of embedded relations in a column list (`*,emojis(symbol)` -> `emojis`).
fn embedded_tables(columns: &str) -> Vec<String> {
    columns
        .split(',')
        .filter_map(|part| part.split_once('('))
        .map(|(name, _)| name.trim().to_string())
        .filter(|name| !name.is_empty())
        .collect()
}

/// Text form of a scalar, as used in equality filters.
fn value_text(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn compare_values(a: Option<&Value>, b: Option<&Value>) -> Ordering {
    match (a, b) {
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(x), Some(y)) => value_text(x).cmp(&value_text(y)),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        (None, None) => Ordering::Equal,
    }
}
