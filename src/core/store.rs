// MoodLog - core/store.rs
//
// Record store abstraction: the read/insert surface the Entry Log View
// needs from the hosted table service.
//
// Rows travel as `serde_json::Value` so the trait stays independent of the
// entry schema; typed decoding happens in `decode_rows`.

use crate::core::session::Session;
use crate::util::error::StoreError;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

// =============================================================================
// Query
// =============================================================================

/// Sort specification for a select.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Order {
    pub column: String,
    pub ascending: bool,
}

/// Read parameters: column list, equality filters, and ordering.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Query {
    /// Column list including embedded relations, e.g. `*,emojis(symbol)`.
    /// `None` selects every column.
    pub columns: Option<String>,

    /// `(column, value)` pairs that must all match exactly.
    pub filters: Vec<(String, String)>,

    pub order: Option<Order>,
}

impl Query {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn columns(mut self, columns: &str) -> Self {
        self.columns = Some(columns.to_string());
        self
    }

    pub fn eq(mut self, column: &str, value: &str) -> Self {
        self.filters.push((column.to_string(), value.to_string()));
        self
    }

    pub fn order_desc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending: false,
        });
        self
    }

    pub fn order_asc(mut self, column: &str) -> Self {
        self.order = Some(Order {
            column: column.to_string(),
            ascending: true,
        });
        self
    }
}

// =============================================================================
// RecordStore trait
// =============================================================================

/// Client for a hosted table store.
///
/// Implementations are shared between the UI thread and short-lived request
/// threads, hence `Send + Sync`. Every call is a single blocking request with
/// no retry.
pub trait RecordStore: Send + Sync {
    /// Read rows from `table`.
    fn select(&self, table: &str, query: &Query) -> Result<Vec<Value>, StoreError>;

    /// Create exactly one row in `table`.
    fn insert(&self, table: &str, record: &Value) -> Result<(), StoreError>;

    /// Use `session`'s token for subsequent requests (`None` = anonymous).
    fn authorize(&self, _session: Option<&Session>) {}
}

/// Rows that decoded, plus how many did not.
#[derive(Debug, Clone, PartialEq)]
pub struct Decoded<T> {
    pub rows: Vec<T>,
    pub skipped: usize,
}

/// Decode raw rows into typed records.
///
/// Rows written by other clients can carry shapes this client does not
/// understand; each one that fails is logged and skipped so the rest still
/// render. Input order is preserved.
pub fn decode_rows<T: DeserializeOwned>(table: &str, rows: Vec<Value>) -> Decoded<T> {
    let mut decoded = Decoded {
        rows: Vec::with_capacity(rows.len()),
        skipped: 0,
    };
    for (index, row) in rows.into_iter().enumerate() {
        match serde_json::from_value(row) {
            Ok(record) => decoded.rows.push(record),
            Err(e) => {
                tracing::warn!(table, row = index, error = %e, "Skipping unreadable row");
                decoded.skipped += 1;
            }
        }
    }
    decoded
}

/// Encode a typed record for `RecordStore::insert`.
pub fn encode_record<T: Serialize>(table: &str, record: &T) -> Result<Value, StoreError> {
    serde_json::to_value(record).map_err(|source| StoreError::Encode {
        table: table.to_string(),
        source,
    })
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::model::Emoji;
    use serde_json::json;

    #[test]
    fn test_decode_rows_skips_bad_rows_and_keeps_order() {
        let decoded = decode_rows::<Emoji>(
            "emojis",
            vec![
                json!({ "id": 2, "symbol": "b" }),
                json!({ "id": "x" }),
                json!({ "id": 1, "symbol": "a" }),
            ],
        );
        assert_eq!(decoded.rows, vec![Emoji::new(2, "b"), Emoji::new(1, "a")]);
        assert_eq!(decoded.skipped, 1);
    }

    #[test]
    fn test_encode_record_produces_object() {
        let value = encode_record("emojis", &Emoji::new(4, "z")).unwrap();
        assert_eq!(value, json!({ "id": 4, "symbol": "z" }));
    }

    #[test]
    fn test_query_builder_collects_filters_and_order() {
        let query = Query::new().columns("*").eq("a", "1").order_asc("id");
        assert_eq!(query.columns.as_deref(), Some("*"));
        assert_eq!(query.filters, vec![("a".to_string(), "1".to_string())]);
        assert_eq!(
            query.order,
            Some(Order {
                column: "id".to_string(),
                ascending: true
            })
        );
    }
}
