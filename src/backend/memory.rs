//! In-memory table store.
//!
//! Backed by `DashMap`, safe for concurrent use. Serves as a test double for
//! callers of [`TableBackend`]. Error codes follow Postgres SQLSTATE values so
//! that callers see the same codes a REST gateway would report.

use std::sync::Arc;

use dashmap::DashMap;
use serde_json::{Map, Value};

use super::{BackendResponse, Columns, ErrorBody, Filter, TableBackend, TransportResult};

const UNDEFINED_TABLE: &str = "42P01";
const UNIQUE_VIOLATION: &str = "23505";
const INVALID_TEXT: &str = "22P02";

#[derive(Debug, Default, Clone)]
struct MemoryTable {
    rows: Vec<Value>,
    next_id: i64,
}

/// In-process [`TableBackend`].
///
/// Clones share the same underlying tables.
#[derive(Debug, Clone, Default)]
pub struct MemoryBackend {
    tables: Arc<DashMap<String, MemoryTable>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style table seeding.
    ///
    /// Fails on the first row `insert` would reject; rows before it stay
    /// seeded.
    pub fn with_table(self, table: &str, rows: Vec<Value>) -> Result<Self, ErrorBody> {
        self.create_table(table);
        for row in rows {
            self.insert_row(table, row)?;
        }
        Ok(self)
    }

    /// Create an empty table. Existing tables are left untouched.
    pub fn create_table(&self, table: &str) {
        self.tables
            .entry(table.to_string())
            .or_insert_with(|| MemoryTable {
                rows: Vec::new(),
                next_id: 1,
            });
    }

    pub fn drop_table(&self, table: &str) -> bool {
        self.tables.remove(table).is_some()
    }

    pub fn has_table(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    fn missing_table(table: &str) -> ErrorBody {
        ErrorBody::new(format!("relation \"{}\" does not exist", table)).with_code(UNDEFINED_TABLE)
    }

    fn select_rows(
        &self,
        table: &str,
        columns: &Columns,
        filter: Option<&Filter>,
    ) -> Result<Vec<Value>, ErrorBody> {
        let entry = self
            .tables
            .get(table)
            .ok_or_else(|| Self::missing_table(table))?;

        Ok(entry
            .rows
            .iter()
            .filter(|row| filter.is_none_or(|f| f.matches(row)))
            .map(|row| project(row, columns))
            .collect())
    }

    fn count_rows(&self, table: &str) -> Result<u64, ErrorBody> {
        self.tables
            .get(table)
            .map(|entry| entry.rows.len() as u64)
            .ok_or_else(|| Self::missing_table(table))
    }

    fn insert_row(&self, table: &str, row: Value) -> Result<Value, ErrorBody> {
        let mut entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| Self::missing_table(table))?;

        let Value::Object(mut fields) = row else {
            return Err(ErrorBody::new("row must be a JSON object").with_code(INVALID_TEXT));
        };

        let id = match parse_id(fields.get("id"))? {
            Some(id) => id,
            None => {
                let id = entry.next_id;
                fields.insert("id".to_string(), Value::from(id));
                id
            }
        };

        if entry.rows.iter().any(|r| r.get("id") == Some(&Value::from(id))) {
            return Err(duplicate_key(table, id));
        }

        entry.next_id = entry.next_id.max(id.saturating_add(1));
        let stored = Value::Object(fields);
        entry.rows.push(stored.clone());
        Ok(stored)
    }

    fn update_rows(
        &self,
        table: &str,
        changes: Value,
        filter: &Filter,
    ) -> Result<Vec<Value>, ErrorBody> {
        let mut entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| Self::missing_table(table))?;

        let Value::Object(changes) = changes else {
            return Err(ErrorBody::new("update payload must be a JSON object").with_code(INVALID_TEXT));
        };

        if let Some(id) = parse_id(changes.get("id"))? {
            let key = Value::from(id);
            let matched = entry.rows.iter().filter(|row| filter.matches(row)).count();
            let taken = entry
                .rows
                .iter()
                .any(|row| !filter.matches(row) && row.get("id") == Some(&key));
            // Every matching row would take the same id.
            if matched > 1 || (matched == 1 && taken) {
                return Err(duplicate_key(table, id));
            }
            if matched == 1 {
                entry.next_id = entry.next_id.max(id.saturating_add(1));
            }
        }

        let mut updated = Vec::new();
        for row in entry.rows.iter_mut().filter(|row| filter.matches(row)) {
            if let Value::Object(fields) = row {
                merge(fields, &changes);
            }
            updated.push(row.clone());
        }
        Ok(updated)
    }

    fn delete_rows(&self, table: &str, filter: &Filter) -> Result<usize, ErrorBody> {
        let mut entry = self
            .tables
            .get_mut(table)
            .ok_or_else(|| Self::missing_table(table))?;

        let before = entry.rows.len();
        entry.rows.retain(|row| !filter.matches(row));
        Ok(before - entry.rows.len())
    }
}

/// Reads an `id` value. Absent and `null` mean "not given".
fn parse_id(value: Option<&Value>) -> Result<Option<i64>, ErrorBody> {
    match value {
        None | Some(Value::Null) => Ok(None),
        Some(Value::Number(n)) => n.as_i64().map(Some).ok_or_else(|| {
            ErrorBody::new(format!("invalid input syntax for type bigint: \"{}\"", n))
                .with_code(INVALID_TEXT)
        }),
        Some(other) => Err(ErrorBody::new(format!(
            "invalid input syntax for type bigint: {}",
            other
        ))
        .with_code(INVALID_TEXT)),
    }
}

fn duplicate_key(table: &str, id: i64) -> ErrorBody {
    ErrorBody {
        message: format!(
            "duplicate key value violates unique constraint \"{}_pkey\"",
            table
        ),
        code: Some(UNIQUE_VIOLATION.to_string()),
        details: Some(format!("Key (id)=({}) already exists.", id)),
        hint: None,
    }
}

fn merge(fields: &mut Map<String, Value>, changes: &Map<String, Value>) {
    for (key, value) in changes {
        fields.insert(key.clone(), value.clone());
    }
}

fn project(row: &Value, columns: &Columns) -> Value {
    match (columns, row) {
        (Columns::List(cols), Value::Object(fields)) if !cols.is_empty() => Value::Object(
            cols.iter()
                .filter_map(|c| fields.get(c).map(|v| (c.clone(), v.clone())))
                .collect(),
        ),
        _ => row.clone(),
    }
}

impl TableBackend for MemoryBackend {
    async fn select(
        &self,
        table: &str,
        columns: &Columns,
        filter: Option<&Filter>,
    ) -> TransportResult<BackendResponse<Vec<Value>>> {
        Ok(match self.select_rows(table, columns, filter) {
            Ok(rows) => BackendResponse::ok(rows),
            Err(e) => BackendResponse::failed(e),
        })
    }

    async fn count(&self, table: &str) -> TransportResult<BackendResponse<()>> {
        Ok(match self.count_rows(table) {
            Ok(n) => BackendResponse::counted(n),
            Err(e) => BackendResponse::failed(e),
        })
    }

    async fn insert(&self, table: &str, row: Value) -> TransportResult<BackendResponse<Vec<Value>>> {
        Ok(match self.insert_row(table, row) {
            Ok(stored) => BackendResponse::ok(vec![stored]),
            Err(e) => BackendResponse::failed(e),
        })
    }

    async fn update(
        &self,
        table: &str,
        changes: Value,
        filter: &Filter,
    ) -> TransportResult<BackendResponse<Vec<Value>>> {
        Ok(match self.update_rows(table, changes, filter) {
            Ok(rows) => BackendResponse::ok(rows),
            Err(e) => BackendResponse::failed(e),
        })
    }

    async fn delete(&self, table: &str, filter: &Filter) -> TransportResult<BackendResponse<()>> {
        Ok(match self.delete_rows(table, filter) {
            Ok(_) => BackendResponse::empty(),
            Err(e) => BackendResponse::failed(e),
        })
    }
}
