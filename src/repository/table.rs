//! Table-backed CrudRepository implementation.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use super::{CrudRepository, ID_COLUMN, Operation, RecordId, RepoError, RepoResult};
use crate::backend::{BackendResponse, Columns, Filter, TableBackend, TransportResult};

/// Repository for one remote table.
///
/// Holds a borrowed backend and the table name, both fixed for its lifetime.
/// Records default to schema-less JSON values.
pub struct TableRepository<'a, B, T = Value> {
    backend: &'a B,
    table: String,
    _record: PhantomData<fn() -> T>,
}

impl<'a, B, T> TableRepository<'a, B, T> {
    /// Create a repository for `table`. Performs no I/O.
    pub fn new(backend: &'a B, table: impl Into<String>) -> Self {
        Self {
            backend,
            table: table.into(),
            _record: PhantomData,
        }
    }

    pub fn table(&self) -> &str {
        &self.table
    }

    pub fn backend(&self) -> &'a B {
        self.backend
    }

    /// Split a backend result into data or a logged `RepoError`.
    fn check<D>(
        &self,
        operation: Operation,
        result: TransportResult<BackendResponse<D>>,
    ) -> RepoResult<BackendResponse<D>> {
        let mut response = result.map_err(|e| {
            error!(table = %self.table, %operation, error = %e, "Backend call failed");
            RepoError::Transport(e)
        })?;

        if let Some(body) = response.error.take() {
            error!(
                table = %self.table,
                %operation,
                code = body.code.as_deref().unwrap_or("-"),
                "Error {}: {}",
                operation,
                body.message
            );
            return Err(RepoError::Backend {
                operation,
                message: body.message,
                code: body.code,
            });
        }

        Ok(response)
    }

    fn encode<P: Serialize + ?Sized>(&self, operation: Operation, value: &P) -> RepoResult<Value> {
        serde_json::to_value(value).map_err(|source| {
            error!(table = %self.table, %operation, error = %source, "Failed to encode record");
            RepoError::Codec { operation, source }
        })
    }
}

impl<B, T> TableRepository<'_, B, T>
where
    T: DeserializeOwned,
{
    fn decode(&self, operation: Operation, row: Value) -> RepoResult<T> {
        serde_json::from_value(row).map_err(|source| {
            error!(table = %self.table, %operation, error = %source, "Failed to decode row");
            RepoError::Codec { operation, source }
        })
    }

    fn decode_rows(&self, operation: Operation, rows: Option<Vec<Value>>) -> RepoResult<Vec<T>> {
        rows.unwrap_or_default()
            .into_iter()
            .map(|row| self.decode(operation, row))
            .collect()
    }
}

impl<B, T> CrudRepository<T> for TableRepository<'_, B, T>
where
    B: TableBackend,
    T: Serialize + DeserializeOwned + Send + Sync,
{
    async fn get_all(&self) -> RepoResult<Vec<T>> {
        debug!(table = %self.table, "get_all");
        let result = self.backend.select(&self.table, &Columns::All, None).await;
        let response = self.check(Operation::Fetch, result)?;
        self.decode_rows(Operation::Fetch, response.data)
    }

    async fn get_by_id(&self, id: RecordId) -> RepoResult<Option<T>> {
        debug!(table = %self.table, id, "get_by_id");
        let filter = Filter::eq(ID_COLUMN, id);
        let result = self
            .backend
            .select(&self.table, &Columns::All, Some(&filter))
            .await;
        let response = self.check(Operation::Fetch, result)?;

        match response.data.and_then(|rows| rows.into_iter().next()) {
            Some(row) => self.decode(Operation::Fetch, row).map(Some),
            None => Ok(None),
        }
    }

    async fn get_by_ids(&self, ids: &[RecordId]) -> RepoResult<Vec<T>> {
        debug!(table = %self.table, ?ids, "get_by_ids");
        let filter = Filter::is_in(ID_COLUMN, ids.iter().copied());
        let result = self
            .backend
            .select(&self.table, &Columns::All, Some(&filter))
            .await;
        let response = self.check(Operation::Fetch, result)?;
        self.decode_rows(Operation::Fetch, response.data)
    }

    async fn insert(&self, record: &T) -> RepoResult<()> {
        debug!(table = %self.table, "insert");
        let row = self.encode(Operation::Insert, record)?;
        let result = self.backend.insert(&self.table, row).await;
        self.check(Operation::Insert, result)?;
        Ok(())
    }

    async fn update<P>(&self, id: RecordId, changes: &P) -> RepoResult<()>
    where
        P: Serialize + Sync,
    {
        debug!(table = %self.table, id, "update");
        let changes = self.encode(Operation::Update, changes)?;
        let filter = Filter::eq(ID_COLUMN, id);
        let result = self.backend.update(&self.table, changes, &filter).await;
        self.check(Operation::Update, result)?;
        Ok(())
    }

    async fn delete(&self, id: RecordId) -> RepoResult<()> {
        debug!(table = %self.table, id, "delete");
        let filter = Filter::eq(ID_COLUMN, id);
        let result = self.backend.delete(&self.table, &filter).await;
        self.check(Operation::Delete, result)?;
        Ok(())
    }

    async fn count(&self) -> RepoResult<u64> {
        debug!(table = %self.table, "count");
        let result = self.backend.count(&self.table).await;
        let response = self.check(Operation::Count, result)?;
        Ok(response.count.unwrap_or(0))
    }
}
