//! Repository layer.
//!
//! [`CrudRepository`] is the generic data-access contract; [`TableRepository`]
//! implements it for one named table over any [`TableBackend`].
//!
//! [`TableBackend`]: crate::backend::TableBackend

mod error;
mod table;

#[cfg(test)]
mod table_test;

use std::future::Future;

use serde::Serialize;

pub use error::{Operation, RepoError, RepoResult};
pub use table::TableRepository;

/// Integer primary key shared by every table.
pub type RecordId = i64;

/// Name of the primary key column.
pub const ID_COLUMN: &str = "id";

/// CRUD contract over records of type `T`.
///
/// Each method performs exactly one remote call.
pub trait CrudRepository<T>: Send + Sync {
    /// Get all rows.
    fn get_all(&self) -> impl Future<Output = RepoResult<Vec<T>>> + Send;

    /// Get the first row whose id equals `id`.
    fn get_by_id(&self, id: RecordId) -> impl Future<Output = RepoResult<Option<T>>> + Send;

    /// Get every row whose id is in `ids`. Absent ids are skipped.
    fn get_by_ids(&self, ids: &[RecordId]) -> impl Future<Output = RepoResult<Vec<T>>> + Send;

    /// Insert one row.
    fn insert(&self, record: &T) -> impl Future<Output = RepoResult<()>> + Send;

    /// Apply `changes` to the row with `id`. Fields not in `changes` are
    /// left to the backend.
    fn update<P>(&self, id: RecordId, changes: &P) -> impl Future<Output = RepoResult<()>> + Send
    where
        P: Serialize + Sync;

    /// Delete the row with `id`.
    fn delete(&self, id: RecordId) -> impl Future<Output = RepoResult<()>> + Send;

    /// Exact number of rows.
    fn count(&self) -> impl Future<Output = RepoResult<u64>> + Send;
}
