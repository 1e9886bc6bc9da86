//! Backend capability abstraction.
//!
//! The repository layer only talks to a remote table store through the
//! [`TableBackend`] trait. Concrete clients (an in-memory store for tests and
//! a PostgREST-compatible HTTP client) implement it, so either can be swapped
//! in without touching the repository code.
//!
//! # Architecture
//!
//! - `error`: transport errors and the structured error body
//! - `query`: column selection and row filters
//! - `memory`: in-process table store
//! - `rest`: PostgREST client over `reqwest`

mod error;
mod memory;
mod query;
#[cfg(feature = "rest")]
mod rest;


use std::future::Future;

use serde_json::Value;

pub use error::{ErrorBody, TransportError, TransportResult};
pub use memory::MemoryBackend;
pub use query::{Columns, Filter};
#[cfg(feature = "rest")]
pub use rest::RestBackend;

/// Response envelope returned by every backend call.
///
/// Mirrors the `{ data, count, error }` shape of REST table gateways: a call
/// that reached the backend always yields a response, and a failure reported
/// by the backend itself lands in `error` rather than in the outer `Result`.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendResponse<T> {
    pub data: Option<T>,
    pub count: Option<u64>,
    pub error: Option<ErrorBody>,
}

impl<T> BackendResponse<T> {
    /// Successful response carrying `data`.
    pub fn ok(data: T) -> Self {
        Self {
            data: Some(data),
            count: None,
            error: None,
        }
    }

    /// Successful head-only response carrying an exact row count.
    pub fn counted(count: u64) -> Self {
        Self {
            data: None,
            count: Some(count),
            error: None,
        }
    }

    /// Successful response with neither data nor count.
    pub fn empty() -> Self {
        Self {
            data: None,
            count: None,
            error: None,
        }
    }

    /// Response carrying a backend-reported error.
    pub fn failed(error: ErrorBody) -> Self {
        Self {
            data: None,
            count: None,
            error: Some(error),
        }
    }
}

/// Narrow query interface over a remote table store.
///
/// Every method performs exactly one round trip. `Err` means the call itself
/// failed before a response existed (network, protocol decoding); errors the
/// backend reports are carried in [`BackendResponse::error`].
pub trait TableBackend: Send + Sync {
    /// Select rows, optionally narrowed by a single filter.
    fn select(
        &self,
        table: &str,
        columns: &Columns,
        filter: Option<&Filter>,
    ) -> impl Future<Output = TransportResult<BackendResponse<Vec<Value>>>> + Send;

    /// Exact row count without transferring row bodies.
    fn count(&self, table: &str) -> impl Future<Output = TransportResult<BackendResponse<()>>> + Send;

    /// Insert one row, returning the stored representation.
    fn insert(
        &self,
        table: &str,
        row: Value,
    ) -> impl Future<Output = TransportResult<BackendResponse<Vec<Value>>>> + Send;

    /// Apply `changes` to every row matching `filter`.
    fn update(
        &self,
        table: &str,
        changes: Value,
        filter: &Filter,
    ) -> impl Future<Output = TransportResult<BackendResponse<Vec<Value>>>> + Send;

    /// Delete every row matching `filter`.
    fn delete(
        &self,
        table: &str,
        filter: &Filter,
    ) -> impl Future<Output = TransportResult<BackendResponse<()>>> + Send;
}
