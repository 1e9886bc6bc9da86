//! Generic data access over a remote tabular backend.
//!
//! - `backend`: the narrow [`TableBackend`] capability and its implementations
//! - `repository`: [`TableRepository`], one per table, with CRUD operations
//! - `config`: backend connection settings

pub mod backend;
pub mod config;
pub mod repository;

#[cfg(feature = "cli")]
pub mod cli;

pub use backend::{
    BackendResponse, Columns, ErrorBody, Filter, MemoryBackend, TableBackend, TransportError,
    TransportResult,
};
#[cfg(feature = "rest")]
pub use backend::RestBackend;
pub use config::{BackendConfig, ConfigError};
pub use repository::{
    CrudRepository, Operation, RecordId, RepoError, RepoResult, TableRepository,
};
