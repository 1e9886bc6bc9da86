//! Repository error types.
//!
//! Every repository operation fails through [`RepoError`]. Errors reported by
//! the backend are rewrapped with the failing [`Operation`]; transport errors
//! pass through untouched.

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

use crate::backend::TransportError;

/// Repository operation, used to tag errors and log lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Fetch,
    Insert,
    Update,
    Delete,
    Count,
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Operation::Fetch => "fetching data",
            Operation::Insert => "inserting data",
            Operation::Update => "updating data",
            Operation::Delete => "deleting data",
            Operation::Count => "counting rows",
        };
        f.write_str(s)
    }
}

#[derive(Error, Diagnostic, Debug)]
pub enum RepoError {
    #[error("Error {operation}: {message}")]
    #[diagnostic(code(tablerepo::repository::backend))]
    Backend {
        operation: Operation,
        message: String,
        code: Option<String>,
    },

    #[error(transparent)]
    #[diagnostic(transparent)]
    Transport(#[from] TransportError),

    #[error("Error {operation}: record conversion failed: {source}")]
    #[diagnostic(
        code(tablerepo::repository::codec),
        help("The row shape returned by the backend does not match the record type.")
    )]
    Codec {
        operation: Operation,
        #[source]
        source: serde_json::Error,
    },
}

impl RepoError {
    /// Operation that failed, if known. Transport errors carry none.
    pub fn operation(&self) -> Option<Operation> {
        match self {
            RepoError::Backend { operation, .. } | RepoError::Codec { operation, .. } => {
                Some(*operation)
            }
            RepoError::Transport(_) => None,
        }
    }

    /// Backend error code (e.g. a SQLSTATE) for backend-reported errors.
    pub fn backend_code(&self) -> Option<&str> {
        match self {
            RepoError::Backend { code, .. } => code.as_deref(),
            _ => None,
        }
    }
}

/// Result type for repository operations.
pub type RepoResult<T> = Result<T, RepoError>;
