//! Backend error types.
//!
//! Two distinct failure channels exist: [`TransportError`] is returned when a
//! call never produced a response, while [`ErrorBody`] is the structured
//! error a backend reports inside an otherwise well-formed response.

use std::fmt;

use miette::Diagnostic;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Failures raised by the call itself, before a response envelope exists.
#[derive(Error, Diagnostic, Debug)]
pub enum TransportError {
    #[error("Failed to connect to backend")]
    #[diagnostic(
        code(tablerepo::backend::connection_failed),
        help("Is the backend reachable? Check --url or the TABLEREPO_URL environment variable.")
    )]
    ConnectionFailed {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    #[error("Invalid response from backend: {message}")]
    #[diagnostic(code(tablerepo::backend::invalid_response))]
    InvalidResponse { message: String },

    #[error("Request failed: {message}")]
    #[diagnostic(code(tablerepo::backend::request))]
    Request { message: String },
}

#[cfg(feature = "rest")]
impl From<reqwest::Error> for TransportError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_connect() || e.is_timeout() {
            TransportError::ConnectionFailed {
                source: Box::new(e),
            }
        } else if e.is_decode() {
            TransportError::InvalidResponse {
                message: e.to_string(),
            }
        } else {
            TransportError::Request {
                message: e.to_string(),
            }
        }
    }
}

impl From<serde_json::Error> for TransportError {
    fn from(e: serde_json::Error) -> Self {
        TransportError::InvalidResponse {
            message: e.to_string(),
        }
    }
}

/// Result type for backend calls.
pub type TransportResult<T> = Result<T, TransportError>;

/// Structured error reported by the backend.
///
/// Field names follow the PostgREST error payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            code: None,
            details: None,
            hint: None,
        }
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = Some(code.into());
        self
    }
}

impl fmt::Display for ErrorBody {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}
