use miette::Diagnostic;
use thiserror::Error;

use crate::config::ConfigError;
use crate::repository::RepoError;

#[derive(Error, Diagnostic, Debug)]
pub enum CliError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Repo(#[from] RepoError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Config(#[from] ConfigError),

    #[error("Invalid JSON input: {message}")]
    #[diagnostic(
        code(tablerepo::cli::invalid_json),
        help("Pass a JSON object, e.g. '{{\"name\": \"widget\"}}'")
    )]
    InvalidJson { message: String },

    #[error("Invalid id list: {input}")]
    #[diagnostic(
        code(tablerepo::cli::invalid_ids),
        help("Use comma-separated integers, e.g. 1,2,3")
    )]
    InvalidIds { input: String },

    #[error("Delete operation requires --force flag")]
    #[diagnostic(
        code(tablerepo::cli::force_required),
        help("This action is destructive and cannot be undone.")
    )]
    ForceRequired,
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::InvalidJson {
            message: e.to_string(),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;
