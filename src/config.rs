//! Backend connection configuration.

use std::env;

use miette::Diagnostic;
use thiserror::Error;

pub const URL_ENV: &str = "TABLEREPO_URL";
pub const KEY_ENV: &str = "TABLEREPO_KEY";
pub const SCHEMA_ENV: &str = "TABLEREPO_SCHEMA";

pub const DEFAULT_URL: &str = "http://localhost:54321";
pub const DEFAULT_SCHEMA: &str = "public";

#[derive(Error, Diagnostic, Debug, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Backend URL is empty")]
    #[diagnostic(
        code(tablerepo::config::empty_url),
        help("Pass --url or set the TABLEREPO_URL environment variable.")
    )]
    EmptyUrl,

    #[error("Backend URL must start with http:// or https://: {url}")]
    #[diagnostic(code(tablerepo::config::invalid_url))]
    InvalidUrl { url: String },
}

/// Where and how to reach the remote table gateway.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackendConfig {
    pub url: String,
    pub api_key: Option<String>,
    pub schema: String,
}

impl BackendConfig {
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            api_key: None,
            schema: DEFAULT_SCHEMA.to_string(),
        }
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_schema(mut self, schema: impl Into<String>) -> Self {
        self.schema = schema.into();
        self
    }

    /// Resolve configuration from explicit values and the environment.
    ///
    /// Priority for each field:
    /// 1. Explicit parameter
    /// 2. TABLEREPO_URL / TABLEREPO_KEY / TABLEREPO_SCHEMA environment variable
    /// 3. Default: http://localhost:54321, no key, schema `public`
    pub fn resolve(
        url: Option<String>,
        api_key: Option<String>,
        schema: Option<String>,
    ) -> Result<Self, ConfigError> {
        let url = url
            .or_else(|| env::var(URL_ENV).ok())
            .unwrap_or_else(|| DEFAULT_URL.to_string());
        let api_key = api_key
            .or_else(|| env::var(KEY_ENV).ok())
            .filter(|k| !k.is_empty());
        let schema = schema
            .or_else(|| env::var(SCHEMA_ENV).ok())
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());

        let config = Self {
            url,
            api_key,
            schema,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let url = self.url.trim();
        if url.is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(ConfigError::InvalidUrl {
                url: self.url.clone(),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod config_test;
