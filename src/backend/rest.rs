use reqwest::header::CONTENT_RANGE;
use reqwest::{Client, Method, RequestBuilder, Response};
use serde_json::Value;
use tracing::debug;

use super::{BackendResponse, Columns, ErrorBody, Filter, TableBackend, TransportResult};
use crate::config::BackendConfig;

/// Characters that force a string literal to be quoted inside `in.(...)`.
const RESERVED: &[char] = &[',', '.', ':', '(', ')', '"', '\\', ' '];

/// PostgREST client for a hosted table gateway.
pub struct RestBackend {
    base_url: String,
    api_key: Option<String>,
    schema: String,
    client: Client,
}

impl RestBackend {
    /// Create a new REST backend from resolved configuration.
    pub fn new(config: &BackendConfig) -> Self {
        install_crypto_provider();

        Self {
            base_url: config.url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            schema: config.schema.clone(),
            client: Client::new(),
        }
    }

    /// Get the base URL being used
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn schema(&self) -> &str {
        &self.schema
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url, table)
    }

    /// Request builder with auth and schema headers applied.
    fn request(&self, method: Method, table: &str) -> RequestBuilder {
        let profile_header = if method == Method::GET || method == Method::HEAD {
            "Accept-Profile"
        } else {
            "Content-Profile"
        };

        let mut request = self.client.request(method, self.table_url(table));
        if let Some(key) = &self.api_key {
            request = request.header("apikey", key).bearer_auth(key);
        }
        if self.schema != "public" {
            request = request.header(profile_header, &self.schema);
        }
        request
    }

    /// Decode a row-returning response.
    async fn rows(response: Response) -> TransportResult<BackendResponse<Vec<Value>>> {
        if response.status().is_success() {
            let rows: Vec<Value> = response.json().await?;
            Ok(BackendResponse::ok(rows))
        } else {
            Ok(BackendResponse::failed(Self::error_body(response).await))
        }
    }

    /// Parse the PostgREST error payload, falling back to raw text.
    async fn error_body(response: Response) -> ErrorBody {
        let status = response.status();
        let text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unknown error".to_string());

        serde_json::from_str::<ErrorBody>(&text).unwrap_or_else(|_| {
            let message = if text.trim().is_empty() {
                status
                    .canonical_reason()
                    .unwrap_or("Unknown error")
                    .to_string()
            } else {
                text
            };
            ErrorBody::new(message).with_code(status.as_u16().to_string())
        })
    }
}

impl TableBackend for RestBackend {
    async fn select(
        &self,
        table: &str,
        columns: &Columns,
        filter: Option<&Filter>,
    ) -> TransportResult<BackendResponse<Vec<Value>>> {
        let mut request = self
            .request(Method::GET, table)
            .query(&[("select", columns.as_select())]);
        if let Some(filter) = filter {
            request = request.query(&[(filter.column(), encode_filter(filter))]);
        }

        debug!(table, "GET select");
        let response = request.send().await?;
        Self::rows(response).await
    }

    async fn count(&self, table: &str) -> TransportResult<BackendResponse<()>> {
        debug!(table, "HEAD count");
        let response = self
            .request(Method::HEAD, table)
            .query(&[("select", "*")])
            .header("Prefer", "count=exact")
            .send()
            .await?;

        if !response.status().is_success() {
            return Ok(BackendResponse::failed(Self::error_body(response).await));
        }

        let count = response
            .headers()
            .get(CONTENT_RANGE)
            .and_then(|v| v.to_str().ok())
            .and_then(parse_content_range);
        Ok(BackendResponse {
            data: None,
            count,
            error: None,
        })
    }

    async fn insert(&self, table: &str, row: Value) -> TransportResult<BackendResponse<Vec<Value>>> {
        debug!(table, "POST insert");
        let response = self
            .request(Method::POST, table)
            .header("Prefer", "return=representation")
            .json(&row)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn update(
        &self,
        table: &str,
        changes: Value,
        filter: &Filter,
    ) -> TransportResult<BackendResponse<Vec<Value>>> {
        debug!(table, "PATCH update");
        let response = self
            .request(Method::PATCH, table)
            .query(&[(filter.column(), encode_filter(filter))])
            .header("Prefer", "return=representation")
            .json(&changes)
            .send()
            .await?;
        Self::rows(response).await
    }

    async fn delete(&self, table: &str, filter: &Filter) -> TransportResult<BackendResponse<()>> {
        debug!(table, "DELETE");
        let response = self
            .request(Method::DELETE, table)
            .query(&[(filter.column(), encode_filter(filter))])
            .send()
            .await?;

        if response.status().is_success() {
            Ok(BackendResponse::empty())
        } else {
            Ok(BackendResponse::failed(Self::error_body(response).await))
        }
    }
}

fn install_crypto_provider() {
    // Fails only when a provider is already installed.
    let _ = rustls::crypto::ring::default_provider().install_default();
}

/// Encode a filter as a PostgREST operator expression, e.g. `eq.5` or `in.(1,2)`.
pub(crate) fn encode_filter(filter: &Filter) -> String {
    match filter {
        Filter::Eq {
            value: Value::Null, ..
        } => "is.null".to_string(),
        Filter::Eq { value, .. } => format!("eq.{}", encode_literal(value, false)),
        Filter::In { values, .. } => {
            let items: Vec<String> = values.iter().map(|v| encode_literal(v, true)).collect();
            format!("in.({})", items.join(","))
        }
    }
}

/// Render a JSON value as a filter literal.
///
/// Inside a list, strings containing reserved characters are double-quoted
/// with backslash escapes.
pub(crate) fn encode_literal(value: &Value, in_list: bool) -> String {
    match value {
        Value::Null => "null".to_string(),
        Value::String(s) if in_list && (s.is_empty() || s.contains(RESERVED)) => {
            format!("\"{}\"", s.replace('\\', "\\\\").replace('"', "\\\""))
        }
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// Total from a `Content-Range` header such as `0-24/3573` or `*/0`.
pub(crate) fn parse_content_range(header: &str) -> Option<u64> {
    header
        .rsplit_once('/')
        .and_then(|(_, total)| total.trim().parse().ok())
}
