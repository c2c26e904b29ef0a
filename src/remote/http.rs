//! HTTP client for the remote execution service.
//!
//! Implements the RemoteExecutor trait over a JSON-speaking HTTP endpoint.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{RawOutcome, RemoteExecutor, StatementOutcome};
use crate::error::{Result, SqldeskError};
use crate::splitter::Statement;

/// Default timeout for execution requests.
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// HTTP executor configuration.
#[derive(Debug, Clone)]
pub struct HttpExecutorConfig {
    /// Base URL of the execution service (e.g., "http://localhost:8080").
    pub base_url: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
}

impl HttpExecutorConfig {
    /// Creates a new config with the given base URL.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// HTTP implementation of the remote executor.
#[derive(Debug, Clone)]
pub struct HttpExecutor {
    config: HttpExecutorConfig,
    client: Client,
}

/// Batch request body: ordered statement texts plus the stop-on-error flag.
#[derive(Debug, Serialize)]
struct BatchRequest<'a> {
    statements: Vec<&'a str>,
    proceed_after_error: bool,
}

/// Batch response body: one outcome per executed statement, in order.
#[derive(Debug, Deserialize)]
struct BatchResponse {
    outcomes: Vec<StatementOutcome>,
}

/// Raw request body: the whole input as one opaque unit.
#[derive(Debug, Serialize)]
struct RawRequest<'a> {
    query: &'a str,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorResponse {
    error: ServiceError,
}

#[derive(Debug, Deserialize)]
struct ServiceError {
    message: String,
}

impl HttpExecutor {
    /// Creates a new HTTP executor with the given configuration.
    pub fn new(config: HttpExecutorConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SqldeskError::transport(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    /// Creates an executor for the given base URL with the default timeout.
    pub fn for_url(base_url: impl Into<String>) -> Result<Self> {
        Self::new(HttpExecutorConfig::new(base_url))
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    /// Maps a non-2xx response to a transport error, preferring the remote
    /// error message when the body carries one.
    fn parse_error(status: reqwest::StatusCode, body: &str) -> SqldeskError {
        if let Ok(response) = serde_json::from_str::<ServiceErrorResponse>(body) {
            return SqldeskError::transport(format!(
                "Execution service error ({status}): {}",
                response.error.message
            ));
        }
        SqldeskError::transport(format!("Execution service error ({status}): {body}"))
    }

    async fn post_json<B: Serialize>(&self, path: &str, body: &B) -> Result<String> {
        let url = self.endpoint(path);
        debug!("POST {}", url);

        let response = self
            .client
            .post(&url)
            .json(body)
            .send()
            .await
            .map_err(|e| SqldeskError::transport(format!("Request to {url} failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| SqldeskError::transport(format!("Failed to read response body: {e}")))?;

        if !status.is_success() {
            return Err(Self::parse_error(status, &text));
        }

        Ok(text)
    }
}

#[async_trait]
impl RemoteExecutor for HttpExecutor {
    async fn execute_batch(
        &self,
        statements: &[Statement],
        proceed_after_error: bool,
    ) -> Result<Vec<StatementOutcome>> {
        let request = BatchRequest {
            statements: statements.iter().map(Statement::text).collect(),
            proceed_after_error,
        };

        let body = self.post_json("batch", &request).await?;
        let response: BatchResponse = serde_json::from_str(&body)
            .map_err(|e| SqldeskError::protocol(format!("Malformed batch response: {e}")))?;

        Ok(response.outcomes)
    }

    async fn execute_raw(&self, sql: &str) -> Result<RawOutcome> {
        let request = RawRequest { query: sql };

        let body = self.post_json("raw", &request).await?;
        serde_json::from_str(&body)
            .map_err(|e| SqldeskError::protocol(format!("Malformed raw response: {e}")))
    }
}
