// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for the llama.cpp server API.
//!
//! Provides [`LlamaClient`] which handles request construction, response
//! parsing, and transient error retry against a local server.

use std::time::Duration;

use serde::Serialize;
use tracing::{debug, warn};
use valet_core::ValetError;

use crate::types::{
    CompletionRequest, CompletionResponse, EmbeddingRequest, EmbeddingResponse, ErrorResponse,
    HealthResponse,
};

/// HTTP client for llama.cpp server communication.
///
/// Manages connection pooling and retry logic for transient errors
/// (429, 500, 503).
#[derive(Debug, Clone)]
pub struct LlamaClient {
    client: reqwest::Client,
    base_url: String,
    max_retries: u32,
}

impl LlamaClient {
    /// Creates a client for the server at `base_url`.
    ///
    /// The request timeout comes from configuration; local models can sit
    /// on a cold first token for a long time.
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self, ValetError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()
            .map_err(|e| ValetError::Llm {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            max_retries: 1,
        })
    }

    /// Returns the configured server base URL.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Sends a completion request and returns the parsed response.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second delay.
    pub async fn complete(
        &self,
        request: &CompletionRequest,
    ) -> Result<CompletionResponse, ValetError> {
        let url = format!("{}/completion", self.base_url);
        let body = self.post_with_retry(&url, request, "completion").await?;
        serde_json::from_str(&body).map_err(|e| ValetError::Llm {
            message: format!("failed to parse completion response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Sends an embedding request and returns the parsed response.
    ///
    /// On transient errors (429, 500, 503), retries once after a 1-second delay.
    pub async fn embedding(
        &self,
        request: &EmbeddingRequest,
    ) -> Result<EmbeddingResponse, ValetError> {
        let url = format!("{}/embedding", self.base_url);
        let body = self.post_with_retry(&url, request, "embedding").await?;
        serde_json::from_str(&body).map_err(|e| ValetError::Llm {
            message: format!("failed to parse embedding response: {e}"),
            source: Some(Box::new(e)),
        })
    }

    /// Queries `GET /health` once, without retry.
    ///
    /// The server answers 503 while the model is still loading; callers
    /// poll as needed.
    pub async fn health(&self) -> Result<HealthResponse, ValetError> {
        let url = format!("{}/health", self.base_url);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| ValetError::Llm {
                message: format!("HTTP request failed: {e}"),
                source: Some(Box::new(e)),
            })?;

        let status = response.status();
        debug!(status = %status, "health response received");

        if status.is_success() {
            let body = response.text().await.map_err(|e| ValetError::Llm {
                message: format!("failed to read response body: {e}"),
                source: Some(Box::new(e)),
            })?;
            return serde_json::from_str(&body).map_err(|e| ValetError::Llm {
                message: format!("failed to parse health response: {e}"),
                source: Some(Box::new(e)),
            });
        }

        let body = response.text().await.unwrap_or_default();
        Err(ValetError::llm(format!(
            "health check returned {status}: {body}"
        )))
    }

    /// POSTs `request` to `url`, retrying once on transient errors, and
    /// returns the raw success body.
    async fn post_with_retry<T: Serialize>(
        &self,
        url: &str,
        request: &T,
        what: &str,
    ) -> Result<String, ValetError> {
        let mut last_error = None;

        for attempt in 0..=self.max_retries {
            if attempt > 0 {
                warn!(attempt, "retrying {} request after transient error", what);
                tokio::time::sleep(Duration::from_secs(1)).await;
            }

            let response = self
                .client
                .post(url)
                .json(request)
                .send()
                .await
                .map_err(|e| ValetError::Llm {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "{} response received", what);

            if status.is_success() {
                return response.text().await.map_err(|e| ValetError::Llm {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                });
            }

            if is_transient_error(status) && attempt < self.max_retries {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(ValetError::llm(format!(
                    "server returned {status}: {body}"
                )));
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let error_msg = if let Ok(api_err) = serde_json::from_str::<ErrorResponse>(&body) {
                format!("llama server error: {}", api_err.error.message)
            } else {
                format!("server returned {status}: {body}")
            };
            return Err(ValetError::llm(error_msg));
        }

        Err(last_error
            .unwrap_or_else(|| ValetError::llm(format!("{what} request failed after retries"))))
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 503)
}
