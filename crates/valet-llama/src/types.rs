// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Request/response types for the llama.cpp server HTTP API.

use serde::{Deserialize, Serialize};

/// Request body for `POST /completion`.
#[derive(Debug, Clone, Serialize)]
pub struct CompletionRequest {
    /// Fully formatted prompt text, chat template included.
    pub prompt: String,
    /// Maximum tokens to generate.
    pub n_predict: u32,
    /// Sampling temperature.
    pub temperature: f32,
    /// Nucleus sampling cutoff.
    pub top_p: f32,
    /// Sequences that end generation when emitted.
    pub stop: Vec<String>,
    /// Always false; the adapter reads complete responses.
    pub stream: bool,
}

/// Response body for `POST /completion`.
///
/// The server returns many additional fields (timings, token counts,
/// sampler settings); only the generated text is consumed here.
#[derive(Debug, Clone, Deserialize)]
pub struct CompletionResponse {
    pub content: String,
}

/// Request body for `POST /embedding`.
#[derive(Debug, Clone, Serialize)]
pub struct EmbeddingRequest {
    pub content: String,
}

/// Response body for `POST /embedding`.
#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingResponse {
    pub embedding: Vec<f32>,
}

/// Response body for `GET /health`.
///
/// The server reports `"ok"` once the model is loaded and serving.
#[derive(Debug, Clone, Deserialize)]
pub struct HealthResponse {
    pub status: String,
}

/// Error envelope the server returns on non-success statuses.
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorResponse {
    pub error: ErrorDetail,
}

/// Error detail within an [`ErrorResponse`].
#[derive(Debug, Clone, Deserialize)]
pub struct ErrorDetail {
    pub message: String,
}
