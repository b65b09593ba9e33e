// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! llama.cpp server adapters for the Valet assistant.
//!
//! This crate implements [`LlmAdapter`] and [`EmbeddingAdapter`] against a
//! local llama.cpp-compatible HTTP server: completions via `POST
//! /completion`, vectors via `POST /embedding`, liveness via `GET /health`.
//! Prompts are assembled in ChatML form, the template most local
//! instruction-tuned models ship with.

pub mod client;
pub mod types;

use async_trait::async_trait;
use tracing::{debug, info};
use valet_config::model::LlmConfig;
use valet_core::{
    EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, GenerateRequest, HealthStatus, LlmAdapter,
    ServiceAdapter, ValetError,
};

use crate::client::LlamaClient;
use crate::types::{CompletionRequest, EmbeddingRequest};

/// ChatML end-of-turn marker, always included as a stop sequence.
const TURN_END: &str = "<|im_end|>";

/// Text generation adapter backed by a llama.cpp server.
pub struct LlamaLlm {
    client: LlamaClient,
    top_p: f32,
    stop: Vec<String>,
}

impl LlamaLlm {
    /// Creates a generation adapter from LLM configuration.
    pub fn new(config: &LlmConfig) -> Result<Self, ValetError> {
        let client = LlamaClient::new(config.base_url.clone(), config.timeout_secs)?;
        info!(base_url = %config.base_url, "llama.cpp generation adapter initialized");
        Ok(Self {
            client,
            top_p: config.top_p,
            stop: config.stop.clone(),
        })
    }

    /// Merges configured stop sequences with per-request ones.
    ///
    /// The ChatML turn terminator is always present so the model cannot
    /// run on into a fabricated user turn.
    fn stop_sequences(&self, request: &GenerateRequest) -> Vec<String> {
        let mut stop = self.stop.clone();
        for s in &request.stop {
            if !stop.contains(s) {
                stop.push(s.clone());
            }
        }
        if !stop.iter().any(|s| s == TURN_END) {
            stop.push(TURN_END.to_string());
        }
        stop
    }
}

#[async_trait]
impl ServiceAdapter for LlamaLlm {
    fn name(&self) -> &str {
        "llamacpp"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        match self.client.health().await {
            Ok(h) if h.status == "ok" => Ok(HealthStatus::Healthy),
            Ok(h) => Ok(HealthStatus::Degraded(format!(
                "server reported status {:?}",
                h.status
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        debug!("llama.cpp generation adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl LlmAdapter for LlamaLlm {
    async fn generate(&self, request: GenerateRequest) -> Result<String, ValetError> {
        let completion = CompletionRequest {
            prompt: chatml_prompt(request.system.as_deref(), &request.prompt),
            n_predict: request.max_tokens,
            temperature: request.temperature,
            top_p: self.top_p,
            stop: self.stop_sequences(&request),
            stream: false,
        };
        let response = self.client.complete(&completion).await?;
        Ok(response.content.trim().to_string())
    }
}

/// Embedding adapter backed by the same llama.cpp server.
///
/// Vectors are L2-normalized before being handed to callers, so cosine
/// similarity over stored embeddings reduces to a dot product.
pub struct LlamaEmbedder {
    client: LlamaClient,
}

impl LlamaEmbedder {
    /// Creates an embedding adapter from LLM configuration.
    pub fn new(config: &LlmConfig) -> Result<Self, ValetError> {
        let client = LlamaClient::new(config.base_url.clone(), config.timeout_secs)?;
        info!(base_url = %config.base_url, "llama.cpp embedding adapter initialized");
        Ok(Self { client })
    }
}

#[async_trait]
impl ServiceAdapter for LlamaEmbedder {
    fn name(&self) -> &str {
        "llamacpp-embedding"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        match self.client.health().await {
            Ok(h) if h.status == "ok" => Ok(HealthStatus::Healthy),
            Ok(h) => Ok(HealthStatus::Degraded(format!(
                "server reported status {:?}",
                h.status
            ))),
            Err(e) => Ok(HealthStatus::Unhealthy(e.to_string())),
        }
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        debug!("llama.cpp embedding adapter shutting down");
        Ok(())
    }
}

#[async_trait]
impl EmbeddingAdapter for LlamaEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ValetError> {
        let mut embeddings = Vec::with_capacity(input.texts.len());
        for text in &input.texts {
            let response = self
                .client
                .embedding(&EmbeddingRequest {
                    content: text.clone(),
                })
                .await?;
            embeddings.push(l2_normalize(response.embedding));
        }
        Ok(EmbeddingOutput { embeddings })
    }
}

/// Builds a ChatML prompt with an optional system block.
fn chatml_prompt(system: Option<&str>, user: &str) -> String {
    let mut prompt = String::new();
    if let Some(system) = system {
        prompt.push_str("<|im_start|>system\n");
        prompt.push_str(system);
        prompt.push_str("<|im_end|>\n");
    }
    prompt.push_str("<|im_start|>user\n");
    prompt.push_str(user);
    prompt.push_str("<|im_end|>\n<|im_start|>assistant\n");
    prompt
}

/// Scales a vector to unit L2 norm. Zero vectors pass through unchanged.
fn l2_normalize(mut v: Vec<f32>) -> Vec<f32> {
    let norm = v.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for x in &mut v {
            *x /= norm;
        }
    }
    v
}
