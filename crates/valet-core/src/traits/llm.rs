// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM adapter trait for local language model backends.

use async_trait::async_trait;

use crate::error::ValetError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::GenerateRequest;

/// Adapter for text generation against a language model backend.
///
/// All orchestrator prompting (conversation, correction analysis, memory
/// consolidation) flows through this trait, so tests can swap in a
/// scripted implementation.
#[async_trait]
pub trait LlmAdapter: ServiceAdapter {
    /// Generates a completion for the given request.
    async fn generate(&self, request: GenerateRequest) -> Result<String, ValetError>;
}
