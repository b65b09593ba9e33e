// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted LLM adapter for deterministic testing.
//!
//! `MockLlm` implements [`LlmAdapter`] with a FIFO queue of scripted
//! replies, enabling fast, CI-runnable tests without a running
//! llama.cpp server.

use std::collections::VecDeque;
use std::sync::Mutex;

use async_trait::async_trait;

use valet_core::{GenerateRequest, HealthStatus, LlmAdapter, ServiceAdapter, ValetError};

enum ScriptedReply {
    Text(String),
    Error(String),
}

/// A mock LLM that pops scripted replies from a FIFO queue.
///
/// Every request passed to [`generate`](LlmAdapter::generate) is captured
/// and retrievable via [`requests`](MockLlm::requests), so tests can assert
/// on the exact prompt, system text, and sampling parameters a caller
/// built. An exhausted queue produces an error, which doubles as the
/// standard way to exercise fail-open paths.
pub struct MockLlm {
    replies: Mutex<VecDeque<ScriptedReply>>,
    requests: Mutex<Vec<GenerateRequest>>,
}

impl MockLlm {
    /// Creates a mock with an empty reply queue; the first `generate`
    /// call will fail.
    pub fn new() -> Self {
        Self {
            replies: Mutex::new(VecDeque::new()),
            requests: Mutex::new(Vec::new()),
        }
    }

    /// Creates a mock pre-loaded with the given replies, returned in order.
    pub fn with_responses<I, S>(responses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mock = Self::new();
        for text in responses {
            mock.push_response(text);
        }
        mock
    }

    /// Appends a successful reply to the end of the queue.
    pub fn push_response(&self, text: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Text(text.into()));
    }

    /// Appends a failure to the end of the queue; the matching `generate`
    /// call returns an LLM error with this message.
    pub fn push_error(&self, message: impl Into<String>) {
        self.replies
            .lock()
            .unwrap()
            .push_back(ScriptedReply::Error(message.into()));
    }

    /// All requests seen so far, in call order.
    pub fn requests(&self) -> Vec<GenerateRequest> {
        self.requests.lock().unwrap().clone()
    }
}

impl Default for MockLlm {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ServiceAdapter for MockLlm {
    fn name(&self) -> &str {
        "mock-llm"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    async fn health_check(&self) -> Result<HealthStatus, ValetError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), ValetError> {
        Ok(())
    }
}

#[async_trait]
impl LlmAdapter for MockLlm {
    async fn generate(&self, request: GenerateRequest) -> Result<String, ValetError> {
        self.requests.lock().unwrap().push(request);
        match self.replies.lock().unwrap().pop_front() {
            Some(ScriptedReply::Text(text)) => Ok(text),
            Some(ScriptedReply::Error(message)) => Err(ValetError::llm(message)),
            None => Err(ValetError::llm("mock llm: no scripted reply left")),
        }
    }
}
