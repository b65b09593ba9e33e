// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test utilities for Valet crates.
//!
//! Provides scripted mock adapters so talent and pipeline tests run
//! fast, deterministically, and without a llama.cpp server or a real
//! database.
//!
//! # Components
//!
//! - [`MockLlm`] - Scripted LLM adapter with a FIFO reply queue
//! - [`MockEmbedder`] - Deterministic text-seeded embedding adapter
//! - [`MockMemory`] - Scriptable in-memory [`valet_core::MemoryAccess`]
//! - [`RecordingNotifier`] / [`RecordingSink`] - Capturing sinks
//! - [`ScriptedTalent`] - Fixed-descriptor talent with a canned outcome
//! - [`talent_context`] - A ready [`TalentContext`] around a given LLM

use std::sync::Arc;

use valet_config::ValetConfig;
use valet_core::LlmAdapter;
use valet_talent::TalentContext;

pub mod mock_embedder;
pub mod mock_llm;
pub mod mock_memory;
pub mod recorders;
pub mod scripted_talent;

pub use mock_embedder::MockEmbedder;
pub use mock_llm::MockLlm;
pub use mock_memory::MockMemory;
pub use recorders::{RecordingNotifier, RecordingSink};
pub use scripted_talent::ScriptedTalent;

/// Builds a [`TalentContext`] around the given LLM with default config,
/// an empty [`MockMemory`], and recording sinks.
///
/// Tests that need a handle on a collaborator swap the field afterwards:
///
/// ```
/// use std::sync::Arc;
/// use valet_test_utils::{MockLlm, MockMemory, talent_context};
///
/// let memory = Arc::new(MockMemory::new());
/// let mut ctx = talent_context(Arc::new(MockLlm::new()));
/// ctx.memory = memory.clone();
/// ```
pub fn talent_context(llm: Arc<dyn LlmAdapter>) -> TalentContext {
    TalentContext {
        llm,
        memory: Arc::new(MockMemory::new()),
        memory_context: String::new(),
        correction_hint: None,
        config: Arc::new(ValetConfig::default()),
        notifier: Arc::new(RecordingNotifier::new()),
        training: Arc::new(RecordingSink::new()),
        depth: 0,
    }
}
