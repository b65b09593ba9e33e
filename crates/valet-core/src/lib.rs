// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for the Valet assistant.
//!
//! This crate provides the foundational trait definitions, error types, and
//! common types used throughout the Valet workspace. Service adapters and
//! the memory layer implement traits defined here.

pub mod error;
pub mod traits;
pub mod types;

// Re-export key items at crate root for ergonomic imports.
pub use error::ValetError;
pub use types::{
    Command, CommandChannel, CommandOutcome, CorrectionRecord, EmbeddingInput, EmbeddingOutput,
    GenerateRequest, HealthStatus, MemoryHit, Rule, RuleProposal, TalentDescriptor, TalentOutcome,
    TrainingPair, TrainingSource, Turn, TurnQuery, DEFAULT_TALENT_PRIORITY, FALLBACK_TALENT,
    normalize_signature, now_rfc3339,
};

// Re-export all service traits at crate root.
pub use traits::{
    EmbeddingAdapter, LlmAdapter, MemoryAccess, Notifier, ServiceAdapter, TrainingSink,
};
