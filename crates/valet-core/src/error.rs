// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for the Valet assistant.
//!
//! A single [`ValetError`] enum covers all fallible operations in the
//! workspace. Variants carry enough context for log output and for the
//! conversational error surface; raw sources are preserved where available.

use std::time::Duration;

use thiserror::Error;

/// The unified error type for all Valet operations.
#[derive(Debug, Error)]
pub enum ValetError {
    /// Configuration loading or validation error.
    #[error("configuration error: {0}")]
    Config(String),

    /// Storage layer error (SQLite open, migration, query).
    #[error("storage error: {source}")]
    Storage {
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// LLM service error (unreachable, non-success status, bad payload).
    #[error("llm error: {message}")]
    Llm {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A talent was referenced by name but is not registered or is disabled.
    #[error("talent not found: {name}")]
    TalentNotFound { name: String },

    /// An operation exceeded its deadline.
    #[error("operation timed out after {duration:?}")]
    Timeout { duration: Duration },

    /// Internal invariant violation or unclassified failure.
    #[error("internal error: {0}")]
    Internal(String),
}

impl ValetError {
    /// Wraps any error as a storage error.
    pub fn storage<E>(source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        ValetError::Storage {
            source: Box::new(source),
        }
    }

    /// Builds an LLM error from a message only (no underlying source).
    pub fn llm(message: impl Into<String>) -> Self {
        ValetError::Llm {
            message: message.into(),
            source: None,
        }
    }
}
