// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Service trait definitions for the Valet adapter architecture.
//!
//! External services extend the [`ServiceAdapter`] base trait and use
//! `#[async_trait]` for dynamic dispatch compatibility.

pub mod adapter;
pub mod embedding;
pub mod llm;
pub mod memory;
pub mod notify;
pub mod training;

// Re-export all traits at the traits module level for convenience.
pub use adapter::ServiceAdapter;
pub use embedding::EmbeddingAdapter;
pub use llm::LlmAdapter;
pub use memory::MemoryAccess;
pub use notify::Notifier;
pub use training::TrainingSink;
