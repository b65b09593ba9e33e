// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Trait for adapters that turn text into vectors.

use async_trait::async_trait;

use crate::error::ValetError;
use crate::traits::adapter::ServiceAdapter;
use crate::types::{EmbeddingInput, EmbeddingOutput};

/// Produces vector embeddings for text.
///
/// Consolidated memory entries and recall queries go through the same
/// adapter, so their vectors are always comparable.
#[async_trait]
pub trait EmbeddingAdapter: ServiceAdapter {
    /// Embeds every input text, returning one vector per text in order.
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ValetError>;
}
