// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic embedding adapter for testing.

use async_trait::async_trait;

use valet_core::{
    EmbeddingAdapter, EmbeddingInput, EmbeddingOutput, HealthStatus, ServiceAdapter, ValetError,
};

/// An embedder that derives a stable unit vector from the text itself.
///
/// Identical texts always embed to identical vectors, so cosine math in
/// retrieval tests behaves predictably without a model server.
pub struct MockEmbedder {
    dims: usize,
}

impl MockEmbedder {
    pub fn new() -> Self {
        Self { dims: 8 }
    }

    pub fn with_dims(dims: usize) -> Self {
        Self { dims }
    }
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

fn pseudo_embed(text: &str, dims: usize) -> Vec<f32> {
    // FNV-1a over the text seeds a xorshift sequence, one draw per dimension.
    let mut seed = text
        .bytes()
        .fold(0xcbf2_9ce4_8422_2325_u64, |acc, b| {
            (acc ^ u64::from(b)).wrapping_mul(0x0000_0100_0000_01b3)
        })
        .max(1);
    let mut vector: Vec<f32> = (0..dims)
        .map(|_| {
            seed ^= seed << 13;
            seed ^= seed >> 7;
            seed ^= seed << 17;
            (seed as f32 / u64::MAX as f32) - 0.5
        })
        .collect();
    let norm = vector.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm > f32::EPSILON {
        for value in &mut vector {
            *value /= norm;
        }
    }
    vector
}

#[async_trait]
impl ServiceAdapter for MockEmbedder {
    fn name(&self) -> &str {
        "mock-embedder"
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
impl EmbeddingAdapter for MockEmbedder {
    async fn embed(&self, input: EmbeddingInput) -> Result<EmbeddingOutput, ValetError> {
        let embeddings = input
            .texts
            .iter()
            .map(|text| pseudo_embed(text, self.dims))
            .collect();
        Ok(EmbeddingOutput { embeddings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn identical_texts_embed_identically() {
        let embedder = MockEmbedder::new();
        let out = embedder
            .embed(EmbeddingInput {
                texts: vec!["turn off the lights".into(), "turn off the lights".into()],
            })
            .await
            .unwrap();
        assert_eq!(out.embeddings[0], out.embeddings[1]);
    }

    #[tokio::test]
    async fn different_texts_embed_differently() {
        let embedder = MockEmbedder::new();
        let out = embedder
            .embed(EmbeddingInput {
                texts: vec!["weather tomorrow".into(), "play some jazz".into()],
            })
            .await
            .unwrap();
        assert_ne!(out.embeddings[0], out.embeddings[1]);
    }

    #[tokio::test]
    async fn vectors_are_unit_length() {
        let embedder = MockEmbedder::with_dims(16);
        let out = embedder
            .embed(EmbeddingInput {
                texts: vec!["note about groceries".into()],
            })
            .await
            .unwrap();
        assert_eq!(out.embeddings[0].len(), 16);
        let norm: f32 = out.embeddings[0].iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-5);
    }
}
