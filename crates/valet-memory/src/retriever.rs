// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Hybrid retriever combining vector similarity and BM25 via RRF fusion.
//!
//! The retriever embeds the query, runs both vector search and FTS5 BM25,
//! fuses results using Reciprocal Rank Fusion (k=60), and applies a
//! recency weight with an exponential half-life for final ranking.

use std::collections::HashMap;
use std::sync::Arc;

use valet_config::model::MemoryConfig;
use valet_core::traits::EmbeddingAdapter;
use valet_core::types::EmbeddingInput;
use valet_core::ValetError;

use crate::store::LtmStore;
use crate::types::{cosine_similarity, ScoredEntry};

/// RRF constant per research literature.
const RRF_K: f32 = 60.0;

/// Candidate pool size per search method before fusion.
const CANDIDATE_POOL: usize = 50;

/// Recency weights never decay below this, so old entries still surface
/// when they are strong keyword or vector matches.
const RECENCY_FLOOR: f32 = 0.1;

/// Hybrid retriever combining vector similarity search and BM25 keyword search.
///
/// Uses Reciprocal Rank Fusion (RRF) to merge results from both search
/// methods, then weights by recency (newer entries rank higher).
pub struct HybridRetriever {
    store: Arc<LtmStore>,
    embedder: Arc<dyn EmbeddingAdapter>,
    config: MemoryConfig,
}

impl HybridRetriever {
    /// Creates a new hybrid retriever.
    pub fn new(
        store: Arc<LtmStore>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: MemoryConfig,
    ) -> Self {
        Self {
            store,
            embedder,
            config,
        }
    }

    /// Retrieve relevant entries for a query using hybrid search.
    ///
    /// 1. Rejects queries shorter than the configured minimum
    /// 2. Embeds the query and runs vector similarity search (cosine with
    ///    threshold filter; skipped entirely when embeddings are disabled)
    /// 3. Runs BM25 keyword search via FTS5
    /// 4. Fuses results with RRF (k=60)
    /// 5. Fetches full entries for top results
    /// 6. Applies the recency weight and truncates to max_recall_results
    pub async fn retrieve(&self, query: &str) -> Result<Vec<ScoredEntry>, ValetError> {
        if query.trim().chars().count() < self.config.min_query_chars {
            return Ok(vec![]);
        }

        let vector_results = if self.config.embedding_enabled {
            let output = self
                .embedder
                .embed(EmbeddingInput {
                    texts: vec![query.to_string()],
                })
                .await?;

            let query_embedding = output
                .embeddings
                .into_iter()
                .next()
                .ok_or_else(|| ValetError::Internal("embedding returned no results".to_string()))?;

            self.vector_search(&query_embedding).await?
        } else {
            Vec::new()
        };
        let bm25_results = self.store.search_bm25(query, CANDIDATE_POOL).await?;

        let fused = reciprocal_rank_fusion(&vector_results, &bm25_results);
        if fused.is_empty() {
            return Ok(vec![]);
        }

        let top_ids: Vec<i64> = fused.iter().map(|(id, _)| *id).collect();
        let entries = self.store.get_by_ids(&top_ids).await?;

        let score_map: HashMap<i64, f32> = fused.into_iter().collect();
        let now = chrono::Utc::now();

        let mut scored: Vec<ScoredEntry> = entries
            .into_iter()
            .map(|entry| {
                let rrf_score = score_map.get(&entry.id).copied().unwrap_or(0.0);
                let weight = recency_weight(&entry.end_ts, now, self.config.recency_half_life_days);
                ScoredEntry {
                    score: rrf_score * weight,
                    entry,
                }
            })
            .collect();

        scored.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(self.config.max_recall_results);

        Ok(scored)
    }

    /// Vector search: compute cosine similarity against all stored embeddings.
    ///
    /// Returns (id, similarity) pairs above the similarity threshold,
    /// sorted by similarity descending, capped at the candidate pool size.
    async fn vector_search(&self, query_embedding: &[f32]) -> Result<Vec<(i64, f32)>, ValetError> {
        let embeddings = self.store.all_embeddings().await?;

        let mut results: Vec<(i64, f32)> = embeddings
            .into_iter()
            .filter_map(|(id, embedding)| {
                if embedding.len() != query_embedding.len() {
                    return None;
                }
                let similarity = cosine_similarity(query_embedding, &embedding);
                if similarity >= self.config.similarity_threshold as f32 {
                    Some((id, similarity))
                } else {
                    None
                }
            })
            .collect();

        results.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        results.truncate(CANDIDATE_POOL);

        Ok(results)
    }
}

/// Exponential decay weight by age: 1.0 for brand-new entries, halving
/// every `half_life_days`, floored at [`RECENCY_FLOOR`].
///
/// Unparseable timestamps are treated as fresh.
fn recency_weight(end_ts: &str, now: chrono::DateTime<chrono::Utc>, half_life_days: f64) -> f32 {
    let age_days = chrono::DateTime::parse_from_rfc3339(end_ts)
        .map(|ts| (now - ts.with_timezone(&chrono::Utc)).num_seconds().max(0) as f64 / 86_400.0)
        .unwrap_or(0.0);
    let weight = 0.5_f64.powf(age_days / half_life_days) as f32;
    weight.max(RECENCY_FLOOR)
}

/// Reciprocal Rank Fusion: merge two ranked lists into a single ranking.
///
/// RRF score for document d = sum(1 / (k + rank_i)) for each list containing d.
/// k = 60 per Robertson et al. and Cormack et al. research.
///
/// Both input lists are (id, score) pairs where position = rank.
/// BM25 scores are negative (more negative = more relevant), so they
/// are already sorted by relevance via ORDER BY bm25().
pub fn reciprocal_rank_fusion(
    vector_results: &[(i64, f32)],
    bm25_results: &[(i64, f64)],
) -> Vec<(i64, f32)> {
    let mut scores: HashMap<i64, f32> = HashMap::new();

    for (rank, (id, _)) in vector_results.iter().enumerate() {
        *scores.entry(*id).or_insert(0.0) += 1.0 / (RRF_K + rank as f32 + 1.0);
    }

    for (rank, (id, _)) in bm25_results.iter().enumerate() {
        *scores.entry(*id).or_insert(0.0) += 1.0 / (RRF_K + rank as f32 + 1.0);
    }

    let mut fused: Vec<(i64, f32)> = scores.into_iter().collect();
    fused.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));

    fused
}
