// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Memory domain types for the long-term memory system.

use serde::{Deserialize, Serialize};

/// A consolidated long-term memory entry.
///
/// Each entry summarizes one batch of turns evicted from the short-term
/// buffer, or a fact the user explicitly asked Valet to remember.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LongTermEntry {
    /// Row id in `ltm_entries`.
    pub id: i64,
    /// Natural-language summary of the consolidated turns.
    pub summary: String,
    /// Embedding vector for semantic search.
    #[serde(skip)]
    pub embedding: Vec<f32>,
    /// Timestamp of the earliest covered turn, RFC 3339.
    pub start_ts: String,
    /// Timestamp of the latest covered turn, RFC 3339.
    pub end_ts: String,
    /// Number of turns this entry covers (0 for explicit notes).
    pub turn_count: i64,
    /// Free-form tags (talent names, "explicit" for user notes).
    pub tags: Vec<String>,
    /// RFC 3339 creation timestamp.
    pub created_at: String,
}

/// A long-term entry pending insertion (no row id yet).
#[derive(Debug, Clone)]
pub struct NewEntry {
    pub summary: String,
    pub embedding: Vec<f32>,
    pub start_ts: String,
    pub end_ts: String,
    pub turn_count: i64,
    pub tags: Vec<String>,
}

/// A long-term entry with a retrieval score from hybrid search.
#[derive(Debug, Clone)]
pub struct ScoredEntry {
    /// The entry.
    pub entry: LongTermEntry,
    /// Combined retrieval score (RRF + recency weight).
    pub score: f32,
}

/// Convert f32 vector to bytes for SQLite BLOB storage.
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    vec.iter().flat_map(|f| f.to_le_bytes()).collect()
}

/// Convert SQLite BLOB back to f32 vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes(chunk.try_into().unwrap()))
        .collect()
}

/// Compute cosine similarity between two vectors.
///
/// For L2-normalized vectors this is equivalent to the dot product.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    assert_eq!(a.len(), b.len(), "vectors must have same length");
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}
