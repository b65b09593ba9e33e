// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite-backed long-term memory store with vector BLOB storage and FTS5
//! for BM25 keyword search.

use tokio_rusqlite::Connection;
use valet_core::{now_rfc3339, ValetError};

use crate::types::{blob_to_vec, vec_to_blob, LongTermEntry, NewEntry};

/// Helper to convert tokio_rusqlite errors into ValetError::Storage.
fn storage_err(e: tokio_rusqlite::Error) -> ValetError {
    ValetError::Storage {
        source: Box::new(e),
    }
}

/// Persistent store for long-term entries in SQLite.
///
/// Stores embeddings as BLOBs; the `ltm_fts` virtual table is kept in sync
/// by triggers installed in the initial migration.
pub struct LtmStore {
    conn: Connection,
}

impl LtmStore {
    /// Creates a store wrapping an existing connection.
    ///
    /// The connection must have the initial migration applied
    /// (`ltm_entries` table plus the `ltm_fts` virtual table).
    pub fn new(conn: Connection) -> Self {
        Self { conn }
    }

    /// Insert a new entry. Returns its row id.
    pub async fn insert(&self, entry: &NewEntry) -> Result<i64, ValetError> {
        let summary = entry.summary.clone();
        let embedding_blob = vec_to_blob(&entry.embedding);
        let start_ts = entry.start_ts.clone();
        let end_ts = entry.end_ts.clone();
        let turn_count = entry.turn_count;
        let tags = serde_json::to_string(&entry.tags)
            .map_err(|e| ValetError::Internal(format!("tag serialization failed: {e}")))?;
        let created_at = now_rfc3339();

        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO ltm_entries (summary, embedding, start_ts, end_ts, turn_count, tags, created_at)
                     VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                    rusqlite::params![summary, embedding_blob, start_ts, end_ts, turn_count, tags, created_at],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await
            .map_err(storage_err)
    }

    /// Get all entry embeddings (lightweight, no summaries).
    ///
    /// Returns (id, embedding) pairs for vector search.
    pub async fn all_embeddings(&self) -> Result<Vec<(i64, Vec<f32>)>, ValetError> {
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT id, embedding FROM ltm_entries")?;
                let results = stmt
                    .query_map([], |row| {
                        let id: i64 = row.get(0)?;
                        let blob: Vec<u8> = row.get(1)?;
                        Ok((id, blob_to_vec(&blob)))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(results)
            })
            .await
            .map_err(storage_err)
    }

    /// Search entries using BM25 via FTS5.
    ///
    /// Returns (id, bm25_score) pairs sorted by relevance. BM25 scores are
    /// negative (more negative = more relevant). Queries are rewritten to
    /// OR-joined quoted tokens so user punctuation cannot break the FTS5
    /// query syntax.
    pub async fn search_bm25(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<(i64, f64)>, ValetError> {
        let Some(match_expr) = fts_match_expr(query) else {
            return Ok(vec![]);
        };
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT e.id, bm25(ltm_fts) AS score FROM ltm_fts
                     JOIN ltm_entries e ON e.id = ltm_fts.rowid
                     WHERE ltm_fts MATCH ?1
                     ORDER BY bm25(ltm_fts) LIMIT ?2",
                )?;
                let results = stmt
                    .query_map(rusqlite::params![match_expr, limit as i64], |row| {
                        let id: i64 = row.get(0)?;
                        let score: f64 = row.get(1)?;
                        Ok((id, score))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(results)
            })
            .await
            .map_err(storage_err)
    }

    /// Get entries by ids (batch retrieval after hybrid search).
    pub async fn get_by_ids(&self, ids: &[i64]) -> Result<Vec<LongTermEntry>, ValetError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let ids = ids.to_vec();
        self.conn
            .call(move |conn| {
                let placeholders: Vec<String> = (1..=ids.len()).map(|i| format!("?{i}")).collect();
                let sql = format!(
                    "SELECT id, summary, embedding, start_ts, end_ts, turn_count, tags, created_at
                     FROM ltm_entries WHERE id IN ({})",
                    placeholders.join(", ")
                );
                let mut stmt = conn.prepare(&sql)?;
                let params: Vec<&dyn rusqlite::types::ToSql> =
                    ids.iter().map(|id| id as &dyn rusqlite::types::ToSql).collect();
                let entries = stmt
                    .query_map(params.as_slice(), row_to_entry)?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(entries)
            })
            .await
            .map_err(storage_err)
    }

    /// Total number of stored entries.
    pub async fn count(&self) -> Result<i64, ValetError> {
        self.conn
            .call(|conn| {
                let count =
                    conn.query_row("SELECT COUNT(*) FROM ltm_entries", [], |row| row.get(0))?;
                Ok(count)
            })
            .await
            .map_err(storage_err)
    }
}

fn row_to_entry(row: &rusqlite::Row) -> Result<LongTermEntry, rusqlite::Error> {
    let embedding_blob: Vec<u8> = row.get(2)?;
    let tags_json: String = row.get(6)?;
    Ok(LongTermEntry {
        id: row.get(0)?,
        summary: row.get(1)?,
        embedding: blob_to_vec(&embedding_blob),
        start_ts: row.get(3)?,
        end_ts: row.get(4)?,
        turn_count: row.get(5)?,
        tags: serde_json::from_str(&tags_json).unwrap_or_default(),
        created_at: row.get(7)?,
    })
}

/// Rewrite a free-text query into a safe FTS5 MATCH expression.
///
/// Splits on non-alphanumeric characters and OR-joins the quoted tokens.
/// Returns `None` when the query contains no usable tokens.
fn fts_match_expr(query: &str) -> Option<String> {
    let tokens: Vec<String> = query
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .map(|t| format!("\"{t}\""))
        .collect();
    if tokens.is_empty() {
        None
    } else {
        Some(tokens.join(" OR "))
    }
}
