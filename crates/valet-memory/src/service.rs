// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The [`MemoryAccess`] implementation handed to talents.
//!
//! Bundles hybrid recall, structured turn search, explicit remembers, and
//! rule administration over one shared database handle. Buffer and
//! consolidation stay with the orchestrator; talents only get this
//! read/annotate surface.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use valet_config::model::MemoryConfig;
use valet_core::error::ValetError;
use valet_core::traits::{EmbeddingAdapter, MemoryAccess};
use valet_core::types::{now_rfc3339, EmbeddingInput, MemoryHit, Rule, Turn, TurnQuery};
use valet_storage::queries::{rules, turns};
use valet_storage::Database;

use crate::retriever::HybridRetriever;
use crate::store::LtmStore;
use crate::types::NewEntry;

/// Tag attached to entries created through [`MemoryAccess::remember`].
const EXPLICIT_TAG: &str = "explicit";

pub struct MemoryService {
    db: Database,
    store: Arc<LtmStore>,
    retriever: HybridRetriever,
    embedder: Arc<dyn EmbeddingAdapter>,
    config: MemoryConfig,
}

impl MemoryService {
    pub fn new(db: Database, embedder: Arc<dyn EmbeddingAdapter>, config: MemoryConfig) -> Self {
        let store = Arc::new(LtmStore::new(db.connection().clone()));
        let retriever = HybridRetriever::new(store.clone(), embedder.clone(), config.clone());
        Self {
            db,
            store,
            retriever,
            embedder,
            config,
        }
    }

    /// The long-term entry store, shared with the consolidator.
    pub fn store(&self) -> Arc<LtmStore> {
        self.store.clone()
    }
}

#[async_trait]
impl MemoryAccess for MemoryService {
    async fn recall(&self, query: &str) -> Result<Vec<MemoryHit>, ValetError> {
        let scored = self.retriever.retrieve(query).await?;
        debug!(query, hits = scored.len(), "memory recall");
        Ok(scored
            .into_iter()
            .map(|s| MemoryHit {
                summary: s.entry.summary,
                score: s.score,
                start_ts: s.entry.start_ts,
                end_ts: s.entry.end_ts,
                tags: s.entry.tags,
            })
            .collect())
    }

    async fn search_turns(&self, query: &TurnQuery) -> Result<Vec<Turn>, ValetError> {
        turns::search_turns(&self.db, query).await
    }

    async fn remember(&self, text: &str, tags: Vec<String>) -> Result<i64, ValetError> {
        let text = text.trim();
        if text.is_empty() {
            return Err(ValetError::Internal(
                "cannot remember an empty note".to_string(),
            ));
        }

        let embedding = if self.config.embedding_enabled {
            let output = self
                .embedder
                .embed(EmbeddingInput {
                    texts: vec![text.to_string()],
                })
                .await?;
            output.embeddings.into_iter().next().ok_or_else(|| {
                ValetError::Internal("embedding returned no results".to_string())
            })?
        } else {
            Vec::new()
        };

        let mut tags = tags;
        if !tags.iter().any(|t| t == EXPLICIT_TAG) {
            tags.push(EXPLICIT_TAG.to_string());
        }

        let now = now_rfc3339();
        let entry = NewEntry {
            summary: text.to_string(),
            embedding,
            start_ts: now.clone(),
            end_ts: now,
            turn_count: 0,
            tags,
        };
        let id = self.store.insert(&entry).await?;
        debug!(id, "stored explicit memory");
        Ok(id)
    }

    async fn list_rules(&self) -> Result<Vec<Rule>, ValetError> {
        rules::list_rules(&self.db).await
    }

    async fn delete_rule(&self, id: i64) -> Result<bool, ValetError> {
        rules::delete_rule(&self.db, id).await
    }

    async fn set_rule_enabled(&self, id: i64, enabled: bool) -> Result<bool, ValetError> {
        rules::set_rule_enabled(&self.db, id, enabled).await
    }
}
