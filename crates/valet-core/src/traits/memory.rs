// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Talent-facing memory access trait.

use async_trait::async_trait;

use crate::error::ValetError;
use crate::types::{MemoryHit, Rule, Turn, TurnQuery};

/// Read/write surface over the assistant's memory exposed to talents.
///
/// Talents never touch the database directly; everything goes through
/// this trait so the memory crate can keep its write path single-threaded.
#[async_trait]
pub trait MemoryAccess: Send + Sync + 'static {
    /// Hybrid semantic + keyword recall over consolidated long-term memory.
    ///
    /// Queries shorter than the configured minimum return an empty list.
    async fn recall(&self, query: &str) -> Result<Vec<MemoryHit>, ValetError>;

    /// Structured search over the persisted turn history.
    async fn search_turns(&self, query: &TurnQuery) -> Result<Vec<Turn>, ValetError>;

    /// Stores an explicit user note directly as a long-term entry.
    ///
    /// Returns the id of the new entry.
    async fn remember(&self, text: &str, tags: Vec<String>) -> Result<i64, ValetError>;

    /// Lists all routing rules, enabled and disabled.
    async fn list_rules(&self) -> Result<Vec<Rule>, ValetError>;

    /// Deletes a rule by id. Returns false when no such rule exists.
    async fn delete_rule(&self, id: i64) -> Result<bool, ValetError>;

    /// Enables or disables a rule by id. Returns false when no such rule
    /// exists.
    async fn set_rule_enabled(&self, id: i64, enabled: bool) -> Result<bool, ValetError>;
}
