// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory [`MemoryAccess`] implementation for testing talents.

use std::sync::Mutex;

use async_trait::async_trait;

use valet_core::{MemoryAccess, MemoryHit, Rule, Turn, TurnQuery, ValetError};

#[derive(Default)]
struct MemoryState {
    turns: Vec<Turn>,
    hits: Vec<MemoryHit>,
    rules: Vec<Rule>,
    saved: Vec<(String, Vec<String>)>,
    search_queries: Vec<TurnQuery>,
    recall_queries: Vec<String>,
}

/// A scriptable memory backend.
///
/// Queries return whatever was staged with the `set_*` methods and are
/// recorded for later assertion. `remember` hands out sequential ids
/// starting at 1. A mock built with [`failing`](MockMemory::failing)
/// returns the same error from every method, for exercising the
/// conversational failure paths.
pub struct MockMemory {
    state: Mutex<MemoryState>,
    fail: Option<String>,
}

impl MockMemory {
    pub fn new() -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            fail: None,
        }
    }

    /// A mock whose every method fails with the given message.
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            state: Mutex::new(MemoryState::default()),
            fail: Some(message.into()),
        }
    }

    fn check(&self) -> Result<(), ValetError> {
        match &self.fail {
            Some(message) => Err(ValetError::Internal(message.clone())),
            None => Ok(()),
        }
    }

    /// Stages the turns returned by every subsequent `search_turns` call.
    pub fn set_turns(&self, turns: Vec<Turn>) {
        self.state.lock().unwrap().turns = turns;
    }

    /// Stages the hits returned by every subsequent `recall` call.
    pub fn set_hits(&self, hits: Vec<MemoryHit>) {
        self.state.lock().unwrap().hits = hits;
    }

    /// Stages the rule table; `delete_rule` and `set_rule_enabled`
    /// mutate it in place.
    pub fn set_rules(&self, rules: Vec<Rule>) {
        self.state.lock().unwrap().rules = rules;
    }

    /// Every query passed to `search_turns`, in call order.
    pub fn search_queries(&self) -> Vec<TurnQuery> {
        self.state.lock().unwrap().search_queries.clone()
    }

    /// Every query string passed to `recall`, in call order.
    pub fn recall_queries(&self) -> Vec<String> {
        self.state.lock().unwrap().recall_queries.clone()
    }

    /// Every `(text, tags)` pair passed to `remember`, in call order.
    pub fn remembered(&self) -> Vec<(String, Vec<String>)> {
        self.state.lock().unwrap().saved.clone()
    }

    /// Current snapshot of the rule table, after any mutations.
    pub fn rules(&self) -> Vec<Rule> {
        self.state.lock().unwrap().rules.clone()
    }
}

impl Default for MockMemory {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MemoryAccess for MockMemory {
    async fn recall(&self, query: &str) -> Result<Vec<MemoryHit>, ValetError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.recall_queries.push(query.to_string());
        Ok(state.hits.clone())
    }

    async fn search_turns(&self, query: &TurnQuery) -> Result<Vec<Turn>, ValetError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.search_queries.push(query.clone());
        Ok(state.turns.clone())
    }

    async fn remember(&self, text: &str, tags: Vec<String>) -> Result<i64, ValetError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        state.saved.push((text.to_string(), tags));
        Ok(state.saved.len() as i64)
    }

    async fn list_rules(&self) -> Result<Vec<Rule>, ValetError> {
        self.check()?;
        Ok(self.state.lock().unwrap().rules.clone())
    }

    async fn delete_rule(&self, id: i64) -> Result<bool, ValetError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        let before = state.rules.len();
        state.rules.retain(|rule| rule.id != id);
        Ok(state.rules.len() < before)
    }

    async fn set_rule_enabled(&self, id: i64, enabled: bool) -> Result<bool, ValetError> {
        self.check()?;
        let mut state = self.state.lock().unwrap();
        match state.rules.iter_mut().find(|rule| rule.id == id) {
            Some(rule) => {
                rule.enabled = enabled;
                Ok(true)
            }
            None => Ok(false),
        }
    }
}
