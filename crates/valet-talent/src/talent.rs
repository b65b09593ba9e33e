// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Talent trait, execution context, and the talent set.
//!
//! A talent is one pluggable command-handling capability. The [`Talent`]
//! trait pairs a routing descriptor with an async `execute`; the
//! [`TalentSet`] owns the executable talents behind `Arc<dyn Talent>`,
//! applies per-talent configuration overrides at registration, and hands
//! the effective descriptors to the router.

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;
use valet_config::model::{TalentOverride, TalentsConfig};
use valet_config::ValetConfig;
use valet_core::{
    LlmAdapter, MemoryAccess, Notifier, TalentDescriptor, TalentOutcome, TrainingSink, ValetError,
};

/// Per-invocation execution context handed to talents.
///
/// Built fresh by the orchestrator for every command and never mutated by
/// talents. `depth` is 0 for a user-issued command and 1 for the single
/// re-dispatch a correction is allowed to trigger.
#[derive(Clone)]
pub struct TalentContext {
    pub llm: Arc<dyn LlmAdapter>,
    pub memory: Arc<dyn MemoryAccess>,
    /// Pre-fetched relevant-memory block; empty when nothing applies.
    pub memory_context: String,
    /// Corrected-intent text from a matching correction record, if any.
    pub correction_hint: Option<String>,
    pub config: Arc<ValetConfig>,
    pub notifier: Arc<dyn Notifier>,
    pub training: Arc<dyn TrainingSink>,
    pub depth: u8,
}

/// Unified interface for all talents (built-in and manifest-declared).
///
/// The descriptor carries everything the router needs; `execute` performs
/// the command against the services in the context. Talents report failure
/// through [`TalentOutcome::failed`] with a conversational message; an `Err`
/// is reserved for infrastructure problems the talent cannot phrase itself.
#[async_trait]
pub trait Talent: Send + Sync {
    /// Routing metadata: name, priority, keywords, exclusions.
    fn descriptor(&self) -> TalentDescriptor;

    /// Whether this talent claims the command.
    ///
    /// The default matches any descriptor keyword as a case-insensitive
    /// substring, which is exactly the predicate the router applies to the
    /// descriptor. Override only to accept unconditionally (the fallback).
    fn can_handle(&self, command: &str) -> bool {
        let command = command.to_lowercase();
        self.descriptor()
            .keywords
            .iter()
            .any(|kw| command.contains(&kw.to_lowercase()))
    }

    /// Executes the command and returns the outcome.
    async fn execute(
        &self,
        command: &str,
        ctx: &TalentContext,
    ) -> Result<TalentOutcome, ValetError>;
}

/// Owns the executable talents, indexed by name.
///
/// Registration applies any `[talents.overrides]` entry for the talent's
/// name (enabled flag, priority) to its descriptor; the effective
/// descriptors are what the router registry is seeded from.
pub struct TalentSet {
    talents: HashMap<String, Arc<dyn Talent>>,
    descriptors: Vec<TalentDescriptor>,
    overrides: BTreeMap<String, TalentOverride>,
}

impl TalentSet {
    /// Creates an empty set carrying the configured per-talent overrides.
    pub fn new(config: &TalentsConfig) -> Self {
        Self {
            talents: HashMap::new(),
            descriptors: Vec::new(),
            overrides: config.overrides.clone(),
        }
    }

    /// Registers a talent, applying any configured override to its
    /// descriptor. Rejects empty and duplicate names.
    pub fn register(&mut self, talent: Arc<dyn Talent>) -> Result<(), ValetError> {
        let mut descriptor = talent.descriptor();
        if descriptor.name.trim().is_empty() {
            return Err(ValetError::Config(
                "talent name must not be empty".to_string(),
            ));
        }
        if self.talents.contains_key(&descriptor.name) {
            return Err(ValetError::Config(format!(
                "talent `{}` is already registered",
                descriptor.name
            )));
        }
        if let Some(over) = self.overrides.get(&descriptor.name) {
            if let Some(enabled) = over.enabled {
                descriptor.enabled = enabled;
            }
            if let Some(priority) = over.priority {
                descriptor.priority = priority;
            }
        }
        debug!(
            talent = %descriptor.name,
            priority = descriptor.priority,
            enabled = descriptor.enabled,
            "registered talent"
        );
        self.talents.insert(descriptor.name.clone(), talent);
        self.descriptors.push(descriptor);
        Ok(())
    }

    /// Looks up a talent by name.
    pub fn get(&self, name: &str) -> Option<Arc<dyn Talent>> {
        self.talents.get(name).cloned()
    }

    /// Effective descriptors (overrides applied) in registration order.
    pub fn descriptors(&self) -> &[TalentDescriptor] {
        &self.descriptors
    }

    /// Returns (name, description) pairs for all registered talents,
    /// sorted by name.
    pub fn list(&self) -> Vec<(&str, &str)> {
        let mut entries: Vec<(&str, &str)> = self
            .descriptors
            .iter()
            .map(|d| (d.name.as_str(), d.description.as_str()))
            .collect();
        entries.sort_by_key(|(name, _)| *name);
        entries
    }

    /// Returns the number of registered talents.
    pub fn len(&self) -> usize {
        self.talents.len()
    }

    /// Returns true if no talents are registered.
    pub fn is_empty(&self) -> bool {
        self.talents.is_empty()
    }
}

impl Default for TalentSet {
    fn default() -> Self {
        Self::new(&TalentsConfig::default())
    }
}
