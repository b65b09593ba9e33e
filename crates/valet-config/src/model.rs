// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs for the Valet assistant.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Top-level Valet configuration.
///
/// Loaded from TOML files following XDG hierarchy, with environment variable overrides.
/// All sections are optional and default to sensible values.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct ValetConfig {
    /// Assistant identity and behavior settings.
    #[serde(default)]
    pub agent: AgentConfig,

    /// Local LLM server settings.
    #[serde(default)]
    pub llm: LlmConfig,

    /// Storage backend settings.
    #[serde(default)]
    pub storage: StorageConfig,

    /// Memory buffer, consolidation, and recall settings.
    #[serde(default)]
    pub memory: MemoryConfig,

    /// Training data harvest settings.
    #[serde(default)]
    pub training: TrainingConfig,

    /// Talent registration settings.
    #[serde(default)]
    pub talents: TalentsConfig,
}

/// Assistant identity and behavior configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AgentConfig {
    /// Display name of the assistant.
    #[serde(default = "default_agent_name")]
    pub name: String,

    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// How many recent buffered turns are included in talent context.
    #[serde(default = "default_context_turns")]
    pub context_turns: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: default_agent_name(),
            log_level: default_log_level(),
            context_turns: default_context_turns(),
        }
    }
}

fn default_agent_name() -> String {
    "valet".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_context_turns() -> usize {
    10
}

/// Local LLM server configuration.
///
/// Valet talks to a llama.cpp-compatible server over HTTP; the same
/// server provides generation and embeddings.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LlmConfig {
    /// Base URL of the llama.cpp server.
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Maximum tokens to generate per conversational response.
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Maximum tokens for short classification/extraction calls.
    #[serde(default = "default_extraction_max_tokens")]
    pub extraction_max_tokens: u32,

    /// Sampling temperature for conversational responses.
    #[serde(default = "default_temperature")]
    pub temperature: f32,

    /// Nucleus sampling cutoff.
    #[serde(default = "default_top_p")]
    pub top_p: f32,

    /// Request timeout in seconds. Local models can be slow on first load.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Stop sequences appended to every generation request.
    #[serde(default)]
    pub stop: Vec<String>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            max_tokens: default_max_tokens(),
            extraction_max_tokens: default_extraction_max_tokens(),
            temperature: default_temperature(),
            top_p: default_top_p(),
            timeout_secs: default_timeout_secs(),
            stop: Vec::new(),
        }
    }
}

fn default_base_url() -> String {
    "http://127.0.0.1:8080".to_string()
}

fn default_max_tokens() -> u32 {
    512
}

fn default_extraction_max_tokens() -> u32 {
    64
}

fn default_temperature() -> f32 {
    0.7
}

fn default_top_p() -> f32 {
    0.9
}

fn default_timeout_secs() -> u64 {
    120
}

/// Storage backend configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Path to the SQLite database file.
    #[serde(default = "default_database_path")]
    pub database_path: String,

    /// SQLite busy timeout in milliseconds.
    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_database_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("valet").join("valet.db"))
        .unwrap_or_else(|| std::path::PathBuf::from("valet.db"))
        .to_string_lossy()
        .into_owned()
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

/// Memory buffer, consolidation, and recall configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct MemoryConfig {
    /// Short-term buffer capacity in turns. Overflow triggers consolidation.
    #[serde(default = "default_buffer_capacity")]
    pub buffer_capacity: usize,

    /// Minimum cosine similarity for semantic recall results (0.0-1.0).
    #[serde(default = "default_similarity_threshold")]
    pub similarity_threshold: f64,

    /// Maximum results returned by a recall query.
    #[serde(default = "default_max_recall_results")]
    pub max_recall_results: usize,

    /// Half-life in days for the recency boost applied to recall scores.
    #[serde(default = "default_recency_half_life_days")]
    pub recency_half_life_days: f64,

    /// Recall queries shorter than this (in characters) return nothing.
    #[serde(default = "default_min_query_chars")]
    pub min_query_chars: usize,

    /// Max tokens for consolidation summaries.
    #[serde(default = "default_summary_max_tokens")]
    pub summary_max_tokens: u32,

    /// Use embeddings for recall and consolidation. When off, recall is
    /// keyword-only and entries store an empty vector.
    #[serde(default = "default_true")]
    pub embedding_enabled: bool,
}

impl Default for MemoryConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: default_buffer_capacity(),
            similarity_threshold: default_similarity_threshold(),
            max_recall_results: default_max_recall_results(),
            recency_half_life_days: default_recency_half_life_days(),
            min_query_chars: default_min_query_chars(),
            summary_max_tokens: default_summary_max_tokens(),
            embedding_enabled: true,
        }
    }
}

fn default_buffer_capacity() -> usize {
    20
}

fn default_similarity_threshold() -> f64 {
    0.35
}

fn default_max_recall_results() -> usize {
    5
}

fn default_recency_half_life_days() -> f64 {
    30.0
}

fn default_min_query_chars() -> usize {
    4
}

fn default_summary_max_tokens() -> u32 {
    256
}

fn default_true() -> bool {
    true
}

/// Training data harvest configuration.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TrainingConfig {
    /// Harvest instruction/output pairs from corrections and lookups.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Path of the JSONL file training pairs are appended to.
    #[serde(default = "default_pairs_path")]
    pub pairs_path: String,

    /// Pairs with outputs shorter than this are dropped.
    #[serde(default = "default_min_output_chars")]
    pub min_output_chars: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            pairs_path: default_pairs_path(),
            min_output_chars: default_min_output_chars(),
        }
    }
}

fn default_pairs_path() -> String {
    dirs::data_dir()
        .map(|p| p.join("valet").join("training_pairs.jsonl"))
        .unwrap_or_else(|| std::path::PathBuf::from("training_pairs.jsonl"))
        .to_string_lossy()
        .into_owned()
}

fn default_min_output_chars() -> usize {
    20
}

/// Talent registration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TalentsConfig {
    /// Directory scanned for declarative talent manifests (`*.toml`).
    /// `None` disables manifest loading.
    #[serde(default)]
    pub manifest_dir: Option<String>,

    /// Per-talent overrides applied at registration, keyed by talent name.
    #[serde(default)]
    pub overrides: BTreeMap<String, TalentOverride>,
}

/// Per-talent registration override.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TalentOverride {
    /// Register the talent disabled (or re-enable a manifest default).
    #[serde(default)]
    pub enabled: Option<bool>,

    /// Replace the talent's declared routing priority.
    #[serde(default)]
    pub priority: Option<i32>,
}
