// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared across the Valet workspace.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Default routing priority for talents that do not declare one.
pub const DEFAULT_TALENT_PRIORITY: i32 = 50;

/// Name of the always-accepting conversational fallback talent.
pub const FALLBACK_TALENT: &str = "conversation";

/// The surface a command arrived from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString, Default,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum CommandChannel {
    #[default]
    Text,
    Voice,
}

/// A raw user command. Immutable once created.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Command {
    /// Raw user text, untrimmed beyond leading/trailing whitespace.
    pub text: String,
    /// Surface the command arrived from.
    pub channel: CommandChannel,
    /// Creation timestamp, RFC 3339.
    pub timestamp: String,
}

impl Command {
    /// Creates a command stamped with the current time.
    pub fn new(text: impl Into<String>, channel: CommandChannel) -> Self {
        Self {
            text: text.into().trim().to_string(),
            channel,
            timestamp: now_rfc3339(),
        }
    }

    /// Normalized lookup signature of this command's text.
    pub fn signature(&self) -> String {
        normalize_signature(&self.text)
    }
}

/// One completed orchestrator invocation. Insert-only; corrections produce
/// a new Turn rather than editing history.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Turn {
    pub id: String,
    pub session_id: String,
    pub command: String,
    pub channel: CommandChannel,
    /// Name of the talent that handled the command (fallback included).
    pub talent: String,
    pub success: bool,
    pub response: String,
    /// Whether the talent already voiced the response itself.
    pub spoken: bool,
    /// RFC 3339.
    pub created_at: String,
}

impl Turn {
    /// Builds a turn for a freshly executed command.
    pub fn new(
        session_id: &str,
        command: &Command,
        talent: &str,
        outcome: &TalentOutcome,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            session_id: session_id.to_string(),
            command: command.text.clone(),
            channel: command.channel,
            talent: talent.to_string(),
            success: outcome.success,
            response: outcome.response.clone(),
            spoken: outcome.spoken,
            created_at: now_rfc3339(),
        }
    }

    /// Normalized lookup signature of the recorded command text.
    pub fn signature(&self) -> String {
        normalize_signature(&self.command)
    }
}

/// Filter surface for structured history search over persisted turns.
#[derive(Debug, Clone, Default)]
pub struct TurnQuery {
    /// Substring match against command or response text.
    pub keyword: Option<String>,
    /// Inclusive RFC 3339 lower bound.
    pub start_ts: Option<String>,
    /// Inclusive RFC 3339 upper bound.
    pub end_ts: Option<String>,
    /// Filter by success flag.
    pub success: Option<bool>,
    /// Maximum rows returned; 0 means the default of 10.
    pub limit: u32,
}

impl TurnQuery {
    /// Effective row limit (default 10).
    pub fn effective_limit(&self) -> u32 {
        if self.limit == 0 { 10 } else { self.limit }
    }
}

/// A stored user correction pattern, keyed by the normalized signature of
/// the original (mis-handled) command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorrectionRecord {
    pub id: i64,
    pub signature: String,
    pub original_command: String,
    /// Most recent corrected command text (most-recent-wins).
    pub corrected_command: String,
    pub original_turn_id: Option<String>,
    pub corrected_turn_id: Option<String>,
    /// How many times this pattern has recurred. Monotone; reset only by
    /// explicit rule acceptance or record deletion.
    pub occurrence_count: i64,
    pub created_at: String,
    pub updated_at: String,
}

/// A standing routing override promoted from a recurring correction.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rule {
    pub id: i64,
    /// Normalized trigger phrase matched against incoming commands.
    pub trigger: String,
    /// Name of the talent this rule prescribes.
    pub talent: String,
    /// Signature of the correction record this rule was promoted from.
    pub source_signature: Option<String>,
    pub enabled: bool,
    pub created_at: String,
}

/// A one-shot suggestion to persist a recurring correction as a rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleProposal {
    /// Signature of the correction record that crossed the boundary.
    pub signature: String,
    /// Proposed trigger phrase (the corrected command, normalized).
    pub trigger: String,
    /// Talent the rule would prescribe.
    pub talent: String,
    /// Occurrence count at proposal time (a multiple of 3).
    pub occurrence_count: i64,
}

/// Static routing metadata for a registered talent.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalentDescriptor {
    /// Unique name within the registry.
    pub name: String,
    pub description: String,
    /// Higher priorities are consulted first. Default 50.
    pub priority: i32,
    /// Trigger keywords; a command containing any of them can be claimed.
    pub keywords: Vec<String>,
    /// Exclusion keywords; a command containing any of them removes this
    /// talent from consideration before its own keywords are consulted.
    pub exclusions: Vec<String>,
    pub enabled: bool,
}

impl TalentDescriptor {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            priority: DEFAULT_TALENT_PRIORITY,
            keywords: Vec::new(),
            exclusions: Vec::new(),
            enabled: true,
        }
    }

    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    pub fn with_keywords<I, S>(mut self, keywords: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.keywords = keywords.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_exclusions<I, S>(mut self, exclusions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.exclusions = exclusions.into_iter().map(Into::into).collect();
        self
    }
}

/// Result of a single talent execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TalentOutcome {
    pub success: bool,
    pub response: String,
    /// Human-readable log of side effects the talent performed.
    pub actions_taken: Vec<String>,
    /// True when the talent already voiced the response itself.
    pub spoken: bool,
}

impl TalentOutcome {
    /// Successful outcome with a response and no recorded actions.
    pub fn ok(response: impl Into<String>) -> Self {
        Self {
            success: true,
            response: response.into(),
            actions_taken: Vec::new(),
            spoken: false,
        }
    }

    /// Failed outcome carrying a conversational error message.
    pub fn failed(response: impl Into<String>) -> Self {
        Self {
            success: false,
            response: response.into(),
            actions_taken: Vec::new(),
            spoken: false,
        }
    }

    pub fn with_action(mut self, action: impl Into<String>) -> Self {
        self.actions_taken.push(action.into());
        self
    }
}

/// What the orchestrator hands back to the interactive surface for one
/// processed command.
#[derive(Debug, Clone)]
pub struct CommandOutcome {
    pub response: String,
    pub talent: String,
    pub success: bool,
    /// Set when this outcome came from re-executing a corrected command;
    /// carries the original command text.
    pub corrected_from: Option<String>,
    /// Set when a correction pattern crossed a proposal boundary this turn.
    pub proposal: Option<RuleProposal>,
}

/// Parameters for a single LLM generation call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerateRequest {
    pub prompt: String,
    pub system: Option<String>,
    pub max_tokens: u32,
    pub temperature: f32,
    pub stop: Vec<String>,
}

impl GenerateRequest {
    /// Request with workspace defaults (512 tokens, temperature 0.7).
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens: 512,
            temperature: 0.7,
            stop: Vec::new(),
        }
    }

    /// Short deterministic request used for classification and extraction.
    pub fn extraction(prompt: impl Into<String>, max_tokens: u32) -> Self {
        Self {
            prompt: prompt.into(),
            system: None,
            max_tokens,
            temperature: 0.0,
            stop: Vec::new(),
        }
    }

    pub fn with_system(mut self, system: impl Into<String>) -> Self {
        self.system = Some(system.into());
        self
    }
}

/// Input to an embedding call: one or more texts to vectorize.
#[derive(Debug, Clone)]
pub struct EmbeddingInput {
    pub texts: Vec<String>,
}

/// Output of an embedding call, one vector per input text.
#[derive(Debug, Clone)]
pub struct EmbeddingOutput {
    pub embeddings: Vec<Vec<f32>>,
}

/// Health of an external service or adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// A ranked long-term memory retrieval result as seen by talents.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MemoryHit {
    pub summary: String,
    pub score: f32,
    pub start_ts: String,
    pub end_ts: String,
    pub tags: Vec<String>,
}

/// Where a harvested training pair came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Display, EnumString)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TrainingSource {
    /// User corrected a mis-handled command (original → corrected response).
    Correction,
    /// Substantive question → answer exchange.
    Conversation,
}

/// One instruction/output pair emitted to the training sink.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingPair {
    pub instruction: String,
    pub output: String,
    pub source: TrainingSource,
}

/// Current UTC time as an RFC 3339 string, the storage timestamp format.
///
/// Millisecond precision with a `Z` suffix, matching SQLite's
/// `strftime('%Y-%m-%dT%H:%M:%fZ', 'now')` so timestamps from either
/// source sort lexicographically.
pub fn now_rfc3339() -> String {
    chrono::Utc::now()
        .to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
}

/// Normalizes command text into a lookup signature: case-folded,
/// punctuation stripped, whitespace collapsed.
///
/// Two commands with equal signatures are treated as the same correction
/// pattern.
pub fn normalize_signature(text: &str) -> String {
    text.to_lowercase()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || c.is_whitespace() {
                c
            } else {
                ' '
            }
        })
        .collect::<String>()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn signature_case_folds_and_collapses() {
        assert_eq!(
            normalize_signature("  Turn OFF   the Bedroom Lights  "),
            "turn off the bedroom lights"
        );
    }

    #[test]
    fn signature_strips_punctuation() {
        assert_eq!(
            normalize_signature("what's the weather?"),
            "what s the weather"
        );
        assert_eq!(
            normalize_signature("no, I meant: the kitchen!"),
            "no i meant the kitchen"
        );
    }

    #[test]
    fn signature_of_empty_is_empty() {
        assert_eq!(normalize_signature(""), "");
        assert_eq!(normalize_signature("  ...  "), "");
    }

    #[test]
    fn equal_signatures_for_equivalent_commands() {
        assert_eq!(
            normalize_signature("Turn off bedroom lights"),
            normalize_signature("turn off  bedroom lights.")
        );
    }

    #[test]
    fn descriptor_defaults() {
        let d = TalentDescriptor::new("weather", "Weather lookups");
        assert_eq!(d.priority, DEFAULT_TALENT_PRIORITY);
        assert!(d.enabled);
        assert!(d.keywords.is_empty());
        assert!(d.exclusions.is_empty());
    }

    #[test]
    fn descriptor_builder_chain() {
        let d = TalentDescriptor::new("news", "Headlines")
            .with_priority(80)
            .with_keywords(["news", "headlines"])
            .with_exclusions(["newspaper archive"]);
        assert_eq!(d.priority, 80);
        assert_eq!(d.keywords, vec!["news", "headlines"]);
        assert_eq!(d.exclusions, vec!["newspaper archive"]);
    }

    #[test]
    fn outcome_helpers() {
        let ok = TalentOutcome::ok("done").with_action("light toggled");
        assert!(ok.success);
        assert_eq!(ok.actions_taken, vec!["light toggled"]);

        let failed = TalentOutcome::failed("could not reach the bridge");
        assert!(!failed.success);
        assert!(!failed.spoken);
    }

    #[test]
    fn channel_round_trips() {
        for channel in [CommandChannel::Text, CommandChannel::Voice] {
            let s = channel.to_string();
            assert_eq!(CommandChannel::from_str(&s).unwrap(), channel);
        }
        assert_eq!(CommandChannel::default(), CommandChannel::Text);
    }

    #[test]
    fn command_trims_and_stamps() {
        let cmd = Command::new("  hello there  ", CommandChannel::Text);
        assert_eq!(cmd.text, "hello there");
        assert!(cmd.timestamp.ends_with('Z'));
    }

    #[test]
    fn turn_query_limit_default() {
        let q = TurnQuery::default();
        assert_eq!(q.effective_limit(), 10);
        let q = TurnQuery {
            limit: 30,
            ..Default::default()
        };
        assert_eq!(q.effective_limit(), 30);
    }

    #[test]
    fn training_source_serializes_lowercase() {
        let json = serde_json::to_string(&TrainingSource::Correction).unwrap();
        assert_eq!(json, "\"correction\"");
    }
}
