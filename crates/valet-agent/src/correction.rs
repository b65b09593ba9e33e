// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Detection of user corrections against the immediately preceding turn.
//!
//! Detection is layered so the cheap path stays off the LLM: commands
//! carrying a strong restatement marker ("no i meant …") are corrections
//! outright, commands with no negation vocabulary at all are not, and only
//! the ambiguous middle pays for one categorical LLM call. A detected
//! correction then gets one more LLM call to merge the original command
//! and the correction utterance into a single corrected command line.
//!
//! Every LLM failure on this path fails open to "not a correction": a
//! missed correction degrades to a normal command instead of blocking
//! the session.

use std::sync::Arc;

use tracing::{debug, warn};

use valet_core::{GenerateRequest, LlmAdapter, Turn, normalize_signature};

/// Phrases that classify a command as a correction without consulting
/// the LLM.
const STRONG_MARKERS: [&str; 11] = [
    "no i meant",
    "no, i meant",
    "i meant",
    "actually i wanted",
    "actually i meant",
    "no i said",
    "that's wrong",
    "thats wrong",
    "that is wrong",
    "not that",
    "that's not what i",
];

/// Words whose complete absence rules out a correction. Matched on word
/// boundaries so "note" never reads as "no" or "not".
const NEGATION_VOCAB: [&str; 7] = ["no", "not", "wrong", "didn't", "don't", "actually", "meant"];

/// Merged corrected commands longer than this are treated as extraction
/// noise and discarded.
const MAX_INTENT_CHARS: usize = 200;

/// Previous-response text is clipped to this length inside the
/// classification prompt.
const RESPONSE_CLIP_CHARS: usize = 200;

const CLASSIFY_PROMPT: &str = r#"An assistant handled a command and the user replied. Decide whether the reply is correcting the assistant's interpretation of that command.

Previous command: {previous}
Assistant response: {response}
User reply: {reply}

Answer YES or NO.
Answer:"#;

const MERGE_PROMPT: &str = r#"A user corrected their assistant. Combine the original command and the correction into the single command the user actually wants. Reply with only that command, nothing else.

Original command: {original}
Correction: {correction}

Corrected command:"#;

/// Outcome of correction detection for one incoming command.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrectionDecision {
    pub is_correction: bool,
    /// The merged corrected command, present only when `is_correction`.
    pub corrected_intent: Option<String>,
}

impl CorrectionDecision {
    fn not_a_correction() -> Self {
        Self {
            is_correction: false,
            corrected_intent: None,
        }
    }
}

/// Classifies commands as corrections of the previous turn and derives
/// the corrected intent.
pub struct CorrectionEngine {
    llm: Arc<dyn LlmAdapter>,
    extraction_max_tokens: u32,
}

impl CorrectionEngine {
    pub fn new(llm: Arc<dyn LlmAdapter>, extraction_max_tokens: u32) -> Self {
        Self {
            llm,
            extraction_max_tokens,
        }
    }

    /// Decides whether `command` corrects `previous` and, if so, what the
    /// corrected command is. Never returns an error: every failure mode
    /// collapses to "not a correction".
    pub async fn detect(&self, command: &str, previous: &Turn) -> CorrectionDecision {
        let lower = command.to_lowercase();

        let is_correction = if has_strong_marker(&lower) {
            debug!(
                method = "lexical",
                signature = normalize_signature(&previous.command).as_str(),
                "strong correction marker"
            );
            true
        } else if !has_negation_vocab(&lower) {
            return CorrectionDecision::not_a_correction();
        } else {
            match self.classify(command, previous).await {
                Some(verdict) => {
                    debug!(
                        method = "llm",
                        verdict,
                        signature = normalize_signature(&previous.command).as_str(),
                        "ambiguous command classified"
                    );
                    verdict
                }
                None => return CorrectionDecision::not_a_correction(),
            }
        };

        if !is_correction {
            return CorrectionDecision::not_a_correction();
        }

        match self.merge_intent(&previous.command, command).await {
            Some(intent) => CorrectionDecision {
                is_correction: true,
                corrected_intent: Some(intent),
            },
            None => CorrectionDecision::not_a_correction(),
        }
    }

    /// One categorical LLM call for the ambiguous middle band. Returns
    /// `None` when the call fails or the answer is unparseable.
    async fn classify(&self, command: &str, previous: &Turn) -> Option<bool> {
        let prompt = CLASSIFY_PROMPT
            .replace("{previous}", &previous.command)
            .replace("{response}", &clip(&previous.response, RESPONSE_CLIP_CHARS))
            .replace("{reply}", command);
        let request = GenerateRequest::extraction(prompt, self.extraction_max_tokens);

        let raw = match self.llm.generate(request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "correction classification failed, treating as normal command");
                return None;
            }
        };

        let first = raw
            .split_whitespace()
            .next()?
            .trim_matches(|c: char| !c.is_alphanumeric())
            .to_uppercase();
        match first.as_str() {
            "YES" => Some(true),
            "NO" => Some(false),
            _ => {
                debug!(answer = first.as_str(), "unparseable correction verdict");
                None
            }
        }
    }

    /// Merges the original command and the correction utterance into one
    /// corrected command line. Returns `None` on LLM failure or unusable
    /// output.
    async fn merge_intent(&self, original: &str, correction: &str) -> Option<String> {
        let prompt = MERGE_PROMPT
            .replace("{original}", original)
            .replace("{correction}", correction);
        let request = GenerateRequest::extraction(prompt, self.extraction_max_tokens);

        let raw = match self.llm.generate(request).await {
            Ok(raw) => raw,
            Err(e) => {
                warn!(error = %e, "corrected-intent merge failed, treating as normal command");
                return None;
            }
        };

        let line = raw.lines().next().unwrap_or("").trim();
        let line = line
            .trim_matches(|c| c == '"' || c == '\'' || c == '`')
            .trim();
        if line.is_empty() || line.chars().count() > MAX_INTENT_CHARS {
            debug!("merged intent empty or oversized, discarding");
            return None;
        }
        Some(line.to_string())
    }
}

fn has_strong_marker(command_lower: &str) -> bool {
    STRONG_MARKERS.iter().any(|m| command_lower.contains(m))
}

fn has_negation_vocab(command_lower: &str) -> bool {
    NEGATION_VOCAB.iter().any(|w| contains_word(command_lower, w))
}

/// Substring match gated on word boundaries: the characters on both sides
/// of the hit must not be alphanumeric.
fn contains_word(haystack: &str, word: &str) -> bool {
    let mut start = 0;
    while let Some(pos) = haystack[start..].find(word) {
        let at = start + pos;
        let end = at + word.len();
        let before_ok = haystack[..at]
            .chars()
            .next_back()
            .is_none_or(|c| !c.is_alphanumeric());
        let after_ok = haystack[end..]
            .chars()
            .next()
            .is_none_or(|c| !c.is_alphanumeric());
        if before_ok && after_ok {
            return true;
        }
        start = end;
    }
    false
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valet_core::{Command, CommandChannel, TalentOutcome};
    use valet_test_utils::MockLlm;

    fn previous_turn() -> Turn {
        let command = Command::new("turn off bedroom lights", CommandChannel::Text);
        Turn::new(
            "sess",
            &command,
            "hue_lights",
            &TalentOutcome::ok("Bedroom lights are off."),
        )
    }

    fn engine(llm: Arc<MockLlm>) -> CorrectionEngine {
        CorrectionEngine::new(llm, 64)
    }

    #[tokio::test]
    async fn strong_marker_skips_classification() {
        let llm = Arc::new(MockLlm::with_responses(["turn off kitchen lights"]));
        let engine = engine(llm.clone());

        let decision = engine
            .detect("no i meant the kitchen lights", &previous_turn())
            .await;

        assert!(decision.is_correction);
        assert_eq!(
            decision.corrected_intent.as_deref(),
            Some("turn off kitchen lights")
        );
        // Only the merge call went to the LLM.
        assert_eq!(llm.requests().len(), 1);
        assert!(llm.requests()[0].prompt.contains("turn off bedroom lights"));
    }

    #[tokio::test]
    async fn plain_command_never_touches_the_llm() {
        let llm = Arc::new(MockLlm::new());
        let engine = engine(llm.clone());

        let decision = engine
            .detect("what's the weather like today", &previous_turn())
            .await;

        assert!(!decision.is_correction);
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn negation_vocab_matches_whole_words_only() {
        let llm = Arc::new(MockLlm::new());
        let engine = engine(llm.clone());

        // "note" and "nothing" must not read as "no"/"not".
        let decision = engine
            .detect("note a reminder about nothing special", &previous_turn())
            .await;

        assert!(!decision.is_correction);
        assert!(llm.requests().is_empty());
    }

    #[tokio::test]
    async fn ambiguous_command_is_classified_by_the_llm() {
        let llm = Arc::new(MockLlm::with_responses([
            "YES",
            "turn off kitchen lights",
        ]));
        let engine = engine(llm.clone());

        let decision = engine
            .detect("that didn't work, try the kitchen", &previous_turn())
            .await;

        assert!(decision.is_correction);
        assert_eq!(
            decision.corrected_intent.as_deref(),
            Some("turn off kitchen lights")
        );
        assert_eq!(llm.requests().len(), 2);
        assert!(llm.requests()[0].prompt.contains("Answer YES or NO."));
    }

    #[tokio::test]
    async fn classified_no_stops_before_merging() {
        let llm = Arc::new(MockLlm::with_responses(["NO"]));
        let engine = engine(llm.clone());

        let decision = engine
            .detect("no rush, whenever you get to it", &previous_turn())
            .await;

        assert!(!decision.is_correction);
        assert_eq!(llm.requests().len(), 1);
    }

    #[tokio::test]
    async fn unparseable_verdict_fails_open() {
        let llm = Arc::new(MockLlm::with_responses(["Quite possibly, hard to say."]));
        let engine = engine(llm.clone());

        let decision = engine
            .detect("that didn't work", &previous_turn())
            .await;

        assert!(!decision.is_correction);
    }

    #[tokio::test]
    async fn classification_error_fails_open() {
        let llm = Arc::new(MockLlm::new());
        llm.push_error("server unreachable");
        let engine = engine(llm.clone());

        let decision = engine
            .detect("that didn't work", &previous_turn())
            .await;

        assert!(!decision.is_correction);
        assert!(decision.corrected_intent.is_none());
    }

    #[tokio::test]
    async fn merge_error_fails_open() {
        let llm = Arc::new(MockLlm::new());
        llm.push_error("server unreachable");
        let engine = engine(llm.clone());

        let decision = engine
            .detect("no i meant the kitchen lights", &previous_turn())
            .await;

        assert!(!decision.is_correction);
    }

    #[tokio::test]
    async fn merged_intent_is_sanitized_to_one_clean_line() {
        let llm = Arc::new(MockLlm::with_responses([
            "\"turn off kitchen lights\"\nHappy to help with anything else.",
        ]));
        let engine = engine(llm.clone());

        let decision = engine
            .detect("no i meant the kitchen lights", &previous_turn())
            .await;

        assert_eq!(
            decision.corrected_intent.as_deref(),
            Some("turn off kitchen lights")
        );
    }

    #[tokio::test]
    async fn oversized_merge_output_fails_open() {
        let llm = Arc::new(MockLlm::with_responses(["x".repeat(300)]));
        let engine = engine(llm.clone());

        let decision = engine
            .detect("no i meant the kitchen lights", &previous_turn())
            .await;

        assert!(!decision.is_correction);
    }

    #[test]
    fn word_boundary_matching() {
        assert!(contains_word("no i meant it", "no"));
        assert!(contains_word("i don't want that", "don't"));
        assert!(!contains_word("note this down", "no"));
        assert!(!contains_word("nothing to see", "not"));
        assert!(contains_word("wrong, not that one", "not"));
    }
}
