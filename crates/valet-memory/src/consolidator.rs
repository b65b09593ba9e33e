// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! LLM-based consolidation of evicted conversation turns.
//!
//! Renders a batch of turns as a transcript, asks the LLM for a short
//! summary, embeds it, and persists exactly one long-term entry covering
//! the batch's time range. Any failure surfaces as an error so the caller
//! can abort the eviction and keep the turns buffered.

use std::sync::Arc;

use tracing::{debug, warn};
use valet_config::model::MemoryConfig;
use valet_core::error::ValetError;
use valet_core::traits::{EmbeddingAdapter, LlmAdapter};
use valet_core::types::{EmbeddingInput, GenerateRequest, Turn};

use crate::store::LtmStore;
use crate::types::NewEntry;

/// Prompt for turn-batch summarization.
const CONSOLIDATION_PROMPT: &str = r#"Summarize this conversation between a user and their assistant in one to three sentences. Keep concrete details the user may refer back to later: names, places, times, decisions, and what the assistant did. No commentary, no preamble.

Conversation:
{transcript}

Summary:"#;

/// Summarizes evicted turn batches into long-term entries.
pub struct Consolidator {
    store: Arc<LtmStore>,
    llm: Arc<dyn LlmAdapter>,
    embedder: Arc<dyn EmbeddingAdapter>,
    config: MemoryConfig,
}

impl Consolidator {
    pub fn new(
        store: Arc<LtmStore>,
        llm: Arc<dyn LlmAdapter>,
        embedder: Arc<dyn EmbeddingAdapter>,
        config: MemoryConfig,
    ) -> Self {
        Self {
            store,
            llm,
            embedder,
            config,
        }
    }

    /// Consolidates a batch of turns into one persisted long-term entry.
    ///
    /// Returns the new entry's row id. Errors from the LLM, the embedder,
    /// or the store propagate so the eviction can be aborted and retried.
    pub async fn consolidate(&self, turns: &[Turn]) -> Result<i64, ValetError> {
        let (first, last) = match (turns.first(), turns.last()) {
            (Some(f), Some(l)) => (f, l),
            _ => {
                return Err(ValetError::Internal(
                    "consolidation called with an empty batch".to_string(),
                ));
            }
        };

        let transcript = format_transcript(turns);
        let prompt = CONSOLIDATION_PROMPT.replace("{transcript}", &transcript);
        let request = GenerateRequest::extraction(prompt, self.config.summary_max_tokens);

        let raw = self.llm.generate(request).await?;
        let summary = match sanitize_summary(&raw) {
            Some(s) => s,
            None => {
                // A blank response is not worth retrying forever; fall back
                // to a verbatim digest so the turns still survive eviction.
                warn!("summarization returned no usable text, storing digest instead");
                fallback_summary(turns)
            }
        };

        let embedding = if self.config.embedding_enabled {
            let output = self
                .embedder
                .embed(EmbeddingInput {
                    texts: vec![summary.clone()],
                })
                .await?;
            output
                .embeddings
                .into_iter()
                .next()
                .ok_or_else(|| ValetError::Internal("embedding returned no results".to_string()))?
        } else {
            Vec::new()
        };

        let entry = NewEntry {
            summary,
            embedding,
            start_ts: first.created_at.clone(),
            end_ts: last.created_at.clone(),
            turn_count: turns.len() as i64,
            tags: collect_tags(turns),
        };
        let id = self.store.insert(&entry).await?;
        debug!(id, turns = turns.len(), "consolidated turn batch");
        Ok(id)
    }
}

/// Renders turns as "User:"/"Assistant:" transcript lines, oldest first.
fn format_transcript(turns: &[Turn]) -> String {
    let mut out = String::new();
    for turn in turns {
        out.push_str(&format!("User: {}\n", turn.command));
        if turn.success {
            out.push_str(&format!("Assistant: {}\n", turn.response));
        } else {
            out.push_str(&format!("Assistant (failed): {}\n", turn.response));
        }
    }
    out
}

/// Trims the LLM response down to plain summary text.
///
/// Strips markdown code fences and a leading "Summary:" echo, and caps
/// runaway responses at a sane length. Returns None if nothing remains.
fn sanitize_summary(raw: &str) -> Option<String> {
    let mut text = raw.trim();

    if text.starts_with("```") {
        text = text.trim_start_matches("```");
        if let Some(rest) = text.split_once('\n') {
            text = rest.1;
        }
        if let Some(end) = text.rfind("```") {
            text = &text[..end];
        }
        text = text.trim();
    }
    if let Some(rest) = text.strip_prefix("Summary:") {
        text = rest.trim();
    }

    if text.is_empty() {
        return None;
    }

    let mut summary: String = text.chars().take(2000).collect();
    if summary.len() < text.len() {
        summary.push('…');
    }
    Some(summary)
}

/// Digest used when the LLM returns nothing usable: first and last
/// exchanges, verbatim and truncated.
fn fallback_summary(turns: &[Turn]) -> String {
    let clip = |s: &str| -> String {
        let c: String = s.chars().take(120).collect();
        c
    };
    match turns {
        [only] => format!(
            "The user said \"{}\" and the assistant replied \"{}\".",
            clip(&only.command),
            clip(&only.response)
        ),
        [first, .., last] => format!(
            "Conversation of {} turns, starting with \"{}\" and ending with \"{}\" (assistant: \"{}\").",
            turns.len(),
            clip(&first.command),
            clip(&last.command),
            clip(&last.response)
        ),
        [] => String::new(),
    }
}

/// Unique talent names across the batch, in first-seen order.
fn collect_tags(turns: &[Turn]) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for turn in turns {
        if !tags.contains(&turn.talent) {
            tags.push(turn.talent.clone());
        }
    }
    tags
}
