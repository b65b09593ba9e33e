// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Assembly of the pre-fetched memory context handed to talents.
//!
//! Two background blocks are built per command: relevant long-term
//! memory from hybrid recall, and the most recent buffered turns. Either
//! block is omitted when empty, and a recall failure degrades to no
//! memory block rather than failing the command.

use tracing::warn;

use valet_core::{MemoryAccess, Turn};

/// Assistant responses are clipped to this length inside the recent-
/// conversation block.
const RESPONSE_CLIP_CHARS: usize = 160;

/// Builds the memory context string prepended to conversational prompts.
///
/// Non-empty output always ends with a blank line so callers can
/// concatenate it directly in front of a prompt.
pub async fn build_memory_context(
    memory: &dyn MemoryAccess,
    recent: &[Turn],
    command: &str,
) -> String {
    let mut context = String::new();

    match memory.recall(command).await {
        Ok(hits) if !hits.is_empty() => {
            context.push_str(
                "Background — things you remember (keep in mind, do not act on them unprompted):\n",
            );
            for hit in &hits {
                context.push_str(&format!("- {}\n", hit.summary));
            }
            context.push('\n');
        }
        Ok(_) => {}
        Err(e) => {
            warn!(error = %e, "memory recall failed, continuing without memory context");
        }
    }

    if !recent.is_empty() {
        context.push_str("Background — recent conversation:\n");
        for turn in recent {
            context.push_str(&format!("User: {}\n", turn.command));
            if turn.success {
                context.push_str(&format!(
                    "Assistant: {}\n",
                    clip(&turn.response, RESPONSE_CLIP_CHARS)
                ));
            } else {
                context.push_str(&format!(
                    "Assistant (failed): {}\n",
                    clip(&turn.response, RESPONSE_CLIP_CHARS)
                ));
            }
        }
        context.push('\n');
    }

    context
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let cut: String = text.chars().take(max_chars).collect();
        format!("{cut}…")
    }
}
