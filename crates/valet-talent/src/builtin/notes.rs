// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Notes talent: explicit long-term memory.
//!
//! "remember the wifi password is hunter2" stores a note directly as a
//! long-term entry (no consolidation involved); "what do you know about
//! the wifi" searches stored knowledge, consolidated summaries included.

use async_trait::async_trait;
use tracing::warn;
use valet_core::{MemoryHit, TalentDescriptor, TalentOutcome, ValetError};

use crate::talent::{Talent, TalentContext};

/// Recall phrasings, checked before save phrasings so "do you remember X"
/// is a lookup rather than a store.
const RECALL_PREFIXES: [&str; 5] = [
    "what do you know about ",
    "what do you remember about ",
    "do you know anything about ",
    "do you remember ",
    "what did i tell you about ",
];

const SAVE_PREFIXES: [&str; 10] = [
    "remember that ",
    "remember this ",
    "remember to ",
    "remember ",
    "save a note about ",
    "save a note ",
    "note that ",
    "write down that ",
    "write down ",
    "make a note that ",
];

pub struct NotesTalent;

#[async_trait]
impl Talent for NotesTalent {
    fn descriptor(&self) -> TalentDescriptor {
        TalentDescriptor::new("notes", "Store and search personal notes and facts")
            .with_priority(45)
            .with_keywords([
                "remember",
                "note",
                "notes",
                "write down",
                "what do you know",
                "what did i tell you",
            ])
    }

    async fn execute(
        &self,
        command: &str,
        ctx: &TalentContext,
    ) -> Result<TalentOutcome, ValetError> {
        let cmd = command.trim();

        for prefix in RECALL_PREFIXES {
            if let Some(rest) = strip_prefix_ci(cmd, prefix) {
                let topic = rest.trim().trim_end_matches(['?', '.', '!']).trim();
                return recall(topic, ctx).await;
            }
        }

        // "note: pick up groceries" and "remember: ..." style.
        if let Some(content) = split_after_marker(cmd) {
            return save(content, ctx).await;
        }

        for prefix in SAVE_PREFIXES {
            if let Some(rest) = strip_prefix_ci(cmd, prefix) {
                return save(rest.trim(), ctx).await;
            }
        }

        Ok(TalentOutcome::ok(
            "You can say \"remember ...\" to store something, or \
             \"what do you know about ...\" to search your notes.",
        ))
    }
}

async fn save(content: &str, ctx: &TalentContext) -> Result<TalentOutcome, ValetError> {
    if content.chars().count() < 3 {
        return Ok(TalentOutcome::failed(
            "I couldn't figure out what to save. Try: 'remember: your note here'",
        ));
    }

    match ctx.memory.remember(content, Vec::new()).await {
        Ok(id) => Ok(
            TalentOutcome::ok(format!("Note saved! (#{id})\n\n\"{content}\""))
                .with_action(format!("note_save #{id}")),
        ),
        Err(e) => {
            warn!(error = %e, "failed to save note");
            Ok(TalentOutcome::failed("I couldn't save that note just now."))
        }
    }
}

async fn recall(topic: &str, ctx: &TalentContext) -> Result<TalentOutcome, ValetError> {
    if topic.chars().count() < 2 {
        return Ok(TalentOutcome::failed(
            "What should I search for? Try: 'what do you know about meetings'",
        ));
    }

    let hits = match ctx.memory.recall(topic).await {
        Ok(hits) => hits,
        Err(e) => {
            warn!(error = %e, "note recall failed");
            return Ok(TalentOutcome::failed(
                "I couldn't search my memory just now.",
            ));
        }
    };

    if hits.is_empty() {
        return Ok(
            TalentOutcome::ok(format!("No notes found matching '{topic}'."))
                .with_action(format!("note_search '{topic}'")),
        );
    }

    Ok(TalentOutcome::ok(format_hits(topic, &hits))
        .with_action(format!("note_search '{topic}' ({} hits)", hits.len())))
}

fn format_hits(topic: &str, hits: &[MemoryHit]) -> String {
    let mut lines = vec![format!("Found {} note(s) matching '{topic}':\n", hits.len())];
    for (i, hit) in hits.iter().enumerate() {
        let tag_str = if hit.tags.is_empty() {
            String::new()
        } else {
            format!(" [{}]", hit.tags.join(", "))
        };
        lines.push(format!("{}. {}{tag_str}", i + 1, clip(&hit.summary, 120)));
    }
    lines.join("\n")
}

/// Case-insensitive ASCII prefix strip that never splits a char boundary.
fn strip_prefix_ci<'a>(text: &'a str, prefix: &str) -> Option<&'a str> {
    let head = text.get(..prefix.len())?;
    if head.eq_ignore_ascii_case(prefix) {
        text.get(prefix.len()..)
    } else {
        None
    }
}

/// Splits "note: content" style commands (colon, or a dash with spaces
/// around it), returning the content when the part before the separator
/// looks like a save verb. Dashes need the surrounding spaces so hyphenated
/// words like "to-do" are not treated as separators.
fn split_after_marker(command: &str) -> Option<&str> {
    for sep in [":", " - ", " \u{2014} "] {
        if let Some((before, after)) = command.split_once(sep) {
            let before = before.to_lowercase();
            let is_save_lead = ["note", "save", "write", "remember", "jot"]
                .iter()
                .any(|verb| before.contains(verb));
            let after = after.trim();
            if is_save_lead && !after.is_empty() {
                return Some(after);
            }
        }
    }
    None
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let clipped: String = text.chars().take(max_chars).collect();
        format!("{clipped}…")
    }
}
