// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! History talent: natural-language search over past turns.
//!
//! "what did I ask yesterday?", "did I ever ask about lights?",
//! "show me failed commands from today". The search topic is extracted
//! with a short deterministic LLM call; date ranges, success filters, and
//! the row limit come from phrase matching on the command itself.

use async_trait::async_trait;
use chrono::{DateTime, Datelike, Duration, NaiveTime, SecondsFormat, TimeZone, Utc};
use tracing::{debug, warn};
use valet_core::{GenerateRequest, TalentDescriptor, TalentOutcome, Turn, TurnQuery, ValetError};

use crate::talent::{Talent, TalentContext};

/// Extraction answers that mean "no specific topic".
const NOISE_TOPICS: [&str; 6] = ["none", "anything", "commands", "history", "recent", "all"];

const DAY_NAMES: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

pub struct HistoryTalent;

#[async_trait]
impl Talent for HistoryTalent {
    fn descriptor(&self) -> TalentDescriptor {
        TalentDescriptor::new(
            "history",
            "Search past commands and responses from the interaction log",
        )
        .with_priority(43)
        .with_keywords([
            "what did i ask",
            "did i ever ask",
            "did i ask",
            "command history",
            "show my history",
            "show me my commands",
            "when did i ask",
            "last time i asked",
            "what have i asked",
            "past commands",
            "history search",
            "what commands did i",
        ])
    }

    async fn execute(
        &self,
        command: &str,
        ctx: &TalentContext,
    ) -> Result<TalentOutcome, ValetError> {
        let topic = extract_topic(command, ctx).await;
        let (start_ts, end_ts) = parse_date_range(command, Utc::now());

        let cmd = command.to_lowercase();
        let success = if ["failed", "failure", "didn't work", "did not work"]
            .iter()
            .any(|w| cmd.contains(w))
        {
            Some(false)
        } else if ["successful", "worked", "succeeded"]
            .iter()
            .any(|w| cmd.contains(w))
        {
            Some(true)
        } else {
            None
        };

        let limit = if ["all", "every", "everything"].iter().any(|w| cmd.contains(w)) {
            30
        } else {
            10
        };

        let query = TurnQuery {
            keyword: topic.clone(),
            start_ts: start_ts.clone(),
            end_ts,
            success,
            limit,
        };
        let turns = match ctx.memory.search_turns(&query).await {
            Ok(turns) => turns,
            Err(e) => {
                warn!(error = %e, "history search failed");
                return Ok(TalentOutcome::failed(
                    "I couldn't search the command history just now.",
                ));
            }
        };

        Ok(TalentOutcome::ok(format_results(
            &turns,
            topic.as_deref(),
            start_ts.is_some(),
        )))
    }
}

/// Extracts an optional search topic from the command with a short
/// deterministic LLM call. Noise answers, over-long answers, and LLM
/// failures all mean "search without a keyword".
async fn extract_topic(command: &str, ctx: &TalentContext) -> Option<String> {
    let prompt = format!(
        "Extract the search topic or keyword from this command. Reply with \
         only the topic itself, nothing else. If there is no specific topic, \
         reply none.\n\nCommand: {command}\n\nTopic:"
    );
    let request = GenerateRequest::extraction(prompt, ctx.config.llm.extraction_max_tokens);

    let answer = match ctx.llm.generate(request).await {
        Ok(text) => text,
        Err(e) => {
            debug!(error = %e, "topic extraction failed; searching without keyword");
            return None;
        }
    };

    let topic = answer
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches(|c| c == '"' || c == '\'')
        .trim()
        .to_string();
    if topic.is_empty() || topic.len() > 30 {
        return None;
    }
    if NOISE_TOPICS.contains(&topic.to_lowercase().as_str()) {
        return None;
    }
    Some(topic)
}

/// Maps natural-language date references to an inclusive RFC 3339 range.
///
/// Handles today, yesterday, this/past week, last week, this month, and
/// "last monday" through "last sunday". Returns (None, None) when the
/// command names no date.
fn parse_date_range(
    command: &str,
    now: DateTime<Utc>,
) -> (Option<String>, Option<String>) {
    let cmd = command.to_lowercase();

    if cmd.contains("today") {
        return (Some(to_ts(start_of_day(now))), Some(to_ts(now)));
    }

    if cmd.contains("yesterday") {
        let y = now - Duration::days(1);
        return (Some(to_ts(start_of_day(y))), Some(to_ts(end_of_day(y))));
    }

    if cmd.contains("this week") || cmd.contains("past week") {
        return (Some(to_ts(now - Duration::days(7))), Some(to_ts(now)));
    }

    if cmd.contains("last week") {
        return (
            Some(to_ts(now - Duration::days(14))),
            Some(to_ts(now - Duration::days(7))),
        );
    }

    if cmd.contains("this month") {
        if let Some(first) = now.date_naive().with_day(1) {
            let start = Utc.from_utc_datetime(&first.and_time(NaiveTime::MIN));
            return (Some(to_ts(start)), Some(to_ts(now)));
        }
    }

    for (i, day) in DAY_NAMES.iter().enumerate() {
        if cmd.contains(&format!("last {day}")) {
            let offset = i64::from(now.weekday().num_days_from_monday());
            let mut delta = (offset - i as i64).rem_euclid(7);
            if delta == 0 {
                delta = 7;
            }
            let d = now - Duration::days(delta);
            return (Some(to_ts(start_of_day(d))), Some(to_ts(end_of_day(d))));
        }
    }

    (None, None)
}

fn start_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    Utc.from_utc_datetime(&ts.date_naive().and_time(NaiveTime::MIN))
}

fn end_of_day(ts: DateTime<Utc>) -> DateTime<Utc> {
    start_of_day(ts) + Duration::seconds(86_399)
}

fn to_ts(ts: DateTime<Utc>) -> String {
    ts.to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn format_results(turns: &[Turn], topic: Option<&str>, date_bounded: bool) -> String {
    if turns.is_empty() {
        let mut msg = String::from("No matching commands found");
        if let Some(topic) = topic {
            msg.push_str(&format!(" for '{topic}'"));
        }
        if date_bounded {
            msg.push_str(" in that time range");
        }
        msg.push('.');
        return msg;
    }

    let mut header = format!("Found {} command(s)", turns.len());
    if let Some(topic) = topic {
        header.push_str(&format!(", matching '{topic}'"));
    }

    let mut lines = vec![format!("{header}:\n")];
    for turn in turns {
        let status = if turn.success { "✓" } else { "✗" };
        lines.push(format!(
            "  {status} {} — {}",
            compact_ts(&turn.created_at),
            clip(&turn.command, 80)
        ));
    }
    lines.join("\n")
}

/// "2026-08-26T14:03:22.123Z" becomes "2026-08-26 14:03".
fn compact_ts(ts: &str) -> String {
    ts.get(..16).unwrap_or(ts).replace('T', " ")
}

fn clip(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        let clipped: String = text.chars().take(max_chars).collect();
        format!("{clipped}…")
    }
}
