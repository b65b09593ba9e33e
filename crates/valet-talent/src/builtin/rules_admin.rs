// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Rules talent: list, delete, and toggle standing routing rules.
//!
//! Rule *creation* happens through the correction engine's proposals; this
//! talent only manages what already exists. Rules are referenced by number:
//! "delete rule 3", "disable rule #2", "list my rules".

use std::sync::LazyLock;

use async_trait::async_trait;
use regex::Regex;
use tracing::warn;
use valet_core::{Rule, TalentDescriptor, TalentOutcome, ValetError};

use crate::talent::{Talent, TalentContext};

static RULE_INDEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?:rule|#)\s*(\d+)").unwrap());

const DELETE_PHRASES: [&str; 4] = ["delete", "remove", "cancel", "clear"];

pub struct RulesAdminTalent;

#[async_trait]
impl Talent for RulesAdminTalent {
    fn descriptor(&self) -> TalentDescriptor {
        TalentDescriptor::new("rules", "List, delete, and toggle standing routing rules")
            .with_priority(42)
            .with_keywords([
                "rules",
                "rule",
                "my rules",
                "list rules",
                "delete rule",
                "remove rule",
                "disable rule",
                "enable rule",
            ])
    }

    async fn execute(
        &self,
        command: &str,
        ctx: &TalentContext,
    ) -> Result<TalentOutcome, ValetError> {
        let cmd = command.to_lowercase();

        if DELETE_PHRASES.iter().any(|p| cmd.contains(p)) {
            return delete(&cmd, ctx).await;
        }
        // "disable" contains "enable", so it is checked first.
        if cmd.contains("disable") {
            return toggle(&cmd, ctx, false).await;
        }
        if cmd.contains("enable") {
            return toggle(&cmd, ctx, true).await;
        }
        list(ctx).await
    }
}

fn rule_index(command: &str) -> Option<i64> {
    RULE_INDEX
        .captures(command)
        .and_then(|caps| caps.get(1))
        .and_then(|m| m.as_str().parse().ok())
}

async fn list(ctx: &TalentContext) -> Result<TalentOutcome, ValetError> {
    let rules = match ctx.memory.list_rules().await {
        Ok(rules) => rules,
        Err(e) => return store_failure(e),
    };

    if rules.is_empty() {
        return Ok(TalentOutcome::ok(
            "You don't have any rules yet. When I notice the same correction \
             three times, I'll propose one.",
        )
        .with_action("rules_list"));
    }

    let mut lines = vec!["Here are your rules:\n".to_string()];
    for rule in &rules {
        lines.push(render_rule(rule));
    }
    Ok(TalentOutcome::ok(lines.join("\n"))
        .with_action(format!("rules_list ({} rules)", rules.len())))
}

fn render_rule(rule: &Rule) -> String {
    let status = if rule.enabled { "" } else { " (disabled)" };
    format!("  {}. \"{}\" → {}{status}", rule.id, rule.trigger, rule.talent)
}

async fn delete(cmd: &str, ctx: &TalentContext) -> Result<TalentOutcome, ValetError> {
    let Some(id) = rule_index(cmd) else {
        return Ok(TalentOutcome::failed(
            "Please tell me which rule number to delete. Try \"list my rules\" first.",
        ));
    };

    match ctx.memory.delete_rule(id).await {
        Ok(true) => Ok(TalentOutcome::ok(format!("Deleted rule #{id}."))
            .with_action(format!("rules_delete #{id}"))),
        Ok(false) => Ok(TalentOutcome::failed(format!("I couldn't find rule #{id}."))),
        Err(e) => store_failure(e),
    }
}

async fn toggle(
    cmd: &str,
    ctx: &TalentContext,
    enabled: bool,
) -> Result<TalentOutcome, ValetError> {
    let verb = if enabled { "enable" } else { "disable" };
    let Some(id) = rule_index(cmd) else {
        return Ok(TalentOutcome::failed(format!(
            "Please specify a rule number to {verb}. Try \"list my rules\" first."
        )));
    };

    match ctx.memory.set_rule_enabled(id, enabled).await {
        Ok(true) => {
            let done = if enabled { "Enabled" } else { "Disabled" };
            Ok(TalentOutcome::ok(format!("{done} rule #{id}."))
                .with_action(format!("rules_{verb} #{id}")))
        }
        Ok(false) => Ok(TalentOutcome::failed(format!("I couldn't find rule #{id}."))),
        Err(e) => store_failure(e),
    }
}

fn store_failure(e: ValetError) -> Result<TalentOutcome, ValetError> {
    warn!(error = %e, "rule store operation failed");
    Ok(TalentOutcome::failed(
        "I couldn't reach the rule store just now.",
    ))
}
