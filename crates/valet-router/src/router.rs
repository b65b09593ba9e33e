// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Deterministic talent selection.
//!
//! Selection is a pure function of (command, registry, rules): enabled
//! rules are consulted first, then descriptors in descending priority with
//! exclusions checked before keywords, then the conversation fallback.
//! It never executes a talent and has no side effects beyond logging.

use tracing::debug;

use valet_core::types::Rule;
use valet_core::{normalize_signature, FALLBACK_TALENT};

use crate::registry::TalentRegistry;

/// Why a talent was selected.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteReason {
    /// A persisted rule prescribed the talent.
    RuleOverride { rule_id: i64 },
    /// A descriptor keyword matched the command.
    KeywordMatch,
    /// Nothing matched; the conversation talent takes it.
    Fallback,
}

impl std::fmt::Display for RouteReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RouteReason::RuleOverride { rule_id } => write!(f, "rule #{rule_id}"),
            RouteReason::KeywordMatch => write!(f, "keyword match"),
            RouteReason::Fallback => write!(f, "fallback"),
        }
    }
}

/// Outcome of one selection pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteDecision {
    /// Name of the selected talent.
    pub talent: String,
    pub reason: RouteReason,
}

/// The selection algorithm. Stateless; all inputs are passed per call.
pub struct Router;

impl Router {
    /// Selects a talent for `command`.
    ///
    /// Order of consideration:
    /// 1. Enabled rules whose normalized trigger equals or is contained in
    ///    the normalized command, provided the prescribed talent exists and
    ///    is enabled
    /// 2. Enabled descriptors in descending priority (registration order on
    ///    ties); a descriptor whose exclusion set matches the command is
    ///    dropped before its own keywords are consulted
    /// 3. The conversation fallback, which always accepts
    pub fn select(command: &str, registry: &TalentRegistry, rules: &[Rule]) -> RouteDecision {
        let normalized = normalize_signature(command);

        for rule in rules.iter().filter(|r| r.enabled) {
            let trigger = normalize_signature(&rule.trigger);
            if trigger.is_empty() {
                continue;
            }
            if normalized == trigger || normalized.contains(&trigger) {
                match registry.get(&rule.talent) {
                    Some(d) if d.enabled => {
                        debug!(talent = %rule.talent, rule_id = rule.id, "rule override");
                        return RouteDecision {
                            talent: rule.talent.clone(),
                            reason: RouteReason::RuleOverride { rule_id: rule.id },
                        };
                    }
                    _ => {
                        debug!(
                            talent = %rule.talent,
                            rule_id = rule.id,
                            "rule prescribes an unavailable talent, skipping"
                        );
                    }
                }
            }
        }

        let lower = command.to_lowercase();
        for descriptor in registry.candidates() {
            if !descriptor.enabled {
                continue;
            }
            // Exclusions claim negative territory ahead of keywords.
            if matches_any(&lower, &descriptor.exclusions) {
                continue;
            }
            if matches_any(&lower, &descriptor.keywords) {
                debug!(talent = %descriptor.name, "keyword match");
                return RouteDecision {
                    talent: descriptor.name.clone(),
                    reason: RouteReason::KeywordMatch,
                };
            }
        }

        debug!(talent = FALLBACK_TALENT, "no candidate matched, falling back");
        RouteDecision {
            talent: FALLBACK_TALENT.to_string(),
            reason: RouteReason::Fallback,
        }
    }
}

/// Case-insensitive substring match of any pattern in the command.
fn matches_any(command_lower: &str, patterns: &[String]) -> bool {
    patterns
        .iter()
        .any(|p| !p.is_empty() && command_lower.contains(&p.to_lowercase()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use valet_core::types::TalentDescriptor;

    fn weather_news_registry() -> TalentRegistry {
        let mut registry = TalentRegistry::new();
        registry
            .register(
                TalentDescriptor::new("weather", "forecasts")
                    .with_priority(75)
                    .with_keywords(["weather", "forecast"]),
            )
            .unwrap();
        registry
            .register(
                TalentDescriptor::new("news", "headlines")
                    .with_priority(80)
                    .with_keywords(["news", "headlines"]),
            )
            .unwrap();
        registry
            .register(TalentDescriptor::new(FALLBACK_TALENT, "general chat"))
            .unwrap();
        registry
    }

    fn make_rule(id: i64, trigger: &str, talent: &str, enabled: bool) -> Rule {
        Rule {
            id,
            trigger: trigger.to_string(),
            talent: talent.to_string(),
            source_signature: None,
            enabled,
            created_at: "2026-01-01T00:00:00.000Z".to_string(),
        }
    }

    #[test]
    fn keyword_beats_higher_priority_non_match() {
        let registry = weather_news_registry();
        let decision = Router::select("what's the weather", &registry, &[]);
        assert_eq!(decision.talent, "weather");
        assert_eq!(decision.reason, RouteReason::KeywordMatch);
    }

    #[test]
    fn selection_is_deterministic() {
        let registry = weather_news_registry();
        let first = Router::select("any news today?", &registry, &[]);
        let second = Router::select("any news today?", &registry, &[]);
        assert_eq!(first, second);
        assert_eq!(first.talent, "news");
    }

    #[test]
    fn exclusion_checked_before_keywords() {
        let mut registry = TalentRegistry::new();
        registry
            .register(
                TalentDescriptor::new("alerts", "severe weather alerts")
                    .with_priority(90)
                    .with_keywords(["weather", "alert"])
                    .with_exclusions(["forecast"]),
            )
            .unwrap();
        registry
            .register(
                TalentDescriptor::new("weather", "forecasts")
                    .with_priority(50)
                    .with_keywords(["weather", "forecast"]),
            )
            .unwrap();

        // "weather" matches both, but the exclusion removes the
        // higher-priority talent before its keywords are consulted.
        let decision = Router::select("weather forecast for tomorrow", &registry, &[]);
        assert_eq!(decision.talent, "weather");
    }

    #[test]
    fn rule_override_wins_over_keywords() {
        let registry = weather_news_registry();
        let rules = vec![make_rule(7, "what's the weather", "news", true)];
        let decision = Router::select("what's the weather", &registry, &rules);
        assert_eq!(decision.talent, "news");
        assert_eq!(decision.reason, RouteReason::RuleOverride { rule_id: 7 });
    }

    #[test]
    fn rule_trigger_contained_in_command_matches() {
        let registry = weather_news_registry();
        let rules = vec![make_rule(3, "kitchen lights", "news", true)];
        let decision = Router::select("please turn off the Kitchen Lights now", &registry, &rules);
        assert_eq!(decision.reason, RouteReason::RuleOverride { rule_id: 3 });
    }

    #[test]
    fn disabled_rule_is_ignored() {
        let registry = weather_news_registry();
        let rules = vec![make_rule(3, "what's the weather", "news", false)];
        let decision = Router::select("what's the weather", &registry, &rules);
        assert_eq!(decision.talent, "weather");
        assert_eq!(decision.reason, RouteReason::KeywordMatch);
    }

    #[test]
    fn rule_for_unavailable_talent_is_skipped() {
        let mut registry = weather_news_registry();
        let rules = vec![
            make_rule(1, "what's the weather", "missing", true),
            make_rule(2, "what's the weather", "news", true),
        ];
        let decision = Router::select("what's the weather", &registry, &rules);
        assert_eq!(decision.reason, RouteReason::RuleOverride { rule_id: 2 });

        registry.set_enabled("news", false).unwrap();
        let decision = Router::select("what's the weather", &registry, &rules);
        assert_eq!(decision.talent, "weather");
        assert_eq!(decision.reason, RouteReason::KeywordMatch);
    }

    #[test]
    fn empty_rule_trigger_never_matches() {
        let registry = weather_news_registry();
        let rules = vec![make_rule(4, "  !!  ", "news", true)];
        let decision = Router::select("what's the weather", &registry, &rules);
        assert_eq!(decision.talent, "weather");
    }

    #[test]
    fn disabled_talent_is_skipped() {
        let mut registry = weather_news_registry();
        registry.set_enabled("weather", false).unwrap();
        let decision = Router::select("what's the weather", &registry, &[]);
        assert_eq!(decision.talent, FALLBACK_TALENT);
        assert_eq!(decision.reason, RouteReason::Fallback);
    }

    #[test]
    fn unmatched_command_falls_back() {
        let registry = weather_news_registry();
        let decision = Router::select("tell me a joke", &registry, &[]);
        assert_eq!(decision.talent, FALLBACK_TALENT);
        assert_eq!(decision.reason, RouteReason::Fallback);
    }

    #[test]
    fn registration_order_breaks_priority_ties() {
        let mut registry = TalentRegistry::new();
        registry
            .register(
                TalentDescriptor::new("lights_a", "first lights talent")
                    .with_keywords(["lights"]),
            )
            .unwrap();
        registry
            .register(
                TalentDescriptor::new("lights_b", "second lights talent")
                    .with_keywords(["lights"]),
            )
            .unwrap();

        let decision = Router::select("dim the lights", &registry, &[]);
        assert_eq!(decision.talent, "lights_a");
    }

    #[test]
    fn keyword_match_is_case_insensitive() {
        let registry = weather_news_registry();
        let decision = Router::select("WHAT IS THE WEATHER LIKE", &registry, &[]);
        assert_eq!(decision.talent, "weather");
    }
}
