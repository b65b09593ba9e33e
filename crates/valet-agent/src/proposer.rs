// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Promotion of recurring corrections into standing routing rules.
//!
//! Every correction-record update is evaluated against an exact
//! multiple-of-3 boundary. Crossing it yields a one-shot [`RuleProposal`];
//! between boundaries the user is never re-prompted. Acceptance is an
//! explicit call that materializes the rule idempotently and resets the
//! record's occurrence count so the next proposal needs three fresh
//! corrections.

use tracing::{debug, info};

use valet_core::{CorrectionRecord, RuleProposal, ValetError, normalize_signature};
use valet_storage::Database;
use valet_storage::queries::{corrections, rules};

/// Whether an occurrence count sits exactly on a proposal boundary.
///
/// Fires at 3, 6, 9… and never in between, so a declined proposal is not
/// repeated until the pattern has recurred three more times.
pub fn proposal_due(occurrence_count: i64) -> bool {
    occurrence_count != 0 && occurrence_count % 3 == 0
}

/// Evaluates correction records against the proposal boundary and
/// materializes accepted proposals as rules.
pub struct RuleProposer {
    db: Database,
}

impl RuleProposer {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Builds the proposal for a freshly updated correction record, or
    /// `None` when the count is off-boundary. Pure; nothing is stored.
    ///
    /// `talent` is the talent that handled the corrected command, which
    /// is what the rule would prescribe.
    pub fn evaluate(record: &CorrectionRecord, talent: &str) -> Option<RuleProposal> {
        if !proposal_due(record.occurrence_count) {
            return None;
        }
        debug!(
            signature = record.signature.as_str(),
            count = record.occurrence_count,
            "correction pattern crossed proposal boundary"
        );
        Some(RuleProposal {
            signature: record.signature.clone(),
            trigger: normalize_signature(&record.corrected_command),
            talent: talent.to_string(),
            occurrence_count: record.occurrence_count,
        })
    }

    /// Materializes an accepted proposal as a rule and resets the source
    /// record's occurrence count.
    ///
    /// Idempotent: if a rule promoted from the same signature already
    /// exists, no duplicate is created and the existing rule's id is
    /// returned (the count is still reset).
    pub async fn accept(&self, proposal: &RuleProposal) -> Result<i64, ValetError> {
        let rule_id = match rules::find_rule_by_source(&self.db, &proposal.signature).await? {
            Some(existing) => {
                debug!(
                    rule_id = existing.id,
                    signature = proposal.signature.as_str(),
                    "proposal already materialized"
                );
                existing.id
            }
            None => {
                let id = rules::insert_rule(
                    &self.db,
                    &proposal.trigger,
                    &proposal.talent,
                    Some(&proposal.signature),
                )
                .await?;
                info!(
                    rule_id = id,
                    trigger = proposal.trigger.as_str(),
                    talent = proposal.talent.as_str(),
                    "rule created from accepted proposal"
                );
                id
            }
        };

        corrections::reset_occurrence_count(&self.db, &proposal.signature).await?;
        Ok(rule_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use valet_core::now_rfc3339;

    fn record(count: i64) -> CorrectionRecord {
        CorrectionRecord {
            id: 1,
            signature: "turn off bedroom lights".into(),
            original_command: "turn off bedroom lights".into(),
            corrected_command: "Turn off KITCHEN lights!".into(),
            original_turn_id: None,
            corrected_turn_id: None,
            occurrence_count: count,
            created_at: now_rfc3339(),
            updated_at: now_rfc3339(),
        }
    }

    async fn open_db() -> (Database, tempfile::TempDir) {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[test]
    fn boundary_is_exact_multiples_of_three() {
        let due: Vec<i64> = (0..=9).filter(|&n| proposal_due(n)).collect();
        assert_eq!(due, vec![3, 6, 9]);
    }

    #[test]
    fn evaluate_normalizes_the_trigger() {
        let proposal = RuleProposer::evaluate(&record(3), "hue_lights").unwrap();
        assert_eq!(proposal.trigger, "turn off kitchen lights");
        assert_eq!(proposal.talent, "hue_lights");
        assert_eq!(proposal.occurrence_count, 3);
    }

    #[test]
    fn evaluate_is_quiet_between_boundaries() {
        for count in [1, 2, 4, 5, 7, 8] {
            assert!(RuleProposer::evaluate(&record(count), "hue_lights").is_none());
        }
    }

    #[tokio::test]
    async fn accept_creates_rule_and_resets_count() {
        let (db, _dir) = open_db().await;
        let proposer = RuleProposer::new(db.clone());

        for _ in 0..3 {
            corrections::record_correction(
                &db,
                "turn off bedroom lights",
                "turn off bedroom lights",
                "turn off kitchen lights",
                None,
                None,
            )
            .await
            .unwrap();
        }

        let stored = corrections::get_correction(&db, "turn off bedroom lights")
            .await
            .unwrap()
            .unwrap();
        let proposal = RuleProposer::evaluate(&stored, "hue_lights").unwrap();

        let rule_id = proposer.accept(&proposal).await.unwrap();
        let rules = rules::list_rules(&db).await.unwrap();
        assert_eq!(rules.len(), 1);
        assert_eq!(rules[0].id, rule_id);
        assert_eq!(rules[0].trigger, "turn off kitchen lights");
        assert_eq!(
            rules[0].source_signature.as_deref(),
            Some("turn off bedroom lights")
        );

        let after = corrections::get_correction(&db, "turn off bedroom lights")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(after.occurrence_count, 0);
    }

    #[tokio::test]
    async fn accept_twice_creates_no_duplicate() {
        let (db, _dir) = open_db().await;
        let proposer = RuleProposer::new(db.clone());

        corrections::record_correction(
            &db,
            "turn off bedroom lights",
            "turn off bedroom lights",
            "turn off kitchen lights",
            None,
            None,
        )
        .await
        .unwrap();

        let proposal = RuleProposal {
            signature: "turn off bedroom lights".into(),
            trigger: "turn off kitchen lights".into(),
            talent: "hue_lights".into(),
            occurrence_count: 3,
        };

        let first = proposer.accept(&proposal).await.unwrap();
        let second = proposer.accept(&proposal).await.unwrap();
        assert_eq!(first, second);
        assert_eq!(rules::list_rules(&db).await.unwrap().len(), 1);
    }
}
