// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! The command pipeline.
//!
//! [`Orchestrator::handle`] takes one raw command through the full turn:
//! correction detection against the previous turn, correction-hint lookup,
//! deterministic routing, context assembly, talent execution, persistence,
//! correction bookkeeping with rule proposals, and the buffer append that
//! may kick off background consolidation. Commands are processed one at a
//! time; consolidation is the only work that runs concurrently with the
//! pipeline.

use std::sync::Arc;

use tokio::task::JoinHandle;
use tracing::{info, warn};

use valet_config::ValetConfig;
use valet_core::{
    Command, CommandOutcome, CorrectionRecord, FALLBACK_TALENT, LlmAdapter, MemoryAccess, Notifier,
    RuleProposal, TalentOutcome, TrainingPair, TrainingSink, TrainingSource, Turn, ValetError,
};
use valet_memory::{Consolidator, TurnBuffer};
use valet_router::{Router, TalentRegistry};
use valet_storage::Database;
use valet_storage::queries::{corrections, rules, turns};
use valet_talent::{TalentContext, TalentSet};

use crate::context::build_memory_context;
use crate::correction::CorrectionEngine;
use crate::proposer::RuleProposer;

/// Response used when a talent returns an infrastructure error instead of
/// phrasing its own failure.
const EXECUTION_FAILED_RESPONSE: &str =
    "I couldn't do that because something went wrong on my end.";

/// Coordinates one command at a time through detection, routing, execution,
/// and memory.
pub struct Orchestrator {
    config: Arc<ValetConfig>,
    db: Database,
    llm: Arc<dyn LlmAdapter>,
    memory: Arc<dyn MemoryAccess>,
    talents: TalentSet,
    registry: TalentRegistry,
    correction: CorrectionEngine,
    proposer: RuleProposer,
    notifier: Arc<dyn Notifier>,
    training: Arc<dyn TrainingSink>,
    buffer: Arc<tokio::sync::Mutex<TurnBuffer>>,
    consolidator: Arc<Consolidator>,
    session_id: String,
    /// Serializes `handle` so turns cannot interleave.
    pipeline: tokio::sync::Mutex<()>,
    /// Most recent background consolidation task, if any.
    consolidation: tokio::sync::Mutex<Option<JoinHandle<()>>>,
}

impl Orchestrator {
    /// Builds the pipeline around an already-assembled talent set.
    ///
    /// The routing registry is seeded from the set's effective descriptors,
    /// so configuration overrides applied at registration are what the
    /// router sees.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        config: Arc<ValetConfig>,
        db: Database,
        llm: Arc<dyn LlmAdapter>,
        memory: Arc<dyn MemoryAccess>,
        consolidator: Arc<Consolidator>,
        talents: TalentSet,
        notifier: Arc<dyn Notifier>,
        training: Arc<dyn TrainingSink>,
    ) -> Result<Self, ValetError> {
        let mut registry = TalentRegistry::new();
        for descriptor in talents.descriptors() {
            registry.register(descriptor.clone())?;
        }

        let correction = CorrectionEngine::new(llm.clone(), config.llm.extraction_max_tokens);
        let proposer = RuleProposer::new(db.clone());
        let buffer = Arc::new(tokio::sync::Mutex::new(TurnBuffer::new(
            config.memory.buffer_capacity,
        )));
        let session_id = uuid::Uuid::new_v4().to_string();

        info!(
            agent_name = config.agent.name.as_str(),
            session_id = session_id.as_str(),
            talents = talents.len(),
            "orchestrator initialized"
        );

        Ok(Self {
            config,
            db,
            llm,
            memory,
            talents,
            registry,
            correction,
            proposer,
            notifier,
            training,
            buffer,
            consolidator,
            session_id,
            pipeline: tokio::sync::Mutex::new(()),
            consolidation: tokio::sync::Mutex::new(None),
        })
    }

    /// Processes one command end to end and returns what to show the user.
    ///
    /// A detected correction substitutes the merged intent for the raw
    /// text and re-dispatches it at depth 1; everything downstream sees
    /// only the effective command. Persistence failures degrade to warnings
    /// so the user still gets their response.
    pub async fn handle(&self, command: Command) -> Result<CommandOutcome, ValetError> {
        let _turn_guard = self.pipeline.lock().await;

        let previous = self.buffer.lock().await.recent(1).pop();

        // Correction detection runs against the immediately preceding turn,
        // before routing, and never against a substituted command.
        let mut corrected_from: Option<Turn> = None;
        let mut effective = command;
        if let Some(prev) = previous {
            let decision = self.correction.detect(&effective.text, &prev).await;
            if decision.is_correction
                && let Some(intent) = decision.corrected_intent
            {
                info!(
                    original = prev.command.as_str(),
                    corrected = intent.as_str(),
                    "correction detected, re-dispatching corrected command"
                );
                effective = Command::new(intent, effective.channel);
                corrected_from = Some(prev);
            }
        }
        let depth: u8 = if corrected_from.is_some() { 1 } else { 0 };

        // A repeat of a previously corrected command gets the stored intent
        // as a hint. The correction turn itself already is the intent.
        let correction_hint = if corrected_from.is_none() {
            self.lookup_hint(&effective).await
        } else {
            None
        };

        let rules = match rules::list_enabled_rules(&self.db).await {
            Ok(rules) => rules,
            Err(e) => {
                warn!(error = %e, "rule lookup failed, routing without rules");
                Vec::new()
            }
        };
        let decision = Router::select(&effective.text, &self.registry, &rules);
        info!(
            talent = decision.talent.as_str(),
            reason = %decision.reason,
            "command routed"
        );

        let talent = match self.talents.get(&decision.talent) {
            Some(talent) => talent,
            None => {
                // Registry and set are seeded together, so this only happens
                // if a rule named a talent that later lost its executable.
                warn!(
                    talent = decision.talent.as_str(),
                    "selected talent has no executable, using fallback"
                );
                self.talents
                    .get(FALLBACK_TALENT)
                    .ok_or_else(|| ValetError::TalentNotFound {
                        name: decision.talent.clone(),
                    })?
            }
        };
        let talent_name = talent.descriptor().name;

        let recent = self
            .buffer
            .lock()
            .await
            .recent(self.config.agent.context_turns);
        let memory_context =
            build_memory_context(self.memory.as_ref(), &recent, &effective.text).await;

        let ctx = TalentContext {
            llm: self.llm.clone(),
            memory: self.memory.clone(),
            memory_context,
            correction_hint,
            config: self.config.clone(),
            notifier: self.notifier.clone(),
            training: self.training.clone(),
            depth,
        };

        let outcome = match talent.execute(&effective.text, &ctx).await {
            Ok(outcome) => outcome,
            Err(e) => {
                warn!(talent = talent_name.as_str(), error = %e, "talent execution failed");
                TalentOutcome::failed(EXECUTION_FAILED_RESPONSE)
            }
        };

        let turn = Turn::new(&self.session_id, &effective, &talent_name, &outcome);
        self.persist_turn(&turn).await;

        let mut proposal = None;
        if let Some(prev) = &corrected_from {
            proposal = self.record_correction(prev, &turn, &talent_name).await;
        }

        self.append_turn(turn).await;

        Ok(CommandOutcome {
            response: outcome.response,
            talent: talent_name,
            success: outcome.success,
            corrected_from: corrected_from.map(|t| t.command),
            proposal,
        })
    }

    /// Persists a correction accepted by the user as a standing rule.
    pub async fn accept_proposal(&self, proposal: &RuleProposal) -> Result<i64, ValetError> {
        self.proposer.accept(proposal).await
    }

    /// Waits for an in-flight background consolidation, if any. Tests and
    /// shutdown use this; the pipeline itself never blocks on it.
    pub async fn wait_for_consolidation(&self) {
        let handle = self.consolidation.lock().await.take();
        if let Some(handle) = handle
            && let Err(e) = handle.await
        {
            warn!(error = %e, "consolidation task panicked");
        }
    }

    /// Flushes background work before the process exits.
    pub async fn shutdown(&self) {
        self.wait_for_consolidation().await;
        info!("orchestrator stopped");
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    /// The talent set, for surfaces that list capabilities.
    pub fn talents(&self) -> &TalentSet {
        &self.talents
    }

    /// Stored corrected intent for a repeat of a known-bad command.
    async fn lookup_hint(&self, command: &Command) -> Option<String> {
        match corrections::get_correction(&self.db, &command.signature()).await {
            Ok(Some(record)) => Some(record.corrected_command),
            Ok(None) => None,
            Err(e) => {
                warn!(error = %e, "correction lookup failed, continuing without hint");
                None
            }
        }
    }

    /// Inserts the turn, retrying once. History is advisory, so persistent
    /// failure downgrades to a warning rather than failing the command.
    async fn persist_turn(&self, turn: &Turn) {
        for attempt in 1..=2u8 {
            match turns::insert_turn(&self.db, turn).await {
                Ok(()) => return,
                Err(e) if attempt == 1 => {
                    warn!(error = %e, "turn insert failed, retrying once");
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        turn_id = turn.id.as_str(),
                        "turn insert failed again, continuing without persistence"
                    );
                }
            }
        }
    }

    /// Records the correction keyed by the original command's signature,
    /// harvests a training pair when the re-execution succeeded, and
    /// evaluates the rule-proposal boundary.
    async fn record_correction(
        &self,
        prev: &Turn,
        turn: &Turn,
        talent_name: &str,
    ) -> Option<RuleProposal> {
        let record = match corrections::record_correction(
            &self.db,
            &prev.signature(),
            &prev.command,
            &turn.command,
            Some(&prev.id),
            Some(&turn.id),
        )
        .await
        {
            Ok(record) => record,
            Err(e) => {
                warn!(error = %e, "failed to record correction");
                return None;
            }
        };
        info!(
            signature = record.signature.as_str(),
            occurrences = record.occurrence_count,
            "correction recorded"
        );

        // The pair maps the command as originally given to the response the
        // user actually wanted; a failed re-execution teaches nothing.
        if turn.success {
            let pair = TrainingPair {
                instruction: prev.command.clone(),
                output: turn.response.clone(),
                source: TrainingSource::Correction,
            };
            if let Err(e) = self.training.record(&pair).await {
                warn!(error = %e, "failed to harvest correction training pair");
            }
        }

        let proposal = RuleProposer::evaluate(&record, talent_name);
        if let Some(p) = &proposal {
            self.notifier.notify(&render_proposal(&record, p)).await;
        }
        proposal
    }

    /// Appends the turn and, on overflow, spawns consolidation of the
    /// marked batch. The batch is only evicted once its long-term entry is
    /// persisted; a failed consolidation aborts the eviction and the next
    /// append retries it.
    async fn append_turn(&self, turn: Turn) {
        let batch = self.buffer.lock().await.append(turn);
        let Some(batch) = batch else {
            return;
        };

        info!(
            batch_id = batch.id,
            turns = batch.turns.len(),
            "buffer over capacity, consolidating oldest turns"
        );
        let consolidator = self.consolidator.clone();
        let buffer = self.buffer.clone();
        let handle = tokio::spawn(async move {
            match consolidator.consolidate(&batch.turns).await {
                Ok(entry_id) => {
                    buffer.lock().await.commit_eviction(batch.id);
                    info!(entry_id, batch_id = batch.id, "consolidation committed");
                }
                Err(e) => {
                    warn!(
                        error = %e,
                        batch_id = batch.id,
                        "consolidation failed, keeping turns buffered"
                    );
                    buffer.lock().await.abort_eviction(batch.id);
                }
            }
        });
        *self.consolidation.lock().await = Some(handle);
    }
}

/// Human-readable proposal notification. The interactive surface follows
/// it with its own accept prompt.
fn render_proposal(record: &CorrectionRecord, proposal: &RuleProposal) -> String {
    format!(
        "You've corrected \"{}\" to \"{}\" {} times now. Want me to always route \"{}\" straight to {}?",
        record.original_command,
        record.corrected_command,
        proposal.occurrence_count,
        proposal.trigger,
        proposal.talent
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use valet_core::{CommandChannel, EmbeddingAdapter, normalize_signature, now_rfc3339};
    use valet_memory::MemoryService;
    use valet_talent::Talent;
    use valet_talent::builtin::ConversationTalent;
    use valet_test_utils::{
        MockEmbedder, MockLlm, RecordingNotifier, RecordingSink, ScriptedTalent,
    };

    struct Harness {
        orchestrator: Orchestrator,
        llm: Arc<MockLlm>,
        notifier: Arc<RecordingNotifier>,
        training: Arc<RecordingSink>,
        store: Arc<valet_memory::LtmStore>,
        db: Database,
        _dir: tempfile::TempDir,
    }

    async fn harness(
        capacity: usize,
        llm: Arc<MockLlm>,
        talents: Vec<Arc<dyn Talent>>,
    ) -> Harness {
        let dir = tempfile::TempDir::new().unwrap();
        let db_path = dir.path().join("valet.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();

        let mut config = ValetConfig::default();
        config.memory.buffer_capacity = capacity;
        let config = Arc::new(config);

        let embedder: Arc<dyn EmbeddingAdapter> = Arc::new(MockEmbedder::new());
        let memory = Arc::new(MemoryService::new(
            db.clone(),
            embedder.clone(),
            config.memory.clone(),
        ));
        let store = memory.store();
        let consolidator = Arc::new(Consolidator::new(
            store.clone(),
            llm.clone() as Arc<dyn LlmAdapter>,
            embedder,
            config.memory.clone(),
        ));

        let mut set = TalentSet::new(&config.talents);
        for talent in talents {
            set.register(talent).unwrap();
        }

        let notifier = Arc::new(RecordingNotifier::new());
        let training = Arc::new(RecordingSink::new());
        let orchestrator = Orchestrator::new(
            config,
            db.clone(),
            llm.clone() as Arc<dyn LlmAdapter>,
            memory as Arc<dyn MemoryAccess>,
            consolidator,
            set,
            notifier.clone() as Arc<dyn Notifier>,
            training.clone() as Arc<dyn TrainingSink>,
        )
        .unwrap();

        Harness {
            orchestrator,
            llm,
            notifier,
            training,
            store,
            db,
            _dir: dir,
        }
    }

    fn lights_talent() -> Arc<ScriptedTalent> {
        Arc::new(ScriptedTalent::new(
            valet_core::TalentDescriptor::new("hue_lights", "Controls the lights")
                .with_priority(70)
                .with_keywords(["lights", "lamp"]),
            "Done.",
        ))
    }

    fn echo_talent() -> Arc<ScriptedTalent> {
        Arc::new(ScriptedTalent::new(
            valet_core::TalentDescriptor::new("echo", "Repeats things")
                .with_keywords(["say"]),
            "ok",
        ))
    }

    #[tokio::test]
    async fn routes_executes_and_persists_a_turn() {
        let talent = lights_talent();
        let h = harness(5, Arc::new(MockLlm::new()), vec![talent.clone()]).await;

        let outcome = h
            .orchestrator
            .handle(Command::new("turn off the lights", CommandChannel::Text))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.talent, "hue_lights");
        assert_eq!(outcome.response, "Done.");
        assert!(outcome.corrected_from.is_none());
        assert!(outcome.proposal.is_none());
        assert_eq!(talent.commands(), vec!["turn off the lights"]);

        let persisted = turns::recent_turns(&h.db, 10).await.unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].command, "turn off the lights");
        assert_eq!(persisted[0].talent, "hue_lights");
        assert!(persisted[0].success);
        assert_eq!(persisted[0].session_id, h.orchestrator.session_id());

        // First turn of a session: no previous turn to correct, no memory
        // entries to recall, so the LLM is never consulted.
        assert!(h.llm.requests().is_empty());
    }

    #[tokio::test]
    async fn correction_reexecutes_with_merged_intent() {
        let talent = lights_talent();
        let llm = Arc::new(MockLlm::with_responses(["turn off kitchen lights"]));
        let h = harness(10, llm, vec![talent.clone()]).await;

        h.orchestrator
            .handle(Command::new("turn off bedroom lights", CommandChannel::Text))
            .await
            .unwrap();
        let outcome = h
            .orchestrator
            .handle(Command::new(
                "no, I meant the kitchen lights",
                CommandChannel::Text,
            ))
            .await
            .unwrap();

        assert!(outcome.success);
        assert_eq!(outcome.talent, "hue_lights");
        assert_eq!(
            outcome.corrected_from.as_deref(),
            Some("turn off bedroom lights")
        );
        assert_eq!(
            talent.commands(),
            vec!["turn off bedroom lights", "turn off kitchen lights"]
        );

        // The record is keyed by the original command, not the correction
        // utterance, and the turn trail links both executions.
        let record = corrections::get_correction(
            &h.db,
            &normalize_signature("turn off bedroom lights"),
        )
        .await
        .unwrap()
        .expect("correction should be recorded");
        assert_eq!(record.occurrence_count, 1);
        assert_eq!(record.corrected_command, "turn off kitchen lights");
        assert!(record.original_turn_id.is_some());
        assert!(record.corrected_turn_id.is_some());
        assert!(
            corrections::get_correction(
                &h.db,
                &normalize_signature("no, I meant the kitchen lights"),
            )
            .await
            .unwrap()
            .is_none()
        );

        // Both the original and the corrected execution are separate turns.
        assert_eq!(turns::count_turns(&h.db).await.unwrap(), 2);

        let pairs = h.training.pairs();
        assert_eq!(pairs.len(), 1);
        assert_eq!(pairs[0].instruction, "turn off bedroom lights");
        assert_eq!(pairs[0].output, "Done.");
        assert_eq!(pairs[0].source, TrainingSource::Correction);
    }

    async fn run_correction_cycle(h: &Harness) -> CommandOutcome {
        h.orchestrator
            .handle(Command::new("turn off bedroom lights", CommandChannel::Text))
            .await
            .unwrap();
        h.orchestrator
            .handle(Command::new(
                "no, I meant the kitchen lights",
                CommandChannel::Text,
            ))
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn proposal_fires_at_the_third_occurrence_only() {
        let llm = Arc::new(MockLlm::with_responses([
            "turn off kitchen lights",
            "turn off kitchen lights",
            "turn off kitchen lights",
        ]));
        let h = harness(20, llm, vec![lights_talent()]).await;

        let first = run_correction_cycle(&h).await;
        assert!(first.proposal.is_none());
        let second = run_correction_cycle(&h).await;
        assert!(second.proposal.is_none());
        assert!(h.notifier.messages().is_empty());

        let third = run_correction_cycle(&h).await;
        let proposal = third.proposal.expect("third occurrence should propose");
        assert_eq!(proposal.occurrence_count, 3);
        assert_eq!(proposal.trigger, "turn off kitchen lights");
        assert_eq!(proposal.talent, "hue_lights");
        assert_eq!(
            proposal.signature,
            normalize_signature("turn off bedroom lights")
        );

        let messages = h.notifier.messages();
        assert_eq!(messages.len(), 1);
        assert!(messages[0].contains("3 times"));
        assert!(messages[0].contains("turn off kitchen lights"));
        assert!(messages[0].contains("hue_lights"));
    }

    #[tokio::test]
    async fn accepted_proposal_becomes_a_rule_and_resets_the_count() {
        let llm = Arc::new(MockLlm::with_responses([
            "turn off kitchen lights",
            "turn off kitchen lights",
            "turn off kitchen lights",
        ]));
        let h = harness(20, llm, vec![lights_talent()]).await;

        run_correction_cycle(&h).await;
        run_correction_cycle(&h).await;
        let proposal = run_correction_cycle(&h).await.proposal.unwrap();

        let rule_id = h.orchestrator.accept_proposal(&proposal).await.unwrap();
        let stored = rules::list_rules(&h.db).await.unwrap();
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].id, rule_id);
        assert_eq!(stored[0].trigger, "turn off kitchen lights");
        assert_eq!(stored[0].talent, "hue_lights");

        let record = corrections::get_correction(&h.db, &proposal.signature)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(record.occurrence_count, 0);

        // Accepting again is a no-op against the same rule.
        let again = h.orchestrator.accept_proposal(&proposal).await.unwrap();
        assert_eq!(again, rule_id);
        assert_eq!(rules::list_rules(&h.db).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn failing_talent_records_a_failed_turn_and_pipeline_continues() {
        let broken = Arc::new(ScriptedTalent::failing(
            valet_core::TalentDescriptor::new("weather", "Forecasts")
                .with_keywords(["weather"]),
            "The weather service is missing an API key.",
        ));
        let h = harness(5, Arc::new(MockLlm::new()), vec![broken, echo_talent()]).await;

        let outcome = h
            .orchestrator
            .handle(Command::new("what's the weather", CommandChannel::Text))
            .await
            .unwrap();
        assert!(!outcome.success);
        assert_eq!(outcome.response, "The weather service is missing an API key.");

        let persisted = turns::recent_turns(&h.db, 10).await.unwrap();
        assert!(!persisted[0].success);

        let next = h
            .orchestrator
            .handle(Command::new("say hello", CommandChannel::Text))
            .await
            .unwrap();
        assert!(next.success);
        assert_eq!(next.talent, "echo");
    }

    #[tokio::test]
    async fn overflow_consolidates_in_the_background() {
        let llm = Arc::new(MockLlm::with_responses(["The user said one."]));
        let h = harness(2, llm, vec![echo_talent()]).await;

        for text in ["say one", "say two", "say three"] {
            h.orchestrator
                .handle(Command::new(text, CommandChannel::Text))
                .await
                .unwrap();
        }
        h.orchestrator.wait_for_consolidation().await;

        assert_eq!(h.store.count().await.unwrap(), 1);
        // The evicted turn is gone from the buffer; capacity turns remain.
        assert_eq!(h.orchestrator.buffer.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn failed_consolidation_keeps_turns_and_retries_on_next_overflow() {
        // No scripted responses: the first consolidation attempt fails.
        let llm = Arc::new(MockLlm::new());
        let h = harness(2, llm.clone(), vec![echo_talent()]).await;

        for text in ["say one", "say two", "say three"] {
            h.orchestrator
                .handle(Command::new(text, CommandChannel::Text))
                .await
                .unwrap();
        }
        h.orchestrator.wait_for_consolidation().await;
        assert_eq!(h.store.count().await.unwrap(), 0);
        assert_eq!(h.orchestrator.buffer.lock().await.len(), 3);

        // With the LLM back, the next overflow consolidates the grown batch.
        llm.push_response("The user counted to four.");
        h.orchestrator
            .handle(Command::new("say four", CommandChannel::Text))
            .await
            .unwrap();
        h.orchestrator.wait_for_consolidation().await;

        assert_eq!(h.store.count().await.unwrap(), 1);
        assert_eq!(h.orchestrator.buffer.lock().await.len(), 2);
    }

    #[tokio::test]
    async fn unclassifiable_reply_is_handled_as_a_new_command() {
        // "didn't" forces classification; the exhausted mock fails it, and
        // the pipeline falls open to normal routing.
        let h = harness(
            10,
            Arc::new(MockLlm::new()),
            vec![lights_talent(), Arc::new(ScriptedTalent::new(
                valet_core::TalentDescriptor::new(FALLBACK_TALENT, "General chat"),
                "Hmm, let me think.",
            ))],
        )
        .await;

        h.orchestrator
            .handle(Command::new("turn off bedroom lights", CommandChannel::Text))
            .await
            .unwrap();
        let outcome = h
            .orchestrator
            .handle(Command::new("that didn't work", CommandChannel::Text))
            .await
            .unwrap();

        assert_eq!(outcome.talent, FALLBACK_TALENT);
        assert!(outcome.corrected_from.is_none());
        assert!(
            corrections::get_correction(
                &h.db,
                &normalize_signature("turn off bedroom lights"),
            )
            .await
            .unwrap()
            .is_none()
        );
        assert!(h.training.pairs().is_empty());
        assert_eq!(turns::count_turns(&h.db).await.unwrap(), 2);
    }

    #[tokio::test]
    async fn stored_correction_becomes_a_hint_on_repeat() {
        let llm = Arc::new(MockLlm::with_responses(["Jazz coming right up."]));
        let h = harness(10, llm.clone(), vec![Arc::new(ConversationTalent)]).await;

        corrections::record_correction(
            &h.db,
            &normalize_signature("play some music"),
            "play some music",
            "play jazz on spotify",
            None,
            None,
        )
        .await
        .unwrap();

        let outcome = h
            .orchestrator
            .handle(Command::new("play some music", CommandChannel::Text))
            .await
            .unwrap();
        assert!(outcome.success);

        let requests = h.llm.requests();
        assert_eq!(requests.len(), 1);
        assert!(requests[0].prompt.contains(
            "(A similar command was previously corrected to: play jazz on spotify)"
        ));
    }

    #[test]
    fn proposal_message_names_the_pattern() {
        let record = CorrectionRecord {
            id: 1,
            signature: "turn off bedroom lights".into(),
            original_command: "turn off bedroom lights".into(),
            corrected_command: "turn off kitchen lights".into(),
            original_turn_id: None,
            corrected_turn_id: None,
            occurrence_count: 3,
            created_at: now_rfc3339(),
            updated_at: now_rfc3339(),
        };
        let proposal = RuleProposal {
            signature: "turn off bedroom lights".into(),
            trigger: "turn off kitchen lights".into(),
            talent: "hue_lights".into(),
            occurrence_count: 3,
        };

        let message = render_proposal(&record, &proposal);
        assert!(message.contains("\"turn off bedroom lights\""));
        assert!(message.contains("\"turn off kitchen lights\""));
        assert!(message.contains("3 times"));
        assert!(message.contains("hue_lights"));
    }
}
