// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversational fallback talent.
//!
//! Selected whenever no other talent claims the command. Renders the
//! pre-fetched memory context, any correction hint, and the command into a
//! brief conversational prompt, and harvests the exchange as a training
//! pair (the sink applies its own length and duplicate filters).

use async_trait::async_trait;
use tracing::warn;
use valet_core::{
    FALLBACK_TALENT, GenerateRequest, TalentDescriptor, TalentOutcome, TrainingPair,
    TrainingSource, ValetError,
};

use crate::talent::{Talent, TalentContext};

const BRIEF_STYLE: &str = "Respond briefly and conversationally (2-3 sentences max).";

pub struct ConversationTalent;

#[async_trait]
impl Talent for ConversationTalent {
    fn descriptor(&self) -> TalentDescriptor {
        TalentDescriptor::new(
            FALLBACK_TALENT,
            "General conversation when no other talent claims the command",
        )
    }

    fn can_handle(&self, _command: &str) -> bool {
        true
    }

    async fn execute(
        &self,
        command: &str,
        ctx: &TalentContext,
    ) -> Result<TalentOutcome, ValetError> {
        let mut prompt = format!("{command}\n\n{BRIEF_STYLE}");
        if let Some(hint) = &ctx.correction_hint {
            prompt = format!("(A similar command was previously corrected to: {hint})\n\n{prompt}");
        }
        if !ctx.memory_context.is_empty() {
            prompt = format!("{}{}", ctx.memory_context, prompt);
        }

        let system = format!("You are {}, a concise local assistant.", ctx.config.agent.name);
        let mut request = GenerateRequest::new(prompt).with_system(system);
        request.max_tokens = ctx.config.llm.max_tokens;
        request.temperature = ctx.config.llm.temperature;

        let answer = match ctx.llm.generate(request).await {
            Ok(text) => text,
            Err(e) => {
                warn!(error = %e, "conversation generation failed");
                return Ok(TalentOutcome::failed(
                    "I couldn't do that because the language model didn't answer.",
                ));
            }
        };

        let pair = TrainingPair {
            instruction: command.to_string(),
            output: answer.clone(),
            source: TrainingSource::Conversation,
        };
        if let Err(e) = ctx.training.record(&pair).await {
            warn!(error = %e, "failed to record conversation training pair");
        }

        Ok(TalentOutcome::ok(answer))
    }
}
