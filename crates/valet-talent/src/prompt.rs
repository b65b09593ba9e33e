// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Declarative talent backed by a manifest prompt template.

use async_trait::async_trait;
use tracing::warn;
use valet_core::{GenerateRequest, TalentDescriptor, TalentOutcome, ValetError};

use crate::manifest::{COMMAND_PLACEHOLDER, TalentManifest};
use crate::talent::{Talent, TalentContext};

/// A talent whose behavior is a single prompt template from a manifest.
///
/// Execution substitutes the command into the template, renders it through
/// the LLM, and returns the text. An LLM failure becomes a failed outcome
/// with a conversational message rather than an error.
#[derive(Debug)]
pub struct PromptTalent {
    manifest: TalentManifest,
}

impl PromptTalent {
    pub fn new(manifest: TalentManifest) -> Self {
        Self { manifest }
    }

    pub fn manifest(&self) -> &TalentManifest {
        &self.manifest
    }
}

#[async_trait]
impl Talent for PromptTalent {
    fn descriptor(&self) -> TalentDescriptor {
        TalentDescriptor {
            name: self.manifest.name.clone(),
            description: self.manifest.description.clone(),
            priority: self.manifest.priority,
            keywords: self.manifest.keywords.clone(),
            exclusions: self.manifest.exclusions.clone(),
            enabled: self.manifest.enabled,
        }
    }

    async fn execute(
        &self,
        command: &str,
        ctx: &TalentContext,
    ) -> Result<TalentOutcome, ValetError> {
        let mut prompt = self.manifest.template.replace(COMMAND_PLACEHOLDER, command);
        if let Some(hint) = &ctx.correction_hint {
            prompt = format!("(A similar command was previously corrected to: {hint})\n\n{prompt}");
        }

        let mut request = GenerateRequest::new(prompt);
        request.max_tokens = self
            .manifest
            .max_tokens
            .unwrap_or(ctx.config.llm.max_tokens);
        if let Some(system) = &self.manifest.system {
            request = request.with_system(system);
        }

        match ctx.llm.generate(request).await {
            Ok(text) => Ok(TalentOutcome::ok(text)),
            Err(e) => {
                warn!(talent = %self.manifest.name, error = %e, "prompt talent generation failed");
                Ok(TalentOutcome::failed(
                    "I couldn't do that because the language model didn't answer.",
                ))
            }
        }
    }
}
