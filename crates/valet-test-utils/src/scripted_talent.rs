// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted talent fixture for router and pipeline tests.

use std::sync::Mutex;

use async_trait::async_trait;

use valet_core::{TalentDescriptor, TalentOutcome, ValetError};
use valet_talent::{Talent, TalentContext};

/// A talent with a fixed descriptor and a canned outcome.
///
/// Commands passed to `execute` are captured and retrievable via
/// [`commands`](ScriptedTalent::commands), so pipeline tests can assert
/// which talent ran and with what (possibly rewritten) command text.
pub struct ScriptedTalent {
    descriptor: TalentDescriptor,
    reply: String,
    succeed: bool,
    commands: Mutex<Vec<String>>,
}

impl ScriptedTalent {
    /// A talent whose every execution succeeds with the given reply.
    pub fn new(descriptor: TalentDescriptor, reply: impl Into<String>) -> Self {
        Self {
            descriptor,
            reply: reply.into(),
            succeed: true,
            commands: Mutex::new(Vec::new()),
        }
    }

    /// A talent whose every execution reports conversational failure.
    pub fn failing(descriptor: TalentDescriptor, reply: impl Into<String>) -> Self {
        Self {
            succeed: false,
            ..Self::new(descriptor, reply)
        }
    }

    /// Every command executed so far, in call order.
    pub fn commands(&self) -> Vec<String> {
        self.commands.lock().unwrap().clone()
    }
}

#[async_trait]
impl Talent for ScriptedTalent {
    fn descriptor(&self) -> TalentDescriptor {
        self.descriptor.clone()
    }

    async fn execute(
        &self,
        command: &str,
        _ctx: &TalentContext,
    ) -> Result<TalentOutcome, ValetError> {
        self.commands.lock().unwrap().push(command.to_string());
        if self.succeed {
            Ok(TalentOutcome::ok(self.reply.clone()))
        } else {
            Ok(TalentOutcome::failed(self.reply.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use crate::{MockLlm, talent_context};

    #[tokio::test]
    async fn records_executed_commands() {
        let talent = ScriptedTalent::new(
            TalentDescriptor::new("weather", "Weather lookups")
                .with_keywords(["weather", "forecast"]),
            "Sunny, 22 degrees.",
        );
        let ctx = talent_context(Arc::new(MockLlm::new()));

        let outcome = talent.execute("what's the weather", &ctx).await.unwrap();
        assert!(outcome.success);
        assert_eq!(outcome.response, "Sunny, 22 degrees.");
        assert_eq!(talent.commands(), vec!["what's the weather"]);
    }

    #[tokio::test]
    async fn failing_variant_reports_failure() {
        let talent = ScriptedTalent::failing(
            TalentDescriptor::new("hue_lights", "Light control"),
            "I couldn't reach the bridge.",
        );
        let ctx = talent_context(Arc::new(MockLlm::new()));

        let outcome = talent.execute("lights off", &ctx).await.unwrap();
        assert!(!outcome.success);
    }
}
