// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Command orchestration for the Valet assistant.
//!
//! The [`Orchestrator`] is the coordinator that:
//! - Detects corrections against the previous turn and re-dispatches the
//!   merged intent
//! - Routes commands deterministically through rules and keywords
//! - Assembles memory context for talent prompts
//! - Records correction patterns and proposes standing rules at every
//!   third recurrence
//! - Buffers recent turns and consolidates overflow into long-term memory
//! - Harvests instruction/output training pairs as a side effect of use

pub mod context;
pub mod correction;
pub mod harvest;
pub mod orchestrator;
pub mod proposer;

pub use context::build_memory_context;
pub use correction::{CorrectionDecision, CorrectionEngine};
pub use harvest::{JsonlSink, NullSink, sink_from_config};
pub use orchestrator::Orchestrator;
pub use proposer::{RuleProposer, proposal_due};
