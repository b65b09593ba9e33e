// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Talent registry and command routing for the Valet assistant.
//!
//! This crate provides:
//! - [`TalentRegistry`]: descriptor storage with stable priority ordering
//! - [`Router`]: deterministic selection over rules, exclusions, keywords,
//!   and the conversation fallback
//!
//! Selection is pure: the same (command, registry, rules) triple always
//! yields the same decision, and nothing is executed during routing.

pub mod registry;
pub mod router;

pub use registry::TalentRegistry;
pub use router::{RouteDecision, RouteReason, Router};
