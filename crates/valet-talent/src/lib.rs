// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Talents for the Valet assistant.
//!
//! A talent is one pluggable command-handling capability: it declares
//! routing metadata (name, priority, keywords, exclusions) and an async
//! `execute`. This crate defines the [`Talent`] trait and its execution
//! context, the [`TalentSet`] that owns registered talents, the built-in
//! talents (conversation fallback, notes, history, rules), and the
//! declarative manifest loader that turns `*.toml` files into
//! [`PromptTalent`]s.

pub mod builtin;
pub mod loader;
pub mod manifest;
pub mod prompt;
pub mod talent;

pub use loader::load_manifest_dir;
pub use manifest::{COMMAND_PLACEHOLDER, TalentManifest, load_manifest, parse_manifest};
pub use prompt::PromptTalent;
pub use talent::{Talent, TalentContext, TalentSet};
