// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Built-in talents shipped with the assistant.

use std::sync::Arc;

use valet_core::ValetError;

use crate::talent::TalentSet;

pub mod conversation;
pub mod history;
pub mod notes;
pub mod rules_admin;

pub use conversation::ConversationTalent;
pub use history::HistoryTalent;
pub use notes::NotesTalent;
pub use rules_admin::RulesAdminTalent;

/// Registers the built-in talents in their standard order.
///
/// The conversation fallback goes first; the others are distinguished by
/// priority (notes 45, history 43, rules 42), so registration order only
/// matters against same-priority manifest talents registered later.
pub fn register_builtins(set: &mut TalentSet) -> Result<(), ValetError> {
    set.register(Arc::new(ConversationTalent))?;
    set.register(Arc::new(NotesTalent))?;
    set.register(Arc::new(HistoryTalent))?;
    set.register(Arc::new(RulesAdminTalent))?;
    Ok(())
}
