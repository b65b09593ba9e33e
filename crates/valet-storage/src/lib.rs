// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! SQLite persistence for the Valet assistant.
//!
//! One WAL-mode database holds the full turn history, correction records,
//! and routing rules; all access goes through [`Database`], which funnels
//! writes onto tokio-rusqlite's single background thread and applies the
//! embedded migrations on open. Long-term memory rows live in the same
//! file but are managed by `valet-memory`.

pub mod database;
pub mod migrations;
pub mod models;
pub mod queries;

pub use database::Database;
pub use models::*;
