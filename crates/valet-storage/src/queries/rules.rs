// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Routing rule operations.

use rusqlite::params;
use valet_core::{now_rfc3339, ValetError};

use crate::database::Database;
use crate::models::Rule;

const RULE_COLUMNS: &str = "id, trigger_text, talent, source_signature, enabled, created_at";

fn row_to_rule(row: &rusqlite::Row) -> Result<Rule, rusqlite::Error> {
    Ok(Rule {
        id: row.get(0)?,
        trigger: row.get(1)?,
        talent: row.get(2)?,
        source_signature: row.get(3)?,
        enabled: row.get(4)?,
        created_at: row.get(5)?,
    })
}

/// Insert a new rule. Returns the auto-generated rule ID.
pub async fn insert_rule(
    db: &Database,
    trigger: &str,
    talent: &str,
    source_signature: Option<&str>,
) -> Result<i64, ValetError> {
    let trigger = trigger.to_string();
    let talent = talent.to_string();
    let source_signature = source_signature.map(|s| s.to_string());
    let now = now_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO rules (trigger_text, talent, source_signature, enabled, created_at)
                 VALUES (?1, ?2, ?3, 1, ?4)",
                params![trigger, talent, source_signature, now],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All rules, oldest first.
pub async fn list_rules(db: &Database) -> Result<Vec<Rule>, ValetError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RULE_COLUMNS} FROM rules ORDER BY id ASC"
            ))?;
            let rules = stmt
                .query_map([], row_to_rule)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rules)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Enabled rules only, oldest first. This is the set the router consults.
pub async fn list_enabled_rules(db: &Database) -> Result<Vec<Rule>, ValetError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RULE_COLUMNS} FROM rules WHERE enabled = 1 ORDER BY id ASC"
            ))?;
            let rules = stmt
                .query_map([], row_to_rule)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(rules)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up the rule promoted from a given correction signature.
pub async fn find_rule_by_source(
    db: &Database,
    source_signature: &str,
) -> Result<Option<Rule>, ValetError> {
    let source_signature = source_signature.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {RULE_COLUMNS} FROM rules WHERE source_signature = ?1 LIMIT 1"
            ))?;
            let result = stmt.query_row(params![source_signature], row_to_rule);
            match result {
                Ok(rule) => Ok(Some(rule)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a rule by ID. Returns false when no such rule exists.
pub async fn delete_rule(db: &Database, id: i64) -> Result<bool, ValetError> {
    db.connection()
        .call(move |conn| {
            let affected = conn.execute("DELETE FROM rules WHERE id = ?1", params![id])?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Enable or disable a rule by ID. Returns false when no such rule exists.
pub async fn set_rule_enabled(db: &Database, id: i64, enabled: bool) -> Result<bool, ValetError> {
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "UPDATE rules SET enabled = ?1 WHERE id = ?2",
                params![enabled, id],
            )?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
