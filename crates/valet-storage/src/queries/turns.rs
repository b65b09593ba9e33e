// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turn history operations. Turns are insert-only.

use rusqlite::params;
use valet_core::ValetError;

use crate::database::Database;
use crate::models::{Turn, TurnQuery};

const TURN_COLUMNS: &str =
    "id, session_id, command, channel, talent, success, response, spoken, created_at";

fn row_to_turn(row: &rusqlite::Row) -> Result<Turn, rusqlite::Error> {
    let channel: String = row.get(3)?;
    Ok(Turn {
        id: row.get(0)?,
        session_id: row.get(1)?,
        command: row.get(2)?,
        channel: channel.parse().unwrap_or_default(),
        talent: row.get(4)?,
        success: row.get(5)?,
        response: row.get(6)?,
        spoken: row.get(7)?,
        created_at: row.get(8)?,
    })
}

/// Insert a completed turn.
pub async fn insert_turn(db: &Database, turn: &Turn) -> Result<(), ValetError> {
    let turn = turn.clone();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "INSERT INTO turns (id, session_id, command, channel, talent, success, response, spoken, created_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
                params![
                    turn.id,
                    turn.session_id,
                    turn.command,
                    turn.channel.to_string(),
                    turn.talent,
                    turn.success,
                    turn.response,
                    turn.spoken,
                    turn.created_at,
                ],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Get a turn by ID.
pub async fn get_turn(db: &Database, id: &str) -> Result<Option<Turn>, ValetError> {
    let id = id.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TURN_COLUMNS} FROM turns WHERE id = ?1"
            ))?;
            let result = stmt.query_row(params![id], row_to_turn);
            match result {
                Ok(turn) => Ok(Some(turn)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Most recent turns, newest first.
pub async fn recent_turns(db: &Database, limit: u32) -> Result<Vec<Turn>, ValetError> {
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {TURN_COLUMNS} FROM turns ORDER BY created_at DESC, id DESC LIMIT ?1"
            ))?;
            let turns = stmt
                .query_map(params![limit as i64], row_to_turn)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(turns)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Structured search over turn history, newest first.
///
/// Filters compose with AND; absent filters match everything.
pub async fn search_turns(db: &Database, query: &TurnQuery) -> Result<Vec<Turn>, ValetError> {
    let query = query.clone();
    db.connection()
        .call(move |conn| {
            let mut sql = format!("SELECT {TURN_COLUMNS} FROM turns");
            let mut conditions: Vec<&str> = Vec::new();
            let mut owned: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();

            if let Some(keyword) = &query.keyword {
                conditions.push("(command LIKE ? OR response LIKE ?)");
                let pattern = format!("%{keyword}%");
                owned.push(Box::new(pattern.clone()));
                owned.push(Box::new(pattern));
            }
            if let Some(start) = &query.start_ts {
                conditions.push("created_at >= ?");
                owned.push(Box::new(start.clone()));
            }
            if let Some(end) = &query.end_ts {
                conditions.push("created_at <= ?");
                owned.push(Box::new(end.clone()));
            }
            if let Some(success) = query.success {
                conditions.push("success = ?");
                owned.push(Box::new(success));
            }
            if !conditions.is_empty() {
                sql.push_str(" WHERE ");
                sql.push_str(&conditions.join(" AND "));
            }
            sql.push_str(" ORDER BY created_at DESC, id DESC LIMIT ?");
            owned.push(Box::new(query.effective_limit() as i64));

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn rusqlite::types::ToSql> =
                owned.iter().map(|p| p.as_ref()).collect();
            let turns = stmt
                .query_map(params.as_slice(), row_to_turn)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(turns)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Total number of persisted turns.
pub async fn count_turns(db: &Database) -> Result<i64, ValetError> {
    db.connection()
        .call(|conn| {
            let count = conn.query_row("SELECT COUNT(*) FROM turns", [], |row| row.get(0))?;
            Ok(count)
        })
        .await
        .map_err(crate::database::map_tr_err)
}
