// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Correction pattern operations.
//!
//! Corrections are keyed by the normalized signature of the original
//! command. Recording the same signature again increments the occurrence
//! count and overwrites the corrected command (most recent wins).

use rusqlite::params;
use valet_core::{now_rfc3339, ValetError};

use crate::database::Database;
use crate::models::CorrectionRecord;

const CORRECTION_COLUMNS: &str = "id, signature, original_command, corrected_command, \
     original_turn_id, corrected_turn_id, occurrence_count, created_at, updated_at";

fn row_to_correction(row: &rusqlite::Row) -> Result<CorrectionRecord, rusqlite::Error> {
    Ok(CorrectionRecord {
        id: row.get(0)?,
        signature: row.get(1)?,
        original_command: row.get(2)?,
        corrected_command: row.get(3)?,
        original_turn_id: row.get(4)?,
        corrected_turn_id: row.get(5)?,
        occurrence_count: row.get(6)?,
        created_at: row.get(7)?,
        updated_at: row.get(8)?,
    })
}

/// Record a correction, creating or updating the record for `signature`.
///
/// Returns the record as stored after the write, so callers can inspect
/// the updated occurrence count.
pub async fn record_correction(
    db: &Database,
    signature: &str,
    original_command: &str,
    corrected_command: &str,
    original_turn_id: Option<&str>,
    corrected_turn_id: Option<&str>,
) -> Result<CorrectionRecord, ValetError> {
    let signature = signature.to_string();
    let original_command = original_command.to_string();
    let corrected_command = corrected_command.to_string();
    let original_turn_id = original_turn_id.map(|s| s.to_string());
    let corrected_turn_id = corrected_turn_id.map(|s| s.to_string());
    let now = now_rfc3339();

    db.connection()
        .call(move |conn| {
            let tx = conn.transaction()?;
            tx.execute(
                "INSERT INTO corrections (signature, original_command, corrected_command,
                     original_turn_id, corrected_turn_id, occurrence_count, created_at, updated_at)
                 VALUES (?1, ?2, ?3, ?4, ?5, 1, ?6, ?6)
                 ON CONFLICT(signature) DO UPDATE SET
                     corrected_command = excluded.corrected_command,
                     corrected_turn_id = excluded.corrected_turn_id,
                     occurrence_count = occurrence_count + 1,
                     updated_at = excluded.updated_at",
                params![
                    signature,
                    original_command,
                    corrected_command,
                    original_turn_id,
                    corrected_turn_id,
                    now,
                ],
            )?;
            let record = {
                let mut stmt = tx.prepare(&format!(
                    "SELECT {CORRECTION_COLUMNS} FROM corrections WHERE signature = ?1"
                ))?;
                stmt.query_row(params![signature], row_to_correction)?
            };
            tx.commit()?;
            Ok(record)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Look up a correction record by signature.
pub async fn get_correction(
    db: &Database,
    signature: &str,
) -> Result<Option<CorrectionRecord>, ValetError> {
    let signature = signature.to_string();
    db.connection()
        .call(move |conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CORRECTION_COLUMNS} FROM corrections WHERE signature = ?1"
            ))?;
            let result = stmt.query_row(params![signature], row_to_correction);
            match result {
                Ok(record) => Ok(Some(record)),
                Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                Err(e) => Err(e),
            }
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// All correction records, most frequently hit first.
pub async fn list_corrections(db: &Database) -> Result<Vec<CorrectionRecord>, ValetError> {
    db.connection()
        .call(|conn| {
            let mut stmt = conn.prepare(&format!(
                "SELECT {CORRECTION_COLUMNS} FROM corrections
                 ORDER BY occurrence_count DESC, updated_at DESC"
            ))?;
            let records = stmt
                .query_map([], row_to_correction)?
                .collect::<Result<Vec<_>, _>>()?;
            Ok(records)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Reset a correction's occurrence count to zero.
///
/// Used after a rule is accepted so the pattern does not keep proposing.
pub async fn reset_occurrence_count(db: &Database, signature: &str) -> Result<(), ValetError> {
    let signature = signature.to_string();
    let now = now_rfc3339();
    db.connection()
        .call(move |conn| {
            conn.execute(
                "UPDATE corrections SET occurrence_count = 0, updated_at = ?1
                 WHERE signature = ?2",
                params![now, signature],
            )?;
            Ok(())
        })
        .await
        .map_err(crate::database::map_tr_err)
}

/// Delete a correction record. Returns false when no such record exists.
pub async fn delete_correction(db: &Database, signature: &str) -> Result<bool, ValetError> {
    let signature = signature.to_string();
    db.connection()
        .call(move |conn| {
            let affected = conn.execute(
                "DELETE FROM corrections WHERE signature = ?1",
                params![signature],
            )?;
            Ok(affected > 0)
        })
        .await
        .map_err(crate::database::map_tr_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    async fn setup_db() -> (Database, tempfile::TempDir) {
        let dir = tempdir().unwrap();
        let db_path = dir.path().join("test.db");
        let db = Database::open(db_path.to_str().unwrap()).await.unwrap();
        (db, dir)
    }

    #[tokio::test]
    async fn first_record_has_count_one() {
        let (db, _dir) = setup_db().await;
        let record = record_correction(
            &db,
            "turn off bedroom lights",
            "turn off bedroom lights",
            "turn off kitchen lights",
            Some("t1"),
            Some("t2"),
        )
        .await
        .unwrap();

        assert_eq!(record.occurrence_count, 1);
        assert_eq!(record.corrected_command, "turn off kitchen lights");
        assert_eq!(record.original_turn_id, Some("t1".to_string()));

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn same_signature_increments_not_duplicates() {
        let (db, _dir) = setup_db().await;
        record_correction(&db, "play some music", "play some music", "play jazz", None, None)
            .await
            .unwrap();
        let second = record_correction(
            &db,
            "play some music",
            "Play some music!",
            "play blues",
            None,
            None,
        )
        .await
        .unwrap();

        assert_eq!(second.occurrence_count, 2);
        // Most recent correction wins.
        assert_eq!(second.corrected_command, "play blues");
        // Original phrasing from the first sighting is retained.
        assert_eq!(second.original_command, "play some music");

        let all = list_corrections(&db).await.unwrap();
        assert_eq!(all.len(), 1);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn get_correction_by_signature() {
        let (db, _dir) = setup_db().await;
        record_correction(&db, "sig one", "sig one", "corrected", None, None)
            .await
            .unwrap();

        assert!(get_correction(&db, "sig one").await.unwrap().is_some());
        assert!(get_correction(&db, "sig two").await.unwrap().is_none());

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn reset_zeroes_count() {
        let (db, _dir) = setup_db().await;
        for _ in 0..3 {
            record_correction(&db, "repeat me", "repeat me", "fixed", None, None)
                .await
                .unwrap();
        }
        let record = get_correction(&db, "repeat me").await.unwrap().unwrap();
        assert_eq!(record.occurrence_count, 3);

        reset_occurrence_count(&db, "repeat me").await.unwrap();
        let record = get_correction(&db, "repeat me").await.unwrap().unwrap();
        assert_eq!(record.occurrence_count, 0);

        db.close().await.unwrap();
    }

    #[tokio::test]
    async fn delete_reports_whether_row_existed() {
        let (db, _dir) = setup_db().await;
        record_correction(&db, "bye", "bye", "goodbye", None, None)
            .await
            .unwrap();

        assert!(delete_correction(&db, "bye").await.unwrap());
        assert!(!delete_correction(&db, "bye").await.unwrap());

        db.close().await.unwrap();
    }
}
