// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Database connection management with PRAGMA setup, WAL mode, and lifecycle.
//!
//! All writes are serialized through tokio-rusqlite's single background thread.
//! Do NOT create additional Connection instances for writes.

use std::path::Path;
use std::time::Duration;

use tokio_rusqlite::Connection;
use valet_core::ValetError;

/// Helper to convert tokio_rusqlite errors into ValetError::Storage.
pub fn map_tr_err(e: tokio_rusqlite::Error) -> ValetError {
    ValetError::Storage {
        source: Box::new(e),
    }
}

/// Owner of the single SQLite connection.
///
/// Migrations run on open, then the connection is configured for WAL mode
/// with a busy timeout. Query modules accept `&Database` and go through
/// [`Database::connection`]. Clones share the same underlying connection.
#[derive(Clone)]
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Opens (creating if needed) the database at `path` with the default
    /// 5 second busy timeout.
    pub async fn open(path: &str) -> Result<Self, ValetError> {
        Self::open_with_timeout(path, 5000).await
    }

    /// Opens the database with an explicit busy timeout in milliseconds.
    pub async fn open_with_timeout(path: &str, busy_timeout_ms: u64) -> Result<Self, ValetError> {
        if path != ":memory:" {
            if let Some(parent) = Path::new(path).parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent).map_err(|e| ValetError::Storage {
                        source: Box::new(e),
                    })?;
                }
            }
        }

        // Migrations run on a short-lived blocking connection before the
        // async writer opens.
        let migration_path = path.to_string();
        tokio::task::spawn_blocking(move || -> Result<(), ValetError> {
            let mut conn =
                rusqlite::Connection::open(&migration_path).map_err(|e| ValetError::Storage {
                    source: Box::new(e),
                })?;
            crate::migrations::run_migrations(&mut conn)
        })
        .await
        .map_err(|e| ValetError::Internal(format!("migration task failed: {e}")))??;

        let conn = Connection::open(path)
            .await
            .map_err(tokio_rusqlite::Error::from)
            .map_err(map_tr_err)?;
        conn.call(move |conn| {
            conn.pragma_update(None, "journal_mode", "WAL")?;
            conn.pragma_update(None, "synchronous", "NORMAL")?;
            conn.pragma_update(None, "foreign_keys", "ON")?;
            conn.busy_timeout(Duration::from_millis(busy_timeout_ms))?;
            Ok(())
        })
        .await
        .map_err(map_tr_err)?;

        Ok(Self { conn })
    }

    /// Handle to the underlying connection. Cloning the handle is cheap;
    /// all clones share the one background writer thread.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    /// Closes the connection, flushing outstanding work.
    pub async fn close(self) -> Result<(), ValetError> {
        self.conn.close().await.map_err(map_tr_err)
    }
}
