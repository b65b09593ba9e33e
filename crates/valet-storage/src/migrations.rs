// SPDX-FileCopyrightText: 2026 Valet Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Schema migrations, embedded at compile time.
//!
//! Refinery picks up every `migrations/V*__*.sql` file during the build.
//! [`run_migrations`] applies whatever the database has not seen yet and
//! records it in refinery's `refinery_schema_history` table, so opening an
//! older database upgrades it in place.

use tracing::debug;
use valet_core::ValetError;

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("migrations");
}

/// Applies all pending migrations on the given connection.
pub fn run_migrations(conn: &mut rusqlite::Connection) -> Result<(), ValetError> {
    let report = embedded::migrations::runner()
        .run(conn)
        .map_err(|e| ValetError::Storage {
            source: Box::new(e),
        })?;
    for migration in report.applied_migrations() {
        debug!(migration = %migration, "applied migration");
    }
    Ok(())
}
