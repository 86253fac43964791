//! Schema migrations for the key-value store database.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - Pending migrations run inside a single transaction.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_kv_items.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version recorded in the database.
pub fn schema_version(conn: &Connection) -> DbResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

/// Applies all pending migrations and returns how many were applied.
///
/// # Errors
/// - `UnsupportedSchemaVersion` when the file was written by a newer binary.
/// - `Sqlite` when a migration statement fails; nothing is committed then.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<usize> {
    let from_version = schema_version(conn)?;
    let latest = latest_version();

    if from_version > latest {
        return Err(DbError::UnsupportedSchemaVersion {
            db_version: from_version,
            latest_supported: latest,
        });
    }

    let pending: Vec<&Migration> = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect();
    if pending.is_empty() {
        return Ok(0);
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    info!(
        "event=db_migrate module=db status=ok from_version={} to_version={} applied={}",
        from_version,
        latest,
        pending.len()
    );
    Ok(pending.len())
}
