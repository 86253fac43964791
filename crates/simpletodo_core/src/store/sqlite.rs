//! Durable key-value store backed by a single SQLite table.
//!
//! # Invariants
//! - Every value lives in `kv_items(key, value, updated_at)`.
//! - SQLite result codes are mapped to `StoreErrorKind`; message text is
//!   only carried for diagnostics.
//! - A configured quota is enforced by SQLite itself via `max_page_count`.

use super::{KeyValueStore, StoreError, StoreErrorKind, StoreResult};
use crate::db::{open_db, open_db_in_memory, DbError};
use log::{info, warn};
use rusqlite::{params, Connection, ErrorCode, OpenFlags, OptionalExtension};
use std::path::Path;

/// Tuning knobs for `SqliteStore`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SqliteStoreOptions {
    /// Upper bound on database size. SQLite never shrinks the limit below
    /// the pages already in use.
    pub quota_bytes: Option<u64>,
}

/// `KeyValueStore` over a migrated SQLite connection.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    /// Opens (or creates) a database file and applies migrations.
    pub fn open(path: impl AsRef<Path>, options: &SqliteStoreOptions) -> StoreResult<Self> {
        let conn = open_db(path).map_err(db_error_to_store)?;
        Self::from_connection(conn, options)
    }

    /// Opens a migrated in-memory database.
    pub fn open_in_memory(options: &SqliteStoreOptions) -> StoreResult<Self> {
        let conn = open_db_in_memory().map_err(db_error_to_store)?;
        Self::from_connection(conn, options)
    }

    /// Opens an existing database without write access.
    ///
    /// Reads work as usual; every write reports `StoreErrorKind::Unavailable`.
    pub fn open_read_only(path: impl AsRef<Path>) -> StoreResult<Self> {
        let conn = Connection::open_with_flags(path, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .map_err(sqlite_error_to_store)?;
        info!("event=store_open module=store status=ok mode=read_only");
        Ok(Self { conn })
    }

    fn from_connection(conn: Connection, options: &SqliteStoreOptions) -> StoreResult<Self> {
        let store = Self { conn };
        if let Some(quota) = options.quota_bytes {
            store.apply_quota(quota)?;
        }
        Ok(store)
    }

    fn apply_quota(&self, quota_bytes: u64) -> StoreResult<()> {
        let page_size: i64 = self
            .conn
            .query_row("PRAGMA page_size;", [], |row| row.get(0))
            .map_err(sqlite_error_to_store)?;
        let page_size = u64::try_from(page_size).unwrap_or(1).max(1);
        let max_pages = (quota_bytes / page_size).max(1);
        let applied: i64 = self
            .conn
            .query_row(&format!("PRAGMA max_page_count = {max_pages};"), [], |row| {
                row.get(0)
            })
            .map_err(sqlite_error_to_store)?;
        if u64::try_from(applied).ok() != Some(max_pages) {
            warn!(
                "event=store_quota module=store status=clamped requested_pages={} applied_pages={}",
                max_pages, applied
            );
        }
        Ok(())
    }

    /// Number of stored keys.
    pub fn len(&self) -> StoreResult<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM kv_items;", [], |row| row.get(0))
            .map_err(sqlite_error_to_store)?;
        Ok(usize::try_from(count).unwrap_or_default())
    }

    pub fn is_empty(&self) -> StoreResult<bool> {
        Ok(self.len()? == 0)
    }
}

impl KeyValueStore for SqliteStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        self.conn
            .query_row(
                "SELECT value FROM kv_items WHERE key = ?1;",
                [key],
                |row| row.get::<_, String>(0),
            )
            .optional()
            .map_err(sqlite_error_to_store)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        self.conn
            .execute(
                "INSERT INTO kv_items (key, value, updated_at)
                 VALUES (?1, ?2, strftime('%s', 'now') * 1000)
                 ON CONFLICT(key) DO UPDATE SET
                    value = excluded.value,
                    updated_at = excluded.updated_at;",
                params![key, value],
            )
            .map_err(sqlite_error_to_store)?;
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StoreResult<()> {
        self.conn
            .execute("DELETE FROM kv_items WHERE key = ?1;", [key])
            .map_err(sqlite_error_to_store)?;
        Ok(())
    }
}

/// Maps a SQLite result code onto the store failure taxonomy.
pub fn classify_sqlite_error(err: &rusqlite::Error) -> StoreErrorKind {
    match err.sqlite_error_code() {
        Some(ErrorCode::DiskFull | ErrorCode::TooBig) => StoreErrorKind::QuotaExceeded,
        Some(
            ErrorCode::ReadOnly
            | ErrorCode::CannotOpen
            | ErrorCode::PermissionDenied
            | ErrorCode::AuthorizationForStatementDenied
            | ErrorCode::DatabaseBusy
            | ErrorCode::DatabaseLocked,
        ) => StoreErrorKind::Unavailable,
        _ => StoreErrorKind::Other,
    }
}

fn sqlite_error_to_store(err: rusqlite::Error) -> StoreError {
    StoreError::new(classify_sqlite_error(&err), err.to_string())
}

fn db_error_to_store(err: DbError) -> StoreError {
    match err {
        DbError::Sqlite(inner) => sqlite_error_to_store(inner),
        DbError::CreateDir { .. } => StoreError::unavailable(err.to_string()),
        DbError::UnsupportedSchemaVersion { .. } => StoreError::other(err.to_string()),
    }
}
