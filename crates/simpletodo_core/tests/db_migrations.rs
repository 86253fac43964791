use rusqlite::Connection;
use simpletodo_core::db::migrations::{apply_migrations, latest_version, schema_version};
use simpletodo_core::db::{open_db, open_db_in_memory, DbError};

#[test]
fn open_db_in_memory_applies_all_migrations() {
    let conn = open_db_in_memory().unwrap();

    assert_eq!(schema_version(&conn).unwrap(), latest_version());
    assert_table_exists(&conn, "kv_items");
}

#[test]
fn open_db_creates_missing_parent_directories() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("nested").join("deeper").join("todo.sqlite3");

    let conn = open_db(&path).unwrap();
    assert_table_exists(&conn, "kv_items");
    assert!(path.exists());
}

#[test]
fn reopening_database_applies_nothing_new() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("todo.sqlite3");

    let conn_first = open_db(&path).unwrap();
    assert_eq!(schema_version(&conn_first).unwrap(), latest_version());
    drop(conn_first);

    let mut conn_second = open_db(&path).unwrap();
    assert_eq!(apply_migrations(&mut conn_second).unwrap(), 0);
    assert_eq!(schema_version(&conn_second).unwrap(), latest_version());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("future.sqlite3");

    let conn = Connection::open(&path).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_db(&path).unwrap_err();
    match err {
        DbError::UnsupportedSchemaVersion {
            db_version,
            latest_supported,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(latest_supported, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

fn assert_table_exists(conn: &Connection, table_name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = 'table' AND name = ?1
            );",
            [table_name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "table {table_name} does not exist");
}
