use simpletodo_core::{
    KeyValueStore, RecordingNotifier, Severity, SilentNotifier, SqliteStore, SqliteStoreOptions,
    StoreErrorKind, TaskRegistry, ACTIVE_TASKS_KEY,
};

#[test]
fn registry_state_survives_reopening_the_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simpletodo.sqlite3");
    let options = SqliteStoreOptions::default();

    let (done_id, trashed_id) = {
        let store = SqliteStore::open(&path, &options).unwrap();
        let mut registry = TaskRegistry::open(store, SilentNotifier);
        let done = registry.create("Buy milk").unwrap();
        let trashed = registry.create("Old idea").unwrap();
        registry.toggle_completion(&done.id);
        registry.delete(&trashed.id);
        (done.id, trashed.id)
    };

    let store = SqliteStore::open(&path, &options).unwrap();
    let registry = TaskRegistry::open(store, SilentNotifier);

    let active = registry.active_tasks();
    assert_eq!(active.len(), 1);
    assert_eq!(active[0].id, done_id);
    assert!(active[0].completed);
    assert_eq!(registry.list_deleted()[0].id, trashed_id);
}

#[test]
fn exhausted_quota_reports_quota_exceeded() {
    let options = SqliteStoreOptions {
        quota_bytes: Some(16 * 1024),
    };
    let mut store = SqliteStore::open_in_memory(&options).unwrap();

    let err = store.set_item("big", &"x".repeat(256 * 1024)).unwrap_err();

    assert_eq!(err.kind, StoreErrorKind::QuotaExceeded);
    store.set_item("small", "fits").unwrap();
}

#[test]
fn registry_on_full_database_notifies_capacity_once() {
    let options = SqliteStoreOptions {
        quota_bytes: Some(16 * 1024),
    };
    let store = SqliteStore::open_in_memory(&options).unwrap();
    let notifier = RecordingNotifier::new();
    let mut registry = TaskRegistry::open(store, notifier.clone());

    registry.create(&"a".repeat(256 * 1024));
    registry.create(&"b".repeat(256 * 1024));

    let messages = notifier.messages();
    assert_eq!(messages.len(), 1);
    assert!(messages[0].0.contains("Storage limit reached"));
    assert_eq!(messages[0].1, Severity::Error);
}

#[test]
fn read_only_database_reports_unavailable_on_write() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simpletodo.sqlite3");
    {
        let mut store = SqliteStore::open(&path, &SqliteStoreOptions::default()).unwrap();
        store.set_item(ACTIVE_TASKS_KEY, "[]").unwrap();
    }

    let mut store = SqliteStore::open_read_only(&path).unwrap();

    assert_eq!(
        store.get_item(ACTIVE_TASKS_KEY).unwrap().as_deref(),
        Some("[]")
    );
    let err = store.set_item(ACTIVE_TASKS_KEY, "[1]").unwrap_err();
    assert_eq!(err.kind, StoreErrorKind::Unavailable);
}

#[test]
fn read_only_registry_keeps_loaded_tasks_and_warns() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("simpletodo.sqlite3");
    {
        let store = SqliteStore::open(&path, &SqliteStoreOptions::default()).unwrap();
        let mut registry = TaskRegistry::open(store, SilentNotifier);
        registry.create("persisted");
    }

    let store = SqliteStore::open_read_only(&path).unwrap();
    let notifier = RecordingNotifier::new();
    let mut registry = TaskRegistry::open(store, notifier.clone());
    assert_eq!(registry.active_tasks().len(), 1);

    registry.create("not persisted");

    assert_eq!(registry.active_tasks().len(), 2);
    assert_eq!(notifier.messages().len(), 1);
    assert_eq!(notifier.messages()[0].1, Severity::Warning);
}
