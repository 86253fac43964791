//! Core state and persistence for SimpleTodo.
//! This crate is the single source of truth for task invariants.

pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;
pub mod store;

pub use logging::{default_log_level, init_logging, logging_status};
pub use model::task::{normalize_text, Task, TaskId, TaskValidationError};
pub use repo::task_storage::{
    CollectionKey, SaveError, TaskStorage, ACTIVE_TASKS_KEY, DELETED_TASKS_KEY,
};
pub use service::notifier::{Notifier, RecordingNotifier, Severity, SilentNotifier};
pub use service::task_registry::{TaskCounts, TaskRegistry};
pub use store::memory::MemoryStore;
pub use store::sqlite::{SqliteStore, SqliteStoreOptions};
pub use store::{KeyValueStore, StoreError, StoreErrorKind, StoreResult};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}

#[cfg(test)]
mod tests {
    use super::core_version;

    #[test]
    fn version_is_not_empty() {
        assert!(!core_version().is_empty());
    }
}
