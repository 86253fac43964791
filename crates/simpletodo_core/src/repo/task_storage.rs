//! Task collection persistence over a `KeyValueStore`.
//!
//! # Responsibility
//! - Serialize whole-collection snapshots to JSON under fixed keys.
//! - Turn store failures into a typed `SaveError` and load-time corruption
//!   into an empty collection.
//!
//! # Invariants
//! - Snapshots passed in are never mutated.
//! - `load` fails only when the store cannot be read; unparseable or
//!   non-array snapshots load empty and their key is removed.
//! - Individual records that fail to decode are skipped, never the whole
//!   collection.
//! - Save failures are classified by `StoreErrorKind`, never by message text.

use crate::model::task::Task;
use crate::store::{KeyValueStore, StoreError, StoreErrorKind, StoreResult};
use log::{debug, error, warn};
use serde_json::Value;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Store key holding the active collection.
pub const ACTIVE_TASKS_KEY: &str = "simple-todo-tasks";
/// Store key holding the deleted collection.
pub const DELETED_TASKS_KEY: &str = "deletedTasks";

/// Logical collection persisted under its own store key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CollectionKey {
    Active,
    Deleted,
}

impl CollectionKey {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Active => ACTIVE_TASKS_KEY,
            Self::Deleted => DELETED_TASKS_KEY,
        }
    }

    fn label(self) -> &'static str {
        match self {
            Self::Active => "active",
            Self::Deleted => "deleted",
        }
    }
}

/// Why a snapshot could not be written.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveError {
    /// Store capacity exceeded.
    Quota,
    /// Store cannot be used in this context.
    Unavailable,
    /// Any other write fault.
    Unknown,
}

impl SaveError {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Quota => "quota",
            Self::Unavailable => "unavailable",
            Self::Unknown => "unknown",
        }
    }
}

impl Display for SaveError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Quota => write!(f, "storage quota exceeded"),
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Unknown => write!(f, "failed to save tasks"),
        }
    }
}

impl Error for SaveError {}

impl From<&StoreError> for SaveError {
    fn from(value: &StoreError) -> Self {
        match value.kind {
            StoreErrorKind::QuotaExceeded => Self::Quota,
            StoreErrorKind::Unavailable => Self::Unavailable,
            StoreErrorKind::Other => Self::Unknown,
        }
    }
}

/// Snapshot text that cannot be read as a task array at all.
#[derive(Debug)]
enum Corruption {
    Json(serde_json::Error),
    NotAnArray,
}

impl Display for Corruption {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid json: {err}"),
            Self::NotAnArray => write!(f, "expected array"),
        }
    }
}

/// Array element dropped while decoding a snapshot.
#[derive(Debug)]
struct SkippedRecord {
    index: usize,
    reason: String,
}

/// Persistence adapter for the active and deleted task collections.
pub struct TaskStorage<S: KeyValueStore> {
    store: S,
}

impl<S: KeyValueStore> TaskStorage<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    /// Reads one collection snapshot.
    ///
    /// Returns an empty vector when the key is absent or the stored text is
    /// not a JSON array; such a key is removed. Elements that do not decode
    /// into valid tasks are skipped and logged.
    ///
    /// # Errors
    /// - The store itself could not be read. Nothing is removed then, and
    ///   callers must not overwrite the key with a snapshot built without it.
    pub fn load(&mut self, key: CollectionKey) -> StoreResult<Vec<Task>> {
        let raw = match self.store.get_item(key.as_str()) {
            Ok(Some(raw)) => raw,
            Ok(None) => return Ok(Vec::new()),
            Err(err) => {
                warn!(
                    "event=storage_load module=repo status=unavailable collection={} error_kind={} error={}",
                    key.label(),
                    err.kind.as_str(),
                    err
                );
                return Err(err);
            }
        };

        match parse_snapshot(&raw) {
            Ok((tasks, skipped)) => {
                for record in &skipped {
                    warn!(
                        "event=storage_load module=repo status=skipped collection={} index={} error={}",
                        key.label(),
                        record.index,
                        record.reason
                    );
                }
                debug!(
                    "event=storage_load module=repo status=ok collection={} count={} skipped={}",
                    key.label(),
                    tasks.len(),
                    skipped.len()
                );
                Ok(tasks)
            }
            Err(corruption) => {
                error!(
                    "event=storage_load module=repo status=corrupted collection={} error={}",
                    key.label(),
                    corruption
                );
                self.reset(key);
                Ok(Vec::new())
            }
        }
    }

    /// Writes one collection snapshot in full.
    pub fn save(&mut self, key: CollectionKey, tasks: &[Task]) -> Result<(), SaveError> {
        let data = match serde_json::to_string(tasks) {
            Ok(data) => data,
            Err(err) => {
                error!(
                    "event=storage_save module=repo status=error collection={} error_kind=unknown error={}",
                    key.label(),
                    err
                );
                return Err(SaveError::Unknown);
            }
        };

        match self.store.set_item(key.as_str(), &data) {
            Ok(()) => {
                debug!(
                    "event=storage_save module=repo status=ok collection={} count={} bytes={}",
                    key.label(),
                    tasks.len(),
                    data.len()
                );
                Ok(())
            }
            Err(err) => {
                let save_error = SaveError::from(&err);
                match save_error {
                    SaveError::Unavailable => warn!(
                        "event=storage_save module=repo status=error collection={} error_kind={} error={}",
                        key.label(),
                        save_error.as_str(),
                        err
                    ),
                    SaveError::Quota | SaveError::Unknown => error!(
                        "event=storage_save module=repo status=error collection={} error_kind={} error={}",
                        key.label(),
                        save_error.as_str(),
                        err
                    ),
                }
                Err(save_error)
            }
        }
    }

    /// Loads `(active, deleted)` collections independently.
    pub fn load_all(&mut self) -> (StoreResult<Vec<Task>>, StoreResult<Vec<Task>>) {
        let active = self.load(CollectionKey::Active);
        let deleted = self.load(CollectionKey::Deleted);
        (active, deleted)
    }

    /// Writes both collections.
    ///
    /// Both writes are always attempted; the active collection's failure
    /// takes precedence when both fail.
    pub fn save_all(&mut self, active: &[Task], deleted: &[Task]) -> Result<(), SaveError> {
        let active_result = self.save(CollectionKey::Active, active);
        let deleted_result = self.save(CollectionKey::Deleted, deleted);
        active_result.and(deleted_result)
    }

    fn reset(&mut self, key: CollectionKey) {
        if let Err(err) = self.store.remove_item(key.as_str()) {
            warn!(
                "event=storage_reset module=repo status=error collection={} error_kind={} error={}",
                key.label(),
                err.kind.as_str(),
                err
            );
        }
    }
}

fn parse_snapshot(raw: &str) -> Result<(Vec<Task>, Vec<SkippedRecord>), Corruption> {
    let value: Value = serde_json::from_str(raw).map_err(Corruption::Json)?;
    let Value::Array(elements) = value else {
        return Err(Corruption::NotAnArray);
    };

    let mut tasks = Vec::with_capacity(elements.len());
    let mut skipped = Vec::new();
    for (index, element) in elements.into_iter().enumerate() {
        let decoded = serde_json::from_value::<Task>(element)
            .map_err(|err| err.to_string())
            .and_then(|task| task.validate().map(|()| task).map_err(|err| err.to_string()));
        match decoded {
            Ok(task) => tasks.push(task),
            Err(reason) => skipped.push(SkippedRecord { index, reason }),
        }
    }
    Ok((tasks, skipped))
}
