//! In-memory task registry with soft delete and restore.
//!
//! # Responsibility
//! - Own the active and deleted collections for one session.
//! - Flush both collections through `TaskStorage` after every mutation.
//! - Report the first persistence failure through the injected `Notifier`.
//!
//! # Invariants
//! - A task id lives in exactly one collection at any time.
//! - Rejected operations (blank text, unknown id) never flush.
//! - When either collection could not be read at open, the session never
//!   writes, so stored snapshots survive it and no task is lost between the
//!   two keys.
//! - Operation return values carry business outcomes only; persistence
//!   faults surface exclusively through the notifier, at most once.

use crate::model::task::{normalize_text, Task};
use crate::repo::task_storage::{SaveError, TaskStorage};
use crate::service::notifier::{Notifier, Severity};
use crate::store::KeyValueStore;
use chrono::Utc;
use log::{info, warn};
use std::collections::HashSet;

const QUOTA_MESSAGE: &str = "Storage limit reached. Please delete some tasks to continue.";
const UNAVAILABLE_MESSAGE: &str = "Storage unavailable. Tasks will not persist.";
const SAVE_FAILED_MESSAGE: &str = "Failed to save tasks. Tasks will not persist.";

/// Collection sizes for summary views.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TaskCounts {
    pub active: usize,
    pub completed: usize,
    pub deleted: usize,
}

/// Source of truth for the active and deleted task collections.
pub struct TaskRegistry<S: KeyValueStore, N: Notifier> {
    storage: TaskStorage<S>,
    notifier: N,
    active: Vec<Task>,
    deleted: Vec<Task>,
    persist: bool,
    storage_error_reported: bool,
}

impl<S: KeyValueStore, N: Notifier> TaskRegistry<S, N> {
    /// Loads both collections from `store` and starts a session.
    ///
    /// Corrupt snapshots are replaced by empty collections. When the store
    /// cannot be read, the unreadable collection starts empty, the failure
    /// is reported once, and the session keeps working in memory without
    /// writing. Tasks present in both collections stay deleted.
    pub fn open(store: S, notifier: N) -> Self {
        let mut storage = TaskStorage::new(store);
        let (active_result, deleted_result) = storage.load_all();

        let mut load_error = None;
        let active = active_result.unwrap_or_else(|err| {
            load_error = Some(SaveError::from(&err));
            Vec::new()
        });
        let deleted = deleted_result.unwrap_or_else(|err| {
            load_error.get_or_insert(SaveError::from(&err));
            Vec::new()
        });

        let mut registry = Self {
            storage,
            notifier,
            active,
            deleted,
            persist: load_error.is_none(),
            storage_error_reported: false,
        };
        registry.drop_duplicate_ids();
        info!(
            "event=registry_open module=service status=ok active={} deleted={} persist={}",
            registry.active.len(),
            registry.deleted.len(),
            registry.persist
        );
        if let Some(error) = load_error {
            registry.report(error);
        }
        registry
    }

    /// Adds a new active task.
    ///
    /// Returns `None` without touching storage when `text` is blank.
    pub fn create(&mut self, text: &str) -> Option<Task> {
        let task = Task::new(text)?;
        self.active.push(task.clone());
        self.flush();
        Some(task)
    }

    /// Flips `completed` on an active task.
    pub fn toggle_completion(&mut self, id: &str) -> bool {
        let Some(task) = self.active.iter_mut().find(|task| task.id == id) else {
            return false;
        };
        task.completed = !task.completed;
        self.flush();
        true
    }

    /// Replaces the text of an active task.
    pub fn update_text(&mut self, id: &str, new_text: &str) -> bool {
        let Some(text) = normalize_text(new_text) else {
            return false;
        };
        let Some(task) = self.active.iter_mut().find(|task| task.id == id) else {
            return false;
        };
        task.text = text;
        self.flush();
        true
    }

    /// Moves an active task to the deleted collection and stamps `deleted_at`.
    pub fn delete(&mut self, id: &str) -> bool {
        let Some(index) = self.active.iter().position(|task| task.id == id) else {
            return false;
        };
        let mut task = self.active.remove(index);
        task.soft_delete(Utc::now());
        self.deleted.push(task);
        self.flush();
        true
    }

    /// Moves a deleted task back to the end of the active collection.
    pub fn restore(&mut self, id: &str) -> bool {
        let Some(index) = self.deleted.iter().position(|task| task.id == id) else {
            return false;
        };
        let mut task = self.deleted.remove(index);
        task.restore();
        self.active.push(task);
        self.flush();
        true
    }

    /// Returns a copy of the deleted collection, most recently deleted first.
    ///
    /// Equal timestamps keep their deletion order.
    pub fn list_deleted(&self) -> Vec<Task> {
        let mut tasks = self.deleted.clone();
        tasks.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
        tasks
    }

    /// Active tasks in creation order.
    pub fn active_tasks(&self) -> &[Task] {
        &self.active
    }

    /// Deleted tasks in deletion order.
    pub fn deleted_tasks(&self) -> &[Task] {
        &self.deleted
    }

    /// Looks a task up in either collection.
    pub fn get(&self, id: &str) -> Option<&Task> {
        self.active
            .iter()
            .chain(self.deleted.iter())
            .find(|task| task.id == id)
    }

    pub fn counts(&self) -> TaskCounts {
        TaskCounts {
            active: self.active.len(),
            completed: self.active.iter().filter(|task| task.completed).count(),
            deleted: self.deleted.len(),
        }
    }

    /// Whether a persistence failure was already reported this session.
    pub fn storage_error_reported(&self) -> bool {
        self.storage_error_reported
    }

    fn flush(&mut self) {
        if !self.persist {
            return;
        }
        if let Err(error) = self.storage.save_all(&self.active, &self.deleted) {
            self.report(error);
        }
    }

    fn report(&mut self, error: SaveError) {
        if self.storage_error_reported {
            return;
        }

        self.storage_error_reported = true;
        warn!(
            "event=registry_storage module=service status=error error_kind={} reported=true",
            error.as_str()
        );
        let (message, severity) = failure_notice(error);
        self.notifier.notify(message, severity);
    }

    // Keeps the deleted copy when an id is stored in both collections.
    fn drop_duplicate_ids(&mut self) {
        let deleted_ids: HashSet<&str> = self.deleted.iter().map(|task| task.id.as_str()).collect();
        let before = self.active.len();
        self.active.retain(|task| !deleted_ids.contains(task.id.as_str()));
        let dropped = before - self.active.len();
        if dropped > 0 {
            warn!(
                "event=registry_open module=service status=duplicate dropped={}",
                dropped
            );
        }
    }
}

fn failure_notice(error: SaveError) -> (&'static str, Severity) {
    match error {
        SaveError::Quota => (QUOTA_MESSAGE, Severity::Error),
        SaveError::Unavailable => (UNAVAILABLE_MESSAGE, Severity::Warning),
        SaveError::Unknown => (SAVE_FAILED_MESSAGE, Severity::Error),
    }
}
