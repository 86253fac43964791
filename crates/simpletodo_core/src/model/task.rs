//! Task domain model.
//!
//! # Responsibility
//! - Define the canonical task record persisted in both collections.
//! - Provide lifecycle helpers for soft-delete semantics.
//!
//! # Invariants
//! - `id` is stable and never reused for another task.
//! - `text` is non-empty and already trimmed.
//! - `deleted_at` is set only while the task lives in the deleted collection.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque task identifier.
///
/// Kept as a string alias: ids written by older stores are not UUIDs.
pub type TaskId = String;

/// Canonical task record.
///
/// Serialized with camelCase keys to match the stored snapshot shape
/// `{ id, text, completed, createdAt, deletedAt? }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Task {
    pub id: TaskId,
    pub text: String,
    pub completed: bool,
    /// RFC 3339 timestamp, set once at creation.
    pub created_at: DateTime<Utc>,
    /// Soft delete tombstone. Omitted from JSON while active.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Validation failures for task invariants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskValidationError {
    EmptyId,
    EmptyText,
    UntrimmedText,
}

impl Display for TaskValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyId => write!(f, "task id cannot be empty"),
            Self::EmptyText => write!(f, "task text cannot be empty"),
            Self::UntrimmedText => {
                write!(f, "task text must not have leading or trailing whitespace")
            }
        }
    }
}

impl Error for TaskValidationError {}

impl Task {
    /// Creates an active task with a generated id and `created_at = now`.
    ///
    /// Returns `None` when `text` is blank after trimming.
    pub fn new(text: &str) -> Option<Self> {
        Self::with_id(Uuid::new_v4().to_string(), text, Utc::now())
    }

    /// Creates an active task with caller-provided identity and timestamp.
    ///
    /// Used by import paths and tests where identity already exists.
    pub fn with_id(id: impl Into<TaskId>, text: &str, created_at: DateTime<Utc>) -> Option<Self> {
        let text = normalize_text(text)?;
        Some(Self {
            id: id.into(),
            text,
            completed: false,
            created_at,
            deleted_at: None,
        })
    }

    /// Checks invariants for records read back from storage.
    ///
    /// # Errors
    /// - `EmptyId` when `id` is blank.
    /// - `EmptyText` / `UntrimmedText` when `text` breaks the trimmed rule.
    pub fn validate(&self) -> Result<(), TaskValidationError> {
        if self.id.trim().is_empty() {
            return Err(TaskValidationError::EmptyId);
        }
        if self.text.trim().is_empty() {
            return Err(TaskValidationError::EmptyText);
        }
        if self.text.trim() != self.text {
            return Err(TaskValidationError::UntrimmedText);
        }
        Ok(())
    }

    /// Stamps the soft delete tombstone.
    pub fn soft_delete(&mut self, at: DateTime<Utc>) {
        self.deleted_at = Some(at);
    }

    /// Clears the soft delete tombstone.
    pub fn restore(&mut self) {
        self.deleted_at = None;
    }

    pub fn is_deleted(&self) -> bool {
        self.deleted_at.is_some()
    }
}

/// Trims user input, returning `None` when nothing is left.
pub fn normalize_text(text: &str) -> Option<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
