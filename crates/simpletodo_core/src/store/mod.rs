//! Synchronous key-value store seam.
//!
//! # Responsibility
//! - Define the `localStorage`-shaped contract the persistence adapter
//!   writes through.
//! - Report failures with a category tag callers can branch on.
//!
//! # Invariants
//! - Callers classify failures by `StoreErrorKind`, never by message text.
//! - Values are opaque UTF-8 text; the store never interprets them.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod memory;
pub mod sqlite;

pub type StoreResult<T> = Result<T, StoreError>;

/// Failure category reported by a store backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreErrorKind {
    /// The write would exceed the store's capacity.
    QuotaExceeded,
    /// The store cannot be used at all in this context.
    Unavailable,
    /// Any other backend failure.
    Other,
}

impl StoreErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::QuotaExceeded => "quota_exceeded",
            Self::Unavailable => "unavailable",
            Self::Other => "other",
        }
    }
}

/// Categorized store failure.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreError {
    pub kind: StoreErrorKind,
    pub message: String,
}

impl StoreError {
    pub fn new(kind: StoreErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn quota_exceeded(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::QuotaExceeded, message)
    }

    pub fn unavailable(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Unavailable, message)
    }

    pub fn other(message: impl Into<String>) -> Self {
        Self::new(StoreErrorKind::Other, message)
    }
}

impl Display for StoreError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message, self.kind.as_str())
    }
}

impl Error for StoreError {}

/// Synchronous string key-value store.
pub trait KeyValueStore {
    /// Returns the stored value, or `None` when the key is absent.
    fn get_item(&self, key: &str) -> StoreResult<Option<String>>;
    /// Replaces the value stored under `key`.
    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()>;
    /// Removes `key`. Removing an absent key is not an error.
    fn remove_item(&mut self, key: &str) -> StoreResult<()>;
}

impl<S: KeyValueStore + ?Sized> KeyValueStore for Box<S> {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        (**self).get_item(key)
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        (**self).set_item(key, value)
    }

    fn remove_item(&mut self, key: &str) -> StoreResult<()> {
        (**self).remove_item(key)
    }
}
