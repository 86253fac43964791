//! Domain model for the to-do list.
//!
//! # Responsibility
//! - Define canonical data structures used by core business logic.
//! - Keep the persisted JSON shape in one place.
//!
//! # Invariants
//! - Every task is identified by a stable `TaskId`.
//! - Deletion is represented by a `deleted_at` tombstone, not hard delete.

pub mod task;
