//! Persistence layer for task collections.
//!
//! # Responsibility
//! - Map in-memory collections to store keys and back.
//! - Isolate serialization and store failure handling from the registry.

pub mod task_storage;
