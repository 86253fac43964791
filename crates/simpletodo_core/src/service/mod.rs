//! Core use-case services.
//!
//! # Responsibility
//! - Expose the task operations the UI layer calls.
//! - Keep UI callers decoupled from storage details.

pub mod notifier;
pub mod task_registry;
