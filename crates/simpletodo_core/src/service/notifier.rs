//! Outbound notifications from core to the UI layer.

use std::cell::RefCell;
use std::rc::Rc;

/// How prominently the UI should present a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl Severity {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

/// Fire-and-forget message sink supplied by the UI collaborator.
pub trait Notifier {
    fn notify(&self, message: &str, severity: Severity);
}

impl<F> Notifier for F
where
    F: Fn(&str, Severity),
{
    fn notify(&self, message: &str, severity: Severity) {
        self(message, severity);
    }
}

/// Notifier that drops every message.
#[derive(Debug, Clone, Copy, Default)]
pub struct SilentNotifier;

impl Notifier for SilentNotifier {
    fn notify(&self, _message: &str, _severity: Severity) {}
}

/// Notifier that records messages for later inspection.
///
/// Clones share one log, so a caller can keep a handle after moving the
/// notifier into a registry.
#[derive(Debug, Clone, Default)]
pub struct RecordingNotifier {
    log: Rc<RefCell<Vec<(String, Severity)>>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn messages(&self) -> Vec<(String, Severity)> {
        self.log.borrow().clone()
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, message: &str, severity: Severity) {
        self.log.borrow_mut().push((message.to_string(), severity));
    }
}
