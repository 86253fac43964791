//! In-process key-value store.
//!
//! Clones share one underlying map, the way every script in a page shares
//! one `localStorage`. Capacity and availability can be constrained to
//! reproduce browser storage failures.

use super::{KeyValueStore, StoreError, StoreErrorKind, StoreResult};
use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::Rc;

#[derive(Debug, Default)]
struct MemoryState {
    items: BTreeMap<String, String>,
    quota_bytes: Option<usize>,
    unavailable: bool,
    write_failure: Option<StoreErrorKind>,
}

impl MemoryState {
    fn used_bytes(&self) -> usize {
        self.items
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.unavailable {
            return Err(StoreError::unavailable("memory store is disabled"));
        }
        Ok(())
    }
}

/// Shared-handle in-memory store.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    state: Rc<RefCell<MemoryState>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a store that rejects writes once keys plus values exceed
    /// `quota_bytes`.
    pub fn with_quota(quota_bytes: usize) -> Self {
        let store = Self::new();
        store.set_quota_bytes(Some(quota_bytes));
        store
    }

    pub fn set_quota_bytes(&self, quota_bytes: Option<usize>) {
        self.state.borrow_mut().quota_bytes = quota_bytes;
    }

    /// Makes every operation fail with `StoreErrorKind::Unavailable`.
    pub fn set_unavailable(&self, unavailable: bool) {
        self.state.borrow_mut().unavailable = unavailable;
    }

    /// Makes every `set_item` fail with `kind` until cleared with `None`.
    pub fn fail_writes_with(&self, kind: Option<StoreErrorKind>) {
        self.state.borrow_mut().write_failure = kind;
    }

    /// Total bytes currently held (keys plus values).
    pub fn used_bytes(&self) -> usize {
        self.state.borrow().used_bytes()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.state.borrow().items.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.state.borrow().items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl KeyValueStore for MemoryStore {
    fn get_item(&self, key: &str) -> StoreResult<Option<String>> {
        let state = self.state.borrow();
        state.check_available()?;
        Ok(state.items.get(key).cloned())
    }

    fn set_item(&mut self, key: &str, value: &str) -> StoreResult<()> {
        let mut state = self.state.borrow_mut();
        state.check_available()?;

        if let Some(kind) = state.write_failure {
            return Err(StoreError::new(kind, "injected write failure"));
        }

        if let Some(quota) = state.quota_bytes {
            let replaced = state
                .items
                .get(key)
                .map_or(0, |previous| key.len() + previous.len());
            let projected = state.used_bytes() - replaced + key.len() + value.len();
            if projected > quota {
                return Err(StoreError::quota_exceeded(format!(
                    "write of {} bytes exceeds quota of {quota} bytes",
                    value.len()
                )));
            }
        }

        state.items.insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove_item(&mut self, key: &str) -> StoreResult<()> {
        let mut state = self.state.borrow_mut();
        state.check_available()?;
        state.items.remove(key);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::store::{KeyValueStore, StoreErrorKind};

    #[test]
    fn clones_share_items() {
        let mut writer = MemoryStore::new();
        let reader = writer.clone();

        writer.set_item("k", "v").unwrap();
        assert_eq!(reader.get_item("k").unwrap().as_deref(), Some("v"));

        writer.remove_item("k").unwrap();
        assert!(!reader.contains_key("k"));
        writer.remove_item("k").unwrap();
    }

    #[test]
    fn quota_counts_replaced_values_once() {
        let mut store = MemoryStore::with_quota(10);
        store.set_item("k", "123456789").unwrap();
        store.set_item("k", "987654321").unwrap();

        let err = store.set_item("k2", "x").unwrap_err();
        assert_eq!(err.kind, StoreErrorKind::QuotaExceeded);
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("987654321"));
        assert_eq!(store.used_bytes(), 10);
    }

    #[test]
    fn unavailable_store_rejects_all_operations() {
        let mut store = MemoryStore::new();
        store.set_unavailable(true);

        assert_eq!(
            store.get_item("k").unwrap_err().kind,
            StoreErrorKind::Unavailable
        );
        assert_eq!(
            store.set_item("k", "v").unwrap_err().kind,
            StoreErrorKind::Unavailable
        );
        assert_eq!(
            store.remove_item("k").unwrap_err().kind,
            StoreErrorKind::Unavailable
        );
    }

    #[test]
    fn injected_write_failure_leaves_reads_working() {
        let mut store = MemoryStore::new();
        store.set_item("k", "v").unwrap();
        store.fail_writes_with(Some(StoreErrorKind::Other));

        assert_eq!(
            store.set_item("k", "w").unwrap_err().kind,
            StoreErrorKind::Other
        );
        assert_eq!(store.get_item("k").unwrap().as_deref(), Some("v"));

        store.fail_writes_with(None);
        store.set_item("k", "w").unwrap();
    }
}
