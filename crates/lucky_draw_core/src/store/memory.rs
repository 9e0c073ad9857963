//! In-memory storage backend.
//!
//! Used by tests and by hosts without durable storage (private browsing
//! style sessions). Supports failure injection to exercise degraded paths.

use super::{KeyValueStore, StoreError, StoreResult};
use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;

/// Failure mode applied to subsequent operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
enum FailureMode {
    #[default]
    None,
    /// Writes fail with `QuotaExceeded`; reads still succeed.
    QuotaExceeded,
    /// Reads fail with `Unavailable`; writes still succeed.
    ReadsFail,
    /// Every operation fails with `Unavailable`.
    Disabled,
}

/// `BTreeMap`-backed store with interior mutability.
#[derive(Debug, Default)]
pub struct MemoryStore {
    entries: RefCell<BTreeMap<String, String>>,
    failure: Cell<FailureMode>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes every later write fail as if storage were full.
    pub fn fail_writes(&self) {
        self.failure.set(FailureMode::QuotaExceeded);
    }

    /// Makes every later read fail while writes keep landing.
    pub fn fail_reads(&self) {
        self.failure.set(FailureMode::ReadsFail);
    }

    /// Makes every later operation fail as if storage were disabled.
    pub fn disable(&self) {
        self.failure.set(FailureMode::Disabled);
    }

    /// Clears any injected failure.
    pub fn restore(&self) {
        self.failure.set(FailureMode::None);
    }

    pub fn len(&self) -> usize {
        self.entries.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.borrow().is_empty()
    }

    fn check_available(&self) -> StoreResult<()> {
        if self.failure.get() == FailureMode::Disabled {
            return Err(StoreError::Unavailable("memory store disabled".to_string()));
        }
        Ok(())
    }

    fn check_writable(&self, key: &str) -> StoreResult<()> {
        self.check_available()?;
        if self.failure.get() == FailureMode::QuotaExceeded {
            return Err(StoreError::QuotaExceeded {
                key: key.to_string(),
            });
        }
        Ok(())
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> StoreResult<Option<String>> {
        self.check_available()?;
        if self.failure.get() == FailureMode::ReadsFail {
            return Err(StoreError::Unavailable(format!("read of `{key}` failed")));
        }
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> StoreResult<()> {
        self.check_writable(key)?;
        self.entries
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        Ok(())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        self.check_available()?;
        self.entries.borrow_mut().remove(key);
        Ok(())
    }

    fn keys_with_prefix(&self, prefix: &str) -> StoreResult<Vec<String>> {
        self.check_available()?;
        Ok(self
            .entries
            .borrow()
            .keys()
            .filter(|key| key.starts_with(prefix))
            .cloned()
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::MemoryStore;
    use crate::store::{KeyValueStore, StoreError};

    #[test]
    fn set_get_remove_roundtrip() {
        let store = MemoryStore::new();
        store.set("a", "1").unwrap();
        assert_eq!(store.get("a").unwrap().as_deref(), Some("1"));
        store.remove("a").unwrap();
        assert_eq!(store.get("a").unwrap(), None);
        store.remove("a").unwrap();
    }

    #[test]
    fn quota_failure_blocks_writes_but_not_reads() {
        let store = MemoryStore::new();
        store.set("kept", "v").unwrap();
        store.fail_writes();

        let err = store.set("new", "v").unwrap_err();
        assert!(matches!(err, StoreError::QuotaExceeded { ref key } if key == "new"));
        assert_eq!(store.get("kept").unwrap().as_deref(), Some("v"));

        store.restore();
        store.set("new", "v").unwrap();
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn read_failure_leaves_writes_working() {
        let store = MemoryStore::new();
        store.fail_reads();
        store.set("k", "v").unwrap();
        assert!(matches!(store.get("k"), Err(StoreError::Unavailable(_))));

        store.restore();
        assert_eq!(store.get("k").unwrap().as_deref(), Some("v"));
    }

    #[test]
    fn keys_with_prefix_filters_and_sorts() {
        let store = MemoryStore::new();
        store.set("lucky_scale_b", "1").unwrap();
        store.set("other", "x").unwrap();
        store.set("lucky_drag_a", "{}").unwrap();

        let keys = store.keys_with_prefix("lucky_").unwrap();
        assert_eq!(keys, vec!["lucky_drag_a", "lucky_scale_b"]);
    }
}
