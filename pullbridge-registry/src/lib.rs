use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Opaque reference to an entry in a [`Registry`]. Serializable so it can
/// travel inside message handles across worker boundaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RegistryKey(Uuid);

/// Keyed store for immutable shared values. An entry is written once by
/// [`Registry::put`] and read-only afterwards; there is no update operation.
pub struct Registry<T> {
    entries: RwLock<HashMap<RegistryKey, Arc<T>>>,
}

impl<T> Registry<T> {
    pub fn new() -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
        }
    }

    /// Stores a value and returns a fresh unique key for it.
    pub fn put(&self, value: T) -> RegistryKey {
        let key = RegistryKey(Uuid::new_v4());
        self.entries.write().insert(key, Arc::new(value));
        key
    }

    /// Looks up a previously stored value.
    ///
    /// Panics when the key was never issued or its entry has been released.
    /// Holding a stale key is a caller bug, not a recoverable condition:
    /// keys are only handed out by `put` and stay valid for the owning
    /// consumer's whole lifetime.
    pub fn get(&self, key: RegistryKey) -> Arc<T> {
        self.entries
            .read()
            .get(&key)
            .cloned()
            .unwrap_or_else(|| panic!("no registry entry for key {:?}", key.0))
    }

    /// Drops an entry. Called once, by the owning consumer's shutdown.
    pub fn release(&self, key: RegistryKey) {
        self.entries.write().remove(&key);
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}

impl<T> Default for Registry<T> {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn put_issues_unique_keys() {
        let registry = Registry::new();
        let first = registry.put("one");
        let second = registry.put("two");
        assert_ne!(first, second);
        assert_eq!(*registry.get(first), "one");
        assert_eq!(*registry.get(second), "two");
    }

    #[test]
    fn released_entries_are_gone() {
        let registry = Registry::new();
        let key = registry.put(42);
        registry.release(key);
        assert!(registry.is_empty());
    }

    #[test]
    #[should_panic(expected = "no registry entry")]
    fn get_after_release_is_a_caller_bug() {
        let registry = Registry::new();
        let key = registry.put(42);
        registry.release(key);
        registry.get(key);
    }

    #[test]
    fn entries_are_shared_by_reference() {
        let registry = Registry::new();
        let key = registry.put(String::from("shared"));
        let first = registry.get(key);
        let second = registry.get(key);
        assert!(Arc::ptr_eq(&first, &second));
    }
}
