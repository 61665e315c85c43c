//! Persistent key/value storage seam
//!
//! The browser adapter backs this with `localStorage`; tests and host-side
//! tools use [`MemoryStore`].

use std::cell::{Cell, RefCell};
use std::collections::{HashMap, HashSet};

/// Error type for storage writes.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Storage unavailable")]
    Unavailable,
    #[error("Write rejected for '{key}': {reason}")]
    WriteRejected { key: String, reason: String },
    #[error("Failed to encode value: {0}")]
    Encode(#[from] serde_json::Error),
}

/// Durable string storage scoped to the current origin.
///
/// Reads never fail: an unreadable value is reported as absent.
pub trait PersistentStore {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<(), StoreError>;
}

impl<T: PersistentStore + ?Sized> PersistentStore for &T {
    fn get(&self, key: &str) -> Option<String> {
        (**self).get(key)
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        (**self).set(key, value)
    }
}

/// In-memory store.
///
/// Uses `RefCell` because the engine is single-threaded and the trait takes
/// `&self` for writes.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: RefCell<HashMap<String, String>>,
    writes: Cell<usize>,
    simulate_write_error: Cell<bool>,
    failing_keys: RefCell<HashSet<String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store with preset values.
    pub fn with_values<K, V>(values: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        let store = Self::new();
        store.values.borrow_mut().extend(
            values
                .into_iter()
                .map(|(k, v)| (k.into(), v.into())),
        );
        store
    }

    /// Make every following write fail.
    pub fn set_simulate_write_error(&self, simulate: bool) {
        self.simulate_write_error.set(simulate);
    }

    /// Make writes to `key` fail until [`MemoryStore::allow_writes_to`].
    pub fn fail_writes_to(&self, key: &str) {
        self.failing_keys.borrow_mut().insert(key.to_string());
    }

    pub fn allow_writes_to(&self, key: &str) {
        self.failing_keys.borrow_mut().remove(key);
    }

    /// Number of successful writes so far.
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.borrow().contains_key(key)
    }
}

impl PersistentStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.borrow().get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        if self.simulate_write_error.get() || self.failing_keys.borrow().contains(key) {
            return Err(StoreError::WriteRejected {
                key: key.to_string(),
                reason: "write error".to_string(),
            });
        }
        self.values
            .borrow_mut()
            .insert(key.to_string(), value.to_string());
        self.writes.set(self.writes.get() + 1);
        Ok(())
    }
}
