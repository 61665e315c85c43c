//! `localStorage`-backed store

use tf_core::{MemoryStore, PersistentStore, StoreError};
use web_sys::{Storage, Window};

/// Origin-scoped `localStorage`.
pub struct LocalStorage {
    storage: Storage,
}

impl LocalStorage {
    pub fn open(window: &Window) -> Result<Self, StoreError> {
        window
            .local_storage()
            .ok()
            .flatten()
            .map(|storage| Self { storage })
            .ok_or(StoreError::Unavailable)
    }
}

impl PersistentStore for LocalStorage {
    fn get(&self, key: &str) -> Option<String> {
        self.storage.get_item(key).ok().flatten()
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        self.storage
            .set_item(key, value)
            .map_err(|e| StoreError::WriteRejected {
                key: key.to_string(),
                reason: e.as_string().unwrap_or_else(|| format!("{:?}", e)),
            })
    }
}

/// Store used by the content script.
///
/// Falls back to memory when `localStorage` is blocked, so filtering still
/// works for the session.
pub enum PageStore {
    Local(LocalStorage),
    Memory(MemoryStore),
}

impl PageStore {
    pub fn open(window: &Window) -> Self {
        match LocalStorage::open(window) {
            Ok(local) => Self::Local(local),
            Err(e) => {
                log::warn!("{}; filters will not survive a reload", e);
                Self::Memory(MemoryStore::new())
            }
        }
    }
}

impl PersistentStore for PageStore {
    fn get(&self, key: &str) -> Option<String> {
        match self {
            Self::Local(store) => store.get(key),
            Self::Memory(store) => store.get(key),
        }
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StoreError> {
        match self {
            Self::Local(store) => store.set(key, value),
            Self::Memory(store) => store.set(key, value),
        }
    }
}
