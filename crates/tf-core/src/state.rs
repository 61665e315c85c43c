//! Filter state: the single source of truth for exclude/include sets and mode
//!
//! Every mutating call writes the full state through to the store. A write
//! failure is logged and the in-memory state stays authoritative for the
//! rest of the session.

use log::{debug, warn};

use crate::schema::{self, Persisted};
use crate::store::PersistentStore;
use crate::types::{normalize_entry, FilterSet, Filters, Mode};

pub struct FilterState<S: PersistentStore> {
    store: S,
    persisted: Persisted,
}

impl<S: PersistentStore> FilterState<S> {
    /// Load from the store, defaulting missing fields and migrating v1 data.
    pub fn load(store: S, default_mode: Mode) -> Self {
        let persisted = schema::load(&store, default_mode);
        debug!(
            "Loaded filter state: mode={}, exclude={}, include={}",
            persisted.filters.mode,
            persisted.filters.exclude.len(),
            persisted.filters.include.len()
        );
        Self { store, persisted }
    }

    /// Current snapshot of sets and mode.
    pub fn filters(&self) -> &Filters {
        &self.persisted.filters
    }

    pub fn mode(&self) -> Mode {
        self.persisted.filters.mode
    }

    pub fn active_set(&self) -> &FilterSet {
        self.persisted.filters.active()
    }

    pub fn size(&self) -> usize {
        self.persisted.filters.size()
    }

    pub fn is_migrated(&self) -> bool {
        self.persisted.migrated
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Add an entry to the active set. Blank input is ignored.
    pub fn add_to_active(&mut self, entry: &str) {
        let Some(entry) = normalize_entry(entry) else {
            return;
        };
        self.persisted.filters.active_mut().insert(entry);
        self.persist();
    }

    /// Remove an entry from the active set if present.
    pub fn remove_from_active(&mut self, entry: &str) {
        if self.persisted.filters.active_mut().remove(entry) {
            self.persist();
        }
    }

    /// Empty the active set. The inactive set is untouched.
    pub fn clear_active(&mut self) {
        self.persisted.filters.active_mut().clear();
        self.persist();
    }

    /// Switch the active set. Sets are neither cleared nor merged.
    pub fn set_mode(&mut self, mode: Mode) {
        if self.persisted.filters.mode == mode {
            return;
        }
        self.persisted.filters.mode = mode;
        self.persist();
    }

    fn persist(&self) {
        if let Err(e) = schema::save(&self.store, &self.persisted) {
            warn!("Failed to persist filter state: {}", e);
        }
    }
}
