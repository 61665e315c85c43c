//! Persisted schema and legacy migration
//!
//! # Layout (v2)
//!
//! | key                         | value                                  |
//! |-----------------------------|----------------------------------------|
//! | `poe_trade_filter_exclude`  | JSON array of strings                  |
//! | `poe_trade_filter_include`  | JSON array of strings                  |
//! | `poe_trade_filter_mode`     | `"blacklist"` or `"whitelist"`         |
//! | `poe_trade_filter_migrated` | `"1"` once the v1 key has been handled |
//!
//! v1 stored a single JSON array under `poe_trade_filtered_ids` and had no
//! mode (blacklist only). After migration that key is written as a mirror of
//! the exclude set and never read again.
//!
//! Loading is lenient: a missing or malformed field falls back to its
//! default and the rest of the schema is still used.

use log::{debug, info, warn};

use crate::store::{PersistentStore, StoreError};
use crate::types::{FilterSet, Filters, Mode};

/// Storage keys.
pub mod keys {
    /// v1 single-set key, kept as an exclude-set mirror after migration
    pub const LEGACY: &str = "poe_trade_filtered_ids";
    pub const EXCLUDE: &str = "poe_trade_filter_exclude";
    pub const INCLUDE: &str = "poe_trade_filter_include";
    pub const MODE: &str = "poe_trade_filter_mode";
    pub const MIGRATED: &str = "poe_trade_filter_migrated";
}

/// Current schema version.
pub const SCHEMA_VERSION: u16 = 2;

/// Value written under [`keys::MIGRATED`].
const MIGRATED_MARK: &str = "1";

/// Everything read from storage at load time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Persisted {
    pub filters: Filters,
    /// Whether the v1 key has been handled (and is now a mirror).
    pub migrated: bool,
}

// =============================================================================
// Decoding
// =============================================================================

/// Decode a JSON array of strings. Malformed input yields an empty set.
pub fn decode_set(raw: Option<&str>, key: &str) -> FilterSet {
    let Some(raw) = raw else {
        return FilterSet::new();
    };
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(entries) => entries.into_iter().collect(),
        Err(e) => {
            debug!("Ignoring malformed value under '{}': {}", key, e);
            FilterSet::new()
        }
    }
}

fn decode_mode(raw: Option<&str>, default_mode: Mode) -> Mode {
    match raw {
        None => default_mode,
        Some(raw) => Mode::parse(raw).unwrap_or_else(|| {
            debug!("Ignoring unknown mode '{}'", raw);
            default_mode
        }),
    }
}

fn decode_flag(raw: Option<&str>) -> bool {
    match raw.map(str::trim) {
        None | Some("") | Some("0") | Some("false") => false,
        Some(_) => true,
    }
}

pub fn encode_set(set: &FilterSet) -> Result<String, StoreError> {
    Ok(serde_json::to_string(&set.to_vec())?)
}

// =============================================================================
// Load / Save
// =============================================================================

/// Read the v2 schema, running the one-time v1 migration first if needed.
///
/// Never fails. Migration writes are best effort.
pub fn load<S: PersistentStore + ?Sized>(store: &S, default_mode: Mode) -> Persisted {
    let mut persisted = Persisted {
        filters: Filters {
            exclude: decode_set(store.get(keys::EXCLUDE).as_deref(), keys::EXCLUDE),
            include: decode_set(store.get(keys::INCLUDE).as_deref(), keys::INCLUDE),
            mode: decode_mode(store.get(keys::MODE).as_deref(), default_mode),
        },
        migrated: decode_flag(store.get(keys::MIGRATED).as_deref()),
    };

    if !persisted.migrated {
        migrate_legacy(store, &mut persisted);
    }

    persisted
}

/// Copy the v1 set into the exclude set when the v2 sets are still empty.
///
/// Runs only when a v1 value exists. The exclude set is written before the
/// flag, and the flag only after that write succeeds. On any write failure
/// `migrated` stays false and the next load retries from the v1 key.
fn migrate_legacy<S: PersistentStore + ?Sized>(store: &S, persisted: &mut Persisted) {
    let Some(raw) = store.get(keys::LEGACY) else {
        return;
    };

    let legacy = decode_set(Some(&raw), keys::LEGACY);
    let filters = &mut persisted.filters;
    let copied = !legacy.is_empty() && filters.exclude.is_empty() && filters.include.is_empty();
    let written = if copied {
        info!("Migrating {} legacy filter entries to schema v{}", legacy.len(), SCHEMA_VERSION);
        filters.exclude = legacy;
        encode_set(&filters.exclude).and_then(|json| store.set(keys::EXCLUDE, &json))
    } else {
        debug!("Legacy filter key present but not migrated");
        Ok(())
    };

    match written.and_then(|()| store.set(keys::MIGRATED, MIGRATED_MARK)) {
        Ok(()) => persisted.migrated = true,
        Err(e) => warn!("Failed to persist legacy migration, retrying on next load: {}", e),
    }
}

/// Write the full state.
///
/// Every key is attempted even when an earlier write fails; the first error
/// is returned.
pub fn save<S: PersistentStore + ?Sized>(store: &S, persisted: &Persisted) -> Result<(), StoreError> {
    let filters = &persisted.filters;
    let exclude = encode_set(&filters.exclude)?;
    let include = encode_set(&filters.include)?;

    let mut writes = vec![
        store.set(keys::EXCLUDE, &exclude),
        store.set(keys::INCLUDE, &include),
        store.set(keys::MODE, filters.mode.as_str()),
    ];
    if persisted.migrated {
        writes.push(store.set(keys::LEGACY, &exclude));
    }

    writes.into_iter().collect()
}
