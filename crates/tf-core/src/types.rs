//! Core type definitions for the filter-state engine
//!
//! These types are shared by the persistence schema, the match engine and
//! the reconciliation cycle.

use std::collections::BTreeSet;
use std::fmt;

// =============================================================================
// Mode
// =============================================================================

/// Which filter set is active.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// Hide items matching the exclude set
    #[default]
    Blacklist,
    /// Show only items matching the include set (empty set shows everything)
    Whitelist,
}

impl Mode {
    /// Persisted label of the mode.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Blacklist => "blacklist",
            Self::Whitelist => "whitelist",
        }
    }

    /// Parse a persisted label. Unknown labels yield `None`.
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim() {
            "blacklist" => Some(Self::Blacklist),
            "whitelist" => Some(Self::Whitelist),
            _ => None,
        }
    }

    /// The other mode.
    pub const fn toggled(self) -> Self {
        match self {
            Self::Blacklist => Self::Whitelist,
            Self::Whitelist => Self::Blacklist,
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// =============================================================================
// Items
// =============================================================================

/// A result row as seen by the core: an opaque id and its classification.
///
/// The classification is already extracted by the item source; `None` means
/// the source could not read it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Item {
    pub id: String,
    pub classification: Option<String>,
}

impl Item {
    pub fn new(id: impl Into<String>, classification: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            classification: Some(classification.into()),
        }
    }

    /// An item whose classification could not be read.
    pub fn unclassified(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            classification: None,
        }
    }
}

// =============================================================================
// Filter entries
// =============================================================================

/// Normalize raw entry text. Returns `None` when nothing is left after trimming.
#[inline]
pub fn normalize_entry(raw: &str) -> Option<&str> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed)
    }
}

/// A set of normalized filter entries.
///
/// Uniqueness is on the trimmed, case-preserved string. A sorted set keeps
/// serialized output and rendered entry lists stable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterSet {
    entries: BTreeSet<String>,
}

impl FilterSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an entry. Returns `true` if the set changed.
    pub fn insert(&mut self, raw: &str) -> bool {
        match normalize_entry(raw) {
            Some(entry) => self.entries.insert(entry.to_string()),
            None => false,
        }
    }

    /// Remove an entry. Returns `true` if the set changed.
    pub fn remove(&mut self, raw: &str) -> bool {
        match normalize_entry(raw) {
            Some(entry) => self.entries.remove(entry),
            None => false,
        }
    }

    pub fn contains(&self, raw: &str) -> bool {
        normalize_entry(raw).is_some_and(|entry| self.entries.contains(entry))
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(String::as_str)
    }

    pub fn to_vec(&self) -> Vec<String> {
        self.entries.iter().cloned().collect()
    }
}

impl<S: AsRef<str>> FromIterator<S> for FilterSet {
    fn from_iter<T: IntoIterator<Item = S>>(iter: T) -> Self {
        let mut set = Self::new();
        for entry in iter {
            set.insert(entry.as_ref());
        }
        set
    }
}

// =============================================================================
// Filters (the aggregate)
// =============================================================================

/// Exclude set, include set and active mode.
///
/// Both sets are always kept; the mode only selects which one is active.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    pub exclude: FilterSet,
    pub include: FilterSet,
    pub mode: Mode,
}

impl Filters {
    /// The set selected by the current mode.
    pub fn active(&self) -> &FilterSet {
        match self.mode {
            Mode::Blacklist => &self.exclude,
            Mode::Whitelist => &self.include,
        }
    }

    pub(crate) fn active_mut(&mut self) -> &mut FilterSet {
        match self.mode {
            Mode::Blacklist => &mut self.exclude,
            Mode::Whitelist => &mut self.include,
        }
    }

    /// Number of entries in the active set.
    pub fn size(&self) -> usize {
        self.active().len()
    }
}
