//! Match Engine
//!
//! Decides visibility of a single item from its classification text and the
//! current filters. Everything here is pure: no I/O, no mutation.

use crate::types::{FilterSet, Filters, Mode};

// =============================================================================
// Free functions
// =============================================================================

/// Whether `classification` matches any entry of `active`.
///
/// - Empty classification or empty set never matches.
/// - Exact: trimmed classification equals an entry (case-sensitive).
/// - Partial: lower-cased classification contains a lower-cased entry.
pub fn matches(classification: &str, active: &FilterSet, use_partial_match: bool) -> bool {
    let classification = classification.trim();
    if classification.is_empty() || active.is_empty() {
        return false;
    }

    if use_partial_match {
        let haystack = classification.to_lowercase();
        active
            .iter()
            .any(|entry| haystack.contains(&entry.to_lowercase()))
    } else {
        active.contains(classification)
    }
}

/// Whether an item with `classification` is hidden under `filters`.
///
/// Blacklist hides matches. Whitelist hides non-matches, except that an
/// empty whitelist hides nothing.
pub fn should_hide(classification: &str, filters: &Filters, use_partial_match: bool) -> bool {
    match filters.mode {
        Mode::Blacklist => matches(classification, &filters.exclude, use_partial_match),
        Mode::Whitelist => {
            !filters.include.is_empty()
                && !matches(classification, &filters.include, use_partial_match)
        }
    }
}

// =============================================================================
// Matcher
// =============================================================================

/// Per-cycle matcher.
///
/// Lower-cases the active entries once so partial matching over many items
/// does not redo it per item. Decisions are identical to [`should_hide`].
pub struct Matcher<'a> {
    filters: &'a Filters,
    use_partial_match: bool,
    lowered: Vec<String>,
}

impl<'a> Matcher<'a> {
    pub fn new(filters: &'a Filters, use_partial_match: bool) -> Self {
        let lowered = if use_partial_match {
            filters.active().iter().map(str::to_lowercase).collect()
        } else {
            Vec::new()
        };
        Self {
            filters,
            use_partial_match,
            lowered,
        }
    }

    /// Match against the active set.
    pub fn matches(&self, classification: &str) -> bool {
        let classification = classification.trim();
        let active = self.filters.active();
        if classification.is_empty() || active.is_empty() {
            return false;
        }

        if self.use_partial_match {
            let haystack = classification.to_lowercase();
            self.lowered.iter().any(|entry| haystack.contains(entry.as_str()))
        } else {
            active.contains(classification)
        }
    }

    /// Hide decision for one item.
    ///
    /// An item whose classification is missing or blank is always shown,
    /// whatever the mode.
    pub fn should_hide(&self, classification: Option<&str>) -> bool {
        let Some(classification) = classification.filter(|c| !c.trim().is_empty()) else {
            return false;
        };
        match self.filters.mode {
            Mode::Blacklist => self.matches(classification),
            Mode::Whitelist => !self.filters.include.is_empty() && !self.matches(classification),
        }
    }
}
