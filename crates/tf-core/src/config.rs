//! Compile-time configuration
//!
//! The content script takes no runtime configuration; these constants are
//! the whole of it.

use crate::types::Mode;

/// Mode used when nothing is persisted.
pub const DEFAULT_MODE: Mode = Mode::Blacklist;

/// Substring matching instead of exact matching.
pub const USE_PARTIAL_MATCH: bool = false;

/// Engine settings passed to the session at start.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FilterConfig {
    pub default_mode: Mode,
    pub use_partial_match: bool,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            default_mode: DEFAULT_MODE,
            use_partial_match: USE_PARTIAL_MATCH,
        }
    }
}

impl FilterConfig {
    pub fn with_partial_match(mut self, enabled: bool) -> Self {
        self.use_partial_match = enabled;
        self
    }
}
