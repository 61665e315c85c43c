//! Adapter constants for the host trade page

use log::LevelFilter;

// =============================================================================
// Host page selectors
// =============================================================================

/// Container of the search results; polled for until it exists.
pub const RESULTSET_SELECTOR: &str = ".resultset";

/// Result rows. The totals header shares the `.row` class and is skipped.
pub const ROW_SELECTOR: &str = ".resultset .row:not(.row-total)";

/// Any row, used to find the row a clicked button belongs to.
pub const ROW_CLASS_SELECTOR: &str = ".row";

/// Results header the control panel is attached to.
pub const HEADER_SELECTOR: &str = ".row.row-total";

/// Row section the per-row button goes into. Falls back to the row itself.
pub const ROW_BUTTON_ANCHOR: &str = ".left";

/// Row attribute holding the listing id.
pub const ROW_ID_ATTRIBUTE: &str = "data-id";

/// Where an item's type is read from, first hit wins.
pub const CLASSIFICATION_SELECTORS: &[&str] = &[
    ".itemHeader .typeLine .lc",
    ".itemHeader .itemName .lc",
    ".itemHeader .typeLine",
];

// =============================================================================
// Elements we create
// =============================================================================

pub const ROW_BUTTON_CLASS: &str = "tf-filter-btn";
pub const PANEL_ID: &str = "tf-panel";

/// Attribute on a remove button naming the entry it removes.
pub const ENTRY_ATTRIBUTE: &str = "data-entry";

// =============================================================================
// Timing
// =============================================================================

/// Poll interval while waiting for the result container.
pub const POLL_INTERVAL_MS: i32 = 500;

/// Window in which change notifications are collapsed into one cycle.
pub const COALESCE_WINDOW_MS: i32 = 50;

// =============================================================================
// Logging
// =============================================================================

pub const LOG_LEVEL: LevelFilter = LevelFilter::Info;

/// Prefix for console output.
pub const LOG_PREFIX: &str = "[trade-filter]";
