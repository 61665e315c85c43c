//! Trade Filter Core Library
//!
//! This crate provides the filter-state engine behind the trade item filter
//! content script. It holds no reference to any rendering primitive, so it
//! builds and tests on the host without a browser.
//!
//! # Architecture
//!
//! User actions mutate a [`FilterState`], which writes through to a
//! [`PersistentStore`]. After every mutation, and whenever the page reports
//! that its item list may have changed, the [`Session`] re-runs the
//! reconciliation cycle over all items and hands a [`RenderModel`] to the
//! presentation adapter.
//!
//! # Modules
//!
//! - `types`: Mode, items, filter sets and the filters aggregate
//! - `config`: Compile-time defaults
//! - `store`: Storage seam and in-memory store
//! - `schema`: Persisted layout and legacy migration
//! - `state`: Filter state with write-through persistence
//! - `matcher`: Pure visibility decisions
//! - `reconcile`: Reconciliation cycle and presenter seam
//! - `session`: Action dispatch, change notification and coalescing

pub mod config;
pub mod matcher;
pub mod reconcile;
pub mod schema;
pub mod session;
pub mod state;
pub mod store;
pub mod types;

// Re-export commonly used types
pub use config::FilterConfig;
pub use matcher::{matches, should_hide, Matcher};
pub use reconcile::{reconcile, CycleOutcome, DecisionMap, ItemSource, Presenter, RenderModel};
pub use session::{Action, ChangeNotifier, Coalescer, Session};
pub use state::FilterState;
pub use store::{MemoryStore, PersistentStore, StoreError};
pub use types::{FilterSet, Filters, Item, Mode};
