//! Session: owns the filter state and drives reconciliation
//!
//! Two event sources feed a session: user actions ([`Session::dispatch`])
//! and item-list change notifications ([`Session::notify`]). Both run one
//! full cycle and hand the result to the presenter.

use log::{debug, info};

use crate::config::FilterConfig;
use crate::reconcile::{CycleOutcome, ItemSource, Presenter, Reconciler};
use crate::state::FilterState;
use crate::store::PersistentStore;
use crate::types::Mode;

/// A user-requested state mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Add(String),
    Remove(String),
    Clear,
    SetMode(Mode),
    ToggleMode,
}

/// Signals that the item collection may have changed. No payload.
pub trait ChangeNotifier {
    fn subscribe(&mut self, callback: Box<dyn FnMut()>);
}

pub struct Session<S, I, P>
where
    S: PersistentStore,
    I: ItemSource,
    P: Presenter,
{
    state: FilterState<S>,
    items: I,
    presenter: P,
    config: FilterConfig,
    reconciler: Reconciler,
}

impl<S, I, P> Session<S, I, P>
where
    S: PersistentStore,
    I: ItemSource,
    P: Presenter,
{
    /// Load state from `store` and run the first cycle.
    pub fn start(store: S, items: I, presenter: P, config: FilterConfig) -> Self {
        let state = FilterState::load(store, config.default_mode);
        let mut session = Self {
            state,
            items,
            presenter,
            config,
            reconciler: Reconciler::new(),
        };
        info!(
            "Filter session started: mode={}, {} active entries",
            session.state.mode(),
            session.state.size()
        );
        session.run_cycle();
        session
    }

    /// Apply a user action, then re-run the cycle.
    pub fn dispatch(&mut self, action: Action) -> CycleOutcome {
        debug!("Dispatch {:?}", action);
        match action {
            Action::Add(entry) => self.state.add_to_active(&entry),
            Action::Remove(entry) => self.state.remove_from_active(&entry),
            Action::Clear => self.state.clear_active(),
            Action::SetMode(mode) => self.state.set_mode(mode),
            Action::ToggleMode => {
                let mode = self.state.mode().toggled();
                self.state.set_mode(mode);
            }
        }
        self.run_cycle()
    }

    /// The item list may have changed; state is unchanged.
    pub fn notify(&mut self) -> CycleOutcome {
        self.run_cycle()
    }

    pub fn state(&self) -> &FilterState<S> {
        &self.state
    }

    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    pub fn presenter(&self) -> &P {
        &self.presenter
    }

    pub fn items(&self) -> &I {
        &self.items
    }

    fn run_cycle(&mut self) -> CycleOutcome {
        let items = self.items.items();
        let (view, outcome) =
            self.reconciler
                .run(&items, self.state.filters(), self.config.use_partial_match);
        self.presenter.render(&view);
        outcome
    }
}

// =============================================================================
// Coalescing
// =============================================================================

/// Collapses bursts of notifications into one cycle.
///
/// The adapter calls [`Coalescer::request`] for each notification and
/// schedules a flush only when it returns `true`. When the flush fires it
/// calls [`Coalescer::take`] and runs a single cycle.
#[derive(Debug, Default)]
pub struct Coalescer {
    scheduled: bool,
    pending: u32,
}

impl Coalescer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a notification. Returns `true` if a flush must be scheduled.
    pub fn request(&mut self) -> bool {
        self.pending = self.pending.saturating_add(1);
        if self.scheduled {
            false
        } else {
            self.scheduled = true;
            true
        }
    }

    /// Start a flush. Returns how many notifications it covers.
    pub fn take(&mut self) -> u32 {
        self.scheduled = false;
        std::mem::take(&mut self.pending)
    }

    pub fn is_scheduled(&self) -> bool {
        self.scheduled
    }
}
