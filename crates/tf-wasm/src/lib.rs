//! WebAssembly content script for the trade item filter
//!
//! `start` waits for the result container, then builds one [`Session`]
//! owned by the event handlers that feed it: the mutation observer and the
//! controls rendered by the presenter.

pub mod config;
pub mod dom;
pub mod logger;
pub mod observer;
pub mod storage;

use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};

use tf_core::{Action, ChangeNotifier, Coalescer, FilterConfig, Session};
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, Window};

use crate::config::{COALESCE_WINDOW_MS, LOG_LEVEL, POLL_INTERVAL_MS, RESULTSET_SELECTOR};
use crate::dom::{Dispatch, DomItems, DomPresenter};
use crate::observer::{set_timeout, wait_for, MutationNotifier};
use crate::storage::PageStore;

type PageSession = Session<PageStore, DomItems, DomPresenter>;

thread_local! {
    static STARTED: Cell<bool> = const { Cell::new(false) };
}

#[wasm_bindgen]
pub fn start() -> Result<(), JsValue> {
    if is_started() {
        return Err(JsValue::from_str("Already started. Reload the page to restart."));
    }

    logger::init(LOG_LEVEL);

    let window = web_sys::window().ok_or_else(|| JsValue::from_str("No window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("No document"))?;

    let attach_window = window.clone();
    let attach_document = document.clone();
    wait_for(&window, &document, RESULTSET_SELECTOR, POLL_INTERVAL_MS, move |container| {
        attach(attach_window, attach_document, container);
    })?;

    // a failed start leaves the flag unset
    STARTED.with(|started| started.set(true));
    Ok(())
}

#[wasm_bindgen]
pub fn is_started() -> bool {
    STARTED.with(|started| started.get())
}

/// Build the session and hook it to the result container.
fn attach(window: Window, document: Document, container: Element) {
    let store = PageStore::open(&window);

    let session: Rc<RefCell<PageSession>> = Rc::new_cyclic(|weak| {
        let dispatch = dispatcher(window.clone(), weak.clone());
        RefCell::new(Session::start(
            store,
            DomItems::new(document.clone()),
            DomPresenter::new(document, &container, dispatch),
            FilterConfig::default(),
        ))
    });

    let gate = Rc::new(RefCell::new(Coalescer::new()));
    let mut notifier = MutationNotifier::new(container);
    let weak = Rc::downgrade(&session);
    notifier.subscribe(Box::new(move || {
        schedule_notify(&window, &gate, &weak);
    }));

    // handlers only hold weak references; the session lives as long as the page
    std::mem::forget(session);
}

/// Action sink for the presenter's controls.
///
/// Actions that arrive while a cycle is running are retried on the next
/// task instead of re-entering the session.
fn dispatcher(window: Window, session: Weak<RefCell<PageSession>>) -> Dispatch {
    Rc::new(move |action: Action| {
        dispatch_or_defer(window.clone(), session.clone(), action);
    })
}

fn dispatch_or_defer(window: Window, session: Weak<RefCell<PageSession>>, action: Action) {
    let Some(strong) = session.upgrade() else {
        return;
    };
    let deferred = match strong.try_borrow_mut() {
        Ok(mut s) => {
            s.dispatch(action);
            None
        }
        Err(_) => Some(action),
    };
    if let Some(action) = deferred {
        let retry_window = window.clone();
        if let Err(e) = set_timeout(&window, 0, move || dispatch_or_defer(retry_window, session, action)) {
            log::warn!("Dropped action, timer unavailable: {:?}", e);
        }
    }
}

/// Collapse a burst of mutation callbacks into one cycle.
fn schedule_notify(window: &Window, gate: &Rc<RefCell<Coalescer>>, session: &Weak<RefCell<PageSession>>) {
    if !gate.borrow_mut().request() {
        return;
    }

    let flush_window = window.clone();
    let flush_gate = Rc::clone(gate);
    let flush_session = session.clone();
    let scheduled = set_timeout(window, COALESCE_WINDOW_MS, move || {
        let Some(strong) = flush_session.upgrade() else {
            return;
        };
        let covered = flush_gate.borrow_mut().take();
        match strong.try_borrow_mut() {
            Ok(mut s) => {
                let outcome = s.notify();
                log::debug!(
                    "Flushed {} notifications: {} items, {} hidden",
                    covered,
                    outcome.total,
                    outcome.hidden
                );
            }
            Err(_) => schedule_notify(&flush_window, &flush_gate, &flush_session),
        };
    });

    if let Err(e) = scheduled {
        gate.borrow_mut().take();
        log::warn!("Failed to schedule refresh: {:?}", e);
    }
}
