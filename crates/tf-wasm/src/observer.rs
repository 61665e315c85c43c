//! Change notification: container polling, mutation observing and timers

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use js_sys::Array;
use log::{debug, trace};
use tf_core::ChangeNotifier;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, MutationObserver, MutationObserverInit, Window};

/// Run `f` once after `delay_ms`.
pub fn set_timeout(window: &Window, delay_ms: i32, f: impl FnOnce() + 'static) -> Result<i32, JsValue> {
    let callback = Closure::once_into_js(f);
    window.set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay_ms)
}

/// Poll for `selector` every `interval_ms` and hand the first match to
/// `on_found`. Checks once immediately; polling stops after the match.
pub fn wait_for(
    window: &Window,
    document: &Document,
    selector: &str,
    interval_ms: i32,
    on_found: impl FnOnce(Element) + 'static,
) -> Result<(), JsValue> {
    if let Some(found) = document.query_selector(selector)? {
        on_found(found);
        return Ok(());
    }

    let handle = Rc::new(Cell::new(None::<i32>));
    let pending: Rc<RefCell<Option<Box<dyn FnOnce(Element)>>>> =
        Rc::new(RefCell::new(Some(Box::new(on_found))));

    let tick = {
        let window = window.clone();
        let document = document.clone();
        let selector = selector.to_string();
        let handle = Rc::clone(&handle);
        Closure::<dyn FnMut()>::new(move || {
            let Ok(Some(found)) = document.query_selector(&selector) else {
                return;
            };
            if let Some(id) = handle.take() {
                window.clear_interval_with_handle(id);
            }
            // take before calling so a late tick cannot run it twice
            let callback = pending.borrow_mut().take();
            if let Some(callback) = callback {
                debug!("Found '{}'", selector);
                callback(found);
            }
        })
    };

    let id = window
        .set_interval_with_callback_and_timeout_and_arguments_0(tick.as_ref().unchecked_ref(), interval_ms)?;
    handle.set(Some(id));
    tick.forget();
    Ok(())
}

/// Reports child-list changes anywhere under one element.
pub struct MutationNotifier {
    target: Element,
    observer: Option<MutationObserver>,
}

impl MutationNotifier {
    pub fn new(target: Element) -> Self {
        Self {
            target,
            observer: None,
        }
    }

    pub fn disconnect(&mut self) {
        if let Some(observer) = self.observer.take() {
            observer.disconnect();
        }
    }

    fn observe(&mut self, mut callback: Box<dyn FnMut()>) -> Result<(), JsValue> {
        self.disconnect();

        let closure = Closure::<dyn FnMut(Array, MutationObserver)>::new(
            move |records: Array, _observer: MutationObserver| {
                trace!("{} mutation records", records.length());
                callback();
            },
        );
        let observer = MutationObserver::new(closure.as_ref().unchecked_ref())?;
        // one observer per page; it lives as long as the document
        closure.forget();

        let options = MutationObserverInit::new();
        options.set_child_list(true);
        options.set_subtree(true);
        observer.observe_with_options(&self.target, &options)?;

        self.observer = Some(observer);
        Ok(())
    }
}

impl ChangeNotifier for MutationNotifier {
    fn subscribe(&mut self, callback: Box<dyn FnMut()>) {
        if let Err(e) = self.observe(callback) {
            log::error!("Failed to observe result container: {:?}", e);
        }
    }
}
