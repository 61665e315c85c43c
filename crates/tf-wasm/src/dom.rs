//! DOM adapters: item source and presenter for the trade result list
//!
//! The presenter only touches the DOM when something differs from what is
//! already there. Our own writes land inside the observed container, so a
//! render that changes nothing must also mutate nothing, otherwise the
//! observer would keep re-firing.
//!
//! Clicks are handled by two delegated listeners, one on the result
//! container and one on the control panel. Rows and entry chips carry no
//! listeners of their own.

use std::collections::HashSet;
use std::rc::Rc;

use log::{debug, warn};
use tf_core::{Action, Item, ItemSource, Mode, Presenter, RenderModel};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Document, Element, Event, HtmlElement, HtmlInputElement, KeyboardEvent};

use crate::config::{
    CLASSIFICATION_SELECTORS, ENTRY_ATTRIBUTE, HEADER_SELECTOR, PANEL_ID, ROW_BUTTON_ANCHOR,
    ROW_BUTTON_CLASS, ROW_CLASS_SELECTOR, ROW_ID_ATTRIBUTE, ROW_SELECTOR,
};

/// Sends a user action to the session.
pub type Dispatch = Rc<dyn Fn(Action)>;

type Listener = Closure<dyn FnMut(Event)>;

/// Marks generated ids. The HTML parser never leaves NUL in an attribute
/// value, so a generated id cannot equal a real `data-id`.
const GENERATED_ID_MARK: char = '\u{0}';

// =============================================================================
// Row helpers
// =============================================================================

/// Current result rows, in document order.
pub fn rows(document: &Document) -> Vec<Element> {
    let Ok(list) = document.query_selector_all(ROW_SELECTOR) else {
        return Vec::new();
    };
    (0..list.length())
        .filter_map(|i| list.item(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect()
}

/// Ids for rows in document order, one per row and all distinct.
pub fn row_ids(rows: &[Element]) -> Vec<String> {
    unique_row_ids(rows.iter().map(|row| row.get_attribute(ROW_ID_ATTRIBUTE)))
}

/// Listing ids where present and unique. A missing id gets a positional
/// one; a repeated id is suffixed with the row position.
pub fn unique_row_ids(raw: impl IntoIterator<Item = Option<String>>) -> Vec<String> {
    let mut seen = HashSet::new();
    raw.into_iter()
        .enumerate()
        .map(|(index, id)| {
            let id = match id.filter(|id| !id.is_empty()) {
                Some(id) if !seen.contains(&id) => id,
                Some(id) => format!("{}{}{}", id, GENERATED_ID_MARK, index),
                None => format!("{}row-{}", GENERATED_ID_MARK, index),
            };
            seen.insert(id.clone());
            id
        })
        .collect()
}

/// Item type text of a row.
pub fn classification_of(row: &Element) -> Option<String> {
    CLASSIFICATION_SELECTORS.iter().find_map(|selector| {
        row.query_selector(selector)
            .ok()
            .flatten()
            .and_then(|el| el.text_content())
            .map(|text| text.trim().to_string())
            .filter(|text| !text.is_empty())
    })
}

// =============================================================================
// Item source
// =============================================================================

pub struct DomItems {
    document: Document,
}

impl DomItems {
    pub fn new(document: Document) -> Self {
        Self { document }
    }
}

impl ItemSource for DomItems {
    fn items(&self) -> Vec<Item> {
        let rows = rows(&self.document);
        let ids = row_ids(&rows);
        rows.iter()
            .zip(ids)
            .map(|(row, id)| Item {
                id,
                classification: classification_of(row),
            })
            .collect()
    }
}

// =============================================================================
// Presenter
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq)]
struct PanelState {
    size: usize,
    mode: Mode,
    entries: Vec<String>,
}

pub struct DomPresenter {
    document: Document,
    dispatch: Dispatch,
    panel: Option<PanelState>,
    row_listener: Option<Listener>,
    panel_listeners: Vec<Listener>,
}

impl DomPresenter {
    /// `container` receives the delegated listener for row buttons.
    pub fn new(document: Document, container: &Element, dispatch: Dispatch) -> Self {
        let row_listener = match listen_for_row_clicks(container, Rc::clone(&dispatch)) {
            Ok(listener) => Some(listener),
            Err(e) => {
                warn!("Row buttons will not respond: {:?}", e);
                None
            }
        };
        Self {
            document,
            dispatch,
            panel: None,
            row_listener,
            panel_listeners: Vec::new(),
        }
    }

    pub fn has_row_listener(&self) -> bool {
        self.row_listener.is_some()
    }

    fn try_render(&mut self, view: &RenderModel) -> Result<(), JsValue> {
        let rows = rows(&self.document);
        let ids = row_ids(&rows);
        for (row, id) in rows.iter().zip(&ids) {
            let hidden = view.decisions.get(id).copied().unwrap_or(false);
            set_hidden(row, hidden)?;
            self.ensure_row_button(row, view.mode)?;
        }
        self.render_panel(view)
    }

    fn ensure_row_button(&self, row: &Element, mode: Mode) -> Result<(), JsValue> {
        let label = row_button_label(mode);
        let selector = format!(".{}", ROW_BUTTON_CLASS);
        if let Some(existing) = row.query_selector(&selector)? {
            set_text(&existing, label);
            return Ok(());
        }

        let button = create_button(&self.document, ROW_BUTTON_CLASS, label)?;
        let anchor = row.query_selector(ROW_BUTTON_ANCHOR)?.unwrap_or_else(|| row.clone());
        anchor.append_child(&button)?;
        Ok(())
    }

    fn render_panel(&mut self, view: &RenderModel) -> Result<(), JsValue> {
        let panel = match self.document.get_element_by_id(PANEL_ID) {
            Some(panel) => panel,
            None => {
                let Some(header) = self.document.query_selector(HEADER_SELECTOR)? else {
                    debug!("Results header not found; control panel deferred");
                    return Ok(());
                };
                let panel = self.build_panel()?;
                header.append_child(&panel)?;
                self.panel = None;
                panel
            }
        };

        let state = PanelState {
            size: view.size,
            mode: view.mode,
            entries: view.entries.clone(),
        };
        if self.panel.as_ref() == Some(&state) {
            return Ok(());
        }

        if let Some(el) = panel.query_selector(".tf-mode")? {
            set_text(&el, mode_label(view.mode));
        }
        if let Some(el) = panel.query_selector(".tf-count")? {
            set_text(&el, &view.size.to_string());
        }
        if let Some(el) = panel.query_selector(".tf-toggle")? {
            set_text(&el, toggle_label(view.mode));
        }

        let changed_entries = self.panel.as_ref().map_or(true, |old| old.entries != state.entries);
        if changed_entries {
            if let Some(list) = panel.query_selector(".tf-entries")? {
                self.render_entries(&list, &view.entries)?;
            }
        }

        self.panel = Some(state);
        Ok(())
    }

    /// Build the panel and its two listeners. Listeners of a previous panel
    /// are dropped; that panel is no longer in the document.
    fn build_panel(&mut self) -> Result<Element, JsValue> {
        let doc = &self.document;
        let panel = doc.create_element("div")?;
        panel.set_id(PANEL_ID);
        panel.set_class_name("tf-panel");
        style(&panel, "margin-left", "10px")?;

        panel.append_child(&create_span(doc, "tf-mode", "")?.into())?;
        panel.append_child(&create_span(doc, "tf-count", "0")?.into())?;
        panel.append_child(&create_button(doc, "tf-toggle", "")?.into())?;

        let clear = create_button(doc, "tf-clear", "Clear filter")?;
        clear.set_id("clearFilterBtn");
        panel.append_child(&clear)?;

        let input: HtmlInputElement = doc.create_element("input")?.dyn_into()?;
        input.set_class_name("tf-input");
        input.set_placeholder("Item type");
        style(&input, "margin-left", "10px")?;
        panel.append_child(&input)?;
        panel.append_child(&create_button(doc, "tf-add", "Add")?.into())?;

        let entries = doc.create_element("div")?;
        entries.set_class_name("tf-entries");
        panel.append_child(&entries)?;

        let dispatch = Rc::clone(&self.dispatch);
        let field = input.clone();
        let on_click = listen(&panel, "click", move |event: Event| {
            let Some(button) = clicked(&event, "button") else {
                return;
            };
            let action = match button.class_name().as_str() {
                "tf-toggle" => Some(Action::ToggleMode),
                "tf-clear" => Some(Action::Clear),
                "tf-add" => take_input(&field).map(Action::Add),
                "tf-remove" => button.get_attribute(ENTRY_ATTRIBUTE).map(Action::Remove),
                _ => None,
            };
            if let Some(action) = action {
                event.prevent_default();
                event.stop_propagation();
                dispatch(action);
            }
        })?;

        let dispatch = Rc::clone(&self.dispatch);
        let field = input.clone();
        let on_key = listen(&input, "keydown", move |event: Event| {
            let is_enter = event
                .dyn_ref::<KeyboardEvent>()
                .is_some_and(|key| key.key() == "Enter");
            if is_enter {
                event.prevent_default();
                if let Some(value) = take_input(&field) {
                    dispatch(Action::Add(value));
                }
            }
        })?;

        self.panel_listeners = vec![on_click, on_key];
        Ok(panel)
    }

    fn render_entries(&self, list: &Element, entries: &[String]) -> Result<(), JsValue> {
        list.set_inner_html("");
        for entry in entries {
            let chip = create_span(&self.document, "tf-entry", entry)?;
            let remove = create_button(&self.document, "tf-remove", "\u{00d7}")?;
            remove.set_attribute(ENTRY_ATTRIBUTE, entry)?;
            chip.append_child(&remove)?;
            list.append_child(&chip)?;
        }
        Ok(())
    }
}

impl Presenter for DomPresenter {
    fn render(&mut self, view: &RenderModel) {
        if let Err(e) = self.try_render(view) {
            warn!("Render failed: {:?}", e);
        }
    }
}

fn listen_for_row_clicks(container: &Element, dispatch: Dispatch) -> Result<Listener, JsValue> {
    let selector = format!(".{}", ROW_BUTTON_CLASS);
    listen(container, "click", move |event: Event| {
        let Some(button) = clicked(&event, &selector) else {
            return;
        };
        event.prevent_default();
        event.stop_propagation();
        let row = button.closest(ROW_CLASS_SELECTOR).ok().flatten();
        match row.as_ref().and_then(classification_of) {
            Some(classification) => dispatch(Action::Add(classification)),
            None => debug!("Row has no readable item type"),
        }
    })
}

// =============================================================================
// Element helpers
// =============================================================================

fn row_button_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Blacklist => "Hide type",
        Mode::Whitelist => "Keep type",
    }
}

fn mode_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Blacklist => "Blacklist",
        Mode::Whitelist => "Whitelist",
    }
}

fn toggle_label(mode: Mode) -> &'static str {
    match mode {
        Mode::Blacklist => "Switch to whitelist",
        Mode::Whitelist => "Switch to blacklist",
    }
}

/// Attach `handler` and hand back the closure; dropping it invalidates the
/// listener, so the owner keeps it as long as the element lives.
fn listen(
    target: &Element,
    event: &str,
    handler: impl FnMut(Event) + 'static,
) -> Result<Listener, JsValue> {
    let listener = Listener::new(handler);
    target.add_event_listener_with_callback(event, listener.as_ref().unchecked_ref())?;
    Ok(listener)
}

/// The element matching `selector` at or above the event target.
fn clicked(event: &Event, selector: &str) -> Option<Element> {
    event
        .target()?
        .dyn_into::<Element>()
        .ok()?
        .closest(selector)
        .ok()
        .flatten()
}

fn take_input(input: &HtmlInputElement) -> Option<String> {
    let value = input.value();
    if value.trim().is_empty() {
        return None;
    }
    input.set_value("");
    Some(value)
}

fn set_hidden(row: &Element, hidden: bool) -> Result<(), JsValue> {
    let Some(row) = row.dyn_ref::<HtmlElement>() else {
        return Ok(());
    };
    let style = row.style();
    let is_hidden = style.get_property_value("display")? == "none";
    if hidden && !is_hidden {
        style.set_property("display", "none")?;
    } else if !hidden && is_hidden {
        style.remove_property("display")?;
    }
    Ok(())
}

fn set_text(el: &Element, text: &str) {
    if el.text_content().as_deref() != Some(text) {
        el.set_text_content(Some(text));
    }
}

fn style(el: &Element, property: &str, value: &str) -> Result<(), JsValue> {
    if let Some(el) = el.dyn_ref::<HtmlElement>() {
        el.style().set_property(property, value)?;
    }
    Ok(())
}

fn create_span(document: &Document, class: &str, text: &str) -> Result<Element, JsValue> {
    let span = document.create_element("span")?;
    span.set_class_name(class);
    span.set_text_content(Some(text));
    style(&span, "margin-left", "10px")?;
    Ok(span)
}

fn create_button(document: &Document, class: &str, label: &str) -> Result<Element, JsValue> {
    let button = document.create_element("button")?;
    button.set_class_name(class);
    button.set_text_content(Some(label));
    style(&button, "margin-left", "10px")?;
    style(&button, "cursor", "pointer")?;
    Ok(button)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(raw: &[Option<&str>]) -> Vec<String> {
        unique_row_ids(raw.iter().map(|id| id.map(str::to_string)))
    }

    #[test]
    fn test_listing_ids_pass_through() {
        assert_eq!(ids(&[Some("abc"), Some("def")]), vec!["abc", "def"]);
    }

    #[test]
    fn test_generated_id_never_equals_listing_id() {
        let out = ids(&[None, Some("row-0"), Some("")]);
        assert_eq!(out[1], "row-0");
        assert_ne!(out[0], out[1]);
        assert_ne!(out[2], out[0]);
        assert_eq!(out.iter().collect::<HashSet<_>>().len(), 3);
    }

    #[test]
    fn test_duplicate_listing_ids_stay_distinct() {
        let out = ids(&[Some("abc"), Some("abc"), Some("abc")]);
        assert_eq!(out[0], "abc");
        assert_eq!(out.iter().collect::<HashSet<_>>().len(), 3);
    }

    #[test]
    fn test_ids_are_stable_across_calls() {
        let raw = [Some("a"), None, Some("a")];
        assert_eq!(ids(&raw), ids(&raw));
    }
}
