//! Browser tests for the DOM presenter and item source.

#![cfg(target_arch = "wasm32")]

use std::cell::RefCell;
use std::rc::Rc;

use tf_core::{Action, DecisionMap, ItemSource, Mode, Presenter, RenderModel};
use tf_wasm::config::{PANEL_ID, ROW_BUTTON_CLASS};
use tf_wasm::dom::{Dispatch, DomItems, DomPresenter};
use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;
use web_sys::{Document, Element, HtmlElement, MutationObserver, MutationObserverInit};

wasm_bindgen_test_configure!(run_in_browser);

const ROW_BUTTONS: &str = ".tf-filter-btn";

struct Page {
    document: Document,
    container: Element,
    actions: Rc<RefCell<Vec<Action>>>,
}

impl Page {
    /// A result list with a header row and two items.
    fn new() -> Self {
        let document = web_sys::window().unwrap().document().unwrap();
        let panel = format!("#{}", PANEL_ID);
        for stale in [".resultset", panel.as_str()] {
            if let Some(el) = document.query_selector(stale).unwrap() {
                el.remove();
            }
        }

        let container = document.create_element("div").unwrap();
        container.set_class_name("resultset");
        container.set_inner_html(
            r#"<div class="row row-total">Showing 2 results</div>
               <div class="row" data-id="a1">
                 <div class="left"></div>
                 <div class="itemHeader"><span class="typeLine"><span class="lc">Chaos Orb</span></span></div>
               </div>
               <div class="row" data-id="b2">
                 <div class="left"></div>
                 <div class="itemHeader"><span class="typeLine"><span class="lc">Ring</span></span></div>
               </div>"#,
        );
        document.body().unwrap().append_child(&container).unwrap();

        Self {
            document,
            container,
            actions: Rc::new(RefCell::new(Vec::new())),
        }
    }

    fn presenter(&self) -> DomPresenter {
        let actions = Rc::clone(&self.actions);
        let dispatch: Dispatch = Rc::new(move |action: Action| actions.borrow_mut().push(action));
        DomPresenter::new(self.document.clone(), &self.container, dispatch)
    }

    fn count(&self, selector: &str) -> u32 {
        self.document.query_selector_all(selector).unwrap().length()
    }

    fn html(&self, selector: &str) -> HtmlElement {
        self.document
            .query_selector(selector)
            .unwrap()
            .unwrap()
            .dyn_into()
            .unwrap()
    }

    fn row(&self, id: &str) -> HtmlElement {
        self.html(&format!(r#".row[data-id="{}"]"#, id))
    }
}

impl Drop for Page {
    fn drop(&mut self) {
        self.container.remove();
    }
}

fn model(mode: Mode, hidden: &[&str], entries: &[&str]) -> RenderModel {
    let decisions: DecisionMap = ["a1", "b2"]
        .iter()
        .map(|id| (id.to_string(), hidden.contains(id)))
        .collect();
    RenderModel {
        decisions,
        size: entries.len(),
        mode,
        entries: entries.iter().map(|e| e.to_string()).collect(),
    }
}

fn watch(target: &Element) -> MutationObserver {
    let observer = MutationObserver::new(&js_sys::Function::new_no_args("")).unwrap();
    let options = MutationObserverInit::new();
    options.set_child_list(true);
    options.set_subtree(true);
    options.set_attributes(true);
    options.set_character_data(true);
    observer.observe_with_options(target, &options).unwrap();
    observer
}

#[wasm_bindgen_test]
fn items_are_read_from_rows() {
    let page = Page::new();
    let items = DomItems::new(page.document.clone()).items();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0].id, "a1");
    assert_eq!(items[0].classification.as_deref(), Some("Chaos Orb"));
    assert_eq!(items[1].classification.as_deref(), Some("Ring"));
}

#[wasm_bindgen_test]
fn repeated_render_adds_nothing() {
    let page = Page::new();
    let mut presenter = page.presenter();
    let view = model(Mode::Blacklist, &["a1"], &["Chaos Orb"]);

    presenter.render(&view);
    presenter.render(&view);

    assert_eq!(page.count(ROW_BUTTONS), 2);
    assert_eq!(page.row("a1").query_selector_all(ROW_BUTTONS).unwrap().length(), 1);
    assert_eq!(page.row("b2").query_selector_all(ROW_BUTTONS).unwrap().length(), 1);
    assert_eq!(page.count(&format!("#{}", PANEL_ID)), 1);
    assert_eq!(page.count(".tf-entry"), 1);
}

#[wasm_bindgen_test]
fn unchanged_render_makes_no_mutations() {
    let page = Page::new();
    let mut presenter = page.presenter();
    let view = model(Mode::Blacklist, &["a1"], &["Chaos Orb"]);
    presenter.render(&view);

    let observer = watch(&page.container);
    presenter.render(&view);
    let records = observer.take_records();
    observer.disconnect();

    assert_eq!(records.length(), 0);
}

#[wasm_bindgen_test]
fn rows_follow_decisions() {
    let page = Page::new();
    let mut presenter = page.presenter();

    presenter.render(&model(Mode::Blacklist, &["a1"], &["Chaos Orb"]));
    assert_eq!(page.row("a1").style().get_property_value("display").unwrap(), "none");
    assert_eq!(page.row("b2").style().get_property_value("display").unwrap(), "");

    presenter.render(&model(Mode::Blacklist, &[], &[]));
    assert_eq!(page.row("a1").style().get_property_value("display").unwrap(), "");
    assert_eq!(page.count(".tf-entry"), 0);
}

#[wasm_bindgen_test]
fn row_button_label_follows_mode() {
    let page = Page::new();
    let mut presenter = page.presenter();
    let label = |page: &Page| {
        page.row("b2")
            .query_selector(ROW_BUTTONS)
            .unwrap()
            .unwrap()
            .text_content()
    };

    presenter.render(&model(Mode::Blacklist, &[], &[]));
    assert_eq!(label(&page).as_deref(), Some("Hide type"));

    presenter.render(&model(Mode::Whitelist, &[], &[]));
    assert_eq!(label(&page).as_deref(), Some("Keep type"));
    assert_eq!(page.count(ROW_BUTTONS), 2);
}

#[wasm_bindgen_test]
fn row_button_adds_its_item_type() {
    let page = Page::new();
    let mut presenter = page.presenter();
    assert!(presenter.has_row_listener());
    presenter.render(&model(Mode::Blacklist, &[], &[]));

    let button: HtmlElement = page
        .row("a1")
        .query_selector(&format!(".{}", ROW_BUTTON_CLASS))
        .unwrap()
        .unwrap()
        .dyn_into()
        .unwrap();
    button.click();

    assert_eq!(*page.actions.borrow(), vec![Action::Add("Chaos Orb".to_string())]);
}

#[wasm_bindgen_test]
fn panel_controls_dispatch_actions() {
    let page = Page::new();
    let mut presenter = page.presenter();
    presenter.render(&model(Mode::Blacklist, &[], &["Chaos Orb", "Ring"]));

    page.html(r#".tf-remove[data-entry="Ring"]"#).click();
    page.html(".tf-toggle").click();
    page.html(".tf-clear").click();

    let input: web_sys::HtmlInputElement = page.html(".tf-input").dyn_into().unwrap();
    input.set_value("  ");
    page.html(".tf-add").click();
    input.set_value("Belt");
    page.html(".tf-add").click();
    assert_eq!(input.value(), "");

    assert_eq!(
        *page.actions.borrow(),
        vec![
            Action::Remove("Ring".to_string()),
            Action::ToggleMode,
            Action::Clear,
            Action::Add("Belt".to_string()),
        ]
    );
}

#[wasm_bindgen_test]
fn chips_rerender_without_stale_handlers() {
    let page = Page::new();
    let mut presenter = page.presenter();
    presenter.render(&model(Mode::Blacklist, &[], &["Chaos Orb", "Ring"]));
    presenter.render(&model(Mode::Blacklist, &[], &["Ring"]));
    presenter.render(&model(Mode::Blacklist, &[], &["Ring", "Belt"]));

    assert_eq!(page.count(".tf-entry"), 2);
    page.html(r#".tf-remove[data-entry="Belt"]"#).click();
    assert_eq!(*page.actions.borrow(), vec![Action::Remove("Belt".to_string())]);
}
