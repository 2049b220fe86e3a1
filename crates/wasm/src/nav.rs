//! Radial menu, the curiosities grid and the footer year.

use std::cell::RefCell;
use std::rc::Rc;

use nox_core::curiosities::{CuriosityGrid, is_activation_key};
use nox_core::menu::{OPEN_CLASS, RadialMenu};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    Document, Element, FocusOptions, HtmlElement, KeyboardEvent, ScrollBehavior,
    ScrollIntoViewOptions, ScrollLogicalPosition,
};

use crate::dom;

pub type SharedMenu = Rc<RefCell<RadialMenu>>;
pub type SharedGrid = Rc<RefCell<CuriosityGrid>>;

const TOGGLE_ID: &str = "menuToggle";
const ITEMS_ID: &str = "menuItems";
const GRID_ID: &str = "curiosityGrid";
const YEAR_ID: &str = "year";

#[derive(Clone)]
struct MenuView {
    body: Option<HtmlElement>,
    toggle: Element,
    items: Option<HtmlElement>,
}

impl MenuView {
    fn apply(&self, menu: RadialMenu) {
        if let Some(body) = &self.body {
            if let Err(e) = body.class_list().toggle_with_force(OPEN_CLASS, menu.is_open()) {
                dom::report(&e);
            }
        }
        if let Err(e) = self.toggle.set_attribute("aria-expanded", menu.aria_expanded()) {
            dom::report(&e);
        }
        // Items stay in the DOM so the open/close transition can run.
        if let Some(items) = &self.items {
            items.set_hidden(false);
        }
    }
}

fn key_of(event: &web_sys::Event) -> Option<String> {
    event.dyn_ref::<KeyboardEvent>().map(KeyboardEvent::key)
}

fn scroll_to(document: &Document, selector: &str) {
    let target = match document.query_selector(selector) {
        Ok(target) => target,
        Err(e) => return dom::report(&e),
    };
    let Some(target) = target else {
        return;
    };
    let scroll = ScrollIntoViewOptions::new();
    scroll.set_behavior(ScrollBehavior::Smooth);
    scroll.set_block(ScrollLogicalPosition::Start);
    target.scroll_into_view_with_scroll_into_view_options(&scroll);
    if let Some(target) = target.dyn_ref::<HtmlElement>() {
        let focus = FocusOptions::new();
        focus.set_prevent_scroll(true);
        if let Err(e) = target.focus_with_options(&focus) {
            dom::report(&e);
        }
    }
}

/// Hook the menu toggle, Escape, outside clicks and `.nav-item` links.
pub fn mount_menu(document: &Document) -> Result<Option<SharedMenu>, JsValue> {
    let Some(toggle) = document.get_element_by_id(TOGGLE_ID) else {
        return Ok(None);
    };
    let menu = Rc::new(RefCell::new(RadialMenu::default()));
    let view = MenuView {
        body: document.body(),
        toggle: toggle.clone(),
        items: dom::by_id(document, ITEMS_ID),
    };

    {
        let menu = Rc::clone(&menu);
        let view = view.clone();
        dom::listen(&toggle, "click", move |_| {
            let mut menu = menu.borrow_mut();
            menu.toggle();
            view.apply(*menu);
        })?;
    }
    {
        let menu = Rc::clone(&menu);
        let view = view.clone();
        dom::listen(document, "keydown", move |event| {
            let Some(key) = key_of(&event) else {
                return;
            };
            let mut menu = menu.borrow_mut();
            if menu.on_key(&key) {
                view.apply(*menu);
            }
        })?;
    }
    {
        let menu = Rc::clone(&menu);
        let view = view.clone();
        dom::listen(document, "click", move |event| {
            let inside = event
                .target()
                .and_then(|t| t.dyn_into::<Element>().ok())
                .and_then(|el| el.closest(".radial-nav").ok().flatten())
                .is_some();
            if !inside {
                let mut menu = menu.borrow_mut();
                menu.on_click(false);
                view.apply(*menu);
            }
        })?;
    }

    let links = document.query_selector_all(".nav-item")?;
    for i in 0..links.length() {
        let Some(link) = links.get(i).and_then(|n| n.dyn_into::<Element>().ok()) else {
            continue;
        };
        let menu = Rc::clone(&menu);
        let view = view.clone();
        let doc = document.clone();
        let href = link.get_attribute("href");
        dom::listen(&link, "click", move |event| {
            event.prevent_default();
            let mut menu = menu.borrow_mut();
            menu.on_navigate();
            view.apply(*menu);
            drop(menu);
            if let Some(href) = &href {
                scroll_to(&doc, href);
            }
        })?;
    }

    Ok(Some(menu))
}

fn div(document: &Document, class: &str, text: &str) -> Result<HtmlElement, JsValue> {
    let el = document.create_element("div")?.dyn_into::<HtmlElement>()?;
    el.set_class_name(class);
    el.set_text_content(Some(text));
    Ok(el)
}

fn show_answer(answer_el: &HtmlElement, answer: Option<&str>) {
    let Some(answer) = answer else {
        return;
    };
    answer_el.set_text_content(Some(answer));
    if let Err(e) = answer_el.dataset().set("revealed", "true") {
        dom::report(&e);
    }
}

/// Build one card per curiosity inside `#curiosityGrid`. Text goes in via
/// `textContent`, never as markup.
pub fn mount_curiosities(document: &Document) -> Result<Option<SharedGrid>, JsValue> {
    let Some(container) = document.get_element_by_id(GRID_ID) else {
        return Ok(None);
    };
    container.set_inner_html("");
    let grid = Rc::new(RefCell::new(CuriosityGrid::default()));

    let cards: Vec<_> = grid.borrow().cards().collect();
    for (index, card) in cards.into_iter().enumerate() {
        let item = document
            .create_element("article")?
            .dyn_into::<HtmlElement>()?;
        item.set_class_name("card-curio");
        item.set_attribute("role", "listitem")?;
        item.set_tab_index(0);

        let question = div(document, "q", card.question)?;
        let answer = div(document, "a", card.text)?;
        answer.dataset().set("revealed", "false")?;
        item.append_child(&question)?;
        item.append_child(&answer)?;

        {
            let grid = Rc::clone(&grid);
            let answer = answer.clone();
            dom::listen(&item, "click", move |_| {
                show_answer(&answer, grid.borrow_mut().reveal(index));
            })?;
        }
        {
            let grid = Rc::clone(&grid);
            dom::listen(&item, "keydown", move |event| {
                let Some(key) = key_of(&event) else {
                    return;
                };
                if is_activation_key(&key) {
                    event.prevent_default();
                    show_answer(&answer, grid.borrow_mut().on_key(index, &key));
                }
            })?;
        }
        container.append_child(&item)?;
    }
    Ok(Some(grid))
}

pub fn stamp_year(document: &Document) {
    if let Some(year) = document.get_element_by_id(YEAR_ID) {
        let now = js_sys::Date::new_0();
        year.set_text_content(Some(&now.get_full_year().to_string()));
    }
}
