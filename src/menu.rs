//! Mobile navigation drawer.

use crate::config::MenuConfig;
use crate::dom;
use crate::UiError;
use gloo_events::EventListener;
use log::debug;
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, HtmlElement, KeyboardEvent};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawerState {
    Closed,
    Open,
}

/// Side effects of opening and closing, kept apart from the state machine.
pub trait DrawerView {
    fn show(&self, open: bool);
    fn lock_scroll(&self, locked: bool);
    fn focus_drawer(&self);
    fn focus_trigger(&self);
}

pub struct MenuDrawer<V: DrawerView> {
    view: V,
    state: Cell<DrawerState>,
    breakpoint_px: f64,
}

impl<V: DrawerView> MenuDrawer<V> {
    pub fn new(view: V, breakpoint_px: f64) -> Self {
        Self {
            view,
            state: Cell::new(DrawerState::Closed),
            breakpoint_px,
        }
    }

    pub fn state(&self) -> DrawerState {
        self.state.get()
    }

    pub fn is_open(&self) -> bool {
        self.state.get() == DrawerState::Open
    }

    pub fn open(&self) {
        if self.is_open() {
            return;
        }
        self.state.set(DrawerState::Open);
        self.view.show(true);
        self.view.lock_scroll(true);
        self.view.focus_drawer();
    }

    pub fn close(&self) {
        if !self.is_open() {
            return;
        }
        self.state.set(DrawerState::Closed);
        self.view.show(false);
        self.view.lock_scroll(false);
        self.view.focus_trigger();
    }

    pub fn toggle(&self) {
        if self.is_open() {
            self.close();
        } else {
            self.open();
        }
    }

    /// Returns true when the key closed the drawer.
    pub fn handle_key(&self, key: &str) -> bool {
        if key == "Escape" && self.is_open() {
            self.close();
            return true;
        }
        false
    }

    /// Clicks on the drawer's outer container (not its content) dismiss it.
    pub fn handle_backdrop_click(&self, on_container: bool) {
        if on_container {
            self.close();
        }
    }

    pub fn handle_resize(&self, viewport_width: f64) {
        if viewport_width >= self.breakpoint_px {
            self.close();
        }
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// DOM binding

pub struct DomDrawer {
    drawer: HtmlElement,
    trigger: HtmlElement,
    close_button: Option<HtmlElement>,
    open_class: String,
}

impl DomDrawer {
    fn first_focusable(&self) -> Option<HtmlElement> {
        if let Some(button) = &self.close_button {
            return Some(button.clone());
        }
        self.drawer
            .query_selector("a[href], button")
            .ok()
            .flatten()
            .and_then(|el| el.dyn_into::<HtmlElement>().ok())
    }
}

impl DrawerView for DomDrawer {
    fn show(&self, open: bool) {
        let _ = self
            .drawer
            .class_list()
            .toggle_with_force(&self.open_class, open);
        let _ = self
            .trigger
            .class_list()
            .toggle_with_force(&self.open_class, open);
        let _ = self
            .trigger
            .set_attribute("aria-expanded", if open { "true" } else { "false" });
    }

    fn lock_scroll(&self, locked: bool) {
        dom::lock_body_scroll(locked);
    }

    fn focus_drawer(&self) {
        let target = match self.first_focusable() {
            Some(el) => el,
            None => {
                let _ = self.drawer.set_attribute("tabindex", "-1");
                self.drawer.clone()
            }
        };
        let _ = target.focus();
    }

    fn focus_trigger(&self) {
        let _ = self.trigger.focus();
    }
}

pub type PageMenu = MenuDrawer<DomDrawer>;

pub struct MenuBinding {
    pub drawer: Rc<PageMenu>,
    _listeners: Vec<EventListener>,
}

pub fn bind(config: &MenuConfig) -> Result<MenuBinding, UiError> {
    let trigger = dom::html_element_by_id(&config.trigger_id)
        .ok_or_else(|| UiError::MissingElement(format!("#{}", config.trigger_id)))?;
    let drawer_el = dom::html_element_by_id(&config.drawer_id)
        .ok_or_else(|| UiError::MissingElement(format!("#{}", config.drawer_id)))?;
    let close_button = dom::html_element_by_id(&config.close_id);
    if close_button.is_none() {
        debug!("Menu has no #{} close control", config.close_id);
    }
    let _ = trigger.set_attribute("aria-expanded", "false");

    let view = DomDrawer {
        drawer: drawer_el.clone(),
        trigger: trigger.clone(),
        close_button: close_button.clone(),
        open_class: config.open_class.clone(),
    };
    let drawer = Rc::new(MenuDrawer::new(view, config.breakpoint_px));
    let mut listeners = Vec::new();

    let d = drawer.clone();
    listeners.push(EventListener::new(&trigger, "click", move |_| d.toggle()));

    if let Some(close_button) = &close_button {
        let d = drawer.clone();
        listeners.push(EventListener::new(close_button, "click", move |_| d.close()));
    }

    let d = drawer.clone();
    let container: Element = drawer_el.clone().into();
    listeners.push(EventListener::new(&drawer_el, "click", move |event: &Event| {
        let on_container = event
            .target()
            .and_then(|t| t.dyn_into::<Element>().ok())
            .map(|el| el == container)
            .unwrap_or(false);
        d.handle_backdrop_click(on_container);
    }));

    for link in dom::query_all(&drawer_el, &config.nav_links)? {
        let d = drawer.clone();
        listeners.push(EventListener::new(&link, "click", move |_| d.close()));
    }

    let d = drawer.clone();
    listeners.push(EventListener::new(
        &gloo_utils::document(),
        "keydown",
        move |event: &Event| {
            if let Some(event) = event.dyn_ref::<KeyboardEvent>() {
                d.handle_key(&event.key());
            }
        },
    ));

    let d = drawer.clone();
    listeners.push(EventListener::new(&gloo_utils::window(), "resize", move |_| {
        if let Some(width) = dom::viewport_width() {
            d.handle_resize(width);
        }
    }));

    Ok(MenuBinding {
        drawer,
        _listeners: listeners,
    })
}
