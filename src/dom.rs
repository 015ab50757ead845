//! Thin helpers over `web-sys` for querying and toggling page markup.

use crate::config::ACTIVE_CLASS;
use crate::UiError;
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement};

/// Something that can carry the single "active" marker.
pub trait Marker {
    fn set_active(&self, active: bool);
}

impl Marker for Element {
    fn set_active(&self, active: bool) {
        // the styling layer decides what "active" looks like
        let _ = self.class_list().toggle_with_force(ACTIVE_CLASS, active);
    }
}

/// `<html>`, the scope for document-wide queries.
pub fn document_root() -> Result<Element, UiError> {
    gloo_utils::document()
        .document_element()
        .ok_or_else(|| UiError::MissingElement("<html>".to_string()))
}

pub fn query(scope: &Element, selector: &str) -> Result<Option<Element>, UiError> {
    Ok(scope.query_selector(selector)?)
}

/// Query an optional selector; an absent selector yields `None`.
pub fn query_optional(scope: &Element, selector: Option<&str>) -> Result<Option<Element>, UiError> {
    match selector {
        Some(selector) => query(scope, selector),
        None => Ok(None),
    }
}

pub fn query_all(scope: &Element, selector: &str) -> Result<Vec<Element>, UiError> {
    let list = scope.query_selector_all(selector)?;
    Ok((0..list.length())
        .filter_map(|i| list.get(i))
        .filter_map(|node| node.dyn_into::<Element>().ok())
        .collect())
}

pub fn html_element_by_id(id: &str) -> Option<HtmlElement> {
    gloo_utils::document()
        .get_element_by_id(id)
        .and_then(|el| el.dyn_into::<HtmlElement>().ok())
}

/// Lock or restore scrolling of the page behind an overlay.
pub fn lock_body_scroll(locked: bool) {
    let style = gloo_utils::body().style();
    let result = if locked {
        style.set_property("overflow", "hidden")
    } else {
        style.remove_property("overflow").map(|_| ())
    };
    if let Err(e) = result {
        log::debug!("Could not toggle body scroll lock: {:?}", e);
    }
}

/// Viewport width in CSS pixels.
pub fn viewport_width() -> Option<f64> {
    gloo_utils::window().inner_width().ok().and_then(|w| w.as_f64())
}
