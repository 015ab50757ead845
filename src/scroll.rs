//! Smooth scrolling for in-page anchor links.

use crate::config::ScrollConfig;
use crate::dom;
use crate::menu::PageMenu;
use crate::UiError;
use gloo_events::{EventListener, EventListenerOptions};
use log::debug;
use std::rc::Rc;
use web_sys::{Event, ScrollBehavior, ScrollToOptions};

/// Element id referenced by an in-page link, if `href` is one.
///
/// The bare `#` (a placeholder link) is not an anchor.
pub fn anchor_id(href: &str) -> Option<&str> {
    let id = href.strip_prefix('#')?;
    (!id.is_empty()).then_some(id)
}

/// Document scroll position that puts an element `offset` pixels below the
/// top of the viewport. Never negative.
pub fn scroll_destination(element_top: f64, scroll_y: f64, offset: f64) -> f64 {
    (scroll_y + element_top - offset).max(0.0)
}

pub struct ScrollBinding {
    links: usize,
    _listeners: Vec<EventListener>,
}

impl ScrollBinding {
    pub fn link_count(&self) -> usize {
        self.links
    }
}

fn scroll_to_anchor(id: &str, offset: f64, menu: Option<&PageMenu>) {
    let Some(target) = gloo_utils::document().get_element_by_id(id) else {
        debug!("Anchor #{} has no target on this page", id);
        return;
    };
    if let Some(menu) = menu {
        menu.close();
    }

    let window = gloo_utils::window();
    let scroll_y = window.scroll_y().unwrap_or(0.0);
    let top = scroll_destination(target.get_bounding_client_rect().top(), scroll_y, offset);

    let options = ScrollToOptions::new();
    options.set_top(top);
    options.set_behavior(ScrollBehavior::Smooth);
    window.scroll_to_with_scroll_to_options(&options);
}

pub fn bind(config: &ScrollConfig, menu: Option<Rc<PageMenu>>) -> Result<ScrollBinding, UiError> {
    let links = dom::query_all(&dom::document_root()?, &config.links)?;
    if links.is_empty() {
        return Err(UiError::EmptyCollection(config.links.clone()));
    }

    let mut listeners = Vec::with_capacity(links.len());
    for link in &links {
        let anchor = link.clone();
        let menu = menu.clone();
        let offset = config.offset_px;
        listeners.push(EventListener::new_with_options(
            link,
            "click",
            EventListenerOptions::enable_prevent_default(),
            move |event: &Event| {
                let href = anchor.get_attribute("href").unwrap_or_default();
                let Some(id) = anchor_id(&href) else {
                    return;
                };
                event.prevent_default();
                scroll_to_anchor(id, offset, menu.as_deref());
            },
        ));
    }

    Ok(ScrollBinding {
        links: links.len(),
        _listeners: listeners,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn anchor_ids() {
        assert_eq!(anchor_id("#services"), Some("services"));
        assert_eq!(anchor_id("#"), None);
        assert_eq!(anchor_id(""), None);
        assert_eq!(anchor_id("/about#team"), None);
        assert_eq!(anchor_id("https://example.com/#x"), None);
    }

    #[test]
    fn destination_sits_below_fixed_header() {
        // target 600px down the viewport while already scrolled 1000px
        assert_eq!(scroll_destination(600.0, 1_000.0, 100.0), 1_500.0);
        // target above the viewport
        assert_eq!(scroll_destination(-300.0, 1_000.0, 100.0), 600.0);
    }

    #[test]
    fn destination_clamps_at_page_top() {
        assert_eq!(scroll_destination(40.0, 0.0, 100.0), 0.0);
    }
}
