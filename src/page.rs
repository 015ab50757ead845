//! Page-level mounting.
//!
//! Every feature is bound at most once per page. Each binding owns its event
//! listeners, so nothing is ever attached twice and no node has to be
//! replaced to shed stale handlers. Missing markup skips the feature.

use crate::carousel::{self, CarouselBinding};
use crate::config::{SiteConfig, CONFIG_ELEMENT_ID};
use crate::counter::{self, CounterBinding};
use crate::menu::{self, MenuBinding};
use crate::scroll::{self, ScrollBinding};
use crate::UiError;
use gloo_events::EventListener;
use log::{debug, info, warn};
use once_cell::unsync::OnceCell;
use std::rc::Rc;
use wasm_bindgen::JsCast;
use web_sys::PageTransitionEvent;

thread_local! {
    /// The mounted page. Lives until the tab navigates away.
    static PAGE: OnceCell<Page> = OnceCell::new();
}

pub struct Page {
    pub carousels: Rc<Vec<CarouselBinding>>,
    pub menu: Option<MenuBinding>,
    pub counters: Option<CounterBinding>,
    pub scroll: Option<ScrollBinding>,
    _lifecycle: [EventListener; 2],
}

/// Turn a binding failure into a log line; absent markup is expected.
fn optional<T>(feature: &str, result: Result<T, UiError>) -> Option<T> {
    match result {
        Ok(binding) => Some(binding),
        Err(e @ (UiError::MissingElement(_) | UiError::EmptyCollection(_))) => {
            debug!("Skipping {}: {}", feature, e);
            None
        }
        Err(e) => {
            warn!("Skipping {}: {}", feature, e);
            None
        }
    }
}

impl Page {
    fn build(config: &SiteConfig) -> Self {
        let carousels: Vec<CarouselBinding> = config
            .carousels
            .iter()
            .filter_map(|c| optional(&format!("carousel {}", c.label()), carousel::bind(c)))
            .collect();
        let menu = optional("menu drawer", menu::bind(&config.menu));
        let counters = optional("counters", counter::bind(&config.counters));
        let scroll = optional(
            "anchor scrolling",
            scroll::bind(&config.scroll, menu.as_ref().map(|m| m.drawer.clone())),
        );

        // stop timers when the page is hidden or parked in the back/forward cache
        let carousels = Rc::new(carousels);
        let running = carousels.clone();
        let hide = EventListener::new(&gloo_utils::window(), "pagehide", move |_| {
            for binding in running.iter() {
                binding.stop();
            }
        });
        let restored = carousels.clone();
        let show = EventListener::new(&gloo_utils::window(), "pageshow", move |event| {
            let persisted = event
                .dyn_ref::<PageTransitionEvent>()
                .map(|e| e.persisted())
                .unwrap_or(false);
            if persisted {
                for binding in restored.iter() {
                    binding.carousel.start();
                }
            }
        });

        info!(
            "Mounted {} carousel(s), menu: {}, counters: {}, anchor links: {}",
            carousels.len(),
            menu.is_some(),
            counters.is_some(),
            scroll.as_ref().map(|s| s.link_count()).unwrap_or(0)
        );

        Page {
            carousels,
            menu,
            counters,
            scroll,
            _lifecycle: [hide, show],
        }
    }
}

/// Bind every configured feature. Returns false if the page was already mounted.
pub fn mount(config: SiteConfig) -> bool {
    PAGE.with(|page| {
        if page.get().is_some() {
            debug!("Page already mounted");
            return false;
        }
        page.get_or_init(|| Page::build(&config));
        true
    })
}

pub fn is_mounted() -> bool {
    PAGE.with(|page| page.get().is_some())
}

/// Run `f` against the mounted page, if any.
pub fn with_page<R>(f: impl FnOnce(&Page) -> R) -> Option<R> {
    PAGE.with(|page| page.get().map(f))
}

/// Read overrides from `<script type="application/json" id="site-ui-config">`.
///
/// Falls back to defaults when the element is absent or invalid.
pub fn config_from_page() -> SiteConfig {
    let Some(raw) = gloo_utils::document()
        .get_element_by_id(CONFIG_ELEMENT_ID)
        .and_then(|el| el.text_content())
    else {
        return SiteConfig::default();
    };
    match SiteConfig::from_json(&raw) {
        Ok(config) => config,
        Err(e) => {
            warn!("Ignoring #{}: {}", CONFIG_ELEMENT_ID, e);
            SiteConfig::default()
        }
    }
}

/// Mount once the document is parsed.
pub fn mount_when_ready(config: SiteConfig) {
    let document = gloo_utils::document();
    if document.ready_state() == "loading" {
        EventListener::once(&document, "DOMContentLoaded", move |_| {
            mount(config);
        })
        .forget();
    } else {
        mount(config);
    }
}
