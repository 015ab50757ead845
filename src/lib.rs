//! Interactive pieces of the marketing site: carousels, the mobile menu
//! drawer, count-up statistics and smooth anchor scrolling.
//!
//! All state is per instance and every handler is attached exactly once by
//! [`page::mount`]. Absent markup disables the matching feature instead of
//! failing the page.

use log::{info, warn};
use std::fmt;
use wasm_bindgen::prelude::*;

pub mod carousel;
pub mod config;
pub mod counter;
pub mod dom;
pub mod menu;
pub mod page;
pub mod scroll;
pub mod timer;
pub mod utils;

use config::SiteConfig;

#[derive(Debug, Clone, PartialEq)]
pub enum UiError {
    /// An expected control or region is not in the page.
    MissingElement(String),
    /// A selector matched nothing.
    EmptyCollection(String),
    InvalidConfig(String),
    /// A DOM call threw.
    Dom(String),
}

impl fmt::Display for UiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UiError::MissingElement(what) => write!(f, "Missing element: {}", what),
            UiError::EmptyCollection(selector) => {
                write!(f, "No elements match {}", selector)
            }
            UiError::InvalidConfig(msg) => write!(f, "Invalid configuration: {}", msg),
            UiError::Dom(msg) => write!(f, "DOM error: {}", msg),
        }
    }
}

impl std::error::Error for UiError {}

impl From<JsValue> for UiError {
    fn from(value: JsValue) -> Self {
        UiError::Dom(value.as_string().unwrap_or_else(|| format!("{:?}", value)))
    }
}

/// Install the console logger at `Info`.
///
/// Runs before anything is read from the page so configuration warnings are
/// not lost. The logger passes everything; `log::max_level` does the filtering.
pub fn install_logger() {
    // a host page may have installed a logger already
    let _ = console_log::init_with_level(log::Level::Debug);
    log::set_max_level(log::LevelFilter::Info);
}

/// Raise verbosity to `Debug` when the config asks for it.
pub fn apply_log_level(debug: bool) {
    log::set_max_level(if debug {
        log::LevelFilter::Debug
    } else {
        log::LevelFilter::Info
    });
}

/// Browser entry: read the inline config and mount when the DOM is ready.
pub fn boot() {
    install_logger();
    let config = page::config_from_page();
    apply_log_level(config.debug);
    info!("site_ui {} booting", env!("CARGO_PKG_VERSION"));
    page::mount_when_ready(config);
}

/// Mount from JavaScript with a plain config object (or `undefined` for defaults).
///
/// Resolves to `false` if the page was already mounted.
#[wasm_bindgen(js_name = mountSite)]
pub fn mount_site(config: JsValue) -> Result<bool, JsValue> {
    install_logger();
    let config: SiteConfig = if config.is_undefined() || config.is_null() {
        SiteConfig::default()
    } else {
        serde_wasm_bindgen::from_value(config)
            .map_err(|e| JsValue::from_str(&format!("Failed to deserialize config: {}", e)))?
    };
    if let Err(e) = config.validate() {
        warn!("{}", e);
        return Err(JsValue::from_str(&e.to_string()));
    }
    apply_log_level(config.debug);
    Ok(page::mount(config))
}
