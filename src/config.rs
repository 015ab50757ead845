//! Page-level configuration: constants plus the serde-backed `SiteConfig`.

use crate::UiError;
use serde::Deserialize;

// Visual state
pub const ACTIVE_CLASS: &str = "active";
pub const OPEN_CLASS: &str = "open";

// Carousel timing
pub const DEFAULT_INTERVAL_MS: u32 = 5_000;
pub const MIN_INTERVAL_MS: u32 = 1_000;
pub const MAX_INTERVAL_MS: u32 = 60_000;
pub const INTERVAL_ATTRIBUTE: &str = "data-interval";
pub const SWIPE_THRESHOLD_PX: i32 = 50;

// Menu drawer
pub const WIDE_BREAKPOINT_PX: f64 = 992.0;

// Counters
pub const COUNTER_DURATION_MS: u32 = 2_000;
pub const COUNTER_FRAME_MS: u32 = 20;
pub const COUNTER_THRESHOLD: f64 = 0.5;

// Anchor scrolling
pub const SCROLL_OFFSET_PX: f64 = 100.0;

/// Id of the inline `<script type="application/json">` holding overrides.
pub const CONFIG_ELEMENT_ID: &str = "site-ui-config";

/// Selectors and timing for one carousel region.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CarouselConfig {
    /// Region the other selectors are resolved in. `None` means the whole document.
    pub root: Option<String>,
    pub slides: String,
    pub indicators: Option<String>,
    pub prev: Option<String>,
    pub next: Option<String>,
    /// Container whose hover/focus pauses auto-advance. Defaults to `root`.
    pub hover: Option<String>,
    pub interval_ms: u32,
}

impl Default for CarouselConfig {
    fn default() -> Self {
        Self {
            root: None,
            slides: ".slide".to_string(),
            indicators: None,
            prev: None,
            next: None,
            hover: None,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }
}

impl CarouselConfig {
    /// The hero banner at the top of the landing pages.
    pub fn hero() -> Self {
        Self {
            root: Some(".hero-slider".to_string()),
            slides: ".hero-slide".to_string(),
            indicators: Some(".hero-dot".to_string()),
            prev: Some(".hero-prev".to_string()),
            next: Some(".hero-next".to_string()),
            hover: None,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }

    /// The office photo strip on the about page.
    pub fn office() -> Self {
        Self {
            root: Some(".office-slider-container".to_string()),
            slides: ".slide".to_string(),
            indicators: Some(".dot".to_string()),
            prev: Some(".prev-btn".to_string()),
            next: Some(".next-btn".to_string()),
            hover: None,
            interval_ms: DEFAULT_INTERVAL_MS,
        }
    }

    /// Human-readable name for log lines.
    pub fn label(&self) -> &str {
        self.root.as_deref().unwrap_or(&self.slides)
    }

    fn validate(&self) -> Result<(), UiError> {
        if self.slides.trim().is_empty() {
            return Err(UiError::InvalidConfig(
                "carousel slide selector cannot be empty".to_string(),
            ));
        }
        if !(MIN_INTERVAL_MS..=MAX_INTERVAL_MS).contains(&self.interval_ms) {
            return Err(UiError::InvalidConfig(format!(
                "carousel {} interval {}ms outside {}..={}ms",
                self.label(),
                self.interval_ms,
                MIN_INTERVAL_MS,
                MAX_INTERVAL_MS
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct MenuConfig {
    pub trigger_id: String,
    pub close_id: String,
    pub drawer_id: String,
    pub nav_links: String,
    pub open_class: String,
    pub breakpoint_px: f64,
}

impl Default for MenuConfig {
    fn default() -> Self {
        Self {
            trigger_id: "menuBtn".to_string(),
            close_id: "closeBtn".to_string(),
            drawer_id: "mobileDrawer".to_string(),
            nav_links: ".mobile-nav a".to_string(),
            open_class: OPEN_CLASS.to_string(),
            breakpoint_px: WIDE_BREAKPOINT_PX,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct CounterConfig {
    pub selector: String,
    pub attribute: String,
    pub duration_ms: u32,
    pub frame_ms: u32,
    pub threshold: f64,
}

impl Default for CounterConfig {
    fn default() -> Self {
        Self {
            selector: "[data-target]".to_string(),
            attribute: "data-target".to_string(),
            duration_ms: COUNTER_DURATION_MS,
            frame_ms: COUNTER_FRAME_MS,
            threshold: COUNTER_THRESHOLD,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct ScrollConfig {
    pub links: String,
    pub offset_px: f64,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        Self {
            links: "a[href^=\"#\"]".to_string(),
            offset_px: SCROLL_OFFSET_PX,
        }
    }
}

/// Everything the page mounter needs. Missing fields fall back to defaults.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct SiteConfig {
    pub debug: bool,
    pub carousels: Vec<CarouselConfig>,
    pub menu: MenuConfig,
    pub counters: CounterConfig,
    pub scroll: ScrollConfig,
}

impl Default for SiteConfig {
    fn default() -> Self {
        Self {
            debug: false,
            carousels: vec![CarouselConfig::hero(), CarouselConfig::office()],
            menu: MenuConfig::default(),
            counters: CounterConfig::default(),
            scroll: ScrollConfig::default(),
        }
    }
}

impl SiteConfig {
    /// Parse and validate a JSON document.
    pub fn from_json(raw: &str) -> Result<Self, UiError> {
        let config: SiteConfig = serde_json::from_str(raw)
            .map_err(|e| UiError::InvalidConfig(format!("config JSON: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), UiError> {
        for carousel in &self.carousels {
            carousel.validate()?;
        }
        if self.counters.duration_ms == 0 || self.counters.frame_ms == 0 {
            return Err(UiError::InvalidConfig(
                "counter duration and frame must be positive".to_string(),
            ));
        }
        if !(self.counters.threshold > 0.0 && self.counters.threshold <= 1.0) {
            return Err(UiError::InvalidConfig(format!(
                "counter threshold {} outside (0, 1]",
                self.counters.threshold
            )));
        }
        if self.menu.breakpoint_px <= 0.0 {
            return Err(UiError::InvalidConfig(
                "menu breakpoint must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_describe_both_site_carousels() {
        let config = SiteConfig::default();
        assert_eq!(config.carousels.len(), 2);
        assert_eq!(config.carousels[0].slides, ".hero-slide");
        assert_eq!(config.carousels[1].root.as_deref(), Some(".office-slider-container"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_json_keeps_defaults() {
        let config = SiteConfig::from_json(r#"{ "scroll": { "offset_px": 64 } }"#).unwrap();
        assert_eq!(config.scroll.offset_px, 64.0);
        assert_eq!(config.scroll.links, ScrollConfig::default().links);
        assert_eq!(config.menu, MenuConfig::default());
        assert_eq!(config.carousels.len(), 2);
    }

    #[test]
    fn carousel_entries_fill_missing_fields() {
        let config = SiteConfig::from_json(
            r##"{ "carousels": [ { "root": "#team", "slides": ".member", "interval_ms": 4000 } ] }"##,
        )
        .unwrap();
        let team = &config.carousels[0];
        assert_eq!(team.interval_ms, 4000);
        assert_eq!(team.indicators, None);
        assert_eq!(team.label(), "#team");
    }

    #[test]
    fn rejects_out_of_range_interval() {
        let err = SiteConfig::from_json(r#"{ "carousels": [ { "interval_ms": 10 } ] }"#)
            .unwrap_err();
        assert!(matches!(err, UiError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_bad_threshold_and_malformed_json() {
        assert!(SiteConfig::from_json(r#"{ "counters": { "threshold": 0 } }"#).is_err());
        assert!(SiteConfig::from_json("{ not json").is_err());
    }
}
