//! Count-up statistics that animate once when scrolled into view.

use crate::config::CounterConfig;
use crate::dom;
use crate::utils::parse_count_target;
use crate::UiError;
use futures::{future, stream, StreamExt};
use gloo_timers::future::IntervalStream;
use log::{debug, warn};
use std::cell::Cell;
use std::rc::Rc;
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;
use web_sys::{Element, IntersectionObserver, IntersectionObserverEntry, IntersectionObserverInit};

/// Displayed values for one run of the animation, ending exactly on the target.
#[derive(Debug, Clone)]
pub struct CountUp {
    target: u64,
    steps: u32,
    step: u32,
}

impl CountUp {
    pub fn new(target: u64, duration_ms: u32, frame_ms: u32) -> Self {
        let steps = (duration_ms / frame_ms.max(1)).max(1);
        Self {
            target,
            steps,
            step: 0,
        }
    }

    pub fn steps(&self) -> u32 {
        self.steps
    }
}

impl Iterator for CountUp {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        if self.step >= self.steps {
            return None;
        }
        self.step += 1;
        if self.step == self.steps {
            return Some(self.target);
        }
        let value = u128::from(self.target) * u128::from(self.step) / u128::from(self.steps);
        Some(value as u64)
    }
}

/// Text for each frame. Intermediate frames are bare digits; the last one is
/// the text the page authored (`"1,200+"`), so separators and suffixes survive.
pub fn frame_texts(frames: CountUp, authored: String) -> impl Iterator<Item = String> {
    let last = frames.steps();
    frames.zip(1..).map(move |(value, frame)| {
        if frame == last {
            authored.clone()
        } else {
            value.to_string()
        }
    })
}

/// Tracks whether a counter has already been triggered.
#[derive(Debug, Default)]
pub struct OnceTrigger {
    fired: Cell<bool>,
}

impl OnceTrigger {
    /// True exactly once: the first time visibility reaches `threshold`.
    pub fn observe(&self, ratio: f64, threshold: f64) -> bool {
        if self.fired.get() || ratio < threshold {
            return false;
        }
        self.fired.set(true);
        true
    }

    pub fn has_fired(&self) -> bool {
        self.fired.get()
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// DOM binding

struct Counter {
    element: Element,
    target: u64,
    authored: String,
    trigger: OnceTrigger,
}

type ObserverCallback = Closure<dyn FnMut(js_sys::Array, IntersectionObserver)>;

pub struct CounterBinding {
    observer: Option<IntersectionObserver>,
    _callback: Option<ObserverCallback>,
}

impl Drop for CounterBinding {
    fn drop(&mut self) {
        if let Some(observer) = &self.observer {
            observer.disconnect();
        }
    }
}

fn animate(element: Element, target: u64, authored: String, config: &CounterConfig) {
    let frames = CountUp::new(target, config.duration_ms, config.frame_ms);
    let frame_ms = config.frame_ms;
    element.set_text_content(Some("0"));
    wasm_bindgen_futures::spawn_local(async move {
        IntervalStream::new(frame_ms)
            .zip(stream::iter(frame_texts(frames, authored)))
            .for_each(|(_, text)| {
                element.set_text_content(Some(&text));
                future::ready(())
            })
            .await;
    });
}

pub fn bind(config: &CounterConfig) -> Result<CounterBinding, UiError> {
    let mut counters = Vec::new();
    for element in dom::query_all(&dom::document_root()?, &config.selector)? {
        let raw = element.get_attribute(&config.attribute).unwrap_or_default();
        match parse_count_target(&raw) {
            Ok(target) => counters.push(Counter {
                element,
                target,
                authored: raw.trim().to_string(),
                trigger: OnceTrigger::default(),
            }),
            Err(e) => warn!("Skipping counter: {}", e),
        }
    }
    if counters.is_empty() {
        return Err(UiError::EmptyCollection(config.selector.clone()));
    }

    let counters = Rc::new(counters);
    let settings = config.clone();
    let seen = counters.clone();
    let callback: ObserverCallback = Closure::new(
        move |entries: js_sys::Array, observer: IntersectionObserver| {
            for entry in entries.iter() {
                let Ok(entry) = entry.dyn_into::<IntersectionObserverEntry>() else {
                    continue;
                };
                if !entry.is_intersecting() {
                    continue;
                }
                let element = entry.target();
                let Some(counter) = seen.iter().find(|c| c.element == element) else {
                    continue;
                };
                if counter.trigger.observe(entry.intersection_ratio(), settings.threshold) {
                    observer.unobserve(&counter.element);
                    animate(
                        counter.element.clone(),
                        counter.target,
                        counter.authored.clone(),
                        &settings,
                    );
                }
            }
        },
    );

    let init = IntersectionObserverInit::new();
    init.set_threshold(&JsValue::from_f64(config.threshold));
    let observer = match IntersectionObserver::new_with_options(
        callback.as_ref().unchecked_ref(),
        &init,
    ) {
        Ok(observer) => observer,
        Err(e) => {
            debug!("IntersectionObserver unavailable ({:?}), showing final counts", e);
            for counter in counters.iter() {
                counter.element.set_text_content(Some(&counter.authored));
            }
            return Ok(CounterBinding {
                observer: None,
                _callback: None,
            });
        }
    };
    for counter in counters.iter() {
        observer.observe(&counter.element);
    }

    Ok(CounterBinding {
        observer: Some(observer),
        _callback: Some(callback),
    })
}
