//! Auto-advancing carousel.
//!
//! [`Carousel`] owns the slide/indicator markers, the current index and at
//! most one recurring timer. It is generic over the marker (a DOM element in
//! the browser) and the scheduler so that the state machine is testable on
//! the host. [`bind`] wires one carousel region of the page to it.

use crate::config::{CarouselConfig, INTERVAL_ATTRIBUTE, SWIPE_THRESHOLD_PX};
use crate::dom::{self, Marker};
use crate::timer::{IntervalScheduler, Scheduler};
use crate::utils::{validate_interval_ms, wrap_index};
use crate::UiError;
use gloo_events::EventListener;
use log::{debug, warn};
use std::cell::{Cell, RefCell};
use std::rc::{Rc, Weak};
use wasm_bindgen::JsCast;
use web_sys::{Element, Event, FocusEvent, KeyboardEvent, Node, TouchEvent};

/// Reasons auto-advance is held back. Each is released independently.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hold {
    Hover,
    Focus,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
struct Holds {
    hover: bool,
    focus: bool,
}

impl Holds {
    fn set(&mut self, hold: Hold, on: bool) {
        match hold {
            Hold::Hover => self.hover = on,
            Hold::Focus => self.focus = on,
        }
    }

    fn is_set(&self, hold: Hold) -> bool {
        match hold {
            Hold::Hover => self.hover,
            Hold::Focus => self.focus,
        }
    }

    fn any(&self) -> bool {
        self.hover || self.focus
    }
}

/// Direction of a completed horizontal swipe.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Swipe {
    Left,
    Right,
}

/// Remembers where a touch began until it ends.
#[derive(Debug, Default)]
pub struct SwipeTracker {
    start_x: Cell<Option<i32>>,
}

impl SwipeTracker {
    pub fn begin(&self, x: Option<i32>) {
        self.start_x.set(x);
    }

    /// Close the gesture. A touch that never began yields nothing.
    pub fn finish(&self, end_x: Option<i32>, threshold: i32) -> Option<Swipe> {
        let start_x = self.start_x.take()?;
        swipe_direction(start_x, end_x?, threshold)
    }
}

/// Classify a touch gesture by its horizontal travel.
pub fn swipe_direction(start_x: i32, end_x: i32, threshold: i32) -> Option<Swipe> {
    let dx = end_x - start_x;
    if dx <= -threshold {
        Some(Swipe::Left)
    } else if dx >= threshold {
        Some(Swipe::Right)
    } else {
        None
    }
}

pub struct Carousel<M: Marker, S: Scheduler> {
    slides: Vec<M>,
    indicators: Vec<M>,
    current: Cell<usize>,
    interval_ms: u32,
    scheduler: S,
    timer: RefCell<Option<S::Handle>>,
    holds: Cell<Holds>,
    this: Weak<Self>,
}

impl<M: Marker + 'static, S: Scheduler + 'static> Carousel<M, S> {
    /// Build a carousel, mark the first slide active and start auto-advance.
    pub fn new(slides: Vec<M>, indicators: Vec<M>, interval_ms: u32, scheduler: S) -> Rc<Self> {
        if !indicators.is_empty() && indicators.len() != slides.len() {
            warn!(
                "Carousel has {} slides but {} indicators",
                slides.len(),
                indicators.len()
            );
        }

        let carousel = Rc::new_cyclic(|this| Carousel {
            slides,
            indicators,
            current: Cell::new(0),
            interval_ms,
            scheduler,
            timer: RefCell::new(None),
            holds: Cell::new(Holds::default()),
            this: this.clone(),
        });
        carousel.go_to(0);
        carousel.start();
        carousel
    }

    pub fn is_empty(&self) -> bool {
        self.slides.is_empty()
    }

    /// Index of the active slide, `None` for an empty carousel.
    pub fn current_index(&self) -> Option<usize> {
        (!self.slides.is_empty()).then(|| self.current.get())
    }

    pub fn interval_ms(&self) -> u32 {
        self.interval_ms
    }

    pub fn is_running(&self) -> bool {
        self.timer.borrow().is_some()
    }

    /// Activate the slide at `index`, wrapping past either end.
    ///
    /// Leaves the timer alone. Does nothing for an empty carousel.
    pub fn go_to(&self, index: isize) {
        let Some(index) = wrap_index(index, self.slides.len()) else {
            return;
        };
        self.current.set(index);

        for marker in self.slides.iter().chain(self.indicators.iter()) {
            marker.set_active(false);
        }
        self.slides[index].set_active(true);
        if let Some(indicator) = self.indicators.get(index) {
            indicator.set_active(true);
        }
    }

    pub fn next(&self) {
        self.go_to(self.current.get() as isize + 1);
    }

    pub fn previous(&self) {
        self.go_to(self.current.get() as isize - 1);
    }

    /// Begin auto-advance, replacing any live timer.
    ///
    /// Stays paused while a hold is active or there is nothing to show.
    pub fn start(&self) {
        self.stop();
        if self.slides.is_empty() {
            return;
        }
        if self.holds.get().any() {
            debug!("Carousel held, not starting auto-advance");
            return;
        }

        let this = self.this.clone();
        let handle = self.scheduler.every(
            self.interval_ms,
            Box::new(move || {
                if let Some(carousel) = this.upgrade() {
                    carousel.next();
                }
            }),
        );
        *self.timer.borrow_mut() = Some(handle);
    }

    pub fn stop(&self) {
        let handle = self.timer.borrow_mut().take();
        drop(handle);
    }

    pub fn restart(&self) {
        self.stop();
        self.start();
    }

    pub fn hold(&self, hold: Hold) {
        let mut holds = self.holds.get();
        holds.set(hold, true);
        self.holds.set(holds);
        self.stop();
    }

    /// Drop one hold; auto-advance resumes once none remain.
    pub fn release(&self, hold: Hold) {
        let mut holds = self.holds.get();
        if !holds.is_set(hold) {
            return;
        }
        holds.set(hold, false);
        self.holds.set(holds);
        if !holds.any() {
            self.start();
        }
    }

    /// Focus moved into the region.
    ///
    /// Only keyboard focus pauses. A mouse or tap on a control also focuses
    /// it, and that must not outlive the hover.
    pub fn focus_entered(&self, by_pointer: bool) {
        if !by_pointer {
            self.hold(Hold::Focus);
        }
    }

    pub fn focus_left(&self) {
        self.release(Hold::Focus);
    }

    // User-driven navigation resets the auto-advance clock.

    pub fn manual_go_to(&self, index: isize) {
        self.go_to(index);
        self.restart();
    }

    pub fn manual_next(&self) {
        self.next();
        self.restart();
    }

    pub fn manual_previous(&self) {
        self.previous();
        self.restart();
    }
}

// ──────────────────────────────────────────────────────────────────────────────
// DOM binding

pub type PageCarousel = Carousel<Element, IntervalScheduler>;

/// A mounted carousel and the listeners feeding it.
pub struct CarouselBinding {
    pub label: String,
    pub carousel: Rc<PageCarousel>,
    _listeners: Vec<EventListener>,
}

impl CarouselBinding {
    pub fn stop(&self) {
        self.carousel.stop();
    }
}

fn interval_for(root: &Element, config: &CarouselConfig) -> u32 {
    match root.get_attribute(INTERVAL_ATTRIBUTE) {
        Some(raw) => match validate_interval_ms(&raw) {
            Ok(ms) => ms,
            Err(e) => {
                warn!("{}: ignoring {}: {}", config.label(), INTERVAL_ATTRIBUTE, e);
                config.interval_ms
            }
        },
        None => config.interval_ms,
    }
}

fn on_click(
    target: &Element,
    carousel: &Rc<PageCarousel>,
    action: impl Fn(&PageCarousel) + 'static,
) -> EventListener {
    let carousel = Rc::downgrade(carousel);
    EventListener::new(target, "click", move |_event: &Event| {
        if let Some(carousel) = carousel.upgrade() {
            action(&*carousel);
        }
    })
}

/// Attach a carousel to the region described by `config`.
pub fn bind(config: &CarouselConfig) -> Result<CarouselBinding, UiError> {
    let root = match &config.root {
        Some(selector) => dom::query(&dom::document_root()?, selector)?
            .ok_or_else(|| UiError::MissingElement(selector.clone()))?,
        None => dom::document_root()?,
    };

    let slides = dom::query_all(&root, &config.slides)?;
    if slides.is_empty() {
        return Err(UiError::EmptyCollection(config.slides.clone()));
    }
    let indicators = match &config.indicators {
        Some(selector) => dom::query_all(&root, selector)?,
        None => Vec::new(),
    };

    let carousel = Carousel::new(
        slides,
        indicators.clone(),
        interval_for(&root, config),
        IntervalScheduler,
    );
    let mut listeners = Vec::new();

    if let Some(prev) = dom::query_optional(&root, config.prev.as_deref())? {
        listeners.push(on_click(&prev, &carousel, |c| c.manual_previous()));
    }
    if let Some(next) = dom::query_optional(&root, config.next.as_deref())? {
        listeners.push(on_click(&next, &carousel, |c| c.manual_next()));
    }
    for (i, indicator) in indicators.iter().enumerate() {
        listeners.push(on_click(indicator, &carousel, move |c| {
            c.manual_go_to(i as isize)
        }));
    }

    let hover = match &config.hover {
        Some(selector) => dom::query(&root, selector)?,
        None if config.root.is_some() => Some(root.clone()),
        None => None,
    };
    if let Some(region) = hover {
        listeners.extend(region_listeners(&region, &carousel));
    } else {
        debug!("{}: no hover region, auto-advance never pauses", config.label());
    }
    debug!("{}: advancing every {}ms", config.label(), carousel.interval_ms());

    Ok(CarouselBinding {
        label: config.label().to_string(),
        carousel,
        _listeners: listeners,
    })
}

fn touch_x(event: &Event) -> Option<i32> {
    event
        .dyn_ref::<TouchEvent>()
        .and_then(|e| e.changed_touches().get(0))
        .map(|t| t.client_x())
}

/// Hover, focus, keyboard and swipe handling on the carousel region.
fn region_listeners(region: &Element, carousel: &Rc<PageCarousel>) -> Vec<EventListener> {
    let mut listeners = Vec::new();

    let weak = Rc::downgrade(carousel);
    listeners.push(EventListener::new(region, "mouseenter", move |_| {
        if let Some(c) = weak.upgrade() {
            c.hold(Hold::Hover);
        }
    }));

    let weak = Rc::downgrade(carousel);
    listeners.push(EventListener::new(region, "mouseleave", move |_| {
        if let Some(c) = weak.upgrade() {
            c.release(Hold::Hover);
        }
    }));

    // set between mousedown and mouseup, when the browser focuses the pressed control
    let pointer_down = Rc::new(Cell::new(false));
    let pressed = pointer_down.clone();
    listeners.push(EventListener::new(region, "mousedown", move |_| pressed.set(true)));
    let pressed = pointer_down.clone();
    listeners.push(EventListener::new(region, "mouseup", move |_| pressed.set(false)));

    let weak = Rc::downgrade(carousel);
    listeners.push(EventListener::new(region, "focusin", move |_| {
        if let Some(c) = weak.upgrade() {
            c.focus_entered(pointer_down.get());
        }
    }));

    let weak = Rc::downgrade(carousel);
    let container: Node = region.clone().into();
    listeners.push(EventListener::new(region, "focusout", move |event| {
        let staying_inside = event
            .dyn_ref::<FocusEvent>()
            .and_then(|e| e.related_target())
            .and_then(|t| t.dyn_into::<Node>().ok())
            .map(|node| container.contains(Some(&node)))
            .unwrap_or(false);
        if staying_inside {
            return;
        }
        if let Some(c) = weak.upgrade() {
            c.focus_left();
        }
    }));

    let weak = Rc::downgrade(carousel);
    listeners.push(EventListener::new(region, "keydown", move |event| {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        let Some(c) = weak.upgrade() else {
            return;
        };
        match event.key().as_str() {
            "ArrowLeft" => c.manual_previous(),
            "ArrowRight" => c.manual_next(),
            _ => {}
        }
    }));

    let tracker = Rc::new(SwipeTracker::default());
    let start = tracker.clone();
    listeners.push(EventListener::new(region, "touchstart", move |event| {
        start.begin(touch_x(event));
    }));

    let weak = Rc::downgrade(carousel);
    listeners.push(EventListener::new(region, "touchend", move |event| {
        let swipe = tracker.finish(touch_x(event), SWIPE_THRESHOLD_PX);
        let Some(c) = weak.upgrade() else {
            return;
        };
        match swipe {
            Some(Swipe::Left) => c.manual_next(),
            Some(Swipe::Right) => c.manual_previous(),
            None => {}
        }
    }));

    listeners
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::timer::manual::ManualClock;

    /// Marker that just remembers whether it is active.
    #[derive(Clone, Default)]
    struct Flag(Rc<Cell<bool>>);

    impl Marker for Flag {
        fn set_active(&self, active: bool) {
            self.0.set(active);
        }
    }

    fn flags(n: usize) -> Vec<Flag> {
        (0..n).map(|_| Flag::default()).collect()
    }

    fn active(markers: &[Flag]) -> Vec<usize> {
        markers
            .iter()
            .enumerate()
            .filter(|(_, f)| f.0.get())
            .map(|(i, _)| i)
            .collect()
    }

    const TICK: u32 = 5_000;

    fn carousel(n: usize, dots: usize) -> (Rc<Carousel<Flag, ManualClock>>, Vec<Flag>, Vec<Flag>, ManualClock) {
        let slides = flags(n);
        let indicators = flags(dots);
        let clock = ManualClock::new();
        let c = Carousel::new(slides.clone(), indicators.clone(), TICK, clock.clone());
        (c, slides, indicators, clock)
    }

    #[test]
    fn construction_activates_first_slide_and_runs() {
        let (c, slides, dots, clock) = carousel(3, 3);
        assert_eq!(c.current_index(), Some(0));
        assert_eq!(active(&slides), vec![0]);
        assert_eq!(active(&dots), vec![0]);
        assert!(c.is_running());
        assert_eq!(clock.live_timers(), 1);
    }

    #[test]
    fn next_three_times_cycles_back() {
        let (c, slides, dots, _clock) = carousel(3, 3);
        let mut seen = Vec::new();
        for _ in 0..3 {
            c.next();
            seen.push(c.current_index().unwrap());
            assert_eq!(active(&slides), active(&dots));
        }
        assert_eq!(seen, vec![1, 2, 0]);
    }

    #[test]
    fn previous_from_first_wraps_to_last() {
        let (c, slides, _dots, _clock) = carousel(3, 3);
        c.previous();
        assert_eq!(c.current_index(), Some(2));
        assert_eq!(active(&slides), vec![2]);
    }

    #[test]
    fn go_to_wraps_at_both_edges() {
        let (c, _slides, _dots, _clock) = carousel(4, 0);
        c.go_to(2);
        c.go_to(4);
        assert_eq!(c.current_index(), Some(0));
        c.go_to(-1);
        assert_eq!(c.current_index(), Some(3));
    }

    #[test]
    fn exactly_one_marker_pair_active_through_any_walk() {
        let (c, slides, dots, _clock) = carousel(5, 5);
        let moves = [1, 1, -1, 1, 1, 1, 1, 1, -1, -1, -1, -1, -1, -1, 1];
        for step in moves {
            if step > 0 {
                c.next();
            } else {
                c.previous();
            }
            let idx = c.current_index().unwrap();
            assert!(idx < 5);
            assert_eq!(active(&slides), vec![idx]);
            assert_eq!(active(&dots), vec![idx]);
        }
    }

    #[test]
    fn auto_advance_ticks_once_per_interval() {
        let (c, _slides, _dots, clock) = carousel(3, 3);
        clock.advance(u64::from(TICK) - 1);
        assert_eq!(c.current_index(), Some(0));
        clock.advance(1);
        assert_eq!(c.current_index(), Some(1));
        clock.advance(u64::from(TICK) * 2);
        assert_eq!(c.current_index(), Some(0));
    }

    #[test]
    fn repeated_start_keeps_a_single_timer() {
        let (c, _slides, _dots, clock) = carousel(4, 0);
        c.start();
        c.start();
        assert_eq!(clock.live_timers(), 1);
        // N ticks over N slides lands back where it began
        clock.advance(u64::from(TICK) * 4);
        assert_eq!(c.current_index(), Some(0));
    }

    #[test]
    fn rapid_manual_navigation_resets_the_clock_without_piling_up() {
        let (c, _slides, _dots, clock) = carousel(5, 5);
        for _ in 0..10 {
            clock.advance(1_000);
            c.manual_next();
        }
        assert_eq!(clock.live_timers(), 1);
        assert_eq!(c.current_index(), Some(0));
        // the clock restarted at the last click
        clock.advance(u64::from(TICK) - 1);
        assert_eq!(c.current_index(), Some(0));
        clock.advance(1);
        assert_eq!(c.current_index(), Some(1));
    }

    #[test]
    fn manual_go_to_on_indicator() {
        let (c, slides, dots, clock) = carousel(3, 3);
        c.manual_go_to(2);
        assert_eq!(active(&slides), vec![2]);
        assert_eq!(active(&dots), vec![2]);
        assert_eq!(clock.live_timers(), 1);
    }

    #[test]
    fn stop_is_idempotent() {
        let (c, _slides, _dots, clock) = carousel(3, 0);
        c.stop();
        c.stop();
        assert!(!c.is_running());
        clock.advance(u64::from(TICK) * 3);
        assert_eq!(c.current_index(), Some(0));
    }

    #[test]
    fn hover_pauses_until_leave() {
        let (c, _slides, _dots, clock) = carousel(3, 3);
        clock.advance(3_000);
        c.hold(Hold::Hover);
        clock.advance(u64::from(TICK) * 10);
        assert_eq!(c.current_index(), Some(0));

        // clicking while hovered does not resume auto-advance
        c.manual_next();
        assert!(!c.is_running());
        clock.advance(u64::from(TICK) * 10);
        assert_eq!(c.current_index(), Some(1));

        c.release(Hold::Hover);
        assert!(c.is_running());
        clock.advance(u64::from(TICK));
        assert_eq!(c.current_index(), Some(2));
    }

    #[test]
    fn clicked_control_focus_does_not_outlive_hover() {
        let (c, _slides, _dots, clock) = carousel(3, 3);
        c.hold(Hold::Hover);
        // pressing "next" focuses the button
        c.focus_entered(true);
        c.manual_next();
        c.release(Hold::Hover);
        assert!(c.is_running());
        clock.advance(u64::from(TICK));
        assert_eq!(c.current_index(), Some(2));
    }

    #[test]
    fn keyboard_focus_pauses_until_focus_leaves() {
        let (c, _slides, _dots, clock) = carousel(3, 3);
        c.focus_entered(false);
        assert!(!c.is_running());
        clock.advance(u64::from(TICK) * 3);
        assert_eq!(c.current_index(), Some(0));
        c.focus_left();
        assert!(c.is_running());
    }

    #[test]
    fn releasing_an_unset_hold_keeps_the_clock() {
        let (c, _slides, _dots, clock) = carousel(3, 0);
        clock.advance(4_000);
        c.focus_left();
        clock.advance(1_000);
        assert_eq!(c.current_index(), Some(1));
    }

    #[test]
    fn holds_release_independently() {
        let (c, _slides, _dots, _clock) = carousel(3, 0);
        c.hold(Hold::Hover);
        c.hold(Hold::Focus);
        c.release(Hold::Hover);
        assert!(!c.is_running());
        c.release(Hold::Focus);
        assert!(c.is_running());
    }

    #[test]
    fn empty_carousel_is_inert() {
        let (c, _slides, _dots, clock) = carousel(0, 0);
        assert!(c.is_empty());
        assert_eq!(c.current_index(), None);
        assert!(!c.is_running());
        c.next();
        c.previous();
        c.go_to(7);
        c.go_to(-3);
        c.start();
        c.manual_next();
        c.stop();
        assert_eq!(clock.live_timers(), 0);
        assert_eq!(c.current_index(), None);
    }

    #[test]
    fn empty_carousel_leaves_indicators_inactive() {
        let (c, _slides, dots, _clock) = carousel(0, 2);
        c.go_to(1);
        assert!(active(&dots).is_empty());
    }

    #[test]
    fn short_indicator_list_does_not_block_slides() {
        let (c, slides, dots, _clock) = carousel(4, 2);
        c.go_to(3);
        assert_eq!(active(&slides), vec![3]);
        assert!(active(&dots).is_empty());
        c.go_to(1);
        assert_eq!(active(&dots), vec![1]);
    }

    #[test]
    fn dropping_the_carousel_cancels_its_timer() {
        let (c, _slides, _dots, clock) = carousel(3, 0);
        drop(c);
        assert_eq!(clock.live_timers(), 0);
    }

    #[test]
    fn instances_do_not_share_state() {
        let clock = ManualClock::new();
        let hero = Carousel::new(flags(3), flags(3), 5_000, clock.clone());
        let office = Carousel::new(flags(4), flags(4), 4_000, clock.clone());
        hero.manual_next();
        office.hold(Hold::Hover);
        clock.advance(5_000);
        assert_eq!(hero.current_index(), Some(2));
        assert_eq!(office.current_index(), Some(0));
        assert_eq!(clock.live_timers(), 1);
    }

    #[test]
    fn swipe_tracker_pairs_start_and_end() {
        let tracker = SwipeTracker::default();
        assert_eq!(tracker.finish(Some(10), 50), None);
        tracker.begin(Some(300));
        assert_eq!(tracker.finish(Some(120), 50), Some(Swipe::Left));
        // the gesture is consumed
        assert_eq!(tracker.finish(Some(0), 50), None);
        tracker.begin(Some(100));
        assert_eq!(tracker.finish(None, 50), None);
        tracker.begin(None);
        assert_eq!(tracker.finish(Some(400), 50), None);
    }

    #[test]
    fn swipe_needs_enough_travel() {
        assert_eq!(swipe_direction(200, 100, 50), Some(Swipe::Left));
        assert_eq!(swipe_direction(100, 150, 50), Some(Swipe::Right));
        assert_eq!(swipe_direction(100, 130, 50), None);
        assert_eq!(swipe_direction(100, 71, 50), None);
    }
}
