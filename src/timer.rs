//! Recurring timers behind a small trait.
//!
//! A `Scheduler` hands out a handle per recurring callback. Dropping the
//! handle cancels the callback, so "at most one live timer" reduces to
//! "at most one stored handle".

use gloo_timers::callback::Interval;

pub trait Scheduler {
    type Handle: 'static;

    /// Invoke `tick` every `period_ms` until the returned handle is dropped.
    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> Self::Handle;
}

/// Browser scheduler backed by `setInterval`.
#[derive(Debug, Clone, Copy, Default)]
pub struct IntervalScheduler;

impl Scheduler for IntervalScheduler {
    type Handle = Interval;

    fn every(&self, period_ms: u32, tick: Box<dyn FnMut()>) -> Interval {
        Interval::new(period_ms, tick)
    }
}
