//! Synthetic clock: ticks only when the caller says so.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::{Scheduler, TickCallback, TickControl};

#[derive(Default)]
struct Inner {
    callback: Option<TickCallback>,
    running:  bool,
    interval: Duration,
    ticks:    u64,
}

/// A [`Scheduler`] driven entirely by explicit [`advance`][Self::advance]
/// calls.
///
/// Cloning yields another handle to the same clock, so a test can keep one
/// handle while the simulator owns the other.
#[derive(Clone, Default)]
pub struct ManualScheduler {
    inner: Arc<Mutex<Inner>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Deliver one tick of length `dt`.  Returns `false` (and does nothing)
    /// if the scheduler is stopped or has no callback.
    pub fn advance(&self, dt: Duration) -> bool {
        // Run the callback outside the lock so it may use other handles.
        let mut callback = {
            let mut inner = self.inner.lock();
            if !inner.running {
                return false;
            }
            match inner.callback.take() {
                Some(cb) => cb,
                None => return false,
            }
        };

        let control = callback(dt);

        let mut inner = self.inner.lock();
        inner.ticks += 1;
        if inner.callback.is_none() {
            inner.callback = Some(callback);
        }
        if control == TickControl::Stop {
            inner.running = false;
        }
        true
    }

    /// Deliver one tick of the interval last passed to `start`.
    pub fn step(&self) -> bool {
        let dt = self.inner.lock().interval;
        self.advance(dt)
    }

    /// Tick with `dt` until the scheduler stops or `max_ticks` have been
    /// delivered.  Returns the number of ticks delivered.
    pub fn run(&self, dt: Duration, max_ticks: u64) -> u64 {
        let mut n = 0;
        while n < max_ticks && self.advance(dt) {
            n += 1;
        }
        n
    }

    /// Ticks delivered over the scheduler's lifetime.
    pub fn ticks_delivered(&self) -> u64 {
        self.inner.lock().ticks
    }
}

impl Scheduler for ManualScheduler {
    fn on_tick(&mut self, callback: TickCallback) {
        self.inner.lock().callback = Some(callback);
    }

    fn start(&mut self, interval_hint: Duration) {
        let mut inner = self.inner.lock();
        inner.running = true;
        inner.interval = interval_hint;
    }

    fn stop(&mut self) {
        self.inner.lock().running = false;
    }

    fn is_running(&self) -> bool {
        self.inner.lock().running
    }
}
