//! Wall-clock scheduler backed by a dedicated thread.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use tracing::{debug, warn};

use super::{Scheduler, TickCallback, TickControl};

/// A [`Scheduler`] that sleeps `interval_hint` between ticks on a
/// background thread and passes the *measured* elapsed time as `Δt`.
///
/// Sleep overshoot, OS scheduling, and slow callbacks all make the measured
/// `Δt` longer than the hint; that drift is real elapsed time and the
/// simulator consumes it as such.
#[derive(Default)]
pub struct IntervalScheduler {
    callback: Arc<Mutex<Option<TickCallback>>>,
    running:  Arc<AtomicBool>,
    worker:   Option<JoinHandle<()>>,
}

impl IntervalScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait for the worker thread to exit after it stopped on its own
    /// (callback returned [`TickControl::Stop`]).
    pub fn join(&mut self) {
        if let Some(handle) = self.worker.take() {
            if handle.thread().id() == thread::current().id() {
                // Called from inside a tick; the worker exits on return.
                return;
            }
            if handle.join().is_err() {
                warn!("interval scheduler worker panicked");
            }
        }
    }
}

impl Scheduler for IntervalScheduler {
    fn on_tick(&mut self, callback: TickCallback) {
        *self.callback.lock() = Some(callback);
    }

    fn start(&mut self, interval_hint: Duration) {
        // The worker clears `running` after a Stop while still holding the
        // callback lock, so under that lock the flag cannot be stale.
        let callback = Arc::clone(&self.callback);
        let _tick = callback.lock();
        if self.running.load(Ordering::SeqCst) {
            return;
        }
        // A previous worker may still be winding down after a Stop; it only
        // exits while `running` is false, so join before raising the flag.
        self.join();
        self.running.store(true, Ordering::SeqCst);

        let worker_callback = Arc::clone(&self.callback);
        let running = Arc::clone(&self.running);
        debug!(interval_ms = interval_hint.as_millis() as u64, "interval scheduler started");

        self.worker = Some(thread::spawn(move || {
            let mut last = Instant::now();
            while running.load(Ordering::SeqCst) {
                thread::sleep(interval_hint);
                if !running.load(Ordering::SeqCst) {
                    break;
                }
                let now = Instant::now();
                let dt = now - last;
                last = now;

                let mut guard = worker_callback.lock();
                let Some(cb) = guard.as_mut() else { continue };
                if cb(dt) == TickControl::Stop {
                    running.store(false, Ordering::SeqCst);
                }
            }
        }));
    }

    fn stop(&mut self) {
        if self.running.swap(false, Ordering::SeqCst) {
            debug!("interval scheduler stopped");
        }
        self.join();
    }

    fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

impl Drop for IntervalScheduler {
    fn drop(&mut self) {
        self.stop();
    }
}
