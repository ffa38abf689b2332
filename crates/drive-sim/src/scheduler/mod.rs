//! Time sources that drive a simulator.
//!
//! A scheduler owns *when* ticks happen; the simulator owns *what* a tick
//! does.  The simulator installs one callback with [`Scheduler::on_tick`]
//! and then calls `start`/`stop` as its phase changes.
//!
//! | Scheduler             | Time source                  | Use                       |
//! |-----------------------|------------------------------|---------------------------|
//! | [`ManualScheduler`]   | caller-supplied `Δt`         | tests, replay, stepping   |
//! | [`IntervalScheduler`] | wall clock on its own thread | live animation            |
//!
//! Neither implementation promises equal `Δt`s, and the simulator never
//! assumes them.

mod interval;
mod manual;

use std::time::Duration;

pub use interval::IntervalScheduler;
pub use manual::ManualScheduler;

/// Returned by a tick callback to keep or end the tick stream.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub enum TickControl {
    Continue,
    /// The scheduler stops itself; a later `start` resumes it.
    Stop,
}

/// The callback a scheduler invokes with the elapsed time since the
/// previous tick.
pub type TickCallback = Box<dyn FnMut(Duration) -> TickControl + Send>;

/// A source of periodic ticks.
pub trait Scheduler {
    /// Install the tick callback, replacing any previous one.
    fn on_tick(&mut self, callback: TickCallback);

    /// Begin (or resume) ticking roughly every `interval_hint`.  Calling
    /// `start` on a running scheduler has no effect.
    fn start(&mut self, interval_hint: Duration);

    /// Stop ticking.  Idempotent.
    fn stop(&mut self);

    fn is_running(&self) -> bool;
}
