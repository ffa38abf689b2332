//! `drive-sim` — drives a marker along a [`GeoPath`][drive_path::GeoPath].
//!
//! # Tick loop
//!
//! ```text
//! Scheduler ──Δt──▶ RouteSimulator::tick
//!                     ① phase check         only `Running` advances
//!                     ② advance             traveled = min(total, traveled + speed·Δt)
//!                     ③ locate              interpolate coordinate / nearest index / bearing
//!                     ④ finish check        traveled == total → `Finished`
//!                     ⑤ fan-out             listeners in registration order, each isolated
//!                   ◀─ Continue | Stop
//! ```
//!
//! # State machine
//!
//! | From \ call     | `start()`  | `stop()`  | `reset()` | last tick  |
//! |-----------------|------------|-----------|-----------|------------|
//! | `Idle`          | `Running`  | `Stopped` | `Idle`    | —          |
//! | `Running`       | no-op      | `Stopped` | `Idle`    | `Finished` |
//! | `Finished`      | `Running`  | `Stopped` | `Idle`    | —          |
//! | `Stopped`       | `Running`  | `Stopped` | `Idle`    | —          |
//!
//! Every `start()` out of a non-running phase rewinds to distance 0.
//!
//! # Cargo features
//!
//! | Feature    | Effect                                                  |
//! |------------|---------------------------------------------------------|
//! | `parallel` | [`Fleet::tick_all`] fans out over Rayon's thread pool.  |
//! | `serde`    | `Serialize`/`Deserialize` on [`PositionEvent`].         |
//!
//! # Quick-start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use std::time::Duration;
//! use drive_path::GeoPath;
//! use drive_sim::{ManualScheduler, RouteSimulator};
//!
//! let path = Arc::new(GeoPath::new(coords)?);
//! let clock = ManualScheduler::new();
//! let mut sim = RouteSimulator::new(path, 0.04, clock.clone())?;
//! sim.add_listener(|e: &drive_sim::PositionEvent| {
//!     println!("{} {:.0}°", e.coordinate, e.bearing);
//!     Ok(())
//! });
//! sim.start();
//! clock.run(Duration::from_secs(1), 1_000);
//! ```

pub mod control;
pub mod error;
pub mod event;
pub mod fleet;
pub mod listener;
pub mod scheduler;
pub mod simulator;

#[cfg(test)]
mod tests;

pub use control::{SimPhase, StopHandle};
pub use error::{SimError, SimResult};
pub use event::PositionEvent;
pub use fleet::Fleet;
pub use listener::{ListenerError, ListenerResult, ListenerSet, NotifyReport, PositionListener, WeakListener};
pub use scheduler::{IntervalScheduler, ManualScheduler, Scheduler, TickCallback, TickControl};
pub use simulator::RouteSimulator;
