//! The value delivered to listeners on every tick.

use std::time::Duration;

use drive_core::{Coordinate, SimClock, Tick};
use drive_path::GeoPath;

/// One interpolated position along the simulated route.  Emitted, never
/// stored by the simulator.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PositionEvent {
    /// Interpolated position.
    pub coordinate:        Coordinate,
    /// Index of the path vertex at or before `coordinate`.  Truncate the
    /// path's vertices to `..=nearest_index` and append `coordinate` to get
    /// the traveled progress line.
    pub nearest_index:     usize,
    /// Direction of travel, degrees clockwise from north.
    pub bearing:           f64,
    /// Distance advanced along the path since `start()`.
    pub traveled_distance: f64,
    /// `traveled_distance / total_length`; `1.0` on a zero-length path.
    pub fraction_complete: f64,
    /// Tick that produced this event (1 for the first tick after `start()`).
    pub tick:              Tick,
    /// Simulated time elapsed since `start()`.
    pub elapsed:           Duration,
}

impl PositionEvent {
    /// Locate `traveled` on `path` and stamp it with `clock`.
    pub fn locate(path: &GeoPath, traveled: f64, clock: &SimClock) -> Self {
        let loc = path.locate(traveled);
        let total = path.total_length();
        Self {
            coordinate:        loc.coordinate,
            nearest_index:     loc.nearest_index,
            bearing:           loc.bearing,
            traveled_distance: loc.distance,
            fraction_complete: if total > 0.0 { loc.distance / total } else { 1.0 },
            tick:              clock.current_tick,
            elapsed:           clock.elapsed,
        }
    }

    /// `true` on the final event of a run.
    #[inline]
    pub fn is_final(&self) -> bool {
        self.fraction_complete >= 1.0
    }
}
