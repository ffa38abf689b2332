//! Simulation time model.
//!
//! # Design
//!
//! A scheduler delivers ticks carrying an elapsed-time delta `Δt`.  Nothing
//! guarantees the deltas are equal: wall-clock timers coalesce and skip under
//! load.  Two quantities are therefore tracked separately:
//!
//! - `Tick`: how many ticks have been processed (a sequence number), and
//! - `SimClock::elapsed`: the sum of all `Δt` received so far.
//!
//! Speed is applied to `elapsed`, never to the tick count.

use std::fmt;
use std::time::Duration;

// ── Tick ─────────────────────────────────────────────────────────────────────

/// A monotonically increasing tick sequence number.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Tick(pub u64);

impl Tick {
    pub const ZERO: Tick = Tick(0);
}

impl std::ops::Add<u64> for Tick {
    type Output = Tick;
    #[inline]
    fn add(self, rhs: u64) -> Tick {
        Tick(self.0 + rhs)
    }
}

impl fmt::Display for Tick {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "T{}", self.0)
    }
}

// ── SimClock ──────────────────────────────────────────────────────────────────

/// Tick counter plus accumulated simulated time since the last reset.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SimClock {
    /// Number of ticks processed.
    pub current_tick: Tick,
    /// Sum of every `Δt` passed to [`advance`][Self::advance].
    pub elapsed: Duration,
}

impl SimClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one tick of length `dt`.
    #[inline]
    pub fn advance(&mut self, dt: Duration) {
        self.current_tick = self.current_tick + 1;
        self.elapsed += dt;
    }

    /// Rewind to tick zero.
    #[inline]
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    #[inline]
    pub fn elapsed_secs(&self) -> f64 {
        self.elapsed.as_secs_f64()
    }
}

impl fmt::Display for SimClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} (+{:.3} s)", self.current_tick, self.elapsed_secs())
    }
}
