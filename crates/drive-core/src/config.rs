//! Simulator configuration.

use std::time::Duration;

use crate::{CoreError, CoreResult, DistanceMetric, DistanceUnit, TravelProfile};

/// Default marker speed: 0.04 distance units per simulated second.  With the
/// default kilometre metric and one tick per second this is 40 m per tick.
pub const DEFAULT_SPEED: f64 = 0.04;

/// Default scheduler interval hint: one animation frame at ~60 Hz.
pub const DEFAULT_TICK_INTERVAL_MS: u64 = 16;

/// Top-level simulator configuration.
///
/// Typically loaded from a JSON file by the application crate (with the
/// `serde` feature) and passed to the simulator constructor.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct SimulatorConfig {
    /// Distance advanced per simulated second, in the metric's unit.
    /// Must be finite and `> 0`.
    pub speed: f64,

    /// How often a wall-clock scheduler should tick.  A hint only: the
    /// simulator uses the measured `Δt`, not this value.
    pub tick_interval_ms: u64,

    /// How path segments are measured.
    pub metric: DistanceMetric,
}

impl Default for SimulatorConfig {
    fn default() -> Self {
        Self {
            speed:            DEFAULT_SPEED,
            tick_interval_ms: DEFAULT_TICK_INTERVAL_MS,
            metric:           DistanceMetric::default(),
        }
    }
}

impl SimulatorConfig {
    /// Configuration moving at the typical speed of `profile`, sped up by
    /// `time_scale` (e.g. `60.0` plays one simulated minute per second).
    ///
    /// Uses the default haversine-kilometre metric.
    pub fn for_profile(profile: TravelProfile, time_scale: f64) -> Self {
        let unit = DistanceUnit::Kilometers;
        Self {
            speed:  unit.from_meters(profile.typical_speed_mps() * time_scale),
            metric: DistanceMetric::Haversine(unit),
            ..Self::default()
        }
    }

    /// Reject values the simulator cannot run with.
    pub fn validate(&self) -> CoreResult<()> {
        if !self.speed.is_finite() || self.speed <= 0.0 {
            return Err(CoreError::Config(format!(
                "speed must be a positive finite number, got {}",
                self.speed
            )));
        }
        if self.tick_interval_ms == 0 {
            return Err(CoreError::Config("tick_interval_ms must be at least 1".into()));
        }
        Ok(())
    }

    #[inline]
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}
