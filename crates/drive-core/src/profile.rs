//! Directions-service routing profiles.
//!
//! The profile only matters to the simulator as a source of a plausible
//! default speed; the route geometry itself arrives already computed.

use std::str::FromStr;

use crate::CoreError;

/// The routing profile a path was requested with.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "kebab-case"))]
pub enum TravelProfile {
    #[default]
    Walking,
    Cycling,
    Driving,
    /// Driving with live traffic; slower average than `Driving`.
    DrivingTraffic,
}

impl TravelProfile {
    /// Typical average speed in metres per second.
    pub fn typical_speed_mps(self) -> f64 {
        match self {
            TravelProfile::Walking        => 1.4,
            TravelProfile::Cycling        => 4.2,
            TravelProfile::Driving        => 13.9,
            TravelProfile::DrivingTraffic => 8.3,
        }
    }

    /// Identifier used by directions APIs.
    pub fn as_str(self) -> &'static str {
        match self {
            TravelProfile::Walking        => "walking",
            TravelProfile::Cycling        => "cycling",
            TravelProfile::Driving        => "driving",
            TravelProfile::DrivingTraffic => "driving-traffic",
        }
    }
}

impl FromStr for TravelProfile {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "walking"         => Ok(TravelProfile::Walking),
            "cycling"         => Ok(TravelProfile::Cycling),
            "driving"         => Ok(TravelProfile::Driving),
            "driving-traffic" => Ok(TravelProfile::DrivingTraffic),
            other => Err(CoreError::Parse(format!("unknown travel profile {other:?}"))),
        }
    }
}

impl std::fmt::Display for TravelProfile {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}
