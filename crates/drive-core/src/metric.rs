//! Distance units and the metric a path is measured with.

use crate::Coordinate;

/// Unit in which path lengths, speeds, and traveled distances are expressed.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "snake_case"))]
pub enum DistanceUnit {
    Meters,
    /// Default; matches the units directions consumers usually animate in.
    #[default]
    Kilometers,
    Miles,
}

impl DistanceUnit {
    /// Convert a length in metres into this unit.
    #[inline]
    pub fn from_meters(self, m: f64) -> f64 {
        match self {
            DistanceUnit::Meters     => m,
            DistanceUnit::Kilometers => m / 1_000.0,
            DistanceUnit::Miles      => m / 1_609.344,
        }
    }

    /// Convert a length expressed in this unit into metres.
    #[inline]
    pub fn to_meters(self, value: f64) -> f64 {
        match self {
            DistanceUnit::Meters     => value,
            DistanceUnit::Kilometers => value * 1_000.0,
            DistanceUnit::Miles      => value * 1_609.344,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            DistanceUnit::Meters     => "m",
            DistanceUnit::Kilometers => "km",
            DistanceUnit::Miles      => "mi",
        }
    }
}

impl std::fmt::Display for DistanceUnit {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How segment lengths are measured, and how points between two vertices
/// are interpolated.
///
/// | Metric            | Distance                  | Interpolation           |
/// |-------------------|---------------------------|-------------------------|
/// | `Haversine`       | great-circle              | great-circle arc        |
/// | `Equirectangular` | flat-earth approximation  | linear in `(lon, lat)`  |
/// | `Planar`          | Euclidean on raw degrees  | linear in `(lon, lat)`  |
///
/// The pairing keeps a point reported at distance `d` consistent with the
/// lengths used to find its segment.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Debug)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "kind", content = "unit", rename_all = "snake_case"))]
pub enum DistanceMetric {
    Haversine(DistanceUnit),
    Equirectangular(DistanceUnit),
    /// One degree is one distance unit.  For synthetic test geometry.
    Planar,
}

impl Default for DistanceMetric {
    fn default() -> Self {
        DistanceMetric::Haversine(DistanceUnit::Kilometers)
    }
}

impl DistanceMetric {
    /// Distance between `a` and `b` in this metric's unit.
    #[inline]
    pub fn distance(self, a: Coordinate, b: Coordinate) -> f64 {
        match self {
            DistanceMetric::Haversine(unit)       => unit.from_meters(a.haversine_m(b)),
            DistanceMetric::Equirectangular(unit) => unit.from_meters(a.equirectangular_m(b)),
            DistanceMetric::Planar                => a.planar(b),
        }
    }

    /// The point at fraction `f` of the way from `a` to `b`.
    #[inline]
    pub fn interpolate(self, a: Coordinate, b: Coordinate, f: f64) -> Coordinate {
        match self {
            DistanceMetric::Haversine(_) => a.intermediate_point(b, f),
            DistanceMetric::Equirectangular(_) | DistanceMetric::Planar => a.lerp(b, f),
        }
    }

    /// The unit lengths are reported in, or `None` for [`Planar`][Self::Planar].
    pub fn unit(self) -> Option<DistanceUnit> {
        match self {
            DistanceMetric::Haversine(unit) | DistanceMetric::Equirectangular(unit) => Some(unit),
            DistanceMetric::Planar => None,
        }
    }
}
