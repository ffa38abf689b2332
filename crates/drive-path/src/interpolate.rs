//! Distance → position queries on a [`GeoPath`].
//!
//! All functions are pure and total: distances outside `[0, total_length]`
//! (and NaN) are clamped rather than rejected, so callers driving a marker
//! never need to pre-validate.
//!
//! # Boundary policy
//!
//! A distance landing exactly on a vertex resolves to *that* vertex and
//! reports its index, never the start of the next segment.  When several
//! vertices share the same cumulative distance (consecutive duplicates), the
//! last of them is reported.  `nearest_index` is therefore the index of the
//! last vertex already reached, which is what progress-line truncation needs.

use drive_core::Coordinate;

use crate::GeoPath;

/// Result of locating a distance along a path.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PathLocation {
    /// The interpolated position.
    pub coordinate:    Coordinate,
    /// Index of the vertex at or immediately before `coordinate`.
    pub nearest_index: usize,
    /// Direction of travel in degrees clockwise from north, `[0, 360)`.
    pub bearing:       f64,
    /// The (clamped) distance that was located.
    pub distance:      f64,
}

/// Clamp `d` into `[0, total]`; NaN maps to 0.
#[inline]
pub fn clamp_distance(path: &GeoPath, d: f64) -> f64 {
    if d.is_nan() {
        return 0.0;
    }
    d.clamp(0.0, path.total_length())
}

/// Index of the last vertex whose cumulative distance is `<= d`.  O(log n).
#[inline]
pub fn nearest_index(path: &GeoPath, d: f64) -> usize {
    let d = clamp_distance(path, d);
    // cumulative[0] == 0 <= d, so the partition point is at least 1.
    path.cumulative().partition_point(|&c| c <= d) - 1
}

/// Interpolated coordinate at distance `d` and the nearest index.
pub fn point_at(path: &GeoPath, d: f64) -> (Coordinate, usize) {
    let d = clamp_distance(path, d);
    let i = nearest_index(path, d);
    let vertices = path.vertices();

    if i + 1 >= vertices.len() {
        return (vertices[i], i);
    }

    let start = path.cumulative()[i];
    // Non-zero: cumulative[i + 1] > d >= cumulative[i].
    let len = path.segment_lengths()[i];
    let f = (d - start) / len;
    (path.metric().interpolate(vertices[i], vertices[i + 1], f), i)
}

/// Bearing of travel at distance `d`.
///
/// On the final vertex there is no outgoing segment; the last segment's
/// bearing is reported so a marker keeps its heading on arrival.
pub fn bearing_at(path: &GeoPath, d: f64) -> f64 {
    let i = nearest_index(path, d);
    path.segment_bearing(i)
        .or_else(|| i.checked_sub(1).and_then(|prev| path.segment_bearing(prev)))
        .unwrap_or(0.0)
}

/// Full location query: coordinate, nearest index, bearing, clamped distance.
pub fn locate(path: &GeoPath, d: f64) -> PathLocation {
    let distance = clamp_distance(path, d);
    let (coordinate, nearest_index) = point_at(path, distance);
    PathLocation {
        coordinate,
        nearest_index,
        bearing: bearing_at(path, distance),
        distance,
    }
}

impl GeoPath {
    /// See [`point_at`].
    #[inline]
    pub fn point_at(&self, d: f64) -> (Coordinate, usize) {
        point_at(self, d)
    }

    /// See [`nearest_index`].
    #[inline]
    pub fn nearest_index(&self, d: f64) -> usize {
        nearest_index(self, d)
    }

    /// See [`bearing_at`].
    #[inline]
    pub fn bearing_at(&self, d: f64) -> f64 {
        bearing_at(self, d)
    }

    /// See [`locate`].
    #[inline]
    pub fn locate(&self, d: f64) -> PathLocation {
        locate(self, d)
    }
}
