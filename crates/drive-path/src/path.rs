//! Immutable polyline with cached per-segment and cumulative lengths.

use drive_core::{Coordinate, DistanceMetric};
use tracing::debug;

use crate::{PathError, PathResult};

/// An ordered, immutable sequence of coordinates describing a route.
///
/// Built once from the geometry a directions service returns, then shared
/// read-only (typically behind an `Arc`) by the simulator and any renderer.
///
/// # Invariants
///
/// - At least one vertex.
/// - `cumulative[0] == 0` and `cumulative` is non-decreasing.
/// - `segment_lengths.len() == bearings.len() == vertices.len() - 1`.
/// - Consecutive duplicate vertices are kept; they form zero-length segments.
#[derive(Clone, Debug, PartialEq)]
pub struct GeoPath {
    vertices:        Vec<Coordinate>,
    segment_lengths: Vec<f64>,
    cumulative:      Vec<f64>,
    bearings:        Vec<f64>,
    metric:          DistanceMetric,
}

impl GeoPath {
    /// Build a path measured with the default haversine-kilometre metric.
    pub fn new(vertices: Vec<Coordinate>) -> PathResult<Self> {
        Self::with_metric(vertices, DistanceMetric::default())
    }

    /// Build a path from `[lon, lat]` pairs, the layout of a GeoJSON
    /// `LineString`'s `coordinates` array.
    pub fn from_lon_lat(pairs: &[[f64; 2]], metric: DistanceMetric) -> PathResult<Self> {
        Self::with_metric(pairs.iter().copied().map(Coordinate::from).collect(), metric)
    }

    /// Build a path measured with `metric`.
    ///
    /// Fails if `vertices` is empty or holds a non-finite coordinate.  For
    /// geographic metrics, latitudes outside `[-90, 90]` and longitudes
    /// outside `[-180, 180]` are rejected as well; `Planar` accepts any
    /// finite value.
    pub fn with_metric(vertices: Vec<Coordinate>, metric: DistanceMetric) -> PathResult<Self> {
        if vertices.is_empty() {
            return Err(PathError::Empty);
        }
        for (index, c) in vertices.iter().enumerate() {
            if !c.is_finite() {
                return Err(PathError::NonFinite { index });
            }
            if metric == DistanceMetric::Planar {
                continue;
            }
            if c.lat.abs() > 90.0 {
                return Err(PathError::LatitudeOutOfRange { index, lat: c.lat });
            }
            if c.lon.abs() > 180.0 {
                return Err(PathError::LongitudeOutOfRange { index, lon: c.lon });
            }
        }

        let segment_lengths: Vec<f64> = vertices
            .windows(2)
            .map(|w| metric.distance(w[0], w[1]))
            .collect();

        let mut cumulative = Vec::with_capacity(vertices.len());
        let mut acc = 0.0;
        cumulative.push(acc);
        for len in &segment_lengths {
            acc += len;
            cumulative.push(acc);
        }

        let bearings = segment_bearings(&vertices, &segment_lengths);

        debug!(
            vertices = vertices.len(),
            total = acc,
            ?metric,
            "built geo path"
        );

        Ok(Self { vertices, segment_lengths, cumulative, bearings, metric })
    }

    // ── Dimensions ────────────────────────────────────────────────────────

    /// Total length in the metric's unit.  O(1).
    #[inline]
    pub fn total_length(&self) -> f64 {
        // Non-empty by construction.
        self.cumulative[self.cumulative.len() - 1]
    }

    /// Number of vertices (always ≥ 1).
    #[inline]
    pub fn len(&self) -> usize {
        self.vertices.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    #[inline]
    pub fn is_empty(&self) -> bool {
        false
    }

    #[inline]
    pub fn metric(&self) -> DistanceMetric {
        self.metric
    }

    // ── Vertex / segment access ───────────────────────────────────────────

    #[inline]
    pub fn vertices(&self) -> &[Coordinate] {
        &self.vertices
    }

    #[inline]
    pub fn first(&self) -> Coordinate {
        self.vertices[0]
    }

    #[inline]
    pub fn last(&self) -> Coordinate {
        self.vertices[self.vertices.len() - 1]
    }

    /// Length of the segment from vertex `i` to vertex `i + 1`.
    #[inline]
    pub fn segment_length(&self, i: usize) -> Option<f64> {
        self.segment_lengths.get(i).copied()
    }

    /// Distance from the first vertex to vertex `i`.
    #[inline]
    pub fn cumulative_length(&self, i: usize) -> Option<f64> {
        self.cumulative.get(i).copied()
    }

    /// Compass bearing of segment `i`.  Zero-length segments inherit the
    /// bearing of a neighbouring segment (see [`segment_bearings`]).
    #[inline]
    pub fn segment_bearing(&self, i: usize) -> Option<f64> {
        self.bearings.get(i).copied()
    }

    pub(crate) fn cumulative(&self) -> &[f64] {
        &self.cumulative
    }

    pub(crate) fn segment_lengths(&self) -> &[f64] {
        &self.segment_lengths
    }
}

/// Per-segment initial bearings.
///
/// A zero-length segment has no direction of its own.  It takes the bearing
/// of the closest preceding non-degenerate segment, or of the first following
/// one when nothing precedes it.  A path with no non-degenerate segment at
/// all reports 0° everywhere.
fn segment_bearings(vertices: &[Coordinate], lengths: &[f64]) -> Vec<f64> {
    let raw: Vec<Option<f64>> = vertices
        .windows(2)
        .zip(lengths)
        .map(|(w, &len)| (len > 0.0).then(|| w[0].initial_bearing(w[1])))
        .collect();

    let first_known = raw.iter().flatten().next().copied().unwrap_or(0.0);
    let mut last = first_known;
    raw.into_iter()
        .map(|b| {
            if let Some(b) = b {
                last = b;
            }
            last
        })
        .collect()
}
