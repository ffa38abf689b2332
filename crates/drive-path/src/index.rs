//! Spatial index over a path's vertices.
//!
//! An R-tree (via `rstar`) maps an arbitrary `(lon, lat)` to the closest
//! vertex.  Used to resume a simulation from a position that did not come
//! from the path itself, e.g. the device's current location.

use rstar::{AABB, PointDistance, RTree, RTreeObject};

use drive_core::Coordinate;

use crate::GeoPath;

// ── R-tree vertex entry ───────────────────────────────────────────────────────

#[derive(Clone)]
struct VertexEntry {
    point: [f64; 2], // [lon, lat]
    index: usize,
}

impl RTreeObject for VertexEntry {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        AABB::from_point(self.point)
    }
}

impl PointDistance for VertexEntry {
    /// Squared Euclidean distance in lon/lat space.  Good enough to pick the
    /// nearest vertex within a city; the snap itself is refined below.
    fn distance_2(&self, point: &[f64; 2]) -> f64 {
        let dlon = self.point[0] - point[0];
        let dlat = self.point[1] - point[1];
        dlon * dlon + dlat * dlat
    }
}

// ── PathIndex ─────────────────────────────────────────────────────────────────

/// Borrowing R-tree index over one [`GeoPath`].
pub struct PathIndex<'a> {
    path: &'a GeoPath,
    tree: RTree<VertexEntry>,
}

impl<'a> PathIndex<'a> {
    pub fn new(path: &'a GeoPath) -> Self {
        let entries = path
            .vertices()
            .iter()
            .enumerate()
            .map(|(index, c)| VertexEntry { point: c.to_array(), index })
            .collect();
        Self { path, tree: RTree::bulk_load(entries) }
    }

    /// Index of the vertex closest to `at`.  Ties resolve arbitrarily.
    pub fn nearest_vertex(&self, at: Coordinate) -> usize {
        self.tree
            .nearest_neighbor(&at.to_array())
            .map(|e| e.index)
            // The tree holds every vertex and a path is never empty.
            .unwrap_or(0)
    }

    /// Distance along the path of the point closest to `at`.
    ///
    /// Finds the nearest vertex, then projects `at` onto the (up to two)
    /// segments touching it and keeps the closer projection.  Exact for
    /// smooth routes; on paths that double back near `at` it may pick a
    /// segment whose vertex is nearest but whose interior is not.
    pub fn snap_distance(&self, at: Coordinate) -> f64 {
        let v = self.nearest_vertex(at);
        let path = self.path;
        let mut best = (path.vertices()[v].equirectangular_m(at), path.cumulative()[v]);

        let candidates = [v.checked_sub(1), (v + 1 < path.len()).then_some(v)];
        for seg in candidates.into_iter().flatten() {
            let a = path.vertices()[seg];
            let b = path.vertices()[seg + 1];
            let f = project_fraction(a, b, at);
            let p = path.metric().interpolate(a, b, f);
            let off = p.equirectangular_m(at);
            if off < best.0 {
                let along = path.cumulative()[seg] + f * path.segment_lengths()[seg];
                best = (off, along);
            }
        }
        best.1
    }
}

/// Fraction along `a → b` of the orthogonal projection of `p`, in a local
/// equirectangular frame, clamped to `[0, 1]`.
fn project_fraction(a: Coordinate, b: Coordinate, p: Coordinate) -> f64 {
    let k = ((a.lat + b.lat) * 0.5).to_radians().cos();
    let (bx, by) = ((b.lon - a.lon) * k, b.lat - a.lat);
    let (px, py) = ((p.lon - a.lon) * k, p.lat - a.lat);
    let len2 = bx * bx + by * by;
    if len2 == 0.0 {
        return 0.0;
    }
    ((px * bx + py * by) / len2).clamp(0.0, 1.0)
}
