//! Sub-paths split at a traveled distance, for drawing progress lines.

use drive_core::Coordinate;

use crate::GeoPath;

impl GeoPath {
    /// The part of the path already covered after traveling `d`: every
    /// vertex up to and including the nearest index, then the interpolated
    /// point (omitted when it coincides with that vertex).
    ///
    /// Always holds at least one coordinate; a renderer needs two to draw a
    /// line.
    pub fn traveled_path(&self, d: f64) -> Vec<Coordinate> {
        let loc = self.locate(d);
        let mut coords = self.vertices()[..=loc.nearest_index].to_vec();
        if coords.last() != Some(&loc.coordinate) {
            coords.push(loc.coordinate);
        }
        coords
    }

    /// The part of the path still ahead after traveling `d`: the
    /// interpolated point followed by every vertex after the nearest index.
    pub fn remaining_path(&self, d: f64) -> Vec<Coordinate> {
        let loc = self.locate(d);
        let mut coords = Vec::with_capacity(self.len() - loc.nearest_index);
        coords.push(loc.coordinate);
        coords.extend_from_slice(&self.vertices()[loc.nearest_index + 1..]);
        coords
    }
}
