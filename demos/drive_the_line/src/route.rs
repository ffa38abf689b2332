//! Route geometry for the demo: a built-in walk across San Francisco, or a
//! directions / GeoJSON document loaded from disk.

use std::path::Path;

use anyhow::{Context, Result, bail};
use drive_core::Coordinate;
use serde::Deserialize;

pub const SF_OFFICE: [f64; 2] = [-122.400021, 37.789085];

pub const SF_ZOO: [f64; 2] = [-122.505412, 37.737463];

/// Selectable destinations, `--destination 0..=3`.
pub const DESTINATIONS: [[f64; 2]; 4] = [
    SF_ZOO,
    [-122.490442, 37.769901],
    [-122.468170, 37.771974],
    [-122.451839, 37.759218],
];

// Blocks walked per leg of the built-in route.
const BLOCKS: usize = 12;

/// A street-grid walk from the office to `destination`: alternating
/// east-west and north-south legs, one block at a time.
pub fn builtin(destination: [f64; 2]) -> Vec<Coordinate> {
    let from = Coordinate::from(SF_OFFICE);
    let to = Coordinate::from(destination);
    let d_lon = (to.lon - from.lon) / BLOCKS as f64;
    let d_lat = (to.lat - from.lat) / BLOCKS as f64;

    let mut coords = Vec::with_capacity(2 * BLOCKS + 1);
    let mut here = from;
    coords.push(here);
    for _ in 0..BLOCKS {
        here.lon += d_lon;
        coords.push(here);
        here.lat += d_lat;
        coords.push(here);
    }
    // Land exactly on the destination despite accumulated rounding.
    if let Some(last) = coords.last_mut() {
        *last = to;
    }
    coords
}

#[derive(Deserialize)]
struct LineString {
    coordinates: Vec<Vec<f64>>,
}

#[derive(Deserialize)]
struct DirectionsRoute {
    geometry: LineString,
}

/// Accepted encodings, tried in order.
#[derive(Deserialize)]
#[serde(untagged)]
enum RouteDocument {
    /// Directions response requested with `geometries=geojson`.
    Directions { routes: Vec<DirectionsRoute> },
    /// GeoJSON `Feature` wrapping a `LineString`.
    Feature { geometry: LineString },
    /// Bare GeoJSON `LineString`.
    Geometry(LineString),
}

/// Read the route geometry from a JSON file.
pub fn load(path: &Path) -> Result<Vec<Coordinate>> {
    let text = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    parse(&text).with_context(|| format!("parsing {}", path.display()))
}

pub fn parse(json: &str) -> Result<Vec<Coordinate>> {
    let line = match serde_json::from_str::<RouteDocument>(json)? {
        RouteDocument::Directions { routes } => match routes.into_iter().next() {
            Some(route) => route.geometry,
            None => bail!("directions response contains no routes"),
        },
        RouteDocument::Feature { geometry } | RouteDocument::Geometry(geometry) => geometry,
    };

    line.coordinates
        .iter()
        .enumerate()
        .map(|(i, pos)| match pos.as_slice() {
            // Positions may carry a third (altitude) element.
            [lon, lat, ..] => Ok(Coordinate::new(*lon, *lat)),
            _ => bail!("position {i} has fewer than two elements"),
        })
        .collect()
}
