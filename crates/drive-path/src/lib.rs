//! `drive-path` — the geometry half of the route simulator.
//!
//! # Crate layout
//!
//! | Module          | Contents                                                  |
//! |-----------------|-----------------------------------------------------------|
//! | [`path`]        | `GeoPath` — vertices + cached segment/cumulative lengths  |
//! | [`interpolate`] | pure distance → position/segment/bearing queries          |
//! | [`progress`]    | traveled / remaining sub-paths for progress lines         |
//! | [`index`]       | `PathIndex` — R-tree snapping of arbitrary points         |
//! | [`error`]       | `PathError`, `PathResult<T>`                              |
//!
//! # Distance model
//!
//! A `GeoPath` is measured once, at construction, with a
//! [`DistanceMetric`][drive_core::DistanceMetric].  Every later query takes a
//! distance along the path in the same unit and is answered from the cached
//! cumulative lengths: a binary search finds the segment, then the metric's
//! interpolation places the point inside it.
//!
//! ```text
//! vertices     v0 ──── v1 ── v2 ────────── v3
//! cumulative   0       4     6             13
//! locate(5.0)          └─▲─┘   nearest_index = 1, fraction = 0.5
//! ```
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                       |
//! |---------|--------------------------------------------------------------|
//! | `serde` | Derives `Serialize`/`Deserialize` on `PathLocation`.         |

pub mod error;
pub mod index;
pub mod interpolate;
pub mod path;
pub mod progress;


pub use error::{PathError, PathResult};
pub use index::PathIndex;
pub use interpolate::PathLocation;
pub use path::GeoPath;
