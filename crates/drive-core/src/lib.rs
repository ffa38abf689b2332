//! `drive-core` — foundational types for the `drive_line` route simulator.
//!
//! This crate is a dependency of every other `drive-*` crate.  It has no
//! `drive-*` dependencies and minimal external ones (only `thiserror`, plus
//! optional `serde`).
//!
//! # What lives here
//!
//! | Module      | Contents                                                  |
//! |-------------|-----------------------------------------------------------|
//! | [`geo`]     | `Coordinate`, haversine distance, bearing, interpolation  |
//! | [`metric`]  | `DistanceUnit`, `DistanceMetric`                          |
//! | [`time`]    | `Tick`, `SimClock`                                        |
//! | [`ids`]     | `ListenerId`, `VehicleId`                                 |
//! | [`profile`] | `TravelProfile` (directions-service routing profiles)     |
//! | [`config`]  | `SimulatorConfig`                                         |
//! | [`error`]   | `CoreError`, `CoreResult`                                 |
//!
//! # Feature flags
//!
//! | Flag    | Effect                                                     |
//! |---------|------------------------------------------------------------|
//! | `serde` | Adds `Serialize`/`Deserialize` to all public types.        |

pub mod config;
pub mod error;
pub mod geo;
pub mod ids;
pub mod metric;
pub mod profile;
pub mod time;


// ── Re-exports ────────────────────────────────────────────────────────────────

pub use config::SimulatorConfig;
pub use error::{CoreError, CoreResult};
pub use geo::Coordinate;
pub use ids::{ListenerId, VehicleId};
pub use metric::{DistanceMetric, DistanceUnit};
pub use profile::TravelProfile;
pub use time::{SimClock, Tick};
