//! Path construction errors.

use thiserror::Error;

/// Why a coordinate sequence could not become a [`GeoPath`][crate::GeoPath].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PathError {
    #[error("a path needs at least one coordinate")]
    Empty,

    #[error("coordinate {index} is not a finite number")]
    NonFinite { index: usize },

    #[error("coordinate {index} has latitude {lat} outside [-90, 90]")]
    LatitudeOutOfRange { index: usize, lat: f64 },

    #[error("coordinate {index} has longitude {lon} outside [-180, 180]")]
    LongitudeOutOfRange { index: usize, lon: f64 },
}

pub type PathResult<T> = Result<T, PathError>;
