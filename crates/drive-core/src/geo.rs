//! Geographic coordinate type and spherical-earth helpers.
//!
//! `Coordinate` is stored as `(lon, lat)` in decimal degrees, the order used
//! by GeoJSON and by directions-service geometries.  All trigonometry is done
//! in `f64`: route vertices are often only a few metres apart and `f32`
//! rounding would dominate the interpolation error.

/// Mean Earth radius in metres (IUGG).
pub const EARTH_RADIUS_M: f64 = 6_371_008.8;

/// A WGS-84 geographic coordinate, longitude first.
#[derive(Copy, Clone, Debug, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Coordinate {
    pub lon: f64,
    pub lat: f64,
}

impl Coordinate {
    #[inline]
    pub fn new(lon: f64, lat: f64) -> Self {
        Self { lon, lat }
    }

    /// `true` if both components are finite numbers.
    #[inline]
    pub fn is_finite(self) -> bool {
        self.lon.is_finite() && self.lat.is_finite()
    }

    /// `[lon, lat]`, the GeoJSON position layout.
    #[inline]
    pub fn to_array(self) -> [f64; 2] {
        [self.lon, self.lat]
    }

    /// Haversine great-circle distance in metres.
    pub fn haversine_m(self, other: Coordinate) -> f64 {
        let d_lat = (other.lat - self.lat).to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();

        let a = (d_lat * 0.5).sin().powi(2)
            + lat1.cos() * lat2.cos() * (d_lon * 0.5).sin().powi(2);

        let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());
        EARTH_RADIUS_M * c
    }

    /// Equirectangular approximation of the distance in metres.
    ///
    /// Within 0.1 % of [`haversine_m`][Self::haversine_m] for segments of a
    /// few kilometres away from the poles; roughly three times cheaper.
    pub fn equirectangular_m(self, other: Coordinate) -> f64 {
        let mean_lat = ((self.lat + other.lat) * 0.5).to_radians();
        let x = (other.lon - self.lon).to_radians() * mean_lat.cos();
        let y = (other.lat - self.lat).to_radians();
        EARTH_RADIUS_M * (x * x + y * y).sqrt()
    }

    /// Euclidean distance on the raw `(lon, lat)` pair, in degrees.
    ///
    /// Not physically meaningful; used for synthetic paths where one degree
    /// is treated as one distance unit.
    #[inline]
    pub fn planar(self, other: Coordinate) -> f64 {
        (other.lon - self.lon).hypot(other.lat - self.lat)
    }

    /// Initial great-circle bearing from `self` towards `other`, in degrees
    /// clockwise from north, normalised to `[0, 360)`.
    ///
    /// Returns `0.0` when the two points coincide.
    pub fn initial_bearing(self, other: Coordinate) -> f64 {
        let lat1 = self.lat.to_radians();
        let lat2 = other.lat.to_radians();
        let d_lon = (other.lon - self.lon).to_radians();

        let y = d_lon.sin() * lat2.cos();
        let x = lat1.cos() * lat2.sin() - lat1.sin() * lat2.cos() * d_lon.cos();
        if x == 0.0 && y == 0.0 {
            return 0.0;
        }
        normalize_bearing(y.atan2(x).to_degrees())
    }

    /// Linear interpolation in `(lon, lat)` space.  `f` is clamped to `[0, 1]`.
    ///
    /// Does not handle segments crossing the antimeridian.
    pub fn lerp(self, other: Coordinate, f: f64) -> Coordinate {
        if f <= 0.0 {
            return self;
        }
        if f >= 1.0 {
            return other;
        }
        Coordinate {
            lon: self.lon + (other.lon - self.lon) * f,
            lat: self.lat + (other.lat - self.lat) * f,
        }
    }

    /// The point at fraction `f` of the great-circle arc from `self` to
    /// `other`.  `f` is clamped to `[0, 1]`; the end points are returned
    /// exactly.
    pub fn intermediate_point(self, other: Coordinate, f: f64) -> Coordinate {
        if f <= 0.0 {
            return self;
        }
        if f >= 1.0 {
            return other;
        }

        let delta = self.haversine_m(other) / EARTH_RADIUS_M;
        // Sub-millimetre arcs: the slerp weights lose all precision.
        if delta < 1e-10 {
            return self.lerp(other, f);
        }

        let (lat1, lon1) = (self.lat.to_radians(), self.lon.to_radians());
        let (lat2, lon2) = (other.lat.to_radians(), other.lon.to_radians());

        let a = ((1.0 - f) * delta).sin() / delta.sin();
        let b = (f * delta).sin() / delta.sin();

        let x = a * lat1.cos() * lon1.cos() + b * lat2.cos() * lon2.cos();
        let y = a * lat1.cos() * lon1.sin() + b * lat2.cos() * lon2.sin();
        let z = a * lat1.sin() + b * lat2.sin();

        Coordinate {
            lon: y.atan2(x).to_degrees(),
            lat: z.atan2((x * x + y * y).sqrt()).to_degrees(),
        }
    }
}

/// Map any angle in degrees onto `[0, 360)`.
#[inline]
pub fn normalize_bearing(deg: f64) -> f64 {
    let b = deg.rem_euclid(360.0);
    // rem_euclid can round up to exactly 360.0 for tiny negative inputs.
    if b >= 360.0 { 0.0 } else { b }
}

impl From<[f64; 2]> for Coordinate {
    #[inline]
    fn from([lon, lat]: [f64; 2]) -> Self {
        Coordinate { lon, lat }
    }
}

impl From<(f64, f64)> for Coordinate {
    #[inline]
    fn from((lon, lat): (f64, f64)) -> Self {
        Coordinate { lon, lat }
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.6}, {:.6})", self.lon, self.lat)
    }
}
