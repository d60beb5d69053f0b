//! Geographic coordinate types.
//!
//! Provides the `GeoPoint` value type used for place locations, with
//! range validation on construction.

use std::fmt;

use thiserror::Error;

/// Minimum valid latitude in decimal degrees.
pub const MIN_LAT: f64 = -90.0;

/// Maximum valid latitude in decimal degrees.
pub const MAX_LAT: f64 = 90.0;

/// Minimum valid longitude in decimal degrees.
pub const MIN_LON: f64 = -180.0;

/// Maximum valid longitude in decimal degrees.
pub const MAX_LON: f64 = 180.0;

/// Errors produced when constructing coordinates from raw values.
#[derive(Debug, Clone, Copy, PartialEq, Error)]
pub enum CoordError {
    /// Latitude outside [-90, 90].
    #[error("invalid latitude: {0}")]
    InvalidLatitude(f64),

    /// Longitude outside [-180, 180].
    #[error("invalid longitude: {0}")]
    InvalidLongitude(f64),
}

/// A geographic position in decimal degrees.
///
/// Construction validates the ranges, so a `GeoPoint` always holds a
/// plottable position.
///
/// # Example
///
/// ```
/// use placepulse::coord::GeoPoint;
///
/// let point = GeoPoint::new(53.5511, 9.9937).unwrap();
/// assert_eq!(point.latitude(), 53.5511);
/// assert_eq!(point.longitude(), 9.9937);
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GeoPoint {
    lat: f64,
    lon: f64,
}

impl GeoPoint {
    /// Creates a new point, validating both components.
    pub fn new(lat: f64, lon: f64) -> Result<Self, CoordError> {
        if !(MIN_LAT..=MAX_LAT).contains(&lat) {
            return Err(CoordError::InvalidLatitude(lat));
        }
        if !(MIN_LON..=MAX_LON).contains(&lon) {
            return Err(CoordError::InvalidLongitude(lon));
        }

        Ok(Self { lat, lon })
    }

    /// Latitude in decimal degrees.
    pub fn latitude(&self) -> f64 {
        self.lat
    }

    /// Longitude in decimal degrees.
    pub fn longitude(&self) -> f64 {
        self.lon
    }
}

impl fmt::Display for GeoPoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "({}, {})", self.lat, self.lon)
    }
}
