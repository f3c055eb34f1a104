//! Geographic coordinate value object

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::errors::DomainError;

/// A geographic position as an ordered (longitude, latitude) pair
///
/// Serialized as a two-element array `[lon, lat]`, the GeoJSON position
/// order used by every map and routing provider this crate talks to.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coordinate {
    /// Longitude in degrees (-180 to 180)
    longitude: f64,
    /// Latitude in degrees (-90 to 90)
    latitude: f64,
}

impl Coordinate {
    /// Create a new coordinate with validation
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidCoordinate` if either value is not finite,
    /// longitude is not in [-180, 180] or latitude is not in [-90, 90]
    pub fn new(longitude: f64, latitude: f64) -> Result<Self, DomainError> {
        if !Self::is_valid(longitude, latitude) {
            return Err(DomainError::invalid_coordinate(longitude, latitude));
        }
        Ok(Self {
            longitude,
            latitude,
        })
    }

    /// Create a coordinate from a (latitude, longitude) argument order
    ///
    /// Device location APIs and weather providers hand out latitude first.
    ///
    /// # Errors
    ///
    /// Same as [`Coordinate::new`].
    pub fn from_lat_lon(latitude: f64, longitude: f64) -> Result<Self, DomainError> {
        Self::new(longitude, latitude)
    }

    /// Create a coordinate without validation (for compile-time constants)
    #[must_use]
    pub const fn new_unchecked(longitude: f64, latitude: f64) -> Self {
        Self {
            longitude,
            latitude,
        }
    }

    /// Check whether a pair of values forms a valid coordinate
    #[must_use]
    pub fn is_valid(longitude: f64, latitude: f64) -> bool {
        longitude.is_finite()
            && latitude.is_finite()
            && (-180.0..=180.0).contains(&longitude)
            && (-90.0..=90.0).contains(&latitude)
    }

    /// Get the longitude
    #[must_use]
    pub const fn longitude(&self) -> f64 {
        self.longitude
    }

    /// Get the latitude
    #[must_use]
    pub const fn latitude(&self) -> f64 {
        self.latitude
    }

    /// Format as `lon,lat`, the path segment format of routing providers
    #[must_use]
    pub fn to_lon_lat_string(&self) -> String {
        format!("{},{}", self.longitude, self.latitude)
    }
}

impl TryFrom<[f64; 2]> for Coordinate {
    type Error = DomainError;

    fn try_from(value: [f64; 2]) -> Result<Self, Self::Error> {
        Self::new(value[0], value[1])
    }
}

impl From<Coordinate> for [f64; 2] {
    fn from(value: Coordinate) -> Self {
        [value.longitude, value.latitude]
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.longitude, self.latitude)
    }
}

/// Well-known positions used as defaults
impl Coordinate {
    /// Yaoundé city centre, Cameroon
    #[must_use]
    pub const fn yaounde() -> Self {
        Self::new_unchecked(11.5021, 3.8480)
    }

    /// Douala city centre, Cameroon
    #[must_use]
    pub const fn douala() -> Self {
        Self::new_unchecked(9.7679, 4.0511)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_coordinate() {
        let c = Coordinate::new(11.50, 3.85).expect("valid coordinate");
        assert!((c.longitude() - 11.50).abs() < f64::EPSILON);
        assert!((c.latitude() - 3.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_boundary_coordinates() {
        assert!(Coordinate::new(180.0, 90.0).is_ok());
        assert!(Coordinate::new(-180.0, -90.0).is_ok());
        assert!(Coordinate::new(0.0, 0.0).is_ok());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(Coordinate::new(180.5, 0.0).is_err());
        assert!(Coordinate::new(0.0, -90.5).is_err());
    }

    #[test]
    fn test_non_finite_rejected() {
        assert!(Coordinate::new(f64::NAN, 0.0).is_err());
        assert!(Coordinate::new(0.0, f64::INFINITY).is_err());
    }

    #[test]
    fn test_lat_lon_order() {
        let c = Coordinate::from_lat_lon(3.85, 11.50).expect("valid");
        assert!((c.longitude() - 11.50).abs() < f64::EPSILON);
        assert!((c.latitude() - 3.85).abs() < f64::EPSILON);
    }

    #[test]
    fn test_lon_lat_string() {
        let c = Coordinate::new(11.5, 3.85).expect("valid");
        assert_eq!(c.to_lon_lat_string(), "11.5,3.85");
    }

    #[test]
    fn test_serializes_as_position_array() {
        let c = Coordinate::new(11.5, 3.85).expect("valid");
        let json = serde_json::to_string(&c).expect("serialize");
        assert_eq!(json, "[11.5,3.85]");

        let back: Coordinate = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(back, c);
    }

    #[test]
    fn test_deserialize_rejects_invalid() {
        let result: Result<Coordinate, _> = serde_json::from_str("[11.5, 95.0]");
        assert!(result.is_err());
    }
}
