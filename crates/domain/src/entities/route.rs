//! Route geometry

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{BoundingBox, Coordinate};

/// Ordered route polyline with its totals
///
/// Always holds at least two coordinates, deserialized values included.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawRouteGeometry")]
pub struct RouteGeometry {
    coordinates: Vec<Coordinate>,
    /// Total distance in meters
    pub distance_m: f64,
    /// Total duration in seconds
    pub duration_s: f64,
}

#[derive(Deserialize)]
struct RawRouteGeometry {
    coordinates: Vec<Coordinate>,
    distance_m: f64,
    duration_s: f64,
}

impl TryFrom<RawRouteGeometry> for RouteGeometry {
    type Error = DomainError;

    fn try_from(raw: RawRouteGeometry) -> Result<Self, Self::Error> {
        Self::new(raw.coordinates, raw.distance_m, raw.duration_s)
    }
}

impl RouteGeometry {
    /// Create a route geometry
    ///
    /// # Errors
    ///
    /// Returns `DomainError::RouteTooShort` with fewer than 2 coordinates.
    pub fn new(
        coordinates: Vec<Coordinate>,
        distance_m: f64,
        duration_s: f64,
    ) -> Result<Self, DomainError> {
        if coordinates.len() < 2 {
            return Err(DomainError::RouteTooShort(coordinates.len()));
        }
        Ok(Self {
            coordinates,
            distance_m,
            duration_s,
        })
    }

    /// Route coordinates in travel order
    #[must_use]
    pub fn coordinates(&self) -> &[Coordinate] {
        &self.coordinates
    }

    /// Bounding box of the whole route
    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(&self.coordinates)
    }

    /// Distance in kilometers
    #[must_use]
    pub fn distance_km(&self) -> f64 {
        self.distance_m / 1000.0
    }

    /// Duration in whole minutes (rounded up)
    #[must_use]
    pub fn duration_minutes(&self) -> u32 {
        (self.duration_s / 60.0).ceil().max(0.0) as u32
    }
}
