//! Isochrone polygon

use serde::{Deserialize, Serialize};

use crate::errors::DomainError;
use crate::value_objects::{BoundingBox, Coordinate};

/// Reachable area within a fixed travel time from a point
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawIsochrone")]
pub struct IsochronePolygon {
    /// Origin of the isochrone
    pub center: Coordinate,
    /// Travel time in minutes
    pub minutes: u32,
    ring: Vec<Coordinate>,
}

#[derive(Deserialize)]
struct RawIsochrone {
    center: Coordinate,
    minutes: u32,
    ring: Vec<Coordinate>,
}

impl TryFrom<RawIsochrone> for IsochronePolygon {
    type Error = DomainError;

    fn try_from(raw: RawIsochrone) -> Result<Self, Self::Error> {
        Self::new(raw.center, raw.minutes, raw.ring)
    }
}

impl IsochronePolygon {
    /// Create an isochrone from its outer ring
    ///
    /// # Errors
    ///
    /// Returns `DomainError::InvalidPolygon` if the ring has fewer than four
    /// positions or its first and last positions differ.
    pub fn new(center: Coordinate, minutes: u32, ring: Vec<Coordinate>) -> Result<Self, DomainError> {
        if ring.len() < 4 {
            return Err(DomainError::InvalidPolygon(format!(
                "ring needs at least 4 positions, got {}",
                ring.len()
            )));
        }
        if ring.first() != ring.last() {
            return Err(DomainError::InvalidPolygon("ring is not closed".to_string()));
        }
        Ok(Self {
            center,
            minutes,
            ring,
        })
    }

    /// Outer ring, closed
    #[must_use]
    pub fn ring(&self) -> &[Coordinate] {
        &self.ring
    }

    /// Bounding box of the polygon
    #[must_use]
    pub fn bounds(&self) -> Option<BoundingBox> {
        BoundingBox::enclosing(&self.ring)
    }
}
