//! Map markers

use serde::{Deserialize, Serialize};

use crate::entities::SelectedPlace;
use crate::value_objects::Coordinate;

/// Role a marker plays on the map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MarkerRole {
    /// Trip start
    Departure,
    /// Trip end
    Arrival,
    /// Device position (pulsing)
    User,
    /// Point of interest
    Poi,
}

impl MarkerRole {
    /// Default marker color for the role
    #[must_use]
    pub const fn default_color(&self) -> &'static str {
        match self {
            Self::Departure => "#16a34a",
            Self::Arrival => "#dc2626",
            Self::User => "#2563eb",
            Self::Poi => "#f59e0b",
        }
    }
}

/// A marker to draw on the map
///
/// Markers are immutable: every update builds a new set rather than
/// mutating the drawn ones.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Marker {
    /// Position of the marker
    pub coordinate: Coordinate,
    /// Role of the marker
    pub role: MarkerRole,
    /// CSS color string
    pub color: String,
    /// Tooltip / popup label
    pub label: String,
}

impl Marker {
    /// Create a marker using the role's default color
    #[must_use]
    pub fn new(coordinate: Coordinate, role: MarkerRole, label: impl Into<String>) -> Self {
        Self {
            coordinate,
            role,
            color: role.default_color().to_string(),
            label: label.into(),
        }
    }

    /// Derive a marker from a selected place
    #[must_use]
    pub fn from_place(place: &SelectedPlace, role: MarkerRole) -> Self {
        Self::new(place.coordinate, role, place.label.clone())
    }

    /// Override the color
    #[must_use]
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }
}
