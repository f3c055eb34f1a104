//! Domain-level errors

use thiserror::Error;

/// Errors that can occur in the domain layer
#[derive(Debug, Error)]
pub enum DomainError {
    /// Coordinate outside the valid longitude/latitude range or not finite
    #[error("Invalid coordinate: longitude {longitude}, latitude {latitude}")]
    InvalidCoordinate { longitude: f64, latitude: f64 },

    /// Route geometry with fewer than two points
    #[error("Route geometry needs at least 2 coordinates, got {0}")]
    RouteTooShort(usize),

    /// Polygon ring that is not closed or has too few points
    #[error("Invalid polygon: {0}")]
    InvalidPolygon(String),

    /// Validation failed
    #[error("Validation failed: {0}")]
    ValidationError(String),
}

impl DomainError {
    /// Create an invalid coordinate error
    #[must_use]
    pub const fn invalid_coordinate(longitude: f64, latitude: f64) -> Self {
        Self::InvalidCoordinate {
            longitude,
            latitude,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_coordinate_error_message() {
        let err = DomainError::invalid_coordinate(200.0, 3.5);
        assert_eq!(
            err.to_string(),
            "Invalid coordinate: longitude 200, latitude 3.5"
        );
    }

    #[test]
    fn route_too_short_error_message() {
        let err = DomainError::RouteTooShort(1);
        assert_eq!(
            err.to_string(),
            "Route geometry needs at least 2 coordinates, got 1"
        );
    }

    #[test]
    fn validation_error_message() {
        let err = DomainError::ValidationError("label is required".to_string());
        assert_eq!(err.to_string(), "Validation failed: label is required");
    }
}
