//! Directions port
//!
//! Routes with traffic annotations and reachable-area polygons.

use async_trait::async_trait;
use domain::{CongestionLevel, Coordinate, IsochronePolygon, RouteGeometry};
#[cfg(test)]
use mockall::automock;

use crate::error::ApplicationError;

/// Route geometry with one congestion level per segment
///
/// `congestion` is empty when the provider has no traffic data.
#[derive(Debug, Clone, PartialEq)]
pub struct TrafficRoute {
    /// Route polyline with totals
    pub geometry: RouteGeometry,
    /// Per-segment congestion annotations
    pub congestion: Vec<CongestionLevel>,
}

/// Port for routing operations
#[cfg_attr(test, automock)]
#[async_trait]
pub trait DirectionsPort: Send + Sync {
    /// Request a driving route between two points
    async fn route(
        &self,
        departure: Coordinate,
        arrival: Coordinate,
    ) -> Result<TrafficRoute, ApplicationError>;

    /// Area reachable from `center` within `minutes`
    async fn isochrone(
        &self,
        center: Coordinate,
        minutes: u32,
    ) -> Result<IsochronePolygon, ApplicationError>;
}
