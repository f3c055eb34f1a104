//! Directions adapter - Implements DirectionsPort using integration_directions

use application::{ApplicationError, DirectionsPort, TrafficRoute};
use async_trait::async_trait;
use domain::{Coordinate, IsochronePolygon};
use integration_directions::{
    DirectionsConfig, DirectionsError, DirectionsProvider, IsochroneClient,
    MapboxDirectionsClient,
};
use tracing::{debug, instrument};

use super::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};

/// Adapter for traffic-aware routes and isochrones
pub struct DirectionsAdapter {
    provider: Box<dyn DirectionsProvider>,
    isochrones: Option<IsochroneClient>,
    circuit_breaker: Option<CircuitBreaker>,
}

impl std::fmt::Debug for DirectionsAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectionsAdapter")
            .field("provider", &self.provider.provider_name())
            .field("isochrones", &self.isochrones.is_some())
            .field(
                "circuit_breaker",
                &self.circuit_breaker.as_ref().map(CircuitBreaker::name),
            )
            .finish()
    }
}

impl DirectionsAdapter {
    /// Create Mapbox directions and isochrone clients from configuration
    pub fn new(config: &DirectionsConfig) -> Result<Self, ApplicationError> {
        let provider = MapboxDirectionsClient::new(config).map_err(Self::map_error)?;
        let isochrones = IsochroneClient::new(config).map_err(Self::map_error)?;
        Ok(Self {
            provider: Box::new(provider),
            isochrones: Some(isochrones),
            circuit_breaker: None,
        })
    }

    /// Create an adapter over any routing backend, without isochrones
    #[must_use]
    pub fn with_provider(provider: Box<dyn DirectionsProvider>) -> Self {
        Self {
            provider,
            isochrones: None,
            circuit_breaker: None,
        }
    }

    /// Fail fast after repeated routing failures
    #[must_use]
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = Some(CircuitBreaker::with_config("directions", config));
        self
    }

    /// Check if the routing backend is reachable
    pub async fn is_available(&self) -> bool {
        if self.circuit_breaker.as_ref().is_some_and(CircuitBreaker::is_open) {
            return false;
        }
        self.provider.is_healthy().await
    }

    /// Map integration directions error to application error
    fn map_error(err: DirectionsError) -> ApplicationError {
        match err {
            DirectionsError::ConnectionFailed(e)
            | DirectionsError::RequestFailed(e)
            | DirectionsError::ServiceUnavailable(e)
            | DirectionsError::AuthenticationFailed(e) => ApplicationError::ExternalService(e),
            DirectionsError::ParseError(e) => ApplicationError::Internal(e),
            DirectionsError::NoRoute(e) => ApplicationError::NotFound(e),
            DirectionsError::RateLimitExceeded => ApplicationError::RateLimited,
            DirectionsError::ConfigurationError(e) => ApplicationError::Configuration(e),
            DirectionsError::Timeout => {
                ApplicationError::ExternalService("Directions request timed out".into())
            },
        }
    }

    fn map_breaker_error(err: CircuitBreakerError<DirectionsError>) -> ApplicationError {
        match err {
            CircuitBreakerError::Open(name) => {
                ApplicationError::ExternalService(format!("{name} circuit breaker is open"))
            },
            CircuitBreakerError::Service(e) => Self::map_error(e),
        }
    }
}

#[async_trait]
impl DirectionsPort for DirectionsAdapter {
    #[instrument(skip(self), fields(departure = %departure, arrival = %arrival))]
    async fn route(
        &self,
        departure: Coordinate,
        arrival: Coordinate,
    ) -> Result<TrafficRoute, ApplicationError> {
        let route = match &self.circuit_breaker {
            Some(cb) => cb
                .call(|| self.provider.route(departure, arrival))
                .await
                .map_err(Self::map_breaker_error)?,
            None => self
                .provider
                .route(departure, arrival)
                .await
                .map_err(Self::map_error)?,
        };

        debug!(
            points = route.geometry.coordinates().len(),
            annotations = route.congestion.len(),
            "Route received"
        );
        Ok(TrafficRoute {
            geometry: route.geometry,
            congestion: route.congestion,
        })
    }

    #[instrument(skip(self), fields(center = %center))]
    async fn isochrone(
        &self,
        center: Coordinate,
        minutes: u32,
    ) -> Result<IsochronePolygon, ApplicationError> {
        let client = self.isochrones.as_ref().ok_or_else(|| {
            ApplicationError::Configuration("No isochrone client configured".into())
        })?;

        match &self.circuit_breaker {
            Some(cb) => cb
                .call(|| client.isochrone(center, minutes))
                .await
                .map_err(Self::map_breaker_error),
            None => client
                .isochrone(center, minutes)
                .await
                .map_err(Self::map_error),
        }
    }
}
