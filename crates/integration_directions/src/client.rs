//! Mapbox Directions client

use std::time::Duration;

use async_trait::async_trait;
use domain::Coordinate;
use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::DirectionsConfig;
use crate::error::DirectionsError;
use crate::models::{DirectionsRoute, api};

/// Trait for routing backends
#[async_trait]
pub trait DirectionsProvider: Send + Sync {
    /// Request a route with per-segment congestion between two points
    async fn route(
        &self,
        departure: Coordinate,
        arrival: Coordinate,
    ) -> Result<DirectionsRoute, DirectionsError>;

    /// Check if the provider is reachable
    async fn is_healthy(&self) -> bool;

    /// Get the provider name
    fn provider_name(&self) -> &'static str;
}

/// Mapbox Directions API client
#[derive(Debug, Clone)]
pub struct MapboxDirectionsClient {
    client: Client,
    access_token: String,
    config: DirectionsConfig,
}

impl MapboxDirectionsClient {
    /// Create a new directions client
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is missing or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &DirectionsConfig) -> Result<Self, DirectionsError> {
        let access_token = config.access_token.clone().ok_or_else(|| {
            DirectionsError::ConfigurationError("Mapbox access token is required".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| DirectionsError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            access_token,
            config: config.clone(),
        })
    }

    /// URL of a route request, without query parameters
    fn route_url(&self, departure: Coordinate, arrival: Coordinate) -> String {
        format!(
            "{}/directions/v5/mapbox/{}/{};{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.profile,
            departure.to_lon_lat_string(),
            arrival.to_lon_lat_string()
        )
    }

    fn route_params() -> [(&'static str, &'static str); 4] {
        [
            ("geometries", "geojson"),
            ("overview", "full"),
            ("annotations", "congestion,distance,duration"),
            ("alternatives", "false"),
        ]
    }
}

#[async_trait]
impl DirectionsProvider for MapboxDirectionsClient {
    #[instrument(skip(self), fields(profile = %self.config.profile))]
    async fn route(
        &self,
        departure: Coordinate,
        arrival: Coordinate,
    ) -> Result<DirectionsRoute, DirectionsError> {
        let url = self.route_url(departure, arrival);
        debug!(url = %url, "Requesting route");

        let response = self
            .client
            .get(&url)
            .query(&Self::route_params())
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|e| DirectionsError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectionsError::from_status(status));
        }

        let body: api::DirectionsResponse = response
            .json()
            .await
            .map_err(|e| DirectionsError::ParseError(e.to_string()))?;

        let route = DirectionsRoute::from_api(body)?;
        debug!(
            points = route.geometry.coordinates().len(),
            annotations = route.congestion.len(),
            "Route received"
        );
        Ok(route)
    }

    async fn is_healthy(&self) -> bool {
        self.route(Coordinate::yaounde(), Coordinate::new_unchecked(11.52, 3.87))
            .await
            .is_ok()
    }

    fn provider_name(&self) -> &'static str {
        "mapbox-directions"
    }
}
