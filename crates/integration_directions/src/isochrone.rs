//! Mapbox Isochrone client

use std::time::Duration;

use domain::{Coordinate, IsochronePolygon};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::DirectionsConfig;
use crate::error::DirectionsError;
use crate::models::{api, to_coordinates};

/// Longest contour the Isochrone API accepts, in minutes
pub const MAX_CONTOUR_MINUTES: u32 = 60;

/// Client fetching reachable-area polygons
#[derive(Debug, Clone)]
pub struct IsochroneClient {
    client: Client,
    access_token: String,
    config: DirectionsConfig,
}

impl IsochroneClient {
    /// Create a new isochrone client
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

    fn isochrone_url(&self, center: Coordinate) -> String {
        format!(
            "{}/isochrone/v1/mapbox/{}/{}",
            self.config.base_url.trim_end_matches('/'),
            self.config.isochrone_profile,
            center.to_lon_lat_string()
        )
    }

    /// Fetch the area reachable from `center` within `minutes`
    ///
    /// `minutes` is clamped to 1..=60.
    ///
    /// # Errors
    ///
    /// Returns an error if the request fails or the response holds no
    /// valid polygon.
    #[instrument(skip(self))]
    pub async fn isochrone(
        &self,
        center: Coordinate,
        minutes: u32,
    ) -> Result<IsochronePolygon, DirectionsError> {
        let minutes = minutes.clamp(1, MAX_CONTOUR_MINUTES);
        let url = self.isochrone_url(center);
        debug!(url = %url, minutes, "Requesting isochrone");

        let response = self
            .client
            .get(&url)
            .query(&[
                ("contours_minutes", minutes.to_string()),
                ("polygons", "true".to_string()),
                ("access_token", self.access_token.clone()),
            ])
            .send()
            .await
            .map_err(|e| DirectionsError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DirectionsError::from_status(status));
        }

        let body: api::IsochroneResponse = response
            .json()
            .await
            .map_err(|e| DirectionsError::ParseError(e.to_string()))?;

        let ring = body
            .features
            .into_iter()
            .next()
            .and_then(|f| f.geometry.coordinates.into_iter().next())
            .ok_or_else(|| DirectionsError::ParseError("No isochrone polygon".to_string()))?;

        IsochronePolygon::new(center, minutes, to_coordinates(&ring)?)
            .map_err(|e| DirectionsError::ParseError(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_isochrone_url() {
        let client = IsochroneClient::new(&DirectionsConfig::for_testing()).unwrap();
        assert_eq!(
            client.isochrone_url(Coordinate::yaounde()),
            "https://api.mapbox.com/isochrone/v1/mapbox/driving/11.5021,3.848"
        );
    }

    #[test]
    fn test_missing_token() {
        assert!(IsochroneClient::new(&DirectionsConfig::default()).is_err());
    }
}
