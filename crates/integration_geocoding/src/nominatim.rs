//! Nominatim geocoding client
//!
//! Stateless forward and reverse geocoding using the
//! [Nominatim](https://nominatim.openstreetmap.org) API (OpenStreetMap).
//! Forward results carry coordinates, so suggestions from this provider
//! never need a retrieve call.
//!
//! Requests are spaced by a configurable interval (the public instance allows
//! one request per second).

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use domain::{Coordinate, PlaceSuggestion, SessionToken};
use reqwest::Client;
use serde::Deserialize;
use tokio::sync::Mutex;
use tokio::time::Instant;
use tracing::{debug, instrument};

use crate::config::NominatimConfig;
use crate::error::{GeocodingError, retry_after_secs};
use crate::models::{ReverseAddress, SearchOptions};
use crate::provider::GeocodingProvider;

/// Half-size in degrees of the viewbox used to bias toward a proximity point
const PROXIMITY_VIEWBOX_DEG: f64 = 0.25;

/// Nominatim-based geocoding client with request spacing
#[derive(Debug)]
pub struct NominatimClient {
    client: Client,
    config: NominatimConfig,
    last_request: Arc<Mutex<Option<Instant>>>,
}

impl NominatimClient {
    /// Create a new Nominatim geocoding client
    ///
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be initialized.
    pub fn new(config: &NominatimConfig) -> Result<Self, GeocodingError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(|e| GeocodingError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            config: config.clone(),
            last_request: Arc::new(Mutex::new(None)),
        })
    }

    /// Enforce the minimum spacing between requests
    async fn rate_limit(&self) {
        let interval = Duration::from_millis(self.config.min_request_interval_ms);
        let mut last = self.last_request.lock().await;
        if let Some(previous) = *last {
            let elapsed = previous.elapsed();
            if elapsed < interval {
                let wait = interval.saturating_sub(elapsed);
                debug!(?wait, "Rate limiting geocoding request");
                tokio::time::sleep(wait).await;
            }
        }
        *last = Some(Instant::now());
    }

    /// Query parameters of a forward search
    fn search_params(&self, query: &str, options: &SearchOptions) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.to_string()),
            ("format", "jsonv2".to_string()),
            ("limit", options.effective_limit().to_string()),
            (
                "accept-language",
                options
                    .language
                    .clone()
                    .unwrap_or_else(|| self.config.language.clone()),
            ),
        ];

        let country = options
            .country
            .clone()
            .unwrap_or_else(|| self.config.country_filter.clone());
        if !country.is_empty() {
            params.push(("countrycodes", country));
        }

        if let Some(bbox) = options.bbox {
            params.push(("viewbox", bbox.to_query_string()));
            params.push(("bounded", "1".to_string()));
        } else if let Some(p) = options.proximity {
            // Unbounded viewbox only biases ranking
            params.push((
                "viewbox",
                format!(
                    "{},{},{},{}",
                    p.longitude() - PROXIMITY_VIEWBOX_DEG,
                    p.latitude() - PROXIMITY_VIEWBOX_DEG,
                    p.longitude() + PROXIMITY_VIEWBOX_DEG,
                    p.latitude() + PROXIMITY_VIEWBOX_DEG
                ),
            ));
        }
        params
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, GeocodingError> {
        self.rate_limit().await;

        let response = self
            .client
            .get(url)
            .query(params)
            .send()
            .await
            .map_err(|e| GeocodingError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(GeocodingError::from_status(
                status,
                retry_after_secs(&response),
            ));
        }

        response
            .json()
            .await
            .map_err(|e| GeocodingError::ParseError(e.to_string()))
    }

    fn convert_result(raw: NominatimResult) -> Result<PlaceSuggestion, GeocodingError> {
        let lat: f64 = raw
            .lat
            .parse()
            .map_err(|_| GeocodingError::ParseError("Invalid latitude".to_string()))?;
        let lon: f64 = raw
            .lon
            .parse()
            .map_err(|_| GeocodingError::ParseError("Invalid longitude".to_string()))?;
        let coordinate =
            Coordinate::new(lon, lat).map_err(|e| GeocodingError::ParseError(e.to_string()))?;

        let display_name = raw.display_name.unwrap_or_default();
        let name = raw
            .name
            .filter(|n| !n.trim().is_empty())
            .or_else(|| display_name.split(',').next().map(|s| s.trim().to_string()))
            .unwrap_or_default();

        Ok(PlaceSuggestion {
            id: raw.place_id.map_or_else(String::new, |id| id.to_string()),
            name,
            formatted_address: display_name,
            coordinate: Some(coordinate),
            raw_provider_context: serde_json::json!({
                "provider": "nominatim",
                "category": raw.category,
                "type": raw.kind,
            }),
        })
    }

    fn convert_address(raw: NominatimReverse) -> ReverseAddress {
        let a = raw.address.unwrap_or_default();
        let named_feature = matches!(
            raw.category.as_deref(),
            Some("amenity" | "shop" | "tourism" | "leisure" | "office")
        );

        ReverseAddress {
            poi: a
                .amenity
                .or(a.shop)
                .or(a.tourism)
                .or(a.leisure)
                .or_else(|| raw.name.filter(|_| named_feature)),
            building: a.building,
            road: a.road,
            neighborhood: a.neighbourhood.or(a.quarter).or(a.suburb),
            municipality: a.city.or(a.town).or(a.village).or(a.municipality),
        }
    }
}

#[async_trait]
impl GeocodingProvider for NominatimClient {
    #[instrument(skip(self, options, _session), fields(provider = "nominatim"))]
    async fn suggest(
        &self,
        query: &str,
        options: &SearchOptions,
        _session: &SessionToken,
    ) -> Result<Vec<PlaceSuggestion>, GeocodingError> {
        let url = format!("{}/search", self.config.base_url);
        let params = self.search_params(query, options);
        debug!(%query, "Geocoding address");

        let results: Vec<NominatimResult> = self.get_json(&url, &params).await?;
        results
            .into_iter()
            .map(Self::convert_result)
            .collect::<Result<Vec<_>, _>>()
    }

    async fn retrieve(
        &self,
        suggestion: &PlaceSuggestion,
        _session: &SessionToken,
    ) -> Result<Coordinate, GeocodingError> {
        if let Some(coordinate) = suggestion.coordinate {
            return Ok(coordinate);
        }

        let options = SearchOptions::default().with_limit(1);
        let query = if suggestion.formatted_address.is_empty() {
            suggestion.name.as_str()
        } else {
            suggestion.formatted_address.as_str()
        };
        self.suggest(query, &options, &SessionToken::generate())
            .await?
            .into_iter()
            .find_map(|s| s.coordinate)
            .ok_or_else(|| GeocodingError::AddressNotFound(query.to_string()))
    }

    #[instrument(skip(self), fields(provider = "nominatim"))]
    async fn reverse(&self, coordinate: Coordinate) -> Result<ReverseAddress, GeocodingError> {
        let url = format!("{}/reverse", self.config.base_url);
        let params = [
            ("lat", coordinate.latitude().to_string()),
            ("lon", coordinate.longitude().to_string()),
            ("format", "jsonv2".to_string()),
            ("addressdetails", "1".to_string()),
            ("accept-language", self.config.language.clone()),
        ];
        debug!(%coordinate, "Reverse geocoding");

        let raw: NominatimReverse = self.get_json(&url, &params).await?;
        if let Some(error) = raw.error {
            return Err(GeocodingError::AddressNotFound(error));
        }
        Ok(Self::convert_address(raw))
    }

    fn is_session_scoped(&self) -> bool {
        false
    }

    async fn is_healthy(&self) -> bool {
        let url = format!("{}/status", self.config.base_url);
        self.client
            .get(&url)
            .send()
            .await
            .is_ok_and(|r| r.status().is_success())
    }

    fn provider_name(&self) -> &'static str {
        "nominatim"
    }
}

/// Raw Nominatim search result
#[derive(Debug, Deserialize)]
struct NominatimResult {
    place_id: Option<u64>,
    lat: String,
    lon: String,
    name: Option<String>,
    display_name: Option<String>,
    category: Option<String>,
    #[serde(rename = "type")]
    kind: Option<String>,
}

/// Raw Nominatim reverse result
#[derive(Debug, Deserialize)]
struct NominatimReverse {
    name: Option<String>,
    category: Option<String>,
    address: Option<NominatimAddress>,
    error: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
struct NominatimAddress {
    amenity: Option<String>,
    shop: Option<String>,
    tourism: Option<String>,
    leisure: Option<String>,
    building: Option<String>,
    road: Option<String>,
    neighbourhood: Option<String>,
    quarter: Option<String>,
    suburb: Option<String>,
    city: Option<String>,
    town: Option<String>,
    village: Option<String>,
    municipality: Option<String>,
}
