//! Mapbox Search Box API client
//!
//! Session-scoped suggest/retrieve search and reverse geocoding via
//! [Search Box](https://docs.mapbox.com/api/search/search-box/).
//! Suggest results carry no coordinates; the retrieve call that resolves a
//! selected suggestion closes the billing session.

use std::time::Duration;

use async_trait::async_trait;
use domain::{Coordinate, PlaceSuggestion, SessionToken};
use reqwest::Client;
use tracing::{debug, instrument};

use crate::config::MapboxSearchConfig;
use crate::error::{GeocodingError, retry_after_secs};
use crate::models::{ReverseAddress, SearchOptions};
use crate::provider::GeocodingProvider;

/// Search Box API response structures
mod api {
    use serde::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct SuggestResponse {
        #[serde(default)]
        pub suggestions: Vec<Suggestion>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Suggestion {
        pub mapbox_id: String,
        #[serde(default)]
        pub name: String,
        pub full_address: Option<String>,
        pub place_formatted: Option<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct FeatureCollection {
        #[serde(default)]
        pub features: Vec<Feature>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Feature {
        pub geometry: Geometry,
        #[serde(default)]
        pub properties: Properties,
    }

    #[derive(Debug, Deserialize)]
    pub struct Geometry {
        pub coordinates: Vec<f64>,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Properties {
        pub name: Option<String>,
        pub feature_type: Option<String>,
        #[serde(default)]
        pub context: Context,
    }

    #[derive(Debug, Default, Deserialize)]
    pub struct Context {
        pub street: Option<Named>,
        pub neighborhood: Option<Named>,
        pub locality: Option<Named>,
        pub place: Option<Named>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Named {
        pub name: String,
    }
}

/// Mapbox Search Box client
#[derive(Debug)]
pub struct MapboxSearchClient {
    client: Client,
    access_token: String,
    config: MapboxSearchConfig,
}

impl MapboxSearchClient {
    /// Create a new Search Box client
    ///
    /// # Errors
    ///
    /// Returns an error if the access token is missing or the HTTP client
    /// cannot be initialized.
    pub fn new(config: &MapboxSearchConfig) -> Result<Self, GeocodingError> {
        let access_token = config.access_token.clone().ok_or_else(|| {
            GeocodingError::ConfigurationError("Mapbox access token is required".to_string())
        })?;

        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| GeocodingError::ConnectionFailed(e.to_string()))?;

        Ok(Self {
            client,
            access_token,
            config: config.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "{}/search/searchbox/v1/{path}",
            self.config.base_url.trim_end_matches('/')
        )
    }

    /// Query parameters of a suggest call, without the access token
    fn suggest_params(
        &self,
        query: &str,
        options: &SearchOptions,
        session: &SessionToken,
    ) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("q", query.to_string()),
            ("session_token", session.to_string()),
            ("limit", options.effective_limit().to_string()),
            (
                "language",
                options
                    .language
                    .clone()
                    .unwrap_or_else(|| self.config.language.clone()),
            ),
        ];

        let country = options
            .country
            .clone()
            .unwrap_or_else(|| self.config.country.clone());
        if !country.is_empty() {
            params.push(("country", country));
        }
        if let Some(proximity) = options.proximity {
            params.push(("proximity", proximity.to_lon_lat_string()));
        }
        if let Some(bbox) = options.bbox {
            params.push(("bbox", bbox.to_query_string()));
        }
        params
    }

    /// Send a GET request and decode the JSON body
    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: &str,
        params: &[(&str, String)],
    ) -> Result<T, GeocodingError> {
        let response = self
            .client
            .get(url)
            .query(params)
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|e| GeocodingError::from_transport(&e))?;

        let status = response.status();
        debug!(status = %status, "Received Search Box response");
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

    fn convert_suggestion(raw: api::Suggestion) -> PlaceSuggestion {
        let formatted_address = raw
            .full_address
            .clone()
            .or_else(|| raw.place_formatted.clone())
            .unwrap_or_default();
        let context = serde_json::json!({
            "provider": "mapbox",
            "mapbox_id": raw.mapbox_id,
            "place_formatted": raw.place_formatted,
        });

        PlaceSuggestion {
            id: raw.mapbox_id,
            name: raw.name,
            formatted_address,
            coordinate: None,
            raw_provider_context: context,
        }
    }

    fn feature_coordinate(feature: &api::Feature) -> Result<Coordinate, GeocodingError> {
        match feature.geometry.coordinates.as_slice() {
            [lon, lat, ..] => Coordinate::new(*lon, *lat)
                .map_err(|e| GeocodingError::ParseError(e.to_string())),
            _ => Err(GeocodingError::ParseError(
                "Feature geometry has no position".to_string(),
            )),
        }
    }

    fn convert_address(properties: api::Properties) -> ReverseAddress {
        let api::Properties {
            name,
            feature_type,
            context,
        } = properties;

        let poi = match feature_type.as_deref() {
            Some("poi") => name,
            _ => None,
        };

        ReverseAddress {
            poi,
            building: None,
            road: context.street.map(|n| n.name),
            neighborhood: context
                .neighborhood
                .or(context.locality)
                .map(|n| n.name),
            municipality: context.place.map(|n| n.name),
        }
    }
}

#[async_trait]
impl GeocodingProvider for MapboxSearchClient {
    #[instrument(skip(self, options, session), fields(provider = "mapbox"))]
    async fn suggest(
        &self,
        query: &str,
        options: &SearchOptions,
        session: &SessionToken,
    ) -> Result<Vec<PlaceSuggestion>, GeocodingError> {
        let url = self.endpoint("suggest");
        let params = self.suggest_params(query, options, session);
        debug!(url = %url, "Sending Search Box suggest request");

        let response: api::SuggestResponse = self.get_json(&url, &params).await?;
        Ok(response
            .suggestions
            .into_iter()
            .map(Self::convert_suggestion)
            .collect())
    }

    #[instrument(skip(self, suggestion, session), fields(provider = "mapbox", id = %suggestion.id))]
    async fn retrieve(
        &self,
        suggestion: &PlaceSuggestion,
        session: &SessionToken,
    ) -> Result<Coordinate, GeocodingError> {
        let encoded_id = url::form_urlencoded::byte_serialize(suggestion.id.as_bytes())
            .collect::<String>();
        let url = self.endpoint(&format!("retrieve/{encoded_id}"));
        let params = [("session_token", session.to_string())];
        debug!(url = %url, "Sending Search Box retrieve request");

        let response: api::FeatureCollection = self.get_json(&url, &params).await?;
        let feature = response
            .features
            .first()
            .ok_or_else(|| GeocodingError::AddressNotFound(suggestion.id.clone()))?;
        Self::feature_coordinate(feature)
    }

    #[instrument(skip(self), fields(provider = "mapbox"))]
    async fn reverse(&self, coordinate: Coordinate) -> Result<ReverseAddress, GeocodingError> {
        let url = self.endpoint("reverse");
        let params = [
            ("longitude", coordinate.longitude().to_string()),
            ("latitude", coordinate.latitude().to_string()),
            ("language", self.config.language.clone()),
            ("limit", "1".to_string()),
        ];
        debug!(url = %url, "Sending Search Box reverse request");

        let response: api::FeatureCollection = self.get_json(&url, &params).await?;
        let feature = response
            .features
            .into_iter()
            .next()
            .ok_or_else(|| GeocodingError::AddressNotFound(coordinate.to_string()))?;
        Ok(Self::convert_address(feature.properties))
    }

    fn is_session_scoped(&self) -> bool {
        true
    }

    async fn is_healthy(&self) -> bool {
        self.reverse(Coordinate::yaounde()).await.is_ok()
    }

    fn provider_name(&self) -> &'static str {
        "mapbox"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client() -> MapboxSearchClient {
        MapboxSearchClient::new(&MapboxSearchConfig {
            access_token: Some("pk.test".to_string()),
            ..Default::default()
        })
        .unwrap()
    }

    #[test]
    fn test_missing_token_is_configuration_error() {
        let result = MapboxSearchClient::new(&MapboxSearchConfig::default());
        assert!(matches!(
            result,
            Err(GeocodingError::ConfigurationError(_))
        ));
    }

    #[test]
    fn test_suggest_params() {
        let session = SessionToken::from_string("sess-1");
        let options = SearchOptions::default()
            .with_proximity(Coordinate::yaounde())
            .with_limit(3);
        let params = client().suggest_params("mvan", &options, &session);

        let get = |k: &str| {
            params
                .iter()
                .find(|(key, _)| *key == k)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("q"), Some("mvan"));
        assert_eq!(get("session_token"), Some("sess-1"));
        assert_eq!(get("limit"), Some("3"));
        assert_eq!(get("country"), Some("cm"));
        assert_eq!(get("language"), Some("fr"));
        assert_eq!(get("proximity"), Some("11.5021,3.848"));
        assert_eq!(get("bbox"), None);
        assert_eq!(get("access_token"), None);
    }

    #[test]
    fn test_convert_suggestion() {
        let raw: api::Suggestion = serde_json::from_str(
            r#"{"mapbox_id": "dXJuOm1ieHBvaTo", "name": "Marché Mokolo",
                "full_address": "Mokolo, Yaoundé, Cameroun"}"#,
        )
        .unwrap();
        let suggestion = MapboxSearchClient::convert_suggestion(raw);
        assert_eq!(suggestion.id, "dXJuOm1ieHBvaTo");
        assert_eq!(suggestion.formatted_address, "Mokolo, Yaoundé, Cameroun");
        assert!(suggestion.needs_resolution());
        assert_eq!(suggestion.raw_provider_context["provider"], "mapbox");
    }

    #[test]
    fn test_convert_address_for_poi() {
        let raw: api::Properties = serde_json::from_str(
            r#"{"name": "Hôtel de Ville", "feature_type": "poi",
                "context": {"street": {"name": "Rue Nachtigal"},
                            "neighborhood": {"name": "Centre"},
                            "place": {"name": "Yaoundé"}}}"#,
        )
        .unwrap();
        let address = MapboxSearchClient::convert_address(raw);
        assert_eq!(address.best_label(), Some("Hôtel de Ville"));
        assert_eq!(address.road.as_deref(), Some("Rue Nachtigal"));
    }

    #[test]
    fn test_convert_address_ignores_name_of_non_poi() {
        let raw: api::Properties = serde_json::from_str(
            r#"{"name": "Yaoundé", "feature_type": "place",
                "context": {"locality": {"name": "Essos"}}}"#,
        )
        .unwrap();
        let address = MapboxSearchClient::convert_address(raw);
        assert_eq!(address.poi, None);
        assert_eq!(address.best_label(), Some("Essos"));
    }
}
