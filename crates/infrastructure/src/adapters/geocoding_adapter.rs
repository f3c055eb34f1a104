//! Geocoding adapter - Implements GeocodingPort using integration_geocoding

use application::{ApplicationError, GeocodingPort, SearchRequest};
use async_trait::async_trait;
use domain::{Coordinate, PlaceSuggestion, SelectedPlace};
use integration_geocoding::{GeocodingClient, GeocodingConfig, GeocodingError, SearchOptions};
use tracing::{debug, instrument};

/// Adapter over the Mapbox/Nominatim provider chain
#[derive(Debug)]
pub struct GeocodingAdapter {
    client: GeocodingClient,
    default_proximity: Option<Coordinate>,
}

impl GeocodingAdapter {
    /// Create an adapter from configuration
    pub fn new(config: &GeocodingConfig) -> Result<Self, ApplicationError> {
        let client = GeocodingClient::from_config(config).map_err(Self::map_error)?;
        Ok(Self::with_client(client))
    }

    /// Create an adapter over an existing client
    #[must_use]
    pub fn with_client(client: GeocodingClient) -> Self {
        Self {
            client,
            default_proximity: None,
        }
    }

    /// Bias searches toward a point when the caller gives none
    #[must_use]
    pub fn with_default_proximity(mut self, proximity: Option<Coordinate>) -> Self {
        self.default_proximity = proximity;
        self
    }

    /// Underlying provider chain
    #[must_use]
    pub const fn client(&self) -> &GeocodingClient {
        &self.client
    }

    fn options(&self, request: &SearchRequest) -> SearchOptions {
        SearchOptions {
            proximity: request.proximity.or(self.default_proximity),
            bbox: request.bbox,
            limit: request.limit,
            ..SearchOptions::default()
        }
    }

    /// Map integration geocoding error to application error
    fn map_error(err: GeocodingError) -> ApplicationError {
        match err {
            GeocodingError::ConnectionFailed(e)
            | GeocodingError::RequestFailed(e)
            | GeocodingError::ServiceUnavailable(e)
            | GeocodingError::AuthenticationFailed(e) => ApplicationError::ExternalService(e),
            GeocodingError::ParseError(e) => ApplicationError::Internal(e),
            GeocodingError::AddressNotFound(e) => ApplicationError::NotFound(e),
            GeocodingError::RateLimitExceeded { .. } => ApplicationError::RateLimited,
            GeocodingError::ConfigurationError(e) => ApplicationError::Configuration(e),
            GeocodingError::Timeout => {
                ApplicationError::ExternalService("Geocoding request timed out".into())
            },
        }
    }
}

#[async_trait]
impl GeocodingPort for GeocodingAdapter {
    async fn search(&self, query: &str, request: &SearchRequest) -> Vec<PlaceSuggestion> {
        self.client.search(query, &self.options(request)).await
    }

    #[instrument(skip(self, suggestion), fields(id = %suggestion.id))]
    async fn select(&self, suggestion: &PlaceSuggestion) -> Result<SelectedPlace, ApplicationError> {
        let result = self.client.select(suggestion).await.map_err(Self::map_error);
        if let Ok(place) = &result {
            debug!(label = %place.label, coordinate = %place.coordinate, "Suggestion selected");
        }
        result
    }

    async fn reverse_lookup(&self, coordinate: Coordinate) -> String {
        self.client.reverse_lookup(coordinate).await.label
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use domain::SessionToken;
    use integration_geocoding::{GeocodingProvider, ReverseAddress};
    use parking_lot::Mutex;

    use super::*;

    #[derive(Default)]
    struct StubProvider {
        seen: Mutex<Vec<SearchOptions>>,
        road: Option<String>,
    }

    #[async_trait]
    impl GeocodingProvider for StubProvider {
        async fn suggest(
            &self,
            query: &str,
            options: &SearchOptions,
            _session: &SessionToken,
        ) -> Result<Vec<PlaceSuggestion>, GeocodingError> {
            self.seen.lock().push(options.clone());
            Ok(vec![PlaceSuggestion {
                id: "n-1".to_string(),
                name: query.to_string(),
                formatted_address: format!("{query}, Cameroun"),
                coordinate: Some(Coordinate::douala()),
                raw_provider_context: serde_json::Value::Null,
            }])
        }

        async fn retrieve(
            &self,
            suggestion: &PlaceSuggestion,
            _session: &SessionToken,
        ) -> Result<Coordinate, GeocodingError> {
            Err(GeocodingError::AddressNotFound(suggestion.id.clone()))
        }

        async fn reverse(&self, _coordinate: Coordinate) -> Result<ReverseAddress, GeocodingError> {
            Ok(ReverseAddress {
                road: self.road.clone(),
                ..ReverseAddress::default()
            })
        }

        fn is_session_scoped(&self) -> bool {
            false
        }

        async fn is_healthy(&self) -> bool {
            true
        }

        fn provider_name(&self) -> &'static str {
            "stub"
        }
    }

    fn adapter(provider: Arc<StubProvider>) -> GeocodingAdapter {
        let client = GeocodingClient::with_providers(
            vec![provider as Arc<dyn GeocodingProvider>],
            &GeocodingConfig::for_testing(),
        );
        GeocodingAdapter::with_client(client)
    }

    #[tokio::test]
    async fn default_proximity_fills_missing_bias() {
        let provider = Arc::new(StubProvider::default());
        let adapter = adapter(Arc::clone(&provider))
            .with_default_proximity(Some(Coordinate::yaounde()));

        adapter.search("Akwa", &SearchRequest::default()).await;
        let request = SearchRequest {
            proximity: Some(Coordinate::douala()),
            limit: 3,
            ..SearchRequest::default()
        };
        adapter.search("Bonapriso", &request).await;

        let seen = provider.seen.lock();
        assert_eq!(seen[0].proximity, Some(Coordinate::yaounde()));
        assert_eq!(seen[1].proximity, Some(Coordinate::douala()));
        assert_eq!(seen[1].limit, 3);
    }

    #[tokio::test]
    async fn unresolvable_suggestion_is_not_found() {
        let adapter = adapter(Arc::new(StubProvider::default()));
        let suggestion = PlaceSuggestion {
            id: "mb-9".to_string(),
            name: "Marché Mokolo".to_string(),
            formatted_address: String::new(),
            coordinate: None,
            raw_provider_context: serde_json::Value::Null,
        };

        let err = adapter.select(&suggestion).await.unwrap_err();
        assert!(matches!(err, ApplicationError::NotFound(ref id) if id == "mb-9"));
    }

    #[tokio::test]
    async fn reverse_lookup_label_or_fallback() {
        let named = adapter(Arc::new(StubProvider {
            road: Some("Boulevard du 20 Mai".to_string()),
            ..StubProvider::default()
        }));
        assert_eq!(
            named.reverse_lookup(Coordinate::yaounde()).await,
            "Boulevard du 20 Mai"
        );

        let unnamed = adapter(Arc::new(StubProvider::default()));
        assert_eq!(
            unnamed.reverse_lookup(Coordinate::yaounde()).await,
            "Position actuelle"
        );
    }

    #[test]
    fn rate_limit_maps_to_rate_limited() {
        let err = GeocodingAdapter::map_error(GeocodingError::RateLimitExceeded {
            retry_after_secs: Some(2),
        });
        assert!(err.is_retryable());
        assert!(matches!(err, ApplicationError::RateLimited));
    }
}
