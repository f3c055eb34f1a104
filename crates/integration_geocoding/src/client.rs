//! Provider chain with caching and session management

use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use domain::{Coordinate, PlaceSource, PlaceSuggestion, SelectedPlace, SessionToken};
use moka::future::Cache;
use parking_lot::Mutex;
use tracing::{debug, info, instrument, warn};

use crate::config::GeocodingConfig;
use crate::error::GeocodingError;
use crate::mapbox::MapboxSearchClient;
use crate::models::{ReverseLookup, SearchOptions};
use crate::nominatim::NominatimClient;
use crate::provider::GeocodingProvider;

/// Shortest query that is sent to a provider
pub const MIN_QUERY_CHARS: usize = 2;

/// Reverse answers are cached per coordinate rounded to about one meter
const REVERSE_KEY_SCALE: f64 = 100_000.0;

const CACHE_CAPACITY: u64 = 1000;

/// Geocoding client trying each provider in order
///
/// Holds the session token shared by the suggest calls of one search
/// session. The token is replaced after a suggestion is resolved by a
/// session-scoped provider; fallback answers leave it untouched.
pub struct GeocodingClient {
    providers: Vec<Arc<dyn GeocodingProvider>>,
    session: Mutex<SessionToken>,
    search_cache: Option<Cache<String, Vec<PlaceSuggestion>>>,
    reverse_cache: Option<Cache<(i64, i64), ReverseLookup>>,
    fallback_label: String,
}

impl fmt::Debug for GeocodingClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GeocodingClient")
            .field(
                "providers",
                &self
                    .providers
                    .iter()
                    .map(|p| p.provider_name())
                    .collect::<Vec<_>>(),
            )
            .field("session", &*self.session.lock())
            .field("caching", &self.search_cache.is_some())
            .finish_non_exhaustive()
    }
}

impl GeocodingClient {
    /// Build the default chain: Mapbox (when a token is configured), then Nominatim
    ///
    /// # Errors
    ///
    /// Returns an error if an HTTP client cannot be initialized.
    pub fn from_config(config: &GeocodingConfig) -> Result<Self, GeocodingError> {
        let mut providers: Vec<Arc<dyn GeocodingProvider>> = Vec::with_capacity(2);

        if config.mapbox.access_token.is_some() {
            providers.push(Arc::new(MapboxSearchClient::new(&config.mapbox)?));
        } else {
            warn!("No Mapbox access token configured, using Nominatim only");
        }
        providers.push(Arc::new(NominatimClient::new(&config.nominatim)?));

        Ok(Self::with_providers(providers, config))
    }

    /// Build a client over an explicit provider chain
    #[must_use]
    pub fn with_providers(
        providers: Vec<Arc<dyn GeocodingProvider>>,
        config: &GeocodingConfig,
    ) -> Self {
        let (search_cache, reverse_cache) = if config.caching_enabled() {
            let ttl = Duration::from_secs(config.cache_ttl_secs);
            (
                Some(
                    Cache::builder()
                        .max_capacity(CACHE_CAPACITY)
                        .time_to_live(ttl)
                        .build(),
                ),
                Some(
                    Cache::builder()
                        .max_capacity(CACHE_CAPACITY)
                        .time_to_live(ttl)
                        .build(),
                ),
            )
        } else {
            (None, None)
        };

        Self {
            providers,
            session: Mutex::new(SessionToken::generate()),
            search_cache,
            reverse_cache,
            fallback_label: config.fallback_label.clone(),
        }
    }

    /// Current session token
    #[must_use]
    pub fn session_token(&self) -> SessionToken {
        self.session.lock().clone()
    }

    /// Start a new search session
    pub fn rotate_session(&self) {
        let next = SessionToken::generate();
        debug!(session = %next, "Rotating search session token");
        *self.session.lock() = next;
    }

    /// Names of the providers in the order they are tried
    #[must_use]
    pub fn provider_names(&self) -> Vec<&'static str> {
        self.providers.iter().map(|p| p.provider_name()).collect()
    }

    /// Search places matching free text
    ///
    /// Queries shorter than [`MIN_QUERY_CHARS`] return nothing without a
    /// network call. When every provider fails the result is empty.
    #[instrument(skip(self, options))]
    pub async fn search(&self, query: &str, options: &SearchOptions) -> Vec<PlaceSuggestion> {
        let query = query.trim();
        if query.chars().count() < MIN_QUERY_CHARS {
            return Vec::new();
        }

        let cache_key = options.cache_key(query);
        if let Some(cache) = &self.search_cache {
            if let Some(hit) = cache.get(&cache_key).await {
                debug!(%query, "Search cache hit");
                return hit;
            }
        }

        let session = self.session_token();
        for (index, provider) in self.providers.iter().enumerate() {
            if index > 0 {
                info!(provider = provider.provider_name(), "Using fallback search provider");
            }

            match provider.suggest(query, options, &session).await {
                Ok(results) if !results.is_empty() => {
                    debug!(
                        provider = provider.provider_name(),
                        results = results.len(),
                        "Search returned results"
                    );
                    if let Some(cache) = &self.search_cache {
                        cache.insert(cache_key, results.clone()).await;
                    }
                    return results;
                },
                Ok(_) => {
                    debug!(provider = provider.provider_name(), "Search returned no results");
                },
                Err(GeocodingError::RateLimitExceeded { retry_after_secs }) => {
                    warn!(
                        provider = provider.provider_name(),
                        ?retry_after_secs,
                        "Search provider rate limited"
                    );
                },
                Err(e) => {
                    warn!(
                        provider = provider.provider_name(),
                        error = %e,
                        "Search provider failed"
                    );
                },
            }
        }

        Vec::new()
    }

    /// Confirm a suggestion, resolving its coordinate when needed
    ///
    /// # Errors
    ///
    /// Returns an error if no provider can resolve the suggestion.
    #[instrument(skip(self, suggestion), fields(id = %suggestion.id))]
    pub async fn select(
        &self,
        suggestion: &PlaceSuggestion,
    ) -> Result<SelectedPlace, GeocodingError> {
        let label = suggestion.display_label().to_string();
        if let Some(coordinate) = suggestion.coordinate {
            return Ok(SelectedPlace::new(label, coordinate, PlaceSource::Search));
        }

        let session = self.session_token();
        let mut last_error = None;

        for provider in self.providers.iter().filter(|p| p.is_session_scoped()) {
            match provider.retrieve(suggestion, &session).await {
                Ok(coordinate) => {
                    self.rotate_session();
                    return Ok(SelectedPlace::new(label, coordinate, PlaceSource::Search));
                },
                Err(e) => {
                    warn!(
                        provider = provider.provider_name(),
                        error = %e,
                        "Retrieve failed, trying stateless providers"
                    );
                    last_error = Some(e);
                },
            }
        }

        for provider in self.providers.iter().filter(|p| !p.is_session_scoped()) {
            match provider.retrieve(suggestion, &session).await {
                Ok(coordinate) => {
                    return Ok(SelectedPlace::new(label, coordinate, PlaceSource::Search));
                },
                Err(e) => {
                    warn!(
                        provider = provider.provider_name(),
                        error = %e,
                        "Fallback resolution failed"
                    );
                    last_error = Some(e);
                },
            }
        }

        Err(last_error.unwrap_or_else(|| GeocodingError::AddressNotFound(label)))
    }

    /// Resolve a coordinate to the most specific available label
    ///
    /// Never fails: when no provider answers, the generic fallback label is
    /// returned with the coordinate.
    #[instrument(skip(self))]
    pub async fn reverse_lookup(&self, coordinate: Coordinate) -> ReverseLookup {
        let key = reverse_key(coordinate);
        if let Some(cache) = &self.reverse_cache {
            if let Some(hit) = cache.get(&key).await {
                debug!("Reverse cache hit");
                return hit;
            }
        }

        for provider in &self.providers {
            match provider.reverse(coordinate).await {
                Ok(address) => {
                    if let Some(label) = address.best_label() {
                        let lookup = ReverseLookup {
                            label: label.to_string(),
                            coordinate,
                            resolved: true,
                        };
                        if let Some(cache) = &self.reverse_cache {
                            cache.insert(key, lookup.clone()).await;
                        }
                        return lookup;
                    }
                    debug!(provider = provider.provider_name(), "Reverse lookup had no label");
                },
                Err(e) => {
                    warn!(
                        provider = provider.provider_name(),
                        error = %e,
                        "Reverse lookup failed"
                    );
                },
            }
        }

        ReverseLookup {
            label: self.fallback_label.clone(),
            coordinate,
            resolved: false,
        }
    }

    /// Check if any provider is reachable
    pub async fn is_healthy(&self) -> bool {
        for provider in &self.providers {
            if provider.is_healthy().await {
                return true;
            }
        }
        false
    }
}

fn reverse_key(coordinate: Coordinate) -> (i64, i64) {
    (
        (coordinate.longitude() * REVERSE_KEY_SCALE).round() as i64,
        (coordinate.latitude() * REVERSE_KEY_SCALE).round() as i64,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ReverseAddress;
    use crate::provider::tests::MockProvider;

    fn suggestion(id: &str, coordinate: Option<Coordinate>) -> PlaceSuggestion {
        PlaceSuggestion {
            id: id.to_string(),
            name: format!("Place {id}"),
            formatted_address: format!("Place {id}, Yaoundé"),
            coordinate,
            raw_provider_context: serde_json::Value::Null,
        }
    }

    fn client(providers: Vec<Arc<MockProvider>>, config: &GeocodingConfig) -> GeocodingClient {
        GeocodingClient::with_providers(
            providers
                .into_iter()
                .map(|p| p as Arc<dyn GeocodingProvider>)
                .collect(),
            config,
        )
    }

    #[tokio::test]
    async fn test_short_query_makes_no_call() {
        let primary = Arc::new(MockProvider::new("primary", true));
        let client = client(vec![primary.clone()], &GeocodingConfig::for_testing());

        assert!(client.search("y", &SearchOptions::default()).await.is_empty());
        assert!(client.search("  ", &SearchOptions::default()).await.is_empty());
        assert_eq!(primary.suggest_count(), 0);
    }

    #[tokio::test]
    async fn test_fallback_on_primary_failure() {
        let primary = Arc::new(MockProvider::new("primary", true).failing());
        let fallback = Arc::new(
            MockProvider::new("fallback", false)
                .with_suggestions(vec![suggestion("1", Some(Coordinate::yaounde()))]),
        );
        let client = client(
            vec![primary.clone(), fallback.clone()],
            &GeocodingConfig::for_testing(),
        );
        let before = client.session_token();

        let results = client.search("poste", &SearchOptions::default()).await;

        assert_eq!(results.len(), 1);
        assert_eq!(primary.suggest_count(), 1);
        assert_eq!(fallback.suggest_count(), 1);
        assert_eq!(client.session_token(), before);
    }

    #[tokio::test]
    async fn test_all_providers_failing_yields_empty() {
        let primary = Arc::new(MockProvider::new("primary", true).failing());
        let fallback = Arc::new(MockProvider::new("fallback", false).failing());
        let client = client(vec![primary, fallback], &GeocodingConfig::for_testing());

        assert!(client.search("poste", &SearchOptions::default()).await.is_empty());
    }

    #[tokio::test]
    async fn test_suggest_calls_share_session() {
        let primary = Arc::new(
            MockProvider::new("primary", true).with_suggestions(vec![suggestion("1", None)]),
        );
        let client = client(vec![primary.clone()], &GeocodingConfig::for_testing());

        client.search("yao", &SearchOptions::default()).await;
        client.search("yaou", &SearchOptions::default()).await;

        let seen = primary.seen_sessions.lock().clone();
        assert_eq!(seen.len(), 2);
        assert_eq!(seen[0], seen[1]);
        assert_eq!(seen[0], client.session_token());
    }

    #[tokio::test]
    async fn test_select_rotates_session_once() {
        let primary = Arc::new(
            MockProvider::new("primary", true).with_retrieved(Coordinate::yaounde()),
        );
        let client = client(vec![primary.clone()], &GeocodingConfig::for_testing());
        let before = client.session_token();

        let place = client.select(&suggestion("abc", None)).await.unwrap();

        assert_eq!(place.coordinate, Coordinate::yaounde());
        assert_eq!(place.label, "Place abc");
        assert_eq!(place.source, PlaceSource::Search);
        assert_eq!(primary.retrieve_count(), 1);
        assert_eq!(primary.seen_sessions.lock().as_slice(), &[before.clone()]);
        assert_ne!(client.session_token(), before);
    }

    #[tokio::test]
    async fn test_select_with_coordinate_makes_no_call() {
        let primary = Arc::new(MockProvider::new("primary", true));
        let client = client(vec![primary.clone()], &GeocodingConfig::for_testing());
        let before = client.session_token();

        let place = client
            .select(&suggestion("1", Some(Coordinate::douala())))
            .await
            .unwrap();

        assert_eq!(place.coordinate, Coordinate::douala());
        assert_eq!(primary.retrieve_count(), 0);
        assert_eq!(client.session_token(), before);
    }

    #[tokio::test]
    async fn test_select_falls_back_without_rotation() {
        let primary = Arc::new(MockProvider::new("primary", true).failing());
        let fallback = Arc::new(
            MockProvider::new("fallback", false).with_retrieved(Coordinate::douala()),
        );
        let client = client(
            vec![primary, fallback.clone()],
            &GeocodingConfig::for_testing(),
        );
        let before = client.session_token();

        let place = client.select(&suggestion("abc", None)).await.unwrap();

        assert_eq!(place.coordinate, Coordinate::douala());
        assert_eq!(fallback.retrieve_count(), 1);
        assert_eq!(client.session_token(), before);
    }

    #[tokio::test]
    async fn test_select_fails_when_unresolvable() {
        let primary = Arc::new(MockProvider::new("primary", true).failing());
        let client = client(vec![primary], &GeocodingConfig::for_testing());

        assert!(client.select(&suggestion("abc", None)).await.is_err());
    }

    #[tokio::test]
    async fn test_search_cache_hit() {
        let primary = Arc::new(
            MockProvider::new("primary", true)
                .with_suggestions(vec![suggestion("1", Some(Coordinate::yaounde()))]),
        );
        let config = GeocodingConfig {
            cache_ttl_secs: 60,
            ..GeocodingConfig::for_testing()
        };
        let client = client(vec![primary.clone()], &config);

        client.search("Mvan", &SearchOptions::default()).await;
        let cached = client.search("mvan ", &SearchOptions::default()).await;

        assert_eq!(cached.len(), 1);
        assert_eq!(primary.suggest_count(), 1);
    }

    #[tokio::test]
    async fn test_reverse_lookup_uses_best_label() {
        let primary = Arc::new(MockProvider::new("primary", true).with_address(ReverseAddress {
            road: Some("Avenue Kennedy".to_string()),
            municipality: Some("Yaoundé".to_string()),
            ..Default::default()
        }));
        let client = client(vec![primary], &GeocodingConfig::for_testing());

        let lookup = client.reverse_lookup(Coordinate::yaounde()).await;
        assert_eq!(lookup.label, "Avenue Kennedy");
        assert!(lookup.resolved);
    }

    #[tokio::test]
    async fn test_reverse_lookup_falls_back_to_generic_label() {
        let primary = Arc::new(MockProvider::new("primary", true).failing());
        let fallback = Arc::new(MockProvider::new("fallback", false));
        let client = client(
            vec![primary, fallback.clone()],
            &GeocodingConfig::for_testing(),
        );

        let lookup = client.reverse_lookup(Coordinate::douala()).await;
        assert_eq!(lookup.label, "Position actuelle");
        assert_eq!(lookup.coordinate, Coordinate::douala());
        assert!(!lookup.resolved);
        assert_eq!(fallback.reverse_count(), 1);
    }

    #[test]
    fn test_from_config_without_token_uses_nominatim_only() {
        let config = GeocodingConfig {
            mapbox: crate::config::MapboxSearchConfig::default(),
            ..GeocodingConfig::for_testing()
        };
        let client = GeocodingClient::from_config(&config).unwrap();
        assert_eq!(client.provider_names(), vec!["nominatim"]);
    }

    #[test]
    fn test_from_config_with_token() {
        let client = GeocodingClient::from_config(&GeocodingConfig::for_testing()).unwrap();
        assert_eq!(client.provider_names(), vec!["mapbox", "nominatim"]);
    }
}
