//! Geocoding provider trait

use async_trait::async_trait;
use domain::{Coordinate, PlaceSuggestion, SessionToken};

use crate::{GeocodingError, ReverseAddress, SearchOptions};

/// Trait for geocoding backends
///
/// Implemented by the session-scoped primary backend and the stateless
/// fallback. Stateless backends ignore the session token.
#[async_trait]
pub trait GeocodingProvider: Send + Sync {
    /// Search places matching free text
    async fn suggest(
        &self,
        query: &str,
        options: &SearchOptions,
        session: &SessionToken,
    ) -> Result<Vec<PlaceSuggestion>, GeocodingError>;

    /// Resolve a suggestion to its coordinate
    async fn retrieve(
        &self,
        suggestion: &PlaceSuggestion,
        session: &SessionToken,
    ) -> Result<Coordinate, GeocodingError>;

    /// Resolve a coordinate to address components
    async fn reverse(&self, coordinate: Coordinate) -> Result<ReverseAddress, GeocodingError>;

    /// Whether calls are billed per session token
    fn is_session_scoped(&self) -> bool;

    /// Check if the provider is reachable
    async fn is_healthy(&self) -> bool;

    /// Get the provider name (e.g., "mapbox", "nominatim")
    fn provider_name(&self) -> &'static str;
}

#[cfg(test)]
pub mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted provider recording the calls it receives
    pub struct MockProvider {
        pub name: &'static str,
        pub session_scoped: bool,
        pub suggestions: Vec<PlaceSuggestion>,
        pub retrieved: Option<Coordinate>,
        pub address: ReverseAddress,
        pub should_fail: bool,
        pub suggest_calls: AtomicUsize,
        pub retrieve_calls: AtomicUsize,
        pub reverse_calls: AtomicUsize,
        pub seen_sessions: Mutex<Vec<SessionToken>>,
    }

    impl MockProvider {
        #[must_use]
        pub fn new(name: &'static str, session_scoped: bool) -> Self {
            Self {
                name,
                session_scoped,
                suggestions: vec![],
                retrieved: None,
                address: ReverseAddress::default(),
                should_fail: false,
                suggest_calls: AtomicUsize::new(0),
                retrieve_calls: AtomicUsize::new(0),
                reverse_calls: AtomicUsize::new(0),
                seen_sessions: Mutex::new(vec![]),
            }
        }

        #[must_use]
        pub fn with_suggestions(mut self, suggestions: Vec<PlaceSuggestion>) -> Self {
            self.suggestions = suggestions;
            self
        }

        #[must_use]
        pub const fn with_retrieved(mut self, coordinate: Coordinate) -> Self {
            self.retrieved = Some(coordinate);
            self
        }

        #[must_use]
        pub fn with_address(mut self, address: ReverseAddress) -> Self {
            self.address = address;
            self
        }

        #[must_use]
        pub const fn failing(mut self) -> Self {
            self.should_fail = true;
            self
        }

        pub fn suggest_count(&self) -> usize {
            self.suggest_calls.load(Ordering::SeqCst)
        }

        pub fn retrieve_count(&self) -> usize {
            self.retrieve_calls.load(Ordering::SeqCst)
        }

        pub fn reverse_count(&self) -> usize {
            self.reverse_calls.load(Ordering::SeqCst)
        }

        fn unavailable() -> GeocodingError {
            GeocodingError::ServiceUnavailable("Mock service unavailable".to_string())
        }
    }

    #[async_trait]
    impl GeocodingProvider for MockProvider {
        async fn suggest(
            &self,
            _query: &str,
            options: &SearchOptions,
            session: &SessionToken,
        ) -> Result<Vec<PlaceSuggestion>, GeocodingError> {
            self.suggest_calls.fetch_add(1, Ordering::SeqCst);
            self.seen_sessions.lock().push(session.clone());
            if self.should_fail {
                return Err(Self::unavailable());
            }
            Ok(self
                .suggestions
                .iter()
                .take(usize::from(options.effective_limit()))
                .cloned()
                .collect())
        }

        async fn retrieve(
            &self,
            suggestion: &PlaceSuggestion,
            session: &SessionToken,
        ) -> Result<Coordinate, GeocodingError> {
            self.retrieve_calls.fetch_add(1, Ordering::SeqCst);
            self.seen_sessions.lock().push(session.clone());
            if self.should_fail {
                return Err(Self::unavailable());
            }
            suggestion
                .coordinate
                .or(self.retrieved)
                .ok_or_else(|| GeocodingError::AddressNotFound(suggestion.id.clone()))
        }

        async fn reverse(&self, _coordinate: Coordinate) -> Result<ReverseAddress, GeocodingError> {
            self.reverse_calls.fetch_add(1, Ordering::SeqCst);
            if self.should_fail {
                return Err(Self::unavailable());
            }
            Ok(self.address.clone())
        }

        fn is_session_scoped(&self) -> bool {
            self.session_scoped
        }

        async fn is_healthy(&self) -> bool {
            !self.should_fail
        }

        fn provider_name(&self) -> &'static str {
            self.name
        }
    }

    #[tokio::test]
    async fn test_mock_provider_counts_calls() {
        let provider = MockProvider::new("mock", false);
        let session = SessionToken::generate();
        provider
            .suggest("mvan", &SearchOptions::default(), &session)
            .await
            .unwrap();
        provider.reverse(Coordinate::yaounde()).await.unwrap();

        assert_eq!(provider.suggest_count(), 1);
        assert_eq!(provider.reverse_count(), 1);
        assert_eq!(provider.seen_sessions.lock().as_slice(), &[session]);
    }

    #[tokio::test]
    async fn test_mock_provider_fails_when_configured() {
        let provider = MockProvider::new("mock", false).failing();
        let result = provider
            .suggest("mvan", &SearchOptions::default(), &SessionToken::generate())
            .await;
        assert!(result.is_err());
        assert!(!provider.is_healthy().await);
    }
}
