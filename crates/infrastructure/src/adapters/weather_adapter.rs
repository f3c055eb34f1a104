//! Weather adapter - Implements WeatherPort using integration_weather

use application::{ApplicationError, WeatherPort};
use async_trait::async_trait;
use domain::{Coordinate, WeatherSeverity};
use integration_weather::{
    CurrentConditions, OpenMeteoClient, WeatherClient, WeatherConfig, WeatherError,
};
use tracing::{debug, instrument, warn};

use super::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError};

/// Adapter for weather services using the Open-Meteo API
pub struct WeatherAdapter {
    client: Box<dyn WeatherClient>,
    circuit_breaker: Option<CircuitBreaker>,
}

impl std::fmt::Debug for WeatherAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("WeatherAdapter")
            .field(
                "circuit_breaker",
                &self.circuit_breaker.as_ref().map(CircuitBreaker::name),
            )
            .finish_non_exhaustive()
    }
}

impl WeatherAdapter {
    /// Create an adapter over Open-Meteo
    pub fn new(config: WeatherConfig) -> Result<Self, ApplicationError> {
        let client =
            OpenMeteoClient::new(config).map_err(|e| ApplicationError::Internal(e.to_string()))?;
        Ok(Self::with_client(Box::new(client)))
    }

    /// Create an adapter over any weather client
    #[must_use]
    pub fn with_client(client: Box<dyn WeatherClient>) -> Self {
        Self {
            client,
            circuit_breaker: None,
        }
    }

    /// Fail fast after repeated provider failures
    #[must_use]
    pub fn with_circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = Some(CircuitBreaker::with_config("weather", config));
        self
    }

    /// Map integration weather error to application error
    fn map_error(err: WeatherError) -> ApplicationError {
        match err {
            WeatherError::ConnectionFailed(e)
            | WeatherError::RequestFailed(e)
            | WeatherError::ServiceUnavailable(e) => ApplicationError::ExternalService(e),
            WeatherError::ParseError(e) => ApplicationError::Internal(e),
            WeatherError::RateLimitExceeded => ApplicationError::RateLimited,
            WeatherError::Timeout => {
                ApplicationError::ExternalService("Weather request timed out".into())
            },
        }
    }

    /// Current conditions at a position
    #[instrument(skip(self), fields(lat = coordinate.latitude(), lon = coordinate.longitude()))]
    pub async fn current(
        &self,
        coordinate: Coordinate,
    ) -> Result<CurrentConditions, ApplicationError> {
        let result = match &self.circuit_breaker {
            Some(cb) => cb
                .call(|| self.client.get_current(coordinate))
                .await
                .map_err(|e| match e {
                    CircuitBreakerError::Open(name) => {
                        ApplicationError::ExternalService(format!("{name} circuit breaker is open"))
                    },
                    CircuitBreakerError::Service(e) => Self::map_error(e),
                }),
            None => self
                .client
                .get_current(coordinate)
                .await
                .map_err(Self::map_error),
        };

        match &result {
            Ok(current) => debug!(
                code = current.weather_code,
                severity = %current.severity,
                "Retrieved current weather"
            ),
            Err(e) => debug!(error = %e, "Failed to get current weather"),
        }
        result
    }
}

#[async_trait]
impl WeatherPort for WeatherAdapter {
    async fn severity(&self, coordinate: Coordinate) -> WeatherSeverity {
        match self.current(coordinate).await {
            Ok(current) => current.severity,
            Err(e) => {
                warn!(error = %e, "Weather unavailable, assuming clear weather");
                WeatherSeverity::Clear
            },
        }
    }

    #[instrument(skip(self))]
    async fn is_available(&self) -> bool {
        if self.circuit_breaker.as_ref().is_some_and(CircuitBreaker::is_open) {
            return false;
        }
        self.client.is_healthy().await
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use chrono::Utc;
    use integration_weather::WeatherCondition;

    use super::*;

    struct ScriptedClient {
        code: Option<u8>,
        calls: Arc<AtomicUsize>,
    }

    #[async_trait]
    impl WeatherClient for ScriptedClient {
        async fn get_current(
            &self,
            coordinate: Coordinate,
        ) -> Result<CurrentConditions, WeatherError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let code = self
                .code
                .ok_or_else(|| WeatherError::ServiceUnavailable("HTTP 503".into()))?;
            let condition = WeatherCondition::from_wmo_code(code);
            Ok(CurrentConditions {
                coordinate,
                time: Utc::now(),
                temperature: 27.0,
                precipitation: 4.0,
                weather_code: code,
                condition,
                severity: condition.severity(),
            })
        }

        async fn is_healthy(&self) -> bool {
            self.code.is_some()
        }
    }

    fn adapter(code: Option<u8>) -> (WeatherAdapter, Arc<AtomicUsize>) {
        let calls = Arc::new(AtomicUsize::new(0));
        let client = ScriptedClient {
            code,
            calls: Arc::clone(&calls),
        };
        (WeatherAdapter::with_client(Box::new(client)), calls)
    }

    #[tokio::test]
    async fn severity_from_conditions() {
        let (adapter, _) = adapter(Some(95));
        assert_eq!(
            adapter.severity(Coordinate::douala()).await,
            WeatherSeverity::Storm
        );
        assert!(adapter.is_available().await);
    }

    #[tokio::test]
    async fn failure_reads_as_clear() {
        let (adapter, _) = adapter(None);
        assert_eq!(
            adapter.severity(Coordinate::douala()).await,
            WeatherSeverity::Clear
        );
        assert!(matches!(
            adapter.current(Coordinate::douala()).await,
            Err(ApplicationError::ExternalService(_))
        ));
    }

    #[tokio::test]
    async fn open_breaker_skips_provider() {
        let (adapter, calls) = adapter(None);
        let adapter = adapter.with_circuit_breaker(CircuitBreakerConfig {
            failure_threshold: 2,
            success_threshold: 1,
            open_secs: 60,
        });

        for _ in 0..4 {
            let _ = adapter.severity(Coordinate::yaounde()).await;
        }
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        assert!(!adapter.is_available().await);
    }

    #[test]
    fn rate_limit_maps_to_rate_limited() {
        assert!(matches!(
            WeatherAdapter::map_error(WeatherError::RateLimitExceeded),
            ApplicationError::RateLimited
        ));
    }
}
