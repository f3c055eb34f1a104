//! Open-Meteo client
//!
//! Current conditions only, cached per rounded position.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, NaiveDateTime, Utc};
use domain::{Coordinate, WeatherSeverity};
use moka::future::Cache;
use reqwest::Client;
use tracing::{debug, instrument, warn};

use crate::config::WeatherConfig;
use crate::error::WeatherError;
use crate::models::{ApiResponse, CurrentConditions, WeatherCondition, WeatherData};

/// Rounds positions to two decimals, roughly one kilometer
const CACHE_KEY_SCALE: f64 = 100.0;
const CACHE_CAPACITY: u64 = 500;
const CURRENT_FIELDS: &str = "temperature_2m,weather_code,precipitation";

type CacheKey = (i64, i64);

/// Source of current weather conditions
#[async_trait]
pub trait WeatherClient: Send + Sync {
    /// Current conditions at a position
    async fn get_current(&self, coordinate: Coordinate) -> Result<CurrentConditions, WeatherError>;

    /// Current severity; clear when the provider fails
    async fn severity(&self, coordinate: Coordinate) -> WeatherSeverity {
        match self.get_current(coordinate).await {
            Ok(conditions) => conditions.severity,
            Err(e) => {
                warn!(error = %e, "Weather lookup failed, assuming clear weather");
                WeatherSeverity::Clear
            },
        }
    }

    /// Whether the provider answers at all
    async fn is_healthy(&self) -> bool;
}

/// [`WeatherClient`] over the Open-Meteo forecast endpoint
#[derive(Debug)]
pub struct OpenMeteoClient {
    http: Client,
    forecast_url: String,
    cache: Option<Cache<CacheKey, CurrentConditions>>,
}

impl OpenMeteoClient {
    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn new(config: WeatherConfig) -> Result<Self, WeatherError> {
        let http = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| WeatherError::ConnectionFailed(e.to_string()))?;

        let cache = config.caching_enabled().then(|| {
            Cache::builder()
                .max_capacity(CACHE_CAPACITY)
                .time_to_live(config.cache_ttl())
                .build()
        });

        Ok(Self {
            http,
            forecast_url: config.forecast_url(),
            cache,
        })
    }

    /// # Errors
    ///
    /// Returns an error if the HTTP client cannot be built.
    pub fn with_defaults() -> Result<Self, WeatherError> {
        Self::new(WeatherConfig::default())
    }

    fn query(coordinate: Coordinate) -> [(&'static str, String); 4] {
        [
            ("latitude", coordinate.latitude().to_string()),
            ("longitude", coordinate.longitude().to_string()),
            ("current", CURRENT_FIELDS.to_string()),
            ("timezone", "UTC".to_string()),
        ]
    }

    fn cache_key(coordinate: Coordinate) -> CacheKey {
        (
            (coordinate.latitude() * CACHE_KEY_SCALE).round() as i64,
            (coordinate.longitude() * CACHE_KEY_SCALE).round() as i64,
        )
    }

    fn to_conditions(
        coordinate: Coordinate,
        data: &WeatherData,
    ) -> Result<CurrentConditions, WeatherError> {
        let condition = WeatherCondition::from_wmo_code(data.weather_code);
        Ok(CurrentConditions {
            coordinate,
            time: parse_time(&data.time)?,
            temperature: data.temperature_2m,
            precipitation: data.precipitation,
            weather_code: data.weather_code,
            condition,
            severity: condition.severity(),
        })
    }

    async fn fetch(&self, coordinate: Coordinate) -> Result<CurrentConditions, WeatherError> {
        debug!(url = %self.forecast_url, "Fetching current weather");
        let response = self
            .http
            .get(&self.forecast_url)
            .query(&Self::query(coordinate))
            .send()
            .await
            .map_err(|e| WeatherError::from_transport(&e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(WeatherError::from_status(status));
        }

        let body: ApiResponse = response
            .json()
            .await
            .map_err(|e| WeatherError::ParseError(e.to_string()))?;
        let current = body
            .current
            .ok_or_else(|| WeatherError::ParseError("response has no current block".to_string()))?;

        Self::to_conditions(coordinate, &current)
    }
}

/// Open-Meteo reports local minutes (`2026-02-05T14:00`); seconds and
/// offsets are accepted too
fn parse_time(s: &str) -> Result<DateTime<Utc>, WeatherError> {
    ["%Y-%m-%dT%H:%M", "%Y-%m-%dT%H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .map(|naive| naive.and_utc())
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
        .ok_or_else(|| WeatherError::ParseError(format!("invalid time \"{s}\"")))
}

#[async_trait]
impl WeatherClient for OpenMeteoClient {
    #[instrument(skip(self), fields(position = %coordinate))]
    async fn get_current(&self, coordinate: Coordinate) -> Result<CurrentConditions, WeatherError> {
        let Some(cache) = &self.cache else {
            return self.fetch(coordinate).await;
        };

        let key = Self::cache_key(coordinate);
        if let Some(hit) = cache.get(&key).await {
            debug!("Weather cache hit");
            return Ok(hit);
        }
        let conditions = self.fetch(coordinate).await?;
        cache.insert(key, conditions.clone()).await;
        Ok(conditions)
    }

    async fn is_healthy(&self) -> bool {
        self.fetch(Coordinate::yaounde()).await.is_ok()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn query_is_lat_lon() {
        let query = OpenMeteoClient::query(Coordinate::yaounde());
        assert_eq!(query[0], ("latitude", "3.848".to_string()));
        assert_eq!(query[1], ("longitude", "11.5021".to_string()));
        assert!(query[2].1.contains("weather_code"));
    }

    #[test]
    fn nearby_positions_share_cache_entry() {
        let a = Coordinate::new(11.5021, 3.8480).unwrap();
        let b = Coordinate::new(11.5031, 3.8470).unwrap();
        assert_eq!(OpenMeteoClient::cache_key(a), OpenMeteoClient::cache_key(b));
        assert_ne!(
            OpenMeteoClient::cache_key(a),
            OpenMeteoClient::cache_key(Coordinate::douala())
        );
    }

    #[test]
    fn time_formats() {
        let dt = parse_time("2026-02-05T14:00").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "2026-02-05 14:00");
        assert!(parse_time("2026-02-05T14:00:30").is_ok());
        assert!(parse_time("2026-02-05T14:00:30+01:00").is_ok());
        assert!(parse_time("yesterday").is_err());
    }

    #[test]
    fn conditions_carry_severity() {
        let data = WeatherData {
            time: "2026-02-05T14:00".to_string(),
            temperature_2m: 27.5,
            weather_code: 63,
            precipitation: 4.2,
        };
        let conditions = OpenMeteoClient::to_conditions(Coordinate::yaounde(), &data).unwrap();
        assert_eq!(conditions.condition, WeatherCondition::Rain);
        assert_eq!(conditions.severity, WeatherSeverity::HeavyRain);
        assert!(conditions.summary().contains("Rain"));
    }
}
