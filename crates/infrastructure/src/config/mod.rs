//! Application configuration
//!
//! Split into focused sub-modules:
//! - `providers`: Mapbox, geocoding, Nominatim, directions, weather
//! - `device`: geolocation options and the configured device position
//!
//! Sources, lowest precedence first: built-in defaults, an optional
//! `config.toml`, then `FARESCOPE_*` environment variables using `__` as
//! the section separator (`FARESCOPE_MAPBOX__ACCESS_TOKEN`).

mod device;
mod providers;

use std::path::Path;

use application::{MapConfig, SearchConfig};
use domain::Coordinate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub use device::GeolocationAppConfig;
pub use providers::{
    DirectionsAppConfig, GeocodingAppConfig, MapboxAppConfig, NominatimAppConfig,
    WeatherAppConfig,
};

use crate::telemetry::LoggingConfig;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "FARESCOPE";

/// Errors raised while loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A source could not be read or deserialized
    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    /// The merged configuration is inconsistent
    #[error("Invalid configuration: {}", .0.join("; "))]
    Invalid(Vec<String>),
}

/// Geographic point (latitude/longitude pair)
///
/// Configured as inline table: `{ latitude = 3.848, longitude = 11.5021 }`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPointConfig {
    /// Latitude (-90.0 to 90.0)
    pub latitude: f64,
    /// Longitude (-180.0 to 180.0)
    pub longitude: f64,
}

impl GeoPointConfig {
    /// Convert to a domain coordinate
    ///
    /// Returns `None` if coordinates are invalid.
    #[must_use]
    pub fn to_coordinate(&self) -> Option<Coordinate> {
        Coordinate::from_lat_lon(self.latitude, self.longitude).ok()
    }
}

/// Main application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Mapbox account
    #[serde(default)]
    pub mapbox: MapboxAppConfig,

    /// Place search
    #[serde(default)]
    pub geocoding: GeocodingAppConfig,

    /// Fallback geocoder
    #[serde(default)]
    pub nominatim: NominatimAppConfig,

    /// Routing
    #[serde(default)]
    pub directions: DirectionsAppConfig,

    /// Weather
    #[serde(default)]
    pub weather: WeatherAppConfig,

    /// Search input behavior
    #[serde(default)]
    pub search: SearchConfig,

    /// Map rendering
    #[serde(default)]
    pub map: MapConfig,

    /// Device location
    #[serde(default)]
    pub geolocation: GeolocationAppConfig,

    /// Log output
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `config.toml` (if present) and environment
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Path::new("config.toml"))
    }

    /// Load configuration from a specific file (if present) and environment
    pub fn load_from(path: &Path) -> Result<Self, ConfigError> {
        let builder = config::Config::builder()
            .add_source(config::File::from(path).required(false))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            );

        let config: Self = builder.build()?.try_deserialize()?;
        debug!(
            path = %path.display(),
            mapbox = config.mapbox.access_token_str().is_some(),
            "Configuration loaded"
        );
        Ok(config)
    }

    /// Load and reject inconsistent configurations
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = Self::load_from(path)?;
        let problems = config.validate();
        if problems.is_empty() {
            Ok(config)
        } else {
            Err(ConfigError::Invalid(problems))
        }
    }

    /// List every configuration problem; empty when valid
    ///
    /// A missing Mapbox token is reported because directions and isochrones
    /// need it, even though place search still works through the fallback.
    #[must_use]
    pub fn validate(&self) -> Vec<String> {
        let mut problems = Vec::new();

        if self.mapbox.access_token_str().is_none() {
            problems.push("mapbox.access_token is missing".to_string());
        }
        if self.mapbox.base_url.is_empty() {
            problems.push("mapbox.base_url must not be empty".to_string());
        }
        if self.nominatim.base_url.is_empty() {
            problems.push("nominatim.base_url must not be empty".to_string());
        }

        if !(1..=10).contains(&self.geocoding.limit) {
            problems.push(format!(
                "geocoding.limit must be between 1 and 10, got {}",
                self.geocoding.limit
            ));
        }
        if self
            .geocoding
            .proximity
            .is_some_and(|p| p.to_coordinate().is_none())
        {
            problems.push("geocoding.proximity is not a valid coordinate".to_string());
        }
        if self
            .geolocation
            .device_position
            .is_some_and(|p| p.to_coordinate().is_none())
        {
            problems.push("geolocation.device_position is not a valid coordinate".to_string());
        }

        for (name, value) in [
            ("geocoding.timeout_secs", self.geocoding.timeout_secs),
            ("directions.timeout_secs", self.directions.timeout_secs),
            ("weather.timeout_secs", self.weather.timeout_secs),
            ("geolocation.timeout_secs", self.geolocation.service.timeout_secs),
            ("map.animation_frame_ms", self.map.animation_frame_ms),
        ] {
            if value == 0 {
                problems.push(format!("{name} must be greater than 0"));
            }
        }

        if self.search.min_query_chars == 0 {
            problems.push("search.min_query_chars must be greater than 0".to_string());
        }

        problems
    }

    /// Configuration of the geocoding chain
    #[must_use]
    pub fn to_geocoding_config(&self) -> integration_geocoding::GeocodingConfig {
        let mut config = integration_geocoding::GeocodingConfig {
            cache_ttl_secs: self.geocoding.cache_ttl_secs,
            fallback_label: self.geocoding.fallback_label.clone(),
            ..Default::default()
        };

        config.mapbox.base_url.clone_from(&self.mapbox.base_url);
        config.mapbox.access_token = self.mapbox.access_token_str().map(str::to_string);
        config.mapbox.timeout_secs = self.geocoding.timeout_secs;
        config.mapbox.country.clone_from(&self.geocoding.country);
        config.mapbox.language.clone_from(&self.geocoding.language);

        config.nominatim.base_url.clone_from(&self.nominatim.base_url);
        config.nominatim.timeout_secs = self.geocoding.timeout_secs;
        config.nominatim.min_request_interval_ms = self.nominatim.min_request_interval_ms;
        config.nominatim.country_filter.clone_from(&self.geocoding.country);
        config.nominatim.language.clone_from(&self.geocoding.language);
        if let Some(agent) = &self.nominatim.user_agent {
            config.nominatim.user_agent.clone_from(agent);
        }

        config
    }

    /// Configuration of the directions and isochrone clients
    #[must_use]
    pub fn to_directions_config(&self) -> integration_directions::DirectionsConfig {
        integration_directions::DirectionsConfig {
            base_url: self.mapbox.base_url.clone(),
            access_token: self.mapbox.access_token_str().map(str::to_string),
            profile: self.directions.profile.clone(),
            isochrone_profile: self.directions.isochrone_profile.clone(),
            timeout_secs: self.directions.timeout_secs,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::SecretString;

    fn with_token() -> AppConfig {
        AppConfig {
            mapbox: MapboxAppConfig {
                access_token: Some(SecretString::from("pk.live-token")),
                ..Default::default()
            },
            ..Default::default()
        }
    }

    #[test]
    fn app_config_default() {
        let config = AppConfig::default();
        assert_eq!(config.geocoding.country, "cm");
        assert_eq!(config.geocoding.limit, 5);
        assert_eq!(config.directions.profile, "driving-traffic");
        assert_eq!(config.search.debounce_ms, 300);
        assert_eq!(config.geolocation.service.timeout_secs, 15);
        assert!(config.mapbox.access_token.is_none());
    }

    #[test]
    fn default_config_misses_only_the_token() {
        let problems = AppConfig::default().validate();
        assert_eq!(problems, vec!["mapbox.access_token is missing".to_string()]);
        assert!(with_token().validate().is_empty());
    }

    #[test]
    fn validate_collects_every_problem() {
        let mut config = with_token();
        config.geocoding.limit = 0;
        config.directions.timeout_secs = 0;
        config.geolocation.device_position = Some(GeoPointConfig {
            latitude: 95.0,
            longitude: 11.5,
        });

        let problems = config.validate();
        assert_eq!(problems.len(), 3);
        assert!(problems.iter().any(|p| p.contains("geocoding.limit")));
        assert!(problems.iter().any(|p| p.contains("directions.timeout_secs")));
        assert!(problems.iter().any(|p| p.contains("device_position")));
    }

    #[test]
    fn token_is_redacted_in_debug_and_skipped_in_json() {
        let config = with_token();
        let debug = format!("{:?}", config.mapbox);
        assert!(debug.contains("[REDACTED]"));
        assert!(!debug.contains("pk.live-token"));

        let json = serde_json::to_string(&config).unwrap();
        assert!(!json.contains("pk.live-token"));
    }

    #[test]
    fn blank_token_counts_as_missing() {
        let config = MapboxAppConfig {
            access_token: Some(SecretString::from("  ")),
            ..Default::default()
        };
        assert!(config.access_token_str().is_none());
    }

    #[test]
    fn geocoding_config_shares_token_and_locale() {
        let mut config = with_token();
        config.geocoding.language = "en".to_string();
        config.nominatim.user_agent = Some("farescope-test".to_string());

        let geocoding = config.to_geocoding_config();
        assert_eq!(geocoding.mapbox.access_token.as_deref(), Some("pk.live-token"));
        assert_eq!(geocoding.mapbox.language, "en");
        assert_eq!(geocoding.nominatim.language, "en");
        assert_eq!(geocoding.nominatim.user_agent, "farescope-test");
        assert!(geocoding.validate().is_ok());
    }

    #[test]
    fn directions_config_uses_mapbox_section() {
        let directions = with_token().to_directions_config();
        assert_eq!(directions.access_token.as_deref(), Some("pk.live-token"));
        assert_eq!(directions.base_url, "https://api.mapbox.com");
        assert!(directions.validate().is_ok());
    }

    #[test]
    fn geo_point_conversion() {
        let point = GeoPointConfig {
            latitude: 3.848,
            longitude: 11.5021,
        };
        assert_eq!(point.to_coordinate(), Some(Coordinate::yaounde()));
    }

    #[test]
    fn load_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("farescope.toml");
        std::fs::write(
            &path,
            r#"
[mapbox]
access_token = "pk.from-file"

[geocoding]
country = "ga"
limit = 8

[geolocation]
timeout_secs = 10
locale = "en"
device_position = { latitude = 4.0511, longitude = 9.7679 }
permission = "granted"

[map]
fit_padding = 40.0
"#,
        )
        .unwrap();

        let config = AppConfig::load_validated(&path).unwrap();
        assert_eq!(config.mapbox.access_token_str(), Some("pk.from-file"));
        assert_eq!(config.geocoding.country, "ga");
        assert_eq!(config.geocoding.limit, 8);
        assert_eq!(config.geolocation.service.timeout_secs, 10);
        assert_eq!(config.geolocation.service.locale, domain::Locale::En);
        assert_eq!(
            config.geolocation.permission,
            Some(domain::GeolocationPermissionState::Granted)
        );
        assert!((config.map.fit_padding - 40.0).abs() < f64::EPSILON);
        assert!((config.map.max_fit_zoom - 15.0).abs() < f64::EPSILON);
    }

    #[test]
    fn load_rejects_invalid_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("farescope.toml");
        std::fs::write(&path, "[geocoding]\nlimit = 40\n").unwrap();

        let err = AppConfig::load_validated(&path).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(ref p) if p.len() == 2));
        assert!(err.to_string().contains("geocoding.limit"));
    }
}
