//! Geocoding service configuration

use serde::{Deserialize, Serialize};

/// Configuration for the whole geocoding chain
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingConfig {
    /// Primary, session-scoped search provider
    #[serde(default)]
    pub mapbox: MapboxSearchConfig,

    /// Stateless fallback provider
    #[serde(default)]
    pub nominatim: NominatimConfig,

    /// How long search and reverse answers stay cached, in seconds (0 disables)
    #[serde(default = "default_cache_ttl_secs")]
    pub cache_ttl_secs: u64,

    /// Label returned by reverse lookups when no provider resolves an address
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
}

/// Configuration for the Mapbox Search Box API
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapboxSearchConfig {
    /// Base URL of the Mapbox API
    #[serde(default = "default_mapbox_base_url")]
    pub base_url: String,

    /// Access token; the provider is skipped when absent
    #[serde(default)]
    pub access_token: Option<String>,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// ISO 3166 country filter (e.g. "cm")
    #[serde(default = "default_country")]
    pub country: String,

    /// Result language
    #[serde(default = "default_language")]
    pub language: String,
}

/// Configuration for the Nominatim geocoding service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimConfig {
    /// Base URL for the Nominatim API
    #[serde(default = "default_nominatim_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Minimum spacing between two requests in milliseconds
    ///
    /// The public instance allows one request per second.
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    /// Country code filter (e.g., "cm" for Cameroon)
    #[serde(default = "default_country")]
    pub country_filter: String,

    /// Result language
    #[serde(default = "default_language")]
    pub language: String,

    /// User agent sent with every request (required by the usage policy)
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_mapbox_base_url() -> String {
    "https://api.mapbox.com".to_string()
}

fn default_nominatim_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

const fn default_timeout_secs() -> u64 {
    10
}

const fn default_min_request_interval_ms() -> u64 {
    1100
}

const fn default_cache_ttl_secs() -> u64 {
    300
}

fn default_country() -> String {
    "cm".to_string()
}

fn default_language() -> String {
    "fr".to_string()
}

fn default_user_agent() -> String {
    "Farescope/0.3 (https://github.com/farescope/farescope)".to_string()
}

fn default_fallback_label() -> String {
    "Position actuelle".to_string()
}

impl Default for MapboxSearchConfig {
    fn default() -> Self {
        Self {
            base_url: default_mapbox_base_url(),
            access_token: None,
            timeout_secs: default_timeout_secs(),
            country: default_country(),
            language: default_language(),
        }
    }
}

impl Default for NominatimConfig {
    fn default() -> Self {
        Self {
            base_url: default_nominatim_base_url(),
            timeout_secs: default_timeout_secs(),
            min_request_interval_ms: default_min_request_interval_ms(),
            country_filter: default_country(),
            language: default_language(),
            user_agent: default_user_agent(),
        }
    }
}

impl Default for GeocodingConfig {
    fn default() -> Self {
        Self {
            mapbox: MapboxSearchConfig::default(),
            nominatim: NominatimConfig::default(),
            cache_ttl_secs: default_cache_ttl_secs(),
            fallback_label: default_fallback_label(),
        }
    }
}

impl NominatimConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            timeout_secs: 5,
            min_request_interval_ms: 0,
            ..Default::default()
        }
    }
}

impl GeocodingConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            mapbox: MapboxSearchConfig {
                access_token: Some("pk.test".to_string()),
                timeout_secs: 5,
                ..Default::default()
            },
            nominatim: NominatimConfig::for_testing(),
            cache_ttl_secs: 0,
            fallback_label: default_fallback_label(),
        }
    }

    /// Check if caching is enabled
    #[must_use]
    pub const fn caching_enabled(&self) -> bool {
        self.cache_ttl_secs > 0
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.nominatim.base_url.is_empty() {
            return Err("nominatim.base_url must not be empty".to_string());
        }

        if self.mapbox.access_token.is_some() && self.mapbox.base_url.is_empty() {
            return Err("mapbox.base_url must not be empty".to_string());
        }

        if self.mapbox.timeout_secs == 0 || self.nominatim.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }

        if self.fallback_label.trim().is_empty() {
            return Err("fallback_label must not be empty".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GeocodingConfig::default();
        assert_eq!(config.mapbox.base_url, "https://api.mapbox.com");
        assert!(config.mapbox.access_token.is_none());
        assert_eq!(config.mapbox.country, "cm");
        assert_eq!(config.nominatim.base_url, "https://nominatim.openstreetmap.org");
        assert_eq!(config.nominatim.min_request_interval_ms, 1100);
        assert_eq!(config.cache_ttl_secs, 300);
        assert_eq!(config.fallback_label, "Position actuelle");
    }

    #[test]
    fn test_testing_config() {
        let config = GeocodingConfig::for_testing();
        assert!(!config.caching_enabled());
        assert_eq!(config.nominatim.min_request_interval_ms, 0);
        assert!(config.mapbox.access_token.is_some());
    }

    #[test]
    fn test_validation_success() {
        assert!(GeocodingConfig::default().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let mut config = GeocodingConfig::default();
        config.nominatim.timeout_secs = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_blank_fallback_label() {
        let config = GeocodingConfig {
            fallback_label: "  ".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let json = r#"{"mapbox": {"access_token": "pk.abc"}}"#;
        let config: GeocodingConfig = serde_json::from_str(json).unwrap();
        assert_eq!(config.mapbox.access_token.as_deref(), Some("pk.abc"));
        assert_eq!(config.mapbox.language, "fr");
        assert_eq!(config.cache_ttl_secs, 300);
    }
}
