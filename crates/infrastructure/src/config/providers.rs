//! Provider configurations: Mapbox, geocoding, Nominatim, directions, weather.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use super::GeoPointConfig;

// ==============================
// Mapbox Configuration
// ==============================

/// Mapbox account settings shared by search, directions and isochrones
#[derive(Clone, Serialize, Deserialize)]
pub struct MapboxAppConfig {
    /// Public access token (sensitive - uses SecretString)
    #[serde(default, skip_serializing)]
    pub access_token: Option<SecretString>,

    /// Base URL of the Mapbox API
    #[serde(default = "default_mapbox_base_url")]
    pub base_url: String,
}

impl std::fmt::Debug for MapboxAppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxAppConfig")
            .field("access_token", &self.access_token.as_ref().map(|_| "[REDACTED]"))
            .field("base_url", &self.base_url)
            .finish()
    }
}

fn default_mapbox_base_url() -> String {
    "https://api.mapbox.com".to_string()
}

impl Default for MapboxAppConfig {
    fn default() -> Self {
        Self {
            access_token: None,
            base_url: default_mapbox_base_url(),
        }
    }
}

impl MapboxAppConfig {
    /// Get the access token as a string reference (for API calls)
    #[must_use]
    pub fn access_token_str(&self) -> Option<&str> {
        self.access_token
            .as_ref()
            .map(ExposeSecret::expose_secret)
            .filter(|token| !token.trim().is_empty())
    }
}

// ==============================
// Geocoding Configuration
// ==============================

/// Place search settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeocodingAppConfig {
    /// ISO 3166 country filter
    #[serde(default = "default_country")]
    pub country: String,

    /// Result language
    #[serde(default = "default_language")]
    pub language: String,

    /// Suggestions per search (1-10)
    #[serde(default = "default_limit")]
    pub limit: u8,

    /// Search and reverse cache window in seconds (0 disables)
    #[serde(default = "default_geocoding_cache_ttl")]
    pub cache_ttl_secs: u64,

    /// Request timeout in seconds
    #[serde(default = "default_geocoding_timeout")]
    pub timeout_secs: u64,

    /// Bias searches toward this point when the caller gives none
    #[serde(default)]
    pub proximity: Option<GeoPointConfig>,

    /// Label of reverse lookups nobody could resolve
    #[serde(default = "default_fallback_label")]
    pub fallback_label: String,
}

fn default_country() -> String {
    "cm".to_string()
}

fn default_language() -> String {
    "fr".to_string()
}

const fn default_limit() -> u8 {
    5
}

const fn default_geocoding_cache_ttl() -> u64 {
    300
}

const fn default_geocoding_timeout() -> u64 {
    10
}

fn default_fallback_label() -> String {
    "Position actuelle".to_string()
}

impl Default for GeocodingAppConfig {
    fn default() -> Self {
        Self {
            country: default_country(),
            language: default_language(),
            limit: default_limit(),
            cache_ttl_secs: default_geocoding_cache_ttl(),
            timeout_secs: default_geocoding_timeout(),
            proximity: None,
            fallback_label: default_fallback_label(),
        }
    }
}

/// Fallback geocoder settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NominatimAppConfig {
    /// Base URL of the Nominatim instance
    #[serde(default = "default_nominatim_base_url")]
    pub base_url: String,

    /// Minimum spacing between requests in milliseconds
    #[serde(default = "default_min_request_interval_ms")]
    pub min_request_interval_ms: u64,

    /// User agent required by the usage policy
    #[serde(default)]
    pub user_agent: Option<String>,
}

fn default_nominatim_base_url() -> String {
    "https://nominatim.openstreetmap.org".to_string()
}

const fn default_min_request_interval_ms() -> u64 {
    1100
}

impl Default for NominatimAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_nominatim_base_url(),
            min_request_interval_ms: default_min_request_interval_ms(),
            user_agent: None,
        }
    }
}

// ==============================
// Directions Configuration
// ==============================

/// Routing settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionsAppConfig {
    /// Traffic-aware routing profile
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Isochrone profile
    #[serde(default = "default_isochrone_profile")]
    pub isochrone_profile: String,

    /// Request timeout in seconds
    #[serde(default = "default_directions_timeout")]
    pub timeout_secs: u64,
}

fn default_profile() -> String {
    "driving-traffic".to_string()
}

fn default_isochrone_profile() -> String {
    "driving".to_string()
}

const fn default_directions_timeout() -> u64 {
    15
}

impl Default for DirectionsAppConfig {
    fn default() -> Self {
        Self {
            profile: default_profile(),
            isochrone_profile: default_isochrone_profile(),
            timeout_secs: default_directions_timeout(),
        }
    }
}

// ==============================
// Weather Configuration
// ==============================

/// Weather service settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WeatherAppConfig {
    /// Open-Meteo API base URL
    #[serde(default = "default_weather_base_url")]
    pub base_url: String,

    /// Request timeout in seconds
    #[serde(default = "default_weather_timeout")]
    pub timeout_secs: u64,

    /// Cache TTL in minutes
    #[serde(default = "default_weather_cache_ttl")]
    pub cache_ttl_minutes: u32,
}

fn default_weather_base_url() -> String {
    "https://api.open-meteo.com/v1".to_string()
}

const fn default_weather_timeout() -> u64 {
    10
}

const fn default_weather_cache_ttl() -> u32 {
    15
}

impl Default for WeatherAppConfig {
    fn default() -> Self {
        Self {
            base_url: default_weather_base_url(),
            timeout_secs: default_weather_timeout(),
            cache_ttl_minutes: default_weather_cache_ttl(),
        }
    }
}

impl WeatherAppConfig {
    /// Convert to the weather client configuration
    #[must_use]
    pub fn to_weather_config(&self) -> integration_weather::WeatherConfig {
        integration_weather::WeatherConfig {
            base_url: self.base_url.clone(),
            timeout_secs: self.timeout_secs,
            cache_ttl_minutes: self.cache_ttl_minutes,
        }
    }
}
