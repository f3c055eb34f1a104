//! Directions service configuration

use serde::{Deserialize, Serialize};

/// Configuration for the directions and isochrone clients
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirectionsConfig {
    /// Base URL of the Mapbox API
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Access token
    #[serde(default)]
    pub access_token: Option<String>,

    /// Routing profile for directions (e.g. "driving-traffic")
    #[serde(default = "default_profile")]
    pub profile: String,

    /// Routing profile for isochrones (traffic-aware profiles are not offered)
    #[serde(default = "default_isochrone_profile")]
    pub isochrone_profile: String,

    /// Request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_base_url() -> String {
    "https://api.mapbox.com".to_string()
}

fn default_profile() -> String {
    "driving-traffic".to_string()
}

fn default_isochrone_profile() -> String {
    "driving".to_string()
}

const fn default_timeout_secs() -> u64 {
    15
}

impl Default for DirectionsConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            access_token: None,
            profile: default_profile(),
            isochrone_profile: default_isochrone_profile(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl DirectionsConfig {
    /// Create a configuration suitable for testing
    #[must_use]
    pub fn for_testing() -> Self {
        Self {
            access_token: Some("pk.test".to_string()),
            timeout_secs: 5,
            ..Default::default()
        }
    }

    /// Validate the configuration
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<(), String> {
        if self.base_url.is_empty() {
            return Err("base_url must not be empty".to_string());
        }
        if self.profile.is_empty() || self.isochrone_profile.is_empty() {
            return Err("profile must not be empty".to_string());
        }
        if self.timeout_secs == 0 {
            return Err("timeout_secs must be greater than 0".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = DirectionsConfig::default();
        assert_eq!(config.profile, "driving-traffic");
        assert_eq!(config.isochrone_profile, "driving");
        assert_eq!(config.timeout_secs, 15);
        assert!(config.access_token.is_none());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_zero_timeout() {
        let config = DirectionsConfig {
            timeout_secs: 0,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_deserialize_partial() {
        let config: DirectionsConfig =
            serde_json::from_str(r#"{"access_token": "pk.abc", "profile": "driving"}"#).unwrap();
        assert_eq!(config.profile, "driving");
        assert_eq!(config.base_url, "https://api.mapbox.com");
    }
}
