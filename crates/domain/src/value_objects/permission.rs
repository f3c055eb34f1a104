//! Geolocation permission state

use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of probing the device location permission
///
/// A point-in-time reading; callers probe again rather than caching it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GeolocationPermissionState {
    /// The user allowed location access
    Granted,
    /// The user refused location access; only a settings change can undo it
    Denied,
    /// Not decided yet; a position request will show a prompt
    Prompt,
    /// The device offers no location API at all
    Unsupported,
}

impl GeolocationPermissionState {
    /// Whether a position request may be issued in this state
    #[must_use]
    pub const fn allows_request(&self) -> bool {
        matches!(self, Self::Granted | Self::Prompt)
    }

    /// Parse the state names used by permission-query APIs
    #[must_use]
    pub fn from_api_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "granted" => Some(Self::Granted),
            "denied" => Some(Self::Denied),
            "prompt" => Some(Self::Prompt),
            "unsupported" => Some(Self::Unsupported),
            _ => None,
        }
    }
}

impl fmt::Display for GeolocationPermissionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Granted => "granted",
            Self::Denied => "denied",
            Self::Prompt => "prompt",
            Self::Unsupported => "unsupported",
        };
        write!(f, "{name}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_granted_and_prompt_allow_requests() {
        assert!(GeolocationPermissionState::Granted.allows_request());
        assert!(GeolocationPermissionState::Prompt.allows_request());
        assert!(!GeolocationPermissionState::Denied.allows_request());
        assert!(!GeolocationPermissionState::Unsupported.allows_request());
    }

    #[test]
    fn parses_api_names() {
        assert_eq!(
            GeolocationPermissionState::from_api_name("Denied"),
            Some(GeolocationPermissionState::Denied)
        );
        assert_eq!(GeolocationPermissionState::from_api_name("maybe"), None);
    }

    #[test]
    fn display_round_trips_through_api_name() {
        let state = GeolocationPermissionState::Prompt;
        assert_eq!(
            GeolocationPermissionState::from_api_name(&state.to_string()),
            Some(state)
        );
    }
}
