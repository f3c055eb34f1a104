//! Application-level errors

use domain::{DomainError, Locale};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ports::MapSurfaceError;

/// Errors that can occur in the application layer
#[derive(Debug, Error)]
pub enum ApplicationError {
    /// Domain-level error
    #[error(transparent)]
    Domain(#[from] DomainError),

    /// Device location failure, surfaced to the user
    #[error(transparent)]
    Geolocation(#[from] GeolocationError),

    /// Map rendering failure
    #[error(transparent)]
    MapSurface(#[from] MapSurfaceError),

    /// External service error
    #[error("External service error: {0}")]
    ExternalService(String),

    /// Requested item does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimited,

    /// Configuration error
    #[error("Configuration error: {0}")]
    Configuration(String),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl ApplicationError {
    /// Check if this error is retryable
    pub const fn is_retryable(&self) -> bool {
        match self {
            Self::RateLimited | Self::ExternalService(_) => true,
            Self::Geolocation(e) => e.is_retryable(),
            _ => false,
        }
    }
}

/// Stable numeric reason of a device location failure
///
/// Callers branch on the code, never on the message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum GeolocationErrorCode {
    /// The device has no location API
    Unsupported = 0,
    /// The user refused location access
    PermissionDenied = 1,
    /// No position could be determined
    PositionUnavailable = 2,
    /// No position arrived within the timeout
    Timeout = 3,
}

impl GeolocationErrorCode {
    /// Numeric value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }
}

impl From<GeolocationErrorCode> for u8 {
    fn from(code: GeolocationErrorCode) -> Self {
        code.as_u8()
    }
}

impl TryFrom<u8> for GeolocationErrorCode {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(Self::Unsupported),
            1 => Ok(Self::PermissionDenied),
            2 => Ok(Self::PositionUnavailable),
            3 => Ok(Self::Timeout),
            other => Err(format!("Unknown geolocation error code: {other}")),
        }
    }
}

/// Typed device location failure with a localized user-facing message
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{message} (code {})", .code.as_u8())]
pub struct GeolocationError {
    code: GeolocationErrorCode,
    message: String,
}

impl GeolocationError {
    /// Create an error with the message for `locale`
    #[must_use]
    pub fn new(code: GeolocationErrorCode, locale: Locale) -> Self {
        Self {
            code,
            message: Self::localized_message(code, locale).to_string(),
        }
    }

    /// Stable reason code
    #[must_use]
    pub const fn code(&self) -> GeolocationErrorCode {
        self.code
    }

    /// User-facing message
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Only a browser or OS settings change can resolve this error
    #[must_use]
    pub const fn requires_settings_change(&self) -> bool {
        matches!(self.code, GeolocationErrorCode::PermissionDenied)
    }

    /// Trying again may succeed
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self.code,
            GeolocationErrorCode::PositionUnavailable | GeolocationErrorCode::Timeout
        )
    }

    const fn localized_message(code: GeolocationErrorCode, locale: Locale) -> &'static str {
        match (code, locale) {
            (GeolocationErrorCode::Unsupported, Locale::Fr) => {
                "La géolocalisation n'est pas prise en charge par cet appareil."
            },
            (GeolocationErrorCode::PermissionDenied, Locale::Fr) => {
                "Accès à la position refusé. Autorisez la localisation dans les paramètres du navigateur."
            },
            (GeolocationErrorCode::PositionUnavailable, Locale::Fr) => {
                "Position indisponible. Vérifiez que le GPS est activé."
            },
            (GeolocationErrorCode::Timeout, Locale::Fr) => {
                "La recherche de votre position a pris trop de temps. Réessayez."
            },
            (GeolocationErrorCode::Unsupported, Locale::En) => {
                "Geolocation is not supported on this device."
            },
            (GeolocationErrorCode::PermissionDenied, Locale::En) => {
                "Location access denied. Allow location access in your browser settings."
            },
            (GeolocationErrorCode::PositionUnavailable, Locale::En) => {
                "Position unavailable. Make sure GPS is turned on."
            },
            (GeolocationErrorCode::Timeout, Locale::En) => {
                "Finding your position took too long. Please try again."
            },
        }
    }
}
