//! Geocoding error types

use thiserror::Error;

/// Errors that can occur during geocoding
#[derive(Debug, Error)]
pub enum GeocodingError {
    /// Connection to geocoding service failed
    #[error("Geocoding connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to geocoding service failed
    #[error("Geocoding request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse geocoding response
    #[error("Geocoding parse error: {0}")]
    ParseError(String),

    /// Address could not be resolved to coordinates
    #[error("Address not found: {0}")]
    AddressNotFound(String),

    /// Rate limit exceeded
    #[error("Geocoding rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimitExceeded {
        /// Seconds to wait before retrying (if provided by API)
        retry_after_secs: Option<u64>,
    },

    /// Access token rejected
    #[error("Geocoding authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Service is temporarily unavailable
    #[error("Geocoding service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Configuration error
    #[error("Geocoding configuration error: {0}")]
    ConfigurationError(String),

    /// Request timeout
    #[error("Geocoding request timed out")]
    Timeout,
}

impl GeocodingError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::RequestFailed(_)
                | Self::ServiceUnavailable(_)
                | Self::Timeout
                | Self::RateLimitExceeded { .. }
        )
    }

    /// Map a transport error the way every provider client does
    pub(crate) fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionFailed(e.to_string())
        } else {
            Self::RequestFailed(e.to_string())
        }
    }

    /// Map a non-success HTTP status
    pub(crate) fn from_status(
        status: reqwest::StatusCode,
        retry_after_secs: Option<u64>,
    ) -> Self {
        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            Self::RateLimitExceeded { retry_after_secs }
        } else if status == reqwest::StatusCode::UNAUTHORIZED
            || status == reqwest::StatusCode::FORBIDDEN
        {
            Self::AuthenticationFailed(format!("HTTP {status}"))
        } else if status.is_server_error() {
            Self::ServiceUnavailable(format!("HTTP {status}"))
        } else {
            Self::RequestFailed(format!("HTTP {status}"))
        }
    }
}

/// Read a `Retry-After` header given in seconds
pub(crate) fn retry_after_secs(response: &reqwest::Response) -> Option<u64> {
    response
        .headers()
        .get(reqwest::header::RETRY_AFTER)
        .and_then(|h| h.to_str().ok())
        .and_then(|s| s.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_retryable_errors() {
        assert!(GeocodingError::ConnectionFailed("x".to_string()).is_retryable());
        assert!(GeocodingError::ServiceUnavailable("x".to_string()).is_retryable());
        assert!(GeocodingError::Timeout.is_retryable());
        assert!(
            GeocodingError::RateLimitExceeded {
                retry_after_secs: None
            }
            .is_retryable()
        );
    }

    #[test]
    fn test_non_retryable_errors() {
        assert!(!GeocodingError::ParseError("x".to_string()).is_retryable());
        assert!(!GeocodingError::AddressNotFound("x".to_string()).is_retryable());
        assert!(!GeocodingError::AuthenticationFailed("x".to_string()).is_retryable());
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(
            GeocodingError::from_status(reqwest::StatusCode::TOO_MANY_REQUESTS, Some(30)),
            GeocodingError::RateLimitExceeded {
                retry_after_secs: Some(30)
            }
        ));
        assert!(matches!(
            GeocodingError::from_status(reqwest::StatusCode::UNAUTHORIZED, None),
            GeocodingError::AuthenticationFailed(_)
        ));
        assert!(matches!(
            GeocodingError::from_status(reqwest::StatusCode::BAD_GATEWAY, None),
            GeocodingError::ServiceUnavailable(_)
        ));
        assert!(matches!(
            GeocodingError::from_status(reqwest::StatusCode::NOT_FOUND, None),
            GeocodingError::RequestFailed(_)
        ));
    }

    #[test]
    fn test_error_display() {
        let err = GeocodingError::AddressNotFound("Mvog-Mbi".to_string());
        assert!(err.to_string().contains("Mvog-Mbi"));

        let err = GeocodingError::Timeout;
        assert!(err.to_string().contains("timed out"));
    }
}
