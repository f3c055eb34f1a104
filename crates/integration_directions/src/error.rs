//! Directions error types

use thiserror::Error;

/// Errors that can occur when requesting routes or isochrones
#[derive(Debug, Error)]
pub enum DirectionsError {
    /// Connection to the routing service failed
    #[error("Directions connection failed: {0}")]
    ConnectionFailed(String),

    /// Request to the routing service failed
    #[error("Directions request failed: {0}")]
    RequestFailed(String),

    /// Failed to parse the routing response
    #[error("Directions parse error: {0}")]
    ParseError(String),

    /// The provider found no route between the points
    #[error("No route found: {0}")]
    NoRoute(String),

    /// Rate limit exceeded
    #[error("Directions rate limit exceeded")]
    RateLimitExceeded,

    /// Access token rejected
    #[error("Directions authentication failed: {0}")]
    AuthenticationFailed(String),

    /// Service is temporarily unavailable
    #[error("Directions service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Configuration error
    #[error("Directions configuration error: {0}")]
    ConfigurationError(String),

    /// Request timeout
    #[error("Directions request timed out")]
    Timeout,
}

impl DirectionsError {
    /// Returns true if this error is retryable
    #[must_use]
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::ConnectionFailed(_)
                | Self::ServiceUnavailable(_)
                | Self::RateLimitExceeded
                | Self::Timeout
        )
    }

    pub(crate) fn from_transport(e: &reqwest::Error) -> Self {
        if e.is_timeout() {
            Self::Timeout
        } else if e.is_connect() {
            Self::ConnectionFailed(e.to_string())
        } else {
            Self::RequestFailed(e.to_string())
        }
    }

    pub(crate) fn from_status(status: reqwest::StatusCode) -> Self {
        match status {
            reqwest::StatusCode::TOO_MANY_REQUESTS => Self::RateLimitExceeded,
            reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN => {
                Self::AuthenticationFailed(format!("HTTP {status}"))
            },
            s if s.is_server_error() => Self::ServiceUnavailable(format!("HTTP {status}")),
            _ => Self::RequestFailed(format!("HTTP {status}")),
        }
    }
}
