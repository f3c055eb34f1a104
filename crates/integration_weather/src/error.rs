//! Weather error types

use thiserror::Error;

/// Errors from the weather provider
#[derive(Debug, Error)]
pub enum WeatherError {
    /// Could not reach the provider
    #[error("Weather connection failed: {0}")]
    ConnectionFailed(String),

    /// Provider rejected the request
    #[error("Weather request failed: {0}")]
    RequestFailed(String),

    /// Response did not match the expected shape
    #[error("Weather parse error: {0}")]
    ParseError(String),

    /// Provider answered with a server error
    #[error("Weather service unavailable: {0}")]
    ServiceUnavailable(String),

    /// Too many requests
    #[error("Weather rate limit exceeded")]
    RateLimitExceeded,

    /// No answer before the configured timeout
    #[error("Weather request timed out")]
    Timeout,
}

impl WeatherError {
    /// Whether trying again later may succeed
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
            s if s.is_server_error() => Self::ServiceUnavailable(format!("HTTP {status}")),
            _ => Self::RequestFailed(format!("HTTP {status}")),
        }
    }
}
