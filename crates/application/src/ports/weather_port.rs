//! Weather service port
//!
//! Defines the interface for weather severity lookups.

use async_trait::async_trait;
use domain::{Coordinate, WeatherSeverity};
#[cfg(test)]
use mockall::automock;

/// Port for weather lookups
#[cfg_attr(test, automock)]
#[async_trait]
pub trait WeatherPort: Send + Sync {
    /// Current severity at a position; clear when the provider fails
    async fn severity(&self, coordinate: Coordinate) -> WeatherSeverity;

    /// Check if the weather service is available
    async fn is_available(&self) -> bool;
}
