//! Device position port
//!
//! Mirrors the standard one-shot/watch position interface of a device
//! location API, plus its optional permission-query API.

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use domain::{Coordinate, GeolocationPermissionState};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc::UnboundedSender;

use crate::error::GeolocationErrorCode;

/// A device position fix
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Position {
    /// Reported position
    pub coordinate: Coordinate,
    /// Accuracy radius in meters
    pub accuracy_m: f64,
    /// When the fix was taken
    pub timestamp: DateTime<Utc>,
}

/// Options of a position request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    /// Prefer GPS over network positioning
    pub enable_high_accuracy: bool,
    /// Give up after this long
    pub timeout: Duration,
    /// Accept a cached fix at most this old
    pub maximum_age: Duration,
}

impl Default for PositionOptions {
    fn default() -> Self {
        Self {
            enable_high_accuracy: true,
            timeout: Duration::from_secs(15),
            maximum_age: Duration::ZERO,
        }
    }
}

/// Identifier of an active position watch
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WatchId(pub u64);

/// A watch update: a new fix or a failure code
pub type PositionUpdate = Result<Position, GeolocationErrorCode>;

/// Port for the device location API
#[cfg_attr(test, automock)]
#[async_trait]
pub trait PositionSource: Send + Sync {
    /// Whether the device offers a location API at all
    fn is_supported(&self) -> bool;

    /// Native permission query; `None` when the device has no such API
    async fn query_permission(&self) -> Option<GeolocationPermissionState>;

    /// Request a single position fix
    async fn current_position(
        &self,
        options: PositionOptions,
    ) -> Result<Position, GeolocationErrorCode>;

    /// Start delivering position updates to `sink` until cleared
    fn watch_position(
        &self,
        options: PositionOptions,
        sink: UnboundedSender<PositionUpdate>,
    ) -> WatchId;

    /// Stop a watch; unknown ids are ignored
    fn clear_watch(&self, id: WatchId);
}
