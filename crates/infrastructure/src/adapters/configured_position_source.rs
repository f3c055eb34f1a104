//! Position source for hosts without a location sensor
//!
//! Answers from the configured device position. The position can be moved
//! at runtime; every move is pushed to the active watches.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use application::{
    GeolocationErrorCode, Position, PositionOptions, PositionSource, PositionUpdate, WatchId,
};
use async_trait::async_trait;
use chrono::Utc;
use domain::{Coordinate, GeolocationPermissionState};
use parking_lot::{Mutex, RwLock};
use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, instrument};

use crate::config::GeolocationAppConfig;

const DEFAULT_ACCURACY_M: f64 = 25.0;

/// [`PositionSource`] backed by configuration
#[derive(Debug)]
pub struct ConfiguredPositionSource {
    supported: bool,
    permission: Option<GeolocationPermissionState>,
    accuracy_m: f64,
    position: RwLock<Option<Coordinate>>,
    watches: Mutex<HashMap<WatchId, UnboundedSender<PositionUpdate>>>,
    next_watch: AtomicU64,
}

impl ConfiguredPositionSource {
    /// Build from the `geolocation` configuration section
    #[must_use]
    pub fn from_config(config: &GeolocationAppConfig) -> Self {
        Self {
            supported: !config.unsupported,
            permission: config.permission,
            accuracy_m: config.device_accuracy_m.unwrap_or(DEFAULT_ACCURACY_M),
            position: RwLock::new(
                config
                    .device_position
                    .and_then(|p| p.to_coordinate()),
            ),
            watches: Mutex::new(HashMap::new()),
            next_watch: AtomicU64::new(1),
        }
    }

    /// A granted device at a fixed position
    #[must_use]
    pub fn at(coordinate: Coordinate) -> Self {
        let source = Self::from_config(&GeolocationAppConfig {
            permission: Some(GeolocationPermissionState::Granted),
            ..GeolocationAppConfig::default()
        });
        *source.position.write() = Some(coordinate);
        source
    }

    /// Move the device and notify every watch
    pub fn move_to(&self, coordinate: Coordinate) {
        *self.position.write() = Some(coordinate);
        let update = self.fix();
        let mut watches = self.watches.lock();
        watches.retain(|_, sink| sink.send(update).is_ok());
        debug!(%coordinate, watches = watches.len(), "Device moved");
    }

    /// Number of active watches
    #[must_use]
    pub fn active_watches(&self) -> usize {
        self.watches.lock().len()
    }

    fn fix(&self) -> PositionUpdate {
        if self.permission == Some(GeolocationPermissionState::Denied) {
            return Err(GeolocationErrorCode::PermissionDenied);
        }
        let coordinate = (*self.position.read()).ok_or(GeolocationErrorCode::PositionUnavailable)?;
        Ok(Position {
            coordinate,
            accuracy_m: self.accuracy_m,
            timestamp: Utc::now(),
        })
    }
}

#[async_trait]
impl PositionSource for ConfiguredPositionSource {
    fn is_supported(&self) -> bool {
        self.supported
    }

    async fn query_permission(&self) -> Option<GeolocationPermissionState> {
        self.permission
    }

    #[instrument(skip(self))]
    async fn current_position(
        &self,
        _options: PositionOptions,
    ) -> Result<Position, GeolocationErrorCode> {
        self.fix()
    }

    fn watch_position(
        &self,
        _options: PositionOptions,
        sink: UnboundedSender<PositionUpdate>,
    ) -> WatchId {
        let id = WatchId(self.next_watch.fetch_add(1, Ordering::Relaxed));
        if sink.send(self.fix()).is_ok() {
            self.watches.lock().insert(id, sink);
        }
        id
    }

    fn clear_watch(&self, id: WatchId) {
        self.watches.lock().remove(&id);
    }
}
