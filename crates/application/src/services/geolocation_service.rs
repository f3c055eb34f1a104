//! Geolocation service
//!
//! Wraps the device location API: one-shot position, continuous watch,
//! permission probe, and position-plus-label composition.

use std::sync::Arc;
use std::time::Duration;

use domain::{GeolocationPermissionState, Locale, PlaceSource, SelectedPlace};
use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::error::{GeolocationError, GeolocationErrorCode};
use crate::ports::{GeocodingPort, Position, PositionOptions, PositionSource, WatchId};

/// Geolocation behavior settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeolocationConfig {
    /// Timeout of a position request in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// Oldest cached fix accepted, in seconds
    #[serde(default)]
    pub maximum_age_secs: u64,

    /// Prefer GPS positioning
    #[serde(default = "default_high_accuracy")]
    pub high_accuracy: bool,

    /// Timeout of the request used to infer permission, in seconds
    #[serde(default = "default_probe_timeout_secs")]
    pub probe_timeout_secs: u64,

    /// Language of user-facing error messages
    #[serde(default)]
    pub locale: Locale,
}

const fn default_timeout_secs() -> u64 {
    15
}

const fn default_high_accuracy() -> bool {
    true
}

const fn default_probe_timeout_secs() -> u64 {
    3
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_timeout_secs(),
            maximum_age_secs: 0,
            high_accuracy: default_high_accuracy(),
            probe_timeout_secs: default_probe_timeout_secs(),
            locale: Locale::default(),
        }
    }
}

impl GeolocationConfig {
    /// Options of a regular position request
    #[must_use]
    pub const fn position_options(&self) -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: self.high_accuracy,
            timeout: Duration::from_secs(self.timeout_secs),
            maximum_age: Duration::from_secs(self.maximum_age_secs),
        }
    }

    /// Options of the permission-inference request
    #[must_use]
    pub const fn probe_options(&self) -> PositionOptions {
        PositionOptions {
            enable_high_accuracy: false,
            timeout: Duration::from_secs(self.probe_timeout_secs),
            maximum_age: Duration::MAX,
        }
    }
}

/// Device location facade used by the UI and the map controller
pub struct GeolocationService {
    source: Arc<dyn PositionSource>,
    geocoder: Arc<dyn GeocodingPort>,
    config: GeolocationConfig,
}

impl std::fmt::Debug for GeolocationService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeolocationService")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl GeolocationService {
    /// Create a new geolocation service
    pub fn new(
        source: Arc<dyn PositionSource>,
        geocoder: Arc<dyn GeocodingPort>,
        config: GeolocationConfig,
    ) -> Self {
        Self {
            source,
            geocoder,
            config,
        }
    }

    /// Locale of user-facing messages
    #[must_use]
    pub const fn locale(&self) -> Locale {
        self.config.locale
    }

    /// Active settings
    #[must_use]
    pub const fn config(&self) -> &GeolocationConfig {
        &self.config
    }

    fn error(&self, code: GeolocationErrorCode) -> GeolocationError {
        GeolocationError::new(code, self.config.locale)
    }

    /// Probe the location permission
    ///
    /// Uses the native permission query when available. Otherwise a
    /// short-timeout position request infers `granted` or `denied`; any
    /// other outcome reads as `prompt`.
    #[instrument(skip(self))]
    pub async fn check_permission(&self) -> GeolocationPermissionState {
        if let Some(state) = self.source.query_permission().await {
            debug!(%state, "Permission from native query");
            return state;
        }

        if !self.source.is_supported() {
            return GeolocationPermissionState::Unsupported;
        }

        let probe = self.config.probe_options();
        let outcome = tokio::time::timeout(probe.timeout, self.source.current_position(probe)).await;
        let state = match outcome {
            Ok(Ok(_)) => GeolocationPermissionState::Granted,
            Ok(Err(GeolocationErrorCode::PermissionDenied)) => GeolocationPermissionState::Denied,
            Ok(Err(_)) | Err(_) => GeolocationPermissionState::Prompt,
        };
        debug!(%state, "Permission inferred from probe request");
        state
    }

    /// Request a single position fix with the configured options
    ///
    /// # Errors
    ///
    /// Returns a [`GeolocationError`] carrying the failure code.
    pub async fn get_position(&self) -> Result<Position, GeolocationError> {
        self.get_position_with(self.config.position_options()).await
    }

    /// Request a single position fix
    ///
    /// The timeout is enforced here even if the device ignores it.
    ///
    /// # Errors
    ///
    /// Returns a [`GeolocationError`] carrying the failure code.
    #[instrument(skip(self))]
    pub async fn get_position_with(
        &self,
        options: PositionOptions,
    ) -> Result<Position, GeolocationError> {
        if !self.source.is_supported() {
            return Err(self.error(GeolocationErrorCode::Unsupported));
        }

        match tokio::time::timeout(options.timeout, self.source.current_position(options)).await {
            Ok(Ok(position)) => {
                debug!(coordinate = %position.coordinate, accuracy_m = position.accuracy_m, "Position fix");
                Ok(position)
            },
            Ok(Err(code)) => {
                warn!(code = code.as_u8(), "Position request failed");
                Err(self.error(code))
            },
            Err(_) => {
                warn!(timeout = ?options.timeout, "Position request timed out");
                Err(self.error(GeolocationErrorCode::Timeout))
            },
        }
    }

    /// Start a continuous position watch
    ///
    /// The caller owns the returned handle and must cancel it on teardown.
    ///
    /// # Errors
    ///
    /// Returns an `Unsupported` error when the device has no location API.
    pub fn watch_position(&self) -> Result<PositionWatch, GeolocationError> {
        if !self.source.is_supported() {
            return Err(self.error(GeolocationErrorCode::Unsupported));
        }

        let (tx, rx) = mpsc::unbounded_channel();
        let id = self
            .source
            .watch_position(self.config.position_options(), tx);
        info!(watch = id.0, "Position watch started");

        Ok(PositionWatch {
            id,
            source: Arc::clone(&self.source),
            updates: rx,
            locale: self.config.locale,
            active: true,
        })
    }

    /// Device position with a human-readable label
    ///
    /// Issues exactly one position request; no separate permission probe.
    ///
    /// # Errors
    ///
    /// Returns the position failure; the label lookup itself never fails.
    #[instrument(skip(self))]
    pub async fn position_with_label(&self) -> Result<SelectedPlace, GeolocationError> {
        let position = self.get_position().await?;
        let label = self.geocoder.reverse_lookup(position.coordinate).await;
        Ok(SelectedPlace::new(
            label,
            position.coordinate,
            PlaceSource::Geolocation,
        ))
    }
}

/// Handle of an active position watch
pub struct PositionWatch {
    id: WatchId,
    source: Arc<dyn PositionSource>,
    updates: mpsc::UnboundedReceiver<crate::ports::PositionUpdate>,
    locale: Locale,
    active: bool,
}

impl std::fmt::Debug for PositionWatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PositionWatch")
            .field("id", &self.id)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

impl PositionWatch {
    /// Watch identifier
    #[must_use]
    pub const fn id(&self) -> WatchId {
        self.id
    }

    /// Next update, or `None` once the watch is cancelled or the source hung up
    pub async fn next(&mut self) -> Option<Result<Position, GeolocationError>> {
        if !self.active {
            return None;
        }
        let update = self.updates.recv().await?;
        Some(update.map_err(|code| GeolocationError::new(code, self.locale)))
    }

    /// Stop the watch
    pub fn cancel(&mut self) {
        if self.active {
            self.active = false;
            self.source.clear_watch(self.id);
            self.updates.close();
            info!(watch = self.id.0, "Position watch cancelled");
        }
    }
}

impl Drop for PositionWatch {
    fn drop(&mut self) {
        self.cancel();
    }
}
