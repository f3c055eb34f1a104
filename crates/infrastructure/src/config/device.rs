//! Device location configuration

use application::GeolocationConfig;
use domain::GeolocationPermissionState;
use serde::{Deserialize, Serialize};

use super::GeoPointConfig;

/// Geolocation settings plus the position reported by a configured device
///
/// Hosts without a location sensor (servers, the CLI) answer position
/// requests from `device_position`. When it is absent the device reports
/// `position unavailable`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GeolocationAppConfig {
    /// Request options and message locale
    #[serde(flatten)]
    pub service: GeolocationConfig,

    /// Fixed position of the device
    #[serde(default)]
    pub device_position: Option<GeoPointConfig>,

    /// Accuracy radius reported with the fixed position, in meters
    #[serde(default)]
    pub device_accuracy_m: Option<f64>,

    /// Answer of the native permission query; absent means no such API
    #[serde(default)]
    pub permission: Option<GeolocationPermissionState>,

    /// The device has no location API at all
    #[serde(default)]
    pub unsupported: bool,
}
