//! Value objects - immutable types defined by their attributes

mod bounding_box;
mod coordinate;
mod locale;
mod permission;
mod session_token;
mod weather_severity;

pub use bounding_box::BoundingBox;
pub use coordinate::Coordinate;
pub use locale::Locale;
pub use permission::GeolocationPermissionState;
pub use session_token::SessionToken;
pub use weather_severity::WeatherSeverity;
