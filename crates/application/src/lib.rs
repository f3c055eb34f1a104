//! Application layer - Use cases and orchestration
//!
//! Contains the port definitions for every external collaborator (geocoder,
//! router, weather, device location, map renderer) and the services that
//! orchestrate them: geolocation, debounced search, map lifecycle and
//! route planning.

pub mod error;
pub mod ports;
pub mod services;

pub use error::{ApplicationError, GeolocationError, GeolocationErrorCode};
pub use ports::*;
pub use services::*;
