//! Infrastructure adapters
//!
//! Adapters connect application ports to concrete implementations.

mod circuit_breaker;
mod configured_position_source;
mod directions_adapter;
mod geocoding_adapter;
mod scene_map_surface;
mod weather_adapter;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitBreakerError, CircuitState};
pub use configured_position_source::ConfiguredPositionSource;
pub use directions_adapter::DirectionsAdapter;
pub use geocoding_adapter::GeocodingAdapter;
pub use scene_map_surface::{Camera, Scene, SceneMapSurface};
pub use weather_adapter::WeatherAdapter;
