//! Port definitions for application layer
//!
//! Ports are interfaces that define how the application interacts with
//! external systems. Adapters in the infrastructure layer implement these ports.

mod directions_port;
mod geocoding_port;
mod map_surface;
mod position_source;
mod weather_port;

#[cfg(test)]
pub use directions_port::MockDirectionsPort;
pub use directions_port::{DirectionsPort, TrafficRoute};
#[cfg(test)]
pub use geocoding_port::MockGeocodingPort;
pub use geocoding_port::{GeocodingPort, SearchRequest};
#[cfg(test)]
pub use map_surface::MockMapSurface;
pub use map_surface::{
    LayerKind, LayerSpec, MapId, MapOptions, MapSurface, MapSurfaceError, MarkerId,
};
#[cfg(test)]
pub use position_source::MockPositionSource;
pub use position_source::{Position, PositionOptions, PositionSource, PositionUpdate, WatchId};
#[cfg(test)]
pub use weather_port::MockWeatherPort;
pub use weather_port::WeatherPort;
