//! Directions and isochrones for Farescope
//!
//! Wraps the Mapbox Directions API (`driving-traffic` profile) and the Mapbox
//! Isochrone API. Route responses carry the geometry plus one congestion
//! annotation per segment, ready for [`domain::segment`].
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_directions::{DirectionsConfig, DirectionsProvider, MapboxDirectionsClient};
//!
//! let client = MapboxDirectionsClient::new(&DirectionsConfig::default())?;
//! let route = client.route(departure, arrival).await?;
//! let segments = domain::segment(route.geometry.coordinates(), &route.congestion);
//! ```

mod client;
mod config;
mod error;
mod isochrone;
mod models;

pub use client::{DirectionsProvider, MapboxDirectionsClient};
pub use config::DirectionsConfig;
pub use error::DirectionsError;
pub use isochrone::IsochroneClient;
pub use models::DirectionsRoute;
