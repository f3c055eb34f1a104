//! Place search and reverse geocoding for Farescope
//!
//! Turns free-text place searches into [`PlaceSuggestion`]s and coordinates
//! into human-readable labels.
//!
//! # Architecture
//!
//! Every backend implements [`GeocodingProvider`]. The primary backend,
//! [`MapboxSearchClient`], is session-scoped: suggestion calls share a
//! [`SessionToken`] that is closed by a retrieve call when the user selects a
//! suggestion. The fallback backend, [`NominatimClient`], is stateless.
//! [`GeocodingClient`] tries the providers in order, caches answers for a
//! fixed window and owns the session token.
//!
//! # Example
//!
//! ```rust,ignore
//! use integration_geocoding::{GeocodingClient, GeocodingConfig, SearchOptions};
//!
//! let client = GeocodingClient::from_config(&GeocodingConfig::default())?;
//! let suggestions = client.search("Poste centrale", &SearchOptions::default()).await;
//! let place = client.select(&suggestions[0]).await?;
//! ```
//!
//! [`PlaceSuggestion`]: domain::PlaceSuggestion
//! [`SessionToken`]: domain::SessionToken

mod client;
mod config;
mod error;
mod mapbox;
mod models;
mod nominatim;
mod provider;

pub use client::{GeocodingClient, MIN_QUERY_CHARS};
pub use config::{GeocodingConfig, MapboxSearchConfig, NominatimConfig};
pub use error::GeocodingError;
pub use mapbox::MapboxSearchClient;
pub use models::{ReverseAddress, ReverseLookup, SearchOptions};
pub use nominatim::NominatimClient;
pub use provider::GeocodingProvider;
