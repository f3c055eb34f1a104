//! Infrastructure layer - Adapters for external systems
//!
//! Implements the application ports over the geocoding, directions and
//! weather integrations, plus an in-memory map surface and a configured
//! device position. Also owns configuration loading and logging setup.

pub mod adapters;
pub mod config;
pub mod telemetry;

pub use adapters::*;
pub use config::{AppConfig, ConfigError, GeoPointConfig, MapboxAppConfig};
pub use telemetry::{LoggingConfig, LoggingError, init_logging};
