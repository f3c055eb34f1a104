//! Open-Meteo weather integration
//!
//! Client for the Open-Meteo Weather API (<https://open-meteo.com>).
//! Reduces current conditions to the four-step [`domain::WeatherSeverity`]
//! scale used by fare estimation. No API key is required.

mod client;
mod config;
mod error;
mod models;

pub use client::{OpenMeteoClient, WeatherClient};
pub use config::WeatherConfig;
pub use error::WeatherError;
pub use models::{CurrentConditions, WeatherCondition, severity_for_wmo_code};
