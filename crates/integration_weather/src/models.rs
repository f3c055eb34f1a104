//! Weather data models
//!
//! Types for current conditions reported by the Open-Meteo API and the WMO
//! code table that reduces them to a [`WeatherSeverity`].

use chrono::{DateTime, Utc};
use domain::{Coordinate, WeatherSeverity};
use serde::{Deserialize, Serialize};

/// Weather condition derived from WMO weather codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum WeatherCondition {
    /// Clear sky to overcast (WMO 0-3)
    Dry,
    /// Fog (WMO 45, 48)
    Fog,
    /// Drizzle (WMO 51, 53, 55)
    Drizzle,
    /// Freezing drizzle (WMO 56, 57)
    FreezingDrizzle,
    /// Slight rain (WMO 61)
    SlightRain,
    /// Moderate or heavy rain (WMO 63, 65)
    Rain,
    /// Freezing rain (WMO 66, 67)
    FreezingRain,
    /// Slight rain showers (WMO 80)
    SlightShowers,
    /// Moderate or violent rain showers (WMO 81, 82)
    HeavyShowers,
    /// Thunderstorm, with or without hail (WMO 95, 96, 99)
    Thunderstorm,
    /// Any other code (snow and unassigned values)
    Other,
}

impl WeatherCondition {
    /// Convert WMO weather code to `WeatherCondition`
    ///
    /// See: <https://open-meteo.com/en/docs> for WMO code reference
    #[must_use]
    pub const fn from_wmo_code(code: u8) -> Self {
        match code {
            0..=3 => Self::Dry,
            45 | 48 => Self::Fog,
            51 | 53 | 55 => Self::Drizzle,
            56 | 57 => Self::FreezingDrizzle,
            61 => Self::SlightRain,
            63 | 65 => Self::Rain,
            66 | 67 => Self::FreezingRain,
            80 => Self::SlightShowers,
            81 | 82 => Self::HeavyShowers,
            95 | 96 | 99 => Self::Thunderstorm,
            _ => Self::Other,
        }
    }

    /// Severity shown next to a fare estimate
    #[must_use]
    pub const fn severity(self) -> WeatherSeverity {
        match self {
            Self::Dry | Self::Fog | Self::Other => WeatherSeverity::Clear,
            Self::Drizzle | Self::FreezingDrizzle | Self::SlightRain | Self::SlightShowers => {
                WeatherSeverity::LightRain
            },
            Self::Rain | Self::FreezingRain | Self::HeavyShowers => WeatherSeverity::HeavyRain,
            Self::Thunderstorm => WeatherSeverity::Storm,
        }
    }

    /// Get a human-readable description of the weather condition
    #[must_use]
    pub const fn description(&self) -> &'static str {
        match self {
            Self::Dry => "Dry",
            Self::Fog => "Fog",
            Self::Drizzle => "Drizzle",
            Self::FreezingDrizzle => "Freezing drizzle",
            Self::SlightRain => "Slight rain",
            Self::Rain => "Rain",
            Self::FreezingRain => "Freezing rain",
            Self::SlightShowers => "Slight rain showers",
            Self::HeavyShowers => "Heavy rain showers",
            Self::Thunderstorm => "Thunderstorm",
            Self::Other => "Other",
        }
    }
}

impl std::fmt::Display for WeatherCondition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Map a provider weather code straight to a severity; unmapped codes are clear
#[must_use]
pub const fn severity_for_wmo_code(code: u8) -> WeatherSeverity {
    WeatherCondition::from_wmo_code(code).severity()
}

/// Current weather conditions at a position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrentConditions {
    /// Position the conditions were requested for
    pub coordinate: Coordinate,
    /// Observation time
    pub time: DateTime<Utc>,
    /// Temperature in Celsius
    pub temperature: f32,
    /// Precipitation in mm
    pub precipitation: f32,
    /// WMO weather code
    pub weather_code: u8,
    /// Weather condition
    pub condition: WeatherCondition,
    /// Reduced severity
    pub severity: WeatherSeverity,
}

impl CurrentConditions {
    /// Get a formatted summary of current conditions
    #[must_use]
    pub fn summary(&self) -> String {
        format!(
            "{} {:.1}°C, precip {:.1}mm (severity {})",
            self.condition.description(),
            self.temperature,
            self.precipitation,
            self.severity.as_u8()
        )
    }
}

/// Raw weather data from API (current)
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct WeatherData {
    pub time: String,
    pub temperature_2m: f32,
    pub weather_code: u8,
    #[serde(default)]
    pub precipitation: f32,
}

/// Raw API response
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct ApiResponse {
    pub current: Option<WeatherData>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dry_and_fog_codes_are_clear() {
        for code in [0, 1, 2, 3, 45, 48] {
            assert_eq!(severity_for_wmo_code(code), WeatherSeverity::Clear, "code {code}");
        }
    }

    #[test]
    fn test_light_rain_codes() {
        for code in [51, 53, 55, 56, 57, 61, 80] {
            assert_eq!(
                severity_for_wmo_code(code),
                WeatherSeverity::LightRain,
                "code {code}"
            );
        }
    }

    #[test]
    fn test_heavy_rain_codes() {
        for code in [63, 65, 66, 67, 81, 82] {
            assert_eq!(
                severity_for_wmo_code(code),
                WeatherSeverity::HeavyRain,
                "code {code}"
            );
        }
    }

    #[test]
    fn test_storm_codes() {
        for code in [95, 96, 99] {
            assert_eq!(severity_for_wmo_code(code), WeatherSeverity::Storm, "code {code}");
        }
    }

    #[test]
    fn test_unmapped_codes_default_to_clear() {
        for code in [4, 44, 71, 77, 86, 100, 255] {
            assert_eq!(severity_for_wmo_code(code), WeatherSeverity::Clear, "code {code}");
        }
        assert_eq!(WeatherCondition::from_wmo_code(200), WeatherCondition::Other);
    }

    #[test]
    fn test_condition_display() {
        assert_eq!(WeatherCondition::Thunderstorm.to_string(), "Thunderstorm");
        assert_eq!(WeatherCondition::SlightRain.to_string(), "Slight rain");
    }
}
