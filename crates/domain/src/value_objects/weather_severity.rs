//! Internal weather severity scale

use serde::{Deserialize, Serialize};
use std::fmt;

/// Coarse weather classification used by fare estimation
///
/// The discriminants are the wire values exchanged with the backend
/// (0 = clear, 1 = light rain, 2 = heavy rain, 3 = storm).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(into = "u8", from = "u8")]
#[repr(u8)]
pub enum WeatherSeverity {
    /// Sun or dry conditions
    #[default]
    Clear = 0,
    /// Drizzle or light rain
    LightRain = 1,
    /// Heavy rain or showers
    HeavyRain = 2,
    /// Thunderstorm
    Storm = 3,
}

impl WeatherSeverity {
    /// Numeric wire value
    #[must_use]
    pub const fn as_u8(self) -> u8 {
        self as u8
    }

    /// Map a wire value back; unknown values are treated as clear
    #[must_use]
    pub const fn from_u8(value: u8) -> Self {
        match value {
            1 => Self::LightRain,
            2 => Self::HeavyRain,
            3 => Self::Storm,
            _ => Self::Clear,
        }
    }
}

impl From<WeatherSeverity> for u8 {
    fn from(value: WeatherSeverity) -> Self {
        value.as_u8()
    }
}

impl From<u8> for WeatherSeverity {
    fn from(value: u8) -> Self {
        Self::from_u8(value)
    }
}

impl fmt::Display for WeatherSeverity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Clear => "clear",
            Self::LightRain => "light rain",
            Self::HeavyRain => "heavy rain",
            Self::Storm => "storm",
        };
        write!(f, "{name}")
    }
}
