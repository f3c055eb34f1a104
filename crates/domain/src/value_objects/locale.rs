//! User-facing message locale

use serde::{Deserialize, Serialize};
use std::fmt;

/// Language for user-facing messages
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Locale {
    /// French (default market language)
    #[default]
    Fr,
    /// English
    En,
}

impl Locale {
    /// Two-letter language code
    #[must_use]
    pub const fn code(&self) -> &'static str {
        match self {
            Self::Fr => "fr",
            Self::En => "en",
        }
    }
}

impl fmt::Display for Locale {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

impl std::str::FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "fr" | "french" => Ok(Self::Fr),
            "en" | "english" => Ok(Self::En),
            _ => Err(format!("Unsupported locale: {s}. Use 'fr' or 'en'")),
        }
    }
}
