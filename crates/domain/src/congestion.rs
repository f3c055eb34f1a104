//! Route congestion segmentation
//!
//! Splits a route polyline into consecutive two-point segments, each tagged
//! with the traffic level reported for it, and summarizes the route with a
//! single dominant level.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::value_objects::{Coordinate, Locale};

/// Coarse traffic density of a route segment
///
/// Variant order is the tie-break order of [`dominant_congestion`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CongestionLevel {
    /// Free flow
    Low,
    /// Some slowdown
    Moderate,
    /// Dense traffic
    Heavy,
    /// Stop and go
    Severe,
    /// No traffic data
    Unknown,
}

impl CongestionLevel {
    /// All levels in enumeration order
    pub const ALL: [Self; 5] = [
        Self::Low,
        Self::Moderate,
        Self::Heavy,
        Self::Severe,
        Self::Unknown,
    ];

    /// Parse a provider annotation value; anything unrecognized is `Unknown`
    #[must_use]
    pub fn from_annotation(value: &str) -> Self {
        match value {
            "low" => Self::Low,
            "moderate" => Self::Moderate,
            "heavy" => Self::Heavy,
            "severe" => Self::Severe,
            _ => Self::Unknown,
        }
    }

    /// Line color for segments at this level
    #[must_use]
    pub const fn color(&self) -> &'static str {
        match self {
            Self::Low => "#22c55e",
            Self::Heavy => "#f59e0b",
            Self::Severe => "#ef4444",
            Self::Moderate | Self::Unknown => "#3b82f6",
        }
    }

    /// Short traffic summary for the level
    #[must_use]
    pub const fn label(&self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Self::Low, Locale::Fr) => "Trafic fluide",
            (Self::Moderate, Locale::Fr) => "Trafic modéré",
            (Self::Heavy, Locale::Fr) => "Trafic dense",
            (Self::Severe, Locale::Fr) => "Embouteillages",
            (Self::Unknown, Locale::Fr) => "Trafic inconnu",
            (Self::Low, Locale::En) => "Light traffic",
            (Self::Moderate, Locale::En) => "Moderate traffic",
            (Self::Heavy, Locale::En) => "Heavy traffic",
            (Self::Severe, Locale::En) => "Severe congestion",
            (Self::Unknown, Locale::En) => "Traffic unknown",
        }
    }

    const fn index(self) -> usize {
        match self {
            Self::Low => 0,
            Self::Moderate => 1,
            Self::Heavy => 2,
            Self::Severe => 3,
            Self::Unknown => 4,
        }
    }
}

impl fmt::Display for CongestionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Low => "low",
            Self::Moderate => "moderate",
            Self::Heavy => "heavy",
            Self::Severe => "severe",
            Self::Unknown => "unknown",
        };
        write!(f, "{name}")
    }
}

/// Two consecutive route coordinates and their traffic level
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CongestionSegment {
    /// Start and end of the segment
    pub coordinate_pair: [Coordinate; 2],
    /// Traffic level on the segment
    pub level: CongestionLevel,
}

/// Split a polyline into colored segments
///
/// Segment `i` joins `coordinates[i]` and `coordinates[i + 1]` and takes
/// `levels[i]`. Segments without a matching level (including the case of no
/// traffic data at all) get [`CongestionLevel::Unknown`]; surplus levels are
/// ignored. Fewer than two coordinates yield no segments.
#[must_use]
pub fn segment(coordinates: &[Coordinate], levels: &[CongestionLevel]) -> Vec<CongestionSegment> {
    coordinates
        .windows(2)
        .enumerate()
        .map(|(i, pair)| CongestionSegment {
            coordinate_pair: [pair[0], pair[1]],
            level: levels.get(i).copied().unwrap_or(CongestionLevel::Unknown),
        })
        .collect()
}

/// Level carried by the most segments
///
/// Ties go to the level that comes first in [`CongestionLevel::ALL`].
/// An empty route is `Unknown`.
#[must_use]
pub fn dominant_congestion(segments: &[CongestionSegment]) -> CongestionLevel {
    let mut counts = [0usize; CongestionLevel::ALL.len()];
    for s in segments {
        counts[s.level.index()] += 1;
    }

    let mut best = CongestionLevel::Unknown;
    let mut best_count = 0;
    for level in CongestionLevel::ALL {
        let count = counts[level.index()];
        if count > best_count {
            best = level;
            best_count = count;
        }
    }
    best
}
