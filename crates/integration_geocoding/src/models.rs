//! Geocoding request and response models

use domain::{BoundingBox, Coordinate};
use serde::{Deserialize, Serialize};

/// Largest number of suggestions a single search may ask for
pub const MAX_LIMIT: u8 = 10;

/// Options narrowing a place search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOptions {
    /// Bias results toward this position
    pub proximity: Option<Coordinate>,
    /// Restrict results to this box
    pub bbox: Option<BoundingBox>,
    /// Maximum number of suggestions (clamped to 1..=10)
    pub limit: u8,
    /// Country filter overriding the provider default
    pub country: Option<String>,
    /// Language overriding the provider default
    pub language: Option<String>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            proximity: None,
            bbox: None,
            limit: 5,
            country: None,
            language: None,
        }
    }
}

impl SearchOptions {
    /// Bias results toward a position
    #[must_use]
    pub const fn with_proximity(mut self, proximity: Coordinate) -> Self {
        self.proximity = Some(proximity);
        self
    }

    /// Restrict results to a bounding box
    #[must_use]
    pub const fn with_bbox(mut self, bbox: BoundingBox) -> Self {
        self.bbox = Some(bbox);
        self
    }

    /// Set the maximum number of results
    #[must_use]
    pub const fn with_limit(mut self, limit: u8) -> Self {
        self.limit = limit;
        self
    }

    /// Limit clamped to what providers accept
    #[must_use]
    pub fn effective_limit(&self) -> u8 {
        self.limit.clamp(1, MAX_LIMIT)
    }

    /// Stable textual key combining the query and every option
    #[must_use]
    pub fn cache_key(&self, query: &str) -> String {
        let proximity = self
            .proximity
            .map(|c| c.to_lon_lat_string())
            .unwrap_or_default();
        let bbox = self.bbox.map(|b| b.to_query_string()).unwrap_or_default();
        format!(
            "{}|{}|{}|{}|{}|{}",
            query.trim().to_lowercase(),
            proximity,
            bbox,
            self.effective_limit(),
            self.country.as_deref().unwrap_or_default(),
            self.language.as_deref().unwrap_or_default(),
        )
    }
}

/// Address components resolved for a coordinate
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReverseAddress {
    /// Named point of interest (shop, amenity, landmark)
    pub poi: Option<String>,
    /// Building name
    pub building: Option<String>,
    /// Road or street name
    pub road: Option<String>,
    /// Neighborhood or quarter
    pub neighborhood: Option<String>,
    /// City, town or village
    pub municipality: Option<String>,
}

impl ReverseAddress {
    /// Most specific non-blank component
    ///
    /// Priority: point of interest, building, road, neighborhood, municipality.
    #[must_use]
    pub fn best_label(&self) -> Option<&str> {
        [
            &self.poi,
            &self.building,
            &self.road,
            &self.neighborhood,
            &self.municipality,
        ]
        .into_iter()
        .filter_map(|part| part.as_deref())
        .map(str::trim)
        .find(|s| !s.is_empty())
    }

    /// Whether no component was resolved
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.best_label().is_none()
    }
}

/// Result of a reverse lookup: always a label, always the coordinate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReverseLookup {
    /// Best available label, or the generic fallback label
    pub label: String,
    /// The coordinate that was looked up
    pub coordinate: Coordinate,
    /// Whether the label came from a provider rather than the fallback
    pub resolved: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_is_clamped() {
        assert_eq!(SearchOptions::default().with_limit(0).effective_limit(), 1);
        assert_eq!(SearchOptions::default().with_limit(50).effective_limit(), 10);
        assert_eq!(SearchOptions::default().effective_limit(), 5);
    }

    #[test]
    fn test_cache_key_normalizes_query() {
        let options = SearchOptions::default();
        assert_eq!(options.cache_key("  Mvan "), options.cache_key("mvan"));
    }

    #[test]
    fn test_cache_key_depends_on_options() {
        let plain = SearchOptions::default();
        let biased = SearchOptions::default().with_proximity(Coordinate::yaounde());
        assert_ne!(plain.cache_key("mvan"), biased.cache_key("mvan"));
        assert_ne!(
            plain.cache_key("mvan"),
            plain.clone().with_limit(3).cache_key("mvan")
        );
    }

    #[test]
    fn test_best_label_priority() {
        let mut address = ReverseAddress {
            poi: Some("Pharmacie du Soleil".to_string()),
            building: Some("Immeuble Ekang".to_string()),
            road: Some("Avenue Kennedy".to_string()),
            neighborhood: Some("Centre".to_string()),
            municipality: Some("Yaoundé".to_string()),
        };
        assert_eq!(address.best_label(), Some("Pharmacie du Soleil"));

        address.poi = None;
        assert_eq!(address.best_label(), Some("Immeuble Ekang"));

        address.building = Some("   ".to_string());
        assert_eq!(address.best_label(), Some("Avenue Kennedy"));

        address.road = None;
        assert_eq!(address.best_label(), Some("Centre"));

        address.neighborhood = None;
        assert_eq!(address.best_label(), Some("Yaoundé"));

        address.municipality = None;
        assert!(address.is_empty());
    }
}
