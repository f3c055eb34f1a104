//! Places: search suggestions and confirmed selections

use serde::{Deserialize, Serialize};

use crate::value_objects::Coordinate;

/// An unconfirmed candidate place returned by a text search
///
/// Suggestions are ephemeral: they are discarded once a selection is made
/// or the query changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceSuggestion {
    /// Provider identifier, used to resolve the suggestion
    pub id: String,
    /// Short display name
    pub name: String,
    /// Full formatted address
    pub formatted_address: String,
    /// Position, when the provider returns one with the suggestion
    ///
    /// Session-scoped suggest endpoints omit it; the position is then
    /// obtained when the suggestion is selected.
    pub coordinate: Option<Coordinate>,
    /// Provider payload kept verbatim for later resolution
    #[serde(default)]
    pub raw_provider_context: serde_json::Value,
}

impl PlaceSuggestion {
    /// Whether the suggestion still needs a resolve call before use
    #[must_use]
    pub const fn needs_resolution(&self) -> bool {
        self.coordinate.is_none()
    }

    /// Label shown once the suggestion is selected
    #[must_use]
    pub fn display_label(&self) -> &str {
        if self.name.is_empty() {
            &self.formatted_address
        } else {
            &self.name
        }
    }
}

/// How a selected place was obtained
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlaceSource {
    /// Picked from search suggestions
    Search,
    /// Device position with reverse-geocoded label
    Geolocation,
    /// Saved favorite or history entry
    Shortcut,
}

/// A confirmed place with a position
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectedPlace {
    /// Human-readable label
    pub label: String,
    /// Confirmed position
    pub coordinate: Coordinate,
    /// Origin of the selection
    pub source: PlaceSource,
}

impl SelectedPlace {
    /// Create a new selected place
    #[must_use]
    pub fn new(label: impl Into<String>, coordinate: Coordinate, source: PlaceSource) -> Self {
        Self {
            label: label.into(),
            coordinate,
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn suggestion(name: &str, coordinate: Option<Coordinate>) -> PlaceSuggestion {
        PlaceSuggestion {
            id: "id-1".to_string(),
            name: name.to_string(),
            formatted_address: "Rue 1.750, Yaoundé".to_string(),
            coordinate,
            raw_provider_context: serde_json::Value::Null,
        }
    }

    #[test]
    fn suggestion_without_coordinate_needs_resolution() {
        assert!(suggestion("Poste Centrale", None).needs_resolution());
        assert!(!suggestion("Poste Centrale", Some(Coordinate::yaounde())).needs_resolution());
    }

    #[test]
    fn display_label_falls_back_to_address() {
        assert_eq!(suggestion("", None).display_label(), "Rue 1.750, Yaoundé");
        assert_eq!(suggestion("Mvan", None).display_label(), "Mvan");
    }

    #[test]
    fn selected_place_serialization() {
        let place = SelectedPlace::new("Mvan", Coordinate::yaounde(), PlaceSource::Search);
        let json = serde_json::to_value(&place).unwrap();
        assert_eq!(json["source"], "search");
        assert_eq!(json["coordinate"][0], 11.5021);
    }
}
