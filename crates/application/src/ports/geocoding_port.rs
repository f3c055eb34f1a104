//! Geocoding port
//!
//! Place search, suggestion resolution and reverse lookup.

use async_trait::async_trait;
use domain::{BoundingBox, Coordinate, PlaceSuggestion, SelectedPlace};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};

use crate::error::ApplicationError;

/// Options of a place search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    /// Bias results toward this position
    pub proximity: Option<Coordinate>,
    /// Restrict results to this box
    pub bbox: Option<BoundingBox>,
    /// Maximum number of suggestions
    pub limit: u8,
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            proximity: None,
            bbox: None,
            limit: 5,
        }
    }
}

/// Port for geocoding operations
///
/// Provider failures are absorbed by the adapter: searches return an empty
/// list and reverse lookups a generic label.
#[cfg_attr(test, automock)]
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    /// Search places matching free text
    async fn search(&self, query: &str, request: &SearchRequest) -> Vec<PlaceSuggestion>;

    /// Confirm a suggestion, resolving its coordinate when needed
    async fn select(&self, suggestion: &PlaceSuggestion) -> Result<SelectedPlace, ApplicationError>;

    /// Best available label for a coordinate; never fails
    async fn reverse_lookup(&self, coordinate: Coordinate) -> String;
}
