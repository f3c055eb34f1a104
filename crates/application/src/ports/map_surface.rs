//! Map rendering port
//!
//! The subset of a map SDK the lifecycle controller drives: map instances,
//! markers, GeoJSON sources, styled layers and camera moves. Calls are
//! synchronous, like the SDK calls they stand for.

use domain::{BoundingBox, Coordinate, Marker};
#[cfg(test)]
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Identifier of a map instance created by the surface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MapId(pub u64);

/// Identifier of a marker object on a map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MarkerId(pub u64);

/// Initial view of a new map
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MapOptions {
    /// Style URL
    pub style: String,
    /// Initial center
    pub center: Coordinate,
    /// Initial zoom
    pub zoom: f64,
}

/// Geometry type drawn by a layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LayerKind {
    /// Polyline
    Line,
    /// Filled polygon
    Fill,
}

/// A styled layer drawing one source
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LayerSpec {
    /// Layer id, unique per map
    pub id: String,
    /// Source the layer draws
    pub source: String,
    /// Geometry type
    pub kind: LayerKind,
    /// Paint properties (style expression values)
    pub paint: serde_json::Value,
    /// Layout properties
    pub layout: serde_json::Value,
}

/// Errors raised by the rendering surface
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MapSurfaceError {
    /// No map with this id exists (never created or destroyed)
    #[error("Unknown map: {0:?}")]
    UnknownMap(MapId),

    /// A source with this id already exists
    #[error("Source already exists: {0}")]
    DuplicateSource(String),

    /// The source is missing, or still referenced by a layer
    #[error("Source error: {0}")]
    Source(String),

    /// A layer with this id already exists
    #[error("Layer already exists: {0}")]
    DuplicateLayer(String),

    /// The layer is missing or references a missing source
    #[error("Layer error: {0}")]
    Layer(String),

    /// Any other renderer failure
    #[error("Renderer error: {0}")]
    Renderer(String),
}

/// Port for the map rendering SDK
#[cfg_attr(test, automock)]
pub trait MapSurface: Send + Sync {
    /// Create a map inside a container; the map reports readiness later
    fn create_map(&self, container: &str, options: &MapOptions) -> Result<MapId, MapSurfaceError>;

    /// Destroy a map and everything drawn on it
    fn destroy_map(&self, map: MapId);

    /// Add a marker object
    fn add_marker(&self, map: MapId, marker: &Marker) -> Result<MarkerId, MapSurfaceError>;

    /// Remove a marker object; unknown ids are ignored
    fn remove_marker(&self, map: MapId, marker: MarkerId);

    /// Add a GeoJSON source
    fn add_source(
        &self,
        map: MapId,
        id: &str,
        data: serde_json::Value,
    ) -> Result<(), MapSurfaceError>;

    /// Remove a source; fails while a layer still references it
    fn remove_source(&self, map: MapId, id: &str) -> Result<(), MapSurfaceError>;

    /// Whether a source exists
    fn has_source(&self, map: MapId, id: &str) -> bool;

    /// Add a layer; fails when its source is missing
    fn add_layer(&self, map: MapId, layer: &LayerSpec) -> Result<(), MapSurfaceError>;

    /// Remove a layer
    fn remove_layer(&self, map: MapId, id: &str) -> Result<(), MapSurfaceError>;

    /// Whether a layer exists
    fn has_layer(&self, map: MapId, id: &str) -> bool;

    /// Change one paint property of a layer
    fn set_paint_property(
        &self,
        map: MapId,
        layer: &str,
        name: &str,
        value: serde_json::Value,
    ) -> Result<(), MapSurfaceError>;

    /// Fit the viewport to a box
    fn fit_bounds(&self, map: MapId, bounds: BoundingBox, padding: f64, max_zoom: f64);

    /// Smoothly recenter
    fn ease_to(&self, map: MapId, center: Coordinate, zoom: Option<f64>);

    /// Animated flight to a position
    fn fly_to(&self, map: MapId, center: Coordinate, zoom: f64);
}
