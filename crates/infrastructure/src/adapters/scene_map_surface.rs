//! In-memory map surface
//!
//! Keeps a scene graph per map (markers, GeoJSON sources, styled layers and
//! camera) with the same ordering rules as a map SDK: a layer needs its
//! source, a source cannot go while a layer still draws it. Used by the CLI
//! and tests, and exportable as a GeoJSON `FeatureCollection`.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicU64, Ordering};

use application::{LayerSpec, MapId, MapOptions, MapSurface, MapSurfaceError, MarkerId};
use domain::{BoundingBox, Coordinate, Marker};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, trace};

/// Current viewport of a scene
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Camera {
    /// Viewport center
    pub center: Coordinate,
    /// Zoom level
    pub zoom: f64,
    /// Box of the last fit, cleared by later moves
    pub bounds: Option<BoundingBox>,
}

/// Everything drawn on one map
#[derive(Debug, Clone, Serialize)]
pub struct Scene {
    /// Container the map was created in
    pub container: String,
    /// Style URL
    pub style: String,
    /// Markers by id, in creation order
    pub markers: BTreeMap<u64, Marker>,
    /// GeoJSON sources by id
    pub sources: BTreeMap<String, Value>,
    /// Layers, bottom first
    pub layers: Vec<LayerSpec>,
    /// Viewport
    pub camera: Camera,
}

impl Scene {
    fn layer_mut(&mut self, id: &str) -> Option<&mut LayerSpec> {
        self.layers.iter_mut().find(|l| l.id == id)
    }

    /// Layer ids, bottom first
    #[must_use]
    pub fn layer_ids(&self) -> Vec<&str> {
        self.layers.iter().map(|l| l.id.as_str()).collect()
    }

    /// Markers plus every source feature as one `FeatureCollection`
    ///
    /// Source features carry a `source` property; the layer stack and camera
    /// are kept as foreign members.
    #[must_use]
    pub fn to_geojson(&self) -> Value {
        let markers = self.markers.values().map(|m| {
            json!({
                "type": "Feature",
                "properties": {
                    "kind": "marker",
                    "role": m.role,
                    "label": m.label,
                    "color": m.color,
                },
                "geometry": { "type": "Point", "coordinates": m.coordinate },
            })
        });

        let sourced = self.sources.iter().flat_map(|(id, data)| {
            let features = match data.get("type").and_then(Value::as_str) {
                Some("FeatureCollection") => data["features"].as_array().cloned().unwrap_or_default(),
                Some("Feature") => vec![data.clone()],
                _ => Vec::new(),
            };
            features.into_iter().map(move |mut feature| {
                if let Some(props) = feature
                    .as_object_mut()
                    .map(|f| f.entry("properties").or_insert_with(|| json!({})))
                    .and_then(Value::as_object_mut)
                {
                    props.insert("source".to_string(), json!(id));
                }
                feature
            })
        });

        json!({
            "type": "FeatureCollection",
            "features": markers.chain(sourced).collect::<Vec<_>>(),
            "layers": self.layer_ids(),
            "camera": self.camera,
        })
    }
}

/// Scene-graph implementation of [`MapSurface`]
#[derive(Debug, Default)]
pub struct SceneMapSurface {
    next_id: AtomicU64,
    maps: RwLock<HashMap<MapId, Scene>>,
}

impl SceneMapSurface {
    /// Create an empty surface
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn next(&self) -> u64 {
        self.next_id.fetch_add(1, Ordering::Relaxed) + 1
    }

    /// Snapshot of a live map's scene
    #[must_use]
    pub fn scene(&self, map: MapId) -> Option<Scene> {
        self.maps.read().get(&map).cloned()
    }

    /// Snapshot of the live map mounted in `container`
    #[must_use]
    pub fn scene_in(&self, container: &str) -> Option<Scene> {
        self.maps
            .read()
            .values()
            .find(|scene| scene.container == container)
            .cloned()
    }

    /// Number of live maps
    #[must_use]
    pub fn map_count(&self) -> usize {
        self.maps.read().len()
    }

    /// GeoJSON export of a live map
    #[must_use]
    pub fn to_geojson(&self, map: MapId) -> Option<Value> {
        self.maps.read().get(&map).map(Scene::to_geojson)
    }

    fn with_scene<T>(
        &self,
        map: MapId,
        f: impl FnOnce(&mut Scene) -> Result<T, MapSurfaceError>,
    ) -> Result<T, MapSurfaceError> {
        let mut maps = self.maps.write();
        let scene = maps.get_mut(&map).ok_or(MapSurfaceError::UnknownMap(map))?;
        f(scene)
    }

    fn move_camera(&self, map: MapId, f: impl FnOnce(&mut Camera)) {
        if let Some(scene) = self.maps.write().get_mut(&map) {
            f(&mut scene.camera);
            trace!(map = map.0, center = %scene.camera.center, zoom = scene.camera.zoom, "Camera moved");
        }
    }
}

impl MapSurface for SceneMapSurface {
    fn create_map(&self, container: &str, options: &MapOptions) -> Result<MapId, MapSurfaceError> {
        let id = MapId(self.next());
        self.maps.write().insert(
            id,
            Scene {
                container: container.to_string(),
                style: options.style.clone(),
                markers: BTreeMap::new(),
                sources: BTreeMap::new(),
                layers: Vec::new(),
                camera: Camera {
                    center: options.center,
                    zoom: options.zoom,
                    bounds: None,
                },
            },
        );
        debug!(map = id.0, container, "Map created");
        Ok(id)
    }

    fn destroy_map(&self, map: MapId) {
        if self.maps.write().remove(&map).is_some() {
            debug!(map = map.0, "Map destroyed");
        }
    }

    fn add_marker(&self, map: MapId, marker: &Marker) -> Result<MarkerId, MapSurfaceError> {
        let id = self.next();
        self.with_scene(map, |scene| {
            scene.markers.insert(id, marker.clone());
            Ok(MarkerId(id))
        })
    }

    fn remove_marker(&self, map: MapId, marker: MarkerId) {
        if let Some(scene) = self.maps.write().get_mut(&map) {
            scene.markers.remove(&marker.0);
        }
    }

    fn add_source(&self, map: MapId, id: &str, data: Value) -> Result<(), MapSurfaceError> {
        self.with_scene(map, |scene| {
            if scene.sources.contains_key(id) {
                return Err(MapSurfaceError::DuplicateSource(id.to_string()));
            }
            scene.sources.insert(id.to_string(), data);
            Ok(())
        })
    }

    fn remove_source(&self, map: MapId, id: &str) -> Result<(), MapSurfaceError> {
        self.with_scene(map, |scene| {
            if let Some(layer) = scene.layers.iter().find(|l| l.source == id) {
                return Err(MapSurfaceError::Source(format!(
                    "source '{id}' is still used by layer '{}'",
                    layer.id
                )));
            }
            scene
                .sources
                .remove(id)
                .map(|_| ())
                .ok_or_else(|| MapSurfaceError::Source(format!("no source '{id}'")))
        })
    }

    fn has_source(&self, map: MapId, id: &str) -> bool {
        self.maps
            .read()
            .get(&map)
            .is_some_and(|scene| scene.sources.contains_key(id))
    }

    fn add_layer(&self, map: MapId, layer: &LayerSpec) -> Result<(), MapSurfaceError> {
        self.with_scene(map, |scene| {
            if scene.layers.iter().any(|l| l.id == layer.id) {
                return Err(MapSurfaceError::DuplicateLayer(layer.id.clone()));
            }
            if !scene.sources.contains_key(&layer.source) {
                return Err(MapSurfaceError::Layer(format!(
                    "layer '{}' references missing source '{}'",
                    layer.id, layer.source
                )));
            }
            scene.layers.push(layer.clone());
            Ok(())
        })
    }

    fn remove_layer(&self, map: MapId, id: &str) -> Result<(), MapSurfaceError> {
        self.with_scene(map, |scene| {
            let before = scene.layers.len();
            scene.layers.retain(|l| l.id != id);
            if scene.layers.len() == before {
                return Err(MapSurfaceError::Layer(format!("no layer '{id}'")));
            }
            Ok(())
        })
    }

    fn has_layer(&self, map: MapId, id: &str) -> bool {
        self.maps
            .read()
            .get(&map)
            .is_some_and(|scene| scene.layers.iter().any(|l| l.id == id))
    }

    fn set_paint_property(
        &self,
        map: MapId,
        layer: &str,
        name: &str,
        value: Value,
    ) -> Result<(), MapSurfaceError> {
        self.with_scene(map, |scene| {
            let target = scene
                .layer_mut(layer)
                .ok_or_else(|| MapSurfaceError::Layer(format!("no layer '{layer}'")))?;
            if !target.paint.is_object() {
                target.paint = json!({});
            }
            target.paint[name] = value;
            Ok(())
        })
    }

    fn fit_bounds(&self, map: MapId, bounds: BoundingBox, _padding: f64, max_zoom: f64) {
        self.move_camera(map, |camera| {
            camera.center = bounds.center();
            camera.zoom = max_zoom;
            camera.bounds = Some(bounds);
        });
    }

    fn ease_to(&self, map: MapId, center: Coordinate, zoom: Option<f64>) {
        self.move_camera(map, |camera| {
            camera.center = center;
            if let Some(zoom) = zoom {
                camera.zoom = zoom;
            }
            camera.bounds = None;
        });
    }

    fn fly_to(&self, map: MapId, center: Coordinate, zoom: f64) {
        self.move_camera(map, |camera| {
            camera.center = center;
            camera.zoom = zoom;
            camera.bounds = None;
        });
    }
}
