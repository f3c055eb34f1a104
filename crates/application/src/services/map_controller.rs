//! Map lifecycle controller
//!
//! Owns one map instance per mounted container and keeps it in sync with
//! the latest markers, route and isochrone. Map instances live in an arena
//! and are addressed through [`MapHandle`]s returned by [`MapLifecycleController::mount`].
//!
//! Every redraw removes the previous objects before adding new ones. Render
//! failures are logged and leave the previous visual state in place.

mod animation;
pub mod layers;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use domain::{
    BoundingBox, CongestionSegment, Coordinate, GeolocationPermissionState, IsochronePolygon,
    Locale, Marker, MarkerRole,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, error, info, instrument, warn};

pub use animation::DashAnimation;

use crate::error::{ApplicationError, GeolocationError, GeolocationErrorCode};
use crate::ports::{MapId, MapOptions, MapSurface, MapSurfaceError, MarkerId, Position};
use crate::services::geolocation_service::GeolocationService;

/// Map rendering settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MapConfig {
    /// Style URL passed to the renderer
    #[serde(default = "default_style")]
    pub style: String,

    /// Zoom of a freshly mounted map
    #[serde(default = "default_zoom")]
    pub default_zoom: f64,

    /// Padding in pixels when fitting several markers
    #[serde(default = "default_fit_padding")]
    pub fit_padding: f64,

    /// Zoom ceiling when fitting several markers
    #[serde(default = "default_max_fit_zoom")]
    pub max_fit_zoom: f64,

    /// Zoom when flying to the device position
    #[serde(default = "default_user_zoom")]
    pub user_zoom: f64,

    /// Frame period of the route drawing animation, in milliseconds
    #[serde(default = "default_animation_frame_ms")]
    pub animation_frame_ms: u64,
}

fn default_style() -> String {
    "mapbox://styles/mapbox/streets-v12".to_string()
}

const fn default_zoom() -> f64 {
    12.0
}

const fn default_fit_padding() -> f64 {
    80.0
}

const fn default_max_fit_zoom() -> f64 {
    15.0
}

const fn default_user_zoom() -> f64 {
    16.0
}

const fn default_animation_frame_ms() -> u64 {
    50
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            style: default_style(),
            default_zoom: default_zoom(),
            fit_padding: default_fit_padding(),
            max_fit_zoom: default_max_fit_zoom(),
            user_zoom: default_user_zoom(),
            animation_frame_ms: default_animation_frame_ms(),
        }
    }
}

/// Lifecycle of a map instance
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleState {
    /// No map for this handle
    Uninitialized,
    /// Created, waiting for the renderer's load event
    Loading,
    /// Accepting draw calls
    Ready,
    /// Torn down; the handle is dead
    Destroyed,
}

/// Lifecycle callbacks from the renderer
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MapEvent {
    /// Style and sources finished loading
    Loaded,
    /// Renderer reported an error
    Error(String),
}

/// Result of a draw request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderOutcome {
    /// Drawn
    Applied,
    /// Stored until the map finishes loading
    Deferred,
    /// Dropped: unknown or destroyed map
    Skipped,
    /// A renderer call failed; logged
    Failed,
}

/// Last camera movement issued to a map
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum CameraCommand {
    /// Viewport fitted to a box
    FitBounds {
        bounds: BoundingBox,
        padding: f64,
        max_zoom: f64,
    },
    /// Smooth recenter
    EaseTo { center: Coordinate },
    /// Animated flight
    FlyTo { center: Coordinate, zoom: f64 },
}

/// Arena handle of a mounted map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapHandle {
    index: usize,
    generation: u64,
}

/// Inputs received while the map was still loading
#[derive(Debug, Default)]
struct PendingInputs {
    markers: Option<Vec<Marker>>,
    route: Option<Option<Vec<CongestionSegment>>>,
    isochrone: Option<Option<IsochronePolygon>>,
    user: Option<(Coordinate, String)>,
}

#[derive(Debug)]
struct MapInstance {
    container: String,
    map: MapId,
    state: LifecycleState,
    markers: Vec<MarkerId>,
    user_marker: Option<MarkerId>,
    animation: Option<DashAnimation>,
    camera: Option<CameraCommand>,
    pending: PendingInputs,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u64,
    instance: Option<MapInstance>,
}

/// Owner of every map instance and of what is drawn on them
pub struct MapLifecycleController {
    surface: Arc<dyn MapSurface>,
    config: MapConfig,
    slots: Vec<Slot>,
    containers: HashMap<String, MapHandle>,
}

impl std::fmt::Debug for MapLifecycleController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapLifecycleController")
            .field("config", &self.config)
            .field("containers", &self.containers)
            .finish_non_exhaustive()
    }
}

fn user_marker_label(locale: Locale) -> &'static str {
    match locale {
        Locale::Fr => "Vous êtes ici",
        Locale::En => "You are here",
    }
}

impl MapLifecycleController {
    /// Create a controller drawing on `surface`
    pub fn new(surface: Arc<dyn MapSurface>, config: MapConfig) -> Self {
        Self {
            surface,
            config,
            slots: Vec::new(),
            containers: HashMap::new(),
        }
    }

    fn instance(&self, handle: MapHandle) -> Option<&MapInstance> {
        self.slots
            .get(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.instance.as_ref())
    }

    fn instance_mut(&mut self, handle: MapHandle) -> Option<&mut MapInstance> {
        self.slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
            .and_then(|slot| slot.instance.as_mut())
    }

    /// Create the map for a container
    ///
    /// Mounting a container that already has a map returns the existing
    /// handle without touching the renderer.
    #[instrument(skip(self))]
    pub fn mount(
        &mut self,
        container: &str,
        center: Coordinate,
        zoom: Option<f64>,
    ) -> Result<MapHandle, ApplicationError> {
        if let Some(&handle) = self.containers.get(container) {
            if self.instance(handle).is_some() {
                debug!(container, "Map already mounted");
                return Ok(handle);
            }
        }

        let options = MapOptions {
            style: self.config.style.clone(),
            center,
            zoom: zoom.unwrap_or(self.config.default_zoom),
        };
        let map = self.surface.create_map(container, &options)?;

        let instance = MapInstance {
            container: container.to_string(),
            map,
            state: LifecycleState::Loading,
            markers: Vec::new(),
            user_marker: None,
            animation: None,
            camera: None,
            pending: PendingInputs::default(),
        };

        let index = match self.slots.iter().position(|slot| slot.instance.is_none()) {
            Some(index) => index,
            None => {
                self.slots.push(Slot::default());
                self.slots.len() - 1
            },
        };
        let slot = &mut self.slots[index];
        slot.instance = Some(instance);
        let handle = MapHandle {
            index,
            generation: slot.generation,
        };

        self.containers.insert(container.to_string(), handle);
        info!(container, map = map.0, "Map mounted");
        Ok(handle)
    }

    /// Destroy a map; the handle is dead afterwards
    #[instrument(skip(self))]
    pub fn unmount(&mut self, handle: MapHandle) {
        let Some(slot) = self
            .slots
            .get_mut(handle.index)
            .filter(|slot| slot.generation == handle.generation)
        else {
            return;
        };
        let Some(mut instance) = slot.instance.take() else {
            return;
        };
        slot.generation += 1;

        instance.state = LifecycleState::Destroyed;
        if let Some(animation) = instance.animation.take() {
            animation.stop();
        }
        self.surface.destroy_map(instance.map);
        self.containers.remove(&instance.container);
        info!(container = %instance.container, map = instance.map.0, "Map unmounted");
    }

    /// Lifecycle state of a handle
    pub fn state(&self, handle: MapHandle) -> LifecycleState {
        match self.slots.get(handle.index) {
            None => LifecycleState::Uninitialized,
            Some(_) => self
                .instance(handle)
                .map_or(LifecycleState::Destroyed, |i| i.state),
        }
    }

    /// Handle of the map mounted in a container
    pub fn handle_for(&self, container: &str) -> Option<MapHandle> {
        self.containers.get(container).copied()
    }

    /// Last camera movement issued to a map
    pub fn camera(&self, handle: MapHandle) -> Option<CameraCommand> {
        self.instance(handle).and_then(|i| i.camera)
    }

    /// Number of list markers currently drawn
    pub fn marker_count(&self, handle: MapHandle) -> usize {
        self.instance(handle).map_or(0, |i| i.markers.len())
    }

    /// Whether the route drawing animation is running
    pub fn is_animating(&self, handle: MapHandle) -> bool {
        self.instance(handle)
            .and_then(|i| i.animation.as_ref())
            .is_some_and(DashAnimation::is_running)
    }

    /// Feed a renderer lifecycle callback
    ///
    /// On `Loaded`, inputs received while loading are drawn.
    #[instrument(skip(self))]
    pub fn handle_event(&mut self, handle: MapHandle, event: MapEvent) -> LifecycleState {
        let Some(instance) = self.instance_mut(handle) else {
            return LifecycleState::Destroyed;
        };

        match event {
            MapEvent::Loaded => {
                if instance.state != LifecycleState::Loading {
                    return instance.state;
                }
                instance.state = LifecycleState::Ready;
                let pending = std::mem::take(&mut instance.pending);
                debug!(map = instance.map.0, "Map ready, applying pending inputs");

                if let Some(markers) = pending.markers {
                    self.set_markers(handle, markers);
                }
                if let Some(route) = pending.route {
                    self.set_route(handle, route.as_deref());
                }
                if let Some(isochrone) = pending.isochrone {
                    self.set_isochrone(handle, isochrone.as_ref());
                }
                if let Some((coordinate, label)) = pending.user {
                    self.show_user(handle, coordinate, &label);
                }
                LifecycleState::Ready
            },
            MapEvent::Error(message) => {
                error!(map = instance.map.0, error = %message, "Renderer error");
                instance.state
            },
        }
    }

    /// Replace every list marker
    ///
    /// Several markers fit the viewport; a single marker recenters on it.
    #[instrument(skip(self, markers), fields(count = markers.len()))]
    pub fn set_markers(&mut self, handle: MapHandle, markers: Vec<Marker>) -> RenderOutcome {
        let config = self.config.clone();
        let surface = Arc::clone(&self.surface);
        let Some(instance) = self.instance_mut(handle) else {
            return RenderOutcome::Skipped;
        };
        if instance.state == LifecycleState::Loading {
            instance.pending.markers = Some(markers);
            return RenderOutcome::Deferred;
        }

        let map = instance.map;
        for id in instance.markers.drain(..) {
            surface.remove_marker(map, id);
        }

        let mut outcome = RenderOutcome::Applied;
        for marker in &markers {
            match surface.add_marker(map, marker) {
                Ok(id) => instance.markers.push(id),
                Err(e) => {
                    error!(map = map.0, role = ?marker.role, error = %e, "Failed to add marker");
                    outcome = RenderOutcome::Failed;
                },
            }
        }

        let coordinates: Vec<Coordinate> = markers.iter().map(|m| m.coordinate).collect();
        match coordinates.as_slice() {
            [] => {},
            [single] => {
                surface.ease_to(map, *single, None);
                instance.camera = Some(CameraCommand::EaseTo { center: *single });
            },
            many => {
                if let Some(bounds) = BoundingBox::enclosing(many) {
                    surface.fit_bounds(map, bounds, config.fit_padding, config.max_fit_zoom);
                    instance.camera = Some(CameraCommand::FitBounds {
                        bounds,
                        padding: config.fit_padding,
                        max_zoom: config.max_fit_zoom,
                    });
                }
            },
        }

        outcome
    }

    /// Replace the route; `None` or an empty slice clears it
    ///
    /// The animation is stopped first, then the route layers are removed
    /// before their source.
    #[instrument(skip(self, segments), fields(segments = segments.map_or(0, <[_]>::len)))]
    pub fn set_route(
        &mut self,
        handle: MapHandle,
        segments: Option<&[CongestionSegment]>,
    ) -> RenderOutcome {
        let frame = Duration::from_millis(self.config.animation_frame_ms);
        let surface = Arc::clone(&self.surface);
        let Some(instance) = self.instance_mut(handle) else {
            return RenderOutcome::Skipped;
        };
        if instance.state == LifecycleState::Loading {
            instance.pending.route = Some(segments.map(<[_]>::to_vec));
            return RenderOutcome::Deferred;
        }

        if let Some(animation) = instance.animation.take() {
            animation.stop();
        }

        let map = instance.map;
        if let Err(e) = clear_source(surface.as_ref(), map, layers::ROUTE_SOURCE, &layers::ROUTE_LAYERS)
        {
            error!(map = map.0, error = %e, "Failed to remove previous route");
            return RenderOutcome::Failed;
        }

        let Some(segments) = segments.filter(|s| !s.is_empty()) else {
            return RenderOutcome::Applied;
        };

        let drawn = surface
            .add_source(map, layers::ROUTE_SOURCE, layers::route_feature_collection(segments))
            .and_then(|()| surface.add_layer(map, &layers::route_outline_layer()))
            .and_then(|()| surface.add_layer(map, &layers::route_line_layer()));
        if let Err(e) = drawn {
            error!(map = map.0, error = %e, "Failed to draw route");
            discard_partial(surface.as_ref(), map, layers::ROUTE_SOURCE, &layers::ROUTE_LAYERS);
            return RenderOutcome::Failed;
        }

        instance.animation = DashAnimation::start(Arc::clone(&surface), map, frame);
        debug!(map = map.0, "Route drawn");
        RenderOutcome::Applied
    }

    /// Replace the isochrone; `None` clears it
    #[instrument(skip(self, polygon))]
    pub fn set_isochrone(
        &mut self,
        handle: MapHandle,
        polygon: Option<&IsochronePolygon>,
    ) -> RenderOutcome {
        let surface = Arc::clone(&self.surface);
        let Some(instance) = self.instance_mut(handle) else {
            return RenderOutcome::Skipped;
        };
        if instance.state == LifecycleState::Loading {
            instance.pending.isochrone = Some(polygon.cloned());
            return RenderOutcome::Deferred;
        }

        let map = instance.map;
        if let Err(e) = clear_source(
            surface.as_ref(),
            map,
            layers::ISOCHRONE_SOURCE,
            &layers::ISOCHRONE_LAYERS,
        ) {
            error!(map = map.0, error = %e, "Failed to remove previous isochrone");
            return RenderOutcome::Failed;
        }

        let Some(polygon) = polygon else {
            return RenderOutcome::Applied;
        };

        let drawn = surface
            .add_source(map, layers::ISOCHRONE_SOURCE, layers::isochrone_feature(polygon))
            .and_then(|()| surface.add_layer(map, &layers::isochrone_fill_layer()))
            .and_then(|()| surface.add_layer(map, &layers::isochrone_outline_layer()));
        match drawn {
            Ok(()) => RenderOutcome::Applied,
            Err(e) => {
                error!(map = map.0, error = %e, "Failed to draw isochrone");
                discard_partial(
                    surface.as_ref(),
                    map,
                    layers::ISOCHRONE_SOURCE,
                    &layers::ISOCHRONE_LAYERS,
                );
                RenderOutcome::Failed
            },
        }
    }

    /// Locate the device and show it on the map
    ///
    /// A denied permission is reported without requesting a position, so
    /// no prompt is shown. Otherwise one high-accuracy fix is requested,
    /// the single user marker is replaced and the camera flies to it.
    #[instrument(skip(self, geolocation))]
    pub async fn locate_user(
        &mut self,
        handle: MapHandle,
        geolocation: &GeolocationService,
    ) -> Result<Position, GeolocationError> {
        let locale = geolocation.locale();
        match geolocation.check_permission().await {
            GeolocationPermissionState::Denied => {
                warn!("Location permission denied, settings change required");
                return Err(GeolocationError::new(
                    GeolocationErrorCode::PermissionDenied,
                    locale,
                ));
            },
            GeolocationPermissionState::Unsupported => {
                return Err(GeolocationError::new(
                    GeolocationErrorCode::Unsupported,
                    locale,
                ));
            },
            GeolocationPermissionState::Granted | GeolocationPermissionState::Prompt => {},
        }

        let options = crate::ports::PositionOptions {
            enable_high_accuracy: true,
            ..geolocation.config().position_options()
        };
        let position = geolocation.get_position_with(options).await?;
        self.show_user(handle, position.coordinate, user_marker_label(locale));
        Ok(position)
    }

    fn show_user(
        &mut self,
        handle: MapHandle,
        coordinate: Coordinate,
        label: &str,
    ) -> RenderOutcome {
        let zoom = self.config.user_zoom;
        let surface = Arc::clone(&self.surface);
        let Some(instance) = self.instance_mut(handle) else {
            return RenderOutcome::Skipped;
        };
        if instance.state == LifecycleState::Loading {
            instance.pending.user = Some((coordinate, label.to_string()));
            return RenderOutcome::Deferred;
        }

        let map = instance.map;
        if let Some(previous) = instance.user_marker.take() {
            surface.remove_marker(map, previous);
        }

        let marker = Marker::new(coordinate, MarkerRole::User, label);
        let outcome = match surface.add_marker(map, &marker) {
            Ok(id) => {
                instance.user_marker = Some(id);
                RenderOutcome::Applied
            },
            Err(e) => {
                error!(map = map.0, error = %e, "Failed to add user marker");
                RenderOutcome::Failed
            },
        };

        surface.fly_to(map, coordinate, zoom);
        instance.camera = Some(CameraCommand::FlyTo {
            center: coordinate,
            zoom,
        });
        outcome
    }
}

/// Remove a source and its layers, layers first
fn clear_source(
    surface: &dyn MapSurface,
    map: MapId,
    source: &str,
    layer_ids: &[&str],
) -> Result<(), MapSurfaceError> {
    for layer in layer_ids {
        if surface.has_layer(map, layer) {
            surface.remove_layer(map, layer)?;
        }
    }
    if surface.has_source(map, source) {
        surface.remove_source(map, source)?;
    }
    Ok(())
}

/// Remove whatever a failed draw left behind so no half-drawn layer stays
fn discard_partial(surface: &dyn MapSurface, map: MapId, source: &str, layer_ids: &[&str]) {
    if let Err(e) = clear_source(surface, map, source, layer_ids) {
        error!(map = map.0, source, error = %e, "Failed to discard partial draw");
    }
}
