//! Application services - Use case implementations

pub mod geolocation_service;
pub mod map_controller;
mod route_planner;
mod search_input;

pub use geolocation_service::{GeolocationConfig, GeolocationService, PositionWatch};
pub use map_controller::{
    CameraCommand, DashAnimation, LifecycleState, MapConfig, MapEvent, MapHandle,
    MapLifecycleController, RenderOutcome,
};
pub use route_planner::{PlannedRoute, RoutePlanner};
pub use search_input::{DebouncedSearch, SearchConfig, SearchState};
