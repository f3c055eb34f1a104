//! Domain entities

mod isochrone;
mod marker;
mod place;
mod route;

pub use isochrone::IsochronePolygon;
pub use marker::{Marker, MarkerRole};
pub use place::{PlaceSource, PlaceSuggestion, SelectedPlace};
pub use route::RouteGeometry;
