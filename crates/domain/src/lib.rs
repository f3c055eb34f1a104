//! Domain layer for Farescope
//!
//! Contains the geospatial vocabulary shared by every other crate:
//! coordinates, places, markers, routes and their congestion segments.
//! This layer performs no I/O.

pub mod congestion;
pub mod entities;
pub mod errors;
pub mod value_objects;

pub use congestion::{CongestionLevel, CongestionSegment, dominant_congestion, segment};
pub use entities::*;
pub use errors::DomainError;
pub use value_objects::*;
