//! Directions response models

use domain::{CongestionLevel, Coordinate, RouteGeometry};
use serde::Deserialize;

use crate::error::DirectionsError;

/// A route returned by the directions provider
#[derive(Debug, Clone, PartialEq)]
pub struct DirectionsRoute {
    /// Route polyline with totals
    pub geometry: RouteGeometry,
    /// One congestion level per segment; empty when the provider has no traffic data
    pub congestion: Vec<CongestionLevel>,
}

/// Directions API response structures
pub(crate) mod api {
    use super::Deserialize;

    #[derive(Debug, Deserialize)]
    pub struct DirectionsResponse {
        pub code: String,
        #[serde(default)]
        pub message: Option<String>,
        #[serde(default)]
        pub routes: Vec<Route>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Route {
        pub geometry: LineString,
        #[serde(default)]
        pub distance: f64,
        #[serde(default)]
        pub duration: f64,
        #[serde(default)]
        pub legs: Vec<Leg>,
    }

    #[derive(Debug, Deserialize)]
    pub struct LineString {
        pub coordinates: Vec<[f64; 2]>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Leg {
        #[serde(default)]
        pub annotation: Option<Annotation>,
    }

    #[derive(Debug, Deserialize)]
    pub struct Annotation {
        #[serde(default)]
        pub congestion: Vec<String>,
    }

    #[derive(Debug, Deserialize)]
    pub struct IsochroneResponse {
        #[serde(default)]
        pub features: Vec<IsochroneFeature>,
    }

    #[derive(Debug, Deserialize)]
    pub struct IsochroneFeature {
        pub geometry: PolygonGeometry,
    }

    #[derive(Debug, Deserialize)]
    pub struct PolygonGeometry {
        pub coordinates: Vec<Vec<[f64; 2]>>,
    }
}

/// Convert raw `[lon, lat]` pairs, rejecting out-of-range positions
pub(crate) fn to_coordinates(raw: &[[f64; 2]]) -> Result<Vec<Coordinate>, DirectionsError> {
    raw.iter()
        .map(|[lon, lat]| {
            Coordinate::new(*lon, *lat).map_err(|e| DirectionsError::ParseError(e.to_string()))
        })
        .collect()
}

impl DirectionsRoute {
    /// Build from the first route of a directions response
    pub(crate) fn from_api(response: api::DirectionsResponse) -> Result<Self, DirectionsError> {
        if response.code != "Ok" {
            return Err(DirectionsError::NoRoute(
                response.message.unwrap_or(response.code),
            ));
        }

        let route = response
            .routes
            .into_iter()
            .next()
            .ok_or_else(|| DirectionsError::NoRoute("empty route list".to_string()))?;

        let coordinates = to_coordinates(&route.geometry.coordinates)?;
        let geometry = RouteGeometry::new(coordinates, route.distance, route.duration)
            .map_err(|e| DirectionsError::ParseError(e.to_string()))?;

        let congestion = route
            .legs
            .into_iter()
            .next()
            .and_then(|leg| leg.annotation)
            .map(|a| {
                a.congestion
                    .iter()
                    .map(String::as_str)
                    .map(CongestionLevel::from_annotation)
                    .collect()
            })
            .unwrap_or_default();

        Ok(Self {
            geometry,
            congestion,
        })
    }
}
