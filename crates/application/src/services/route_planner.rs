//! Route planning
//!
//! Directions request followed by congestion segmentation. Provider
//! failures leave the caller without a route rather than with an error.

use std::sync::Arc;

use domain::{
    CongestionLevel, CongestionSegment, Coordinate, IsochronePolygon, Locale, RouteGeometry,
    WeatherSeverity, dominant_congestion, segment,
};
use serde::Serialize;
use tracing::{debug, instrument, warn};

use crate::ports::{DirectionsPort, WeatherPort};

/// A route ready to draw, with its traffic summary
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PlannedRoute {
    /// Route polyline and totals
    pub geometry: RouteGeometry,
    /// One colored segment per polyline edge
    pub segments: Vec<CongestionSegment>,
    /// Level carried by most segments
    pub dominant: CongestionLevel,
    /// One-line summary, e.g. `11 min · 3.3 km · Trafic fluide`
    pub summary: String,
    /// Weather at departure; clear when no weather provider is set
    pub weather: WeatherSeverity,
}

/// Plans routes through a directions provider
pub struct RoutePlanner {
    directions: Arc<dyn DirectionsPort>,
    weather: Option<Arc<dyn WeatherPort>>,
    locale: Locale,
}

impl std::fmt::Debug for RoutePlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RoutePlanner")
            .field("locale", &self.locale)
            .field("weather", &self.weather.is_some())
            .finish_non_exhaustive()
    }
}

impl RoutePlanner {
    /// Create a planner
    pub fn new(directions: Arc<dyn DirectionsPort>, locale: Locale) -> Self {
        Self {
            directions,
            weather: None,
            locale,
        }
    }

    /// Attach a weather provider
    #[must_use]
    pub fn with_weather(mut self, weather: Arc<dyn WeatherPort>) -> Self {
        self.weather = Some(weather);
        self
    }

    /// Route between two points, or `None` when the provider fails
    #[instrument(skip(self), fields(departure = %departure, arrival = %arrival))]
    pub async fn plan(&self, departure: Coordinate, arrival: Coordinate) -> Option<PlannedRoute> {
        let route = match self.directions.route(departure, arrival).await {
            Ok(route) => route,
            Err(e) => {
                warn!(error = %e, "Directions unavailable, no route drawn");
                return None;
            },
        };

        let segments = segment(route.geometry.coordinates(), &route.congestion);
        let dominant = dominant_congestion(&segments);
        let summary = format!(
            "{} min · {:.1} km · {}",
            route.geometry.duration_minutes(),
            route.geometry.distance_km(),
            dominant.label(self.locale)
        );
        let weather = match &self.weather {
            Some(provider) => provider.severity(departure).await,
            None => WeatherSeverity::default(),
        };
        debug!(segments = segments.len(), %dominant, %weather, "Route planned");

        Some(PlannedRoute {
            geometry: route.geometry,
            segments,
            dominant,
            summary,
            weather,
        })
    }

    /// Reachable area, or `None` when the provider fails
    #[instrument(skip(self))]
    pub async fn reachable_area(&self, center: Coordinate, minutes: u32) -> Option<IsochronePolygon> {
        match self.directions.isochrone(center, minutes).await {
            Ok(polygon) => Some(polygon),
            Err(e) => {
                warn!(error = %e, "Isochrone unavailable");
                None
            },
        }
    }
}
