//! Command implementations
//!
//! Each command wires the adapters it needs from [`AppConfig`] and prints
//! plain text on stdout; logs go to stderr.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, bail};
use application::{
    GeocodingPort, GeolocationService, MapEvent, MapLifecycleController, MapSurface,
    RenderOutcome, RoutePlanner, SearchRequest,
};
use domain::{Coordinate, Marker, MarkerRole, PlaceSource, SelectedPlace};
use infrastructure::{
    AppConfig, ConfiguredPositionSource, DirectionsAdapter, GeocodingAdapter, SceneMapSurface,
    WeatherAdapter,
};
use tracing::{debug, warn};

use crate::args::{looks_like_coordinate, parse_lat_lon};

const MAP_CONTAINER: &str = "farescope-map";

/// Adapters built on demand from configuration
#[derive(Debug)]
pub struct App {
    config: AppConfig,
}

impl App {
    pub const fn new(config: AppConfig) -> Self {
        Self { config }
    }

    fn geocoder(&self) -> anyhow::Result<Arc<GeocodingAdapter>> {
        let proximity = self
            .config
            .geocoding
            .proximity
            .and_then(|p| p.to_coordinate());
        let adapter = GeocodingAdapter::new(&self.config.to_geocoding_config())?
            .with_default_proximity(proximity);
        Ok(Arc::new(adapter))
    }

    fn weather_adapter(&self) -> anyhow::Result<WeatherAdapter> {
        Ok(WeatherAdapter::new(self.config.weather.to_weather_config())?)
    }

    fn planner(&self) -> anyhow::Result<RoutePlanner> {
        let directions = DirectionsAdapter::new(&self.config.to_directions_config())
            .context("routing needs mapbox.access_token")?;
        Ok(
            RoutePlanner::new(Arc::new(directions), self.config.geolocation.service.locale)
                .with_weather(Arc::new(self.weather_adapter()?)),
        )
    }

    fn geolocation(&self) -> anyhow::Result<GeolocationService> {
        let source = ConfiguredPositionSource::from_config(&self.config.geolocation);
        Ok(GeolocationService::new(
            Arc::new(source),
            self.geocoder()?,
            self.config.geolocation.service.clone(),
        ))
    }

    fn request(&self, near: Option<Coordinate>, limit: Option<u8>) -> SearchRequest {
        SearchRequest {
            proximity: near,
            bbox: None,
            limit: limit.unwrap_or(self.config.geocoding.limit),
        }
    }

    /// A typed coordinate, or the first suggestion for a place name
    async fn resolve(
        &self,
        geocoder: &GeocodingAdapter,
        input: &str,
    ) -> anyhow::Result<SelectedPlace> {
        if looks_like_coordinate(input) {
            let coordinate = parse_lat_lon(input)?;
            let label = geocoder.reverse_lookup(coordinate).await;
            return Ok(SelectedPlace::new(label, coordinate, PlaceSource::Shortcut));
        }

        let suggestions = geocoder.search(input, &self.request(None, Some(1))).await;
        let Some(first) = suggestions.first() else {
            bail!("no place found for \"{input}\"");
        };
        Ok(geocoder.select(first).await?)
    }

    pub async fn search(
        &self,
        query: &str,
        near: Option<Coordinate>,
        limit: Option<u8>,
        select: bool,
    ) -> anyhow::Result<()> {
        let geocoder = self.geocoder()?;
        let suggestions = geocoder.search(query, &self.request(near, limit)).await;
        if suggestions.is_empty() {
            println!("No places found for \"{query}\"");
            return Ok(());
        }

        for (i, s) in suggestions.iter().enumerate() {
            match s.coordinate {
                Some(c) => println!("{}. {} | {} | {c}", i + 1, s.display_label(), s.formatted_address),
                None => println!("{}. {} | {}", i + 1, s.display_label(), s.formatted_address),
            }
        }

        if select {
            let place = geocoder.select(&suggestions[0]).await?;
            println!("Selected: {} at {}", place.label, place.coordinate);
        }
        Ok(())
    }

    pub async fn reverse(&self, coordinate: Coordinate) -> anyhow::Result<()> {
        let label = self.geocoder()?.reverse_lookup(coordinate).await;
        println!("{label}");
        Ok(())
    }

    pub async fn weather(&self, coordinate: Coordinate) -> anyhow::Result<()> {
        match self.weather_adapter()?.current(coordinate).await {
            Ok(current) => {
                println!("{}", current.summary());
                println!("Severity: {}", current.severity);
            },
            Err(e) => {
                warn!(error = %e, "Weather unavailable");
                println!("Severity: {} (weather unavailable)", domain::WeatherSeverity::Clear);
            },
        }
        Ok(())
    }

    pub async fn route(
        &self,
        from: &str,
        to: &str,
        isochrone: Option<u32>,
        geojson: Option<&Path>,
    ) -> anyhow::Result<()> {
        let geocoder = self.geocoder()?;
        let departure = self.resolve(&geocoder, from).await?;
        let arrival = self.resolve(&geocoder, to).await?;
        println!("From: {} ({})", departure.label, departure.coordinate);
        println!("To:   {} ({})", arrival.label, arrival.coordinate);

        let planner = self.planner()?;
        let Some(route) = planner.plan(departure.coordinate, arrival.coordinate).await else {
            bail!("no route available between these places");
        };
        println!("{}", route.summary);
        println!("Weather at departure: {}", route.weather);

        let reachable = match isochrone {
            Some(minutes) => planner.reachable_area(departure.coordinate, minutes).await,
            None => None,
        };
        if let (Some(minutes), None) = (isochrone, &reachable) {
            println!("Reachable area within {minutes} min unavailable");
        }

        let surface = Arc::new(SceneMapSurface::new());
        let mut controller = MapLifecycleController::new(
            Arc::clone(&surface) as Arc<dyn MapSurface>,
            self.config.map.clone(),
        );
        let handle = controller.mount(MAP_CONTAINER, departure.coordinate, None)?;
        controller.handle_event(handle, MapEvent::Loaded);

        let outcomes = [
            controller.set_markers(
                handle,
                vec![
                    Marker::from_place(&departure, MarkerRole::Departure),
                    Marker::from_place(&arrival, MarkerRole::Arrival),
                ],
            ),
            controller.set_route(handle, Some(&route.segments)),
            controller.set_isochrone(handle, reachable.as_ref()),
        ];
        if outcomes.contains(&RenderOutcome::Failed) {
            warn!(?outcomes, "Part of the scene could not be drawn");
        }

        if let Some(path) = geojson {
            let scene = surface
                .scene_in(MAP_CONTAINER)
                .context("map scene missing")?;
            export(&scene.to_geojson(), path)?;
        }

        controller.unmount(handle);
        Ok(())
    }

    pub async fn locate(&self, watch: Option<usize>) -> anyhow::Result<()> {
        let service = self.geolocation()?;
        println!("Permission: {}", service.check_permission().await);

        let place = service.position_with_label().await?;
        println!("{} ({})", place.label, place.coordinate);

        if let Some(count) = watch {
            let idle = Duration::from_secs(service.config().timeout_secs);
            let mut updates = service.watch_position()?;
            for _ in 0..count {
                match tokio::time::timeout(idle, updates.next()).await {
                    Ok(Some(Ok(position))) => println!(
                        "{} ±{:.0} m at {}",
                        position.coordinate,
                        position.accuracy_m,
                        position.timestamp.format("%H:%M:%S")
                    ),
                    Ok(Some(Err(e))) => println!("{e}"),
                    Ok(None) => break,
                    Err(_) => {
                        println!("No movement for {}s, watch stopped", idle.as_secs());
                        break;
                    },
                }
            }
            updates.cancel();
        }
        Ok(())
    }
}

fn export(geojson: &serde_json::Value, path: &Path) -> anyhow::Result<()> {
    let text = serde_json::to_string_pretty(geojson)?;
    if path.as_os_str() == "-" {
        println!("{text}");
    } else {
        std::fs::write(path, text)
            .with_context(|| format!("failed to write {}", path.display()))?;
        debug!(path = %path.display(), "Scene exported");
    }
    Ok(())
}

/// Print configuration problems that do not prevent every command
pub fn report_problems(config: &AppConfig) {
    for problem in config.validate() {
        warn!(%problem, "Configuration problem");
    }
}
