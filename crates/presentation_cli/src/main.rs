//! Farescope CLI
//!
//! Place search, routing with live traffic, weather and device location
//! from the terminal.

#![allow(clippy::print_stdout)]

mod args;
mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use infrastructure::{AppConfig, init_logging};

use crate::args::{log_filter_from_verbosity, parse_lat_lon};
use crate::commands::{App, report_problems};

/// Farescope CLI
#[derive(Parser)]
#[command(name = "farescope-cli")]
#[command(author, version, about = "Trip planning with live traffic and weather", long_about = None)]
struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Configuration file; missing files fall back to defaults
    #[arg(short, long, default_value = "config.toml", env = "FARESCOPE_CONFIG")]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Search for places
    ///
    /// Example: farescope-cli search "Marché Mokolo" --near 3.848,11.502
    Search {
        /// Free-text query
        query: String,

        /// Bias results toward this point (lat,lon)
        #[arg(long, value_parser = parse_lat_lon)]
        near: Option<domain::Coordinate>,

        /// Maximum number of suggestions
        #[arg(short, long)]
        limit: Option<u8>,

        /// Resolve the first suggestion to a confirmed place
        #[arg(long)]
        select: bool,
    },

    /// Label for a position (lat,lon)
    Reverse {
        #[arg(value_parser = parse_lat_lon, allow_hyphen_values = true)]
        coordinate: domain::Coordinate,
    },

    /// Plan a route with traffic and departure weather
    ///
    /// Endpoints are "lat,lon" or a place name resolved through search.
    /// Example: farescope-cli route "Poste Centrale" 3.8667,11.5167 --isochrone 15
    Route {
        /// Departure
        from: String,

        /// Arrival
        to: String,

        /// Also draw the area reachable from the departure within MINUTES
        #[arg(long, value_name = "MINUTES")]
        isochrone: Option<u32>,

        /// Write the drawn scene as GeoJSON ("-" for stdout)
        #[arg(long, value_name = "PATH")]
        geojson: Option<PathBuf>,
    },

    /// Current weather at a position (lat,lon)
    Weather {
        #[arg(value_parser = parse_lat_lon, allow_hyphen_values = true)]
        coordinate: domain::Coordinate,
    },

    /// Locate this device and label its position
    Locate {
        /// Follow the position for N updates
        #[arg(long, value_name = "N")]
        watch: Option<usize>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load_from(&cli.config)?;
    let logging = if cli.verbose > 0 {
        config
            .logging
            .clone()
            .with_filter(log_filter_from_verbosity(cli.verbose))
    } else {
        config.logging.clone()
    };
    init_logging(&logging)?;
    report_problems(&config);

    let app = App::new(config);
    match cli.command {
        Commands::Search {
            query,
            near,
            limit,
            select,
        } => app.search(&query, near, limit, select).await,

        Commands::Reverse { coordinate } => app.reverse(coordinate).await,

        Commands::Route {
            from,
            to,
            isochrone,
            geojson,
        } => app.route(&from, &to, isochrone, geojson.as_deref()).await,

        Commands::Weather { coordinate } => app.weather(coordinate).await,

        Commands::Locate { watch } => app.locate(watch).await,
    }
}
