//! Argument parsing helpers

use anyhow::{Context, bail};
use domain::Coordinate;

/// Parse `"lat,lon"` (the order people type coordinates in)
pub fn parse_lat_lon(input: &str) -> anyhow::Result<Coordinate> {
    let Some((lat, lon)) = input.split_once(',') else {
        bail!("expected \"latitude,longitude\", got \"{input}\"");
    };
    let lat: f64 = lat.trim().parse().context("invalid latitude")?;
    let lon: f64 = lon.trim().parse().context("invalid longitude")?;
    Ok(Coordinate::from_lat_lon(lat, lon)?)
}

/// Whether the input looks like a coordinate rather than a place name
pub fn looks_like_coordinate(input: &str) -> bool {
    input
        .split_once(',')
        .is_some_and(|(a, b)| a.trim().parse::<f64>().is_ok() && b.trim().parse::<f64>().is_ok())
}

/// Determine log filter level from verbosity count
pub const fn log_filter_from_verbosity(verbose: u8) -> &'static str {
    match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_lat_lon_order() {
        let c = parse_lat_lon("3.848, 11.5021").unwrap();
        assert_eq!(c, Coordinate::yaounde());
    }

    #[test]
    fn rejects_out_of_range() {
        assert!(parse_lat_lon("95.0,11.5").is_err());
        assert!(parse_lat_lon("3.8").is_err());
        assert!(parse_lat_lon("north,east").is_err());
    }

    #[test]
    fn coordinate_detection() {
        assert!(looks_like_coordinate("4.0511,9.7679"));
        assert!(!looks_like_coordinate("Akwa, Douala"));
        assert!(!looks_like_coordinate("Poste Centrale"));
    }

    #[test]
    fn log_filter_verbosity() {
        assert_eq!(log_filter_from_verbosity(0), "warn");
        assert_eq!(log_filter_from_verbosity(1), "info");
        assert_eq!(log_filter_from_verbosity(2), "debug");
        assert_eq!(log_filter_from_verbosity(7), "trace");
    }
}
