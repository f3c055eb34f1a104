//! Integration tests for weather service using wiremock
//!
//! These tests verify the weather client's behavior against a mock HTTP server,
//! ensuring proper handling of various response scenarios.

use domain::{Coordinate, WeatherSeverity};
use integration_weather::{OpenMeteoClient, WeatherClient, WeatherConfig, WeatherError};
use wiremock::{
    Mock, MockServer, ResponseTemplate,
    matchers::{method, path, query_param},
};

/// Sample Open-Meteo API response with the given WMO code
fn sample_weather_response(weather_code: u8) -> serde_json::Value {
    serde_json::json!({
        "latitude": 3.848,
        "longitude": 11.5021,
        "generationtime_ms": 0.123,
        "utc_offset_seconds": 0,
        "timezone": "UTC",
        "timezone_abbreviation": "UTC",
        "elevation": 726.0,
        "current_units": {
            "time": "iso8601",
            "temperature_2m": "°C",
            "weather_code": "wmo code",
            "precipitation": "mm"
        },
        "current": {
            "time": "2026-03-14T15:00",
            "temperature_2m": 27.5,
            "weather_code": weather_code,
            "precipitation": 1.2
        }
    })
}

fn create_test_client(mock_server: &MockServer, cache_ttl_minutes: u32) -> OpenMeteoClient {
    let config = WeatherConfig {
        base_url: mock_server.uri(),
        cache_ttl_minutes,
        ..WeatherConfig::for_testing()
    };
    OpenMeteoClient::new(config).unwrap()
}

// ============================================================================
// Success scenarios
// ============================================================================

#[tokio::test]
async fn test_get_current_success() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .and(query_param("latitude", "3.848"))
        .and(query_param("longitude", "11.5021"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_weather_response(61)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 0);
    let conditions = client.get_current(Coordinate::yaounde()).await.unwrap();

    assert_eq!(conditions.weather_code, 61);
    assert_eq!(conditions.severity, WeatherSeverity::LightRain);
    assert!((conditions.temperature - 27.5).abs() < 0.1);
}

#[tokio::test]
async fn test_storm_code_maps_to_storm() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_weather_response(95)))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 0);
    assert_eq!(
        client.severity(Coordinate::yaounde()).await,
        WeatherSeverity::Storm
    );
}

#[tokio::test]
async fn test_cached_conditions_skip_network() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(sample_weather_response(3)))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 15);
    let first = client.get_current(Coordinate::yaounde()).await.unwrap();
    let nearby = Coordinate::new(11.5024, 3.8482).unwrap();
    let second = client.get_current(nearby).await.unwrap();

    assert_eq!(first, second);
}

// ============================================================================
// Failure scenarios
// ============================================================================

#[tokio::test]
async fn test_server_error_is_unavailable() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 0);
    let result = client.get_current(Coordinate::yaounde()).await;

    assert!(matches!(result, Err(WeatherError::ServiceUnavailable(_))));
    assert!(!client.is_healthy().await);
}

#[tokio::test]
async fn test_rate_limit() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(429))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 0);
    let result = client.get_current(Coordinate::yaounde()).await;

    assert!(matches!(result, Err(WeatherError::RateLimitExceeded)));
}

#[tokio::test]
async fn test_missing_current_block_is_parse_error() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({ "latitude": 3.848 })),
        )
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 0);
    let result = client.get_current(Coordinate::yaounde()).await;

    assert!(matches!(result, Err(WeatherError::ParseError(_))));
}

#[tokio::test]
async fn test_failure_defaults_to_clear_severity() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/forecast"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&mock_server)
        .await;

    let client = create_test_client(&mock_server, 0);
    assert_eq!(
        client.severity(Coordinate::douala()).await,
        WeatherSeverity::Clear
    );
}
