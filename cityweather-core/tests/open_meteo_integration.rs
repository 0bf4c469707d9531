//! Integration tests for the HTTP clients using wiremock.

use std::sync::Arc;

use cityweather_core::{
    Config, Coordinates, WeatherError,
    config::Endpoints,
    error::Service,
    model::{ForecastRequest, TimezoneHint},
    provider::{NoPlatformLocation, Services},
};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn services_for(server: &MockServer) -> Services {
    let config = Config { endpoints: Endpoints::with_base(&server.uri()), ..Default::default() };
    Services::from_config(&config, Arc::new(NoPlatformLocation)).unwrap()
}

fn forecast(tz: &str, abbreviation: &str, temperature: f64, code: i32) -> serde_json::Value {
    serde_json::json!({
        "latitude": 52.52,
        "longitude": 13.41,
        "timezone": tz,
        "timezone_abbreviation": abbreviation,
        "current_weather": {
            "temperature": temperature,
            "windspeed": 11.2,
            "winddirection": 250,
            "weathercode": code,
            "time": "2024-01-15T12:00"
        }
    })
}

#[tokio::test]
async fn test_search_returns_all_candidates() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .and(query_param("name", "london"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [
                {"name": "London", "country": "United Kingdom", "admin1": "England",
                 "latitude": 51.50853, "longitude": -0.12574, "timezone": "Europe/London"},
                {"name": "London", "country": "Canada", "admin1": "Ontario",
                 "latitude": 42.98339, "longitude": -81.23304, "timezone": "America/Toronto"}
            ],
            "generationtime_ms": 0.9
        })))
        .mount(&server)
        .await;

    let services = services_for(&server);
    let found = services.geocoder.search("london").await.unwrap();

    assert_eq!(found.len(), 2);
    assert_eq!(found[0].country_name, "United Kingdom");
    assert_eq!(found[1].admin_name, "Ontario");
    assert_eq!(found[1].timezone_id, "America/Toronto");
}

#[tokio::test]
async fn test_search_without_results_is_empty() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(serde_json::json!({"generationtime_ms": 0.3})),
        )
        .mount(&server)
        .await;

    let found = services_for(&server).geocoder.search("atlantis").await.unwrap();
    assert!(found.is_empty());
}

#[tokio::test]
async fn test_search_server_error_is_transport() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/search"))
        .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
        .mount(&server)
        .await;

    let err = services_for(&server).geocoder.search("paris").await.unwrap_err();

    assert!(matches!(err, WeatherError::Transport { service: Service::Geocoding, .. }));
    assert!(err.to_string().contains("500"));
}

#[tokio::test]
async fn test_single_location_object_body() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52"))
        .and(query_param("timezone", "auto"))
        .and(query_param("current_weather", "true"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(forecast("Europe/Berlin", "CET", 3.4, 61)),
        )
        .mount(&server)
        .await;

    let request = ForecastRequest::auto(Coordinates::new(52.52, 13.41));
    let snapshots = services_for(&server).weather.fetch(&[request]).await.unwrap();

    assert_eq!(snapshots.len(), 1);
    assert_eq!(snapshots[0].timezone_id, "Europe/Berlin");
    assert_eq!(snapshots[0].timezone_abbreviation, "CET");
    assert_eq!(snapshots[0].condition_code, 61);
    assert_eq!(snapshots[0].temperature_celsius, 3.4);
}

#[tokio::test]
async fn test_multi_location_array_body_keeps_order() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "51.5,42.98"))
        .and(query_param("longitude", "-0.12,-81.23"))
        .and(query_param("timezone", "Europe/London,America/Toronto"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!([
            forecast("Europe/London", "GMT", 7.0, 3),
            forecast("America/Toronto", "EST", -4.0, 71),
        ])))
        .mount(&server)
        .await;

    let requests = vec![
        ForecastRequest {
            coordinates: Coordinates::new(51.5, -0.12),
            timezone: TimezoneHint::Explicit("Europe/London".into()),
        },
        ForecastRequest {
            coordinates: Coordinates::new(42.98, -81.23),
            timezone: TimezoneHint::Explicit("America/Toronto".into()),
        },
    ];
    let snapshots = services_for(&server).weather.fetch(&requests).await.unwrap();

    assert_eq!(snapshots.len(), 2);
    assert_eq!(snapshots[0].timezone_id, "Europe/London");
    assert_eq!(snapshots[1].timezone_abbreviation, "EST");
    assert_eq!(snapshots[1].condition_code, 71);
}

#[tokio::test]
async fn test_missing_current_weather_is_missing_data() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "timezone": "Europe/Berlin",
            "timezone_abbreviation": "CET"
        })))
        .mount(&server)
        .await;

    let request = ForecastRequest::auto(Coordinates::new(52.52, 13.41));
    let err = services_for(&server).weather.fetch(&[request]).await.unwrap_err();

    assert!(matches!(err, WeatherError::MissingData { service: Service::Forecast, .. }));
}

#[tokio::test]
async fn test_forecast_count_mismatch_is_internal_consistency() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/forecast"))
        .and(query_param("latitude", "52.52,48.85"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(forecast("Europe/Berlin", "CET", 3.4, 0)),
        )
        .mount(&server)
        .await;

    let requests = vec![
        ForecastRequest::auto(Coordinates::new(52.52, 13.41)),
        ForecastRequest::auto(Coordinates::new(48.85, 2.35)),
    ];
    let err = services_for(&server).weather.fetch(&requests).await.unwrap_err();

    assert!(matches!(err, WeatherError::InternalConsistency(_)));
    assert!(!err.is_user_facing());
}

#[tokio::test]
async fn test_ip_lookup_maps_fields() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/json/"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "ip": "203.0.113.7",
            "city": "Utrecht",
            "region": "Utrecht",
            "country_name": "Netherlands",
            "latitude": 52.09,
            "longitude": 5.12
        })))
        .mount(&server)
        .await;

    let found = services_for(&server).ip_locator.locate().await.unwrap();

    assert_eq!(found.city.as_deref(), Some("Utrecht"));
    assert_eq!(found.country.as_deref(), Some("Netherlands"));
    assert_eq!(found.coordinates, Some(Coordinates::new(52.09, 5.12)));
}

#[tokio::test]
async fn test_reverse_lookup_hits_reverse_endpoint() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/reverse"))
        .and(query_param("latitude", "48.85"))
        .and(query_param("longitude", "2.35"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "results": [{"name": "Paris", "country": "France", "admin1": "Île-de-France",
                         "latitude": 48.85341, "longitude": 2.3488, "timezone": "Europe/Paris"}]
        })))
        .mount(&server)
        .await;

    let found = services_for(&server)
        .geocoder
        .reverse(Coordinates::new(48.85, 2.35))
        .await
        .unwrap();

    assert_eq!(found.len(), 1);
    assert_eq!(found[0].city_name, "Paris");
}
