use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::{
    config::Endpoints,
    error::{Result, Service, WeatherError},
    model::{Coordinates, ForecastRequest, GeoCandidate, WeatherSnapshot},
};

use super::{Geocoder, WeatherFetcher, get_json};

/// Open-Meteo geocoding and forecast APIs. No key required.
#[derive(Debug, Clone)]
pub struct OpenMeteoClient {
    http: Client,
    endpoints: Endpoints,
}

impl OpenMeteoClient {
    pub fn new(http: Client, endpoints: Endpoints) -> Self {
        Self { http, endpoints }
    }
}

#[derive(Debug, Deserialize)]
struct OmGeocodingResponse {
    results: Option<Vec<OmPlace>>,
}

#[derive(Debug, Deserialize)]
struct OmPlace {
    name: String,
    country: Option<String>,
    admin1: Option<String>,
    latitude: f64,
    longitude: f64,
    timezone: Option<String>,
}

impl From<OmPlace> for GeoCandidate {
    fn from(place: OmPlace) -> Self {
        GeoCandidate {
            city_name: place.name,
            country_name: place.country.unwrap_or_default(),
            admin_name: place.admin1.unwrap_or_default(),
            coordinates: Coordinates::new(place.latitude, place.longitude),
            timezone_id: place.timezone.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Deserialize)]
struct OmCurrentWeather {
    temperature: f64,
    windspeed: f64,
    weathercode: i32,
}

#[derive(Debug, Deserialize)]
struct OmForecast {
    timezone: Option<String>,
    timezone_abbreviation: Option<String>,
    current_weather: Option<OmCurrentWeather>,
}

/// The forecast API answers a single location with an object and several
/// locations with an array.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum OmForecastBody {
    Many(Vec<OmForecast>),
    One(Box<OmForecast>),
}

impl OmForecastBody {
    fn into_list(self) -> Vec<OmForecast> {
        match self {
            OmForecastBody::Many(list) => list,
            OmForecastBody::One(one) => vec![*one],
        }
    }
}

impl TryFrom<OmForecast> for WeatherSnapshot {
    type Error = WeatherError;

    fn try_from(forecast: OmForecast) -> Result<Self> {
        let current = forecast
            .current_weather
            .ok_or_else(|| WeatherError::missing(Service::Forecast, "current_weather"))?;
        let timezone_id = forecast
            .timezone
            .ok_or_else(|| WeatherError::missing(Service::Forecast, "timezone"))?;

        Ok(WeatherSnapshot {
            condition_code: current.weathercode,
            temperature_celsius: current.temperature,
            wind_speed_kmh: current.windspeed,
            timezone_abbreviation: forecast.timezone_abbreviation.unwrap_or_default(),
            timezone_id,
        })
    }
}

fn join<I: IntoIterator<Item = String>>(values: I) -> String {
    values.into_iter().collect::<Vec<_>>().join(",")
}

fn forecast_query(requests: &[ForecastRequest]) -> Vec<(&'static str, String)> {
    vec![
        ("latitude", join(requests.iter().map(|r| r.coordinates.latitude.to_string()))),
        ("longitude", join(requests.iter().map(|r| r.coordinates.longitude.to_string()))),
        ("timezone", join(requests.iter().map(|r| r.timezone.as_str().to_string()))),
        ("current_weather", "true".to_string()),
    ]
}

#[async_trait]
impl Geocoder for OpenMeteoClient {
    async fn search(&self, name: &str) -> Result<Vec<GeoCandidate>> {
        let body: OmGeocodingResponse = get_json(
            &self.http,
            Service::Geocoding,
            &self.endpoints.geocoding,
            &[("name", name.to_string())],
        )
        .await?;

        let candidates: Vec<GeoCandidate> =
            body.results.unwrap_or_default().into_iter().map(GeoCandidate::from).collect();
        debug!(name, count = candidates.len(), "geocoding finished");
        Ok(candidates)
    }

    async fn reverse(&self, coordinates: Coordinates) -> Result<Vec<GeoCandidate>> {
        let body: OmGeocodingResponse = get_json(
            &self.http,
            Service::ReverseGeocoding,
            &self.endpoints.reverse_geocoding,
            &[
                ("latitude", coordinates.latitude.to_string()),
                ("longitude", coordinates.longitude.to_string()),
            ],
        )
        .await?;

        Ok(body.results.unwrap_or_default().into_iter().map(GeoCandidate::from).collect())
    }
}

#[async_trait]
impl WeatherFetcher for OpenMeteoClient {
    async fn fetch(&self, requests: &[ForecastRequest]) -> Result<Vec<WeatherSnapshot>> {
        if requests.is_empty() {
            return Ok(Vec::new());
        }

        let body: OmForecastBody = get_json(
            &self.http,
            Service::Forecast,
            &self.endpoints.forecast,
            &forecast_query(requests),
        )
        .await?;

        let forecasts = body.into_list();
        if forecasts.len() != requests.len() {
            return Err(WeatherError::InternalConsistency(format!(
                "requested weather for {} locations, received {}",
                requests.len(),
                forecasts.len()
            )));
        }

        forecasts.into_iter().map(WeatherSnapshot::try_from).collect()
    }
}
