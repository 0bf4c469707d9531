//! Narrow async interfaces to the remote services, and the HTTP clients
//! implementing them.

use std::{fmt::Debug, sync::Arc, time::Duration};

use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use tracing::debug;

use crate::{
    Config,
    error::{Result, Service, TransportKind, WeatherError},
    model::{Coordinates, ForecastRequest, GeoCandidate, WeatherSnapshot},
    provider::{ipapi::IpApiClient, open_meteo::OpenMeteoClient},
};

pub mod ipapi;
pub mod open_meteo;

#[async_trait]
pub trait Geocoder: Send + Sync + Debug {
    /// All matches for a city name; empty when the service knows none.
    async fn search(&self, name: &str) -> Result<Vec<GeoCandidate>>;

    /// Places closest to a coordinate pair, best first.
    async fn reverse(&self, coordinates: Coordinates) -> Result<Vec<GeoCandidate>>;
}

#[async_trait]
pub trait WeatherFetcher: Send + Sync + Debug {
    /// One snapshot per request, in request order.
    async fn fetch(&self, requests: &[ForecastRequest]) -> Result<Vec<WeatherSnapshot>>;
}

/// Approximate position and place names derived from the caller's IP address.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct IpLocation {
    pub coordinates: Option<Coordinates>,
    pub city: Option<String>,
    pub region: Option<String>,
    pub country: Option<String>,
}

#[async_trait]
pub trait IpLocator: Send + Sync + Debug {
    async fn locate(&self) -> Result<IpLocation>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PositionOptions {
    pub high_accuracy: bool,
    pub timeout: Duration,
}

/// The device's own position source. Callers bound the wait with
/// [`PositionOptions::timeout`] regardless of what the implementation does.
#[async_trait]
pub trait PlatformLocator: Send + Sync + Debug {
    async fn current_position(&self, options: PositionOptions) -> Result<Coordinates>;
}

/// A platform without any position source.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoPlatformLocation;

#[async_trait]
impl PlatformLocator for NoPlatformLocation {
    async fn current_position(&self, _options: PositionOptions) -> Result<Coordinates> {
        Err(WeatherError::transport(
            Service::PlatformLocation,
            TransportKind::Unavailable("no position source on this platform".to_string()),
        ))
    }
}

/// A position known up front, e.g. given on the command line.
#[derive(Debug, Clone, Copy)]
pub struct FixedPosition(pub Coordinates);

#[async_trait]
impl PlatformLocator for FixedPosition {
    async fn current_position(&self, _options: PositionOptions) -> Result<Coordinates> {
        Ok(self.0)
    }
}

/// Every collaborator the orchestrator talks to.
#[derive(Debug, Clone)]
pub struct Services {
    pub geocoder: Arc<dyn Geocoder>,
    pub weather: Arc<dyn WeatherFetcher>,
    pub ip_locator: Arc<dyn IpLocator>,
    pub platform: Arc<dyn PlatformLocator>,
}

impl Services {
    /// HTTP-backed services sharing one client, with the given platform source.
    pub fn from_config(config: &Config, platform: Arc<dyn PlatformLocator>) -> Result<Self> {
        let http = Client::builder()
            .timeout(config.request_timeout())
            .user_agent(concat!("cityweather/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                WeatherError::transport(Service::Forecast, TransportKind::Request(e))
            })?;

        let open_meteo = Arc::new(OpenMeteoClient::new(http.clone(), config.endpoints.clone()));

        Ok(Self {
            geocoder: open_meteo.clone(),
            weather: open_meteo,
            ip_locator: Arc::new(IpApiClient::new(http, config.endpoints.ip_location.clone())),
            platform,
        })
    }
}

/// GET `url`, require a success status and decode the JSON body.
pub(crate) async fn get_json<T: DeserializeOwned>(
    http: &Client,
    service: Service,
    url: &str,
    query: &[(&str, String)],
) -> Result<T> {
    debug!(%service, url, ?query, "sending request");

    let res = http
        .get(url)
        .query(query)
        .send()
        .await
        .map_err(|e| WeatherError::transport(service, TransportKind::Request(e)))?;

    let status = res.status();
    let body = res
        .text()
        .await
        .map_err(|e| WeatherError::transport(service, TransportKind::Request(e)))?;

    if !status.is_success() {
        return Err(WeatherError::transport(
            service,
            TransportKind::Status { status: status.as_u16(), body: truncate_body(&body) },
        ));
    }

    serde_json::from_str(&body)
        .map_err(|e| WeatherError::transport(service, TransportKind::Decode(e.to_string())))
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    match body.char_indices().nth(MAX) {
        Some((idx, _)) => format!("{}...", &body[..idx]),
        None => body.to_string(),
    }
}
