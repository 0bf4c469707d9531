//! In-memory stand-ins for the remote services and the surface.

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;

use crate::{
    display::{DisplayedRecord, Surface},
    error::{Result, Service, TransportKind, WeatherError},
    model::{Coordinates, ForecastRequest, GeoCandidate, WeatherSnapshot},
    preferences::UnitPreferences,
    provider::{
        Geocoder, IpLocation, IpLocator, PlatformLocator, PositionOptions, Services,
        WeatherFetcher,
    },
};

#[derive(Debug, Default, Clone)]
pub struct StaticGeocoder {
    pub search: Vec<GeoCandidate>,
    pub reverse: Vec<GeoCandidate>,
    pub calls: Arc<AtomicUsize>,
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn search(&self, _name: &str) -> Result<Vec<GeoCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.search.clone())
    }

    async fn reverse(&self, _coordinates: Coordinates) -> Result<Vec<GeoCandidate>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.reverse.clone())
    }
}

/// Answers each request with a snapshot in the requested timezone, or with a
/// fixed list when `fixed` is set.
#[derive(Debug, Default, Clone)]
pub struct StaticWeather {
    pub fixed: Option<Vec<WeatherSnapshot>>,
    pub fail_status: Option<u16>,
    pub requests: Arc<Mutex<Vec<Vec<ForecastRequest>>>>,
}

pub fn snapshot_for(timezone: &str, temperature: f64) -> WeatherSnapshot {
    WeatherSnapshot {
        condition_code: 1,
        temperature_celsius: temperature,
        wind_speed_kmh: 15.0,
        timezone_abbreviation: "GMT+1".to_string(),
        timezone_id: timezone.to_string(),
    }
}

#[async_trait]
impl WeatherFetcher for StaticWeather {
    async fn fetch(&self, requests: &[ForecastRequest]) -> Result<Vec<WeatherSnapshot>> {
        if let Ok(mut log) = self.requests.lock() {
            log.push(requests.to_vec());
        }
        if let Some(status) = self.fail_status {
            return Err(WeatherError::transport(
                Service::Forecast,
                TransportKind::Status { status, body: "upstream down".to_string() },
            ));
        }
        if let Some(fixed) = &self.fixed {
            return Ok(fixed.clone());
        }

        Ok(requests
            .iter()
            .map(|r| {
                let tz = match r.timezone.as_str() {
                    "auto" => "Europe/Lisbon",
                    explicit => explicit,
                };
                snapshot_for(tz, 12.0)
            })
            .collect())
    }
}

#[derive(Debug, Clone)]
pub struct StaticIp(Option<IpLocation>);

impl StaticIp {
    pub fn found(location: IpLocation) -> Self {
        Self(Some(location))
    }

    pub fn failing() -> Self {
        Self(None)
    }
}

#[async_trait]
impl IpLocator for StaticIp {
    async fn locate(&self) -> Result<IpLocation> {
        self.0.clone().ok_or_else(|| {
            WeatherError::transport(
                Service::IpLocation,
                TransportKind::Status { status: 429, body: "rate limited".to_string() },
            )
        })
    }
}

#[derive(Debug, Clone, Copy)]
pub enum StaticPlatform {
    At(Coordinates),
    Denied,
    Never,
}

impl StaticPlatform {
    pub fn at(coordinates: Coordinates) -> Self {
        Self::At(coordinates)
    }

    pub fn denied() -> Self {
        Self::Denied
    }

    pub fn never() -> Self {
        Self::Never
    }
}

#[async_trait]
impl PlatformLocator for StaticPlatform {
    async fn current_position(&self, _options: PositionOptions) -> Result<Coordinates> {
        match self {
            Self::At(coordinates) => Ok(*coordinates),
            Self::Denied => Err(WeatherError::transport(
                Service::PlatformLocation,
                TransportKind::Unavailable("permission denied".to_string()),
            )),
            Self::Never => std::future::pending().await,
        }
    }
}

pub fn services(geocoder: StaticGeocoder, platform: StaticPlatform, ip: StaticIp) -> Services {
    services_with(geocoder, StaticWeather::default(), platform, ip)
}

pub fn services_with(
    geocoder: StaticGeocoder,
    weather: StaticWeather,
    platform: StaticPlatform,
    ip: StaticIp,
) -> Services {
    Services {
        geocoder: Arc::new(geocoder),
        weather: Arc::new(weather),
        ip_locator: Arc::new(ip),
        platform: Arc::new(platform),
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SurfaceEvent {
    Loading(bool),
    Cleared,
    Failure(String),
    Record(DisplayedRecord),
    Candidates(Vec<String>),
    Time(String),
    Preferences(UnitPreferences),
}

#[derive(Debug, Default)]
pub struct RecordingSurface {
    events: Mutex<Vec<SurfaceEvent>>,
}

impl RecordingSurface {
    fn push(&self, event: SurfaceEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }

    pub fn events(&self) -> Vec<SurfaceEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn last_record(&self) -> Option<DisplayedRecord> {
        self.events().into_iter().rev().find_map(|e| match e {
            SurfaceEvent::Record(record) => Some(record),
            _ => None,
        })
    }

    pub fn last_failure(&self) -> Option<String> {
        self.events().into_iter().rev().find_map(|e| match e {
            SurfaceEvent::Failure(message) => Some(message),
            _ => None,
        })
    }
}

impl Surface for RecordingSurface {
    fn set_loading(&self, loading: bool) {
        self.push(SurfaceEvent::Loading(loading));
    }

    fn clear(&self) {
        self.push(SurfaceEvent::Cleared);
    }

    fn show_failure(&self, message: &str) {
        self.push(SurfaceEvent::Failure(message.to_string()));
    }

    fn show_record(&self, record: &DisplayedRecord) {
        self.push(SurfaceEvent::Record(record.clone()));
    }

    fn show_candidates(&self, labels: &[String]) {
        self.push(SurfaceEvent::Candidates(labels.to_vec()));
    }

    fn show_time(&self, time: &str) {
        self.push(SurfaceEvent::Time(time.to_string()));
    }

    fn show_preferences(&self, preferences: &UnitPreferences) {
        self.push(SurfaceEvent::Preferences(*preferences));
    }
}
