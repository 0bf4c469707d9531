//! "Use my location": platform position, then IP lookup, then a fixed city.

use std::time::Duration;

use tracing::{info, warn};

use crate::{
    config::GeolocationConfig,
    error::{Result, Service, TransportKind, WeatherError},
    model::{CityWeatherRecord, Coordinates, GeoCandidate, WeatherSnapshot},
    normalize,
    provider::{PositionOptions, Services},
    resolver::LocationResolver,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocationSource {
    Platform,
    IpAddress,
    Fallback,
}

/// A position together with the place names of whichever tier produced it.
#[derive(Debug, Clone, PartialEq)]
pub struct LocatedCity {
    pub coordinates: Coordinates,
    pub city_name: String,
    pub country_name: String,
    pub admin_name: String,
    pub source: LocationSource,
}

impl LocatedCity {
    /// Merge with the weather for this position. Name fields always come from
    /// the tier that located us, never from the forecast answer.
    pub fn into_record(self, snapshot: WeatherSnapshot) -> CityWeatherRecord {
        let candidate = GeoCandidate {
            city_name: self.city_name,
            country_name: self.country_name,
            admin_name: self.admin_name,
            coordinates: self.coordinates,
            timezone_id: snapshot.timezone_id.clone(),
        };
        normalize::record(candidate, snapshot)
    }
}

/// Walk the fallback chain. Never fails: the last tier is a fixed location.
pub async fn locate(services: &Services, config: &GeolocationConfig) -> LocatedCity {
    if let Some(found) = from_platform(services, config).await {
        info!(city = %found.city_name, "location from platform position");
        return found;
    }

    if let Some(found) = from_ip(services).await {
        info!(city = %found.city_name, "location from IP address");
        return found;
    }

    let fallback = &config.fallback;
    info!(city = %fallback.name, "using fallback location");
    LocatedCity {
        coordinates: fallback.coordinates(),
        city_name: fallback.name.clone(),
        country_name: fallback.country.clone(),
        admin_name: fallback.admin.clone(),
        source: LocationSource::Fallback,
    }
}

/// The platform position, abandoned once `options.timeout` has elapsed.
async fn platform_position(services: &Services, options: PositionOptions) -> Result<Coordinates> {
    tokio::time::timeout(options.timeout, services.platform.current_position(options))
        .await
        .unwrap_or_else(|_| {
            Err(WeatherError::transport(
                Service::PlatformLocation,
                TransportKind::Timeout(options.timeout.as_millis() as u64),
            ))
        })
}

async fn from_platform(services: &Services, config: &GeolocationConfig) -> Option<LocatedCity> {
    let options = PositionOptions {
        high_accuracy: config.high_accuracy,
        timeout: Duration::from_millis(config.timeout_ms),
    };

    let coordinates = match platform_position(services, options).await {
        Ok(coordinates) => coordinates,
        Err(err) => {
            warn!("Geolocation failed: {err}");
            return None;
        }
    };

    let resolver = LocationResolver::new(services.geocoder.clone());
    match resolver.resolve_by_coordinates(coordinates).await {
        Ok(Some(place)) if !place.city_name.is_empty() => Some(LocatedCity {
            coordinates,
            city_name: place.city_name,
            country_name: place.country_name,
            admin_name: place.admin_name,
            source: LocationSource::Platform,
        }),
        Ok(_) => {
            warn!("No place name near {}, {}", coordinates.latitude, coordinates.longitude);
            None
        }
        Err(err) => {
            warn!("Reverse geocoding failed: {err}");
            None
        }
    }
}

async fn from_ip(services: &Services) -> Option<LocatedCity> {
    let found = match services.ip_locator.locate().await {
        Ok(found) => found,
        Err(err) => {
            warn!("IP fallback failed: {err}");
            return None;
        }
    };

    match (found.city, found.coordinates) {
        (Some(city), Some(coordinates)) => Some(LocatedCity {
            coordinates,
            city_name: city,
            country_name: found.country.unwrap_or_default(),
            admin_name: found.region.unwrap_or_default(),
            source: LocationSource::IpAddress,
        }),
        _ => {
            warn!("IP fallback returned no usable city");
            None
        }
    }
}
