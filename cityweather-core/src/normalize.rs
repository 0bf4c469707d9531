//! Merging geocoder candidates with forecast snapshots, and the WMO weather
//! code table used for display.

use tracing::error;

use crate::{
    error::{Result, WeatherError},
    model::{CityWeatherRecord, GeoCandidate, WeatherSnapshot},
};

pub const UNKNOWN_ICON: &str = "❓";
pub const UNKNOWN_TYPE: &str = "Unknown";

const WEATHER_CODES: [(i32, &str, &str); 28] = [
    (0, "☀️", "Clear sky"),
    (1, "🌤️", "Mainly clear"),
    (2, "⛅", "Partly cloudy"),
    (3, "☁️", "Overcast"),
    (45, "🌫️", "Fog"),
    (48, "🌫️❄️", "Depositing rime fog"),
    (51, "🌦️", "Light drizzle"),
    (53, "🌦️", "Moderate drizzle"),
    (55, "🌧️", "Dense drizzle"),
    (56, "🌧️❄️", "Light freezing drizzle"),
    (57, "🌧️❄️", "Dense freezing drizzle"),
    (61, "🌦️", "Slight rain"),
    (63, "🌧️", "Moderate rain"),
    (65, "🌧️🌧️", "Heavy rain"),
    (66, "🌧️❄️", "Light freezing rain"),
    (67, "🌧️❄️❄️", "Heavy freezing rain"),
    (71, "🌨️", "Slight snowfall"),
    (73, "❄️", "Moderate snowfall"),
    (75, "❄️❄️", "Heavy snowfall"),
    (77, "🌨️", "Snow grains"),
    (80, "🌦️", "Slight rain showers"),
    (81, "🌧️", "Moderate rain showers"),
    (82, "🌧️🌧️", "Violent rain showers"),
    (85, "🌨️", "Slight snow showers"),
    (86, "❄️❄️", "Heavy snow showers"),
    (95, "⛈️", "Thunderstorm"),
    (96, "⛈️🧊", "Thunderstorm with slight hail"),
    (99, "⛈️🧊🧊", "Thunderstorm with heavy hail"),
];

fn lookup(code: i32) -> Option<&'static (i32, &'static str, &'static str)> {
    WEATHER_CODES.iter().find(|(c, _, _)| *c == code)
}

pub fn weather_icon(code: i32) -> &'static str {
    lookup(code).map_or(UNKNOWN_ICON, |&(_, icon, _)| icon)
}

pub fn weather_type(code: i32) -> &'static str {
    lookup(code).map_or(UNKNOWN_TYPE, |&(_, _, label)| label)
}

/// Build one record from a candidate and the snapshot fetched for its coordinates.
pub fn record(candidate: GeoCandidate, snapshot: WeatherSnapshot) -> CityWeatherRecord {
    let code = snapshot.condition_code;
    CityWeatherRecord {
        city_name: candidate.city_name,
        country_name: candidate.country_name,
        admin_name: candidate.admin_name,
        coordinates: candidate.coordinates,
        timezone_abbreviation: snapshot.timezone_abbreviation,
        timezone_id: snapshot.timezone_id,
        condition_code: code,
        weather_icon: weather_icon(code),
        weather_type: weather_type(code),
        temperature_celsius: snapshot.temperature_celsius,
        wind_speed_kmh: snapshot.wind_speed_kmh,
    }
}

/// Pair candidates with snapshots by position.
///
/// A length mismatch means the forecast request was not built from these
/// candidates; it is reported as [`WeatherError::InternalConsistency`] and never
/// produces a partial list.
pub fn merge(
    candidates: Vec<GeoCandidate>,
    snapshots: Vec<WeatherSnapshot>,
) -> Result<Vec<CityWeatherRecord>> {
    if candidates.len() != snapshots.len() {
        let msg = format!(
            "{} candidates but {} weather snapshots",
            candidates.len(),
            snapshots.len()
        );
        error!("{msg}");
        return Err(WeatherError::InternalConsistency(msg));
    }

    Ok(candidates.into_iter().zip(snapshots).map(|(c, s)| record(c, s)).collect())
}
