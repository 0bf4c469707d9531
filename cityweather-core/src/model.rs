use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub const fn new(latitude: f64, longitude: f64) -> Self {
        Self { latitude, longitude }
    }
}

/// One geocoded match for a searched name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GeoCandidate {
    pub city_name: String,
    pub country_name: String,
    /// Empty when the geocoder has no first-level admin area.
    pub admin_name: String,
    pub coordinates: Coordinates,
    pub timezone_id: String,
}

/// How the forecast service should pick the timezone of a location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TimezoneHint {
    Auto,
    Explicit(String),
}

impl TimezoneHint {
    pub fn as_str(&self) -> &str {
        match self {
            TimezoneHint::Auto => "auto",
            TimezoneHint::Explicit(id) => id,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ForecastRequest {
    pub coordinates: Coordinates,
    pub timezone: TimezoneHint,
}

impl ForecastRequest {
    pub fn auto(coordinates: Coordinates) -> Self {
        Self { coordinates, timezone: TimezoneHint::Auto }
    }
}

impl From<&GeoCandidate> for ForecastRequest {
    fn from(candidate: &GeoCandidate) -> Self {
        let timezone = if candidate.timezone_id.is_empty() {
            TimezoneHint::Auto
        } else {
            TimezoneHint::Explicit(candidate.timezone_id.clone())
        };

        Self { coordinates: candidate.coordinates, timezone }
    }
}

/// Current conditions and timezone metadata for one coordinate pair.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeatherSnapshot {
    pub condition_code: i32,
    pub temperature_celsius: f64,
    pub wind_speed_kmh: f64,
    pub timezone_abbreviation: String,
    pub timezone_id: String,
}

/// A candidate merged with its snapshot, ready for display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CityWeatherRecord {
    pub city_name: String,
    pub country_name: String,
    pub admin_name: String,
    pub coordinates: Coordinates,
    pub timezone_abbreviation: String,
    pub timezone_id: String,
    pub condition_code: i32,
    pub weather_icon: &'static str,
    pub weather_type: &'static str,
    pub temperature_celsius: f64,
    pub wind_speed_kmh: f64,
}

impl CityWeatherRecord {
    /// `City, Country (Admin)`, without the parentheses when there is no admin area.
    pub fn label(&self) -> String {
        if self.admin_name.is_empty() {
            format!("{}, {}", self.city_name, self.country_name)
        } else {
            format!("{}, {} ({})", self.city_name, self.country_name, self.admin_name)
        }
    }

    pub fn timezone_line(&self) -> String {
        format!("{} - {}", self.timezone_abbreviation, self.timezone_id)
    }
}
