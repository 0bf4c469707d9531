//! Display units and the conversions between them.
//!
//! Every conversion rounds to one decimal place. Toggling a unit back and
//! forth converts the value that is currently displayed, so a round trip can
//! drift by a tenth; see [`crate::display`].

use std::{convert::TryFrom, fmt};

use serde::{Deserialize, Serialize};

const KMH_TO_MPH: f64 = 0.621371;
const MPH_TO_KMH: f64 = 1.60934;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Glyph of the theme button, showing what a click switches to.
    pub fn button_glyph(&self) -> &'static str {
        match self {
            Theme::Dark => "☀️",
            Theme::Light => "🌙",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Light => Theme::Dark,
            Theme::Dark => Theme::Light,
        }
    }

    pub fn from_platform(prefers_dark: bool) -> Self {
        if prefers_dark { Theme::Dark } else { Theme::Light }
    }
}

impl TryFrom<&str> for Theme {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("unknown theme '{other}'")),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TemperatureUnit {
    Celsius,
    Fahrenheit,
}

impl TemperatureUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "°C",
            TemperatureUnit::Fahrenheit => "°F",
        }
    }

    pub fn button_glyph(&self) -> &'static str {
        match self {
            TemperatureUnit::Celsius => "🌡️ °F",
            TemperatureUnit::Fahrenheit => "🌡️ °C",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            TemperatureUnit::Celsius => TemperatureUnit::Fahrenheit,
            TemperatureUnit::Fahrenheit => TemperatureUnit::Celsius,
        }
    }
}

impl TryFrom<&str> for TemperatureUnit {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "°C" => Ok(TemperatureUnit::Celsius),
            "°F" => Ok(TemperatureUnit::Fahrenheit),
            other => Err(format!("unknown temperature unit '{other}'")),
        }
    }
}

impl fmt::Display for TemperatureUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WindUnit {
    Kmh,
    Mph,
}

impl WindUnit {
    pub fn symbol(&self) -> &'static str {
        match self {
            WindUnit::Kmh => "km/h",
            WindUnit::Mph => "mph",
        }
    }

    pub fn button_glyph(&self) -> &'static str {
        match self {
            WindUnit::Kmh => "🍃 mph",
            WindUnit::Mph => "🍃 km/h",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            WindUnit::Kmh => WindUnit::Mph,
            WindUnit::Mph => WindUnit::Kmh,
        }
    }
}

impl TryFrom<&str> for WindUnit {
    type Error = String;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "km/h" => Ok(WindUnit::Kmh),
            "mph" => Ok(WindUnit::Mph),
            other => Err(format!("unknown wind unit '{other}'")),
        }
    }
}

impl fmt::Display for WindUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.symbol())
    }
}

pub fn hour_format_glyph(is_24h: bool) -> &'static str {
    if is_24h { "⏲️ 12h" } else { "⏲️ 24h" }
}

pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Convert a Celsius reading for display in `target`.
pub fn convert_temperature(value_celsius: f64, target: TemperatureUnit) -> f64 {
    match target {
        TemperatureUnit::Celsius => round1(value_celsius),
        TemperatureUnit::Fahrenheit => round1(value_celsius * 9.0 / 5.0 + 32.0),
    }
}

/// Convert a km/h reading for display in `target`.
pub fn convert_wind(value_kmh: f64, target: WindUnit) -> f64 {
    match target {
        WindUnit::Kmh => round1(value_kmh),
        WindUnit::Mph => round1(value_kmh * KMH_TO_MPH),
    }
}

/// Re-express an already displayed temperature in `to`.
pub fn retarget_temperature(value: f64, from: TemperatureUnit, to: TemperatureUnit) -> f64 {
    match (from, to) {
        (TemperatureUnit::Celsius, TemperatureUnit::Fahrenheit) => round1(value * 9.0 / 5.0 + 32.0),
        (TemperatureUnit::Fahrenheit, TemperatureUnit::Celsius) => round1((value - 32.0) * 5.0 / 9.0),
        _ => round1(value),
    }
}

/// Re-express an already displayed wind speed in `to`.
pub fn retarget_wind(value: f64, from: WindUnit, to: WindUnit) -> f64 {
    match (from, to) {
        (WindUnit::Kmh, WindUnit::Mph) => round1(value * KMH_TO_MPH),
        (WindUnit::Mph, WindUnit::Kmh) => round1(value * MPH_TO_KMH),
        _ => round1(value),
    }
}

/// One decimal, the way values are shown.
pub fn format_value(value: f64) -> String {
    format!("{value:.1}")
}
