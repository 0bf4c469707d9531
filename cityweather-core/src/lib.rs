//! Core library for the `cityweather` CLI.
//!
//! This crate defines:
//! - City lookup by name or by position (platform, IP address, fixed fallback)
//! - Current weather and timezone retrieval for one or many locations
//! - Normalization into display records, unit preferences and the city clock
//! - The orchestrator that sequences all of the above per user action
//!
//! Rendering is left to a [`Surface`] implementation supplied by the binary.

pub mod app;
pub mod clock;
pub mod config;
pub mod display;
pub mod error;
pub mod geolocation;
pub mod input;
pub mod model;
pub mod normalize;
pub mod preferences;
pub mod provider;
pub mod resolver;
pub mod units;

#[cfg(test)]
mod testing;

pub use app::{Command, Lookup, Orchestrator, Outcome, Phase};
pub use config::Config;
pub use display::{DisplayedRecord, Surface, View};
pub use error::{InputError, WeatherError};
pub use model::{CityWeatherRecord, Coordinates, GeoCandidate, WeatherSnapshot};
pub use preferences::{FileStore, MemoryStore, PreferenceStore, UnitPreferences};
pub use provider::{PlatformLocator, Services};
