use anyhow::{Context, Result, anyhow};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};

use crate::model::Coordinates;

/// Base URLs of the remote services.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Endpoints {
    pub geocoding: String,
    pub reverse_geocoding: String,
    pub forecast: String,
    pub ip_location: String,
}

impl Default for Endpoints {
    fn default() -> Self {
        Self {
            geocoding: "https://geocoding-api.open-meteo.com/v1/search".to_string(),
            reverse_geocoding: "https://geocoding-api.open-meteo.com/v1/reverse".to_string(),
            forecast: "https://api.open-meteo.com/v1/forecast".to_string(),
            ip_location: "https://ipapi.co/json/".to_string(),
        }
    }
}

impl Endpoints {
    /// Every endpoint under one base URL, e.g. a mock server.
    pub fn with_base(base: &str) -> Self {
        let base = base.trim_end_matches('/');
        Self {
            geocoding: format!("{base}/v1/search"),
            reverse_geocoding: format!("{base}/v1/reverse"),
            forecast: format!("{base}/v1/forecast"),
            ip_location: format!("{base}/json/"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_secs: u64,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self { timeout_secs: 10 }
    }
}

/// The location used when neither the platform nor the IP lookup names a city.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FallbackLocation {
    pub name: String,
    pub country: String,
    pub admin: String,
    pub latitude: f64,
    pub longitude: f64,
}

impl Default for FallbackLocation {
    fn default() -> Self {
        Self {
            name: "Berlin".to_string(),
            country: "Germany".to_string(),
            admin: "Berlin".to_string(),
            latitude: 52.5200,
            longitude: 13.4050,
        }
    }
}

impl FallbackLocation {
    pub fn coordinates(&self) -> Coordinates {
        Coordinates::new(self.latitude, self.longitude)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeolocationConfig {
    /// Upper bound on the platform position request.
    pub timeout_ms: u64,
    pub high_accuracy: bool,
    pub fallback: FallbackLocation,
}

impl Default for GeolocationConfig {
    fn default() -> Self {
        Self { timeout_ms: 5000, high_accuracy: true, fallback: FallbackLocation::default() }
    }
}

/// Top-level configuration stored on disk.
///
/// Example TOML:
/// ```toml
/// [geolocation]
/// timeout_ms = 3000
///
/// [geolocation.fallback]
/// name = "Lisbon"
/// country = "Portugal"
/// admin = "Lisbon"
/// latitude = 38.72
/// longitude = -9.14
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub endpoints: Endpoints,
    pub http: HttpConfig,
    pub geolocation: GeolocationConfig,

    /// Overrides the platform data directory location of the preference store.
    pub preferences_file: Option<PathBuf>,
}

impl Config {
    /// Load config from disk, or return defaults if it doesn't exist yet.
    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_file_path()?)
    }

    pub fn load_from(path: &std::path::Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let cfg: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(cfg)
    }

    /// Save config to disk, creating parent directories as needed.
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_file_path()?)
    }

    pub fn save_to(&self, path: &std::path::Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let toml =
            toml::to_string_pretty(self).context("Failed to serialize configuration to TOML")?;

        fs::write(path, toml)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Path to the config file.
    pub fn config_file_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather-cli")
            .ok_or_else(|| anyhow!("Could not determine platform config directory"))?;

        Ok(dirs.config_dir().join("config.toml"))
    }

    pub fn request_timeout(&self) -> std::time::Duration {
        std::time::Duration::from_secs(self.http.timeout_secs)
    }
}
