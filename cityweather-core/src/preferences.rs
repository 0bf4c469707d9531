use std::{
    collections::BTreeMap,
    convert::TryFrom,
    fmt::Debug,
    fs,
    path::{Path, PathBuf},
    sync::Mutex,
};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use tracing::warn;

use crate::units::{TemperatureUnit, Theme, WindUnit, hour_format_glyph};

pub const KEY_THEME: &str = "theme";
pub const KEY_THEME_ICON: &str = "theme_icon";
pub const KEY_TEMPERATURE_UNIT: &str = "temperature_unit";
pub const KEY_TEMPERATURE_BUTTON: &str = "temperature_unit_button";
pub const KEY_WIND_UNIT: &str = "wind_unit";
pub const KEY_WIND_BUTTON: &str = "wind_unit_button";
pub const KEY_HOUR_FORMAT: &str = "hour_format_is_24h";

/// String-keyed, string-valued storage that outlives the process.
pub trait PreferenceStore: Send + Sync + Debug {
    fn get(&self, key: &str) -> Option<String>;
    fn set(&self, key: &str, value: &str) -> Result<()>;
}

#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl PreferenceStore for MemoryStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

/// A flat TOML table on disk, rewritten on every `set`.
#[derive(Debug)]
pub struct FileStore {
    path: PathBuf,
    values: Mutex<BTreeMap<String, String>>,
}

impl FileStore {
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let values = if path.exists() {
            let contents = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read preferences file: {}", path.display()))?;
            // Unreadable contents fall back to defaults; the next `set` rewrites the file.
            toml::from_str::<BTreeMap<String, String>>(&contents).unwrap_or_else(|err| {
                warn!(path = %path.display(), "Ignoring malformed preferences file: {err}");
                BTreeMap::new()
            })
        } else {
            BTreeMap::new()
        };

        Ok(Self { path, values: Mutex::new(values) })
    }

    /// Default location in the platform data directory.
    pub fn default_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("dev", "cityweather", "cityweather-cli")
            .ok_or_else(|| anyhow::anyhow!("Could not determine platform data directory"))?;

        Ok(dirs.data_dir().join("preferences.toml"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, values: &BTreeMap<String, String>) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create preferences directory: {}", parent.display())
            })?;
        }

        let toml = toml::to_string_pretty(values).context("Failed to serialize preferences")?;
        fs::write(&self.path, toml)
            .with_context(|| format!("Failed to write preferences file: {}", self.path.display()))
    }
}

impl PreferenceStore for FileStore {
    fn get(&self, key: &str) -> Option<String> {
        self.values.lock().ok()?.get(key).cloned()
    }

    fn set(&self, key: &str, value: &str) -> Result<()> {
        let mut values = self
            .values
            .lock()
            .map_err(|_| anyhow::anyhow!("preference store lock poisoned"))?;
        values.insert(key.to_string(), value.to_string());
        self.persist(&values)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UnitPreferences {
    pub theme: Theme,
    pub temperature_unit: TemperatureUnit,
    pub wind_unit: WindUnit,
    pub hour_format_is_24h: bool,
}

impl UnitPreferences {
    /// Read stored preferences, falling back to the platform theme and the
    /// built-in defaults (°C, km/h, 24h) for anything unset or unreadable.
    ///
    /// A unit only counts as stored when its button glyph is stored with it.
    pub fn load(store: &dyn PreferenceStore, prefers_dark: bool) -> Self {
        let theme = match (store.get(KEY_THEME), store.get(KEY_THEME_ICON)) {
            (Some(theme), Some(_)) => parse_or(&theme, Theme::from_platform(prefers_dark)),
            _ => Theme::from_platform(prefers_dark),
        };

        let temperature_unit =
            match (store.get(KEY_TEMPERATURE_UNIT), store.get(KEY_TEMPERATURE_BUTTON)) {
                (Some(unit), Some(_)) => parse_or(&unit, TemperatureUnit::Celsius),
                _ => TemperatureUnit::Celsius,
            };

        let wind_unit = match (store.get(KEY_WIND_UNIT), store.get(KEY_WIND_BUTTON)) {
            (Some(unit), Some(_)) => parse_or(&unit, WindUnit::Kmh),
            _ => WindUnit::Kmh,
        };

        let hour_format_is_24h = !matches!(store.get(KEY_HOUR_FORMAT).as_deref(), Some("false"));

        Self { theme, temperature_unit, wind_unit, hour_format_is_24h }
    }

    pub fn save_theme(&self, store: &dyn PreferenceStore) -> Result<()> {
        store.set(KEY_THEME, self.theme.as_str())?;
        store.set(KEY_THEME_ICON, self.theme.button_glyph())
    }

    pub fn save_temperature_unit(&self, store: &dyn PreferenceStore) -> Result<()> {
        store.set(KEY_TEMPERATURE_UNIT, self.temperature_unit.symbol())?;
        store.set(KEY_TEMPERATURE_BUTTON, self.temperature_unit.button_glyph())
    }

    pub fn save_wind_unit(&self, store: &dyn PreferenceStore) -> Result<()> {
        store.set(KEY_WIND_UNIT, self.wind_unit.symbol())?;
        store.set(KEY_WIND_BUTTON, self.wind_unit.button_glyph())
    }

    pub fn save_hour_format(&self, store: &dyn PreferenceStore) -> Result<()> {
        store.set(KEY_HOUR_FORMAT, if self.hour_format_is_24h { "true" } else { "false" })
    }

    pub fn save_all(&self, store: &dyn PreferenceStore) -> Result<()> {
        self.save_theme(store)?;
        self.save_temperature_unit(store)?;
        self.save_wind_unit(store)?;
        self.save_hour_format(store)
    }

    pub fn hour_format_glyph(&self) -> &'static str {
        hour_format_glyph(self.hour_format_is_24h)
    }
}

fn parse_or<'a, T>(raw: &'a str, default: T) -> T
where
    T: TryFrom<&'a str, Error = String>,
{
    T::try_from(raw).unwrap_or_else(|err| {
        warn!("Ignoring stored preference: {err}");
        default
    })
}
