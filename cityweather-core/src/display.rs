//! What is on screen, and the unit conversions applied to it.
//!
//! Unit toggles convert the value currently shown, not the reading the record
//! was built from. Toggling °C→°F→°C can therefore move the shown value by a
//! tenth of a degree. This is deliberate: the shown value is the only one the
//! user has seen.

use std::{fmt::Debug, sync::Arc};

use chrono::{DateTime, Utc};
use tracing::debug;

use crate::{
    clock::{CityClock, TimeSource, format_local_date, parse_timezone},
    error::Result,
    model::CityWeatherRecord,
    preferences::UnitPreferences,
    units::{
        TemperatureUnit, WindUnit, convert_temperature, convert_wind, format_value,
        retarget_temperature, retarget_wind,
    },
};

/// The rendering side. Implementations draw; they hold no state the
/// controller relies on.
pub trait Surface: Send + Sync + Debug {
    fn set_loading(&self, loading: bool);
    fn clear(&self);
    fn show_failure(&self, message: &str);
    fn show_record(&self, record: &DisplayedRecord);
    fn show_candidates(&self, labels: &[String]);
    fn show_time(&self, time: &str);
    fn show_preferences(&self, preferences: &UnitPreferences);
}

/// A record as currently shown, in the currently selected units.
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayedRecord {
    pub record: CityWeatherRecord,
    pub local_date: String,
    pub temperature: f64,
    pub temperature_unit: TemperatureUnit,
    pub wind: f64,
    pub wind_unit: WindUnit,
}

impl DisplayedRecord {
    pub fn new(record: CityWeatherRecord, preferences: &UnitPreferences, now: DateTime<Utc>) -> Result<Self> {
        let timezone = parse_timezone(&record.timezone_id)?;
        Ok(Self {
            local_date: format_local_date(timezone, now),
            temperature: convert_temperature(record.temperature_celsius, preferences.temperature_unit),
            temperature_unit: preferences.temperature_unit,
            wind: convert_wind(record.wind_speed_kmh, preferences.wind_unit),
            wind_unit: preferences.wind_unit,
            record,
        })
    }

    pub fn set_temperature_unit(&mut self, unit: TemperatureUnit) {
        self.temperature = retarget_temperature(self.temperature, self.temperature_unit, unit);
        self.temperature_unit = unit;
    }

    pub fn set_wind_unit(&mut self, unit: WindUnit) {
        self.wind = retarget_wind(self.wind, self.wind_unit, unit);
        self.wind_unit = unit;
    }

    pub fn temperature_text(&self) -> String {
        format!("{} {}", format_value(self.temperature), self.temperature_unit)
    }

    pub fn wind_text(&self) -> String {
        format!("{} {}", format_value(self.wind), self.wind_unit)
    }
}

/// Exactly one of these is on screen.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum View {
    #[default]
    Empty,
    Record(DisplayedRecord),
    Candidates(Vec<CityWeatherRecord>),
    Failure(String),
}

#[derive(Debug)]
pub struct DisplayController {
    surface: Arc<dyn Surface>,
    clock: CityClock,
    now: TimeSource,
    view: View,
}

impl DisplayController {
    pub fn new(surface: Arc<dyn Surface>, is_24h: bool) -> Self {
        let sink = Arc::clone(&surface);
        let clock = CityClock::new(Arc::new(move |time: String| sink.show_time(&time)), is_24h);
        Self { surface, clock, now: Utc::now, view: View::Empty }
    }

    pub fn with_time_source(mut self, now: TimeSource) -> Self {
        self.clock = self.clock.with_time_source(now);
        self.now = now;
        self
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn clock(&self) -> &CityClock {
        &self.clock
    }

    pub fn surface(&self) -> &Arc<dyn Surface> {
        &self.surface
    }

    pub fn set_loading(&self, loading: bool) {
        self.surface.set_loading(loading);
    }

    /// Drop whatever is shown and stop the clock.
    pub fn reset(&mut self) {
        self.clock.unbind();
        self.view = View::Empty;
        self.surface.clear();
    }

    pub fn show_failure(&mut self, message: &str) {
        self.clock.unbind();
        self.view = View::Failure(message.to_string());
        self.surface.show_failure(message);
    }

    /// Show one record and bind the clock to its timezone.
    pub fn show_record(&mut self, record: CityWeatherRecord, preferences: &UnitPreferences) -> Result<()> {
        let timezone = parse_timezone(&record.timezone_id)?;
        let displayed = DisplayedRecord::new(record, preferences, (self.now)())?;

        self.surface.show_record(&displayed);
        self.clock.bind(timezone);
        self.view = View::Record(displayed);
        Ok(())
    }

    pub fn show_candidates(&mut self, records: Vec<CityWeatherRecord>) {
        self.clock.unbind();
        let labels: Vec<String> = records.iter().map(CityWeatherRecord::label).collect();
        self.surface.show_candidates(&labels);
        self.view = View::Candidates(records);
    }

    /// Collapse the candidate list onto the chosen entry.
    ///
    /// Returns `Ok(false)` when no list is shown or `index` is out of range.
    pub fn select_candidate(&mut self, index: usize, preferences: &UnitPreferences) -> Result<bool> {
        let chosen = match &self.view {
            View::Candidates(records) => match records.get(index) {
                Some(record) => record.clone(),
                None => return Ok(false),
            },
            _ => return Ok(false),
        };

        debug!(index, city = %chosen.city_name, "candidate selected");
        self.show_record(chosen, preferences)?;
        Ok(true)
    }

    pub fn apply_temperature_unit(&mut self, unit: TemperatureUnit) {
        if let View::Record(displayed) = &mut self.view {
            displayed.set_temperature_unit(unit);
            self.surface.show_record(displayed);
        }
    }

    pub fn apply_wind_unit(&mut self, unit: WindUnit) {
        if let View::Record(displayed) = &mut self.view {
            displayed.set_wind_unit(unit);
            self.surface.show_record(displayed);
        }
    }

    pub fn apply_hour_format(&mut self, is_24h: bool) {
        self.clock.set_24h(is_24h);
    }
}
