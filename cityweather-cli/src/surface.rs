//! Plain terminal rendering of what the core asks to show.

use cityweather_core::{DisplayedRecord, Surface, UnitPreferences};

#[derive(Debug, Default)]
pub struct TerminalSurface;

impl TerminalSurface {
    pub fn new() -> Self {
        Self
    }
}

impl Surface for TerminalSurface {
    fn set_loading(&self, loading: bool) {
        if loading {
            eprintln!("Loading...");
        }
    }

    fn clear(&self) {}

    fn show_failure(&self, message: &str) {
        eprintln!("Error: {message}");
    }

    fn show_record(&self, record: &DisplayedRecord) {
        println!("{}", render_record(record));
    }

    fn show_candidates(&self, labels: &[String]) {
        println!("{}", render_candidates(labels));
    }

    fn show_time(&self, time: &str) {
        println!("🕒 {time}");
    }

    fn show_preferences(&self, preferences: &UnitPreferences) {
        println!("{}", render_preferences(preferences));
    }
}

fn render_record(shown: &DisplayedRecord) -> String {
    let record = &shown.record;
    format!(
        "{}\n{}\n{}\n{} {}\nTemperature: {}\nWind: {}",
        record.label(),
        shown.local_date,
        record.timezone_line(),
        record.weather_icon,
        record.weather_type,
        shown.temperature_text(),
        shown.wind_text(),
    )
}

fn render_candidates(labels: &[String]) -> String {
    let mut out = format!("{} cities match:", labels.len());
    for (i, label) in labels.iter().enumerate() {
        out.push_str(&format!("\n  {}. {label}", i + 1));
    }
    out
}

fn render_preferences(preferences: &UnitPreferences) -> String {
    format!(
        "theme: {} [{}]\ntemperature: {} [{}]\nwind: {} [{}]\nclock: {} [{}]",
        preferences.theme.as_str(),
        preferences.theme.button_glyph(),
        preferences.temperature_unit.symbol(),
        preferences.temperature_unit.button_glyph(),
        preferences.wind_unit.symbol(),
        preferences.wind_unit.button_glyph(),
        if preferences.hour_format_is_24h { "24h" } else { "12h" },
        preferences.hour_format_glyph(),
    )
}

/// Reads the terminal background from `COLORFGBG` ("fg;bg" or "fg;default;bg").
pub fn terminal_prefers_dark() -> bool {
    std::env::var("COLORFGBG").is_ok_and(|value| background_is_dark(&value))
}

fn background_is_dark(colorfgbg: &str) -> bool {
    colorfgbg
        .rsplit(';')
        .next()
        .and_then(|bg| bg.trim().parse::<u8>().ok())
        .is_some_and(|bg| bg <= 6 || bg == 8)
}
