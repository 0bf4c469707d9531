use std::{path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, anyhow};
use clap::{Parser, Subcommand, ValueEnum};
use cityweather_core::{
    Command as AppCommand, Config, Coordinates, FileStore, Orchestrator, Outcome, PlatformLocator,
    PreferenceStore, Services, View,
    provider::{FixedPosition, NoPlatformLocation},
};
use inquire::Select;
use tracing::debug;

use crate::surface::{TerminalSurface, terminal_prefers_dark};

/// Top-level CLI struct.
#[derive(Debug, Parser)]
#[command(name = "cityweather", version, about = "Current weather and local time for any city")]
pub struct Cli {
    /// Log debug output to stderr.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of the platform default.
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up a city by name.
    Search {
        /// City name: letters, spaces, hyphens and apostrophes only.
        city: String,

        /// Take the first match instead of asking when several cities match.
        #[arg(long)]
        first: bool,

        /// Keep the local clock ticking for this many seconds (Ctrl-C stops early).
        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Weather where you are: given position, then IP address, then the fallback city.
    Locate {
        #[arg(long, requires = "lon", allow_hyphen_values = true)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", allow_hyphen_values = true)]
        lon: Option<f64>,

        #[arg(long, value_name = "SECS")]
        watch: Option<u64>,
    },

    /// Flip a display preference.
    Toggle { setting: Setting },

    /// Show the stored display preferences.
    Prefs,

    /// Inspect or create the config file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Setting {
    Theme,
    Temperature,
    Wind,
    HourFormat,
}

impl From<Setting> for AppCommand {
    fn from(setting: Setting) -> Self {
        match setting {
            Setting::Theme => AppCommand::ToggleTheme,
            Setting::Temperature => AppCommand::ToggleTemperatureUnit,
            Setting::Wind => AppCommand::ToggleWindUnit,
            Setting::HourFormat => AppCommand::ToggleHourFormat,
        }
    }
}

#[derive(Debug, Subcommand)]
pub enum ConfigAction {
    /// Print where the config file lives.
    Path,
    /// Write a config file with every default spelled out.
    Init {
        #[arg(long)]
        force: bool,
    },
}

impl Cli {
    pub async fn run(self) -> anyhow::Result<ExitCode> {
        let config_path = match &self.config {
            Some(path) => path.clone(),
            None => Config::config_file_path()?,
        };
        let config = Config::load_from(&config_path)?;

        match self.command {
            Command::Config { action } => {
                configure(action, &config, &config_path)?;
                Ok(ExitCode::SUCCESS)
            }
            Command::Search { city, first, watch } => {
                let mut app = build_app(&config, Arc::new(NoPlatformLocation))?;
                let outcome = app.handle(AppCommand::Search(city)).await?;
                let outcome = match outcome {
                    Outcome::Candidates(count) => pick_candidate(&mut app, count, first).await?,
                    other => other,
                };
                finish(&app, outcome, watch).await
            }
            Command::Locate { lat, lon, watch } => {
                let platform: Arc<dyn PlatformLocator> = match (lat, lon) {
                    (Some(lat), Some(lon)) => Arc::new(FixedPosition(Coordinates::new(lat, lon))),
                    _ => Arc::new(NoPlatformLocation),
                };
                let mut app = build_app(&config, platform)?;
                let outcome = app.handle(AppCommand::LocateMe).await?;
                finish(&app, outcome, watch).await
            }
            Command::Toggle { setting } => {
                let mut app = build_app(&config, Arc::new(NoPlatformLocation))?;
                app.handle(setting.into()).await?;
                Ok(ExitCode::SUCCESS)
            }
            // Building the app prints the preferences.
            Command::Prefs => {
                build_app(&config, Arc::new(NoPlatformLocation))?;
                Ok(ExitCode::SUCCESS)
            }
        }
    }
}

fn build_app(config: &Config, platform: Arc<dyn PlatformLocator>) -> anyhow::Result<Orchestrator> {
    let store_path = match &config.preferences_file {
        Some(path) => path.clone(),
        None => FileStore::default_path()?,
    };
    let store: Arc<dyn PreferenceStore> = Arc::new(FileStore::open(store_path)?);
    let services = Services::from_config(config, platform)?;

    Ok(Orchestrator::new(
        services,
        config.geolocation.clone(),
        store,
        Arc::new(TerminalSurface::new()),
        terminal_prefers_dark(),
    ))
}

async fn pick_candidate(app: &mut Orchestrator, count: usize, first: bool) -> anyhow::Result<Outcome> {
    let labels: Vec<String> = match app.view() {
        View::Candidates(records) => records.iter().map(|r| r.label()).collect(),
        _ => return Ok(Outcome::Candidates(count)),
    };

    let index = if first {
        0
    } else {
        // Labels can repeat, so the list position is what identifies the city.
        Select::new("Several cities match. Which one?", labels)
            .raw_prompt()
            .context("No city selected")?
            .index
    };

    debug!(index, "picked candidate");
    Ok(app.handle(AppCommand::SelectCandidate(index)).await?)
}

/// The surface has already printed any failure; only the exit code is left.
async fn finish(app: &Orchestrator, outcome: Outcome, watch: Option<u64>) -> anyhow::Result<ExitCode> {
    if let Outcome::Failure(_) = outcome {
        return Ok(ExitCode::FAILURE);
    }

    if let Some(secs) = watch {
        if app.display().clock().is_running() {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                _ = tokio::signal::ctrl_c() => {}
            }
        }
    }

    Ok(ExitCode::SUCCESS)
}

fn configure(action: ConfigAction, config: &Config, path: &std::path::Path) -> anyhow::Result<()> {
    match action {
        ConfigAction::Path => {
            println!("{}", path.display());
            Ok(())
        }
        ConfigAction::Init { force } => {
            if path.exists() && !force {
                return Err(anyhow!(
                    "Config file already exists: {}\nHint: pass --force to overwrite it.",
                    path.display()
                ));
            }
            config.save_to(path)?;
            println!("Wrote {}", path.display());
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_search_flags() {
        let cli = Cli::try_parse_from(["cityweather", "search", "new york", "--first", "--watch", "5"])
            .unwrap();

        match cli.command {
            Command::Search { city, first, watch } => {
                assert_eq!(city, "new york");
                assert!(first);
                assert_eq!(watch, Some(5));
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn locate_needs_both_coordinates() {
        assert!(Cli::try_parse_from(["cityweather", "locate", "--lat", "1.0"]).is_err());

        let cli =
            Cli::try_parse_from(["cityweather", "locate", "--lat", "-33.9", "--lon", "18.4"]).unwrap();
        assert!(matches!(cli.command, Command::Locate { lat: Some(_), lon: Some(_), .. }));
    }

    #[test]
    fn toggle_settings_map_to_commands() {
        let cli = Cli::try_parse_from(["cityweather", "toggle", "hour-format"]).unwrap();
        match cli.command {
            Command::Toggle { setting } => {
                assert_eq!(AppCommand::from(setting), AppCommand::ToggleHourFormat)
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn config_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "").unwrap();

        let err = configure(ConfigAction::Init { force: false }, &Config::default(), &path).unwrap_err();
        assert!(err.to_string().contains("--force"));

        configure(ConfigAction::Init { force: true }, &Config::default(), &path).unwrap();
        assert_eq!(Config::load_from(&path).unwrap(), Config::default());
    }
}
