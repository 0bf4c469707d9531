//! The orchestrator: one handler per user action, sequencing lookups and
//! keeping the display consistent with the latest one.

use std::sync::Arc;

use tracing::{debug, error, warn};

use crate::{
    config::GeolocationConfig,
    display::{DisplayController, Surface, View},
    error::{Result, WeatherError},
    geolocation,
    input::SearchQuery,
    model::{CityWeatherRecord, ForecastRequest},
    normalize,
    preferences::{PreferenceStore, UnitPreferences},
    provider::Services,
    resolver::LocationResolver,
};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Search(String),
    LocateMe,
    SelectCandidate(usize),
    ToggleTheme,
    ToggleTemperatureUnit,
    ToggleWindUnit,
    ToggleHourFormat,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Loading,
}

/// What a command ended up doing to the display.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Record,
    Candidates(usize),
    Failure(String),
    Preferences(UnitPreferences),
    /// The command did not apply to what is shown.
    Ignored,
    /// A newer lookup started before this one finished.
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Search(String),
    Locate,
}

/// Identifies one lookup; only the most recently issued ticket may render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Ticket(u64);

/// A lookup that has been announced but not yet run. Holds no borrow of the
/// orchestrator, so several may be in flight.
#[derive(Debug)]
pub struct PendingLookup {
    ticket: Ticket,
    lookup: Lookup,
    services: Services,
    geolocation: GeolocationConfig,
}

#[derive(Debug)]
pub struct CompletedLookup {
    ticket: Ticket,
    result: Result<Vec<CityWeatherRecord>>,
}

impl PendingLookup {
    pub fn ticket(&self) -> Ticket {
        self.ticket
    }

    pub async fn run(self) -> CompletedLookup {
        let result = match &self.lookup {
            Lookup::Search(raw) => search(&self.services, raw).await,
            Lookup::Locate => locate(&self.services, &self.geolocation).await,
        };
        CompletedLookup { ticket: self.ticket, result }
    }
}

/// Geocode, fetch weather for every candidate in one request, merge.
async fn search(services: &Services, raw: &str) -> Result<Vec<CityWeatherRecord>> {
    let query = SearchQuery::parse(raw)?;

    let resolver = LocationResolver::new(Arc::clone(&services.geocoder));
    let candidates = resolver.resolve_by_name(&query).await?;

    let requests: Vec<ForecastRequest> = candidates.iter().map(ForecastRequest::from).collect();
    let snapshots = services.weather.fetch(&requests).await?;

    normalize::merge(candidates, snapshots)
}

async fn locate(services: &Services, config: &GeolocationConfig) -> Result<Vec<CityWeatherRecord>> {
    let located = geolocation::locate(services, config).await;

    let snapshots = services.weather.fetch(&[ForecastRequest::auto(located.coordinates)]).await?;
    let snapshot = match <[_; 1]>::try_from(snapshots) {
        Ok([snapshot]) => snapshot,
        Err(other) => {
            return Err(WeatherError::InternalConsistency(format!(
                "requested weather for 1 location, received {}",
                other.len()
            )));
        }
    };

    Ok(vec![located.into_record(snapshot)])
}

/// Mutable application state, owned by the orchestrator.
#[derive(Debug, Clone, PartialEq)]
pub struct AppState {
    pub preferences: UnitPreferences,
    pub phase: Phase,
    latest: u64,
}

impl AppState {
    fn issue_ticket(&mut self) -> Ticket {
        self.latest += 1;
        Ticket(self.latest)
    }

    fn is_latest(&self, ticket: Ticket) -> bool {
        ticket.0 == self.latest
    }
}

#[derive(Debug)]
pub struct Orchestrator {
    services: Services,
    geolocation: GeolocationConfig,
    store: Arc<dyn PreferenceStore>,
    display: DisplayController,
    state: AppState,
}

impl Orchestrator {
    /// Load preferences (falling back to the platform theme), persist and show them.
    pub fn new(
        services: Services,
        geolocation: GeolocationConfig,
        store: Arc<dyn PreferenceStore>,
        surface: Arc<dyn Surface>,
        prefers_dark: bool,
    ) -> Self {
        let preferences = UnitPreferences::load(store.as_ref(), prefers_dark);
        let display = DisplayController::new(surface, preferences.hour_format_is_24h);
        Self::with_display(services, geolocation, store, display, preferences)
    }

    pub fn with_display(
        services: Services,
        geolocation: GeolocationConfig,
        store: Arc<dyn PreferenceStore>,
        display: DisplayController,
        preferences: UnitPreferences,
    ) -> Self {
        if let Err(err) = preferences.save_all(store.as_ref()) {
            warn!("Failed to persist preferences: {err:#}");
        }
        display.surface().show_preferences(&preferences);

        Self {
            services,
            geolocation,
            store,
            display,
            state: AppState { preferences, phase: Phase::Idle, latest: 0 },
        }
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn preferences(&self) -> &UnitPreferences {
        &self.state.preferences
    }

    pub fn view(&self) -> &View {
        self.display.view()
    }

    pub fn display(&self) -> &DisplayController {
        &self.display
    }

    /// Run one user action to completion.
    ///
    /// User-facing failures are rendered and reported as [`Outcome::Failure`];
    /// only an internal consistency breach comes back as `Err`.
    pub async fn handle(&mut self, command: Command) -> Result<Outcome> {
        match command {
            Command::Search(text) => self.lookup(Lookup::Search(text)).await,
            Command::LocateMe => self.lookup(Lookup::Locate).await,
            Command::SelectCandidate(index) => self.select_candidate(index),
            Command::ToggleTheme => Ok(self.toggle_theme()),
            Command::ToggleTemperatureUnit => Ok(self.toggle_temperature_unit()),
            Command::ToggleWindUnit => Ok(self.toggle_wind_unit()),
            Command::ToggleHourFormat => Ok(self.toggle_hour_format()),
        }
    }

    async fn lookup(&mut self, lookup: Lookup) -> Result<Outcome> {
        let pending = self.begin(lookup);
        let done = pending.run().await;
        self.complete(done)
    }

    /// Enter `Loading`: clear the display and issue a fresh ticket.
    pub fn begin(&mut self, lookup: Lookup) -> PendingLookup {
        let ticket = self.state.issue_ticket();
        self.state.phase = Phase::Loading;
        self.display.reset();
        self.display.set_loading(true);
        debug!(?ticket, ?lookup, "lookup started");

        PendingLookup {
            ticket,
            lookup,
            services: self.services.clone(),
            geolocation: self.geolocation.clone(),
        }
    }

    /// Render a finished lookup, unless a newer one has been issued since.
    pub fn complete(&mut self, done: CompletedLookup) -> Result<Outcome> {
        if !self.state.is_latest(done.ticket) {
            debug!(ticket = ?done.ticket, "discarding stale lookup");
            return Ok(Outcome::Stale);
        }

        self.state.phase = Phase::Idle;
        self.display.set_loading(false);

        let outcome = done.result.and_then(|mut records| match records.len() {
            0 => Err(WeatherError::NotFound),
            1 => {
                let record = records.remove(0);
                self.display.show_record(record, &self.state.preferences)?;
                Ok(Outcome::Record)
            }
            n => {
                self.display.show_candidates(records);
                Ok(Outcome::Candidates(n))
            }
        });

        self.settle(outcome)
    }

    fn settle(&mut self, outcome: Result<Outcome>) -> Result<Outcome> {
        match outcome {
            Ok(outcome) => Ok(outcome),
            Err(err) if err.is_user_facing() => {
                let message = err.user_message();
                debug!(%message, "lookup failed");
                self.display.show_failure(&message);
                Ok(Outcome::Failure(message))
            }
            Err(err) => {
                error!("{err}");
                Err(err)
            }
        }
    }

    fn select_candidate(&mut self, index: usize) -> Result<Outcome> {
        let selected = self.display.select_candidate(index, &self.state.preferences);
        match selected {
            Ok(true) => Ok(Outcome::Record),
            Ok(false) => Ok(Outcome::Ignored),
            Err(err) => self.settle(Err(err)),
        }
    }

    fn persist(&self, result: anyhow::Result<()>) {
        if let Err(err) = result {
            warn!("Failed to persist preference: {err:#}");
        }
    }

    fn announce_preferences(&self) -> Outcome {
        self.display.surface().show_preferences(&self.state.preferences);
        Outcome::Preferences(self.state.preferences)
    }

    fn toggle_theme(&mut self) -> Outcome {
        self.state.preferences.theme = self.state.preferences.theme.toggled();
        self.persist(self.state.preferences.save_theme(self.store.as_ref()));
        self.announce_preferences()
    }

    fn toggle_temperature_unit(&mut self) -> Outcome {
        let unit = self.state.preferences.temperature_unit.toggled();
        self.state.preferences.temperature_unit = unit;
        self.persist(self.state.preferences.save_temperature_unit(self.store.as_ref()));
        self.display.apply_temperature_unit(unit);
        self.announce_preferences()
    }

    fn toggle_wind_unit(&mut self) -> Outcome {
        let unit = self.state.preferences.wind_unit.toggled();
        self.state.preferences.wind_unit = unit;
        self.persist(self.state.preferences.save_wind_unit(self.store.as_ref()));
        self.display.apply_wind_unit(unit);
        self.announce_preferences()
    }

    fn toggle_hour_format(&mut self) -> Outcome {
        let is_24h = !self.state.preferences.hour_format_is_24h;
        self.state.preferences.hour_format_is_24h = is_24h;
        self.persist(self.state.preferences.save_hour_format(self.store.as_ref()));
        self.display.apply_hour_format(is_24h);
        self.announce_preferences()
    }
}
