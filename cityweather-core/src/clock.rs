//! Local time of the displayed city, re-rendered every second.

use std::{
    fmt,
    sync::{
        Arc,
        atomic::{AtomicBool, Ordering},
    },
    time::Duration,
};

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::{
    task::JoinHandle,
    time::{Instant, MissedTickBehavior},
};
use tracing::debug;

use crate::error::{Result, Service, WeatherError};

pub const TICK: Duration = Duration::from_secs(1);

pub type TimeSource = fn() -> DateTime<Utc>;
pub type TickFn = Arc<dyn Fn(String) + Send + Sync>;

pub fn parse_timezone(id: &str) -> Result<Tz> {
    id.parse::<Tz>()
        .map_err(|_| WeatherError::missing(Service::Forecast, format!("a known timezone (got '{id}')")))
}

/// `14:05:09`, or `02:05:09 PM` on a 12-hour clock.
pub fn format_local_time(timezone: Tz, instant: DateTime<Utc>, is_24h: bool) -> String {
    let local = instant.with_timezone(&timezone);
    if is_24h {
        local.format("%H:%M:%S").to_string()
    } else {
        local.format("%I:%M:%S %p").to_string()
    }
}

pub fn format_local_date(timezone: Tz, instant: DateTime<Utc>) -> String {
    instant.with_timezone(&timezone).format("%Y-%m-%d").to_string()
}

struct Binding {
    timezone: Tz,
    task: JoinHandle<()>,
}

/// At most one ticking clock. Binding a new timezone aborts the previous task
/// before the new one is spawned.
pub struct CityClock {
    on_tick: TickFn,
    is_24h: Arc<AtomicBool>,
    now: TimeSource,
    binding: Option<Binding>,
}

impl fmt::Debug for CityClock {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CityClock")
            .field("timezone", &self.timezone())
            .field("is_24h", &self.is_24h.load(Ordering::Relaxed))
            .finish()
    }
}

impl CityClock {
    pub fn new(on_tick: TickFn, is_24h: bool) -> Self {
        Self { on_tick, is_24h: Arc::new(AtomicBool::new(is_24h)), now: Utc::now, binding: None }
    }

    pub fn with_time_source(mut self, now: TimeSource) -> Self {
        self.now = now;
        self
    }

    pub fn timezone(&self) -> Option<Tz> {
        self.binding.as_ref().map(|b| b.timezone)
    }

    pub fn is_running(&self) -> bool {
        self.binding.as_ref().is_some_and(|b| !b.task.is_finished())
    }

    /// Show the time in `timezone` now and once per second from here on.
    /// Must be called inside a tokio runtime.
    pub fn bind(&mut self, timezone: Tz) {
        self.unbind();

        let is_24h = self.is_24h.load(Ordering::Relaxed);
        (self.on_tick)(format_local_time(timezone, (self.now)(), is_24h));

        let on_tick = Arc::clone(&self.on_tick);
        let flag = Arc::clone(&self.is_24h);
        let now = self.now;
        let task = tokio::spawn(async move {
            let mut ticks = tokio::time::interval_at(Instant::now() + TICK, TICK);
            ticks.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                ticks.tick().await;
                on_tick(format_local_time(timezone, now(), flag.load(Ordering::Relaxed)));
            }
        });

        debug!(%timezone, "clock bound");
        self.binding = Some(Binding { timezone, task });
    }

    pub fn unbind(&mut self) {
        if let Some(previous) = self.binding.take() {
            previous.task.abort();
            debug!(timezone = %previous.timezone, "clock unbound");
        }
    }

    /// Switch 12/24-hour display; a bound clock re-renders immediately.
    pub fn set_24h(&mut self, is_24h: bool) {
        self.is_24h.store(is_24h, Ordering::Relaxed);
        if let Some(binding) = &self.binding {
            (self.on_tick)(format_local_time(binding.timezone, (self.now)(), is_24h));
        }
    }
}

impl Drop for CityClock {
    fn drop(&mut self) {
        self.unbind();
    }
}
