use std::fmt;

/// Why a search text was refused before any request went out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputError {
    Empty,
    InvalidCharacters,
}

impl fmt::Display for InputError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputError::Empty => f.write_str("Empty search"),
            InputError::InvalidCharacters => f.write_str("City name contains invalid characters"),
        }
    }
}

/// The remote service a request was addressed to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Service {
    Geocoding,
    ReverseGeocoding,
    Forecast,
    IpLocation,
    PlatformLocation,
}

impl Service {
    pub fn as_str(&self) -> &'static str {
        match self {
            Service::Geocoding => "geocoding",
            Service::ReverseGeocoding => "reverse geocoding",
            Service::Forecast => "timezone and weather",
            Service::IpLocation => "IP location",
            Service::PlatformLocation => "platform location",
        }
    }
}

impl fmt::Display for Service {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum TransportKind {
    #[error("status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("{0}")]
    Request(#[source] reqwest::Error),

    #[error("unreadable response: {0}")]
    Decode(String),

    #[error("timed out after {0} ms")]
    Timeout(u64),

    #[error("{0}")]
    Unavailable(String),
}

#[derive(Debug, thiserror::Error)]
pub enum WeatherError {
    #[error("{0}")]
    InvalidInput(InputError),

    #[error("City not found")]
    NotFound,

    #[error("Failed to fetch {service} data: {kind}")]
    Transport {
        service: Service,
        #[source]
        kind: TransportKind,
    },

    #[error("{service} response is missing {what}")]
    MissingData { service: Service, what: String },

    #[error("internal consistency violation: {0}")]
    InternalConsistency(String),
}

impl WeatherError {
    pub fn transport(service: Service, kind: TransportKind) -> Self {
        WeatherError::Transport { service, kind }
    }

    pub fn missing(service: Service, what: impl Into<String>) -> Self {
        WeatherError::MissingData { service, what: what.into() }
    }

    /// Everything except an internal consistency breach goes to the failure view.
    pub fn is_user_facing(&self) -> bool {
        !matches!(self, WeatherError::InternalConsistency(_))
    }

    pub fn user_message(&self) -> String {
        self.to_string()
    }
}

impl From<InputError> for WeatherError {
    fn from(err: InputError) -> Self {
        WeatherError::InvalidInput(err)
    }
}

pub type Result<T, E = WeatherError> = std::result::Result<T, E>;
