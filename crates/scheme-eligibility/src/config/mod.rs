use std::env;
use std::fmt;
use std::net::{IpAddr, SocketAddr};

use chrono::NaiveDate;

use crate::eligibility::{ClassificationPolicy, EvaluationClock, PARTIAL_MATCH_THRESHOLD};

/// Longest accepted dashboard deadline window, in days.
pub const MAX_DEADLINE_WINDOW_DAYS: u32 = 3_650;

/// Deployment stage, from `APP_ENV`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Everything the service reads from the environment at startup.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub server: ServerConfig,
    pub telemetry: TelemetryConfig,
    pub matching: MatchingConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(&var_or("APP_ENV", "development"));
        let host = var_or("APP_HOST", "127.0.0.1");
        let port = var_or("APP_PORT", "3000")
            .trim()
            .parse::<u16>()
            .map_err(|_| ConfigError::InvalidPort)?;
        let log_level = var_or("APP_LOG_LEVEL", "info");

        Ok(Self {
            environment,
            server: ServerConfig { host, port },
            telemetry: TelemetryConfig { log_level },
            matching: MatchingConfig::from_env()?,
        })
    }
}

fn var_or(name: &str, default: &str) -> String {
    env::var(name).unwrap_or_else(|_| default.to_string())
}

/// Bind address for the HTTP service.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    pub fn socket_addr(&self) -> Result<SocketAddr, ConfigError> {
        if self.host.eq_ignore_ascii_case("localhost") {
            return Ok(SocketAddr::new(IpAddr::from([127, 0, 0, 1]), self.port));
        }

        let ip: IpAddr = self
            .host
            .parse()
            .map_err(|source| ConfigError::InvalidHost { source })?;

        Ok(SocketAddr::new(ip, self.port))
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
}

/// Knobs for classification and the evaluation clock.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchingConfig {
    pub partial_threshold: u8,
    /// Pins "today" for age derivation and deadline checks; unset means the system clock.
    pub clock_date: Option<NaiveDate>,
    pub deadline_window_days: u32,
}

impl Default for MatchingConfig {
    fn default() -> Self {
        Self {
            partial_threshold: PARTIAL_MATCH_THRESHOLD,
            clock_date: None,
            deadline_window_days: 7,
        }
    }
}

impl MatchingConfig {
    fn from_env() -> Result<Self, ConfigError> {
        let defaults = Self::default();

        let partial_threshold = match env::var("ELIGIBILITY_PARTIAL_THRESHOLD") {
            Ok(raw) => raw
                .trim()
                .parse::<u8>()
                .ok()
                .filter(|value| *value <= 100)
                .ok_or(ConfigError::InvalidThreshold { value: raw })?,
            Err(_) => defaults.partial_threshold,
        };

        let clock_date = match env::var("ELIGIBILITY_CLOCK_DATE") {
            Ok(raw) if !raw.trim().is_empty() => Some(
                NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d")
                    .map_err(|_| ConfigError::InvalidClockDate { value: raw })?,
            ),
            _ => None,
        };

        let deadline_window_days = match env::var("ELIGIBILITY_DEADLINE_WINDOW_DAYS") {
            Ok(raw) => raw
                .trim()
                .parse::<u32>()
                .ok()
                .filter(|days| *days <= MAX_DEADLINE_WINDOW_DAYS)
                .ok_or(ConfigError::InvalidDeadlineWindow { value: raw })?,
            Err(_) => defaults.deadline_window_days,
        };

        Ok(Self {
            partial_threshold,
            clock_date,
            deadline_window_days,
        })
    }

    pub fn policy(&self) -> ClassificationPolicy {
        ClassificationPolicy::new(self.partial_threshold)
    }

    pub fn clock(&self) -> EvaluationClock {
        match self.clock_date {
            Some(date) => EvaluationClock::Fixed(date),
            None => EvaluationClock::System,
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidPort,
    InvalidHost { source: std::net::AddrParseError },
    InvalidThreshold { value: String },
    InvalidClockDate { value: String },
    InvalidDeadlineWindow { value: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::InvalidPort => write!(f, "APP_PORT must be a valid u16"),
            ConfigError::InvalidHost { .. } => {
                write!(f, "APP_HOST must parse to an IPv4 or IPv6 address")
            }
            ConfigError::InvalidThreshold { value } => write!(
                f,
                "ELIGIBILITY_PARTIAL_THRESHOLD must be an integer between 0 and 100 (got '{value}')"
            ),
            ConfigError::InvalidClockDate { value } => write!(
                f,
                "ELIGIBILITY_CLOCK_DATE must be formatted as YYYY-MM-DD (got '{value}')"
            ),
            ConfigError::InvalidDeadlineWindow { value } => write!(
                f,
                "ELIGIBILITY_DEADLINE_WINDOW_DAYS must be a whole number of days up to \
                 {MAX_DEADLINE_WINDOW_DAYS} (got '{value}')"
            ),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::InvalidHost { source } => Some(source),
            ConfigError::InvalidPort
            | ConfigError::InvalidThreshold { .. }
            | ConfigError::InvalidClockDate { .. }
            | ConfigError::InvalidDeadlineWindow { .. } => None,
        }
    }
}
