use crate::{
    ConfigError, DEFAULT_CLEANUP_INTERVAL, DEFAULT_CONNECTIONS, DEFAULT_PROFILE,
    DEFAULT_REPORT_INTERVAL, DEFAULT_SESSION_MAX, DEFAULT_SESSION_MIN, DEFAULT_SESSION_PAUSE_MAX,
    DEFAULT_SESSION_PAUSE_MIN, DEFAULT_THINK_MAX, DEFAULT_THINK_MIN, DEFAULT_TIMEZONE,
};
#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
#[allow(unused_imports)]
#[cfg(feature = "serde")]
use serde_with::{serde_as, DurationMilliSeconds, DurationSeconds};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// How a worker uses its dedicated connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "lowercase"))]
pub enum ConnectionMode {
    /// One query, a short activity-scaled pause, repeat. Web traffic through a pool.
    #[default]
    Pool,
    /// Long-lived sessions with think time between queries. Interactive users.
    Session,
}

impl FromStr for ConnectionMode {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pool" => Ok(Self::Pool),
            "session" => Ok(Self::Session),
            _ => Err(ConfigError::InvalidMode(s.to_string())),
        }
    }
}

impl fmt::Display for ConnectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pool => write!(f, "pool"),
            Self::Session => write!(f, "session"),
        }
    }
}

/// Everything a single run needs. Built once, never mutated while the run is live.
#[derive(Clone, Debug)]
#[cfg_attr(feature = "serde", cfg_eval::cfg_eval, serde_as)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct ExecutorConfig {
    /// Opaque connection target handed to the connector.
    pub endpoint: String,
    pub connections: usize,
    pub profile: String,
    pub timezone: String,
    /// Zero disables the periodic report; the final summary is still produced.
    #[cfg_attr(feature = "serde", serde_as(as = "DurationSeconds"))]
    pub report_interval: Duration,
    /// `None` runs until cancelled.
    #[cfg_attr(feature = "serde", serde_as(as = "Option<DurationSeconds>"))]
    pub duration: Option<Duration>,
    pub mode: ConnectionMode,
    #[cfg_attr(feature = "serde", serde_as(as = "DurationSeconds"))]
    pub session_min: Duration,
    #[cfg_attr(feature = "serde", serde_as(as = "DurationSeconds"))]
    pub session_max: Duration,
    #[cfg_attr(feature = "serde", serde_as(as = "DurationMilliSeconds"))]
    pub think_min: Duration,
    #[cfg_attr(feature = "serde", serde_as(as = "DurationMilliSeconds"))]
    pub think_max: Duration,
    /// Pause between the end of one session and the start of the next.
    #[cfg_attr(feature = "serde", serde_as(as = "DurationMilliSeconds"))]
    pub session_pause_min: Duration,
    #[cfg_attr(feature = "serde", serde_as(as = "DurationMilliSeconds"))]
    pub session_pause_max: Duration,
    pub maintain_size: bool,
    /// Target database size in bytes.
    pub target_size: u64,
    #[cfg_attr(feature = "serde", serde_as(as = "DurationSeconds"))]
    pub cleanup_interval: Duration,
}

impl Default for ExecutorConfig {
    fn default() -> Self {
        Self {
            endpoint: String::new(),
            connections: DEFAULT_CONNECTIONS,
            profile: DEFAULT_PROFILE.to_string(),
            timezone: DEFAULT_TIMEZONE.to_string(),
            report_interval: DEFAULT_REPORT_INTERVAL,
            duration: None,
            mode: ConnectionMode::Pool,
            session_min: DEFAULT_SESSION_MIN,
            session_max: DEFAULT_SESSION_MAX,
            think_min: DEFAULT_THINK_MIN,
            think_max: DEFAULT_THINK_MAX,
            session_pause_min: DEFAULT_SESSION_PAUSE_MIN,
            session_pause_max: DEFAULT_SESSION_PAUSE_MAX,
            maintain_size: false,
            target_size: 0,
            cleanup_interval: DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl ExecutorConfig {
    pub fn new(endpoint: &str) -> Self {
        Self {
            endpoint: endpoint.to_string(),
            ..Self::default()
        }
    }

    /// Checks the structural invariants. Profile and timezone names are
    /// resolved separately by [`crate::Profile::from_name`].
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.connections == 0 {
            return Err(ConfigError::NoConnections);
        }

        if self.duration.is_some_and(|d| d.is_zero()) {
            return Err(ConfigError::ZeroDuration("duration"));
        }

        if self.mode == ConnectionMode::Session {
            ordered("session_min", self.session_min, "session_max", self.session_max)?;
            ordered("think_min", self.think_min, "think_max", self.think_max)?;
            ordered(
                "session_pause_min",
                self.session_pause_min,
                "session_pause_max",
                self.session_pause_max,
            )?;
        }

        if self.maintain_size {
            if self.target_size == 0 {
                return Err(ConfigError::ZeroTargetSize);
            }
            if self.cleanup_interval.is_zero() {
                return Err(ConfigError::ZeroDuration("cleanup_interval"));
            }
        }

        Ok(())
    }
}

fn ordered(
    min_field: &'static str,
    min: Duration,
    max_field: &'static str,
    max: Duration,
) -> Result<(), ConfigError> {
    if max < min {
        Err(ConfigError::InvertedRange {
            min_field,
            max_field,
            min: humantime::format_duration(min).to_string(),
            max: humantime::format_duration(max).to_string(),
        })
    } else {
        Ok(())
    }
}
