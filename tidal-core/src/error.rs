use thiserror::Error;

/// Problems with a run's configuration. Always fatal, always raised before any worker starts.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error(
        "unknown activity profile \"{0}\" (available: {})",
        crate::PROFILE_NAMES.join(", ")
    )]
    UnknownProfile(String),

    #[error("unparsable timezone \"{0}\"")]
    InvalidTimezone(String),

    #[error("unknown connection mode \"{0}\" (expected `pool` or `session`)")]
    InvalidMode(String),

    #[error("at least one connection is required")]
    NoConnections,

    #[error("{0} must be greater than zero")]
    ZeroDuration(&'static str),

    #[error("{max_field} ({max}) is shorter than {min_field} ({min})")]
    InvertedRange {
        min_field: &'static str,
        max_field: &'static str,
        min: String,
        max: String,
    },

    #[error("activity level {0} is not a finite number")]
    InvalidActivityLevel(String),

    #[error("size maintenance is enabled but the target size is zero")]
    ZeroTargetSize,
}
