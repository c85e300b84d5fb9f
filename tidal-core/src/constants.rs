use std::time::Duration;

/// Below this activity level a worker treats the system as closed and idles.
pub const MIN_ACTIVITY_LEVEL: f64 = 0.01;

/// Upper bound any profile may report, weekend multipliers included.
pub const MAX_ACTIVITY_LEVEL: f64 = 1.4;

/// Poll interval used while the activity level is below [`MIN_ACTIVITY_LEVEL`].
pub const CLOSED_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Pool-mode delay after a query at zero activity. Scaled by `1 - level`.
pub const MAX_PACING_DELAY: Duration = Duration::from_millis(1000);

/// Sessions never shrink below this, however quiet the profile is.
pub const MIN_SESSION_DURATION: Duration = Duration::from_secs(1);

/// Database size may exceed the target by this factor before maintenance deletes anything.
pub const SIZE_TOLERANCE: f64 = 1.10;

pub const DEFAULT_CONNECTIONS: usize = 10;
pub const DEFAULT_PROFILE: &str = "local-office";
pub const DEFAULT_TIMEZONE: &str = "UTC";
pub const DEFAULT_REPORT_INTERVAL: Duration = Duration::from_secs(10);
pub const DEFAULT_SESSION_MIN: Duration = Duration::from_secs(60);
pub const DEFAULT_SESSION_MAX: Duration = Duration::from_secs(600);
pub const DEFAULT_THINK_MIN: Duration = Duration::from_millis(500);
pub const DEFAULT_THINK_MAX: Duration = Duration::from_millis(5_000);
pub const DEFAULT_SESSION_PAUSE_MIN: Duration = Duration::from_secs(1);
pub const DEFAULT_SESSION_PAUSE_MAX: Duration = Duration::from_secs(5);
pub const DEFAULT_CLEANUP_INTERVAL: Duration = Duration::from_secs(300);
