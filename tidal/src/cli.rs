//! Command-line surface for binaries that embed the engine. (requires `cli` feature)
//!
//! Flatten [`TidalArgs`] into a binary's own `clap` parser, convert it into an
//! [`ExecutorConfig`], and hand the executor to [`run_until_signal`].
use crate::error::ExecutorError;
use crate::executor::Executor;
use clap::builder::PossibleValuesParser;
use clap::Args;
use tidal_core::{ConnectionMode, ExecutorConfig, RunSummary, PROFILE_NAMES};
use tokio_util::sync::CancellationToken;
#[allow(unused)]
use tracing::{debug, error, info, instrument, warn};

#[derive(Args, Debug, Clone)]
pub struct TidalArgs {
    /// Connection target handed to the workload's connector.
    #[arg(long, default_value = "")]
    pub endpoint: String,

    /// Number of simulated clients, each with one dedicated connection.
    #[arg(short, long, default_value_t = tidal_core::DEFAULT_CONNECTIONS)]
    pub connections: usize,

    /// Activity profile.
    #[arg(
        short,
        long,
        default_value = tidal_core::DEFAULT_PROFILE,
        value_parser = PossibleValuesParser::new(PROFILE_NAMES)
    )]
    pub profile: String,

    /// IANA timezone for the local profiles, e.g. `America/New_York`.
    #[arg(long, default_value = tidal_core::DEFAULT_TIMEZONE)]
    pub timezone: String,

    /// Period of the progress log line. `0s` disables it.
    #[arg(long, default_value = "10s")]
    pub report_interval: humantime::Duration,

    /// How long to run. `0s` runs until interrupted.
    #[arg(short, long, default_value = "0s")]
    pub duration: humantime::Duration,

    /// `pool` or `session`.
    #[arg(short, long, default_value = "pool")]
    pub mode: ConnectionMode,

    #[arg(long, default_value = "60s")]
    pub session_min: humantime::Duration,

    #[arg(long, default_value = "10m")]
    pub session_max: humantime::Duration,

    /// Think time between queries inside a session.
    #[arg(long, default_value = "500ms")]
    pub think_min: humantime::Duration,

    #[arg(long, default_value = "5s")]
    pub think_max: humantime::Duration,

    /// Pause between consecutive sessions of one client.
    #[arg(long, default_value = "1s")]
    pub session_pause_min: humantime::Duration,

    #[arg(long, default_value = "5s")]
    pub session_pause_max: humantime::Duration,

    /// Periodically delete the oldest data to stay near --target-size.
    #[arg(long)]
    pub maintain_size: bool,

    /// Target database size in bytes.
    #[arg(long, default_value_t = 0)]
    pub target_size: u64,

    #[arg(long, default_value = "5m")]
    pub cleanup_interval: humantime::Duration,
}

impl From<TidalArgs> for ExecutorConfig {
    fn from(args: TidalArgs) -> Self {
        let duration: std::time::Duration = args.duration.into();
        Self {
            endpoint: args.endpoint,
            connections: args.connections,
            profile: args.profile,
            timezone: args.timezone,
            report_interval: args.report_interval.into(),
            duration: (!duration.is_zero()).then_some(duration),
            mode: args.mode,
            session_min: args.session_min.into(),
            session_max: args.session_max.into(),
            think_min: args.think_min.into(),
            think_max: args.think_max.into(),
            session_pause_min: args.session_pause_min.into(),
            session_pause_max: args.session_pause_max.into(),
            maintain_size: args.maintain_size,
            target_size: args.target_size,
            cleanup_interval: args.cleanup_interval.into(),
        }
    }
}

/// Runs `executor` until its duration elapses or the process receives Ctrl-C.
pub async fn run_until_signal<C: Send + 'static>(
    executor: &Executor<C>,
) -> Result<RunSummary, ExecutorError> {
    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    let signal = tokio::spawn(async move {
        tokio::select! {
            _ = on_signal.cancelled() => {}
            res = tokio::signal::ctrl_c() => {
                match res {
                    Ok(()) => info!("Interrupted, shutting down"),
                    Err(error) => error!("Could not listen for Ctrl-C: {error}"),
                }
                on_signal.cancel();
            }
        }
    });

    let res = executor.run(cancel.clone()).await;
    cancel.cancel();
    let _ = signal.await;
    res
}
