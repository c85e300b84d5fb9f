use crate::executor::RunContext;
use crate::timer::Timer;
use std::sync::Arc;
use std::time::Duration;
use tidal_core::ConnectionMode;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Logs throughput and the current activity level once per report interval,
/// so an operator can see pacing track the profile.
#[instrument(name = "reporter", skip_all)]
pub(crate) async fn report_task<C: Send + 'static>(run: Arc<RunContext<C>>) {
    let mut timer = Timer::new(run.config.report_interval).await;
    debug!("Reporting every {timer}");

    let mut last_total = 0;
    loop {
        let elapsed = tokio::select! {
            _ = run.cancel.cancelled() => break,
            elapsed = timer.tick() => elapsed,
        };

        let snapshot = run.metrics.snapshot();
        let latency = run.metrics.interval_latency();
        let qps = instantaneous_rate(snapshot.total_queries, last_total, elapsed);
        last_total = snapshot.total_queries;

        let activity = run.activity_level();
        match run.config.mode {
            ConnectionMode::Pool => info!(
                activity = %format!("{activity:.2}"),
                qps = %format!("{qps:.1}"),
                total = snapshot.total_queries,
                failed = snapshot.failed_queries,
                "{latency}"
            ),
            ConnectionMode::Session => info!(
                activity = %format!("{activity:.2}"),
                qps = %format!("{qps:.1}"),
                total = snapshot.total_queries,
                failed = snapshot.failed_queries,
                active_sessions = snapshot.active_sessions,
                total_sessions = snapshot.total_sessions,
                "{latency}"
            ),
        }
    }
}

/// Queries per second between two samples of the running total.
pub(crate) fn instantaneous_rate(total_now: u64, total_before: u64, elapsed: Duration) -> f64 {
    if elapsed.is_zero() {
        return 0.;
    }
    total_now.saturating_sub(total_before) as f64 / elapsed.as_secs_f64()
}
