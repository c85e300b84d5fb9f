use super::{pause, uniform};
use crate::executor::RunContext;
use rand::Rng;
use std::time::Duration;
use tidal_core::{CLOSED_POLL_INTERVAL, MIN_ACTIVITY_LEVEL, MIN_SESSION_DURATION};
use tokio::time::Instant;
use tracing::trace;

/// Back-to-back user sessions with a pause between them, until cancelled.
/// Models interactive users holding a connection while they work.
pub(super) async fn run<C: Send + 'static>(
    run: &RunContext<C>,
    conn: &mut C,
    rng: &mut (impl Rng + Send),
) {
    let config = &run.config;
    loop {
        if run.cancel.is_cancelled() {
            break;
        }

        let level = run.activity_level();
        if level < MIN_ACTIVITY_LEVEL {
            tokio::time::sleep(CLOSED_POLL_INTERVAL).await;
            continue;
        }

        let length = session_length(uniform(rng, config.session_min, config.session_max), level);
        if !run_session(run, conn, rng, length).await {
            break;
        }

        // Logged out; wait a moment before logging back in.
        let away = uniform(rng, config.session_pause_min, config.session_pause_max);
        if !pause(&run.cancel, away).await {
            break;
        }
    }
}

/// Returns `false` if the run was cancelled mid-session.
async fn run_session<C: Send + 'static>(
    run: &RunContext<C>,
    conn: &mut C,
    rng: &mut (impl Rng + Send),
    length: Duration,
) -> bool {
    let _session = run.metrics.start_session();
    let ends_at = Instant::now() + length;
    trace!(length = %humantime::format_duration(length), "Session started");

    while Instant::now() < ends_at {
        if run.cancel.is_cancelled() {
            return false;
        }

        let result = run.app.execute_query_conn(&run.cancel, conn).await;
        run.record(&result);

        let think = uniform(rng, run.config.think_min, run.config.think_max);
        if !pause(&run.cancel, think).await {
            return false;
        }
    }

    true
}

/// Busier periods make for longer sessions.
pub(crate) fn session_length(drawn: Duration, level: f64) -> Duration {
    drawn.mul_f64(level.max(0.)).max(MIN_SESSION_DURATION)
}
