//! Simulated clients. Each worker owns exactly one connection for its whole
//! life and never shares it.
mod pool;
mod session;

use crate::executor::RunContext;
use rand::{rngs::SmallRng, Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;
use tidal_core::{ConnectionMode, MAX_PACING_DELAY};
use tokio::sync::oneshot;
use tokio_util::sync::CancellationToken;
#[allow(unused)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Reported once per worker after its connection attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum Readiness {
    Connected,
    Failed,
}

#[instrument(name = "worker", skip_all, fields(id = id))]
pub(crate) async fn run_worker<C: Send + 'static>(
    id: usize,
    run: Arc<RunContext<C>>,
    ready: oneshot::Sender<Readiness>,
) {
    let client_id = run.client_id(&format!("w{id}"));
    let connected = tokio::select! {
        _ = run.cancel.cancelled() => return,
        res = run.connect(&client_id) => res,
    };

    let mut conn = match connected {
        Ok(conn) => {
            let _ = ready.send(Readiness::Connected);
            conn
        }
        Err(error) => {
            error!("{error}");
            let _ = ready.send(Readiness::Failed);
            return;
        }
    };
    debug!(%client_id, "Connected");

    match run.config.mode {
        ConnectionMode::Pool => pool::run(&run, &mut conn).await,
        ConnectionMode::Session => {
            let mut rng = SmallRng::from_entropy();
            session::run(&run, &mut conn, &mut rng).await
        }
    }

    debug!("Worker stopped");
}

/// Sleeps for `dur` unless the run is cancelled first. Returns `false` on cancellation.
///
/// A zero duration still yields, so a worker at full activity cannot starve the runtime.
pub(crate) async fn pause(cancel: &CancellationToken, dur: Duration) -> bool {
    if dur.is_zero() {
        tokio::task::yield_now().await;
        return !cancel.is_cancelled();
    }

    tokio::select! {
        _ = cancel.cancelled() => false,
        _ = tokio::time::sleep(dur) => true,
    }
}

/// Pool-mode delay after each query: none at full activity, a full second near zero.
pub(crate) fn pacing_delay(level: f64) -> Duration {
    if level.is_nan() {
        return MAX_PACING_DELAY;
    }
    MAX_PACING_DELAY.mul_f64((1. - level).clamp(0., 1.))
}

/// Uniform draw from `[min, max]`. Collapses to `min` on an empty or inverted range.
pub(crate) fn uniform(rng: &mut impl Rng, min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    let lo = u64::try_from(min.as_nanos()).unwrap_or(u64::MAX);
    let hi = u64::try_from(max.as_nanos()).unwrap_or(u64::MAX);
    Duration::from_nanos(rng.gen_range(lo..=hi))
}
