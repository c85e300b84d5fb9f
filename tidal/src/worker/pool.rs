use super::pause;
use super::pacing_delay;
use crate::executor::RunContext;
use tidal_core::{CLOSED_POLL_INTERVAL, MIN_ACTIVITY_LEVEL};

/// One query, then an activity-scaled pause, until cancelled. Models request
/// traffic through a web application's connection pool.
pub(super) async fn run<C: Send + 'static>(run: &RunContext<C>, conn: &mut C) {
    loop {
        if run.cancel.is_cancelled() {
            break;
        }

        let level = run.activity_level();
        if level < MIN_ACTIVITY_LEVEL {
            tokio::time::sleep(CLOSED_POLL_INTERVAL).await;
            continue;
        }

        let result = run.app.execute_query(&run.cancel, conn).await;
        run.record(&result);

        if !pause(&run.cancel, pacing_delay(level)).await {
            break;
        }
    }
}
