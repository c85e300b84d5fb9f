use crate::application::{MaintenanceError, SizeMaintainer};
use crate::executor::RunContext;
use std::sync::Arc;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn};

/// Periodically asks the workload to prune old data. A failed cycle is logged
/// and retried on the next tick; it never ends the run.
#[instrument(name = "size_maintenance", skip_all, fields(target_size = run.config.target_size))]
pub(crate) async fn maintenance_task<C: Send + 'static>(
    run: Arc<RunContext<C>>,
    maintainer: Arc<dyn SizeMaintainer<C>>,
) {
    let period = run.config.cleanup_interval;
    let mut ticker = interval_at(Instant::now() + period, period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    info!("Checking database size every {}", humantime::format_duration(period));

    loop {
        tokio::select! {
            _ = run.cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        match maintain_once(&run, maintainer.as_ref()).await {
            Ok(0) => debug!("Database within target size"),
            Ok(deleted) => info!(deleted, "Removed old data"),
            Err(error) => warn!("Size maintenance cycle failed: {error}"),
        }
    }
}

/// One cycle on a fresh, dedicated connection that is dropped afterwards.
pub(crate) async fn maintain_once<C: Send + 'static>(
    run: &RunContext<C>,
    maintainer: &dyn SizeMaintainer<C>,
) -> Result<u64, MaintenanceError> {
    let mut conn = run.connect(&run.client_id("maintenance")).await?;
    let deleted = maintainer
        .maintain_size(&run.cancel, &mut conn, run.config.target_size)
        .await?;
    drop(conn);

    run.metrics.add_deleted(deleted);
    Ok(deleted)
}
