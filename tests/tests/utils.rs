use mock_app::{MockApp, MockConnector, MockDatabase};
use std::sync::{Arc, OnceLock};
use std::time::Duration;
use tidal::prelude::*;
use tracing::{error, Level};
use tracing_subscriber::FmtSubscriber;

#[allow(unused)]
pub fn init() {
    static ONCE_LOCK: OnceLock<()> = OnceLock::new();

    ONCE_LOCK.get_or_init(|| {
        let default_panic = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            default_panic(info);
            error!("Panic occurred: {info:?}");
        }));

        FmtSubscriber::builder()
            .with_max_level(Level::DEBUG)
            .with_env_filter("tidal=debug,mock_app=info")
            .with_test_writer()
            .init();
    });
}

/// A short run against an in-process mock database.
#[allow(unused)]
pub fn config(mode: ConnectionMode, connections: usize, duration: Duration) -> ExecutorConfig {
    ExecutorConfig {
        connections,
        mode,
        duration: Some(duration),
        report_interval: Duration::from_secs(1),
        ..ExecutorConfig::new("mock://localhost/shop")
    }
}

#[allow(unused)]
pub fn executor(
    config: ExecutorConfig,
    db: &Arc<MockDatabase>,
    app: MockApp,
) -> anyhow::Result<Executor<mock_app::MockConnection>> {
    Ok(Executor::new(
        config,
        MockConnector::new(db.clone()),
        Workload::with_size_maintenance(app),
    )?)
}

/// Like [`executor`] but with an explicit activity profile.
#[allow(unused)]
pub fn executor_with_profile(
    config: ExecutorConfig,
    profile: Profile,
    db: &Arc<MockDatabase>,
    app: MockApp,
) -> anyhow::Result<Executor<mock_app::MockConnection>> {
    Ok(Executor::with_profile(
        config,
        profile,
        MockConnector::new(db.clone()),
        Workload::with_size_maintenance(app),
    )?)
}
