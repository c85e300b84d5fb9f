//! Run orchestration: spawn the workers and background tasks, wait for
//! cancellation, report the summary.
use crate::aggregator::MetricsAggregator;
use crate::application::{Application, ConnectError, Connector, Workload};
use crate::error::ExecutorError;
use crate::maintenance::maintenance_task;
use crate::reporter::report_task;
use crate::worker::{run_worker, Readiness};
use chrono::Utc;
use std::sync::atomic::{AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tidal_core::{
    ActivityProfile, ConfigError, ExecutorConfig, Profile, QueryOutcome, QueryResult, RunSummary,
    WorkerReadiness,
};
use tokio::sync::oneshot;
use tokio::task::JoinSet;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
#[allow(unused_imports)]
use tracing::{debug, error, info, instrument, trace, warn, Instrument};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[repr(u8)]
pub enum ExecutorState {
    NotStarted = 0,
    Running = 1,
    Stopped = 2,
}

impl ExecutorState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::NotStarted,
            1 => Self::Running,
            _ => Self::Stopped,
        }
    }
}

/// Drives one run. An executor runs at most once.
pub struct Executor<C: Send + 'static> {
    config: ExecutorConfig,
    profile: Profile,
    connector: Arc<dyn Connector<C>>,
    workload: Workload<C>,
    metrics: Arc<MetricsAggregator>,
    state: AtomicU8,
    run_id: String,
}

impl<C: Send + 'static> Executor<C> {
    /// Validates the configuration and resolves its profile. Nothing is spawned yet.
    pub fn new(
        config: ExecutorConfig,
        connector: impl Connector<C>,
        workload: Workload<C>,
    ) -> Result<Self, ConfigError> {
        let profile = Profile::from_name(&config.profile, &config.timezone)?;
        Self::with_profile(config, profile, connector, workload)
    }

    /// Like [`Executor::new`] but with an explicit profile; the config's
    /// profile and timezone names are ignored.
    pub fn with_profile(
        config: ExecutorConfig,
        profile: Profile,
        connector: impl Connector<C>,
        workload: Workload<C>,
    ) -> Result<Self, ConfigError> {
        config.validate()?;
        if let Profile::Fixed(level) = profile {
            if !level.is_finite() {
                return Err(ConfigError::InvalidActivityLevel(level.to_string()));
            }
        }

        let mut metrics = MetricsAggregator::new(&workload.app().query_names());
        if config.report_interval.is_zero() {
            metrics = metrics.without_interval_latency();
        }
        let metrics = Arc::new(metrics);
        let run_id = uuid::Uuid::new_v4().simple().to_string()[..8].to_string();

        Ok(Self {
            config,
            profile,
            connector: Arc::new(connector),
            workload,
            metrics,
            state: AtomicU8::new(ExecutorState::NotStarted as u8),
            run_id,
        })
    }

    pub fn state(&self) -> ExecutorState {
        ExecutorState::from_u8(self.state.load(Ordering::Acquire))
    }

    pub fn config(&self) -> &ExecutorConfig {
        &self.config
    }

    pub fn metrics(&self) -> &Arc<MetricsAggregator> {
        &self.metrics
    }

    /// Runs until `cancel` fires or the configured duration elapses, then
    /// returns the final summary.
    ///
    /// Fails only if the executor was already started, or if every worker
    /// failed to connect. Query errors never end a run.
    #[instrument(
        name = "tidal",
        skip_all,
        fields(run = %self.run_id, mode = %self.config.mode, profile = self.profile.name())
    )]
    pub async fn run(&self, cancel: CancellationToken) -> Result<RunSummary, ExecutorError> {
        self.state
            .compare_exchange(
                ExecutorState::NotStarted as u8,
                ExecutorState::Running as u8,
                Ordering::AcqRel,
                Ordering::Acquire,
            )
            .map_err(|_| ExecutorError::AlreadyStarted)?;

        let cancel = cancel.child_token();
        let config = &self.config;
        let duration = config.duration.map_or("indefinite".to_string(), |d| {
            humantime::format_duration(d).to_string()
        });
        info!(connections = config.connections, %duration, "Starting run");
        debug!("Config: {config:?}");

        let start = Instant::now();
        if let Some(duration) = config.duration {
            let deadline = cancel.clone();
            tokio::spawn(
                async move {
                    tokio::select! {
                        _ = deadline.cancelled() => {}
                        _ = tokio::time::sleep(duration) => {
                            info!("Run duration elapsed");
                            deadline.cancel();
                        }
                    }
                }
                .in_current_span(),
            );
        }

        let run = Arc::new(RunContext {
            config: config.clone(),
            run_id: self.run_id.clone(),
            connector: self.connector.clone(),
            app: self.workload.app().clone(),
            profile: self.profile.clone(),
            metrics: self.metrics.clone(),
            cancel: cancel.clone(),
        });

        let mut workers = JoinSet::new();
        let mut readiness = Vec::with_capacity(config.connections);
        for id in 0..config.connections {
            let (tx, rx) = oneshot::channel();
            readiness.push(rx);
            workers.spawn(run_worker(id, run.clone(), tx).in_current_span());
        }

        let mut background = JoinSet::new();
        if config.report_interval.is_zero() {
            debug!("Periodic reporting disabled");
        } else {
            background.spawn(report_task(run.clone()).in_current_span());
        }
        if config.maintain_size {
            match self.workload.size_maintainer() {
                Some(maintainer) => {
                    let task = maintenance_task(run.clone(), maintainer.clone());
                    background.spawn(task.in_current_span());
                }
                None => warn!("Size maintenance requested but the workload does not support it"),
            }
        }

        let workers_ready = collect_readiness(readiness).await;
        if workers_ready.failed > 0 {
            warn!(
                connected = workers_ready.connected,
                failed = workers_ready.failed,
                "Some workers could not connect"
            );
        } else {
            debug!(connected = workers_ready.connected, "All workers connected");
        }
        if workers_ready.connected == 0 && workers_ready.failed > 0 {
            error!("No worker could connect, stopping run");
            cancel.cancel();
        }

        while let Some(res) = workers.join_next().await {
            if let Err(error) = res {
                error!("Worker task ended abnormally: {error}");
            }
        }

        // Workers only exit once the run is cancelled, unless every one of them failed.
        cancel.cancel();
        while background.join_next().await.is_some() {}
        self.state
            .store(ExecutorState::Stopped as u8, Ordering::Release);

        if workers_ready.connected == 0 && workers_ready.failed > 0 {
            return Err(ExecutorError::NoWorkers {
                failed: workers_ready.failed,
            });
        }

        let summary = self.metrics.final_summary(
            config.mode,
            self.profile.name(),
            start.elapsed(),
            workers_ready,
        );
        log_summary(&summary);
        Ok(summary)
    }
}

/// Shared, read-only state handed to every task of a run.
pub(crate) struct RunContext<C: Send + 'static> {
    pub config: ExecutorConfig,
    pub run_id: String,
    pub connector: Arc<dyn Connector<C>>,
    pub app: Arc<dyn Application<C>>,
    pub profile: Profile,
    pub metrics: Arc<MetricsAggregator>,
    pub cancel: CancellationToken,
}

impl<C: Send + 'static> RunContext<C> {
    pub fn activity_level(&self) -> f64 {
        self.profile.activity_level(Utc::now())
    }

    pub fn client_id(&self, role: &str) -> String {
        format!("tidal-{}-{role}", self.run_id)
    }

    pub async fn connect(&self, client_id: &str) -> Result<C, ConnectError> {
        self.connector
            .connect(&self.config.endpoint, client_id)
            .await
            .map_err(|source| ConnectError {
                endpoint: self.config.endpoint.clone(),
                client_id: client_id.to_string(),
                source,
            })
    }

    pub fn record(&self, result: &QueryResult) {
        if self.metrics.record_query(result) == QueryOutcome::Failed {
            if let Some(error) = &result.error {
                debug!(query = %result.name, "Query failed: {error}");
            }
        }
    }
}

async fn collect_readiness(readiness: Vec<oneshot::Receiver<Readiness>>) -> WorkerReadiness {
    let mut ready = WorkerReadiness::default();
    for rx in readiness {
        match rx.await {
            Ok(Readiness::Connected) => ready.connected += 1,
            Ok(Readiness::Failed) => ready.failed += 1,
            // Cancelled before the connection attempt finished.
            Err(_) => {}
        }
    }
    ready
}

fn log_summary(summary: &RunSummary) {
    let m = &summary.metrics;
    info!(
        elapsed = %humantime::format_duration(Duration::from_secs(summary.elapsed.as_secs())),
        total_queries = m.total_queries,
        success_queries = m.success_queries,
        failed_queries = m.failed_queries,
        canceled_queries = m.canceled_queries,
        avg_latency_ms = summary.avg_latency_ms,
        avg_qps = summary.avg_qps,
        total_sessions = m.total_sessions,
        queries_per_session = summary.queries_per_session.unwrap_or(0.),
        deleted_rows = m.total_deleted_rows,
        "Run complete"
    );
    for q in &m.queries {
        info!(
            query = %q.name,
            count = q.count,
            errors = q.error_count,
            avg_latency = ?q.avg_latency(),
            rows = q.rows_affected,
            "Query summary"
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::application::BoxError;
    use async_trait::async_trait;
    use tidal_core::ConnectionMode;

    struct Refuse;

    #[async_trait]
    impl Connector<()> for Refuse {
        async fn connect(&self, _endpoint: &str, _client_id: &str) -> Result<(), BoxError> {
            Err("connection refused".into())
        }
    }

    struct Accept;

    #[async_trait]
    impl Connector<()> for Accept {
        async fn connect(&self, _endpoint: &str, _client_id: &str) -> Result<(), BoxError> {
            Ok(())
        }
    }

    struct Ping;

    #[async_trait]
    impl Application<()> for Ping {
        fn query_names(&self) -> Vec<&'static str> {
            vec!["ping"]
        }

        async fn execute_query(&self, _cancel: &CancellationToken, _conn: &mut ()) -> QueryResult {
            tokio::time::sleep(Duration::from_millis(1)).await;
            QueryResult::success("ping", Duration::from_millis(1), 0)
        }
    }

    fn config(mode: ConnectionMode) -> ExecutorConfig {
        ExecutorConfig {
            connections: 2,
            mode,
            duration: Some(Duration::from_secs(3)),
            report_interval: Duration::from_secs(1),
            session_min: Duration::from_secs(1),
            session_max: Duration::from_secs(1),
            think_min: Duration::ZERO,
            think_max: Duration::ZERO,
            session_pause_min: Duration::ZERO,
            session_pause_max: Duration::ZERO,
            ..ExecutorConfig::default()
        }
    }

    #[test]
    fn rejects_bad_profile_before_start() {
        let config = ExecutorConfig {
            profile: "nine-to-five".to_string(),
            ..ExecutorConfig::default()
        };
        let res = Executor::new(config, Accept, Workload::simple(Ping));
        assert!(matches!(res, Err(ConfigError::UnknownProfile(_))));
    }

    #[tracing_test::traced_test]
    #[tokio::test(start_paused = true)]
    async fn all_workers_failing_is_reported() {
        let executor =
            Executor::new(config(ConnectionMode::Pool), Refuse, Workload::simple(Ping)).unwrap();
        let res = executor.run(CancellationToken::new()).await;
        assert!(matches!(res, Err(ExecutorError::NoWorkers { failed: 2 })));
        assert_eq!(executor.state(), ExecutorState::Stopped);
    }

    #[tokio::test(start_paused = true)]
    async fn runs_once() {
        let executor = Executor::with_profile(
            config(ConnectionMode::Pool),
            Profile::Fixed(1.0),
            Accept,
            Workload::simple(Ping),
        )
        .unwrap();
        assert_eq!(executor.state(), ExecutorState::NotStarted);

        let summary = executor.run(CancellationToken::new()).await.unwrap();
        assert_eq!(executor.state(), ExecutorState::Stopped);
        assert_eq!(summary.workers.connected, 2);
        assert!(summary.metrics.total_queries > 0);
        assert_eq!(summary.metrics.failed_queries, 0);

        let again = executor.run(CancellationToken::new()).await;
        assert!(matches!(again, Err(ExecutorError::AlreadyStarted)));
    }

    #[test]
    fn rejects_non_finite_fixed_level() {
        let res = Executor::with_profile(
            config(ConnectionMode::Pool),
            Profile::Fixed(f64::NAN),
            Accept,
            Workload::simple(Ping),
        );
        assert!(matches!(res, Err(ConfigError::InvalidActivityLevel(_))));
    }

    #[tokio::test(start_paused = true)]
    async fn runs_without_periodic_reports() {
        let mut config = config(ConnectionMode::Pool);
        config.report_interval = Duration::ZERO;
        let executor =
            Executor::with_profile(config, Profile::Fixed(1.0), Accept, Workload::simple(Ping))
                .unwrap();

        let summary = executor.run(CancellationToken::new()).await.unwrap();
        assert!(summary.metrics.total_queries > 0);
        assert_eq!(summary.metrics.failed_queries, 0);
        assert_eq!(executor.metrics().interval_latency().count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn external_cancellation_stops_sessions() {
        let mut config = config(ConnectionMode::Session);
        config.duration = None;
        config.session_min = Duration::from_secs(3600);
        config.session_max = Duration::from_secs(3600);
        let executor =
            Executor::with_profile(config, Profile::Fixed(1.0), Accept, Workload::simple(Ping))
                .unwrap();

        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(2)).await;
            canceller.cancel();
        });

        let summary = executor.run(cancel).await.unwrap();
        assert_eq!(summary.metrics.total_sessions, 2);
        assert_eq!(summary.metrics.active_sessions, 0);
        assert!(summary.elapsed < Duration::from_secs(3));
    }
}
