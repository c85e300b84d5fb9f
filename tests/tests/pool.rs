mod utils;
#[allow(unused)]
use utils::*;

mod tests {
    use super::*;

    use mock_app::{MockApp, MockDatabase};
    use std::time::Duration;
    use tidal::prelude::*;

    #[tokio::test(start_paused = true)]
    async fn pool_mode_runs_for_its_duration() {
        init();
        let db = MockDatabase::new();
        let config = config(ConnectionMode::Pool, 4, Duration::from_secs(60));
        let executor = executor(config, &db, MockApp::ping()).unwrap();

        let summary = executor.run(CancellationToken::new()).await.unwrap();

        let m = &summary.metrics;
        assert!(m.total_queries > 0);
        assert_eq!(m.failed_queries, 0);
        assert_eq!(m.total_queries, m.success_queries + m.failed_queries);
        assert!(summary.avg_latency_ms >= 0.5 && summary.avg_latency_ms <= 5.0);
        assert_eq!(summary.workers.connected, 4);
        assert_eq!(summary.queries_per_session, None);
        assert!(summary.elapsed >= Duration::from_secs(60));
        assert!(summary.elapsed < Duration::from_secs(62));

        assert_eq!(m.query("ping").map(|q| q.count), Some(m.total_queries));
        assert_eq!(db.open_connections(), 0);
        assert_eq!(db.total_connections(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn failures_are_counted_not_fatal() {
        init();
        let db = MockDatabase::new();
        let config = ExecutorConfig {
            profile: "constant".to_string(),
            ..config(ConnectionMode::Pool, 2, Duration::from_secs(5))
        };
        let executor = executor(config, &db, MockApp::shop().with_error_rate(0.5)).unwrap();

        let summary = executor.run(CancellationToken::new()).await.unwrap();

        let m = &summary.metrics;
        assert!(m.failed_queries > 0);
        assert!(m.success_queries > 0);
        assert_eq!(m.total_queries, m.success_queries + m.failed_queries);
        assert_eq!(m.queries.len(), 4);
        let per_query_errors: u64 = m.queries.iter().map(|q| q.error_count).sum();
        assert_eq!(per_query_errors, m.failed_queries);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_database_ends_the_run() {
        init();
        let db = MockDatabase::new();
        db.refuse_connections(true);
        let executor = executor(
            config(ConnectionMode::Pool, 3, Duration::from_secs(60)),
            &db,
            MockApp::ping(),
        )
        .unwrap();

        let res = executor.run(CancellationToken::new()).await;
        assert!(matches!(res, Err(tidal::ExecutorError::NoWorkers { failed: 3 })));
    }

    #[tokio::test(start_paused = true)]
    async fn stops_when_cancelled() {
        init();
        let db = MockDatabase::new();
        let mut config = config(ConnectionMode::Pool, 2, Duration::from_secs(1));
        config.duration = None;
        let executor = executor(config, &db, MockApp::ping()).unwrap();

        let cancel = CancellationToken::new();
        let canceller = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_secs(3)).await;
            canceller.cancel();
        });

        let summary = executor.run(cancel).await.unwrap();
        assert!(summary.elapsed < Duration::from_secs(4));
        assert_eq!(executor.state(), tidal::ExecutorState::Stopped);
        assert_eq!(db.open_connections(), 0);
    }
}
