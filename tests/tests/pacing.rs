mod utils;
#[allow(unused)]
use utils::*;

mod tests {
    use super::*;

    use mock_app::{MockApp, MockDatabase};
    use std::time::Duration;
    use tidal::prelude::*;

    async fn run_at(level: f64, config: ExecutorConfig) -> RunSummary {
        let db = MockDatabase::new();
        let executor =
            executor_with_profile(config, Profile::Fixed(level), &db, MockApp::ping()).unwrap();
        executor.run(CancellationToken::new()).await.unwrap()
    }

    #[tokio::test(start_paused = true)]
    async fn closed_market_issues_no_pool_queries() {
        init();
        let config = config(ConnectionMode::Pool, 2, Duration::from_secs(3));

        let summary = run_at(0.005, config).await;

        assert_eq!(summary.metrics.total_queries, 0);
        assert_eq!(summary.workers.connected, 2);
        // The closed-market poll is not cancellable, so shutdown may lag by one poll.
        assert!(summary.elapsed >= Duration::from_secs(3));
        assert!(summary.elapsed < Duration::from_millis(3_200));
    }

    #[tokio::test(start_paused = true)]
    async fn closed_market_opens_no_sessions() {
        init();
        let config = ExecutorConfig {
            session_min: Duration::from_secs(1),
            session_max: Duration::from_secs(1),
            ..config(ConnectionMode::Session, 2, Duration::from_secs(3))
        };

        let summary = run_at(0.005, config).await;

        assert_eq!(summary.metrics.total_queries, 0);
        assert_eq!(summary.metrics.total_sessions, 0);
        assert_eq!(summary.metrics.active_sessions, 0);
        assert!(summary.elapsed < Duration::from_millis(3_200));
    }

    #[tokio::test(start_paused = true)]
    async fn half_activity_waits_half_a_second_between_queries() {
        init();
        let config = config(ConnectionMode::Pool, 2, Duration::from_secs(10));

        let summary = run_at(0.5, config).await;

        // Each 1ms ping is followed by a 500ms pause.
        let total = summary.metrics.total_queries;
        assert!((2 * 18..=2 * 21).contains(&total), "{total} queries");
    }

    #[tokio::test(start_paused = true)]
    async fn full_activity_does_not_pause() {
        init();
        let config = config(ConnectionMode::Pool, 2, Duration::from_secs(10));

        let half = run_at(0.5, config.clone()).await.metrics.total_queries;
        let full = run_at(1.0, config).await.metrics.total_queries;

        assert!(full > 10 * half, "full={full} half={half}");
    }
}
