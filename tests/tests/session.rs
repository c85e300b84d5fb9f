mod utils;
#[allow(unused)]
use utils::*;

mod tests {
    use super::*;

    use mock_app::{MockApp, MockDatabase};
    use std::time::Duration;
    use tidal::prelude::*;

    fn back_to_back_sessions(duration: Duration) -> ExecutorConfig {
        ExecutorConfig {
            profile: "constant".to_string(),
            session_min: Duration::from_secs(1),
            session_max: Duration::from_secs(1),
            think_min: Duration::ZERO,
            think_max: Duration::ZERO,
            session_pause_min: Duration::ZERO,
            session_pause_max: Duration::ZERO,
            ..config(ConnectionMode::Session, 4, duration)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn sessions_cycle_until_the_end() {
        init();
        let db = MockDatabase::new();
        let executor =
            executor(back_to_back_sessions(Duration::from_secs(5)), &db, MockApp::ping()).unwrap();

        let summary = executor.run(CancellationToken::new()).await.unwrap();

        let m = &summary.metrics;
        assert!(m.total_sessions >= 12, "only {} sessions", m.total_sessions);
        assert_eq!(m.active_sessions, 0);
        assert_eq!(m.failed_queries, 0);
        assert!(m.total_queries > m.total_sessions);
        assert!(summary.queries_per_session.is_some_and(|q| q > 1.0));
        // Each worker keeps its one connection across sessions.
        assert_eq!(db.total_connections(), 4);
        assert_eq!(db.open_connections(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn think_time_slows_a_session() {
        init();
        let db = MockDatabase::new();
        let config = ExecutorConfig {
            think_min: Duration::from_millis(500),
            think_max: Duration::from_millis(500),
            ..back_to_back_sessions(Duration::from_secs(10))
        };
        let executor = executor(config, &db, MockApp::ping()).unwrap();

        let summary = executor.run(CancellationToken::new()).await.unwrap();

        // Roughly two queries per second per worker.
        let m = &summary.metrics;
        assert!(m.total_queries >= 4 * 10, "{} queries", m.total_queries);
        assert!(m.total_queries <= 4 * 25, "{} queries", m.total_queries);
    }
}
