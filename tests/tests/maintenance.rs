mod utils;
#[allow(unused)]
use utils::*;

mod tests {
    use super::*;

    use mock_app::{MockApp, MockDatabase, ROW_BYTES};
    use std::time::Duration;
    use tidal::prelude::*;

    fn maintained(target_rows: u64, duration: Duration) -> ExecutorConfig {
        ExecutorConfig {
            maintain_size: true,
            target_size: target_rows * ROW_BYTES,
            cleanup_interval: Duration::from_secs(10),
            ..config(ConnectionMode::Pool, 1, duration)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn within_tolerance_nothing_is_deleted() {
        init();
        // 5% over a 1000-row target; the ping workload never writes.
        let db = MockDatabase::with_rows(1_050);
        let executor =
            executor(maintained(1_000, Duration::from_secs(35)), &db, MockApp::ping()).unwrap();

        let summary = executor.run(CancellationToken::new()).await.unwrap();

        assert_eq!(summary.metrics.total_deleted_rows, 0);
        assert_eq!(db.rows(), 1_050);
    }

    #[tokio::test(start_paused = true)]
    async fn oversized_database_is_trimmed() {
        init();
        let db = MockDatabase::with_rows(5_000);
        let executor =
            executor(maintained(1_000, Duration::from_secs(15)), &db, MockApp::ping()).unwrap();

        let summary = executor.run(CancellationToken::new()).await.unwrap();

        assert_eq!(summary.metrics.total_deleted_rows, 4_000);
        assert_eq!(db.rows(), 1_000);
        // Workers plus one dedicated maintenance connection.
        assert_eq!(db.total_connections(), 2);
        assert_eq!(db.open_connections(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn disabled_unless_requested() {
        init();
        let db = MockDatabase::with_rows(5_000);
        let config = ExecutorConfig {
            maintain_size: false,
            ..maintained(1_000, Duration::from_secs(15))
        };
        let executor = executor(config, &db, MockApp::ping()).unwrap();

        let summary = executor.run(CancellationToken::new()).await.unwrap();

        assert_eq!(summary.metrics.total_deleted_rows, 0);
        assert_eq!(db.rows(), 5_000);
    }
}
