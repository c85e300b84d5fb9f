use crate::ConnectionMode;
use std::fmt;
use std::time::Duration;

/// Counters for a single query name.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct QueryStats {
    pub name: String,
    pub count: u64,
    pub total_duration_ns: u64,
    pub error_count: u64,
    pub rows_affected: i64,
}

impl QueryStats {
    pub fn avg_latency(&self) -> Duration {
        if self.count == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_duration_ns / self.count)
        }
    }
}

/// Point-in-time read of the run's counters.
///
/// Every counter is individually exact, but they are read one after another,
/// so a snapshot taken mid-run is not a transaction across fields. The one
/// identity that always holds is `total_queries == success_queries + failed_queries`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MetricsSnapshot {
    pub total_queries: u64,
    pub success_queries: u64,
    pub failed_queries: u64,
    /// Queries cut short by cancellation. Not part of `total_queries`.
    pub canceled_queries: u64,
    pub total_duration_ns: u64,
    pub total_sessions: u64,
    pub active_sessions: i64,
    pub total_deleted_rows: u64,
    /// Sorted by name.
    pub queries: Vec<QueryStats>,
}

impl MetricsSnapshot {
    pub fn avg_latency(&self) -> Duration {
        if self.total_queries == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(self.total_duration_ns / self.total_queries)
        }
    }

    pub fn query(&self, name: &str) -> Option<&QueryStats> {
        self.queries.iter().find(|q| q.name == name)
    }
}

/// How many workers managed to open their connection.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct WorkerReadiness {
    pub connected: usize,
    pub failed: usize,
}

/// End-of-run figures.
#[derive(Clone, Debug, PartialEq)]
pub struct RunSummary {
    pub mode: ConnectionMode,
    pub profile: &'static str,
    pub elapsed: Duration,
    pub workers: WorkerReadiness,
    pub metrics: MetricsSnapshot,
    pub avg_latency_ms: f64,
    pub avg_qps: f64,
    /// Only reported in session mode.
    pub queries_per_session: Option<f64>,
}

impl RunSummary {
    pub fn new(
        mode: ConnectionMode,
        profile: &'static str,
        elapsed: Duration,
        workers: WorkerReadiness,
        metrics: MetricsSnapshot,
    ) -> Self {
        let avg_latency_ms = metrics.avg_latency().as_secs_f64() * 1e3;
        let avg_qps = if elapsed.is_zero() {
            0.
        } else {
            metrics.total_queries as f64 / elapsed.as_secs_f64()
        };
        let queries_per_session = match mode {
            ConnectionMode::Session if metrics.total_sessions > 0 => {
                Some(metrics.total_queries as f64 / metrics.total_sessions as f64)
            }
            ConnectionMode::Session => Some(0.),
            ConnectionMode::Pool => None,
        };

        Self {
            mode,
            profile,
            elapsed,
            workers,
            metrics,
            avg_latency_ms,
            avg_qps,
            queries_per_session,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let m = &self.metrics;
        writeln!(
            f,
            "mode={} profile={} elapsed={} workers={}/{}",
            self.mode,
            self.profile,
            humantime::format_duration(Duration::from_secs(self.elapsed.as_secs())),
            self.workers.connected,
            self.workers.connected + self.workers.failed,
        )?;
        write!(
            f,
            "queries={} ok={} failed={} canceled={} avg_latency_ms={:.3} avg_qps={:.2}",
            m.total_queries,
            m.success_queries,
            m.failed_queries,
            m.canceled_queries,
            self.avg_latency_ms,
            self.avg_qps,
        )?;
        if let Some(per_session) = self.queries_per_session {
            write!(
                f,
                " sessions={} queries_per_session={per_session:.1}",
                m.total_sessions
            )?;
        }
        if m.total_deleted_rows > 0 {
            write!(f, " deleted_rows={}", m.total_deleted_rows)?;
        }
        for q in &m.queries {
            write!(
                f,
                "\n  {:<24} count={:<10} errors={:<8} avg={:?}",
                q.name,
                q.count,
                q.error_count,
                q.avg_latency(),
            )?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(total: u64, duration_ns: u64, sessions: u64) -> MetricsSnapshot {
        MetricsSnapshot {
            total_queries: total,
            success_queries: total,
            total_duration_ns: duration_ns,
            total_sessions: sessions,
            ..MetricsSnapshot::default()
        }
    }

    #[test]
    fn derives_averages() {
        let summary = RunSummary::new(
            ConnectionMode::Session,
            "constant",
            Duration::from_secs(10),
            WorkerReadiness::default(),
            snapshot(500, 500 * 2_000_000, 25),
        );

        assert!((summary.avg_latency_ms - 2.0).abs() < 1e-9);
        assert!((summary.avg_qps - 50.0).abs() < 1e-9);
        assert_eq!(summary.queries_per_session, Some(20.0));
    }

    #[test]
    fn empty_run_has_zero_averages() {
        let summary = RunSummary::new(
            ConnectionMode::Pool,
            "constant",
            Duration::ZERO,
            WorkerReadiness::default(),
            MetricsSnapshot::default(),
        );

        assert_eq!(summary.avg_latency_ms, 0.);
        assert_eq!(summary.avg_qps, 0.);
        assert_eq!(summary.queries_per_session, None);
    }
}
