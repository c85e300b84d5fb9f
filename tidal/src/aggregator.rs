//! Run-wide counters, written by every worker at once.
//!
//! Everything here is a plain atomic. Per-query counters live in a
//! copy-on-write table seeded with the application's declared query names;
//! a name seen for the first time is added with a single compare-and-swap and
//! never removed, so the hot path is a lock-free map lookup.
use crate::measurement::IntervalLatency;
use arc_swap::ArcSwap;
use metrics_util::AtomicBucket;
use std::collections::HashMap;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tidal_core::{
    ConnectionMode, MetricsSnapshot, QueryOutcome, QueryResult, QueryStats, RunSummary,
    WorkerReadiness,
};

pub struct MetricsAggregator {
    success: AtomicU64,
    failed: AtomicU64,
    canceled: AtomicU64,
    total_duration_ns: AtomicU64,
    total_sessions: AtomicU64,
    active_sessions: AtomicI64,
    total_deleted: AtomicU64,
    queries: QueryTable,
    /// `None` when nothing drains it between reports.
    latency: Option<AtomicBucket<Duration>>,
}

impl MetricsAggregator {
    pub fn new(query_names: &[&'static str]) -> Self {
        #[cfg(feature = "metrics")]
        describe();

        Self {
            success: AtomicU64::new(0),
            failed: AtomicU64::new(0),
            canceled: AtomicU64::new(0),
            total_duration_ns: AtomicU64::new(0),
            total_sessions: AtomicU64::new(0),
            active_sessions: AtomicI64::new(0),
            total_deleted: AtomicU64::new(0),
            queries: QueryTable::new(query_names),
            latency: Some(AtomicBucket::new()),
        }
    }

    /// Stops collecting per-interval latency samples. Used when the run has no
    /// periodic reporter to drain them.
    pub fn without_interval_latency(mut self) -> Self {
        self.latency = None;
        self
    }

    /// Records one application call. Cancelled calls only bump the cancellation
    /// counter; they are neither successes nor failures.
    pub fn record_query(&self, result: &QueryResult) -> QueryOutcome {
        let outcome = result.outcome();
        if outcome == QueryOutcome::Canceled {
            self.canceled.fetch_add(1, Ordering::Relaxed);
            return outcome;
        }

        let nanos = u64::try_from(result.duration.as_nanos()).unwrap_or(u64::MAX);
        let failed = outcome == QueryOutcome::Failed;

        self.queries
            .get_or_insert(&result.name)
            .record(nanos, result.rows_affected, failed);
        self.total_duration_ns.fetch_add(nanos, Ordering::Relaxed);
        if let Some(latency) = &self.latency {
            latency.push(result.duration);
        }

        if failed {
            self.failed.fetch_add(1, Ordering::Relaxed);
        } else {
            self.success.fetch_add(1, Ordering::Relaxed);
        }

        outcome
    }

    /// Marks a session as started. The session counts as active until the guard drops.
    pub fn start_session(&self) -> SessionGuard<'_> {
        self.total_sessions.fetch_add(1, Ordering::Relaxed);
        self.active_sessions.fetch_add(1, Ordering::Relaxed);
        #[cfg(feature = "metrics")]
        metrics::gauge!("tidal_active_sessions").increment(1.);
        SessionGuard { metrics: self }
    }

    pub fn active_sessions(&self) -> i64 {
        self.active_sessions.load(Ordering::Relaxed)
    }

    pub fn add_deleted(&self, rows: u64) {
        self.total_deleted.fetch_add(rows, Ordering::Relaxed);
        #[cfg(feature = "metrics")]
        metrics::counter!("tidal_deleted_rows").increment(rows);
    }

    pub fn snapshot(&self) -> MetricsSnapshot {
        let success_queries = self.success.load(Ordering::Relaxed);
        let failed_queries = self.failed.load(Ordering::Relaxed);

        MetricsSnapshot {
            total_queries: success_queries + failed_queries,
            success_queries,
            failed_queries,
            canceled_queries: self.canceled.load(Ordering::Relaxed),
            total_duration_ns: self.total_duration_ns.load(Ordering::Relaxed),
            total_sessions: self.total_sessions.load(Ordering::Relaxed),
            active_sessions: self.active_sessions.load(Ordering::Relaxed),
            total_deleted_rows: self.total_deleted.load(Ordering::Relaxed),
            queries: self.queries.stats(),
        }
    }

    pub fn final_summary(
        &self,
        mode: ConnectionMode,
        profile: &'static str,
        elapsed: Duration,
        workers: WorkerReadiness,
    ) -> RunSummary {
        RunSummary::new(mode, profile, elapsed, workers, self.snapshot())
    }

    /// Drains the latencies recorded since the previous call.
    pub(crate) fn interval_latency(&self) -> IntervalLatency {
        let mut latency = IntervalLatency::new();
        if let Some(bucket) = &self.latency {
            bucket.clear_with(|batch| latency.populate(batch));
        }
        latency
    }
}

pub struct SessionGuard<'a> {
    metrics: &'a MetricsAggregator,
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.metrics.active_sessions.fetch_sub(1, Ordering::Relaxed);
        #[cfg(feature = "metrics")]
        metrics::gauge!("tidal_active_sessions").decrement(1.);
    }
}

struct QueryMetric {
    count: AtomicU64,
    total_duration_ns: AtomicU64,
    error_count: AtomicU64,
    rows_affected: AtomicI64,
    #[cfg(feature = "metrics")]
    series: QuerySeries,
}

impl QueryMetric {
    #[cfg_attr(not(feature = "metrics"), allow(unused_variables))]
    fn new(name: &str) -> Self {
        Self {
            count: AtomicU64::new(0),
            total_duration_ns: AtomicU64::new(0),
            error_count: AtomicU64::new(0),
            rows_affected: AtomicI64::new(0),
            #[cfg(feature = "metrics")]
            series: QuerySeries::new(name),
        }
    }

    fn record(&self, nanos: u64, rows: i64, failed: bool) {
        self.count.fetch_add(1, Ordering::Relaxed);
        self.total_duration_ns.fetch_add(nanos, Ordering::Relaxed);
        self.rows_affected.fetch_add(rows, Ordering::Relaxed);
        if failed {
            self.error_count.fetch_add(1, Ordering::Relaxed);
        }

        #[cfg(feature = "metrics")]
        self.series.record(nanos, failed);
    }

    fn stats(&self, name: &str) -> QueryStats {
        QueryStats {
            name: name.to_string(),
            count: self.count.load(Ordering::Relaxed),
            total_duration_ns: self.total_duration_ns.load(Ordering::Relaxed),
            error_count: self.error_count.load(Ordering::Relaxed),
            rows_affected: self.rows_affected.load(Ordering::Relaxed),
        }
    }
}

struct QueryTable {
    entries: ArcSwap<HashMap<String, Arc<QueryMetric>>>,
}

impl QueryTable {
    fn new(names: &[&'static str]) -> Self {
        let entries = names
            .iter()
            .map(|name| (name.to_string(), Arc::new(QueryMetric::new(name))))
            .collect();
        Self {
            entries: ArcSwap::from_pointee(entries),
        }
    }

    fn get_or_insert(&self, name: &str) -> Arc<QueryMetric> {
        if let Some(metric) = self.entries.load().get(name) {
            return metric.clone();
        }

        // NOTE: rcu may run the closure more than once; `entry` keeps whichever
        // metric won the race so no increments are lost.
        self.entries.rcu(|current| {
            let mut next = HashMap::clone(current);
            next.entry(name.to_string())
                .or_insert_with(|| Arc::new(QueryMetric::new(name)));
            next
        });

        self.entries
            .load()
            .get(name)
            .cloned()
            .unwrap_or_else(|| Arc::new(QueryMetric::new(name)))
    }

    fn stats(&self) -> Vec<QueryStats> {
        let entries = self.entries.load();
        let mut stats: Vec<_> = entries
            .iter()
            .map(|(name, metric)| metric.stats(name))
            .collect();
        stats.sort_by(|a, b| a.name.cmp(&b.name));
        stats
    }
}

#[cfg(feature = "metrics")]
struct QuerySeries {
    success: metrics::Counter,
    error: metrics::Counter,
    latency: metrics::Histogram,
}

#[cfg(feature = "metrics")]
impl QuerySeries {
    fn new(name: &str) -> Self {
        let query = name.to_string();
        Self {
            success: metrics::counter!("tidal_query_success", "query" => query.clone()),
            error: metrics::counter!("tidal_query_error", "query" => query.clone()),
            latency: metrics::histogram!("tidal_query_latency", "query" => query),
        }
    }

    fn record(&self, nanos: u64, failed: bool) {
        self.latency.record(nanos as f64);
        if failed {
            self.error.increment(1);
        } else {
            self.success.increment(1);
        }
    }
}

#[cfg(feature = "metrics")]
fn describe() {
    metrics::describe_counter!("tidal_query_success", "Queries that completed without error");
    metrics::describe_counter!("tidal_query_error", "Queries that returned an error");
    metrics::describe_histogram!(
        "tidal_query_latency",
        metrics::Unit::Nanoseconds,
        "Query latency as reported by the application"
    );
    metrics::describe_gauge!("tidal_active_sessions", "Sessions currently open");
    metrics::describe_counter!("tidal_deleted_rows", "Rows removed by size maintenance");
}
