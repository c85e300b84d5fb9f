use pdatastructs::tdigest::{TDigest, K1};
use std::fmt;
use std::time::Duration;
use tracing::error;

const TDIGEST_BACKLOG_SIZE: usize = 100;

/// Latency distribution of the queries recorded during one report interval.
pub(crate) struct IntervalLatency {
    count: usize,
    digest: TDigest<K1>,
}

impl IntervalLatency {
    pub fn new() -> Self {
        Self {
            count: 0,
            digest: default_tdigest(),
        }
    }

    pub fn populate(&mut self, latencies: &[Duration]) {
        self.count += latencies.len();
        for latency in latencies {
            self.digest.insert(latency.as_secs_f64());
        }
    }

    pub fn count(&self) -> usize {
        self.count
    }

    pub fn quantile(&self, quantile: f64) -> Duration {
        if self.count == 0 {
            return Duration::ZERO;
        }

        let secs = self.digest.quantile(quantile);

        // NOTE: TDigest can return NaN on sparse input.
        let secs = if secs.is_finite() && secs >= 0. {
            secs
        } else {
            error!("Non-finite latency quantile, reporting zero.");
            0.
        };

        Duration::from_secs_f64(secs)
    }
}

impl fmt::Display for IntervalLatency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "p50={:?}, p90={:?}, p99={:?}",
            self.quantile(0.5),
            self.quantile(0.90),
            self.quantile(0.99),
        )
    }
}

fn default_tdigest() -> TDigest<K1> {
    TDigest::new(K1::new(10.), TDIGEST_BACKLOG_SIZE)
}
