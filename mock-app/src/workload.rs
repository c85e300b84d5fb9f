use crate::{MockConnection, MAX_DELETE_BATCH, ROW_BYTES};
use async_trait::async_trait;
use metrics::counter;
use rand::distributions::{Distribution, WeightedIndex};
use rand::Rng;
use rand_distr::Normal;
use std::time::Duration;
use tidal::core::{size_budget, QueryError, QueryResult};
use tidal::{Application, MaintenanceError, SizeMaintainer};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
#[allow(unused)]
use tracing::{debug, info, trace};

/// One query kind the mock can run.
#[derive(Clone, Debug)]
pub struct MockQuery {
    pub name: &'static str,
    /// Relative frequency.
    pub weight: u32,
    pub latency: Duration,
    /// Standard deviation of the latency. Zero gives a fixed latency.
    pub jitter: Duration,
    /// Rows inserted on success.
    pub inserts: u64,
}

impl MockQuery {
    pub const fn new(name: &'static str, weight: u32, latency: Duration) -> Self {
        Self {
            name,
            weight,
            latency,
            jitter: Duration::ZERO,
            inserts: 0,
        }
    }

    pub const fn with_jitter(mut self, jitter: Duration) -> Self {
        self.jitter = jitter;
        self
    }

    pub const fn with_inserts(mut self, inserts: u64) -> Self {
        self.inserts = inserts;
        self
    }
}

/// A weighted set of [`MockQuery`]s run against a [`crate::MockDatabase`].
#[derive(Clone, Debug)]
pub struct MockApp {
    queries: Vec<MockQuery>,
    weights: WeightedIndex<u32>,
    error_rate: f64,
}

impl MockApp {
    /// # Panics
    ///
    /// If `queries` is empty or every weight is zero.
    pub fn new(queries: Vec<MockQuery>) -> Self {
        let weights = WeightedIndex::new(queries.iter().map(|q| q.weight))
            .expect("mock queries need at least one non-zero weight");
        Self {
            queries,
            weights,
            error_rate: 0.,
        }
    }

    /// A single 1ms read.
    pub fn ping() -> Self {
        Self::new(vec![MockQuery::new("ping", 1, Duration::from_millis(1))])
    }

    /// A small web shop: mostly reads, some orders.
    pub fn shop() -> Self {
        Self::new(vec![
            MockQuery::new("browse_products", 60, Duration::from_millis(3))
                .with_jitter(Duration::from_millis(1)),
            MockQuery::new("view_cart", 25, Duration::from_millis(2))
                .with_jitter(Duration::from_micros(500)),
            MockQuery::new("place_order", 10, Duration::from_millis(8))
                .with_jitter(Duration::from_millis(3))
                .with_inserts(4),
            MockQuery::new("update_inventory", 5, Duration::from_millis(5))
                .with_jitter(Duration::from_millis(2))
                .with_inserts(1),
        ])
    }

    /// Fraction of queries, in `[0, 1]`, that fail with a database error.
    pub fn with_error_rate(mut self, error_rate: f64) -> Self {
        self.error_rate = error_rate.clamp(0., 1.);
        self
    }

    fn pick(&self) -> (&MockQuery, Duration, bool) {
        let mut rng = rand::thread_rng();
        let query = &self.queries[self.weights.sample(&mut rng)];
        let latency = if query.jitter.is_zero() {
            query.latency
        } else {
            let normal = Normal::new(query.latency.as_secs_f64(), query.jitter.as_secs_f64())
                .map(|d| d.sample(&mut rng))
                .unwrap_or(query.latency.as_secs_f64());
            Duration::from_secs_f64(normal.max(0.))
        };
        let fails = self.error_rate > 0. && rng.gen_bool(self.error_rate);
        (query, latency, fails)
    }
}

#[async_trait]
impl Application<MockConnection> for MockApp {
    fn query_names(&self) -> Vec<&'static str> {
        self.queries.iter().map(|q| q.name).collect()
    }

    async fn execute_query(
        &self,
        cancel: &CancellationToken,
        conn: &mut MockConnection,
    ) -> QueryResult {
        // ThreadRng is not Send; draw everything before the first await.
        let (query, latency, fails) = self.pick();
        let start = Instant::now();

        tokio::select! {
            _ = cancel.cancelled() => {
                return QueryResult::failure(query.name, start.elapsed(), QueryError::Canceled);
            }
            _ = tokio::time::sleep(latency) => {}
        }

        counter!("mock-app.queries").increment(1);
        if fails {
            return QueryResult::failure(
                query.name,
                start.elapsed(),
                QueryError::database(format!("{}: simulated failure", query.name)),
            );
        }

        conn.db().insert(query.inserts);
        trace!(query = query.name, ?latency, "Query done");
        QueryResult::success(query.name, start.elapsed(), query.inserts as i64)
    }
}

#[async_trait]
impl SizeMaintainer<MockConnection> for MockApp {
    async fn maintain_size(
        &self,
        cancel: &CancellationToken,
        conn: &mut MockConnection,
        target_size: u64,
    ) -> Result<u64, MaintenanceError> {
        if cancel.is_cancelled() {
            return Err(MaintenanceError::Canceled);
        }

        let db = conn.db();
        let size = db.size_bytes();
        let excess = size_budget::excess(size, target_size);
        if excess == 0 {
            debug!(size, target_size, "Within tolerance");
            return Ok(0);
        }

        let rows = excess.div_ceil(ROW_BYTES).min(MAX_DELETE_BATCH);
        let deleted = db.delete_oldest(rows);
        info!(size, target_size, deleted, "Deleted oldest rows");
        Ok(deleted)
    }
}
