//! An in-process stand-in for a database, for exercising the tidal engine
//! without a server.
//!
//! [`MockDatabase`] only tracks a row count and the number of open
//! connections. Queries sleep for a jittered latency and may fail at a
//! configured rate; write queries grow the row count, and size maintenance
//! deletes the oldest rows again.
mod workload;

pub use workload::{MockApp, MockQuery};

use async_trait::async_trait;
#[allow(unused)]
use metrics::{counter, gauge};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tidal::{BoxError, Connector};
use tracing::debug;

/// Simulated on-disk size of one row.
pub const ROW_BYTES: u64 = 512;

/// Upper bound on rows removed by one maintenance cycle.
pub const MAX_DELETE_BATCH: u64 = 10_000;

const CONNECT_LATENCY: Duration = Duration::from_millis(2);

#[derive(Debug, Default)]
pub struct MockDatabase {
    rows: AtomicU64,
    open_connections: AtomicU64,
    total_connections: AtomicU64,
    refuse_connections: AtomicBool,
}

impl MockDatabase {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn with_rows(rows: u64) -> Arc<Self> {
        let db = Self::default();
        db.rows.store(rows, Ordering::Relaxed);
        Arc::new(db)
    }

    pub fn rows(&self) -> u64 {
        self.rows.load(Ordering::Relaxed)
    }

    pub fn size_bytes(&self) -> u64 {
        self.rows() * ROW_BYTES
    }

    pub fn open_connections(&self) -> u64 {
        self.open_connections.load(Ordering::Relaxed)
    }

    /// Connections ever opened, including closed ones.
    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    /// While set, every connection attempt fails.
    pub fn refuse_connections(&self, refuse: bool) {
        self.refuse_connections.store(refuse, Ordering::Relaxed);
    }

    pub(crate) fn insert(&self, rows: u64) {
        self.rows.fetch_add(rows, Ordering::Relaxed);
    }

    /// Removes up to `rows` of the oldest rows. Returns how many went.
    pub(crate) fn delete_oldest(&self, rows: u64) -> u64 {
        let mut deleted = 0;
        let _ = self
            .rows
            .fetch_update(Ordering::Relaxed, Ordering::Relaxed, |current| {
                deleted = rows.min(current);
                Some(current - deleted)
            });
        deleted
    }
}

/// One open connection. Closed on drop.
#[derive(Debug)]
pub struct MockConnection {
    db: Arc<MockDatabase>,
    client_id: String,
}

impl MockConnection {
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    pub(crate) fn db(&self) -> &MockDatabase {
        &self.db
    }
}

impl Drop for MockConnection {
    fn drop(&mut self) {
        self.db.open_connections.fetch_sub(1, Ordering::Relaxed);
        debug!(client_id = %self.client_id, "Connection closed");
    }
}

#[derive(Clone, Debug)]
pub struct MockConnector {
    db: Arc<MockDatabase>,
}

impl MockConnector {
    pub fn new(db: Arc<MockDatabase>) -> Self {
        Self { db }
    }
}

#[async_trait]
impl Connector<MockConnection> for MockConnector {
    async fn connect(&self, endpoint: &str, client_id: &str) -> Result<MockConnection, BoxError> {
        tokio::time::sleep(CONNECT_LATENCY).await;
        if self.db.refuse_connections.load(Ordering::Relaxed) {
            return Err(format!("{endpoint}: connection refused").into());
        }

        self.db.open_connections.fetch_add(1, Ordering::Relaxed);
        self.db.total_connections.fetch_add(1, Ordering::Relaxed);
        counter!("mock-app.connections").increment(1);
        Ok(MockConnection {
            db: self.db.clone(),
            client_id: client_id.to_string(),
        })
    }
}
