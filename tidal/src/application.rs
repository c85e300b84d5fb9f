//! The seams between the engine and the workload it drives.
//!
//! The engine never looks inside a connection. A [`Connector`] opens them, an
//! [`Application`] runs queries on them, and an optional [`SizeMaintainer`]
//! prunes old data through them. All three are generic over the connection type
//! `C`, so a workload built on any database driver plugs in unchanged.
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;
use tidal_core::QueryResult;
use tokio_util::sync::CancellationToken;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
#[error("could not connect to \"{endpoint}\" as {client_id}: {source}")]
pub struct ConnectError {
    pub endpoint: String,
    pub client_id: String,
    #[source]
    pub source: BoxError,
}

#[derive(Debug, Error)]
pub enum MaintenanceError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    #[error("could not measure database size: {0}")]
    Measure(#[source] BoxError),

    #[error("could not delete old data: {0}")]
    Delete(#[source] BoxError),

    #[error("size maintenance canceled")]
    Canceled,
}

/// Opens dedicated connections. Each worker calls this once and keeps the
/// connection for its whole life.
#[async_trait]
pub trait Connector<C>: Send + Sync + 'static {
    /// `client_id` is unique per worker, suitable for e.g. `application_name`.
    async fn connect(&self, endpoint: &str, client_id: &str) -> Result<C, BoxError>;
}

/// A workload: picks one query or transaction from its weighted set and runs it.
///
/// Called concurrently from many workers, each with its own connection. An
/// implementation must not share mutable state across calls beyond read-only
/// configuration.
#[async_trait]
pub trait Application<C: Send + 'static>: Send + Sync + 'static {
    /// Query names this application can report. Used to pre-size the metrics
    /// table; names not listed here are still accepted.
    fn query_names(&self) -> Vec<&'static str> {
        vec![]
    }

    /// Run one query as a short pooled-style request.
    async fn execute_query(&self, cancel: &CancellationToken, conn: &mut C) -> QueryResult;

    /// Run one query inside a held session. Defaults to [`Application::execute_query`].
    async fn execute_query_conn(&self, cancel: &CancellationToken, conn: &mut C) -> QueryResult {
        self.execute_query(cancel, conn).await
    }
}

/// Optional capability: keep the database near a target size by deleting the oldest data.
///
/// Implementations should return `Ok(0)` without deleting anything while the
/// current size is within [`tidal_core::size_budget::needs_cleanup`]'s tolerance,
/// and otherwise delete a bounded batch of the oldest records, respecting
/// foreign-key order, returning how many were removed.
#[async_trait]
pub trait SizeMaintainer<C: Send + 'static>: Send + Sync + 'static {
    async fn maintain_size(
        &self,
        cancel: &CancellationToken,
        conn: &mut C,
        target_size: u64,
    ) -> Result<u64, MaintenanceError>;
}

/// An application together with the capabilities it offers.
pub enum Workload<C: Send + 'static> {
    Simple(Arc<dyn Application<C>>),
    WithSizeMaintenance {
        app: Arc<dyn Application<C>>,
        maintainer: Arc<dyn SizeMaintainer<C>>,
    },
}

impl<C: Send + 'static> Workload<C> {
    pub fn simple(app: impl Application<C>) -> Self {
        Self::Simple(Arc::new(app))
    }

    pub fn with_size_maintenance<A>(app: A) -> Self
    where
        A: Application<C> + SizeMaintainer<C>,
    {
        let app = Arc::new(app);
        Self::WithSizeMaintenance {
            app: app.clone(),
            maintainer: app,
        }
    }

    pub fn app(&self) -> &Arc<dyn Application<C>> {
        match self {
            Self::Simple(app) | Self::WithSizeMaintenance { app, .. } => app,
        }
    }

    pub fn size_maintainer(&self) -> Option<&Arc<dyn SizeMaintainer<C>>> {
        match self {
            Self::Simple(_) => None,
            Self::WithSizeMaintenance { maintainer, .. } => Some(maintainer),
        }
    }
}

impl<C: Send + 'static> Clone for Workload<C> {
    fn clone(&self) -> Self {
        match self {
            Self::Simple(app) => Self::Simple(app.clone()),
            Self::WithSizeMaintenance { app, maintainer } => Self::WithSizeMaintenance {
                app: app.clone(),
                maintainer: maintainer.clone(),
            },
        }
    }
}
