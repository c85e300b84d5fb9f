use std::borrow::Cow;
use std::time::Duration;
use thiserror::Error;

/// Why a single query or transaction did not complete.
#[derive(Debug, Error)]
pub enum QueryError {
    /// The run was cancelled while the query was in flight.
    #[error("query canceled")]
    Canceled,

    #[error("query deadline exceeded")]
    DeadlineExceeded,

    #[error(transparent)]
    Database(#[from] Box<dyn std::error::Error + Send + Sync>),
}

impl QueryError {
    pub fn database(error: impl Into<Box<dyn std::error::Error + Send + Sync>>) -> Self {
        Self::Database(error.into())
    }

    /// Cancellation and deadline errors are expected at shutdown and are never counted as failures.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Canceled | Self::DeadlineExceeded)
    }
}

/// Outcome of one application call. Recorded into metrics, then dropped.
#[derive(Debug)]
pub struct QueryResult {
    pub name: Cow<'static, str>,
    pub duration: Duration,
    pub rows_affected: i64,
    pub error: Option<QueryError>,
}

impl QueryResult {
    pub fn success(
        name: impl Into<Cow<'static, str>>,
        duration: Duration,
        rows_affected: i64,
    ) -> Self {
        Self {
            name: name.into(),
            duration,
            rows_affected,
            error: None,
        }
    }

    pub fn failure(
        name: impl Into<Cow<'static, str>>,
        duration: Duration,
        error: QueryError,
    ) -> Self {
        Self {
            name: name.into(),
            duration,
            rows_affected: 0,
            error: Some(error),
        }
    }

    pub fn outcome(&self) -> QueryOutcome {
        match &self.error {
            None => QueryOutcome::Success,
            Some(error) if error.is_cancellation() => QueryOutcome::Canceled,
            Some(_) => QueryOutcome::Failed,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum QueryOutcome {
    Success,
    Failed,
    Canceled,
}
