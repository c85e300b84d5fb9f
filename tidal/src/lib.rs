#![cfg_attr(docsrs, feature(doc_cfg))]
//! Long-running synthetic database load shaped by the time of day.
//!
//! An [`Executor`] runs a fixed number of simulated clients against a
//! [`Workload`]. Each client owns one connection and paces itself from an
//! activity [`Profile`](tidal_core::Profile): busy hours produce a dense query
//! stream, quiet hours a trickle. This is deliberately not a benchmark; nothing
//! here tries to maximise throughput.
//!
//! ```no_run
//! use tidal::prelude::*;
//!
//! # async fn example<C: Send + 'static>(
//! #     connector: impl Connector<C>,
//! #     app: impl Application<C>,
//! # ) -> Result<(), Box<dyn std::error::Error>> {
//! let config = ExecutorConfig {
//!     connections: 4,
//!     profile: "store-regional".to_string(),
//!     timezone: "Europe/Berlin".to_string(),
//!     ..ExecutorConfig::new("postgres://localhost/shop")
//! };
//! let executor = Executor::new(config, connector, Workload::simple(app))?;
//! let summary = executor.run(CancellationToken::new()).await?;
//! println!("{summary}");
//! # Ok(())
//! # }
//! ```
pub mod aggregator;
pub mod application;
#[cfg(feature = "cli")]
#[cfg_attr(docsrs, doc(cfg(feature = "cli")))]
pub mod cli;
mod error;
pub mod executor;
mod maintenance;
mod measurement;
mod reporter;
mod timer;
mod worker;

pub use application::{
    Application, BoxError, ConnectError, Connector, MaintenanceError, SizeMaintainer, Workload,
};
pub use error::ExecutorError;
pub use executor::{Executor, ExecutorState};
pub use tidal_core as core;

pub mod prelude {
    pub use crate::application::{Application, Connector, SizeMaintainer, Workload};
    pub use crate::executor::Executor;
    pub use tidal_core::{
        ActivityProfile, ConnectionMode, ExecutorConfig, Profile, QueryError, QueryResult,
        RunSummary,
    };
    pub use tokio_util::sync::CancellationToken;

    #[cfg(feature = "cli")]
    pub use crate::cli::{run_until_signal, TidalArgs};
}
