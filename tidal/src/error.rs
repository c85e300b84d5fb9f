use thiserror::Error;
use tidal_core::ConfigError;

#[derive(Debug, Error)]
pub enum ExecutorError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("executor has already been started")]
    AlreadyStarted,

    #[error("no worker could open a connection ({failed} failed)")]
    NoWorkers { failed: usize },
}
