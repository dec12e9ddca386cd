//! Error types for the wicket CLI.

use thiserror::Error;

/// Result type for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// Errors that end a CLI run.
#[derive(Debug, Error)]
pub enum CliError {
    /// Store could not be opened
    #[error("Store error: {0}")]
    Store(#[from] wicket_gate::StoreError),

    /// Bad configuration in the environment
    #[error("Configuration error: {0}")]
    Config(#[from] wicket_gate::ConfigError),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// Terminal IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Unknown command or missing argument
    #[error("{0}")]
    Usage(String),
}
