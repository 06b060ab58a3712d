//! Error types for the cloudsign CLI.

use cloudsign_cdn::SigningError;
use cloudsign_config::ConfigError;
use thiserror::Error;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// CLI error types. Every variant exits with status 1.
#[derive(Debug, Error)]
pub enum CliError {
    /// Signing or verification failed
    #[error("{0}")]
    Signing(#[from] SigningError),

    /// Configuration could not be loaded or is invalid
    #[error("{0}")]
    Config(#[from] ConfigError),

    /// Arguments are inconsistent or incomplete
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// IO error (writing output)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
