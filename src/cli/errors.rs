//! CLI-specific error types
//!
//! Every CLI error aborts the invocation; `main` prints it and exits
//! non-zero.

use thiserror::Error;

use crate::client::ClientError;

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

/// Errors surfaced by the command-line front end.
#[derive(Debug, Error)]
pub enum CliError {
    /// Connection settings are missing or contradictory.
    #[error("invalid configuration: {0}")]
    Config(String),

    /// A command argument did not parse.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The admin client failed.
    #[error(transparent)]
    Client(#[from] ClientError),

    /// Runtime or terminal I/O failed.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Result rendering failed.
    #[error("output encoding failed: {0}")]
    Output(#[from] serde_json::Error),
}
