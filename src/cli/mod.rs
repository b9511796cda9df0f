//! Command-line front end for the admin client.
//!
//! Provides:
//! - user: account management
//! - bucket: bucket listing, stats, deletion
//! - key: S3 key pair management
//! - usage: usage statistics and trimming

mod args;
mod commands;
mod errors;

pub use args::{BucketAction, Cli, Command, ConnectionArgs, KeyAction, UsageAction, UserAction};
pub use commands::{run_command, Connection};
pub use errors::{CliError, CliResult};

use tracing_subscriber::EnvFilter;

/// Parses arguments, initializes logging, and runs the command on a
/// current-thread runtime.
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(run_command(cli))
}
