//! CLI argument definitions using clap
//!
//! Commands:
//! - rgw-admin user list|show|create|update|delete
//! - rgw-admin bucket list|stats|show|delete
//! - rgw-admin key create|regenerate|delete
//! - rgw-admin usage show|trim

use clap::{Args, Parser, Subcommand};

/// rgw-admin - typed client for the RADOS Gateway admin REST API
#[derive(Parser, Debug)]
#[command(name = "rgw-admin")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub connection: ConnectionArgs,

    #[command(subcommand)]
    pub command: Command,
}

/// Connection settings; flags override the corresponding environment
/// variables.
#[derive(Args, Debug, Default)]
pub struct ConnectionArgs {
    /// Admin API base URL (overrides RGW_ADMIN_ENDPOINT)
    #[arg(long, global = true)]
    pub endpoint: Option<String>,

    /// Basic-auth credentials as user:password (overrides RGW_ADMIN_BASIC)
    #[arg(long, global = true)]
    pub basic: Option<String>,

    /// Bearer token (overrides RGW_ADMIN_BEARER)
    #[arg(long, global = true)]
    pub bearer: Option<String>,

    /// Request timeout in seconds (overrides RGW_ADMIN_TIMEOUT_SECS)
    #[arg(long, global = true)]
    pub timeout_secs: Option<u64>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },

    /// Inspect and manage buckets
    Bucket {
        #[command(subcommand)]
        action: BucketAction,
    },

    /// Manage S3 key pairs
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },

    /// Usage statistics
    Usage {
        #[command(subcommand)]
        action: UsageAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum UserAction {
    /// List all user ids
    List,

    /// Show one user
    Show {
        #[arg(long)]
        uid: String,
    },

    /// Create a user
    Create {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        display_name: String,

        /// Capability grant as type=rights, repeatable
        #[arg(long = "cap")]
        caps: Vec<String>,
    },

    /// Update a user's display name
    Update {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        display_name: Option<String>,
    },

    /// Delete a user
    Delete {
        #[arg(long)]
        uid: String,

        /// Keep the user's buckets and objects
        #[arg(long)]
        keep_data: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum BucketAction {
    /// List bucket names
    List {
        /// Restrict to one owner
        #[arg(long)]
        uid: Option<String>,
    },

    /// Show stats for every bucket
    Stats {
        /// Restrict to one owner
        #[arg(long)]
        uid: Option<String>,
    },

    /// Show stats for one bucket
    Show {
        #[arg(long)]
        bucket: String,
    },

    /// Delete a bucket
    Delete {
        #[arg(long)]
        bucket: String,

        /// Also delete the objects it contains
        #[arg(long)]
        purge_objects: bool,
    },
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Create a key pair
    Create {
        #[arg(long)]
        uid: String,

        /// Use this access key instead of a generated one
        #[arg(long)]
        access_key: Option<String>,
    },

    /// Generate a new secret for an existing access key
    Regenerate {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        access_key: String,
    },

    /// Delete a key pair
    Delete {
        #[arg(long)]
        uid: String,

        #[arg(long)]
        access_key: String,
    },
}

#[derive(Subcommand, Debug)]
pub enum UsageAction {
    /// Show usage statistics
    Show {
        /// Restrict to one user
        #[arg(long)]
        uid: Option<String>,

        /// Window start, RFC 3339 (e.g. 2023-05-04T00:00:00Z)
        #[arg(long)]
        start: Option<String>,

        /// Window end, RFC 3339
        #[arg(long)]
        end: Option<String>,
    },

    /// Drop usage statistics recorded before a date
    Trim {
        /// Cut-off date, YYYY-MM-DD
        #[arg(long)]
        until: String,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
