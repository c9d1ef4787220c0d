//! # CLI Interface
//!
//! Command-line structure for `ebics-nexus`, built with `clap` derive.
//! Every command works on the local database; none of them talk to a bank.

use clap::{Args, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Administer EBICS subscribers and local API users.
#[derive(Parser, Debug)]
#[command(
    name = "ebics-nexus",
    about = "EBICS client administration tool",
    version,
    propagate_version = true
)]
pub struct NexusCli {
    /// Directory holding the nexus database.
    #[arg(
        long,
        short = 'd',
        global = true,
        env = "EBICS_DATA_DIR",
        default_value = ".ebics-nexus"
    )]
    pub data_dir: PathBuf,

    /// Log output format.
    #[arg(long, global = true, env = "EBICS_LOG_FORMAT", value_enum, default_value_t = LogFormatArg::Pretty)]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Pretty,
    Json,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Create the data directory and database.
    Init,
    /// Manage EBICS subscribers.
    #[command(subcommand)]
    Subscriber(SubscriberCommand),
    /// Manage local API users.
    #[command(subcommand)]
    User(UserCommand),
    /// Print version information and exit.
    Version,
}

// ---------------------------------------------------------------------------
// Subscribers
// ---------------------------------------------------------------------------

/// Identity flags shared by every subscriber command.
#[derive(Args, Debug, Clone)]
pub struct SubscriberIdArgs {
    #[arg(long)]
    pub host_id: String,
    #[arg(long)]
    pub partner_id: String,
    #[arg(long)]
    pub user_id: String,
    #[arg(long)]
    pub system_id: Option<String>,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum SlotArg {
    Signature,
    Encryption,
    Authorization,
    All,
}

#[derive(Subcommand, Debug)]
pub enum SubscriberCommand {
    /// Register a subscriber and generate its three keys.
    Add {
        #[command(flatten)]
        id: SubscriberIdArgs,
        /// The institution's EBICS endpoint.
        #[arg(long)]
        ebics_url: String,
    },
    /// Show key states, subscriber state, and the initialisation letter.
    Status {
        #[command(flatten)]
        id: SubscriberIdArgs,
        /// Print JSON instead of text.
        #[arg(long)]
        json: bool,
    },
    /// Record that the bank confirmed a key from the initialisation letter.
    Confirm {
        #[command(flatten)]
        id: SubscriberIdArgs,
        /// Slot to release, or every slot awaiting confirmation.
        #[arg(long, value_enum, default_value_t = SlotArg::All)]
        slot: SlotArg,
    },
    /// List every stored subscriber.
    List,
}

// ---------------------------------------------------------------------------
// Users
// ---------------------------------------------------------------------------

#[derive(Subcommand, Debug)]
pub enum UserCommand {
    /// Create a user for the local API.
    Add {
        #[arg(long)]
        username: String,
        #[arg(long, env = "EBICS_USER_PASSWORD", hide_env_values = true)]
        password: String,
        #[arg(long)]
        superuser: bool,
    },
    /// Check an `Authorization: Basic ...` header value.
    Check {
        #[arg(long)]
        header: String,
    },
}
