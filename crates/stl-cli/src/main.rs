//! # stl CLI entry point
//!
//! Parses arguments, sets up tracing, and dispatches to subcommand handlers.

use std::process::ExitCode;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use stl_cli::commit::{run_commit, CommitArgs};
use stl_cli::context::GlobalOpts;
use stl_cli::dispute::{run_dispute, DisputeArgs};
use stl_cli::feed::{run_feed, FeedArgs};
use stl_cli::hash::{run_hash, HashArgs};
use stl_cli::keys::{run_keys, KeysArgs};
use stl_cli::reveal::{run_reveal, RevealArgs};
use stl_cli::status::{run_status, StatusArgs};

/// SafeTraffic Ledger client.
///
/// Commit traffic incident evidence to the ledger as hashes, reveal it
/// within the reveal window, and follow disputes to resolution.
#[derive(Parser, Debug)]
#[command(name = "stl", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv).
    /// Ignored when RUST_LOG is set.
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines.
    #[arg(long, global = true)]
    log_json: bool,

    #[command(flatten)]
    global: GlobalOpts,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print the evidence digest of a file or string.
    Hash(HashArgs),

    /// Generate or inspect Ed25519 key files.
    Keys(KeysArgs),

    /// Commit evidence and metadata hashes.
    Commit(CommitArgs),

    /// Reveal a committed incident.
    Reveal(RevealArgs),

    /// Show one incident.
    Status(StatusArgs),

    /// List incidents, newest first.
    Feed(FeedArgs),

    /// Open or resolve a dispute.
    Dispute(DisputeArgs),
}

fn init_tracing(verbose: u8, json: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| match verbose {
        0 => EnvFilter::new("info"),
        1 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    });
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if json {
        builder.json().init();
    } else {
        builder.init();
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.log_json);
    tracing::debug!(version = env!("CARGO_PKG_VERSION"), "stl starting");

    let result = match &cli.command {
        Commands::Hash(args) => run_hash(args),
        Commands::Keys(args) => run_keys(args),
        Commands::Commit(args) => run_commit(args, &cli.global).await,
        Commands::Reveal(args) => run_reveal(args, &cli.global).await,
        Commands::Status(args) => run_status(args, &cli.global).await,
        Commands::Feed(args) => run_feed(args, &cli.global).await,
        Commands::Dispute(args) => run_dispute(args, &cli.global).await,
    };

    match result {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}
