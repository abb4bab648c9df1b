//! # Feed Subcommand
//!
//! Lists incidents newest first. Pending incidents past their deadline are
//! shown as stale.

use anyhow::{Context, Result};
use clap::Args;
use stl_registry::{FeedItem, FeedQuery};
use stl_state::IncidentStatus;

use crate::context::{Context as CommandContext, GlobalOpts};

#[derive(Args, Debug)]
pub struct FeedArgs {
    /// Only incidents in this status (pending, revealed, disputed,
    /// resolved, stale).
    #[arg(long)]
    pub status: Option<IncidentStatus>,

    /// Show at most this many.
    #[arg(long)]
    pub limit: Option<usize>,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

pub async fn run_feed(args: &FeedArgs, opts: &GlobalOpts) -> Result<u8> {
    let ctx = CommandContext::open(opts)?;
    let query = FeedQuery {
        status: args.status,
        limit: args.limit,
    };
    let items = ctx
        .registry
        .feed(&query)
        .await
        .context("failed to read the incident feed")?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&items)?);
        return Ok(0);
    }
    if items.is_empty() {
        println!("No incidents.");
        return Ok(0);
    }
    for item in &items {
        println!("{}", row(item));
    }
    Ok(0)
}

fn row(item: &FeedItem) -> String {
    let detail = match (item.countdown(), &item.locator) {
        (Some(left), _) => left,
        (None, Some(locator)) => locator.to_string(),
        (None, None) => String::new(),
    };
    format!(
        "{}  {:<9} {:<16} {}  {}",
        item.id,
        item.status.as_str(),
        item.incident_type.as_str(),
        item.committed_at,
        detail
    )
    .trim_end()
    .to_string()
}
