//! # Hash Subcommand
//!
//! Prints the evidence commitment for a file or a string, the same digest
//! `commit` would publish.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stl_core::CommitmentHash;

#[derive(Args, Debug)]
pub struct HashArgs {
    /// File to hash.
    #[arg(required_unless_present = "text", conflicts_with = "text")]
    pub file: Option<PathBuf>,

    /// Hash this UTF-8 string instead of a file.
    #[arg(long)]
    pub text: Option<String>,
}

pub fn run_hash(args: &HashArgs) -> Result<u8> {
    println!("{}", compute(args)?.to_prefixed_hex());
    Ok(0)
}

fn compute(args: &HashArgs) -> Result<CommitmentHash> {
    match (&args.file, &args.text) {
        (_, Some(text)) => Ok(stl_crypto::digest_str(text)),
        (Some(path), None) => {
            let bytes = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            Ok(stl_crypto::digest(&bytes))
        }
        (None, None) => anyhow::bail!("nothing to hash; pass a file or --text"),
    }
}
