//! # Reveal Subcommand
//!
//! Discloses a committed incident from its opening file. The disclosure is
//! checked against the ledger's commitments before anything is signed.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;
use stl_core::IncidentId;
use stl_crypto::ContentLocator;
use stl_registry::{DisclosedEvidence, Disclosure};

use crate::commit::OpeningFile;
use crate::context::{session, Context as CommandContext, GlobalOpts};

#[derive(Args, Debug)]
pub struct RevealArgs {
    /// Incident to reveal. Defaults to the id in the opening file.
    pub id: Option<IncidentId>,

    /// Opening file written by `commit`.
    #[arg(long)]
    pub opening: PathBuf,

    /// Evidence file to disclose; stored in the content store.
    #[arg(long, required_unless_present = "locator", conflicts_with = "locator")]
    pub evidence: Option<PathBuf>,

    /// Locator of evidence already in the content store.
    #[arg(long)]
    pub locator: Option<String>,
}

impl RevealArgs {
    pub fn disclosed_evidence(&self) -> Result<DisclosedEvidence> {
        match (&self.evidence, &self.locator) {
            (_, Some(locator)) => Ok(DisclosedEvidence::Locator(ContentLocator::new(locator.clone()))),
            (Some(path), None) => {
                let bytes = std::fs::read(path)
                    .with_context(|| format!("failed to read evidence {}", path.display()))?;
                Ok(DisclosedEvidence::Bytes(bytes))
            }
            (None, None) => anyhow::bail!("pass --evidence or --locator"),
        }
    }
}

pub async fn run_reveal(args: &RevealArgs, opts: &GlobalOpts) -> Result<u8> {
    let file = OpeningFile::read(&args.opening)?;
    let id = args.id.or(file.incident).with_context(|| {
        format!(
            "opening file {} has no incident id yet; pass the id",
            args.opening.display()
        )
    })?;
    if let Some(recorded) = file.incident.filter(|recorded| *recorded != id) {
        tracing::warn!(
            requested = %id,
            opening = %recorded,
            "opening file was written for a different incident"
        );
    }

    let disclosure = Disclosure::new(args.disclosed_evidence()?, file.opening);
    let signer = session(opts)?;
    let ctx = CommandContext::open(opts)?;

    let receipt = ctx
        .registry
        .reveal(&signer, id, disclosure)
        .await
        .with_context(|| format!("reveal of incident {id} failed"))?;

    println!("incident:  {}", receipt.id);
    println!("tx:        {}", receipt.tx);
    println!("status:    {}", receipt.status);
    Ok(0)
}
