//! # Commit Subcommand
//!
//! Hashes an evidence file and its metadata under a fresh salt, writes the
//! opening file the reporter needs to reveal, then submits the commitments.
//! The file exists before anything is sent; losing it makes the incident
//! unrevealable.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;
use serde::{Deserialize, Serialize};
use stl_core::{CommitmentHash, IncidentId, Timestamp, TxId};
use stl_registry::{IncidentMetadata, Opening, PreparedCommit, RegistryError};

use crate::context::{session, Context as CommandContext, GlobalOpts};

#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Evidence file (photo, video, document).
    #[arg(long)]
    pub evidence: PathBuf,

    /// Where it happened, typically "lat,lon".
    #[arg(long)]
    pub location: String,

    /// Vehicle plate.
    #[arg(long)]
    pub plate: Option<String>,

    /// Incident category label, e.g. "speeding" or "Exceso de velocidad".
    #[arg(long = "type")]
    pub incident_type: Option<String>,

    /// Reporting agent identifier.
    #[arg(long)]
    pub agent: Option<String>,

    #[arg(long)]
    pub notes: Option<String>,

    /// Opening file to write. Defaults to `opening-<meta hash prefix>.json`.
    #[arg(long)]
    pub opening_out: Option<PathBuf>,
}

/// What `commit` writes and `reveal` reads back. `incident` and `tx` are
/// filled in once the ledger reports them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OpeningFile {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident: Option<IncidentId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tx: Option<TxId>,
    pub evidence_hash: CommitmentHash,
    pub opening: Opening,
}

impl OpeningFile {
    pub fn unsubmitted(prepared: &PreparedCommit) -> Self {
        Self {
            incident: None,
            tx: None,
            evidence_hash: prepared.evidence_hash,
            opening: prepared.opening.clone(),
        }
    }

    pub fn default_path(prepared: &PreparedCommit) -> PathBuf {
        let hex = prepared.meta_hash.to_hex();
        PathBuf::from(format!("opening-{}.json", &hex[..16]))
    }

    pub fn read(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read opening file {}", path.display()))?;
        serde_json::from_str(&text)
            .with_context(|| format!("invalid opening file {}", path.display()))
    }

    pub fn write(&self, path: &Path) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(path, json)
            .with_context(|| format!("failed to write opening file {}", path.display()))
    }
}

impl CommitArgs {
    pub fn metadata(&self, captured_at: Timestamp) -> IncidentMetadata {
        IncidentMetadata {
            plate: self.plate.clone(),
            incident_type: self.incident_type.clone(),
            agent_id: self.agent.clone(),
            notes: self.notes.clone(),
            captured_at: Some(captured_at),
            ..IncidentMetadata::at(self.location.clone())
        }
    }
}

pub async fn run_commit(args: &CommitArgs, opts: &GlobalOpts) -> Result<u8> {
    let signer = session(opts)?;
    let ctx = CommandContext::open(opts)?;

    let evidence = std::fs::read(&args.evidence)
        .with_context(|| format!("failed to read evidence {}", args.evidence.display()))?;
    let metadata = args.metadata(Timestamp::now());
    let category = metadata.category();

    let prepared = PreparedCommit::new(&evidence, metadata, category)?;
    let out = args
        .opening_out
        .clone()
        .unwrap_or_else(|| OpeningFile::default_path(&prepared));
    let mut file = OpeningFile::unsubmitted(&prepared);
    file.write(&out)?;

    let receipt = match ctx.registry.commit_prepared(&signer, prepared).await {
        Ok(receipt) => receipt,
        Err(e) => {
            match &e {
                RegistryError::CommitUnsettled { tx, incident, .. } => {
                    file.tx = Some(tx.clone());
                    file.incident = *incident;
                    file.write(&out)?;
                    tracing::warn!(
                        tx = %tx,
                        opening = %out.display(),
                        "commit outcome unknown; opening kept"
                    );
                }
                _ => {
                    if let Err(rm) = std::fs::remove_file(&out) {
                        tracing::warn!(path = %out.display(), error = %rm, "failed to remove opening file");
                    }
                }
            }
            return Err(anyhow::Error::new(e).context("commit failed"));
        }
    };

    file.incident = Some(receipt.id);
    file.tx = Some(receipt.tx.clone());
    file.write(&out)?;

    println!("incident:  {}", receipt.id);
    println!("tx:        {}", receipt.tx);
    println!("type:      {category}");
    println!("evidence:  {}", file.evidence_hash);
    println!("opening:   {}", out.display());
    println!();
    println!(
        "Reveal within {}h: stl reveal {} --opening {} --evidence {}",
        ctx.registry.window().as_hours(),
        receipt.id,
        out.display(),
        args.evidence.display()
    );
    Ok(0)
}
