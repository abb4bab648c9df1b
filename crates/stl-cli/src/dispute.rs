//! # Dispute Subcommand
//!
//! Opening needs `--role verifier` or above; resolving needs
//! `--role primary_auditor`. The ledger checks its own allow-list too.

use anyhow::{Context, Result};
use clap::{Args, Subcommand, ValueEnum};
use stl_arbitration::DisputeReason;
use stl_core::IncidentId;
use stl_registry::TxReceipt;
use stl_state::AuditorDecision;

use crate::context::{session, Context as CommandContext, GlobalOpts};

#[derive(Args, Debug)]
pub struct DisputeArgs {
    #[command(subcommand)]
    pub command: DisputeCommand,
}

#[derive(Subcommand, Debug)]
pub enum DisputeCommand {
    /// Challenge a revealed incident.
    Open {
        id: IncidentId,

        /// Why the incident is disputed. Only its hash goes on the ledger.
        #[arg(long)]
        reason: String,
    },

    /// Close a dispute.
    Resolve {
        id: IncidentId,

        #[arg(long, value_enum)]
        decision: Decision,
    },
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// The incident stands.
    Resolve,
    /// The incident is void.
    Stale,
}

impl From<Decision> for AuditorDecision {
    fn from(d: Decision) -> Self {
        match d {
            Decision::Resolve => AuditorDecision::Resolve,
            Decision::Stale => AuditorDecision::MarkStale,
        }
    }
}

pub async fn run_dispute(args: &DisputeArgs, opts: &GlobalOpts) -> Result<u8> {
    let signer = session(opts)?;
    let ctx = CommandContext::open(opts)?;

    let receipt = match &args.command {
        DisputeCommand::Open { id, reason } => {
            let reason = DisputeReason::new(reason.as_str()).context("invalid dispute reason")?;
            ctx.registry
                .open_dispute(&signer, *id, &reason)
                .await
                .with_context(|| format!("failed to open dispute on incident {id}"))?
        }
        DisputeCommand::Resolve { id, decision } => ctx
            .registry
            .resolve_dispute(&signer, *id, (*decision).into())
            .await
            .with_context(|| format!("failed to resolve dispute on incident {id}"))?,
    };
    print_receipt(&receipt);
    Ok(0)
}

fn print_receipt(receipt: &TxReceipt) {
    println!("incident:  {}", receipt.id);
    println!("tx:        {}", receipt.tx);
    println!("status:    {}", receipt.status);
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_state::IncidentStatus;

    #[test]
    fn decisions_map_to_terminal_statuses() {
        assert_eq!(
            AuditorDecision::from(Decision::Resolve).target_status(),
            IncidentStatus::Resolved
        );
        assert_eq!(
            AuditorDecision::from(Decision::Stale).target_status(),
            IncidentStatus::Stale
        );
    }
}
