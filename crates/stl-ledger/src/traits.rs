//! # Ledger Read/Write Interface
//!
//! Two traits so that read-only consumers (feed, status) never hold a
//! write capability. Both are implemented by [`HttpLedgerClient`] and
//! [`InMemoryLedger`].
//!
//! [`HttpLedgerClient`]: crate::HttpLedgerClient
//! [`InMemoryLedger`]: crate::InMemoryLedger

use std::future::Future;
use std::time::Duration;

use stl_core::{CommitmentHash, IncidentId, IncidentType, TxId};
use stl_crypto::{ContentLocator, Salt};
use stl_state::{AuditorDecision, Incident};

use crate::call::{ContractCall, SignedCall, TxHandle, TxStatus};
use crate::error::LedgerError;
use crate::session::Signer;

/// How long to wait for a transaction to leave `Pending`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_polls: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            interval: Duration::from_secs(2),
            max_polls: 90,
        }
    }
}

pub trait LedgerReader: Send + Sync {
    /// The incident as the ledger stores it. Status is not deadline-adjusted.
    fn get_incident(
        &self,
        id: IncidentId,
    ) -> impl Future<Output = Result<Incident, LedgerError>> + Send;

    /// Highest id assigned so far; ids run `1..=count`.
    fn incident_count(&self) -> impl Future<Output = Result<u64, LedgerError>> + Send;

    fn tx_status(&self, tx: &TxId) -> impl Future<Output = Result<TxStatus, LedgerError>> + Send;

    /// Poll [`tx_status`](Self::tx_status) until the transaction is
    /// confirmed or failed. Polls at least once.
    fn await_tx(
        &self,
        tx: &TxId,
        policy: PollPolicy,
    ) -> impl Future<Output = Result<TxStatus, LedgerError>> + Send {
        async move {
            for _ in 0..policy.max_polls.max(1) {
                let status = self.tx_status(tx).await?;
                if !status.is_pending() {
                    return Ok(status);
                }
                tokio::time::sleep(policy.interval).await;
            }
            Err(LedgerError::Timeout(tx.clone()))
        }
    }
}

pub trait LedgerWriter: Send + Sync {
    /// Submit a signed call. Never retried.
    fn submit(&self, call: SignedCall) -> impl Future<Output = Result<TxHandle, LedgerError>> + Send;

    fn commit_incident(
        &self,
        signer: &impl Signer,
        evidence_hash: CommitmentHash,
        meta_hash: CommitmentHash,
        geo_hash: CommitmentHash,
        incident_type: IncidentType,
    ) -> impl Future<Output = Result<TxHandle, LedgerError>> + Send {
        let signed = SignedCall::sign(
            ContractCall::CommitIncident {
                evidence_hash,
                meta_hash,
                geo_hash,
                type_code: incident_type.code(),
            },
            signer,
        );
        async move { self.submit(signed?).await }
    }

    fn reveal_incident(
        &self,
        signer: &impl Signer,
        id: IncidentId,
        locator: ContentLocator,
        meta_hash: CommitmentHash,
        salt: Salt,
        evidence_hash: CommitmentHash,
    ) -> impl Future<Output = Result<TxHandle, LedgerError>> + Send {
        let signed = SignedCall::sign(
            ContractCall::RevealIncident {
                id,
                locator,
                meta_hash,
                salt,
                evidence_hash,
            },
            signer,
        );
        async move { self.submit(signed?).await }
    }

    fn open_dispute(
        &self,
        signer: &impl Signer,
        id: IncidentId,
        reason_hash: CommitmentHash,
    ) -> impl Future<Output = Result<TxHandle, LedgerError>> + Send {
        let signed = SignedCall::sign(ContractCall::OpenDispute { id, reason_hash }, signer);
        async move { self.submit(signed?).await }
    }

    fn resolve_dispute(
        &self,
        signer: &impl Signer,
        id: IncidentId,
        decision: AuditorDecision,
    ) -> impl Future<Output = Result<TxHandle, LedgerError>> + Send {
        let signed = SignedCall::sign(
            ContractCall::ResolveDispute {
                id,
                new_status: decision.target_status().code(),
            },
            signer,
        );
        async move { self.submit(signed?).await }
    }
}
