//! Dispute workflow on the registry. Authorization and state prechecks run
//! locally before anything is signed, so an unauthorized caller or a wrong
//! state costs no transaction and leaves the incident untouched.

use stl_arbitration::{DisputeAction, DisputeReason, DisputeRequest, ResolutionRequest};
use stl_core::IncidentId;
use stl_ledger::{LedgerReader, LedgerWriter, Signer};
use stl_state::AuditorDecision;

use crate::error::RegistryError;
use crate::events::IncidentEvent;
use crate::registry::{Registry, TxReceipt};

impl<L: LedgerReader + LedgerWriter> Registry<L> {
    /// Challenge a revealed incident. Requires a verifier role or above.
    pub async fn open_dispute(
        &self,
        signer: &impl Signer,
        id: IncidentId,
        reason: &DisputeReason,
    ) -> Result<TxReceipt, RegistryError> {
        const FUNCTION: &str = "open-dispute";
        self.policy.authorize(DisputeAction::Open, signer.role())?;

        let current = self.refetch(id).await?.incident;
        let now = self.now();
        let request = DisputeRequest::new(id, reason)?;
        request.precheck(&current, &self.window, &now)?;

        let handle = self
            .ledger
            .open_dispute(signer, id, request.reason_hash)
            .await
            .map_err(|e| RegistryError::submission(FUNCTION, e))?;

        let mut predicted = current;
        if predicted.open_dispute(request.reason_hash, now).is_ok() {
            self.cache.mirror(predicted, now);
        }

        let receipt = self.confirm(FUNCTION, id, handle).await?;
        tracing::info!(incident = %id, tx = %receipt.tx, "dispute opened");
        self.subscriptions.publish(&IncidentEvent::DisputeOpened {
            id,
            tx: receipt.tx.clone(),
        });
        Ok(receipt)
    }

    /// Close a dispute as resolved or stale. Requires the primary auditor.
    pub async fn resolve_dispute(
        &self,
        signer: &impl Signer,
        id: IncidentId,
        decision: AuditorDecision,
    ) -> Result<TxReceipt, RegistryError> {
        const FUNCTION: &str = "resolve-dispute";
        self.policy.authorize(DisputeAction::Resolve, signer.role())?;

        let current = self.refetch(id).await?.incident;
        let now = self.now();
        let request = ResolutionRequest::new(id, decision);
        request.precheck(&current, &self.window, &now)?;

        let handle = self
            .ledger
            .resolve_dispute(signer, id, request.decision)
            .await
            .map_err(|e| RegistryError::submission(FUNCTION, e))?;

        let mut predicted = current;
        if predicted.resolve_dispute(request.decision, now).is_ok() {
            self.cache.mirror(predicted, now);
        }

        let receipt = self.confirm(FUNCTION, id, handle).await?;
        tracing::info!(incident = %id, tx = %receipt.tx, status = %receipt.status, "dispute resolved");
        self.subscriptions.publish(&IncidentEvent::DisputeResolved {
            id,
            tx: receipt.tx.clone(),
            status: receipt.status,
        });
        Ok(receipt)
    }
}
