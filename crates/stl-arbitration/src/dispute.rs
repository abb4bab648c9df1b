//! # Dispute Requests
//!
//! The ledger stores only a hash of the dispute reason. The hash commits to
//! the incident id as well as the text, so the same complaint filed against
//! two incidents yields two different commitments:
//!
//! ```text
//! reasonHash = sha256(JCS({"incident": <id>, "reason": <text>}))
//! ```

use serde::{Deserialize, Serialize};
use stl_core::{CanonicalBytes, CommitmentHash, IncidentId, Timestamp};
use stl_crypto::digest_canonical;
use stl_state::{AuditorDecision, Incident, IncidentError, IncidentStatus, RevealWindow};

use crate::error::ArbitrationError;

/// Free-text reason for challenging an incident.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DisputeReason(String);

#[derive(Serialize)]
struct ReasonEnvelope<'a> {
    incident: u64,
    reason: &'a str,
}

impl DisputeReason {
    pub fn new(text: impl Into<String>) -> Result<Self, ArbitrationError> {
        let text = text.into();
        if text.trim().is_empty() {
            return Err(ArbitrationError::EmptyReason);
        }
        Ok(Self(text))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The reason commitment for `incident`.
    pub fn commitment(&self, incident: IncidentId) -> Result<CommitmentHash, ArbitrationError> {
        let envelope = ReasonEnvelope {
            incident: incident.value(),
            reason: &self.0,
        };
        let cb = CanonicalBytes::new(&envelope)
            .map_err(|e| ArbitrationError::Canonicalization(e.to_string()))?;
        Ok(digest_canonical(&cb))
    }
}

/// Request to move a revealed incident to disputed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisputeRequest {
    pub incident: IncidentId,
    pub reason_hash: CommitmentHash,
}

impl DisputeRequest {
    pub fn new(incident: IncidentId, reason: &DisputeReason) -> Result<Self, ArbitrationError> {
        Ok(Self {
            incident,
            reason_hash: reason.commitment(incident)?,
        })
    }

    /// Fail locally if the ledger would refuse the transition.
    pub fn precheck(
        &self,
        incident: &Incident,
        window: &RevealWindow,
        now: &Timestamp,
    ) -> Result<(), ArbitrationError> {
        expect_status(incident, window, now, IncidentStatus::Revealed, IncidentStatus::Disputed)
    }
}

/// Request to close a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolutionRequest {
    pub incident: IncidentId,
    pub decision: AuditorDecision,
}

impl ResolutionRequest {
    pub fn new(incident: IncidentId, decision: AuditorDecision) -> Self {
        Self { incident, decision }
    }

    pub fn precheck(
        &self,
        incident: &Incident,
        window: &RevealWindow,
        now: &Timestamp,
    ) -> Result<(), ArbitrationError> {
        expect_status(
            incident,
            window,
            now,
            IncidentStatus::Disputed,
            self.decision.target_status(),
        )
    }
}

fn expect_status(
    incident: &Incident,
    window: &RevealWindow,
    now: &Timestamp,
    expected: IncidentStatus,
    target: IncidentStatus,
) -> Result<(), ArbitrationError> {
    let current = incident.effective_status(window, now);
    if current != expected {
        return Err(IncidentError::InvalidTransition {
            id: incident.id(),
            from: current,
            to: target,
        }
        .into());
    }
    Ok(())
}
