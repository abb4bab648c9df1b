//! # Incident State Machine
//!
//! ## States
//!
//! ```text
//! Pending ──▶ Revealed ──▶ Disputed ──▶ Resolved (terminal)
//!    │                        │
//!    └──▶ Stale (terminal) ◀──┘
//! ```
//!
//! Status codes on the wire match the contract constants
//! (`PENDING=0 .. STALE=4`).
//!
//! The three commitment hashes are fixed at commit time. They live in a
//! private field with a read-only accessor, so no transition can alter them.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use stl_core::{CommitmentHash, IncidentId, IncidentType, Principal, Timestamp, ValidationError};
use stl_crypto::{ContentLocator, Salt};

use crate::deadline::RevealWindow;

// ─── Status ──────────────────────────────────────────────────────────

/// Lifecycle status of an incident.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IncidentStatus {
    /// Committed, awaiting reveal.
    Pending,
    /// Evidence disclosed and verified against the commitment.
    Revealed,
    /// Challenged by a verifier.
    Disputed,
    /// Dispute closed by an auditor (terminal).
    Resolved,
    /// Never revealed in time, or dispute closed as stale (terminal).
    Stale,
}

impl IncidentStatus {
    /// Contract status code.
    pub fn code(&self) -> u8 {
        match self {
            Self::Pending => 0,
            Self::Revealed => 1,
            Self::Disputed => 2,
            Self::Resolved => 3,
            Self::Stale => 4,
        }
    }

    pub fn from_code(code: u8) -> Result<Self, ValidationError> {
        match code {
            0 => Ok(Self::Pending),
            1 => Ok(Self::Revealed),
            2 => Ok(Self::Disputed),
            3 => Ok(Self::Resolved),
            4 => Ok(Self::Stale),
            other => Err(ValidationError::UnknownStatusCode(other)),
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Resolved | Self::Stale)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Revealed => "revealed",
            Self::Disputed => "disputed",
            Self::Resolved => "resolved",
            Self::Stale => "stale",
        }
    }
}

impl std::fmt::Display for IncidentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for IncidentStatus {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "pending" => Ok(Self::Pending),
            "revealed" => Ok(Self::Revealed),
            "disputed" => Ok(Self::Disputed),
            "resolved" => Ok(Self::Resolved),
            "stale" => Ok(Self::Stale),
            _ => Err(ValidationError::UnknownStatus(s.to_string())),
        }
    }
}

// ─── Errors ──────────────────────────────────────────────────────────

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IncidentError {
    /// The requested transition is not an edge of the state machine.
    #[error("incident {id}: invalid transition {from} -> {to}")]
    InvalidTransition {
        id: IncidentId,
        from: IncidentStatus,
        to: IncidentStatus,
    },
}

// ─── Payloads ────────────────────────────────────────────────────────

/// Hashes published at commit time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commitments {
    pub evidence_hash: CommitmentHash,
    pub meta_hash: CommitmentHash,
    pub geo_hash: CommitmentHash,
    pub incident_type: IncidentType,
}

/// What the ledger records on a successful reveal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RevealPayload {
    pub locator: ContentLocator,
    pub meta_hash: CommitmentHash,
    pub salt: Salt,
}

/// Outcome an auditor chooses when closing a dispute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuditorDecision {
    /// The incident stands.
    Resolve,
    /// The incident is void.
    MarkStale,
}

impl AuditorDecision {
    /// Status the incident moves to.
    pub fn target_status(&self) -> IncidentStatus {
        match self {
            Self::Resolve => IncidentStatus::Resolved,
            Self::MarkStale => IncidentStatus::Stale,
        }
    }

    /// Inverse of [`target_status`](Self::target_status); `None` for
    /// statuses that cannot end a dispute.
    pub fn from_status(status: IncidentStatus) -> Option<Self> {
        match status {
            IncidentStatus::Resolved => Some(Self::Resolve),
            IncidentStatus::Stale => Some(Self::MarkStale),
            _ => None,
        }
    }
}

/// Record of an applied transition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IncidentTransitionRecord {
    pub from: IncidentStatus,
    pub to: IncidentStatus,
    pub timestamp: Timestamp,
    pub reason: String,
}

/// Every field of an incident as a ledger reports it. Used to rebuild the
/// client mirror from a read; carries no transition log.
#[derive(Debug, Clone)]
pub struct IncidentSnapshot {
    pub id: IncidentId,
    pub proposer: Principal,
    pub status: IncidentStatus,
    pub commitments: Commitments,
    pub commit_height: u64,
    pub committed_at: Timestamp,
    pub reveal: Option<RevealPayload>,
    pub dispute_reason: Option<CommitmentHash>,
}

// ─── Incident ────────────────────────────────────────────────────────

/// An incident with its lifecycle state and transition history.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Incident {
    id: IncidentId,
    proposer: Principal,
    status: IncidentStatus,
    commitments: Commitments,
    commit_height: u64,
    committed_at: Timestamp,
    reveal: Option<RevealPayload>,
    dispute_reason: Option<CommitmentHash>,
    resolution: Option<AuditorDecision>,
    transitions: Vec<IncidentTransitionRecord>,
}

impl Incident {
    /// A freshly committed, pending incident.
    pub fn committed(
        id: IncidentId,
        proposer: Principal,
        commitments: Commitments,
        commit_height: u64,
        committed_at: Timestamp,
    ) -> Self {
        Self {
            id,
            proposer,
            status: IncidentStatus::Pending,
            commitments,
            commit_height,
            committed_at,
            reveal: None,
            dispute_reason: None,
            resolution: None,
            transitions: Vec::new(),
        }
    }

    /// Rebuild from a ledger read. The resolution outcome is implied by a
    /// terminal status reached with a dispute on record.
    pub fn from_snapshot(s: IncidentSnapshot) -> Self {
        let resolution = if s.dispute_reason.is_some() {
            AuditorDecision::from_status(s.status)
        } else {
            None
        };
        Self {
            id: s.id,
            proposer: s.proposer,
            status: s.status,
            commitments: s.commitments,
            commit_height: s.commit_height,
            committed_at: s.committed_at,
            reveal: s.reveal,
            dispute_reason: s.dispute_reason,
            resolution,
            transitions: Vec::new(),
        }
    }

    pub fn id(&self) -> IncidentId {
        self.id
    }

    pub fn proposer(&self) -> &Principal {
        &self.proposer
    }

    /// Status as last recorded. May be `Pending` past the deadline; see
    /// [`effective_status`](Self::effective_status).
    pub fn status(&self) -> IncidentStatus {
        self.status
    }

    pub fn commitments(&self) -> &Commitments {
        &self.commitments
    }

    pub fn commit_height(&self) -> u64 {
        self.commit_height
    }

    pub fn committed_at(&self) -> Timestamp {
        self.committed_at
    }

    pub fn reveal_payload(&self) -> Option<&RevealPayload> {
        self.reveal.as_ref()
    }

    pub fn dispute_reason(&self) -> Option<&CommitmentHash> {
        self.dispute_reason.as_ref()
    }

    pub fn resolution(&self) -> Option<AuditorDecision> {
        self.resolution
    }

    pub fn transitions(&self) -> &[IncidentTransitionRecord] {
        &self.transitions
    }

    pub fn is_terminal(&self) -> bool {
        self.status.is_terminal()
    }

    /// Status with the reveal deadline applied.
    pub fn effective_status(&self, window: &RevealWindow, now: &Timestamp) -> IncidentStatus {
        if self.status == IncidentStatus::Pending && window.is_expired(&self.committed_at, now) {
            IncidentStatus::Stale
        } else {
            self.status
        }
    }

    /// Apply the lazy deadline transition. Returns whether it fired.
    pub fn refresh(&mut self, window: &RevealWindow, now: &Timestamp) -> bool {
        if self.effective_status(window, now) == IncidentStatus::Stale
            && self.status == IncidentStatus::Pending
        {
            self.do_transition(IncidentStatus::Stale, *now, "reveal window elapsed");
            true
        } else {
            false
        }
    }

    /// PENDING → STALE when the deadline has passed.
    pub fn expire(&mut self, window: &RevealWindow, now: &Timestamp) -> Result<(), IncidentError> {
        self.require_state(IncidentStatus::Pending, IncidentStatus::Stale)?;
        if !window.is_expired(&self.committed_at, now) {
            return Err(self.invalid(IncidentStatus::Stale));
        }
        self.do_transition(IncidentStatus::Stale, *now, "reveal window elapsed");
        Ok(())
    }

    /// PENDING → REVEALED. The caller has already verified the disclosure.
    pub fn reveal(&mut self, payload: RevealPayload, at: Timestamp) -> Result<(), IncidentError> {
        self.require_state(IncidentStatus::Pending, IncidentStatus::Revealed)?;
        self.reveal = Some(payload);
        self.do_transition(IncidentStatus::Revealed, at, "evidence revealed");
        Ok(())
    }

    /// REVEALED → DISPUTED.
    pub fn open_dispute(
        &mut self,
        reason_hash: CommitmentHash,
        at: Timestamp,
    ) -> Result<(), IncidentError> {
        self.require_state(IncidentStatus::Revealed, IncidentStatus::Disputed)?;
        self.dispute_reason = Some(reason_hash);
        self.do_transition(IncidentStatus::Disputed, at, "dispute opened");
        Ok(())
    }

    /// DISPUTED → RESOLVED or STALE.
    pub fn resolve_dispute(
        &mut self,
        decision: AuditorDecision,
        at: Timestamp,
    ) -> Result<(), IncidentError> {
        let target = decision.target_status();
        self.require_state(IncidentStatus::Disputed, target)?;
        self.resolution = Some(decision);
        self.do_transition(target, at, "dispute resolved");
        Ok(())
    }

    fn require_state(
        &self,
        expected: IncidentStatus,
        target: IncidentStatus,
    ) -> Result<(), IncidentError> {
        if self.status.is_terminal() || self.status != expected {
            return Err(self.invalid(target));
        }
        Ok(())
    }

    fn invalid(&self, to: IncidentStatus) -> IncidentError {
        IncidentError::InvalidTransition {
            id: self.id,
            from: self.status,
            to,
        }
    }

    fn do_transition(&mut self, to: IncidentStatus, at: Timestamp, reason: &str) {
        self.transitions.push(IncidentTransitionRecord {
            from: self.status,
            to,
            timestamp: at,
            reason: reason.to_string(),
        });
        self.status = to;
    }
}

// ─── Tests ───────────────────────────────────────────────────────────


#[cfg(test)]
mod proptests {
    use super::tests::{pending, t0};
    use super::*;
    use proptest::prelude::*;
    use stl_crypto::digest;

    #[derive(Debug, Clone)]
    enum Op {
        Reveal,
        Expire,
        Dispute,
        Resolve(bool),
    }

    fn op() -> impl Strategy<Value = Op> {
        prop_oneof![
            Just(Op::Reveal),
            Just(Op::Expire),
            Just(Op::Dispute),
            any::<bool>().prop_map(Op::Resolve),
        ]
    }

    fn apply(inc: &mut Incident, op: &Op, step: i64) -> Result<(), IncidentError> {
        let at = t0().plus(chrono::Duration::hours(step));
        match op {
            Op::Reveal => inc.reveal(
                RevealPayload {
                    locator: stl_crypto::ContentLocator::new("loc"),
                    meta_hash: digest(b"m"),
                    salt: Salt::from_bytes([0u8; 32]),
                },
                at,
            ),
            Op::Expire => inc.expire(&RevealWindow::default(), &at.plus(chrono::Duration::days(2))),
            Op::Dispute => inc.open_dispute(digest(b"r"), at),
            Op::Resolve(stale) => inc.resolve_dispute(
                if *stale { AuditorDecision::MarkStale } else { AuditorDecision::Resolve },
                at,
            ),
        }
    }

    proptest! {
        #[test]
        fn terminal_states_never_regress(ops in prop::collection::vec(op(), 0..16)) {
            let mut inc = pending();
            let mut seen_terminal: Option<IncidentStatus> = None;
            for (i, op) in ops.iter().enumerate() {
                let before = inc.status();
                let result = apply(&mut inc, op, i as i64);
                if let Some(t) = seen_terminal {
                    prop_assert!(result.is_err());
                    prop_assert_eq!(inc.status(), t);
                }
                if result.is_err() {
                    prop_assert_eq!(inc.status(), before);
                }
                if inc.is_terminal() {
                    seen_terminal = Some(inc.status());
                }
            }
        }

        #[test]
        fn log_length_matches_applied_transitions(ops in prop::collection::vec(op(), 0..16)) {
            let mut inc = pending();
            let mut applied = 0usize;
            for (i, op) in ops.iter().enumerate() {
                if apply(&mut inc, op, i as i64).is_ok() {
                    applied += 1;
                }
            }
            prop_assert_eq!(inc.transitions().len(), applied);
        }
    }
}
