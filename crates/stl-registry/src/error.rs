//! # Registry Errors
//!
//! One taxonomy for every workflow operation. Local failures (validation,
//! hash mismatch, authorization, wrong state) are raised before anything is
//! sent; `SubmissionRejected` means the write reached the transport or the
//! ledger and was refused there.

use stl_arbitration::{ArbitrationError, DisputeAction};
use stl_core::{CanonicalizationError, IncidentId, Role, TxId, ValidationError};
use stl_crypto::CryptoError;
use stl_ledger::LedgerError;
use stl_state::IncidentError;
use thiserror::Error;

use crate::commit::{Opening, PreparedCommit};
use crate::reveal::Mismatch;
use crate::settings::SettingsError;

#[derive(Error, Debug)]
pub enum RegistryError {
    /// The transport failed or the ledger refused the call. Not retried.
    #[error("{function} rejected: {reason}")]
    SubmissionRejected { function: String, reason: String },

    /// A commit reached the ledger but its outcome is unknown, or it landed
    /// and could not be read back. The incident may exist; `prepared` holds
    /// the only copy of its opening.
    #[error("commit {tx} submitted but not settled: {source}")]
    CommitUnsettled {
        tx: TxId,
        incident: Option<IncidentId>,
        prepared: Box<PreparedCommit>,
        #[source]
        source: Box<RegistryError>,
    },

    /// The disclosure does not reproduce the committed hashes.
    #[error("incident {id}: disclosure does not reproduce the committed {mismatch}")]
    HashMismatch { id: IncidentId, mismatch: Mismatch },

    #[error(transparent)]
    InvalidTransition(#[from] IncidentError),

    #[error("incident {0} not found")]
    NotFound(IncidentId),

    #[error("{role} may not {action}; requires {required} or higher")]
    Unauthorized {
        action: DisputeAction,
        role: Role,
        required: Role,
    },

    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    #[error("canonicalization failed: {0}")]
    Canonicalization(String),

    #[error("content store: {0}")]
    Content(#[from] CryptoError),

    #[error("ledger: {0}")]
    Ledger(LedgerError),

    #[error("settings: {0}")]
    Settings(#[from] SettingsError),
}

impl RegistryError {
    /// The opening carried by a commit whose outcome is unknown.
    pub fn opening(&self) -> Option<&Opening> {
        match self {
            Self::CommitUnsettled { prepared, .. } => Some(&prepared.opening),
            _ => None,
        }
    }

    /// Wrap a failed write. Refusals and transport failures both become
    /// `SubmissionRejected`; local signing problems stay ledger errors.
    pub(crate) fn submission(function: &str, err: LedgerError) -> Self {
        match err {
            LedgerError::Rejected { function, reason } => {
                Self::SubmissionRejected { function, reason }
            }
            e @ (LedgerError::Signing(_) | LedgerError::Config(_)) => Self::Ledger(e),
            other => Self::SubmissionRejected {
                function: function.to_string(),
                reason: other.to_string(),
            },
        }
    }
}

impl From<LedgerError> for RegistryError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(id) => Self::NotFound(id),
            LedgerError::Rejected { function, reason } => {
                Self::SubmissionRejected { function, reason }
            }
            other => Self::Ledger(other),
        }
    }
}

impl From<ArbitrationError> for RegistryError {
    fn from(err: ArbitrationError) -> Self {
        match err {
            ArbitrationError::Unauthorized {
                action,
                role,
                required,
            } => Self::Unauthorized {
                action,
                role,
                required,
            },
            ArbitrationError::EmptyReason => {
                Self::Validation(ValidationError::MissingField("reason"))
            }
            ArbitrationError::Canonicalization(msg) => Self::Canonicalization(msg),
            ArbitrationError::Transition(e) => Self::InvalidTransition(e),
        }
    }
}

impl From<CanonicalizationError> for RegistryError {
    fn from(err: CanonicalizationError) -> Self {
        Self::Canonicalization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ledger_refusal_is_submission_rejected() {
        let err = RegistryError::from(LedgerError::Rejected {
            function: "reveal-incident".into(),
            reason: "nonce reused".into(),
        });
        assert!(matches!(err, RegistryError::SubmissionRejected { .. }));
    }

    #[test]
    fn ledger_not_found_is_not_found() {
        assert!(matches!(
            RegistryError::from(LedgerError::NotFound(IncidentId(3))),
            RegistryError::NotFound(IncidentId(3))
        ));
    }

    #[test]
    fn gateway_error_on_write_is_submission_rejected() {
        let err = RegistryError::submission(
            "commit-incident",
            LedgerError::Api {
                endpoint: "POST /calls".into(),
                status: 503,
                body: "unavailable".into(),
            },
        );
        match err {
            RegistryError::SubmissionRejected { function, reason } => {
                assert_eq!(function, "commit-incident");
                assert!(reason.contains("503"));
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn unauthorized_carries_roles() {
        let err = RegistryError::from(ArbitrationError::Unauthorized {
            action: DisputeAction::Resolve,
            role: Role::Verifier,
            required: Role::PrimaryAuditor,
        });
        assert_eq!(
            err.to_string(),
            "verifier may not resolve a dispute; requires primary_auditor or higher"
        );
    }
}
