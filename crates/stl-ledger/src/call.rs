//! # Contract Calls
//!
//! A write is a [`ContractCall`] naming one contract function and its
//! arguments, wrapped in a [`SignedCall`]. The signature covers the
//! canonical bytes of `{call, nonce, sender}`; the ledger recomputes those
//! bytes and checks the signature before executing anything.

use serde::{Deserialize, Serialize};
use stl_core::{CanonicalBytes, CommitmentHash, IncidentId, Principal, Timestamp, TxId};
use stl_crypto::{ContentLocator, PublicKey, Salt, Signature};

use crate::error::LedgerError;
use crate::session::Signer;

/// One contract function invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "function", content = "args", rename_all = "kebab-case")]
pub enum ContractCall {
    #[serde(rename_all = "camelCase")]
    CommitIncident {
        evidence_hash: CommitmentHash,
        meta_hash: CommitmentHash,
        geo_hash: CommitmentHash,
        type_code: u8,
    },
    #[serde(rename_all = "camelCase")]
    RevealIncident {
        id: IncidentId,
        locator: ContentLocator,
        meta_hash: CommitmentHash,
        salt: Salt,
        evidence_hash: CommitmentHash,
    },
    #[serde(rename_all = "camelCase")]
    OpenDispute {
        id: IncidentId,
        reason_hash: CommitmentHash,
    },
    #[serde(rename_all = "camelCase")]
    ResolveDispute { id: IncidentId, new_status: u8 },
}

impl ContractCall {
    pub fn function_name(&self) -> &'static str {
        match self {
            Self::CommitIncident { .. } => "commit-incident",
            Self::RevealIncident { .. } => "reveal-incident",
            Self::OpenDispute { .. } => "open-dispute",
            Self::ResolveDispute { .. } => "resolve-dispute",
        }
    }

    /// Target incident; `None` for commits, whose id the ledger assigns.
    pub fn incident(&self) -> Option<IncidentId> {
        match self {
            Self::CommitIncident { .. } => None,
            Self::RevealIncident { id, .. }
            | Self::OpenDispute { id, .. }
            | Self::ResolveDispute { id, .. } => Some(*id),
        }
    }
}

#[derive(Serialize)]
struct SigningEnvelope<'a> {
    call: &'a ContractCall,
    nonce: u64,
    sender: &'a Principal,
}

/// A contract call with its sender's signature.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SignedCall {
    pub call: ContractCall,
    pub sender: Principal,
    pub public_key: PublicKey,
    pub nonce: u64,
    pub signature: Signature,
}

impl SignedCall {
    /// Canonical bytes covered by the signature.
    pub fn signing_bytes(
        call: &ContractCall,
        sender: &Principal,
        nonce: u64,
    ) -> Result<CanonicalBytes, LedgerError> {
        CanonicalBytes::new(&SigningEnvelope { call, nonce, sender })
            .map_err(|e| LedgerError::Signing(e.to_string()))
    }

    /// Sign `call` with the session's key and next nonce.
    pub fn sign(call: ContractCall, signer: &impl Signer) -> Result<Self, LedgerError> {
        let sender = signer.principal().clone();
        let nonce = signer.next_nonce();
        let bytes = Self::signing_bytes(&call, &sender, nonce)?;
        Ok(Self {
            signature: signer.sign(&bytes),
            public_key: signer.public_key(),
            call,
            sender,
            nonce,
        })
    }

    /// Check the signature against the embedded public key.
    pub fn verify(&self) -> Result<(), LedgerError> {
        let bytes = Self::signing_bytes(&self.call, &self.sender, self.nonce)?;
        self.public_key
            .verify(&bytes, &self.signature)
            .map_err(|e| LedgerError::Rejected {
                function: self.call.function_name().to_string(),
                reason: e.to_string(),
            })
    }
}

/// Receipt for a submitted call. Completion is learned through
/// [`tx_status`](crate::LedgerReader::tx_status).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TxHandle {
    pub tx_id: TxId,
    pub function: String,
    pub submitted_at: Timestamp,
}

/// Outcome of a submitted transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum TxStatus {
    Pending,
    Confirmed {
        /// Incident the call created or touched.
        #[serde(default, rename = "incidentId", skip_serializing_if = "Option::is_none")]
        incident: Option<IncidentId>,
    },
    Failed {
        reason: String,
    },
}

impl TxStatus {
    pub fn is_pending(&self) -> bool {
        matches!(self, Self::Pending)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Ed25519Session;
    use stl_core::Role;
    use stl_crypto::{digest, SigningIdentity};

    fn session() -> Ed25519Session {
        Ed25519Session::new(SigningIdentity::from_seed(&[5u8; 32]), Role::Reporter)
    }

    fn commit_call() -> ContractCall {
        ContractCall::CommitIncident {
            evidence_hash: digest(b"e"),
            meta_hash: digest(b"m"),
            geo_hash: digest(b"g"),
            type_code: 2,
        }
    }

    #[test]
    fn wire_shape_uses_contract_function_names() {
        let json = serde_json::to_value(ContractCall::ResolveDispute {
            id: IncidentId(3),
            new_status: 3,
        })
        .unwrap();
        assert_eq!(
            json,
            serde_json::json!({"function": "resolve-dispute", "args": {"id": 3, "newStatus": 3}})
        );
        let commit = serde_json::to_value(commit_call()).unwrap();
        assert_eq!(commit["function"], "commit-incident");
        assert_eq!(commit["args"]["typeCode"], 2);
        assert!(commit["args"]["evidenceHash"].as_str().unwrap().starts_with("0x"));
    }

    #[test]
    fn signed_call_verifies() {
        let s = session();
        let signed = SignedCall::sign(commit_call(), &s).unwrap();
        signed.verify().unwrap();
        assert_eq!(&signed.sender, s.principal());
    }

    #[test]
    fn tampered_call_fails_verification() {
        let mut signed = SignedCall::sign(commit_call(), &session()).unwrap();
        signed.call = ContractCall::CommitIncident {
            evidence_hash: digest(b"other"),
            meta_hash: digest(b"m"),
            geo_hash: digest(b"g"),
            type_code: 2,
        };
        assert!(matches!(signed.verify(), Err(LedgerError::Rejected { .. })));
    }

    #[test]
    fn replayed_with_new_nonce_fails() {
        let mut signed = SignedCall::sign(commit_call(), &session()).unwrap();
        signed.nonce += 1;
        assert!(signed.verify().is_err());
    }

    #[test]
    fn nonces_increase() {
        let s = session();
        let a = SignedCall::sign(commit_call(), &s).unwrap();
        let b = SignedCall::sign(commit_call(), &s).unwrap();
        assert!(b.nonce > a.nonce);
    }

    #[test]
    fn tx_status_wire_shape() {
        let confirmed: TxStatus =
            serde_json::from_str(r#"{"status":"confirmed","incidentId":7}"#).unwrap();
        assert_eq!(
            confirmed,
            TxStatus::Confirmed {
                incident: Some(IncidentId(7))
            }
        );
        let failed: TxStatus =
            serde_json::from_str(r#"{"status":"failed","reason":"not pending"}"#).unwrap();
        assert!(matches!(failed, TxStatus::Failed { .. }));
        let pending: TxStatus = serde_json::from_str(r#"{"status":"pending"}"#).unwrap();
        assert!(pending.is_pending());
    }

    #[test]
    fn incident_target() {
        assert_eq!(commit_call().incident(), None);
        assert_eq!(
            ContractCall::OpenDispute {
                id: IncidentId(2),
                reason_hash: digest(b"r")
            }
            .incident(),
            Some(IncidentId(2))
        );
    }
}
