//! # Reveal Verifier
//!
//! Recomputes the evidence and metadata commitments from a disclosure and
//! compares them, in constant time, with what the ledger stored. Stateless:
//! the caller fetches the commitments and resolves locators.

use stl_core::{CommitmentHash, IncidentId};
use stl_crypto::{digest, hashes_match, ContentLocator, Salt};
use stl_state::Commitments;

use crate::commit::{meta_commitment, IncidentMetadata, Opening};
use crate::error::RegistryError;

/// Evidence as disclosed: the bytes themselves, or a locator already in
/// the content store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DisclosedEvidence {
    Bytes(Vec<u8>),
    Locator(ContentLocator),
}

/// Everything a reporter discloses to reveal an incident.
#[derive(Debug, Clone)]
pub struct Disclosure {
    pub evidence: DisclosedEvidence,
    pub metadata: IncidentMetadata,
    pub salt: Salt,
}

impl Disclosure {
    pub fn new(evidence: DisclosedEvidence, opening: Opening) -> Self {
        Self {
            evidence,
            metadata: opening.metadata,
            salt: opening.salt,
        }
    }
}

/// Which commitments a disclosure failed to reproduce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mismatch {
    pub evidence: bool,
    pub metadata: bool,
}

impl std::fmt::Display for Mismatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (self.evidence, self.metadata) {
            (true, true) => f.write_str("evidence and metadata hashes"),
            (true, false) => f.write_str("evidence hash"),
            (false, true) => f.write_str("metadata hash"),
            (false, false) => f.write_str("no hashes"),
        }
    }
}

/// Hashes recomputed from an accepted disclosure, as sent in the reveal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VerifiedReveal {
    pub evidence_hash: CommitmentHash,
    pub meta_hash: CommitmentHash,
}

pub struct RevealVerifier;

impl RevealVerifier {
    /// Accept iff both recomputed hashes equal the stored ones.
    pub fn verify(
        id: IncidentId,
        stored: &Commitments,
        evidence: &[u8],
        metadata: &IncidentMetadata,
        salt: &Salt,
    ) -> Result<VerifiedReveal, RegistryError> {
        let evidence_hash = digest(evidence);
        let meta_hash = meta_commitment(metadata, salt)?;

        let mismatch = Mismatch {
            evidence: !hashes_match(&evidence_hash, &stored.evidence_hash),
            metadata: !hashes_match(&meta_hash, &stored.meta_hash),
        };
        if mismatch.evidence || mismatch.metadata {
            return Err(RegistryError::HashMismatch { id, mismatch });
        }

        Ok(VerifiedReveal {
            evidence_hash,
            meta_hash,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commit::PreparedCommit;
    use proptest::prelude::*;
    use stl_core::IncidentType;

    fn committed(evidence: &[u8], metadata: IncidentMetadata, salt: Salt) -> Commitments {
        let p = PreparedCommit::with_salt(evidence, metadata, IncidentType::Speeding, salt)
            .unwrap();
        Commitments {
            evidence_hash: p.evidence_hash,
            meta_hash: p.meta_hash,
            geo_hash: p.geo_hash,
            incident_type: p.incident_type,
        }
    }

    #[test]
    fn legitimate_reveal_accepted() {
        let meta = IncidentMetadata::at("-16.5,-68.15");
        let salt = Salt::from_bytes([1; 32]);
        let stored = committed(b"photo-bytes", meta.clone(), salt.clone());
        let ok = RevealVerifier::verify(IncidentId(1), &stored, b"photo-bytes", &meta, &salt)
            .unwrap();
        assert_eq!(ok.evidence_hash, stored.evidence_hash);
        assert_eq!(ok.meta_hash, stored.meta_hash);
    }

    #[test]
    fn wrong_evidence_named() {
        let meta = IncidentMetadata::at("loc");
        let salt = Salt::from_bytes([1; 32]);
        let stored = committed(b"photo-bytes", meta.clone(), salt.clone());
        match RevealVerifier::verify(IncidentId(4), &stored, b"other", &meta, &salt) {
            Err(RegistryError::HashMismatch { id, mismatch }) => {
                assert_eq!(id, IncidentId(4));
                assert_eq!(mismatch, Mismatch { evidence: true, metadata: false });
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }

    #[test]
    fn altered_metadata_named() {
        let meta = IncidentMetadata::at("loc");
        let salt = Salt::from_bytes([1; 32]);
        let stored = committed(b"e", meta, salt.clone());
        let mut altered = IncidentMetadata::at("loc");
        altered.plate = Some("XYZ-999".into());
        let err = RevealVerifier::verify(IncidentId(1), &stored, b"e", &altered, &salt)
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "incident 0001: disclosure does not reproduce the committed metadata hash"
        );
    }

    proptest! {
        #[test]
        fn commit_then_verify_accepts(
            evidence in proptest::collection::vec(any::<u8>(), 1..256),
            location in "[a-z0-9,.-]{1,40}",
            seed in any::<[u8; 32]>(),
        ) {
            let meta = IncidentMetadata::at(location);
            let salt = Salt::from_bytes(seed);
            let stored = committed(&evidence, meta.clone(), salt.clone());
            prop_assert!(RevealVerifier::verify(IncidentId(1), &stored, &evidence, &meta, &salt).is_ok());
        }

        #[test]
        fn wrong_salt_rejected(
            seed in any::<[u8; 32]>(),
            other in any::<[u8; 32]>(),
        ) {
            prop_assume!(seed != other);
            let meta = IncidentMetadata::at("-16.5,-68.15");
            let stored = committed(b"photo-bytes", meta.clone(), Salt::from_bytes(seed));
            let result = RevealVerifier::verify(
                IncidentId(1), &stored, b"photo-bytes", &meta, &Salt::from_bytes(other),
            );
            let is_metadata_only = matches!(
                result,
                Err(RegistryError::HashMismatch { mismatch: Mismatch { evidence: false, metadata: true }, .. })
            );
            prop_assert!(is_metadata_only);
        }
    }
}
