//! # Commitment Builder
//!
//! Turns raw evidence and free-form metadata into the three hashes the
//! ledger stores, plus the secret [`Opening`] the reporter must keep to
//! reveal later:
//!
//! ```text
//! evidenceHash = sha256(evidence bytes)
//! metaHash     = sha256(JCS({"metadata": <metadata>, "salt": "0x<salt>"}))
//! geoHash      = sha256(location as UTF-8)
//! ```
//!
//! Nothing here talks to the ledger or persists anything.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use stl_core::{CanonicalBytes, CommitmentHash, IncidentType, Timestamp, ValidationError};
use stl_crypto::{digest, digest_canonical, digest_str, Salt};
use zeroize::Zeroizing;

use crate::error::RegistryError;

/// What the reporter records about an incident. Disclosed verbatim at
/// reveal time, so every field participates in the metadata hash.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentMetadata {
    /// Free-form location, typically `"lat,lon"`. Hashed alone as the
    /// geo commitment.
    pub location: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub plate: Option<String>,
    /// Category label as entered, e.g. `"Exceso de velocidad"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub incident_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub captured_at: Option<Timestamp>,
    /// Any further fields, kept as strings so they canonicalize exactly.
    #[serde(flatten)]
    pub extra: BTreeMap<String, String>,
}

/// Wire names of the named fields; `extra` may not reuse them.
const RESERVED_KEYS: [&str; 6] = [
    "location",
    "plate",
    "incidentType",
    "agentId",
    "notes",
    "capturedAt",
];

impl IncidentMetadata {
    pub fn at(location: impl Into<String>) -> Self {
        Self {
            location: location.into(),
            ..Self::default()
        }
    }

    /// Reject `extra` keys that collide with named fields. Serialized side
    /// by side they would produce duplicate JSON keys.
    pub fn check_extra(&self) -> Result<(), ValidationError> {
        match self.extra.keys().find(|k| RESERVED_KEYS.contains(&k.as_str())) {
            Some(key) => Err(ValidationError::ReservedField(key.clone())),
            None => Ok(()),
        }
    }

    /// Category derived from the label, `Other` when absent or unknown.
    pub fn category(&self) -> IncidentType {
        self.incident_type
            .as_deref()
            .map(IncidentType::from_label)
            .unwrap_or(IncidentType::Other)
    }
}

#[derive(Serialize)]
struct MetaEnvelope<'a> {
    metadata: &'a IncidentMetadata,
    salt: &'a str,
}

/// `sha256(JCS({"metadata": .., "salt": ..}))`.
pub fn meta_commitment(
    metadata: &IncidentMetadata,
    salt: &Salt,
) -> Result<CommitmentHash, RegistryError> {
    metadata.check_extra()?;
    let salt_hex = Zeroizing::new(salt.to_prefixed_hex());
    let cb = CanonicalBytes::new(&MetaEnvelope {
        metadata,
        salt: salt_hex.as_str(),
    })?;
    Ok(digest_canonical(&cb))
}

/// `sha256(location)`.
pub fn geo_commitment(location: &str) -> CommitmentHash {
    digest_str(location)
}

/// The secret half of a commitment. Whoever holds it can reveal.
///
/// `Debug` never prints the salt.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Opening {
    pub metadata: IncidentMetadata,
    pub salt: Salt,
}

/// Hashes ready to commit, with the opening that reproduces them.
#[derive(Debug, Clone)]
pub struct PreparedCommit {
    pub evidence_hash: CommitmentHash,
    pub meta_hash: CommitmentHash,
    pub geo_hash: CommitmentHash,
    pub incident_type: IncidentType,
    pub opening: Opening,
}

impl PreparedCommit {
    /// Validate inputs and compute the commitments under a fresh salt.
    pub fn new(
        evidence: &[u8],
        metadata: IncidentMetadata,
        incident_type: IncidentType,
    ) -> Result<Self, RegistryError> {
        Self::with_salt(evidence, metadata, incident_type, Salt::generate())
    }

    /// As [`new`](Self::new) with a caller-chosen salt.
    pub fn with_salt(
        evidence: &[u8],
        metadata: IncidentMetadata,
        incident_type: IncidentType,
        salt: Salt,
    ) -> Result<Self, RegistryError> {
        if evidence.is_empty() {
            return Err(ValidationError::MissingField("evidence").into());
        }
        if metadata.location.trim().is_empty() {
            return Err(ValidationError::MissingField("location").into());
        }

        Ok(Self {
            evidence_hash: digest(evidence),
            meta_hash: meta_commitment(&metadata, &salt)?,
            geo_hash: geo_commitment(&metadata.location),
            incident_type,
            opening: Opening { metadata, salt },
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixed_salt() -> Salt {
        Salt::from_bytes([7u8; 32])
    }

    #[test]
    fn photo_bytes_scenario() {
        let p = PreparedCommit::new(
            b"photo-bytes",
            IncidentMetadata::at("-16.5,-68.15"),
            IncidentType::Speeding,
        )
        .unwrap();
        assert_eq!(
            p.evidence_hash.to_prefixed_hex(),
            "0xdac6f451810bc38390a3b6e278d686b332a77cf21b2ea95145ad73722b77035d"
        );
        assert_eq!(p.geo_hash, digest(b"-16.5,-68.15"));
        assert_eq!(p.incident_type.code(), 2);
    }

    #[test]
    fn meta_hash_is_salted() {
        let m = IncidentMetadata::at("-16.5,-68.15");
        let a = meta_commitment(&m, &fixed_salt()).unwrap();
        let b = meta_commitment(&m, &Salt::from_bytes([8u8; 32])).unwrap();
        assert_ne!(a, b);
        assert_eq!(a, meta_commitment(&m, &fixed_salt()).unwrap());
    }

    #[test]
    fn meta_hash_matches_manual_envelope() {
        let mut m = IncidentMetadata::at("-16.5,-68.15");
        m.plate = Some("ABC-123".into());
        let salt = fixed_salt();
        let manual = CanonicalBytes::new(&serde_json::json!({
            "salt": salt.to_prefixed_hex(),
            "metadata": {"location": "-16.5,-68.15", "plate": "ABC-123"}
        }))
        .unwrap();
        assert_eq!(meta_commitment(&m, &salt).unwrap(), digest_canonical(&manual));
    }

    #[test]
    fn rejects_empty_evidence_and_location() {
        let err = PreparedCommit::new(b"", IncidentMetadata::at("x"), IncidentType::Other)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Validation(ValidationError::MissingField("evidence"))
        ));
        let err = PreparedCommit::new(b"e", IncidentMetadata::at("  "), IncidentType::Other)
            .unwrap_err();
        assert!(matches!(
            err,
            RegistryError::Validation(ValidationError::MissingField("location"))
        ));
    }

    #[test]
    fn extra_key_cannot_shadow_named_field() {
        let mut m = IncidentMetadata::at("-16.5,-68.15");
        m.extra.insert("location".into(), "0,0".into());
        let err = PreparedCommit::with_salt(b"e", m, IncidentType::Other, fixed_salt())
            .unwrap_err();
        assert!(
            matches!(
                &err,
                RegistryError::Validation(ValidationError::ReservedField(k)) if k == "location"
            ),
            "{err:?}"
        );

        let mut m = IncidentMetadata::at("-16.5,-68.15");
        m.extra.insert("capturedAt".into(), "yesterday".into());
        assert!(meta_commitment(&m, &fixed_salt()).is_err());

        let mut m = IncidentMetadata::at("-16.5,-68.15");
        m.extra.insert("weather".into(), "rain".into());
        let p = PreparedCommit::with_salt(b"e", m.clone(), IncidentType::Other, fixed_salt())
            .unwrap();
        let json = serde_json::to_value(&m).unwrap();
        assert_eq!(json["weather"], "rain");
        assert_eq!(p.meta_hash, meta_commitment(&m, &fixed_salt()).unwrap());
    }

    #[test]
    fn category_from_label() {
        let mut m = IncidentMetadata::at("x");
        assert_eq!(m.category(), IncidentType::Other);
        m.incident_type = Some("Exceso de velocidad".into());
        assert_eq!(m.category(), IncidentType::Speeding);
    }

    #[test]
    fn opening_round_trips_through_json() {
        let p = PreparedCommit::with_salt(
            b"e",
            IncidentMetadata::at("here"),
            IncidentType::Collision,
            fixed_salt(),
        )
        .unwrap();
        let json = serde_json::to_string(&p.opening).unwrap();
        let back: Opening = serde_json::from_str(&json).unwrap();
        assert_eq!(
            meta_commitment(&back.metadata, &back.salt).unwrap(),
            p.meta_hash
        );
        assert!(!format!("{:?}", p.opening).contains(&fixed_salt().to_prefixed_hex()));
    }
}
