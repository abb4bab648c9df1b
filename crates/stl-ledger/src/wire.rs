//! Incident record as the gateway returns it.
//!
//! ```json
//! {
//!   "id": 7, "proposer": "stl1..", "status": 1,
//!   "evidenceHash": "0x..", "metaHash": "0x..", "geoHash": "0x..",
//!   "incidentType": 2, "commitHeight": 1042, "committedAt": 1767225600,
//!   "reveal": { "locator": "sha256:..", "metaHash": "0x..", "salt": "0x.." },
//!   "disputeReason": null
//! }
//! ```
//!
//! Hashes are validated during deserialization; the status code and commit
//! time in [`TryFrom`].

use serde::{Deserialize, Serialize};
use stl_core::{CommitmentHash, IncidentId, IncidentType, Principal, Timestamp, ValidationError};
use stl_crypto::{ContentLocator, Salt};
use stl_state::{Commitments, Incident, IncidentSnapshot, IncidentStatus, RevealPayload};

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RevealRecord {
    pub locator: ContentLocator,
    pub meta_hash: CommitmentHash,
    pub salt: Salt,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IncidentRecord {
    pub id: IncidentId,
    pub proposer: Principal,
    pub status: u8,
    pub evidence_hash: CommitmentHash,
    pub meta_hash: CommitmentHash,
    pub geo_hash: CommitmentHash,
    pub incident_type: u8,
    pub commit_height: u64,
    /// Unix seconds.
    pub committed_at: i64,
    #[serde(default)]
    pub reveal: Option<RevealRecord>,
    #[serde(default)]
    pub dispute_reason: Option<CommitmentHash>,
}

impl TryFrom<IncidentRecord> for Incident {
    type Error = ValidationError;

    fn try_from(r: IncidentRecord) -> Result<Self, Self::Error> {
        Ok(Incident::from_snapshot(IncidentSnapshot {
            id: r.id,
            proposer: r.proposer,
            status: IncidentStatus::from_code(r.status)?,
            commitments: Commitments {
                evidence_hash: r.evidence_hash,
                meta_hash: r.meta_hash,
                geo_hash: r.geo_hash,
                incident_type: IncidentType::from_code(r.incident_type),
            },
            commit_height: r.commit_height,
            committed_at: Timestamp::from_epoch_secs(r.committed_at)?,
            reveal: r.reveal.map(|rv| RevealPayload {
                locator: rv.locator,
                meta_hash: rv.meta_hash,
                salt: rv.salt,
            }),
            dispute_reason: r.dispute_reason,
        }))
    }
}

impl From<&Incident> for IncidentRecord {
    fn from(i: &Incident) -> Self {
        let c = i.commitments();
        Self {
            id: i.id(),
            proposer: i.proposer().clone(),
            status: i.status().code(),
            evidence_hash: c.evidence_hash,
            meta_hash: c.meta_hash,
            geo_hash: c.geo_hash,
            incident_type: c.incident_type.code(),
            commit_height: i.commit_height(),
            committed_at: i.committed_at().epoch_secs(),
            reveal: i.reveal_payload().map(|p| RevealRecord {
                locator: p.locator.clone(),
                meta_hash: p.meta_hash,
                salt: p.salt.clone(),
            }),
            dispute_reason: i.dispute_reason().copied(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "id": 7,
            "proposer": "stl1abc",
            "status": 0,
            "evidenceHash": "0xdac6f451810bc38390a3b6e278d686b332a77cf21b2ea95145ad73722b77035d",
            "metaHash": "0x44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a",
            "geoHash": "0x16c22b1755355bf17f7693296886a5c9c9c7532f133e38d855ecdce5e0b4a08d",
            "incidentType": 2,
            "commitHeight": 1042,
            "committedAt": 1767225600
        })
    }

    #[test]
    fn decodes_pending_record() {
        let rec: IncidentRecord = serde_json::from_value(sample()).unwrap();
        let inc = Incident::try_from(rec).unwrap();
        assert_eq!(inc.id(), IncidentId(7));
        assert_eq!(inc.status(), IncidentStatus::Pending);
        assert_eq!(inc.commitments().incident_type, IncidentType::Speeding);
        assert!(inc.reveal_payload().is_none());
        assert_eq!(inc.committed_at().epoch_secs(), 1767225600);
    }

    #[test]
    fn unknown_status_code_rejected() {
        let mut v = sample();
        v["status"] = serde_json::json!(9);
        let rec: IncidentRecord = serde_json::from_value(v).unwrap();
        assert_eq!(
            Incident::try_from(rec).unwrap_err(),
            ValidationError::UnknownStatusCode(9)
        );
    }

    #[test]
    fn malformed_hash_fails_decoding() {
        let mut v = sample();
        v["geoHash"] = serde_json::json!("0x1234");
        assert!(serde_json::from_value::<IncidentRecord>(v).is_err());
    }

    #[test]
    fn record_round_trips_through_incident() {
        let mut v = sample();
        v["status"] = serde_json::json!(2);
        v["reveal"] = serde_json::json!({
            "locator": "sha256:dac6f451810bc38390a3b6e278d686b332a77cf21b2ea95145ad73722b77035d",
            "metaHash": "0x44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a",
            "salt": format!("0x{}", "ab".repeat(32)),
        });
        v["disputeReason"] = serde_json::json!(
            "0xe3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
        let rec: IncidentRecord = serde_json::from_value(v.clone()).unwrap();
        let inc = Incident::try_from(rec).unwrap();
        assert_eq!(inc.status(), IncidentStatus::Disputed);
        let back = serde_json::to_value(IncidentRecord::from(&inc)).unwrap();
        assert_eq!(back, v);
    }
}
