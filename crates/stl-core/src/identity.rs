//! # Identifier Newtypes
//!
//! `IncidentId` is assigned by the ledger; `Principal` is whatever opaque
//! address the session provider reports for the signer; `TxId` names a
//! submitted transaction. Distinct types so one cannot stand in for another.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Ledger-assigned incident identifier. Ids start at 1 and increase
/// monotonically with each commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IncidentId(pub u64);

impl IncidentId {
    /// The first id the ledger assigns.
    pub const FIRST: IncidentId = IncidentId(1);

    /// The numeric value.
    pub fn value(&self) -> u64 {
        self.0
    }

    /// The id following this one.
    pub fn next(&self) -> IncidentId {
        IncidentId(self.0.saturating_add(1))
    }
}

/// Rendered zero-padded to four digits (`0007`), as incident lists show it.
impl std::fmt::Display for IncidentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:04}", self.0)
    }
}

impl FromStr for IncidentId {
    type Err = ValidationError;

    /// Accepts `7`, `0007`, and `INC-0007`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let digits = trimmed.strip_prefix("INC-").unwrap_or(trimmed);
        match digits.parse::<u64>() {
            Ok(n) if n > 0 => Ok(IncidentId(n)),
            _ => Err(ValidationError::InvalidIncidentId(s.to_string())),
        }
    }
}

/// Opaque identity of a signer, as reported by the session provider.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Principal(String);

impl Principal {
    /// Wrap a principal string. Empty principals are rejected.
    pub fn new(s: impl Into<String>) -> Result<Self, ValidationError> {
        let s = s.into();
        if s.trim().is_empty() {
            return Err(ValidationError::MissingField("principal"));
        }
        Ok(Self(s))
    }

    /// `{prefix}{body}`, e.g. an address derived from a public key. The
    /// prefix is a non-empty literal, so the result is never blank.
    pub fn prefixed(prefix: &'static str, body: impl std::fmt::Display) -> Self {
        Self(format!("{prefix}{body}"))
    }

    /// Borrow the principal string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Principal {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier of a submitted ledger transaction.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TxId(pub String);

impl TxId {
    /// Borrow the transaction id string.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for TxId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn incident_id_display_is_padded() {
        assert_eq!(IncidentId(7).to_string(), "0007");
        assert_eq!(IncidentId(12345).to_string(), "12345");
    }

    #[test]
    fn incident_id_parses_common_forms() {
        assert_eq!("7".parse::<IncidentId>().unwrap(), IncidentId(7));
        assert_eq!("0007".parse::<IncidentId>().unwrap(), IncidentId(7));
        assert_eq!("INC-0042".parse::<IncidentId>().unwrap(), IncidentId(42));
    }

    #[test]
    fn incident_id_rejects_zero_and_garbage() {
        assert!("0".parse::<IncidentId>().is_err());
        assert!("abc".parse::<IncidentId>().is_err());
        assert!("-3".parse::<IncidentId>().is_err());
    }

    #[test]
    fn incident_id_next() {
        assert_eq!(IncidentId::FIRST.next(), IncidentId(2));
    }

    #[test]
    fn principal_rejects_blank() {
        assert!(Principal::new("  ").is_err());
        assert_eq!(Principal::new("ST2467").unwrap().as_str(), "ST2467");
        assert_eq!(Principal::prefixed("stl1", "ab").as_str(), "stl1ab");
    }

    #[test]
    fn incident_id_serializes_as_number() {
        assert_eq!(serde_json::to_string(&IncidentId(3)).unwrap(), "3");
    }
}
