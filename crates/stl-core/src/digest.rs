//! # Commitment Hash
//!
//! A 256-bit digest as published to the ledger. On the wire and in
//! displays it is always `0x` followed by 64 lowercase hex characters, the
//! encoding the contract's `(buff 32)` arguments expect.
//!
//! Computing hashes lives in `stl-crypto`; this type only carries and
//! validates them.

use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ValidationError;
use crate::hex;

/// A 32-byte commitment digest (SHA-256).
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CommitmentHash([u8; 32]);

impl CommitmentHash {
    /// Encoding prefix marking a hex-encoded buffer.
    pub const PREFIX: &'static str = "0x";

    /// Length of the rendered form: prefix plus 64 hex characters.
    pub const RENDERED_LEN: usize = 66;

    /// Wrap raw digest bytes.
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    /// Raw digest bytes.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Lowercase hex without prefix.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// `0x`-prefixed lowercase hex, the ledger wire form.
    pub fn to_prefixed_hex(&self) -> String {
        format!("{}{}", Self::PREFIX, self.to_hex())
    }

    /// Parse a `0x`-prefixed 64-digit hex string.
    ///
    /// The prefix is mandatory: an unprefixed string is more likely a
    /// locator or a raw value pasted into the wrong field than a hash.
    pub fn parse(s: &str) -> Result<Self, ValidationError> {
        let trimmed = s.trim();
        let malformed = |reason: &str| ValidationError::MalformedHash {
            value: trimmed.chars().take(80).collect(),
            reason: reason.to_string(),
        };

        if !(trimmed.starts_with("0x") || trimmed.starts_with("0X")) {
            return Err(malformed("missing 0x prefix"));
        }
        let digits = hex::strip_prefix(trimmed);
        if digits.len() != 64 {
            return Err(malformed(&format!(
                "expected 64 hex digits, got {}",
                digits.len()
            )));
        }
        let bytes = hex::decode(digits).map_err(|e| malformed(&e.to_string()))?;
        let mut arr = [0u8; 32];
        arr.copy_from_slice(&bytes);
        Ok(Self(arr))
    }
}

impl FromStr for CommitmentHash {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for CommitmentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_prefixed_hex())
    }
}

impl std::fmt::Debug for CommitmentHash {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "CommitmentHash(0x{}..)", hex::encode(&self.0[..4]))
    }
}

impl Serialize for CommitmentHash {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_prefixed_hex())
    }
}

impl<'de> Deserialize<'de> for CommitmentHash {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}
