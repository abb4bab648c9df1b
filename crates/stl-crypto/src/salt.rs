//! # Reveal Salt
//!
//! The salt binds the metadata commitment to a secret so the committed
//! metadata cannot be guessed by hashing candidate plates or locations. It
//! is generated once per commit, kept by the reporter until the reveal, and
//! then disclosed on the ledger.

use rand::rngs::OsRng;
use rand::RngCore;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stl_core::hex;
use subtle::ConstantTimeEq;
use zeroize::{Zeroize, ZeroizeOnDrop};

use crate::error::CryptoError;

/// Salt length in bytes.
pub const SALT_LEN: usize = 32;

/// A 32-byte secret salt. Wiped from memory on drop.
#[derive(Clone, Zeroize, ZeroizeOnDrop)]
pub struct Salt([u8; SALT_LEN]);

impl Salt {
    /// Draw a fresh salt from the operating system CSPRNG.
    pub fn generate() -> Self {
        let mut bytes = [0u8; SALT_LEN];
        OsRng.fill_bytes(&mut bytes);
        Self(bytes)
    }

    pub fn from_bytes(bytes: [u8; SALT_LEN]) -> Self {
        Self(bytes)
    }

    /// Parse a disclosed salt, with or without the `0x` prefix.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let digits = hex::strip_prefix(s.trim());
        if digits.len() != SALT_LEN * 2 {
            return Err(CryptoError::InvalidSalt(format!(
                "expected {} hex digits, got {}",
                SALT_LEN * 2,
                digits.len()
            )));
        }
        let mut bytes = hex::decode(digits).map_err(|e| CryptoError::InvalidSalt(e.to_string()))?;
        let mut arr = [0u8; SALT_LEN];
        arr.copy_from_slice(&bytes);
        bytes.zeroize();
        Ok(Self(arr))
    }

    pub fn as_bytes(&self) -> &[u8; SALT_LEN] {
        &self.0
    }

    /// `0x`-prefixed lowercase hex. This is the form that goes into the
    /// metadata commitment and onto the ledger at reveal time.
    pub fn to_prefixed_hex(&self) -> String {
        format!("0x{}", hex::encode(&self.0))
    }
}

impl PartialEq for Salt {
    fn eq(&self, other: &Self) -> bool {
        bool::from(self.0.ct_eq(&other.0))
    }
}

impl Eq for Salt {}

impl std::fmt::Debug for Salt {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Salt(<redacted>)")
    }
}

impl Serialize for Salt {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_prefixed_hex())
    }
}

impl<'de> Deserialize<'de> for Salt {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generated_salts_differ() {
        assert_ne!(Salt::generate(), Salt::generate());
    }

    #[test]
    fn hex_round_trip() {
        let s = Salt::from_bytes([7u8; 32]);
        let rendered = s.to_prefixed_hex();
        assert_eq!(rendered.len(), 66);
        assert!(rendered.starts_with("0x0707"));
        assert_eq!(Salt::from_hex(&rendered).unwrap(), s);
        assert_eq!(Salt::from_hex(&rendered[2..]).unwrap(), s);
    }

    #[test]
    fn wrong_length_rejected() {
        assert!(matches!(
            Salt::from_hex("0xabcd"),
            Err(CryptoError::InvalidSalt(_))
        ));
    }

    #[test]
    fn debug_redacts() {
        let s = Salt::from_bytes([0xaa; 32]);
        let dbg = format!("{s:?}");
        assert!(!dbg.contains("aa"));
        assert_eq!(dbg, "Salt(<redacted>)");
    }

    #[test]
    fn serde_as_prefixed_hex() {
        let s = Salt::from_bytes([1u8; 32]);
        let json = serde_json::to_string(&s).unwrap();
        assert_eq!(json, format!("\"{}\"", s.to_prefixed_hex()));
        let back: Salt = serde_json::from_str(&json).unwrap();
        assert_eq!(back, s);
    }
}
