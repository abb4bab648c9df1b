//! # Ed25519 Call Signing
//!
//! Every ledger write is a contract call signed by the session's identity.
//! Signing input is `&CanonicalBytes`, so the bytes the ledger verifies are
//! the JCS form of the call envelope and never some ad-hoc encoding.
//!
//! Public keys and signatures serialize as lowercase hex strings. The
//! signing identity does not implement `Serialize`; exporting its seed is an
//! explicit call used only when writing a key file.

use ed25519_dalek::{Signer, Verifier};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use stl_core::{hex, CanonicalBytes};
use zeroize::Zeroize;

use crate::error::CryptoError;

/// An Ed25519 public key (32 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct PublicKey(pub [u8; 32]);

/// An Ed25519 signature (64 bytes).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct Signature(pub [u8; 64]);

/// A signing key held by the session provider.
pub struct SigningIdentity {
    signing_key: ed25519_dalek::SigningKey,
}

impl PublicKey {
    pub fn from_bytes(bytes: [u8; 32]) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a 64-character hex public key.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes = decode_fixed::<32>(s, "public key").map_err(CryptoError::KeyError)?;
        Ok(Self(bytes))
    }

    pub fn to_verifying_key(&self) -> Result<ed25519_dalek::VerifyingKey, CryptoError> {
        ed25519_dalek::VerifyingKey::from_bytes(&self.0)
            .map_err(|e| CryptoError::KeyError(format!("invalid public key: {e}")))
    }

    /// Verify `signature` over `data` with this key.
    pub fn verify(&self, data: &CanonicalBytes, signature: &Signature) -> Result<(), CryptoError> {
        let vk = self.to_verifying_key()?;
        let sig = ed25519_dalek::Signature::from_bytes(&signature.0);
        vk.verify(data.as_bytes(), &sig)
            .map_err(|e| CryptoError::VerificationFailed(e.to_string()))
    }
}

impl Serialize for PublicKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for PublicKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "PublicKey({}..)", hex::encode(&self.0[..4]))
    }
}

impl std::fmt::Display for PublicKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.to_hex())
    }
}

impl Signature {
    pub fn as_bytes(&self) -> &[u8; 64] {
        &self.0
    }

    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Parse a 128-character hex signature.
    pub fn from_hex(s: &str) -> Result<Self, CryptoError> {
        let bytes =
            decode_fixed::<64>(s, "signature").map_err(CryptoError::VerificationFailed)?;
        Ok(Self(bytes))
    }
}

impl Serialize for Signature {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_hex())
    }
}

impl<'de> Deserialize<'de> for Signature {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::from_hex(&s).map_err(serde::de::Error::custom)
    }
}

impl std::fmt::Debug for Signature {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Signature({}..)", hex::encode(&self.0[..4]))
    }
}

impl SigningIdentity {
    /// Generate a fresh key from the OS CSPRNG.
    pub fn generate() -> Self {
        let mut csprng = rand::rngs::OsRng;
        Self {
            signing_key: ed25519_dalek::SigningKey::generate(&mut csprng),
        }
    }

    pub fn from_seed(seed: &[u8; 32]) -> Self {
        Self {
            signing_key: ed25519_dalek::SigningKey::from_bytes(seed),
        }
    }

    /// Load from a 64-character hex seed, as stored in a key file.
    pub fn from_seed_hex(s: &str) -> Result<Self, CryptoError> {
        let mut seed = decode_fixed::<32>(s, "seed").map_err(CryptoError::KeyError)?;
        let identity = Self::from_seed(&seed);
        seed.zeroize();
        Ok(identity)
    }

    /// Export the seed as hex for writing a key file. Callers own the
    /// returned secret.
    pub fn export_seed_hex(&self) -> String {
        hex::encode(self.signing_key.as_bytes())
    }

    pub fn public_key(&self) -> PublicKey {
        PublicKey(self.signing_key.verifying_key().to_bytes())
    }

    /// Sign canonical bytes.
    pub fn sign(&self, data: &CanonicalBytes) -> Signature {
        Signature(self.signing_key.sign(data.as_bytes()).to_bytes())
    }
}

impl std::fmt::Debug for SigningIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "SigningIdentity(<private>, {:?})", self.public_key())
    }
}

fn decode_fixed<const N: usize>(s: &str, what: &str) -> Result<[u8; N], String> {
    let digits = hex::strip_prefix(s.trim());
    if digits.len() != N * 2 {
        return Err(format!(
            "{what} hex must be {} chars, got {}",
            N * 2,
            digits.len()
        ));
    }
    let bytes = hex::decode(digits).map_err(|e| e.to_string())?;
    let mut arr = [0u8; N];
    arr.copy_from_slice(&bytes);
    Ok(arr)
}
