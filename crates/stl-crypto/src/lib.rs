//! # stl-crypto — Cryptographic Primitives
//!
//! - **SHA-256** commitments over raw evidence and canonical metadata, with
//!   constant-time comparison for reveal verification.
//! - **Salts**: 32 bytes from the OS CSPRNG, wiped on drop.
//! - **Ed25519** signing of contract calls. Signing input is always
//!   `CanonicalBytes`.
//! - **Content-addressed storage** for revealed evidence, with the digest
//!   re-checked on every fetch.
//!
//! ## Crate Policy
//!
//! - Depends only on `stl-core` internally.
//! - No mocking of cryptographic operations in tests.
//! - Secret material never appears in `Debug` output.

pub mod cas;
pub mod ed25519;
pub mod error;
pub mod salt;
pub mod sha256;

pub use cas::{ContentLocator, ContentStore, FsContentStore, MemoryContentStore};
pub use ed25519::{PublicKey, Signature, SigningIdentity};
pub use error::CryptoError;
pub use salt::Salt;
pub use sha256::{digest, digest_canonical, digest_str, hashes_match};
