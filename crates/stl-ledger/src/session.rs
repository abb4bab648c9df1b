//! # Session Capability
//!
//! Every write takes a [`Signer`]: the principal the ledger will attribute
//! the call to, the role the session claims, and the ability to sign. The
//! role claim lets the client refuse actions locally; the ledger still
//! checks its own allow-list.

use std::sync::atomic::{AtomicU64, Ordering};

use stl_core::{CanonicalBytes, Principal, Role};
use stl_crypto::{PublicKey, Signature, SigningIdentity};

/// Capability to submit writes on behalf of a principal.
pub trait Signer: Send + Sync {
    fn principal(&self) -> &Principal;

    /// Role the session claims.
    fn role(&self) -> Role;

    fn public_key(&self) -> PublicKey;

    fn sign(&self, message: &CanonicalBytes) -> Signature;

    /// Strictly increasing per session.
    fn next_nonce(&self) -> u64;
}

/// Principal derived from an Ed25519 public key: `stl1` + the key's hex.
pub fn principal_for(key: &PublicKey) -> Principal {
    Principal::prefixed("stl1", key.to_hex())
}

/// A signing session backed by a local Ed25519 key.
#[derive(Debug)]
pub struct Ed25519Session {
    identity: SigningIdentity,
    principal: Principal,
    role: Role,
    nonce: AtomicU64,
}

impl Ed25519Session {
    pub fn new(identity: SigningIdentity, role: Role) -> Self {
        let principal = principal_for(&identity.public_key());
        // Seeding from wall-clock milliseconds keeps nonces increasing
        // across restarts of the same key.
        let seed = u64::try_from(chrono::Utc::now().timestamp_millis()).unwrap_or(0);
        Self {
            identity,
            principal,
            role,
            nonce: AtomicU64::new(seed),
        }
    }
}

impl Signer for Ed25519Session {
    fn principal(&self) -> &Principal {
        &self.principal
    }

    fn role(&self) -> Role {
        self.role
    }

    fn public_key(&self) -> PublicKey {
        self.identity.public_key()
    }

    fn sign(&self, message: &CanonicalBytes) -> Signature {
        self.identity.sign(message)
    }

    fn next_nonce(&self) -> u64 {
        self.nonce.fetch_add(1, Ordering::SeqCst) + 1
    }
}
