//! # SHA-256 Commitments
//!
//! Evidence is hashed as raw bytes; the geo commitment over the location
//! string's UTF-8 bytes; metadata only after canonicalization, via
//! [`digest_canonical`]. All three produce a [`CommitmentHash`].

use sha2::{Digest, Sha256};
use stl_core::{CanonicalBytes, CommitmentHash};
use subtle::ConstantTimeEq;

/// SHA-256 of raw bytes.
pub fn digest(bytes: &[u8]) -> CommitmentHash {
    let out: [u8; 32] = Sha256::digest(bytes).into();
    CommitmentHash::from_bytes(out)
}

/// SHA-256 of a string's UTF-8 bytes.
pub fn digest_str(s: &str) -> CommitmentHash {
    digest(s.as_bytes())
}

/// SHA-256 of a canonicalized record.
pub fn digest_canonical(data: &CanonicalBytes) -> CommitmentHash {
    digest(data.as_bytes())
}

/// Constant-time equality of two commitment hashes.
pub fn hashes_match(a: &CommitmentHash, b: &CommitmentHash) -> bool {
    bool::from(a.as_bytes().ct_eq(b.as_bytes()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evidence_vector() {
        assert_eq!(
            digest(b"photo-bytes").to_prefixed_hex(),
            "0xdac6f451810bc38390a3b6e278d686b332a77cf21b2ea95145ad73722b77035d"
        );
    }

    #[test]
    fn location_vector() {
        assert_eq!(
            digest_str("-16.5,-68.15").to_prefixed_hex(),
            "0x16c22b1755355bf17f7693296886a5c9c9c7532f133e38d855ecdce5e0b4a08d"
        );
    }

    #[test]
    fn empty_input_vector() {
        assert_eq!(
            digest(b"").to_hex(),
            "e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn canonical_digest_matches_raw_digest_of_same_bytes() {
        let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
        assert_eq!(digest_canonical(&cb), digest(b"{}"));
    }

    #[test]
    fn match_is_exact() {
        let a = digest(b"a");
        assert!(hashes_match(&a, &digest(b"a")));
        assert!(!hashes_match(&a, &digest(b"b")));
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn digest_is_deterministic(data in prop::collection::vec(any::<u8>(), 0..256)) {
            prop_assert_eq!(digest(&data), digest(&data));
        }

        #[test]
        fn single_bit_flip_changes_digest(
            data in prop::collection::vec(any::<u8>(), 1..256),
            idx in any::<prop::sample::Index>(),
            bit in 0u8..8,
        ) {
            let mut flipped = data.clone();
            let i = idx.index(flipped.len());
            flipped[i] ^= 1 << bit;
            prop_assert!(!hashes_match(&digest(&data), &digest(&flipped)));
        }
    }
}
