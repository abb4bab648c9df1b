//! # Canonical Digest Vectors
//!
//! Fixed inputs whose canonical form and SHA-256 digest were computed
//! independently (`printf '%s' ... | sha256sum`). A reporter and a verifier
//! running different builds must agree on these bytes or reveals break.

use sha2::{Digest, Sha256};
use stl_core::{hex, CanonicalBytes, CommitmentHash};

fn digest_of(bytes: &[u8]) -> CommitmentHash {
    let out: [u8; 32] = Sha256::digest(bytes).into();
    CommitmentHash::from_bytes(out)
}

#[test]
fn metadata_envelope_vector() {
    let envelope = serde_json::json!({
        "salt": "0x01",
        "metadata": { "plate": "ABC-123", "location": "-16.5,-68.15" }
    });
    let cb = CanonicalBytes::new(&envelope).unwrap();
    assert_eq!(
        cb.as_str(),
        r#"{"metadata":{"location":"-16.5,-68.15","plate":"ABC-123"},"salt":"0x01"}"#
    );
    assert_eq!(
        digest_of(cb.as_bytes()).to_prefixed_hex(),
        "0xe72699ad7db957aace9c54f68a3b1cd008db0f663157104443e2711b7a2317fc"
    );
}

#[test]
fn small_object_vector() {
    let cb = CanonicalBytes::new(&serde_json::json!({"b": "two", "a": 1})).unwrap();
    assert_eq!(
        hex::encode(digest_of(cb.as_bytes()).as_bytes()),
        "f15bfc93d70801047473922f67fed863ecc7f82f0677ebb7122923aee81e0f97"
    );
}

#[test]
fn empty_object_vector() {
    let cb = CanonicalBytes::new(&serde_json::json!({})).unwrap();
    assert_eq!(cb.as_str(), "{}");
    assert_eq!(
        digest_of(cb.as_bytes()).to_hex(),
        "44136fa355b3678a1146ad16f7e8649e94fb4fc21fe77e8310c060f61caaff8a"
    );
}

#[test]
fn rendered_hash_parses_back() {
    let h = digest_of(b"abc");
    assert_eq!(
        h.to_string(),
        "0xba7816bf8f01cfea414140de5dae2223b00361a396177a9cb410ff61f20015ad"
    );
    assert_eq!(CommitmentHash::parse(&h.to_string()).unwrap(), h);
}
