//! # Canonical Serialization
//!
//! `CanonicalBytes` is the only way to turn a structured record into bytes
//! for hashing or signing.
//!
//! ## Canonical Form
//!
//! RFC 8785 JSON Canonicalization Scheme, produced by `serde_jcs`:
//!
//! - object keys sorted by UTF-16 code units,
//! - no insignificant whitespace,
//! - strings emitted as UTF-8 with minimal escaping,
//! - floats **rejected** before serialization. Coordinates, amounts and
//!   similar values must be carried as strings so the byte sequence never
//!   depends on a float formatter.
//!
//! The metadata commitment of an incident is `sha256(JCS({"metadata": ..,
//! "salt": ..}))`. If the reporter and the verifier disagree on any byte of
//! this form, a legitimate reveal fails, hence the private constructor.

use serde::Serialize;
use serde_json::Value;

use crate::error::CanonicalizationError;

/// Bytes produced exclusively by JCS canonicalization.
///
/// # Invariants
///
/// - The only constructor is [`CanonicalBytes::new()`].
/// - The content is valid UTF-8 JSON with sorted keys and no floats.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CanonicalBytes(Vec<u8>);

impl CanonicalBytes {
    /// Canonicalize any serializable value.
    ///
    /// # Errors
    ///
    /// `FloatRejected` if the value contains a non-integer number,
    /// `SerializationFailed` if the value cannot be represented as JSON.
    pub fn new(obj: &impl Serialize) -> Result<Self, CanonicalizationError> {
        let value = serde_json::to_value(obj)?;
        reject_floats(&value)?;
        let s = serde_jcs::to_string(&value)?;
        Ok(Self(s.into_bytes()))
    }

    /// Access the canonical bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    /// Length of the canonical byte sequence.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the canonical byte sequence is empty. Never true for a
    /// successfully canonicalized value, since `null` is four bytes.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// View the canonical form as a string slice.
    pub fn as_str(&self) -> &str {
        // JCS output is always produced from a `String`.
        std::str::from_utf8(&self.0).unwrap_or_default()
    }
}

impl AsRef<[u8]> for CanonicalBytes {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

fn reject_floats(value: &Value) -> Result<(), CanonicalizationError> {
    match value {
        Value::Null | Value::Bool(_) | Value::String(_) => Ok(()),
        Value::Number(n) => {
            if n.is_f64() {
                if let Some(f) = n.as_f64() {
                    return Err(CanonicalizationError::FloatRejected(f));
                }
            }
            Ok(())
        }
        Value::Array(items) => items.iter().try_for_each(reject_floats),
        Value::Object(map) => map.values().try_for_each(reject_floats),
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn canonicalization_is_deterministic(
            fields in prop::collection::btree_map("[a-z]{1,8}", "[ -~]{0,24}", 0..8)
        ) {
            let a = CanonicalBytes::new(&fields).unwrap();
            let b = CanonicalBytes::new(&fields).unwrap();
            prop_assert_eq!(a.as_bytes(), b.as_bytes());
        }

        #[test]
        fn canonical_output_is_valid_json(
            fields in prop::collection::btree_map("[a-z]{1,8}", any::<i64>(), 0..8)
        ) {
            let cb = CanonicalBytes::new(&fields).unwrap();
            let parsed: Result<Value, _> = serde_json::from_slice(cb.as_bytes());
            prop_assert!(parsed.is_ok());
        }
    }
}
