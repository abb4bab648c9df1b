//! Lowercase hex encoding and decoding.

use crate::error::ValidationError;

/// Encode bytes as lowercase hex without prefix.
pub fn encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{b:02x}")).collect()
}

/// Decode a hex string (no prefix, either case).
pub fn decode(hex: &str) -> Result<Vec<u8>, ValidationError> {
    if hex.len() % 2 != 0 {
        return Err(ValidationError::MalformedHex(
            "hex string must have even length".to_string(),
        ));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            hex.get(i..i + 2)
                .and_then(|pair| u8::from_str_radix(pair, 16).ok())
                .ok_or_else(|| {
                    ValidationError::MalformedHex(format!("invalid hex digit at position {i}"))
                })
        })
        .collect()
}

/// Strip an optional `0x` / `0X` prefix.
pub fn strip_prefix(s: &str) -> &str {
    s.strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .unwrap_or(s)
}
