//! # Error Types
//!
//! Errors raised by the foundational types. Both are local: they are
//! detected before any ledger call and never indicate a remote failure.

use thiserror::Error;

/// Error during canonical serialization.
#[derive(Error, Debug)]
pub enum CanonicalizationError {
    /// Float values are not permitted in canonical representations.
    #[error("float values are not permitted in canonical representations; carry {0} as a string")]
    FloatRejected(f64),

    /// JSON serialization failed.
    #[error("serialization failed: {0}")]
    SerializationFailed(#[from] serde_json::Error),
}

/// Local validation failure on an input value.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// A commitment hash is not `0x` followed by 64 hex digits.
    #[error("malformed hash {value:?}: {reason}")]
    MalformedHash {
        /// The offending input (truncated for display).
        value: String,
        /// What was wrong with it.
        reason: String,
    },

    /// A hex string could not be decoded.
    #[error("malformed hex: {0}")]
    MalformedHex(String),

    /// A required field is empty or missing.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// An incident status code outside the contract's enumeration.
    #[error("unknown incident status code {0}")]
    UnknownStatusCode(u8),

    /// A status name outside the incident lifecycle.
    #[error("unknown incident status {0:?}")]
    UnknownStatus(String),

    /// A role name that is not part of the role hierarchy.
    #[error("unknown role {0:?}")]
    UnknownRole(String),

    /// An incident identifier that is not a positive integer.
    #[error("invalid incident id {0:?}")]
    InvalidIncidentId(String),

    /// Reveal window outside the accepted range.
    #[error("reveal window must be between 1 and 8760 hours, got {0}")]
    InvalidRevealWindow(u32),

    /// A free-form metadata key that would shadow a named field.
    #[error("metadata key {0:?} is reserved")]
    ReservedField(String),

    /// Timestamp not parseable or not UTC.
    #[error("invalid timestamp: {0}")]
    InvalidTimestamp(String),
}
