//! Errors from signing, salts, and the content store.

use stl_core::ValidationError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CryptoError {
    /// Key material could not be parsed or is invalid.
    #[error("key error: {0}")]
    KeyError(String),

    /// A signature did not verify.
    #[error("signature verification failed: {0}")]
    VerificationFailed(String),

    /// A salt is not 32 bytes of hex.
    #[error("invalid salt: {0}")]
    InvalidSalt(String),

    /// No content stored under the locator.
    #[error("content not found: {0}")]
    ContentNotFound(String),

    /// Stored bytes do not hash to the digest the locator names.
    #[error("integrity violation at {locator}: content hashes to {actual}")]
    IntegrityViolation { locator: String, actual: String },

    /// The store cannot resolve this kind of locator.
    #[error("unsupported locator {0:?}")]
    UnsupportedLocator(String),

    #[error("content store I/O: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Validation(#[from] ValidationError),
}
