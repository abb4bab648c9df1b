//! Ledger client error types.

use stl_core::{IncidentId, TxId};

use crate::config::ConfigError;

/// Errors from ledger reads and writes.
#[derive(Debug, thiserror::Error)]
pub enum LedgerError {
    /// HTTP transport error.
    #[error("HTTP error calling {endpoint}: {source}")]
    Http {
        endpoint: String,
        source: reqwest::Error,
    },

    /// The gateway returned a non-2xx status.
    #[error("ledger {endpoint} returned {status}: {body}")]
    Api {
        endpoint: String,
        status: u16,
        body: String,
    },

    /// Response body could not be decoded.
    #[error("failed to deserialize response from {endpoint}: {source}")]
    Deserialization {
        endpoint: String,
        source: reqwest::Error,
    },

    /// Response decoded but violates the record format (bad hash, unknown
    /// status code).
    #[error("malformed record from {endpoint}: {reason}")]
    Malformed { endpoint: String, reason: String },

    #[error("incident {0} not found")]
    NotFound(IncidentId),

    #[error("unknown transaction {0}")]
    UnknownTx(TxId),

    /// The ledger refused the call before accepting it (bad signature,
    /// replayed nonce).
    #[error("{function} rejected: {reason}")]
    Rejected { function: String, reason: String },

    /// Transaction still pending after the polling budget.
    #[error("transaction {0} not confirmed in time")]
    Timeout(TxId),

    #[error("signing failed: {0}")]
    Signing(String),

    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),
}

impl LedgerError {
    /// Whether the failure happened before the call reached the ledger or
    /// on the transport, as opposed to a ledger-side refusal.
    pub fn is_transport(&self) -> bool {
        matches!(self, Self::Http { .. } | Self::Timeout(_))
    }
}
