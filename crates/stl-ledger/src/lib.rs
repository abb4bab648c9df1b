//! # stl-ledger — Ledger Interface
//!
//! The external ledger contract owns every incident and is the only party
//! that changes its status. This crate is the client's single path to it.
//!
//! ## Architecture
//!
//! - [`LedgerReader`] / [`LedgerWriter`] are the seam. Writes take an
//!   explicit [`Signer`] capability; nothing reads an ambient wallet.
//! - [`HttpLedgerClient`] speaks to a ledger gateway over HTTP. Reads retry
//!   transport failures with exponential backoff; writes are sent once.
//! - [`InMemoryLedger`] is a reference implementation of the contract rules
//!   (sequential ids, first valid reveal wins, role allow-list) for tests
//!   and local demos.
//!
//! ## Gateway Paths
//!
//! | Method | Path | Operation |
//! |--------|------|-----------|
//! | GET    | `/v1/contracts/{contract}/incidents/{id}` | Read one incident |
//! | GET    | `/v1/contracts/{contract}/incidents/count` | Highest assigned id |
//! | GET    | `/v1/tx/{txId}` | Transaction status |
//! | POST   | `/v1/contracts/{contract}/calls` | Submit a signed call |

pub mod call;
pub mod config;
pub mod error;
pub mod http;
pub mod memory;
pub(crate) mod retry;
pub mod session;
pub mod traits;
pub mod wire;

pub use call::{ContractCall, SignedCall, TxHandle, TxStatus};
pub use config::{ConfigError, LedgerConfig};
pub use error::LedgerError;
pub use http::HttpLedgerClient;
pub use memory::InMemoryLedger;
pub use session::{principal_for, Ed25519Session, Signer};
pub use traits::{LedgerReader, LedgerWriter, PollPolicy};
pub use wire::IncidentRecord;
