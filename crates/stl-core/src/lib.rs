//! # stl-core — Foundational Types for SafeTraffic Ledger
//!
//! The leaf of the workspace DAG. Defines the primitives every other crate
//! builds on: canonical bytes for hashing, the 256-bit commitment hash,
//! incident identifiers, principals, roles, and UTC timestamps.
//!
//! ## Key Design Principles
//!
//! 1. **`CanonicalBytes` newtype.** Structured records (incident metadata,
//!    contract calls) are hashed or signed only after RFC 8785 (JCS)
//!    canonicalization. A commit and its reveal must produce identical bytes
//!    or verification breaks, so there is exactly one path to those bytes.
//!
//! 2. **`CommitmentHash` is validated at the boundary.** Hashes cross the
//!    ledger wire as `0x`-prefixed hex strings. Parsing rejects anything that
//!    is not exactly 32 bytes, so malformed commitments never reach a call.
//!
//! 3. **Newtypes for identifiers.** `IncidentId`, `Principal`, `TxId` cannot
//!    be confused with each other or with bare integers/strings.
//!
//! 4. **UTC-only timestamps** with seconds precision, read through a
//!    [`Clock`] so deadline logic can be tested without sleeping.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `stl-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod canonical;
pub mod clock;
pub mod digest;
pub mod domain;
pub mod error;
pub mod hex;
pub mod identity;
pub mod temporal;

pub use canonical::CanonicalBytes;
pub use clock::{Clock, ManualClock, SystemClock};
pub use digest::CommitmentHash;
pub use domain::{IncidentType, Role};
pub use error::{CanonicalizationError, ValidationError};
pub use identity::{IncidentId, Principal, TxId};
pub use temporal::Timestamp;
