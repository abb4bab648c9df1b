//! # stl-arbitration — Disputes
//!
//! - **Dispute** (`dispute.rs`): the reason commitment a verifier publishes
//!   when challenging a revealed incident, and the decision an auditor
//!   publishes when closing the challenge.
//!
//! - **Policy** (`policy.rs`): which roles may open and resolve disputes.
//!   The ledger enforces its own allow-list; this check runs first so that
//!   an unauthorized caller fails locally without spending a transaction.
//!
//! ## Crate Policy
//!
//! - Depends on `stl-core`, `stl-crypto` and `stl-state` internally.
//! - Reason texts are hashed through `CanonicalBytes`; only the hash goes
//!   on the ledger.

pub mod dispute;
pub mod error;
pub mod policy;

pub use dispute::{DisputeReason, DisputeRequest, ResolutionRequest};
pub use error::ArbitrationError;
pub use policy::{DisputeAction, DisputePolicy};
