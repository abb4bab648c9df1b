//! # stl-state — Incident Lifecycle
//!
//! The ledger contract is the only party that moves an incident between
//! states. This crate models the same machine on the client side so that
//! requests which the ledger would refuse are caught before submission, and
//! so the in-memory reference ledger enforces identical rules.
//!
//! ```text
//! Pending ──reveal──▶ Revealed ──open-dispute──▶ Disputed ──resolve──▶ Resolved
//!    │                                              │
//!    └──deadline elapsed──▶ Stale ◀──resolve (stale)┘
//! ```
//!
//! `Resolved` and `Stale` are terminal. Expiry is lazy: nothing runs when a
//! deadline passes; readers compute the effective status with
//! [`Incident::effective_status`] or apply it with [`Incident::refresh`].

pub mod deadline;
pub mod incident;

pub use deadline::{format_remaining, RevealWindow};
pub use incident::{
    AuditorDecision, Commitments, Incident, IncidentError, IncidentSnapshot, IncidentStatus,
    IncidentTransitionRecord, RevealPayload,
};
