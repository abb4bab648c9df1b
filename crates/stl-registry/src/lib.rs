//! # stl-registry — Commit-Reveal Workflow
//!
//! The client side of the incident registry. The ledger owns every
//! incident; this crate prepares what gets sent, checks disclosures before
//! they are sent, and mirrors what the ledger confirms.
//!
//! ## Modules
//!
//! - **commit**: evidence, metadata and geo commitments, and the secret
//!   opening that reproduces them.
//! - **reveal**: stateless verification of a disclosure against stored
//!   commitments.
//! - **cache**: the last-known mirror with ledger/optimistic provenance.
//! - **events**: observer subscriptions, notified after confirmation.
//! - **feed**: newest-first listing with lazy expiry.
//! - **settings**: reveal window, content root and polling, from YAML and
//!   the environment.
//! - **registry** / **dispute**: the [`Registry`] facade tying these to a
//!   ledger and a content store.
//!
//! ## Crate Policy
//!
//! - Every write takes an explicit [`Signer`](stl_ledger::Signer); there is
//!   no ambient session.
//! - Nothing is sent when a local check fails, and writes are never retried.
//! - Locks are never held across an `.await`.

pub mod cache;
pub mod commit;
pub mod dispute;
pub mod error;
pub mod events;
pub mod feed;
pub mod registry;
pub mod reveal;
pub mod settings;

pub use cache::{IncidentCache, LastKnown, Origin};
pub use commit::{geo_commitment, meta_commitment, IncidentMetadata, Opening, PreparedCommit};
pub use error::RegistryError;
pub use events::{IncidentEvent, IncidentObserver, SubscriptionId, Subscriptions};
pub use feed::{FeedItem, FeedQuery};
pub use registry::{CommitReceipt, IncidentView, Registry, TxReceipt};
pub use reveal::{DisclosedEvidence, Disclosure, Mismatch, RevealVerifier, VerifiedReveal};
pub use settings::{RegistrySettings, SettingsError};
