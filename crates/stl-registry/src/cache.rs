//! # Incident Mirror
//!
//! The client's last-known copy of ledger state, for display only. Every
//! entry records when it was taken and whether it came from a ledger read
//! or was mirrored locally after a write that has not confirmed yet.
//!
//! Invalidation rules:
//!
//! - [`refetch`](crate::Registry::refetch) drops the entry before reading,
//!   so a failed read never leaves the stale copy behind.
//! - [`invalidate`](IncidentCache::invalidate) and
//!   [`clear`](IncidentCache::clear) drop without reading.
//! - An optimistic mirror never replaces an entry whose status is terminal.

use std::collections::HashMap;

use parking_lot::RwLock;
use stl_core::{IncidentId, Timestamp};
use stl_state::Incident;

/// Where a cached entry came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Ledger,
    Optimistic,
}

impl std::fmt::Display for Origin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Ledger => "ledger",
            Self::Optimistic => "optimistic",
        })
    }
}

/// A mirrored incident with its provenance.
#[derive(Debug, Clone, PartialEq)]
pub struct LastKnown {
    pub incident: Incident,
    pub fetched_at: Timestamp,
    pub origin: Origin,
}

impl LastKnown {
    pub fn is_optimistic(&self) -> bool {
        self.origin == Origin::Optimistic
    }
}

#[derive(Debug, Default)]
pub struct IncidentCache {
    entries: RwLock<HashMap<IncidentId, LastKnown>>,
}

impl IncidentCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: IncidentId) -> Option<LastKnown> {
        self.entries.read().get(&id).cloned()
    }

    /// Store a ledger read, replacing whatever was there.
    pub fn put_fetched(&self, incident: Incident, at: Timestamp) -> LastKnown {
        let entry = LastKnown {
            incident,
            fetched_at: at,
            origin: Origin::Ledger,
        };
        self.entries.write().insert(entry.incident.id(), entry.clone());
        entry
    }

    /// Mirror a locally predicted state. Refused (returns `false`) when the
    /// current entry is terminal.
    pub fn mirror(&self, incident: Incident, at: Timestamp) -> bool {
        let mut entries = self.entries.write();
        if let Some(existing) = entries.get(&incident.id()) {
            if existing.incident.is_terminal() {
                return false;
            }
        }
        entries.insert(
            incident.id(),
            LastKnown {
                incident,
                fetched_at: at,
                origin: Origin::Optimistic,
            },
        );
        true
    }

    pub fn invalidate(&self, id: IncidentId) -> bool {
        self.entries.write().remove(&id).is_some()
    }

    pub fn clear(&self) {
        self.entries.write().clear();
    }

    pub fn len(&self) -> usize {
        self.entries.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.read().is_empty()
    }
}
