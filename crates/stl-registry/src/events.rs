//! # Incident Observers
//!
//! An explicit subscription registry. Observers are notified only after the
//! ledger confirms a transaction and the mirror has been refetched, except
//! for [`IncidentEvent::Expired`], which fires the first time a reader
//! applies the lazy deadline transition.

use std::sync::Arc;

use parking_lot::RwLock;
use stl_core::{IncidentId, TxId};
use stl_state::IncidentStatus;
use uuid::Uuid;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IncidentEvent {
    Committed { id: IncidentId, tx: TxId },
    Revealed { id: IncidentId, tx: TxId },
    DisputeOpened { id: IncidentId, tx: TxId },
    DisputeResolved {
        id: IncidentId,
        tx: TxId,
        status: IncidentStatus,
    },
    Expired { id: IncidentId },
}

impl IncidentEvent {
    pub fn incident(&self) -> IncidentId {
        match self {
            Self::Committed { id, .. }
            | Self::Revealed { id, .. }
            | Self::DisputeOpened { id, .. }
            | Self::DisputeResolved { id, .. }
            | Self::Expired { id } => *id,
        }
    }
}

pub trait IncidentObserver: Send + Sync {
    fn on_incident_changed(&self, event: &IncidentEvent);
}

impl<F> IncidentObserver for F
where
    F: Fn(&IncidentEvent) + Send + Sync,
{
    fn on_incident_changed(&self, event: &IncidentEvent) {
        self(event)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(Uuid);

impl std::fmt::Display for SubscriptionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

#[derive(Default)]
pub struct Subscriptions {
    observers: RwLock<Vec<(SubscriptionId, Arc<dyn IncidentObserver>)>>,
}

impl std::fmt::Debug for Subscriptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriptions")
            .field("count", &self.observers.read().len())
            .finish()
    }
}

impl Subscriptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn IncidentObserver>) -> SubscriptionId {
        let id = SubscriptionId(Uuid::new_v4());
        self.observers.write().push((id, observer));
        id
    }

    /// Returns whether the subscription existed.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Deliver to every current observer. The lock is released before any
    /// observer runs, so observers may subscribe or unsubscribe.
    pub fn publish(&self, event: &IncidentEvent) {
        let targets: Vec<Arc<dyn IncidentObserver>> = self
            .observers
            .read()
            .iter()
            .map(|(_, o)| Arc::clone(o))
            .collect();
        tracing::debug!(incident = %event.incident(), observers = targets.len(), ?event, "publishing");
        for observer in targets {
            observer.on_incident_changed(event);
        }
    }
}
