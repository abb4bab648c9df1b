//! # Registry Facade
//!
//! Drives the commit-reveal workflow against a ledger: local validation
//! and verification first, then one signed write, then polling until the
//! ledger settles the transaction. The mirror is refetched after every
//! confirmed write and observers are notified only after that refetch.
//!
//! Reads go through the mirror ([`Registry::incident`]) or bypass it
//! ([`Registry::refetch`]). Status shown to users is always the effective
//! status: a pending incident past its deadline reads as stale even though
//! the ledger has not recorded it yet.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use stl_arbitration::DisputePolicy;
use stl_core::{Clock, IncidentId, IncidentType, SystemClock, Timestamp, TxId};
use stl_crypto::ContentStore;
use stl_ledger::{LedgerError, LedgerReader, LedgerWriter, PollPolicy, Signer, TxHandle, TxStatus};
use stl_state::{
    format_remaining, Incident, IncidentError, IncidentStatus, RevealPayload, RevealWindow,
};

use crate::cache::{IncidentCache, LastKnown};
use crate::commit::{IncidentMetadata, PreparedCommit};
use crate::error::RegistryError;
use crate::events::{IncidentEvent, IncidentObserver, SubscriptionId, Subscriptions};
use crate::feed::{collect_incidents, feed_items, FeedItem, FeedQuery};
use crate::reveal::{DisclosedEvidence, Disclosure, RevealVerifier};
use crate::settings::RegistrySettings;

/// A confirmed commit, with the opening the reporter must keep.
#[derive(Debug, Clone)]
pub struct CommitReceipt {
    pub id: IncidentId,
    pub tx: TxId,
    pub prepared: PreparedCommit,
}

/// A confirmed transition on an existing incident.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TxReceipt {
    pub id: IncidentId,
    pub tx: TxId,
    /// Status recorded by the ledger after the transaction.
    pub status: IncidentStatus,
}

/// One incident as shown to a user.
#[derive(Debug, Clone)]
pub struct IncidentView {
    pub last_known: LastKnown,
    pub status: IncidentStatus,
    pub deadline: Timestamp,
    /// Only while pending.
    pub time_remaining: Option<Duration>,
}

impl IncidentView {
    pub fn countdown(&self) -> Option<String> {
        self.time_remaining.map(format_remaining)
    }
}

pub struct Registry<L> {
    pub(crate) ledger: Arc<L>,
    pub(crate) content: Arc<dyn ContentStore>,
    pub(crate) cache: IncidentCache,
    pub(crate) subscriptions: Subscriptions,
    pub(crate) window: RevealWindow,
    pub(crate) policy: DisputePolicy,
    pub(crate) poll: PollPolicy,
    pub(crate) clock: Arc<dyn Clock>,
    expiry_announced: Mutex<HashSet<IncidentId>>,
}

impl<L> std::fmt::Debug for Registry<L> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Registry")
            .field("window", &self.window)
            .field("policy", &self.policy)
            .field("poll", &self.poll)
            .field("cached", &self.cache.len())
            .field("subscriptions", &self.subscriptions)
            .finish()
    }
}

impl<L> Registry<L> {
    pub fn new(ledger: Arc<L>, content: Arc<dyn ContentStore>) -> Self {
        Self {
            ledger,
            content,
            cache: IncidentCache::new(),
            subscriptions: Subscriptions::new(),
            window: RevealWindow::default(),
            policy: DisputePolicy::default(),
            poll: PollPolicy::default(),
            clock: Arc::new(SystemClock),
            expiry_announced: Mutex::new(HashSet::new()),
        }
    }

    pub fn from_settings(
        ledger: Arc<L>,
        content: Arc<dyn ContentStore>,
        settings: &RegistrySettings,
    ) -> Self {
        Self::new(ledger, content)
            .with_window(settings.reveal_window)
            .with_poll_policy(settings.poll_policy())
    }

    pub fn with_window(mut self, window: RevealWindow) -> Self {
        self.window = window;
        self
    }

    pub fn with_policy(mut self, policy: DisputePolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn with_poll_policy(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    pub fn ledger(&self) -> &Arc<L> {
        &self.ledger
    }

    pub fn window(&self) -> RevealWindow {
        self.window
    }

    pub fn cache(&self) -> &IncidentCache {
        &self.cache
    }

    pub fn subscribe(&self, observer: Arc<dyn IncidentObserver>) -> SubscriptionId {
        self.subscriptions.subscribe(observer)
    }

    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        self.subscriptions.unsubscribe(id)
    }

    pub(crate) fn now(&self) -> Timestamp {
        self.clock.now()
    }

    /// Publish `Expired` the first time an incident is seen past its
    /// deadline while still recorded as pending.
    /// Announce a lapsed reveal window once per incident. Ids leave the set
    /// when the ledger records a transition, so it holds only incidents
    /// still recorded pending.
    fn note_expiry(&self, incident: &Incident) {
        if incident.status() != IncidentStatus::Pending {
            self.expiry_announced.lock().remove(&incident.id());
            return;
        }
        let now = self.now();
        if incident.effective_status(&self.window, &now) == IncidentStatus::Stale
            && self.expiry_announced.lock().insert(incident.id())
        {
            tracing::info!(incident = %incident.id(), "reveal window elapsed");
            self.subscriptions
                .publish(&IncidentEvent::Expired { id: incident.id() });
        }
    }
}

impl<L: LedgerReader> Registry<L> {
    /// Last-known copy, fetching on a miss.
    pub async fn incident(&self, id: IncidentId) -> Result<LastKnown, RegistryError> {
        if let Some(entry) = self.cache.get(id) {
            tracing::debug!(incident = %id, origin = %entry.origin, "mirror hit");
            self.note_expiry(&entry.incident);
            return Ok(entry);
        }
        tracing::debug!(incident = %id, "mirror miss");
        self.refetch(id).await
    }

    /// Drop the mirrored copy and read the ledger.
    pub async fn refetch(&self, id: IncidentId) -> Result<LastKnown, RegistryError> {
        self.cache.invalidate(id);
        let incident = self.ledger.get_incident(id).await?;
        let entry = self.cache.put_fetched(incident, self.now());
        self.note_expiry(&entry.incident);
        Ok(entry)
    }

    pub async fn view(&self, id: IncidentId) -> Result<IncidentView, RegistryError> {
        let last_known = self.incident(id).await?;
        let now = self.now();
        let committed_at = last_known.incident.committed_at();
        let status = last_known.incident.effective_status(&self.window, &now);
        Ok(IncidentView {
            status,
            deadline: self.window.deadline(&committed_at),
            time_remaining: (status == IncidentStatus::Pending)
                .then(|| self.window.time_remaining(&committed_at, &now)),
            last_known,
        })
    }

    /// Every incident on the ledger, newest first. Refreshes the mirror.
    pub async fn feed(&self, query: &FeedQuery) -> Result<Vec<FeedItem>, RegistryError> {
        let incidents = collect_incidents(self.ledger.as_ref(), None).await?;
        let now = self.now();
        for incident in &incidents {
            self.note_expiry(incident);
            self.cache.put_fetched(incident.clone(), now);
        }
        Ok(feed_items(&incidents, &self.window, &now, query))
    }

    /// Wait for `handle` to settle. `Ok` carries the incident the ledger
    /// reports for the transaction; `SubmissionRejected` means the ledger
    /// failed it. Any other error leaves the outcome unknown.
    async fn settle(
        &self,
        function: &str,
        handle: &TxHandle,
    ) -> Result<Option<IncidentId>, RegistryError> {
        match self.ledger.await_tx(&handle.tx_id, self.poll).await {
            Ok(TxStatus::Confirmed { incident }) => Ok(incident),
            Ok(TxStatus::Failed { reason }) => {
                tracing::warn!(tx = %handle.tx_id, function, %reason, "transaction failed");
                Err(RegistryError::SubmissionRejected {
                    function: function.to_string(),
                    reason,
                })
            }
            Ok(TxStatus::Pending) => Err(RegistryError::Ledger(LedgerError::Timeout(
                handle.tx_id.clone(),
            ))),
            // Still pending when we gave up, or the status could not be
            // read; the transaction may yet land.
            Err(e) => Err(RegistryError::Ledger(e)),
        }
    }

    /// Settle a transition on an existing incident and refetch it. On
    /// failure the optimistic mirror is dropped.
    pub(crate) async fn confirm(
        &self,
        function: &str,
        id: IncidentId,
        handle: TxHandle,
    ) -> Result<TxReceipt, RegistryError> {
        if let Err(e) = self.settle(function, &handle).await {
            self.cache.invalidate(id);
            return Err(e);
        }
        let entry = self.refetch(id).await?;
        Ok(TxReceipt {
            id,
            tx: handle.tx_id,
            status: entry.incident.status(),
        })
    }
}

impl<L: LedgerReader + LedgerWriter> Registry<L> {
    /// Build the commitments and submit them. The returned receipt holds the
    /// opening needed to reveal.
    pub async fn commit(
        &self,
        signer: &impl Signer,
        evidence: &[u8],
        metadata: IncidentMetadata,
        incident_type: IncidentType,
    ) -> Result<CommitReceipt, RegistryError> {
        let prepared = PreparedCommit::new(evidence, metadata, incident_type)?;
        self.commit_prepared(signer, prepared).await
    }

    pub async fn commit_prepared(
        &self,
        signer: &impl Signer,
        prepared: PreparedCommit,
    ) -> Result<CommitReceipt, RegistryError> {
        const FUNCTION: &str = "commit-incident";
        let handle = self
            .ledger
            .commit_incident(
                signer,
                prepared.evidence_hash,
                prepared.meta_hash,
                prepared.geo_hash,
                prepared.incident_type,
            )
            .await
            .map_err(|e| RegistryError::submission(FUNCTION, e))?;

        let settled = match self.settle(FUNCTION, &handle).await {
            Ok(Some(id)) => self.refetch(id).await.map(|_| id).map_err(|e| (Some(id), e)),
            Ok(None) => Err((
                None,
                RegistryError::Ledger(LedgerError::Malformed {
                    endpoint: format!("tx {}", handle.tx_id),
                    reason: "confirmed commit carries no incident id".into(),
                }),
            )),
            Err(e @ RegistryError::SubmissionRejected { .. }) => return Err(e),
            Err(e) => Err((None, e)),
        };
        let id = match settled {
            Ok(id) => id,
            Err((incident, source)) => {
                tracing::warn!(
                    tx = %handle.tx_id,
                    error = %source,
                    "commit submitted but not settled; keep the opening"
                );
                return Err(RegistryError::CommitUnsettled {
                    tx: handle.tx_id,
                    incident,
                    prepared: Box::new(prepared),
                    source: Box::new(source),
                });
            }
        };

        tracing::info!(incident = %id, tx = %handle.tx_id, "incident committed");
        self.subscriptions.publish(&IncidentEvent::Committed {
            id,
            tx: handle.tx_id.clone(),
        });
        Ok(CommitReceipt {
            id,
            tx: handle.tx_id,
            prepared,
        })
    }

    /// Verify a disclosure against the ledger's commitments and, if it
    /// matches, submit the reveal. A mismatch sends nothing and leaves the
    /// incident pending.
    pub async fn reveal(
        &self,
        signer: &impl Signer,
        id: IncidentId,
        disclosure: Disclosure,
    ) -> Result<TxReceipt, RegistryError> {
        const FUNCTION: &str = "reveal-incident";
        let current = self.refetch(id).await?.incident;
        let now = self.now();
        let status = current.effective_status(&self.window, &now);
        if status != IncidentStatus::Pending {
            return Err(IncidentError::InvalidTransition {
                id,
                from: status,
                to: IncidentStatus::Revealed,
            }
            .into());
        }

        let Disclosure {
            evidence,
            metadata,
            salt,
        } = disclosure;
        let (bytes, known_locator) = match evidence {
            DisclosedEvidence::Bytes(b) => (b, None),
            DisclosedEvidence::Locator(l) => (self.content.fetch(&l)?, Some(l)),
        };

        let verified =
            match RevealVerifier::verify(id, current.commitments(), &bytes, &metadata, &salt) {
                Ok(v) => v,
                Err(e) => {
                    tracing::warn!(incident = %id, error = %e, "reveal rejected before submission");
                    return Err(e);
                }
            };

        let locator = match known_locator {
            Some(l) => l,
            None => self.content.store(&bytes)?,
        };

        let handle = self
            .ledger
            .reveal_incident(
                signer,
                id,
                locator.clone(),
                verified.meta_hash,
                salt.clone(),
                verified.evidence_hash,
            )
            .await
            .map_err(|e| RegistryError::submission(FUNCTION, e))?;

        let mut predicted = current;
        let payload = RevealPayload {
            locator,
            meta_hash: verified.meta_hash,
            salt,
        };
        if predicted.reveal(payload, now).is_ok() {
            self.cache.mirror(predicted, now);
        }

        let receipt = self.confirm(FUNCTION, id, handle).await?;
        tracing::info!(incident = %id, tx = %receipt.tx, "incident revealed");
        self.subscriptions.publish(&IncidentEvent::Revealed {
            id,
            tx: receipt.tx.clone(),
        });
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_core::{ManualClock, Role};
    use stl_crypto::{digest, MemoryContentStore, SigningIdentity};
    use stl_ledger::{Ed25519Session, InMemoryLedger};

    #[tokio::test]
    async fn expiry_notice_is_dropped_once_ledger_records_stale() {
        let clock = Arc::new(ManualClock::new(
            Timestamp::parse("2026-03-01T10:00:00Z").unwrap(),
        ));
        let ledger = Arc::new(InMemoryLedger::new(RevealWindow::default(), clock.clone()));
        let content = Arc::new(MemoryContentStore::new());
        let registry = Registry::new(ledger.clone(), content.clone())
            .with_clock(clock.clone())
            .with_poll_policy(PollPolicy {
                interval: Duration::from_millis(2),
                max_polls: 2_000,
            });
        let expired = Arc::new(Mutex::new(0usize));
        let sink = expired.clone();
        registry.subscribe(Arc::new(move |e: &IncidentEvent| {
            if matches!(e, IncidentEvent::Expired { .. }) {
                *sink.lock() += 1;
            }
        }));

        let reporter = Ed25519Session::new(SigningIdentity::generate(), Role::Reporter);
        let receipt = registry
            .commit(
                &reporter,
                b"photo-bytes",
                IncidentMetadata::at("-16.5,-68.15"),
                IncidentType::Collision,
            )
            .await
            .unwrap();
        let id = receipt.id;

        clock.advance(chrono::Duration::hours(25));
        registry.refetch(id).await.unwrap();
        registry.incident(id).await.unwrap();
        assert_eq!(*expired.lock(), 1);
        assert!(registry.expiry_announced.lock().contains(&id));

        // A late reveal makes the ledger record the incident stale.
        let locator = content.store(b"photo-bytes").unwrap();
        ledger
            .reveal_incident(
                &reporter,
                id,
                locator,
                receipt.prepared.meta_hash,
                receipt.prepared.opening.salt.clone(),
                digest(b"photo-bytes"),
            )
            .await
            .unwrap();
        let entry = registry.refetch(id).await.unwrap();
        assert_eq!(entry.incident.status(), IncidentStatus::Stale);
        assert!(registry.expiry_announced.lock().is_empty());
        assert_eq!(*expired.lock(), 1);
    }
}
