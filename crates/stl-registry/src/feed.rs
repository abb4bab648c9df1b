//! # Incident Feed
//!
//! Public listing of every incident the ledger knows, newest first, with
//! the deadline applied to pending entries.

use std::time::Duration;

use serde::Serialize;
use stl_core::{CommitmentHash, IncidentId, IncidentType, Timestamp};
use stl_crypto::ContentLocator;
use stl_ledger::{LedgerError, LedgerReader};
use stl_state::{format_remaining, Incident, IncidentStatus, RevealWindow};

use crate::error::RegistryError;

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FeedQuery {
    /// Keep only items in this (effective) status.
    pub status: Option<IncidentStatus>,
    pub limit: Option<usize>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedItem {
    pub id: IncidentId,
    pub status: IncidentStatus,
    pub incident_type: IncidentType,
    pub evidence_hash: CommitmentHash,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locator: Option<ContentLocator>,
    pub committed_at: Timestamp,
    /// Only for items still pending.
    #[serde(skip)]
    pub time_remaining: Option<Duration>,
}

impl FeedItem {
    pub fn from_incident(incident: &Incident, window: &RevealWindow, now: &Timestamp) -> Self {
        let status = incident.effective_status(window, now);
        let time_remaining = (status == IncidentStatus::Pending)
            .then(|| window.time_remaining(&incident.committed_at(), now));
        Self {
            id: incident.id(),
            status,
            incident_type: incident.commitments().incident_type,
            evidence_hash: incident.commitments().evidence_hash,
            locator: incident.reveal_payload().map(|p| p.locator.clone()),
            committed_at: incident.committed_at(),
            time_remaining,
        }
    }

    /// `"5h 12m remaining"` for pending items.
    pub fn countdown(&self) -> Option<String> {
        self.time_remaining.map(format_remaining)
    }
}

/// Read incidents `count..=1`, skipping ids the ledger no longer reports.
pub async fn collect_incidents<R: LedgerReader>(
    reader: &R,
    limit: Option<usize>,
) -> Result<Vec<Incident>, RegistryError> {
    let count = reader.incident_count().await?;
    let mut incidents = Vec::new();
    for raw in (1..=count).rev() {
        if limit.is_some_and(|l| incidents.len() >= l) {
            break;
        }
        match reader.get_incident(IncidentId(raw)).await {
            Ok(inc) => incidents.push(inc),
            Err(LedgerError::NotFound(id)) => {
                tracing::debug!(incident = %id, "skipping missing incident");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(incidents)
}

/// Feed items for `incidents`, newest first, filtered by `query`.
pub fn feed_items<'a>(
    incidents: impl IntoIterator<Item = &'a Incident>,
    window: &RevealWindow,
    now: &Timestamp,
    query: &FeedQuery,
) -> Vec<FeedItem> {
    let mut items: Vec<FeedItem> = incidents
        .into_iter()
        .map(|i| FeedItem::from_incident(i, window, now))
        .filter(|item| query.status.map_or(true, |s| item.status == s))
        .collect();
    items.sort_by(|a, b| b.id.cmp(&a.id));
    if let Some(limit) = query.limit {
        items.truncate(limit);
    }
    items
}
