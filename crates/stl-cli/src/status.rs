//! # Status Subcommand

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use stl_core::{CommitmentHash, IncidentId, IncidentType, Principal, Timestamp};
use stl_registry::IncidentView;
use stl_state::IncidentStatus;

use crate::context::{Context as CommandContext, GlobalOpts};

#[derive(Args, Debug)]
pub struct StatusArgs {
    pub id: IncidentId,

    /// Print JSON instead of a table.
    #[arg(long)]
    pub json: bool,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct StatusReport<'a> {
    id: IncidentId,
    status: IncidentStatus,
    recorded_status: IncidentStatus,
    incident_type: IncidentType,
    proposer: &'a Principal,
    evidence_hash: CommitmentHash,
    committed_at: Timestamp,
    deadline: Timestamp,
    #[serde(skip_serializing_if = "Option::is_none")]
    locator: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    time_remaining: Option<String>,
}

impl<'a> StatusReport<'a> {
    fn new(view: &'a IncidentView) -> Self {
        let incident = &view.last_known.incident;
        Self {
            id: incident.id(),
            status: view.status,
            recorded_status: incident.status(),
            incident_type: incident.commitments().incident_type,
            proposer: incident.proposer(),
            evidence_hash: incident.commitments().evidence_hash,
            committed_at: incident.committed_at(),
            deadline: view.deadline,
            locator: incident.reveal_payload().map(|p| p.locator.to_string()),
            time_remaining: view.countdown(),
        }
    }
}

pub async fn run_status(args: &StatusArgs, opts: &GlobalOpts) -> Result<u8> {
    let ctx = CommandContext::open(opts)?;
    let view = ctx
        .registry
        .view(args.id)
        .await
        .with_context(|| format!("failed to read incident {}", args.id))?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&StatusReport::new(&view))?);
    } else {
        for line in render(&view) {
            println!("{line}");
        }
    }
    Ok(0)
}

fn render(view: &IncidentView) -> Vec<String> {
    let r = StatusReport::new(view);
    let mut lines = vec![
        format!("incident:   {}", r.id),
        format!("status:     {}", r.status),
        format!("type:       {}", r.incident_type),
        format!("proposer:   {}", r.proposer),
        format!("evidence:   {}", r.evidence_hash),
        format!("committed:  {}", r.committed_at),
    ];
    if r.status != r.recorded_status {
        lines.push(format!("recorded:   {} (not yet updated on ledger)", r.recorded_status));
    }
    match (&r.time_remaining, &r.locator) {
        (Some(left), _) => lines.push(format!("deadline:   {} ({left})", r.deadline)),
        (None, Some(locator)) => lines.push(format!("locator:    {locator}")),
        (None, None) => {}
    }
    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use stl_crypto::digest;
    use stl_registry::{LastKnown, Origin};
    use stl_state::{Commitments, Incident};

    fn view(status: IncidentStatus, remaining: Option<std::time::Duration>) -> IncidentView {
        let at = Timestamp::parse("2026-05-01T08:00:00Z").unwrap();
        let incident = Incident::committed(
            IncidentId(4),
            Principal::new("stl1reporter").unwrap(),
            Commitments {
                evidence_hash: digest(b"photo"),
                meta_hash: digest(b"meta"),
                geo_hash: digest(b"geo"),
                incident_type: IncidentType::Collision,
            },
            10,
            at,
        );
        IncidentView {
            last_known: LastKnown {
                incident,
                fetched_at: at,
                origin: Origin::Ledger,
            },
            status,
            deadline: at.plus(chrono::Duration::hours(24)),
            time_remaining: remaining,
        }
    }

    #[test]
    fn pending_shows_countdown() {
        let v = view(
            IncidentStatus::Pending,
            Some(std::time::Duration::from_secs(5 * 3600 + 12 * 60)),
        );
        let lines = render(&v);
        assert!(lines.iter().any(|l| l.contains("5h 12m remaining")));
        assert!(!lines.iter().any(|l| l.starts_with("recorded:")));
    }

    #[test]
    fn lazily_expired_notes_recorded_status() {
        let v = view(IncidentStatus::Stale, None);
        let lines = render(&v);
        assert!(lines.contains(&"status:     stale".to_string()));
        assert!(lines.iter().any(|l| l.starts_with("recorded:   pending")));
    }

    #[test]
    fn json_report_is_camel_case() {
        let v = view(IncidentStatus::Pending, Some(std::time::Duration::from_secs(60)));
        let json = serde_json::to_value(StatusReport::new(&v)).unwrap();
        assert_eq!(json["id"], 4);
        assert!(json.get("evidenceHash").is_some());
        assert!(json.get("recordedStatus").is_some());
        assert!(json.get("locator").is_none());
    }
}
