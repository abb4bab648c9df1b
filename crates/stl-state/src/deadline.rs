//! # Reveal Deadline
//!
//! An incident must be revealed within a configured window after its commit
//! time; afterwards it is stale. All functions here are pure: the caller
//! supplies `now`.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use stl_core::{Timestamp, ValidationError};

/// Reveal window in whole hours, between one hour and one year; 24 by
/// default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u32", into = "u32")]
pub struct RevealWindow(u32);

impl RevealWindow {
    pub const DEFAULT_HOURS: u32 = 24;
    pub const MIN_HOURS: u32 = 1;
    pub const MAX_HOURS: u32 = 24 * 365;

    pub fn hours(hours: u32) -> Result<Self, ValidationError> {
        if !(Self::MIN_HOURS..=Self::MAX_HOURS).contains(&hours) {
            return Err(ValidationError::InvalidRevealWindow(hours));
        }
        Ok(Self(hours))
    }

    pub fn as_hours(&self) -> u32 {
        self.0
    }

    pub fn as_chrono(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.0))
    }

    /// Commit time plus the window.
    pub fn deadline(&self, committed_at: &Timestamp) -> Timestamp {
        committed_at.plus(self.as_chrono())
    }

    /// Time left until the deadline, clamped at zero.
    pub fn time_remaining(&self, committed_at: &Timestamp, now: &Timestamp) -> Duration {
        let left = self.deadline(committed_at).since(now);
        left.to_std().unwrap_or(Duration::ZERO)
    }

    /// True exactly when [`time_remaining`](Self::time_remaining) is zero.
    pub fn is_expired(&self, committed_at: &Timestamp, now: &Timestamp) -> bool {
        self.time_remaining(committed_at, now).is_zero()
    }
}

impl Default for RevealWindow {
    fn default() -> Self {
        Self(Self::DEFAULT_HOURS)
    }
}

impl TryFrom<u32> for RevealWindow {
    type Error = ValidationError;

    fn try_from(hours: u32) -> Result<Self, Self::Error> {
        Self::hours(hours)
    }
}

impl From<RevealWindow> for u32 {
    fn from(w: RevealWindow) -> u32 {
        w.0
    }
}

/// Countdown text for a pending incident: `"5h 12m remaining"`, or
/// `"expired"` once nothing is left.
pub fn format_remaining(remaining: Duration) -> String {
    if remaining.is_zero() {
        return "expired".to_string();
    }
    let secs = remaining.as_secs();
    format!("{}h {}m remaining", secs / 3600, (secs % 3600) / 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ts(s: &str) -> Timestamp {
        Timestamp::parse(s).unwrap()
    }

    #[test]
    fn window_bounds() {
        assert_eq!(RevealWindow::default().as_hours(), 24);
        assert!(RevealWindow::hours(0).is_err());
        assert_eq!(RevealWindow::hours(1).unwrap().as_hours(), 1);
        assert!(RevealWindow::hours(RevealWindow::MAX_HOURS).is_ok());
        assert!(RevealWindow::hours(RevealWindow::MAX_HOURS + 1).is_err());
        assert!(RevealWindow::hours(u32::MAX).is_err());
    }

    #[test]
    fn widest_window_is_open_at_commit() {
        let w = RevealWindow::hours(RevealWindow::MAX_HOURS).unwrap();
        let commit = ts("2026-03-01T10:00:00Z");
        assert_eq!(w.deadline(&commit).to_iso8601(), "2027-03-01T10:00:00Z");
        assert!(!w.is_expired(&commit, &commit));
    }

    #[test]
    fn deadline_is_commit_plus_window() {
        let w = RevealWindow::hours(24).unwrap();
        assert_eq!(
            w.deadline(&ts("2026-03-01T10:00:00Z")).to_iso8601(),
            "2026-03-02T10:00:00Z"
        );
    }

    #[test]
    fn remaining_counts_down_and_clamps() {
        let w = RevealWindow::hours(24).unwrap();
        let commit = ts("2026-03-01T10:00:00Z");
        assert_eq!(
            w.time_remaining(&commit, &ts("2026-03-01T10:00:00Z")),
            Duration::from_secs(24 * 3600)
        );
        assert_eq!(
            w.time_remaining(&commit, &ts("2026-03-02T09:30:00Z")),
            Duration::from_secs(1800)
        );
        assert_eq!(w.time_remaining(&commit, &ts("2026-03-02T10:00:00Z")), Duration::ZERO);
        assert_eq!(w.time_remaining(&commit, &ts("2026-03-05T00:00:00Z")), Duration::ZERO);
    }

    #[test]
    fn expired_exactly_at_deadline() {
        let w = RevealWindow::hours(1).unwrap();
        let commit = ts("2026-03-01T10:00:00Z");
        assert!(!w.is_expired(&commit, &ts("2026-03-01T10:59:59Z")));
        assert!(w.is_expired(&commit, &ts("2026-03-01T11:00:00Z")));
    }

    #[test]
    fn countdown_rendering() {
        assert_eq!(format_remaining(Duration::from_secs(5 * 3600 + 12 * 60 + 30)), "5h 12m remaining");
        assert_eq!(format_remaining(Duration::from_secs(59)), "0h 0m remaining");
        assert_eq!(format_remaining(Duration::ZERO), "expired");
    }

    #[test]
    fn serde_rejects_zero_hours() {
        assert!(serde_json::from_str::<RevealWindow>("0").is_err());
        assert_eq!(serde_json::from_str::<RevealWindow>("48").unwrap().as_hours(), 48);
    }
}

#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    proptest! {
        #[test]
        fn remaining_is_non_increasing(
            hours in 1u32..200,
            a in 0i64..1_000_000,
            b in 0i64..1_000_000,
        ) {
            let w = RevealWindow::hours(hours).unwrap();
            let commit = Timestamp::from_epoch_secs(1_767_225_600).unwrap();
            let (early, late) = if a <= b { (a, b) } else { (b, a) };
            let t1 = commit.plus(chrono::Duration::seconds(early));
            let t2 = commit.plus(chrono::Duration::seconds(late));
            prop_assert!(w.time_remaining(&commit, &t2) <= w.time_remaining(&commit, &t1));
            prop_assert_eq!(w.is_expired(&commit, &t2), w.time_remaining(&commit, &t2).is_zero());
        }
    }
}
