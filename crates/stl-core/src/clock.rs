//! Time sources. Deadlines and commit timestamps read the clock through
//! this trait so tests can move time without sleeping.

use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use crate::temporal::Timestamp;

pub trait Clock: Send + Sync {
    fn now(&self) -> Timestamp;
}

/// Wall-clock UTC.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Timestamp {
        Timestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct ManualClock {
    epoch_secs: AtomicI64,
}

impl ManualClock {
    pub fn new(start: Timestamp) -> Self {
        Self {
            epoch_secs: AtomicI64::new(start.epoch_secs()),
        }
    }

    pub fn set(&self, t: Timestamp) {
        self.epoch_secs.store(t.epoch_secs(), Ordering::SeqCst);
    }

    pub fn advance(&self, d: chrono::Duration) {
        self.epoch_secs.fetch_add(d.num_seconds(), Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Timestamp {
        let secs = self.epoch_secs.load(Ordering::SeqCst);
        Timestamp::from_epoch_secs(secs).unwrap_or_else(|_| Timestamp::now())
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Timestamp {
        (**self).now()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_moves_only_when_told() {
        let start = Timestamp::parse("2026-03-01T10:00:00Z").unwrap();
        let clock = ManualClock::new(start);
        assert_eq!(clock.now(), start);
        clock.advance(chrono::Duration::hours(24));
        assert_eq!(clock.now().to_iso8601(), "2026-03-02T10:00:00Z");
        clock.set(start);
        assert_eq!(clock.now(), start);
    }

    #[test]
    fn shared_clock_delegates() {
        let start = Timestamp::parse("2026-03-01T10:00:00Z").unwrap();
        let shared: Arc<dyn Clock> = Arc::new(ManualClock::new(start));
        assert_eq!(shared.now(), start);
    }
}
