//! Creation counters kept by a client.

use crate::error::{QuorumLogError, ResultCode};
use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Client statistics
#[derive(Debug, Default)]
pub struct ClientStats {
    /// Requests rejected by validation
    rejected: AtomicU64,
    /// Requests accepted for processing
    accepted: AtomicU64,
    created: AtomicU64,
    client_closed: AtomicU64,
    not_enough_bookies: AtomicU64,
    metadata_unavailable: AtomicU64,
    other_failures: AtomicU64,
    /// Total latency of completed requests, in microseconds
    total_latency_us: AtomicU64,
}

impl ClientStats {
    pub(crate) fn record_rejected(&self) {
        self.rejected.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_accepted(&self) {
        self.accepted.fetch_add(1, Ordering::Relaxed);
    }

    /// Count the terminal outcome of an accepted request.
    pub(crate) fn record_outcome(&self, outcome: Result<(), &QuorumLogError>, elapsed: Duration) {
        let counter = match outcome.map_err(|e| e.code()) {
            Ok(()) => &self.created,
            Err(ResultCode::ClientClosed) => &self.client_closed,
            Err(ResultCode::NotEnoughBookies) => &self.not_enough_bookies,
            Err(ResultCode::MetadataUnavailable) => &self.metadata_unavailable,
            Err(_) => &self.other_failures,
        };
        counter.fetch_add(1, Ordering::Relaxed);

        let micros = u64::try_from(elapsed.as_micros()).unwrap_or(u64::MAX);
        self.total_latency_us.fetch_add(micros, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> ClientStatsSnapshot {
        let load = |c: &AtomicU64| c.load(Ordering::Relaxed);

        let created = load(&self.created);
        let client_closed = load(&self.client_closed);
        let not_enough_bookies = load(&self.not_enough_bookies);
        let metadata_unavailable = load(&self.metadata_unavailable);
        let other_failures = load(&self.other_failures);
        let completed =
            created + client_closed + not_enough_bookies + metadata_unavailable + other_failures;

        ClientStatsSnapshot {
            rejected: load(&self.rejected),
            accepted: load(&self.accepted),
            created,
            client_closed,
            not_enough_bookies,
            metadata_unavailable,
            other_failures,
            avg_latency_us: if completed > 0 {
                load(&self.total_latency_us) / completed
            } else {
                0
            },
        }
    }
}

/// Client statistics snapshot
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClientStatsSnapshot {
    pub rejected: u64,
    pub accepted: u64,
    pub created: u64,
    pub client_closed: u64,
    pub not_enough_bookies: u64,
    pub metadata_unavailable: u64,
    pub other_failures: u64,
    pub avg_latency_us: u64,
}

impl ClientStatsSnapshot {
    /// Accepted requests that resolved to a failure.
    pub fn failed(&self) -> u64 {
        self.client_closed + self.not_enough_bookies + self.metadata_unavailable + self.other_failures
    }

    /// Accepted requests that have not resolved yet.
    pub fn in_flight(&self) -> u64 {
        self.accepted.saturating_sub(self.created + self.failed())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outcomes_are_bucketed() {
        let stats = ClientStats::default();
        for _ in 0..4 {
            stats.record_accepted();
        }
        stats.record_rejected();

        stats.record_outcome(Ok(()), Duration::from_micros(10));
        stats.record_outcome(Err(&QuorumLogError::ClientClosed), Duration::from_micros(20));
        stats.record_outcome(
            Err(&QuorumLogError::NotEnoughBookies { required: 3, available: 1 }),
            Duration::from_micros(30),
        );

        let snapshot = stats.snapshot();
        assert_eq!(snapshot.rejected, 1);
        assert_eq!(snapshot.created, 1);
        assert_eq!(snapshot.client_closed, 1);
        assert_eq!(snapshot.not_enough_bookies, 1);
        assert_eq!(snapshot.failed(), 2);
        assert_eq!(snapshot.in_flight(), 1);
        assert_eq!(snapshot.avg_latency_us, 20);
    }

    #[test]
    fn test_empty_snapshot() {
        assert_eq!(ClientStats::default().snapshot(), ClientStatsSnapshot::default());
    }
}
