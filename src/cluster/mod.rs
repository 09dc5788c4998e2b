//! Cluster view for ledger creation.
//!
//! This module handles the bookie side of creation:
//! - Bookie registry (which storage nodes exist and whether they are writable)
//! - Placement engine for ensemble selection

mod placement;
mod registry;

pub use placement::{PlacementEngine, PlacementStrategy, DEFAULT_RACK};
pub use registry::{BookieRegistry, StaticBookieRegistry};

use crate::types::{BookieInfo, BookieStatus};

/// Summary of the bookie pool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClusterStatus {
    /// Bookies accepting new ledgers.
    pub writable_bookies: usize,
    pub read_only_bookies: usize,
    pub offline_bookies: usize,
}

impl ClusterStatus {
    pub fn from_bookies(bookies: &[BookieInfo]) -> Self {
        bookies.iter().fold(Self::default(), |mut status, b| {
            match b.status {
                BookieStatus::Writable => status.writable_bookies += 1,
                BookieStatus::ReadOnly => status.read_only_bookies += 1,
                BookieStatus::Offline => status.offline_bookies += 1,
            }
            status
        })
    }

    /// Largest ensemble a new ledger could get right now.
    pub fn max_ensemble_size(&self) -> usize {
        self.writable_bookies
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cluster_status() {
        let mut bookies = vec![
            BookieInfo::writable("a:1"),
            BookieInfo::writable("b:1"),
            BookieInfo::writable("c:1"),
        ];
        bookies[1].status = BookieStatus::ReadOnly;
        bookies[2].status = BookieStatus::Offline;

        let status = ClusterStatus::from_bookies(&bookies);
        assert_eq!(status.writable_bookies, 1);
        assert_eq!(status.read_only_bookies, 1);
        assert_eq!(status.offline_bookies, 1);
        assert_eq!(status.max_ensemble_size(), 1);
    }
}
