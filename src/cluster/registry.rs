//! Bookie availability.
//!
//! The client never talks to bookies directly while creating a ledger; it
//! only asks a [`BookieRegistry`] which bookies are currently known. Health
//! checking itself lives outside this crate.

use crate::error::Result;
use crate::types::{BookieId, BookieInfo, BookieStatus};
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info};

/// Source of the bookie pool used for ensemble selection.
#[async_trait]
pub trait BookieRegistry: Send + Sync {
    /// All bookies currently known, in any status.
    ///
    /// Placement filters out read-only and offline entries itself.
    async fn available_bookies(&self) -> Result<Vec<BookieInfo>>;
}

/// In-memory registry fed by explicit registration calls.
///
/// Cheaply cloneable; all clones share the same bookie table.
#[derive(Debug, Clone, Default)]
pub struct StaticBookieRegistry {
    bookies: Arc<RwLock<BTreeMap<BookieId, BookieInfo>>>,
}

impl StaticBookieRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a registry of writable, rackless bookies.
    pub fn with_bookies<I, S>(addrs: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let registry = Self::new();
        for addr in addrs {
            registry.register(BookieInfo::writable(addr));
        }
        registry
    }

    /// Register a bookie, replacing any previous entry with the same id.
    pub fn register(&self, info: BookieInfo) {
        debug!(bookie = %info.id, status = ?info.status, "Registering bookie");
        self.bookies.write().insert(info.id.clone(), info);
    }

    /// Update a bookie's status. Returns `false` if it is unknown.
    pub fn set_status(&self, id: &BookieId, status: BookieStatus) -> bool {
        match self.bookies.write().get_mut(id) {
            Some(info) => {
                if info.status != status {
                    info!(bookie = %id, from = ?info.status, to = ?status, "Bookie status changed");
                    info.status = status;
                }
                true
            }
            None => false,
        }
    }

    pub fn deregister(&self, id: &BookieId) -> Option<BookieInfo> {
        self.bookies.write().remove(id)
    }

    /// Number of bookies that can take new ledgers.
    pub fn writable_count(&self) -> usize {
        self.bookies.read().values().filter(|b| b.is_writable()).count()
    }

    pub fn len(&self) -> usize {
        self.bookies.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.bookies.read().is_empty()
    }

    pub fn snapshot(&self) -> Vec<BookieInfo> {
        self.bookies.read().values().cloned().collect()
    }
}

#[async_trait]
impl BookieRegistry for StaticBookieRegistry {
    async fn available_bookies(&self) -> Result<Vec<BookieInfo>> {
        Ok(self.snapshot())
    }
}
