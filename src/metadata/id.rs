//! Ledger id allocation.

use crate::error::{QuorumLogError, Result};
use crate::types::LedgerId;
use async_trait::async_trait;
use std::sync::atomic::{AtomicU64, Ordering};

/// Hands out ledger ids.
///
/// Ids are never reused, including ids whose creation later failed.
#[async_trait]
pub trait LedgerIdAllocator: Send + Sync {
    async fn next_id(&self) -> Result<LedgerId>;
}

/// Process-local allocator backed by a single atomic counter.
#[derive(Debug)]
pub struct AtomicIdAllocator {
    next: AtomicU64,
}

impl AtomicIdAllocator {
    pub fn new() -> Self {
        Self::starting_at(0)
    }

    pub fn starting_at(first: LedgerId) -> Self {
        Self {
            next: AtomicU64::new(first),
        }
    }

    /// The id the next call will return, without consuming it.
    pub fn peek(&self) -> LedgerId {
        self.next.load(Ordering::SeqCst)
    }
}

impl Default for AtomicIdAllocator {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl LedgerIdAllocator for AtomicIdAllocator {
    async fn next_id(&self) -> Result<LedgerId> {
        self.next
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |id| id.checked_add(1))
            .map_err(|_| QuorumLogError::Internal("ledger id space exhausted".to_string()))
    }
}
