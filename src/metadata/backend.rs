//! Metadata backend abstraction.
//!
//! Ledger metadata lives in an external, strongly consistent store. The
//! [`MetadataBackend`] trait is the only surface the client uses:
//! a create-only write keyed by ledger id and a point read.
//!
//! [`MemoryMetadataBackend`] is the in-process implementation used by the CLI
//! and tests. It can be switched unavailable to exercise failure paths.

use crate::error::{QuorumLogError, Result};
use crate::types::LedgerId;
use async_trait::async_trait;
use parking_lot::RwLock;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Strongly consistent metadata store.
///
/// Retry policy, if any, belongs to the implementation; callers treat every
/// error as final.
#[async_trait]
pub trait MetadataBackend: Send + Sync {
    /// Store `value` under `id` only if nothing is stored there yet.
    ///
    /// # Errors
    ///
    /// - [`QuorumLogError::LedgerExists`] if `id` is already taken.
    /// - [`QuorumLogError::MetadataUnavailable`] if the store cannot be reached
    ///   or rejects the write.
    async fn put_if_absent(&self, id: LedgerId, value: Vec<u8>) -> Result<()>;

    /// Read the value stored under `id`, if any.
    async fn get(&self, id: LedgerId) -> Result<Option<Vec<u8>>>;
}

/// In-memory metadata backend using [`BTreeMap`].
///
/// `MemoryMetadataBackend` is cheaply cloneable via [`Arc`]. All clones share
/// the same data and the same availability switch.
#[derive(Debug, Clone)]
pub struct MemoryMetadataBackend {
    data: Arc<RwLock<BTreeMap<LedgerId, Vec<u8>>>>,
    available: Arc<AtomicBool>,
}

impl MemoryMetadataBackend {
    pub fn new() -> Self {
        Self {
            data: Arc::new(RwLock::new(BTreeMap::new())),
            available: Arc::new(AtomicBool::new(true)),
        }
    }

    /// Simulate the store going away (`false`) or coming back (`true`).
    pub fn set_available(&self, available: bool) {
        self.available.store(available, Ordering::SeqCst);
    }

    pub fn is_available(&self) -> bool {
        self.available.load(Ordering::SeqCst)
    }

    pub fn len(&self) -> usize {
        self.data.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.read().is_empty()
    }

    pub fn ledger_ids(&self) -> Vec<LedgerId> {
        self.data.read().keys().copied().collect()
    }

    fn check_available(&self) -> Result<()> {
        if self.is_available() {
            Ok(())
        } else {
            Err(QuorumLogError::MetadataUnavailable(
                "memory backend is offline".to_string(),
            ))
        }
    }
}

impl Default for MemoryMetadataBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataBackend for MemoryMetadataBackend {
    async fn put_if_absent(&self, id: LedgerId, value: Vec<u8>) -> Result<()> {
        self.check_available()?;

        let mut data = self.data.write();
        if data.contains_key(&id) {
            return Err(QuorumLogError::LedgerExists(id));
        }
        data.insert(id, value);
        Ok(())
    }

    async fn get(&self, id: LedgerId) -> Result<Option<Vec<u8>>> {
        self.check_available()?;
        Ok(self.data.read().get(&id).cloned())
    }
}
