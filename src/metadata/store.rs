//! Durable ledger metadata.

use super::backend::MetadataBackend;
use super::id::LedgerIdAllocator;
use crate::error::{QuorumLogError, Result};
use crate::types::{
    BookieId, CustomMetadata, DigestType, LedgerId, LedgerMetadata, LedgerState,
    ReplicationConfig,
};
use chrono::Utc;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Default bound on a single metadata write.
pub const DEFAULT_WRITE_TIMEOUT: Duration = Duration::from_secs(10);

/// Persists ledger metadata under freshly allocated ids.
///
/// Writes are scoped to one ledger id, so concurrent creations never contend
/// here beyond the allocator's atomic increment.
#[derive(Clone)]
pub struct LedgerMetadataStore {
    backend: Arc<dyn MetadataBackend>,
    allocator: Arc<dyn LedgerIdAllocator>,
    write_timeout: Duration,
}

impl LedgerMetadataStore {
    pub fn new(backend: Arc<dyn MetadataBackend>, allocator: Arc<dyn LedgerIdAllocator>) -> Self {
        Self {
            backend,
            allocator,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
        }
    }

    pub fn with_write_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn write_timeout(&self) -> Duration {
        self.write_timeout
    }

    /// Allocate the id for the next ledger.
    ///
    /// The id is consumed even if the subsequent [`create`](Self::create)
    /// fails.
    pub async fn allocate_id(&self) -> Result<LedgerId> {
        self.allocator.next_id().await
    }

    /// Persist metadata for a new ledger in the `Open` state.
    ///
    /// # Errors
    ///
    /// - [`QuorumLogError::MetadataUnavailable`] if the backend fails or does
    ///   not answer within the write timeout.
    /// - [`QuorumLogError::LedgerExists`] if `id` is already taken.
    pub async fn create(
        &self,
        id: LedgerId,
        config: ReplicationConfig,
        ensemble: Vec<BookieId>,
        digest_type: DigestType,
        password: &[u8],
        custom_metadata: CustomMetadata,
    ) -> Result<LedgerMetadata> {
        let metadata = LedgerMetadata {
            id,
            config,
            ensemble,
            digest_type,
            password_hash: hash_password(password),
            state: LedgerState::Open,
            ctime: Utc::now(),
            custom_metadata,
        };

        let encoded = serde_json::to_vec(&metadata).map_err(|e| {
            QuorumLogError::MetadataUnavailable(format!("encoding ledger {}: {}", id, e))
        })?;

        match tokio::time::timeout(self.write_timeout, self.backend.put_if_absent(id, encoded)).await
        {
            Ok(Ok(())) => {
                debug!(ledger_id = id, "Persisted ledger metadata");
                Ok(metadata)
            }
            Ok(Err(e @ (QuorumLogError::LedgerExists(_) | QuorumLogError::MetadataUnavailable(_)))) => {
                warn!(ledger_id = id, error = %e, "Metadata write failed");
                Err(e)
            }
            // Any other backend failure means the write did not land.
            Ok(Err(e)) => {
                warn!(ledger_id = id, error = %e, "Metadata write failed");
                Err(QuorumLogError::MetadataUnavailable(e.to_string()))
            }
            Err(_) => {
                warn!(ledger_id = id, timeout = ?self.write_timeout, "Metadata write timed out");
                Err(QuorumLogError::MetadataUnavailable(format!(
                    "write of ledger {} timed out after {:?}",
                    id, self.write_timeout
                )))
            }
        }
    }

    /// Read back the persisted metadata of a ledger.
    pub async fn read(&self, id: LedgerId) -> Result<LedgerMetadata> {
        let bytes = self
            .backend
            .get(id)
            .await?
            .ok_or(QuorumLogError::NoSuchLedger(id))?;

        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// SHA-256 of a ledger password.
pub fn hash_password(password: &[u8]) -> Vec<u8> {
    Sha256::digest(password).to_vec()
}
