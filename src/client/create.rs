//! Ledger creation coordinator.
//!
//! Every request walks the same stages:
//!
//! ```text
//! Received -> Validating -> Selecting -> Persisting -> Completed
//! ```
//!
//! Validation runs on the caller's thread and a rejection is returned
//! directly. Anything past validation runs on a spawned task and resolves
//! the request's [`PendingLedger`] exactly once.

use super::handle::{LedgerHandle, PendingLedger};
use super::session::ClientSession;
use super::stats::ClientStats;
use crate::cluster::{BookieRegistry, PlacementEngine};
use crate::error::{QuorumLogError, Result, ResultCode};
use crate::metadata::LedgerMetadataStore;
use crate::observability;
use crate::types::{CustomMetadata, DigestType, ReplicationConfig};
use crate::validation;
use std::collections::HashSet;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tokio::runtime::Handle;
use tokio::sync::oneshot;
use tracing::{debug, info, warn};

/// Stage of a creation request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CreationStage {
    Received,
    Validating,
    Selecting,
    Persisting,
    Completed,
}

/// Per-ledger settings that do not affect placement.
#[derive(Debug, Clone, Default)]
pub struct CreateOptions {
    pub digest_type: DigestType,
    /// Ledger password. Only its hash is persisted.
    pub password: Vec<u8>,
    pub custom_metadata: CustomMetadata,
}

impl CreateOptions {
    pub fn new(digest_type: DigestType, password: impl Into<Vec<u8>>) -> Self {
        Self {
            digest_type,
            password: password.into(),
            custom_metadata: CustomMetadata::new(),
        }
    }

    /// Attach an application-defined metadata entry.
    pub fn with_custom(mut self, key: impl Into<String>, value: impl Into<Vec<u8>>) -> Self {
        self.custom_metadata.insert(key.into(), value.into());
        self
    }
}

/// Drives creation requests through validation, ensemble selection and
/// metadata persistence.
///
/// The coordinator holds no per-request state; concurrent requests only
/// share the placement engine, the id allocator and the session flag.
pub struct LedgerCreationCoordinator {
    registry: Arc<dyn BookieRegistry>,
    placement: Arc<PlacementEngine>,
    store: LedgerMetadataStore,
    session: ClientSession,
    stats: ClientStats,
    next_request: AtomicU64,
}

impl LedgerCreationCoordinator {
    pub fn new(
        registry: Arc<dyn BookieRegistry>,
        placement: Arc<PlacementEngine>,
        store: LedgerMetadataStore,
        session: ClientSession,
    ) -> Self {
        Self {
            registry,
            placement,
            store,
            session,
            stats: ClientStats::default(),
            next_request: AtomicU64::new(0),
        }
    }

    pub fn registry(&self) -> &Arc<dyn BookieRegistry> {
        &self.registry
    }

    pub fn store(&self) -> &LedgerMetadataStore {
        &self.store
    }

    pub fn session(&self) -> &ClientSession {
        &self.session
    }

    pub fn stats(&self) -> &ClientStats {
        &self.stats
    }

    /// Submit a creation request.
    ///
    /// # Errors
    ///
    /// Returns [`QuorumLogError::InvalidCapacity`] or
    /// [`QuorumLogError::QuorumOrderViolation`] for invalid parameters, and
    /// [`QuorumLogError::Internal`] when called outside a tokio runtime.
    /// Nothing is spawned in either case. All other failures are delivered
    /// through the returned [`PendingLedger`].
    pub fn submit(
        self: &Arc<Self>,
        config: ReplicationConfig,
        options: CreateOptions,
    ) -> Result<PendingLedger> {
        let request_id = self.next_request.fetch_add(1, Ordering::Relaxed);
        debug!(request_id, stage = ?CreationStage::Received, %config, "Ledger creation requested");

        debug!(request_id, stage = ?CreationStage::Validating, "Validating replication parameters");
        if let Err(e) = validation::validate(&config) {
            warn!(request_id, %config, error = %e, "Rejected ledger creation request");
            self.stats.record_rejected();
            observability::record_create_rejected(e.code());
            return Err(e);
        }

        if self.session.is_closed() {
            debug!(request_id, "Client closed, failing request without side effects");
            self.stats.record_accepted();
            let err = QuorumLogError::ClientClosed;
            self.finish(request_id, Err(&err), Instant::now());
            return Ok(PendingLedger::resolved(Err(err)));
        }

        let runtime = Handle::try_current().map_err(|_| {
            QuorumLogError::Internal("ledger creation requires a tokio runtime".to_string())
        })?;

        self.stats.record_accepted();

        let (tx, rx) = oneshot::channel();
        let coordinator = Arc::clone(self);
        runtime.spawn(async move {
            let started = Instant::now();
            let result = coordinator.execute(request_id, config, options).await;
            coordinator.finish(request_id, result.as_ref().map(|_| ()), started);
            // Receiver may have been dropped; the outcome is discarded then.
            let _ = tx.send(result);
        });

        Ok(PendingLedger::new(rx))
    }

    #[tracing::instrument(
        name = "create_ledger",
        skip_all,
        fields(request_id = request_id, config = %config)
    )]
    async fn execute(
        &self,
        request_id: u64,
        config: ReplicationConfig,
        options: CreateOptions,
    ) -> Result<LedgerHandle> {
        debug!(stage = ?CreationStage::Selecting, "Selecting ensemble");
        let bookies = tokio::select! {
            biased;
            _ = self.session.wait_for_close() => return Err(QuorumLogError::ClientClosed),
            bookies = self.registry.available_bookies() => bookies?,
        };

        let ensemble = self
            .placement
            .choose_ensemble(&config, &bookies, &HashSet::new())?;
        observability::record_ensemble_size(ensemble.len());

        // Last point at which a close can still abort without side effects.
        if self.session.is_closed() {
            return Err(QuorumLogError::ClientClosed);
        }

        debug!(stage = ?CreationStage::Persisting, "Persisting ledger metadata");
        let id = self.store.allocate_id().await?;
        let metadata = self
            .store
            .create(
                id,
                config,
                ensemble,
                options.digest_type,
                &options.password,
                options.custom_metadata,
            )
            .await?;

        Ok(LedgerHandle::new(metadata))
    }

    fn finish(&self, request_id: u64, outcome: std::result::Result<(), &QuorumLogError>, started: Instant) {
        let elapsed = started.elapsed();
        let code = match outcome {
            Ok(()) => {
                info!(request_id, stage = ?CreationStage::Completed, elapsed = ?elapsed, "Ledger created");
                ResultCode::Ok
            }
            Err(e) => {
                warn!(
                    request_id,
                    stage = ?CreationStage::Completed,
                    code = e.code().as_i32(),
                    error = %e,
                    "Ledger creation failed"
                );
                e.code()
            }
        };

        self.stats.record_outcome(outcome, elapsed);
        observability::record_create_outcome(code, elapsed);
    }
}

impl std::fmt::Debug for LedgerCreationCoordinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LedgerCreationCoordinator")
            .field("placement", &self.placement)
            .field("session", &self.session)
            .finish()
    }
}
