//! Ledger client.
//!
//! [`LedgerClient`] is the entry point for creating ledgers. It offers three
//! equivalent ways to observe a creation:
//!
//! - [`LedgerClient::create_ledger`]: await the outcome directly.
//! - [`LedgerClient::create_ledger_async`]: get a [`PendingLedger`] back
//!   immediately and await or poll it later.
//! - [`LedgerClient::async_create_ledger`]: hand over a completion callback
//!   and an opaque context value.
//!
//! In all three, invalid replication parameters are returned straight away
//! and every accepted request completes exactly once.

mod create;
mod handle;
mod session;
mod stats;

pub use create::{CreateOptions, CreationStage, LedgerCreationCoordinator};
pub use handle::{LedgerHandle, PendingLedger};
pub use session::ClientSession;
pub use stats::{ClientStats, ClientStatsSnapshot};

use crate::cluster::{BookieRegistry, ClusterStatus, PlacementEngine, PlacementStrategy};
use crate::config::ClientConfig;
use crate::error::{QuorumLogError, Result, ResultCode};
use crate::metadata::{
    AtomicIdAllocator, LedgerIdAllocator, LedgerMetadataStore, MemoryMetadataBackend,
    MetadataBackend, DEFAULT_WRITE_TIMEOUT,
};
use crate::types::{DigestType, LedgerId, LedgerMetadata, ReplicationConfig};
use std::sync::Arc;
use std::time::Duration;
use tokio::runtime::Handle;

/// Client for creating ledgers.
///
/// Cloning is cheap; clones share the session, so closing one closes all.
#[derive(Debug, Clone)]
pub struct LedgerClient {
    coordinator: Arc<LedgerCreationCoordinator>,
}

impl LedgerClient {
    /// Create a new client builder
    pub fn builder() -> LedgerClientBuilder {
        LedgerClientBuilder::new()
    }

    /// Submit a creation request and return without waiting for it.
    ///
    /// Sizes are taken as given; negative or inconsistent values are
    /// rejected here with [`QuorumLogError::InvalidCapacity`] or
    /// [`QuorumLogError::QuorumOrderViolation`].
    pub fn create_ledger_async(
        &self,
        ensemble_size: i32,
        write_quorum_size: i32,
        ack_quorum_size: i32,
        digest_type: DigestType,
        password: &[u8],
    ) -> Result<PendingLedger> {
        self.create_ledger_with_options(
            ReplicationConfig::new(ensemble_size, write_quorum_size, ack_quorum_size),
            CreateOptions::new(digest_type, password),
        )
    }

    /// Submit a creation request carrying custom metadata.
    pub fn create_ledger_with_options(
        &self,
        config: ReplicationConfig,
        options: CreateOptions,
    ) -> Result<PendingLedger> {
        self.coordinator.submit(config, options)
    }

    /// Create a ledger and wait for the outcome.
    pub async fn create_ledger(
        &self,
        ensemble_size: i32,
        write_quorum_size: i32,
        ack_quorum_size: i32,
        digest_type: DigestType,
        password: &[u8],
    ) -> Result<LedgerHandle> {
        self.create_ledger_async(
            ensemble_size,
            write_quorum_size,
            ack_quorum_size,
            digest_type,
            password,
        )?
        .await
    }

    /// Create a ledger and report the outcome through `callback`.
    ///
    /// Returns an error, without ever calling `callback`, if the parameters
    /// are invalid or no tokio runtime is running. Otherwise `callback` runs
    /// exactly once on a runtime worker, receiving [`ResultCode::Ok`] with
    /// the handle or a failure code with `None`, plus `ctx`.
    #[allow(clippy::too_many_arguments)]
    pub fn async_create_ledger<F, C>(
        &self,
        ensemble_size: i32,
        write_quorum_size: i32,
        ack_quorum_size: i32,
        digest_type: DigestType,
        password: &[u8],
        callback: F,
        ctx: C,
    ) -> Result<()>
    where
        F: FnOnce(ResultCode, Option<LedgerHandle>, C) + Send + 'static,
        C: Send + 'static,
    {
        // Checked before submitting so that nothing is counted for a request
        // whose callback could never run.
        let runtime = Handle::try_current().map_err(|_| {
            QuorumLogError::Internal("ledger creation requires a tokio runtime".to_string())
        })?;

        let pending = self.create_ledger_async(
            ensemble_size,
            write_quorum_size,
            ack_quorum_size,
            digest_type,
            password,
        )?;

        runtime.spawn(async move {
            match pending.await {
                Ok(handle) => callback(ResultCode::Ok, Some(handle), ctx),
                Err(e) => callback(e.code(), None, ctx),
            }
        });

        Ok(())
    }

    /// Read back the persisted metadata of a ledger.
    pub async fn ledger_metadata(&self, id: LedgerId) -> Result<LedgerMetadata> {
        if self.is_closed() {
            return Err(QuorumLogError::ClientClosed);
        }
        self.coordinator.store().read(id).await
    }

    /// Current state of the bookie pool.
    pub async fn cluster_status(&self) -> Result<ClusterStatus> {
        let bookies = self.coordinator.registry().available_bookies().await?;
        Ok(ClusterStatus::from_bookies(&bookies))
    }

    /// Close the client. Idempotent.
    ///
    /// Requests submitted afterwards fail with
    /// [`QuorumLogError::ClientClosed`]. In-flight requests that have not
    /// started persisting fail the same way; the rest complete normally.
    pub fn close(&self) {
        self.coordinator.session().close();
    }

    pub fn is_closed(&self) -> bool {
        self.coordinator.session().is_closed()
    }

    /// Snapshot of this client's creation counters.
    pub fn stats(&self) -> ClientStatsSnapshot {
        self.coordinator.stats().snapshot()
    }
}

/// Builder for [`LedgerClient`].
///
/// Only the bookie registry is required. The metadata backend defaults to
/// an in-memory one and ids start at zero.
pub struct LedgerClientBuilder {
    registry: Option<Arc<dyn BookieRegistry>>,
    backend: Option<Arc<dyn MetadataBackend>>,
    allocator: Option<Arc<dyn LedgerIdAllocator>>,
    placement: PlacementStrategy,
    placement_seed: Option<u64>,
    write_timeout: Duration,
    first_ledger_id: LedgerId,
}

impl LedgerClientBuilder {
    pub fn new() -> Self {
        Self {
            registry: None,
            backend: None,
            allocator: None,
            placement: PlacementStrategy::default(),
            placement_seed: None,
            write_timeout: DEFAULT_WRITE_TIMEOUT,
            first_ledger_id: 0,
        }
    }

    /// Apply the `client` section of a configuration file.
    pub fn config(mut self, config: &ClientConfig) -> Self {
        self.placement = config.placement;
        self.placement_seed = config.placement_seed;
        self.write_timeout = config.metadata_timeout;
        self.first_ledger_id = config.first_ledger_id;
        self
    }

    pub fn registry<R: BookieRegistry + 'static>(mut self, registry: Arc<R>) -> Self {
        self.registry = Some(registry);
        self
    }

    pub fn metadata_backend<B: MetadataBackend + 'static>(mut self, backend: Arc<B>) -> Self {
        self.backend = Some(backend);
        self
    }

    /// Use an external id allocator instead of the local counter.
    pub fn id_allocator<A: LedgerIdAllocator + 'static>(mut self, allocator: Arc<A>) -> Self {
        self.allocator = Some(allocator);
        self
    }

    pub fn placement(mut self, strategy: PlacementStrategy) -> Self {
        self.placement = strategy;
        self
    }

    /// Fix the placement seed, making ensemble choice reproducible.
    pub fn placement_seed(mut self, seed: u64) -> Self {
        self.placement_seed = Some(seed);
        self
    }

    pub fn metadata_timeout(mut self, timeout: Duration) -> Self {
        self.write_timeout = timeout;
        self
    }

    pub fn build(self) -> Result<LedgerClient> {
        let registry = self
            .registry
            .ok_or_else(|| QuorumLogError::Config("A bookie registry is required".into()))?;

        if self.write_timeout.is_zero() {
            return Err(QuorumLogError::InvalidConfig {
                field: "metadata_timeout".to_string(),
                reason: "Metadata timeout must be non-zero".to_string(),
            });
        }

        let backend = self
            .backend
            .unwrap_or_else(|| Arc::new(MemoryMetadataBackend::new()) as Arc<dyn MetadataBackend>);
        let allocator = self
            .allocator
            .unwrap_or_else(|| {
                Arc::new(AtomicIdAllocator::starting_at(self.first_ledger_id))
                    as Arc<dyn LedgerIdAllocator>
            });

        let placement = match self.placement_seed {
            Some(seed) => PlacementEngine::with_seed(self.placement, seed),
            None => PlacementEngine::new(self.placement),
        };

        let store = LedgerMetadataStore::new(backend, allocator).with_write_timeout(self.write_timeout);
        let coordinator = LedgerCreationCoordinator::new(
            registry,
            Arc::new(placement),
            store,
            ClientSession::new(),
        );

        Ok(LedgerClient {
            coordinator: Arc::new(coordinator),
        })
    }
}

impl Default for LedgerClientBuilder {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cluster::StaticBookieRegistry;
    use crate::types::BookieStatus;

    fn make_client(bookies: usize) -> (LedgerClient, Arc<StaticBookieRegistry>) {
        let registry = Arc::new(StaticBookieRegistry::with_bookies(
            (0..bookies).map(|i| format!("bookie-{}:3181", i)),
        ));
        let client = LedgerClient::builder()
            .registry(Arc::clone(&registry))
            .placement_seed(1)
            .build()
            .unwrap();
        (client, registry)
    }

    #[test]
    fn test_builder_requires_registry() {
        let err = LedgerClient::builder().build().unwrap_err();
        assert!(matches!(err, QuorumLogError::Config(_)));
    }

    #[test]
    fn test_builder_rejects_zero_timeout() {
        let err = LedgerClient::builder()
            .registry(Arc::new(StaticBookieRegistry::new()))
            .metadata_timeout(Duration::ZERO)
            .build()
            .unwrap_err();
        assert!(matches!(err, QuorumLogError::InvalidConfig { .. }));
    }

    #[tokio::test]
    async fn test_create_and_read_back() {
        let (client, _registry) = make_client(5);

        let handle = client
            .create_ledger(3, 3, 2, DigestType::Crc32, b"pw")
            .await
            .unwrap();
        let metadata = client.ledger_metadata(handle.id()).await.unwrap();
        assert_eq!(&metadata, handle.ledger_metadata());
        assert_eq!(client.stats().created, 1);
    }

    #[tokio::test]
    async fn test_builder_config_sets_first_id() {
        let config = ClientConfig {
            first_ledger_id: 100,
            ..ClientConfig::default()
        };
        let client = LedgerClient::builder()
            .config(&config)
            .registry(Arc::new(StaticBookieRegistry::with_bookies(["a:1"])))
            .build()
            .unwrap();

        let handle = client.create_ledger(1, 1, 1, DigestType::Crc32, b"").await.unwrap();
        assert_eq!(handle.id(), 100);
    }

    #[tokio::test]
    async fn test_callback_receives_context() {
        let (client, _registry) = make_client(3);
        let (tx, rx) = tokio::sync::oneshot::channel();

        client
            .async_create_ledger(
                3,
                2,
                2,
                DigestType::Mac,
                b"pw",
                |code, handle, ctx: &'static str| {
                    let _ = tx.send((code, handle.map(|h| h.id()), ctx));
                },
                "ctx-1",
            )
            .unwrap();

        let (code, id, ctx) = rx.await.unwrap();
        assert_eq!(code, ResultCode::Ok);
        assert!(id.is_some());
        assert_eq!(ctx, "ctx-1");
    }

    #[test]
    fn test_callback_without_runtime_is_not_counted() {
        let (client, _registry) = make_client(3);
        client.close();

        let called = Arc::new(std::sync::atomic::AtomicBool::new(false));
        let flag = Arc::clone(&called);
        let err = client
            .async_create_ledger(
                3,
                2,
                2,
                DigestType::Crc32,
                b"pw",
                move |_, _, _: ()| flag.store(true, std::sync::atomic::Ordering::SeqCst),
                (),
            )
            .unwrap_err();

        assert!(matches!(err, QuorumLogError::Internal(_)));
        assert!(!called.load(std::sync::atomic::Ordering::SeqCst));
        let stats = client.stats();
        assert_eq!(stats.accepted, 0);
        assert_eq!(stats.client_closed, 0);
    }

    #[tokio::test]
    async fn test_cluster_status() {
        let (client, registry) = make_client(4);
        registry.set_status(&"bookie-0:3181".into(), BookieStatus::ReadOnly);

        let status = client.cluster_status().await.unwrap();
        assert_eq!(status.writable_bookies, 3);
        assert_eq!(status.read_only_bookies, 1);
    }

    #[tokio::test]
    async fn test_close_is_shared_and_idempotent() {
        let (client, _registry) = make_client(3);
        let clone = client.clone();

        clone.close();
        clone.close();
        assert!(client.is_closed());
        assert!(matches!(
            client.ledger_metadata(0).await,
            Err(QuorumLogError::ClientClosed)
        ));
    }
}
