// Test fixtures: bookie pools, instrumented collaborators and a client harness

use async_trait::async_trait;
use parking_lot::{Condvar, Mutex};
use quorumlog::client::LedgerClientBuilder;
use quorumlog::cluster::{BookieRegistry, StaticBookieRegistry};
use quorumlog::metadata::{MemoryMetadataBackend, MetadataBackend};
use quorumlog::{BookieInfo, LedgerClient, LedgerId, QuorumLogError, Result};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use std::io;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Notify;

/// Writable, rackless bookies named `bookie-<i>:3181`.
pub fn bookie_pool(count: usize) -> Vec<BookieInfo> {
    (0..count)
        .map(|i| BookieInfo::writable(format!("bookie-{}:3181", i)))
        .collect()
}

/// `racks * per_rack` writable bookies, shuffled with a fixed seed so that
/// registration order does not follow rack order.
pub fn racked_pool(racks: usize, per_rack: usize, seed: u64) -> Vec<BookieInfo> {
    let mut pool: Vec<_> = (0..racks)
        .flat_map(|r| {
            (0..per_rack).map(move |i| {
                BookieInfo::writable(format!("bookie-r{}-{}:3181", r, i))
                    .with_rack(format!("/rack-{}", r))
            })
        })
        .collect();
    pool.shuffle(&mut StdRng::seed_from_u64(seed));
    pool
}

/// Lets a test hold a collaborator call at its entry point.
#[derive(Default)]
pub struct Gate {
    entered: Notify,
    release: Notify,
}

impl Gate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    async fn pass(&self) {
        self.entered.notify_one();
        self.release.notified().await;
    }

    /// Wait until a call has reached the gate.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn release(&self) {
        self.release.notify_one();
    }
}

type LookupHook = Box<dyn Fn() + Send + Sync>;

/// Bookie registry that counts lookups.
pub struct CountingRegistry {
    inner: StaticBookieRegistry,
    calls: AtomicUsize,
    gate: Option<Arc<Gate>>,
    on_lookup: Option<LookupHook>,
}

impl CountingRegistry {
    pub fn new(bookies: usize) -> Self {
        Self::from_bookies(bookie_pool(bookies))
    }

    pub fn from_bookies(bookies: Vec<BookieInfo>) -> Self {
        let inner = StaticBookieRegistry::new();
        for bookie in bookies {
            inner.register(bookie);
        }
        Self {
            inner,
            calls: AtomicUsize::new(0),
            gate: None,
            on_lookup: None,
        }
    }

    /// Hold every lookup at `gate` until released.
    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Run `hook` inside every lookup, just before the bookies are returned.
    pub fn on_lookup(mut self, hook: impl Fn() + Send + Sync + 'static) -> Self {
        self.on_lookup = Some(Box::new(hook));
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &StaticBookieRegistry {
        &self.inner
    }
}

#[async_trait]
impl BookieRegistry for CountingRegistry {
    async fn available_bookies(&self) -> Result<Vec<BookieInfo>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        if let Some(hook) = &self.on_lookup {
            hook();
        }
        self.inner.available_bookies().await
    }
}

/// In-memory metadata backend that counts writes and can stall them.
pub struct CountingBackend {
    inner: MemoryMetadataBackend,
    puts: AtomicUsize,
    put_delay: Option<Duration>,
    gate: Option<Arc<Gate>>,
    refuse: Option<io::ErrorKind>,
}

impl CountingBackend {
    pub fn new() -> Self {
        Self {
            inner: MemoryMetadataBackend::new(),
            puts: AtomicUsize::new(0),
            put_delay: None,
            gate: None,
            refuse: None,
        }
    }

    /// Fail every write with an I/O error of `kind`.
    pub fn refusing(mut self, kind: io::ErrorKind) -> Self {
        self.refuse = Some(kind);
        self
    }

    /// Delay every write by `delay`.
    pub fn slow(mut self, delay: Duration) -> Self {
        self.put_delay = Some(delay);
        self
    }

    /// Hold every write at `gate` until released.
    pub fn gated(mut self, gate: Arc<Gate>) -> Self {
        self.gate = Some(gate);
        self
    }

    pub fn puts(&self) -> usize {
        self.puts.load(Ordering::SeqCst)
    }

    pub fn inner(&self) -> &MemoryMetadataBackend {
        &self.inner
    }
}

impl Default for CountingBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MetadataBackend for CountingBackend {
    async fn put_if_absent(&self, id: LedgerId, value: Vec<u8>) -> Result<()> {
        self.puts.fetch_add(1, Ordering::SeqCst);
        if let Some(gate) = &self.gate {
            gate.pass().await;
        }
        if let Some(delay) = self.put_delay {
            tokio::time::sleep(delay).await;
        }
        if let Some(kind) = self.refuse {
            return Err(QuorumLogError::Io(io::Error::new(kind, "metadata write refused")));
        }
        self.inner.put_if_absent(id, value).await
    }

    async fn get(&self, id: LedgerId) -> Result<Option<Vec<u8>>> {
        self.inner.get(id).await
    }
}

/// A client wired to instrumented collaborators.
pub struct TestCluster {
    pub client: LedgerClient,
    pub registry: Arc<CountingRegistry>,
    pub backend: Arc<CountingBackend>,
}

impl TestCluster {
    pub fn new(bookies: usize) -> Self {
        Self::with_parts(CountingRegistry::new(bookies), CountingBackend::new())
    }

    pub fn with_parts(registry: CountingRegistry, backend: CountingBackend) -> Self {
        Self::build(registry, backend, |builder| builder)
    }

    pub fn build(
        registry: CountingRegistry,
        backend: CountingBackend,
        configure: impl FnOnce(LedgerClientBuilder) -> LedgerClientBuilder,
    ) -> Self {
        let registry = Arc::new(registry);
        let backend = Arc::new(backend);

        let builder = LedgerClient::builder()
            .registry(Arc::clone(&registry))
            .metadata_backend(Arc::clone(&backend))
            .placement_seed(42);
        let client = configure(builder).build().expect("Failed to build client");

        Self {
            client,
            registry,
            backend,
        }
    }
}

/// One-shot completion slot a callback can fill and a plain thread can
/// block on, like waiting on the context object passed to the callback.
pub struct CompletionLatch<T> {
    slot: Mutex<Option<T>>,
    cv: Condvar,
    calls: AtomicUsize,
}

impl<T> CompletionLatch<T> {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            slot: Mutex::new(None),
            cv: Condvar::new(),
            calls: AtomicUsize::new(0),
        })
    }

    pub fn complete(&self, value: T) {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let mut slot = self.slot.lock();
        *slot = Some(value);
        self.cv.notify_all();
    }

    /// Block until completed, or `None` after `timeout`.
    pub fn wait(&self, timeout: Duration) -> Option<T> {
        let deadline = Instant::now() + timeout;
        let mut slot = self.slot.lock();
        while slot.is_none() {
            if self.cv.wait_until(&mut slot, deadline).timed_out() {
                break;
            }
        }
        slot.take()
    }

    /// Number of times the latch was completed.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}
