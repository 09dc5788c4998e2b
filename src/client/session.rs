//! Client session lifecycle.
//!
//! A [`ClientSession`] is the closed/open flag shared by a client and every
//! creation request it spawned. Closing is one-way and idempotent.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::watch;
use tracing::info;

/// Shared open/closed state of a client.
#[derive(Clone)]
pub struct ClientSession {
    /// Watch channel for waiting on close.
    closed_watch: watch::Receiver<bool>,
    /// Internal sender for watch channel.
    closed_watch_tx: Arc<watch::Sender<bool>>,
    /// Flag checked on the hot path.
    is_closed: Arc<AtomicBool>,
}

impl ClientSession {
    pub fn new() -> Self {
        let (closed_watch_tx, closed_watch) = watch::channel(false);

        Self {
            closed_watch,
            closed_watch_tx: Arc::new(closed_watch_tx),
            is_closed: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Check if the session has been closed.
    pub fn is_closed(&self) -> bool {
        self.is_closed.load(Ordering::SeqCst)
    }

    /// Close the session. Returns `true` only for the call that closed it.
    pub fn close(&self) -> bool {
        if self
            .is_closed
            .compare_exchange(false, true, Ordering::SeqCst, Ordering::SeqCst)
            .is_ok()
        {
            info!("Closing ledger client");
            let _ = self.closed_watch_tx.send(true);
            true
        } else {
            false
        }
    }

    /// Get a watch receiver for the closed flag.
    pub fn watch(&self) -> watch::Receiver<bool> {
        self.closed_watch.clone()
    }

    /// Wait until the session is closed (for use in `select!`).
    pub async fn wait_for_close(&self) {
        let mut rx = self.closed_watch.clone();
        while !*rx.borrow() {
            if rx.changed().await.is_err() {
                break;
            }
        }
    }
}

impl Default for ClientSession {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ClientSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientSession")
            .field("closed", &self.is_closed())
            .finish()
    }
}
