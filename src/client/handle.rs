//! Ledger handles and pending creations.

use crate::error::{QuorumLogError, Result};
use crate::types::{LedgerId, LedgerMetadata};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::task::{Context, Poll};
use tokio::sync::oneshot;
use tokio::sync::oneshot::error::TryRecvError;

/// Handle to a created ledger.
///
/// The handle references the metadata; the metadata store stays the owner of
/// the persisted record.
#[derive(Debug, Clone)]
pub struct LedgerHandle {
    metadata: Arc<LedgerMetadata>,
}

impl LedgerHandle {
    pub(crate) fn new(metadata: LedgerMetadata) -> Self {
        Self {
            metadata: Arc::new(metadata),
        }
    }

    pub fn id(&self) -> LedgerId {
        self.metadata.id
    }

    pub fn ledger_metadata(&self) -> &LedgerMetadata {
        &self.metadata
    }

    pub fn shared_metadata(&self) -> Arc<LedgerMetadata> {
        Arc::clone(&self.metadata)
    }
}

/// Outcome of an accepted creation request.
///
/// Resolves exactly once, to the handle or to the operational error. It can
/// be awaited, polled with [`try_result`](Self::try_result), or waited on
/// from a non-async thread with [`wait_blocking`](Self::wait_blocking).
/// Dropping it does not cancel the request; the outcome is discarded.
#[derive(Debug)]
pub struct PendingLedger {
    rx: oneshot::Receiver<Result<LedgerHandle>>,
}

impl PendingLedger {
    pub(crate) fn new(rx: oneshot::Receiver<Result<LedgerHandle>>) -> Self {
        Self { rx }
    }

    /// A pending creation that has already resolved.
    pub(crate) fn resolved(result: Result<LedgerHandle>) -> Self {
        let (tx, rx) = oneshot::channel();
        let _ = tx.send(result);
        Self { rx }
    }

    /// Take the outcome if it is available. Returns `None` while the request
    /// is still in flight.
    ///
    /// The outcome is handed out once; later calls report an internal error.
    pub fn try_result(&mut self) -> Option<Result<LedgerHandle>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Closed) => Some(Err(dropped())),
        }
    }

    /// Block the current thread until the request resolves.
    ///
    /// Must not be called from inside an async runtime.
    pub fn wait_blocking(self) -> Result<LedgerHandle> {
        self.rx.blocking_recv().unwrap_or_else(|_| Err(dropped()))
    }
}

impl Future for PendingLedger {
    type Output = Result<LedgerHandle>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match Pin::new(&mut self.rx).poll(cx) {
            Poll::Ready(Ok(result)) => Poll::Ready(result),
            Poll::Ready(Err(_)) => Poll::Ready(Err(dropped())),
            Poll::Pending => Poll::Pending,
        }
    }
}

fn dropped() -> QuorumLogError {
    QuorumLogError::Internal("creation outcome already taken or task dropped".to_string())
}
