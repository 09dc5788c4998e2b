//! Quorumlog - ledger creation for a quorum-replicated, append-only log store.
//!
//! A ledger is an append-only log striped across an *ensemble* of storage
//! nodes ("bookies"). Each entry is written to `write_quorum` bookies and
//! acknowledged once `ack_quorum` of them have confirmed it. This crate
//! implements the creation handshake: validating the replication
//! parameters, choosing the ensemble and persisting the ledger's metadata.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  LedgerClient: create_ledger | callback API | PendingLedger │
//! ├─────────────────────────────────────────────────────────────┤
//! │  LedgerCreationCoordinator: validate -> select -> persist   │
//! ├──────────────────────────────┬──────────────────────────────┤
//! │  Cluster: registry,          │  Metadata: id allocation,    │
//! │  placement engine            │  create-only metadata store  │
//! └──────────────────────────────┴──────────────────────────────┘
//! ```
//!
//! # Quick Start
//!
//! ```no_run
//! use quorumlog::config::QuorumLogConfig;
//! use quorumlog::DigestType;
//!
//! #[tokio::main]
//! async fn main() -> quorumlog::Result<()> {
//!     let config = QuorumLogConfig::development();
//!     let client = quorumlog::client_from_config(&config)?;
//!
//!     let ledger = client.create_ledger(3, 2, 2, DigestType::Crc32, b"secret").await?;
//!     println!("created ledger {}", ledger.id());
//!
//!     client.close();
//!     Ok(())
//! }
//! ```

pub mod cli;
pub mod client;
pub mod cluster;
pub mod config;
pub mod error;
pub mod metadata;
pub mod observability;
pub mod types;
pub mod validation;

// Re-exports
pub use client::{CreateOptions, LedgerClient, LedgerHandle, PendingLedger};
pub use error::{QuorumLogError, Result, ResultCode};
pub use types::*;

use cluster::StaticBookieRegistry;
use config::QuorumLogConfig;
use std::sync::Arc;
use tracing::info;

/// Build a client over the bookies listed in `config`, backed by in-memory
/// metadata.
pub fn client_from_config(config: &QuorumLogConfig) -> Result<LedgerClient> {
    config.validate()?;

    let registry = StaticBookieRegistry::new();
    for bookie in config.bookie_infos() {
        registry.register(bookie);
    }

    info!(
        bookies = registry.len(),
        writable = registry.writable_count(),
        placement = ?config.client.placement,
        "Building ledger client"
    );

    LedgerClient::builder()
        .config(&config.client)
        .registry(Arc::new(registry))
        .build()
}
