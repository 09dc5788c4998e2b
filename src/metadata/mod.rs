//! Ledger metadata service for quorumlog.
//!
//! This module owns ledger ids and the persisted [`LedgerMetadata`]
//! records. The consistent store behind it is abstracted by
//! [`MetadataBackend`]; ids come from a [`LedgerIdAllocator`].
//!
//! [`LedgerMetadata`]: crate::types::LedgerMetadata

// Panics in metadata operations can leave half-created ledgers behind.
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]

mod backend;
mod id;
mod store;

pub use backend::{MemoryMetadataBackend, MetadataBackend};
pub use id::{AtomicIdAllocator, LedgerIdAllocator};
pub use store::{hash_password, LedgerMetadataStore, DEFAULT_WRITE_TIMEOUT};
