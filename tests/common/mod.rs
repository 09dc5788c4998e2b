//! Common test utilities for integration tests.

pub mod assertions;
pub mod fixtures;

// Re-export common types
pub use assertions::*;
pub use fixtures::*;

/// Password used by every test ledger.
pub const TEST_PASSWORD: &[u8] = b"test";

/// Size of the default bookie pool.
pub const DEFAULT_BOOKIES: usize = 5;
