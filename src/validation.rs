//! Structural validation of replication parameters.
//!
//! These checks run before any bookie selection or metadata write. Only two
//! shapes are rejected here, first violation wins:
//!
//! 1. a negative ensemble size ([`QuorumLogError::InvalidCapacity`])
//! 2. an ack quorum larger than the write quorum
//!    ([`QuorumLogError::QuorumOrderViolation`])
//!
//! Anything else, including zero or negative quorums and an ensemble smaller
//! than the write quorum, is left for ensemble selection to resolve.

use crate::error::{QuorumLogError, Result};
use crate::types::ReplicationConfig;

/// Validate a replication config.
pub fn validate(config: &ReplicationConfig) -> Result<()> {
    if config.ensemble_size < 0 {
        return Err(QuorumLogError::InvalidCapacity(config.ensemble_size));
    }

    if config.ack_quorum_size > config.write_quorum_size {
        return Err(QuorumLogError::QuorumOrderViolation {
            write: config.write_quorum_size,
            ack: config.ack_quorum_size,
        });
    }

    Ok(())
}
