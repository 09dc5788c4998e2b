//! Error types for quorumlog.
//!
//! This module provides a unified error type [`QuorumLogError`] for all ledger
//! creation operations, along with a convenient [`Result`] type alias and the
//! numeric [`ResultCode`] delivered to completion callbacks.
//!
//! # Error Categories
//!
//! - **Precondition**: structurally invalid replication parameters. These are
//!   caller bugs and are returned synchronously from the submit call.
//! - **Operational**: closed client, too few bookies, metadata backend failures.
//!   These depend on the environment and are only delivered via completion.
//! - **Configuration / internal**: config loading and unexpected conditions.
//!
//! # Example
//!
//! ```rust
//! use quorumlog::error::{QuorumLogError, ResultCode};
//!
//! let err = QuorumLogError::NotEnoughBookies { required: 7, available: 5 };
//! assert_eq!(err.code(), ResultCode::NotEnoughBookies);
//! assert!(!err.is_precondition());
//! ```

use crate::types::LedgerId;
use std::fmt;
use std::io;
use thiserror::Error;

/// Main error type for quorumlog operations.
#[derive(Error, Debug)]
pub enum QuorumLogError {
    // Precondition errors
    #[error("Illegal Capacity: {0}")]
    InvalidCapacity(i32),

    #[error("Write quorum must be larger than ack quorum (write quorum {write}, ack quorum {ack})")]
    QuorumOrderViolation { write: i32, ack: i32 },

    // Operational errors
    #[error("BookKeeper client is closed")]
    ClientClosed,

    #[error("Not enough non-faulty bookies available: need {required}, have {available}")]
    NotEnoughBookies { required: usize, available: usize },

    #[error("Metadata store unavailable: {0}")]
    MetadataUnavailable(String),

    #[error("Ledger already exists: {0}")]
    LedgerExists(LedgerId),

    #[error("No such ledger: {0}")]
    NoSuchLedger(LedgerId),

    // Configuration errors
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid configuration: {field}: {reason}")]
    InvalidConfig { field: String, reason: String },

    // Serialization errors
    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl QuorumLogError {
    /// Numeric code reported to completion callbacks.
    pub fn code(&self) -> ResultCode {
        match self {
            QuorumLogError::InvalidCapacity(_) | QuorumLogError::QuorumOrderViolation { .. } => {
                ResultCode::IncorrectParameter
            }
            QuorumLogError::ClientClosed => ResultCode::ClientClosed,
            QuorumLogError::NotEnoughBookies { .. } => ResultCode::NotEnoughBookies,
            QuorumLogError::MetadataUnavailable(_) => ResultCode::MetadataUnavailable,
            QuorumLogError::LedgerExists(_) => ResultCode::LedgerExists,
            QuorumLogError::NoSuchLedger(_) => ResultCode::NoSuchLedger,
            _ => ResultCode::UnexpectedCondition,
        }
    }

    /// Structural misuse that is surfaced synchronously, never via completion.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            QuorumLogError::InvalidCapacity(_) | QuorumLogError::QuorumOrderViolation { .. }
        )
    }

    /// Check if a caller may reasonably retry. The client itself never does.
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            QuorumLogError::NotEnoughBookies { .. } | QuorumLogError::MetadataUnavailable(_)
        )
    }
}

impl From<serde_json::Error> for QuorumLogError {
    fn from(e: serde_json::Error) -> Self {
        QuorumLogError::Serialization(e.to_string())
    }
}

/// Result type alias for quorumlog operations.
pub type Result<T> = std::result::Result<T, QuorumLogError>;

/// Status code passed to creation callbacks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum ResultCode {
    Ok = 0,
    NotEnoughBookies = -6,
    NoSuchLedger = -7,
    MetadataUnavailable = -9,
    IncorrectParameter = -14,
    ClientClosed = -19,
    LedgerExists = -20,
    UnexpectedCondition = -999,
}

impl ResultCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_ok(self) -> bool {
        self == ResultCode::Ok
    }

    /// Stable label used for log fields and metric tags.
    pub fn label(self) -> &'static str {
        match self {
            ResultCode::Ok => "ok",
            ResultCode::NotEnoughBookies => "not_enough_bookies",
            ResultCode::NoSuchLedger => "no_such_ledger",
            ResultCode::MetadataUnavailable => "metadata_unavailable",
            ResultCode::IncorrectParameter => "incorrect_parameter",
            ResultCode::ClientClosed => "client_closed",
            ResultCode::LedgerExists => "ledger_exists",
            ResultCode::UnexpectedCondition => "unexpected",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.label(), self.as_i32())
    }
}
