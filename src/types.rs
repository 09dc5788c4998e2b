//! Core type definitions for quorumlog.
//!
//! This module contains the data types shared by the validator, the ensemble
//! placement engine, the metadata store and the client.
//!
//! # Key Types
//!
//! - [`ReplicationConfig`]: ensemble, write quorum and ack quorum sizes
//! - [`BookieId`]: opaque address of a storage node
//! - [`LedgerMetadata`]: the persisted description of a ledger
//! - [`DigestType`]: entry checksum scheme chosen at creation
//!
//! # Type Aliases
//!
//! - [`LedgerId`] = `u64`: ledger identifier, allocated once and never reused
//! - [`CustomMetadata`] = `BTreeMap<String, Vec<u8>>`: caller-supplied tags
//!
//! # Examples
//!
//! ```rust
//! use quorumlog::types::{BookieId, ReplicationConfig};
//!
//! let config = ReplicationConfig::new(3, 2, 2);
//! assert_eq!(config.ensemble_size, 3);
//!
//! let bookie = BookieId::new("10.0.0.1:3181");
//! assert_eq!(bookie.to_string(), "10.0.0.1:3181");
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Unique identifier for a ledger.
pub type LedgerId = u64;

/// Caller-supplied key/value tags stored alongside a ledger.
pub type CustomMetadata = BTreeMap<String, Vec<u8>>;

/// Address of a storage node ("bookie").
///
/// The identifier is opaque to this crate; it is whatever the bookie registry
/// hands out, conventionally `host:port`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct BookieId(String);

impl BookieId {
    pub fn new(addr: impl Into<String>) -> Self {
        Self(addr.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for BookieId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for BookieId {
    fn from(addr: &str) -> Self {
        Self::new(addr)
    }
}

/// Availability of a bookie for new ensembles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BookieStatus {
    /// Accepting new ledgers.
    Writable,
    /// Serving reads only; never chosen for a new ensemble.
    ReadOnly,
    Offline,
}

/// A bookie as known to the registry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookieInfo {
    pub id: BookieId,
    /// Failure domain, used by rack-aware placement.
    pub rack: Option<String>,
    pub status: BookieStatus,
}

impl BookieInfo {
    pub fn writable(id: impl Into<String>) -> Self {
        Self {
            id: BookieId::new(id),
            rack: None,
            status: BookieStatus::Writable,
        }
    }

    pub fn with_rack(mut self, rack: impl Into<String>) -> Self {
        self.rack = Some(rack.into());
        self
    }

    pub fn is_writable(&self) -> bool {
        self.status == BookieStatus::Writable
    }
}

/// Replication parameters requested for a ledger.
///
/// Sizes are signed because callers may pass any integer; the validator is
/// responsible for rejecting the structurally invalid combinations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReplicationConfig {
    /// Number of bookies the ledger is striped across.
    pub ensemble_size: i32,
    /// Number of bookies each entry is written to.
    pub write_quorum_size: i32,
    /// Number of acknowledgements needed before a write is reported.
    pub ack_quorum_size: i32,
}

impl ReplicationConfig {
    pub const fn new(ensemble_size: i32, write_quorum_size: i32, ack_quorum_size: i32) -> Self {
        Self {
            ensemble_size,
            write_quorum_size,
            ack_quorum_size,
        }
    }

    /// Ensemble size as a count. Negative sizes map to zero; they never get
    /// this far because the validator rejects them.
    pub fn ensemble_len(&self) -> usize {
        usize::try_from(self.ensemble_size).unwrap_or(0)
    }
}

impl fmt::Display for ReplicationConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ensemble={} write_quorum={} ack_quorum={}",
            self.ensemble_size, self.write_quorum_size, self.ack_quorum_size
        )
    }
}

/// Checksum scheme used for ledger entries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum DigestType {
    #[default]
    Crc32,
    Crc32c,
    /// HMAC keyed with the ledger password.
    Mac,
    Dummy,
}

impl fmt::Display for DigestType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            DigestType::Crc32 => "crc32",
            DigestType::Crc32c => "crc32c",
            DigestType::Mac => "mac",
            DigestType::Dummy => "dummy",
        };
        f.write_str(name)
    }
}

impl FromStr for DigestType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crc32" => Ok(DigestType::Crc32),
            "crc32c" => Ok(DigestType::Crc32c),
            "mac" => Ok(DigestType::Mac),
            "dummy" => Ok(DigestType::Dummy),
            other => Err(format!("unknown digest type: {}", other)),
        }
    }
}

/// Lifecycle state of a ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LedgerState {
    Open,
    Closed,
    InRecovery,
}

/// Persisted description of a ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerMetadata {
    pub id: LedgerId,
    pub config: ReplicationConfig,
    /// Ordered bookie set; position matters for entry striping.
    pub ensemble: Vec<BookieId>,
    pub digest_type: DigestType,
    /// SHA-256 of the ledger password. The password itself is never stored.
    pub password_hash: Vec<u8>,
    pub state: LedgerState,
    pub ctime: DateTime<Utc>,
    #[serde(default)]
    pub custom_metadata: CustomMetadata,
}

impl LedgerMetadata {
    pub fn ensemble_size(&self) -> i32 {
        self.config.ensemble_size
    }

    pub fn write_quorum_size(&self) -> i32 {
        self.config.write_quorum_size
    }

    pub fn ack_quorum_size(&self) -> i32 {
        self.config.ack_quorum_size
    }

    pub fn is_closed(&self) -> bool {
        self.state == LedgerState::Closed
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_digest_type_parse() {
        assert_eq!("CRC32".parse::<DigestType>().unwrap(), DigestType::Crc32);
        assert_eq!("crc32c".parse::<DigestType>().unwrap(), DigestType::Crc32c);
        assert_eq!("mac".parse::<DigestType>().unwrap(), DigestType::Mac);
        assert!("sha1".parse::<DigestType>().is_err());
    }

    #[test]
    fn test_digest_type_display_round_trip() {
        for digest in [DigestType::Crc32, DigestType::Crc32c, DigestType::Mac, DigestType::Dummy] {
            assert_eq!(digest.to_string().parse::<DigestType>().unwrap(), digest);
        }
    }

    #[test]
    fn test_ensemble_len_clamps_negative() {
        assert_eq!(ReplicationConfig::new(5, 3, 2).ensemble_len(), 5);
        assert_eq!(ReplicationConfig::new(-1, 3, 2).ensemble_len(), 0);
    }

    #[test]
    fn test_bookie_info_writable() {
        let mut info = BookieInfo::writable("127.0.0.1:3181").with_rack("rack-a");
        assert!(info.is_writable());
        assert_eq!(info.rack.as_deref(), Some("rack-a"));

        info.status = BookieStatus::ReadOnly;
        assert!(!info.is_writable());
    }

    #[test]
    fn test_metadata_serde() {
        let metadata = LedgerMetadata {
            id: 42,
            config: ReplicationConfig::new(3, 2, 2),
            ensemble: vec!["a:1".into(), "b:1".into(), "c:1".into()],
            digest_type: DigestType::Crc32,
            password_hash: vec![1, 2, 3],
            state: LedgerState::Open,
            ctime: Utc::now(),
            custom_metadata: CustomMetadata::new(),
        };

        let bytes = serde_json::to_vec(&metadata).unwrap();
        let decoded: LedgerMetadata = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, metadata);
        assert_eq!(decoded.ensemble_size(), 3);
    }
}
