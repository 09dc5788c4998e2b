//! Configuration module for quorumlog.

use crate::cluster::PlacementStrategy;
use crate::error::{QuorumLogError, Result};
use crate::metadata::DEFAULT_WRITE_TIMEOUT;
use crate::types::{BookieInfo, BookieStatus};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Duration;

/// Main configuration for a quorumlog client.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct QuorumLogConfig {
    /// Ledger client configuration.
    #[serde(default)]
    pub client: ClientConfig,
    /// Statically known bookies.
    #[serde(default)]
    pub bookies: Vec<BookieConfig>,
    /// Observability configuration.
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl QuorumLogConfig {
    /// Load configuration from a file.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            QuorumLogError::Config(format!("Failed to read config file: {}", e))
        })?;

        let config: Self = serde_json::from_str(&content).map_err(|e| {
            QuorumLogError::Config(format!("Failed to parse config: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<()> {
        if self.client.metadata_timeout.is_zero() {
            return Err(QuorumLogError::InvalidConfig {
                field: "client.metadata_timeout".to_string(),
                reason: "Metadata timeout must be non-zero".to_string(),
            });
        }

        let mut seen = HashSet::new();
        for (i, bookie) in self.bookies.iter().enumerate() {
            if bookie.address.trim().is_empty() {
                return Err(QuorumLogError::InvalidConfig {
                    field: format!("bookies[{}].address", i),
                    reason: "Bookie address must not be empty".to_string(),
                });
            }
            if !seen.insert(bookie.address.as_str()) {
                return Err(QuorumLogError::InvalidConfig {
                    field: format!("bookies[{}].address", i),
                    reason: format!("Duplicate bookie address {}", bookie.address),
                });
            }
        }

        Ok(())
    }

    /// Create a development configuration with five local bookies.
    pub fn development() -> Self {
        Self {
            client: ClientConfig {
                placement: PlacementStrategy::RoundRobin,
                placement_seed: Some(0),
                metadata_timeout: Duration::from_secs(5),
                first_ledger_id: 0,
            },
            bookies: (0..5)
                .map(|i| BookieConfig {
                    address: format!("127.0.0.1:{}", 3181 + i),
                    rack: None,
                    read_only: false,
                })
                .collect(),
            observability: ObservabilityConfig::default(),
        }
    }

    /// Bookie descriptors for the registry.
    pub fn bookie_infos(&self) -> Vec<BookieInfo> {
        self.bookies.iter().map(BookieConfig::to_info).collect()
    }
}

/// Ledger client configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ClientConfig {
    /// Ensemble placement strategy.
    #[serde(default)]
    pub placement: PlacementStrategy,
    /// Fixed placement seed; random when unset.
    #[serde(default)]
    pub placement_seed: Option<u64>,
    /// Upper bound on one metadata write.
    #[serde(with = "humantime_serde", default = "default_metadata_timeout")]
    pub metadata_timeout: Duration,
    /// First ledger id handed out by the local allocator.
    #[serde(default)]
    pub first_ledger_id: u64,
}

fn default_metadata_timeout() -> Duration {
    DEFAULT_WRITE_TIMEOUT
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            placement: PlacementStrategy::default(),
            placement_seed: None,
            metadata_timeout: DEFAULT_WRITE_TIMEOUT,
            first_ledger_id: 0,
        }
    }
}

/// A statically configured bookie.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookieConfig {
    /// Bookie address (`host:port`).
    pub address: String,
    /// Failure domain.
    #[serde(default)]
    pub rack: Option<String>,
    /// Register the bookie as read-only.
    #[serde(default)]
    pub read_only: bool,
}

impl BookieConfig {
    pub fn to_info(&self) -> BookieInfo {
        let mut info = BookieInfo::writable(self.address.clone());
        info.rack = self.rack.clone();
        if self.read_only {
            info.status = BookieStatus::ReadOnly;
        }
        info
    }
}

/// Observability configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level.
    pub log_level: String,
    /// Enable JSON logging.
    pub json_logs: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            json_logs: false,
        }
    }
}

/// Serde helper for Duration using humantime format.
pub mod humantime_serde {
    use serde::{self, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&format!("{}ms", duration.as_millis()))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse_duration(&s).map_err(serde::de::Error::custom)
    }

    pub(crate) fn parse_duration(s: &str) -> Result<Duration, String> {
        let s = s.trim();
        if let Some(ms) = s.strip_suffix("ms") {
            ms.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| e.to_string())
        } else if let Some(s_val) = s.strip_suffix('s') {
            s_val
                .parse::<u64>()
                .map(Duration::from_secs)
                .map_err(|e| e.to_string())
        } else if let Some(m) = s.strip_suffix('m') {
            let minutes = m.parse::<u64>().map_err(|e| e.to_string())?;
            minutes
                .checked_mul(60)
                .map(Duration::from_secs)
                .ok_or_else(|| format!("duration '{}' is too large", s))
        } else {
            s.parse::<u64>()
                .map(Duration::from_millis)
                .map_err(|e| e.to_string())
        }
    }
}
