//! Command-line interface for quorumlog.

use crate::config::ObservabilityConfig;
use crate::types::DigestType;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Quorumlog - create ledgers on a quorum-replicated log store.
#[derive(Parser)]
#[command(name = "quorumlog")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Configuration file path
    #[arg(short, long, env = "QUORUMLOG_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error). Overrides the config file.
    #[arg(short, long, env = "QUORUMLOG_LOG_LEVEL")]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long)]
    pub json_logs: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Available commands.
#[derive(Subcommand)]
pub enum Commands {
    /// Create one or more ledgers against the configured bookies
    CreateLedger {
        /// Number of bookies the ledger is striped across
        #[arg(short, long, allow_negative_numbers = true, default_value_t = 3)]
        ensemble_size: i32,

        /// Number of bookies each entry is written to
        #[arg(short, long, allow_negative_numbers = true, default_value_t = 2)]
        write_quorum: i32,

        /// Acknowledgements required per entry
        #[arg(short, long, allow_negative_numbers = true, default_value_t = 2)]
        ack_quorum: i32,

        /// Entry digest (crc32, crc32c, mac, dummy)
        #[arg(short, long, default_value = "crc32")]
        digest: DigestType,

        /// Ledger password
        #[arg(short, long, env = "QUORUMLOG_PASSWORD", default_value = "")]
        password: String,

        /// Custom metadata entries (format: key=value)
        #[arg(long = "custom", value_parser = parse_custom)]
        custom: Vec<(String, String)>,

        /// Number of ledgers to create
        #[arg(short = 'n', long, default_value_t = 1)]
        count: u32,
    },

    /// List the configured bookies
    Bookies,

    /// Show version information
    Version,
}

impl Cli {
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Apply logging flags on top of the loaded configuration.
    /// Flags that were not given leave the file's values alone.
    pub fn apply_overrides(&self, observability: &mut ObservabilityConfig) {
        if let Some(level) = &self.log_level {
            observability.log_level = level.clone();
        }
        observability.json_logs |= self.json_logs;
    }
}

/// Parse a `key=value` metadata entry.
pub fn parse_custom(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.is_empty() => Ok((key.to_string(), value.to_string())),
        _ => Err(format!("expected key=value, got '{}'", s)),
    }
}
