//! Observability module for quorumlog.
//!
//! Provides logging setup and the metrics recorded by ledger creation.

use crate::config::ObservabilityConfig;
use crate::error::{QuorumLogError, ResultCode, Result};
use metrics::{counter, histogram};
use std::time::Duration;
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Initialize logging.
pub fn init(config: &ObservabilityConfig) -> Result<()> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.log_level));

    let subscriber = tracing_subscriber::registry().with(filter);

    if config.json_logs {
        subscriber
            .with(fmt::layer().json())
            .try_init()
            .map_err(|e| QuorumLogError::Internal(format!("Failed to init logging: {}", e)))?;
    } else {
        subscriber
            .with(fmt::layer().with_writer(std::io::stderr))
            .try_init()
            .map_err(|e| QuorumLogError::Internal(format!("Failed to init logging: {}", e)))?;
    }

    info!("Observability initialized");
    Ok(())
}

/// Record the terminal outcome of a creation request.
pub fn record_create_outcome(code: ResultCode, elapsed: Duration) {
    counter!("quorumlog_ledger_create_total", "outcome" => code.label()).increment(1);
    histogram!("quorumlog_ledger_create_seconds", "outcome" => code.label())
        .record(elapsed.as_secs_f64());
}

/// Record a request rejected before any work started.
pub fn record_create_rejected(code: ResultCode) {
    counter!("quorumlog_ledger_create_rejected_total", "reason" => code.label()).increment(1);
}

/// Record the size of a chosen ensemble.
pub fn record_ensemble_size(size: usize) {
    histogram!("quorumlog_ensemble_size").record(size as f64);
}
