//! Quorumlog CLI - Main entry point.

use quorumlog::cli::{Cli, Commands};
use quorumlog::config::QuorumLogConfig;
use quorumlog::{observability, CreateOptions, ReplicationConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse_args();

    let mut config = match &cli.config {
        Some(path) => QuorumLogConfig::from_file(path)?,
        None => QuorumLogConfig::development(),
    };
    cli.apply_overrides(&mut config.observability);

    observability::init(&config.observability)?;

    match cli.command {
        Commands::CreateLedger {
            ensemble_size,
            write_quorum,
            ack_quorum,
            digest,
            password,
            custom,
            count,
        } => {
            let client = quorumlog::client_from_config(&config)?;
            let replication = ReplicationConfig::new(ensemble_size, write_quorum, ack_quorum);

            let mut options = CreateOptions::new(digest, password.into_bytes());
            for (key, value) in custom {
                options = options.with_custom(key, value.into_bytes());
            }

            let mut failures = 0u32;
            for _ in 0..count {
                // Parameter errors abort the whole run.
                let pending = client.create_ledger_with_options(replication, options.clone())?;
                match pending.await {
                    Ok(handle) => {
                        println!("{}", serde_json::to_string_pretty(handle.ledger_metadata())?);
                    }
                    Err(e) => {
                        eprintln!("Failed to create ledger: {} (code {})", e, e.code().as_i32());
                        failures += 1;
                    }
                }
            }

            let stats = client.stats();
            eprintln!(
                "Created {} of {} ledger(s), avg {}us",
                stats.created, count, stats.avg_latency_us
            );
            client.close();

            if failures > 0 {
                std::process::exit(1);
            }
        }

        Commands::Bookies => {
            let client = quorumlog::client_from_config(&config)?;
            let status = client.cluster_status().await?;

            for bookie in config.bookie_infos() {
                println!(
                    "{:<24} {:<16} {:?}",
                    bookie.id.as_str(),
                    bookie.rack.as_deref().unwrap_or(quorumlog::cluster::DEFAULT_RACK),
                    bookie.status
                );
            }
            println!(
                "Writable: {}  Read-only: {}  Offline: {}",
                status.writable_bookies, status.read_only_bookies, status.offline_bookies
            );
        }

        Commands::Version => {
            println!("Quorumlog v{}", env!("CARGO_PKG_VERSION"));
            println!("Ledger creation client for a quorum-replicated log store");
        }
    }

    Ok(())
}
