//! Munin CLI
//!
//! Command-line interface for the Munin security log analytics engine.
//! Operates directly on a local archive tree, without going through the
//! API server.
//!
//! # Usage
//!
//! ```bash
//! munin --help
//! munin --data-root /var/ossec/logs/archives summary
//! munin search "failed password" --days 3
//! munin cleanup --days-to-keep 90
//! ```

#![deny(unsafe_code)]

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use engine::models::SearchField;
use engine::{EngineConfig, LogEngine};
use std::path::PathBuf;

/// Munin CLI - security log analytics command-line interface
#[derive(Parser)]
#[command(name = "munin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Root of the date-partitioned archive tree
    #[arg(
        short,
        long,
        env = "MUNIN_DATA_ROOT",
        default_value = "/var/ossec/logs/archives"
    )]
    data_root: PathBuf,

    /// Number of recent days to load before reporting
    #[arg(long, default_value_t = 7, global = true)]
    days: u32,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print a human-oriented summary of recent logs
    Summary,
    /// Print aggregate statistics as JSON
    Stats,
    /// Validate recent logs and print an integrity report
    Integrity,
    /// Reload recent days and report the outcome
    Reload,
    /// Remove archive partitions older than the retention horizon
    Cleanup {
        /// Retention horizon in days
        #[arg(long, default_value_t = 90)]
        days_to_keep: u32,
    },
    /// Search recent logs for a text fragment
    Search {
        /// The text to look for (case-insensitive)
        query: String,
        /// Comma-separated fields to scan (full_log, location, level,
        /// agent_name, decoder_name)
        #[arg(long)]
        fields: Option<String>,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn")),
        )
        .init();

    let cli = Cli::parse();
    let engine = LogEngine::new(EngineConfig::new(&cli.data_root));

    match cli.command {
        Some(Commands::Summary) => {
            reload(&engine, cli.days)?;
            print_json(&engine.summary())
        }
        Some(Commands::Stats) => {
            reload(&engine, cli.days)?;
            print_json(&engine.stats())
        }
        Some(Commands::Integrity) => {
            reload(&engine, cli.days)?;
            let report = engine.validate_integrity();
            print_json(&report)?;
            if !report.warnings.is_empty() {
                std::process::exit(1);
            }
            Ok(())
        }
        Some(Commands::Reload) => {
            let status = reload(&engine, cli.days)?;
            println!(
                "Reload {}: {} logs from {} ({})",
                status.state,
                status.logs_processed,
                cli.data_root.display(),
                status.message
            );
            Ok(())
        }
        Some(Commands::Cleanup { days_to_keep }) => {
            let report = engine
                .cleanup(Some(days_to_keep))
                .context("Cleanup failed")?;
            println!(
                "Removed {} file(s), freed {:.2} MB",
                report.files_removed, report.space_freed_mb
            );
            for error in &report.errors {
                eprintln!("warning: {error}");
            }
            Ok(())
        }
        Some(Commands::Search { query, fields }) => {
            reload(&engine, cli.days)?;
            let fields = fields
                .map(|raw| {
                    raw.split(',')
                        .map(str::trim)
                        .filter(|f| !f.is_empty())
                        .map(str::parse)
                        .collect::<Result<Vec<SearchField>, String>>()
                })
                .transpose()
                .map_err(|message| anyhow::anyhow!(message))?;
            let logs = engine.search(&query, fields.as_deref());
            println!("{} matching log(s)", logs.len());
            for log in &logs {
                println!("{}", serde_json::to_string(log)?);
            }
            Ok(())
        }
        None => {
            println!("Munin CLI v{}", env!("CARGO_PKG_VERSION"));
            println!("Use --help for usage information");
            Ok(())
        }
    }
}

fn reload(engine: &LogEngine, days: u32) -> Result<engine::models::ReloadStatus> {
    engine
        .reload_days(days, None, None)
        .with_context(|| format!("Failed to reload the last {days} day(s)"))
}

fn print_json<T: serde::Serialize>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
