//! Run command
//!
//! Usage: verwatch run --config <FILE> [--json-logs]

use super::load_config;
use clap::Args;
use std::path::PathBuf;
use verwatch_core::logging_facility::{init, Profile};
use verwatch_engine::{shutdown_signal, Announcer};

#[derive(Debug, Args)]
pub struct RunArgs {
    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Emit JSON logs instead of human-readable ones
    #[arg(long)]
    pub json_logs: bool,
}

/// Execute run command
pub async fn execute(args: RunArgs) -> anyhow::Result<()> {
    init(if args.json_logs {
        Profile::Production
    } else {
        Profile::Development
    });

    let config = load_config(&args.config)?;
    tracing::info!(
        endpoints = config.endpoints.len(),
        catalog_url = %config.catalog_url,
        "Configuration loaded"
    );

    let announcer = Announcer::from_config(&config)?;
    announcer.run(shutdown_signal()).await;
    Ok(())
}
