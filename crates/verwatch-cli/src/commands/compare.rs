//! Compare command
//!
//! Usage: verwatch compare <OLD> <NEW> --config <FILE> [--send]

use super::load_config;
use anyhow::bail;
use clap::Args;
use std::path::PathBuf;
use verwatch_core::diff::render_human_summary;
use verwatch_core::logging_facility::{init, Profile};
use verwatch_engine::Announcer;

#[derive(Debug, Args)]
pub struct CompareArgs {
    /// Baseline entry id
    pub old: String,

    /// Entry id to compare against the baseline
    pub new: String,

    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    pub config: PathBuf,

    /// Deliver the report to every endpoint instead of printing it
    #[arg(long)]
    pub send: bool,
}

/// Execute compare command
pub async fn execute(args: CompareArgs) -> anyhow::Result<()> {
    init(Profile::Development);

    let config = load_config(&args.config)?;
    let announcer = Announcer::from_config(&config)?;
    let report = announcer.compare_entries(&args.old, &args.new).await?;

    if !args.send {
        print!("{}", render_human_summary(&report));
        return Ok(());
    }

    let outcome = announcer.deliver_reports(vec![report]).await;
    if outcome.failed > 0 {
        bail!(
            "delivered to {} endpoint(s), {} failed",
            outcome.delivered,
            outcome.failed
        );
    }
    println!("✓ Delivered to {} endpoint(s)", outcome.delivered);
    Ok(())
}
