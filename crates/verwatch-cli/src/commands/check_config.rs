//! Check-config command
//!
//! Usage: verwatch check-config --config <FILE>

use super::load_config;
use clap::Args;
use std::path::PathBuf;
use verwatch_engine::WatchConfig;

#[derive(Debug, Args)]
pub struct CheckConfigArgs {
    /// Configuration file (TOML or JSON)
    #[arg(short, long)]
    pub config: PathBuf,
}

/// Execute check-config command
pub fn execute(args: CheckConfigArgs) -> anyhow::Result<()> {
    let config = load_config(&args.config)?;
    print!("{}", summary(&config));
    Ok(())
}

/// Human-readable overview; webhook urls stay redacted
fn summary(config: &WatchConfig) -> String {
    let mut out = String::new();
    out.push_str("✓ Configuration is valid\n");
    out.push_str(&format!("cache_dir: {}\n", config.cache_dir.display()));
    out.push_str(&format!("catalog_url: {}\n", config.catalog_url));
    out.push_str(&format!("poll_interval_secs: {}\n", config.poll_interval_secs));
    out.push_str(&format!("endpoints: {}\n", config.endpoints.len()));
    for (name, endpoint) in &config.endpoints {
        let tags: Vec<&str> = endpoint.tags.iter().map(String::as_str).collect();
        out.push_str(&format!(
            "  {}: {} roles=[{}] tags=[{}]\n",
            name,
            endpoint.webhook_url,
            endpoint.role_mentions.join(", "),
            tags.join(", ")
        ));
    }
    out
}
