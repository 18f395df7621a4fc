//! CLI commands

pub mod check_config;
pub mod compare;
pub mod run;

use anyhow::Context;
use std::path::Path;
use verwatch_engine::WatchConfig;

/// Load and validate the configuration file
fn load_config(path: &Path) -> anyhow::Result<WatchConfig> {
    WatchConfig::load(path).with_context(|| format!("loading {}", path.display()))
}
