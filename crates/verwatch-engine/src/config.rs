//! Announcer configuration
//!
//! Loaded from a TOML or JSON file, then overlaid with `VERWATCH__*`
//! environment variables (`VERWATCH__POLL_INTERVAL_SECS=60`,
//! `VERWATCH__BATCH__COUNT_LIMIT=5`, ...).

use crate::errors::{config_error, Result};
use serde::Deserialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::{Path, PathBuf};
use std::time::Duration;
use verwatch_core::render::embed::MAX_FIELD_VALUE;
use verwatch_core::verwatch_core_types::Sensitive;
use verwatch_core::{BatchLimits, RenderOptions};

pub const DEFAULT_CATALOG_URL: &str =
    "https://launchermeta.mojang.com/mc/game/version_manifest.json";
pub const DEFAULT_POLL_INTERVAL_SECS: u64 = 30;
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;
pub const ENV_PREFIX: &str = "VERWATCH";

/// Tag selecting endpoints that receive operational notices
pub const ADMIN_TAG: &str = "admin";

#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    pub cache_dir: PathBuf,
    #[serde(default = "default_catalog_url")]
    pub catalog_url: String,
    #[serde(default = "default_poll_interval_secs")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_title_prefix")]
    pub title_prefix: String,
    /// Page linked from each report title, `{id}` is replaced by the entry id
    #[serde(default)]
    pub entry_url_format: Option<String>,
    #[serde(default)]
    pub link_buttons: bool,
    #[serde(default)]
    pub batch: BatchConfig,
    #[serde(default)]
    pub endpoints: BTreeMap<String, EndpointConfig>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BatchConfig {
    #[serde(default = "default_count_limit")]
    pub count_limit: usize,
    #[serde(default = "default_length_limit")]
    pub length_limit: usize,
    #[serde(default = "default_field_line_limit")]
    pub field_line_limit: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        let limits = BatchLimits::default();
        Self {
            count_limit: limits.count_limit,
            length_limit: limits.length_limit,
            field_line_limit: limits.field_line_limit,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct EndpointConfig {
    pub webhook_url: Sensitive<String>,
    /// Role ids mentioned when reports are delivered
    #[serde(default)]
    pub role_mentions: Vec<String>,
    #[serde(default)]
    pub tags: BTreeSet<String>,
}

impl EndpointConfig {
    /// Untagged sends (`None`) reach every endpoint
    pub fn is_tagged(&self, tag: Option<&str>) -> bool {
        match tag {
            None => true,
            Some(tag) => self.tags.contains(tag),
        }
    }
}

fn default_catalog_url() -> String {
    DEFAULT_CATALOG_URL.to_string()
}

fn default_poll_interval_secs() -> u64 {
    DEFAULT_POLL_INTERVAL_SECS
}

fn default_request_timeout_secs() -> u64 {
    DEFAULT_REQUEST_TIMEOUT_SECS
}

fn default_title_prefix() -> String {
    RenderOptions::default().title_prefix
}

fn default_count_limit() -> usize {
    BatchLimits::default().count_limit
}

fn default_length_limit() -> usize {
    BatchLimits::default().length_limit
}

fn default_field_line_limit() -> usize {
    BatchLimits::default().field_line_limit
}

fn is_http_url(url: &str) -> bool {
    url.starts_with("https://") || url.starts_with("http://")
}

impl WatchConfig {
    /// Load, overlay the environment, and validate
    ///
    /// # Errors
    ///
    /// - `Config`: unreadable file, wrong shape, or a failed validation rule
    pub fn load(path: &Path) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::from(path))
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| config_error(format!("{}: {}", path.display(), e)))?;

        let config: WatchConfig = settings
            .try_deserialize()
            .map_err(|e| config_error(format!("{}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// # Errors
    ///
    /// - `Config`: the first rule that does not hold
    pub fn validate(&self) -> Result<()> {
        if self.cache_dir.as_os_str().is_empty() {
            return Err(config_error("cache_dir must not be empty"));
        }
        if !is_http_url(&self.catalog_url) {
            return Err(config_error("catalog_url must be an http(s) url"));
        }
        if self.poll_interval_secs == 0 {
            return Err(config_error("poll_interval_secs must be positive"));
        }
        if self.request_timeout_secs == 0 {
            return Err(config_error("request_timeout_secs must be positive"));
        }
        if self.batch.count_limit == 0 || self.batch.length_limit == 0 {
            return Err(config_error("batch limits must be positive"));
        }
        if self.batch.field_line_limit == 0 || self.batch.field_line_limit > MAX_FIELD_VALUE {
            return Err(config_error(format!(
                "batch.field_line_limit must be between 1 and {}",
                MAX_FIELD_VALUE
            )));
        }
        if let Some(format) = &self.entry_url_format {
            if !is_http_url(format) {
                return Err(config_error("entry_url_format must be an http(s) url"));
            }
        }
        if self.endpoints.is_empty() {
            return Err(config_error("at least one endpoint must be configured"));
        }
        for (name, endpoint) in &self.endpoints {
            if !is_http_url(endpoint.webhook_url.expose()) {
                return Err(config_error(format!(
                    "endpoint '{}' webhook_url must be an http(s) url",
                    name
                )));
            }
        }
        Ok(())
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn render_options(&self) -> RenderOptions {
        RenderOptions {
            title_prefix: self.title_prefix.clone(),
            entry_url_format: self.entry_url_format.clone(),
            ..RenderOptions::default()
        }
    }

    pub fn batch_limits(&self) -> BatchLimits {
        BatchLimits {
            count_limit: self.batch.count_limit,
            length_limit: self.batch.length_limit,
            field_line_limit: self.batch.field_line_limit,
        }
    }

    /// Endpoints receiving a send with the given tag, in name order
    pub fn endpoints_tagged<'a>(
        &'a self,
        tag: Option<&'a str>,
    ) -> impl Iterator<Item = (&'a str, &'a EndpointConfig)> + 'a {
        self.endpoints
            .iter()
            .filter(move |(_, endpoint)| endpoint.is_tagged(tag))
            .map(|(name, endpoint)| (name.as_str(), endpoint))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use verwatch_core::ExErrorKind;

    fn parse(json: &str) -> WatchConfig {
        serde_json::from_str(json).unwrap()
    }

    fn minimal() -> WatchConfig {
        parse(
            r#"{
                "cache_dir": "/var/cache/verwatch",
                "endpoints": {
                    "main": {"webhook_url": "https://example.invalid/hook/1"},
                    "ops": {"webhook_url": "https://example.invalid/hook/2", "tags": ["admin"]}
                }
            }"#,
        )
    }

    #[test]
    fn test_defaults() {
        let config = minimal();
        assert_eq!(config.catalog_url, DEFAULT_CATALOG_URL);
        assert_eq!(config.poll_interval(), Duration::from_secs(30));
        assert_eq!(config.title_prefix, "Minecraft ");
        assert!(!config.link_buttons);
        assert_eq!(config.batch_limits(), BatchLimits::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_tag_filtering() {
        let config = minimal();
        let all: Vec<_> = config.endpoints_tagged(None).map(|(n, _)| n).collect();
        let admin: Vec<_> = config
            .endpoints_tagged(Some(ADMIN_TAG))
            .map(|(n, _)| n)
            .collect();
        assert_eq!(all, vec!["main", "ops"]);
        assert_eq!(admin, vec!["ops"]);
    }

    #[test]
    fn test_rejects_zero_interval() {
        let mut config = minimal();
        config.poll_interval_secs = 0;
        assert_eq!(config.validate().unwrap_err().kind(), ExErrorKind::Config);
    }

    #[test]
    fn test_rejects_oversized_field_line_limit() {
        let mut config = minimal();
        config.batch.field_line_limit = 2000;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_missing_endpoints() {
        let mut config = minimal();
        config.endpoints.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_rejects_non_http_webhook() {
        let config = parse(
            r#"{"cache_dir": "/tmp/x", "endpoints": {"main": {"webhook_url": "ftp://nope"}}}"#,
        );
        let err = config.validate().unwrap_err();
        assert!(err.message().contains("main"));
    }

    #[test]
    fn test_debug_redacts_webhook_url() {
        let config = minimal();
        let debug = format!("{:?}", config);
        assert!(!debug.contains("example.invalid/hook"));
        assert!(debug.contains("REDACTED"));
    }

    #[test]
    fn test_render_options() {
        let mut config = minimal();
        config.entry_url_format = Some("https://example.invalid/changes?ver={id}".to_string());
        let options = config.render_options();
        assert_eq!(options.footer_text, "Last updated");
        assert_eq!(options.entry_url_format.as_deref(), Some("https://example.invalid/changes?ver={id}"));
    }
}
