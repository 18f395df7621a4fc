//! Shared HTTP client construction

use crate::errors::{http_error, Result};
use std::time::Duration;

/// User agent sent on every request
pub const USER_AGENT: &str = concat!("verwatch/", env!("CARGO_PKG_VERSION"));

/// Build the client shared by the catalog fetcher and descriptor source
///
/// # Errors
///
/// - `ExternalService`: the TLS backend could not be initialised
pub fn build_client(timeout: Duration) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(timeout)
        .build()
        .map_err(|e| http_error("build_http_client", e))
}
