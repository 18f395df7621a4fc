//! Error helpers for verwatch-engine

use verwatch_core::errors::{ExError, ExErrorKind, WatchError};

pub use verwatch_core::errors::Result;

/// Create a configuration error
pub fn config_error(reason: impl Into<String>) -> ExError {
    ExError::from(WatchError::InvalidConfig {
        reason: reason.into(),
    })
    .with_op("load_config")
}

/// Create an error for a webhook the endpoint rejected
pub fn delivery_error(endpoint: &str, status: reqwest::StatusCode, body: &str) -> ExError {
    ExError::new(ExErrorKind::Delivery)
        .with_op("deliver_webhook")
        .with_message(format!(
            "endpoint '{}' answered {}: {}",
            endpoint,
            status,
            body.trim()
        ))
}

/// Create an error for an endpoint that is still rate limiting after a retry
pub fn rate_limited(endpoint: &str) -> ExError {
    ExError::new(ExErrorKind::RateLimited)
        .with_op("deliver_webhook")
        .with_message(format!("endpoint '{}' is still rate limited", endpoint))
}

/// Create an error for a failed HTTP exchange with an endpoint
///
/// The url is stripped since webhook urls carry their token.
pub fn transport_error(endpoint: &str, err: reqwest::Error) -> ExError {
    let kind = if err.is_timeout() {
        ExErrorKind::Timeout
    } else {
        ExErrorKind::Delivery
    };
    ExError::new(kind)
        .with_op("deliver_webhook")
        .with_message(format!("endpoint '{}': {}", endpoint, err.without_url()))
}
