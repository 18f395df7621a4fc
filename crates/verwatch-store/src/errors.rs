//! Error helpers for verwatch-store
//!
//! Wraps verwatch-core ExError with store-specific constructors

use verwatch_core::errors::{ExError, ExErrorKind, WatchError};

/// Result type alias using ExError
pub type Result<T> = std::result::Result<T, ExError>;

/// Create an IO error
pub fn io_error(operation: &str, err: std::io::Error) -> ExError {
    ExError::new(ExErrorKind::Io)
        .with_op(operation.to_string())
        .with_message(err.to_string())
}

/// Create an error from a failed HTTP exchange
pub fn http_error(operation: &str, err: reqwest::Error) -> ExError {
    let kind = if err.is_timeout() {
        ExErrorKind::Timeout
    } else {
        ExErrorKind::ExternalService
    };
    ExError::new(kind)
        .with_op(operation.to_string())
        .with_message(err.without_url().to_string())
}

/// Create an error for a status code the caller does not handle
pub fn unexpected_status(operation: &str, status: reqwest::StatusCode) -> ExError {
    ExError::new(ExErrorKind::ExternalService)
        .with_op(operation.to_string())
        .with_message(format!("unexpected HTTP status {}", status))
}

/// Create an error for an unparseable catalog or descriptor
pub fn invalid_manifest(operation: &str, reason: impl std::fmt::Display) -> ExError {
    ExError::new(ExErrorKind::InvalidManifest)
        .with_op(operation.to_string())
        .with_message(reason.to_string())
}

/// Create an error for a catalog entry with no usable content hash
pub fn missing_hash(entry_id: &str) -> ExError {
    ExError::from(WatchError::MissingContentHash {
        entry_id: entry_id.to_string(),
    })
    .with_op("parse_catalog")
}
