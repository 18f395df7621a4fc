//! Logging initialization module
//!
//! Provides a single initialization point for the logging facility.

use std::sync::Once;
use tracing_subscriber::{util::SubscriberInitExt, EnvFilter};

/// Logging profile configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Profile {
    /// Human-readable output for development
    Development,
    /// JSON structured output for production
    Production,
    /// Test capture mode for deterministic testing
    Test,
}

static INIT_ONCE: Once = Once::new();

/// Initialize the logging facility
///
/// Call once at process startup. `RUST_LOG` overrides the default filter.
/// Output goes to stderr so command output on stdout stays clean.
///
/// # Profiles
///
/// - **Development**: Human-readable logs, `verwatch=debug`
/// - **Production**: JSON structured logs, `verwatch=info`
/// - **Test**: no-op registry; use `init_test_capture()` to assert on events
///
/// # Example
///
/// ```
/// use verwatch_core::logging_facility::{init, Profile};
///
/// init(Profile::Development);
/// ```
pub fn init(profile: Profile) {
    INIT_ONCE.call_once(|| match profile {
        Profile::Development => {
            tracing_subscriber::fmt()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new(default_filter("debug"))),
                )
                .init();
        }
        Profile::Production => {
            tracing_subscriber::fmt()
                .json()
                .with_writer(std::io::stderr)
                .with_env_filter(
                    EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| EnvFilter::new(default_filter("info"))),
                )
                .init();
        }
        Profile::Test => {
            // test_capture may already own the global subscriber
            let _ = tracing_subscriber::registry().try_init();
        }
    });
}

/// Directive enabling `level` for every verwatch crate
fn default_filter(level: &str) -> String {
    [
        "verwatch",
        "verwatch_core",
        "verwatch_store",
        "verwatch_engine",
    ]
    .iter()
    .map(|target| format!("{}={}", target, level))
    .collect::<Vec<_>>()
    .join(",")
}
