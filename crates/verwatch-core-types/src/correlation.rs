//! Correlation types for poll-cycle tracking
//!
//! Every poll cycle gets a [`CycleId`] so that log lines emitted by
//! concurrently running report groups can be tied back to the cycle that
//! spawned them.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a single poll cycle or ad hoc comparison
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CycleId(String);

impl CycleId {
    /// Generate a new CycleId using UUIDv7 (time ordered)
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    /// Get the string representation
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Create from an existing string (for deserialization)
    pub fn from_string(s: String) -> Self {
        Self(s)
    }
}

impl Default for CycleId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CycleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Context carried through a poll cycle for correlation
#[derive(Debug, Clone)]
pub struct CycleContext {
    pub cycle_id: CycleId,
    pub started_at: DateTime<Utc>,
}

impl CycleContext {
    /// Create a new context with a fresh CycleId, stamped now
    pub fn new() -> Self {
        Self {
            cycle_id: CycleId::new(),
            started_at: Utc::now(),
        }
    }

    /// Create a context with an existing CycleId
    pub fn with_cycle_id(cycle_id: CycleId) -> Self {
        Self {
            cycle_id,
            started_at: Utc::now(),
        }
    }

    /// Milliseconds elapsed since the cycle started
    pub fn elapsed_ms(&self) -> i64 {
        (Utc::now() - self.started_at).num_milliseconds()
    }
}

impl Default for CycleContext {
    fn default() -> Self {
        Self::new()
    }
}
