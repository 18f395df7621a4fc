//! Canonical schema constants for structured logging and events
//!
//! These constants ensure consistency across all logging and error reporting.

// Canonical field keys for structured logging
pub const FIELD_COMPONENT: &str = "component";
pub const FIELD_OP: &str = "op";
pub const FIELD_EVENT: &str = "event";
pub const FIELD_DURATION_MS: &str = "duration_ms";
pub const FIELD_CYCLE_ID: &str = "cycle_id";

// Entity identifiers
pub const FIELD_ENTRY_ID: &str = "entry_id";
pub const FIELD_ENDPOINT: &str = "endpoint";

// Anomaly reporting
pub const FIELD_ANOMALY: &str = "anomaly";
pub const ANOMALY_SHARED_ENTRY_MISSING: &str = "shared_entry_missing";
pub const ANOMALY_EMPTY_SECTION_FIELDS: &str = "empty_section_fields";

// Collection sizes
pub const FIELD_REPORT_COUNT: &str = "report_count";
pub const FIELD_BATCH_COUNT: &str = "batch_count";

// Error fields
pub const FIELD_ERR_KIND: &str = "err_kind";
pub const FIELD_ERR_CODE: &str = "err_code";

// Canonical event names
pub const EVENT_START: &str = "start";
pub const EVENT_END: &str = "end";
pub const EVENT_END_ERROR: &str = "end_error";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_constants_accessibility() {
        assert!(!FIELD_COMPONENT.is_empty());
        assert!(!FIELD_OP.is_empty());
        assert!(!FIELD_CYCLE_ID.is_empty());
        assert!(!EVENT_START.is_empty());
        assert!(!EVENT_END.is_empty());
        assert!(!EVENT_END_ERROR.is_empty());
    }

    #[test]
    fn test_event_names_are_distinct() {
        assert_ne!(EVENT_START, EVENT_END);
        assert_ne!(EVENT_START, EVENT_END_ERROR);
        assert_ne!(EVENT_END, EVENT_END_ERROR);
    }

    #[test]
    fn test_anomaly_names_are_distinct() {
        assert_ne!(ANOMALY_SHARED_ENTRY_MISSING, ANOMALY_EMPTY_SECTION_FIELDS);
    }
}
