//! Canonical logging macros
//!
//! Every operation boundary logs `op` and `event`; failures also carry the
//! error code plus whatever entry and cycle context the [`ExError`] holds, so
//! a single line is enough to find the entry that broke a poll cycle.
//!
//! [`ExError`]: crate::errors::ExError

/// Log the start of an operation
///
/// # Example
///
/// ```
/// # use verwatch_core::log_op_start;
/// log_op_start!("compare");
/// log_op_start!("compare_single", old_id = "1.16.5", new_id = "1.17");
/// ```
#[macro_export]
macro_rules! log_op_start {
    ($op:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::verwatch_core_types::schema::EVENT_START,
            $($($field)*)?
        );
    };
}

/// Log the successful end of an operation
///
/// # Example
///
/// ```
/// # use verwatch_core::log_op_end;
/// log_op_end!("compare", duration_ms = 42, report_count = 3);
/// ```
#[macro_export]
macro_rules! log_op_end {
    ($op:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {
        tracing::info!(
            component = module_path!(),
            op = $op,
            event = $crate::verwatch_core_types::schema::EVENT_END,
            duration_ms = $duration,
            $($($field)*)?
        );
    };
}

/// Log an operation failure with the error's entry and cycle context
///
/// # Example
///
/// ```
/// # use verwatch_core::{log_op_error, errors::WatchError};
/// let err = WatchError::EntryNotFound { entry_id: "1.17".to_string() };
/// log_op_error!("compare_single", err, duration_ms = 10);
/// ```
#[macro_export]
macro_rules! log_op_error {
    ($op:expr, $err:expr, duration_ms = $duration:expr $(, $($field:tt)*)?) => {{
        let ex_err: $crate::errors::ExError = $err.into();
        tracing::error!(
            component = module_path!(),
            op = $op,
            event = $crate::verwatch_core_types::schema::EVENT_END_ERROR,
            duration_ms = $duration,
            err_kind = ?ex_err.kind(),
            err_code = ex_err.code(),
            entry_id = ex_err.entry_id(),
            cycle_id = ex_err.cycle_id().map(|id| id.as_str()),
            error = %ex_err,
            $($($field)*)?
        );
    }};
}

/// Log a non-fatal integrity anomaly for one catalog entry
///
/// Anomalies never abort a comparison; they are warnings tagged with the
/// anomaly name and the `IntegrityAnomaly` error code.
///
/// # Example
///
/// ```
/// # use verwatch_core::log_anomaly;
/// # use verwatch_core::verwatch_core_types::schema::ANOMALY_SHARED_ENTRY_MISSING;
/// log_anomaly!("1.17", ANOMALY_SHARED_ENTRY_MISSING, "Shared entry missing from one side");
/// log_anomaly!("1.17", ANOMALY_SHARED_ENTRY_MISSING, "Skipped", side = "old");
/// ```
#[macro_export]
macro_rules! log_anomaly {
    ($entry_id:expr, $anomaly:expr, $message:literal $(, $($field:tt)*)?) => {
        tracing::warn!(
            component = module_path!(),
            entry_id = $entry_id,
            anomaly = $anomaly,
            err_code = $crate::errors::ExErrorKind::IntegrityAnomaly.code(),
            $($($field)*,)?
            $message
        );
    };
}
