use thiserror::Error;
use verwatch_core_types::CycleId;

/// Result type alias using the structured error facility
pub type Result<T> = std::result::Result<T, ExError>;

// ========== Error Facility ==========

/// Canonical error kind taxonomy
///
/// Each kind maps to a stable error code that can be used for programmatic
/// error handling, testing, and log filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExErrorKind {
    // Structural/Validation
    InvalidInput,
    NotFound,
    DuplicateEntry,
    /// Text or collection exceeds a delivery limit (title, field, embed count...)
    LimitExceeded,
    /// A message component does not satisfy the rules of its variant
    InvalidComponent,

    // Diffing
    /// A descriptor could not be fetched (transport or cache failure)
    ResolutionFailure,
    /// Non-fatal inconsistency observed while generating reports
    IntegrityAnomaly,

    // Catalog parsing
    /// Catalog or descriptor bytes are not valid JSON of the expected shape
    InvalidManifest,
    /// A required catalog field (e.g. the content hash) is absent
    MissingField,

    // Delivery
    Delivery,
    RateLimited,

    // Integration/IO
    Config,
    Io,
    Serialization,
    ExternalService,
    Timeout,

    // Internal
    Internal,
}

impl ExErrorKind {
    /// Get the stable error code for this kind
    pub fn code(&self) -> &'static str {
        match self {
            ExErrorKind::InvalidInput => "ERR_INVALID_INPUT",
            ExErrorKind::NotFound => "ERR_NOT_FOUND",
            ExErrorKind::DuplicateEntry => "ERR_DUPLICATE_ENTRY",
            ExErrorKind::LimitExceeded => "ERR_LIMIT_EXCEEDED",
            ExErrorKind::InvalidComponent => "ERR_INVALID_COMPONENT",
            ExErrorKind::ResolutionFailure => "ERR_RESOLUTION_FAILURE",
            ExErrorKind::IntegrityAnomaly => "ERR_INTEGRITY_ANOMALY",
            ExErrorKind::InvalidManifest => "ERR_INVALID_MANIFEST",
            ExErrorKind::MissingField => "ERR_MISSING_FIELD",
            ExErrorKind::Delivery => "ERR_DELIVERY",
            ExErrorKind::RateLimited => "ERR_RATE_LIMITED",
            ExErrorKind::Config => "ERR_CONFIG",
            ExErrorKind::Io => "ERR_IO",
            ExErrorKind::Serialization => "ERR_SERIALIZATION",
            ExErrorKind::ExternalService => "ERR_EXTERNAL_SERVICE",
            ExErrorKind::Timeout => "ERR_TIMEOUT",
            ExErrorKind::Internal => "ERR_INTERNAL",
        }
    }

    /// Whether this kind means "no report could be produced for the entry"
    ///
    /// The diff engine treats a missing descriptor and a failed fetch the same way.
    pub fn is_unresolvable(&self) -> bool {
        matches!(
            self,
            ExErrorKind::NotFound | ExErrorKind::ResolutionFailure
        )
    }
}

/// Canonical structured error type
///
/// Carries classification fields for programmatic handling and context for
/// debugging. Cloneable so a single failed resolution can be handed to every
/// waiter of a shared lookup.
#[derive(Debug, Clone)]
pub struct ExError {
    kind: ExErrorKind,
    op: Option<String>,
    entry_id: Option<String>,
    cycle_id: Option<CycleId>,
    message: String,
    source: Option<Box<ExError>>,
}

impl ExError {
    /// Create a new error with the specified kind
    pub fn new(kind: ExErrorKind) -> Self {
        Self {
            kind,
            op: None,
            entry_id: None,
            cycle_id: None,
            message: String::new(),
            source: None,
        }
    }

    /// Add operation context
    pub fn with_op(mut self, op: impl Into<String>) -> Self {
        self.op = Some(op.into());
        self
    }

    /// Add catalog entry ID context
    pub fn with_entry_id(mut self, id: impl Into<String>) -> Self {
        self.entry_id = Some(id.into());
        self
    }

    /// Add poll cycle context
    pub fn with_cycle_id(mut self, cycle_id: CycleId) -> Self {
        self.cycle_id = Some(cycle_id);
        self
    }

    /// Add custom message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    /// Add source error
    pub fn with_source(mut self, source: ExError) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Get the error kind
    pub fn kind(&self) -> ExErrorKind {
        self.kind
    }

    /// Get the stable error code
    pub fn code(&self) -> &'static str {
        self.kind.code()
    }

    /// Get the operation context, if any
    pub fn op(&self) -> Option<&str> {
        self.op.as_deref()
    }

    /// Get the entry ID context, if any
    pub fn entry_id(&self) -> Option<&str> {
        self.entry_id.as_deref()
    }

    /// Get the poll cycle context, if any
    pub fn cycle_id(&self) -> Option<&CycleId> {
        self.cycle_id.as_ref()
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the source error, if any
    pub fn source_error(&self) -> Option<&ExError> {
        self.source.as_deref()
    }
}

impl std::fmt::Display for ExError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}]", self.code())?;
        if let Some(op) = &self.op {
            write!(f, " in operation '{}'", op)?;
        }
        if !self.message.is_empty() {
            write!(f, ": {}", self.message)?;
        }
        if let Some(entry_id) = &self.entry_id {
            write!(f, " (entry_id: {})", entry_id)?;
        }
        if let Some(cycle_id) = &self.cycle_id {
            write!(f, " (cycle_id: {})", cycle_id)?;
        }
        if let Some(source) = &self.source {
            write!(f, " <- {}", source)?;
        }
        Ok(())
    }
}

impl std::error::Error for ExError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_deref()
            .map(|s| s as &(dyn std::error::Error + 'static))
    }
}

// ========== End Error Facility ==========

/// Domain error taxonomy for catalog watching
#[derive(Error, Debug, Clone, PartialEq)]
pub enum WatchError {
    // ===== Catalog structure =====
    /// Entry id is not present in the snapshot
    #[error("Entry not found: {entry_id}")]
    EntryNotFound { entry_id: String },

    /// Entry id appears twice in one catalog document
    #[error("Duplicate entry in snapshot: {entry_id}")]
    DuplicateEntry { entry_id: String },

    /// A catalog entry has no content hash and none can be derived
    #[error("Entry {entry_id} has no content hash")]
    MissingContentHash { entry_id: String },

    // ===== Resolution =====
    /// The descriptor endpoint reported the document as absent
    #[error("Descriptor not found for entry {entry_id}")]
    DescriptorNotFound { entry_id: String },

    /// Fetching or parsing a descriptor failed
    #[error("Descriptor for entry {entry_id} is unavailable: {reason}")]
    DescriptorUnavailable { entry_id: String, reason: String },

    /// A spawned report task panicked or was cancelled
    #[error("Report task for entry {entry_id} did not complete: {reason}")]
    ReportTaskFailed { entry_id: String, reason: String },

    // ===== Rendering =====
    /// Text exceeds a delivery limit
    #[error("{what} must be no longer than {max} characters (got {actual})")]
    TextTooLong {
        what: &'static str,
        max: usize,
        actual: usize,
    },

    /// Collection exceeds a delivery limit
    #[error("{what} may contain no more than {max} items (got {actual})")]
    TooManyItems {
        what: &'static str,
        max: usize,
        actual: usize,
    },

    /// Message component violates the rules of its variant
    #[error("Invalid component: {reason}")]
    InvalidComponent { reason: String },

    /// Webhook payload has nothing to send
    #[error("Webhook payload must carry content or at least one embed")]
    EmptyPayload,

    // ===== Configuration =====
    #[error("Invalid configuration: {reason}")]
    InvalidConfig { reason: String },

    // ===== Serialization =====
    #[error("Serialization error: {message}")]
    Serialization { message: String },
}

/// Conversion from WatchError to ExError
impl From<WatchError> for ExError {
    fn from(err: WatchError) -> Self {
        match err {
            WatchError::EntryNotFound { entry_id } => ExError::new(ExErrorKind::NotFound)
                .with_entry_id(entry_id)
                .with_message("Entry not found in snapshot"),

            WatchError::DuplicateEntry { entry_id } => ExError::new(ExErrorKind::DuplicateEntry)
                .with_entry_id(entry_id)
                .with_message("Entry id appears more than once"),

            WatchError::MissingContentHash { entry_id } => {
                ExError::new(ExErrorKind::MissingField)
                    .with_entry_id(entry_id)
                    .with_message("Entry has no content hash")
            }

            WatchError::DescriptorNotFound { entry_id } => ExError::new(ExErrorKind::NotFound)
                .with_entry_id(entry_id)
                .with_message("Descriptor not found"),

            WatchError::DescriptorUnavailable { entry_id, reason } => {
                ExError::new(ExErrorKind::ResolutionFailure)
                    .with_entry_id(entry_id)
                    .with_message(reason)
            }

            WatchError::ReportTaskFailed { entry_id, reason } => {
                ExError::new(ExErrorKind::Internal)
                    .with_entry_id(entry_id)
                    .with_message(format!("Report task did not complete: {}", reason))
            }

            err @ WatchError::TextTooLong { .. } | err @ WatchError::TooManyItems { .. } => {
                ExError::new(ExErrorKind::LimitExceeded).with_message(err.to_string())
            }

            WatchError::InvalidComponent { reason } => {
                ExError::new(ExErrorKind::InvalidComponent).with_message(reason)
            }

            err @ WatchError::EmptyPayload => {
                ExError::new(ExErrorKind::InvalidInput).with_message(err.to_string())
            }

            WatchError::InvalidConfig { reason } => {
                ExError::new(ExErrorKind::Config).with_message(reason)
            }

            WatchError::Serialization { message } => {
                ExError::new(ExErrorKind::Serialization).with_message(message)
            }
        }
    }
}

/// Conversion from serde_json::Error to WatchError
impl From<serde_json::Error> for WatchError {
    fn from(err: serde_json::Error) -> Self {
        WatchError::Serialization {
            message: err.to_string(),
        }
    }
}
