//! verwatch core - catalog comparison and report batching
//!
//! This crate holds everything between two catalog snapshots and a sequence
//! of delivery-ready messages:
//! - Snapshot, descriptor and change report models
//! - Field-level differs and the diff engine
//! - Single-flight descriptor resolution
//! - Embed rendering and report batching
//!
//! Network access, configuration and delivery live in the store and engine
//! crates.

pub mod batch;
pub mod diff;
pub mod errors;
pub mod logging_facility;
pub mod model;
pub mod render;
pub mod resolver;

pub use verwatch_core_types;

// Re-export commonly used types
pub use batch::{batch, BatchLimits, DeliveryBatch, RenderedReport};
pub use diff::{DiffEngine, PendingReport};
pub use errors::{ExError, ExErrorKind, Result, WatchError};
pub use model::{ChangeKind, ChangeReport, EntryRef, MetadataDocument, Snapshot};
pub use render::RenderOptions;
pub use resolver::{CachingResolver, DescriptorResolver, DescriptorSource};
