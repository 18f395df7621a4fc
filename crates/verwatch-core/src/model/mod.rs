//! Catalog data model
//!
//! - [`Snapshot`] / [`EntryRef`]: one fetch of the catalog index
//! - [`MetadataDocument`]: the full descriptor behind a single entry
//! - [`ChangeReport`]: one notification-ready difference

pub mod descriptor;
pub mod report;
pub mod snapshot;

pub use descriptor::{Coordinate, Download, Library, MetadataDocument, RuntimeVersion};
pub use report::{ChangeKind, ChangeReport, ChangeReportBuilder, Colour, Link, Section};
pub use snapshot::{EntryRef, Snapshot};
