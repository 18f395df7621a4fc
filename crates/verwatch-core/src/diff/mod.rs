//! Catalog diff engine.
//!
//! Compares two catalog snapshots and produces change reports, resolving the
//! metadata documents behind added and modified entries.
//!
//! ## Entry point
//!
//! ```ignore
//! use verwatch_core::diff::DiffEngine;
//!
//! let engine = DiffEngine::new(resolver);
//! for pending in engine.compare(&last, &next) {
//!     let report = pending.join().await?;
//! }
//! ```
//!
//! ## Guarantees
//!
//! - **No work on unchanged catalogs**: equal freshness tokens yield no reports.
//! - **Shared baseline**: every entry added in one cycle is diffed against the
//!   newest entry of the previous snapshot.
//! - **Hash-level detail** appears only in modified reports.
//! - **Isolation**: a failed resolution fails only the report that needed it.

pub mod engine;
pub mod fields;
pub mod human_summary;

pub use engine::{DiffEngine, PendingReport};
pub use human_summary::render_human_summary;
