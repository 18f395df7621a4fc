//! Catalog and descriptor store for verwatch
//!
//! Fetches the catalog index and per-entry descriptors over HTTP and keeps
//! them in an on-disk cache so restarts do not re-download unchanged data.

pub mod cache;
pub mod catalog;
pub mod errors;
pub mod http;

pub use cache::CacheLayout;
pub use catalog::{CatalogFetcher, HttpDescriptorSource};
pub use errors::Result;
pub use http::build_client;
