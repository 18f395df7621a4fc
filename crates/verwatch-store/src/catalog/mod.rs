//! Catalog and descriptor retrieval
//!
//! Both sources read through the on-disk cache described by
//! [`CacheLayout`](crate::cache::CacheLayout).

mod descriptor_source;
mod fetcher;
pub mod schema;

pub use descriptor_source::HttpDescriptorSource;
pub use fetcher::{freshness_token, CatalogFetcher};
pub use schema::{hash_from_url, parse_catalog, parse_descriptor};
