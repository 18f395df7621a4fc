//! Descriptor resolution
//!
//! [`DescriptorSource`] fetches one document with no memoization (network,
//! disk). [`CachingResolver`] wraps a source and guarantees at most one
//! in-flight fetch per entry, sharing the outcome with every concurrent
//! caller. The diff engine only sees [`DescriptorResolver`].

pub mod caching;
pub mod single_flight;

pub use caching::CachingResolver;
pub use single_flight::SingleFlight;

use crate::errors::Result;
use crate::model::{EntryRef, MetadataDocument};
use async_trait::async_trait;
use std::sync::Arc;

/// Memoizing, single-flight lookup of an entry's metadata document
#[async_trait]
pub trait DescriptorResolver: Send + Sync {
    /// # Errors
    ///
    /// - `NotFound`: the document does not exist
    /// - `ResolutionFailure`: transport or cache failure
    async fn resolve(&self, entry: &EntryRef) -> Result<Arc<MetadataDocument>>;
}

/// Raw fetch of one metadata document
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait DescriptorSource: Send + Sync {
    async fn fetch(&self, entry: &EntryRef) -> Result<MetadataDocument>;
}

#[async_trait]
impl<T: DescriptorSource + ?Sized> DescriptorSource for Arc<T> {
    async fn fetch(&self, entry: &EntryRef) -> Result<MetadataDocument> {
        (**self).fetch(entry).await
    }
}
