//! Memoizing resolver over a [`DescriptorSource`]

use super::{DescriptorResolver, DescriptorSource, SingleFlight};
use crate::errors::Result;
use crate::model::{EntryRef, MetadataDocument, Snapshot};
use async_trait::async_trait;
use std::sync::Arc;

/// Cache key: entry id plus content hash, so both sides of a modified entry
/// resolve to distinct documents
type DescriptorKey = (String, String);

pub struct CachingResolver<S> {
    source: S,
    cache: SingleFlight<DescriptorKey, Arc<MetadataDocument>>,
}

impl<S: DescriptorSource> CachingResolver<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            cache: SingleFlight::new(),
        }
    }

    /// Drop cached documents for entries no longer present in `snapshot`
    pub fn forget_except(&self, snapshot: &Snapshot) {
        self.cache.retain(|(id, hash)| {
            snapshot
                .get(id)
                .is_some_and(|entry| entry.content_hash == *hash)
        });
    }

    pub fn cached_len(&self) -> usize {
        self.cache.len()
    }
}

#[async_trait]
impl<S: DescriptorSource> DescriptorResolver for CachingResolver<S> {
    async fn resolve(&self, entry: &EntryRef) -> Result<Arc<MetadataDocument>> {
        let key = (entry.id.clone(), entry.content_hash.clone());
        self.cache
            .get_or_try_init(&key, || async {
                tracing::debug!(entry_id = %entry.id, "Resolving descriptor");
                let document = self.source.fetch(entry).await?;
                Ok(Arc::new(document))
            })
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::{ExError, ExErrorKind};
    use crate::resolver::MockDescriptorSource;
    use chrono::Utc;

    fn entry(id: &str, hash: &str) -> EntryRef {
        EntryRef::new(id, hash, Utc::now())
    }

    #[tokio::test]
    async fn test_completed_lookup_is_memoized() {
        let mut source = MockDescriptorSource::new();
        source
            .expect_fetch()
            .times(1)
            .returning(|_| Ok(MetadataDocument {
                assets_id: "1.17".into(),
                ..Default::default()
            }));

        let resolver = CachingResolver::new(source);
        let first = resolver.resolve(&entry("1.17", "a")).await.unwrap();
        let second = resolver.resolve(&entry("1.17", "a")).await.unwrap();
        assert!(Arc::ptr_eq(&first, &second));
    }

    #[tokio::test]
    async fn test_hash_is_part_of_the_key() {
        let mut source = MockDescriptorSource::new();
        source
            .expect_fetch()
            .times(2)
            .returning(|e| Ok(MetadataDocument {
                assets_id: e.content_hash.clone(),
                ..Default::default()
            }));

        let resolver = CachingResolver::new(source);
        let old = resolver.resolve(&entry("1.17", "a")).await.unwrap();
        let new = resolver.resolve(&entry("1.17", "b")).await.unwrap();
        assert_eq!(old.assets_id, "a");
        assert_eq!(new.assets_id, "b");
    }

    #[tokio::test]
    async fn test_not_found_propagates() {
        let mut source = MockDescriptorSource::new();
        source
            .expect_fetch()
            .returning(|e| Err(ExError::new(ExErrorKind::NotFound).with_entry_id(e.id.clone())));

        let resolver = CachingResolver::new(source);
        let err = resolver.resolve(&entry("missing", "a")).await.unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
        assert_eq!(err.entry_id(), Some("missing"));
    }

    #[tokio::test]
    async fn test_forget_except_prunes_stale_documents() {
        let mut source = MockDescriptorSource::new();
        source
            .expect_fetch()
            .returning(|_| Ok(MetadataDocument::default()));

        let resolver = CachingResolver::new(source);
        resolver.resolve(&entry("1.16", "a")).await.unwrap();
        resolver.resolve(&entry("1.17", "b")).await.unwrap();
        resolver.resolve(&entry("1.17", "old")).await.unwrap();
        assert_eq!(resolver.cached_len(), 3);

        let snapshot = Snapshot::new("etag", vec![entry("1.17", "b")]).unwrap();
        resolver.forget_except(&snapshot);
        assert_eq!(resolver.cached_len(), 1);
    }
}
