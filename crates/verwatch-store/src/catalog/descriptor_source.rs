use crate::cache::{atomic_write, CacheLayout};
use crate::catalog::fetcher::read_optional;
use crate::catalog::schema::parse_descriptor;
use async_trait::async_trait;
use reqwest::StatusCode;
use verwatch_core::errors::{ExError, WatchError};
use verwatch_core::{DescriptorSource, EntryRef, MetadataDocument, Result};

/// Descriptor source backed by HTTP with a content-addressed disk cache
///
/// Cached files are keyed by content hash, so they never go stale.
#[derive(Debug, Clone)]
pub struct HttpDescriptorSource {
    client: reqwest::Client,
    layout: CacheLayout,
}

impl HttpDescriptorSource {
    pub fn new(client: reqwest::Client, layout: CacheLayout) -> Self {
        Self { client, layout }
    }

    async fn download(&self, entry: &EntryRef) -> Result<Vec<u8>> {
        let unavailable = |reason: String| {
            ExError::from(WatchError::DescriptorUnavailable {
                entry_id: entry.id.clone(),
                reason,
            })
            .with_op("fetch_descriptor")
        };

        let response = self
            .client
            .get(&entry.url)
            .send()
            .await
            .map_err(|e| unavailable(e.without_url().to_string()))?;

        match response.status() {
            StatusCode::OK => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| unavailable(e.without_url().to_string()))?;
                Ok(body.to_vec())
            }
            StatusCode::NOT_FOUND => Err(ExError::from(
                WatchError::DescriptorNotFound {
                    entry_id: entry.id.clone(),
                },
            )
            .with_op("fetch_descriptor")),
            status => Err(unavailable(format!("unexpected HTTP status {}", status))),
        }
    }
}

#[async_trait]
impl DescriptorSource for HttpDescriptorSource {
    async fn fetch(&self, entry: &EntryRef) -> Result<MetadataDocument> {
        let path = self.layout.descriptor_path(&entry.id, &entry.content_hash);

        match read_optional(&path).await {
            Ok(Some(bytes)) => match parse_descriptor(&bytes, &entry.id) {
                Ok(document) => return Ok(document),
                Err(e) => {
                    tracing::warn!(entry_id = %entry.id, error = %e, "Discarding unreadable cached descriptor");
                }
            },
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(entry_id = %entry.id, error = %e, "Descriptor cache unreadable, downloading");
            }
        }

        tracing::debug!(entry_id = %entry.id, "Downloading descriptor");
        let bytes = self.download(entry).await?;
        let document = parse_descriptor(&bytes, &entry.id).map_err(|e| {
            ExError::from(WatchError::DescriptorUnavailable {
                entry_id: entry.id.clone(),
                reason: "descriptor body is not a valid document".to_string(),
            })
            .with_op("fetch_descriptor")
            .with_source(e)
        })?;

        // A failed cache write never fails the resolution
        if let Err(e) = atomic_write(&path, &bytes).await {
            tracing::warn!(entry_id = %entry.id, error = %e, "Failed to cache descriptor");
        }
        Ok(document)
    }
}
