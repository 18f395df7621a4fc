use crate::cache::{atomic_write, CacheLayout};
use crate::catalog::schema::parse_catalog;
use crate::errors::{http_error, io_error, unexpected_status, Result};
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::time::Instant;
use verwatch_core::{log_op_end, log_op_error, log_op_start, Snapshot};

/// Freshness token for a catalog body: its etag, or the SHA-256 of the bytes
pub fn freshness_token(etag: Option<&str>, body: &[u8]) -> String {
    match etag.filter(|e| !e.is_empty()) {
        Some(etag) => etag.to_string(),
        None => hex::encode(Sha256::digest(body)),
    }
}

/// Fetches the catalog index with conditional requests and a disk cache
#[derive(Debug, Clone)]
pub struct CatalogFetcher {
    client: reqwest::Client,
    catalog_url: String,
    layout: CacheLayout,
}

impl CatalogFetcher {
    pub fn new(client: reqwest::Client, catalog_url: impl Into<String>, layout: CacheLayout) -> Self {
        Self {
            client,
            catalog_url: catalog_url.into(),
            layout,
        }
    }

    pub fn catalog_url(&self) -> &str {
        &self.catalog_url
    }

    /// Fetch the current catalog snapshot
    ///
    /// With `trust_existing`, a cached manifest and etag are used as-is
    /// without touching the network.
    ///
    /// # Errors
    ///
    /// - `ExternalService` / `Timeout`: request failed or unexpected status
    /// - `Io`: the cache could not be read or written
    /// - `InvalidManifest` / `MissingField` / `DuplicateEntry`: bad catalog
    pub async fn fetch(&self, trust_existing: bool) -> Result<Snapshot> {
        log_op_start!("fetch_catalog", trust_existing = trust_existing);
        let start = Instant::now();

        let result = self.fetch_inner(trust_existing).await;
        let duration_ms = start.elapsed().as_millis() as u64;
        match &result {
            Ok(snapshot) => {
                log_op_end!(
                    "fetch_catalog",
                    duration_ms = duration_ms,
                    entry_count = snapshot.len() as u64
                );
            }
            Err(e) => {
                log_op_error!("fetch_catalog", e.clone(), duration_ms = duration_ms);
            }
        }
        result
    }

    async fn fetch_inner(&self, trust_existing: bool) -> Result<Snapshot> {
        let cached_etag = self.read_cached_etag().await?;

        if trust_existing && cached_etag.is_some() {
            if let Some(body) = self.read_cached_body().await? {
                tracing::debug!("Using cached catalog without revalidation");
                return parse_catalog(&body, &freshness_token(cached_etag.as_deref(), &body));
            }
        }

        let mut request = self
            .client
            .get(&self.catalog_url)
            .query(&[("t", chrono::Utc::now().timestamp_millis().to_string())]);
        if let Some(etag) = cached_etag.as_deref() {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let response = request
            .send()
            .await
            .map_err(|e| http_error("fetch_catalog", e))?;

        match response.status() {
            StatusCode::NOT_MODIFIED => match self.read_cached_body().await? {
                Some(body) => {
                    tracing::debug!("Catalog not modified");
                    parse_catalog(&body, &freshness_token(cached_etag.as_deref(), &body))
                }
                // 304 without a cached body: the cache was cleared under us
                None => Err(unexpected_status("fetch_catalog", StatusCode::NOT_MODIFIED)),
            },
            status if status.is_success() => {
                let etag = response
                    .headers()
                    .get(ETAG)
                    .and_then(|v| v.to_str().ok())
                    .map(str::to_string);
                let body = response
                    .bytes()
                    .await
                    .map_err(|e| http_error("fetch_catalog", e))?;

                // parse before caching so a broken body never replaces a good one
                let snapshot = parse_catalog(&body, &freshness_token(etag.as_deref(), &body))?;
                atomic_write(&self.layout.manifest_path(), &body).await?;
                match etag {
                    Some(etag) => atomic_write(&self.layout.etag_path(), etag.as_bytes()).await?,
                    None => self.remove_cached_etag().await?,
                }
                Ok(snapshot)
            }
            status => Err(unexpected_status("fetch_catalog", status)),
        }
    }

    async fn read_cached_etag(&self) -> Result<Option<String>> {
        Ok(read_optional(&self.layout.etag_path())
            .await?
            .and_then(|bytes| String::from_utf8(bytes).ok())
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty()))
    }

    async fn read_cached_body(&self) -> Result<Option<Vec<u8>>> {
        read_optional(&self.layout.manifest_path()).await
    }

    async fn remove_cached_etag(&self) -> Result<()> {
        match tokio::fs::remove_file(self.layout.etag_path()).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(io_error("remove_cached_etag", e)),
        }
    }
}

/// Read a cache file, treating absence as `None`
pub(crate) async fn read_optional(path: &std::path::Path) -> Result<Option<Vec<u8>>> {
    match tokio::fs::read(path).await {
        Ok(bytes) => Ok(Some(bytes)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_error("read_cache", e)),
    }
}
