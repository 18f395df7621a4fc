//! Shared fixtures: snapshots, descriptors and a counting descriptor source

use async_trait::async_trait;
use chrono::{DateTime, TimeZone, Utc};
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;
use verwatch_core::errors::{Result, WatchError};
use verwatch_core::model::{Coordinate, Download, Library, RuntimeVersion};
use verwatch_core::{DescriptorSource, EntryRef, MetadataDocument, Snapshot};

#[allow(dead_code)]
pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2021, 6, 8, hour, 0, 0).unwrap()
}

#[allow(dead_code)]
pub fn entry(id: &str, hash: &str) -> EntryRef {
    EntryRef::new(id, hash, at(12))
        .with_url(format!("https://example.invalid/v1/packages/{}/{}.json", hash, id))
        .with_kind("release")
}

/// Snapshot from `(id, hash)` pairs, newest first
#[allow(dead_code)]
pub fn snapshot(token: &str, entries: &[(&str, &str)]) -> Snapshot {
    Snapshot::new(
        token,
        entries.iter().map(|(id, hash)| entry(id, hash)).collect(),
    )
    .unwrap()
}

#[allow(dead_code)]
pub fn download(hash: &str) -> Download {
    Download {
        url: format!("https://example.invalid/objects/{}", hash),
        content_hash: hash.to_string(),
    }
}

#[allow(dead_code)]
pub fn library(notation: &str) -> Library {
    let coordinate = Coordinate::parse(notation).unwrap();
    if coordinate
        .classifier
        .as_deref()
        .is_some_and(|c| c.starts_with("natives-"))
    {
        Library::native(coordinate)
    } else {
        Library::new(coordinate)
    }
}

/// Document with the given downloads and libraries, runtime java 16
#[allow(dead_code)]
pub fn document(assets: &str, downloads: &[(&str, &str)], libraries: &[&str]) -> MetadataDocument {
    MetadataDocument {
        downloads: downloads
            .iter()
            .map(|(classifier, hash)| (classifier.to_string(), download(hash)))
            .collect::<BTreeMap<_, _>>(),
        assets_id: assets.to_string(),
        libraries: libraries.iter().map(|n| library(n)).collect(),
        runtime_version: Some(RuntimeVersion {
            major_version: 16,
            component: "java-runtime-alpha".to_string(),
        }),
    }
}

/// In-memory source keyed by `(id, hash)` that counts fetches per key
#[allow(dead_code)]
#[derive(Default)]
pub struct CountingSource {
    documents: HashMap<(String, String), MetadataDocument>,
    fetches: Mutex<HashMap<(String, String), usize>>,
    total: AtomicUsize,
    delay: Duration,
}

#[allow(dead_code)]
impl CountingSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with(mut self, id: &str, hash: &str, document: MetadataDocument) -> Self {
        self.documents
            .insert((id.to_string(), hash.to_string()), document);
        self
    }

    pub fn fetches_of(&self, id: &str, hash: &str) -> usize {
        self.fetches
            .lock()
            .unwrap()
            .get(&(id.to_string(), hash.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn total_fetches(&self) -> usize {
        self.total.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DescriptorSource for CountingSource {
    async fn fetch(&self, entry: &EntryRef) -> Result<MetadataDocument> {
        let key = (entry.id.clone(), entry.content_hash.clone());
        self.total.fetch_add(1, Ordering::SeqCst);
        *self.fetches.lock().unwrap().entry(key.clone()).or_insert(0) += 1;
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        self.documents.get(&key).cloned().ok_or_else(|| {
            WatchError::DescriptorNotFound {
                entry_id: entry.id.clone(),
            }
            .into()
        })
    }
}
