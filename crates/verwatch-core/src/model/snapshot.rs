//! Catalog snapshot model

use crate::errors::{ExError, ExErrorKind, Result, WatchError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

/// Reference to a single catalog entry, as listed in the catalog index
///
/// Identity is `id`; `content_hash` identifies the descriptor bytes the
/// entry points at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EntryRef {
    pub id: String,
    pub content_hash: String,
    pub timestamp: DateTime<Utc>,
    /// Location of the full metadata document
    pub url: String,
    /// Catalog channel (`release`, `snapshot`, ...)
    pub kind: String,
}

impl EntryRef {
    pub fn new(
        id: impl Into<String>,
        content_hash: impl Into<String>,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            content_hash: content_hash.into(),
            timestamp,
            url: String::new(),
            kind: String::new(),
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}

/// Immutable index of catalog entries as of one fetch
///
/// Entries keep the catalog's published order (most recent first).
#[derive(Debug, Clone, PartialEq)]
pub struct Snapshot {
    freshness_token: String,
    entries: Vec<EntryRef>,
    index: HashMap<String, usize>,
    latest: BTreeMap<String, String>,
}

impl Snapshot {
    /// Build a snapshot, rejecting empty and duplicate entry ids
    ///
    /// # Errors
    ///
    /// - `InvalidInput`: an entry has an empty id
    /// - `DuplicateEntry`: two entries share an id
    pub fn new(freshness_token: impl Into<String>, entries: Vec<EntryRef>) -> Result<Self> {
        let mut index = HashMap::with_capacity(entries.len());
        for (position, entry) in entries.iter().enumerate() {
            if entry.id.is_empty() {
                return Err(ExError::new(ExErrorKind::InvalidInput)
                    .with_op("snapshot_new")
                    .with_message(format!("entry at position {} has an empty id", position)));
            }
            if index.insert(entry.id.clone(), position).is_some() {
                return Err(ExError::from(WatchError::DuplicateEntry {
                    entry_id: entry.id.clone(),
                })
                .with_op("snapshot_new"));
            }
        }

        Ok(Self {
            freshness_token: freshness_token.into(),
            entries,
            index,
            latest: BTreeMap::new(),
        })
    }

    /// Attach the catalog's "latest" pointers (channel -> entry id)
    pub fn with_latest(mut self, latest: BTreeMap<String, String>) -> Self {
        self.latest = latest;
        self
    }

    pub fn freshness_token(&self) -> &str {
        &self.freshness_token
    }

    /// All entries in published order
    pub fn entries(&self) -> &[EntryRef] {
        &self.entries
    }

    pub fn get(&self, id: &str) -> Option<&EntryRef> {
        self.index.get(id).map(|&position| &self.entries[position])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// The most recently published entry
    pub fn newest(&self) -> Option<&EntryRef> {
        self.entries.first()
    }

    /// Entry the catalog marks as latest for a channel
    pub fn latest(&self, channel: &str) -> Option<&EntryRef> {
        self.latest.get(channel).and_then(|id| self.get(id))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
