//! Wire schema of the catalog index and per-entry descriptors
//!
//! Only the fields the differs track are modelled; everything else in the
//! documents is ignored.

use crate::errors::{invalid_manifest, missing_hash, Result};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use verwatch_core::model::{Coordinate, Download, Library, RuntimeVersion};
use verwatch_core::{EntryRef, MetadataDocument, Snapshot};

#[derive(Debug, Deserialize)]
pub struct CatalogDocument {
    #[serde(default)]
    pub latest: BTreeMap<String, String>,
    pub versions: Vec<CatalogVersion>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogVersion {
    pub id: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub url: String,
    pub time: DateTime<Utc>,
    pub release_time: DateTime<Utc>,
    /// Present in v2 catalogs only
    #[serde(default)]
    pub sha1: Option<String>,
}

impl CatalogVersion {
    /// Content hash from the document, or from a `/v1/packages/<hash>/` url
    pub fn content_hash(&self) -> Option<String> {
        if let Some(sha1) = self.sha1.as_deref().filter(|s| !s.is_empty()) {
            return Some(sha1.to_string());
        }
        hash_from_url(&self.url)
    }

    fn into_entry(self) -> Result<EntryRef> {
        let hash = self.content_hash().ok_or_else(|| missing_hash(&self.id))?;
        Ok(EntryRef::new(self.id, hash, self.time)
            .with_url(self.url)
            .with_kind(self.kind))
    }
}

/// Extract `<hash>` from `.../v1/packages/<hash>/<file>`
pub fn hash_from_url(url: &str) -> Option<String> {
    const MARKER: &str = "/v1/packages/";
    let start = url.find(MARKER)? + MARKER.len();
    let hash = url[start..].split('/').next()?;
    if hash.is_empty() {
        None
    } else {
        Some(hash.to_string())
    }
}

/// Parse catalog bytes into a snapshot
///
/// # Errors
///
/// - `InvalidManifest`: not a catalog document
/// - `MissingField`: an entry has no content hash
/// - `DuplicateEntry`: an id is listed twice
pub fn parse_catalog(bytes: &[u8], freshness_token: &str) -> Result<Snapshot> {
    let document: CatalogDocument =
        serde_json::from_slice(bytes).map_err(|e| invalid_manifest("parse_catalog", e))?;

    let entries = document
        .versions
        .into_iter()
        .map(CatalogVersion::into_entry)
        .collect::<Result<Vec<_>>>()?;

    Ok(Snapshot::new(freshness_token, entries)?.with_latest(document.latest))
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DescriptorDocument {
    #[serde(default)]
    pub downloads: BTreeMap<String, WireDownload>,
    #[serde(default)]
    pub assets: String,
    #[serde(default)]
    pub libraries: Vec<WireLibrary>,
    #[serde(default)]
    pub java_version: Option<WireJavaVersion>,
}

#[derive(Debug, Deserialize)]
pub struct WireDownload {
    pub sha1: String,
    #[serde(default)]
    pub size: u64,
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct WireLibrary {
    pub name: String,
    #[serde(default)]
    pub natives: Option<BTreeMap<String, String>>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WireJavaVersion {
    pub component: String,
    pub major_version: u32,
}

impl WireLibrary {
    fn into_library(self) -> Option<Library> {
        let coordinate = Coordinate::parse(&self.name)?;
        let is_native = self.natives.is_some()
            || coordinate
                .classifier
                .as_deref()
                .is_some_and(|c| c.starts_with("natives-"));
        Some(if is_native {
            Library::native(coordinate)
        } else {
            Library::new(coordinate)
        })
    }
}

impl From<DescriptorDocument> for MetadataDocument {
    fn from(document: DescriptorDocument) -> Self {
        let libraries = document
            .libraries
            .into_iter()
            .filter_map(|library| {
                let name = library.name.clone();
                let parsed = library.into_library();
                if parsed.is_none() {
                    tracing::debug!(library = %name, "Skipping library with malformed name");
                }
                parsed
            })
            .collect();

        MetadataDocument {
            downloads: document
                .downloads
                .into_iter()
                .map(|(classifier, d)| {
                    (
                        classifier,
                        Download {
                            url: d.url,
                            content_hash: d.sha1,
                        },
                    )
                })
                .collect(),
            assets_id: document.assets,
            libraries,
            runtime_version: document.java_version.map(|j| RuntimeVersion {
                major_version: j.major_version,
                component: j.component,
            }),
        }
    }
}

/// Parse descriptor bytes
///
/// # Errors
///
/// - `InvalidManifest`: not a descriptor document
pub fn parse_descriptor(bytes: &[u8], entry_id: &str) -> Result<MetadataDocument> {
    let document: DescriptorDocument = serde_json::from_slice(bytes)
        .map_err(|e| invalid_manifest("parse_descriptor", e).with_entry_id(entry_id))?;
    Ok(document.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use verwatch_core::ExErrorKind;

    const V2_CATALOG: &str = r#"{
        "latest": {"release": "1.17", "snapshot": "1.17"},
        "versions": [
            {"id": "1.17", "type": "release",
             "url": "https://example.invalid/v1/packages/aaa/1.17.json",
             "time": "2021-06-08T11:00:40+00:00", "releaseTime": "2021-06-08T11:00:40+00:00",
             "sha1": "bbb", "complianceLevel": 1},
            {"id": "1.16.5", "type": "release",
             "url": "https://example.invalid/v1/packages/ccc/1.16.5.json",
             "time": "2021-01-14T16:05:32+00:00", "releaseTime": "2021-01-14T16:05:32+00:00"}
        ]
    }"#;

    #[test]
    fn test_parse_catalog_keeps_order_and_hashes() {
        let snapshot = parse_catalog(V2_CATALOG.as_bytes(), "etag").unwrap();
        assert_eq!(snapshot.len(), 2);
        assert_eq!(snapshot.newest().unwrap().id, "1.17");
        // explicit sha1 wins over the url
        assert_eq!(snapshot.get("1.17").unwrap().content_hash, "bbb");
        assert_eq!(snapshot.get("1.16.5").unwrap().content_hash, "ccc");
        assert_eq!(snapshot.get("1.16.5").unwrap().kind, "release");
        assert_eq!(snapshot.latest("release").unwrap().id, "1.17");
    }

    #[test]
    fn test_hash_from_url() {
        assert_eq!(
            hash_from_url("https://launchermeta.example/v1/packages/abc/1.17.json").as_deref(),
            Some("abc")
        );
        assert_eq!(hash_from_url("https://example.invalid/mc/1.17.json"), None);
        assert_eq!(hash_from_url("https://example.invalid/v1/packages//x.json"), None);
    }

    #[test]
    fn test_missing_hash_is_missing_field() {
        let catalog = r#"{"versions": [{"id": "old", "type": "old_alpha",
            "url": "https://example.invalid/old.json",
            "time": "2010-01-01T00:00:00+00:00", "releaseTime": "2010-01-01T00:00:00+00:00"}]}"#;
        let err = parse_catalog(catalog.as_bytes(), "t").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::MissingField);
    }

    #[test]
    fn test_garbage_is_invalid_manifest() {
        let err = parse_catalog(b"<html>", "t").unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::InvalidManifest);
    }

    #[test]
    fn test_parse_descriptor() {
        let descriptor = r#"{
            "assets": "1.17",
            "downloads": {
                "client": {"sha1": "c1", "size": 10, "url": "https://example.invalid/client.jar"},
                "server": {"sha1": "s1", "size": 20, "url": "https://example.invalid/server.jar"}
            },
            "javaVersion": {"component": "java-runtime-alpha", "majorVersion": 16},
            "libraries": [
                {"name": "com.mojang:brigadier:1.0.18"},
                {"name": "org.lwjgl:lwjgl:3.2.2", "natives": {"linux": "natives-linux"}},
                {"name": "org.lwjgl:lwjgl-glfw:3.2.2:natives-macos"},
                {"name": "broken"}
            ],
            "mainClass": "net.minecraft.client.main.Main"
        }"#;

        let document = parse_descriptor(descriptor.as_bytes(), "1.17").unwrap();
        assert_eq!(document.assets_id, "1.17");
        assert_eq!(document.downloads["server"].content_hash, "s1");
        assert_eq!(document.runtime_version.as_ref().unwrap().major_version, 16);
        assert_eq!(document.libraries.len(), 3);
        assert!(!document.libraries[0].is_native);
        assert!(document.libraries[1].is_native);
        assert!(document.libraries[2].is_native);
    }

    #[test]
    fn test_old_descriptor_without_optional_fields() {
        let document = parse_descriptor(br#"{"downloads": {}}"#, "rd-132211").unwrap();
        assert!(document.runtime_version.is_none());
        assert!(document.libraries.is_empty());
    }
}
