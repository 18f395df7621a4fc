//! Cache directory layout
//!
//! ```text
//! <root>/manifest.json
//! <root>/manifest.etag
//! <root>/versions/<entry id>/<content hash>.json
//! ```

use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct CacheLayout {
    root: PathBuf,
}

impl CacheLayout {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn manifest_path(&self) -> PathBuf {
        self.root.join("manifest.json")
    }

    pub fn etag_path(&self) -> PathBuf {
        self.root.join("manifest.etag")
    }

    pub fn descriptor_path(&self, entry_id: &str, content_hash: &str) -> PathBuf {
        self.root
            .join("versions")
            .join(segment(entry_id))
            .join(format!("{}.json", segment(content_hash)))
    }
}

/// Make a catalog value safe to use as one path segment
fn segment(value: &str) -> String {
    let cleaned: String = value
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' => '_',
            c => c,
        })
        .collect();
    match cleaned.as_str() {
        "" | "." | ".." => format!("_{}", cleaned),
        _ => cleaned,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_path() {
        let layout = CacheLayout::new("/cache");
        assert_eq!(
            layout.descriptor_path("1.17", "abc123"),
            PathBuf::from("/cache/versions/1.17/abc123.json")
        );
    }

    #[test]
    fn test_hostile_ids_stay_inside_root() {
        let layout = CacheLayout::new("/cache");
        let path = layout.descriptor_path("../../etc", "..");
        assert!(path.starts_with("/cache/versions"));
        assert!(!path.components().any(|c| c == std::path::Component::ParentDir));
    }
}
