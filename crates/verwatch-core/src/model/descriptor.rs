//! Full metadata document for a single catalog entry

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// A downloadable artifact referenced by a descriptor
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Download {
    pub url: String,
    pub content_hash: String,
}

/// Maven-style `group:artifact:version` coordinate
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    /// Optional fourth segment (`natives-linux`, ...)
    pub classifier: Option<String>,
}

impl Coordinate {
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            classifier: None,
        }
    }

    /// Parse `group:artifact:version[:classifier]`
    pub fn parse(notation: &str) -> Option<Self> {
        let mut parts = notation.split(':');
        let group = parts.next().filter(|s| !s.is_empty())?;
        let artifact = parts.next().filter(|s| !s.is_empty())?;
        let version = parts.next().filter(|s| !s.is_empty())?;
        let classifier = parts.next().map(str::to_string);
        if parts.next().is_some() {
            return None;
        }
        Some(Self {
            group: group.to_string(),
            artifact: artifact.to_string(),
            version: version.to_string(),
            classifier,
        })
    }

    /// Component identity, ignoring version: `group:artifact`
    pub fn key(&self) -> String {
        format!("{}:{}", self.group, self.artifact)
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.version)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{}", classifier)?;
        }
        Ok(())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Library {
    pub coordinate: Coordinate,
    pub is_native: bool,
}

impl Library {
    pub fn new(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            is_native: false,
        }
    }

    pub fn native(coordinate: Coordinate) -> Self {
        Self {
            coordinate,
            is_native: true,
        }
    }
}

/// Runtime the entry requires (e.g. a Java major version and launcher component)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuntimeVersion {
    pub major_version: u32,
    pub component: String,
}

/// Full descriptor of one catalog entry
///
/// `Default` is the empty document, used as the baseline when an added entry
/// has nothing earlier to be compared against.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MetadataDocument {
    /// classifier -> artifact
    pub downloads: BTreeMap<String, Download>,
    pub assets_id: String,
    pub libraries: Vec<Library>,
    pub runtime_version: Option<RuntimeVersion>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coordinate_parse() {
        let c = Coordinate::parse("com.mojang:brigadier:1.0.17").unwrap();
        assert_eq!(c.group, "com.mojang");
        assert_eq!(c.artifact, "brigadier");
        assert_eq!(c.version, "1.0.17");
        assert_eq!(c.classifier, None);
        assert_eq!(c.key(), "com.mojang:brigadier");
        assert_eq!(c.to_string(), "com.mojang:brigadier:1.0.17");
    }

    #[test]
    fn test_coordinate_parse_with_classifier() {
        let c = Coordinate::parse("org.lwjgl:lwjgl:3.2.2:natives-linux").unwrap();
        assert_eq!(c.classifier.as_deref(), Some("natives-linux"));
        assert_eq!(c.key(), "org.lwjgl:lwjgl");
    }

    #[test]
    fn test_coordinate_parse_rejects_malformed() {
        assert!(Coordinate::parse("only:two").is_none());
        assert!(Coordinate::parse("a::c").is_none());
        assert!(Coordinate::parse("a:b:c:d:e").is_none());
    }
}
