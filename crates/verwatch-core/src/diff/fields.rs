//! Field-level differs over [`MetadataDocument`] sub-structures
//!
//! Pure functions producing the human-readable lines of a report section.

use crate::model::{ChangeReportBuilder, Download, Library, MetadataDocument, RuntimeVersion};
use std::collections::{BTreeMap, HashMap};

pub const SECTION_DOWNLOADS: &str = "Downloads";
pub const SECTION_ASSETS: &str = "Assets";
pub const SECTION_LIBRARIES: &str = "Libraries";
pub const SECTION_RUNTIME_VERSION: &str = "Runtime Version";

const NONE: &str = "(none)";
const UNKNOWN: &str = "(unknown)";

/// Diff two download maps
///
/// Lines are grouped removed, added, then modified. `Modified:` lines only
/// appear when `include_hash_changes` is set.
pub fn diff_downloads(
    old: &BTreeMap<String, Download>,
    new: &BTreeMap<String, Download>,
    include_hash_changes: bool,
) -> Vec<String> {
    let mut removed = Vec::new();
    let mut modified = Vec::new();
    for (classifier, old_download) in old {
        match new.get(classifier) {
            None => removed.push(format!("Removed: {}", classifier)),
            Some(new_download) => {
                if include_hash_changes && old_download.content_hash != new_download.content_hash {
                    modified.push(format!(
                        "Modified: {}: {} -> {}",
                        classifier, old_download.content_hash, new_download.content_hash
                    ));
                }
            }
        }
    }
    let added = new
        .keys()
        .filter(|classifier| !old.contains_key(*classifier))
        .map(|classifier| format!("Added: {}", classifier));

    let mut lines = removed;
    lines.extend(added);
    lines.extend(modified);
    lines
}

/// Index non-native libraries by `group:artifact`
fn index_libraries(libraries: &[Library]) -> HashMap<String, &Library> {
    libraries
        .iter()
        .filter(|library| !library.is_native)
        .map(|library| (library.coordinate.key(), library))
        .collect()
}

/// Diff two library lists by component key, ignoring natives
pub fn diff_libraries(old: &[Library], new: &[Library]) -> Vec<String> {
    let ours = index_libraries(old);
    let theirs = index_libraries(new);

    let mut removed = Vec::new();
    let mut changed = Vec::new();
    for (key, old_library) in &ours {
        match theirs.get(key) {
            None => removed.push(format!(
                "- {}: {} -> {}",
                key, old_library.coordinate.version, NONE
            )),
            Some(new_library) => {
                if old_library.coordinate != new_library.coordinate {
                    changed.push(format!(
                        "- {}: {} -> {}",
                        key, old_library.coordinate.version, new_library.coordinate.version
                    ));
                }
            }
        }
    }
    let added = theirs
        .iter()
        .filter(|(key, _)| !ours.contains_key(*key))
        .map(|(key, library)| format!("- {}: {} -> {}", key, NONE, library.coordinate.version));

    let mut lines = removed;
    lines.extend(added);
    lines.extend(changed);
    lines
}

/// Diff runtime requirements, rendering a missing side as `(unknown)`
pub fn diff_runtime_version(
    old: Option<&RuntimeVersion>,
    new: Option<&RuntimeVersion>,
) -> Vec<String> {
    let major = |v: Option<&RuntimeVersion>| {
        v.map_or_else(|| UNKNOWN.to_string(), |v| v.major_version.to_string())
    };
    let component = |v: Option<&RuntimeVersion>| {
        v.map_or_else(|| UNKNOWN.to_string(), |v| v.component.clone())
    };

    let mut lines = Vec::new();
    let (old_major, new_major) = (major(old), major(new));
    if old_major != new_major {
        lines.push(format!("Major Version: {} -> {}", old_major, new_major));
    }
    let (old_component, new_component) = (component(old), component(new));
    if old_component != new_component {
        lines.push(format!("Component: {} -> {}", old_component, new_component));
    }
    lines
}

pub fn diff_assets(old: &str, new: &str) -> Vec<String> {
    if old == new {
        Vec::new()
    } else {
        vec![format!("{} -> {}", old, new)]
    }
}

/// Fill a report with every section that differs plus download links
pub fn populate_comparison(
    mut builder: ChangeReportBuilder,
    original: &MetadataDocument,
    modified: &MetadataDocument,
    include_hash_changes: bool,
) -> ChangeReportBuilder {
    builder = builder
        .put_section_if_not_empty(
            SECTION_DOWNLOADS,
            diff_downloads(&original.downloads, &modified.downloads, include_hash_changes),
        )
        .put_section_if_not_empty(
            SECTION_ASSETS,
            diff_assets(&original.assets_id, &modified.assets_id),
        )
        .put_section_if_not_empty(
            SECTION_LIBRARIES,
            diff_libraries(&original.libraries, &modified.libraries),
        )
        .put_section_if_not_empty(
            SECTION_RUNTIME_VERSION,
            diff_runtime_version(
                original.runtime_version.as_ref(),
                modified.runtime_version.as_ref(),
            ),
        );

    for (classifier, download) in &modified.downloads {
        builder = builder.add_link(classifier.to_lowercase(), download.url.clone());
    }
    builder
}
