//! Snapshot comparison engine
//!
//! [`DiffEngine::compare`] classifies every entry of two snapshots and returns
//! one [`PendingReport`] per reportable difference. Removed entries are ready
//! immediately; added and modified entries run as spawned tasks that resolve
//! their descriptors through the injected [`DescriptorResolver`].

use crate::diff::fields::populate_comparison;
use crate::errors::{ExError, Result, WatchError};
use crate::model::{ChangeKind, ChangeReport, EntryRef, MetadataDocument, Snapshot};
use crate::resolver::DescriptorResolver;
use crate::{log_anomaly, log_op_end, log_op_error, log_op_start};
use std::collections::HashSet;
use std::sync::Arc;
use tokio::task::JoinHandle;
use tracing::Instrument;
use verwatch_core_types::schema::ANOMALY_SHARED_ENTRY_MISSING;

pub const REMOVED_DESCRIPTION: &str = "Version has been removed from the manifest :(";
pub const MODIFIED_DESCRIPTION: &str =
    "Version has been modified. Changes from previous instance:";
const NEW_DESCRIPTION: &str = "This is a new version.";

fn added_description(baseline: Option<&EntryRef>) -> String {
    match baseline {
        Some(previous) => format!("{} Changes listed from {}.", NEW_DESCRIPTION, previous.id),
        None => NEW_DESCRIPTION.to_string(),
    }
}

enum ReportState {
    Ready(Box<ChangeReport>),
    Running(JoinHandle<Result<ChangeReport>>),
}

/// A change report that may still be resolving
pub struct PendingReport {
    entry_id: String,
    kind: ChangeKind,
    state: ReportState,
}

impl PendingReport {
    /// Wrap a report that needs no resolution
    pub fn ready(report: ChangeReport) -> Self {
        Self {
            entry_id: report.entry_id().to_string(),
            kind: report.kind(),
            state: ReportState::Ready(Box::new(report)),
        }
    }

    fn running(entry_id: String, kind: ChangeKind, handle: JoinHandle<Result<ChangeReport>>) -> Self {
        Self {
            entry_id,
            kind,
            state: ReportState::Running(handle),
        }
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn is_ready(&self) -> bool {
        matches!(self.state, ReportState::Ready(_))
    }

    /// Wait for the report
    ///
    /// # Errors
    ///
    /// - `NotFound` / `ResolutionFailure`: a descriptor could not be resolved
    /// - `Internal`: the task panicked or was cancelled
    pub async fn join(self) -> Result<ChangeReport> {
        match self.state {
            ReportState::Ready(report) => Ok(*report),
            ReportState::Running(handle) => match handle.await {
                Ok(result) => result,
                Err(join_err) => Err(WatchError::ReportTaskFailed {
                    entry_id: self.entry_id,
                    reason: join_err.to_string(),
                }
                .into()),
            },
        }
    }
}

/// Compares catalog snapshots
///
/// Holds no state besides the resolver; every `compare` call is independent.
#[derive(Clone)]
pub struct DiffEngine {
    resolver: Arc<dyn DescriptorResolver>,
}

impl DiffEngine {
    pub fn new(resolver: Arc<dyn DescriptorResolver>) -> Self {
        Self { resolver }
    }

    /// Classify entries and start one report per difference
    ///
    /// Returns nothing when the freshness tokens match. Must be called from
    /// within a tokio runtime. Dropping the result leaves spawned tasks to
    /// finish detached.
    pub fn compare(&self, old: &Snapshot, new: &Snapshot) -> Vec<PendingReport> {
        if old.freshness_token() == new.freshness_token() {
            tracing::debug!("Catalog unchanged, skipping comparison");
            return Vec::new();
        }

        log_op_start!("compare", old_entries = old.len(), new_entries = new.len());
        let start = std::time::Instant::now();

        let old_ids: HashSet<&str> = old.entries().iter().map(|e| e.id.as_str()).collect();
        let new_ids: HashSet<&str> = new.entries().iter().map(|e| e.id.as_str()).collect();

        let mut reports = Vec::new();

        for removed in old.entries().iter().filter(|e| !new_ids.contains(e.id.as_str())) {
            match removed_report(removed) {
                Ok(report) => reports.push(PendingReport::ready(report)),
                Err(err) => tracing::warn!(entry_id = %removed.id, error = %err, "Skipping removed entry"),
            }
        }

        let added: Vec<&EntryRef> = new
            .entries()
            .iter()
            .filter(|e| !old_ids.contains(e.id.as_str()))
            .collect();
        if !added.is_empty() {
            let baseline = old.newest().cloned();
            for entry in added {
                reports.push(self.spawn_added(baseline.clone(), entry.clone()));
            }
        }

        for id in new.entries().iter().map(|e| e.id.as_str()).filter(|id| old_ids.contains(id)) {
            let (Some(ours), Some(theirs)) = (old.get(id), new.get(id)) else {
                log_anomaly!(
                    id,
                    ANOMALY_SHARED_ENTRY_MISSING,
                    "Shared entry missing from one side, skipping"
                );
                continue;
            };
            if ours.content_hash == theirs.content_hash {
                continue;
            }
            reports.push(self.spawn_modified(ours.clone(), theirs.clone()));
        }

        log_op_end!(
            "compare",
            duration_ms = start.elapsed().as_millis() as u64,
            report_count = reports.len()
        );
        reports
    }

    fn spawn_added(&self, baseline: Option<EntryRef>, entry: EntryRef) -> PendingReport {
        let resolver = self.resolver.clone();
        let entry_id = entry.id.clone();
        let span = tracing::info_span!("report", entry_id = %entry_id, kind = "added");

        let handle = tokio::spawn(
            async move {
                let (original, added) = tokio::try_join!(
                    resolve_baseline(resolver.as_ref(), baseline.as_ref()),
                    resolver.resolve(&entry),
                )
                .map_err(|e| e.with_op("compare_added"))?;

                let builder = ChangeReport::builder(entry.id.clone(), ChangeKind::Added)
                    .description(added_description(baseline.as_ref()))
                    .timestamp(entry.timestamp);
                populate_comparison(builder, &original, &added, false).build()
            }
            .instrument(span),
        );
        PendingReport::running(entry_id, ChangeKind::Added, handle)
    }

    fn spawn_modified(&self, ours: EntryRef, theirs: EntryRef) -> PendingReport {
        let resolver = self.resolver.clone();
        let entry_id = theirs.id.clone();
        let span = tracing::info_span!("report", entry_id = %entry_id, kind = "modified");

        let handle = tokio::spawn(
            async move {
                let (original, changed) =
                    tokio::try_join!(resolver.resolve(&ours), resolver.resolve(&theirs))
                        .map_err(|e| e.with_op("compare_modified"))?;

                let builder = ChangeReport::builder(theirs.id.clone(), ChangeKind::Modified)
                    .description(MODIFIED_DESCRIPTION)
                    .timestamp(theirs.timestamp)
                    .emit_only_if_sections_non_empty(true);
                populate_comparison(builder, &original, &changed, true).build()
            }
            .instrument(span),
        );
        PendingReport::running(entry_id, ChangeKind::Modified, handle)
    }

    /// Compare two entries of the same snapshot on demand
    ///
    /// # Errors
    ///
    /// - `NotFound`: either id is absent from the snapshot
    /// - `NotFound` / `ResolutionFailure`: a descriptor could not be resolved
    pub async fn compare_single(
        &self,
        snapshot: &Snapshot,
        old_id: &str,
        new_id: &str,
    ) -> Result<ChangeReport> {
        log_op_start!("compare_single", old_id = old_id, new_id = new_id);
        let start = std::time::Instant::now();

        let result = self.compare_single_impl(snapshot, old_id, new_id).await.map_err(|e| {
            log_op_error!(
                "compare_single",
                e.clone(),
                duration_ms = start.elapsed().as_millis() as u64
            );
            e
        })?;

        log_op_end!(
            "compare_single",
            duration_ms = start.elapsed().as_millis() as u64
        );
        Ok(result)
    }

    async fn compare_single_impl(
        &self,
        snapshot: &Snapshot,
        old_id: &str,
        new_id: &str,
    ) -> Result<ChangeReport> {
        let ours = lookup(snapshot, old_id)?;
        let theirs = lookup(snapshot, new_id)?;

        let builder = ChangeReport::builder(new_id, ChangeKind::Modified).timestamp(theirs.timestamp);
        if ours.content_hash == theirs.content_hash {
            return builder
                .description(format!("No changes since {}", old_id))
                .build();
        }

        let (original, changed) =
            tokio::try_join!(self.resolver.resolve(ours), self.resolver.resolve(theirs))?;
        populate_comparison(
            builder.description(format!("Changes since {}", old_id)),
            &original,
            &changed,
            false,
        )
        .build()
    }
}

fn lookup<'a>(snapshot: &'a Snapshot, id: &str) -> Result<&'a EntryRef> {
    snapshot.get(id).ok_or_else(|| {
        ExError::from(WatchError::EntryNotFound {
            entry_id: id.to_string(),
        })
        .with_op("compare_single")
    })
}

/// Descriptor of the baseline entry, or the empty document when there is none
async fn resolve_baseline(
    resolver: &dyn DescriptorResolver,
    baseline: Option<&EntryRef>,
) -> Result<Arc<MetadataDocument>> {
    match baseline {
        Some(entry) => resolver.resolve(entry).await,
        None => Ok(Arc::new(MetadataDocument::default())),
    }
}

fn removed_report(entry: &EntryRef) -> Result<ChangeReport> {
    ChangeReport::builder(entry.id.clone(), ChangeKind::Removed)
        .description(REMOVED_DESCRIPTION)
        .timestamp(entry.timestamp)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ExErrorKind;
    use async_trait::async_trait;
    use chrono::Utc;
    use std::collections::HashMap;

    struct MapResolver(HashMap<(String, String), MetadataDocument>);

    #[async_trait]
    impl DescriptorResolver for MapResolver {
        async fn resolve(&self, entry: &EntryRef) -> Result<Arc<MetadataDocument>> {
            self.0
                .get(&(entry.id.clone(), entry.content_hash.clone()))
                .cloned()
                .map(Arc::new)
                .ok_or_else(|| {
                    WatchError::DescriptorNotFound {
                        entry_id: entry.id.clone(),
                    }
                    .into()
                })
        }
    }

    fn entry(id: &str, hash: &str) -> EntryRef {
        EntryRef::new(id, hash, Utc::now())
    }

    fn doc(assets: &str) -> MetadataDocument {
        MetadataDocument {
            assets_id: assets.into(),
            ..Default::default()
        }
    }

    fn engine(docs: &[(&str, &str, MetadataDocument)]) -> DiffEngine {
        let map = docs
            .iter()
            .map(|(id, hash, d)| ((id.to_string(), hash.to_string()), d.clone()))
            .collect();
        DiffEngine::new(Arc::new(MapResolver(map)))
    }

    #[tokio::test]
    async fn test_same_token_yields_nothing() {
        let snapshot = Snapshot::new("etag", vec![entry("1.0", "a")]).unwrap();
        assert!(engine(&[]).compare(&snapshot, &snapshot).is_empty());
    }

    #[tokio::test]
    async fn test_removed_reports_are_ready() {
        let old = Snapshot::new("t1", vec![entry("1.0", "a")]).unwrap();
        let new = Snapshot::new("t2", Vec::new()).unwrap();

        let reports = engine(&[]).compare(&old, &new);
        assert_eq!(reports.len(), 1);
        assert!(reports[0].is_ready());
        let report = reports.into_iter().next().unwrap().join().await.unwrap();
        assert_eq!(report.kind(), ChangeKind::Removed);
        assert_eq!(report.description(), REMOVED_DESCRIPTION);
    }

    #[tokio::test]
    async fn test_added_against_empty_snapshot_uses_empty_baseline() {
        let old = Snapshot::new("t1", Vec::new()).unwrap();
        let new = Snapshot::new("t2", vec![entry("1.0", "a")]).unwrap();
        let engine = engine(&[("1.0", "a", doc("1.0"))]);

        let report = engine.compare(&old, &new).pop().unwrap().join().await.unwrap();
        assert_eq!(report.description(), "This is a new version.");
        assert_eq!(report.section("Assets").unwrap().lines, [" -> 1.0"]);
    }

    #[tokio::test]
    async fn test_unresolvable_added_entry_fails_only_its_task() {
        let old = Snapshot::new("t1", vec![entry("1.0", "a")]).unwrap();
        let new = Snapshot::new("t2", vec![entry("1.1", "b"), entry("1.0", "a")]).unwrap();
        let engine = engine(&[("1.0", "a", doc("1.0"))]);

        let mut reports = engine.compare(&old, &new);
        assert_eq!(reports.len(), 1);
        let err = reports.remove(0).join().await.unwrap_err();
        assert!(err.kind().is_unresolvable());
        assert_eq!(err.op(), Some("compare_added"));
    }

    #[tokio::test]
    async fn test_compare_single_missing_id() {
        let snapshot = Snapshot::new("t", vec![entry("1.0", "a")]).unwrap();
        let err = engine(&[])
            .compare_single(&snapshot, "1.0", "9.9")
            .await
            .unwrap_err();
        assert_eq!(err.kind(), ExErrorKind::NotFound);
        assert_eq!(err.entry_id(), Some("9.9"));
    }

    #[tokio::test]
    async fn test_compare_single_same_hash_reports_no_changes() {
        let snapshot = Snapshot::new("t", vec![entry("1.1", "a"), entry("1.0", "a")]).unwrap();
        let report = engine(&[]).compare_single(&snapshot, "1.0", "1.1").await.unwrap();
        assert_eq!(report.description(), "No changes since 1.0");
        assert_eq!(report.entry_id(), "1.1");
        assert!(report.sections().is_empty());
    }
}
