//! Poll loop: fetch, compare, batch, deliver
//!
//! The announcer owns the last good snapshot. It is replaced only after a
//! successful fetch, so a failed cycle is simply retried against the same
//! baseline on the next tick.

use crate::config::{WatchConfig, ADMIN_TAG};
use crate::delivery::{DeliveryOutcome, ReportSink, WebhookSender};
use crate::errors::Result;
use crate::webhook::Webhook;
use async_trait::async_trait;
use futures::future::join_all;
use std::future::Future;
use std::ops::Range;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::Instrument;
use verwatch_core::render::Embed;
use verwatch_core::verwatch_core_types::{CycleContext, CycleId};
use verwatch_core::{
    batch, log_op_end, log_op_error, log_op_start, BatchLimits, CachingResolver, ChangeReport,
    DescriptorSource, DiffEngine, PendingReport, RenderOptions, Snapshot,
};
use verwatch_store::{build_client, CacheLayout, CatalogFetcher, HttpDescriptorSource};

/// Reports joined together before rendering
pub const GROUP_SIZE: usize = 10;

pub const STARTUP_COLOUR: u32 = 0x88_33_99;
pub const ANNOUNCER_NAME: &str = "verwatch";

/// Where snapshots come from
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch(&self, trust_existing: bool) -> Result<Snapshot>;
}

#[async_trait]
impl CatalogSource for CatalogFetcher {
    async fn fetch(&self, trust_existing: bool) -> Result<Snapshot> {
        CatalogFetcher::fetch(self, trust_existing).await
    }
}

type SharedResolver = Arc<CachingResolver<Arc<dyn DescriptorSource>>>;

/// What one poll cycle did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CycleSummary {
    /// The catalog could not be fetched; nothing else ran
    pub fetch_failed: bool,
    /// No previous snapshot existed, the fetched one became the baseline
    pub baseline_only: bool,
    pub pending_reports: usize,
    pub failed_groups: usize,
    pub batches: usize,
    pub delivery: DeliveryOutcome,
}

#[derive(Debug, Default)]
struct GroupOutcome {
    failed: bool,
    batches: usize,
    delivery: DeliveryOutcome,
}

pub struct Announcer {
    catalog: Arc<dyn CatalogSource>,
    resolver: SharedResolver,
    engine: DiffEngine,
    sink: Arc<dyn ReportSink>,
    options: RenderOptions,
    limits: BatchLimits,
    poll_interval: Duration,
    last: Option<Snapshot>,
}

impl Announcer {
    pub fn new(
        catalog: Arc<dyn CatalogSource>,
        source: Arc<dyn DescriptorSource>,
        sink: Arc<dyn ReportSink>,
    ) -> Self {
        let resolver: SharedResolver = Arc::new(CachingResolver::new(source));
        Self {
            catalog,
            engine: DiffEngine::new(resolver.clone()),
            resolver,
            sink,
            options: RenderOptions::default(),
            limits: BatchLimits::default(),
            poll_interval: Duration::from_secs(crate::config::DEFAULT_POLL_INTERVAL_SECS),
            last: None,
        }
    }

    /// Wire the HTTP catalog, descriptor cache and webhook sender from config
    ///
    /// # Errors
    ///
    /// - `ExternalService`: the HTTP client could not be built
    pub fn from_config(config: &WatchConfig) -> Result<Self> {
        let client = build_client(config.request_timeout())?;
        let layout = CacheLayout::new(&config.cache_dir);

        let catalog = CatalogFetcher::new(client.clone(), config.catalog_url.clone(), layout.clone());
        let source = HttpDescriptorSource::new(client.clone(), layout);
        let sink = WebhookSender::from_config(client, config);

        Ok(Self::new(Arc::new(catalog), Arc::new(source), Arc::new(sink))
            .with_render_options(config.render_options())
            .with_batch_limits(config.batch_limits())
            .with_poll_interval(config.poll_interval()))
    }

    pub fn with_render_options(mut self, options: RenderOptions) -> Self {
        self.options = options;
        self
    }

    pub fn with_batch_limits(mut self, limits: BatchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn last(&self) -> Option<&Snapshot> {
        self.last.as_ref()
    }

    pub fn cached_descriptors(&self) -> usize {
        self.resolver.cached_len()
    }

    /// Load the initial snapshot from the disk cache and announce startup
    pub async fn start(&mut self) {
        match self.catalog.fetch(true).await {
            Ok(snapshot) => {
                tracing::info!(entry_count = snapshot.len(), "Loaded initial catalog");
                self.last = Some(snapshot);
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to load initial catalog, first poll becomes the baseline");
            }
        }

        match startup_notice() {
            Ok(webhook) => {
                self.sink.notify(&webhook, Some(ADMIN_TAG)).await;
            }
            Err(e) => tracing::error!(error = %e, "Failed to build startup notice"),
        }
    }

    /// Run one fetch, compare and deliver cycle
    pub async fn poll_once(&mut self) -> CycleSummary {
        let cycle = CycleContext::new();
        let span = tracing::info_span!("poll_cycle", cycle_id = %cycle.cycle_id);
        self.poll_cycle(cycle.cycle_id).instrument(span).await
    }

    async fn poll_cycle(&mut self, cycle_id: CycleId) -> CycleSummary {
        log_op_start!("poll_cycle");
        let start = Instant::now();
        let mut summary = CycleSummary::default();

        let next = match self.catalog.fetch(false).await {
            Ok(next) => next,
            Err(e) => {
                let e = e.with_cycle_id(cycle_id);
                log_op_error!("poll_cycle", e, duration_ms = start.elapsed().as_millis() as u64);
                summary.fetch_failed = true;
                return summary;
            }
        };

        let pending = match self.last.replace(next) {
            Some(previous) => match &self.last {
                Some(current) => self.engine.compare(&previous, current),
                None => Vec::new(),
            },
            None => {
                summary.baseline_only = true;
                Vec::new()
            }
        };
        summary.pending_reports = pending.len();
        if !pending.is_empty() {
            tracing::info!(report_count = pending.len(), "Detected changes");
        }

        let mut groups = JoinSet::new();
        for (range, group) in into_groups(pending) {
            let sink = self.sink.clone();
            let options = self.options.clone();
            let limits = self.limits;
            let cycle_id = cycle_id.clone();
            groups.spawn(
                deliver_group(cycle_id, range, group, sink, options, limits).in_current_span(),
            );
        }
        while let Some(joined) = groups.join_next().await {
            match joined {
                Ok(outcome) => {
                    if outcome.failed {
                        summary.failed_groups += 1;
                    }
                    summary.batches += outcome.batches;
                    summary.delivery = summary.delivery.merge(outcome.delivery);
                }
                Err(e) => {
                    summary.failed_groups += 1;
                    tracing::error!(error = %e, "Report group task aborted");
                }
            }
        }

        if let Some(current) = &self.last {
            self.resolver.forget_except(current);
        }

        log_op_end!(
            "poll_cycle",
            duration_ms = start.elapsed().as_millis() as u64,
            report_count = summary.pending_reports,
            batch_count = summary.batches,
            failed_groups = summary.failed_groups
        );
        summary
    }

    /// Start, then poll every interval until `shutdown` resolves
    pub async fn run<F>(mut self, shutdown: F)
    where
        F: Future<Output = ()>,
    {
        self.start().await;
        tracing::info!(interval_secs = self.poll_interval.as_secs(), "Announcer started");

        let mut ticker = tokio::time::interval(self.poll_interval);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);
        tokio::pin!(shutdown);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.poll_once().await;
                }
                () = &mut shutdown => {
                    tracing::info!("Shutting down");
                    break;
                }
            }
        }
    }

    /// Compare two entries of the live catalog on demand
    ///
    /// # Errors
    ///
    /// - catalog fetch errors, see [`CatalogFetcher::fetch`]
    /// - `NotFound` / `ResolutionFailure`: see [`DiffEngine::compare_single`]
    pub async fn compare_entries(&self, old_id: &str, new_id: &str) -> Result<ChangeReport> {
        let snapshot = self.catalog.fetch(false).await?;
        self.engine.compare_single(&snapshot, old_id, new_id).await
    }

    /// Batch and deliver already-computed reports
    pub async fn deliver_reports(&self, reports: Vec<ChangeReport>) -> DeliveryOutcome {
        let mut outcome = DeliveryOutcome::default();
        for delivery_batch in batch(reports, &self.options, &self.limits) {
            outcome = outcome.merge(self.sink.deliver(&delivery_batch).await);
        }
        outcome
    }
}

/// Split pending reports into consecutive groups of [`GROUP_SIZE`]
fn into_groups(pending: Vec<PendingReport>) -> Vec<(Range<usize>, Vec<PendingReport>)> {
    let mut groups = Vec::new();
    let mut iter = pending.into_iter().peekable();
    let mut start = 0;
    while iter.peek().is_some() {
        let group: Vec<PendingReport> = iter.by_ref().take(GROUP_SIZE).collect();
        let end = start + group.len();
        groups.push((start..end, group));
        start = end;
    }
    groups
}

/// Join a group; any failure drops the whole group
async fn deliver_group(
    cycle_id: CycleId,
    range: Range<usize>,
    group: Vec<PendingReport>,
    sink: Arc<dyn ReportSink>,
    options: RenderOptions,
    limits: BatchLimits,
) -> GroupOutcome {
    let ids: Vec<String> = group.iter().map(|p| p.entry_id().to_string()).collect();
    let results = join_all(group.into_iter().map(PendingReport::join)).await;

    let mut reports = Vec::with_capacity(results.len());
    for result in results {
        match result {
            Ok(report) => reports.push(report),
            Err(e) => {
                let e = e.with_cycle_id(cycle_id);
                tracing::error!(
                    from = range.start,
                    to = range.end,
                    entry_ids = ?ids,
                    err_code = e.code(),
                    error = %e,
                    "Failed to prepare report batch"
                );
                return GroupOutcome {
                    failed: true,
                    ..GroupOutcome::default()
                };
            }
        }
    }

    let mut outcome = GroupOutcome::default();
    for delivery_batch in batch(reports, &options, &limits) {
        outcome.batches += 1;
        outcome.delivery = outcome.delivery.merge(sink.deliver(&delivery_batch).await);
    }
    outcome
}

fn startup_notice() -> Result<Webhook> {
    let embed = Embed::builder()
        .title("Successfully started")
        .colour(STARTUP_COLOUR)
        .description("Startup has completed")
        .author(ANNOUNCER_NAME, None)
        .field("Version", env!("CARGO_PKG_VERSION"), false)
        .timestamp(chrono::Utc::now())
        .build()?;
    Webhook::builder()
        .username(ANNOUNCER_NAME)
        .embed(embed)
        .build()
}

/// Resolves on ctrl-c or SIGTERM
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => tracing::info!("Received ctrl-c"),
        () = terminate => tracing::info!("Received SIGTERM"),
    }
}
