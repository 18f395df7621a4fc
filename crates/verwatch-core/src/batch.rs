//! Packing of rendered reports into delivery batches
//!
//! Batching is a greedy linear partition: reports keep their input order, and
//! a batch is closed as soon as the next report would break the count or
//! length budget. A single report over the length budget travels alone.

use crate::model::ChangeReport;
use crate::render::component::Button;
use crate::render::embed::{Embed, MAX_FIELD_VALUE, MAX_TOTAL_LENGTH};
use crate::render::report_embed::{render_report, RenderOptions};
use std::ops::Range;

/// Reports per message
pub const DEFAULT_COUNT_LIMIT: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BatchLimits {
    pub count_limit: usize,
    /// Combined embed content length per message
    pub length_limit: usize,
    /// Byte length at which a section is split into another field
    pub field_line_limit: usize,
}

impl Default for BatchLimits {
    fn default() -> Self {
        Self {
            count_limit: DEFAULT_COUNT_LIMIT,
            length_limit: MAX_TOTAL_LENGTH,
            field_line_limit: MAX_FIELD_VALUE,
        }
    }
}

/// A report together with its embed
#[derive(Debug, Clone)]
pub struct RenderedReport {
    report: ChangeReport,
    embed: Embed,
}

impl RenderedReport {
    pub fn new(report: ChangeReport, embed: Embed) -> Self {
        Self { report, embed }
    }

    pub fn report(&self) -> &ChangeReport {
        &self.report
    }

    pub fn embed(&self) -> &Embed {
        &self.embed
    }

    pub fn cost(&self) -> usize {
        self.embed.total_content_length()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DeliveryBatch {
    reports: Vec<RenderedReport>,
    total_length: usize,
}

impl DeliveryBatch {
    fn push(&mut self, rendered: RenderedReport) {
        self.total_length += rendered.cost();
        self.reports.push(rendered);
    }

    pub fn reports(&self) -> &[RenderedReport] {
        &self.reports
    }

    pub fn embeds(&self) -> impl Iterator<Item = &Embed> {
        self.reports.iter().map(RenderedReport::embed)
    }

    pub fn total_length(&self) -> usize {
        self.total_length
    }

    pub fn len(&self) -> usize {
        self.reports.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reports.is_empty()
    }

    /// Link buttons for every report link
    ///
    /// Labels are prefixed with the entry id when the batch holds more than
    /// one report. Links that cannot form a valid button are skipped.
    pub fn link_buttons(&self) -> Vec<Button> {
        let prefixed = self.reports.len() > 1;
        let mut buttons = Vec::new();
        for rendered in &self.reports {
            let report = rendered.report();
            for link in report.links() {
                let label = if prefixed {
                    format!("{} {}", report.entry_id(), link.label)
                } else {
                    link.label.clone()
                };
                match Button::link(label, link.url.clone()) {
                    Ok(button) => buttons.push(button),
                    Err(err) => {
                        tracing::debug!(entry_id = report.entry_id(), error = %err, "Skipping link button");
                    }
                }
            }
        }
        buttons
    }
}

/// Greedy partition of `costs` into index ranges
///
/// A range closes before an item when adding it would exceed `length_limit`
/// or the range already holds `count_limit` items. Ranges are never empty.
pub fn plan_batches(costs: &[usize], count_limit: usize, length_limit: usize) -> Vec<Range<usize>> {
    let mut ranges = Vec::new();
    let mut start = 0;
    let mut total = 0;

    for (index, &cost) in costs.iter().enumerate() {
        let held = index - start;
        if held > 0 && (total + cost > length_limit || held >= count_limit) {
            ranges.push(start..index);
            start = index;
            total = 0;
        }
        total += cost;
    }
    if start < costs.len() {
        ranges.push(start..costs.len());
    }
    ranges
}

/// Drop suppressed reports and render the rest
///
/// A report that cannot be rendered is logged and left out.
pub fn render_reports(
    reports: impl IntoIterator<Item = ChangeReport>,
    options: &RenderOptions,
    limits: &BatchLimits,
) -> Vec<RenderedReport> {
    reports
        .into_iter()
        .filter(|report| !report.is_suppressed())
        .filter_map(|report| match render_report(&report, options, limits.field_line_limit) {
            Ok(embed) => Some(RenderedReport::new(report, embed)),
            Err(err) => {
                tracing::error!(entry_id = report.entry_id(), error = %err, "Failed to render report");
                None
            }
        })
        .collect()
}

/// Pack already-rendered reports into batches
pub fn pack(rendered: Vec<RenderedReport>, limits: &BatchLimits) -> Vec<DeliveryBatch> {
    let costs: Vec<usize> = rendered.iter().map(RenderedReport::cost).collect();
    let ranges = plan_batches(&costs, limits.count_limit, limits.length_limit);

    let mut items = rendered.into_iter();
    ranges
        .into_iter()
        .map(|range| {
            let mut batch = DeliveryBatch::default();
            for item in items.by_ref().take(range.len()) {
                batch.push(item);
            }
            batch
        })
        .collect()
}

/// Filter, render and pack reports into delivery batches
pub fn batch(
    reports: impl IntoIterator<Item = ChangeReport>,
    options: &RenderOptions,
    limits: &BatchLimits,
) -> Vec<DeliveryBatch> {
    let batches = pack(render_reports(reports, options, limits), limits);
    tracing::debug!(batch_count = batches.len(), "Packed reports");
    batches
}
