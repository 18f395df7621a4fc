//! Change report model
//!
//! A [`ChangeReport`] is assembled through [`ChangeReportBuilder`] by the diff
//! engine and is immutable afterwards. Sections keep insertion order.

use crate::errors::{ExError, ExErrorKind, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChangeKind {
    Added,
    Removed,
    Modified,
}

impl ChangeKind {
    pub fn colour(self) -> Colour {
        match self {
            ChangeKind::Added => Colour::Added,
            ChangeKind::Removed => Colour::Removed,
            ChangeKind::Modified => Colour::Modified,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ChangeKind::Added => "added",
            ChangeKind::Removed => "removed",
            ChangeKind::Modified => "modified",
        }
    }
}

/// Accent colour tag of a report
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Colour {
    Added,
    Removed,
    Modified,
}

impl Colour {
    /// Packed `0xRRGGBB` value used by the embed renderer
    pub fn rgb(self) -> u32 {
        match self {
            Colour::Added => 0x22BB44,
            Colour::Removed => 0xBB2244,
            Colour::Modified => 0x8822CC,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

impl Link {
    pub fn new(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            url: url.into(),
        }
    }
}

/// Titled list of change lines
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Section {
    pub title: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChangeReport {
    entry_id: String,
    kind: ChangeKind,
    colour: Colour,
    description: String,
    sections: Vec<Section>,
    timestamp: Option<DateTime<Utc>>,
    emit_only_if_sections_non_empty: bool,
    links: BTreeSet<Link>,
}

impl ChangeReport {
    pub fn builder(entry_id: impl Into<String>, kind: ChangeKind) -> ChangeReportBuilder {
        ChangeReportBuilder::new(entry_id, kind)
    }

    pub fn entry_id(&self) -> &str {
        &self.entry_id
    }

    pub fn kind(&self) -> ChangeKind {
        self.kind
    }

    pub fn colour(&self) -> Colour {
        self.colour
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }

    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.timestamp
    }

    pub fn emit_only_if_sections_non_empty(&self) -> bool {
        self.emit_only_if_sections_non_empty
    }

    /// Links in label order
    pub fn links(&self) -> &BTreeSet<Link> {
        &self.links
    }

    /// True when the report asked to be dropped and has nothing to show
    pub fn is_suppressed(&self) -> bool {
        self.emit_only_if_sections_non_empty && self.sections.is_empty()
    }
}

/// Builder for [`ChangeReport`]
#[derive(Debug, Clone)]
pub struct ChangeReportBuilder {
    entry_id: String,
    kind: ChangeKind,
    description: String,
    sections: Vec<Section>,
    timestamp: Option<DateTime<Utc>>,
    emit_only_if_sections_non_empty: bool,
    links: BTreeSet<Link>,
}

impl ChangeReportBuilder {
    pub fn new(entry_id: impl Into<String>, kind: ChangeKind) -> Self {
        Self {
            entry_id: entry_id.into(),
            kind,
            description: String::new(),
            sections: Vec::new(),
            timestamp: None,
            emit_only_if_sections_non_empty: false,
            links: BTreeSet::new(),
        }
    }

    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    pub fn timestamp(mut self, timestamp: DateTime<Utc>) -> Self {
        self.timestamp = Some(timestamp);
        self
    }

    pub fn emit_only_if_sections_non_empty(mut self, flag: bool) -> Self {
        self.emit_only_if_sections_non_empty = flag;
        self
    }

    /// Set a section, replacing the lines of an existing one with the same title
    pub fn put_section(mut self, title: impl Into<String>, lines: Vec<String>) -> Self {
        let title = title.into();
        match self.sections.iter_mut().find(|s| s.title == title) {
            Some(existing) => existing.lines = lines,
            None => self.sections.push(Section { title, lines }),
        }
        self
    }

    pub fn put_section_if_not_empty(self, title: impl Into<String>, lines: Vec<String>) -> Self {
        if lines.is_empty() {
            self
        } else {
            self.put_section(title, lines)
        }
    }

    pub fn add_link(mut self, label: impl Into<String>, url: impl Into<String>) -> Self {
        self.links.insert(Link::new(label, url));
        self
    }

    /// # Errors
    ///
    /// - `InvalidInput`: empty entry id or a section with an empty title
    pub fn build(self) -> Result<ChangeReport> {
        if self.entry_id.is_empty() {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("build_report")
                .with_message("report entry id must not be empty"));
        }
        if self.sections.iter().any(|s| s.title.is_empty()) {
            return Err(ExError::new(ExErrorKind::InvalidInput)
                .with_op("build_report")
                .with_entry_id(self.entry_id)
                .with_message("section title must not be empty"));
        }

        Ok(ChangeReport {
            colour: self.kind.colour(),
            entry_id: self.entry_id,
            kind: self.kind,
            description: self.description,
            sections: self.sections,
            timestamp: self.timestamp,
            emit_only_if_sections_non_empty: self.emit_only_if_sections_non_empty,
            links: self.links,
        })
    }
}
