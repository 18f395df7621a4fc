//! Rendering of change reports into embeds

use super::embed::Embed;
use crate::errors::Result;
use crate::log_anomaly;
use crate::model::{ChangeReport, Section};
use verwatch_core_types::schema::ANOMALY_EMPTY_SECTION_FIELDS;

pub const DEFAULT_TITLE_PREFIX: &str = "Minecraft ";
pub const DEFAULT_FOOTER_TEXT: &str = "Last updated";

/// Presentation settings shared by every report of a run
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderOptions {
    pub title_prefix: String,
    /// Entry page url, `{id}` is replaced by the entry id
    pub entry_url_format: Option<String>,
    pub footer_text: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            title_prefix: DEFAULT_TITLE_PREFIX.to_string(),
            entry_url_format: None,
            footer_text: DEFAULT_FOOTER_TEXT.to_string(),
        }
    }
}

/// One embed field produced by [`split_section`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SplitField {
    pub name: String,
    pub value: String,
}

/// Split `lines` into newline-joined field values shorter than `limit` bytes
///
/// The buffer is flushed before a line that would bring it to `limit` or
/// beyond. The first field takes the bare title, later ones `"<title>(cont'd N)"`.
/// A line that alone reaches the limit is cut at char boundaries.
pub fn split_section(title: &str, lines: &[String], limit: usize) -> Vec<SplitField> {
    let mut fields = Vec::new();
    let mut buf = String::new();

    let flush = |fields: &mut Vec<SplitField>, buf: &mut String| {
        if buf.is_empty() {
            return;
        }
        let name = match fields.len() {
            0 => title.to_string(),
            n => format!("{}(cont'd {})", title, n),
        };
        fields.push(SplitField {
            name,
            value: std::mem::take(buf),
        });
    };

    for line in lines {
        for piece in wrap(line, limit.saturating_sub(1)) {
            if !buf.is_empty() && buf.len() + 1 + piece.len() >= limit {
                flush(&mut fields, &mut buf);
            }
            if !buf.is_empty() {
                buf.push('\n');
            }
            buf.push_str(piece);
        }
    }
    flush(&mut fields, &mut buf);
    fields
}

/// Cut `line` into pieces of at most `max` bytes (at least one char each)
fn wrap(line: &str, max: usize) -> Vec<&str> {
    if line.len() <= max {
        return vec![line];
    }
    let mut pieces = Vec::new();
    let mut rest = line;
    while !rest.is_empty() {
        let mut end = max.min(rest.len());
        while end > 0 && !rest.is_char_boundary(end) {
            end -= 1;
        }
        if end == 0 {
            end = rest.chars().next().map_or(rest.len(), char::len_utf8);
        }
        let (piece, tail) = rest.split_at(end);
        pieces.push(piece);
        rest = tail;
    }
    pieces
}

/// Description with the report's links appended
fn description_with_links(report: &ChangeReport) -> String {
    let mut description = report.description().to_string();
    if !description.is_empty() && !report.links().is_empty() {
        description.push_str("\n\n**Links:**\n");
        let links: Vec<String> = report
            .links()
            .iter()
            .map(|link| format!("[{}]({})", link.label, link.url))
            .collect();
        description.push_str(&links.join(" | "));
    }
    description
}

fn section_fields(report: &ChangeReport, section: &Section, limit: usize) -> Vec<SplitField> {
    let fields = split_section(&section.title, &section.lines, limit);
    if fields.is_empty() {
        log_anomaly!(
            report.entry_id(),
            ANOMALY_EMPTY_SECTION_FIELDS,
            "Section produced no fields",
            section = %section.title
        );
    }
    fields
}

/// Render a report as an embed, splitting sections at `field_line_limit`
///
/// # Errors
///
/// - `LimitExceeded`: the rendered embed breaks a per-field limit
pub fn render_report(
    report: &ChangeReport,
    options: &RenderOptions,
    field_line_limit: usize,
) -> Result<Embed> {
    let mut builder = Embed::builder()
        .title(format!("{}{}", options.title_prefix, report.entry_id()))
        .colour(report.colour().rgb())
        .footer(options.footer_text.clone());

    let description = description_with_links(report);
    if !description.is_empty() {
        builder = builder.description(description);
    }

    if let Some(format) = &options.entry_url_format {
        builder = builder.url(format.replace("{id}", report.entry_id()));
    }
    if let Some(timestamp) = report.timestamp() {
        builder = builder.timestamp(timestamp);
    }
    for section in report.sections() {
        for field in section_fields(report, section, field_line_limit) {
            builder = builder.field(field.name, field.value, false);
        }
    }

    builder.build().map_err(|e| {
        e.with_op("render_report")
            .with_entry_id(report.entry_id())
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ChangeKind;

    fn lines(lens: &[usize]) -> Vec<String> {
        lens.iter()
            .enumerate()
            .map(|(i, &len)| char::from(b'a' + i as u8).to_string().repeat(len))
            .collect()
    }

    #[test]
    fn test_three_long_lines_split_in_two() {
        let fields = split_section("Libraries", &lines(&[500, 500, 500]), 1024);
        assert_eq!(fields.len(), 2);
        assert_eq!(fields[0].name, "Libraries");
        assert_eq!(fields[0].value.len(), 1001);
        assert_eq!(fields[1].name, "Libraries(cont'd 1)");
        assert_eq!(fields[1].value, "c".repeat(500));
    }

    #[test]
    fn test_flush_when_reaching_limit_exactly() {
        // 10 + 1 + 13 == 24
        let fields = split_section("S", &lines(&[10, 13]), 24);
        assert_eq!(fields.len(), 2);
        let fields = split_section("S", &lines(&[10, 12]), 24);
        assert_eq!(fields.len(), 1);
    }

    #[test]
    fn test_oversized_line_is_cut() {
        let fields = split_section("Downloads", &lines(&[2500]), 1024);
        assert_eq!(fields.len(), 3);
        assert!(fields.iter().all(|f| f.value.len() < 1024));
        assert_eq!(fields[2].name, "Downloads(cont'd 2)");
        let joined: String = fields.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(joined.len(), 2500);
    }

    #[test]
    fn test_cut_respects_char_boundaries() {
        let line = vec!["\u{00e9}".repeat(20)];
        let fields = split_section("S", &line, 8);
        assert!(fields.iter().all(|f| f.value.len() < 8));
        let joined: String = fields.iter().map(|f| f.value.as_str()).collect();
        assert_eq!(joined, line[0]);
    }

    #[test]
    fn test_render_report_layout() {
        let report = ChangeReport::builder("1.17", ChangeKind::Added)
            .description("This is a new version.")
            .put_section("Downloads", vec!["Added: client".into(), "Added: server".into()])
            .add_link("server", "https://example.invalid/s")
            .add_link("client", "https://example.invalid/c")
            .build()
            .unwrap();
        let options = RenderOptions {
            entry_url_format: Some("https://example.invalid/notes#{id}".into()),
            ..Default::default()
        };

        let embed = render_report(&report, &options, 1024).unwrap();
        assert_eq!(embed.title(), Some("Minecraft 1.17"));
        assert_eq!(embed.url(), Some("https://example.invalid/notes#1.17"));
        assert_eq!(embed.colour(), Some(0x22BB44));
        assert_eq!(embed.footer().unwrap().text, "Last updated");
        assert_eq!(
            embed.description(),
            Some(
                "This is a new version.\n\n**Links:**\n\
                 [client](https://example.invalid/c) | [server](https://example.invalid/s)"
            )
        );
        assert_eq!(embed.fields().len(), 1);
        assert_eq!(embed.fields()[0].value, "Added: client\nAdded: server");
    }

    #[test]
    fn test_links_skipped_without_description() {
        let report = ChangeReport::builder("1.17", ChangeKind::Added)
            .add_link("client", "https://example.invalid/c")
            .build()
            .unwrap();
        let embed = render_report(&report, &RenderOptions::default(), 1024).unwrap();
        assert_eq!(embed.description(), None);
    }

    #[test]
    fn test_empty_section_logs_anomaly() {
        let capture = crate::logging_facility::init_test_capture();
        let report = ChangeReport::builder("render-anomaly-entry", ChangeKind::Modified)
            .put_section("Libraries", vec![String::new()])
            .build()
            .unwrap();

        let embed = render_report(&report, &RenderOptions::default(), 1024).unwrap();
        assert!(embed.fields().is_empty());
        capture.assert_anomaly("render-anomaly-entry", ANOMALY_EMPTY_SECTION_FIELDS);
        assert!(capture
            .anomalies_for("render-anomaly-entry")
            .iter()
            .all(|e| e.field("err_code") == Some("ERR_INTEGRITY_ANOMALY")));
    }
}
