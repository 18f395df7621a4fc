//! Human-readable summary renderer for change reports.

use crate::model::{ChangeKind, ChangeReport};

/// Render a Markdown summary of a [`ChangeReport`].
///
/// Used by the CLI for ad hoc comparisons; webhook delivery goes through the
/// embed renderer instead.
pub fn render_human_summary(report: &ChangeReport) -> String {
    let mut out = String::new();

    let kind_label = match report.kind() {
        ChangeKind::Added => "Added",
        ChangeKind::Removed => "Removed",
        ChangeKind::Modified => "Modified",
    };
    out.push_str(&format!("## {} `{}`\n\n", kind_label, report.entry_id()));

    if !report.description().is_empty() {
        out.push_str(report.description());
        out.push_str("\n\n");
    }
    if let Some(timestamp) = report.timestamp() {
        out.push_str(&format!("**Published**: {}\n\n", timestamp.to_rfc3339()));
    }

    if report.sections().is_empty() {
        if report.kind() != ChangeKind::Removed {
            out.push_str("_No tracked fields changed._\n");
        }
    } else {
        for section in report.sections() {
            out.push_str(&format!("### {}\n\n", section.title));
            for line in &section.lines {
                // library lines are already bulleted
                if line.starts_with("- ") {
                    out.push_str(line);
                } else {
                    out.push_str("- ");
                    out.push_str(line);
                }
                out.push('\n');
            }
            out.push('\n');
        }
    }

    if !report.links().is_empty() {
        out.push_str("### Links\n\n");
        for link in report.links() {
            out.push_str(&format!("- [{}]({})\n", link.label, link.url));
        }
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_summary_lists_sections_and_links() {
        let report = ChangeReport::builder("1.17", ChangeKind::Modified)
            .description("Changes since 1.16.5")
            .put_section("Downloads", vec!["Added: server".into()])
            .put_section("Libraries", vec!["- com.mojang:brigadier: 1.0.17 -> 1.0.18".into()])
            .add_link("server", "https://example.invalid/server.jar")
            .build()
            .unwrap();

        let s = render_human_summary(&report);
        assert!(s.starts_with("## Modified `1.17`"));
        assert!(s.contains("Changes since 1.16.5"));
        assert!(s.contains("### Downloads\n\n- Added: server\n"));
        assert!(s.contains("\n- com.mojang:brigadier: 1.0.17 -> 1.0.18\n"));
        assert!(!s.contains("- - com.mojang"));
        assert!(s.contains("- [server](https://example.invalid/server.jar)"));
    }

    #[test]
    fn test_summary_without_sections() {
        let report = ChangeReport::builder("1.17", ChangeKind::Modified)
            .description("No changes since 1.16.5")
            .build()
            .unwrap();
        let s = render_human_summary(&report);
        assert!(s.contains("_No tracked fields changed._"));
        assert!(!s.contains("### Links"));
    }

    #[test]
    fn test_summary_removed_has_no_placeholder() {
        let report = ChangeReport::builder("1.0", ChangeKind::Removed)
            .description("gone")
            .build()
            .unwrap();
        assert!(!render_human_summary(&report).contains("_No tracked"));
    }
}
