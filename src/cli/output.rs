//! Run summary output.

use std::env;

use comfy_table::{presets, Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use tracing::error;

use crate::services::RunReport;

/// Log a fatal error to the configured sinks and return its full context
/// chain for stderr.
pub fn log_fatal(err: &anyhow::Error) -> String {
    let message = format!("{err:#}");
    error!(error = %message, "gitable stopped with an error");
    message
}

/// Render a run report as a two-column table.
pub fn format_report(report: &RunReport) -> String {
    format_report_with(report, supports_color())
}

pub fn format_report_with(report: &RunReport, use_colors: bool) -> String {
    let mut table = Table::new();
    table
        .load_preset(presets::UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            Cell::new("Sync run").add_attribute(Attribute::Bold),
            Cell::new("Count").add_attribute(Attribute::Bold),
        ]);

    for (label, value) in report.entries() {
        let mut count = Cell::new(value).set_alignment(CellAlignment::Right);
        if use_colors && value > 0 && is_failure(label) {
            count = count.fg(Color::Red);
        }
        table.add_row(vec![Cell::new(label), count]);
    }

    table.to_string()
}

fn is_failure(label: &str) -> bool {
    label.ends_with("failed") || label == "Rows skipped"
}

fn supports_color() -> bool {
    if env::var("NO_COLOR").is_ok() {
        return false;
    }
    !matches!(env::var("TERM").as_deref(), Ok("dumb"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_report_lists_every_counter() {
        let report = RunReport {
            rows_seen: 12,
            rows_updated: 10,
            rows_deleted: 1,
            rows_skipped: 1,
            ..Default::default()
        };
        let rendered = format_report_with(&report, false);
        for (label, _) in report.entries() {
            assert!(rendered.contains(label), "missing {label}");
        }
        assert!(rendered.contains("12"));
    }

    #[test]
    fn test_log_fatal_renders_context_chain() {
        let err = anyhow::anyhow!("Airtable list_rows returned 401").context("Sync run failed");
        assert_eq!(log_fatal(&err), "Sync run failed: Airtable list_rows returned 401");
    }

    #[test]
    fn test_failure_labels() {
        assert!(is_failure("Deletes failed"));
        assert!(is_failure("Creates failed"));
        assert!(is_failure("Label patches failed"));
        assert!(!is_failure("Rows created"));
    }
}
