//! Plain-text report summary.
//!
//! The layout follows a letter page: violation lines start at y = 600 and
//! step down by 18; once y drops below 50 the next line starts a new page
//! (marked with a form feed) at y = 750.

use std::collections::BTreeMap;

use askama::Template;

use crate::error::{DqAuditError, Result};
use crate::profile::ProfileSummary;
use crate::quality::QualityReport;

const FIRST_LINE_Y: i32 = 600;
const LINE_STEP: i32 = 18;
const BOTTOM_MARGIN: i32 = 50;
const PAGE_TOP_Y: i32 = 750;
const FORM_FEED: char = '\u{000C}';

/// Limits applied when listing violations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Violations listed, in report order
    pub max_violations: usize,
    /// Characters kept per violation line
    pub line_width: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            max_violations: 10,
            line_width: 100,
        }
    }
}

#[derive(Template)]
#[template(path = "summary.txt", escape = "none")]
struct SummaryTemplate {
    n_rows: usize,
    n_cols: usize,
    missing_values: usize,
    score: String,
    lines: Vec<String>,
}

fn violation_lines(report: &QualityReport, options: &SummaryOptions) -> Vec<String> {
    if report.violations.is_empty() {
        return vec!["  No violations found.".to_string()];
    }

    let mut lines = Vec::new();
    let mut y = FIRST_LINE_Y;
    let mut page_break = false;
    for violation in report.violations.iter().take(options.max_violations) {
        let text: String = format!("{} - {} - {}", violation.column, violation.kind, violation.details)
            .chars()
            .take(options.line_width)
            .collect();
        let prefix = if page_break { FORM_FEED.to_string() } else { String::new() };
        lines.push(format!("{prefix}  {text}"));

        y -= LINE_STEP;
        page_break = y < BOTTOM_MARGIN;
        if page_break {
            y = PAGE_TOP_Y;
        }
    }
    lines
}

/// Renders the text summary of a profiled and checked table.
pub fn render_summary(
    profile: &ProfileSummary,
    report: &QualityReport,
    options: &SummaryOptions,
) -> Result<String> {
    let template = SummaryTemplate {
        n_rows: profile.n_rows,
        n_cols: profile.n_cols,
        missing_values: profile.missing_values,
        score: format!("{:.2}", report.score),
        lines: violation_lines(report, options),
    };

    template
        .render()
        .map_err(|e| DqAuditError::render_failed("Failed to render text summary", e))
}

/// Number of violations per kind label.
pub fn violation_counts(report: &QualityReport) -> BTreeMap<String, usize> {
    let mut counts = BTreeMap::new();
    for violation in &report.violations {
        *counts.entry(violation.kind.label().to_string()).or_insert(0) += 1;
    }
    counts
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quality::{Violation, ViolationKind};

    fn create_report(violations: Vec<Violation>) -> QualityReport {
        QualityReport {
            table_name: "people".to_string(),
            row_count: 4,
            column_count: 2,
            violations,
            score: 61.234,
            validations: Vec::new(),
            completeness: Vec::new(),
            average_completeness: 0.875,
            failed_checks: Vec::new(),
            anomaly_scan: None,
        }
    }

    fn profile() -> ProfileSummary {
        ProfileSummary {
            n_rows: 4,
            n_cols: 2,
            missing_values: 1,
        }
    }

    #[test]
    fn test_summary_header() {
        let report = create_report(Vec::new());
        let text = render_summary(&profile(), &report, &SummaryOptions::default()).unwrap();

        assert!(text.starts_with("Data Quality Report"));
        assert!(text.contains("Total Rows: 4"));
        assert!(text.contains("Total Columns: 2"));
        assert!(text.contains("Missing Values: 1"));
        assert!(text.contains("DQ Score: 61.23"));
        assert!(text.contains("No violations found."));
    }

    #[test]
    fn test_summary_lists_first_violations() {
        let violations: Vec<Violation> = (0..12)
            .map(|i| Violation::new(format!("c{i}"), ViolationKind::Outliers, "1 values outside IQR bounds"))
            .collect();
        let report = create_report(violations);
        let text = render_summary(&profile(), &report, &SummaryOptions::default()).unwrap();

        assert!(text.contains("c0 - Outliers - 1 values outside IQR bounds"));
        assert!(text.contains("c9 - Outliers"));
        assert!(!text.contains("c10 - Outliers"));
        assert!(!text.contains(FORM_FEED));
    }

    #[test]
    fn test_long_lines_are_truncated() {
        let report = create_report(vec![Violation::new("c", ViolationKind::Outliers, "x".repeat(300))]);
        let lines = violation_lines(&report, &SummaryOptions::default());
        assert_eq!(lines[0].trim_start().chars().count(), 100);
    }

    #[test]
    fn test_page_break_after_bottom_margin() {
        let violations: Vec<Violation> = (0..40)
            .map(|i| Violation::new(format!("c{i}"), ViolationKind::Outliers, "d"))
            .collect();
        let options = SummaryOptions {
            max_violations: 40,
            ..SummaryOptions::default()
        };
        let lines = violation_lines(&create_report(violations), &options);

        // the 31st line is drawn at y = 60, leaving 42 for the next one
        let breaks: Vec<usize> = lines
            .iter()
            .enumerate()
            .filter(|(_, l)| l.starts_with(FORM_FEED))
            .map(|(i, _)| i)
            .collect();
        assert_eq!(breaks, vec![31]);
    }

    #[test]
    fn test_violation_counts() {
        let report = create_report(vec![
            Violation::new("a", ViolationKind::MissingData, "50.0% missing"),
            Violation::new("b", ViolationKind::MissingData, "25.0% missing"),
            Violation::table_wide(ViolationKind::DuplicateRows, "1 duplicate rows found"),
        ]);
        let counts = violation_counts(&report);
        assert_eq!(counts["Missing Data"], 2);
        assert_eq!(counts["Duplicate Rows"], 1);
    }
}
