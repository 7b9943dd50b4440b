//! Report outputs built from a [`QualityReport`](crate::quality::QualityReport).
//!
//! - [`export`]: violation CSV, report JSON and optional zstd compression
//! - [`summary`]: paginated plain-text summary and per-kind scorecard
//! - [`issues`]: issue tickets with sample rows and remediation hints

pub mod export;
pub mod issues;
pub mod summary;

pub use export::{report_json, violations_csv};
pub use issues::{Issue, IssueLogger, IssueRecord, Severity};
pub use summary::{SummaryOptions, render_summary, violation_counts};
