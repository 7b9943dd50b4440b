//! Core table model, rule checks and scoring for dqaudit.
//!
//! This crate provides everything the `dqaudit` binary runs on a dataset:
//! ingestion into an in-memory [`Table`], a fixed battery of rule checks,
//! normalization of their findings into [`Violation`]s, and a single quality
//! score. Supporting modules profile tables, suggest repairs and render
//! reports.
//!
//! # Guarantees
//! - Input tables are never mutated; repairs return new tables
//! - A failing rule check degrades to an empty result instead of aborting the run
//! - Reports carry no timestamps, so repeated runs compare equal. The one
//!   exception is [`QualityReport::anomaly_scan`]: the isolation-forest scan
//!   runs under a wall-clock budget, so on a loaded machine one run may
//!   degrade where another completes. Violations and the score never depend
//!   on it.
//!
//! # Example
//! ```rust,no_run
//! use dqaudit_core::{QualityAnalyzer, ingest::read_table};
//!
//! # fn main() -> dqaudit_core::Result<()> {
//! let table = read_table(b"id,age\n1,30\n2,150\n", "people.csv")?;
//! let report = QualityAnalyzer::with_defaults().analyze(&table)?;
//! println!("{}: score {:.2}", report.table_name, report.score);
//! # Ok(())
//! # }
//! ```

pub mod error;
pub mod ingest;
pub mod logging;
pub mod models;
pub mod profile;
pub mod quality;
pub mod repairs;
pub mod report;

// Re-export commonly used types
pub use error::{DqAuditError, Result};
pub use logging::init_logging;
pub use models::{Column, ColumnKind, Table, Value};
pub use profile::{TableProfile, infer_schema, profile_table};
pub use quality::{
    AnomalyConfig, QualityAnalyzer, QualityConfig, QualityReport, RuleName, RuleResult, Violation,
    ViolationKind,
};
