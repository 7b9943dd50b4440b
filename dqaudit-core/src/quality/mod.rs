//! Data quality assessment module.
//!
//! This module runs a fixed battery of independent rule checks over a
//! [`Table`](crate::models::Table):
//! - **Datatype**: kind uniformity per column
//! - **Range**: name-driven numeric bounds (`age`, `salary`)
//! - **Missing**: null and blank counts, fill rate
//! - **Lookup**: values outside the most frequent categories
//! - **Contact**: email and phone formats
//! - **Duplicates**: repeated rows and values
//! - **Foreign keys**: `x_id` values absent from column `x`
//! - **Outliers**: interquartile-range bounds
//! - **Spikes**: large consecutive changes along the row order
//! - **Completeness**: per-column completion score
//!
//! Findings are normalized into one [`Violation`] list and reduced, with
//! average completeness, to a single score.
//!
//! # Example
//! ```rust,ignore
//! use dqaudit_core::quality::{QualityAnalyzer, QualityConfig};
//!
//! let analyzer = QualityAnalyzer::new(QualityConfig::default());
//! let report = analyzer.analyze(&table)?;
//! println!("Quality score: {:.2}", report.score);
//! ```

mod analyzer;
mod anomaly;
mod completeness;
mod config;
mod consistency;
pub mod drift;
mod isolation;
mod legacy;
mod models;
mod normalize;
pub mod scoring;
pub mod stats;
mod uniqueness;
mod validity;

// Re-export public API
pub use analyzer::{QualityAnalyzer, run_rule};
pub use completeness::{average_completeness, column_completeness};
pub use config::{AnomalyConfig, ConfigValidationError, QualityConfig};
pub use models::{
    ALL_COLUMNS, AnomalyScan, CheckError, CheckFailure, ColumnCompleteness, CompletenessRow,
    ContactRow, ContactType, DatatypeRow, DuplicateRow, DuplicateScope, ForeignKeyRow, LookupRow,
    MissingRow, OutlierRow, QualityReport, RangeRow, RuleName, RuleResult, SpikeRow, Violation,
    ViolationKind,
};
pub use normalize::normalize;
pub use scoring::{ScoreWeights, compute_score, weighted_score};
pub use uniqueness::{count_duplicate_rows, duplicate_row_indices};
