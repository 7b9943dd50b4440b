//! Completeness analysis for data quality assessment.
//!
//! This module measures missing and blank values per column. It feeds
//! three consumers: the null/blank rule, the completeness scoring table,
//! and the per-column non-null fractions used by the overall score.

use crate::models::{Column, Table};

use super::config::QualityConfig;
use super::models::{CheckError, ColumnCompleteness, CompletenessRow, MissingRow, RuleResult};
use super::stats::round2;

/// Non-null values whose string form is empty after trimming.
fn blank_count(column: &Column) -> usize {
    column
        .non_null()
        .filter(|v| v.to_string().trim().is_empty())
        .count()
}

/// Counts nulls and blank strings per column and derives the fill rate.
pub fn check_missing(table: &Table, _config: &QualityConfig) -> Result<RuleResult, CheckError> {
    let total = table.row_count();

    let rows = table
        .columns()
        .iter()
        .map(|column| {
            let nulls = column.null_count();
            let blanks = blank_count(column);
            let non_empty = total.saturating_sub(nulls + blanks);
            let fill_rate = if total == 0 {
                100.0
            } else {
                round2(non_empty as f64 / total as f64 * 100.0)
            };

            MissingRow {
                column: column.name.clone(),
                nulls,
                blanks,
                non_empty,
                fill_rate,
            }
        })
        .collect();

    Ok(RuleResult::Missing(rows))
}

/// Per-column null fraction and completion score.
pub fn check_completeness_table(
    table: &Table,
    _config: &QualityConfig,
) -> Result<RuleResult, CheckError> {
    let total = table.row_count();

    let rows = table
        .columns()
        .iter()
        .map(|column| {
            let null_pct = if total == 0 {
                0.0
            } else {
                column.null_count() as f64 / total as f64
            };
            CompletenessRow {
                column: column.name.clone(),
                null_pct,
                completion_score: 100.0 * (1.0 - null_pct),
            }
        })
        .collect();

    Ok(RuleResult::Completeness(rows))
}

/// Non-null fraction of every column.
///
/// The denominator is at least one so empty tables report zero.
pub fn column_completeness(table: &Table) -> Vec<ColumnCompleteness> {
    let denominator = table.row_count().max(1) as f64;
    table
        .columns()
        .iter()
        .map(|column| ColumnCompleteness {
            column: column.name.clone(),
            completeness: column.non_null_count() as f64 / denominator,
        })
        .collect()
}

/// Mean non-null fraction; 1.0 when there are no columns.
pub fn average_completeness(columns: &[ColumnCompleteness]) -> f64 {
    if columns.is_empty() {
        return 1.0;
    }
    columns.iter().map(|c| c.completeness).sum::<f64>() / columns.len() as f64
}
