//! Uniqueness analysis for data quality assessment.
//!
//! This module finds duplicate values at both row and column level. In
//! both cases the first occurrence of each group is not counted, and
//! missing values compare equal to each other.

use std::collections::HashSet;

use crate::models::{Column, Table, ValueKey};

use super::config::QualityConfig;
use super::models::{ALL_COLUMNS, CheckError, DuplicateRow, DuplicateScope, RuleResult};

/// Indices of rows identical to an earlier row across every column.
pub fn duplicate_row_indices(table: &Table) -> Vec<usize> {
    let mut seen: HashSet<Vec<ValueKey>> = HashSet::with_capacity(table.row_count());
    (0..table.row_count())
        .filter(|&index| {
            let key: Vec<ValueKey> = table
                .columns()
                .iter()
                .map(|column| column.values[index].key())
                .collect();
            !seen.insert(key)
        })
        .collect()
}

/// Number of full-row duplicates, first occurrences excluded.
pub fn count_duplicate_rows(table: &Table) -> usize {
    duplicate_row_indices(table).len()
}

fn count_duplicate_values(column: &Column) -> usize {
    let mut seen: HashSet<ValueKey> = HashSet::new();
    column
        .values
        .iter()
        .filter(|value| !seen.insert(value.key()))
        .count()
}

/// Reports full-row duplicates and per-column repeated values.
pub fn check_duplicates(table: &Table, _config: &QualityConfig) -> Result<RuleResult, CheckError> {
    let mut rows = Vec::new();

    let duplicate_rows = count_duplicate_rows(table);
    if duplicate_rows > 0 {
        rows.push(DuplicateRow {
            column: ALL_COLUMNS.to_string(),
            scope: DuplicateScope::Rows,
            count: duplicate_rows,
        });
    }

    for column in table.columns() {
        let count = count_duplicate_values(column);
        if count > 0 {
            rows.push(DuplicateRow {
                column: column.name.clone(),
                scope: DuplicateScope::Values,
                count,
            });
        }
    }

    Ok(RuleResult::Duplicates(rows))
}
