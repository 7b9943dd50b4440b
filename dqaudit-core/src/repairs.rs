//! Repair helpers: imputation suggestions, categorical cleanup and
//! duplicate-row removal.
//!
//! Every operation returns a new [`Table`]; the input is left untouched.

use std::collections::HashMap;

use serde::Serialize;

use crate::error::{DqAuditError, Result};
use crate::models::{Column, ColumnKind, Table, Value, ValueKey};
use crate::quality::duplicate_row_indices;
use crate::quality::stats::quantile;

/// How a suggested fill value was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ImputationStrategy {
    /// Median of the numeric values
    Median,
    /// Most frequent value
    Mode,
}

/// Fill value proposed for a column with missing values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ImputationSuggestion {
    /// Column to fill
    pub column: String,
    /// How the fill value was chosen
    pub strategy: ImputationStrategy,
    /// Value written into missing cells
    pub value: Value,
}

/// Most frequent non-null value; ties go to the smallest value.
fn mode(column: &Column) -> Option<Value> {
    let mut counts: HashMap<ValueKey, (usize, &Value)> = HashMap::new();
    for value in column.non_null() {
        counts.entry(value.key()).or_insert((0, value)).0 += 1;
    }
    counts
        .into_iter()
        .max_by(|(ka, (ca, _)), (kb, (cb, _))| ca.cmp(cb).then_with(|| kb.cmp(ka)))
        .map(|(_, (_, value))| value.clone())
}

/// Proposes a fill value for every column that has missing values.
///
/// Numeric columns get their median, others their mode. Columns with no
/// values at all get no suggestion.
pub fn suggest_imputations(table: &Table) -> Vec<ImputationSuggestion> {
    table
        .columns()
        .iter()
        .filter(|column| column.null_count() > 0)
        .filter_map(|column| {
            if column.is_numeric() {
                let median = quantile(&column.numeric_values(), 0.5).ok()?;
                Some(ImputationSuggestion {
                    column: column.name.clone(),
                    strategy: ImputationStrategy::Median,
                    value: Value::Float(median),
                })
            } else {
                Some(ImputationSuggestion {
                    column: column.name.clone(),
                    strategy: ImputationStrategy::Mode,
                    value: mode(column)?,
                })
            }
        })
        .collect()
}

fn rebuild(table: &Table, columns: Vec<Column>) -> Result<Table> {
    Table::new(table.name(), columns)
}

/// Fills missing values with the suggested values.
///
/// Suggestions naming unknown columns are rejected.
pub fn apply_suggestions(table: &Table, suggestions: &[ImputationSuggestion]) -> Result<Table> {
    for suggestion in suggestions {
        if !table.has_column(&suggestion.column) {
            return Err(DqAuditError::invalid_table(format!(
                "unknown column '{}'",
                suggestion.column
            )));
        }
    }

    let columns = table
        .columns()
        .iter()
        .map(|column| {
            match suggestions.iter().find(|s| s.column == column.name) {
                Some(suggestion) => {
                    let values = column
                        .values
                        .iter()
                        .map(|v| if v.is_null() { suggestion.value.clone() } else { v.clone() })
                        .collect();
                    Column::infer(column.name.clone(), values)
                }
                None => column.clone(),
            }
        })
        .collect();

    rebuild(table, columns)
}

fn clean_category(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Trims, lower-cases and collapses whitespace in the named columns.
///
/// Values become text; missing values stay missing.
pub fn normalize_categorical(table: &Table, columns: &[&str]) -> Result<Table> {
    if let Some(unknown) = columns.iter().find(|name| !table.has_column(name)) {
        return Err(DqAuditError::invalid_table(format!(
            "unknown column '{}'",
            unknown
        )));
    }

    let rebuilt = table
        .columns()
        .iter()
        .map(|column| {
            if !columns.contains(&column.name.as_str()) {
                return column.clone();
            }
            let values = column
                .values
                .iter()
                .map(|v| {
                    if v.is_null() {
                        Value::Null
                    } else {
                        Value::Text(clean_category(&v.to_string()))
                    }
                })
                .collect();
            Column::new(column.name.clone(), ColumnKind::Text, values)
        })
        .collect();

    rebuild(table, rebuilt)
}

/// Result of removing duplicate rows.
#[derive(Debug, Clone, PartialEq)]
pub struct Deduplicated {
    /// Table without repeated rows
    pub table: Table,
    /// Rows removed
    pub dropped_rows: usize,
}

/// Removes full-row duplicates, keeping first occurrences.
pub fn drop_duplicate_rows(table: &Table) -> Result<Deduplicated> {
    let dropped = duplicate_row_indices(table);
    if dropped.is_empty() {
        return Ok(Deduplicated {
            table: table.clone(),
            dropped_rows: 0,
        });
    }

    let columns = table
        .columns()
        .iter()
        .map(|column| {
            let values = column
                .values
                .iter()
                .enumerate()
                .filter(|(index, _)| dropped.binary_search(index).is_err())
                .map(|(_, v)| v.clone())
                .collect();
            Column::new(column.name.clone(), column.kind, values)
        })
        .collect();

    tracing::debug!("Dropped {} duplicate rows from '{}'", dropped.len(), table.name());

    Ok(Deduplicated {
        table: rebuild(table, columns)?,
        dropped_rows: dropped.len(),
    })
}
