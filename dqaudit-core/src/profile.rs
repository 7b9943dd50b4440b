//! Table profiling and schema inference.

use std::collections::HashSet;

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};

use crate::models::{Column, ColumnKind, Table};
use crate::quality::stats::{mean, min_max, sample_std};

/// Leading non-null values inspected when guessing a date column.
const DATE_SAMPLE_SIZE: usize = 200;
/// Share of sampled values that must parse as dates.
const DATE_LIKE_RATIO: f64 = 0.6;
/// Sample values kept per column.
const SAMPLE_VALUES: usize = 5;

/// Table-level counts.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSummary {
    /// Rows in the table
    pub n_rows: usize,
    /// Columns in the table
    pub n_cols: usize,
    /// Null cells across all columns
    pub missing_values: usize,
}

/// Aggregates of a numeric column's non-null values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NumericSummary {
    /// Smallest value
    pub min: f64,
    /// Largest value
    pub max: f64,
    /// Arithmetic mean
    pub mean: f64,
    /// Sample standard deviation; absent below two values
    pub std: Option<f64>,
}

/// Profile of a single column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnProfile {
    /// Column name
    pub name: String,
    /// Storage kind
    pub kind: ColumnKind,
    /// Dtype label (`int64`, `object`, ...)
    pub dtype: String,
    /// Non-null cells
    pub non_null_count: usize,
    /// Null cells
    pub missing_count: usize,
    /// Distinct non-null values
    pub unique_count: usize,
    /// Present for numeric columns with at least one value
    pub numeric: Option<NumericSummary>,
}

impl ColumnProfile {
    /// Profiles a column.
    pub fn from_column(column: &Column) -> Self {
        let numeric = if column.is_numeric() {
            let values = column.numeric_values();
            match (min_max(&values), mean(&values)) {
                (Some((min, max)), Some(mean)) => Some(NumericSummary {
                    min,
                    max,
                    mean,
                    std: sample_std(&values),
                }),
                _ => None,
            }
        } else {
            None
        };

        Self {
            name: column.name.clone(),
            kind: column.kind,
            dtype: column.kind.dtype_label().to_string(),
            non_null_count: column.non_null_count(),
            missing_count: column.null_count(),
            unique_count: column.distinct_count(),
            numeric,
        }
    }
}

/// Profile of a whole table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TableProfile {
    /// Table-level counts
    pub summary: ProfileSummary,
    /// One profile per column, in table order
    pub columns: Vec<ColumnProfile>,
}

/// Profiles every column of a table.
pub fn profile_table(table: &Table) -> TableProfile {
    TableProfile {
        summary: ProfileSummary {
            n_rows: table.row_count(),
            n_cols: table.column_count(),
            missing_values: table.missing_value_count(),
        },
        columns: table.columns().iter().map(ColumnProfile::from_column).collect(),
    }
}

/// Semantic type guessed for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InferredType {
    /// Whole numbers
    Integer,
    /// Floating-point numbers
    Float,
    /// True/false values
    Boolean,
    /// Text that mostly parses as dates
    Datetime,
    /// Anything else
    String,
}

/// Inferred schema entry for one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSchema {
    /// Column name
    pub name: String,
    /// Type read from the values
    pub inferred_type: InferredType,
    /// Whether any value is missing
    pub nullable: bool,
    /// Distinct non-null values
    pub unique_count: usize,
    /// First few non-null values as text
    pub sample_values: Vec<String>,
}

const DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d/%m/%Y",
    "%m/%d/%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%b %d %Y",
    "%B %d, %Y",
    "%d %B %Y",
];

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y/%m/%d %H:%M:%S",
];

/// Whether a string looks like a calendar date or timestamp.
pub fn is_date_like(raw: &str) -> bool {
    let raw = raw.trim();
    if raw.is_empty() {
        return false;
    }
    DateTime::parse_from_rfc3339(raw).is_ok()
        || DATETIME_FORMATS
            .iter()
            .any(|f| NaiveDateTime::parse_from_str(raw, f).is_ok())
        || DATE_FORMATS
            .iter()
            .any(|f| NaiveDate::parse_from_str(raw, f).is_ok())
}

fn infer_type(column: &Column) -> InferredType {
    match column.kind {
        ColumnKind::Integer => return InferredType::Integer,
        ColumnKind::Float => return InferredType::Float,
        ColumnKind::Boolean => return InferredType::Boolean,
        ColumnKind::Temporal => return InferredType::Datetime,
        ColumnKind::Text => {}
    }

    let sample: Vec<String> = column
        .non_null()
        .take(DATE_SAMPLE_SIZE)
        .map(ToString::to_string)
        .collect();
    if sample.is_empty() {
        return InferredType::String;
    }

    let date_like = sample.iter().filter(|v| is_date_like(v)).count();
    if date_like as f64 / sample.len() as f64 > DATE_LIKE_RATIO {
        InferredType::Datetime
    } else {
        InferredType::String
    }
}

/// Infers a schema entry for every column.
pub fn infer_schema(table: &Table) -> Vec<ColumnSchema> {
    table
        .columns()
        .iter()
        .map(|column| {
            let distinct: HashSet<_> = column.non_null().map(|v| v.key()).collect();
            ColumnSchema {
                name: column.name.clone(),
                inferred_type: infer_type(column),
                nullable: column.null_count() > 0,
                unique_count: distinct.len(),
                sample_values: column
                    .non_null()
                    .take(SAMPLE_VALUES)
                    .map(ToString::to_string)
                    .collect(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn create_table() -> Table {
        Table::from_rows(
            "orders",
            &["id", "amount", "placed", "note"],
            vec![
                vec![1.into(), 10.0.into(), "2024-01-01".into(), "a".into()],
                vec![2.into(), Value::Null, "2024-01-02".into(), "b".into()],
                vec![3.into(), 30.0.into(), "2024/01/03".into(), Value::Null],
                vec![4.into(), 20.0.into(), "soon".into(), "a".into()],
            ],
        )
        .unwrap()
    }

    #[test]
    fn test_profile_summary() {
        let profile = profile_table(&create_table());
        assert_eq!(profile.summary.n_rows, 4);
        assert_eq!(profile.summary.n_cols, 4);
        assert_eq!(profile.summary.missing_values, 2);
    }

    #[test]
    fn test_numeric_column_profile() {
        let profile = profile_table(&create_table());
        let amount = &profile.columns[1];

        assert_eq!(amount.dtype, "float64");
        assert_eq!(amount.non_null_count, 3);
        assert_eq!(amount.missing_count, 1);
        let numeric = amount.numeric.as_ref().unwrap();
        assert_eq!(numeric.min, 10.0);
        assert_eq!(numeric.max, 30.0);
        assert_eq!(numeric.mean, 20.0);
        assert!((numeric.std.unwrap() - 10.0).abs() < 1e-12);
    }

    #[test]
    fn test_text_column_has_no_numeric_summary() {
        let profile = profile_table(&create_table());
        let note = &profile.columns[3];
        assert!(note.numeric.is_none());
        assert_eq!(note.unique_count, 2);
    }

    #[test]
    fn test_schema_detects_dates() {
        let schema = infer_schema(&create_table());

        assert_eq!(schema[0].inferred_type, InferredType::Integer);
        assert_eq!(schema[1].inferred_type, InferredType::Float);
        assert!(schema[1].nullable);
        // 3 of 4 values parse as dates
        assert_eq!(schema[2].inferred_type, InferredType::Datetime);
        assert_eq!(schema[3].inferred_type, InferredType::String);
        assert_eq!(schema[3].sample_values, vec!["a", "b", "a"]);
    }

    #[test]
    fn test_is_date_like() {
        assert!(is_date_like("2024-03-01"));
        assert!(is_date_like("2024-03-01T10:00:00Z"));
        assert!(is_date_like("2024-03-01 10:00:00"));
        assert!(is_date_like("Mar 01 2024"));
        assert!(!is_date_like("hello"));
        assert!(!is_date_like("   "));
    }
}
