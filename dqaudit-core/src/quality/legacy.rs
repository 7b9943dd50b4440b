//! Inline threshold checks that run before the rule battery.
//!
//! Their findings lead the violation list: low completeness per column,
//! presence of full-row duplicates, and text columns that are mostly
//! non-numeric once coerced to numbers.

use crate::models::{Column, ColumnKind, Table, Value};

use super::config::QualityConfig;
use super::models::{ColumnCompleteness, Violation, ViolationKind};
use super::uniqueness::count_duplicate_rows;

/// Whether a value survives coercion to a number.
///
/// Text is parsed after trimming; a value that parses to `NaN` counts
/// as missing after coercion and therefore fails.
fn coerces_to_number(value: &Value) -> bool {
    match value {
        Value::Int(_) | Value::Bool(_) => true,
        Value::Float(f) => !f.is_nan(),
        Value::Text(s) => s.trim().parse::<f64>().is_ok_and(|f| !f.is_nan()),
        Value::Temporal(_) | Value::Null => false,
    }
}

/// Fraction of non-null values that fail numeric coercion, `None` for
/// columns without values.
fn non_numeric_fraction(column: &Column) -> Option<f64> {
    let total = column.non_null_count();
    if total == 0 {
        return None;
    }
    // Numeric, boolean and temporal columns coerce cleanly
    if column.kind != ColumnKind::Text {
        return Some(0.0);
    }
    let bad = column.non_null().filter(|v| !coerces_to_number(v)).count();
    Some(bad as f64 / total as f64)
}

/// Runs the inline checks.
pub fn legacy_violations(
    table: &Table,
    completeness: &[ColumnCompleteness],
    config: &QualityConfig,
) -> Vec<Violation> {
    let mut violations = Vec::new();

    for column in completeness {
        if column.completeness < config.completeness_min {
            violations.push(Violation::new(
                &column.column,
                ViolationKind::MissingData,
                format!("{:.1}% missing", (1.0 - column.completeness) * 100.0),
            ));
        }
    }

    let duplicate_rows = count_duplicate_rows(table);
    if duplicate_rows > 0 {
        violations.push(Violation::table_wide(
            ViolationKind::DuplicateRows,
            format!("{} duplicate rows found", duplicate_rows),
        ));
    }

    // Coercion always yields a numeric series, so only the bad fraction matters
    for column in table.columns() {
        if let Some(bad) = non_numeric_fraction(column)
            && bad > config.type_conformance_max_bad
        {
            violations.push(Violation::new(
                &column.name,
                ViolationKind::TypeConformance,
                format!("{:.1}% values not numeric", bad * 100.0),
            ));
        }
    }

    violations
}
