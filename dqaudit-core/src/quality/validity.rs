//! Validity checks: numeric ranges, categorical lookups and key pairing.
//!
//! All three rules pick their targets by column name or kind:
//! - **Range**: `age` columns must lie in 0-120, `salary` columns in
//!   0 to five times their 99th percentile; other numeric columns are
//!   bounded by their own observed extremes and so never flag
//! - **Lookup**: the most frequent values of a text column form its
//!   allowed set
//! - **Foreign keys**: `x_id` must only hold values present in column `x`

use std::collections::{HashMap, HashSet};

use crate::models::{ColumnKind, Table, format_float};

use super::config::QualityConfig;
use super::models::{CheckError, ForeignKeyRow, LookupRow, RangeRow, RuleResult};
use super::stats::{min_max, quantile_sorted};

const KEY_SUFFIX: &str = "_id";

/// Renders a range bound using the column's own number formatting.
fn format_bound(kind: ColumnKind, value: f64) -> String {
    match kind {
        ColumnKind::Integer => format!("{}", value as i64),
        _ => format_float(value),
    }
}

/// Upper bound for salary columns: five times the 99th percentile.
///
/// Infinite values carry through the interpolation, so a column holding
/// `inf` gets an unbounded upper limit instead of an error.
fn salary_upper_bound(values: &[f64]) -> f64 {
    let mut sorted = values.to_vec();
    sorted.sort_by(f64::total_cmp);
    let upper = quantile_sorted(&sorted, 0.99) * 5.0;
    if upper.is_nan() { f64::INFINITY } else { upper }
}

/// Validates numeric columns against name-driven ranges.
pub fn check_ranges(table: &Table, _config: &QualityConfig) -> Result<RuleResult, CheckError> {
    let mut rows = Vec::new();

    for column in table.numeric_columns() {
        let values = column.numeric_values();
        let Some((min, max)) = min_max(&values) else {
            continue;
        };

        let name = column.name.to_lowercase();
        let (lower, upper, rule_range) = if name.contains("age") {
            (0.0, 120.0, "0 - 120".to_string())
        } else if name.contains("salary") {
            let upper = salary_upper_bound(&values);
            (0.0, upper, format!("0 - {}", format_float(upper)))
        } else {
            (
                min,
                max,
                format!(
                    "{} - {}",
                    format_bound(column.kind, min),
                    format_bound(column.kind, max)
                ),
            )
        };

        let invalid_values = values.iter().filter(|&&v| v < lower || v > upper).count();

        rows.push(RangeRow {
            column: column.name.clone(),
            min,
            max,
            rule_range,
            invalid_values,
        });
    }

    Ok(RuleResult::Range(rows))
}

/// Frequencies of trimmed string forms, most frequent first.
///
/// Ties keep first-occurrence order.
fn value_counts<'a>(values: impl Iterator<Item = &'a str>) -> Vec<(&'a str, usize)> {
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut counts: Vec<(&str, usize)> = Vec::new();

    for value in values {
        match index.get(value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                index.insert(value, counts.len());
                counts.push((value, 1));
            }
        }
    }

    // Stable sort keeps first-occurrence order among equal counts
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts
}

/// Validates text columns against their most frequent categories.
pub fn check_lookups(table: &Table, config: &QualityConfig) -> Result<RuleResult, CheckError> {
    let mut rows = Vec::new();

    for column in table.text_columns() {
        let data: Vec<String> = column
            .non_null()
            .map(|v| v.to_string().trim().to_string())
            .collect();
        if data.is_empty() {
            continue;
        }

        let counts = value_counts(data.iter().map(String::as_str));
        let allowed: Vec<&str> = counts
            .iter()
            .take(config.lookup_top_n)
            .map(|(value, _)| *value)
            .collect();
        let invalid_values_count = counts
            .iter()
            .skip(config.lookup_top_n)
            .map(|(_, count)| count)
            .sum();

        rows.push(LookupRow {
            column: column.name.clone(),
            allowed_values: allowed.into_iter().map(str::to_string).collect(),
            invalid_values_count,
        });
    }

    Ok(RuleResult::Lookup(rows))
}

/// Validates `x_id` columns against the values of column `x`.
///
/// This is a same-table heuristic, not a cross-table constraint.
pub fn check_foreign_keys(table: &Table, _config: &QualityConfig) -> Result<RuleResult, CheckError> {
    let mut rows = Vec::new();

    for column in table.columns() {
        let Some(referenced_name) = column.name.strip_suffix(KEY_SUFFIX) else {
            continue;
        };
        if referenced_name.is_empty() {
            continue;
        }
        let Some(referenced) = table.column_by_name(referenced_name) else {
            continue;
        };

        let known: HashSet<_> = referenced.non_null().map(|v| v.key()).collect();
        let orphan_count = column
            .non_null()
            .filter(|v| !known.contains(&v.key()))
            .count();

        tracing::trace!(
            "Key column '{}' -> '{}': {} orphan values",
            column.name,
            referenced_name,
            orphan_count
        );

        rows.push(ForeignKeyRow {
            column: column.name.clone(),
            referenced_column: referenced_name.to_string(),
            orphan_count,
        });
    }

    Ok(RuleResult::ForeignKeys(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn create_table(headers: &[&str], rows: Vec<Vec<Value>>) -> Table {
        Table::from_rows("test_table", headers, rows).unwrap()
    }

    fn single_column(name: &str, values: Vec<Value>) -> Table {
        create_table(&[name], values.into_iter().map(|v| vec![v]).collect())
    }

    fn range_rows(table: &Table) -> Vec<RangeRow> {
        match check_ranges(table, &QualityConfig::default()).unwrap() {
            RuleResult::Range(rows) => rows,
            other => panic!("unexpected result {:?}", other),
        }
    }

    fn lookup_rows(table: &Table) -> Vec<LookupRow> {
        match check_lookups(table, &QualityConfig::default()).unwrap() {
            RuleResult::Lookup(rows) => rows,
            other => panic!("unexpected result {:?}", other),
        }
    }

    fn key_rows(table: &Table) -> Vec<ForeignKeyRow> {
        match check_foreign_keys(table, &QualityConfig::default()).unwrap() {
            RuleResult::ForeignKeys(rows) => rows,
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_age_range_flags_out_of_bounds() {
        let table = single_column("Age", vec![45.into(), 150.into(), 30.into()]);

        let rows = range_rows(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].rule_range, "0 - 120");
        assert_eq!(rows[0].invalid_values, 1);
        assert_eq!(rows[0].min, 30.0);
        assert_eq!(rows[0].max, 150.0);
    }

    #[test]
    fn test_age_checked_before_salary() {
        let table = single_column("salary_age", vec![130.into(), 10.into()]);
        let rows = range_rows(&table);
        assert_eq!(rows[0].rule_range, "0 - 120");
        assert_eq!(rows[0].invalid_values, 1);
    }

    #[test]
    fn test_salary_range_uses_percentile() {
        let table = single_column(
            "base_salary",
            vec![1000.into(), 1000.into(), 1000.into(), (-5).into()],
        );

        let rows = range_rows(&table);
        // p99 of [-5, 1000, 1000, 1000] is 1000
        assert_eq!(rows[0].rule_range, "0 - 5000.0");
        assert_eq!(rows[0].invalid_values, 1);
    }

    #[test]
    fn test_infinite_salary_leaves_other_columns_checked() {
        let table = create_table(
            &["age", "salary"],
            vec![
                vec![30.into(), 100.0.into()],
                vec![150.into(), 200.0.into()],
                vec![40.into(), f64::INFINITY.into()],
            ],
        );

        let rows = range_rows(&table);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].column, "age");
        assert_eq!(rows[0].invalid_values, 1);
        assert_eq!(rows[1].rule_range, "0 - inf");
        assert_eq!(rows[1].invalid_values, 0);
    }

    #[test]
    fn test_unrecognized_column_never_flags() {
        let table = single_column("amount", vec![1.into(), 1_000_000.into(), (-40).into()]);

        let rows = range_rows(&table);
        assert_eq!(rows[0].rule_range, "-40 - 1000000");
        assert_eq!(rows[0].invalid_values, 0);
    }

    #[test]
    fn test_float_bounds_formatting() {
        let table = single_column("ratio", vec![0.5.into(), 2.0.into()]);
        assert_eq!(range_rows(&table)[0].rule_range, "0.5 - 2.0");
    }

    #[test]
    fn test_range_skips_text_and_empty_columns() {
        let table = create_table(
            &["name", "age"],
            vec![vec!["a".into(), Value::Null], vec!["b".into(), Value::Null]],
        );
        assert!(range_rows(&table).is_empty());
    }

    #[test]
    fn test_lookup_flags_rarest_category() {
        let mut values = Vec::new();
        for (i, name) in ["a", "b", "c", "d", "e", "f", "g", "h", "i", "j"]
            .iter()
            .enumerate()
        {
            for _ in 0..(i + 2) {
                values.push(Value::from(*name));
            }
        }
        values.push("rare".into());
        let table = single_column("category", values);

        let rows = lookup_rows(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].allowed_values.len(), 10);
        assert!(!rows[0].allowed_values.contains(&"rare".to_string()));
        assert_eq!(rows[0].invalid_values_count, 1);
    }

    #[test]
    fn test_lookup_tie_break_by_first_occurrence() {
        let values: Vec<Value> = (0..11).map(|i| Value::from(format!("v{}", i))).collect();
        let table = single_column("code", values);

        let rows = lookup_rows(&table);
        assert_eq!(rows[0].allowed_values[0], "v0");
        assert_eq!(rows[0].allowed_values[9], "v9");
        assert_eq!(rows[0].invalid_values_count, 1);
    }

    #[test]
    fn test_lookup_trims_values() {
        let table = single_column("status", vec![" open".into(), "open ".into(), Value::Null]);

        let rows = lookup_rows(&table);
        assert_eq!(rows[0].allowed_values, vec!["open".to_string()]);
        assert_eq!(rows[0].invalid_values_count, 0);
    }

    #[test]
    fn test_lookup_skips_numeric_and_all_null_columns() {
        let table = create_table(
            &["n", "t"],
            vec![vec![1.into(), Value::Null], vec![2.into(), Value::Null]],
        );
        // all-null columns are float, so no text column remains
        assert!(lookup_rows(&table).is_empty());
    }

    #[test]
    fn test_foreign_key_orphans() {
        let table = create_table(
            &["customer", "customer_id"],
            vec![
                vec![1.into(), 1.into()],
                vec![2.into(), 2.0.into()],
                vec![3.into(), 9.into()],
                vec![4.into(), Value::Null],
            ],
        );

        let rows = key_rows(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].referenced_column, "customer");
        assert_eq!(rows[0].orphan_count, 1);
    }

    #[test]
    fn test_foreign_key_requires_paired_column() {
        let table = create_table(&["order_id", "_id"], vec![vec![1.into(), 2.into()]]);
        assert!(key_rows(&table).is_empty());
    }
}
