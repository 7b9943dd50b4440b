//! Anomaly detection for data quality assessment.
//!
//! This module provides two per-column statistical rules on numeric
//! columns: interquartile-range outliers and consecutive spike/drop
//! changes along the row order.

use crate::models::{Column, Table};

use super::config::QualityConfig;
use super::models::{CheckError, OutlierRow, RuleResult, SpikeRow};
use super::stats::quantile;

/// Finite numeric values of a column in row order.
///
/// Non-finite values would poison the quartiles, so they are skipped.
fn finite_values(column: &Column) -> Vec<f64> {
    column
        .numeric_values()
        .into_iter()
        .filter(|v| v.is_finite())
        .collect()
}

/// Detects IQR outliers in numeric columns.
///
/// Columns with fewer than `min_series_len` values are skipped. Only
/// columns with at least one outlier are reported.
pub fn check_outliers(table: &Table, config: &QualityConfig) -> Result<RuleResult, CheckError> {
    let mut rows = Vec::new();

    for column in table.numeric_columns() {
        let values = finite_values(column);
        if values.is_empty() || values.len() < config.min_series_len {
            continue;
        }

        let q1 = quantile(&values, 0.25)?;
        let q3 = quantile(&values, 0.75)?;
        let iqr = q3 - q1;
        let lower_bound = q1 - config.iqr_multiplier * iqr;
        let upper_bound = q3 + config.iqr_multiplier * iqr;

        let outlier_count = values
            .iter()
            .filter(|&&v| v < lower_bound || v > upper_bound)
            .count();

        if outlier_count > 0 {
            rows.push(OutlierRow {
                column: column.name.clone(),
                q1,
                q3,
                iqr,
                lower_bound,
                upper_bound,
                outlier_count,
            });
        }
    }

    Ok(RuleResult::Outliers(rows))
}

/// Absolute percent change from `previous` to `current`.
///
/// A change away from zero is infinite; zero to zero is no change.
pub(crate) fn percent_change(previous: f64, current: f64) -> f64 {
    if previous == 0.0 {
        if current == 0.0 { 0.0 } else { f64::INFINITY }
    } else {
        ((current - previous) / previous).abs() * 100.0
    }
}

/// Detects spikes and drops between consecutive values.
///
/// Only runs when the table's row order can be read as a time axis.
pub fn check_spikes(table: &Table, config: &QualityConfig) -> Result<RuleResult, CheckError> {
    if !table.row_order_is_monotonic() {
        tracing::debug!(
            "Skipping spike detection for '{}': row order is not monotonic",
            table.name()
        );
        return Ok(RuleResult::Spikes(Vec::new()));
    }

    let mut rows = Vec::new();

    for column in table.numeric_columns() {
        let values = column.numeric_values();
        if values.len() < config.min_series_len {
            continue;
        }

        let anomaly_count = values
            .windows(2)
            .filter(|pair| percent_change(pair[0], pair[1]) > config.spike_threshold_pct)
            .count();

        if anomaly_count > 0 {
            rows.push(SpikeRow {
                column: column.name.clone(),
                anomaly_count,
            });
        }
    }

    Ok(RuleResult::Spikes(rows))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;
    use chrono::NaiveDate;

    fn single_column(name: &str, values: Vec<Value>) -> Table {
        Table::from_rows(
            "test_table",
            &[name],
            values.into_iter().map(|v| vec![v]).collect(),
        )
        .unwrap()
    }

    fn outlier_rows(table: &Table) -> Vec<OutlierRow> {
        match check_outliers(table, &QualityConfig::default()).unwrap() {
            RuleResult::Outliers(rows) => rows,
            other => panic!("unexpected result {:?}", other),
        }
    }

    fn spike_rows(table: &Table) -> Vec<SpikeRow> {
        match check_spikes(table, &QualityConfig::default()).unwrap() {
            RuleResult::Spikes(rows) => rows,
            other => panic!("unexpected result {:?}", other),
        }
    }

    #[test]
    fn test_iqr_outlier_detected() {
        let table = single_column(
            "amount",
            vec![10.into(), 11.into(), 12.into(), 13.into(), 14.into(), 100.into()],
        );

        let rows = outlier_rows(&table);
        assert_eq!(rows.len(), 1);
        assert_eq!(rows[0].outlier_count, 1);
        // Q1 = 11.25, Q3 = 13.75 with linear interpolation
        assert!((rows[0].q1 - 11.25).abs() < 1e-9);
        assert!((rows[0].q3 - 13.75).abs() < 1e-9);
        assert!((rows[0].upper_bound - 17.5).abs() < 1e-9);
    }

    #[test]
    fn test_outliers_need_minimum_series() {
        let table = single_column("amount", vec![1.into(), 2.into(), 1000.into()]);
        assert!(outlier_rows(&table).is_empty());
    }

    #[test]
    fn test_outliers_skip_empty_series_without_minimum() {
        let config = QualityConfig {
            min_series_len: 0,
            ..QualityConfig::default()
        };
        let table = single_column("amount", vec![Value::Null, Value::Float(f64::NAN)]);

        let result = check_outliers(&table, &config).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_no_outliers_in_uniform_data() {
        let table = single_column(
            "amount",
            vec![5.into(), 5.into(), 5.into(), 5.into(), 5.into()],
        );
        assert!(outlier_rows(&table).is_empty());
    }

    #[test]
    fn test_percent_change() {
        assert_eq!(percent_change(100.0, 150.0), 50.0);
        assert_eq!(percent_change(100.0, 40.0), 60.0);
        assert_eq!(percent_change(0.0, 0.0), 0.0);
        assert!(percent_change(0.0, 3.0).is_infinite());
    }

    #[test]
    fn test_spike_and_drop_detected() {
        let table = single_column(
            "sales",
            vec![100.into(), 110.into(), 300.into(), 290.into(), 100.into()],
        );

        let rows = spike_rows(&table);
        assert_eq!(rows.len(), 1);
        // 110 -> 300 and 290 -> 100
        assert_eq!(rows[0].anomaly_count, 2);
    }

    #[test]
    fn test_exactly_fifty_percent_is_not_flagged() {
        let table = single_column(
            "sales",
            vec![100.into(), 150.into(), 150.into(), 150.into(), 150.into()],
        );
        assert!(spike_rows(&table).is_empty());
    }

    #[test]
    fn test_zero_transitions() {
        let table = single_column(
            "count",
            vec![0.into(), 0.into(), 5.into(), 5.into(), 5.into()],
        );

        let rows = spike_rows(&table);
        assert_eq!(rows[0].anomaly_count, 1);
    }

    #[test]
    fn test_spikes_skip_nulls() {
        let table = single_column(
            "sales",
            vec![
                100.into(),
                Value::Null,
                105.into(),
                110.into(),
                Value::Null,
                115.into(),
                120.into(),
            ],
        );
        assert!(spike_rows(&table).is_empty());
    }

    #[test]
    fn test_spikes_skipped_when_order_not_monotonic() {
        let day = |d: u32| {
            Value::from(
                NaiveDate::from_ymd_opt(2024, 1, d)
                    .unwrap()
                    .and_hms_opt(0, 0, 0)
                    .unwrap(),
            )
        };
        let table = Table::from_rows(
            "events",
            &["when", "sales"],
            vec![
                vec![day(3), 100.into()],
                vec![day(1), 1000.into()],
                vec![day(2), 10.into()],
                vec![day(4), 1000.into()],
                vec![day(5), 10.into()],
            ],
        )
        .unwrap();

        assert!(spike_rows(&table).is_empty());
    }
}
