//! Mapping from rule-specific results to the unified violation schema.

use crate::models::format_float;

use super::config::QualityConfig;
use super::models::{
    ALL_COLUMNS, ContactType, DuplicateScope, RuleResult, Violation, ViolationKind,
};
use super::stats::round2;

/// Converts one rule result into zero or more violations.
///
/// `row_count` is the analyzed table's row count; the missingness
/// percentage is taken against it.
pub fn normalize(result: &RuleResult, row_count: usize, config: &QualityConfig) -> Vec<Violation> {
    match result {
        RuleResult::Datatype(_) | RuleResult::Completeness(_) => Vec::new(),

        RuleResult::Range(rows) => rows
            .iter()
            .filter(|r| r.invalid_values > 0)
            .map(|r| {
                Violation::new(
                    &r.column,
                    ViolationKind::RangeViolation,
                    format!("{} values outside {}", r.invalid_values, r.rule_range),
                )
            })
            .collect(),

        RuleResult::Missing(rows) => {
            let denominator = row_count.max(1) as f64;
            rows.iter()
                .filter_map(|r| {
                    let total = r.nulls + r.blanks;
                    let pct = round2(total as f64 / denominator * 100.0);
                    (total > 0 && pct > config.missingness_max_pct).then(|| {
                        Violation::new(
                            &r.column,
                            ViolationKind::HighMissingness,
                            format!("{} missing/blank cells (~{}%)", total, format_float(pct)),
                        )
                    })
                })
                .collect()
        }

        RuleResult::Lookup(rows) => rows
            .iter()
            .filter(|r| r.invalid_values_count > 0)
            .map(|r| {
                Violation::new(
                    &r.column,
                    ViolationKind::LookupViolation,
                    format!(
                        "{} values not in top allowed categories: {}",
                        r.invalid_values_count,
                        r.allowed_values.join(", ")
                    ),
                )
            })
            .collect(),

        RuleResult::Contact(rows) => rows
            .iter()
            .filter(|r| r.invalid_count > 0)
            .map(|r| {
                let kind = match r.contact_type {
                    ContactType::Email => ViolationKind::EmailValidation,
                    ContactType::Phone => ViolationKind::PhoneValidation,
                };
                Violation::new(
                    &r.column,
                    kind,
                    format!("{} invalid {} values", r.invalid_count, r.contact_type.as_str()),
                )
            })
            .collect(),

        RuleResult::Duplicates(rows) => rows
            .iter()
            .filter(|r| r.count > 0)
            .map(|r| match r.scope {
                DuplicateScope::Rows => Violation::new(
                    ALL_COLUMNS,
                    ViolationKind::DuplicateRows,
                    format!("{} duplicate rows found", r.count),
                ),
                DuplicateScope::Values => Violation::new(
                    &r.column,
                    ViolationKind::DuplicateValues,
                    format!("{} duplicate values", r.count),
                ),
            })
            .collect(),

        RuleResult::ForeignKeys(rows) => rows
            .iter()
            .filter(|r| r.orphan_count > 0)
            .map(|r| {
                Violation::new(
                    &r.column,
                    ViolationKind::ForeignKeyViolation,
                    format!(
                        "{} values not found in {}",
                        r.orphan_count, r.referenced_column
                    ),
                )
            })
            .collect(),

        RuleResult::Outliers(rows) => rows
            .iter()
            .filter(|r| r.outlier_count > 0)
            .map(|r| {
                Violation::new(
                    &r.column,
                    ViolationKind::Outliers,
                    format!(
                        "{} values outside IQR bounds {:.2} - {:.2}",
                        r.outlier_count, r.lower_bound, r.upper_bound
                    ),
                )
            })
            .collect(),

        RuleResult::Spikes(rows) => rows
            .iter()
            .filter(|r| r.anomaly_count > 0)
            .map(|r| {
                Violation::new(
                    &r.column,
                    ViolationKind::SpikeDrop,
                    format!(
                        "{} consecutive changes above {}%",
                        r.anomaly_count, config.spike_threshold_pct
                    ),
                )
            })
            .collect(),
    }
}
