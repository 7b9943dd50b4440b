//! Data quality result models.
//!
//! Each rule check produces one [`RuleResult`] variant carrying its own row
//! shape. The aggregator maps those rows onto the single [`Violation`] schema
//! and bundles everything into a [`QualityReport`].

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Sentinel column name for table-wide findings.
pub const ALL_COLUMNS: &str = "ALL";

/// Failure of a single rule check.
///
/// These never abort a run; the aggregator replaces the failed check's
/// output with an empty result and records the failure on the report.
#[derive(Debug, Error)]
pub enum CheckError {
    /// A statistic was requested over no values
    #[error("series is empty")]
    EmptySeries,
    /// Quantile outside `[0, 1]`
    #[error("quantile must be within [0, 1], got {0}")]
    InvalidQuantile(f64),
    /// Input held `inf` or `NaN` where finite values are required
    #[error("series contains non-finite values")]
    NonFinite,
    /// A validation regex failed to compile
    #[error("invalid pattern: {0}")]
    Pattern(#[from] regex::Error),
    /// A referenced column does not exist
    #[error("column '{0}' not found")]
    MissingColumn(String),
    /// The scan ran past its time budget
    #[error("time budget of {0} ms exceeded")]
    BudgetExceeded(u64),
    /// The check panicked; carries the panic message
    #[error("check panicked: {0}")]
    Panicked(String),
    /// The blocking task running the check could not be joined
    #[error("check task failed: {0}")]
    Join(String),
}

/// Identifier of a rule check, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RuleName {
    /// Per-column datatype consistency
    Datatype,
    /// Name-driven numeric ranges
    Range,
    /// Null and blank counts
    Missing,
    /// Top-N categorical lookups
    Lookup,
    /// Email and phone formats
    Contact,
    /// Duplicate rows and values
    Duplicates,
    /// `x_id` to `x` key pairing
    ForeignKeys,
    /// IQR outliers
    Outliers,
    /// Consecutive spikes and drops
    Spikes,
    /// Per-column completion scores
    Completeness,
}

impl RuleName {
    /// Every rule, in the order the aggregator runs them.
    pub const ALL: [RuleName; 10] = [
        RuleName::Datatype,
        RuleName::Range,
        RuleName::Missing,
        RuleName::Lookup,
        RuleName::Contact,
        RuleName::Duplicates,
        RuleName::ForeignKeys,
        RuleName::Outliers,
        RuleName::Spikes,
        RuleName::Completeness,
    ];

    /// Stable snake_case name.
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleName::Datatype => "datatype",
            RuleName::Range => "range",
            RuleName::Missing => "missing",
            RuleName::Lookup => "lookup",
            RuleName::Contact => "contact",
            RuleName::Duplicates => "duplicates",
            RuleName::ForeignKeys => "foreign_keys",
            RuleName::Outliers => "outliers",
            RuleName::Spikes => "spikes",
            RuleName::Completeness => "completeness",
        }
    }
}

impl fmt::Display for RuleName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Datatype consistency of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DatatypeRow {
    /// Column name
    pub column: String,
    /// Declared dtype label (`int64`, `object`, ...)
    pub dtype: String,
    /// Percent of non-null values sharing the first value's kind
    pub valid_percent: f64,
}

/// Range validation of one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RangeRow {
    /// Column name
    pub column: String,
    /// Smallest observed value
    pub min: f64,
    /// Largest observed value
    pub max: f64,
    /// Accepted range rendered as `lower - upper`
    pub rule_range: String,
    /// Values outside the accepted range
    pub invalid_values: usize,
}

/// Null and blank counts of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MissingRow {
    /// Column name
    pub column: String,
    /// Null cells
    pub nulls: usize,
    /// Whitespace-only text cells
    pub blanks: usize,
    /// Cells neither null nor blank
    pub non_empty: usize,
    /// Percent of rows neither null nor blank
    pub fill_rate: f64,
}

/// Categorical lookup validation of one text column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LookupRow {
    /// Column name
    pub column: String,
    /// Most frequent values, most frequent first
    pub allowed_values: Vec<String>,
    /// Occurrences of values outside the allowed set
    pub invalid_values_count: usize,
}

/// Contact field family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactType {
    /// Email address columns
    Email,
    /// Phone or mobile number columns
    Phone,
}

impl ContactType {
    /// Lowercase name used in detail text.
    pub fn as_str(&self) -> &'static str {
        match self {
            ContactType::Email => "email",
            ContactType::Phone => "phone",
        }
    }
}

/// Contact format validation of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ContactRow {
    /// Column name
    pub column: String,
    /// Format the column was validated against
    pub contact_type: ContactType,
    /// Values failing the format, nulls included
    pub invalid_count: usize,
}

/// Scope of a duplicate finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicateScope {
    /// Whole rows repeated across every column
    Rows,
    /// Values repeated within one column
    Values,
}

/// One duplicate finding; `column` is [`ALL_COLUMNS`] for row scope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateRow {
    /// Column name, or `ALL` for whole rows
    pub column: String,
    /// Whether whole rows or single-column values repeat
    pub scope: DuplicateScope,
    /// Occurrences beyond the first of each group
    pub count: usize,
}

/// Key pairing between an `_id` column and its referenced column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForeignKeyRow {
    /// Key column (`x_id`)
    pub column: String,
    /// Column the key points at (`x`)
    pub referenced_column: String,
    /// Non-null key values absent from the referenced column
    pub orphan_count: usize,
}

/// IQR outlier bounds and count for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutlierRow {
    /// Column name
    pub column: String,
    /// First quartile
    pub q1: f64,
    /// Third quartile
    pub q3: f64,
    /// `q3 - q1`
    pub iqr: f64,
    /// Values below this are outliers
    pub lower_bound: f64,
    /// Values above this are outliers
    pub upper_bound: f64,
    /// Values outside the bounds
    pub outlier_count: usize,
}

/// Consecutive-change anomalies for one numeric column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SpikeRow {
    /// Column name
    pub column: String,
    /// Consecutive changes above the spike threshold
    pub anomaly_count: usize,
}

/// Completeness score of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompletenessRow {
    /// Column name
    pub column: String,
    /// Fraction of missing values (0.0-1.0)
    pub null_pct: f64,
    /// `100 * (1 - null_pct)`
    pub completion_score: f64,
}

/// Output of one rule check.
///
/// Rows carry set semantics; consumers must not rely on their order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "rule", content = "rows", rename_all = "snake_case")]
pub enum RuleResult {
    /// Rows of the datatype check
    Datatype(Vec<DatatypeRow>),
    /// Rows of the range check
    Range(Vec<RangeRow>),
    /// Rows of the missing-data check
    Missing(Vec<MissingRow>),
    /// Rows of the lookup check
    Lookup(Vec<LookupRow>),
    /// Rows of the contact format check
    Contact(Vec<ContactRow>),
    /// Rows of the duplicate check
    Duplicates(Vec<DuplicateRow>),
    /// Rows of the key pairing check
    ForeignKeys(Vec<ForeignKeyRow>),
    /// Rows of the outlier check
    Outliers(Vec<OutlierRow>),
    /// Rows of the spike/drop check
    Spikes(Vec<SpikeRow>),
    /// Rows of the completeness check
    Completeness(Vec<CompletenessRow>),
}

impl RuleResult {
    /// The empty result substituted for a failed check.
    pub fn empty(rule: RuleName) -> Self {
        match rule {
            RuleName::Datatype => RuleResult::Datatype(Vec::new()),
            RuleName::Range => RuleResult::Range(Vec::new()),
            RuleName::Missing => RuleResult::Missing(Vec::new()),
            RuleName::Lookup => RuleResult::Lookup(Vec::new()),
            RuleName::Contact => RuleResult::Contact(Vec::new()),
            RuleName::Duplicates => RuleResult::Duplicates(Vec::new()),
            RuleName::ForeignKeys => RuleResult::ForeignKeys(Vec::new()),
            RuleName::Outliers => RuleResult::Outliers(Vec::new()),
            RuleName::Spikes => RuleResult::Spikes(Vec::new()),
            RuleName::Completeness => RuleResult::Completeness(Vec::new()),
        }
    }

    /// Rule that produced this result.
    pub fn rule(&self) -> RuleName {
        match self {
            RuleResult::Datatype(_) => RuleName::Datatype,
            RuleResult::Range(_) => RuleName::Range,
            RuleResult::Missing(_) => RuleName::Missing,
            RuleResult::Lookup(_) => RuleName::Lookup,
            RuleResult::Contact(_) => RuleName::Contact,
            RuleResult::Duplicates(_) => RuleName::Duplicates,
            RuleResult::ForeignKeys(_) => RuleName::ForeignKeys,
            RuleResult::Outliers(_) => RuleName::Outliers,
            RuleResult::Spikes(_) => RuleName::Spikes,
            RuleResult::Completeness(_) => RuleName::Completeness,
        }
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        match self {
            RuleResult::Datatype(rows) => rows.len(),
            RuleResult::Range(rows) => rows.len(),
            RuleResult::Missing(rows) => rows.len(),
            RuleResult::Lookup(rows) => rows.len(),
            RuleResult::Contact(rows) => rows.len(),
            RuleResult::Duplicates(rows) => rows.len(),
            RuleResult::ForeignKeys(rows) => rows.len(),
            RuleResult::Outliers(rows) => rows.len(),
            RuleResult::Spikes(rows) => rows.len(),
            RuleResult::Completeness(rows) => rows.len(),
        }
    }

    /// Whether the check produced no rows.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Kind of a normalized violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ViolationKind {
    /// Column completeness below the configured minimum
    #[serde(rename = "Missing Data")]
    MissingData,
    /// Whole rows repeated
    #[serde(rename = "Duplicate Rows")]
    DuplicateRows,
    /// Too many values failing numeric coercion
    #[serde(rename = "Type Conformance")]
    TypeConformance,
    /// Values outside a name-driven range
    #[serde(rename = "Range Violation")]
    RangeViolation,
    /// Fill rate below the missingness threshold
    #[serde(rename = "High Missingness")]
    HighMissingness,
    /// Values outside the top categories
    #[serde(rename = "Lookup Violation")]
    LookupViolation,
    /// Malformed email addresses
    #[serde(rename = "Email Validation")]
    EmailValidation,
    /// Malformed phone numbers
    #[serde(rename = "Phone Validation")]
    PhoneValidation,
    /// Values repeated within a column
    #[serde(rename = "Duplicate Values")]
    DuplicateValues,
    /// Keys missing from the paired column
    #[serde(rename = "Foreign Key Violation")]
    ForeignKeyViolation,
    /// Values outside the IQR bounds
    #[serde(rename = "Outliers")]
    Outliers,
    /// Consecutive changes above the spike threshold
    #[serde(rename = "Spike/Drop")]
    SpikeDrop,
}

impl ViolationKind {
    /// Human-readable label, as written to exports.
    pub fn label(&self) -> &'static str {
        match self {
            ViolationKind::MissingData => "Missing Data",
            ViolationKind::DuplicateRows => "Duplicate Rows",
            ViolationKind::TypeConformance => "Type Conformance",
            ViolationKind::RangeViolation => "Range Violation",
            ViolationKind::HighMissingness => "High Missingness",
            ViolationKind::LookupViolation => "Lookup Violation",
            ViolationKind::EmailValidation => "Email Validation",
            ViolationKind::PhoneValidation => "Phone Validation",
            ViolationKind::DuplicateValues => "Duplicate Values",
            ViolationKind::ForeignKeyViolation => "Foreign Key Violation",
            ViolationKind::Outliers => "Outliers",
            ViolationKind::SpikeDrop => "Spike/Drop",
        }
    }
}

impl fmt::Display for ViolationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One normalized finding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    /// Table column, or [`ALL_COLUMNS`] for table-wide findings
    pub column: String,
    /// Finding kind, serialized as `type`
    #[serde(rename = "type")]
    pub kind: ViolationKind,
    /// Human-readable detail text
    pub details: String,
}

impl Violation {
    /// Creates a column-scoped violation.
    pub fn new(column: impl Into<String>, kind: ViolationKind, details: impl Into<String>) -> Self {
        Self {
            column: column.into(),
            kind,
            details: details.into(),
        }
    }

    /// Creates a table-wide violation.
    pub fn table_wide(kind: ViolationKind, details: impl Into<String>) -> Self {
        Self::new(ALL_COLUMNS, kind, details)
    }
}

/// Non-null fraction of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnCompleteness {
    /// Column name
    pub column: String,
    /// Non-null fraction (0.0-1.0)
    pub completeness: f64,
}

/// A rule check that failed and was replaced by its empty result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckFailure {
    /// Rule whose check failed
    pub rule: RuleName,
    /// Rendered error message
    pub error: String,
}

/// Output of the auxiliary isolation-forest scan.
///
/// Diagnostic only: it is never normalized into violations and never scored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnomalyScan {
    /// Numeric columns fed to the forest
    pub columns: Vec<String>,
    /// Row indices classified as anomalous
    pub anomalous_rows: Vec<usize>,
    /// Set when the scan failed or ran out of time and degraded to no anomalies
    pub degraded: Option<String>,
}

impl AnomalyScan {
    /// A scan that found nothing because it could not complete.
    pub fn degraded(columns: Vec<String>, reason: impl Into<String>) -> Self {
        Self {
            columns,
            anomalous_rows: Vec::new(),
            degraded: Some(reason.into()),
        }
    }
}

/// Unified result of one quality run.
///
/// Carries no timestamps; two runs over the same table compare equal,
/// except that `anomaly_scan` may degrade on one run and not the other
/// when the scan's time budget is tight.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QualityReport {
    /// Name of the analyzed table
    pub table_name: String,
    /// Rows in the table
    pub row_count: usize,
    /// Columns in the table
    pub column_count: usize,
    /// Legacy findings followed by normalized rule findings
    pub violations: Vec<Violation>,
    /// Quality score in [0, 70]
    pub score: f64,
    /// One result per rule, in run order
    pub validations: Vec<RuleResult>,
    /// Per-column non-null fraction
    pub completeness: Vec<ColumnCompleteness>,
    /// Mean of the per-column completeness (1.0 without columns)
    pub average_completeness: f64,
    /// Checks that failed and were replaced by empty results
    pub failed_checks: Vec<CheckFailure>,
    /// Isolation-forest diagnostics; `None` when disabled
    pub anomaly_scan: Option<AnomalyScan>,
}

impl QualityReport {
    /// Number of violations.
    pub fn violation_count(&self) -> usize {
        self.violations.len()
    }

    /// Result of one rule, if it ran.
    pub fn validation(&self, rule: RuleName) -> Option<&RuleResult> {
        self.validations.iter().find(|r| r.rule() == rule)
    }

    /// Violations of one kind.
    pub fn violations_of(&self, kind: ViolationKind) -> impl Iterator<Item = &Violation> {
        self.violations.iter().filter(move |v| v.kind == kind)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_order_is_stable() {
        let names: Vec<&str> = RuleName::ALL.iter().map(RuleName::as_str).collect();
        assert_eq!(
            names,
            [
                "datatype",
                "range",
                "missing",
                "lookup",
                "contact",
                "duplicates",
                "foreign_keys",
                "outliers",
                "spikes",
                "completeness"
            ]
        );
    }

    #[test]
    fn test_empty_result_matches_rule() {
        for rule in RuleName::ALL {
            let result = RuleResult::empty(rule);
            assert_eq!(result.rule(), rule);
            assert!(result.is_empty());
        }
    }

    #[test]
    fn test_violation_kind_serializes_as_label() {
        let violation = Violation::table_wide(ViolationKind::DuplicateRows, "1 duplicate rows found");
        let json = serde_json::to_value(&violation).unwrap();
        assert_eq!(json["column"], "ALL");
        assert_eq!(json["type"], "Duplicate Rows");

        assert_eq!(ViolationKind::SpikeDrop.to_string(), "Spike/Drop");
    }

    #[test]
    fn test_rule_result_tagging() {
        let result = RuleResult::Spikes(vec![SpikeRow {
            column: "sales".to_string(),
            anomaly_count: 2,
        }]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["rule"], "spikes");
        assert_eq!(json["rows"][0]["anomaly_count"], 2);

        let back: RuleResult = serde_json::from_value(json).unwrap();
        assert_eq!(back, result);
    }

    #[test]
    fn test_report_lookup_helpers() {
        let report = QualityReport {
            table_name: "t".to_string(),
            row_count: 0,
            column_count: 0,
            violations: vec![
                Violation::new("a", ViolationKind::Outliers, "2 outliers detected"),
                Violation::new("b", ViolationKind::MissingData, "50.0% missing"),
            ],
            score: 66.0,
            validations: vec![RuleResult::empty(RuleName::Range)],
            completeness: Vec::new(),
            average_completeness: 1.0,
            failed_checks: Vec::new(),
            anomaly_scan: None,
        };

        assert_eq!(report.violation_count(), 2);
        assert!(report.validation(RuleName::Range).is_some());
        assert!(report.validation(RuleName::Lookup).is_none());
        assert_eq!(report.violations_of(ViolationKind::Outliers).count(), 1);
    }
}
