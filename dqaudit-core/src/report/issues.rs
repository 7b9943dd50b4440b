//! Issue tickets raised from violations.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::{Table, Value};
use crate::quality::Violation;

/// Sample rows attached to each issue.
const SAMPLE_ROWS: usize = 5;

/// Issue priority.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Severity {
    /// Missing-data and duplicate findings
    High,
    /// Everything else
    Medium,
}

impl Severity {
    /// HIGH for missing-data and duplicate findings, MEDIUM otherwise.
    pub fn for_rule(rule_name: &str) -> Self {
        if rule_name.contains("Missing") || rule_name.contains("Duplicate") {
            Self::High
        } else {
            Self::Medium
        }
    }
}

/// Issue fields without sample rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IssueRecord {
    /// Random v4 identifier
    pub issue_id: Uuid,
    /// `<rule> Failure - <column>`
    pub title: String,
    /// Violation details
    pub description: String,
    /// Column the violation was raised on
    pub column: String,
    /// Priority derived from the rule
    pub severity: Severity,
    /// Violation kind label
    pub rule_name: String,
    /// When the issue was logged
    pub time_detected: DateTime<Utc>,
    /// Rows affected by the violation
    pub affected_rows: usize,
    /// Likely cause for the rule
    pub suspected_root_cause: String,
    /// Remediation hint for the rule
    pub suggested_fix: String,
}

/// A logged issue with example rows from the table.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Issue {
    /// Ticket fields
    #[serde(flatten)]
    pub record: IssueRecord,
    /// Example rows as JSON objects
    pub sample_rows: Vec<serde_json::Map<String, serde_json::Value>>,
}

fn root_cause(rule_name: &str) -> &'static str {
    match rule_name {
        "Missing Data" => "Incomplete ETL, source dropout, or incorrect transforms",
        "Range Violation" => "Wrong source values or incorrect rule ranges",
        "Lookup Violation" => "Incorrect mapping table or inconsistent category naming",
        "Duplicate Rows" => "Primary key not enforced, merge/append error",
        _ => "Unknown cause",
    }
}

fn suggested_fix(rule_name: &str) -> &'static str {
    match rule_name {
        "Missing Data" => "Validate source completeness, add fallback defaults",
        "Range Violation" => "Fix input value generator, add value caps",
        "Lookup Violation" => "Update lookup tables or enforce category rules",
        "Duplicate Rows" => "Apply dedupe rules, verify PK before ingestion",
        _ => "Analyze issue manually.",
    }
}

fn row_record(table: &Table, index: usize) -> serde_json::Map<String, serde_json::Value> {
    table
        .columns()
        .iter()
        .map(|column| {
            let value = column.values.get(index).map_or(serde_json::Value::Null, Value::to_json);
            (column.name.clone(), value)
        })
        .collect()
}

/// Rows missing a value in `column`, or the first rows when there are none.
fn sample_rows(table: &Table, column: &str) -> Vec<serde_json::Map<String, serde_json::Value>> {
    let missing: Vec<usize> = table
        .column_by_name(column)
        .map(|c| {
            c.values
                .iter()
                .enumerate()
                .filter(|(_, v)| v.is_null())
                .map(|(i, _)| i)
                .take(SAMPLE_ROWS)
                .collect()
        })
        .unwrap_or_default();

    let indices: Vec<usize> = if missing.is_empty() {
        (0..table.row_count().min(SAMPLE_ROWS)).collect()
    } else {
        missing
    };
    indices.into_iter().map(|i| row_record(table, i)).collect()
}

/// Rows affected by a violation.
///
/// Uses the leading count of the details text when present, then the
/// column's missing values, then the whole table.
fn affected_rows(table: &Table, violation: &Violation) -> usize {
    let leading: String = violation
        .details
        .chars()
        .take_while(char::is_ascii_digit)
        .collect();
    let followed_by_space = violation.details[leading.len()..].starts_with(' ');
    if followed_by_space && let Ok(count) = leading.parse::<usize>() {
        return count;
    }

    match table.column_by_name(&violation.column) {
        Some(column) if column.null_count() > 0 => column.null_count(),
        _ => table.row_count(),
    }
}

/// Collects issues raised against one table.
#[derive(Debug, Default)]
pub struct IssueLogger {
    issues: Vec<Issue>,
}

impl IssueLogger {
    /// Creates an empty logger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Logs one issue for a violation found in `table`.
    pub fn log(&mut self, table: &Table, violation: &Violation) -> &Issue {
        let rule_name = violation.kind.label();
        let column = violation.column.as_str();

        let issue = Issue {
            record: IssueRecord {
                issue_id: Uuid::new_v4(),
                title: format!("{} Failure - {}", rule_name, column),
                description: violation.details.clone(),
                column: column.to_string(),
                severity: Severity::for_rule(rule_name),
                rule_name: rule_name.to_string(),
                time_detected: Utc::now(),
                affected_rows: affected_rows(table, violation),
                suspected_root_cause: root_cause(rule_name).to_string(),
                suggested_fix: suggested_fix(rule_name).to_string(),
            },
            sample_rows: sample_rows(table, column),
        };

        tracing::debug!("Logged issue '{}'", issue.record.title);
        self.issues.push(issue);
        &self.issues[self.issues.len() - 1]
    }

    /// Logs one issue per violation.
    pub fn log_violations(&mut self, table: &Table, violations: &[Violation]) {
        for violation in violations {
            self.log(table, violation);
        }
    }

    /// Logged issues, oldest first.
    pub fn issues(&self) -> &[Issue] {
        &self.issues
    }

    /// Flattened listing without sample rows.
    pub fn to_records(&self) -> Vec<IssueRecord> {
        self.issues.iter().map(|i| i.record.clone()).collect()
    }

    /// Number of logged issues.
    pub fn len(&self) -> usize {
        self.issues.len()
    }

    /// Whether no issue has been logged.
    pub fn is_empty(&self) -> bool {
        self.issues.is_empty()
    }
}
