//! Quality analyzer facade.
//!
//! This module provides the main `QualityAnalyzer` that runs the rule
//! battery over a table, isolates failing checks, normalizes findings and
//! derives the score.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use futures::future::join_all;

use crate::Result;
use crate::error::DqAuditError;
use crate::models::Table;

use super::anomaly::{check_outliers, check_spikes};
use super::completeness::{
    average_completeness, check_completeness_table, check_missing, column_completeness,
};
use super::config::QualityConfig;
use super::consistency::{check_contacts, check_datatypes};
use super::isolation;
use super::legacy::legacy_violations;
use super::models::{AnomalyScan, CheckError, CheckFailure, QualityReport, RuleName, RuleResult};
use super::normalize::normalize;
use super::scoring::compute_score;
use super::uniqueness::check_duplicates;
use super::validity::{check_foreign_keys, check_lookups, check_ranges};

/// Dispatches one rule check.
pub fn run_rule(
    rule: RuleName,
    table: &Table,
    config: &QualityConfig,
) -> std::result::Result<RuleResult, CheckError> {
    match rule {
        RuleName::Datatype => check_datatypes(table, config),
        RuleName::Range => check_ranges(table, config),
        RuleName::Missing => check_missing(table, config),
        RuleName::Lookup => check_lookups(table, config),
        RuleName::Contact => check_contacts(table, config),
        RuleName::Duplicates => check_duplicates(table, config),
        RuleName::ForeignKeys => check_foreign_keys(table, config),
        RuleName::Outliers => check_outliers(table, config),
        RuleName::Spikes => check_spikes(table, config),
        RuleName::Completeness => check_completeness_table(table, config),
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs a check, converting a panic into a [`CheckError`].
fn run_isolated<F>(check: F) -> std::result::Result<RuleResult, CheckError>
where
    F: FnOnce() -> std::result::Result<RuleResult, CheckError>,
{
    catch_unwind(AssertUnwindSafe(check))
        .unwrap_or_else(|payload| Err(CheckError::Panicked(panic_message(payload))))
}

/// Substitutes the empty result for a failed check and records the failure.
fn settle(
    rule: RuleName,
    outcome: std::result::Result<RuleResult, CheckError>,
    failures: &mut Vec<CheckFailure>,
) -> RuleResult {
    match outcome {
        Ok(result) => {
            tracing::debug!("Check '{}' produced {} rows", rule, result.len());
            result
        }
        Err(e) => {
            tracing::warn!("Check '{}' failed and was replaced by an empty result: {}", rule, e);
            failures.push(CheckFailure {
                rule,
                error: e.to_string(),
            });
            RuleResult::empty(rule)
        }
    }
}

fn run_scan(table: &Table, config: &QualityConfig) -> AnomalyScan {
    let columns = || table.numeric_columns().map(|c| c.name.clone()).collect();
    catch_unwind(AssertUnwindSafe(|| isolation::scan(table, &config.anomaly_detection)))
        .unwrap_or_else(|payload| AnomalyScan::degraded(columns(), panic_message(payload)))
}

/// Quality analyzer for assessing tabular data.
///
/// The analyzer runs every check in [`RuleName::ALL`] plus the inline
/// legacy checks and returns a single [`QualityReport`]. A failing check
/// never aborts the run.
///
/// # Example
///
/// ```rust,ignore
/// use dqaudit_core::quality::{QualityAnalyzer, QualityConfig};
///
/// let analyzer = QualityAnalyzer::new(QualityConfig::default());
/// let report = analyzer.analyze(&table)?;
/// println!("Quality score: {:.2}", report.score);
/// ```
#[derive(Debug, Clone)]
pub struct QualityAnalyzer {
    config: Arc<QualityConfig>,
}

impl QualityAnalyzer {
    /// Creates a new quality analyzer with the given configuration.
    pub fn new(config: QualityConfig) -> Self {
        Self {
            config: Arc::new(config),
        }
    }

    /// Creates a new quality analyzer with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(QualityConfig::default())
    }

    /// Returns a reference to the analyzer configuration.
    pub fn config(&self) -> &QualityConfig {
        &self.config
    }

    fn validate_config(&self) -> Result<()> {
        self.config
            .validate()
            .map_err(|e| DqAuditError::configuration(e.to_string()))
    }

    /// Analyzes a table, running the checks one after another.
    ///
    /// # Errors
    /// Only an invalid configuration fails; check failures are recorded
    /// in [`QualityReport::failed_checks`].
    pub fn analyze(&self, table: &Table) -> Result<QualityReport> {
        self.validate_config()?;

        let mut failures = Vec::new();
        let results = RuleName::ALL
            .iter()
            .map(|&rule| {
                let outcome = run_isolated(|| run_rule(rule, table, &self.config));
                settle(rule, outcome, &mut failures)
            })
            .collect();

        let scan = self
            .config
            .anomaly_detection
            .enabled
            .then(|| run_scan(table, &self.config));

        Ok(self.assemble(table, results, failures, scan))
    }

    /// Analyzes a table with every check on the blocking thread pool.
    ///
    /// The report is identical to the one [`analyze`](Self::analyze)
    /// produces for the same table.
    pub async fn analyze_parallel(&self, table: Arc<Table>) -> Result<QualityReport> {
        self.validate_config()?;

        let tasks = RuleName::ALL.iter().map(|&rule| {
            let table = Arc::clone(&table);
            let config = Arc::clone(&self.config);
            tokio::task::spawn_blocking(move || run_rule(rule, &table, &config))
        });

        let scan_task = self.config.anomaly_detection.enabled.then(|| {
            let table = Arc::clone(&table);
            let config = Arc::clone(&self.config);
            tokio::task::spawn_blocking(move || run_scan(&table, &config))
        });

        let joined = join_all(tasks).await;

        let mut failures = Vec::new();
        let results = RuleName::ALL
            .iter()
            .zip(joined)
            .map(|(&rule, joined)| {
                let outcome = joined
                    .map_err(|e| {
                        if e.is_panic() {
                            CheckError::Panicked(panic_message(e.into_panic()))
                        } else {
                            CheckError::Join(e.to_string())
                        }
                    })
                    .and_then(|outcome| outcome);
                settle(rule, outcome, &mut failures)
            })
            .collect();

        let scan = match scan_task {
            Some(task) => Some(task.await.unwrap_or_else(|e| {
                tracing::warn!("Isolation forest task failed: {}", e);
                AnomalyScan::degraded(
                    table.numeric_columns().map(|c| c.name.clone()).collect(),
                    e.to_string(),
                )
            })),
            None => None,
        };

        Ok(self.assemble(&table, results, failures, scan))
    }

    /// Analyzes several tables and returns a report for each.
    ///
    /// Tables that fail analysis are logged and skipped rather than
    /// aborting the entire batch.
    pub fn analyze_all(&self, tables: &[Table]) -> Result<Vec<QualityReport>> {
        let mut reports = Vec::with_capacity(tables.len());
        for table in tables {
            match self.analyze(table) {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::warn!("Quality analysis failed for table '{}': {}", table.name(), e);
                }
            }
        }
        Ok(reports)
    }

    /// Normalizes the check results and derives completeness and score.
    fn assemble(
        &self,
        table: &Table,
        validations: Vec<RuleResult>,
        failed_checks: Vec<CheckFailure>,
        anomaly_scan: Option<AnomalyScan>,
    ) -> QualityReport {
        let completeness = column_completeness(table);
        let average_completeness = average_completeness(&completeness);

        let mut violations = legacy_violations(table, &completeness, &self.config);
        for result in &validations {
            violations.extend(normalize(result, table.row_count(), &self.config));
        }

        let score = compute_score(average_completeness, violations.len());

        tracing::info!(
            "Analyzed '{}': {} rows, {} columns, {} violations, score {:.2}",
            table.name(),
            table.row_count(),
            table.column_count(),
            violations.len(),
            score
        );

        QualityReport {
            table_name: table.name().to_string(),
            row_count: table.row_count(),
            column_count: table.column_count(),
            violations,
            score,
            validations,
            completeness,
            average_completeness,
            failed_checks,
            anomaly_scan,
        }
    }
}
