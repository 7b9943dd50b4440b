//! Score derivation from completeness and violation counts.

use serde::{Deserialize, Serialize};

use crate::models::Table;

use super::completeness::average_completeness;
use super::models::ColumnCompleteness;

/// Share of the score carried by completeness.
const COMPLETENESS_WEIGHT: f64 = 0.7;
/// Points deducted per violation.
const VIOLATION_PENALTY: f64 = 2.0;
/// Cap on the total violation deduction.
const MAX_PENALTY: f64 = 30.0;

/// Reduces average completeness and violation count to a bounded score.
///
/// `max(0, completeness * 70 - min(30, 2 * violations))`. Full
/// completeness with no violations yields 70, not 100.
pub fn compute_score(average_completeness: f64, violation_count: usize) -> f64 {
    let base = average_completeness * COMPLETENESS_WEIGHT * 100.0;
    let penalty = (violation_count as f64 * VIOLATION_PENALTY).min(MAX_PENALTY);
    (base - penalty).max(0.0)
}

/// Dimension weights for [`weighted_score`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreWeights {
    /// Weight of completeness
    pub completeness: f64,
    /// Weight of validity
    pub validity: f64,
    /// Weight of uniqueness
    pub uniqueness: f64,
    /// Weight of consistency
    pub consistency: f64,
    /// Weight of timeliness
    pub timeliness: f64,
}

impl Default for ScoreWeights {
    fn default() -> Self {
        Self {
            completeness: 0.3,
            validity: 0.25,
            uniqueness: 0.2,
            consistency: 0.15,
            timeliness: 0.1,
        }
    }
}

/// Mean distinct-value fraction across columns; 1.0 for an empty table.
pub fn uniqueness_score(table: &Table) -> f64 {
    if table.is_empty() || table.column_count() == 0 {
        return 1.0;
    }
    let rows = table.row_count() as f64;
    table
        .columns()
        .iter()
        .map(|c| c.distinct_count() as f64 / rows)
        .sum::<f64>()
        / table.column_count() as f64
}

/// Weighted dimension score in [0, 100].
///
/// Validity, consistency and timeliness are not measured and count as
/// fully satisfied.
pub fn weighted_score(
    table: &Table,
    completeness: &[ColumnCompleteness],
    weights: &ScoreWeights,
) -> f64 {
    let score = weights.completeness * average_completeness(completeness)
        + weights.uniqueness * uniqueness_score(table)
        + weights.validity
        + weights.consistency
        + weights.timeliness;
    score * 100.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;
    use crate::quality::completeness::column_completeness;

    #[test]
    fn test_perfect_score_is_seventy() {
        assert!((compute_score(1.0, 0) - 70.0).abs() < 1e-9);
    }

    #[test]
    fn test_penalty_per_violation() {
        assert!((compute_score(1.0, 3) - 64.0).abs() < 1e-9);
    }

    #[test]
    fn test_penalty_is_capped() {
        assert!((compute_score(1.0, 15) - 40.0).abs() < 1e-9);
        assert!((compute_score(1.0, 500) - 40.0).abs() < 1e-9);
    }

    #[test]
    fn test_score_floor_is_zero() {
        assert_eq!(compute_score(0.1, 20), 0.0);
        assert_eq!(compute_score(0.0, 0), 0.0);
    }

    #[test]
    fn test_weighted_score() {
        let table = Table::from_rows(
            "t",
            &["a", "b"],
            vec![
                vec![1.into(), "x".into()],
                vec![2.into(), "x".into()],
                vec![3.into(), Value::Null],
                vec![4.into(), "y".into()],
            ],
        )
        .unwrap();

        let completeness = column_completeness(&table);
        // completeness 0.875, uniqueness (1.0 + 0.5) / 2
        let expected = (0.3 * 0.875 + 0.2 * 0.75 + 0.25 + 0.15 + 0.1) * 100.0;
        let score = weighted_score(&table, &completeness, &ScoreWeights::default());
        assert!((score - expected).abs() < 1e-9);
    }

    #[test]
    fn test_uniqueness_of_empty_table() {
        let table = Table::new("empty", Vec::new()).unwrap();
        assert_eq!(uniqueness_score(&table), 1.0);
    }
}
