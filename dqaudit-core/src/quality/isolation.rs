//! Isolation-forest scan over all numeric columns.
//!
//! An auxiliary diagnostic: rows that isolate in unusually few random
//! splits are reported as anomalous. Missing values are read as zero.
//! Any failure, including running past the time budget, degrades to an
//! empty scan. The budget is wall-clock time, so whether a large scan
//! completes depends on machine load; the scan is kept out of violations
//! and scoring for that reason.

use std::time::{Duration, Instant};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::Table;

use super::config::AnomalyConfig;
use super::models::{AnomalyScan, CheckError};
use super::stats::quantile_sorted;

const EULER_GAMMA: f64 = 0.577_215_664_901_532_9;

enum Node {
    Leaf {
        size: usize,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<Node>,
        right: Box<Node>,
    },
}

/// Average path length of an unsuccessful BST search over `n` points.
fn average_path_length(n: usize) -> f64 {
    match n {
        0 | 1 => 0.0,
        2 => 1.0,
        _ => {
            let n = n as f64;
            2.0 * ((n - 1.0).ln() + EULER_GAMMA) - 2.0 * (n - 1.0) / n
        }
    }
}

fn build_tree(
    points: &[Vec<f64>],
    indices: &[usize],
    depth: usize,
    height_limit: usize,
    rng: &mut StdRng,
) -> Node {
    if depth >= height_limit || indices.len() <= 1 {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let feature = rng.random_range(0..points[0].len());
    let (min, max) = indices.iter().fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &i| {
        let v = points[i][feature];
        (lo.min(v), hi.max(v))
    });
    if !(min < max) {
        return Node::Leaf {
            size: indices.len(),
        };
    }

    let threshold = rng.random_range(min..max);
    let (left, right): (Vec<usize>, Vec<usize>) = indices
        .iter()
        .partition(|&&i| points[i][feature] < threshold);

    Node::Split {
        feature,
        threshold,
        left: Box::new(build_tree(points, &left, depth + 1, height_limit, rng)),
        right: Box::new(build_tree(points, &right, depth + 1, height_limit, rng)),
    }
}

fn path_length(node: &Node, point: &[f64], depth: usize) -> f64 {
    match node {
        Node::Leaf { size } => depth as f64 + average_path_length(*size),
        Node::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if point[*feature] < *threshold {
                path_length(left, point, depth + 1)
            } else {
                path_length(right, point, depth + 1)
            }
        }
    }
}

/// Row-major matrix of the numeric columns with missing values as zero.
fn numeric_matrix(table: &Table) -> (Vec<String>, Vec<Vec<f64>>) {
    let columns: Vec<_> = table.numeric_columns().collect();
    let names = columns.iter().map(|c| c.name.clone()).collect();
    let points = (0..table.row_count())
        .map(|row| {
            columns
                .iter()
                .map(|c| c.values[row].as_f64().filter(|v| v.is_finite()).unwrap_or(0.0))
                .collect()
        })
        .collect();
    (names, points)
}

/// Anomaly score in (0, 1] for every point; higher is more anomalous.
fn anomaly_scores(points: &[Vec<f64>], config: &AnomalyConfig) -> Result<Vec<f64>, CheckError> {
    let deadline = Instant::now() + Duration::from_millis(config.budget_ms);
    let mut rng = StdRng::seed_from_u64(config.seed);

    let sample_size = config.sample_size.clamp(1, points.len());
    let height_limit = (sample_size as f64).log2().ceil().max(1.0) as usize;
    let normalizer = average_path_length(sample_size);

    let mut total_depth = vec![0.0; points.len()];
    for _ in 0..config.n_trees {
        if Instant::now() >= deadline {
            return Err(CheckError::BudgetExceeded(config.budget_ms));
        }

        let sample = rand::seq::index::sample(&mut rng, points.len(), sample_size).into_vec();
        let tree = build_tree(points, &sample, 0, height_limit, &mut rng);
        for (depth, point) in total_depth.iter_mut().zip(points) {
            *depth += path_length(&tree, point, 0);
        }
    }

    let trees = config.n_trees.max(1) as f64;
    Ok(total_depth
        .into_iter()
        .map(|depth| {
            if normalizer > 0.0 {
                2f64.powf(-(depth / trees) / normalizer)
            } else {
                0.5
            }
        })
        .collect())
}

/// Runs the isolation-forest scan.
///
/// Rows scoring above the `1 - contamination` quantile are anomalous.
pub fn scan(table: &Table, config: &AnomalyConfig) -> AnomalyScan {
    let (columns, points) = numeric_matrix(table);

    if columns.is_empty() {
        return AnomalyScan::degraded(columns, "no numeric columns");
    }
    if points.len() < 2 {
        return AnomalyScan::degraded(columns, "fewer than two rows");
    }

    match anomaly_scores(&points, config) {
        Ok(scores) => {
            let mut sorted = scores.clone();
            sorted.sort_by(f64::total_cmp);
            let threshold = quantile_sorted(&sorted, 1.0 - config.contamination);
            let anomalous_rows = scores
                .iter()
                .enumerate()
                .filter(|(_, s)| **s > threshold)
                .map(|(i, _)| i)
                .collect();
            AnomalyScan {
                columns,
                anomalous_rows,
                degraded: None,
            }
        }
        Err(e) => {
            tracing::warn!("Isolation forest scan degraded to no anomalies: {}", e);
            AnomalyScan::degraded(columns, e.to_string())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Value;

    fn clustered_table() -> Table {
        let mut rows: Vec<Vec<Value>> = (0..50)
            .map(|i| {
                let x = (i % 7) as f64;
                let y = (i % 5) as f64;
                vec![x.into(), y.into()]
            })
            .collect();
        rows.push(vec![1000.0.into(), (-1000.0).into()]);
        Table::from_rows("points", &["x", "y"], rows).unwrap()
    }

    #[test]
    fn test_average_path_length() {
        assert_eq!(average_path_length(1), 0.0);
        assert_eq!(average_path_length(2), 1.0);
        assert!(average_path_length(256) > average_path_length(16));
    }

    #[test]
    fn test_isolated_point_is_anomalous() {
        let scan = scan(&clustered_table(), &AnomalyConfig::default());
        assert!(scan.degraded.is_none());
        assert_eq!(scan.columns, vec!["x".to_string(), "y".to_string()]);
        assert!(scan.anomalous_rows.contains(&50));
        assert!(scan.anomalous_rows.len() <= 5);
    }

    #[test]
    fn test_scan_is_deterministic_for_seed() {
        let table = clustered_table();
        let config = AnomalyConfig::default();
        assert_eq!(scan(&table, &config), scan(&table, &config));
    }

    #[test]
    fn test_zero_budget_degrades() {
        let config = AnomalyConfig::default().with_budget_ms(0);
        let scan = scan(&clustered_table(), &config);
        assert!(scan.anomalous_rows.is_empty());
        assert!(scan.degraded.is_some());
    }

    #[test]
    fn test_no_numeric_columns_degrades() {
        let table = Table::from_rows("t", &["name"], vec![vec!["a".into()], vec!["b".into()]])
            .unwrap();
        let scan = scan(&table, &AnomalyConfig::default());
        assert!(scan.columns.is_empty());
        assert!(scan.anomalous_rows.is_empty());
        assert!(scan.degraded.is_some());
    }
}
