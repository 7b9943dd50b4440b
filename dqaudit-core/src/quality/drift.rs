//! Distribution drift between two numeric samples.

use super::stats::min_max;

const BUCKETS: usize = 10;
const EPSILON: f64 = 1e-6;

/// Proportion of values in each equal-width bucket over `[lo, hi]`.
///
/// The last bucket is closed on the right; values outside the range are
/// not counted.
fn bucket_shares(values: &[f64], lo: f64, hi: f64) -> [f64; BUCKETS] {
    let mut counts = [0usize; BUCKETS];
    let width = (hi - lo) / BUCKETS as f64;

    for &v in values {
        if v < lo || v > hi {
            continue;
        }
        let index = if width > 0.0 {
            (((v - lo) / width) as usize).min(BUCKETS - 1)
        } else {
            BUCKETS - 1
        };
        counts[index] += 1;
    }

    let total = counts.iter().sum::<usize>().max(1) as f64;
    let mut shares = [0.0; BUCKETS];
    for (share, count) in shares.iter_mut().zip(counts) {
        *share = count as f64 / total;
    }
    shares
}

/// Population stability index of `actual` against `expected`.
///
/// Buckets are laid over the expected sample's range; empty buckets are
/// floored at a small epsilon. Either sample being empty yields 0.
pub fn population_stability_index(expected: &[f64], actual: &[f64]) -> f64 {
    let expected: Vec<f64> = expected.iter().copied().filter(|v| v.is_finite()).collect();
    let actual: Vec<f64> = actual.iter().copied().filter(|v| v.is_finite()).collect();

    let Some((lo, hi)) = min_max(&expected) else {
        return 0.0;
    };
    if actual.is_empty() {
        return 0.0;
    }

    let expected_shares = bucket_shares(&expected, lo, hi);
    let actual_shares = bucket_shares(&actual, lo, hi);

    expected_shares
        .iter()
        .zip(actual_shares.iter())
        .map(|(&e, &a)| {
            let e = if e == 0.0 { EPSILON } else { e };
            let a = if a == 0.0 { EPSILON } else { a };
            (e - a) * (e / a).ln()
        })
        .sum()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_samples_have_no_drift() {
        let sample: Vec<f64> = (0..100).map(f64::from).collect();
        assert!(population_stability_index(&sample, &sample).abs() < 1e-12);
    }

    #[test]
    fn test_shifted_sample_drifts() {
        let expected: Vec<f64> = (0..100).map(f64::from).collect();
        let actual: Vec<f64> = (0..100).map(|i| f64::from(i) * 0.3).collect();
        assert!(population_stability_index(&expected, &actual) > 0.25);
    }

    #[test]
    fn test_empty_inputs() {
        assert_eq!(population_stability_index(&[], &[1.0]), 0.0);
        assert_eq!(population_stability_index(&[1.0], &[]), 0.0);
    }

    #[test]
    fn test_bucket_shares_sum_to_one() {
        let shares = bucket_shares(&[0.0, 5.0, 10.0, 10.0], 0.0, 10.0);
        assert!((shares.iter().sum::<f64>() - 1.0).abs() < 1e-12);
        assert_eq!(shares[BUCKETS - 1], 0.5);
    }
}
