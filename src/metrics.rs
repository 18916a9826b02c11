//! Evaluation metrics.
//!
//! Two families:
//!
//! - **Prediction error**: mean squared error between targets and a
//!   prediction vector. [`mse_partial`] accepts predictions that may be
//!   missing (defuzzified points with no relevant cluster) and excludes them.
//! - **Partition agreement**: compare hard assignments against ground-truth
//!   labels. Both are invariant to label permutation.
//!
//! | Metric | Range | Best |
//! |--------|-------|------|
//! | [`mse`] | [0, ∞) | 0 |
//! | [`ari`] | [-1, 1] | 1 |
//! | [`purity`] | [0, 1] | 1 |
//!
//! # References
//!
//! - Hubert & Arabie (1985). "Comparing partitions" (ARI)

use crate::error::{Error, Result};
use std::collections::HashMap;

/// Mean squared error `mean((y - ŷ)²)` over equally long slices.
pub fn mse(truth: &[f64], pred: &[f64]) -> Result<f64> {
    if truth.len() != pred.len() {
        return Err(Error::DimensionMismatch {
            expected: truth.len(),
            found: pred.len(),
        });
    }
    if truth.is_empty() {
        return Err(Error::EmptyInput);
    }
    let sse: f64 = truth
        .iter()
        .zip(pred)
        .map(|(y, p)| (y - p).powi(2))
        .sum();
    Ok(sse / truth.len() as f64)
}

/// MSE over the points that have a prediction.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MseReport {
    /// MSE over evaluated points; `None` when every point was excluded.
    pub mse: Option<f64>,
    /// Points with a prediction.
    pub evaluated: usize,
    /// Points without a prediction.
    pub excluded: usize,
}

/// MSE ignoring points whose prediction is `None`.
pub fn mse_partial(truth: &[f64], pred: &[Option<f64>]) -> Result<MseReport> {
    if truth.len() != pred.len() {
        return Err(Error::DimensionMismatch {
            expected: truth.len(),
            found: pred.len(),
        });
    }

    let mut sse = 0.0;
    let mut evaluated = 0;
    for (y, p) in truth.iter().zip(pred) {
        if let Some(p) = p {
            sse += (y - p).powi(2);
            evaluated += 1;
        }
    }

    Ok(MseReport {
        mse: (evaluated > 0).then(|| sse / evaluated as f64),
        evaluated,
        excluded: truth.len() - evaluated,
    })
}

/// Adjusted Rand Index between two clusterings.
///
/// ARI is the corrected-for-chance version of the Rand Index.
/// A value of 0 indicates random clustering, 1 indicates perfect agreement.
///
/// # Example
///
/// ```rust
/// use fcm::metrics::ari;
///
/// let pred = [0, 0, 1, 1];
/// let truth = [1, 1, 0, 0];
/// assert!((ari(&pred, &truth) - 1.0).abs() < 0.01);
/// ```
pub fn ari(pred: &[usize], truth: &[usize]) -> f64 {
    if pred.len() != truth.len() || pred.is_empty() {
        return 0.0;
    }

    let (joint, n) = build_contingency_table(pred, truth);

    // Row sums (a_i) and column sums (b_j)
    let mut row_sums = HashMap::new();
    let mut col_sums = HashMap::new();

    for (&(p, t), &count) in &joint {
        *row_sums.entry(p).or_insert(0usize) += count;
        *col_sums.entry(t).or_insert(0usize) += count;
    }

    let sum_comb_ij: f64 = joint.values().map(|&c| comb2(c) as f64).sum();
    let sum_comb_a: f64 = row_sums.values().map(|&a| comb2(a) as f64).sum();
    let sum_comb_b: f64 = col_sums.values().map(|&b| comb2(b) as f64).sum();

    let comb_n = comb2(n) as f64;
    if comb_n == 0.0 {
        return 1.0;
    }

    // ARI = (index - expected) / (max - expected)
    let expected = sum_comb_a * sum_comb_b / comb_n;
    let max_index = (sum_comb_a + sum_comb_b) / 2.0;

    let denom = max_index - expected;
    if denom.abs() < 1e-10 {
        return 1.0;
    }

    (sum_comb_ij - expected) / denom
}

/// Purity of a clustering with respect to ground truth.
///
/// For each predicted cluster take its most common true label; purity is the
/// fraction of points covered that way. With one predicted cluster per true
/// label this is the best-permutation assignment accuracy.
pub fn purity(pred: &[usize], truth: &[usize]) -> f64 {
    if pred.len() != truth.len() || pred.is_empty() {
        return 0.0;
    }

    let (joint, n) = build_contingency_table(pred, truth);

    let mut cluster_maxes: HashMap<usize, usize> = HashMap::new();
    for (&(p, _), &count) in &joint {
        let current_max = cluster_maxes.entry(p).or_insert(0);
        *current_max = (*current_max).max(count);
    }

    let correct: usize = cluster_maxes.values().sum();
    correct as f64 / n as f64
}

fn build_contingency_table(
    pred: &[usize],
    truth: &[usize],
) -> (HashMap<(usize, usize), usize>, usize) {
    let mut table = HashMap::new();
    for (&p, &t) in pred.iter().zip(truth.iter()) {
        *table.entry((p, t)).or_insert(0) += 1;
    }
    (table, pred.len())
}

fn comb2(n: usize) -> usize {
    if n < 2 {
        0
    } else {
        n * (n - 1) / 2
    }
}
