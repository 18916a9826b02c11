//! Soft-assignment matrix `U` (n x c).
//!
//! Invariant: after [`MembershipMatrix::initialize`] and after every
//! [`MembershipMatrix::update`] each row sums to 1 and every entry lies in
//! `[0, 1]`. The single documented exception is a row whose update weights
//! are all zero or non-finite; such rows are left at zero and counted.

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2};
use rand::Rng;

/// Tolerance used when validating caller-supplied rows.
const ROW_SUM_TOLERANCE: f64 = 1e-6;

/// Fuzzy membership matrix: entry `[i, k]` is the degree to which point `i`
/// belongs to cluster `k`.
#[derive(Debug, Clone, PartialEq)]
pub struct MembershipMatrix {
    values: Array2<f64>,
}

impl MembershipMatrix {
    /// Random initial memberships: uniform draws in `[0, 1)`, row-normalized.
    pub fn initialize(n_points: usize, n_clusters: usize, rng: &mut impl Rng) -> Self {
        let mut values = Array2::zeros((n_points, n_clusters));
        for mut row in values.rows_mut() {
            for v in row.iter_mut() {
                *v = rng.random::<f64>();
            }
            let sum = row.sum();
            if sum > 0.0 {
                row.mapv_inplace(|v| v / sum);
            } else {
                // Every draw was exactly zero.
                row.fill(1.0 / n_clusters as f64);
            }
        }
        Self { values }
    }

    /// Wrap a caller-supplied matrix, checking the row-sum invariant.
    pub fn from_array(values: Array2<f64>) -> Result<Self> {
        if values.nrows() == 0 || values.ncols() == 0 {
            return Err(Error::EmptyInput);
        }
        for row in values.rows() {
            if row.iter().any(|&v| !v.is_finite() || !(0.0..=1.0).contains(&v)) {
                return Err(Error::InvalidParameter {
                    name: "membership",
                    message: "entries must be finite and within [0, 1]",
                });
            }
            if (row.sum() - 1.0).abs() > ROW_SUM_TOLERANCE {
                return Err(Error::InvalidParameter {
                    name: "membership",
                    message: "rows must sum to 1",
                });
            }
        }
        Ok(Self { values })
    }

    /// Recompute memberships from a (floored) distance matrix.
    ///
    /// `U[i, k] ∝ 1 / D[i, k]^p` with `p = 2 / (m - 1)`. The weights are
    /// evaluated as `(d_min / D[i, k])^p`, which is the same row after
    /// normalization but cannot overflow for tiny distances or large `p`.
    /// Non-finite weights count as zero.
    ///
    /// Returns the new matrix and the number of rows whose total weight was
    /// zero (left all-zero).
    pub fn update(distances: &Array2<f64>, fuzziness: f64) -> (Self, usize) {
        let exponent = 2.0 / (fuzziness - 1.0);
        let mut values = Array2::zeros(distances.dim());
        let mut degenerate_rows = 0;

        for (mut out, d_row) in values.rows_mut().into_iter().zip(distances.rows()) {
            let d_min = d_row
                .iter()
                .copied()
                .filter(|d| d.is_finite() && *d > 0.0)
                .fold(f64::INFINITY, f64::min);

            if d_min.is_finite() {
                for (o, &d) in out.iter_mut().zip(d_row.iter()) {
                    let w = (d_min / d).powf(exponent);
                    *o = if w.is_finite() && d > 0.0 { w } else { 0.0 };
                }
            }

            let total = out.sum();
            if total > 0.0 {
                out.mapv_inplace(|v| v / total);
            } else {
                out.fill(0.0);
                degenerate_rows += 1;
            }
        }

        (Self { values }, degenerate_rows)
    }

    /// Number of points (rows).
    pub fn n_points(&self) -> usize {
        self.values.nrows()
    }

    /// Number of clusters (columns).
    pub fn n_clusters(&self) -> usize {
        self.values.ncols()
    }

    /// Borrow the underlying matrix.
    pub fn view(&self) -> ArrayView2<'_, f64> {
        self.values.view()
    }

    /// Membership of point `i` in cluster `k`.
    pub fn get(&self, i: usize, k: usize) -> f64 {
        self.values[[i, k]]
    }

    /// Consume and return the underlying matrix.
    pub fn into_inner(self) -> Array2<f64> {
        self.values
    }

    /// Per-row sums.
    pub fn row_sums(&self) -> Vec<f64> {
        self.values.rows().into_iter().map(|r| r.sum()).collect()
    }

    /// `max |U_self - U_other|` over all entries.
    pub fn max_abs_diff(&self, other: &MembershipMatrix) -> f64 {
        self.values
            .iter()
            .zip(other.values.iter())
            .map(|(a, b)| (a - b).abs())
            .fold(0.0, f64::max)
    }

    /// Hard assignment of every point: argmax of its row, ties to the lowest index.
    pub fn hard_assignments(&self) -> Vec<usize> {
        self.values
            .rows()
            .into_iter()
            .map(|row| argmax_first(row.iter().copied()))
            .collect()
    }

    /// Bezdek's partition coefficient `Σ U² / n`, in `[1/c, 1]`. 1 means crisp.
    pub fn partition_coefficient(&self) -> f64 {
        let n = self.n_points().max(1) as f64;
        self.values.iter().map(|u| u * u).sum::<f64>() / n
    }

    /// Mean row entropy `-Σ U ln U / n`, in `[0, ln c]`. 0 means crisp.
    pub fn partition_entropy(&self) -> f64 {
        let n = self.n_points().max(1) as f64;
        -self
            .values
            .iter()
            .filter(|&&u| u > 0.0)
            .map(|&u| u * u.ln())
            .sum::<f64>()
            / n
    }
}

/// Index of the first maximum; `0` for an empty iterator.
pub(crate) fn argmax_first(values: impl Iterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (k, v) in values.enumerate() {
        if v > best_value {
            best_value = v;
            best = k;
        }
    }
    best
}
