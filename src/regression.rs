//! Piecewise-local linear regression on a fuzzy partition.
//!
//! Every point is hard-assigned to its highest-membership cluster and one
//! ordinary least-squares model is fit per cluster on the design matrix
//! $A = [X \mid 1]$. A single global model over all points is fit alongside
//! as a baseline.
//!
//! Coefficients are laid out as $(w_1, \dots, w_d, b)$: feature weights
//! followed by the intercept, so $\hat{y} = B \cdot [x, 1]$.

use crate::cluster::MembershipMatrix;
use crate::error::{Error, Result};
use faer::prelude::*;
use faer::Mat;
use ndarray::{Array1, Array2, ArrayView1};

/// Smallest accepted ratio `s_min / s_max` of the design matrix singular values.
const RANK_TOLERANCE: f64 = 1e-10;

/// An affine model $\hat{y} = w \cdot x + b$.
#[derive(Debug, Clone, PartialEq)]
pub struct LinearModel {
    coefficients: Array1<f64>,
}

impl LinearModel {
    /// Build a model from `(w_1, ..., w_d, b)`.
    pub fn from_coefficients(coefficients: Array1<f64>) -> Self {
        Self { coefficients }
    }

    /// Coefficients `(w_1, ..., w_d, b)`.
    pub fn coefficients(&self) -> &Array1<f64> {
        &self.coefficients
    }

    /// Feature weights without the intercept.
    pub fn weights(&self) -> ArrayView1<'_, f64> {
        let d = self.coefficients.len().saturating_sub(1);
        self.coefficients.slice(ndarray::s![..d])
    }

    /// Intercept term.
    pub fn intercept(&self) -> f64 {
        self.coefficients.last().copied().unwrap_or(0.0)
    }

    /// Number of features the model expects.
    pub fn n_features(&self) -> usize {
        self.coefficients.len().saturating_sub(1)
    }

    /// Prediction for one point.
    pub fn predict(&self, point: &ArrayView1<'_, f64>) -> f64 {
        self.weights().dot(point) + self.intercept()
    }

    /// Predictions for every row of `data`.
    pub fn predict_all(&self, data: &Array2<f64>) -> Array1<f64> {
        data.rows().into_iter().map(|row| self.predict(&row)).collect()
    }
}

/// Ordinary least squares on `[X | 1]`.
///
/// `cluster` only labels errors. Fails with
/// [`Error::InsufficientClusterPoints`] (cluster fits) or
/// [`Error::RankDeficient`] (global fit) when there are fewer than `d + 1`
/// rows, and with [`Error::RankDeficient`] when the design matrix is
/// numerically singular (`s_min <= s_max * 1e-10`).
pub fn fit_ols(x: &Array2<f64>, y: &Array1<f64>, cluster: Option<usize>) -> Result<LinearModel> {
    let (n, d) = x.dim();
    if y.len() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: y.len(),
        });
    }
    let p = d + 1;
    if n < p {
        return Err(match cluster {
            Some(k) => Error::InsufficientClusterPoints {
                cluster: k,
                found: n,
                required: p,
            },
            None => Error::RankDeficient { cluster: None },
        });
    }

    let mut a = Mat::<f64>::zeros(n, p);
    let mut rhs = Mat::<f64>::zeros(n, 1);
    for i in 0..n {
        for j in 0..d {
            a[(i, j)] = x[[i, j]];
        }
        a[(i, d)] = 1.0;
        rhs[(i, 0)] = y[i];
    }

    // Numerical rank: singular values are returned in nonincreasing order.
    let singular = a.singular_values();
    let s_max = singular.first().copied().unwrap_or(0.0);
    let s_min = singular.last().copied().unwrap_or(0.0);
    if !(s_max > 0.0) || s_min <= s_max * RANK_TOLERANCE {
        return Err(Error::RankDeficient { cluster });
    }

    // Least squares through the QR factors of A; forming A^T A would square
    // the condition number of off-origin designs.
    let b = a.col_piv_qr().solve_lstsq(&rhs);

    let coefficients: Array1<f64> = (0..p).map(|j| b[(j, 0)]).collect();
    if coefficients.iter().any(|c| !c.is_finite()) {
        return Err(Error::RankDeficient { cluster });
    }

    Ok(LinearModel { coefficients })
}

/// Per-cluster models fit on the hard partition, plus the global baseline.
#[derive(Debug, Clone)]
pub struct LocalRegression {
    /// Hard assignment used to split the points.
    pub assignments: Vec<usize>,
    /// One model per cluster, indexed by cluster.
    pub cluster_models: Vec<LinearModel>,
    /// Model fit on all points without clustering.
    pub global: LinearModel,
}

impl LocalRegression {
    /// Fit one model per cluster of `membership`'s hard partition and one global model.
    pub fn fit(
        data: &Array2<f64>,
        targets: &Array1<f64>,
        membership: &MembershipMatrix,
    ) -> Result<Self> {
        let n = data.nrows();
        if n == 0 {
            return Err(Error::EmptyInput);
        }
        if targets.len() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: targets.len(),
            });
        }
        if membership.n_points() != n {
            return Err(Error::DimensionMismatch {
                expected: n,
                found: membership.n_points(),
            });
        }

        let assignments = membership.hard_assignments();
        let mut cluster_models = Vec::with_capacity(membership.n_clusters());

        for k in 0..membership.n_clusters() {
            let members: Vec<usize> = assignments
                .iter()
                .enumerate()
                .filter(|(_, &a)| a == k)
                .map(|(i, _)| i)
                .collect();

            let x_k = data.select(ndarray::Axis(0), &members);
            let y_k = targets.select(ndarray::Axis(0), &members);
            let model = fit_ols(&x_k, &y_k, Some(k))?;

            tracing::debug!(cluster = k, points = members.len(), "fitted local model");
            cluster_models.push(model);
        }

        let global = fit_ols(data, targets, None)?;

        Ok(Self {
            assignments,
            cluster_models,
            global,
        })
    }

    /// Prediction of every cluster model for every point (n x c).
    pub fn cluster_predictions(&self, data: &Array2<f64>) -> Array2<f64> {
        Array2::from_shape_fn((data.nrows(), self.cluster_models.len()), |(i, k)| {
            self.cluster_models[k].predict(&data.row(i))
        })
    }

    /// Prediction of each point by the model of its own hard cluster.
    pub fn predict_assigned(&self, data: &Array2<f64>) -> Array1<f64> {
        data.rows()
            .into_iter()
            .zip(&self.assignments)
            .map(|(row, &k)| self.cluster_models[k].predict(&row))
            .collect()
    }

    /// Global-model prediction for every point.
    pub fn predict_global(&self, data: &Array2<f64>) -> Array1<f64> {
        self.global.predict_all(data)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_ols_recovers_exact_plane() {
        // y = 2 x0 - 3 x1 + 0.5
        let x = array![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [2.0, 0.5],
            [0.3, 1.7]
        ];
        let y: Array1<f64> = x.rows().into_iter().map(|r| 2.0 * r[0] - 3.0 * r[1] + 0.5).collect();

        let model = fit_ols(&x, &y, None).unwrap();
        let c = model.coefficients();
        assert!((c[0] - 2.0).abs() < 1e-9);
        assert!((c[1] + 3.0).abs() < 1e-9);
        assert!((c[2] - 0.5).abs() < 1e-9);
        assert!((model.intercept() - 0.5).abs() < 1e-9);
        assert_eq!(model.n_features(), 2);
    }

    #[test]
    fn test_ols_recovers_intercept_far_from_origin() {
        // y = 2x + 1 with x clustered tightly around 1e4.
        let x = Array2::from_shape_fn((50, 1), |(i, _)| 1e4 + i as f64 * 1e-3);
        let y: Array1<f64> = x.column(0).iter().map(|&v| 2.0 * v + 1.0).collect();

        let model = fit_ols(&x, &y, None).unwrap();
        assert!((model.weights()[0] - 2.0).abs() < 1e-6);
        assert!((model.intercept() - 1.0).abs() < 1e-4, "{}", model.intercept());
    }

    #[test]
    fn test_ols_offset_plane_keeps_residuals_tiny() {
        // Same plane as above, every feature shifted by +1000.
        let x = array![
            [0.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [1.0, 1.0],
            [2.0, 0.5],
            [0.3, 1.7]
        ] + 1000.0;
        let y: Array1<f64> = x.rows().into_iter().map(|r| 2.0 * r[0] - 3.0 * r[1] + 4.0).collect();

        let model = fit_ols(&x, &y, Some(0)).unwrap();
        assert!((model.intercept() - 4.0).abs() < 1e-8);
        let sse: f64 = model
            .predict_all(&x)
            .iter()
            .zip(y.iter())
            .map(|(p, t)| (p - t).powi(2))
            .sum();
        assert!(sse < 1e-18);
    }

    #[test]
    fn test_ols_too_few_points() {
        let x = array![[0.0, 1.0], [1.0, 0.0]];
        let y = array![1.0, 2.0];

        assert_eq!(
            fit_ols(&x, &y, Some(3)).unwrap_err(),
            Error::InsufficientClusterPoints {
                cluster: 3,
                found: 2,
                required: 3
            }
        );
        assert_eq!(
            fit_ols(&x, &y, None).unwrap_err(),
            Error::RankDeficient { cluster: None }
        );
    }

    #[test]
    fn test_ols_duplicate_columns_are_rank_deficient() {
        let x = array![[1.0, 1.0], [2.0, 2.0], [3.0, 3.0], [4.0, 4.0]];
        let y = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(
            fit_ols(&x, &y, Some(0)).unwrap_err(),
            Error::RankDeficient { cluster: Some(0) }
        );
    }

    #[test]
    fn test_ols_target_length_mismatch() {
        let x = array![[0.0], [1.0], [2.0]];
        let y = array![1.0, 2.0];
        assert!(fit_ols(&x, &y, None).is_err());
    }

    #[test]
    fn test_local_models_follow_hard_partition() {
        // Cluster 0: y = x + 1 on x in [0, 1]; cluster 1: y = -2x + 30 on x in [10, 11].
        let xs = [0.0, 0.25, 0.5, 1.0, 10.0, 10.25, 10.5, 11.0];
        let data = Array2::from_shape_fn((8, 1), |(i, _)| xs[i]);
        let targets: Array1<f64> = xs
            .iter()
            .map(|&x| if x < 5.0 { x + 1.0 } else { -2.0 * x + 30.0 })
            .collect();
        let membership = MembershipMatrix::from_array(Array2::from_shape_fn((8, 2), |(i, k)| {
            let first = if xs[i] < 5.0 { 0.9 } else { 0.1 };
            if k == 0 {
                first
            } else {
                1.0 - first
            }
        }))
        .unwrap();

        let reg = LocalRegression::fit(&data, &targets, &membership).unwrap();
        assert_eq!(reg.assignments, vec![0, 0, 0, 0, 1, 1, 1, 1]);

        let c0 = reg.cluster_models[0].coefficients();
        let c1 = reg.cluster_models[1].coefficients();
        assert!((c0[0] - 1.0).abs() < 1e-9 && (c0[1] - 1.0).abs() < 1e-9);
        assert!((c1[0] + 2.0).abs() < 1e-9 && (c1[1] - 30.0).abs() < 1e-9);

        let assigned = reg.predict_assigned(&data);
        for (p, t) in assigned.iter().zip(targets.iter()) {
            assert!((p - t).abs() < 1e-9);
        }

        let all = reg.cluster_predictions(&data);
        assert_eq!(all.dim(), (8, 2));
        assert!((all[[0, 1]] - 30.0).abs() < 1e-9);

        // The global line cannot fit both pieces.
        let global = reg.predict_global(&data);
        let sse: f64 = global
            .iter()
            .zip(targets.iter())
            .map(|(p, t)| (p - t).powi(2))
            .sum();
        assert!(sse > 1.0);
    }

    #[test]
    fn test_local_fit_with_starved_cluster() {
        let data = array![[0.0], [1.0], [2.0], [3.0]];
        let targets = array![0.0, 1.0, 2.0, 3.0];
        let membership = MembershipMatrix::from_array(array![
            [0.9, 0.1],
            [0.9, 0.1],
            [0.9, 0.1],
            [0.2, 0.8]
        ])
        .unwrap();

        let err = LocalRegression::fit(&data, &targets, &membership).unwrap_err();
        assert!(err.is_degenerate_cluster());
    }
}
