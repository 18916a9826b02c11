//! Fuzzy C-Means clustering.
//!
//! FCM gives every point a **degree of membership** in every cluster instead
//! of a single label. Memberships in a row sum to 1.
//!
//! # The Objective
//!
//! ```text
//! J_m = Σ_i Σ_k U[i,k]^m ||x_i - v_k||²,   m > 1
//! ```
//!
//! # Alternating Optimization
//!
//! 1. Initialize `U` randomly (rows normalized)
//! 2. **Centers**: `v_k = Σ_i U[i,k]^m x_i / Σ_i U[i,k]^m`
//! 3. **Distances**: `D[i,k] = ||x_i - v_k||`, exact zeros floored to machine epsilon
//! 4. **Memberships**: `U[i,k] ∝ D[i,k]^(-2/(m-1))`
//! 5. Stop when `max |U_new - U_old| < tol`, otherwise go to 2
//!
//! The fuzziness exponent `m` controls overlap: `m → 1⁺` approaches hard
//! k-means, large `m` flattens every row towards `1/c`.
//!
//! # Failure Modes
//!
//! - **Degenerate cluster**: a column of `U` collapses to zero, so its center
//!   is undefined. Reported as [`Error::DegenerateCluster`].
//! - **Coincident point**: a point sitting exactly on a center has distance 0.
//!   The distance is floored and the event counted in [`FcmFit::floored_distances`].
//! - **No convergence**: the loop is capped at `max_iter` iterations and
//!   reports [`Error::ConvergenceFailure`] instead of returning a partial result.

use super::centers::estimate_centers;
use super::distance::{floor_zero_distances, pairwise_distances};
use super::membership::MembershipMatrix;
use super::traits::{Clustering, SoftClustering};
use crate::error::{Error, Result};
use ndarray::Array2;
use rand::prelude::*;

/// Loop state of the convergence controller.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FcmState {
    /// Memberships still moving by at least the tolerance.
    Running,
    /// Last update moved every membership by less than the tolerance.
    Converged,
}

/// Output of one alternating-optimization step. Owned by the controller and
/// handed from one iteration to the next by value.
#[derive(Debug, Clone)]
struct IterationRecord {
    membership: MembershipMatrix,
    centers: Array2<f64>,
    distances: Array2<f64>,
    floored: usize,
    degenerate_rows: usize,
    max_change: f64,
}

/// Converged FCM run.
#[derive(Debug, Clone)]
pub struct FcmFit {
    /// Final membership matrix (n x c).
    pub membership: MembershipMatrix,
    /// Cluster centers (c x d) the final memberships were computed from.
    pub centers: Array2<f64>,
    /// Floored distances (n x c) from every point to `centers`.
    pub distances: Array2<f64>,
    /// Iterations performed.
    pub iterations: usize,
    /// `max |U_final - U_prev|` of the last iteration.
    pub final_change: f64,
    /// Zero distances floored in the final distance matrix.
    pub floored_distances: usize,
    /// Zero distances floored over the whole run.
    pub total_floored: usize,
    /// Rows of the final update whose weights were all zero.
    pub degenerate_rows: usize,
    /// Always [`FcmState::Converged`] for a returned fit.
    pub state: FcmState,
}

impl FcmFit {
    /// Hard assignment per point (argmax, ties to the lowest index).
    pub fn hard_assignments(&self) -> Vec<usize> {
        self.membership.hard_assignments()
    }

    /// Partition coefficient of the final memberships.
    pub fn partition_coefficient(&self) -> f64 {
        self.membership.partition_coefficient()
    }

    /// Partition entropy of the final memberships.
    pub fn partition_entropy(&self) -> f64 {
        self.membership.partition_entropy()
    }
}

/// Fuzzy C-Means clustering algorithm.
#[derive(Debug, Clone)]
pub struct FuzzyCmeans {
    /// Number of clusters.
    c: usize,
    /// Fuzziness exponent `m > 1`.
    fuzziness: f64,
    /// Convergence tolerance on the largest membership change.
    tol: f64,
    /// Maximum iterations.
    max_iter: usize,
    /// Random seed for the initial memberships.
    seed: Option<u64>,
}

impl FuzzyCmeans {
    /// Create a new FCM clusterer with `m = 2`, `tol = 1e-4`, `max_iter = 1000`.
    pub fn new(c: usize) -> Self {
        Self {
            c,
            fuzziness: 2.0,
            tol: 1e-4,
            max_iter: 1000,
            seed: None,
        }
    }

    /// Set the fuzziness exponent.
    pub fn with_fuzziness(mut self, fuzziness: f64) -> Self {
        self.fuzziness = fuzziness;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tol(mut self, tol: f64) -> Self {
        self.tol = tol;
        self
    }

    /// Set maximum iterations.
    pub fn with_max_iter(mut self, max_iter: usize) -> Self {
        self.max_iter = max_iter;
        self
    }

    /// Set random seed for reproducibility.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Fuzziness exponent in use.
    pub fn fuzziness(&self) -> f64 {
        self.fuzziness
    }

    /// Check parameters against a dataset of `n_items` points.
    pub fn validate(&self, n_items: usize) -> Result<()> {
        if n_items == 0 {
            return Err(Error::EmptyInput);
        }
        if self.c < 2 {
            return Err(Error::InvalidParameter {
                name: "num_clusters",
                message: "must be >= 2",
            });
        }
        if self.c > n_items {
            return Err(Error::InvalidClusterCount {
                requested: self.c,
                n_items,
            });
        }
        if !(self.fuzziness > 1.0 && self.fuzziness.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "fuzziness_m",
                message: "must be finite and > 1",
            });
        }
        if !(self.tol > 0.0 && self.tol.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "tolerance",
                message: "must be finite and > 0",
            });
        }
        if self.max_iter == 0 {
            return Err(Error::InvalidParameter {
                name: "max_iterations",
                message: "must be > 0",
            });
        }
        Ok(())
    }

    /// Run FCM from random initial memberships.
    pub fn fit(&self, data: &Array2<f64>) -> Result<FcmFit> {
        self.validate(data.nrows())?;

        let mut rng: Box<dyn RngCore> = match self.seed {
            Some(s) => Box::new(StdRng::seed_from_u64(s)),
            None => Box::new(rand::rng()),
        };
        let initial = MembershipMatrix::initialize(data.nrows(), self.c, &mut rng);

        self.fit_from(data, initial)
    }

    /// Run FCM from caller-supplied initial memberships.
    pub fn fit_from(&self, data: &Array2<f64>, initial: MembershipMatrix) -> Result<FcmFit> {
        self.validate(data.nrows())?;
        if initial.n_points() != data.nrows() || initial.n_clusters() != self.c {
            return Err(Error::ShapeMismatch {
                expected: format!("{}x{} membership", data.nrows(), self.c),
                actual: format!("{}x{} membership", initial.n_points(), initial.n_clusters()),
            });
        }

        let mut state = FcmState::Running;
        let mut membership = initial;
        let mut last: Option<IterationRecord> = None;
        let mut iterations = 0;
        let mut total_floored = 0;

        while state == FcmState::Running {
            if iterations == self.max_iter {
                let max_change = last.as_ref().map_or(f64::INFINITY, |r| r.max_change);
                tracing::warn!(
                    iterations,
                    max_change,
                    "fuzzy c-means hit the iteration cap before converging"
                );
                return Err(Error::ConvergenceFailure {
                    iterations,
                    max_change,
                });
            }

            let record = self.step(data, &membership)?;
            iterations += 1;
            total_floored += record.floored;

            tracing::debug!(iteration = iterations, max_change = record.max_change, "fcm step");
            if record.floored > 0 {
                tracing::warn!(
                    iteration = iterations,
                    floored = record.floored,
                    "points coincide with cluster centers; distances floored"
                );
            }

            if record.max_change < self.tol {
                state = FcmState::Converged;
            }
            membership = record.membership.clone();
            last = Some(record);
        }

        let record = last.ok_or(Error::EmptyInput)?;
        if record.degenerate_rows > 0 {
            tracing::warn!(
                rows = record.degenerate_rows,
                "membership rows with zero total weight"
            );
        }
        tracing::info!(iterations, final_change = record.max_change, "fuzzy c-means converged");

        Ok(FcmFit {
            membership: record.membership,
            centers: record.centers,
            distances: record.distances,
            iterations,
            final_change: record.max_change,
            floored_distances: record.floored,
            total_floored,
            degenerate_rows: record.degenerate_rows,
            state,
        })
    }

    /// One pass: centers from `U`, distances to those centers, then new `U`.
    fn step(&self, data: &Array2<f64>, membership: &MembershipMatrix) -> Result<IterationRecord> {
        let centers = estimate_centers(membership, data, self.fuzziness)?;
        let mut distances = pairwise_distances(data, &centers);
        let floored = floor_zero_distances(&mut distances);
        let (next, degenerate_rows) = MembershipMatrix::update(&distances, self.fuzziness);
        let max_change = next.max_abs_diff(membership);

        Ok(IterationRecord {
            membership: next,
            centers,
            distances,
            floored,
            degenerate_rows,
            max_change,
        })
    }
}

/// Convert row-major points into an `n x d` matrix, checking dimensions.
pub fn to_point_matrix(data: &[Vec<f64>]) -> Result<Array2<f64>> {
    if data.is_empty() {
        return Err(Error::EmptyInput);
    }
    let n = data.len();
    let d = data[0].len();
    if d == 0 {
        return Err(Error::EmptyInput);
    }

    let mut flat: Vec<f64> = Vec::with_capacity(n * d);
    for point in data {
        if point.len() != d {
            return Err(Error::DimensionMismatch {
                expected: d,
                found: point.len(),
            });
        }
        flat.extend(point);
    }
    Array2::from_shape_vec((n, d), flat).map_err(|e| Error::ShapeMismatch {
        expected: format!("{n}x{d}"),
        actual: e.to_string(),
    })
}

impl Clustering for FuzzyCmeans {
    fn fit_predict(&self, data: &[Vec<f64>]) -> Result<Vec<usize>> {
        let points = to_point_matrix(data)?;
        Ok(self.fit(&points)?.hard_assignments())
    }

    fn n_clusters(&self) -> usize {
        self.c
    }
}

impl SoftClustering for FuzzyCmeans {
    fn fit_predict_proba(&self, data: &[Vec<f64>]) -> Result<Vec<Vec<f64>>> {
        let points = to_point_matrix(data)?;
        let fit = self.fit(&points)?;
        Ok(fit
            .membership
            .view()
            .rows()
            .into_iter()
            .map(|row| row.to_vec())
            .collect())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ndarray::array;

    fn two_blobs() -> Vec<Vec<f64>> {
        vec![
            vec![0.0, 0.0],
            vec![0.1, 0.1],
            vec![0.0, 0.2],
            vec![10.0, 10.0],
            vec![10.1, 10.1],
            vec![10.0, 10.2],
        ]
    }

    #[test]
    fn test_fcm_basic() {
        let fcm = FuzzyCmeans::new(2).with_seed(42);
        let labels = fcm.fit_predict(&two_blobs()).unwrap();

        assert_eq!(labels[0], labels[1]);
        assert_eq!(labels[1], labels[2]);
        assert_eq!(labels[3], labels[4]);
        assert_eq!(labels[4], labels[5]);
        assert_ne!(labels[0], labels[3]);
    }

    #[test]
    fn test_fcm_soft_rows_sum_to_one() {
        let data = vec![vec![0.0, 0.0], vec![5.0, 5.0], vec![10.0, 10.0]];
        let probs = FuzzyCmeans::new(2).with_seed(3).fit_predict_proba(&data).unwrap();

        for row in &probs {
            let sum: f64 = row.iter().sum();
            assert!((sum - 1.0).abs() < 1e-9);
        }
        // The midpoint is split evenly.
        assert!((probs[1][0] - 0.5).abs() < 1e-2);
    }

    #[test]
    fn test_fcm_terminates_below_tolerance() {
        let points = to_point_matrix(&two_blobs()).unwrap();
        let fcm = FuzzyCmeans::new(2).with_seed(11).with_max_iter(200);
        let fit = fcm.fit(&points).unwrap();

        assert!(fit.iterations <= 200);
        assert!(fit.final_change < 1e-4);
        assert_eq!(fit.state, FcmState::Converged);
    }

    #[test]
    fn test_fcm_deterministic_with_seed() {
        let points = to_point_matrix(&two_blobs()).unwrap();
        let a = FuzzyCmeans::new(2).with_seed(5).fit(&points).unwrap();
        let b = FuzzyCmeans::new(2).with_seed(5).fit(&points).unwrap();

        assert_eq!(a.membership, b.membership);
        assert_eq!(a.centers, b.centers);
        assert_eq!(a.iterations, b.iterations);
    }

    #[test]
    fn test_update_on_converged_state_is_idempotent() {
        let points = to_point_matrix(&two_blobs()).unwrap();
        let fit = FuzzyCmeans::new(2).with_seed(9).fit(&points).unwrap();

        let centers = estimate_centers(&fit.membership, &points, 2.0).unwrap();
        let mut distances = pairwise_distances(&points, &centers);
        floor_zero_distances(&mut distances);
        let (again, _) = MembershipMatrix::update(&distances, 2.0);
        assert!(again.max_abs_diff(&fit.membership) < 1e-4);

        // Centers recomputed from the final U barely move from the returned ones.
        let shift = (&centers - &fit.centers)
            .iter()
            .fold(0.0f64, |acc, v| acc.max(v.abs()));
        assert!(shift < 1e-2, "centers moved by {shift}");
    }

    #[test]
    fn test_empty_membership_column_is_degenerate() {
        let points = to_point_matrix(&two_blobs()).unwrap();
        let initial = MembershipMatrix::from_array(Array2::from_shape_fn((6, 2), |(_, k)| {
            if k == 0 {
                1.0
            } else {
                0.0
            }
        }))
        .unwrap();

        let err = FuzzyCmeans::new(2).fit_from(&points, initial).unwrap_err();
        assert!(err.is_degenerate_cluster());
        assert!(matches!(err, Error::DegenerateCluster { cluster: 1, .. }));
    }

    #[test]
    fn test_iteration_cap_reports_non_convergence() {
        let points = to_point_matrix(&two_blobs()).unwrap();
        let fcm = FuzzyCmeans::new(2).with_seed(1).with_max_iter(1).with_tol(1e-300);

        match fcm.fit(&points) {
            Err(Error::ConvergenceFailure { iterations, .. }) => assert_eq!(iterations, 1),
            other => panic!("expected convergence failure, got {other:?}"),
        }
    }

    #[test]
    fn test_point_on_center_converges_to_full_membership() {
        // Crisp start: the first center is exactly the single point [0, 0].
        let points = array![[0.0, 0.0], [10.0, 10.0], [10.0, 12.0]];
        let initial = MembershipMatrix::from_array(array![[1.0, 0.0], [0.0, 1.0], [0.0, 1.0]])
            .unwrap();

        let fit = FuzzyCmeans::new(2).fit_from(&points, initial).unwrap();
        assert!(fit.total_floored >= 1);
        assert!(fit.membership.get(0, 0) > 1.0 - 1e-6);
        for sum in fit.membership.row_sums() {
            assert!((sum - 1.0).abs() < 1e-9);
        }
    }

    #[test]
    fn test_smaller_fuzziness_concentrates_memberships() {
        let points = to_point_matrix(&two_blobs()).unwrap();
        let soft = FuzzyCmeans::new(2).with_seed(4).with_fuzziness(3.0).fit(&points).unwrap();
        let mid = FuzzyCmeans::new(2).with_seed(4).with_fuzziness(2.0).fit(&points).unwrap();
        let hard = FuzzyCmeans::new(2).with_seed(4).with_fuzziness(1.5).fit(&points).unwrap();

        assert!(hard.partition_entropy() < mid.partition_entropy());
        assert!(mid.partition_entropy() < soft.partition_entropy());
        assert!(hard.partition_coefficient() > 0.999);
    }

    #[test]
    fn test_invalid_configuration() {
        let points = to_point_matrix(&two_blobs()).unwrap();

        assert!(FuzzyCmeans::new(1).fit(&points).unwrap_err().is_configuration());
        assert!(FuzzyCmeans::new(7).fit(&points).unwrap_err().is_configuration());
        assert!(FuzzyCmeans::new(2)
            .with_fuzziness(1.0)
            .fit(&points)
            .unwrap_err()
            .is_configuration());
        assert!(FuzzyCmeans::new(2)
            .with_tol(0.0)
            .fit(&points)
            .unwrap_err()
            .is_configuration());
        assert!(FuzzyCmeans::new(2)
            .with_max_iter(0)
            .fit(&points)
            .unwrap_err()
            .is_configuration());
    }

    #[test]
    fn test_ragged_input_error() {
        let data = vec![vec![0.0, 0.0], vec![1.0]];
        assert_eq!(
            FuzzyCmeans::new(2).fit_predict(&data).unwrap_err(),
            Error::DimensionMismatch {
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_initial_shape_mismatch() {
        let points = to_point_matrix(&two_blobs()).unwrap();
        let initial = MembershipMatrix::from_array(array![[1.0, 0.0]]).unwrap();
        assert!(FuzzyCmeans::new(2).fit_from(&points, initial).is_err());
    }
}
