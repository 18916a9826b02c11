//! Run configuration.

use crate::cluster::{DispersionMethod, FuzzyCmeans};
use crate::defuzzify::DEFAULT_THRESHOLD;
use crate::error::{Error, Result};

/// Parameters for a full clustering + regression + defuzzification run.
///
/// `Default` is the reference configuration: 3 clusters, `m = 2`,
/// `tol = 1e-4`, θ = 0.3, β = 2.
#[derive(Debug, Clone, PartialEq)]
pub struct FcmConfig {
    /// Number of clusters (>= 2).
    pub num_clusters: usize,
    /// Fuzziness exponent (> 1).
    pub fuzziness_m: f64,
    /// Convergence threshold on the largest membership change (> 0).
    pub tolerance: f64,
    /// Iteration cap for the alternating optimization (> 0).
    pub max_iterations: usize,
    /// Membership threshold θ for the gated defuzzifiers, in `[0, 1]`.
    pub membership_threshold: f64,
    /// Shape parameter β of the generalized Gaussian and rational kernels (> 0).
    pub fuzzifier_shape_beta: f64,
    /// Seed for the initial membership matrix.
    pub seed: Option<u64>,
    /// Estimator for the per-cluster dispersion.
    pub dispersion: DispersionMethod,
}

impl Default for FcmConfig {
    fn default() -> Self {
        Self {
            num_clusters: 3,
            fuzziness_m: 2.0,
            tolerance: 1e-4,
            max_iterations: 1000,
            membership_threshold: DEFAULT_THRESHOLD,
            fuzzifier_shape_beta: 2.0,
            seed: None,
            dispersion: DispersionMethod::MembershipComplement,
        }
    }
}

impl FcmConfig {
    /// Reference configuration with `num_clusters` clusters.
    pub fn new(num_clusters: usize) -> Self {
        Self {
            num_clusters,
            ..Self::default()
        }
    }

    /// Set the fuzziness exponent.
    pub fn with_fuzziness(mut self, m: f64) -> Self {
        self.fuzziness_m = m;
        self
    }

    /// Set convergence tolerance.
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    /// Set the iteration cap.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Set the defuzzification threshold θ.
    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.membership_threshold = threshold;
        self
    }

    /// Set the kernel shape parameter β.
    pub fn with_beta(mut self, beta: f64) -> Self {
        self.fuzzifier_shape_beta = beta;
        self
    }

    /// Set the random seed.
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Set the dispersion estimator.
    pub fn with_dispersion(mut self, dispersion: DispersionMethod) -> Self {
        self.dispersion = dispersion;
        self
    }

    /// Clusterer configured from these parameters.
    pub fn clusterer(&self) -> FuzzyCmeans {
        let fcm = FuzzyCmeans::new(self.num_clusters)
            .with_fuzziness(self.fuzziness_m)
            .with_tol(self.tolerance)
            .with_max_iter(self.max_iterations);
        match self.seed {
            Some(seed) => fcm.with_seed(seed),
            None => fcm,
        }
    }

    /// Check every parameter against a dataset of `n_items` points.
    pub fn validate(&self, n_items: usize) -> Result<()> {
        self.clusterer().validate(n_items)?;

        if !(0.0..=1.0).contains(&self.membership_threshold) {
            return Err(Error::InvalidParameter {
                name: "membership_threshold",
                message: "must be within [0, 1]",
            });
        }
        if !(self.fuzzifier_shape_beta > 0.0 && self.fuzzifier_shape_beta.is_finite()) {
            return Err(Error::InvalidParameter {
                name: "fuzzifier_shape_beta",
                message: "must be finite and > 0",
            });
        }
        if let DispersionMethod::WithinCluster { fuzziness } = self.dispersion {
            if !(fuzziness > 0.0 && fuzziness.is_finite()) {
                return Err(Error::InvalidParameter {
                    name: "dispersion",
                    message: "weight exponent must be finite and > 0",
                });
            }
        }
        Ok(())
    }
}
