//! Alternative membership kernels parameterized by the cluster dispersion.
//!
//! Each kernel maps a distance matrix `D` (n x c) and per-cluster spread `σ`
//! to row-normalized weights. They are diagnostics for comparing against the
//! FCM memberships and never feed back into the clustering loop.
//!
//! | Kernel | Weight before normalization |
//! |--------|-----------------------------|
//! | Gaussian | `exp(-D² / (2σ²))` |
//! | Generalized Gaussian | `exp(-(D/σ)^β)` |
//! | Rational | `1 / (1 + (D/σ)^(2β))` |
//! | Triangular | `max(1 - D/h, 0)`, `h = max(D) / 2` |

use crate::error::{Error, Result};
use ndarray::{Array1, Array2};

/// A membership kernel and its shape parameters.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Fuzzifier {
    /// `exp(-D² / (2σ²))`.
    Gaussian,
    /// `exp(-(D/σ)^β)`.
    GeneralizedGaussian {
        /// Shape exponent.
        beta: f64,
    },
    /// `1 / (1 + (D/σ)^(2β))`.
    Rational {
        /// Shape exponent.
        beta: f64,
    },
    /// `max(1 - D/h, 0)` with `h` half the largest distance in the matrix.
    Triangular,
}

impl Fuzzifier {
    /// Kernel value for one entry. `half_width` is only used by [`Fuzzifier::Triangular`].
    pub fn kernel(&self, distance: f64, sigma: f64, half_width: f64) -> f64 {
        match *self {
            Fuzzifier::Gaussian => (-(distance * distance) / (2.0 * sigma * sigma)).exp(),
            Fuzzifier::GeneralizedGaussian { beta } => (-(distance / sigma).powf(beta)).exp(),
            Fuzzifier::Rational { beta } => 1.0 / (1.0 + (distance / sigma).powf(2.0 * beta)),
            Fuzzifier::Triangular => (1.0 - distance / half_width).max(0.0),
        }
    }

    fn uses_sigma(&self) -> bool {
        !matches!(self, Fuzzifier::Triangular)
    }

    /// Row-normalized weight matrix (n x c).
    ///
    /// Scale-based kernels require every `σ_k` to be finite and positive.
    /// The triangular kernel adds machine epsilon to each row total, so a row
    /// lying entirely outside the support stays all-zero; other kernels leave
    /// a zero-total row at zero as well.
    pub fn weights(&self, distances: &Array2<f64>, sigma: &Array1<f64>) -> Result<Array2<f64>> {
        if distances.ncols() != sigma.len() {
            return Err(Error::DimensionMismatch {
                expected: distances.ncols(),
                found: sigma.len(),
            });
        }
        if self.uses_sigma() && sigma.iter().any(|&s| !(s > 0.0 && s.is_finite())) {
            return Err(Error::InvalidParameter {
                name: "sigma",
                message: "dispersion must be finite and > 0",
            });
        }
        match *self {
            Fuzzifier::GeneralizedGaussian { beta } | Fuzzifier::Rational { beta }
                if !(beta > 0.0 && beta.is_finite()) =>
            {
                return Err(Error::InvalidParameter {
                    name: "fuzzifier_shape_beta",
                    message: "must be finite and > 0",
                });
            }
            _ => {}
        }

        let half_width = distances.iter().copied().fold(0.0, f64::max) / 2.0;
        if matches!(self, Fuzzifier::Triangular) && half_width <= 0.0 {
            return Err(Error::InvalidParameter {
                name: "distances",
                message: "triangular kernel needs at least one positive distance",
            });
        }

        let mut weights = Array2::from_shape_fn(distances.dim(), |(i, k)| {
            self.kernel(distances[[i, k]], sigma[k], half_width)
        });

        let pad = if matches!(self, Fuzzifier::Triangular) {
            f64::EPSILON
        } else {
            0.0
        };
        for mut row in weights.rows_mut() {
            let total = row.sum() + pad;
            if total > 0.0 {
                row.mapv_inplace(|w| w / total);
            }
        }

        Ok(weights)
    }
}

/// The four alternative membership matrices for one converged partition.
#[derive(Debug, Clone)]
pub struct FuzzifierBank {
    /// Gaussian kernel weights.
    pub gaussian: Array2<f64>,
    /// Generalized Gaussian kernel weights.
    pub generalized_gaussian: Array2<f64>,
    /// Rational kernel weights.
    pub rational: Array2<f64>,
    /// Triangular kernel weights.
    pub triangular: Array2<f64>,
}

impl FuzzifierBank {
    /// Evaluate every kernel with shape parameter `beta`.
    pub fn compute(distances: &Array2<f64>, sigma: &Array1<f64>, beta: f64) -> Result<Self> {
        Ok(Self {
            gaussian: Fuzzifier::Gaussian.weights(distances, sigma)?,
            generalized_gaussian: Fuzzifier::GeneralizedGaussian { beta }
                .weights(distances, sigma)?,
            rational: Fuzzifier::Rational { beta }.weights(distances, sigma)?,
            triangular: Fuzzifier::Triangular.weights(distances, sigma)?,
        })
    }

    /// Weight matrix for a given kernel.
    pub fn get(&self, fuzzifier: Fuzzifier) -> &Array2<f64> {
        match fuzzifier {
            Fuzzifier::Gaussian => &self.gaussian,
            Fuzzifier::GeneralizedGaussian { .. } => &self.generalized_gaussian,
            Fuzzifier::Rational { .. } => &self.rational,
            Fuzzifier::Triangular => &self.triangular,
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ndarray::array;

    fn assert_rows_sum_to_one(w: &Array2<f64>) {
        for row in w.rows() {
            assert!((row.sum() - 1.0).abs() < 1e-9, "row {row:?}");
        }
    }

    #[test]
    fn test_gaussian_matches_formula() {
        let d = array![[1.0, 2.0]];
        let sigma = array![1.0, 1.0];
        let w = Fuzzifier::Gaussian.weights(&d, &sigma).unwrap();

        let a = (-0.5f64).exp();
        let b = (-2.0f64).exp();
        assert!((w[[0, 0]] - a / (a + b)).abs() < 1e-12);
        assert_rows_sum_to_one(&w);
    }

    #[test]
    fn test_generalized_gaussian_with_beta_two_is_gaussian_with_scaled_sigma() {
        // exp(-(D/σ)²) == exp(-D² / (2 (σ/√2)²))
        let d = array![[0.3, 0.9, 1.4], [1.0, 0.2, 0.6]];
        let sigma = array![0.5, 0.8, 1.1];
        let scaled = sigma.mapv(|s| s / 2f64.sqrt());

        let gg = Fuzzifier::GeneralizedGaussian { beta: 2.0 }
            .weights(&d, &sigma)
            .unwrap();
        let g = Fuzzifier::Gaussian.weights(&d, &scaled).unwrap();
        for (a, b) in gg.iter().zip(g.iter()) {
            assert!((a - b).abs() < 1e-12);
        }
    }

    #[test]
    fn test_rational_prefers_closer_center() {
        let d = array![[0.5, 2.0]];
        let sigma = array![1.0, 1.0];
        let w = Fuzzifier::Rational { beta: 2.0 }.weights(&d, &sigma).unwrap();
        assert!(w[[0, 0]] > w[[0, 1]]);
        assert_rows_sum_to_one(&w);
    }

    #[test]
    fn test_triangular_zero_row_stays_zero() {
        // h = 4 / 2 = 2; the second row lies entirely outside the support.
        let d = array![[1.0, 3.0], [2.0, 4.0]];
        let sigma = array![1.0, 1.0];
        let w = Fuzzifier::Triangular.weights(&d, &sigma).unwrap();

        assert!((w[[0, 0]] - 1.0).abs() < 1e-9);
        assert_eq!(w[[0, 1]], 0.0);
        assert_eq!(w[[1, 0]], 0.0);
        assert_eq!(w[[1, 1]], 0.0);
    }

    #[test]
    fn test_invalid_parameters() {
        let d = array![[1.0, 2.0]];
        assert!(Fuzzifier::Gaussian.weights(&d, &array![0.0, 1.0]).is_err());
        assert!(Fuzzifier::Gaussian.weights(&d, &array![1.0]).is_err());
        assert!(Fuzzifier::Rational { beta: 0.0 }
            .weights(&d, &array![1.0, 1.0])
            .is_err());
        // Triangular ignores σ but needs a positive half-width.
        assert!(Fuzzifier::Triangular
            .weights(&d, &array![0.0, 0.0])
            .is_ok());
        assert!(Fuzzifier::Triangular
            .weights(&array![[0.0, 0.0]], &array![1.0, 1.0])
            .is_err());
    }

    #[test]
    fn test_bank_computes_all_kernels() {
        let d = array![[0.1, 0.9, 0.5], [0.8, 0.2, 0.4]];
        let sigma = array![0.5, 0.5, 0.5];
        let bank = FuzzifierBank::compute(&d, &sigma, 2.0).unwrap();

        assert_rows_sum_to_one(&bank.gaussian);
        assert_rows_sum_to_one(&bank.generalized_gaussian);
        assert_rows_sum_to_one(&bank.rational);
        assert_eq!(bank.get(Fuzzifier::Triangular).dim(), (2, 3));
        // Closest center wins under every kernel.
        for w in [&bank.gaussian, &bank.generalized_gaussian, &bank.rational] {
            assert!(w[[0, 0]] > w[[0, 1]]);
            assert!(w[[1, 1]] > w[[1, 0]]);
        }
    }
}
