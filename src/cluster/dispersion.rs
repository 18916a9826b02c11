//! Per-cluster spread `σ_k` used to parameterize the alternative fuzzifiers.
//!
//! Two estimators are available:
//!
//! - [`DispersionMethod::MembershipComplement`] (default): every point is
//!   scaled by `1 - U[i,k]` before measuring its distance to `v_k`:
//!
//!   ```text
//!   σ_k = sqrt( mean_i || (1 - U[i,k]) x_i - v_k ||² )
//!   ```
//!
//!   Points that belong strongly to `k` shrink towards the origin and points
//!   that do not belong keep their coordinates, so the value is dominated by
//!   non-members. This is the reference behavior and is kept as-is; it is
//!   not a within-cluster variance.
//!
//! - [`DispersionMethod::WithinCluster`]: the conventional fuzzy variance
//!
//!   ```text
//!   σ_k = sqrt( Σ_i U[i,k]^m ||x_i - v_k||² / Σ_i U[i,k]^m )
//!   ```

use super::membership::MembershipMatrix;
use crate::error::{Error, Result};
use ndarray::{Array1, Array2};

/// How `σ_k` is computed from a converged partition.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum DispersionMethod {
    /// Complement-weighted coordinates, mean squared distance to the center.
    #[default]
    MembershipComplement,
    /// Membership^m-weighted squared distances (conventional fuzzy variance).
    WithinCluster {
        /// Fuzziness exponent used as the weight power.
        fuzziness: f64,
    },
}

/// Compute `σ` (length c) for every cluster.
pub fn cluster_dispersion(
    data: &Array2<f64>,
    membership: &MembershipMatrix,
    centers: &Array2<f64>,
    method: DispersionMethod,
) -> Result<Array1<f64>> {
    let (n, d) = data.dim();
    if n == 0 {
        return Err(Error::EmptyInput);
    }
    if membership.n_points() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: membership.n_points(),
        });
    }
    if centers.ncols() != d || centers.nrows() != membership.n_clusters() {
        return Err(Error::ShapeMismatch {
            expected: format!("{}x{} centers", membership.n_clusters(), d),
            actual: format!("{}x{} centers", centers.nrows(), centers.ncols()),
        });
    }

    let u = membership.view();
    let sigma: Array1<f64> = (0..centers.nrows())
        .map(|k| {
            let center = centers.row(k);
            match method {
                DispersionMethod::MembershipComplement => {
                    let total: f64 = (0..n)
                        .map(|i| {
                            let w = 1.0 - u[[i, k]];
                            data.row(i)
                                .iter()
                                .zip(center.iter())
                                .map(|(x, v)| (w * x - v).powi(2))
                                .sum::<f64>()
                        })
                        .sum();
                    (total / n as f64).sqrt()
                }
                DispersionMethod::WithinCluster { fuzziness } => {
                    let mut weighted = 0.0;
                    let mut support = 0.0;
                    for i in 0..n {
                        let w = u[[i, k]].powf(fuzziness);
                        let sq: f64 = data
                            .row(i)
                            .iter()
                            .zip(center.iter())
                            .map(|(x, v)| (x - v).powi(2))
                            .sum();
                        weighted += w * sq;
                        support += w;
                    }
                    if support > 0.0 {
                        (weighted / support).sqrt()
                    } else {
                        0.0
                    }
                }
            }
        })
        .collect();

    Ok(sigma)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_complement_formula_by_hand() {
        // One cluster owns point 0 fully, the other owns point 1 fully.
        let data = array![[2.0], [4.0]];
        let u = MembershipMatrix::from_array(array![[1.0, 0.0], [0.0, 1.0]]).unwrap();
        let centers = array![[2.0], [4.0]];

        let sigma =
            cluster_dispersion(&data, &u, &centers, DispersionMethod::MembershipComplement)
                .unwrap();

        // k = 0: weighted coords [0, 4] against 2 => (4 + 4) / 2 = 4 => σ = 2.
        assert!((sigma[0] - 2.0).abs() < 1e-12);
        // k = 1: weighted coords [2, 0] against 4 => (4 + 16) / 2 = 10.
        assert!((sigma[1] - 10f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_complement_is_dominated_by_non_members() {
        // Tight members around 10, far-away non-members at 0: the complement
        // estimator reports a spread close to |0 - 10|, the conventional one
        // stays near the member spread.
        let data = array![[9.9], [10.0], [10.1], [0.0], [0.0]];
        let u = MembershipMatrix::from_array(array![
            [1.0, 0.0],
            [1.0, 0.0],
            [1.0, 0.0],
            [0.0, 1.0],
            [0.0, 1.0]
        ])
        .unwrap();
        let centers = array![[10.0], [0.0]];

        let complement =
            cluster_dispersion(&data, &u, &centers, DispersionMethod::MembershipComplement)
                .unwrap();
        let within = cluster_dispersion(
            &data,
            &u,
            &centers,
            DispersionMethod::WithinCluster { fuzziness: 2.0 },
        )
        .unwrap();

        assert!(complement[0] > 5.0);
        assert!(within[0] < 0.1);
    }

    #[test]
    fn test_shape_checks() {
        let data = array![[0.0, 1.0], [1.0, 0.0]];
        let u = MembershipMatrix::from_array(array![[1.0, 0.0], [0.0, 1.0]]).unwrap();
        let bad_centers = array![[0.0], [1.0]];
        assert!(cluster_dispersion(
            &data,
            &u,
            &bad_centers,
            DispersionMethod::MembershipComplement
        )
        .is_err());
    }
}
