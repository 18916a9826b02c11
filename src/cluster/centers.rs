//! Membership-weighted centroids.
//!
//! ```text
//! v_k = Σ_i U[i,k]^m x_i / Σ_i U[i,k]^m
//! ```

use super::membership::MembershipMatrix;
use crate::error::{Error, Result};
use ndarray::Array2;

/// Recompute all cluster centers (c x d) from the current memberships.
///
/// Fails with [`Error::DegenerateCluster`] when a cluster's weighted support
/// `Σ_i U[i,k]^m` is zero or not finite.
pub fn estimate_centers(
    membership: &MembershipMatrix,
    data: &Array2<f64>,
    fuzziness: f64,
) -> Result<Array2<f64>> {
    let (n, d) = data.dim();
    if membership.n_points() != n {
        return Err(Error::DimensionMismatch {
            expected: n,
            found: membership.n_points(),
        });
    }

    let u = membership.view();
    let c = membership.n_clusters();
    let mut centers = Array2::zeros((c, d));

    for k in 0..c {
        let mut support = 0.0;
        for i in 0..n {
            let w = u[[i, k]].powf(fuzziness);
            support += w;
            for j in 0..d {
                centers[[k, j]] += w * data[[i, j]];
            }
        }

        if !(support > 0.0 && support.is_finite()) {
            return Err(Error::DegenerateCluster { cluster: k, support });
        }
        centers.row_mut(k).mapv_inplace(|v| v / support);
    }

    Ok(centers)
}
