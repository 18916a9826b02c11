//! Defuzzification of per-cluster regression outputs.
//!
//! For point `i` every cluster model produces a prediction `ŷ_k(i)`. The
//! clusters whose membership exceeds a threshold θ form the *relevant* set
//!
//! ```text
//! relevant(i) = { k : U[i,k] > θ }
//! ```
//!
//! and the policies below collapse those predictions into one crisp value.
//!
//! | Policy | Value | Gated by θ |
//! |--------|-------|------------|
//! | [`Defuzzifier::CenterOfGravity`] | `Σ U ŷ / Σ U` over relevant | yes |
//! | [`Defuzzifier::MeanOfMaxima`] | mean `ŷ` over relevant clusters tied at the max membership | yes |
//! | [`Defuzzifier::MaxMembership`] | `ŷ` of the row argmax (ties to lowest index) | no |
//!
//! A gated policy returns `None` for a point with an empty relevant set:
//! "no prediction", not an error. Max membership ignores the gate and always
//! predicts; whenever the relevant set is non-empty it contains the row
//! argmax, so the two readings only differ on points with no relevant cluster.

use crate::cluster::membership::argmax_first;
use crate::cluster::MembershipMatrix;
use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView1};

/// Reference membership threshold θ.
pub const DEFAULT_THRESHOLD: f64 = 0.3;

/// Policy combining per-cluster predictions into one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Defuzzifier {
    /// Membership-weighted mean over relevant clusters.
    CenterOfGravity,
    /// Mean prediction of the relevant clusters sharing the maximum membership.
    MeanOfMaxima,
    /// Prediction of the single highest-membership cluster.
    MaxMembership,
}

impl Defuzzifier {
    /// All policies, in reporting order.
    pub const ALL: [Defuzzifier; 3] = [
        Defuzzifier::CenterOfGravity,
        Defuzzifier::MeanOfMaxima,
        Defuzzifier::MaxMembership,
    ];

    /// Whether the policy only considers clusters above the threshold.
    pub fn is_gated(&self) -> bool {
        !matches!(self, Defuzzifier::MaxMembership)
    }

    /// Defuzzify a single point from its membership row and per-cluster predictions.
    ///
    /// Returns `None` when the two rows differ in length.
    pub fn defuzzify_point(
        &self,
        memberships: &ArrayView1<'_, f64>,
        predictions: &ArrayView1<'_, f64>,
        threshold: f64,
    ) -> Option<f64> {
        if memberships.is_empty() || memberships.len() != predictions.len() {
            return None;
        }
        if let Defuzzifier::MaxMembership = self {
            return Some(predictions[argmax_first(memberships.iter().copied())]);
        }

        let relevant = relevant_clusters(memberships, threshold);
        if relevant.is_empty() {
            return None;
        }

        match self {
            Defuzzifier::CenterOfGravity => {
                let (num, den) = relevant.iter().fold((0.0, 0.0), |(num, den), &k| {
                    (num + memberships[k] * predictions[k], den + memberships[k])
                });
                Some(num / den)
            }
            Defuzzifier::MeanOfMaxima => {
                let top = relevant
                    .iter()
                    .map(|&k| memberships[k])
                    .fold(f64::NEG_INFINITY, f64::max);
                let tied: Vec<f64> = relevant
                    .iter()
                    .filter(|&&k| memberships[k] == top)
                    .map(|&k| predictions[k])
                    .collect();
                Some(tied.iter().sum::<f64>() / tied.len() as f64)
            }
            Defuzzifier::MaxMembership => None,
        }
    }

    /// Defuzzify every point. `predictions` is the n x c matrix of `ŷ_k(i)`.
    pub fn defuzzify(
        &self,
        membership: &MembershipMatrix,
        predictions: &Array2<f64>,
        threshold: f64,
    ) -> Result<Vec<Option<f64>>> {
        check_shapes(membership, predictions)?;
        check_threshold(threshold)?;

        let u = membership.view();
        Ok(u.rows()
            .into_iter()
            .zip(predictions.rows())
            .map(|(m_row, p_row)| self.defuzzify_point(&m_row, &p_row, threshold))
            .collect())
    }
}

/// Clusters whose membership strictly exceeds `threshold`, in index order.
pub fn relevant_clusters(memberships: &ArrayView1<'_, f64>, threshold: f64) -> Vec<usize> {
    memberships
        .iter()
        .enumerate()
        .filter(|(_, &u)| u > threshold)
        .map(|(k, _)| k)
        .collect()
}

/// Output of every policy for one partition.
#[derive(Debug, Clone, PartialEq)]
pub struct Defuzzified {
    /// Center-of-gravity predictions.
    pub center_of_gravity: Vec<Option<f64>>,
    /// Mean-of-maxima predictions.
    pub mean_of_maxima: Vec<Option<f64>>,
    /// Max-membership predictions (never `None` for a non-empty row).
    pub max_membership: Vec<Option<f64>>,
}

impl Defuzzified {
    /// Predictions of one policy.
    pub fn get(&self, method: Defuzzifier) -> &[Option<f64>] {
        match method {
            Defuzzifier::CenterOfGravity => &self.center_of_gravity,
            Defuzzifier::MeanOfMaxima => &self.mean_of_maxima,
            Defuzzifier::MaxMembership => &self.max_membership,
        }
    }

    /// Points left without a prediction by the gated policies.
    pub fn unpredicted(&self) -> usize {
        self.center_of_gravity.iter().filter(|p| p.is_none()).count()
    }
}

/// Run all three policies.
pub fn defuzzify_all(
    membership: &MembershipMatrix,
    predictions: &Array2<f64>,
    threshold: f64,
) -> Result<Defuzzified> {
    let out = Defuzzified {
        center_of_gravity: Defuzzifier::CenterOfGravity.defuzzify(
            membership,
            predictions,
            threshold,
        )?,
        mean_of_maxima: Defuzzifier::MeanOfMaxima.defuzzify(membership, predictions, threshold)?,
        max_membership: Defuzzifier::MaxMembership.defuzzify(membership, predictions, threshold)?,
    };

    let unpredicted = out.unpredicted();
    if unpredicted > 0 {
        tracing::debug!(
            unpredicted,
            threshold,
            "points with no cluster above the membership threshold"
        );
    }
    Ok(out)
}

fn check_shapes(membership: &MembershipMatrix, predictions: &Array2<f64>) -> Result<()> {
    if predictions.dim() != (membership.n_points(), membership.n_clusters()) {
        return Err(Error::ShapeMismatch {
            expected: format!("{}x{}", membership.n_points(), membership.n_clusters()),
            actual: format!("{}x{}", predictions.nrows(), predictions.ncols()),
        });
    }
    Ok(())
}

fn check_threshold(threshold: f64) -> Result<()> {
    if !(0.0..=1.0).contains(&threshold) {
        return Err(Error::InvalidParameter {
            name: "membership_threshold",
            message: "must be within [0, 1]",
        });
    }
    Ok(())
}
