//! End-to-end run: partition, diagnose, regress, defuzzify, evaluate.
//!
//! ```text
//! points ──► FCM loop ──► U, V, D
//!                          ├──► σ ──► fuzzifier bank        (diagnostics)
//!                          └──► hard split ──► OLS per cluster + global
//!                                               └──► defuzzify ──► MSE
//! ```
//!
//! The regression branch only runs when targets are supplied.

use crate::cluster::{cluster_dispersion, to_point_matrix, FcmFit, FuzzifierBank};
use crate::config::FcmConfig;
use crate::defuzzify::{defuzzify_all, Defuzzified, Defuzzifier};
use crate::error::{Error, Result};
use crate::metrics::{mse, mse_partial, MseReport};
use crate::regression::LocalRegression;
use ndarray::{Array1, Array2};

/// MSE of every prediction vector produced by a run.
#[derive(Debug, Clone, PartialEq)]
pub struct ErrorSummary {
    /// Each point predicted by its own hard cluster's model.
    pub clustered: f64,
    /// Single global model.
    pub global: f64,
    /// Center-of-gravity defuzzification (points without prediction excluded).
    pub center_of_gravity: MseReport,
    /// Mean-of-maxima defuzzification (points without prediction excluded).
    pub mean_of_maxima: MseReport,
    /// Max-membership defuzzification.
    pub max_membership: MseReport,
}

impl ErrorSummary {
    /// Report for one defuzzification policy.
    pub fn defuzzified(&self, method: Defuzzifier) -> &MseReport {
        match method {
            Defuzzifier::CenterOfGravity => &self.center_of_gravity,
            Defuzzifier::MeanOfMaxima => &self.mean_of_maxima,
            Defuzzifier::MaxMembership => &self.max_membership,
        }
    }
}

/// Regression branch output.
#[derive(Debug, Clone)]
pub struct RegressionOutput {
    /// Per-cluster and global models.
    pub models: LocalRegression,
    /// `ŷ_k(i)` for every point and cluster (n x c).
    pub cluster_predictions: Array2<f64>,
    /// Prediction of each point by its own hard cluster's model.
    pub clustered_predictions: Array1<f64>,
    /// Prediction of the global model.
    pub global_predictions: Array1<f64>,
    /// Defuzzified predictions of all three policies.
    pub defuzzified: Defuzzified,
    /// MSE for every prediction vector.
    pub errors: ErrorSummary,
}

/// Everything a run produces.
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    /// Converged partition.
    pub fit: FcmFit,
    /// Per-cluster dispersion σ.
    pub dispersion: Array1<f64>,
    /// Alternative membership matrices; `None` when some σ is not positive.
    pub fuzzifiers: Option<FuzzifierBank>,
    /// Present when targets were supplied.
    pub regression: Option<RegressionOutput>,
}

/// Runs the full flow for one configuration. Each call owns its buffers, so
/// independent runs can proceed concurrently.
#[derive(Debug, Clone, Default)]
pub struct Pipeline {
    config: FcmConfig,
}

impl Pipeline {
    /// Create a pipeline for `config`.
    pub fn new(config: FcmConfig) -> Self {
        Self { config }
    }

    /// Configuration in use.
    pub fn config(&self) -> &FcmConfig {
        &self.config
    }

    /// Run on row-major points with optional targets.
    pub fn run_rows(
        &self,
        points: &[Vec<f64>],
        targets: Option<&[f64]>,
    ) -> Result<PipelineOutput> {
        let data = to_point_matrix(points)?;
        let targets = targets.map(|t| Array1::from_vec(t.to_vec()));
        self.run(&data, targets.as_ref())
    }

    /// Run on an `n x d` point matrix with optional targets (length n).
    pub fn run(
        &self,
        data: &Array2<f64>,
        targets: Option<&Array1<f64>>,
    ) -> Result<PipelineOutput> {
        self.config.validate(data.nrows())?;
        if let Some(y) = targets {
            if y.len() != data.nrows() {
                return Err(Error::DimensionMismatch {
                    expected: data.nrows(),
                    found: y.len(),
                });
            }
        }

        let fit = self.config.clusterer().fit(data)?;
        let dispersion =
            cluster_dispersion(data, &fit.membership, &fit.centers, self.config.dispersion)?;
        let fuzzifiers = match FuzzifierBank::compute(
            &fit.distances,
            &dispersion,
            self.config.fuzzifier_shape_beta,
        ) {
            Ok(bank) => Some(bank),
            Err(err) => {
                tracing::warn!(error = %err, "fuzzifier bank unavailable");
                None
            }
        };

        let regression = match targets {
            Some(y) => Some(self.regress(data, y, &fit)?),
            None => None,
        };

        Ok(PipelineOutput {
            fit,
            dispersion,
            fuzzifiers,
            regression,
        })
    }

    fn regress(
        &self,
        data: &Array2<f64>,
        y: &Array1<f64>,
        fit: &FcmFit,
    ) -> Result<RegressionOutput> {
        let models = LocalRegression::fit(data, y, &fit.membership)?;
        let cluster_predictions = models.cluster_predictions(data);
        let clustered_predictions = models.predict_assigned(data);
        let global_predictions = models.predict_global(data);
        let defuzzified = defuzzify_all(
            &fit.membership,
            &cluster_predictions,
            self.config.membership_threshold,
        )?;

        let truth = y.to_vec();
        let errors = ErrorSummary {
            clustered: mse(&truth, &clustered_predictions.to_vec())?,
            global: mse(&truth, &global_predictions.to_vec())?,
            center_of_gravity: mse_partial(&truth, &defuzzified.center_of_gravity)?,
            mean_of_maxima: mse_partial(&truth, &defuzzified.mean_of_maxima)?,
            max_membership: mse_partial(&truth, &defuzzified.max_membership)?,
        };
        tracing::info!(
            clustered = errors.clustered,
            global = errors.global,
            excluded = errors.center_of_gravity.excluded,
            "regression evaluated"
        );

        Ok(RegressionOutput {
            models,
            cluster_predictions,
            clustered_predictions,
            global_predictions,
            defuzzified,
            errors,
        })
    }
}
