//! # fcm
//!
//! Fuzzy C-Means partitioning coupled to piecewise-local linear regression.
//!
//! Given feature vectors, [`FuzzyCmeans`] computes soft memberships by
//! alternating optimization. The converged partition then drives:
//!
//! - a per-cluster dispersion estimate and four alternative membership
//!   kernels ([`FuzzifierBank`]) for comparison;
//! - one least-squares model per hard cluster plus a global baseline
//!   ([`LocalRegression`]);
//! - three defuzzification policies ([`Defuzzifier`]) collapsing per-cluster
//!   predictions into one value per point, each scored by MSE.
//!
//! [`Pipeline`] runs the whole flow. The crate performs no I/O.
//!
//! ```rust
//! use fcm::{FcmConfig, Pipeline};
//!
//! let points: Vec<Vec<f64>> = (0..40)
//!     .map(|i| {
//!         let base = if i < 20 { 0.0 } else { 10.0 };
//!         vec![base + (i % 5) as f64 * 0.1, base + (i % 3) as f64 * 0.1]
//!     })
//!     .collect();
//! let targets: Vec<f64> = points.iter().map(|p| 2.0 * p[0] - p[1] + 1.0).collect();
//!
//! let out = Pipeline::new(FcmConfig::new(2).with_seed(1))
//!     .run_rows(&points, Some(&targets))
//!     .unwrap();
//!
//! let regression = out.regression.unwrap();
//! assert!(regression.errors.clustered < 1e-9);
//! ```

pub mod cluster;
pub mod config;
pub mod defuzzify;
/// Error types used across `fcm`.
pub mod error;
pub mod metrics;
pub mod pipeline;
pub mod regression;


pub use cluster::{
    Clustering, DispersionMethod, FcmFit, FcmState, Fuzzifier, FuzzifierBank, FuzzyCmeans,
    MembershipMatrix, SoftClustering,
};
pub use config::FcmConfig;
pub use defuzzify::{Defuzzified, Defuzzifier};
pub use error::{Error, Result};
pub use metrics::{ari, mse, mse_partial, purity, MseReport};
pub use pipeline::{ErrorSummary, Pipeline, PipelineOutput, RegressionOutput};
pub use regression::{LinearModel, LocalRegression};
