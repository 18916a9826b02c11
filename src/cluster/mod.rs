//! Fuzzy partitioning of feature vectors.
//!
//! ## Hard vs Soft Clustering
//!
//! **Hard clustering** assigns each point to exactly one cluster. Simple, but
//! loses information when points sit between groups.
//!
//! **Soft clustering** gives each point a degree of membership in every
//! cluster, summing to 1 per point. Fuzzy C-Means is the classic soft
//! variant of k-means: memberships come from relative inverse distances
//! instead of a single nearest center.
//!
//! ## Components
//!
//! | Piece | Role |
//! |-------|------|
//! | [`pairwise_distances`] | `D[i,k] = ‖x_i − v_k‖`, zero entries floored |
//! | [`MembershipMatrix`] | owns `U`; initialize, update, hard assignment |
//! | [`estimate_centers`] | `v_k = Σ U^m x / Σ U^m` |
//! | [`FuzzyCmeans`] | alternating loop, convergence and iteration cap |
//! | [`cluster_dispersion`] | per-cluster spread σ after convergence |
//! | [`Fuzzifier`] / [`FuzzifierBank`] | alternative kernels parameterized by σ |
//!
//! ## Usage
//!
//! ```rust
//! use fcm::cluster::{Clustering, FuzzyCmeans, SoftClustering};
//!
//! let data = vec![
//!     vec![0.0, 0.0],
//!     vec![0.1, 0.1],
//!     vec![10.0, 10.0],
//!     vec![10.1, 10.1],
//! ];
//!
//! let labels = FuzzyCmeans::new(2).with_seed(7).fit_predict(&data).unwrap();
//! assert_eq!(labels[0], labels[1]);
//! assert_ne!(labels[0], labels[2]);
//!
//! let memberships = FuzzyCmeans::new(2).with_seed(7).fit_predict_proba(&data).unwrap();
//! // memberships[i][k] = degree to which point i belongs to cluster k
//! assert!((memberships[0].iter().sum::<f64>() - 1.0).abs() < 1e-9);
//! ```

mod centers;
mod dispersion;
mod distance;
mod fcm;
mod fuzzifier;
pub(crate) mod membership;
mod traits;

pub use centers::estimate_centers;
pub use dispersion::{cluster_dispersion, DispersionMethod};
pub use distance::{euclidean, floor_zero_distances, pairwise_distances, DISTANCE_FLOOR};
pub use fcm::{to_point_matrix, FcmFit, FcmState, FuzzyCmeans};
pub use fuzzifier::{Fuzzifier, FuzzifierBank};
pub use membership::MembershipMatrix;
pub use traits::{Clustering, SoftClustering};
