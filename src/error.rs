use core::fmt;

/// Result alias for `fcm`.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors returned by the clustering, regression and defuzzification stages.
#[derive(Debug, Clone, PartialEq)]
pub enum Error {
    /// Input was empty.
    EmptyInput,

    /// Dimension mismatch (usize).
    DimensionMismatch {
        /// Expected dimension.
        expected: usize,
        /// Found dimension.
        found: usize,
    },

    /// Shape mismatch (string description).
    ShapeMismatch {
        /// Expected shape description.
        expected: String,
        /// Actual shape description.
        actual: String,
    },

    /// Invalid number of clusters requested.
    InvalidClusterCount {
        /// Requested count.
        requested: usize,
        /// Number of items.
        n_items: usize,
    },

    /// Invalid parameter value.
    InvalidParameter {
        /// Parameter name.
        name: &'static str,
        /// Error message.
        message: &'static str,
    },

    /// A cluster lost all weighted support while estimating centers.
    DegenerateCluster {
        /// Cluster index.
        cluster: usize,
        /// Accumulated `Σ U^m` for the cluster.
        support: f64,
    },

    /// A cluster received too few hard-assigned points to fit a linear model.
    InsufficientClusterPoints {
        /// Cluster index.
        cluster: usize,
        /// Points assigned to the cluster.
        found: usize,
        /// Points required (features + 1).
        required: usize,
    },

    /// Least-squares design matrix is rank deficient.
    RankDeficient {
        /// Cluster index, or `None` for the global model.
        cluster: Option<usize>,
    },

    /// Alternating optimization did not converge within the iteration cap.
    ConvergenceFailure {
        /// Number of iterations attempted.
        iterations: usize,
        /// Largest membership change observed in the last iteration.
        max_change: f64,
    },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyInput => write!(f, "empty input provided"),
            Error::DimensionMismatch { expected, found } => {
                write!(f, "dimension mismatch: expected {expected}, found {found}")
            }
            Error::ShapeMismatch { expected, actual } => {
                write!(f, "shape mismatch: expected {expected}, actual {actual}")
            }
            Error::InvalidClusterCount { requested, n_items } => {
                write!(f, "cannot create {requested} clusters from {n_items} items")
            }
            Error::InvalidParameter { name, message } => {
                write!(f, "invalid parameter '{name}': {message}")
            }
            Error::DegenerateCluster { cluster, support } => {
                write!(
                    f,
                    "cluster {cluster} has degenerate weighted support ({support})"
                )
            }
            Error::InsufficientClusterPoints {
                cluster,
                found,
                required,
            } => write!(
                f,
                "cluster {cluster} has {found} assigned points, at least {required} required"
            ),
            Error::RankDeficient { cluster: Some(k) } => {
                write!(f, "design matrix for cluster {k} is rank deficient")
            }
            Error::RankDeficient { cluster: None } => {
                write!(f, "global design matrix is rank deficient")
            }
            Error::ConvergenceFailure {
                iterations,
                max_change,
            } => write!(
                f,
                "did not converge after {iterations} iterations (last change {max_change:e})"
            ),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for Error {}

impl Error {
    /// Whether the error is a configuration problem rather than a data/numerical one.
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::InvalidParameter { .. } | Error::InvalidClusterCount { .. }
        )
    }

    /// Whether the error reports a collapsed or under-populated cluster.
    pub fn is_degenerate_cluster(&self) -> bool {
        matches!(
            self,
            Error::DegenerateCluster { .. } | Error::InsufficientClusterPoints { .. }
        )
    }
}
