//! Point-to-center Euclidean distances.
//!
//! Every stage that needs `D[i, k] = ||x_i - v_k||` goes through this module:
//! the membership update inside the alternating loop, the fuzzifier bank and
//! the dispersion estimator.

use ndarray::{Array2, ArrayView1};

#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Floor applied to exact-zero distances before they are used as divisors.
pub const DISTANCE_FLOOR: f64 = f64::EPSILON;

/// Euclidean distance between two vectors of equal length.
pub fn euclidean(a: &ArrayView1<'_, f64>, b: &ArrayView1<'_, f64>) -> f64 {
    a.iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y).powi(2))
        .sum::<f64>()
        .sqrt()
}

/// Distance matrix `D` (n x c) from every point to every center.
///
/// Rows are computed independently; with the `parallel` feature they are
/// spread over the rayon pool. Per-entry arithmetic is the same either way.
pub fn pairwise_distances(data: &Array2<f64>, centers: &Array2<f64>) -> Array2<f64> {
    let n = data.nrows();
    let c = centers.nrows();

    #[cfg(feature = "parallel")]
    {
        let rows: Vec<Vec<f64>> = (0..n)
            .into_par_iter()
            .map(|i| {
                let point = data.row(i);
                (0..c).map(|k| euclidean(&point, &centers.row(k))).collect()
            })
            .collect();
        Array2::from_shape_fn((n, c), |(i, k)| rows[i][k])
    }

    #[cfg(not(feature = "parallel"))]
    {
        Array2::from_shape_fn((n, c), |(i, k)| euclidean(&data.row(i), &centers.row(k)))
    }
}

/// Replace exact-zero (or negative) distances with [`DISTANCE_FLOOR`].
///
/// Returns the number of entries that were floored. A non-zero count means
/// some point coincides with a center.
pub fn floor_zero_distances(distances: &mut Array2<f64>) -> usize {
    let mut floored = 0;
    for d in distances.iter_mut() {
        if *d <= 0.0 {
            *d = DISTANCE_FLOOR;
            floored += 1;
        }
    }
    floored
}
