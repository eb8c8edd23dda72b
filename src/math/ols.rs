//! Least squares solver for the calibration refinement.
//!
//! Each Gauss-Newton iteration solves
//!
//! ```text
//! minimize || J δ + r ||^2
//! ```
//!
//! where `J` is the finite-difference Jacobian of the residuals with respect to
//! the (transformed) parameters. `J` is tall (one row per matched week, four
//! columns) and frequently rank-deficient: with very slow time constants the
//! increase-branch column is numerically zero. SVD handles both cases, treating
//! singular values under the tolerance as zero.

use nalgebra::{DMatrix, DVector};

/// Solve a least squares problem using SVD.
///
/// Returns `None` if no tolerance produces a finite solution.
pub fn solve_least_squares(x: &DMatrix<f64>, y: &DVector<f64>) -> Option<DVector<f64>> {
    let svd = x.clone().svd(true, true);

    for &tol in &[1e-12, 1e-10, 1e-8] {
        if let Ok(beta) = svd.solve(y, tol) {
            if beta.iter().all(|v| v.is_finite()) {
                return Some(beta);
            }
        }
    }

    None
}
