//! Weighted least squares for local regressions.
//!
//! Each LOESS evaluation solves a tiny problem of the form:
//!
//! ```text
//! minimize Σ w_i (y_i - β0 - β1 (x_i - x0))^2
//! ```
//!
//! Centring on `x0` makes `β0` the fitted value at the evaluation point.
//! Rows are scaled by `sqrt(w_i)` and the resulting ordinary least squares
//! problem is solved with SVD, which copes with tall design matrices and
//! near-collinear columns.

use nalgebra::{DMatrix, DVector};

/// Relative spread below which a local window is treated as a single x value.
const DEGENERATE_SPREAD: f64 = 1e-3;

/// Solve a least squares problem using SVD.
///
/// Returns `None` if the system is too ill-conditioned to solve robustly.
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

/// Fitted value at `x0` of a weighted degree-1 regression.
///
/// `x_range` is the predictor range of the whole dataset; when the weighted
/// spread of the window is below `0.001 * x_range` the slope is unidentified
/// and the weighted mean is returned instead.
///
/// Returns `None` when every weight is zero.
pub fn weighted_linear_at(x: &[f64], y: &[f64], w: &[f64], x0: f64, x_range: f64) -> Option<f64> {
    debug_assert_eq!(x.len(), y.len());
    debug_assert_eq!(x.len(), w.len());

    let sum_w: f64 = w.iter().sum();
    if sum_w <= 0.0 {
        return None;
    }

    let x_mean = x.iter().zip(w).map(|(xi, wi)| xi * wi).sum::<f64>() / sum_w;
    let y_mean = y.iter().zip(w).map(|(yi, wi)| yi * wi).sum::<f64>() / sum_w;
    let spread = x
        .iter()
        .zip(w)
        .map(|(xi, wi)| wi * (xi - x_mean) * (xi - x_mean))
        .sum::<f64>()
        .sqrt();

    if spread <= DEGENERATE_SPREAD * x_range {
        return Some(y_mean);
    }

    let rows: Vec<usize> = (0..x.len()).filter(|&i| w[i] > 0.0).collect();
    let mut design = DMatrix::<f64>::zeros(rows.len(), 2);
    let mut target = DVector::<f64>::zeros(rows.len());
    for (r, &i) in rows.iter().enumerate() {
        let sw = w[i].sqrt();
        design[(r, 0)] = sw;
        design[(r, 1)] = sw * (x[i] - x0);
        target[r] = sw * y[i];
    }

    match solve_least_squares(&design, &target) {
        Some(beta) => Some(beta[0]),
        None => Some(y_mean),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn least_squares_solves_simple_system() {
        // Fit y = 2 + 3x on x = [0,1,2]
        let x = DMatrix::from_row_slice(3, 2, &[1.0, 0.0, 1.0, 1.0, 1.0, 2.0]);
        let y = DVector::from_row_slice(&[2.0, 5.0, 8.0]);

        let beta = solve_least_squares(&x, &y).unwrap();
        assert!((beta[0] - 2.0).abs() < 1e-10);
        assert!((beta[1] - 3.0).abs() < 1e-10);
    }

    #[test]
    fn weighted_line_recovers_exact_line() {
        let x = [0.0, 1.0, 2.0, 3.0];
        let y: Vec<f64> = x.iter().map(|v| 1.0 - 0.5 * v).collect();
        let w = [0.2, 1.0, 0.7, 0.1];
        let fit = weighted_linear_at(&x, &y, &w, 1.5, 3.0).unwrap();
        assert_relative_eq!(fit, 0.25, epsilon = 1e-10);
    }

    #[test]
    fn zero_weights_give_none() {
        assert!(weighted_linear_at(&[0.0, 1.0], &[1.0, 2.0], &[0.0, 0.0], 0.5, 1.0).is_none());
    }

    #[test]
    fn single_x_value_falls_back_to_weighted_mean() {
        let fit = weighted_linear_at(&[2.0, 2.0, 2.0], &[1.0, 2.0, 6.0], &[1.0, 1.0, 2.0], 2.0, 4.0).unwrap();
        assert_relative_eq!(fit, 15.0 / 4.0, epsilon = 1e-12);
    }
}
