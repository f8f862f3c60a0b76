//! LOESS (locally weighted scatterplot smoothing) engine.
//!
//! This is Cleveland's lowess with a degree-1 local model:
//!
//! 1. for every sorted predictor value, take the `k = frac * n` nearest
//!    neighbours and weight them with the tricube kernel
//! 2. solve a weighted linear regression and keep its value at the point
//! 3. optionally repeat with bisquare robustness weights derived from the
//!    residuals of the previous pass
//!
//! Inputs must already be sorted by predictor. The engine is deterministic and
//! allocation-light; datasets here are at most a few thousand rows.

use crate::error::AppError;
use crate::math::{FAR_FRACTION, NEAR_FRACTION, bisquare, mean, median, neighbour_weight, weighted_linear_at};

/// Robustifying iterations after the initial fit.
pub const DEFAULT_ROBUST_ITERS: usize = 3;

/// Multiple of the median absolute residual beyond which a point is rejected.
const ROBUST_SCALE: f64 = 6.0;

/// Relative residual scale below which the fit is considered exact.
const EXACT_FIT_TOL: f64 = 1e-7;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LoessOptions {
    /// Fraction of the data in each local window, in `(0, 1]`.
    pub fraction: f64,
    pub robust_iters: usize,
}

impl LoessOptions {
    pub fn with_fraction(fraction: f64) -> Self {
        Self {
            fraction,
            ..Self::default()
        }
    }
}

impl Default for LoessOptions {
    fn default() -> Self {
        Self {
            fraction: crate::domain::DEFAULT_FRACTION,
            robust_iters: DEFAULT_ROBUST_ITERS,
        }
    }
}

/// Inclusive neighbour window `[left, right]` over sorted predictors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Window {
    left: usize,
    right: usize,
}

impl Window {
    fn new(size: usize) -> Self {
        Self {
            left: 0,
            right: size - 1,
        }
    }

    /// Slide the window so it holds the nearest neighbours of `x[current]`.
    fn recenter(&mut self, x: &[f64], current: usize) {
        let n = x.len();
        let xc = x[current];

        while self.right < n - 1 {
            let d_left = xc - x[self.left];
            let d_right = x[self.right + 1] - xc;
            if d_left <= d_right {
                break;
            }
            self.left += 1;
            self.right += 1;
        }
    }

    fn radius(&self, x: &[f64], xc: f64) -> f64 {
        f64::max(xc - x[self.left], x[self.right] - xc)
    }

    /// Widen to neighbours tied with the window edge distance.
    fn with_ties(&self, x: &[f64], xc: f64, radius: f64) -> (usize, usize) {
        let mut lo = self.left;
        while lo > 0 && xc - x[lo - 1] <= radius {
            lo -= 1;
        }
        let mut hi = self.right;
        while hi + 1 < x.len() && x[hi + 1] - xc <= radius {
            hi += 1;
        }
        (lo, hi)
    }
}

/// Number of points in each local window.
pub fn window_size(n: usize, fraction: f64) -> usize {
    let k = (fraction * n as f64 + 1e-10).floor() as usize;
    k.clamp(2, n.max(2)).min(n)
}

/// Smooth `y` against sorted `x`, returning one fitted value per input.
pub fn loess_sorted(x: &[f64], y: &[f64], opts: &LoessOptions) -> Result<Vec<f64>, AppError> {
    if x.len() != y.len() {
        return Err(AppError::compute(format!(
            "LOESS input length mismatch: {} predictors vs {} responses.",
            x.len(),
            y.len()
        )));
    }
    if x.is_empty() {
        return Err(AppError::compute("LOESS requires at least one observation."));
    }
    if !(opts.fraction > 0.0 && opts.fraction <= 1.0) {
        return Err(AppError::compute(format!(
            "Smoothing fraction must be in (0, 1], got {}.",
            opts.fraction
        )));
    }
    if x.windows(2).any(|w| w[1] < w[0]) {
        return Err(AppError::compute("LOESS predictors must be sorted ascending."));
    }

    let n = x.len();
    let k = window_size(n, opts.fraction);
    let x_range = x[n - 1] - x[0];
    let y_scale = mean(&y.iter().map(|v| v.abs()).collect::<Vec<_>>()).unwrap_or(0.0);

    let mut robustness = vec![1.0; n];
    let mut fitted = fit_pass(x, y, &robustness, k, x_range);

    for _ in 0..opts.robust_iters {
        let abs_residuals: Vec<f64> = y.iter().zip(&fitted).map(|(yi, fi)| (yi - fi).abs()).collect();
        let cmad = ROBUST_SCALE * median(&abs_residuals).unwrap_or(0.0);
        if cmad <= EXACT_FIT_TOL * y_scale {
            break;
        }
        for (w, r) in robustness.iter_mut().zip(&abs_residuals) {
            *w = if *r <= NEAR_FRACTION * cmad {
                1.0
            } else if *r > FAR_FRACTION * cmad {
                0.0
            } else {
                bisquare(r / cmad)
            };
        }
        fitted = fit_pass(x, y, &robustness, k, x_range);
    }

    if let Some(i) = fitted.iter().position(|v| !v.is_finite()) {
        return Err(AppError::compute(format!(
            "LOESS produced a non-finite value at x = {}.",
            x[i]
        )));
    }

    Ok(fitted)
}

/// One locally weighted regression sweep with fixed robustness weights.
fn fit_pass(x: &[f64], y: &[f64], robustness: &[f64], k: usize, x_range: f64) -> Vec<f64> {
    let n = x.len();
    let mut fitted = vec![0.0; n];
    let mut window = Window::new(k);
    let mut weights = Vec::with_capacity(n);

    for i in 0..n {
        // Tied predictors share the fit of the first point at that value.
        if i > 0 && x[i] == x[i - 1] {
            fitted[i] = fitted[i - 1];
            continue;
        }

        window.recenter(x, i);
        let radius = window.radius(x, x[i]);
        let (lo, hi) = window.with_ties(x, x[i], radius);

        weights.clear();
        weights.extend((lo..=hi).map(|j| neighbour_weight(x[j] - x[i], radius) * robustness[j]));

        fitted[i] = weighted_linear_at(&x[lo..=hi], &y[lo..=hi], &weights, x[i], x_range).unwrap_or(y[i]);
    }

    fitted
}
