//! Descriptive statistics and interpolation over plain `f64` slices.
//!
//! All functions return `None` for empty input rather than `NaN`, so callers
//! decide how an undefined statistic is reported.

use std::cmp::Ordering;

pub fn mean(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    Some(values.iter().sum::<f64>() / values.len() as f64)
}

/// Median (average of the two middle values for even lengths).
pub fn median(values: &[f64]) -> Option<f64> {
    if values.is_empty() {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort_by(|a, b| a.partial_cmp(b).unwrap_or(Ordering::Equal));
    let mid = sorted.len() / 2;
    if sorted.len() % 2 == 0 {
        Some((sorted[mid - 1] + sorted[mid]) / 2.0)
    } else {
        Some(sorted[mid])
    }
}

/// Population standard deviation (divides by `n`, not `n - 1`).
pub fn population_std(values: &[f64]) -> Option<f64> {
    let m = mean(values)?;
    let var = values.iter().map(|v| (v - m) * (v - m)).sum::<f64>() / values.len() as f64;
    Some(var.max(0.0).sqrt())
}

/// Piecewise-linear interpolation of `(xp, fp)` at `x`.
///
/// `xp` must be non-decreasing. Outside `[xp[0], xp[last]]` the end values are
/// returned. Where `xp` repeats a value the last sample at that position wins.
pub fn interp(x: f64, xp: &[f64], fp: &[f64]) -> Option<f64> {
    debug_assert_eq!(xp.len(), fp.len());
    let n = xp.len();
    if n == 0 {
        return None;
    }
    if x <= xp[0] {
        return Some(fp[0]);
    }
    if x >= xp[n - 1] {
        return Some(fp[n - 1]);
    }

    // First index with xp[hi] > x; the interval is [hi - 1, hi].
    let hi = xp.partition_point(|&v| v <= x);
    let lo = hi - 1;
    let dx = xp[hi] - xp[lo];
    if dx <= 0.0 {
        return Some(fp[lo]);
    }
    let u = (x - xp[lo]) / dx;
    Some(fp[lo] + u * (fp[hi] - fp[lo]))
}

/// Percentage `100 * part / whole`, undefined for an empty whole.
pub fn percent(part: usize, whole: usize) -> Option<f64> {
    if whole == 0 {
        return None;
    }
    Some(100.0 * part as f64 / whole as f64)
}
