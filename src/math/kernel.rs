//! Weight functions used by the LOESS engine.
//!
//! - `tricube` turns a scaled neighbour distance into a locality weight.
//! - `bisquare` turns a scaled residual into a robustness weight.
//!
//! Both are compactly supported on `[0, 1)`.

/// Distances at or below this fraction of the window radius get full weight.
pub const NEAR_FRACTION: f64 = 0.001;

/// Distances above this fraction of the window radius get zero weight.
pub const FAR_FRACTION: f64 = 0.999;

/// Tricube kernel `(1 - |u|^3)^3` for `|u| < 1`, else 0.
pub fn tricube(u: f64) -> f64 {
    let u = u.abs();
    if u >= 1.0 {
        return 0.0;
    }
    let t = 1.0 - u * u * u;
    t * t * t
}

/// Bisquare kernel `(1 - u^2)^2` for `|u| < 1`, else 0.
pub fn bisquare(u: f64) -> f64 {
    let u = u.abs();
    if u >= 1.0 {
        return 0.0;
    }
    let t = 1.0 - u * u;
    t * t
}

/// Locality weight of a neighbour at `distance` from the fit point, for a
/// window of the given `radius`.
///
/// Very close neighbours get weight 1, neighbours at (or numerically at) the
/// radius get 0. A zero radius means every neighbour sits on the fit point.
pub fn neighbour_weight(distance: f64, radius: f64) -> f64 {
    if radius <= 0.0 {
        return 1.0;
    }
    let d = distance.abs();
    if d <= NEAR_FRACTION * radius {
        1.0
    } else if d > FAR_FRACTION * radius {
        0.0
    } else {
        tricube(d / radius)
    }
}
