//! Smoothed flux profiles with a residual band.
//!
//! Given paired (height, flux) samples this produces the LOESS trend drawn over
//! each profile panel plus a band of constant half-width
//! `BAND_MULTIPLIER × sd(residuals)` around it. The band is a visual aid, not a
//! local variance estimate: a single global spread scales it everywhere.

use crate::domain::{BandPoint, CurvePoint, ObservationSet, SmoothedProfile};
use crate::error::AppError;
use crate::math::{interp, population_std};
use crate::smooth::loess::{LoessOptions, loess_sorted};

/// Below this many samples no trend is drawn.
pub const MIN_SAMPLES: usize = 4;

/// Band half-width in units of the residual standard deviation.
pub const BAND_MULTIPLIER: f64 = 1.5;

/// Smooth `response` against `predictor`.
///
/// Returns `Ok(None)` without doing any work when fewer than
/// [`MIN_SAMPLES`] samples are supplied; the caller simply skips the overlay.
/// Mismatched lengths, non-finite values and fractions outside `(0, 1]` are
/// caller bugs and come back as errors.
pub fn smooth_profile(
    predictor: &[f64],
    response: &[f64],
    fraction: f64,
) -> Result<Option<SmoothedProfile>, AppError> {
    if predictor.len() < MIN_SAMPLES {
        return Ok(None);
    }
    if predictor.len() != response.len() {
        return Err(AppError::compute(format!(
            "Profile length mismatch: {} heights vs {} fluxes.",
            predictor.len(),
            response.len()
        )));
    }
    if let Some(v) = predictor.iter().chain(response).find(|v| !v.is_finite()) {
        return Err(AppError::compute(format!("Profile contains a non-finite value ({v}).")));
    }

    let mut order: Vec<usize> = (0..predictor.len()).collect();
    order.sort_by(|&a, &b| predictor[a].total_cmp(&predictor[b]));
    let xs: Vec<f64> = order.iter().map(|&i| predictor[i]).collect();
    let ys: Vec<f64> = order.iter().map(|&i| response[i]).collect();

    let fitted = loess_sorted(&xs, &ys, &LoessOptions::with_fraction(fraction))?;

    let mut residuals = Vec::with_capacity(xs.len());
    for (&x, &y) in xs.iter().zip(&ys) {
        let at = interp(x, &xs, &fitted)
            .ok_or_else(|| AppError::compute("Interpolation over an empty curve."))?;
        residuals.push(at - y);
    }
    let spread = population_std(&residuals)
        .ok_or_else(|| AppError::compute("Residual spread of an empty profile."))?;
    let half = BAND_MULTIPLIER * spread;
    if !half.is_finite() {
        return Err(AppError::compute(format!("Residual spread overflowed ({spread}).")));
    }

    let curve: Vec<CurvePoint> = xs.iter().zip(&fitted).map(|(&x, &y)| CurvePoint { x, y }).collect();
    let band = curve
        .iter()
        .map(|p| BandPoint {
            x: p.x,
            lower: p.y - half,
            upper: p.y + half,
        })
        .collect::<Vec<_>>();
    if band.iter().any(|b| !(b.lower.is_finite() && b.upper.is_finite())) {
        return Err(AppError::compute("Residual band overflowed."));
    }

    Ok(Some(SmoothedProfile {
        curve,
        band,
        spread,
        multiplier: BAND_MULTIPLIER,
        fraction,
        n_obs: xs.len(),
    }))
}

/// [`smooth_profile`] over an [`ObservationSet`].
pub fn smooth_observations(set: &ObservationSet, fraction: f64) -> Result<Option<SmoothedProfile>, AppError> {
    smooth_profile(&set.predictor, &set.response, fraction)
}
