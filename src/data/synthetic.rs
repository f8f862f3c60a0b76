//! Synthetic stem flux profiles.
//!
//! Useful for trying the smoother and the terminal plot without the field
//! tables. The shape follows what the campaigns show qualitatively: emission
//! near the ground decaying with height towards slight uptake.
//!
//! `flux(h) = base * exp(-decay * h) + offset + noise`

use rand::prelude::*;
use rand::rngs::StdRng;
use rand_distr::Normal;

use crate::domain::ObservationSet;
use crate::error::AppError;

#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticSpec {
    pub n: usize,
    pub seed: u64,
    pub height_min: f64,
    pub height_max: f64,
    /// Flux at ground level above `offset`.
    pub base: f64,
    /// Exponential decay rate per metre.
    pub decay: f64,
    /// Asymptotic flux high on the stem.
    pub offset: f64,
    /// Standard deviation of the additive Gaussian noise.
    pub noise: f64,
}

impl Default for SyntheticSpec {
    fn default() -> Self {
        Self {
            n: 40,
            seed: 42,
            height_min: 0.2,
            height_max: 12.0,
            base: 1.5,
            decay: 0.8,
            offset: -0.05,
            noise: 0.15,
        }
    }
}

/// Draw a seeded (height, flux) profile, in draw order (not sorted).
pub fn generate_profile(spec: &SyntheticSpec) -> Result<ObservationSet, AppError> {
    if spec.n == 0 {
        return Err(AppError::input("Synthetic sample size must be > 0."));
    }
    if !(spec.height_min.is_finite() && spec.height_max.is_finite() && spec.height_max > spec.height_min) {
        return Err(AppError::input("Invalid height range for synthetic profile."));
    }
    if !(spec.noise.is_finite() && spec.noise >= 0.0) {
        return Err(AppError::input("Synthetic noise must be finite and >= 0."));
    }
    if !(spec.base.is_finite() && spec.decay.is_finite() && spec.offset.is_finite()) {
        return Err(AppError::input("Synthetic profile parameters must be finite."));
    }

    let mut rng = StdRng::seed_from_u64(spec.seed);
    let normal = Normal::new(0.0, spec.noise)
        .map_err(|e| AppError::input(format!("Noise distribution error: {e}")))?;

    let pairs = (0..spec.n).map(|_| {
        let h = rng.gen_range(spec.height_min..=spec.height_max);
        let flux = spec.base * (-spec.decay * h).exp() + spec.offset + normal.sample(&mut rng);
        (h, flux)
    });

    Ok(ObservationSet::from_pairs(pairs.collect::<Vec<_>>()))
}
