//! Reporting: the descriptive statistics cited in the manuscript and their
//! text rendering.
//!
//! - `field`: campaign statistics (component counts, near-ground vs elevated flux)
//! - `synthesis`: how often the published compilation measured above 2 m, and
//!   how often it found uptake there
//! - `format`: fixed-width terminal output

pub mod field;
pub mod format;
pub mod synthesis;

pub use field::*;
pub use format::*;
pub use synthesis::*;

use serde::Serialize;

use crate::math::percent;

/// How many of a group of fluxes are negative (uptake).
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct NegativeShare {
    pub n: usize,
    pub negative: usize,
    /// `None` for an empty group.
    pub percent: Option<f64>,
}

impl NegativeShare {
    pub fn from_fluxes(fluxes: impl IntoIterator<Item = f64>) -> Self {
        let mut n = 0usize;
        let mut negative = 0usize;
        for f in fluxes {
            n += 1;
            if f < 0.0 {
                negative += 1;
            }
        }
        Self {
            n,
            negative,
            percent: percent(negative, n),
        }
    }

    /// Strictly more than half of the group is negative.
    pub fn is_majority(&self) -> bool {
        self.negative * 2 > self.n
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn negative_share_counts_strictly_negative() {
        let s = NegativeShare::from_fluxes([0.1, -0.2, 0.0, -0.5]);
        assert_eq!(s.n, 4);
        assert_eq!(s.negative, 2);
        assert_eq!(s.percent, Some(50.0));
        assert!(!s.is_majority());
        assert!(NegativeShare::from_fluxes([-1.0, -1.0, 2.0]).is_majority());
        assert_eq!(NegativeShare::from_fluxes([]).percent, None);
    }
}
