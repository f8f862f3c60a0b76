//! Numeric building blocks: kernels, weighted least squares, descriptive
//! statistics and interpolation.

pub mod kernel;
pub mod ols;
pub mod stats;

pub use kernel::*;
pub use ols::*;
pub use stats::*;
