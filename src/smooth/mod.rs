//! Profile smoothing.
//!
//! - `loess`: the locally weighted regression engine
//! - `profile`: the smoothed curve plus residual band drawn on each panel

pub mod loess;
pub mod profile;

pub use loess::*;
pub use profile::*;
