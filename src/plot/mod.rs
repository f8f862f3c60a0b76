//! Plotting.
//!
//! - `ascii`: fixed-grid terminal plot of one profile
//! - `figure`: the composite field figure (SVG via plotters)

pub mod ascii;
pub mod figure;

pub use ascii::render_profile_ascii;
pub use figure::{FigureData, Panel, PanelPoint, render_figure};
