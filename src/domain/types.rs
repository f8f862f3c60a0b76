//! Shared domain types.
//!
//! These types are intentionally kept lightweight and serializable so they can be:
//!
//! - used in-memory while aggregating and smoothing
//! - exported to JSON/CSV
//! - reloaded later for plotting or comparisons

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub const HARVARD_FOREST: &str = "Harvard Forest";
pub const YALE_MYERS_FOREST: &str = "Yale Myers Forest";

/// Smoothing fraction used for most profile panels.
pub const DEFAULT_FRACTION: f64 = 0.6;

/// Smoothing fraction used for the single-tree Yale Myers Forest panel.
pub const YMF_FRACTION: f64 = 0.7;

/// Height (m) separating "near-ground" from "elevated" measurements.
pub const ELEVATED_HEIGHT_M: f64 = 2.0;

/// Tree part a flux chamber was mounted on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Component {
    Stem,
    Branch,
    Leaf,
}

impl Component {
    pub const ALL: [Component; 3] = [Component::Stem, Component::Branch, Component::Leaf];

    /// Parse a raw `Type` cell. Shaded leaves are pooled with leaves.
    pub fn parse(raw: &str) -> Option<Self> {
        match raw.trim().to_ascii_lowercase().as_str() {
            "stem" => Some(Component::Stem),
            "branch" => Some(Component::Branch),
            "leaf" | "leaf (shaded)" => Some(Component::Leaf),
            _ => None,
        }
    }

    /// Lowercase key as it appears in the data.
    pub fn key(self) -> &'static str {
        match self {
            Component::Stem => "stem",
            Component::Branch => "branch",
            Component::Leaf => "leaf",
        }
    }

    /// Capitalised legend label.
    pub fn label(self) -> &'static str {
        match self {
            Component::Stem => "Stem",
            Component::Branch => "Branch",
            Component::Leaf => "Leaf",
        }
    }

    /// Figure colour as `(r, g, b)`.
    pub fn rgb(self) -> (u8, u8, u8) {
        match self {
            Component::Stem => (0x8B, 0x45, 0x13),
            Component::Branch => (0x46, 0x82, 0xB4),
            Component::Leaf => (0x2E, 0x8B, 0x57),
        }
    }
}

impl fmt::Display for Component {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

/// Ecosystem class of a synthesis sheet.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Ecosystem {
    Upland,
    Wetland,
}

impl Ecosystem {
    pub fn display_name(self) -> &'static str {
        match self {
            Ecosystem::Upland => "Upland",
            Ecosystem::Wetland => "Wetland",
        }
    }
}

/// Map a Harvard Forest species code to its Latin name.
pub fn species_name(code: &str) -> Option<&'static str> {
    match code.trim().to_ascii_lowercase().as_str() {
        "bg" => Some("Nyssa sylvatica"),
        "rm" => Some("Acer rubrum"),
        "ro" => Some("Quercus rubra"),
        "hem" => Some("Tsuga canadensis"),
        _ => None,
    }
}

/// One cleaned chamber measurement from the field campaigns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMeasurement {
    pub site: String,
    pub tree_tag: String,
    pub species: String,
    pub component: Component,
    /// Chamber height above ground (m).
    pub height_m: f64,
    /// CH4 flux (nmol m-2 s-1); negative values are uptake.
    pub flux: f64,
}

impl FieldMeasurement {
    /// Panel label used by the figure, e.g. `Acer rubrum (Harvard Forest)`.
    pub fn tree_label(&self) -> String {
        format!("{} ({})", self.species, self.site)
    }
}

/// One cleaned observation from the published synthesis.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SynthesisObservation {
    /// `None` when the sheet leaves the study key blank.
    pub reference: Option<String>,
    pub height_m: f64,
    pub flux: f64,
    pub ecosystem: Ecosystem,
}

/// Paired (predictor, response) samples handed to the estimator.
///
/// For flux profiles the predictor is height and the response is flux.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ObservationSet {
    pub predictor: Vec<f64>,
    pub response: Vec<f64>,
}

impl ObservationSet {
    pub fn new(predictor: Vec<f64>, response: Vec<f64>) -> Self {
        Self { predictor, response }
    }

    pub fn from_pairs(pairs: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let (predictor, response) = pairs.into_iter().unzip();
        Self { predictor, response }
    }

    /// Height/flux pairs of the given measurements.
    pub fn from_measurements<'a>(rows: impl IntoIterator<Item = &'a FieldMeasurement>) -> Self {
        Self::from_pairs(rows.into_iter().map(|m| (m.height_m, m.flux)))
    }

    pub fn len(&self) -> usize {
        self.predictor.len()
    }

    pub fn is_empty(&self) -> bool {
        self.predictor.is_empty()
    }
}

/// One point of a fitted smooth curve.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CurvePoint {
    pub x: f64,
    pub y: f64,
}

/// Band bounds at one curve point.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BandPoint {
    pub x: f64,
    pub lower: f64,
    pub upper: f64,
}

/// Output of the smoothed-profile estimator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SmoothedProfile {
    /// Fitted curve, ascending by predictor, one point per observation.
    pub curve: Vec<CurvePoint>,
    /// `fit ± multiplier × spread` at every curve point.
    pub band: Vec<BandPoint>,
    /// Population standard deviation of the residuals.
    pub spread: f64,
    pub multiplier: f64,
    pub fraction: f64,
    pub n_obs: usize,
}

impl SmoothedProfile {
    /// Constant distance between the curve and either band bound.
    pub fn half_width(&self) -> f64 {
        self.multiplier * self.spread
    }
}

/// Where the input tables live.
#[derive(Debug, Clone)]
pub struct DataConfig {
    pub data_dir: PathBuf,
    pub harvard_csv: PathBuf,
    pub yale_csv: PathBuf,
    pub upland_csv: PathBuf,
    pub wetland_csv: PathBuf,
}

impl DataConfig {
    /// Default layout relative to a data directory.
    pub fn in_dir(data_dir: &Path) -> Self {
        let goflux = data_dir.join("data processing").join("goFlux_reprocessing");
        Self {
            data_dir: data_dir.to_path_buf(),
            harvard_csv: goflux.join("results").join("canopy_flux_goFlux_compiled.csv"),
            yale_csv: goflux
                .join("ymf_black_oak")
                .join("results")
                .join("ymf_black_oak_flux_compiled.csv"),
            upland_csv: data_dir.join("wu2024_upland-stem.csv"),
            wetland_csv: data_dir.join("wu2024_wetland-stem.csv"),
        }
    }
}

/// Smoothing, plot and export choices for one profile run.
#[derive(Debug, Clone)]
pub struct ProfileConfig {
    pub label: String,
    pub fraction: f64,
    pub plot: bool,
    pub plot_width: usize,
    pub plot_height: usize,
    pub export_json: Option<PathBuf>,
    pub export_csv: Option<PathBuf>,
}

/// A saved profile file (JSON).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileFile {
    pub tool: String,
    pub generated_at: DateTime<Utc>,
    pub label: String,
    pub fraction: f64,
    pub spread: f64,
    pub multiplier: f64,
    pub curve: Vec<CurvePoint>,
    pub band: Vec<BandPoint>,
    pub observations: ObservationSet,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn component_parse_pools_shaded_leaves() {
        assert_eq!(Component::parse("leaf (shaded)"), Some(Component::Leaf));
        assert_eq!(Component::parse(" Stem "), Some(Component::Stem));
        assert_eq!(Component::parse("branch"), Some(Component::Branch));
        assert_eq!(Component::parse("root"), None);
    }

    #[test]
    fn species_codes() {
        assert_eq!(species_name("bg"), Some("Nyssa sylvatica"));
        assert_eq!(species_name("HEM"), Some("Tsuga canadensis"));
        assert_eq!(species_name("xx"), None);
    }

    #[test]
    fn data_config_layout() {
        let cfg = DataConfig::in_dir(Path::new("/data"));
        assert!(cfg.harvard_csv.ends_with("results/canopy_flux_goFlux_compiled.csv"));
        assert!(cfg.yale_csv.ends_with("ymf_black_oak/results/ymf_black_oak_flux_compiled.csv"));
        assert_eq!(cfg.upland_csv, PathBuf::from("/data/wu2024_upland-stem.csv"));
    }

    #[test]
    fn observation_set_from_pairs() {
        let set = ObservationSet::from_pairs([(1.0, 2.0), (3.0, 4.0)]);
        assert_eq!(set.predictor, vec![1.0, 3.0]);
        assert_eq!(set.response, vec![2.0, 4.0]);
        assert_eq!(set.len(), 2);
    }
}
