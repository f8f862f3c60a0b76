//! Shared workflows behind the CLI commands.
//!
//! Each function loads, computes and returns plain data; `app` decides what to
//! print or write.

use std::path::Path;

use serde::Serialize;
use tracing::{info, warn};

use crate::data::{SyntheticSpec, generate_profile, load_field, load_synthesis};
use crate::domain::{DataConfig, ObservationSet, ProfileConfig, SmoothedProfile};
use crate::error::AppError;
use crate::io::{read_observations_csv, write_profile_csv, write_profile_json};
use crate::plot::{FigureData, render_figure};
use crate::report::{FieldSummary, SynthesisSummary, summarize_field, summarize_synthesis};
use crate::smooth::smooth_observations;

/// Everything `stemflux stats` reports.
#[derive(Debug, Clone, Serialize)]
pub struct StatsOutput {
    pub field: FieldSummary,
    pub synthesis: SynthesisSummary,
}

/// One smoothed profile plus the data it came from.
#[derive(Debug, Clone)]
pub struct ProfileRun {
    pub observations: ObservationSet,
    /// `None` when there were too few samples to smooth.
    pub profile: Option<SmoothedProfile>,
}

pub fn run_stats(config: &DataConfig) -> Result<StatsOutput, AppError> {
    let field = load_field(config)?;
    let rows: Vec<_> = field.measurements().cloned().collect();
    let synthesis = load_synthesis(config)?;

    Ok(StatsOutput {
        field: summarize_field(&rows),
        synthesis: summarize_synthesis(&synthesis.observations),
    })
}

pub fn run_figure(config: &DataConfig, out: &Path) -> Result<FigureData, AppError> {
    let field = load_field(config)?;
    let figure = FigureData::from_field(&field)?;
    for panel in figure.harvard.iter().chain(figure.yale.iter()) {
        if panel.stem_fit.is_none() {
            warn!(panel = %panel.label, "fewer than 4 stem measurements, no LOESS overlay");
        }
    }
    render_figure(&figure, out)?;
    Ok(figure)
}

pub fn run_profile_csv(path: &Path, height_col: &str, flux_col: &str, config: &ProfileConfig) -> Result<ProfileRun, AppError> {
    let loaded = read_observations_csv(path, height_col, flux_col)?;
    smooth_run(loaded.set, config)
}

pub fn run_demo(spec: &SyntheticSpec, config: &ProfileConfig) -> Result<ProfileRun, AppError> {
    let observations = generate_profile(spec)?;
    info!(n = observations.len(), seed = spec.seed, "generated synthetic profile");
    smooth_run(observations, config)
}

/// Smooth, then write whichever exports were requested.
pub fn smooth_run(observations: ObservationSet, config: &ProfileConfig) -> Result<ProfileRun, AppError> {
    let profile = smooth_observations(&observations, config.fraction)?;

    match &profile {
        Some(p) => {
            info!(n = p.n_obs, spread = p.spread, fraction = p.fraction, "smoothed profile");
            if let Some(path) = &config.export_json {
                write_profile_json(path, &config.label, p, &observations)?;
            }
            if let Some(path) = &config.export_csv {
                write_profile_csv(path, p)?;
            }
        }
        None => {
            warn!(n = observations.len(), "too few samples to smooth");
            if config.export_json.is_some() || config.export_csv.is_some() {
                warn!("nothing to export without a smoothed profile");
            }
        }
    }

    Ok(ProfileRun { observations, profile })
}
