//! Read/write profile JSON files.
//!
//! Profile JSON is the portable representation of one smoothed panel:
//! - smoothing settings (fraction, band multiplier) and the residual spread
//! - the fitted curve and its band
//! - the observations it was fitted to, so the panel can be redrawn later
//!
//! The schema is defined by `domain::ProfileFile`.

use std::fs::File;
use std::path::Path;

use chrono::Utc;
use tracing::info;

use crate::domain::{ObservationSet, ProfileFile, SmoothedProfile};
use crate::error::AppError;

pub const TOOL_NAME: &str = "stemflux";

/// Assemble the export record for a profile.
pub fn profile_file(label: &str, profile: &SmoothedProfile, observations: &ObservationSet) -> ProfileFile {
    ProfileFile {
        tool: TOOL_NAME.to_string(),
        generated_at: Utc::now(),
        label: label.to_string(),
        fraction: profile.fraction,
        spread: profile.spread,
        multiplier: profile.multiplier,
        curve: profile.curve.clone(),
        band: profile.band.clone(),
        observations: observations.clone(),
    }
}

/// Rebuild the smoothed profile stored in a saved file.
pub fn profile_from_file(file: &ProfileFile) -> SmoothedProfile {
    SmoothedProfile {
        curve: file.curve.clone(),
        band: file.band.clone(),
        spread: file.spread,
        multiplier: file.multiplier,
        fraction: file.fraction,
        n_obs: file.observations.len(),
    }
}

/// Write a profile JSON file.
pub fn write_profile_json(
    path: &Path,
    label: &str,
    profile: &SmoothedProfile,
    observations: &ObservationSet,
) -> Result<(), AppError> {
    let file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create profile JSON '{}': {e}", path.display())))?;

    serde_json::to_writer_pretty(file, &profile_file(label, profile, observations))
        .map_err(|e| AppError::input(format!("Failed to write profile JSON: {e}")))?;

    info!(path = %path.display(), "wrote profile JSON");
    Ok(())
}

/// Read a profile JSON file.
pub fn read_profile_json(path: &Path) -> Result<ProfileFile, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open profile JSON '{}': {e}", path.display())))?;
    let profile: ProfileFile =
        serde_json::from_reader(file).map_err(|e| AppError::input(format!("Invalid profile JSON: {e}")))?;
    Ok(profile)
}
