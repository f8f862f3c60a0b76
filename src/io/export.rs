//! Export a smoothed profile to CSV.
//!
//! One row per curve point, meant for spreadsheets or re-plotting elsewhere.

use std::fs::File;
use std::io::Write;
use std::path::Path;

use tracing::info;

use crate::domain::SmoothedProfile;
use crate::error::AppError;

/// Write curve and band to a CSV file.
pub fn write_profile_csv(path: &Path, profile: &SmoothedProfile) -> Result<(), AppError> {
    let mut file = File::create(path)
        .map_err(|e| AppError::input(format!("Failed to create export CSV '{}': {e}", path.display())))?;

    writeln!(file, "height_m,flux_fit,band_lower,band_upper")
        .map_err(|e| AppError::input(format!("Failed to write export CSV header: {e}")))?;

    for (c, b) in profile.curve.iter().zip(&profile.band) {
        writeln!(file, "{:.6},{:.10},{:.10},{:.10}", c.x, c.y, b.lower, b.upper)
            .map_err(|e| AppError::input(format!("Failed to write export CSV row: {e}")))?;
    }

    info!(path = %path.display(), rows = profile.curve.len(), "wrote profile CSV");
    Ok(())
}
