//! Published synthesis ingest (Wu et al. 2024, stem sheets).
//!
//! The compilation ships as a workbook with one sheet per ecosystem. We read
//! CSV exports of the `upland-stem` and `wetland-stem` sheets. Column names in
//! the workbook are long and inconsistent, so columns are addressed by
//! position, as in the published layout:
//!
//! | position | content                   |
//! |----------|---------------------------|
//! | 0        | reference (study key)     |
//! | 8        | measurement height (text) |
//! | 9        | CH4 flux                  |

use std::path::Path;

use tracing::{debug, info, warn};

use crate::data::height::parse_synthesis_height;
use crate::domain::{DataConfig, Ecosystem, SynthesisObservation};
use crate::error::AppError;
use crate::io::table::{RowError, get_at, open_csv, parse_opt_f64};

const COL_REFERENCE: usize = 0;
const COL_HEIGHT: usize = 8;
const COL_FLUX: usize = 9;

/// Cleaned synthesis observations from both sheets.
#[derive(Debug, Clone, Default)]
pub struct SynthesisDataset {
    pub observations: Vec<SynthesisObservation>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Rows dropped for a missing height or flux.
    pub rows_incomplete: usize,
}

/// Load both ecosystem sheets (upland first).
pub fn load_synthesis(config: &DataConfig) -> Result<SynthesisDataset, AppError> {
    let mut data = SynthesisDataset::default();
    load_sheet(&config.upland_csv, Ecosystem::Upland, &mut data)?;
    load_sheet(&config.wetland_csv, Ecosystem::Wetland, &mut data)?;

    info!(
        rows_read = data.rows_read,
        rows_used = data.observations.len(),
        incomplete = data.rows_incomplete,
        "loaded synthesis"
    );
    if !data.row_errors.is_empty() {
        warn!(count = data.row_errors.len(), "skipped malformed synthesis rows");
    }

    if data.observations.is_empty() {
        return Err(AppError::no_data("No valid synthesis observations remain after cleaning."));
    }
    Ok(data)
}

/// Append one sheet's cleaned rows to `data`.
pub fn load_sheet(path: &Path, ecosystem: Ecosystem, data: &mut SynthesisDataset) -> Result<(), AppError> {
    let mut reader = open_csv(path)?;

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        data.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                push_error(data, line, format!("CSV parse error: {e}"));
                continue;
            }
        };
        if record.len() <= COL_FLUX {
            push_error(
                data,
                line,
                format!("Expected at least {} columns, found {}.", COL_FLUX + 1, record.len()),
            );
            continue;
        }

        let height = get_at(&record, COL_HEIGHT).and_then(parse_synthesis_height);
        let flux = parse_opt_f64(get_at(&record, COL_FLUX));
        let (Some(height_m), Some(flux)) = (height, flux) else {
            data.rows_incomplete += 1;
            continue;
        };

        data.observations.push(SynthesisObservation {
            reference: get_at(&record, COL_REFERENCE).map(str::to_string),
            height_m,
            flux,
            ecosystem,
        });
    }

    debug!(path = %path.display(), ecosystem = ecosystem.display_name(), "read synthesis sheet");
    Ok(())
}

fn push_error(data: &mut SynthesisDataset, line: usize, message: String) {
    debug!(line, "{message}");
    data.row_errors.push(RowError { line, message });
}
