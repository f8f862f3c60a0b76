//! Ad-hoc profile ingest: any CSV with a height column and a flux column.
//!
//! Rows with a blank or non-numeric cell in either column are dropped, which
//! gives the estimator the missing-value-free input it requires.

use std::path::Path;

use tracing::{debug, info, warn};

use crate::domain::ObservationSet;
use crate::error::AppError;
use crate::io::table::{RowError, ensure_columns, get_optional, open_csv, parse_opt_f64, read_header_map};

/// Observations plus how many rows were dropped.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedObservations {
    pub set: ObservationSet,
    pub rows_read: usize,
    pub rows_dropped: usize,
    /// Rows the CSV reader could not decode.
    pub row_errors: Vec<RowError>,
}

pub fn read_observations_csv(path: &Path, height_col: &str, flux_col: &str) -> Result<LoadedObservations, AppError> {
    let mut reader = open_csv(path)?;
    let header_map = read_header_map(&mut reader, path)?;
    ensure_columns(&header_map, &[height_col, flux_col], path)?;

    let mut pairs = Vec::new();
    let mut rows_read = 0usize;
    let mut row_errors = Vec::new();
    for (idx, result) in reader.records().enumerate() {
        rows_read += 1;
        let record = match result {
            Ok(r) => r,
            Err(e) => {
                let line = idx + 2;
                let message = format!("CSV parse error: {e}");
                debug!(line, "{message}");
                row_errors.push(RowError { line, message });
                continue;
            }
        };
        let h = parse_opt_f64(get_optional(&record, &header_map, height_col));
        let f = parse_opt_f64(get_optional(&record, &header_map, flux_col));
        if let (Some(h), Some(f)) = (h, f) {
            pairs.push((h, f));
        }
    }

    let rows_dropped = rows_read - pairs.len();
    info!(path = %path.display(), rows_read, rows_dropped, "loaded profile observations");
    if !row_errors.is_empty() {
        warn!(count = row_errors.len(), "skipped malformed profile rows");
    }

    if pairs.is_empty() {
        return Err(AppError::no_data(format!(
            "No rows with numeric `{height_col}` and `{flux_col}` in '{}'.",
            path.display()
        )));
    }

    Ok(LoadedObservations {
        set: ObservationSet::from_pairs(pairs),
        rows_read,
        rows_dropped,
        row_errors,
    })
}
