//! Shared CSV plumbing for the dataset loaders.
//!
//! Loaders differ in which columns they need and how rows are cleaned, but all
//! of them:
//! - open a file with a readable error (exit code 2)
//! - match headers case-insensitively (ignoring a UTF-8 BOM)
//! - treat blank cells as missing
//! - collect row-level problems instead of failing the whole run

use std::collections::HashMap;
use std::fs::File;
use std::path::Path;

use csv::StringRecord;

use crate::error::AppError;

/// A row-level problem encountered during ingest.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowError {
    /// 1-based line number in the source file (header is line 1).
    pub line: usize,
    pub message: String,
}

/// Open a headered CSV reader with trimming and ragged-row tolerance.
pub fn open_csv(path: &Path) -> Result<csv::Reader<File>, AppError> {
    let file = File::open(path)
        .map_err(|e| AppError::input(format!("Failed to open CSV '{}': {e}", path.display())))?;

    Ok(csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(file))
}

/// Read and normalise the header row.
pub fn read_header_map(reader: &mut csv::Reader<File>, path: &Path) -> Result<HashMap<String, usize>, AppError> {
    let headers = reader
        .headers()
        .map_err(|e| AppError::input(format!("Failed to read CSV headers of '{}': {e}", path.display())))?;
    Ok(build_header_map(headers))
}

pub fn build_header_map(headers: &StringRecord) -> HashMap<String, usize> {
    headers
        .iter()
        .enumerate()
        .map(|(idx, name)| (normalize_header_name(name), idx))
        .collect()
}

fn normalize_header_name(name: &str) -> String {
    // Spreadsheet exports sometimes prefix the first header with a BOM.
    let name = name.trim().trim_start_matches('\u{feff}');
    name.to_ascii_lowercase()
}

/// Fail with exit code 2 unless every column in `required` exists.
pub fn ensure_columns(header_map: &HashMap<String, usize>, required: &[&str], path: &Path) -> Result<(), AppError> {
    let missing: Vec<&str> = required
        .iter()
        .copied()
        .filter(|c| !header_map.contains_key(&c.to_ascii_lowercase()))
        .collect();
    if missing.is_empty() {
        return Ok(());
    }
    Err(AppError::input(format!(
        "'{}' is missing required column(s): {}",
        path.display(),
        missing
            .iter()
            .map(|c| format!("`{c}`"))
            .collect::<Vec<_>>()
            .join(", ")
    )))
}

/// Non-blank cell of a named column, if present.
pub fn get_optional<'a>(record: &'a StringRecord, header_map: &HashMap<String, usize>, name: &str) -> Option<&'a str> {
    let idx = header_map.get(&name.to_ascii_lowercase())?;
    get_at(record, *idx)
}

/// Non-blank cell at a fixed column position.
pub fn get_at(record: &StringRecord, idx: usize) -> Option<&str> {
    record.get(idx).map(str::trim).filter(|s| !s.is_empty())
}

/// Parse a finite float; `NA`-style placeholders and junk become `None`.
pub fn parse_opt_f64(s: Option<&str>) -> Option<f64> {
    let v = s?.trim().parse::<f64>().ok()?;
    if v.is_finite() { Some(v) } else { None }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn header_map_is_case_insensitive_and_strips_bom() {
        let headers = StringRecord::from(vec!["\u{feff}Species", " Height_m ", "CH4_best.flux"]);
        let map = build_header_map(&headers);
        assert_eq!(map.get("species"), Some(&0));
        assert_eq!(map.get("height_m"), Some(&1));
        assert_eq!(map.get("ch4_best.flux"), Some(&2));
    }

    #[test]
    fn ensure_columns_lists_missing() {
        let map = build_header_map(&StringRecord::from(vec!["a", "b"]));
        assert!(ensure_columns(&map, &["A", "b"], Path::new("x.csv")).is_ok());
        let err = ensure_columns(&map, &["a", "Height_m", "Type"], Path::new("x.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("`Height_m`, `Type`"));
    }

    #[test]
    fn optional_cells_and_floats() {
        let map = build_header_map(&StringRecord::from(vec!["a", "b", "c"]));
        let rec = StringRecord::from(vec!["1.5", "  ", "NA"]);
        assert_eq!(get_optional(&rec, &map, "A"), Some("1.5"));
        assert_eq!(get_optional(&rec, &map, "b"), None);
        assert_eq!(get_optional(&rec, &map, "zz"), None);
        assert_eq!(parse_opt_f64(get_optional(&rec, &map, "a")), Some(1.5));
        assert_eq!(parse_opt_f64(get_optional(&rec, &map, "c")), None);
        assert_eq!(parse_opt_f64(Some("inf")), None);
    }
}
