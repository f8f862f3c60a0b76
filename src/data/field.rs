//! Field campaign ingest (Harvard Forest + Yale Myers Forest).
//!
//! Both campaigns were processed into "compiled" flux tables with one row per
//! chamber measurement. This module turns them into clean `FieldMeasurement`s:
//!
//! - Harvard Forest: drop Nyssa sylvatica tag 3, pool shaded leaves with
//!   leaves, expand species codes to Latin names
//! - Yale Myers Forest: a single black oak measured on the stem only, with
//!   free-text heights such as `4.5 (crown)`
//! - both: rows without a usable height or CH4 flux are dropped

use std::path::Path;

use tracing::{debug, info, warn};

use crate::data::height::parse_annotated_height;
use crate::domain::{
    Component, DataConfig, FieldMeasurement, HARVARD_FOREST, YALE_MYERS_FOREST, species_name,
};
use crate::error::AppError;
use crate::io::table::{RowError, ensure_columns, get_optional, open_csv, parse_opt_f64, read_header_map};

const COL_SPECIES: &str = "Species";
const COL_TAG: &str = "Tree_Tag";
const COL_TYPE: &str = "Type";
const COL_HEIGHT: &str = "Height_m";
const COL_FLUX: &str = "CH4_best.flux";
const COL_SITE: &str = "Site";

/// Species code and tag of the tree removed from every analysis.
const EXCLUDED_TREE: (&str, f64) = ("bg", 3.0);

const YALE_SPECIES: &str = "Quercus velutina";
const YALE_TAG: &str = "YMF_1";

/// Cleaned rows of one source table plus bookkeeping.
#[derive(Debug, Clone, Default)]
pub struct SiteTable {
    pub measurements: Vec<FieldMeasurement>,
    pub row_errors: Vec<RowError>,
    pub rows_read: usize,
    /// Rows removed on purpose (excluded tree).
    pub rows_excluded: usize,
    /// Rows without a usable height or flux.
    pub rows_incomplete: usize,
}

/// Both field campaigns.
#[derive(Debug, Clone, Default)]
pub struct FieldDataset {
    pub harvard: SiteTable,
    pub yale: SiteTable,
}

impl FieldDataset {
    /// All measurements, Harvard Forest first.
    pub fn measurements(&self) -> impl Iterator<Item = &FieldMeasurement> {
        self.harvard.measurements.iter().chain(self.yale.measurements.iter())
    }

    pub fn len(&self) -> usize {
        self.harvard.measurements.len() + self.yale.measurements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Load and clean both field tables.
pub fn load_field(config: &DataConfig) -> Result<FieldDataset, AppError> {
    let harvard = load_harvard(&config.harvard_csv)?;
    let yale = load_yale(&config.yale_csv)?;

    let data = FieldDataset { harvard, yale };
    if data.is_empty() {
        return Err(AppError::no_data("No valid field measurements remain after cleaning."));
    }
    Ok(data)
}

/// Load the Harvard Forest compiled flux table.
pub fn load_harvard(path: &Path) -> Result<SiteTable, AppError> {
    let mut reader = open_csv(path)?;
    let header_map = read_header_map(&mut reader, path)?;
    ensure_columns(&header_map, &[COL_SPECIES, COL_TAG, COL_TYPE, COL_HEIGHT, COL_FLUX], path)?;

    let mut table = SiteTable::default();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        table.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                table.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let code = get_optional(&record, &header_map, COL_SPECIES).unwrap_or("");
        let tag = normalize_tag(get_optional(&record, &header_map, COL_TAG).unwrap_or(""));
        if is_excluded(code, &tag) {
            table.rows_excluded += 1;
            continue;
        }

        // Unknown codes are dropped here, so they are missing from the totals,
        // the component breakdown and the 2 m means.
        let Some(species) = species_name(code) else {
            table.row_errors.push(RowError {
                line,
                message: format!("Unknown species code '{code}'."),
            });
            continue;
        };
        let raw_type = get_optional(&record, &header_map, COL_TYPE).unwrap_or("");
        let Some(component) = Component::parse(raw_type) else {
            table.row_errors.push(RowError {
                line,
                message: format!("Unknown component type '{raw_type}'."),
            });
            continue;
        };

        let height = parse_opt_f64(get_optional(&record, &header_map, COL_HEIGHT));
        let flux = parse_opt_f64(get_optional(&record, &header_map, COL_FLUX));
        let (Some(height_m), Some(flux)) = (height, flux) else {
            table.rows_incomplete += 1;
            continue;
        };

        let site = get_optional(&record, &header_map, COL_SITE).unwrap_or(HARVARD_FOREST);

        table.measurements.push(FieldMeasurement {
            site: site.to_string(),
            tree_tag: tag,
            species: species.to_string(),
            component,
            height_m,
            flux,
        });
    }

    log_table("Harvard Forest", path, &table);
    Ok(table)
}

/// Load the Yale Myers Forest black oak table.
pub fn load_yale(path: &Path) -> Result<SiteTable, AppError> {
    let mut reader = open_csv(path)?;
    let header_map = read_header_map(&mut reader, path)?;
    ensure_columns(&header_map, &[COL_HEIGHT, COL_FLUX], path)?;

    let mut table = SiteTable::default();

    for (idx, result) in reader.records().enumerate() {
        let line = idx + 2;
        table.rows_read += 1;

        let record = match result {
            Ok(r) => r,
            Err(e) => {
                table.row_errors.push(RowError {
                    line,
                    message: format!("CSV parse error: {e}"),
                });
                continue;
            }
        };

        let height = get_optional(&record, &header_map, COL_HEIGHT).and_then(parse_annotated_height);
        let flux = parse_opt_f64(get_optional(&record, &header_map, COL_FLUX));
        let (Some(height_m), Some(flux)) = (height, flux) else {
            table.rows_incomplete += 1;
            continue;
        };

        table.measurements.push(FieldMeasurement {
            site: YALE_MYERS_FOREST.to_string(),
            tree_tag: YALE_TAG.to_string(),
            species: YALE_SPECIES.to_string(),
            component: Component::Stem,
            height_m,
            flux,
        });
    }

    log_table("Yale Myers Forest", path, &table);
    Ok(table)
}

/// Render integral numeric tags without a trailing `.0`.
fn normalize_tag(raw: &str) -> String {
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() && v.fract() == 0.0 => format!("{}", v as i64),
        _ => raw.to_string(),
    }
}

fn is_excluded(code: &str, tag: &str) -> bool {
    code.trim().eq_ignore_ascii_case(EXCLUDED_TREE.0) && tag.parse::<f64>().ok() == Some(EXCLUDED_TREE.1)
}

fn log_table(name: &str, path: &Path, table: &SiteTable) {
    info!(
        site = name,
        path = %path.display(),
        rows_read = table.rows_read,
        rows_used = table.measurements.len(),
        excluded = table.rows_excluded,
        incomplete = table.rows_incomplete,
        "loaded field table"
    );
    if !table.row_errors.is_empty() {
        warn!(site = name, count = table.row_errors.len(), "skipped malformed rows");
    }
    for e in &table.row_errors {
        debug!(site = name, line = e.line, "{}", e.message);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("stem_flux_field_{}_{name}", std::process::id()));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn harvard_cleaning_rules() {
        let path = write_temp(
            "hf.csv",
            "Site,Species,Tree_Tag,Type,Height_m,CH4_best.flux\n\
             Harvard Forest,rm,1,stem,0.5,0.12\n\
             Harvard Forest,rm,1,leaf (shaded),8.0,-0.01\n\
             Harvard Forest,bg,3,stem,0.5,0.50\n\
             Harvard Forest,bg,4,stem,1.0,0.30\n\
             Harvard Forest,ro,2,branch,,0.02\n\
             Harvard Forest,ro,2,branch,6.0,NA\n\
             Harvard Forest,xx,9,stem,1.0,0.1\n",
        );
        let table = load_harvard(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.rows_read, 7);
        assert_eq!(table.rows_excluded, 1);
        assert_eq!(table.rows_incomplete, 2);
        assert_eq!(table.row_errors.len(), 1);
        assert_eq!(table.row_errors[0].line, 8);
        assert_eq!(table.measurements.len(), 3);

        let leaf = &table.measurements[1];
        assert_eq!(leaf.component, Component::Leaf);
        assert_eq!(leaf.species, "Acer rubrum");
        assert_eq!(leaf.tree_label(), "Acer rubrum (Harvard Forest)");
        assert_eq!(table.measurements[2].species, "Nyssa sylvatica");
        assert_eq!(table.measurements[2].tree_tag, "4");
    }

    #[test]
    fn unknown_codes_are_left_out_of_totals() {
        let path = write_temp(
            "hf_unknown.csv",
            "Species,Tree_Tag,Type,Height_m,CH4_best.flux\n\
             rm,1,stem,0.5,0.12\n\
             zz,5,stem,3.0,-0.2\n\
             rm,1,root,0.1,0.4\n",
        );
        let table = load_harvard(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.rows_read, 3);
        assert_eq!(table.measurements.len(), 1);
        let lines: Vec<usize> = table.row_errors.iter().map(|e| e.line).collect();
        assert_eq!(lines, vec![3, 4]);
        assert!(table.row_errors[0].message.contains("'zz'"));
        assert!(table.row_errors[1].message.contains("'root'"));
    }

    #[test]
    fn harvard_missing_column_is_input_error() {
        let path = write_temp("hf_bad.csv", "Species,Tree_Tag,Height_m\nrm,1,0.5\n");
        let err = load_harvard(&path).unwrap_err();
        std::fs::remove_file(&path).ok();
        assert_eq!(err.exit_code(), 2);
        assert!(err.message().contains("`Type`"));
    }

    #[test]
    fn yale_heights_with_notes() {
        let path = write_temp(
            "ymf.csv",
            "Height_m,CH4_best.flux\n0.3,0.8\n4.5 (crown),-0.02\nbase,0.1\n10,\n",
        );
        let table = load_yale(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(table.rows_read, 4);
        assert_eq!(table.rows_incomplete, 2);
        assert_eq!(table.measurements.len(), 2);
        assert_eq!(table.measurements[1].height_m, 4.5);
        assert_eq!(table.measurements[1].tree_tag, "YMF_1");
        assert_eq!(table.measurements[1].site, YALE_MYERS_FOREST);
        assert_eq!(table.measurements[1].component, Component::Stem);
    }

    #[test]
    fn missing_file_is_input_error() {
        let err = load_yale(Path::new("/definitely/not/here.csv")).unwrap_err();
        assert_eq!(err.exit_code(), 2);
    }

    #[test]
    fn tags_are_normalized() {
        assert_eq!(normalize_tag("3.0"), "3");
        assert_eq!(normalize_tag("YMF_1"), "YMF_1");
        assert!(is_excluded("BG", "3.0"));
        assert!(!is_excluded("bg", "4"));
    }
}
