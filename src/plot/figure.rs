//! Composite field figure (SVG).
//!
//! - (a) one panel per Harvard Forest tree, two rows of three
//! - (b) the Yale Myers Forest black oak
//!
//! Each panel shows every measurement coloured by component, a zero-flux
//! reference line, and the stem LOESS curve with its residual band.

use std::collections::BTreeMap;
use std::error::Error;
use std::path::Path;

use plotters::coord::Shift;
use plotters::prelude::*;
use plotters::style::FontStyle;
use rayon::prelude::*;
use tracing::{debug, info};

use crate::data::FieldDataset;
use crate::domain::{
    Component, DEFAULT_FRACTION, FieldMeasurement, ObservationSet, SmoothedProfile, YMF_FRACTION,
};
use crate::error::AppError;
use crate::smooth::smooth_observations;

const FIGURE_SIZE: (u32, u32) = (1500, 2000);
const GRID_COLS: usize = 3;
const BAND_OPACITY: f64 = 0.12;
const FLUX_DESC: &str = "CH4 flux (nmol m-2 s-1)";
const HEIGHT_DESC: &str = "Height (m)";

#[derive(Debug, Clone, PartialEq)]
pub struct PanelPoint {
    pub component: Component,
    pub height_m: f64,
    pub flux: f64,
}

/// One subplot: raw points plus the stem fit (absent below four stem samples).
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    pub label: String,
    pub points: Vec<PanelPoint>,
    pub stem_fit: Option<SmoothedProfile>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FigureData {
    /// Ordered by site, then species.
    pub harvard: Vec<Panel>,
    pub yale: Option<Panel>,
}

impl FigureData {
    /// Group the field data into panels and smooth every panel in parallel.
    pub fn from_field(data: &FieldDataset) -> Result<Self, AppError> {
        let mut groups: BTreeMap<(&str, &str), Vec<&FieldMeasurement>> = BTreeMap::new();
        for m in &data.harvard.measurements {
            groups.entry((m.site.as_str(), m.species.as_str())).or_default().push(m);
        }

        let mut jobs: Vec<(Vec<&FieldMeasurement>, f64)> =
            groups.into_values().map(|rows| (rows, DEFAULT_FRACTION)).collect();
        let has_yale = !data.yale.measurements.is_empty();
        if has_yale {
            jobs.push((data.yale.measurements.iter().collect(), YMF_FRACTION));
        }

        let mut panels = jobs
            .into_par_iter()
            .map(|(rows, fraction)| build_panel(&rows, fraction))
            .collect::<Result<Vec<_>, AppError>>()?;

        let yale = if has_yale { panels.pop() } else { None };
        info!(panels = panels.len(), yale = yale.is_some(), "smoothed figure panels");
        Ok(Self { harvard: panels, yale })
    }
}

fn build_panel(rows: &[&FieldMeasurement], fraction: f64) -> Result<Panel, AppError> {
    let label = rows.first().map(|m| m.tree_label()).unwrap_or_default();
    let stems = ObservationSet::from_measurements(
        rows.iter().copied().filter(|m| m.component == Component::Stem),
    );
    let stem_fit = smooth_observations(&stems, fraction)?;
    debug!(panel = %label, stems = stems.len(), smoothed = stem_fit.is_some(), "panel ready");

    Ok(Panel {
        label,
        points: rows
            .iter()
            .map(|m| PanelPoint {
                component: m.component,
                height_m: m.height_m,
                flux: m.flux,
            })
            .collect(),
        stem_fit,
    })
}

/// Write the composite figure as SVG.
pub fn render_figure(figure: &FigureData, out_path: &Path) -> Result<(), AppError> {
    if let Some(parent) = out_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .map_err(|e| AppError::input(format!("Cannot create '{}': {e}", parent.display())))?;
    }
    draw_figure(figure, out_path)
        .map_err(|e| AppError::compute(format!("Figure rendering failed: {e}")))?;
    info!(path = %out_path.display(), "wrote figure");
    Ok(())
}

fn draw_figure(figure: &FigureData, out_path: &Path) -> Result<(), Box<dyn Error>> {
    let root = SVGBackend::new(out_path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let (top, bottom) = root.split_vertically((FIGURE_SIZE.1 * 3 / 5) as i32);
    let rows = figure.harvard.len().div_ceil(GRID_COLS).max(1);
    let cells = top.split_evenly((rows, GRID_COLS));
    for (i, (panel, area)) in figure.harvard.iter().zip(cells.iter()).enumerate() {
        draw_panel(area, panel, i == 0)?;
    }
    top.draw(&Text::new("a", (12, 8), ("sans-serif", 36).into_font()))?;

    let (yale_area, _) = bottom.split_horizontally((FIGURE_SIZE.0 / 2) as i32);
    if let Some(panel) = &figure.yale {
        draw_panel(&yale_area, panel, false)?;
    }
    yale_area.draw(&Text::new("b", (12, 8), ("sans-serif", 36).into_font()))?;

    root.present()?;
    Ok(())
}

fn draw_panel(area: &DrawingArea<SVGBackend<'_>, Shift>, panel: &Panel, legend: bool) -> Result<(), Box<dyn Error>> {
    let (f_min, f_max, h_min, h_max) = panel_ranges(panel);

    let mut chart = ChartBuilder::on(area)
        .caption(&panel.label, ("sans-serif", 20).into_font().style(FontStyle::Italic))
        .margin(20)
        .x_label_area_size(40)
        .y_label_area_size(50)
        .build_cartesian_2d(f_min..f_max, h_min..h_max)?;

    chart
        .configure_mesh()
        .disable_mesh()
        .x_desc(FLUX_DESC)
        .y_desc(HEIGHT_DESC)
        .draw()?;

    chart.draw_series(std::iter::once(PathElement::new(
        vec![(0.0, h_min), (0.0, h_max)],
        BLACK.mix(0.4),
    )))?;

    let stem_color = component_color(Component::Stem);
    if let Some(fit) = &panel.stem_fit {
        let outline: Vec<(f64, f64)> = fit
            .band
            .iter()
            .map(|b| (b.lower, b.x))
            .chain(fit.band.iter().rev().map(|b| (b.upper, b.x)))
            .collect();
        chart.draw_series(std::iter::once(Polygon::new(
            outline,
            stem_color.mix(BAND_OPACITY).filled(),
        )))?;
        chart.draw_series(LineSeries::new(
            fit.curve.iter().map(|c| (c.y, c.x)),
            stem_color.stroke_width(2),
        ))?;
    }

    for component in Component::ALL {
        let color = component_color(component);
        let points: Vec<(f64, f64)> = panel
            .points
            .iter()
            .filter(|p| p.component == component)
            .map(|p| (p.flux, p.height_m))
            .collect();
        if points.is_empty() {
            continue;
        }
        let series = chart.draw_series(
            points
                .into_iter()
                .map(move |pt| Circle::new(pt, 4, color.mix(0.8).filled())),
        )?;
        if legend {
            series
                .label(component.label())
                .legend(move |(x, y)| Circle::new((x, y), 4, color.filled()));
        }
    }

    if legend {
        chart
            .configure_series_labels()
            .background_style(WHITE.mix(0.8))
            .border_style(BLACK)
            .draw()?;
    }
    Ok(())
}

fn component_color(component: Component) -> RGBColor {
    let (r, g, b) = component.rgb();
    RGBColor(r, g, b)
}

/// Flux range always includes zero so the reference line is visible.
fn panel_ranges(panel: &Panel) -> (f64, f64, f64, f64) {
    let mut f_lo = 0.0f64;
    let mut f_hi = 0.0f64;
    let mut h_lo = f64::INFINITY;
    let mut h_hi = f64::NEG_INFINITY;
    for p in &panel.points {
        f_lo = f_lo.min(p.flux);
        f_hi = f_hi.max(p.flux);
        h_lo = h_lo.min(p.height_m);
        h_hi = h_hi.max(p.height_m);
    }
    if let Some(fit) = &panel.stem_fit {
        for b in &fit.band {
            f_lo = f_lo.min(b.lower);
            f_hi = f_hi.max(b.upper);
        }
    }
    if !(h_lo.is_finite() && h_hi.is_finite()) {
        h_lo = 0.0;
        h_hi = 1.0;
    }
    let (f_lo, f_hi) = padded(f_lo, f_hi);
    let (h_lo, h_hi) = padded(h_lo, h_hi);
    (f_lo, f_hi, h_lo, h_hi)
}

fn padded(lo: f64, hi: f64) -> (f64, f64) {
    let span = hi - lo;
    if span <= 0.0 {
        return (lo - 0.5, hi + 0.5);
    }
    (lo - 0.05 * span, hi + 0.05 * span)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::SiteTable;
    use crate::domain::{HARVARD_FOREST, YALE_MYERS_FOREST};

    fn m(species: &str, component: Component, height_m: f64, flux: f64) -> FieldMeasurement {
        FieldMeasurement {
            site: HARVARD_FOREST.to_string(),
            tree_tag: species.to_string(),
            species: species.to_string(),
            component,
            height_m,
            flux,
        }
    }

    fn dataset() -> FieldDataset {
        let mut harvard = SiteTable::default();
        for (i, h) in [0.3, 0.8, 1.5, 2.5, 4.0, 6.0].iter().enumerate() {
            harvard.measurements.push(m("Quercus rubra", Component::Stem, *h, 1.0 / (1.0 + h) + 0.01 * i as f64));
        }
        harvard.measurements.push(m("Quercus rubra", Component::Leaf, 9.0, -0.01));
        harvard.measurements.push(m("Acer rubrum", Component::Stem, 0.5, 0.4));
        harvard.measurements.push(m("Acer rubrum", Component::Branch, 5.0, 0.02));

        let mut yale = SiteTable::default();
        for (h, f) in [(0.2, 0.9), (1.0, 0.5), (2.0, 0.2), (4.5, -0.02), (8.0, -0.04)] {
            yale.measurements.push(FieldMeasurement {
                site: YALE_MYERS_FOREST.to_string(),
                tree_tag: "YMF_1".to_string(),
                species: "Quercus velutina".to_string(),
                component: Component::Stem,
                height_m: h,
                flux: f,
            });
        }
        FieldDataset { harvard, yale }
    }

    #[test]
    fn panels_are_ordered_and_smoothed_where_possible() {
        let fig = FigureData::from_field(&dataset()).unwrap();
        let labels: Vec<&str> = fig.harvard.iter().map(|p| p.label.as_str()).collect();
        assert_eq!(
            labels,
            vec!["Acer rubrum (Harvard Forest)", "Quercus rubra (Harvard Forest)"]
        );
        assert!(fig.harvard[0].stem_fit.is_none());
        let oak = fig.harvard[1].stem_fit.as_ref().unwrap();
        assert_eq!(oak.n_obs, 6);
        assert_eq!(oak.fraction, DEFAULT_FRACTION);
        assert_eq!(fig.harvard[1].points.len(), 7);

        let yale = fig.yale.unwrap();
        assert_eq!(yale.label, "Quercus velutina (Yale Myers Forest)");
        assert_eq!(yale.stem_fit.unwrap().fraction, YMF_FRACTION);
    }

    #[test]
    fn ranges_include_zero_flux() {
        let panel = Panel {
            label: "x".to_string(),
            points: vec![PanelPoint {
                component: Component::Stem,
                height_m: 1.0,
                flux: 2.0,
            }],
            stem_fit: None,
        };
        let (f_lo, f_hi, h_lo, h_hi) = panel_ranges(&panel);
        assert!(f_lo < 0.0 && f_hi > 2.0);
        assert!(h_lo < 1.0 && h_hi > 1.0);
    }

    #[test]
    fn renders_svg_with_panel_titles() {
        let fig = FigureData::from_field(&dataset()).unwrap();
        let path = std::env::temp_dir().join(format!("stem_flux_fig_{}.svg", std::process::id()));
        render_figure(&fig, &path).unwrap();
        let svg = std::fs::read_to_string(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert!(svg.contains("<svg"));
        assert!(svg.contains("Quercus rubra (Harvard Forest)"));
        assert!(svg.contains("<polygon"));
    }
}
