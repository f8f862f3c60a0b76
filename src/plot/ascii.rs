//! ASCII plotting for terminal output.
//!
//! Fixed-size grid with deterministic output (the golden test below pins it).
//! Height runs up the page and flux across it, the orientation used for stem
//! profiles.
//!
//! Plot elements:
//! - observed points: `o`
//! - LOESS curve: `*`
//! - residual band: `:`

use crate::domain::{BandPoint, ObservationSet, SmoothedProfile};

const CH_POINT: char = 'o';
const CH_CURVE: char = '*';
const CH_BAND: char = ':';

/// Render observations with an optional smoothed overlay.
pub fn render_profile_ascii(
    observations: &ObservationSet,
    profile: Option<&SmoothedProfile>,
    width: usize,
    height: usize,
) -> String {
    let width = width.max(10);
    let height = height.max(5);

    let (f_min, f_max) = flux_range(observations, profile).unwrap_or((-1.0, 1.0));
    let (f_min, f_max) = pad_range(f_min, f_max, 0.05);
    let (h_min, h_max) = height_range(observations, profile).unwrap_or((0.0, 1.0));
    let (h_min, h_max) = pad_range(h_min, h_max, 0.05);

    let mut grid = vec![vec![' '; width]; height];
    let axes = Axes {
        f_min,
        f_max,
        h_min,
        h_max,
        width,
        height,
    };

    // Curve first, band fills the remaining blanks, points overlay both.
    if let Some(p) = profile {
        let curve: Vec<(f64, f64)> = p.curve.iter().map(|c| (c.y, c.x)).collect();
        draw_polyline(&mut grid, &curve, &axes, CH_CURVE);
        draw_band(&mut grid, &p.band, &axes);
    }

    for (&h, &f) in observations.predictor.iter().zip(&observations.response) {
        let col = axes.col(f);
        let row = axes.row(h);
        grid[row][col] = CH_POINT;
    }

    let mut out = String::new();
    out.push_str(&format!(
        "Plot: flux=[{f_min:.2}, {f_max:.2}] | height=[{h_min:.2}, {h_max:.2}] m\n"
    ));
    out.push_str(&format!(
        "      {CH_POINT} observed  {CH_CURVE} LOESS  {CH_BAND} residual band\n"
    ));
    for row in grid {
        out.push_str(row.into_iter().collect::<String>().trim_end());
        out.push('\n');
    }
    out
}

struct Axes {
    f_min: f64,
    f_max: f64,
    h_min: f64,
    h_max: f64,
    width: usize,
    height: usize,
}

impl Axes {
    fn col(&self, flux: f64) -> usize {
        let u = ((flux - self.f_min) / (self.f_max - self.f_min)).clamp(0.0, 1.0);
        (u * (self.width as f64 - 1.0)).round() as usize
    }

    /// Highest height maps to row 0.
    fn row(&self, h: f64) -> usize {
        let u = ((h - self.h_min) / (self.h_max - self.h_min)).clamp(0.0, 1.0);
        (self.height as f64 - 1.0 - (u * (self.height as f64 - 1.0))).round() as usize
    }
}

fn flux_range(obs: &ObservationSet, profile: Option<&SmoothedProfile>) -> Option<(f64, f64)> {
    let mut values: Vec<f64> = obs.response.clone();
    if let Some(p) = profile {
        values.extend(p.band.iter().flat_map(|b| [b.lower, b.upper]));
    }
    finite_range(values)
}

fn height_range(obs: &ObservationSet, profile: Option<&SmoothedProfile>) -> Option<(f64, f64)> {
    let mut values: Vec<f64> = obs.predictor.clone();
    if let Some(p) = profile {
        values.extend(p.curve.iter().map(|c| c.x));
    }
    finite_range(values)
}

fn finite_range(values: impl IntoIterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        min = min.min(v);
        max = max.max(v);
    }
    if min.is_finite() && max.is_finite() && max > min {
        Some((min, max))
    } else if min.is_finite() && min == max {
        Some((min - 0.5, max + 0.5))
    } else {
        None
    }
}

fn pad_range(min: f64, max: f64, frac: f64) -> (f64, f64) {
    let span = (max - min).abs();
    let pad = (span * frac).max(1e-12);
    (min - pad, max + pad)
}

/// `points` are (flux, height) pairs.
fn draw_polyline(grid: &mut [Vec<char>], points: &[(f64, f64)], axes: &Axes, ch: char) {
    let mut prev = None;
    for &(f, h) in points {
        let col = axes.col(f);
        let row = axes.row(h);
        match prev {
            Some((c0, r0)) => draw_line(grid, c0, r0, col, row, ch),
            None => grid[row][col] = ch,
        }
        prev = Some((col, row));
    }
}

/// Fill between the band bounds row by row, interpolating between
/// consecutive band points.
fn draw_band(grid: &mut [Vec<char>], band: &[BandPoint], axes: &Axes) {
    for pair in band.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        let r0 = axes.row(a.x);
        let r1 = axes.row(b.x);
        let (lo, hi) = (r0.min(r1), r0.max(r1));
        for row in lo..=hi {
            let t = if r0 == r1 {
                0.0
            } else {
                (row as f64 - r0 as f64) / (r1 as f64 - r0 as f64)
            };
            let lower = a.lower + t * (b.lower - a.lower);
            let upper = a.upper + t * (b.upper - a.upper);
            fill_row(grid, row, axes.col(lower), axes.col(upper), CH_BAND);
        }
    }
    if let [only] = band {
        let row = axes.row(only.x);
        fill_row(grid, row, axes.col(only.lower), axes.col(only.upper), CH_BAND);
    }
}

fn fill_row(grid: &mut [Vec<char>], row: usize, c0: usize, c1: usize, ch: char) {
    let Some(cells) = grid.get_mut(row) else { return };
    for col in c0.min(c1)..=c0.max(c1) {
        if let Some(cell) = cells.get_mut(col) {
            if *cell == ' ' {
                *cell = ch;
            }
        }
    }
}

/// Integer line drawing (Bresenham).
fn draw_line(grid: &mut [Vec<char>], x0: usize, y0: usize, x1: usize, y1: usize, ch: char) {
    let mut x0 = x0 as isize;
    let mut y0 = y0 as isize;
    let x1 = x1 as isize;
    let y1 = y1 as isize;

    let dx = (x1 - x0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let dy = -(y1 - y0).abs();
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    loop {
        if y0 >= 0
            && (y0 as usize) < grid.len()
            && x0 >= 0
            && (x0 as usize) < grid[0].len()
            && grid[y0 as usize][x0 as usize] == ' '
        {
            grid[y0 as usize][x0 as usize] = ch;
        }

        if x0 == x1 && y0 == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x0 += sx;
        }
        if e2 <= dx {
            err += dx;
            y0 += sy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::CurvePoint;

    fn vertical_profile() -> SmoothedProfile {
        SmoothedProfile {
            curve: vec![CurvePoint { x: 0.0, y: 0.0 }, CurvePoint { x: 4.0, y: 0.0 }],
            band: vec![
                BandPoint { x: 0.0, lower: -0.5, upper: 0.5 },
                BandPoint { x: 4.0, lower: -0.5, upper: 0.5 },
            ],
            spread: 1.0 / 3.0,
            multiplier: 1.5,
            fraction: 0.6,
            n_obs: 2,
        }
    }

    #[test]
    fn plot_golden_snapshot_small() {
        let obs = ObservationSet::new(vec![0.0, 4.0], vec![-1.0, 1.0]);
        let profile = vertical_profile();
        let plot = render_profile_ascii(&obs, Some(&profile), 11, 5);

        let expected = "\
Plot: flux=[-1.10, 1.10] | height=[-0.20, 4.20] m
      o observed  * LOESS  : residual band
   ::*::  o
   ::*::
   ::*::
   ::*::
o  ::*::
";
        assert_eq!(plot, expected);
    }

    #[test]
    fn points_only_without_profile() {
        let obs = ObservationSet::new(vec![0.5, 1.0, 8.0], vec![0.3, 0.1, -0.05]);
        let plot = render_profile_ascii(&obs, None, 20, 8);
        let body: String = plot.lines().skip(2).collect();
        assert_eq!(body.matches(CH_POINT).count(), 3);
        assert!(!body.contains(CH_CURVE));
        assert!(!body.contains(CH_BAND));
    }

    #[test]
    fn grid_size_is_clamped() {
        let obs = ObservationSet::new(vec![1.0], vec![1.0]);
        let plot = render_profile_ascii(&obs, None, 2, 2);
        let rows: Vec<&str> = plot.lines().skip(2).collect();
        assert_eq!(rows.len(), 5);
        assert!(rows.iter().all(|r| r.chars().count() <= 10));
        assert_eq!(rows.iter().filter(|r| r.contains(CH_POINT)).count(), 1);
    }
}
