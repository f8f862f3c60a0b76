//! Formatted terminal output.
//!
//! Formatting lives here so the statistics stay plain data and output changes
//! are localized (the tests below pin the layout).

use crate::domain::SmoothedProfile;
use crate::report::{FieldSummary, NegativeShare, SynthesisSummary};

const RULE_WIDTH: usize = 72;
const FLUX_UNIT: &str = "nmol m-2 s-1";

/// Field campaign section.
pub fn format_field_summary(s: &FieldSummary) -> String {
    let mut out = String::new();
    push_header(&mut out, "FIELD DATA SUMMARY (Harvard Forest + Yale Myers Forest)");

    out.push_str(&format!("Total measurements:  {}\n", s.n_obs));
    out.push_str(&format!("Trees:               {}\n", s.n_trees));
    out.push_str(&format!(
        "Species:             {}  ({})\n",
        s.species.len(),
        s.species.join(", ")
    ));
    out.push('\n');

    out.push_str("Measurements by component:\n");
    for c in &s.components {
        out.push_str(&format!("  {:<8} {:>5}\n", c.component.key(), c.n));
    }
    out.push('\n');

    out.push_str(&format!(
        "Mean CH4 flux < 2 m:   {} {FLUX_UNIT}  (n={})\n",
        fmt_opt(s.below.mean, 4),
        s.below.n
    ));
    out.push_str(&format!(
        "Mean CH4 flux >= 2 m:  {} {FLUX_UNIT}  (n={})\n",
        fmt_opt(s.above.mean, 4),
        s.above.n
    ));
    out.push_str(&format!("Ratio (below/above):   {}\n", fmt_ratio(s.ratio)));
    out.push('\n');

    out.push_str(&format!("Stem measurements >= 2 m:    {}\n", s.stem_above.n));
    out.push_str(&format!(
        "  Negative (uptake):          {}  ({})\n",
        s.stem_above.negative,
        fmt_pct(s.stem_above.percent)
    ));
    out.push('\n');

    out.push_str("Per-tree summary (all components, >= 2 m):\n");
    for t in &s.trees_above {
        out.push_str(&format!(
            "  {:<25} tag={:<8}  {}\n",
            t.species,
            t.tree_tag,
            fmt_share(&t.share)
        ));
    }
    out.push('\n');

    for m in &s.medians {
        out.push_str(&format!(
            "Median CH4 flux ({}): {:.5} {FLUX_UNIT}  (n={})\n",
            m.component.key(),
            m.median,
            m.n
        ));
    }
    out.push('\n');
    out
}

/// Synthesis section.
pub fn format_synthesis_summary(s: &SynthesisSummary) -> String {
    let mut out = String::new();
    push_header(&mut out, "WU ET AL. (2024) SYNTHESIS");

    out.push_str(&format!("Total studies in compilation:      {}\n", s.n_studies));
    out.push_str(&format!("Total observations:                {}\n", s.n_obs));
    out.push('\n');
    out.push_str(&format!(
        "Studies with >= 2 m measurements:  {}  ({} of {} studies)\n",
        s.studies_elevated,
        fmt_pct(s.studies_elevated_pct),
        s.n_studies
    ));
    out.push('\n');
    out.push_str(&format!("Observations at >= 2 m (from those studies):  {}\n", s.elevated.n));
    out.push_str(&format!(
        "  Negative (uptake):  {}  ({})\n",
        s.elevated.negative,
        fmt_pct(s.elevated.percent)
    ));
    out.push('\n');

    out.push_str("By study (>= 2 m):\n");
    for study in &s.by_study {
        out.push_str(&format!("  {:<35}  {}\n", study.label, fmt_share(&study.share)));
    }
    out.push('\n');
    out.push_str(&format!(
        "Studies with majority negative at >= 2 m: {}\n",
        s.majority_negative
    ));
    out.push('\n');
    out
}

/// Smoothing diagnostics plus the fitted curve and band.
pub fn format_profile_summary(label: &str, profile: &SmoothedProfile) -> String {
    let mut out = String::new();
    out.push_str(&format!("=== stemflux - LOESS profile ({label}) ===\n"));
    out.push_str(&format!(
        "Observations: n={} | fraction={:.2}\n",
        profile.n_obs, profile.fraction
    ));
    out.push_str(&format!(
        "Residual spread: {:.4} | band = fit +/- {:.1} x spread (half-width {:.4})\n",
        profile.spread,
        profile.multiplier,
        profile.half_width()
    ));
    out.push('\n');

    out.push_str(&format!(
        "{:>10} {:>12} {:>12} {:>12}\n",
        "height_m", "flux_fit", "lower", "upper"
    ));
    out.push_str(&format!("{:-<10} {:-<12} {:-<12} {:-<12}\n", "", "", "", ""));
    for (c, b) in profile.curve.iter().zip(&profile.band) {
        out.push_str(&format!(
            "{:>10.3} {:>12.4} {:>12.4} {:>12.4}\n",
            c.x, c.y, b.lower, b.upper
        ));
    }
    out
}

/// Message printed when a profile has too few samples to smooth.
pub fn format_insufficient(label: &str, n: usize) -> String {
    format!("=== stemflux - LOESS profile ({label}) ===\nObservations: n={n} | too few to smooth, showing raw points only\n")
}

fn push_header(out: &mut String, title: &str) {
    let rule = "=".repeat(RULE_WIDTH);
    out.push_str(&rule);
    out.push('\n');
    out.push_str(title);
    out.push('\n');
    out.push_str(&rule);
    out.push('\n');
}

fn fmt_share(share: &NegativeShare) -> String {
    format!(
        "n={:>3}  neg={:>2} ({:>5})",
        share.n,
        share.negative,
        fmt_pct(share.percent)
    )
}

fn fmt_opt(v: Option<f64>, decimals: usize) -> String {
    match v {
        Some(v) => format!("{v:.decimals$}"),
        None => "n/a".to_string(),
    }
}

fn fmt_pct(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.1}%"),
        None => "n/a".to_string(),
    }
}

fn fmt_ratio(v: Option<f64>) -> String {
    match v {
        Some(v) => format!("{v:.1}x"),
        None => "n/a".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{BandPoint, Component, CurvePoint};
    use crate::report::{ComponentCount, ComponentMedian, MeanFlux, StudyShare, TreeShare};

    fn share(n: usize, negative: usize) -> NegativeShare {
        NegativeShare::from_fluxes((0..n).map(|i| if i < negative { -1.0 } else { 1.0 }))
    }

    #[test]
    fn field_summary_layout() {
        let s = FieldSummary {
            n_obs: 12,
            n_trees: 2,
            species: vec!["Acer rubrum".to_string(), "Quercus rubra".to_string()],
            components: vec![
                ComponentCount { component: Component::Stem, n: 9 },
                ComponentCount { component: Component::Leaf, n: 3 },
            ],
            below: MeanFlux { mean: Some(0.51234), n: 4 },
            above: MeanFlux { mean: Some(0.0123), n: 8 },
            ratio: Some(41.66),
            stem_above: share(5, 2),
            trees_above: vec![TreeShare {
                tree_tag: "7".to_string(),
                species: "Acer rubrum".to_string(),
                share: share(4, 1),
            }],
            medians: vec![ComponentMedian {
                component: Component::Leaf,
                median: -0.001234,
                n: 3,
            }],
        };
        let text = format_field_summary(&s);

        assert!(text.starts_with(&"=".repeat(72)));
        assert!(text.contains("Species:             2  (Acer rubrum, Quercus rubra)\n"));
        assert!(text.contains("  stem         9\n"));
        assert!(text.contains("Mean CH4 flux < 2 m:   0.5123 nmol m-2 s-1  (n=4)\n"));
        assert!(text.contains("Ratio (below/above):   41.7x\n"));
        assert!(text.contains("  Negative (uptake):          2  (40.0%)\n"));
        assert!(text.contains("  Acer rubrum               tag=7         n=  4  neg= 1 (25.0%)\n"));
        assert!(text.contains("Median CH4 flux (leaf): -0.00123 nmol m-2 s-1  (n=3)\n"));
    }

    #[test]
    fn undefined_values_print_na() {
        let s = SynthesisSummary {
            n_studies: 1,
            n_obs: 1,
            studies_elevated: 0,
            studies_elevated_pct: Some(0.0),
            elevated: share(0, 0),
            by_study: vec![],
            majority_negative: 0,
        };
        let text = format_synthesis_summary(&s);
        assert!(text.contains("Studies with >= 2 m measurements:  0  (0.0% of 1 studies)\n"));
        assert!(text.contains("  Negative (uptake):  0  (n/a)\n"));
        assert!(text.contains("Studies with majority negative at >= 2 m: 0\n"));
    }

    #[test]
    fn synthesis_rows_use_labels() {
        let s = SynthesisSummary {
            n_studies: 2,
            n_obs: 10,
            studies_elevated: 1,
            studies_elevated_pct: Some(50.0),
            elevated: share(3, 2),
            by_study: vec![StudyShare {
                reference: "Pangala_2013_Swamp".to_string(),
                label: "Pangala 2013".to_string(),
                share: share(3, 2),
            }],
            majority_negative: 1,
        };
        let text = format_synthesis_summary(&s);
        assert!(text.contains(&format!("  {:<35}  n=  3  neg= 2 (66.7%)\n", "Pangala 2013")));
    }

    #[test]
    fn profile_table_has_one_row_per_point() {
        let profile = SmoothedProfile {
            curve: vec![CurvePoint { x: 0.5, y: 1.0 }, CurvePoint { x: 2.0, y: 0.25 }],
            band: vec![
                BandPoint { x: 0.5, lower: 0.85, upper: 1.15 },
                BandPoint { x: 2.0, lower: 0.1, upper: 0.4 },
            ],
            spread: 0.1,
            multiplier: 1.5,
            fraction: 0.6,
            n_obs: 2,
        };
        let text = format_profile_summary("demo", &profile);
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "=== stemflux - LOESS profile (demo) ===");
        assert_eq!(lines[1], "Observations: n=2 | fraction=0.60");
        assert_eq!(lines[2], "Residual spread: 0.1000 | band = fit +/- 1.5 x spread (half-width 0.1500)");
        assert_eq!(lines.len(), 8);
        assert_eq!(lines[4], "  height_m     flux_fit        lower        upper");
        assert_eq!(lines[6], "     0.500       1.0000       0.8500       1.1500");
        assert_eq!(lines[7], "     2.000       0.2500       0.1000       0.4000");
    }
}
