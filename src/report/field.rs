//! Field campaign statistics.

use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet, HashSet};

use serde::Serialize;

use crate::domain::{Component, ELEVATED_HEIGHT_M, FieldMeasurement};
use crate::math::{mean, median};
use crate::report::NegativeShare;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentCount {
    pub component: Component,
    pub n: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct MeanFlux {
    pub mean: Option<f64>,
    pub n: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TreeShare {
    pub tree_tag: String,
    pub species: String,
    pub share: NegativeShare,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComponentMedian {
    pub component: Component,
    pub median: f64,
    pub n: usize,
}

/// Every field-data number cited in the text.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldSummary {
    pub n_obs: usize,
    pub n_trees: usize,
    /// Distinct species, sorted.
    pub species: Vec<String>,
    /// Measurements per component, most frequent first.
    pub components: Vec<ComponentCount>,
    /// All components below 2 m.
    pub below: MeanFlux,
    /// All components at or above 2 m.
    pub above: MeanFlux,
    /// `below.mean / above.mean`.
    pub ratio: Option<f64>,
    /// Stem measurements at or above 2 m.
    pub stem_above: NegativeShare,
    /// Per tree, all components at or above 2 m.
    pub trees_above: Vec<TreeShare>,
    /// Leaf then branch, when measured.
    pub medians: Vec<ComponentMedian>,
}

pub fn summarize_field(rows: &[FieldMeasurement]) -> FieldSummary {
    let n_trees = rows.iter().map(|m| m.tree_tag.as_str()).collect::<HashSet<_>>().len();
    let species: Vec<String> = rows
        .iter()
        .map(|m| m.species.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    let mut components: Vec<ComponentCount> = Component::ALL
        .iter()
        .map(|&component| ComponentCount {
            component,
            n: rows.iter().filter(|m| m.component == component).count(),
        })
        .filter(|c| c.n > 0)
        .collect();
    components.sort_by(|a, b| b.n.cmp(&a.n).then_with(|| a.component.key().cmp(b.component.key())));

    let below_fluxes: Vec<f64> = rows.iter().filter(|m| !is_elevated(m)).map(|m| m.flux).collect();
    let above_fluxes: Vec<f64> = rows.iter().filter(|m| is_elevated(m)).map(|m| m.flux).collect();
    let below = MeanFlux {
        mean: mean(&below_fluxes),
        n: below_fluxes.len(),
    };
    let above = MeanFlux {
        mean: mean(&above_fluxes),
        n: above_fluxes.len(),
    };
    let ratio = match (below.mean, above.mean) {
        (Some(b), Some(a)) if a != 0.0 => Some(b / a),
        _ => None,
    };

    let stem_above = NegativeShare::from_fluxes(
        rows.iter()
            .filter(|m| m.component == Component::Stem && is_elevated(m))
            .map(|m| m.flux),
    );

    let mut groups: BTreeMap<(&str, &str), Vec<f64>> = BTreeMap::new();
    for m in rows.iter().filter(|m| is_elevated(m)) {
        groups
            .entry((m.tree_tag.as_str(), m.species.as_str()))
            .or_default()
            .push(m.flux);
    }
    let mut trees_above: Vec<TreeShare> = groups
        .into_iter()
        .map(|((tag, species), fluxes)| TreeShare {
            tree_tag: tag.to_string(),
            species: species.to_string(),
            share: NegativeShare::from_fluxes(fluxes),
        })
        .collect();
    trees_above.sort_by(|a, b| compare_tags(&a.tree_tag, &b.tree_tag).then_with(|| a.species.cmp(&b.species)));

    let medians = [Component::Leaf, Component::Branch]
        .iter()
        .filter_map(|&component| {
            let fluxes: Vec<f64> = rows.iter().filter(|m| m.component == component).map(|m| m.flux).collect();
            median(&fluxes).map(|median| ComponentMedian {
                component,
                median,
                n: fluxes.len(),
            })
        })
        .collect();

    FieldSummary {
        n_obs: rows.len(),
        n_trees,
        species,
        components,
        below,
        above,
        ratio,
        stem_above,
        trees_above,
        medians,
    }
}

fn is_elevated(m: &FieldMeasurement) -> bool {
    m.height_m >= ELEVATED_HEIGHT_M
}

/// Numeric tags in numeric order, then text tags alphabetically.
fn compare_tags(a: &str, b: &str) -> Ordering {
    match (a.parse::<f64>(), b.parse::<f64>()) {
        (Ok(x), Ok(y)) => x.total_cmp(&y),
        (Ok(_), Err(_)) => Ordering::Less,
        (Err(_), Ok(_)) => Ordering::Greater,
        (Err(_), Err(_)) => a.cmp(b),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn m(tag: &str, species: &str, component: Component, height_m: f64, flux: f64) -> FieldMeasurement {
        FieldMeasurement {
            site: "Harvard Forest".to_string(),
            tree_tag: tag.to_string(),
            species: species.to_string(),
            component,
            height_m,
            flux,
        }
    }

    fn fixture() -> Vec<FieldMeasurement> {
        vec![
            m("10", "Acer rubrum", Component::Stem, 0.5, 0.9),
            m("10", "Acer rubrum", Component::Stem, 1.5, 0.5),
            m("10", "Acer rubrum", Component::Stem, 3.0, -0.1),
            m("10", "Acer rubrum", Component::Leaf, 9.0, 0.02),
            m("2", "Quercus rubra", Component::Stem, 2.0, 0.2),
            m("2", "Quercus rubra", Component::Branch, 6.0, -0.04),
            m("2", "Quercus rubra", Component::Leaf, 8.0, 0.0),
            m("YMF_1", "Quercus velutina", Component::Stem, 4.0, -0.3),
        ]
    }

    #[test]
    fn counts_and_species() {
        let s = summarize_field(&fixture());
        assert_eq!(s.n_obs, 8);
        assert_eq!(s.n_trees, 3);
        assert_eq!(s.species, vec!["Acer rubrum", "Quercus rubra", "Quercus velutina"]);
        assert_eq!(
            s.components,
            vec![
                ComponentCount { component: Component::Stem, n: 5 },
                ComponentCount { component: Component::Leaf, n: 2 },
                ComponentCount { component: Component::Branch, n: 1 },
            ]
        );
    }

    #[test]
    fn near_ground_versus_elevated() {
        let s = summarize_field(&fixture());
        assert_eq!(s.below.n, 2);
        assert_relative_eq!(s.below.mean.unwrap(), 0.7, epsilon = 1e-12);
        assert_eq!(s.above.n, 6);
        assert_relative_eq!(s.above.mean.unwrap(), (-0.1 + 0.02 + 0.2 - 0.04 + 0.0 - 0.3) / 6.0, epsilon = 1e-12);
        assert_relative_eq!(s.ratio.unwrap(), s.below.mean.unwrap() / s.above.mean.unwrap());

        assert_eq!(s.stem_above.n, 3);
        assert_eq!(s.stem_above.negative, 2);
    }

    #[test]
    fn trees_are_ordered_numerically_then_text() {
        let s = summarize_field(&fixture());
        let tags: Vec<&str> = s.trees_above.iter().map(|t| t.tree_tag.as_str()).collect();
        assert_eq!(tags, vec!["2", "10", "YMF_1"]);
        assert_eq!(s.trees_above[0].share.n, 3);
        assert_eq!(s.trees_above[0].share.negative, 1);
        assert_eq!(s.trees_above[2].share.percent, Some(100.0));
    }

    #[test]
    fn medians_for_leaf_and_branch() {
        let s = summarize_field(&fixture());
        assert_eq!(s.medians.len(), 2);
        assert_eq!(s.medians[0].component, Component::Leaf);
        assert_relative_eq!(s.medians[0].median, 0.01, epsilon = 1e-12);
        assert_eq!(s.medians[1].component, Component::Branch);
        assert_eq!(s.medians[1].n, 1);
    }

    #[test]
    fn empty_groups_are_undefined_not_nan() {
        let s = summarize_field(&[m("1", "Acer rubrum", Component::Stem, 0.5, 1.0)]);
        assert_eq!(s.above.mean, None);
        assert_eq!(s.ratio, None);
        assert_eq!(s.stem_above.percent, None);
        assert!(s.trees_above.is_empty());
        assert!(s.medians.is_empty());
    }
}
