//! Synthesis statistics: how often published stem studies measured above
//! 2 m, and how often they found uptake there.

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;

use crate::domain::{ELEVATED_HEIGHT_M, SynthesisObservation};
use crate::math::percent;
use crate::report::NegativeShare;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StudyShare {
    pub reference: String,
    pub label: String,
    pub share: NegativeShare,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SynthesisSummary {
    /// Distinct named studies.
    pub n_studies: usize,
    /// Every observation, including rows without a study key.
    pub n_obs: usize,
    /// Studies with at least one measurement at or above 2 m.
    pub studies_elevated: usize,
    pub studies_elevated_pct: Option<f64>,
    /// All observations at or above 2 m, named study or not.
    pub elevated: NegativeShare,
    /// Named studies, sorted by reference.
    pub by_study: Vec<StudyShare>,
    pub majority_negative: usize,
}

pub fn summarize_synthesis(rows: &[SynthesisObservation]) -> SynthesisSummary {
    let n_studies = rows
        .iter()
        .filter_map(|o| o.reference.as_deref())
        .collect::<HashSet<_>>()
        .len();

    let elevated_rows: Vec<&SynthesisObservation> =
        rows.iter().filter(|o| o.height_m >= ELEVATED_HEIGHT_M).collect();
    let elevated = NegativeShare::from_fluxes(elevated_rows.iter().map(|o| o.flux));

    let mut groups: BTreeMap<&str, Vec<f64>> = BTreeMap::new();
    for o in &elevated_rows {
        if let Some(reference) = o.reference.as_deref() {
            groups.entry(reference).or_default().push(o.flux);
        }
    }
    let by_study: Vec<StudyShare> = groups
        .into_iter()
        .map(|(reference, fluxes)| StudyShare {
            reference: reference.to_string(),
            label: study_label(reference),
            share: NegativeShare::from_fluxes(fluxes),
        })
        .collect();
    let majority_negative = by_study.iter().filter(|s| s.share.is_majority()).count();

    SynthesisSummary {
        n_studies,
        n_obs: rows.len(),
        studies_elevated: by_study.len(),
        studies_elevated_pct: percent(by_study.len(), n_studies),
        elevated,
        by_study,
        majority_negative,
    }
}

/// `Pangala_2013_Swamp` -> `Pangala 2013`.
pub fn study_label(reference: &str) -> String {
    let stem = match reference.rsplit_once('_') {
        Some((head, tail)) if !tail.is_empty() && tail.chars().all(|c| c.is_ascii_alphabetic()) => head,
        _ => reference,
    };
    stem.replace('_', " ")
}
