//! Font-based heading detection.
//!
//! Font observations are reduced to heading candidates by comparing each
//! line against the body text size, candidates are filtered for running
//! headers and page numbers, re-leveled by distinct font size and finally
//! handed to the hierarchy builder.

use crate::config::{AnalyzerConfig, HeadingConfig};
use crate::hierarchy::{HierarchyBuilder, RangeStrategy};
use folio_types::{
    DetectionMethod, FontObservation, FontWeight, HeadingCandidate, LeveledHeading, StructureResult,
};
use std::collections::{BTreeSet, HashMap};
use tracing::{debug, trace};

const BOLD_MARKERS: [&str; 5] = ["bold", "black", "heavy", "semibold", "demi"];

/// Picks the lines whose typography marks them as headings.
///
/// A line qualifies when it is noticeably larger than the body text, or
/// bold, short and at least body size. Order is page first, then the
/// original observation order.
pub fn candidates_from_observations(
    observations: &[FontObservation],
    config: &HeadingConfig,
) -> Vec<HeadingCandidate> {
    let usable: Vec<&FontObservation> = observations
        .iter()
        .filter(|obs| {
            let usable = obs.font_height.is_finite()
                && obs.font_height > 0.0
                && obs.page > 0
                && !obs.text.trim().is_empty();
            if !usable {
                trace!(page = obs.page, height = obs.font_height, "skipping unusable font observation");
            }
            usable
        })
        .collect();

    let Some(body_size) = body_font_size(&usable) else {
        return Vec::new();
    };
    let threshold = body_size * config.heading_size_ratio;

    let mut candidates: Vec<HeadingCandidate> = usable
        .into_iter()
        .filter_map(|obs| {
            let weight = weight_from_font_name(&obs.font_name);
            let text = obs.text.trim();
            let larger = obs.font_height >= threshold;
            let bold_short = weight == FontWeight::Bold
                && obs.font_height >= body_size
                && text.chars().count() <= config.max_heading_chars;
            (larger || bold_short)
                .then(|| HeadingCandidate::new(text, obs.page, obs.font_height, weight))
        })
        .collect();

    candidates.sort_by_key(|candidate| candidate.page);
    candidates
}

/// Most common font height, weighted by characters and rounded to half a
/// point. Ties go to the smaller size.
fn body_font_size(observations: &[&FontObservation]) -> Option<f32> {
    let mut weights: HashMap<i64, usize> = HashMap::new();
    for obs in observations {
        let key = (obs.font_height * 2.0).round() as i64;
        *weights.entry(key).or_default() += obs.text.chars().count().max(1);
    }

    weights
        .into_iter()
        .max_by(|(size_a, weight_a), (size_b, weight_b)| {
            weight_a.cmp(weight_b).then_with(|| size_b.cmp(size_a))
        })
        .map(|(key, _)| key as f32 / 2.0)
}

pub fn weight_from_font_name(font_name: &str) -> FontWeight {
    let lower = font_name.to_ascii_lowercase();
    if BOLD_MARKERS.iter().any(|marker| lower.contains(marker)) {
        FontWeight::Bold
    } else {
        FontWeight::Normal
    }
}

/// Drops running headers/footers (text repeated more than `max_repeats`
/// times), fragments shorter than `min_text_chars`, and bare page numbers.
pub fn filter(candidates: &[HeadingCandidate], config: &HeadingConfig) -> Vec<HeadingCandidate> {
    let mut occurrences: HashMap<&str, usize> = HashMap::new();
    for candidate in candidates {
        *occurrences.entry(candidate.text.trim()).or_default() += 1;
    }

    candidates
        .iter()
        .filter(|candidate| {
            let text = candidate.text.trim();
            occurrences.get(text).copied().unwrap_or(0) <= config.max_repeats
                && text.chars().count() >= config.min_text_chars
                && !text.chars().all(|ch| ch.is_ascii_digit())
        })
        .cloned()
        .collect()
}

/// Maps the Nth-largest distinct font size to level N, capped at
/// `max_level`.
pub fn normalize_levels(candidates: &[HeadingCandidate], max_level: u8) -> Vec<LeveledHeading> {
    let sizes: BTreeSet<i64> = candidates
        .iter()
        .map(|candidate| size_key(candidate.font_size))
        .collect();
    let descending: Vec<i64> = sizes.into_iter().rev().collect();

    candidates
        .iter()
        .map(|candidate| {
            let rank = descending
                .iter()
                .position(|size| *size == size_key(candidate.font_size))
                .unwrap_or(0);
            let level = u8::try_from(rank + 1).unwrap_or(u8::MAX).min(max_level);
            LeveledHeading::new(candidate.text.trim(), candidate.page, level)
        })
        .collect()
}

fn size_key(font_size: f32) -> i64 {
    (font_size * 10.0).round() as i64
}

/// Additive confidence in `[0, 1]` for a filtered, leveled heading list.
pub fn score(headings: &[LeveledHeading]) -> f64 {
    let count = headings.len();
    let levels = distinct_levels(headings);

    let mut confidence = 0.0;
    if count >= 10 {
        confidence += 0.4;
    }
    if (2..=4).contains(&levels) {
        confidence += 0.3;
    }
    if count >= 20 {
        confidence += 0.2;
    }
    if levels >= 3 {
        confidence += 0.1;
    }
    confidence
}

pub fn distinct_levels(headings: &[LeveledHeading]) -> usize {
    headings
        .iter()
        .map(|heading| heading.level)
        .collect::<BTreeSet<_>>()
        .len()
}

/// Filters, re-levels and builds the heading hierarchy for already
/// extracted candidates.
pub fn detect_from_candidates(
    candidates: &[HeadingCandidate],
    config: &AnalyzerConfig,
    last_page: Option<u32>,
) -> StructureResult {
    let filtered = filter(candidates, &config.headings);
    let leveled = normalize_levels(&filtered, config.headings.max_level);
    let confidence = score(&leveled);
    let detected = leveled.len() >= config.headings.min_candidates;

    debug!(
        candidates = candidates.len(),
        kept = leveled.len(),
        levels = distinct_levels(&leveled),
        detected,
        confidence,
        "heading analysis finished"
    );

    if !detected {
        return StructureResult::not_detected(DetectionMethod::HeadingAnalysis);
    }

    let sections = HierarchyBuilder::new(RangeStrategy::NextHeading, "heading", &config.hierarchy)
        .with_last_page(last_page)
        .build(&leveled);
    StructureResult::detected(sections, DetectionMethod::HeadingAnalysis, confidence)
}

/// Heading detection from raw font observations. Without observations
/// the detector is skipped and reports nothing.
pub fn detect_headings(
    observations: Option<&[FontObservation]>,
    config: &AnalyzerConfig,
    last_page: Option<u32>,
) -> StructureResult {
    let Some(observations) = observations.filter(|obs| !obs.is_empty()) else {
        debug!("no font observations, heading analysis skipped");
        return StructureResult::not_detected(DetectionMethod::HeadingAnalysis);
    };
    let candidates = candidates_from_observations(observations, &config.headings);
    detect_from_candidates(&candidates, config, last_page)
}
