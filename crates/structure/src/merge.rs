//! Reconciles the candidate hierarchies into one canonical result.
//!
//! Precedence lives in two small functions: [`select_primary`] picks
//! between the text TOC and a supplied outline, [`merge_with_headings`]
//! decides whether font-derived headings replace that primary.

use crate::config::MergeConfig;
use folio_types::{count_sections, DetectionMethod, Section, StructureResult};
use tracing::{debug, info};

/// Outcome of the TOC-versus-outline decision, tagged by its source.
#[derive(Debug, Clone, PartialEq)]
pub enum Primary {
    /// The text TOC is detected and more detailed than the outline.
    TextToc(StructureResult),
    /// A non-empty supplied outline.
    Outline(Vec<Section>),
    /// Nothing better: the text TOC result as it came out of the detector.
    TocFallback(StructureResult),
}

impl Primary {
    pub fn method(&self) -> DetectionMethod {
        match self {
            Primary::TextToc(result) | Primary::TocFallback(result) => result.detection_method,
            Primary::Outline(_) => DetectionMethod::ExternalOutline,
        }
    }

    pub fn into_result(self, config: &MergeConfig) -> StructureResult {
        match self {
            Primary::TextToc(result) | Primary::TocFallback(result) => result,
            Primary::Outline(sections) => StructureResult::detected(
                sections,
                DetectionMethod::ExternalOutline,
                config.outline_confidence,
            ),
        }
    }
}

pub fn select_primary(toc: StructureResult, outline: Option<Vec<Section>>) -> Primary {
    let outline = outline.filter(|sections| !sections.is_empty());
    let outline_count = outline.as_deref().map_or(0, count_sections);

    if toc.detected && toc.section_count() > outline_count {
        debug!(
            toc_sections = toc.section_count(),
            outline_sections = outline_count,
            "text TOC preferred over outline"
        );
        return Primary::TextToc(toc);
    }
    match outline {
        Some(sections) => Primary::Outline(sections),
        None => Primary::TocFallback(toc),
    }
}

/// Lets heading analysis rescue a sparse primary. A primary with fewer
/// than `sparse_threshold` sections is replaced by a detected heading
/// result; anything denser keeps the primary.
pub fn merge_with_headings(
    primary: StructureResult,
    headings: StructureResult,
    config: &MergeConfig,
) -> StructureResult {
    let primary_count = primary.section_count();

    if primary_count > config.rich_threshold {
        return primary;
    }
    if primary_count < config.sparse_threshold && headings.detected {
        debug!(
            primary_sections = primary_count,
            heading_sections = headings.section_count(),
            "sparse primary replaced by headings"
        );
        return headings;
    }
    primary
}

/// Full merge: primary selection, then the heading rescue.
pub fn merge(
    toc: StructureResult,
    outline: Option<Vec<Section>>,
    headings: StructureResult,
    config: &MergeConfig,
) -> StructureResult {
    let primary = select_primary(toc, outline).into_result(config);
    let merged = merge_with_headings(primary, headings, config);
    info!(
        detection_method = merged.detection_method.as_str(),
        detected = merged.detected,
        sections = merged.section_count(),
        confidence = merged.confidence,
        "structure merged"
    );
    merged
}
