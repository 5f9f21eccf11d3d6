//! Runs every detector over one document and merges their results.
//!
//! Each [`Detector`] is an independent unit of work over the immutable
//! input. [`Analyzer::analyze`] runs them in turn on the calling thread;
//! [`Analyzer::analyze_concurrently`] runs them as blocking tasks on the
//! tokio runtime and joins before the merge. Both produce the same result.

use crate::config::AnalyzerConfig;
use crate::error::{Result, StructureError};
use crate::headings::detect_headings;
use crate::index::{extract_index, IndexResult};
use crate::merge::merge;
use crate::outline::{sections_from_outline, validate_outline};
use crate::toc::detect_toc;
use crate::xref::extract_cross_references;
use folio_types::{
    CrossReference, FontObservation, OutlineNode, PageMap, Section, StructureResult,
};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// Everything the pipeline reads, already materialised in memory.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DocumentInput {
    pub text: String,
    #[serde(default)]
    pub outline: Option<Vec<OutlineNode>>,
    #[serde(default)]
    pub fonts: Option<Vec<FontObservation>>,
    #[serde(default)]
    pub page_map: Option<PageMap>,
}

impl DocumentInput {
    pub fn from_text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    pub fn with_outline(mut self, outline: Vec<OutlineNode>) -> Self {
        self.outline = Some(outline);
        self
    }

    pub fn with_fonts(mut self, fonts: Vec<FontObservation>) -> Self {
        self.fonts = Some(fonts);
        self
    }

    pub fn with_page_map(mut self, page_map: PageMap) -> Self {
        self.page_map = Some(page_map);
        self
    }

    /// Contract checks on the collaborator data. Absent structure is not an
    /// error, and unusable font lines or untitled bookmarks are dropped by
    /// their detectors; a page map or outline pointing at page 0 is.
    pub fn validate(&self) -> Result<()> {
        if let Some(map) = &self.page_map {
            if map.records().iter().any(|record| record.page_number == 0) {
                return Err(StructureError::InvalidInput(
                    "page map contains page 0".to_string(),
                ));
            }
        }
        if let Some(outline) = &self.outline {
            validate_outline(outline)?;
        }
        Ok(())
    }

    /// Last page of the document when the page map knows it.
    pub fn last_page(&self) -> Option<u32> {
        self.page_map
            .as_ref()
            .map(PageMap::page_count)
            .filter(|count| *count > 0)
    }
}

/// The independent units of work the merge waits on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Detector {
    TextToc,
    Outline,
    Headings,
    Index,
    CrossReferences,
}

impl Detector {
    pub const ALL: [Detector; 5] = [
        Detector::TextToc,
        Detector::Outline,
        Detector::Headings,
        Detector::Index,
        Detector::CrossReferences,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Detector::TextToc => "text-toc",
            Detector::Outline => "outline",
            Detector::Headings => "headings",
            Detector::Index => "index",
            Detector::CrossReferences => "cross-references",
        }
    }

    pub fn run(self, input: &DocumentInput, config: &AnalyzerConfig) -> Result<DetectorOutput> {
        let last_page = input.last_page();
        let output = match self {
            Detector::TextToc => DetectorOutput::TextToc(detect_toc(&input.text, config, last_page)),
            Detector::Outline => DetectorOutput::Outline(
                input
                    .outline
                    .as_deref()
                    .map(|nodes| sections_from_outline(nodes, config, last_page))
                    .transpose()?,
            ),
            Detector::Headings => DetectorOutput::Headings(detect_headings(
                input.fonts.as_deref(),
                config,
                last_page,
            )),
            Detector::Index => DetectorOutput::Index(extract_index(&input.text, &config.index)),
            Detector::CrossReferences => DetectorOutput::CrossReferences(extract_cross_references(
                &input.text,
                input.page_map.as_ref(),
                &config.cross_refs,
            )),
        };
        Ok(output)
    }
}

#[derive(Debug, Clone)]
pub enum DetectorOutput {
    TextToc(StructureResult),
    Outline(Option<Vec<Section>>),
    Headings(StructureResult),
    Index(IndexResult),
    CrossReferences(Vec<CrossReference>),
}

/// Detector outputs collected so far, in whatever order they arrive.
#[derive(Default)]
struct Collected {
    toc: Option<StructureResult>,
    outline: Option<Option<Vec<Section>>>,
    headings: Option<StructureResult>,
    index: Option<IndexResult>,
    cross_references: Option<Vec<CrossReference>>,
}

impl Collected {
    fn accept(&mut self, output: DetectorOutput) {
        match output {
            DetectorOutput::TextToc(result) => self.toc = Some(result),
            DetectorOutput::Outline(sections) => self.outline = Some(sections),
            DetectorOutput::Headings(result) => self.headings = Some(result),
            DetectorOutput::Index(result) => self.index = Some(result),
            DetectorOutput::CrossReferences(refs) => self.cross_references = Some(refs),
        }
    }

    fn finish(self, config: &AnalyzerConfig) -> Result<StructureResult> {
        let missing = |detector: Detector| {
            StructureError::TaskFailed(format!("{} did not report", detector.name()))
        };
        let toc = self.toc.ok_or_else(|| missing(Detector::TextToc))?;
        let outline = self.outline.ok_or_else(|| missing(Detector::Outline))?;
        let headings = self.headings.ok_or_else(|| missing(Detector::Headings))?;
        let index = self.index.ok_or_else(|| missing(Detector::Index))?;
        let cross_references = self
            .cross_references
            .ok_or_else(|| missing(Detector::CrossReferences))?;

        let mut result = merge(toc, outline, headings, &config.merge);
        result.index = index.detected.then_some(index.entries);
        result.cross_references = (!cross_references.is_empty()).then_some(cross_references);
        Ok(result)
    }
}

/// Entry point for structure inference over validated configuration.
#[derive(Debug, Clone, Default)]
pub struct Analyzer {
    config: AnalyzerConfig,
}

impl Analyzer {
    pub fn new(config: AnalyzerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    /// Runs every detector on the calling thread.
    pub fn analyze(&self, input: &DocumentInput) -> Result<StructureResult> {
        input.validate()?;
        let mut collected = Collected::default();
        for detector in Detector::ALL {
            collected.accept(detector.run(input, &self.config)?);
        }
        collected.finish(&self.config)
    }

    /// Runs the detectors concurrently and stops early with
    /// [`StructureError::Cancelled`] when `cancel` completes first.
    pub async fn analyze_concurrently<C>(
        &self,
        input: Arc<DocumentInput>,
        cancel: C,
    ) -> Result<StructureResult>
    where
        C: Future<Output = ()>,
    {
        input.validate()?;
        let config = Arc::new(self.config.clone());

        let mut tasks: JoinSet<Result<DetectorOutput>> = JoinSet::new();
        for detector in Detector::ALL {
            let input = Arc::clone(&input);
            let config = Arc::clone(&config);
            tasks.spawn_blocking(move || detector.run(&input, &config));
        }
        debug!(tasks = tasks.len(), "detectors started");

        tokio::pin!(cancel);
        let mut collected = Collected::default();
        loop {
            tokio::select! {
                biased;
                () = &mut cancel => {
                    warn!("structure analysis cancelled");
                    tasks.abort_all();
                    return Err(StructureError::Cancelled);
                }
                joined = tasks.join_next() => match joined {
                    Some(Ok(output)) => collected.accept(output?),
                    Some(Err(err)) => {
                        tasks.abort_all();
                        return Err(StructureError::TaskFailed(err.to_string()));
                    }
                    None => break,
                },
            }
        }

        collected.finish(&config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::PageRecord;

    fn observation(text: &str, page: u32, font_height: f32) -> FontObservation {
        FontObservation {
            text: text.to_string(),
            page,
            font_height,
            font_name: String::new(),
        }
    }

    #[test]
    fn test_unusable_font_lines_are_dropped() {
        let mut fonts: Vec<FontObservation> = (1..=8)
            .map(|page| observation(&format!("Chapter {} Opening", page), page, 18.0))
            .collect();
        for page in 1..=8 {
            fonts.push(observation(
                "Body text that runs on for a good while on every page.",
                page,
                10.0,
            ));
        }
        fonts.push(observation("", 3, 0.0));
        fonts.push(observation("Broken metrics", 4, f32::NAN));
        fonts.push(observation("Nowhere", 0, 18.0));

        let input = DocumentInput::from_text("body").with_fonts(fonts);
        let result = Analyzer::default().analyze(&input).unwrap();
        assert!(result.detected);
        assert_eq!(result.sections.len(), 8);
    }

    #[test]
    fn test_rejects_page_zero_in_page_map() {
        let input = DocumentInput::from_text("body").with_page_map(PageMap::new(vec![PageRecord {
            page_number: 0,
            start_offset: 0,
            end_offset: 4,
        }]));
        assert!(input.validate().is_err());
    }

    #[test]
    fn test_invalid_config_rejected() {
        let mut config = AnalyzerConfig::default();
        config.cross_refs.chars_per_page = 0;
        assert!(matches!(
            Analyzer::new(config),
            Err(StructureError::InvalidConfig(_))
        ));
    }

    #[test]
    fn test_plain_prose_detects_nothing() {
        let input = DocumentInput::from_text("Just a paragraph of text.\nAnother one.");
        let result = Analyzer::default().analyze(&input).unwrap();
        assert!(!result.detected);
        assert!(result.index.is_none());
        assert!(result.cross_references.is_none());
    }

    #[test]
    fn test_last_page_from_page_map() {
        let input = DocumentInput::from_text("a").with_page_map(PageMap::new(vec![
            PageRecord {
                page_number: 1,
                start_offset: 0,
                end_offset: 1,
            },
            PageRecord {
                page_number: 2,
                start_offset: 3,
                end_offset: 4,
            },
        ]));
        assert_eq!(input.last_page(), Some(2));
        assert_eq!(DocumentInput::from_text("a").last_page(), None);
    }
}
