//! Tunable thresholds for every detector.
//!
//! Defaults match the heuristics the detectors were calibrated with; a
//! partial config file only needs to name the values it changes.

use crate::error::{Result, StructureError};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalyzerConfig {
    pub toc: TocConfig,
    pub index: IndexConfig,
    pub headings: HeadingConfig,
    pub hierarchy: HierarchyConfig,
    pub cross_refs: CrossRefConfig,
    pub merge: MergeConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TocConfig {
    /// Share of the document, from the top, searched for a TOC.
    pub region_fraction: f64,
    /// Lower bound on the searched region for short documents.
    pub min_region_lines: usize,
    /// Leader/numbered lines required before a keyword is trusted.
    pub min_density_lines: usize,
    /// Parsed entries required for a positive detection.
    pub min_entries: usize,
    /// Blank lines tolerated inside the TOC before looking for its end.
    pub max_blank_run: usize,
    /// Lines inspected after a long blank run for a continuing entry.
    pub blank_lookahead: usize,
    /// Look-ahead window after the keyword line.
    pub max_toc_lines: usize,
    /// Consecutive non-entry text lines that end the TOC.
    pub max_unmatched_run: usize,
    /// Page numbers above this are treated as noise.
    pub max_page: u32,
}

impl Default for TocConfig {
    fn default() -> Self {
        Self {
            region_fraction: 0.2,
            min_region_lines: 200,
            min_density_lines: 5,
            min_entries: 3,
            max_blank_run: 3,
            blank_lookahead: 5,
            max_toc_lines: 400,
            max_unmatched_run: 12,
            max_page: 9999,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IndexConfig {
    /// Share of the document, from the bottom, searched for an index.
    pub region_fraction: f64,
    pub min_region_lines: usize,
    pub min_shaped_lines: usize,
    pub min_entries: usize,
    /// Leading spaces that mark a sub-entry. A tab counts as enough.
    pub sub_entry_indent: usize,
    pub max_page: u32,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            region_fraction: 0.2,
            min_region_lines: 200,
            min_shaped_lines: 20,
            min_entries: 10,
            sub_entry_indent: 2,
            max_page: 9999,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HeadingConfig {
    /// Texts seen more often than this are running headers or footers.
    pub max_repeats: usize,
    pub min_text_chars: usize,
    pub max_level: u8,
    /// Surviving candidates required for a positive detection.
    pub min_candidates: usize,
    /// Font height relative to body text that makes a line a candidate.
    pub heading_size_ratio: f32,
    /// Bold body-size lines longer than this are not headings.
    pub max_heading_chars: usize,
}

impl Default for HeadingConfig {
    fn default() -> Self {
        Self {
            max_repeats: 5,
            min_text_chars: 3,
            max_level: 6,
            min_candidates: 5,
            heading_size_ratio: 1.15,
            max_heading_chars: 120,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HierarchyConfig {
    /// Pages assumed for the last section when nothing follows it. This is
    /// an estimate; it is clamped to the last page when the page count is
    /// known.
    pub last_section_span: u32,
}

impl Default for HierarchyConfig {
    fn default() -> Self {
        Self {
            last_section_span: 10,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CrossRefConfig {
    /// Extraction stops once this many references were collected.
    pub max_references: usize,
    /// Approximate page size used when no page map is available.
    pub chars_per_page: usize,
    /// Width of the context window around each match.
    pub context_chars: usize,
    /// Pages per source bucket in the reference graph.
    pub graph_bucket_pages: u32,
}

impl Default for CrossRefConfig {
    fn default() -> Self {
        Self {
            max_references: 500,
            chars_per_page: 2000,
            context_chars: 100,
            graph_bucket_pages: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    /// Below this many sections the primary result yields to headings.
    pub sparse_threshold: usize,
    /// Above this many sections headings are ignored.
    pub rich_threshold: usize,
    pub outline_confidence: f64,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            sparse_threshold: 5,
            rich_threshold: 20,
            outline_confidence: 0.9,
        }
    }
}

impl AnalyzerConfig {
    /// Parses a JSON config, filling unspecified values with defaults.
    pub fn from_json(raw: &str) -> Result<Self> {
        let config: AnalyzerConfig = serde_json::from_str(raw)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        check_fraction("toc.region_fraction", self.toc.region_fraction)?;
        check_fraction("index.region_fraction", self.index.region_fraction)?;
        check_nonzero("toc.max_toc_lines", self.toc.max_toc_lines)?;
        check_nonzero("toc.min_entries", self.toc.min_entries)?;
        check_nonzero("index.min_entries", self.index.min_entries)?;
        check_nonzero("cross_refs.max_references", self.cross_refs.max_references)?;
        check_nonzero("cross_refs.chars_per_page", self.cross_refs.chars_per_page)?;

        if self.cross_refs.graph_bucket_pages == 0 {
            return Err(StructureError::InvalidConfig(
                "cross_refs.graph_bucket_pages must be >= 1".to_string(),
            ));
        }
        if self.headings.max_level == 0 {
            return Err(StructureError::InvalidConfig(
                "headings.max_level must be >= 1".to_string(),
            ));
        }
        if !(self.headings.heading_size_ratio.is_finite() && self.headings.heading_size_ratio > 0.0)
        {
            return Err(StructureError::InvalidConfig(format!(
                "headings.heading_size_ratio must be a positive number, got {}",
                self.headings.heading_size_ratio
            )));
        }
        if self.merge.sparse_threshold > self.merge.rich_threshold {
            return Err(StructureError::InvalidConfig(format!(
                "merge.sparse_threshold ({}) exceeds merge.rich_threshold ({})",
                self.merge.sparse_threshold, self.merge.rich_threshold
            )));
        }
        check_fraction("merge.outline_confidence", self.merge.outline_confidence)?;
        Ok(())
    }
}

fn check_fraction(name: &str, value: f64) -> Result<()> {
    if value > 0.0 && value <= 1.0 {
        Ok(())
    } else {
        Err(StructureError::InvalidConfig(format!(
            "{} must be in (0, 1], got {}",
            name, value
        )))
    }
}

fn check_nonzero(name: &str, value: usize) -> Result<()> {
    if value == 0 {
        Err(StructureError::InvalidConfig(format!("{} must be >= 1", name)))
    } else {
        Ok(())
    }
}
