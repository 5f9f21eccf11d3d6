//! The structure result handed to downstream consumers, plus its
//! Markdown and LLM-oriented JSON renderings.

use crate::index::IndexEntry;
use crate::reference::CrossReference;
use crate::section::{count_sections, walk_forest, Provenance, Section};
use serde::{Deserialize, Serialize};
use serde_json::json;

/// Which source produced the canonical hierarchy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DetectionMethod {
    TextParsing,
    ExternalOutline,
    HeadingAnalysis,
    #[default]
    None,
}

impl DetectionMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetectionMethod::TextParsing => "text-parsing",
            DetectionMethod::ExternalOutline => "external-outline",
            DetectionMethod::HeadingAnalysis => "heading-analysis",
            DetectionMethod::None => "none",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructureResult {
    pub detected: bool,
    pub sections: Vec<Section>,
    pub detection_method: DetectionMethod,
    /// Heuristic trust score in `[0, 1]`.
    pub confidence: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub index: Option<Vec<IndexEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cross_references: Option<Vec<CrossReference>>,
}

impl StructureResult {
    /// The "nothing found" result for a given source.
    pub fn not_detected(detection_method: DetectionMethod) -> Self {
        Self {
            detection_method,
            ..Self::default()
        }
    }

    pub fn detected(sections: Vec<Section>, detection_method: DetectionMethod, confidence: f64) -> Self {
        Self {
            detected: true,
            sections,
            detection_method,
            confidence: confidence.clamp(0.0, 1.0),
            index: None,
            cross_references: None,
        }
    }

    /// Top-level plus nested section count.
    pub fn section_count(&self) -> usize {
        count_sections(&self.sections)
    }

    /// Attributes a page to its chapter and deepest enclosing section.
    pub fn locate(&self, page: u32) -> Option<Provenance> {
        let chapter = self
            .sections
            .iter()
            .find(|section| section.page_range.contains(page))?;

        let mut deepest = chapter;
        while let Some(child) = deepest
            .children
            .iter()
            .find(|child| child.page_range.contains(page))
        {
            deepest = child;
        }

        Some(Provenance {
            chapter: chapter.title.clone(),
            section: (deepest.id != chapter.id).then(|| deepest.title.clone()),
            page_range: deepest.page_range,
        })
    }

    /// Sorted, deduplicated start pages of every section.
    pub fn section_boundaries(&self) -> Vec<u32> {
        let mut pages: Vec<u32> = walk_forest(&self.sections)
            .map(|(_, section)| section.page_range.start)
            .collect();
        pages.sort_unstable();
        pages.dedup();
        pages
    }

    /// Converts the result to a Markdown outline.
    pub fn to_markdown(&self) -> String {
        let mut out = String::new();
        out.push_str("# Document structure\n\n");
        out.push_str(&format!(
            "Detected: {} (method: {}, confidence: {:.2})\n\n",
            if self.detected { "yes" } else { "no" },
            self.detection_method.as_str(),
            self.confidence
        ));

        for (depth, section) in walk_forest(&self.sections) {
            out.push_str(&"  ".repeat(depth - 1));
            out.push_str(&format!(
                "- {} (pp. {}-{})\n",
                section.title, section.page_range.start, section.page_range.end
            ));
        }

        if let Some(index) = &self.index {
            out.push_str("\n## Index\n\n");
            for entry in index {
                let pages = entry
                    .pages
                    .iter()
                    .map(|page| page.to_string())
                    .collect::<Vec<_>>()
                    .join(", ");
                out.push_str(&format!("- {}: {}\n", entry.term, pages));
                for sub in &entry.sub_entries {
                    out.push_str(&format!("  - {}\n", sub));
                }
            }
        }

        if let Some(references) = &self.cross_references {
            out.push_str("\n## Cross references\n\n");
            for reference in references {
                out.push_str(&format!(
                    "- p. {} \"{}\" -> {} ({})\n",
                    reference.from.page,
                    reference.from.matched_text,
                    reference.to.key(),
                    reference.kind.as_str()
                ));
            }
        }

        out
    }

    /// Converts the result to a flat JSON layout for LLM prompts.
    ///
    /// Each section becomes one element with its depth, title, page range
    /// and parent id; `metadata` carries the detection summary.
    pub fn to_llm_json(&self) -> serde_json::Value {
        let sections = walk_forest(&self.sections)
            .map(|(depth, section)| {
                json!({
                    "id": section.id,
                    "title": section.title,
                    "depth": depth,
                    "pageStart": section.page_range.start,
                    "pageEnd": section.page_range.end,
                    "parentId": section.parent_id,
                })
            })
            .collect::<Vec<_>>();

        json!({
            "sections": sections,
            "metadata": {
                "detected": self.detected,
                "detectionMethod": self.detection_method.as_str(),
                "confidence": self.confidence,
                "sectionCount": self.section_count(),
                "indexEntries": self.index.as_ref().map_or(0, Vec::len),
                "crossReferences": self.cross_references.as_ref().map_or(0, Vec::len),
            }
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::section::PageRange;

    fn result() -> StructureResult {
        let mut chapter = Section::new("toc-1", "Chapter 1", 1, PageRange::new(1, 20));
        let mut basics = Section::new("toc-1.1", "Basics", 2, PageRange::new(1, 9));
        basics.parent_id = Some("toc-1".to_string());
        let mut advanced = Section::new("toc-1.2", "Advanced", 2, PageRange::new(10, 20));
        advanced.parent_id = Some("toc-1".to_string());
        chapter.children = vec![basics, advanced];
        let appendix = Section::new("toc-2", "Appendix", 1, PageRange::new(21, 25));
        StructureResult::detected(vec![chapter, appendix], DetectionMethod::TextParsing, 0.8)
    }

    #[test]
    fn test_locate_finds_deepest_section() {
        let result = result();
        let provenance = result.locate(12).unwrap();
        assert_eq!(provenance.chapter, "Chapter 1");
        assert_eq!(provenance.section.as_deref(), Some("Advanced"));
        assert_eq!(provenance.page_range, PageRange::new(10, 20));

        let provenance = result.locate(22).unwrap();
        assert_eq!(provenance.chapter, "Appendix");
        assert!(provenance.section.is_none());

        assert!(result.locate(99).is_none());
    }

    #[test]
    fn test_section_boundaries_are_unique() {
        assert_eq!(result().section_boundaries(), vec![1, 10, 21]);
    }

    #[test]
    fn test_confidence_is_clamped() {
        let result = StructureResult::detected(Vec::new(), DetectionMethod::HeadingAnalysis, 1.7);
        assert!((result.confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_markdown_outline_indents_children() {
        let markdown = result().to_markdown();
        assert!(markdown.contains("- Chapter 1 (pp. 1-20)\n  - Basics (pp. 1-9)\n"));
        assert!(markdown.contains("method: text-parsing"));
    }

    #[test]
    fn test_llm_json_metadata() {
        let json = result().to_llm_json();
        assert_eq!(json["metadata"]["sectionCount"], 4);
        assert_eq!(json["metadata"]["detectionMethod"], "text-parsing");
        assert_eq!(json["sections"][1]["depth"], 2);
        assert_eq!(json["sections"][1]["parentId"], "toc-1");
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(result()).unwrap();
        assert_eq!(json["detectionMethod"], "text-parsing");
        assert!(json.get("index").is_none());
    }
}
