//! Conversion of an embedded outline (bookmarks) into sections.

use crate::config::AnalyzerConfig;
use crate::error::{Result, StructureError};
use crate::hierarchy::{HierarchyBuilder, RangeStrategy};
use folio_types::{LeveledHeading, OutlineNode, Section};
use tracing::{debug, trace};

/// Rejects nodes that point at page 0.
pub fn validate_outline(nodes: &[OutlineNode]) -> Result<()> {
    for node in nodes {
        if node.page_number == 0 {
            return Err(StructureError::InvalidOutline(format!(
                "entry '{}' points at page 0",
                node.title.trim()
            )));
        }
        validate_outline(&node.children)?;
    }
    Ok(())
}

/// Pre-order flattening; nesting depth becomes the heading level. A node
/// with an empty title is dropped and its children take its depth.
fn flatten(nodes: &[OutlineNode], depth: u8, out: &mut Vec<LeveledHeading>) {
    for node in nodes {
        let title = node.title.trim();
        if title.is_empty() {
            trace!(page = node.page_number, "skipping untitled outline entry");
            flatten(&node.children, depth, out);
            continue;
        }
        out.push(LeveledHeading::new(title, node.page_number, depth));
        flatten(&node.children, depth.saturating_add(1), out);
    }
}

/// Builds outline sections with sibling-aware page ranges, so a bookmark's
/// range runs up to its next sibling rather than its first child.
pub fn sections_from_outline(
    nodes: &[OutlineNode],
    config: &AnalyzerConfig,
    last_page: Option<u32>,
) -> Result<Vec<Section>> {
    validate_outline(nodes)?;

    let mut headings = Vec::new();
    flatten(nodes, 1, &mut headings);
    let sections = HierarchyBuilder::new(
        RangeStrategy::NextSiblingOrShallower,
        "outline",
        &config.hierarchy,
    )
    .with_last_page(last_page)
    .build(&headings);

    debug!(
        entries = headings.len(),
        roots = sections.len(),
        "outline converted"
    );
    Ok(sections)
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_types::PageRange;

    fn book() -> Vec<OutlineNode> {
        vec![
            OutlineNode::new("Preface", 1),
            OutlineNode::new("Cells", 3).with_children(vec![
                OutlineNode::new("Membranes", 4),
                OutlineNode::new("Organelles", 8),
            ]),
            OutlineNode::new("Tissues", 15),
        ]
    }

    #[test]
    fn test_outline_sections_and_ranges() {
        let sections = sections_from_outline(&book(), &AnalyzerConfig::default(), Some(30)).unwrap();
        assert_eq!(sections.len(), 3);

        let cells = &sections[1];
        assert_eq!(cells.id, "outline-2");
        assert_eq!(cells.page_range, PageRange::new(3, 14));
        assert_eq!(cells.children[0].page_range, PageRange::new(4, 7));
        assert_eq!(cells.children[1].page_range, PageRange::new(8, 14));
        assert_eq!(cells.children[1].level, 2);
        assert_eq!(sections[2].page_range, PageRange::new(15, 25));
    }

    #[test]
    fn test_rejects_page_zero() {
        let nodes = vec![OutlineNode::new("Cells", 3).with_children(vec![OutlineNode::new("Bad", 0)])];
        let err = sections_from_outline(&nodes, &AnalyzerConfig::default(), None).unwrap_err();
        assert!(matches!(err, StructureError::InvalidOutline(_)));
    }

    #[test]
    fn test_untitled_entries_are_skipped() {
        let nodes = vec![
            OutlineNode::new("Cells", 1),
            OutlineNode::new("", 4).with_children(vec![OutlineNode::new("Membranes", 5)]),
            OutlineNode::new("Tissues", 9),
        ];
        assert!(validate_outline(&nodes).is_ok());

        let sections = sections_from_outline(&nodes, &AnalyzerConfig::default(), None).unwrap();
        let titles: Vec<&str> = sections.iter().map(|section| section.title.as_str()).collect();
        assert_eq!(titles, vec!["Cells", "Membranes", "Tissues"]);
        assert_eq!(sections[1].level, 1);
        assert_eq!(sections[0].page_range, PageRange::new(1, 4));
    }

    #[test]
    fn test_empty_outline_yields_no_sections() {
        let sections = sections_from_outline(&[], &AnalyzerConfig::default(), None).unwrap();
        assert!(sections.is_empty());
    }
}
