//! Section tree nodes and page ranges.

use serde::{Deserialize, Serialize};

/// Inclusive page bounds. `end` is never smaller than `start`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    /// Builds a range, raising `end` to `start` when it would fall below it.
    pub fn new(start: u32, end: u32) -> Self {
        Self {
            start,
            end: end.max(start),
        }
    }

    pub fn single(page: u32) -> Self {
        Self {
            start: page,
            end: page,
        }
    }

    pub fn contains(&self, page: u32) -> bool {
        page >= self.start && page <= self.end
    }

    pub fn encloses(&self, other: &PageRange) -> bool {
        other.start >= self.start && other.end <= self.end
    }

    /// Number of pages covered, counting both bounds. An inverted range
    /// (possible through deserialization) counts as one page.
    pub fn span(&self) -> u32 {
        self.end.saturating_sub(self.start).saturating_add(1)
    }
}

/// A node in the canonical hierarchy.
///
/// `level` is the 1-based depth of the node in its tree. `parent_id` is a
/// plain back-reference by id; ownership always flows through `children`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    pub id: String,
    pub title: String,
    pub level: u8,
    pub page_range: PageRange,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<Section>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_id: Option<String>,
}

impl Section {
    pub fn new(id: impl Into<String>, title: impl AsRef<str>, level: u8, page_range: PageRange) -> Self {
        Self {
            id: id.into(),
            title: title.as_ref().trim().to_string(),
            level,
            page_range,
            children: Vec::new(),
            parent_id: None,
        }
    }

    /// Number of sections in this subtree, including `self`.
    pub fn count(&self) -> usize {
        1 + self.children.iter().map(Section::count).sum::<usize>()
    }

    /// Estimated size of the section in pages.
    pub fn page_count(&self) -> u32 {
        self.page_range.span()
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    /// Pre-order walk over this subtree yielding `(depth, section)`, where
    /// `self` has depth 1.
    pub fn walk(&self) -> SectionWalk<'_> {
        SectionWalk {
            stack: vec![(1, self)],
        }
    }
}

/// Total number of sections in a forest.
pub fn count_sections(sections: &[Section]) -> usize {
    sections.iter().map(Section::count).sum()
}

/// Pre-order walk over a whole forest.
pub fn walk_forest(sections: &[Section]) -> impl Iterator<Item = (usize, &Section)> {
    sections.iter().flat_map(Section::walk)
}

/// Iterator returned by [`Section::walk`].
pub struct SectionWalk<'a> {
    stack: Vec<(usize, &'a Section)>,
}

impl<'a> Iterator for SectionWalk<'a> {
    type Item = (usize, &'a Section);

    fn next(&mut self) -> Option<Self::Item> {
        let (depth, section) = self.stack.pop()?;
        for child in section.children.iter().rev() {
            self.stack.push((depth + 1, child));
        }
        Some((depth, section))
    }
}

/// The `{chapter, section, pageRange}` tuple used to attribute generated
/// content back to a location in the document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Provenance {
    pub chapter: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section: Option<String>,
    pub page_range: PageRange,
}
