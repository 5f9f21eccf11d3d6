//! Shapes of the data handed over by the text-extraction and
//! text-layout collaborators.

use serde::{Deserialize, Serialize};

/// One node of an embedded outline (bookmarks), already page-resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineNode {
    pub title: String,
    pub page_number: u32,
    #[serde(default)]
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    pub fn new(title: impl Into<String>, page_number: u32) -> Self {
        Self {
            title: title.into(),
            page_number,
            children: Vec::new(),
        }
    }

    pub fn with_children(mut self, children: Vec<OutlineNode>) -> Self {
        self.children = children;
        self
    }
}

/// A single rendered line with its font metrics.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FontObservation {
    pub text: String,
    pub page: u32,
    pub font_height: f32,
    #[serde(default)]
    pub font_name: String,
}

/// Per-page record emitted by the text extractor. Offsets are character
/// offsets into the concatenated document text, `end_offset` exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageRecord {
    pub page_number: u32,
    pub start_offset: usize,
    pub end_offset: usize,
}

/// Character offset to page lookup. Serialized as the bare record list;
/// deserializing goes through [`PageMap::new`] so records are always sorted.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Vec<PageRecord>", into = "Vec<PageRecord>")]
pub struct PageMap {
    records: Vec<PageRecord>,
}

impl From<Vec<PageRecord>> for PageMap {
    fn from(records: Vec<PageRecord>) -> Self {
        Self::new(records)
    }
}

impl From<PageMap> for Vec<PageRecord> {
    fn from(map: PageMap) -> Self {
        map.records
    }
}

impl PageMap {
    pub fn new(mut records: Vec<PageRecord>) -> Self {
        records.sort_by_key(|record| record.start_offset);
        Self { records }
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn records(&self) -> &[PageRecord] {
        &self.records
    }

    /// Highest page number known to the map.
    pub fn page_count(&self) -> u32 {
        self.records
            .iter()
            .map(|record| record.page_number)
            .max()
            .unwrap_or(0)
    }

    /// Page holding the given character offset. Offsets that fall in the gap
    /// between two pages belong to the earlier page; offsets before the first
    /// page belong to the first page.
    pub fn page_at(&self, offset: usize) -> Option<u32> {
        let first = self.records.first()?;
        let idx = self
            .records
            .partition_point(|record| record.start_offset <= offset);
        if idx == 0 {
            return Some(first.page_number);
        }
        Some(self.records[idx - 1].page_number)
    }
}

/// JSON document written by the extraction script:
/// `{ "success": true, "text": "...", "pageCount": 3, "pages": [...] }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ExtractedDocument {
    #[serde(default = "default_success")]
    pub success: bool,
    #[serde(default)]
    pub text: String,
    #[serde(default)]
    pub page_count: Option<u32>,
    #[serde(default)]
    pub pages: Vec<PageRecord>,
    #[serde(default)]
    pub error: Option<String>,
}

fn default_success() -> bool {
    true
}

impl ExtractedDocument {
    pub fn page_map(&self) -> Option<PageMap> {
        if self.pages.is_empty() {
            None
        } else {
            Some(PageMap::new(self.pages.clone()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(page_number: u32, start_offset: usize, end_offset: usize) -> PageRecord {
        PageRecord {
            page_number,
            start_offset,
            end_offset,
        }
    }

    #[test]
    fn test_page_at_uses_start_offsets() {
        let map = PageMap::new(vec![record(2, 100, 198), record(1, 0, 98), record(3, 200, 250)]);
        assert_eq!(map.page_at(0), Some(1));
        assert_eq!(map.page_at(97), Some(1));
        assert_eq!(map.page_at(99), Some(1));
        assert_eq!(map.page_at(100), Some(2));
        assert_eq!(map.page_at(10_000), Some(3));
        assert_eq!(map.page_count(), 3);
    }

    #[test]
    fn test_deserialized_map_is_sorted() {
        let raw = r#"[
            {"pageNumber": 3, "startOffset": 200, "endOffset": 250},
            {"pageNumber": 1, "startOffset": 0, "endOffset": 98},
            {"pageNumber": 2, "startOffset": 100, "endOffset": 198}
        ]"#;
        let map: PageMap = serde_json::from_str(raw).unwrap();
        assert_eq!(map.page_at(50), Some(1));
        assert_eq!(map.page_at(150), Some(2));
        assert_eq!(map.page_at(220), Some(3));

        let json = serde_json::to_value(&map).unwrap();
        assert_eq!(json[0]["pageNumber"], 1);
        assert_eq!(serde_json::from_value::<PageMap>(json).unwrap(), map);
    }

    #[test]
    fn test_empty_map_has_no_pages() {
        let map = PageMap::default();
        assert!(map.page_at(5).is_none());
        assert_eq!(map.page_count(), 0);
    }

    #[test]
    fn test_extracted_document_parses_script_output() {
        let raw = r#"{
            "success": true,
            "text": "a\n\nb",
            "pageCount": 2,
            "pages": [
                {"pageNumber": 1, "text": "a", "startOffset": 0, "endOffset": 1},
                {"pageNumber": 2, "text": "b", "startOffset": 3, "endOffset": 4}
            ],
            "method": "pymupdf"
        }"#;
        let doc: ExtractedDocument = serde_json::from_str(raw).unwrap();
        assert!(doc.success);
        assert_eq!(doc.page_count, Some(2));
        let map = doc.page_map().unwrap();
        assert_eq!(map.page_at(3), Some(2));
    }

    #[test]
    fn test_outline_children_default_to_empty() {
        let node: OutlineNode =
            serde_json::from_str(r#"{"title": "Intro", "pageNumber": 1}"#).unwrap();
        assert!(node.children.is_empty());
    }
}
