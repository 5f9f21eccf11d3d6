//! Back-of-book index entries.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexEntry {
    pub term: String,
    /// Strictly ascending, no duplicates.
    pub pages: Vec<u32>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub sub_entries: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub see_also: Option<Vec<String>>,
    pub is_main_entry: bool,
}

impl IndexEntry {
    pub fn main(term: impl Into<String>) -> Self {
        Self {
            term: term.into(),
            is_main_entry: true,
            ..Self::default()
        }
    }

    /// Case-insensitive substring match over the term and its sub-entries.
    /// `needle` must already be lowercase.
    pub fn matches_lowercase(&self, needle: &str) -> bool {
        self.term.to_lowercase().contains(needle)
            || self
                .sub_entries
                .iter()
                .any(|sub| sub.to_lowercase().contains(needle))
    }

    /// Bucket key for alphabetical grouping: the uppercased first letter, or
    /// `#` for terms starting with anything else.
    pub fn bucket(&self) -> char {
        match self.term.chars().next() {
            Some(ch) if ch.is_alphabetic() => ch.to_uppercase().next().unwrap_or(ch),
            _ => '#',
        }
    }
}
