//! In-text cross references between parts of a document.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReferenceKind {
    Reference,
    DiscussedIn,
    SeeAlso,
    CompareWith,
}

impl ReferenceKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReferenceKind::Reference => "reference",
            ReferenceKind::DiscussedIn => "discussed-in",
            ReferenceKind::SeeAlso => "see-also",
            ReferenceKind::CompareWith => "compare-with",
        }
    }
}

/// Exactly one locator, serialized as `{"chapter": "2"}`, `{"section": "3.1"}`
/// or `{"page": 45}`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReferenceTarget {
    Chapter(String),
    Section(String),
    Page(u32),
}

impl ReferenceTarget {
    /// Graph node key (`chapter:2`, `section:3.1`, `page:45`).
    pub fn key(&self) -> String {
        match self {
            ReferenceTarget::Chapter(chapter) => format!("chapter:{}", chapter),
            ReferenceTarget::Section(section) => format!("section:{}", section),
            ReferenceTarget::Page(page) => format!("page:{}", page),
        }
    }

    /// Locator equality, ignoring case and surrounding whitespace for the
    /// textual variants.
    pub fn matches(&self, other: &ReferenceTarget) -> bool {
        match (self, other) {
            (ReferenceTarget::Chapter(a), ReferenceTarget::Chapter(b))
            | (ReferenceTarget::Section(a), ReferenceTarget::Section(b)) => {
                a.trim().eq_ignore_ascii_case(b.trim())
            }
            (ReferenceTarget::Page(a), ReferenceTarget::Page(b)) => a == b,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReferenceSource {
    /// Estimated page of the referencing text.
    pub page: u32,
    pub matched_text: String,
    pub context: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CrossReference {
    pub from: ReferenceSource,
    pub to: ReferenceTarget,
    pub kind: ReferenceKind,
}
