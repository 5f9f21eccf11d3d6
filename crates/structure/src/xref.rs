//! In-text cross references ("see Chapter 3", "cf. Section 2.1").
//!
//! The body is scanned line by line in document order with the
//! [`XREF_RULES`] families. Within a line a span claimed by an earlier
//! family is not matched again; across lines nothing is deduplicated.

use crate::cascade::{group, Rule};
use crate::config::CrossRefConfig;
use folio_types::{CrossReference, PageMap, ReferenceKind, ReferenceSource, ReferenceTarget};
use indexmap::IndexMap;
use lazy_static::lazy_static;
use regex::Captures;
use std::ops::Range;
use tracing::debug;

type Found = (ReferenceKind, ReferenceTarget);

lazy_static! {
    /// Pattern families, in priority order.
    pub static ref XREF_RULES: Vec<Rule<Found>> = vec![
        Rule::new(
            "see-chapter",
            r"(?i)\b(?:see|refer\s+to)\s+chapter\s+(\d+|(?-i:[IVXLCDM]+))\b",
            |caps| chapter(caps, ReferenceKind::Reference),
        ),
        Rule::new(
            "see-section",
            r"(?i)\b(?:see|refer\s+to)\s+section\s+(\d+(?:\.\d+)*)",
            |caps| section(caps, ReferenceKind::Reference),
        ),
        Rule::new(
            "see-page",
            r"(?i)\b(?:see|refer\s+to)\s+(?:page\s+|p\.\s*)(\d{1,4})\b",
            |caps| page(caps, ReferenceKind::Reference),
        ),
        Rule::new(
            "discussed-in",
            r"(?i)\b(?:as\s+discussed|mentioned)\s+in\s+chapter\s+(\d+|(?-i:[IVXLCDM]+))\b",
            |caps| chapter(caps, ReferenceKind::DiscussedIn),
        ),
        Rule::new(
            "see-also-chapter",
            r"(?i)\bsee\s+also\s+chapter\s+(\d+|(?-i:[IVXLCDM]+))\b",
            |caps| chapter(caps, ReferenceKind::SeeAlso),
        ),
        Rule::new(
            "compare-section",
            r"(?i)(?:\bcompare\s+with|\bcf\.)\s*section\s+(\d+(?:\.\d+)*)",
            |caps| section(caps, ReferenceKind::CompareWith),
        ),
        Rule::new(
            "parenthetical-chapter",
            r"(?i)\(\s*(?:see\s+)?chapter\s+(\d+|(?-i:[IVXLCDM]+))\s*\)",
            |caps| chapter(caps, ReferenceKind::Reference),
        ),
    ];
}

fn chapter(caps: &Captures<'_>, kind: ReferenceKind) -> Option<Found> {
    Some((kind, ReferenceTarget::Chapter(group(caps, 1).to_string())))
}

fn section(caps: &Captures<'_>, kind: ReferenceKind) -> Option<Found> {
    let number = group(caps, 1).trim_end_matches('.');
    (!number.is_empty()).then(|| (kind, ReferenceTarget::Section(number.to_string())))
}

fn page(caps: &Captures<'_>, kind: ReferenceKind) -> Option<Found> {
    let page: u32 = group(caps, 1).parse().ok()?;
    (page >= 1).then_some((kind, ReferenceTarget::Page(page)))
}

/// Cross-reference extractor. Source pages come from the page map when one
/// is attached, otherwise from a fixed characters-per-page estimate.
#[derive(Debug, Clone, Default)]
pub struct CrossRefExtractor<'m> {
    config: CrossRefConfig,
    page_map: Option<&'m PageMap>,
}

impl<'m> CrossRefExtractor<'m> {
    pub fn new(config: CrossRefConfig) -> Self {
        Self {
            config,
            page_map: None,
        }
    }

    pub fn with_page_map(mut self, page_map: Option<&'m PageMap>) -> Self {
        self.page_map = page_map.filter(|map| !map.is_empty());
        self
    }

    pub fn extract(&self, text: &str) -> Vec<CrossReference> {
        let cap = self.config.max_references;
        let mut references = Vec::new();
        let mut line_byte_start = 0;
        let mut line_char_start = 0;

        'lines: for line in text.split('\n') {
            for (span, (kind, target)) in scan_line(line) {
                if references.len() >= cap {
                    break 'lines;
                }
                let char_offset = line_char_start + line[..span.start].chars().count();
                let absolute = line_byte_start + span.start..line_byte_start + span.end;
                references.push(CrossReference {
                    from: ReferenceSource {
                        page: self.page_of(char_offset),
                        matched_text: line[span].trim().to_string(),
                        context: context_window(text, absolute, self.config.context_chars),
                    },
                    to: target,
                    kind,
                });
            }
            line_byte_start += line.len() + 1;
            line_char_start += line.chars().count() + 1;
        }

        debug!(
            references = references.len(),
            capped = references.len() >= cap,
            exact_pages = self.page_map.is_some(),
            "cross-reference extraction finished"
        );
        references
    }

    fn page_of(&self, char_offset: usize) -> u32 {
        if let Some(page) = self.page_map.and_then(|map| map.page_at(char_offset)) {
            return page;
        }
        let estimate = char_offset / self.config.chars_per_page.max(1) + 1;
        u32::try_from(estimate).unwrap_or(u32::MAX)
    }
}

/// Matches of every family in one line, overlaps resolved in family
/// order and returned left to right.
fn scan_line(line: &str) -> Vec<(Range<usize>, Found)> {
    let mut claimed: Vec<(Range<usize>, Found)> = Vec::new();
    for rule in XREF_RULES.iter() {
        for (span, found) in rule.apply_all(line) {
            let overlaps = claimed
                .iter()
                .any(|(taken, _)| span.start < taken.end && taken.start < span.end);
            if !overlaps {
                claimed.push((span, found));
            }
        }
    }
    claimed.sort_by_key(|(span, _)| span.start);
    claimed
}

/// About `width` characters centred on the match, whitespace collapsed.
fn context_window(text: &str, span: Range<usize>, width: usize) -> String {
    let half = width / 2;
    let left = text[..span.start]
        .char_indices()
        .rev()
        .take(half)
        .last()
        .map_or(span.start, |(idx, _)| idx);
    let right = text[span.end..]
        .char_indices()
        .nth(half)
        .map_or(text.len(), |(idx, _)| span.end + idx);
    text[left..right].split_whitespace().collect::<Vec<_>>().join(" ")
}

pub fn extract_cross_references(
    text: &str,
    page_map: Option<&PageMap>,
    config: &CrossRefConfig,
) -> Vec<CrossReference> {
    CrossRefExtractor::new(config.clone())
        .with_page_map(page_map)
        .extract(text)
}

/// All references pointing at `target`.
pub fn find_references<'a>(
    references: &'a [CrossReference],
    target: &ReferenceTarget,
) -> Vec<&'a CrossReference> {
    references
        .iter()
        .filter(|reference| reference.to.matches(target))
        .collect()
}

/// Collapses references into `page:<bucket start>` → target keys, both in
/// first-seen order. Repeated targets stay repeated.
pub fn build_graph(references: &[CrossReference], bucket_pages: u32) -> IndexMap<String, Vec<String>> {
    let bucket_pages = bucket_pages.max(1);
    let mut graph: IndexMap<String, Vec<String>> = IndexMap::new();
    for reference in references {
        let page = reference.from.page.max(1);
        let bucket = (page - 1) / bucket_pages * bucket_pages + 1;
        graph
            .entry(format!("page:{}", bucket))
            .or_default()
            .push(reference.to.key());
    }
    graph
}
