//! Back-of-book index extraction.
//!
//! Only the closing region of the document is inspected. An index heading
//! plus enough index-shaped lines confirm the index; each line is then
//! parsed with [`INDEX_RULES`] and indented lines are folded into the main
//! entry above them.

use crate::cascade::{first_match, group, Rule};
use crate::config::IndexConfig;
use crate::text::{indent_width, is_blank, region_len};
use folio_types::{IndexEntry, PageRange};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use tracing::{debug, trace};

/// Longest pageless line still taken as a main term heading.
const MAX_BARE_TERM_CHARS: usize = 80;

lazy_static! {
    static ref INDEX_KEYWORD: Regex = Regex::new(
        r"(?i)^\s*(?:(?:(?:general|subject|author|name)\s+index)|index(?:\s+of\s+[a-z ]+)?|register|[ií]ndice\s+alfab[eé]tico)\s*$"
    )
    .unwrap();

    static ref PAGE_TOKEN: Regex = Regex::new(r"^\d{1,4}$").unwrap();

    /// Per-line cascade: cross-reference forms first, then comma list,
    /// leader dots and finally the space-separated form.
    pub static ref INDEX_RULES: Vec<Rule<IndexLine>> = vec![
        Rule::new("see-also", r"(?i)^\s*(.+?),?\s+see\s+also\s+(.+?)\.?\s*$", see_line),
        Rule::new("see", r"(?i)^\s*(.+?),\s*see\s+(.+?)\.?\s*$", see_line),
        Rule::new(
            "comma-list",
            r"^\s*(.*?[^\d\s,].*?),\s*(\d{1,4}(?:\s*[-–—]\s*\d{1,4})?(?:\s*,\s*\d{1,4}(?:\s*[-–—]\s*\d{1,4})?)*)\s*$",
            comma_line,
        ),
        Rule::new(
            "leader",
            r"^\s*(.+?)\s*(?:\.\s*){2,}(\d{1,4}(?:\s*[-–—]\s*\d{1,4})?(?:\s*,\s*\d{1,4}(?:\s*[-–—]\s*\d{1,4})?)*)\s*$",
            paged_line,
        ),
        Rule::new(
            "space-separated",
            r"^\s*(.*?[^\d\s,].*?)\s+(\d{1,4}(?:\s*[-–—]\s*\d{1,4})?(?:\s*,\s*\d{1,4}(?:\s*[-–—]\s*\d{1,4})?)*)\s*$",
            paged_line,
        ),
    ];
}

/// One parsed index line, before folding.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct IndexLine {
    pub term: String,
    pub pages: Vec<u32>,
    pub see: Vec<String>,
}

/// Page numbers from a list such as `"10-15, 20"`. Only the start of a
/// range is kept.
fn parse_page_list(raw: &str) -> Vec<u32> {
    raw.split(',')
        .filter_map(|item| item.split(['-', '–', '—']).next())
        .filter_map(|start| start.trim().parse::<u32>().ok())
        .collect()
}

fn clean_term(raw: &str) -> String {
    raw.trim().trim_end_matches([',', '.', ';', ':']).trim().to_string()
}

fn has_letter(text: &str) -> bool {
    text.chars().any(|ch| ch.is_alphabetic())
}

fn see_line(caps: &Captures<'_>) -> Option<IndexLine> {
    let (term, pages) = split_trailing_pages(group(caps, 1));
    if !has_letter(&term) {
        return None;
    }
    let see = group(caps, 2)
        .split(';')
        .map(clean_term)
        .filter(|target| !target.is_empty())
        .collect::<Vec<_>>();
    if see.is_empty() {
        return None;
    }
    Some(IndexLine { term, pages, see })
}

fn comma_line(caps: &Captures<'_>) -> Option<IndexLine> {
    let term = group(caps, 1);
    // "Krebs cycle 40, 41" is the space-separated form, not term "Krebs cycle 40"
    let last_token = term.split_whitespace().last().unwrap_or("");
    if PAGE_TOKEN.is_match(last_token) {
        return None;
    }
    paged_line(caps)
}

fn paged_line(caps: &Captures<'_>) -> Option<IndexLine> {
    let term = clean_term(group(caps, 1));
    if !has_letter(&term) {
        return None;
    }
    Some(IndexLine {
        term,
        pages: parse_page_list(group(caps, 2)),
        see: Vec::new(),
    })
}

/// Splits `"Energy, 12, 40"` into the term and its pages, for see-lines
/// that also carry page numbers.
fn split_trailing_pages(raw: &str) -> (String, Vec<u32>) {
    match first_match(&INDEX_RULES[2..], raw) {
        Some((_, line)) => (line.term, line.pages),
        None => (clean_term(raw), Vec::new()),
    }
}

pub fn parse_index_line(line: &str) -> Option<IndexLine> {
    first_match(&INDEX_RULES, line).map(|(_, parsed)| parsed)
}

pub fn is_index_keyword(line: &str) -> bool {
    INDEX_KEYWORD.is_match(line)
}

/// Output of the index extractor.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexResult {
    pub detected: bool,
    pub entries: Vec<IndexEntry>,
    /// `[min page, max page]` over all entries.
    pub page_span: Option<PageRange>,
    pub confidence: f64,
}

impl IndexResult {
    /// Entries grouped by first letter; non-letters land under `#`.
    pub fn buckets(&self) -> BTreeMap<char, Vec<&IndexEntry>> {
        let mut buckets: BTreeMap<char, Vec<&IndexEntry>> = BTreeMap::new();
        for entry in &self.entries {
            buckets.entry(entry.bucket()).or_default().push(entry);
        }
        buckets
    }

    /// Entries whose term or any sub-entry contains `needle`, ignoring case.
    pub fn search(&self, needle: &str) -> Vec<&IndexEntry> {
        search_entries(&self.entries, needle)
    }
}

pub fn search_entries<'a>(entries: &'a [IndexEntry], needle: &str) -> Vec<&'a IndexEntry> {
    let needle = needle.trim().to_lowercase();
    if needle.is_empty() {
        return Vec::new();
    }
    entries
        .iter()
        .filter(|entry| entry.matches_lowercase(&needle))
        .collect()
}

/// Entry under construction; pages kept as a set until finalised.
struct DraftEntry {
    term: String,
    pages: BTreeSet<u32>,
    sub_entries: Vec<String>,
    see_also: Vec<String>,
    is_main_entry: bool,
}

impl DraftEntry {
    fn new(term: String, is_main_entry: bool) -> Self {
        Self {
            term,
            pages: BTreeSet::new(),
            sub_entries: Vec::new(),
            see_also: Vec::new(),
            is_main_entry,
        }
    }

    fn absorb(&mut self, line: &IndexLine, max_page: u32) {
        self.pages.extend(
            line.pages
                .iter()
                .copied()
                .filter(|page| *page >= 1 && *page <= max_page),
        );
        self.see_also.extend(line.see.iter().cloned());
    }

    fn is_empty(&self) -> bool {
        self.pages.is_empty() && self.sub_entries.is_empty() && self.see_also.is_empty()
    }

    fn finish(self) -> IndexEntry {
        IndexEntry {
            term: self.term,
            pages: self.pages.into_iter().collect(),
            sub_entries: self.sub_entries,
            see_also: (!self.see_also.is_empty()).then_some(self.see_also),
            is_main_entry: self.is_main_entry,
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct IndexExtractor {
    config: IndexConfig,
}

impl IndexExtractor {
    pub fn new(config: IndexConfig) -> Self {
        Self { config }
    }

    pub fn extract(&self, text: &str) -> IndexResult {
        let lines: Vec<&str> = text.lines().collect();
        let region = region_len(
            lines.len(),
            self.config.region_fraction,
            self.config.min_region_lines,
        );
        let region_start = lines.len() - region;

        let Some(keyword_idx) = (region_start..lines.len()).find(|idx| is_index_keyword(lines[*idx]))
        else {
            trace!(region, "no index keyword in closing region");
            return IndexResult::default();
        };

        let block = &lines[keyword_idx + 1..];
        let shaped = block.iter().filter(|line| self.is_index_shaped(line)).count();
        if shaped < self.config.min_shaped_lines {
            trace!(shaped, "index keyword without enough entry lines");
            return IndexResult::default();
        }

        let entries = self.parse_block(block);
        if entries.len() < self.config.min_entries {
            debug!(entries = entries.len(), detected = false, "index extraction finished");
            return IndexResult::default();
        }

        let page_span = page_span(&entries);
        let confidence = index_confidence(entries.len(), shaped, block);
        debug!(
            entries = entries.len(),
            shaped,
            detected = true,
            confidence,
            "index extraction finished"
        );

        IndexResult {
            detected: true,
            entries,
            page_span,
            confidence,
        }
    }

    fn is_sub_entry(&self, line: &str) -> bool {
        indent_width(line) >= self.config.sub_entry_indent
    }

    fn is_index_shaped(&self, line: &str) -> bool {
        if is_blank(line) {
            return false;
        }
        parse_index_line(line).is_some() || (self.is_sub_entry(line) && has_letter(line))
    }

    fn parse_block(&self, block: &[&str]) -> Vec<IndexEntry> {
        let max_page = self.config.max_page;
        let mut drafts: Vec<DraftEntry> = Vec::new();
        let mut current_main: Option<usize> = None;

        for line in block {
            if is_blank(line) {
                continue;
            }
            // running page header; the entry above stays open across it
            if is_index_keyword(line) {
                trace!("skipping repeated index header");
                continue;
            }
            let parsed = parse_index_line(line);

            if self.is_sub_entry(line) {
                let Some(main_idx) = current_main else {
                    // no main entry above: keep it as a standalone sub-entry
                    if let Some(parsed) = parsed {
                        let mut draft = DraftEntry::new(parsed.term.clone(), false);
                        draft.absorb(&parsed, max_page);
                        drafts.push(draft);
                    }
                    continue;
                };
                let main = &mut drafts[main_idx];
                match parsed {
                    Some(parsed) => {
                        main.sub_entries.push(parsed.term.clone());
                        main.absorb(&parsed, max_page);
                    }
                    None if has_letter(line) => main.sub_entries.push(clean_term(line)),
                    None => {}
                }
                continue;
            }

            match parsed {
                Some(parsed) => {
                    let mut draft = DraftEntry::new(parsed.term.clone(), true);
                    draft.absorb(&parsed, max_page);
                    drafts.push(draft);
                    current_main = Some(drafts.len() - 1);
                }
                None => {
                    let term = clean_term(line);
                    if has_letter(&term)
                        && term.chars().count() <= MAX_BARE_TERM_CHARS
                        && !term.chars().any(|ch| ch.is_ascii_digit())
                    {
                        // term heading whose pages come from its sub-entries
                        drafts.push(DraftEntry::new(term, true));
                        current_main = Some(drafts.len() - 1);
                    } else {
                        trace!(line = %line.trim(), "skipping malformed index line");
                    }
                }
            }
        }

        drafts
            .into_iter()
            .filter(|draft| !draft.is_empty())
            .map(DraftEntry::finish)
            .collect()
    }
}

fn page_span(entries: &[IndexEntry]) -> Option<PageRange> {
    let min = entries.iter().filter_map(|entry| entry.pages.first()).min()?;
    let max = entries.iter().filter_map(|entry| entry.pages.last()).max()?;
    Some(PageRange::new(*min, *max))
}

fn index_confidence(entries: usize, shaped: usize, block: &[&str]) -> f64 {
    let non_blank = block.iter().filter(|line| !is_blank(line)).count().max(1);
    let mut confidence = 0.5;
    if entries >= 50 {
        confidence += 0.3;
    }
    if shaped as f64 / non_blank as f64 >= 0.7 {
        confidence += 0.2;
    }
    confidence
}

/// Index extraction over the whole document.
pub fn extract_index(text: &str, config: &IndexConfig) -> IndexResult {
    IndexExtractor::new(config.clone()).extract(text)
}
