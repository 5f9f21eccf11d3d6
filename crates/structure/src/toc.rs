//! Detection of an explicit, human-authored table of contents.
//!
//! The detector only looks at the opening region of the document. A TOC
//! keyword line opens a candidate block, a density check confirms that
//! enough leader/numbered lines follow it, and the block is then parsed line
//! by line with the [`TOC_RULES`] cascade until its end is found.

use crate::cascade::{first_match, group, Rule};
use crate::config::{AnalyzerConfig, TocConfig};
use crate::hierarchy::{HierarchyBuilder, RangeStrategy};
use crate::text::{is_blank, level_from_case, region_len};
use folio_types::{DetectionMethod, LeveledHeading, StructureResult};
use lazy_static::lazy_static;
use regex::{Captures, Regex};
use std::collections::BTreeSet;
use tracing::{debug, trace};

/// Longest line still considered a TOC heading such as "Contents".
const MAX_KEYWORD_LINE_CHARS: usize = 60;

lazy_static! {
    static ref TOC_KEYWORD: Regex = Regex::new(
        r"(?i)^\s*(?:table\s+of\s+contents|contents|table\s+des\s+mati[eè]res|sommaire|inhaltsverzeichnis|inhalt|[ií]ndice|contenido|sum[aá]rio)\b"
    )
    .unwrap();

    // Density shapes: any of these marks a line as TOC-like.
    static ref TOC_SHAPES: [Regex; 4] = [
        // text + 2-or-more dot/dash/space leaders + page
        Regex::new(r"^\s*\S.*?(?:(?:\s*[.·…\-_]){2,}\s*|\s{2,})\d{1,4}\s*$").unwrap(),
        // text + parenthesised page
        Regex::new(r"(?i)^\s*\S.*\(\s*(?:pp?\.?\s*|pages?\s+)?\d{1,4}\s*\)\s*$").unwrap(),
        // numbered outline + page
        Regex::new(r"^\s*\d+(?:\.\d+)*\.?\s+\S.*\s\d{1,4}\s*$").unwrap(),
        // roman numeral heading + page
        Regex::new(r"^\s*[IVXLCDM]+\.?\s+\S.*\s\d{1,4}\s*$").unwrap(),
    ];

    /// Parsing cascade, in priority order: chapter-numbered, decimal
    /// numbered, leader-dot title, parenthetical page, roman numeral.
    pub static ref TOC_RULES: Vec<Rule<TocLine>> = vec![
        Rule::new(
            "chapter",
            r"(?i)^\s*((?:chapter|chap\.|part|unit|lesson|module)\s+(?:\d+|[ivxlcdm]+)\b.*?)(?:(?:\s*[.·…\-_]){2,}\s*|\s+)(\d{1,4})\s*$",
            chapter_line,
        ),
        Rule::new(
            "decimal",
            r"^\s*(\d+(?:\.\d+)*)\.?\s+(\S.*?)(?:(?:\s*[.·…\-_]){2,}\s*|\s+)(\d{1,4})\s*$",
            decimal_line,
        ),
        Rule::new(
            "leader",
            r"^\s*(\S.*?)(?:(?:\s*[.·…\-_]){2,}\s*|\s{2,})(\d{1,4})\s*$",
            titled_line,
        ),
        Rule::new(
            "parenthetical",
            r"(?i)^\s*(\S.*?)\s*\(\s*(?:pp?\.?\s*|pages?\s+)?(\d{1,4})\s*\)\s*$",
            titled_line,
        ),
        Rule::new(
            "roman",
            r"^\s*([IVXLCDM]+\.?\s+\S.*?)\s+(\d{1,4})\s*$",
            roman_line,
        ),
    ];
}

/// One parsed TOC line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TocLine {
    pub title: String,
    pub page: u32,
    pub level: u8,
}

fn clean_title(raw: &str) -> String {
    raw.trim()
        .trim_end_matches(['.', '·', '…', '-', '_', ':', ' '])
        .trim()
        .to_string()
}

fn has_letter(text: &str) -> bool {
    text.chars().any(|ch| ch.is_alphabetic())
}

fn chapter_line(caps: &Captures<'_>) -> Option<TocLine> {
    let title = clean_title(group(caps, 1));
    let page = group(caps, 2).parse().ok()?;
    Some(TocLine {
        title,
        page,
        level: 1,
    })
}

fn decimal_line(caps: &Captures<'_>) -> Option<TocLine> {
    let number = group(caps, 1);
    let text = clean_title(group(caps, 2));
    if !has_letter(&text) {
        return None;
    }
    let depth = number.split('.').filter(|part| !part.is_empty()).count();
    let page = group(caps, 3).parse().ok()?;
    Some(TocLine {
        title: format!("{} {}", number, text),
        page,
        level: u8::try_from(depth).unwrap_or(u8::MAX),
    })
}

fn titled_line(caps: &Captures<'_>) -> Option<TocLine> {
    let title = clean_title(group(caps, 1));
    if !has_letter(&title) {
        return None;
    }
    let page = group(caps, 2).parse().ok()?;
    let level = level_from_case(&title);
    Some(TocLine { title, page, level })
}

fn roman_line(caps: &Captures<'_>) -> Option<TocLine> {
    let title = clean_title(group(caps, 1));
    let page = group(caps, 2).parse().ok()?;
    Some(TocLine {
        title,
        page,
        level: 1,
    })
}

/// Runs the parsing cascade on a single line.
pub fn parse_toc_line(line: &str) -> Option<TocLine> {
    first_match(&TOC_RULES, line).map(|(_, parsed)| parsed)
}

pub fn is_toc_keyword(line: &str) -> bool {
    line.trim().chars().count() <= MAX_KEYWORD_LINE_CHARS && TOC_KEYWORD.is_match(line)
}

pub fn is_toc_shaped(line: &str) -> bool {
    TOC_SHAPES.iter().any(|shape| shape.is_match(line))
}

/// Text-TOC detector with its thresholds.
#[derive(Debug, Clone)]
pub struct TocDetector {
    config: TocConfig,
}

impl Default for TocDetector {
    fn default() -> Self {
        Self::new(TocConfig::default())
    }
}

impl TocDetector {
    pub fn new(config: TocConfig) -> Self {
        Self { config }
    }

    /// Finds and parses the TOC entries, or `None` when the document has no
    /// recognisable TOC.
    pub fn detect_entries(&self, text: &str) -> Option<Vec<TocLine>> {
        let lines: Vec<&str> = text.lines().collect();
        let region = region_len(
            lines.len(),
            self.config.region_fraction,
            self.config.min_region_lines,
        );

        let mut saw_keyword = false;
        for keyword_idx in (0..region).filter(|idx| is_toc_keyword(lines[*idx])) {
            saw_keyword = true;
            let window_end = (keyword_idx + 1 + self.config.max_toc_lines).min(lines.len());
            let window = &lines[keyword_idx + 1..window_end];

            let shaped = window.iter().filter(|line| is_toc_shaped(line)).count();
            if shaped < self.config.min_density_lines {
                trace!(line = keyword_idx, shaped, "TOC keyword without enough entry lines");
                continue;
            }

            let entries = self.parse_block(window);
            if entries.len() >= self.config.min_entries {
                debug!(line = keyword_idx, entries = entries.len(), "TOC block parsed");
                return Some(entries);
            }
            trace!(line = keyword_idx, parsed = entries.len(), "TOC block too small");
        }

        if !saw_keyword {
            trace!(region, "no TOC keyword in opening region");
        }
        None
    }

    fn parse_block(&self, window: &[&str]) -> Vec<TocLine> {
        let mut entries = Vec::new();
        let mut blank_run = 0;
        let mut unmatched_run = 0;

        for (idx, line) in window.iter().enumerate() {
            if is_blank(line) {
                blank_run += 1;
                continue;
            }

            if blank_run > self.config.max_blank_run && !self.continues_after_gap(&window[idx..]) {
                break;
            }
            blank_run = 0;

            match parse_toc_line(line).filter(|entry| self.page_in_range(entry.page)) {
                Some(entry) => {
                    unmatched_run = 0;
                    entries.push(entry);
                }
                None => {
                    unmatched_run += 1;
                    if unmatched_run >= self.config.max_unmatched_run {
                        break;
                    }
                }
            }
        }

        entries
    }

    /// After a long blank gap the TOC only continues if an entry shows up
    /// within the next few non-blank lines.
    fn continues_after_gap(&self, rest: &[&str]) -> bool {
        rest.iter()
            .take(self.config.blank_lookahead)
            .any(|line| is_toc_shaped(line) || parse_toc_line(line).is_some())
    }

    fn page_in_range(&self, page: u32) -> bool {
        page >= 1 && page <= self.config.max_page
    }
}

/// Heuristic trust score for a parsed TOC.
pub fn toc_confidence(entries: &[TocLine]) -> f64 {
    if entries.is_empty() {
        return 0.0;
    }
    let mut confidence: f64 = 0.5;
    if entries.len() >= 10 {
        confidence += 0.2;
    }
    let levels: BTreeSet<u8> = entries.iter().map(|entry| entry.level).collect();
    if levels.len() >= 2 {
        confidence += 0.2;
    }
    if entries.windows(2).all(|pair| pair[0].page <= pair[1].page) {
        confidence += 0.1;
    }
    confidence.min(1.0)
}

/// Text-TOC detection over the whole document.
pub fn detect_toc(text: &str, config: &AnalyzerConfig, last_page: Option<u32>) -> StructureResult {
    let detector = TocDetector::new(config.toc.clone());
    let Some(entries) = detector.detect_entries(text) else {
        debug!(detected = false, "text TOC detection finished");
        return StructureResult::not_detected(DetectionMethod::TextParsing);
    };

    let confidence = toc_confidence(&entries);
    let headings: Vec<LeveledHeading> = entries
        .iter()
        .map(|entry| LeveledHeading::new(entry.title.clone(), entry.page, entry.level))
        .collect();
    let sections = HierarchyBuilder::new(
        RangeStrategy::NextSiblingOrShallower,
        "toc",
        &config.hierarchy,
    )
    .with_last_page(last_page)
    .build(&headings);

    debug!(
        detected = true,
        entries = entries.len(),
        roots = sections.len(),
        confidence,
        "text TOC detection finished"
    );
    StructureResult::detected(sections, DetectionMethod::TextParsing, confidence)
}
