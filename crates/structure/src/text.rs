//! Line and region helpers shared by the text detectors.

/// Number of lines in a leading or trailing region: `fraction` of the
/// document, but never fewer than `min_lines` (bounded by the line count).
pub fn region_len(total_lines: usize, fraction: f64, min_lines: usize) -> usize {
    let by_fraction = (total_lines as f64 * fraction).ceil() as usize;
    by_fraction.max(min_lines).min(total_lines)
}

pub fn is_blank(line: &str) -> bool {
    line.trim().is_empty()
}

/// Parses a page number in `1..=max_page`.
pub fn parse_page(raw: &str, max_page: u32) -> Option<u32> {
    raw.trim()
        .parse::<u32>()
        .ok()
        .filter(|page| *page >= 1 && *page <= max_page)
}

/// Width of the leading whitespace, with a tab counting as four columns.
pub fn indent_width(line: &str) -> usize {
    line.chars()
        .take_while(|ch| ch.is_whitespace())
        .map(|ch| if ch == '\t' { 4 } else { 1 })
        .sum()
}

/// Level suggested by a title's capitalisation: all caps is a chapter,
/// capitalised is a section, anything else a sub-section.
pub fn level_from_case(title: &str) -> u8 {
    let letters: Vec<char> = title.chars().filter(|ch| ch.is_alphabetic()).collect();
    if letters.len() >= 2 && letters.iter().all(|ch| ch.is_uppercase()) {
        1
    } else if letters.first().is_some_and(|ch| ch.is_uppercase()) {
        2
    } else {
        3
    }
}
