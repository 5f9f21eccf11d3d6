//! Detector-level behaviour on realistic document fixtures.

mod _common;
use _common::*;

use folio_structure::config::AnalyzerConfig;
use folio_structure::headings::{candidates_from_observations, filter, normalize_levels};
use folio_structure::{detect_headings, detect_toc, extract_cross_references, extract_index};
use folio_types::{walk_forest, DetectionMethod, ReferenceKind, ReferenceTarget, Section};

fn assert_well_formed(sections: &[Section]) {
    for (_, section) in walk_forest(sections) {
        assert!(section.page_range.end >= section.page_range.start, "{:?}", section);
        for child in &section.children {
            assert!(child.page_range.start >= section.page_range.start);
            assert!(section.page_range.end >= child.page_range.end);
        }
        for pair in section.children.windows(2) {
            assert!(pair[0].page_range.start <= pair[1].page_range.start);
        }
    }
}

#[test]
fn test_table_of_contents_scenario() {
    let result = detect_toc(&scenario_toc_text(), &AnalyzerConfig::default(), None);

    assert!(result.detected);
    assert_eq!(result.detection_method, DetectionMethod::TextParsing);
    assert!(result.sections.len() >= 5);
    assert_eq!(result.sections[0].page_range.start, 1);
    assert_eq!(result.sections[0].title, "Introduction");
    assert_well_formed(&result.sections);
}

#[test]
fn test_toc_without_keyword_is_never_detected() {
    let mut text = String::new();
    for idx in 1..=30 {
        text.push_str(&format!("Chapter {} Topic .... {}\n", idx, idx * 3));
    }
    let result = detect_toc(&text, &AnalyzerConfig::default(), None);
    assert!(!result.detected);
    assert!(result.sections.is_empty());
}

#[test]
fn test_toc_keyword_outside_opening_region_is_ignored() {
    let mut text = String::new();
    for idx in 0..1500 {
        text.push_str(&prose_line(idx));
        text.push('\n');
    }
    text.push_str(&scenario_toc_text());
    assert!(!detect_toc(&text, &AnalyzerConfig::default(), None).detected);
}

#[test]
fn test_synthetic_book_toc_nests_sections() {
    let text = synthetic_book(6, 3, 40);
    let result = detect_toc(&text, &AnalyzerConfig::default(), None);

    assert!(result.detected);
    assert_eq!(result.sections.len(), 6);
    assert_eq!(result.section_count(), 24);
    let second = &result.sections[1];
    assert_eq!(second.id, "toc-2");
    assert_eq!(second.children[0].id, "toc-2.1");
    assert_eq!(second.children[0].title, "2.1 Subtopic");
    assert_eq!(second.page_range.start, 21);
    assert_eq!(second.page_range.end, 40);
    assert!((result.confidence - 1.0).abs() < 1e-9);
    assert_well_formed(&result.sections);
}

#[test]
fn test_index_scenario() {
    let result = extract_index(&scenario_index_text(), &AnalyzerConfig::default().index);

    assert!(result.detected);
    assert_eq!(result.entries.len(), 25);
    let mitochondria = result
        .entries
        .iter()
        .find(|entry| entry.term == "Mitochondria")
        .unwrap();
    assert_eq!(mitochondria.pages, vec![12, 45]);
    assert_eq!(mitochondria.sub_entries, vec!["matrix", "membrane"]);
    assert!(mitochondria.is_main_entry);

    for entry in &result.entries {
        assert!(entry.pages.windows(2).all(|pair| pair[0] < pair[1]), "{:?}", entry);
    }
    let span = result.page_span.unwrap();
    assert_eq!(span.start, 12);
    assert_eq!(span.end, 113);
}

#[test]
fn test_index_needs_enough_entries() {
    let mut text = String::from("Index\n");
    for idx in 0..8 {
        text.push_str(&format!("{}, {}\n", term_name(idx), idx + 1));
    }
    assert!(!extract_index(&text, &AnalyzerConfig::default().index).detected);
}

#[test]
fn test_index_search_covers_sub_entries() {
    let result = extract_index(&scenario_index_text(), &AnalyzerConfig::default().index);
    let hits = result.search("MATRIX");
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].term, "Mitochondria");
    assert!(result.buckets().contains_key(&'M'));
}

#[test]
fn test_cross_reference_scenario() {
    let text = "As discussed in Chapter 2, the process accelerates.";
    let refs = extract_cross_references(text, None, &AnalyzerConfig::default().cross_refs);

    assert_eq!(refs.len(), 1);
    assert_eq!(refs[0].kind, ReferenceKind::DiscussedIn);
    assert_eq!(refs[0].to, ReferenceTarget::Chapter("2".to_string()));
    assert!(refs[0].from.context.contains(text));
}

#[test]
fn test_cross_reference_pages_from_page_map() {
    let text = synthetic_book(4, 2, 120);
    let map = page_map_for(&text, 1500);
    let refs = extract_cross_references(&text, Some(&map), &AnalyzerConfig::default().cross_refs);

    assert!(!refs.is_empty());
    assert!(refs.windows(2).all(|pair| pair[0].from.page <= pair[1].from.page));
    assert!(refs.iter().all(|reference| reference.from.page <= map.page_count()));
}

#[test]
fn test_heading_levels_follow_font_sizes() {
    let config = AnalyzerConfig::default();
    let candidates = candidates_from_observations(&scenario_fonts(4), &config.headings);
    let leveled = normalize_levels(&filter(&candidates, &config.headings), config.headings.max_level);

    for heading in &leveled {
        let expected = if heading.title.starts_with("Chapter") {
            1
        } else if heading.title.starts_with("Background") {
            2
        } else {
            3
        };
        assert_eq!(heading.level, expected, "{}", heading.title);
    }
    assert_eq!(leveled.len(), 12);
}

#[test]
fn test_heading_detection_builds_hierarchy() {
    let fonts = scenario_fonts(4);
    let result = detect_headings(Some(fonts.as_slice()), &AnalyzerConfig::default(), Some(40));

    assert!(result.detected);
    assert_eq!(result.detection_method, DetectionMethod::HeadingAnalysis);
    assert_eq!(result.sections.len(), 4);
    assert_eq!(result.sections[0].children[0].children[0].level, 3);
    assert!((result.confidence - 0.8).abs() < 1e-9);
    assert_eq!(result.sections[3].page_range.end, 40);
    assert_well_formed(&result.sections);
}

#[test]
fn test_detectors_are_idempotent() {
    let text = synthetic_book(5, 2, 60);
    let config = AnalyzerConfig::default();

    let first = serde_json::to_string(&detect_toc(&text, &config, None)).unwrap();
    let second = serde_json::to_string(&detect_toc(&text, &config, None)).unwrap();
    assert_eq!(first, second);

    let first = serde_json::to_string(&extract_index(&text, &config.index)).unwrap();
    let second = serde_json::to_string(&extract_index(&text, &config.index)).unwrap();
    assert_eq!(first, second);
}
