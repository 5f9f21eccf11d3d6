//! Shared document fixtures for the integration tests.

#![allow(dead_code)]

use folio_types::{FontObservation, OutlineNode, PageMap, PageRecord};

/// Letters-only term names, so index lines never carry stray digits.
pub fn term_name(idx: usize) -> String {
    let first = (b'A' + (idx / 26 % 26) as u8) as char;
    let second = (b'a' + (idx % 26) as u8) as char;
    format!("{}{}rm compound", first, second)
}

pub fn prose_line(idx: usize) -> String {
    format!(
        "Paragraph number {} explains the material in plain words and keeps going.",
        idx
    )
    .replace(char::is_numeric, "x")
}

/// "Table of Contents" plus six entries, as in a short report.
pub fn scenario_toc_text() -> String {
    let mut text = String::from("Table of Contents\n");
    for line in [
        "Introduction .......... 1",
        "Chapter 1: Foundations .... 5",
        "Chapter 2: Methods .... 12",
        "Chapter 3: Results .... 20",
        "Chapter 4: Discussion .... 28",
        "Conclusion .......... 35",
    ] {
        text.push_str(line);
        text.push('\n');
    }
    text.push_str("\n\n\n\n\n");
    for idx in 0..40 {
        text.push_str(&prose_line(idx));
        text.push('\n');
    }
    text
}

/// Body prose followed by an index of 25 main entries and 5 sub-entries.
pub fn scenario_index_text() -> String {
    let mut text = String::new();
    for idx in 0..30 {
        text.push_str(&prose_line(idx));
        text.push('\n');
    }
    text.push_str("Index\n");
    text.push_str("Mitochondria, 12, 45\n");
    text.push_str("  matrix, 12\n");
    text.push_str("  membrane, 45\n");
    for idx in 0..24 {
        text.push_str(&format!("{}, {}, {}\n", term_name(idx), 50 + idx, 90 + idx));
        if idx % 8 == 0 {
            text.push_str(&format!("  detail of {}, {}\n", term_name(idx).to_lowercase(), 60 + idx));
        }
    }
    text
}

/// Font stream with body text at 10pt and headings at 18/14/12pt.
pub fn scenario_fonts(chapters: u32) -> Vec<FontObservation> {
    let mut fonts = Vec::new();
    for chapter in 1..=chapters {
        let page = (chapter - 1) * 10 + 1;
        fonts.push(observation(&format!("Chapter {} Overview", chapter), page, 18.0));
        fonts.push(observation(&format!("Background for part {}", chapter), page + 1, 14.0));
        fonts.push(observation(&format!("A closer look, part {}", chapter), page + 2, 12.0));
        for offset in 0..6 {
            fonts.push(observation(
                "Ordinary body text that fills most of the page with long sentences.",
                page + offset,
                10.0,
            ));
        }
    }
    fonts
}

pub fn observation(text: &str, page: u32, height: f32) -> FontObservation {
    FontObservation {
        text: text.to_string(),
        page,
        font_height: height,
        font_name: "Helvetica".to_string(),
    }
}

pub fn sample_outline() -> Vec<OutlineNode> {
    vec![
        OutlineNode::new("Cells", 1).with_children(vec![
            OutlineNode::new("Membranes", 2),
            OutlineNode::new("Organelles", 5),
        ]),
        OutlineNode::new("Tissues", 9),
        OutlineNode::new("Organs", 14),
    ]
}

/// A complete book: TOC, chapters that reference each other, and an index.
pub fn synthetic_book(chapters: usize, sections: usize, body_lines: usize) -> String {
    let mut text = String::from("CONTENTS\n\n");
    for chapter in 1..=chapters {
        let start = (chapter - 1) * 20 + 1;
        text.push_str(&format!("Chapter {} Topic .... {}\n", chapter, start));
        for section in 1..=sections {
            text.push_str(&format!(
                "{}.{} Subtopic .... {}\n",
                chapter,
                section,
                start + section * 3
            ));
        }
    }
    text.push_str("\n\n\n\n\n");

    for chapter in 1..=chapters {
        text.push_str(&format!("Chapter {} Topic\n", chapter));
        for line in 0..body_lines {
            if line % 17 == 0 && chapter > 1 {
                text.push_str(&format!(
                    "As discussed in Chapter {}, the idea extends here.\n",
                    chapter - 1
                ));
            } else if line % 23 == 0 {
                text.push_str(&format!("For the proof, see Section {}.1 below.\n", chapter));
            } else {
                text.push_str(&prose_line(line));
                text.push('\n');
            }
        }
    }

    text.push_str("Index\n");
    for idx in 0..(chapters * 10).max(30) {
        text.push_str(&format!("{}, {}, {}\n", term_name(idx), idx + 1, idx + 7));
        if idx % 5 == 0 {
            text.push_str(&format!("  usage, {}\n", idx + 3));
        }
    }
    text
}

/// Page map with pages of `chars_per_page` characters joined by "\n\n".
pub fn page_map_for(text: &str, chars_per_page: usize) -> PageMap {
    let total = text.chars().count();
    let mut records = Vec::new();
    let mut start = 0;
    let mut page = 1;
    while start < total {
        let end = (start + chars_per_page).min(total);
        records.push(PageRecord {
            page_number: page,
            start_offset: start,
            end_offset: end,
        });
        start = end + 2;
        page += 1;
    }
    PageMap::new(records)
}
