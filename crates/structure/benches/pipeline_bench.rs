use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion};
use folio_structure::config::AnalyzerConfig;
use folio_structure::{detect_toc, extract_cross_references, extract_index, Analyzer, DocumentInput};

fn synthetic_book(chapters: usize, body_lines: usize) -> String {
    let mut text = String::from("Table of Contents\n");
    for chapter in 1..=chapters {
        let start = (chapter - 1) * 25 + 1;
        text.push_str(&format!("Chapter {} Topic .... {}\n", chapter, start));
        for section in 1..=4 {
            text.push_str(&format!("{}.{} Subtopic .... {}\n", chapter, section, start + section * 5));
        }
    }
    text.push_str("\n\n\n\n\n");

    for chapter in 1..=chapters {
        text.push_str(&format!("Chapter {} Topic\n", chapter));
        for line in 0..body_lines {
            if line % 40 == 0 {
                text.push_str(&format!("As discussed in Chapter {}, this builds on it.\n", chapter));
            } else {
                text.push_str("Body text that carries the argument forward without references.\n");
            }
        }
    }

    text.push_str("Index\n");
    for idx in 0..(chapters * 20) {
        let term: String = format!("{:x}", idx)
            .chars()
            .map(|ch| (b'a' + ch.to_digit(16).unwrap_or(0) as u8) as char)
            .collect();
        text.push_str(&format!("Term {}, {}, {}\n", term, idx + 1, idx + 9));
    }
    text
}

fn bench_detectors(c: &mut Criterion) {
    let mut group = c.benchmark_group("detectors");
    let config = AnalyzerConfig::default();
    let text = synthetic_book(20, 300);

    group.bench_function("toc", |b| b.iter(|| detect_toc(black_box(&text), &config, None)));
    group.bench_function("index", |b| b.iter(|| extract_index(black_box(&text), &config.index)));
    group.bench_function("cross_refs", |b| {
        b.iter(|| extract_cross_references(black_box(&text), None, &config.cross_refs))
    });

    group.finish();
}

fn bench_pipeline(c: &mut Criterion) {
    let mut group = c.benchmark_group("pipeline");
    let analyzer = Analyzer::default();

    for chapters in [5, 20, 80] {
        let input = DocumentInput::from_text(synthetic_book(chapters, 300));
        group.bench_with_input(BenchmarkId::new("analyze", chapters), &input, |b, input| {
            b.iter(|| analyzer.analyze(black_box(input)))
        });
    }

    group.finish();
}

criterion_group!(benches, bench_detectors, bench_pipeline);
criterion_main!(benches);
