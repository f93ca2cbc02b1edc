//! Benchmarks for pdf2md conversion performance.
//!
//! Run with: cargo bench
//!
//! The classify+render path is measured over synthetic fragment sets so
//! the numbers reflect the heuristics, not lopdf's parsing.

use criterion::{black_box, criterion_group, criterion_main, Criterion};

use pdf2md::model::{Document, Page, TextFragment};
use pdf2md::parser::LayoutClassifier;
use pdf2md::render;

/// A synthetic page alternating headings, lists, and paragraphs.
fn synthetic_page(number: u32, line_count: usize) -> Page {
    let mut page = Page::new(number, 612.0, 792.0);

    for i in 0..line_count {
        let y = 760.0 - (i as f32) * 14.0;
        let (text, size, font) = match i % 10 {
            0 => ("Section heading for benchmark".to_string(), 18.0, "Helvetica-Bold"),
            1..=3 => (format!("- list entry number {}", i), 12.0, "Helvetica"),
            _ => (
                format!("Body line {} with enough words to look like prose.", i),
                12.0,
                "Helvetica",
            ),
        };
        page.fragments.push(TextFragment::new(
            text,
            72.0,
            y,
            size,
            font.to_string(),
            font.contains("Bold"),
            false,
            number,
        ));
    }

    page
}

/// Benchmark layout classification alone.
fn bench_classification(c: &mut Criterion) {
    let mut group = c.benchmark_group("classification");

    for line_count in [50, 200].iter() {
        group.bench_function(format!("{}_lines", line_count), |b| {
            b.iter(|| {
                let mut classifier = LayoutClassifier::new();
                black_box(classifier.classify_page(synthetic_page(1, *line_count)))
            });
        });
    }

    group.finish();
}

/// Benchmark the classify+render pipeline over a multi-page document.
fn bench_classify_and_render(c: &mut Criterion) {
    c.bench_function("classify_render_10_pages", |b| {
        b.iter(|| {
            let mut classifier = LayoutClassifier::new();
            let mut doc = Document::new();
            for page_num in 1..=10 {
                for block in classifier.classify_page(synthetic_page(page_num, 40)) {
                    doc.push_block(block);
                }
            }
            black_box(render::to_markdown(&doc))
        });
    });
}

/// Benchmark Markdown rendering alone.
fn bench_render(c: &mut Criterion) {
    let mut classifier = LayoutClassifier::new();
    let mut doc = Document::new();
    for block in classifier.classify_page(synthetic_page(1, 200)) {
        doc.push_block(block);
    }

    c.bench_function("render_200_lines", |b| {
        b.iter(|| black_box(render::to_markdown(black_box(&doc))));
    });
}

criterion_group!(
    benches,
    bench_classification,
    bench_classify_and_render,
    bench_render,
);
criterion_main!(benches);
