//! End-to-end pipeline tests over synthetic PDFs.

mod common;

use common::{body, build_broken_page_pdf, build_pdf, build_pdf_with_info, build_single_page, TextLine};
use pdf2md::{parse_bytes, parse_bytes_with_options, render, Block, Error, ParseOptions, RenderOptions};

#[test]
fn heading_then_paragraph() {
    // A 24pt bold line followed by two 12pt body lines becomes a level-1
    // heading and a single merged paragraph.
    let pdf = build_single_page(vec![
        TextLine::new("F2", 24, 72, 720, "Introduction"),
        body(690, "It was a dark and stormy night."),
        body(676, "The rain fell in torrents."),
    ]);

    let doc = parse_bytes(&pdf).unwrap();
    let md = render::to_markdown(&doc);

    assert_eq!(
        md,
        "# Introduction\n\nIt was a dark and stormy night. The rain fell in torrents.\n"
    );
}

#[test]
fn consecutive_list_items() {
    // Three "- " lines become three consecutive list items with no blank
    // lines between them.
    let pdf = build_single_page(vec![
        body(720, "- alpha"),
        body(706, "- beta"),
        body(692, "- gamma"),
    ]);

    let doc = parse_bytes(&pdf).unwrap();
    let md = render::to_markdown(&doc);

    assert_eq!(md, "- alpha\n- beta\n- gamma\n");
}

#[test]
fn nonexistent_path_fails() {
    let result = pdf2md::to_markdown("/no/such/file.pdf");
    assert!(matches!(result, Err(Error::Io(_))));
}

#[test]
fn garbage_bytes_fail() {
    let result = parse_bytes(b"definitely not a pdf document");
    assert!(matches!(result, Err(Error::UnknownFormat)));
}

#[test]
fn output_is_idempotent() {
    let pdf = build_pdf(vec![
        vec![
            TextLine::new("F2", 18, 72, 720, "Chapter One"),
            body(690, "First page body text."),
        ],
        vec![
            TextLine::new("F2", 18, 72, 720, "Chapter Two"),
            body(690, "Second page body text."),
        ],
    ]);

    let first = render::to_markdown(&parse_bytes(&pdf).unwrap());
    let second = render::to_markdown(&parse_bytes(&pdf).unwrap());

    assert_eq!(first, second);
}

#[test]
fn block_order_follows_reading_order() {
    let pdf = build_pdf(vec![
        vec![
            body(720, "Top of the first page."),
            body(706, "A continuation of the opening paragraph."),
            body(600, "Bottom of the first page."),
        ],
        vec![body(720, "Top of the second page.")],
    ]);

    let doc = parse_bytes(&pdf).unwrap();

    let texts: Vec<&str> = doc.blocks.iter().filter_map(|b| b.text()).collect();
    let top1 = texts.iter().position(|t| t.contains("Top of the first")).unwrap();
    let bottom1 = texts
        .iter()
        .position(|t| t.contains("Bottom of the first"))
        .unwrap();
    let top2 = texts
        .iter()
        .position(|t| t.contains("Top of the second"))
        .unwrap();

    assert!(top1 < bottom1);
    assert!(bottom1 < top2);

    let pages: Vec<u32> = doc.blocks.iter().map(|b| b.page()).collect();
    let mut sorted = pages.clone();
    sorted.sort();
    assert_eq!(pages, sorted);
}

#[test]
fn pages_are_separated_by_rule() {
    let pdf = build_pdf(vec![
        vec![body(720, "Page one content.")],
        vec![body(720, "Page two content.")],
    ]);

    let doc = parse_bytes(&pdf).unwrap();
    let md = render::to_markdown(&doc);

    assert_eq!(md, "Page one content.\n\n---\n\nPage two content.\n");

    let options = RenderOptions::new().with_page_separator(false);
    let md = render::to_markdown_with_options(&doc, &options);
    assert_eq!(md, "Page one content.\n\nPage two content.\n");
}

#[test]
fn page_selection_limits_output() {
    let pdf = build_pdf(vec![
        vec![body(720, "Page one content.")],
        vec![body(720, "Page two content.")],
    ]);

    let options = ParseOptions::new().with_pages(pdf2md::PageSelection::Pages(vec![2]));
    let doc = parse_bytes_with_options(&pdf, options).unwrap();
    let md = render::to_markdown(&doc);

    assert_eq!(md, "Page two content.\n");
}

#[test]
fn explicit_page_out_of_range_fails() {
    let pdf = build_pdf(vec![
        vec![body(720, "Page one content.")],
        vec![body(720, "Page two content.")],
    ]);

    let options = ParseOptions::new().with_pages(pdf2md::PageSelection::Pages(vec![1, 5]));
    let result = parse_bytes_with_options(&pdf, options);
    assert!(matches!(result, Err(Error::PageOutOfRange(5, 2))));
}

#[test]
fn lenient_mode_skips_broken_page() {
    let pdf = build_broken_page_pdf();

    // Default (lenient): the page yields no content, conversion succeeds
    let doc = parse_bytes(&pdf).unwrap();
    assert!(doc.is_empty());

    // Strict: the broken content stream is fatal
    let result = parse_bytes_with_options(&pdf, ParseOptions::new().strict());
    assert!(matches!(result, Err(Error::PdfParse(_))));
}

#[test]
fn special_characters_are_escaped() {
    let pdf = build_single_page(vec![
        body(720, "The product 5 * 3 uses an_underscore and [brackets]."),
    ]);

    let doc = parse_bytes(&pdf).unwrap();
    let md = render::to_markdown(&doc);

    assert_eq!(
        md,
        "The product 5 \\* 3 uses an\\_underscore and \\[brackets\\].\n"
    );
}

#[test]
fn metadata_flows_into_frontmatter() {
    let pdf = build_pdf_with_info(
        vec![body(720, "Body of the annotated document.")],
        "Annual Report",
        "Jane Smith",
    );

    let doc = parse_bytes(&pdf).unwrap();
    assert_eq!(doc.metadata.title.as_deref(), Some("Annual Report"));
    assert_eq!(doc.metadata.author.as_deref(), Some("Jane Smith"));
    assert!(doc.metadata.created.is_some());
    assert_eq!(doc.metadata.page_count, 1);

    let options = RenderOptions::new().with_frontmatter(true);
    let md = render::to_markdown_with_options(&doc, &options);
    assert!(md.starts_with("---\n"));
    assert!(md.contains("title: \"Annual Report\""));
    assert!(md.contains("author: \"Jane Smith\""));
    assert!(md.ends_with("Body of the annotated document.\n"));
}

#[test]
fn heading_levels_rank_by_size() {
    let pdf = build_single_page(vec![
        TextLine::new("F2", 24, 72, 720, "Document Title"),
        TextLine::new("F2", 18, 72, 680, "Section Heading"),
        body(650, "Body text below both headings, long enough to dominate."),
        body(636, "More body text keeps the modal size at twelve points."),
    ]);

    let doc = parse_bytes(&pdf).unwrap();

    let headings: Vec<(u8, &str)> = doc
        .blocks
        .iter()
        .filter_map(|b| match b {
            Block::Heading { level, text, .. } => Some((*level, text.as_str())),
            _ => None,
        })
        .collect();

    assert_eq!(headings, vec![(1, "Document Title"), (2, "Section Heading")]);
}

#[test]
fn lazy_page_iterator_yields_in_order() {
    let pdf = build_pdf(vec![
        vec![body(720, "First.")],
        vec![body(720, "Second.")],
        vec![body(720, "Third.")],
    ]);

    let parser = pdf2md::PdfParser::from_bytes(&pdf).unwrap();
    assert_eq!(parser.page_count(), 3);

    let numbers: Vec<u32> = parser
        .pages()
        .map(|p| p.unwrap().number)
        .collect();
    assert_eq!(numbers, vec![1, 2, 3]);
}

#[test]
fn converts_from_file_path() {
    let pdf = build_single_page(vec![body(720, "On disk content.")]);
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("sample.pdf");
    std::fs::write(&path, &pdf).unwrap();

    let md = pdf2md::to_markdown(&path).unwrap();
    assert_eq!(md, "On disk content.\n");

    let doc = pdf2md::parse_file(&path).unwrap();
    assert_eq!(doc.metadata.page_count, 1);
}

#[test]
fn converter_builder_end_to_end() {
    let pdf = build_pdf(vec![
        vec![
            TextLine::new("F2", 24, 72, 720, "Report"),
            body(690, "Opening paragraph of the report."),
        ],
        vec![body(720, "Closing page of the report.")],
    ]);

    let conversion = pdf2md::Converter::new()
        .without_page_separator()
        .convert_bytes(&pdf)
        .unwrap();
    let md = conversion.to_markdown();

    assert_eq!(
        md,
        "# Report\n\nOpening paragraph of the report.\n\nClosing page of the report.\n"
    );
}

#[test]
fn document_serializes_to_json() {
    let pdf = build_single_page(vec![
        TextLine::new("F2", 24, 72, 720, "Title"),
        body(690, "Serialized body text."),
    ]);

    let doc = parse_bytes(&pdf).unwrap();
    let json = serde_json::to_string(&doc).unwrap();
    assert!(json.contains("\"type\":\"heading\""));
    assert!(json.contains("\"type\":\"paragraph\""));
}
