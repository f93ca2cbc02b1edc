//! Shared helpers for integration tests: build small synthetic PDFs
//! in-memory with lopdf's document-construction API.

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};

/// One positioned text line for a fixture page.
pub struct TextLine {
    pub font: &'static str,
    pub size: i64,
    pub x: i64,
    pub y: i64,
    pub text: &'static str,
}

impl TextLine {
    pub fn new(font: &'static str, size: i64, x: i64, y: i64, text: &'static str) -> Self {
        Self {
            font,
            size,
            x,
            y,
            text,
        }
    }
}

/// Regular 12pt body line at the left margin.
pub fn body(y: i64, text: &'static str) -> TextLine {
    TextLine::new("F1", 12, 72, y, text)
}

/// Content operations for one line in its own BT/ET block, so the
/// text position is absolute.
fn line_ops(line: &TextLine) -> Vec<Operation> {
    vec![
        Operation::new("BT", vec![]),
        Operation::new("Tf", vec![line.font.into(), line.size.into()]),
        Operation::new("Td", vec![line.x.into(), line.y.into()]),
        Operation::new("Tj", vec![Object::string_literal(line.text)]),
        Operation::new("ET", vec![]),
    ]
}

/// Build a PDF with one page per line group. Every page carries two
/// fonts: F1 = Helvetica, F2 = Helvetica-Bold.
pub fn build_pdf(pages: Vec<Vec<TextLine>>) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let helvetica_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let helvetica_bold_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica-Bold",
    });

    let mut kids: Vec<Object> = Vec::new();
    for lines in &pages {
        let resources_id = doc.add_object(dictionary! {
            "Font" => dictionary! {
                "F1" => helvetica_id,
                "F2" => helvetica_bold_id,
            },
        });

        let operations: Vec<Operation> = lines.iter().flat_map(line_ops).collect();
        let content = Content { operations };
        let content_id = doc.add_object(Stream::new(
            dictionary! {},
            content.encode().expect("content stream encodes"),
        ));

        let page_id = doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => pages_id,
            "Contents" => content_id,
            "Resources" => resources_id,
            "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
        });
        kids.push(page_id.into());
    }

    let count = kids.len() as i64;
    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => count,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("document saves");
    bytes
}

/// Build a single-page PDF.
pub fn build_single_page(lines: Vec<TextLine>) -> Vec<u8> {
    build_pdf(vec![lines])
}

/// Build a PDF whose page points at a missing content stream, so the
/// page opens but its content cannot be read.
pub fn build_broken_page_pdf() -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    // Reference an object id that is never inserted
    let dangling_id = doc.new_object_id();

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => dangling_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("document saves");
    bytes
}

/// Build a PDF with an Info dictionary carrying a title and author.
pub fn build_pdf_with_info(lines: Vec<TextLine>, title: &str, author: &str) -> Vec<u8> {
    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    let helvetica_id = doc.add_object(dictionary! {
        "Type" => "Font",
        "Subtype" => "Type1",
        "BaseFont" => "Helvetica",
    });
    let resources_id = doc.add_object(dictionary! {
        "Font" => dictionary! { "F1" => helvetica_id },
    });

    let operations: Vec<Operation> = lines.iter().flat_map(line_ops).collect();
    let content = Content { operations };
    let content_id = doc.add_object(Stream::new(
        dictionary! {},
        content.encode().expect("content stream encodes"),
    ));

    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "Contents" => content_id,
        "Resources" => resources_id,
        "MediaBox" => vec![0.into(), 0.into(), 612.into(), 792.into()],
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let info_id = doc.add_object(dictionary! {
        "Title" => Object::string_literal(title),
        "Author" => Object::string_literal(author),
        "CreationDate" => Object::string_literal("D:20240115103045"),
    });
    doc.trailer.set("Info", info_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).expect("document saves");
    bytes
}
