//! # pdf2md
//!
//! Convert PDF documents to structured Markdown.
//!
//! This library extracts positioned text from a PDF, reconstructs its
//! logical structure (headings, paragraphs, lists) with layout heuristics,
//! and renders the result as Markdown.
//!
//! ## Quick Start
//!
//! ```no_run
//! fn main() -> pdf2md::Result<()> {
//!     let markdown = pdf2md::to_markdown("document.pdf")?;
//!     println!("{}", markdown);
//!     Ok(())
//! }
//! ```
//!
//! ## Pipeline
//!
//! - **Extraction**: `lopdf` reads pages and content streams; text runs
//!   come out as positioned fragments with font metadata.
//! - **Classification**: font-size statistics and spacing heuristics turn
//!   fragments into heading, paragraph, and list blocks. Classification
//!   is best-effort and never fails.
//! - **Rendering**: blocks map to Markdown with a documented escaping
//!   policy and a horizontal rule between pages.

pub mod detect;
pub mod error;
pub mod model;
pub mod parser;
pub mod render;

// Re-export commonly used types
pub use error::{Error, Result};
pub use model::{Block, Document, Metadata, Page, Resource, TextFragment};
pub use parser::{ErrorMode, LayoutClassifier, PageSelection, ParseOptions, PdfParser};
pub use render::{MarkdownRenderer, RenderOptions};

use std::io::Read;
use std::path::Path;

/// Parse a PDF file and return the classified document.
///
/// # Example
///
/// ```no_run
/// let doc = pdf2md::parse_file("document.pdf").unwrap();
/// println!("{} blocks", doc.blocks.len());
/// ```
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<Document> {
    let parser = PdfParser::open(path)?;
    parser.parse()
}

/// Parse a PDF file with custom options.
///
/// # Example
///
/// ```no_run
/// use pdf2md::{parse_file_with_options, ParseOptions};
///
/// let options = ParseOptions::new().strict();
/// let doc = parse_file_with_options("document.pdf", options).unwrap();
/// ```
pub fn parse_file_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::open_with_options(path, options)?;
    parser.parse()
}

/// Parse a PDF from bytes.
pub fn parse_bytes(data: &[u8]) -> Result<Document> {
    let parser = PdfParser::from_bytes(data)?;
    parser.parse()
}

/// Parse a PDF from bytes with custom options.
pub fn parse_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Document> {
    let parser = PdfParser::from_bytes_with_options(data, options)?;
    parser.parse()
}

/// Parse a PDF from a reader.
pub fn parse_reader<R: Read>(reader: R) -> Result<Document> {
    let parser = PdfParser::from_reader(reader)?;
    parser.parse()
}

/// Convert a PDF file to Markdown with default options.
///
/// # Example
///
/// ```no_run
/// let markdown = pdf2md::to_markdown("document.pdf").unwrap();
/// std::fs::write("output.md", markdown).unwrap();
/// ```
pub fn to_markdown<P: AsRef<Path>>(path: P) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::to_markdown(&doc))
}

/// Convert a PDF file to Markdown with custom render options.
pub fn to_markdown_with_options<P: AsRef<Path>>(
    path: P,
    options: &RenderOptions,
) -> Result<String> {
    let doc = parse_file(path)?;
    Ok(render::to_markdown_with_options(&doc, options))
}

/// Builder pairing parse and render options.
///
/// # Example
///
/// ```no_run
/// use pdf2md::Converter;
///
/// let markdown = Converter::new()
///     .strict()
///     .with_frontmatter()
///     .convert("document.pdf")?
///     .to_markdown();
/// # Ok::<(), pdf2md::Error>(())
/// ```
pub struct Converter {
    parse_options: ParseOptions,
    render_options: RenderOptions,
}

impl Converter {
    /// Create a new converter builder.
    pub fn new() -> Self {
        Self {
            parse_options: ParseOptions::default(),
            render_options: RenderOptions::default(),
        }
    }

    /// Fail on page extraction errors instead of skipping.
    pub fn strict(mut self) -> Self {
        self.parse_options = self.parse_options.strict();
        self
    }

    /// Set the page selection.
    pub fn with_pages(mut self, pages: PageSelection) -> Self {
        self.parse_options = self.parse_options.with_pages(pages);
        self
    }

    /// Set the document password.
    pub fn with_password(mut self, password: impl Into<String>) -> Self {
        self.parse_options = self.parse_options.with_password(password);
        self
    }

    /// Include YAML frontmatter in the output.
    pub fn with_frontmatter(mut self) -> Self {
        self.render_options = self.render_options.with_frontmatter(true);
        self
    }

    /// Suppress the horizontal rule between pages.
    pub fn without_page_separator(mut self) -> Self {
        self.render_options = self.render_options.with_page_separator(false);
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.render_options = self.render_options.with_max_heading(level);
        self
    }

    /// Extract embedded images and emit links with the given path prefix.
    pub fn with_images(mut self, prefix: impl Into<String>) -> Self {
        self.parse_options = self.parse_options.with_images(true);
        self.render_options = self.render_options.with_images(prefix);
        self
    }

    /// Parse a PDF file and return a conversion result.
    pub fn convert<P: AsRef<Path>>(self, path: P) -> Result<Conversion> {
        let parser = PdfParser::open_with_options(path, self.parse_options)?;
        let document = parser.parse()?;
        Ok(Conversion {
            document,
            render_options: self.render_options,
        })
    }

    /// Parse a PDF from bytes and return a conversion result.
    pub fn convert_bytes(self, data: &[u8]) -> Result<Conversion> {
        let parser = PdfParser::from_bytes_with_options(data, self.parse_options)?;
        let document = parser.parse()?;
        Ok(Conversion {
            document,
            render_options: self.render_options,
        })
    }
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

/// Result of parsing a PDF document, ready to render.
pub struct Conversion {
    /// The classified document
    pub document: Document,
    render_options: RenderOptions,
}

impl Conversion {
    /// Render the document to Markdown.
    pub fn to_markdown(&self) -> String {
        render::to_markdown_with_options(&self.document, &self.render_options)
    }

    /// The classified document.
    pub fn document(&self) -> &Document {
        &self.document
    }
}
