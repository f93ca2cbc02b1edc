//! Markdown rendering.
//!
//! Maps classified blocks to Markdown syntax. Rendering is infallible:
//! every document produces some output.
//!
//! # Escaping rules
//!
//! With `escape_special_chars` enabled (the default), extracted text is
//! escaped under a fixed two-tier policy:
//!
//! - Inline everywhere: `\`, `` ` ``, `*`, `_`, `[`, `]`, `|` are
//!   backslash-escaped.
//! - At block start, for paragraphs and unclassified text only: a leading
//!   `#`, `>`, `+`, or `-`, and ordered-list numbering (`12.`), are
//!   escaped so the line cannot be misread as block syntax.
//!
//! Markers the classifier already consumed (stripped bullets, the heading
//! prefixes this renderer emits) are recognized constructs and are never
//! escaped. No other characters are touched.

use crate::model::{Block, Document};

use super::RenderOptions;

/// Convert a document to Markdown with default options.
pub fn to_markdown(doc: &Document) -> String {
    MarkdownRenderer::new(RenderOptions::default()).render(doc)
}

/// Convert a document to Markdown.
pub fn to_markdown_with_options(doc: &Document, options: &RenderOptions) -> String {
    MarkdownRenderer::new(options.clone()).render(doc)
}

/// Markdown renderer.
pub struct MarkdownRenderer {
    options: RenderOptions,
}

impl MarkdownRenderer {
    /// Create a new Markdown renderer.
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    /// Render a document to Markdown. The output is newline-terminated.
    pub fn render(&self, doc: &Document) -> String {
        let mut output = String::new();

        if self.options.include_frontmatter {
            output.push_str(&doc.metadata.to_yaml_frontmatter());
        }

        let mut current_page: Option<u32> = None;
        let mut in_list = false;

        for block in &doc.blocks {
            if block.is_empty() {
                continue;
            }

            // Page boundary: close any open list, then a horizontal rule
            if self.options.page_separator {
                if let Some(page) = current_page {
                    if block.page() != page && has_content(&output) {
                        ensure_blank_line(&mut output);
                        output.push_str("---\n\n");
                        in_list = false;
                    }
                }
            }
            current_page = Some(block.page());

            // A blank line closes a list before any non-list block
            if in_list && !block.is_list_item() {
                ensure_blank_line(&mut output);
                in_list = false;
            }

            match block {
                Block::Heading { level, text, .. } => {
                    let level = (*level).min(self.options.max_heading_level).max(1);
                    output.push_str(&"#".repeat(level as usize));
                    output.push(' ');
                    output.push_str(&self.escape_inline(text));
                    output.push_str("\n\n");
                }
                Block::Paragraph { text, .. } | Block::Unclassified { text, .. } => {
                    output.push_str(&self.escape_block(text));
                    output.push_str("\n\n");
                }
                Block::ListItem { depth, text, .. } => {
                    output.push_str(&"  ".repeat(*depth as usize));
                    output.push(self.options.list_marker);
                    output.push(' ');
                    output.push_str(&self.escape_inline(text));
                    output.push('\n');
                    in_list = true;
                }
                Block::Image { resource_id, .. } => {
                    if self.options.include_images {
                        if let Some(resource) = doc.get_resource(resource_id) {
                            let filename = resource.suggested_filename(resource_id);
                            output.push_str(&format!(
                                "![]({}{})\n\n",
                                self.options.image_path_prefix, filename
                            ));
                        }
                    }
                }
            }
        }

        let trimmed = output.trim();
        let mut result = String::with_capacity(trimmed.len() + 1);
        result.push_str(trimmed);
        result.push('\n');
        result
    }

    /// Escape inline Markdown-special characters.
    fn escape_inline(&self, text: &str) -> String {
        if !self.options.escape_special_chars {
            return text.to_string();
        }
        escape_markdown(text)
    }

    /// Escape a paragraph: inline characters plus a leading character that
    /// would be parsed as block syntax.
    fn escape_block(&self, text: &str) -> String {
        if !self.options.escape_special_chars {
            return text.to_string();
        }
        escape_block_start(&escape_markdown(text))
    }
}

/// Escape inline Markdown-special characters.
fn escape_markdown(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            // Core formatting that must be escaped everywhere
            '\\' | '`' | '*' | '_' |
            // Brackets for links/images, pipe for tables
            '[' | ']' | '|' => {
                result.push('\\');
                result.push(c);
            }
            _ => result.push(c),
        }
    }
    result
}

/// Escape a leading character that would turn the line into block syntax:
/// `#`, `>`, `+`, `-`, or ordered-list numbering like `12.`.
fn escape_block_start(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(c @ ('#' | '>' | '+' | '-')) => {
            format!("\\{}{}", c, chars.as_str())
        }
        Some(c) if c.is_ascii_digit() => {
            let digits = text.chars().take_while(|ch| ch.is_ascii_digit()).count();
            match text[digits..].strip_prefix('.') {
                Some(rest) => format!("{}\\.{}", &text[..digits], rest),
                None => text.to_string(),
            }
        }
        _ => text.to_string(),
    }
}

/// Check if the output contains anything beyond frontmatter-free whitespace.
fn has_content(output: &str) -> bool {
    !output.trim().is_empty()
}

/// Push newlines until the output ends with a blank line.
fn ensure_blank_line(output: &mut String) {
    while !output.is_empty() && !output.ends_with("\n\n") {
        output.push('\n');
    }
}
