//! Content-stream interpretation.
//!
//! Walks a page's content operations and produces positioned
//! [`TextFragment`]s and [`ImagePlacement`]s. Tracks the text matrix
//! (`BT`/`Tm`/`Td`/`TD`/`TL`/`T*`) for text placement and the graphics
//! state (`q`/`Q`/`cm`) so image `Do` operations can be positioned.

use std::collections::BTreeSet;

use unicode_normalization::UnicodeNormalization;

use crate::error::Result;
use crate::model::{ImagePlacement, TextFragment};

use super::backend::{value_as_number, ContentOp, PdfBackend, PdfValue};

/// Kerning adjustments in TJ arrays beyond this many 1/1000 text-space
/// units are treated as word spaces.
const TJ_SPACE_THRESHOLD: f32 = 200.0;

/// Text and image content interpreted from one page's content stream.
#[derive(Debug, Default)]
pub struct PageContent {
    pub fragments: Vec<TextFragment>,
    pub images: Vec<ImagePlacement>,
}

/// Interpret a page's content operations.
///
/// `image_xobjects` names the page's image XObject resources; `Do` of any
/// other XObject (forms) is ignored.
pub fn interpret_ops<B: PdfBackend + ?Sized>(
    backend: &B,
    page_id: super::backend::PageId,
    page_num: u32,
    ops: &[ContentOp],
    image_xobjects: &BTreeSet<Vec<u8>>,
) -> Result<PageContent> {
    let fonts = backend.page_fonts(page_id)?;

    let mut content = PageContent::default();

    let mut current_font_name: Vec<u8> = Vec::new();
    let mut current_font = String::new();
    let mut current_bold = false;
    let mut current_italic = false;
    let mut current_font_size: f32 = 12.0;
    let mut text_matrix = TextMatrix::default();
    let mut in_text_block = false;

    let mut ctm = Matrix::identity();
    let mut ctm_stack: Vec<Matrix> = Vec::new();

    for op in ops {
        match op.operator.as_str() {
            "BT" => {
                in_text_block = true;
                text_matrix = TextMatrix::default();
            }
            "ET" => {
                in_text_block = false;
            }
            "q" => {
                ctm_stack.push(ctm);
            }
            "Q" => {
                ctm = ctm_stack.pop().unwrap_or_else(Matrix::identity);
            }
            "cm" => {
                if op.operands.len() >= 6 {
                    let m = Matrix::from_operands(&op.operands);
                    ctm = m.multiply(&ctm);
                }
            }
            "Do" => {
                if let Some(PdfValue::Name(name)) = op.operands.first() {
                    if image_xobjects.contains(name) {
                        let resource_id =
                            format!("page{}_{}", page_num, String::from_utf8_lossy(name));
                        content.images.push(ImagePlacement {
                            resource_id,
                            x: ctm.e,
                            y: ctm.f,
                            page: page_num,
                        });
                    }
                }
            }
            "Tf" => {
                if op.operands.len() >= 2 {
                    if let PdfValue::Name(font_name) = &op.operands[0] {
                        current_font_name = font_name.clone();
                        if let Some(info) = fonts.get(font_name.as_slice()) {
                            current_font = info.base_font.clone();
                            current_bold = info.bold;
                            current_italic = info.italic;
                        } else {
                            current_font =
                                String::from_utf8_lossy(font_name.as_slice()).to_string();
                            current_bold = false;
                            current_italic = false;
                        }
                    }
                    current_font_size = value_as_number(&op.operands[1]).unwrap_or(12.0);
                }
            }
            "Td" => {
                if op.operands.len() >= 2 {
                    let tx = value_as_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = value_as_number(&op.operands[1]).unwrap_or(0.0);
                    text_matrix.translate(tx, ty);
                }
            }
            "TD" => {
                // Like Td, but also sets the leading to -ty
                if op.operands.len() >= 2 {
                    let tx = value_as_number(&op.operands[0]).unwrap_or(0.0);
                    let ty = value_as_number(&op.operands[1]).unwrap_or(0.0);
                    text_matrix.leading = -ty;
                    text_matrix.translate(tx, ty);
                }
            }
            "TL" => {
                if let Some(operand) = op.operands.first() {
                    text_matrix.leading = value_as_number(operand).unwrap_or(0.0);
                }
            }
            "Tm" => {
                if op.operands.len() >= 6 {
                    text_matrix.set(
                        value_as_number(&op.operands[0]).unwrap_or(1.0),
                        value_as_number(&op.operands[1]).unwrap_or(0.0),
                        value_as_number(&op.operands[2]).unwrap_or(0.0),
                        value_as_number(&op.operands[3]).unwrap_or(1.0),
                        value_as_number(&op.operands[4]).unwrap_or(0.0),
                        value_as_number(&op.operands[5]).unwrap_or(0.0),
                    );
                }
            }
            "T*" => {
                text_matrix.next_line(current_font_size);
            }
            "Tj" => {
                if in_text_block {
                    if let Some(PdfValue::Str(bytes)) = op.operands.first() {
                        let text = backend.decode_text(page_id, &current_font_name, bytes);
                        push_fragment(
                            &mut content,
                            text,
                            &text_matrix,
                            current_font_size,
                            &current_font,
                            current_bold,
                            current_italic,
                            page_num,
                        );
                    }
                }
            }
            "TJ" => {
                if in_text_block {
                    if let Some(PdfValue::Array(arr)) = op.operands.first() {
                        let text =
                            combine_tj_array(backend, page_id, &current_font_name, arr);
                        push_fragment(
                            &mut content,
                            text,
                            &text_matrix,
                            current_font_size,
                            &current_font,
                            current_bold,
                            current_italic,
                            page_num,
                        );
                    }
                }
            }
            "'" | "\"" => {
                text_matrix.next_line(current_font_size);
                if in_text_block {
                    // " carries word/char spacing operands before the string
                    let text_idx = if op.operator == "\"" { 2 } else { 0 };
                    if let Some(PdfValue::Str(bytes)) = op.operands.get(text_idx) {
                        let text = backend.decode_text(page_id, &current_font_name, bytes);
                        push_fragment(
                            &mut content,
                            text,
                            &text_matrix,
                            current_font_size,
                            &current_font,
                            current_bold,
                            current_italic,
                            page_num,
                        );
                    }
                }
            }
            _ => {}
        }
    }

    Ok(content)
}

/// Append a fragment for decoded text at the current text position.
#[allow(clippy::too_many_arguments)]
fn push_fragment(
    content: &mut PageContent,
    text: String,
    tm: &TextMatrix,
    font_size: f32,
    font_name: &str,
    bold: bool,
    italic: bool,
    page_num: u32,
) {
    if text.trim().is_empty() {
        return;
    }
    let (x, y) = tm.position();
    let effective_size = font_size * tm.scale();
    let text: String = text.nfc().collect();
    content.fragments.push(TextFragment::new(
        text,
        x,
        y,
        effective_size,
        font_name.to_string(),
        bold,
        italic,
        page_num,
    ));
}

/// Combine a TJ array of strings and kerning adjustments into one string,
/// turning large negative adjustments into word spaces.
fn combine_tj_array<B: PdfBackend + ?Sized>(
    backend: &B,
    page_id: super::backend::PageId,
    font_name: &[u8],
    arr: &[PdfValue],
) -> String {
    let mut combined = String::new();

    for item in arr {
        match item {
            PdfValue::Str(bytes) => {
                combined.push_str(&backend.decode_text(page_id, font_name, bytes));
            }
            PdfValue::Integer(_) | PdfValue::Real(_) => {
                // Negative values advance the pen; large ones are word breaks
                let adjustment = -value_as_number(item).unwrap_or(0.0);
                if adjustment > TJ_SPACE_THRESHOLD
                    && !combined.is_empty()
                    && !combined.ends_with(' ')
                    && !combined.ends_with('\u{00A0}')
                {
                    if let Some(c) = combined.chars().last() {
                        if !is_spaceless_script_char(c) {
                            combined.push(' ');
                        }
                    }
                }
            }
            _ => {}
        }
    }

    combined
}

/// Check if a character is from a script that doesn't use word spaces.
/// Chinese and Japanese don't separate words with spaces; Korean does.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;

    // CJK Unified Ideographs and extensions
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x20000..=0x2A6DF).contains(&code)
        || (0x2A700..=0x2EBEF).contains(&code)
        // Hiragana / Katakana
        || (0x3040..=0x309F).contains(&code)
        || (0x30A0..=0x30FF).contains(&code)
        // CJK Symbols and Punctuation
        || (0x3000..=0x303F).contains(&code)
}

/// A 2D affine transform as used by `cm` and the CTM stack.
#[derive(Debug, Clone, Copy)]
struct Matrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32,
    f: f32,
}

impl Matrix {
    fn identity() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
        }
    }

    fn from_operands(operands: &[PdfValue]) -> Self {
        Self {
            a: value_as_number(&operands[0]).unwrap_or(1.0),
            b: value_as_number(&operands[1]).unwrap_or(0.0),
            c: value_as_number(&operands[2]).unwrap_or(0.0),
            d: value_as_number(&operands[3]).unwrap_or(1.0),
            e: value_as_number(&operands[4]).unwrap_or(0.0),
            f: value_as_number(&operands[5]).unwrap_or(0.0),
        }
    }

    /// self × other, PDF row-vector convention.
    fn multiply(&self, other: &Matrix) -> Matrix {
        Matrix {
            a: self.a * other.a + self.b * other.c,
            b: self.a * other.b + self.b * other.d,
            c: self.c * other.a + self.d * other.c,
            d: self.c * other.b + self.d * other.d,
            e: self.e * other.a + self.f * other.c + other.e,
            f: self.e * other.b + self.f * other.d + other.f,
        }
    }
}

/// Text matrix for tracking position in the content stream.
#[derive(Debug, Clone)]
struct TextMatrix {
    a: f32,
    b: f32,
    c: f32,
    d: f32,
    e: f32, // X translation
    f: f32, // Y translation
    leading: f32,
}

impl Default for TextMatrix {
    fn default() -> Self {
        Self {
            a: 1.0,
            b: 0.0,
            c: 0.0,
            d: 1.0,
            e: 0.0,
            f: 0.0,
            leading: 0.0,
        }
    }
}

impl TextMatrix {
    fn set(&mut self, a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) {
        self.a = a;
        self.b = b;
        self.c = c;
        self.d = d;
        self.e = e;
        self.f = f;
    }

    fn translate(&mut self, tx: f32, ty: f32) {
        self.e += tx * self.a + ty * self.c;
        self.f += tx * self.b + ty * self.d;
    }

    /// Move down one line. A zero leading (never set via TL/TD) falls back
    /// to the font size so lines don't collapse onto one baseline.
    fn next_line(&mut self, font_size: f32) {
        let lead = if self.leading != 0.0 {
            self.leading
        } else {
            font_size
        };
        self.translate(0.0, -lead);
    }

    fn position(&self) -> (f32, f32) {
        (self.e, self.f)
    }

    fn scale(&self) -> f32 {
        // Vertical scale factor
        (self.a * self.a + self.c * self.c).sqrt()
    }
}
