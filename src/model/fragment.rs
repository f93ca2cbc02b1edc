//! Extraction-level types: text fragments and pages.

use serde::{Deserialize, Serialize};

/// A single run of characters extracted from a page, with position and
/// font attributes. Immutable once extracted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TextFragment {
    /// The text content
    pub text: String,
    /// Left edge of the bounding box
    pub x0: f32,
    /// Bottom edge (approximate descender below the baseline)
    pub y0: f32,
    /// Right edge (estimated from character advances)
    pub x1: f32,
    /// Top edge (approximate ascender above the baseline)
    pub y1: f32,
    /// Baseline Y position
    pub baseline: f32,
    /// Font name (e.g., "Helvetica-Bold")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Whether the font appears to be bold
    pub bold: bool,
    /// Whether the font appears to be italic
    pub italic: bool,
    /// Page number (1-indexed)
    pub page: u32,
}

impl TextFragment {
    /// Create a fragment from a baseline position. The vertical extent is
    /// approximated from the font size, the horizontal extent from a
    /// per-character advance heuristic when no width metrics are available.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        text: String,
        x: f32,
        baseline: f32,
        font_size: f32,
        font_name: String,
        bold: bool,
        italic: bool,
        page: u32,
    ) -> Self {
        let char_count = text.chars().count() as f32;
        let width = char_count * font_size * 0.5;

        Self {
            text,
            x0: x,
            y0: baseline - font_size * 0.2,
            x1: x + width,
            y1: baseline + font_size * 0.8,
            baseline,
            font_name,
            font_size,
            bold,
            italic,
            page,
        }
    }

    /// Estimated width of the fragment.
    pub fn width(&self) -> f32 {
        self.x1 - self.x0
    }

    /// Whether all coordinates are finite. Fragments with degenerate
    /// positions cannot be placed into reading order.
    pub fn has_finite_bbox(&self) -> bool {
        self.x0.is_finite() && self.y0.is_finite() && self.x1.is_finite() && self.y1.is_finite()
    }
}

/// An image XObject drawn on a page, recorded so images can be interleaved
/// into reading order alongside text.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImagePlacement {
    /// Resource ID of the image (key into `Document::resources`)
    pub resource_id: String,
    /// X position on the page
    pub x: f32,
    /// Y position on the page
    pub y: f32,
    /// Page number (1-indexed)
    pub page: u32,
}

/// A single page as produced by the extractor: ordered fragments plus
/// page dimensions. Created during extraction, consumed by the classifier.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page {
    /// Page number (1-indexed)
    pub number: u32,
    /// Page width in points (1 point = 1/72 inch)
    pub width: f32,
    /// Page height in points
    pub height: f32,
    /// Text fragments in content-stream order
    pub fragments: Vec<TextFragment>,
    /// Image placements in content-stream order
    pub images: Vec<ImagePlacement>,
}

impl Page {
    /// Create a new empty page with the given dimensions.
    pub fn new(number: u32, width: f32, height: f32) -> Self {
        Self {
            number,
            width,
            height,
            fragments: Vec::new(),
            images: Vec::new(),
        }
    }

    /// Check if the page has no content.
    pub fn is_empty(&self) -> bool {
        self.fragments.is_empty() && self.images.is_empty()
    }

    /// Page dimensions as a (width, height) tuple.
    pub fn dimensions(&self) -> (f32, f32) {
        (self.width, self.height)
    }
}
