//! Layout classification.
//!
//! Turns a page of positioned text fragments into ordered logical blocks:
//! headings, list items, paragraphs. Classification is best-effort — it
//! never fails. Ambiguous lines resolve to paragraphs; fragments that
//! cannot be placed at all resolve to [`Block::Unclassified`].

use std::collections::BTreeMap;

use regex::Regex;

use crate::model::{Block, Page, TextFragment};

/// A text line composed of fragments sharing a baseline.
#[derive(Debug, Clone)]
pub struct Line {
    /// Fragments in this line, sorted by X position
    pub fragments: Vec<TextFragment>,
    /// Baseline Y position
    pub y: f32,
    /// Leftmost X position
    pub x: f32,
    /// Dominant font size (weighted by text length)
    pub font_size: f32,
}

impl Line {
    /// Build a line from fragments, sorting them by X.
    fn from_fragments(mut fragments: Vec<TextFragment>) -> Self {
        fragments.sort_by(|a, b| a.x0.partial_cmp(&b.x0).unwrap_or(std::cmp::Ordering::Equal));

        let total_chars: usize = fragments.iter().map(|f| f.text.len()).sum();
        let weighted_size: f32 = fragments
            .iter()
            .map(|f| f.font_size * f.text.len() as f32)
            .sum();
        let font_size = if total_chars > 0 {
            weighted_size / total_chars as f32
        } else {
            fragments.first().map(|f| f.font_size).unwrap_or(12.0)
        };

        let y = fragments.first().map(|f| f.baseline).unwrap_or(0.0);
        let x = fragments.first().map(|f| f.x0).unwrap_or(0.0);

        Self {
            fragments,
            y,
            x,
            font_size,
        }
    }

    /// Combined text of all fragments with gap-derived spacing.
    ///
    /// A space is inserted between fragments when the horizontal gap
    /// exceeds 20% of the estimated character width, except between
    /// characters of spaceless scripts (CJK).
    pub fn text(&self) -> String {
        if self.fragments.is_empty() {
            return String::new();
        }

        if self.fragments.len() == 1 {
            return self.fragments[0].text.clone();
        }

        let mut result = String::new();

        for (i, frag) in self.fragments.iter().enumerate() {
            if i == 0 {
                result.push_str(&frag.text);
                continue;
            }

            let prev = &self.fragments[i - 1];
            let gap = frag.x0 - prev.x1;

            let char_count = frag.text.chars().count();
            let avg_char_width = if char_count > 0 && frag.width() > 0.0 {
                frag.width() / char_count as f32
            } else {
                frag.font_size * 0.5
            };

            let prev_last = prev.text.chars().last();
            let curr_first = frag.text.chars().next();

            let should_insert_space = if gap > avg_char_width * 0.2 {
                let prev_cjk = prev_last.map(is_spaceless_script_char).unwrap_or(false);
                let curr_cjk = curr_first.map(is_spaceless_script_char).unwrap_or(false);
                !(prev_cjk && curr_cjk)
            } else {
                false
            };

            let prev_ends_space = prev.text.ends_with(' ') || prev.text.ends_with('\u{00A0}');
            let curr_starts_space = frag.text.starts_with(' ') || frag.text.starts_with('\u{00A0}');

            if should_insert_space && !prev_ends_space && !curr_starts_space {
                result.push(' ');
            }

            result.push_str(&frag.text);
        }

        result
    }

    /// Check if the line is predominantly bold (by character count).
    pub fn is_bold(&self) -> bool {
        let bold_chars: usize = self
            .fragments
            .iter()
            .filter(|f| f.bold)
            .map(|f| f.text.len())
            .sum();
        let total_chars: usize = self.fragments.iter().map(|f| f.text.len()).sum();
        total_chars > 0 && bold_chars as f32 / total_chars as f32 > 0.5
    }
}

/// Font size statistics accumulated across the pages seen so far.
///
/// Threaded through page processing inside the classifier; heading levels
/// come from the rank of a size among the distinct large sizes observed.
#[derive(Debug, Clone, Default)]
pub struct FontStatistics {
    /// Most common font size (body text)
    body_size: f32,
    /// Distinct sizes above the heading threshold, largest first
    heading_sizes: Vec<f32>,
    /// Observed sizes (0.1pt buckets) weighted by character count.
    /// Ordered map so modal-size ties resolve the same way every run.
    histogram: BTreeMap<i32, usize>,
}

impl FontStatistics {
    /// Record a font size observation weighted by character count.
    pub fn add_observation(&mut self, size: f32, chars: usize) {
        let key = (size * 10.0).round() as i32;
        *self.histogram.entry(key).or_insert(0) += chars.max(1);
    }

    /// Recompute body size and the ranked heading sizes.
    pub fn analyze(&mut self, heading_ratio: f32) {
        if self.histogram.is_empty() {
            self.body_size = 12.0;
            self.heading_sizes.clear();
            return;
        }

        // Modal size; on equal counts the smaller size wins (body text is
        // never the larger of two equally common sizes in practice)
        let (body_key, _) = self
            .histogram
            .iter()
            .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
            .unwrap();
        self.body_size = *body_key as f32 / 10.0;

        let threshold = self.body_size * heading_ratio;
        let mut larger: Vec<f32> = self
            .histogram
            .keys()
            .map(|k| *k as f32 / 10.0)
            .filter(|s| *s > threshold)
            .collect();
        larger.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        self.heading_sizes = larger;
    }

    /// Body text font size.
    pub fn body_size(&self) -> f32 {
        self.body_size
    }

    /// Heading level for a font size: 1 for the largest size seen, deeper
    /// for smaller ones; 0 for body-sized text.
    pub fn heading_level(&self, font_size: f32) -> u8 {
        for (i, &size) in self.heading_sizes.iter().enumerate() {
            if font_size >= size - 0.5 {
                return (i + 1).min(6) as u8;
            }
        }
        0
    }

    /// Level assigned to headings detected by style rather than size:
    /// one deeper than all size-derived levels.
    pub fn style_heading_level(&self) -> u8 {
        (self.heading_sizes.len() as u8 + 1).min(6)
    }
}

/// Tunable classification parameters.
#[derive(Debug, Clone)]
pub struct ClassifierConfig {
    /// A line is heading-sized when its font exceeds body size times this
    pub heading_ratio: f32,
    /// Points of left indentation per list nesting level
    pub indent_unit: f32,
    /// Paragraphs break when the line gap exceeds the median spacing
    /// times this factor
    pub paragraph_gap_factor: f32,
    /// Maximum list nesting depth
    pub max_list_depth: u8,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            heading_ratio: 1.3,
            indent_unit: 18.0,
            paragraph_gap_factor: 1.5,
            max_list_depth: 5,
        }
    }
}

/// What a single line was classified as, before grouping.
#[derive(Debug, Clone, PartialEq)]
enum LineKind {
    Heading(u8),
    ListItem { depth: u8, text: String },
    Body,
}

/// Layout classifier. One instance is threaded through all pages of a
/// document so heading levels stay consistent across the whole output.
pub struct LayoutClassifier {
    config: ClassifierConfig,
    font_stats: FontStatistics,
    list_marker: Regex,
}

impl LayoutClassifier {
    /// Create a classifier with default configuration.
    pub fn new() -> Self {
        Self::with_config(ClassifierConfig::default())
    }

    /// Create a classifier with custom configuration.
    pub fn with_config(config: ClassifierConfig) -> Self {
        // Bullet glyphs, decimal numbering ("3." / "3)"), single-letter
        // numbering ("a." / "a)"); the marker must be followed by space
        let list_marker = Regex::new(r"^(?:[-–—•‣▪◦·*]|\d{1,3}[.)]|[A-Za-z][.)])\s+")
            .expect("list marker pattern is valid");
        Self {
            config,
            font_stats: FontStatistics::default(),
            list_marker,
        }
    }

    /// Font statistics accumulated so far.
    pub fn font_stats(&self) -> &FontStatistics {
        &self.font_stats
    }

    /// Classify one page into ordered blocks. Consumes the page; never
    /// fails — content that resists classification becomes
    /// [`Block::Unclassified`].
    pub fn classify_page(&mut self, page: Page) -> Vec<Block> {
        let page_num = page.number;

        let (placeable, unplaceable): (Vec<_>, Vec<_>) = page
            .fragments
            .into_iter()
            .partition(|f| f.has_finite_bbox() && !is_garbled(&f.text));

        for frag in &placeable {
            self.font_stats
                .add_observation(frag.font_size, frag.text.chars().count());
        }
        self.font_stats.analyze(self.config.heading_ratio);

        let lines = group_into_lines(placeable);
        let median_spacing = median_line_spacing(&lines);
        let body_margin = modal_left_margin(&lines);

        log::debug!(
            "page {}: {} lines, body size {:.1}pt, margin {:.1}, spacing {:.1}",
            page_num,
            lines.len(),
            self.font_stats.body_size(),
            body_margin,
            median_spacing
        );

        let kinds: Vec<LineKind> = (0..lines.len())
            .map(|i| self.classify_line(&lines, i, median_spacing, body_margin))
            .collect();

        let positioned = self.group_lines(&lines, &kinds, page_num, median_spacing);

        // Interleave images into reading order by Y position (top-down)
        let mut images = page.images;
        images.sort_by(|a, b| b.y.partial_cmp(&a.y).unwrap_or(std::cmp::Ordering::Equal));

        let mut blocks = Vec::with_capacity(positioned.len() + images.len());
        let mut images = images.into_iter().peekable();
        for (y, block) in positioned {
            while let Some(img) = images.next_if(|img| img.y > y) {
                blocks.push(Block::Image {
                    resource_id: img.resource_id,
                    page: page_num,
                });
            }
            blocks.push(block);
        }
        for img in images {
            blocks.push(Block::Image {
                resource_id: img.resource_id,
                page: page_num,
            });
        }

        // Fragments that could not be placed in reading order come last
        for frag in unplaceable {
            if !frag.text.trim().is_empty() {
                blocks.push(Block::Unclassified {
                    text: frag.text,
                    page: page_num,
                });
            }
        }

        blocks
    }

    /// Decide what a single line is.
    fn classify_line(
        &self,
        lines: &[Line],
        index: usize,
        median_spacing: f32,
        body_margin: f32,
    ) -> LineKind {
        let line = &lines[index];
        let text = line.text();

        // Size-derived heading
        let level = self.font_stats.heading_level(line.font_size);
        if level > 0 {
            return LineKind::Heading(level);
        }

        // List item: recognized marker at line start
        if let Some(m) = self.list_marker.find(&text) {
            let rest = text[m.end()..].to_string();
            if !rest.trim().is_empty() {
                let indent = (line.x - body_margin).max(0.0);
                let depth = ((indent / self.config.indent_unit).round() as u8)
                    .min(self.config.max_list_depth);
                return LineKind::ListItem { depth, text: rest };
            }
        }

        // Style-derived heading: a fully bold line vertically isolated
        // from both neighbours. Anything ambiguous stays a paragraph.
        if line.is_bold() && self.is_isolated(lines, index, median_spacing) {
            return LineKind::Heading(self.font_stats.style_heading_level());
        }

        LineKind::Body
    }

    /// A line is isolated when the vertical gap to both neighbours exceeds
    /// the median line spacing.
    fn is_isolated(&self, lines: &[Line], index: usize, median_spacing: f32) -> bool {
        let line = &lines[index];
        let gap_above = index
            .checked_sub(1)
            .map(|i| (lines[i].y - line.y).abs())
            .unwrap_or(f32::MAX);
        let gap_below = lines
            .get(index + 1)
            .map(|l| (line.y - l.y).abs())
            .unwrap_or(f32::MAX);
        gap_above > median_spacing && gap_below > median_spacing
    }

    /// Group classified lines into blocks, merging consecutive body lines
    /// into paragraphs. Each block carries the baseline Y of its first
    /// line so images can be merged into reading order.
    fn group_lines(
        &self,
        lines: &[Line],
        kinds: &[LineKind],
        page_num: u32,
        median_spacing: f32,
    ) -> Vec<(f32, Block)> {
        let mut blocks: Vec<(f32, Block)> = Vec::new();
        let mut paragraph: Vec<usize> = Vec::new();

        let mut flush_paragraph = |blocks: &mut Vec<(f32, Block)>, paragraph: &mut Vec<usize>| {
            if paragraph.is_empty() {
                return;
            }
            let y = lines[paragraph[0]].y;
            let text = paragraph
                .iter()
                .map(|&i| lines[i].text())
                .collect::<Vec<_>>()
                .join(" ");
            paragraph.clear();
            if !text.trim().is_empty() {
                blocks.push((y, Block::paragraph(text.trim(), page_num)));
            }
        };

        for (i, kind) in kinds.iter().enumerate() {
            match kind {
                LineKind::Heading(level) => {
                    flush_paragraph(&mut blocks, &mut paragraph);
                    let text = lines[i].text();
                    if !text.trim().is_empty() {
                        blocks.push((lines[i].y, Block::heading(*level, text.trim(), page_num)));
                    }
                }
                LineKind::ListItem { depth, text } => {
                    flush_paragraph(&mut blocks, &mut paragraph);
                    blocks.push((lines[i].y, Block::list_item(*depth, text.trim(), page_num)));
                }
                LineKind::Body => {
                    if let Some(&prev) = paragraph.last() {
                        if self.should_break_paragraph(&lines[prev], &lines[i], median_spacing) {
                            flush_paragraph(&mut blocks, &mut paragraph);
                        }
                    }
                    paragraph.push(i);
                }
            }
        }
        flush_paragraph(&mut blocks, &mut paragraph);

        blocks
    }

    /// Determine if a new paragraph should start between two body lines.
    fn should_break_paragraph(&self, prev: &Line, curr: &Line, median_spacing: f32) -> bool {
        // Large spacing indicates a new paragraph
        let spacing = (prev.y - curr.y).abs();
        if median_spacing > 0.0 && spacing > median_spacing * self.config.paragraph_gap_factor {
            return true;
        }

        // Significant font size change
        if (prev.font_size - curr.font_size).abs() > 1.0 {
            return true;
        }

        // Significant left margin change (indentation)
        if (prev.x - curr.x).abs() > 20.0 {
            return true;
        }

        false
    }
}

impl Default for LayoutClassifier {
    fn default() -> Self {
        Self::new()
    }
}

/// Group fragments into lines by baseline proximity.
///
/// Fragments are sorted by Y descending (PDF origin is bottom-left, so
/// this is top-to-bottom) then X ascending, and merged into a line while
/// the baseline distance stays within 30% of the font size.
fn group_into_lines(mut fragments: Vec<TextFragment>) -> Vec<Line> {
    if fragments.is_empty() {
        return vec![];
    }

    fragments.sort_by(|a, b| {
        let y_cmp = b
            .baseline
            .partial_cmp(&a.baseline)
            .unwrap_or(std::cmp::Ordering::Equal);
        if y_cmp == std::cmp::Ordering::Equal {
            a.x0.partial_cmp(&b.x0).unwrap_or(std::cmp::Ordering::Equal)
        } else {
            y_cmp
        }
    });

    let mut lines: Vec<Line> = Vec::new();
    let mut current: Vec<TextFragment> = Vec::new();
    let mut current_y: Option<f32> = None;

    for frag in fragments {
        let tolerance = frag.font_size * 0.3;

        match current_y {
            Some(y) if (frag.baseline - y).abs() <= tolerance => {
                current.push(frag);
            }
            Some(_) => {
                if !current.is_empty() {
                    lines.push(Line::from_fragments(std::mem::take(&mut current)));
                }
                current_y = Some(frag.baseline);
                current.push(frag);
            }
            None => {
                current_y = Some(frag.baseline);
                current.push(frag);
            }
        }
    }

    if !current.is_empty() {
        lines.push(Line::from_fragments(current));
    }

    lines
}

/// Median gap between consecutive baselines.
fn median_line_spacing(lines: &[Line]) -> f32 {
    if lines.len() < 2 {
        return 12.0;
    }

    let mut spacings: Vec<f32> = lines
        .windows(2)
        .map(|w| (w[0].y - w[1].y).abs())
        .filter(|s| *s > 0.1)
        .collect();

    if spacings.is_empty() {
        return 12.0;
    }

    spacings.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    // Lower median: paragraph gaps are a minority of the samples, so this
    // lands on the typical intra-paragraph spacing
    spacings[(spacings.len() - 1) / 2]
}

/// Most common line start X, bucketed to whole points. This is the body
/// text's left margin; list indentation is measured against it.
fn modal_left_margin(lines: &[Line]) -> f32 {
    if lines.is_empty() {
        return 0.0;
    }

    let mut counts: BTreeMap<i32, usize> = BTreeMap::new();
    for line in lines {
        *counts.entry(line.x.round() as i32).or_insert(0) += 1;
    }

    let (margin, _) = counts
        .iter()
        .max_by(|(ka, ca), (kb, cb)| ca.cmp(cb).then(kb.cmp(ka)))
        .expect("counts is non-empty");
    *margin as f32
}

/// Text that survives decoding only as control or replacement characters.
fn is_garbled(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty()
        && trimmed
            .chars()
            .all(|c| c.is_control() || c == '\u{FFFD}')
}

/// Check if a character is from a script that doesn't use word spaces.
fn is_spaceless_script_char(c: char) -> bool {
    let code = c as u32;
    (0x4E00..=0x9FFF).contains(&code)
        || (0x3400..=0x4DBF).contains(&code)
        || (0x3040..=0x309F).contains(&code)
        || (0x30A0..=0x30FF).contains(&code)
        || (0x3000..=0x303F).contains(&code)
}
