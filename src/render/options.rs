//! Rendering options and configuration.

/// Options for rendering a document to Markdown.
#[derive(Debug, Clone)]
pub struct RenderOptions {
    /// Include YAML frontmatter with metadata
    pub include_frontmatter: bool,

    /// Emit a horizontal rule between pages
    pub page_separator: bool,

    /// Maximum heading level (1-6); deeper headings are clamped
    pub max_heading_level: u8,

    /// Character to use for unordered list markers
    pub list_marker: char,

    /// Escape special Markdown characters in extracted text
    pub escape_special_chars: bool,

    /// Emit links for embedded images
    pub include_images: bool,

    /// Prefix for image paths in output (e.g., "images/")
    pub image_path_prefix: String,
}

impl RenderOptions {
    /// Create new render options with defaults.
    pub fn new() -> Self {
        Self::default()
    }

    /// Enable or disable frontmatter.
    pub fn with_frontmatter(mut self, include: bool) -> Self {
        self.include_frontmatter = include;
        self
    }

    /// Enable or disable the page separator.
    pub fn with_page_separator(mut self, separator: bool) -> Self {
        self.page_separator = separator;
        self
    }

    /// Set the maximum heading level.
    pub fn with_max_heading(mut self, level: u8) -> Self {
        self.max_heading_level = level.clamp(1, 6);
        self
    }

    /// Set the list marker character.
    pub fn with_list_marker(mut self, marker: char) -> Self {
        self.list_marker = marker;
        self
    }

    /// Enable or disable Markdown escaping.
    pub fn with_escaping(mut self, escape: bool) -> Self {
        self.escape_special_chars = escape;
        self
    }

    /// Enable image links with the given path prefix.
    pub fn with_images(mut self, prefix: impl Into<String>) -> Self {
        self.include_images = true;
        self.image_path_prefix = prefix.into();
        self
    }
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            include_frontmatter: false,
            page_separator: true,
            max_heading_level: 6,
            list_marker: '-',
            escape_special_chars: true,
            include_images: false,
            image_path_prefix: String::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_render_options_builder() {
        let options = RenderOptions::new()
            .with_frontmatter(true)
            .with_max_heading(3)
            .with_page_separator(false)
            .with_images("images/");

        assert!(options.include_frontmatter);
        assert_eq!(options.max_heading_level, 3);
        assert!(!options.page_separator);
        assert!(options.include_images);
        assert_eq!(options.image_path_prefix, "images/");
    }

    #[test]
    fn test_max_heading_clamped() {
        let options = RenderOptions::new().with_max_heading(9);
        assert_eq!(options.max_heading_level, 6);
    }
}
