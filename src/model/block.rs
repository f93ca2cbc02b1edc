//! Classified content blocks.

use serde::{Deserialize, Serialize};

/// A classified logical unit of page content. Created by the layout
/// classifier, consumed by the renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    /// A heading with level 1-6
    Heading {
        /// Heading level (1 = largest)
        level: u8,
        /// Heading text
        text: String,
        /// Page the heading appears on (1-indexed)
        page: u32,
    },

    /// A paragraph of body text
    Paragraph {
        /// Concatenated paragraph text
        text: String,
        /// Page the paragraph starts on (1-indexed)
        page: u32,
    },

    /// A bulleted or numbered list item
    ListItem {
        /// Nesting depth (0 = top level)
        depth: u8,
        /// Item text with the marker stripped
        text: String,
        /// Page the item appears on (1-indexed)
        page: u32,
    },

    /// An embedded image reference
    Image {
        /// Resource ID for the image
        resource_id: String,
        /// Page the image appears on (1-indexed)
        page: u32,
    },

    /// Content that resisted classification; rendered as plain text
    Unclassified {
        /// Raw text content
        text: String,
        /// Page the content appears on (1-indexed)
        page: u32,
    },
}

impl Block {
    /// Create a heading block, clamping the level to 1-6.
    pub fn heading(level: u8, text: impl Into<String>, page: u32) -> Self {
        Block::Heading {
            level: level.clamp(1, 6),
            text: text.into(),
            page,
        }
    }

    /// Create a paragraph block.
    pub fn paragraph(text: impl Into<String>, page: u32) -> Self {
        Block::Paragraph {
            text: text.into(),
            page,
        }
    }

    /// Create a list item block.
    pub fn list_item(depth: u8, text: impl Into<String>, page: u32) -> Self {
        Block::ListItem {
            depth,
            text: text.into(),
            page,
        }
    }

    /// The page this block belongs to.
    pub fn page(&self) -> u32 {
        match self {
            Block::Heading { page, .. }
            | Block::Paragraph { page, .. }
            | Block::ListItem { page, .. }
            | Block::Image { page, .. }
            | Block::Unclassified { page, .. } => *page,
        }
    }

    /// The text content of the block, if any.
    pub fn text(&self) -> Option<&str> {
        match self {
            Block::Heading { text, .. }
            | Block::Paragraph { text, .. }
            | Block::ListItem { text, .. }
            | Block::Unclassified { text, .. } => Some(text),
            Block::Image { .. } => None,
        }
    }

    /// Check if this block is a list item.
    pub fn is_list_item(&self) -> bool {
        matches!(self, Block::ListItem { .. })
    }

    /// Check if the block carries no renderable content.
    pub fn is_empty(&self) -> bool {
        match self.text() {
            Some(text) => text.trim().is_empty(),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_heading_level_clamped() {
        let block = Block::heading(9, "Title", 1);
        assert!(matches!(block, Block::Heading { level: 6, .. }));

        let block = Block::heading(0, "Title", 1);
        assert!(matches!(block, Block::Heading { level: 1, .. }));
    }

    #[test]
    fn test_block_accessors() {
        let block = Block::list_item(2, "item", 3);
        assert_eq!(block.page(), 3);
        assert_eq!(block.text(), Some("item"));
        assert!(block.is_list_item());
        assert!(!block.is_empty());
    }

    #[test]
    fn test_image_has_no_text() {
        let block = Block::Image {
            resource_id: "page1_Im0".to_string(),
            page: 1,
        };
        assert_eq!(block.text(), None);
        assert!(!block.is_empty());
    }
}
