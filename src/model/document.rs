//! Document-level types.

use super::{Block, Resource};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A converted document: ordered blocks spanning all pages.
///
/// Invariant: block order matches reading order — top-to-bottom,
/// left-to-right within a page, pages in ascending order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Document metadata (title, author, etc.)
    pub metadata: Metadata,

    /// Classified blocks in reading order
    pub blocks: Vec<Block>,

    /// Embedded image resources, keyed `page{N}_{name}`
    pub resources: BTreeMap<String, Resource>,
}

impl Document {
    /// Create a new empty document.
    pub fn new() -> Self {
        Self {
            metadata: Metadata::default(),
            blocks: Vec::new(),
            resources: BTreeMap::new(),
        }
    }

    /// Number of pages the source document reported.
    pub fn page_count(&self) -> u32 {
        self.metadata.page_count
    }

    /// Append a block, preserving reading order.
    pub fn push_block(&mut self, block: Block) {
        self.blocks.push(block);
    }

    /// Add an image resource.
    pub fn add_resource(&mut self, id: String, resource: Resource) {
        self.resources.insert(id, resource);
    }

    /// Get a resource by ID.
    pub fn get_resource(&self, id: &str) -> Option<&Resource> {
        self.resources.get(id)
    }

    /// Check if the document has any blocks.
    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Plain text content of the entire document, blocks joined by
    /// blank lines.
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .filter_map(|b| b.text())
            .collect::<Vec<_>>()
            .join("\n\n")
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::new()
    }
}

/// Document metadata from the PDF Info dictionary.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Metadata {
    /// Document title
    pub title: Option<String>,

    /// Document author
    pub author: Option<String>,

    /// Document subject
    pub subject: Option<String>,

    /// Keywords
    pub keywords: Option<String>,

    /// Creator application
    pub creator: Option<String>,

    /// PDF producer
    pub producer: Option<String>,

    /// Creation date
    pub created: Option<DateTime<Utc>>,

    /// Last modification date
    pub modified: Option<DateTime<Utc>>,

    /// PDF version (e.g., "1.7")
    pub pdf_version: String,

    /// Total number of pages
    pub page_count: u32,

    /// Whether the document is encrypted
    pub encrypted: bool,
}

impl Metadata {
    /// Create new metadata with a PDF version.
    pub fn with_version(version: impl Into<String>) -> Self {
        Self {
            pdf_version: version.into(),
            ..Default::default()
        }
    }

    /// Convert metadata to YAML frontmatter format.
    pub fn to_yaml_frontmatter(&self) -> String {
        let mut lines = vec!["---".to_string()];

        if let Some(ref title) = self.title {
            lines.push(format!("title: \"{}\"", escape_yaml(title)));
        }
        if let Some(ref author) = self.author {
            lines.push(format!("author: \"{}\"", escape_yaml(author)));
        }
        if let Some(ref subject) = self.subject {
            lines.push(format!("subject: \"{}\"", escape_yaml(subject)));
        }
        if let Some(ref keywords) = self.keywords {
            lines.push(format!("keywords: \"{}\"", escape_yaml(keywords)));
        }
        if let Some(ref creator) = self.creator {
            lines.push(format!("creator: \"{}\"", escape_yaml(creator)));
        }
        if let Some(ref producer) = self.producer {
            lines.push(format!("producer: \"{}\"", escape_yaml(producer)));
        }
        if let Some(ref created) = self.created {
            lines.push(format!("created: {}", created.to_rfc3339()));
        }
        if let Some(ref modified) = self.modified {
            lines.push(format!("modified: {}", modified.to_rfc3339()));
        }

        lines.push(format!("pdf_version: \"{}\"", self.pdf_version));
        lines.push(format!("pages: {}", self.page_count));

        lines.push("---".to_string());
        lines.push(String::new());

        lines.join("\n")
    }
}

/// Escape special characters for YAML strings.
fn escape_yaml(s: &str) -> String {
    s.replace('\\', "\\\\")
        .replace('"', "\\\"")
        .replace('\n', "\\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_new() {
        let doc = Document::new();
        assert!(doc.is_empty());
        assert_eq!(doc.page_count(), 0);
    }

    #[test]
    fn test_plain_text_order() {
        let mut doc = Document::new();
        doc.push_block(Block::heading(1, "Title", 1));
        doc.push_block(Block::paragraph("Body text.", 1));

        assert_eq!(doc.plain_text(), "Title\n\nBody text.");
    }

    #[test]
    fn test_metadata_frontmatter() {
        let mut metadata = Metadata::with_version("1.7");
        metadata.title = Some("Test Document".to_string());
        metadata.author = Some("John Doe".to_string());
        metadata.page_count = 10;

        let yaml = metadata.to_yaml_frontmatter();
        assert!(yaml.contains("title: \"Test Document\""));
        assert!(yaml.contains("author: \"John Doe\""));
        assert!(yaml.contains("pdf_version: \"1.7\""));
        assert!(yaml.contains("pages: 10"));
    }

    #[test]
    fn test_yaml_escaping() {
        let mut metadata = Metadata::with_version("1.4");
        metadata.title = Some("He said \"hi\"".to_string());

        let yaml = metadata.to_yaml_frontmatter();
        assert!(yaml.contains("title: \"He said \\\"hi\\\"\""));
    }
}
