//! Embedded image resources.

use serde::{Deserialize, Serialize};

/// An embedded resource extracted from the document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Resource {
    /// Raw binary data
    #[serde(skip_serializing)]
    pub data: Vec<u8>,

    /// MIME type (e.g., "image/jpeg")
    pub mime_type: String,

    /// Resource type
    pub resource_type: ResourceType,

    /// Width in pixels (for images)
    pub width: Option<u32>,

    /// Height in pixels (for images)
    pub height: Option<u32>,
}

impl Resource {
    /// Create a new resource.
    pub fn new(data: Vec<u8>, mime_type: impl Into<String>, resource_type: ResourceType) -> Self {
        Self {
            data,
            mime_type: mime_type.into(),
            resource_type,
            width: None,
            height: None,
        }
    }

    /// Create an image resource.
    pub fn image(data: Vec<u8>, mime_type: impl Into<String>) -> Self {
        Self::new(data, mime_type, ResourceType::Image)
    }

    /// Set image dimensions.
    pub fn with_dimensions(mut self, width: u32, height: u32) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    /// Size of the resource data in bytes.
    pub fn size(&self) -> usize {
        self.data.len()
    }

    /// Check if this is an image resource.
    pub fn is_image(&self) -> bool {
        matches!(self.resource_type, ResourceType::Image)
    }

    /// Suggested filename for exporting this resource.
    pub fn suggested_filename(&self, id: &str) -> String {
        format!("{}.{}", id, self.extension())
    }

    /// File extension derived from the MIME type.
    pub fn extension(&self) -> &str {
        match self.mime_type.as_str() {
            "image/jpeg" => "jpg",
            "image/png" => "png",
            "image/jp2" | "image/jpeg2000" => "jp2",
            // Raw image data without a recognized container
            _ if self.is_image() => "raw",
            _ => "bin",
        }
    }
}

/// Type of embedded resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceType {
    /// Image (JPEG, PNG, etc.)
    Image,
    /// Other/unknown
    Other,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resource_new() {
        let res = Resource::image(vec![0xFF, 0xD8, 0xFF], "image/jpeg");
        assert!(res.is_image());
        assert_eq!(res.mime_type, "image/jpeg");
        assert_eq!(res.extension(), "jpg");
        assert_eq!(res.size(), 3);
    }

    #[test]
    fn test_suggested_filename() {
        let res = Resource::image(vec![], "image/jpeg");
        assert_eq!(res.suggested_filename("page1_Im0"), "page1_Im0.jpg");

        let raw = Resource::image(vec![], "application/octet-stream");
        assert_eq!(raw.suggested_filename("page2_Im1"), "page2_Im1.raw");
    }

    #[test]
    fn test_dimensions() {
        let res = Resource::image(vec![], "image/png").with_dimensions(640, 480);
        assert_eq!(res.width, Some(640));
        assert_eq!(res.height, Some(480));
    }
}
