//! PDF document parser and pipeline driver.

use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;

use crate::detect::detect_version_from_path;
use crate::error::{Error, Result};
use crate::model::{Document, Metadata, Page, Resource, ResourceType};

use super::backend::{LopdfBackend, PageId, PdfBackend};
use super::content::interpret_ops;
use super::layout::LayoutClassifier;
use super::options::{ErrorMode, ParseOptions};

/// PDF document parser.
///
/// Sequences the pipeline: page extraction, layout classification, and
/// document assembly. Rendering is a separate step (see [`crate::render`]).
pub struct PdfParser {
    backend: LopdfBackend,
    options: ParseOptions,
}

impl PdfParser {
    /// Open a PDF file.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        Self::open_with_options(path, ParseOptions::default())
    }

    /// Open a PDF file with custom options.
    pub fn open_with_options<P: AsRef<Path>>(path: P, options: ParseOptions) -> Result<Self> {
        let path = path.as_ref();

        // Verify it's a PDF before handing it to the backend
        detect_version_from_path(path)?;

        let backend = LopdfBackend::load_file(path)?;
        Self::from_backend(backend, options)
    }

    /// Parse a PDF from bytes.
    pub fn from_bytes(data: &[u8]) -> Result<Self> {
        Self::from_bytes_with_options(data, ParseOptions::default())
    }

    /// Parse a PDF from bytes with custom options.
    pub fn from_bytes_with_options(data: &[u8], options: ParseOptions) -> Result<Self> {
        crate::detect::detect_version_from_bytes(data)?;
        let backend = LopdfBackend::load_bytes(data)?;
        Self::from_backend(backend, options)
    }

    /// Parse a PDF from a reader.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        Self::from_reader_with_options(reader, ParseOptions::default())
    }

    /// Parse a PDF from a reader with custom options.
    pub fn from_reader_with_options<R: Read>(mut reader: R, options: ParseOptions) -> Result<Self> {
        let mut data = Vec::new();
        reader.read_to_end(&mut data)?;
        Self::from_bytes_with_options(&data, options)
    }

    fn from_backend(backend: LopdfBackend, options: ParseOptions) -> Result<Self> {
        if backend.is_encrypted() {
            // lopdf cannot decrypt password-protected documents; a supplied
            // password cannot be used either way
            if options.password.is_some() {
                log::warn!("password supplied, but decryption is not supported");
            }
            return Err(Error::Encrypted);
        }

        Ok(Self { backend, options })
    }

    /// Lazily extract pages in page-number order.
    ///
    /// The returned iterator is finite and non-restartable: each page is
    /// read from the document as it is requested and yielded exactly once.
    /// Only pages included by the options' page selection are yielded.
    pub fn pages(&self) -> Pages<'_> {
        let ids: Vec<(u32, PageId)> = self
            .backend
            .pages()
            .into_iter()
            .filter(|(num, _)| self.options.pages.includes(*num))
            .collect();

        Pages {
            parser: self,
            ids: ids.into_iter(),
        }
    }

    /// Run the full pipeline and return the classified document.
    ///
    /// One [`LayoutClassifier`] is threaded through the page sequence so
    /// heading-level inference accumulates across pages; each page is
    /// discarded as soon as it is classified.
    pub fn parse(&self) -> Result<Document> {
        let mut document = Document::new();
        document.metadata = self.extract_metadata();
        document.metadata.page_count = self.backend.pages().len() as u32;

        // Explicitly listed pages must exist; ranges are clamped silently
        if let super::options::PageSelection::Pages(ref pages) = self.options.pages {
            let total = document.metadata.page_count;
            if let Some(&bad) = pages.iter().find(|&&p| p == 0 || p > total) {
                return Err(Error::PageOutOfRange(bad, total));
            }
        }

        let mut classifier = LayoutClassifier::new();

        for page in self.pages() {
            let page = page?;
            for block in classifier.classify_page(page) {
                document.push_block(block);
            }
        }

        if self.options.extract_images {
            self.extract_resources(&mut document);
        }

        Ok(document)
    }

    /// Extract one page's fragments and image placements.
    fn extract_page(&self, page_num: u32, page_id: PageId) -> Result<Page> {
        let (width, height) = self.backend.page_size(page_id);
        let mut page = Page::new(page_num, width, height);

        let image_names = self.page_image_xobjects(page_id);

        let ops = match self.backend.page_content_ops(page_id) {
            Ok(ops) => ops,
            Err(e) => {
                if self.options.error_mode == ErrorMode::Strict {
                    return Err(e);
                }
                // Lenient: yield the page without content
                log::warn!("failed to read content of page {}: {}", page_num, e);
                return Ok(page);
            }
        };

        match interpret_ops(&self.backend, page_id, page_num, &ops, &image_names) {
            Ok(content) => {
                page.fragments = content.fragments;
                page.images = content.images;
            }
            Err(e) => {
                if self.options.error_mode == ErrorMode::Strict {
                    return Err(e);
                }
                log::warn!("failed to extract text from page {}: {}", page_num, e);
            }
        }

        Ok(page)
    }

    /// Extract document metadata from the Info dictionary.
    fn extract_metadata(&self) -> Metadata {
        let doc = self.backend.raw_doc();
        let mut metadata = Metadata::with_version(self.backend.version());

        if let Ok(info) = doc.trailer.get(b"Info") {
            if let Ok(info_ref) = info.as_reference() {
                if let Ok(info_dict) = doc.get_dictionary(info_ref) {
                    metadata.title = get_string_from_dict(info_dict, b"Title");
                    metadata.author = get_string_from_dict(info_dict, b"Author");
                    metadata.subject = get_string_from_dict(info_dict, b"Subject");
                    metadata.keywords = get_string_from_dict(info_dict, b"Keywords");
                    metadata.creator = get_string_from_dict(info_dict, b"Creator");
                    metadata.producer = get_string_from_dict(info_dict, b"Producer");

                    if let Some(date_str) = get_string_from_dict(info_dict, b"CreationDate") {
                        metadata.created = parse_pdf_date(&date_str);
                    }
                    if let Some(date_str) = get_string_from_dict(info_dict, b"ModDate") {
                        metadata.modified = parse_pdf_date(&date_str);
                    }
                }
            }
        }

        metadata.encrypted = self.backend.is_encrypted();
        metadata
    }

    /// Names of the page's image XObject resources.
    fn page_image_xobjects(&self, page_id: PageId) -> BTreeSet<Vec<u8>> {
        let doc = self.backend.raw_doc();
        let mut names = BTreeSet::new();

        let res_dict = match doc.get_dictionary(page_id) {
            Ok(page_dict) => match page_dict.get(b"Resources") {
                Ok(lopdf::Object::Reference(r)) => doc.get_dictionary(*r).ok(),
                Ok(lopdf::Object::Dictionary(d)) => Some(d),
                _ => None,
            },
            Err(_) => None,
        };

        let xobj_dict = match res_dict.and_then(|d| d.get(b"XObject").ok()) {
            Some(lopdf::Object::Reference(r)) => doc.get_dictionary(*r).ok(),
            Some(lopdf::Object::Dictionary(d)) => Some(d),
            _ => None,
        };

        if let Some(xobj_dict) = xobj_dict {
            for (name, obj) in xobj_dict.iter() {
                let is_image = obj
                    .as_reference()
                    .ok()
                    .and_then(|r| doc.get_object(r).ok())
                    .and_then(|o| match o {
                        lopdf::Object::Stream(s) => s
                            .dict
                            .get(b"Subtype")
                            .ok()
                            .and_then(|t| t.as_name().ok())
                            .map(|n| n == b"Image".as_slice()),
                        _ => None,
                    })
                    .unwrap_or(false);
                if is_image {
                    names.insert(name.clone());
                }
            }
        }

        names
    }

    /// Extract embedded image resources for the selected pages.
    fn extract_resources(&self, document: &mut Document) {
        let doc = self.backend.raw_doc();

        for (page_num, page_id) in self.backend.pages() {
            if !self.options.pages.includes(page_num) {
                continue;
            }
            for name in self.page_image_xobjects(page_id) {
                let obj_ref = doc
                    .get_dictionary(page_id)
                    .ok()
                    .and_then(|p| match p.get(b"Resources") {
                        Ok(lopdf::Object::Reference(r)) => doc.get_dictionary(*r).ok(),
                        Ok(lopdf::Object::Dictionary(d)) => Some(d),
                        _ => None,
                    })
                    .and_then(|res| match res.get(b"XObject") {
                        Ok(lopdf::Object::Reference(r)) => doc.get_dictionary(*r).ok(),
                        Ok(lopdf::Object::Dictionary(d)) => Some(d),
                        _ => None,
                    })
                    .and_then(|x| x.get(&name).ok())
                    .and_then(|o| o.as_reference().ok());

                if let Some(obj_ref) = obj_ref {
                    if let Ok(resource) = self.extract_xobject(obj_ref) {
                        let id = format!("page{}_{}", page_num, String::from_utf8_lossy(&name));
                        document.add_resource(id, resource);
                    }
                }
            }
        }
    }

    /// Extract an image XObject.
    fn extract_xobject(&self, obj_ref: lopdf::ObjectId) -> Result<Resource> {
        let doc = self.backend.raw_doc();
        let stream = doc
            .get_object(obj_ref)
            .map_err(|e| Error::PdfParse(e.to_string()))?;

        if let lopdf::Object::Stream(stream) = stream {
            let dict = &stream.dict;

            let width = dict
                .get(b"Width")
                .ok()
                .and_then(|w| w.as_i64().ok())
                .map(|w| w as u32);

            let height = dict
                .get(b"Height")
                .ok()
                .and_then(|h| h.as_i64().ok())
                .map(|h| h as u32);

            let filter = dict
                .get(b"Filter")
                .ok()
                .and_then(|f| f.as_name().ok())
                .unwrap_or(b"");

            let (mime_type, data) = match filter {
                b"DCTDecode" => {
                    // JPEG data can be used directly
                    ("image/jpeg", stream.content.clone())
                }
                b"JPXDecode" => ("image/jp2", stream.content.clone()),
                _ => {
                    let decoded = stream
                        .decompressed_content()
                        .unwrap_or_else(|_| stream.content.clone());
                    ("application/octet-stream", decoded)
                }
            };

            let mut resource = Resource::new(data, mime_type, ResourceType::Image);
            if let (Some(w), Some(h)) = (width, height) {
                resource = resource.with_dimensions(w, h);
            }

            return Ok(resource);
        }

        Err(Error::PdfParse("Invalid image XObject".to_string()))
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> u32 {
        self.backend.pages().len() as u32
    }

    /// PDF version.
    pub fn version(&self) -> String {
        self.backend.version()
    }
}

/// Lazy page sequence produced by [`PdfParser::pages`].
pub struct Pages<'a> {
    parser: &'a PdfParser,
    ids: std::vec::IntoIter<(u32, PageId)>,
}

impl Iterator for Pages<'_> {
    type Item = Result<Page>;

    fn next(&mut self) -> Option<Self::Item> {
        let (page_num, page_id) = self.ids.next()?;
        Some(self.parser.extract_page(page_num, page_id))
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.ids.size_hint()
    }
}

/// Get a string from a PDF dictionary, decoding UTF-16BE when marked.
fn get_string_from_dict(dict: &lopdf::Dictionary, key: &[u8]) -> Option<String> {
    dict.get(key).ok().and_then(|obj| match obj {
        lopdf::Object::String(bytes, _) => {
            if bytes.len() >= 2 && bytes[0] == 0xFE && bytes[1] == 0xFF {
                let utf16: Vec<u16> = bytes[2..]
                    .chunks(2)
                    .filter_map(|c| {
                        if c.len() == 2 {
                            Some(u16::from_be_bytes([c[0], c[1]]))
                        } else {
                            None
                        }
                    })
                    .collect();
                String::from_utf16(&utf16).ok()
            } else {
                String::from_utf8(bytes.clone())
                    .ok()
                    .or_else(|| Some(bytes.iter().map(|&b| b as char).collect()))
            }
        }
        lopdf::Object::Name(bytes) => String::from_utf8(bytes.clone()).ok(),
        _ => None,
    })
}

/// Parse a PDF date string (D:YYYYMMDDHHmmSSOHH'mm').
fn parse_pdf_date(s: &str) -> Option<chrono::DateTime<chrono::Utc>> {
    let s = s.strip_prefix("D:")?;

    // At minimum we need YYYY
    if s.len() < 4 {
        return None;
    }

    let year: i32 = s.get(0..4)?.parse().ok()?;
    let month: u32 = s.get(4..6).and_then(|m| m.parse().ok()).unwrap_or(1);
    let day: u32 = s.get(6..8).and_then(|d| d.parse().ok()).unwrap_or(1);
    let hour: u32 = s.get(8..10).and_then(|h| h.parse().ok()).unwrap_or(0);
    let minute: u32 = s.get(10..12).and_then(|m| m.parse().ok()).unwrap_or(0);
    let second: u32 = s.get(12..14).and_then(|s| s.parse().ok()).unwrap_or(0);

    chrono::NaiveDate::from_ymd_opt(year, month, day)
        .and_then(|date| date.and_hms_opt(hour, minute, second))
        .map(|dt| chrono::DateTime::from_naive_utc_and_offset(dt, chrono::Utc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;

    #[test]
    fn test_parse_pdf_date() {
        let date = parse_pdf_date("D:20240115103045").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 15);
    }

    #[test]
    fn test_parse_pdf_date_minimal() {
        let date = parse_pdf_date("D:2024").unwrap();
        assert_eq!(date.year(), 2024);
        assert_eq!(date.month(), 1);
        assert_eq!(date.day(), 1);
    }

    #[test]
    fn test_parse_pdf_date_invalid() {
        assert!(parse_pdf_date("20240101").is_none());
        assert!(parse_pdf_date("D:20").is_none());
    }

    #[test]
    fn test_open_missing_file() {
        let result = PdfParser::open("/nonexistent/document.pdf");
        assert!(matches!(result, Err(Error::Io(_))));
    }

    #[test]
    fn test_from_bytes_not_a_pdf() {
        let result = PdfParser::from_bytes(b"this is not a pdf at all");
        assert!(matches!(result, Err(Error::UnknownFormat)));
    }
}
