//! Error types for the pdf2md library.
//!
//! Every variant here means the same thing to a caller: the input document
//! could not be read. Layout classification and Markdown rendering are
//! best-effort and never produce errors; the only failures this crate
//! surfaces come from opening and parsing the PDF itself.

use std::io;
use thiserror::Error;

/// Result type alias for pdf2md operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised while reading a PDF document.
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error when reading the input file.
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// The file format is not recognized as PDF.
    #[error("Unknown file format: not a valid PDF")]
    UnknownFormat,

    /// The PDF version is not supported.
    #[error("Unsupported PDF version: {0}")]
    UnsupportedVersion(String),

    /// Error parsing PDF structure.
    #[error("PDF parsing error: {0}")]
    PdfParse(String),

    /// The PDF document is encrypted and cannot be opened.
    #[error("Document is encrypted")]
    Encrypted,

    /// Page number is out of range.
    #[error("Page {0} is out of range (document has {1} pages)")]
    PageOutOfRange(u32, u32),

    /// Invalid page range specification.
    #[error("Invalid page range: {0}")]
    InvalidPageRange(String),
}

impl From<lopdf::Error> for Error {
    fn from(err: lopdf::Error) -> Self {
        match err {
            lopdf::Error::IO(e) => Error::Io(e),
            lopdf::Error::Decryption(_) => Error::Encrypted,
            _ => Error::PdfParse(err.to_string()),
        }
    }
}
