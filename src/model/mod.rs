//! Document model types for PDF content representation.
//!
//! This module defines the intermediate representation that bridges PDF
//! extraction and Markdown rendering. Extraction produces [`Page`] values
//! full of positioned [`TextFragment`]s; classification turns them into
//! ordered [`Block`]s collected in a [`Document`].

mod block;
mod document;
mod fragment;
mod resource;

pub use block::Block;
pub use document::{Document, Metadata};
pub use fragment::{ImagePlacement, Page, TextFragment};
pub use resource::{Resource, ResourceType};
