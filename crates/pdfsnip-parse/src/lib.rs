//! pdfsnip-parse: PDF parsing backend and content stream interpreter.
//!
//! This crate turns a PDF file into the drawn-object model defined in
//! pdfsnip-core: it opens documents via lopdf, tokenizes page content
//! streams, and interprets them into text runs, painted paths, and placed
//! images with all coordinates already in page space (top-left origin,
//! y down).
//!
//! The entry points are [`SnipDocument`] for document access and
//! [`interpret_page`] for reading one page's drawn content.

pub mod document;
pub mod error;
pub mod interpreter;
pub mod tokenizer;

mod cmap;
mod fonts;
mod graphics;
mod text_state;

pub use document::{PageBounds, SnipDocument};
pub use error::BackendError;
pub use interpreter::{ContentLimits, interpret_page};
pub use pdfsnip_core;
pub use tokenizer::{Operand, Operator, tokenize};
