//! pdfsnip: select a rectangular region of a PDF page and export it as a
//! standalone SVG.
//!
//! This is the public API facade crate for pdfsnip-rs. It re-exports types
//! from pdfsnip-core and uses pdfsnip-parse for PDF reading and content
//! interpretation.
//!
//! # Architecture
//!
//! - **pdfsnip-core**: backend-independent geometry, view and selection
//!   state, the clipped-page model, export transforms, and the SVG
//!   serializer
//! - **pdfsnip-parse**: document access via lopdf and the content stream
//!   interpreter that produces page content
//! - **pdfsnip** (this crate): `Pdf` and `Page` handles tying everything
//!   together
//!
//! # Example
//!
//! ```ignore
//! use pdfsnip::{ClipRegion, ExportOptions, Pdf};
//!
//! let pdf = Pdf::open("report.pdf", None)?;
//! let page = pdf.page(0)?;
//! let svg = page.export_region(
//!     ClipRegion::new(100.0, 100.0, 300.0, 200.0),
//!     &ExportOptions::default(),
//! )?;
//! std::fs::write("figure.svg", svg)?;
//! ```

pub use pdfsnip_core;
pub use pdfsnip_parse;

mod page;
mod pdf;

pub use page::Page;
pub use pdf::{PagesIter, Pdf};

pub use pdfsnip_core::{
    ClipRegion, ClippedPage, ExportOptions, PageContent, PageGeometry, Rotation, Selection,
    SelectionRect, SnipError, ViewState, export, page_to_viewport, viewport_to_page,
};
pub use pdfsnip_parse::ContentLimits;
