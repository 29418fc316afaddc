//! Top-level PDF document type for opening pages and exporting regions.

use std::path::Path as FilePath;

use pdfsnip_core::SnipError;
use pdfsnip_parse::{ContentLimits, SnipDocument, interpret_page};

use crate::Page;

/// Iterator over pages of a PDF document, yielding each page on demand.
///
/// Created by [`Pdf::pages_iter()`]. Each call to [`next()`](Iterator::next)
/// interprets one page's content stream. Pages are not retained after being
/// yielded; the caller owns the `Page` value.
pub struct PagesIter<'a> {
    pdf: &'a Pdf,
    current: usize,
    count: usize,
}

impl<'a> Iterator for PagesIter<'a> {
    type Item = Result<Page, SnipError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.current >= self.count {
            return None;
        }
        let result = self.pdf.page(self.current);
        self.current += 1;
        Some(result)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.current;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for PagesIter<'_> {}

/// A PDF document opened for region export.
///
/// Wraps a parsed PDF and provides access to pages whose content can be
/// clipped and serialized.
///
/// # Example
///
/// ```ignore
/// let pdf = Pdf::open("report.pdf", None)?;
/// let page = pdf.page(0)?;
/// let clipped = page.clip(ClipRegion::new(72.0, 72.0, 540.0, 400.0))?;
/// ```
#[derive(Debug)]
pub struct Pdf {
    doc: SnipDocument,
    limits: ContentLimits,
}

impl Pdf {
    /// Open a PDF document from a file path.
    ///
    /// # Arguments
    ///
    /// * `path` - Path to the PDF file.
    /// * `limits` - Interpreter resource limits. Uses defaults if `None`.
    ///
    /// # Errors
    ///
    /// Returns [`SnipError::SourceUnavailable`] if the file cannot be read,
    /// is not a valid PDF, or is encrypted.
    pub fn open(
        path: impl AsRef<FilePath>,
        limits: Option<ContentLimits>,
    ) -> Result<Self, SnipError> {
        let doc = SnipDocument::open(path)?;
        Ok(Self {
            doc,
            limits: limits.unwrap_or_default(),
        })
    }

    /// Open a PDF document from bytes already in memory.
    ///
    /// # Errors
    ///
    /// Returns [`SnipError::SourceUnavailable`] if the bytes are not a
    /// valid PDF document or the document is encrypted.
    pub fn from_bytes(bytes: &[u8], limits: Option<ContentLimits>) -> Result<Self, SnipError> {
        let doc = SnipDocument::from_bytes(bytes)?;
        Ok(Self {
            doc,
            limits: limits.unwrap_or_default(),
        })
    }

    /// Number of pages in the document.
    pub fn page_count(&self) -> usize {
        self.doc.page_count()
    }

    /// Return a streaming iterator over all pages in the document.
    ///
    /// Each page is interpreted on demand when [`Iterator::next()`] is
    /// called and not retained afterwards, so memory usage stays bounded
    /// regardless of document size.
    pub fn pages_iter(&self) -> PagesIter<'_> {
        PagesIter {
            pdf: self,
            current: 0,
            count: self.page_count(),
        }
    }

    /// Access a page by zero-based index, interpreting its content.
    ///
    /// Returns a [`Page`] holding everything drawn on the page in page
    /// space (points, top-left origin, y-down), ready for clipping.
    ///
    /// # Errors
    ///
    /// Returns [`SnipError::SourceUnavailable`] when the index is out of
    /// range or the page cannot be read, and [`SnipError::Extraction`] when
    /// content interpretation fails.
    pub fn page(&self, index: usize) -> Result<Page, SnipError> {
        let bounds = self.doc.page_bounds(index)?;
        let content = interpret_page(&self.doc, index, &self.limits)?;
        Ok(Page::new(index, bounds.rotation, content))
    }
}
