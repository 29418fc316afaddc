use std::path::Path;

use pdfsnip::{Page, Pdf};

/// Open a PDF file with user-friendly error messages.
///
/// Returns `Err(1)` with a message printed to stderr if the file is not
/// found or cannot be parsed as a valid PDF.
pub fn open_pdf(file: &Path) -> Result<Pdf, i32> {
    if !file.exists() {
        eprintln!("Error: file not found: {}", file.display());
        return Err(1);
    }

    Pdf::open(file, None).map_err(|e| {
        eprintln!("Error: failed to open PDF: {e}");
        1
    })
}

/// Load a 1-indexed page, validating it against the document page count.
pub fn load_page(pdf: &Pdf, page: usize) -> Result<Page, i32> {
    let count = pdf.page_count();
    if page == 0 {
        eprintln!("Error: page 0 is invalid (pages start at 1)");
        return Err(1);
    }
    if page > count {
        eprintln!("Error: page {page} exceeds document page count ({count})");
        return Err(1);
    }

    pdf.page(page - 1).map_err(|e| {
        eprintln!("Error: failed to read page {page}: {e}");
        1
    })
}
