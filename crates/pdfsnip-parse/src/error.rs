//! Error types for the parsing and interpreter layers.
//!
//! Uses [`thiserror`] for ergonomic error derivation. Provides [`BackendError`]
//! that wraps document-access and interpreter errors and converts them to
//! [`SnipError`] for the public API.

use pdfsnip_core::SnipError;
use thiserror::Error;

/// Error type for PDF document access and content interpretation.
#[derive(Debug, Error)]
pub enum BackendError {
    /// Error from PDF parsing (structure, syntax, object resolution).
    #[error("PDF parse error: {0}")]
    Parse(String),

    /// Error reading PDF data.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The requested page index does not exist in the document.
    #[error("page {0} not found")]
    PageNotFound(usize),

    /// The document is encrypted and cannot be read.
    #[error("document is encrypted")]
    Encrypted,

    /// Error during content stream interpretation.
    #[error("interpreter error: {0}")]
    Interpreter(String),

    /// A resource limit was exceeded while interpreting content.
    #[error("content limit exceeded: {0}")]
    ContentLimit(String),
}

impl From<lopdf::Error> for BackendError {
    fn from(err: lopdf::Error) -> Self {
        BackendError::Parse(err.to_string())
    }
}

impl From<BackendError> for SnipError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Parse(_)
            | BackendError::Io(_)
            | BackendError::PageNotFound(_)
            | BackendError::Encrypted => SnipError::SourceUnavailable(err.to_string()),
            BackendError::Interpreter(_) | BackendError::ContentLimit(_) => {
                SnipError::Extraction(err.to_string())
            }
        }
    }
}
