//! Error type shared across the export pipeline.

use std::fmt;

/// Errors produced by region conversion, clip extraction, and export.
///
/// Region emptiness is expected in normal interaction (the viewer reacts
/// by disabling export, not by showing a dialog); the remaining variants
/// indicate a bad selection or an unreadable source and are surfaced to
/// the user as-is.
#[derive(Debug, Clone, PartialEq)]
pub enum SnipError {
    /// The selection clamps to (near-)zero area in page space.
    EmptyRegion,
    /// The source document or page could not be read.
    SourceUnavailable(String),
    /// Building the clipped page failed.
    Extraction(String),
    /// Export was invoked on a clipped page without usable dimensions.
    EmptyInput,
    /// Serializing the clipped page failed.
    Export(String),
    /// Anything else, from collaborating layers.
    Other(String),
}

impl fmt::Display for SnipError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SnipError::EmptyRegion => write!(f, "selected region is empty"),
            SnipError::SourceUnavailable(msg) => write!(f, "source unavailable: {msg}"),
            SnipError::Extraction(msg) => write!(f, "extraction failed: {msg}"),
            SnipError::EmptyInput => write!(f, "nothing to export"),
            SnipError::Export(msg) => write!(f, "export failed: {msg}"),
            SnipError::Other(msg) => write!(f, "{msg}"),
        }
    }
}

impl std::error::Error for SnipError {}
