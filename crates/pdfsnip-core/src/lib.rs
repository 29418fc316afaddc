//! pdfsnip-core: backend-independent types and algorithms for region
//! selection and vector export.
//!
//! This crate covers the pure half of the pipeline: coordinate spaces and
//! their conversions (page, render, viewport), the drag-selection state
//! machine, the clipped-page content model, the export transforms, and the
//! SVG serializer. It does no PDF parsing and no I/O; a backend crate
//! produces [`PageContent`] and a collaborator decides where the SVG text
//! goes.

pub mod clipped;
pub mod content;
pub mod error;
pub mod geometry;
pub mod painting;
pub mod path;
pub mod selection;
pub mod svg;
pub mod transform;
pub mod view;

pub use clipped::ClippedPage;
pub use content::{Glyph, ImageData, ImageFormat, PageContent, PageItem, PlacedImage, TextRun};
pub use error::SnipError;
pub use geometry::{BBox, ClipRegion, Ctm, EMPTY_EPSILON_PTS, Point};
pub use painting::{Color, DashPattern, FillRule, GraphicsState, PaintedPath};
pub use path::{Path, PathBuilder, PathSegment};
pub use selection::{MIN_COMMIT_AREA_PX, Selection, SelectionRect};
pub use transform::{ExportOptions, export};
pub use view::{
    MAX_ZOOM, MIN_ZOOM, PageGeometry, Rotation, ViewState, page_to_viewport, viewport_to_page,
};
