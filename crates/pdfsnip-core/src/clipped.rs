//! Region extraction.
//!
//! A [`ClippedPage`] is a derived single-page document sized to a clip
//! region. Content is shifted so the region's top-left corner becomes the
//! origin, and objects that lie entirely outside the region are dropped.
//! Objects that straddle the boundary are kept whole; the serializer trims
//! them with a vector clip path, so partially visible text stays real text
//! rather than being cut into outlines here.

use crate::content::{PageContent, PageItem, PlacedImage, TextRun};
use crate::error::SnipError;
use crate::geometry::ClipRegion;
use crate::painting::PaintedPath;

/// A rectangular excerpt of a page, with its own coordinate origin.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ClippedPage {
    /// Excerpt width in points.
    pub width: f64,
    /// Excerpt height in points.
    pub height: f64,
    /// Drawn objects in paint order, in excerpt coordinates.
    pub items: Vec<PageItem>,
}

impl ClippedPage {
    /// Extract the content inside `region` from a page.
    ///
    /// The region is clamped to the page bounds first; a region that is
    /// degenerate after clamping yields [`SnipError::EmptyRegion`]. A
    /// region over blank page area succeeds with no items.
    pub fn extract(content: &PageContent, region: ClipRegion) -> Result<ClippedPage, SnipError> {
        let region = region.clamped_to(content.width, content.height);
        if region.is_degenerate() {
            return Err(SnipError::EmptyRegion);
        }

        let items = content
            .items
            .iter()
            .filter(|item| match item.bbox() {
                Some(bbox) => region.intersects(&bbox),
                None => false,
            })
            .map(|item| item.translate(-region.x0, -region.y0))
            .collect();

        Ok(ClippedPage {
            width: region.width(),
            height: region.height(),
            items,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn texts(&self) -> impl Iterator<Item = &TextRun> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Text(run) => Some(run),
            _ => None,
        })
    }

    pub fn paths(&self) -> impl Iterator<Item = &PaintedPath> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Path(path) => Some(path),
            _ => None,
        })
    }

    pub fn images(&self) -> impl Iterator<Item = &PlacedImage> {
        self.items.iter().filter_map(|item| match item {
            PageItem::Image(image) => Some(image),
            _ => None,
        })
    }
}
