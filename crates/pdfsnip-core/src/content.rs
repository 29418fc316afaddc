//! Page content model.
//!
//! A [`PageContent`] holds everything drawn on one page, in paint order.
//! Text, vector paths, and raster images share a single item list because
//! later items cover earlier ones; keeping them interleaved preserves that
//! stacking when the content is re-serialized.
//!
//! All coordinates are in page space: points, origin at the top-left of
//! the page, y increasing downward.

use crate::geometry::{BBox, Ctm, Point};
use crate::painting::{Color, PaintedPath};
use crate::path::Path;

/// One positioned glyph within a text run.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Glyph {
    /// Character code as it appeared in the content stream.
    pub code: u32,
    /// Unicode text for the glyph, empty if unmapped.
    pub text: String,
    /// Pen offset from the run origin, in text space units.
    pub dx: f64,
    /// Positioning adjustment applied before this glyph (`TJ` numbers),
    /// in text space units. Zero when the glyph sits at its natural
    /// position.
    pub kern: f64,
    /// Natural advance of the glyph including character and word spacing,
    /// in text space units.
    pub advance: f64,
    /// Glyph id in the embedded font program, if resolved.
    pub gid: Option<u16>,
    /// Glyph outline in normalized glyph space: 1 unit equals 1 point at
    /// font size 1.0, origin on the baseline, y increasing downward.
    pub outline: Option<Path>,
}

/// A run of glyphs produced by one text-showing operator.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TextRun {
    /// Base font name with any subset prefix stripped.
    pub font: String,
    /// Font size from `Tf`, in text space units.
    pub size: f64,
    /// Horizontal scaling from `Tz`, normalized (1.0 = 100%).
    pub h_scale: f64,
    /// Maps run-local text space (y up, origin at the run start baseline)
    /// to page space.
    pub matrix: Ctm,
    pub fill_color: Color,
    pub fill_alpha: f64,
    pub glyphs: Vec<Glyph>,
}

impl TextRun {
    /// Concatenated Unicode text of all glyphs.
    pub fn text(&self) -> String {
        self.glyphs.iter().map(|g| g.text.as_str()).collect()
    }

    /// Horizontal extent of the run in text space units.
    pub fn total_advance(&self) -> f64 {
        match self.glyphs.last() {
            Some(g) => g.dx + g.advance,
            None => 0.0,
        }
    }

    /// Conservative bounding box in page space.
    ///
    /// Uses a run-local band one font size above and below the baseline,
    /// which covers ascenders and descenders for any real typeface.
    pub fn bbox(&self) -> Option<BBox> {
        if self.glyphs.is_empty() {
            return None;
        }
        let w = self.total_advance();
        let s = self.size;
        let corners = [
            Point::new(0.0, -s),
            Point::new(w, -s),
            Point::new(0.0, s),
            Point::new(w, s),
        ]
        .map(|p| self.matrix.transform_point(p));
        BBox::around_points(&corners)
    }

    /// Shift the run by `(dx, dy)` in page space.
    pub fn translate(&self, dx: f64, dy: f64) -> TextRun {
        TextRun {
            matrix: self.matrix.concat(&Ctm::translation(dx, dy)),
            ..self.clone()
        }
    }
}

/// Encoding of embedded raster data.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ImageFormat {
    Jpeg,
}

impl ImageFormat {
    pub fn mime_type(self) -> &'static str {
        match self {
            ImageFormat::Jpeg => "image/jpeg",
        }
    }
}

/// Compressed raster bytes taken verbatim from the source stream.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ImageData {
    pub format: ImageFormat,
    pub bytes: Vec<u8>,
}

/// A raster image placed on the page.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PlacedImage {
    /// Resource name the image was drawn under.
    pub name: String,
    /// Maps the unit square to the image's page space footprint.
    pub matrix: Ctm,
    /// Pixel dimensions of the raster data.
    pub width_px: u32,
    pub height_px: u32,
    pub alpha: f64,
    pub data: ImageData,
}

impl PlacedImage {
    /// Bounding box of the placed footprint in page space.
    pub fn bbox(&self) -> Option<BBox> {
        let corners = [
            Point::new(0.0, 0.0),
            Point::new(1.0, 0.0),
            Point::new(0.0, 1.0),
            Point::new(1.0, 1.0),
        ]
        .map(|p| self.matrix.transform_point(p));
        BBox::around_points(&corners)
    }

    /// Shift the placement by `(dx, dy)` in page space.
    pub fn translate(&self, dx: f64, dy: f64) -> PlacedImage {
        PlacedImage {
            matrix: self.matrix.concat(&Ctm::translation(dx, dy)),
            ..self.clone()
        }
    }
}

/// One drawn object, in paint order.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PageItem {
    Text(TextRun),
    Path(PaintedPath),
    Image(PlacedImage),
}

impl PageItem {
    pub fn bbox(&self) -> Option<BBox> {
        match self {
            PageItem::Text(run) => run.bbox(),
            PageItem::Path(path) => path.bbox(),
            PageItem::Image(image) => image.bbox(),
        }
    }

    pub fn translate(&self, dx: f64, dy: f64) -> PageItem {
        match self {
            PageItem::Text(run) => PageItem::Text(run.translate(dx, dy)),
            PageItem::Path(path) => PageItem::Path(path.translate(dx, dy)),
            PageItem::Image(image) => PageItem::Image(image.translate(dx, dy)),
        }
    }
}

/// Everything drawn on one page.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageContent {
    /// Page width in points.
    pub width: f64,
    /// Page height in points.
    pub height: f64,
    /// Drawn objects in paint order.
    pub items: Vec<PageItem>,
    /// Non-fatal problems encountered while reading the page.
    pub warnings: Vec<String>,
}

impl PageContent {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            width,
            height,
            items: Vec::new(),
            warnings: Vec::new(),
        }
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
