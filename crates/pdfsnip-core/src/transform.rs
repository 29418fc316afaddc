//! Export transforms.
//!
//! [`export`] runs the optional cleanup passes in a fixed order and then
//! serializes the result:
//!
//! 1. [`remove_kerning`]
//! 2. [`flatten_text`] (when text is not preserved)
//! 3. [`remove_white_background`]
//! 4. [`grayscale`]
//!
//! Kerning removal runs before flattening because flattened outlines bake
//! glyph positions into path coordinates; afterwards there is no kerning
//! metadata left to strip.

use crate::clipped::ClippedPage;
use crate::content::PageItem;
use crate::error::SnipError;
use crate::geometry::Ctm;
use crate::painting::{FillRule, PaintedPath};
use crate::path::{Path, PathSegment};
use crate::svg;

/// Minimum share of the page area a white fill must cover to count as a
/// background.
pub const WHITE_BG_COVERAGE: f64 = 0.99;

const OPAQUE_EPS: f64 = 1e-6;

/// Which transforms to apply before serialization.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    /// Keep glyph runs as text elements. When false, runs with usable
    /// outlines are converted to filled paths.
    pub preserve_text: bool,
    /// Zero out manual glyph position adjustments.
    pub remove_kerning: bool,
    /// Drop a full-page white fill behind the content.
    pub remove_white_background: bool,
    /// Collapse all fill and stroke colors to grays of equal luminance.
    pub grayscale: bool,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            preserve_text: true,
            remove_kerning: false,
            remove_white_background: false,
            grayscale: false,
        }
    }
}

impl ExportOptions {
    pub fn with_preserve_text(mut self, preserve: bool) -> Self {
        self.preserve_text = preserve;
        self
    }

    pub fn with_remove_kerning(mut self, remove: bool) -> Self {
        self.remove_kerning = remove;
        self
    }

    pub fn with_remove_white_background(mut self, remove: bool) -> Self {
        self.remove_white_background = remove;
        self
    }

    pub fn with_grayscale(mut self, grayscale: bool) -> Self {
        self.grayscale = grayscale;
        self
    }
}

/// Run the configured transforms and serialize to SVG text.
///
/// The output is deterministic: the same clipped page and options always
/// produce byte-identical SVG.
pub fn export(clipped: &ClippedPage, options: &ExportOptions) -> Result<String, SnipError> {
    if !(clipped.width > 0.0 && clipped.height > 0.0) {
        return Err(SnipError::EmptyInput);
    }

    let mut page = clipped.clone();
    if options.remove_kerning {
        remove_kerning(&mut page);
    }
    if !options.preserve_text {
        flatten_text(&mut page);
    }
    if options.remove_white_background {
        remove_white_background(&mut page);
    }
    if options.grayscale {
        grayscale(&mut page);
    }
    Ok(svg::serialize(&page))
}

/// Strip manual position adjustments so natural advances apply.
///
/// Each glyph's pen offset has the accumulated adjustments up to and
/// including its own subtracted out, returning every glyph to the position
/// the font's advance widths would have given it.
pub fn remove_kerning(page: &mut ClippedPage) {
    for item in &mut page.items {
        if let PageItem::Text(run) = item {
            let mut accumulated = 0.0;
            for glyph in &mut run.glyphs {
                accumulated += glyph.kern;
                glyph.dx -= accumulated;
                glyph.kern = 0.0;
            }
        }
    }
}

/// Replace glyph runs with filled outline paths.
///
/// A run is converted only when every glyph in it carries an outline;
/// runs from fonts without usable outline data are left as text. This is
/// best-effort and never fails.
pub fn flatten_text(page: &mut ClippedPage) {
    for item in &mut page.items {
        let PageItem::Text(run) = item else {
            continue;
        };
        if run.glyphs.is_empty() || run.glyphs.iter().any(|g| g.outline.is_none()) {
            continue;
        }

        let mut segments: Vec<PathSegment> = Vec::new();
        for glyph in &run.glyphs {
            let Some(outline) = &glyph.outline else {
                continue;
            };
            // Normalized glyph space (y down, unit em at size 1) into the
            // run's text space (y up), then into page space.
            let placement = Ctm::new(
                run.size * run.h_scale,
                0.0,
                0.0,
                -run.size,
                glyph.dx,
                0.0,
            )
            .concat(&run.matrix);
            segments.extend(outline.transform(&placement).segments);
        }

        *item = PageItem::Path(PaintedPath {
            path: Path { segments },
            stroke: false,
            fill: true,
            fill_rule: FillRule::NonZeroWinding,
            line_width: 0.0,
            stroke_color: run.fill_color,
            fill_color: run.fill_color,
            stroke_alpha: run.fill_alpha,
            fill_alpha: run.fill_alpha,
            dash_pattern: Default::default(),
        });
    }
}

fn is_white_background(painted: &PaintedPath, page_w: f64, page_h: f64) -> bool {
    if !painted.fill
        || painted.stroke
        || !painted.fill_color.is_white()
        || painted.fill_alpha < 1.0 - OPAQUE_EPS
    {
        return false;
    }
    let Some(rect) = painted.path.as_axis_aligned_rect() else {
        return false;
    };
    let covered_w = (rect.x1.min(page_w) - rect.x0.max(0.0)).max(0.0);
    let covered_h = (rect.bottom.min(page_h) - rect.top.max(0.0)).max(0.0);
    covered_w * covered_h >= WHITE_BG_COVERAGE * page_w * page_h
}

/// Drop opaque white rectangles that cover (almost) the whole page.
///
/// Scanned documents and some producers paint an explicit white sheet
/// under the content; removing it lets the export composite onto any
/// backdrop.
pub fn remove_white_background(page: &mut ClippedPage) {
    let (w, h) = (page.width, page.height);
    page.items.retain(|item| match item {
        PageItem::Path(painted) => !is_white_background(painted, w, h),
        _ => true,
    });
}

/// Map every fill and stroke color to a gray of equal luminance.
pub fn grayscale(page: &mut ClippedPage) {
    for item in &mut page.items {
        match item {
            PageItem::Path(painted) => {
                painted.fill_color = painted.fill_color.to_gray();
                painted.stroke_color = painted.stroke_color.to_gray();
            }
            PageItem::Text(run) => {
                run.fill_color = run.fill_color.to_gray();
            }
            PageItem::Image(_) => {}
        }
    }
}
