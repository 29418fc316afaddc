//! View state and viewport/page coordinate conversions.
//!
//! Three coordinate spaces are involved:
//!
//! - **Page space**: points, top-left origin, y-down, native (unrotated)
//!   orientation. Independent of any display state.
//! - **Render space**: pixels of the page bitmap rendered at the current
//!   zoom, in the rotated (displayed) orientation.
//! - **Viewport space**: on-screen pixels; render space shifted by the pan
//!   offset.
//!
//! [`viewport_to_page`] and [`page_to_viewport`] are exact inverses of each
//! other for regions inside the page bounds. All functions are pure: the
//! caller owns the [`ViewState`] and passes it in explicitly.

use crate::error::SnipError;
use crate::geometry::ClipRegion;
use crate::selection::SelectionRect;

/// Smallest permitted zoom factor.
pub const MIN_ZOOM: f64 = 0.1;

/// Largest permitted zoom factor.
pub const MAX_ZOOM: f64 = 10.0;

/// Multiplier applied by [`ViewState::zoom_in`].
const ZOOM_IN_FACTOR: f64 = 1.1;

/// Multiplier applied by [`ViewState::zoom_out`].
const ZOOM_OUT_FACTOR: f64 = 0.9;

/// Clockwise display rotation of a rendered page.
///
/// Only quarter turns exist; each conversion case is written out explicitly
/// rather than going through a rotation matrix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Rotation {
    #[default]
    R0,
    R90,
    R180,
    R270,
}

impl Rotation {
    /// Normalize a degree count to a quarter turn.
    ///
    /// Accepts any multiple of 90, including negatives (`-90` becomes
    /// `R270`). Returns `None` for anything else.
    pub fn from_degrees(degrees: i32) -> Option<Rotation> {
        match degrees.rem_euclid(360) {
            0 => Some(Rotation::R0),
            90 => Some(Rotation::R90),
            180 => Some(Rotation::R180),
            270 => Some(Rotation::R270),
            _ => None,
        }
    }

    pub fn degrees(&self) -> i32 {
        match self {
            Rotation::R0 => 0,
            Rotation::R90 => 90,
            Rotation::R180 => 180,
            Rotation::R270 => 270,
        }
    }

    /// Whether this rotation swaps the page's width and height on screen.
    pub fn swaps_axes(&self) -> bool {
        matches!(self, Rotation::R90 | Rotation::R270)
    }
}

/// Zoom, pan, page, and rotation state owned by the viewer.
///
/// The pan offset is the render-space position of the viewport origin: a
/// viewport coordinate minus `pan` gives a render-space coordinate.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ViewState {
    /// Current zoom factor, always within `[MIN_ZOOM, MAX_ZOOM]`.
    pub zoom: f64,
    /// Pan offset in render-space pixels.
    pub pan: (f64, f64),
    /// Zero-based index of the displayed page.
    pub page_index: usize,
    /// Clockwise display rotation.
    pub rotation: Rotation,
}

impl Default for ViewState {
    fn default() -> Self {
        Self::new()
    }
}

impl ViewState {
    pub fn new() -> Self {
        Self {
            zoom: 1.0,
            pan: (0.0, 0.0),
            page_index: 0,
            rotation: Rotation::R0,
        }
    }

    /// Set the zoom factor, clamped to `[MIN_ZOOM, MAX_ZOOM]`.
    pub fn set_zoom(&mut self, zoom: f64) {
        self.zoom = zoom.clamp(MIN_ZOOM, MAX_ZOOM);
    }

    /// Step the zoom up by one notch.
    pub fn zoom_in(&mut self) {
        self.set_zoom(self.zoom * ZOOM_IN_FACTOR);
    }

    /// Step the zoom down by one notch.
    pub fn zoom_out(&mut self) {
        self.set_zoom(self.zoom * ZOOM_OUT_FACTOR);
    }

    pub fn set_pan(&mut self, x: f64, y: f64) {
        self.pan = (x, y);
    }

    pub fn set_rotation(&mut self, rotation: Rotation) {
        self.rotation = rotation;
    }

    /// Switch to another page, resetting zoom, pan, and rotation.
    pub fn set_page(&mut self, page_index: usize) {
        *self = Self {
            page_index,
            ..Self::new()
        };
    }
}

/// Dimensions of one page and its rendered pixel size at the current view.
///
/// Derived from the source document whenever the page or zoom changes;
/// `rendered_px` is in the displayed (possibly axis-swapped) orientation.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PageGeometry {
    /// Native page width in points.
    pub width_pts: f64,
    /// Native page height in points.
    pub height_pts: f64,
    /// Pixel size of the full page bitmap at the view's zoom and rotation.
    pub rendered_px: (f64, f64),
}

impl PageGeometry {
    pub fn new(width_pts: f64, height_pts: f64, view: &ViewState) -> Self {
        let (dw, dh) = display_dims(width_pts, height_pts, view.rotation);
        Self {
            width_pts,
            height_pts,
            rendered_px: (dw * view.zoom, dh * view.zoom),
        }
    }
}

/// Page dimensions in the displayed orientation.
fn display_dims(width_pts: f64, height_pts: f64, rotation: Rotation) -> (f64, f64) {
    if rotation.swaps_axes() {
        (height_pts, width_pts)
    } else {
        (width_pts, height_pts)
    }
}

/// Map a display-oriented point back to native page orientation.
fn unrotate(x: f64, y: f64, rotation: Rotation, w: f64, h: f64) -> (f64, f64) {
    match rotation {
        Rotation::R0 => (x, y),
        Rotation::R90 => (y, h - x),
        Rotation::R180 => (w - x, h - y),
        Rotation::R270 => (w - y, x),
    }
}

/// Map a native page point into the displayed orientation.
fn rotate(x: f64, y: f64, rotation: Rotation, w: f64, h: f64) -> (f64, f64) {
    match rotation {
        Rotation::R0 => (x, y),
        Rotation::R90 => (h - y, x),
        Rotation::R180 => (w - x, h - y),
        Rotation::R270 => (y, w - x),
    }
}

/// Convert a viewport-space selection into a page-space export region.
///
/// Steps: subtract the pan offset, divide by the zoom factor, undo the
/// display rotation, then clamp both corners to the page bounding box.
///
/// # Errors
///
/// Returns [`SnipError::EmptyRegion`] when the clamped region is thinner
/// than [`crate::geometry::EMPTY_EPSILON_PTS`] in either direction, which
/// covers selections entirely outside the page, and when the view's zoom is
/// not a positive finite number.
pub fn viewport_to_page(
    rect: &SelectionRect,
    view: &ViewState,
    page: &PageGeometry,
) -> Result<ClipRegion, SnipError> {
    if !view.zoom.is_finite() || view.zoom <= 0.0 {
        return Err(SnipError::EmptyRegion);
    }

    let (w, h) = (page.width_pts, page.height_pts);
    let (dx0, dy0) = ((rect.x0 - view.pan.0) / view.zoom, (rect.y0 - view.pan.1) / view.zoom);
    let (dx1, dy1) = ((rect.x1 - view.pan.0) / view.zoom, (rect.y1 - view.pan.1) / view.zoom);

    let (px0, py0) = unrotate(dx0, dy0, view.rotation, w, h);
    let (px1, py1) = unrotate(dx1, dy1, view.rotation, w, h);

    let region = ClipRegion::new(px0, py0, px1, py1).clamped_to(w, h);
    if region.is_degenerate() {
        return Err(SnipError::EmptyRegion);
    }
    Ok(region)
}

/// Project a page-space region into viewport space.
///
/// This is the forward projection used for rendering overlays, and the
/// exact inverse of [`viewport_to_page`] for regions within the page.
pub fn page_to_viewport(
    region: &ClipRegion,
    view: &ViewState,
    page: &PageGeometry,
) -> SelectionRect {
    let (w, h) = (page.width_pts, page.height_pts);
    let (dx0, dy0) = rotate(region.x0, region.y0, view.rotation, w, h);
    let (dx1, dy1) = rotate(region.x1, region.y1, view.rotation, w, h);

    SelectionRect::from_corners(
        dx0 * view.zoom + view.pan.0,
        dy0 * view.zoom + view.pan.1,
        dx1 * view.zoom + view.pan.0,
        dy1 * view.zoom + view.pan.1,
    )
}
