//! Colors, graphics state, and painted path records.
//!
//! A [`PaintedPath`] is a finished path together with everything needed to
//! draw it: paint flags, fill rule, colors, alphas, line width, and dash
//! pattern. Painting operators on [`PathBuilder`] capture the relevant
//! pieces of the [`GraphicsState`] at paint time.

use crate::geometry::BBox;
use crate::path::{Path, PathBuilder};

/// A device color in one of the common color spaces.
///
/// Component values are in `[0.0, 1.0]`.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum Color {
    Gray(f32),
    Rgb(f32, f32, f32),
    Cmyk(f32, f32, f32, f32),
}

impl Color {
    /// Default color for both stroking and filling.
    pub fn black() -> Color {
        Color::Gray(0.0)
    }

    /// Convert to RGB components.
    pub fn to_rgb(self) -> (f32, f32, f32) {
        match self {
            Color::Gray(g) => (g, g, g),
            Color::Rgb(r, g, b) => (r, g, b),
            Color::Cmyk(c, m, y, k) => {
                ((1.0 - c) * (1.0 - k), (1.0 - m) * (1.0 - k), (1.0 - y) * (1.0 - k))
            }
        }
    }

    /// Perceptual luminance (ITU-R BT.601 weights).
    pub fn luminance(self) -> f32 {
        let (r, g, b) = self.to_rgb();
        0.299 * r + 0.587 * g + 0.114 * b
    }

    /// Collapse to a gray of equal luminance.
    pub fn to_gray(self) -> Color {
        Color::Gray(self.luminance())
    }

    /// True if the color renders as pure white.
    pub fn is_white(self) -> bool {
        let (r, g, b) = self.to_rgb();
        r >= 1.0 - 1e-6 && g >= 1.0 - 1e-6 && b >= 1.0 - 1e-6
    }
}

/// Winding rule used when filling a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FillRule {
    #[default]
    NonZeroWinding,
    EvenOdd,
}

/// Stroke dash pattern (`d` operator).
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DashPattern {
    pub dash_array: Vec<f64>,
    pub dash_phase: f64,
}

impl DashPattern {
    pub fn new(dash_array: Vec<f64>, dash_phase: f64) -> Self {
        Self { dash_array, dash_phase }
    }

    /// An empty dash array means a solid line.
    pub fn is_solid(&self) -> bool {
        self.dash_array.is_empty()
    }
}

/// The device-relevant portion of the graphics state.
///
/// Tracks only the parameters that affect exported output; rendering
/// intent, flatness, and similar device hints are ignored.
#[derive(Debug, Clone, PartialEq)]
pub struct GraphicsState {
    pub line_width: f64,
    pub stroke_color: Color,
    pub fill_color: Color,
    pub dash_pattern: DashPattern,
    pub stroke_alpha: f64,
    pub fill_alpha: f64,
}

impl Default for GraphicsState {
    fn default() -> Self {
        Self {
            line_width: 1.0,
            stroke_color: Color::black(),
            fill_color: Color::black(),
            dash_pattern: DashPattern::default(),
            stroke_alpha: 1.0,
            fill_alpha: 1.0,
        }
    }
}

/// A path together with how it was painted.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PaintedPath {
    pub path: Path,
    pub stroke: bool,
    pub fill: bool,
    pub fill_rule: FillRule,
    pub line_width: f64,
    pub stroke_color: Color,
    pub fill_color: Color,
    pub stroke_alpha: f64,
    pub fill_alpha: f64,
    pub dash_pattern: DashPattern,
}

impl PaintedPath {
    /// Conservative bounding box of the painted geometry.
    pub fn bbox(&self) -> Option<BBox> {
        self.path.bbox()
    }

    /// Shift the painted geometry by `(dx, dy)`.
    pub fn translate(&self, dx: f64, dy: f64) -> PaintedPath {
        PaintedPath {
            path: self.path.translate(dx, dy),
            ..self.clone()
        }
    }
}

impl PathBuilder {
    fn painted(
        &mut self,
        stroke: bool,
        fill: bool,
        fill_rule: FillRule,
        state: &GraphicsState,
    ) -> Option<PaintedPath> {
        if self.is_empty() {
            return None;
        }
        Some(PaintedPath {
            path: self.take_and_reset(),
            stroke,
            fill,
            fill_rule,
            line_width: state.line_width,
            stroke_color: state.stroke_color,
            fill_color: state.fill_color,
            stroke_alpha: state.stroke_alpha,
            fill_alpha: state.fill_alpha,
            dash_pattern: state.dash_pattern.clone(),
        })
    }

    /// `S` operator: stroke the path.
    pub fn stroke(&mut self, state: &GraphicsState) -> Option<PaintedPath> {
        self.painted(true, false, FillRule::NonZeroWinding, state)
    }

    /// `s` operator: close and stroke the path.
    pub fn close_and_stroke(&mut self, state: &GraphicsState) -> Option<PaintedPath> {
        self.close_path();
        self.stroke(state)
    }

    /// `f` / `F` operator: fill with the nonzero winding rule.
    pub fn fill(&mut self, state: &GraphicsState) -> Option<PaintedPath> {
        self.painted(false, true, FillRule::NonZeroWinding, state)
    }

    /// `f*` operator: fill with the even-odd rule.
    pub fn fill_even_odd(&mut self, state: &GraphicsState) -> Option<PaintedPath> {
        self.painted(false, true, FillRule::EvenOdd, state)
    }

    /// `B` operator: fill then stroke, nonzero winding.
    pub fn fill_and_stroke(&mut self, state: &GraphicsState) -> Option<PaintedPath> {
        self.painted(true, true, FillRule::NonZeroWinding, state)
    }

    /// `B*` operator: fill then stroke, even-odd.
    pub fn fill_even_odd_and_stroke(&mut self, state: &GraphicsState) -> Option<PaintedPath> {
        self.painted(true, true, FillRule::EvenOdd, state)
    }

    /// `b` operator: close, fill, and stroke, nonzero winding.
    pub fn close_fill_and_stroke(&mut self, state: &GraphicsState) -> Option<PaintedPath> {
        self.close_path();
        self.fill_and_stroke(state)
    }

    /// `b*` operator: close, fill, and stroke, even-odd.
    pub fn close_fill_even_odd_and_stroke(&mut self, state: &GraphicsState) -> Option<PaintedPath> {
        self.close_path();
        self.fill_even_odd_and_stroke(state)
    }

    /// `n` operator: end the path without painting it.
    pub fn end_path(&mut self) {
        self.take_and_reset();
    }
}
