//! Graphics state stack for the content stream interpreter.
//!
//! Implements the PDF graphics state model: a stack of states managed by
//! `q` (save) and `Q` (restore), CTM updates via `cm`, and color setting
//! via the G/g, RG/rg, K/k and SC/SCN operator families.

use pdfsnip_core::{Color, Ctm, DashPattern, GraphicsState};

/// Interpreter-level graphics context: the CTM plus the paint parameters.
///
/// `q` pushes a copy onto the stack; `Q` restores it. The context starts
/// from a caller-supplied base CTM so that page-level flips and form
/// XObject matrices compose the same way.
#[derive(Debug, Clone)]
pub struct GraphicsContext {
    ctm: Ctm,
    state: GraphicsState,
    stack: Vec<Saved>,
}

#[derive(Debug, Clone)]
struct Saved {
    ctm: Ctm,
    state: GraphicsState,
}

impl GraphicsContext {
    /// Create a context whose CTM starts at `base`.
    pub fn new(base: Ctm) -> Self {
        Self {
            ctm: base,
            state: GraphicsState::default(),
            stack: Vec::new(),
        }
    }

    pub fn ctm(&self) -> &Ctm {
        &self.ctm
    }

    pub fn state(&self) -> &GraphicsState {
        &self.state
    }

    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// `q`: save the current state onto the stack.
    pub fn save(&mut self) {
        self.stack.push(Saved {
            ctm: self.ctm,
            state: self.state.clone(),
        });
    }

    /// `Q`: restore the most recently saved state.
    ///
    /// Returns `false` on an unbalanced restore (empty stack).
    pub fn restore(&mut self) -> bool {
        match self.stack.pop() {
            Some(saved) => {
                self.ctm = saved.ctm;
                self.state = saved.state;
                true
            }
            None => false,
        }
    }

    /// `cm`: pre-concatenate a matrix onto the CTM.
    pub fn concat_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        self.ctm = Ctm::new(a, b, c, d, e, f).concat(&self.ctm);
    }

    /// `w`: set line width.
    pub fn set_line_width(&mut self, width: f64) {
        self.state.line_width = width;
    }

    /// `d`: set dash pattern.
    pub fn set_dash_pattern(&mut self, dash_array: Vec<f64>, dash_phase: f64) {
        self.state.dash_pattern = DashPattern::new(dash_array, dash_phase);
    }

    /// `G`: set stroking color to DeviceGray.
    pub fn set_stroke_gray(&mut self, gray: f32) {
        self.state.stroke_color = Color::Gray(gray);
    }

    /// `g`: set non-stroking color to DeviceGray.
    pub fn set_fill_gray(&mut self, gray: f32) {
        self.state.fill_color = Color::Gray(gray);
    }

    /// `RG`: set stroking color to DeviceRGB.
    pub fn set_stroke_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.state.stroke_color = Color::Rgb(r, g, b);
    }

    /// `rg`: set non-stroking color to DeviceRGB.
    pub fn set_fill_rgb(&mut self, r: f32, g: f32, b: f32) {
        self.state.fill_color = Color::Rgb(r, g, b);
    }

    /// `K`: set stroking color to DeviceCMYK.
    pub fn set_stroke_cmyk(&mut self, c: f32, m: f32, y: f32, k: f32) {
        self.state.stroke_color = Color::Cmyk(c, m, y, k);
    }

    /// `k`: set non-stroking color to DeviceCMYK.
    pub fn set_fill_cmyk(&mut self, c: f32, m: f32, y: f32, k: f32) {
        self.state.fill_color = Color::Cmyk(c, m, y, k);
    }

    /// `SC`/`SCN`: set the stroking color from raw components.
    ///
    /// The color space family is inferred from the component count.
    /// Returns `false` and leaves the color unchanged when the count maps
    /// to no device family (Separation tints, patterns).
    pub fn set_stroke_components(&mut self, components: &[f64]) -> bool {
        match color_from_components(components) {
            Some(color) => {
                self.state.stroke_color = color;
                true
            }
            None => false,
        }
    }

    /// `sc`/`scn`: set the non-stroking color from raw components.
    pub fn set_fill_components(&mut self, components: &[f64]) -> bool {
        match color_from_components(components) {
            Some(color) => {
                self.state.fill_color = color;
                true
            }
            None => false,
        }
    }

    /// `CS`: select a stroking color space by name.
    ///
    /// Known device families reset the color to the space's initial value.
    /// Returns `false` for resource-defined spaces, which are left alone.
    pub fn select_stroke_space(&mut self, name: &str) -> bool {
        match initial_color_for_space(name) {
            Some(color) => {
                self.state.stroke_color = color;
                true
            }
            None => false,
        }
    }

    /// `cs`: select a non-stroking color space by name.
    pub fn select_fill_space(&mut self, name: &str) -> bool {
        match initial_color_for_space(name) {
            Some(color) => {
                self.state.fill_color = color;
                true
            }
            None => false,
        }
    }

    /// Stroke alpha from an ExtGState `/CA` entry.
    pub fn set_stroke_alpha(&mut self, alpha: f64) {
        self.state.stroke_alpha = alpha.clamp(0.0, 1.0);
    }

    /// Fill alpha from an ExtGState `/ca` entry.
    pub fn set_fill_alpha(&mut self, alpha: f64) {
        self.state.fill_alpha = alpha.clamp(0.0, 1.0);
    }
}

/// Infer a device color from a component slice by count.
fn color_from_components(components: &[f64]) -> Option<Color> {
    match *components {
        [g] => Some(Color::Gray(g as f32)),
        [r, g, b] => Some(Color::Rgb(r as f32, g as f32, b as f32)),
        [c, m, y, k] => Some(Color::Cmyk(c as f32, m as f32, y as f32, k as f32)),
        _ => None,
    }
}

/// Initial color for a named device color space, per the PDF defaults.
fn initial_color_for_space(name: &str) -> Option<Color> {
    match name {
        "DeviceGray" | "CalGray" | "G" => Some(Color::Gray(0.0)),
        "DeviceRGB" | "CalRGB" | "RGB" | "Lab" => Some(Color::Rgb(0.0, 0.0, 0.0)),
        "DeviceCMYK" | "CMYK" => Some(Color::Cmyk(0.0, 0.0, 0.0, 1.0)),
        _ => None,
    }
}
