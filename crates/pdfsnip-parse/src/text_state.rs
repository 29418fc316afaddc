//! Text state machine for the content stream interpreter.
//!
//! Tracks the parameters set by text state operators (Tc, Tw, Tz, TL, Tf,
//! Tr, Ts), the text object flag (BT/ET), and the text/line matrices
//! (Tm, Td, TD, T*). Parameters other than the matrices are part of the
//! graphics state and are snapshotted across q/Q.

use pdfsnip_core::Ctm;

/// Text rendering mode values (Tr operator).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TextRenderMode {
    /// Fill character glyphs (default).
    #[default]
    Fill = 0,
    /// Stroke character glyphs.
    Stroke = 1,
    /// Fill and stroke character glyphs.
    FillStroke = 2,
    /// Neither fill nor stroke (invisible text).
    Invisible = 3,
    /// Fill and add to clipping path.
    FillClip = 4,
    /// Stroke and add to clipping path.
    StrokeClip = 5,
    /// Fill, stroke, and add to clipping path.
    FillStrokeClip = 6,
    /// Add to clipping path only.
    Clip = 7,
}

impl TextRenderMode {
    /// Map an integer operand value (0-7) to a mode. `None` for out of range.
    pub fn from_i64(value: i64) -> Option<Self> {
        match value {
            0 => Some(Self::Fill),
            1 => Some(Self::Stroke),
            2 => Some(Self::FillStroke),
            3 => Some(Self::Invisible),
            4 => Some(Self::FillClip),
            5 => Some(Self::StrokeClip),
            6 => Some(Self::FillStrokeClip),
            7 => Some(Self::Clip),
            _ => None,
        }
    }

    /// Whether glyphs in this mode leave no visible marks.
    pub fn is_invisible(self) -> bool {
        matches!(self, Self::Invisible | Self::Clip)
    }

    /// Whether glyphs in this mode are painted with the stroking color.
    pub fn uses_stroke_color(self) -> bool {
        matches!(self, Self::Stroke | Self::StrokeClip)
    }
}

/// The text state parameters that q/Q must save and restore.
///
/// Excludes the text and line matrices, which are scoped to BT/ET
/// rather than to the graphics state stack.
#[derive(Debug, Clone, PartialEq)]
pub struct TextSnapshot {
    pub char_spacing: f64,
    pub word_spacing: f64,
    pub h_scale: f64,
    pub leading: f64,
    pub font_name: String,
    pub font_size: f64,
    pub render_mode: TextRenderMode,
    pub rise: f64,
}

/// Text state tracked during content stream interpretation.
#[derive(Debug, Clone, PartialEq)]
pub struct TextState {
    /// Character spacing (Tc), in unscaled text space units.
    pub char_spacing: f64,
    /// Word spacing (Tw), applied after byte 32 in simple fonts.
    pub word_spacing: f64,
    /// Horizontal scaling (Tz), stored as a fraction where 1.0 = 100%.
    pub h_scale: f64,
    /// Text leading (TL), the baseline-to-baseline distance used by T*.
    pub leading: f64,
    /// Font resource name set by Tf.
    pub font_name: String,
    /// Font size set by Tf.
    pub font_size: f64,
    /// Rendering mode (Tr).
    pub render_mode: TextRenderMode,
    /// Text rise (Ts), a baseline offset for super/subscripts.
    pub rise: f64,
    in_text_object: bool,
    text_matrix: Ctm,
    line_matrix: Ctm,
}

impl Default for TextState {
    fn default() -> Self {
        Self::new()
    }
}

impl TextState {
    pub fn new() -> Self {
        Self {
            char_spacing: 0.0,
            word_spacing: 0.0,
            h_scale: 1.0,
            leading: 0.0,
            font_name: String::new(),
            font_size: 0.0,
            render_mode: TextRenderMode::default(),
            rise: 0.0,
            in_text_object: false,
            text_matrix: Ctm::identity(),
            line_matrix: Ctm::identity(),
        }
    }

    /// Whether a BT has been seen without a matching ET.
    pub fn in_text_object(&self) -> bool {
        self.in_text_object
    }

    pub fn text_matrix(&self) -> &Ctm {
        &self.text_matrix
    }

    /// `BT`: begin a text object, resetting both matrices to identity.
    pub fn begin_text(&mut self) {
        self.text_matrix = Ctm::identity();
        self.line_matrix = Ctm::identity();
        self.in_text_object = true;
    }

    /// `ET`: end the text object. The matrices keep their last values.
    pub fn end_text(&mut self) {
        self.in_text_object = false;
    }

    /// `Tf`: select font and size.
    pub fn set_font(&mut self, font_name: String, font_size: f64) {
        self.font_name = font_name;
        self.font_size = font_size;
    }

    /// `Tz`: set horizontal scaling from a percentage operand.
    pub fn set_h_scale_percent(&mut self, percent: f64) {
        self.h_scale = percent / 100.0;
    }

    /// `Tm`: replace the text matrix and line matrix.
    pub fn set_text_matrix(&mut self, a: f64, b: f64, c: f64, d: f64, e: f64, f: f64) {
        let m = Ctm::new(a, b, c, d, e, f);
        self.text_matrix = m;
        self.line_matrix = m;
    }

    /// `Td`: start a new line offset by (tx, ty) from the current line start.
    pub fn next_line_offset(&mut self, tx: f64, ty: f64) {
        self.line_matrix = Ctm::translation(tx, ty).concat(&self.line_matrix);
        self.text_matrix = self.line_matrix;
    }

    /// `TD`: like Td, but also sets the leading to -ty.
    pub fn next_line_offset_set_leading(&mut self, tx: f64, ty: f64) {
        self.leading = -ty;
        self.next_line_offset(tx, ty);
    }

    /// `T*`: start a new line using the current leading.
    pub fn next_line(&mut self) {
        let leading = self.leading;
        self.next_line_offset(0.0, -leading);
    }

    /// Advance the text matrix horizontally after showing glyphs.
    ///
    /// `tx` is in text space units with font size, spacing and horizontal
    /// scaling already applied. The line matrix is not touched.
    pub fn advance(&mut self, tx: f64) {
        self.text_matrix = Ctm::translation(tx, 0.0).concat(&self.text_matrix);
    }

    /// Capture the q/Q-scoped parameters.
    pub fn snapshot(&self) -> TextSnapshot {
        TextSnapshot {
            char_spacing: self.char_spacing,
            word_spacing: self.word_spacing,
            h_scale: self.h_scale,
            leading: self.leading,
            font_name: self.font_name.clone(),
            font_size: self.font_size,
            render_mode: self.render_mode,
            rise: self.rise,
        }
    }

    /// Restore the q/Q-scoped parameters from a snapshot.
    pub fn restore(&mut self, snapshot: TextSnapshot) {
        self.char_spacing = snapshot.char_spacing;
        self.word_spacing = snapshot.word_spacing;
        self.h_scale = snapshot.h_scale;
        self.leading = snapshot.leading;
        self.font_name = snapshot.font_name;
        self.font_size = snapshot.font_size;
        self.render_mode = snapshot.render_mode;
        self.rise = snapshot.rise;
    }
}
