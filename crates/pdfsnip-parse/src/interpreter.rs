//! Content stream interpreter.
//!
//! Walks the tokenized operator stream of a page, tracking graphics and
//! text state, and collects everything drawn into a [`PageContent`] in
//! paint order. Coordinates are emitted directly in page space (top-left
//! origin, y down): the page's media box is folded into the base CTM so
//! no later flip is needed.
//!
//! Unsupported constructs never abort a page. They degrade to the nearest
//! reasonable behavior and leave a note in [`PageContent::warnings`].

use std::collections::HashMap;

use lopdf::{Dictionary, Object};
use pdfsnip_core::{
    Ctm, Glyph, ImageData, ImageFormat, PageContent, PageItem, PaintedPath, PathBuilder,
    PlacedImage, TextRun,
};

use crate::document::{SnipDocument, name_string, object_to_f64, resolve, stream_bytes};
use crate::error::BackendError;
use crate::fonts::LoadedFont;
use crate::graphics::GraphicsContext;
use crate::text_state::{TextRenderMode, TextSnapshot, TextState};
use crate::tokenizer::{Operand, tokenize};

/// Hard ceilings on how much of a content stream is processed.
///
/// Both limits turn runaway input (operator bombs, self-referencing form
/// XObjects) into a [`BackendError::ContentLimit`] instead of unbounded
/// work.
#[derive(Debug, Clone, Copy)]
pub struct ContentLimits {
    /// Total operators executed across the page and all nested forms.
    pub max_operators: usize,
    /// Maximum form XObject nesting depth.
    pub max_xobject_depth: usize,
}

impl Default for ContentLimits {
    fn default() -> Self {
        Self {
            max_operators: 1_000_000,
            max_xobject_depth: 16,
        }
    }
}

/// Interpret one page's content streams into drawn items.
///
/// The page index is zero-based. The returned [`PageContent`] holds text
/// runs, painted paths, and placed images in paint order, with all
/// coordinates in page space.
pub fn interpret_page(
    doc: &SnipDocument,
    page_index: usize,
    limits: &ContentLimits,
) -> Result<PageContent, BackendError> {
    let bounds = doc.page_bounds(page_index)?;
    let resources = doc.page_resources(page_index)?;
    let bytes = doc.page_content(page_index)?;

    #[cfg(feature = "tracing")]
    tracing::debug!(
        page = page_index,
        bytes = bytes.len(),
        "interpreting page content"
    );

    let mut interp = Interpreter::new(doc, limits, bounds.base_ctm());
    interp.run(&bytes, resources, 0)?;

    let mut content = PageContent::new(bounds.width, bounds.height);
    content.items = interp.items;
    content.warnings = interp.warnings;
    Ok(content)
}

/// Pieces of a show-text operator: raw string bytes interleaved with `TJ`
/// position adjustments (in thousandths of text space).
enum ShowPiece<'a> {
    Text(&'a [u8]),
    Adjust(f64),
}

struct Interpreter<'a> {
    doc: &'a SnipDocument,
    limits: &'a ContentLimits,
    gc: GraphicsContext,
    text: TextState,
    /// Text parameters saved alongside each `q`, restored with `Q`.
    text_stack: Vec<TextSnapshot>,
    items: Vec<PageItem>,
    warnings: Vec<String>,
    ops_executed: usize,
}

impl<'a> Interpreter<'a> {
    fn new(doc: &'a SnipDocument, limits: &'a ContentLimits, base_ctm: Ctm) -> Self {
        Self {
            doc,
            limits,
            gc: GraphicsContext::new(base_ctm),
            text: TextState::new(),
            text_stack: Vec::new(),
            items: Vec::new(),
            warnings: Vec::new(),
            ops_executed: 0,
        }
    }

    /// Record a non-fatal problem. Repeats of the same message collapse
    /// into one entry.
    fn note(&mut self, message: String) {
        #[cfg(feature = "tracing")]
        tracing::debug!("{message}");
        if !self.warnings.contains(&message) {
            self.warnings.push(message);
        }
    }

    fn push_state(&mut self) {
        self.gc.save();
        self.text_stack.push(self.text.snapshot());
    }

    fn pop_state(&mut self) {
        if self.gc.restore() {
            if let Some(snapshot) = self.text_stack.pop() {
                self.text.restore(snapshot);
            }
        }
    }

    fn run(
        &mut self,
        bytes: &[u8],
        resources: &Dictionary,
        depth: usize,
    ) -> Result<(), BackendError> {
        if depth > self.limits.max_xobject_depth {
            return Err(BackendError::ContentLimit(format!(
                "form XObject nesting deeper than {}",
                self.limits.max_xobject_depth
            )));
        }

        let operators = tokenize(bytes);
        let mut fonts: HashMap<String, LoadedFont> = HashMap::new();
        let mut path = PathBuilder::new(*self.gc.ctm());

        for op in &operators {
            self.ops_executed += 1;
            if self.ops_executed > self.limits.max_operators {
                return Err(BackendError::ContentLimit(format!(
                    "more than {} operators on one page",
                    self.limits.max_operators
                )));
            }

            match op.name.as_str() {
                // --- Graphics state ---
                "q" => self.push_state(),
                "Q" => {
                    self.pop_state();
                    path.set_ctm(*self.gc.ctm());
                }
                "cm" => {
                    if op.operands.len() >= 6 {
                        let a = get_f64(&op.operands, 0).unwrap_or(1.0);
                        let b = get_f64(&op.operands, 1).unwrap_or(0.0);
                        let c = get_f64(&op.operands, 2).unwrap_or(0.0);
                        let d = get_f64(&op.operands, 3).unwrap_or(1.0);
                        let e = get_f64(&op.operands, 4).unwrap_or(0.0);
                        let f = get_f64(&op.operands, 5).unwrap_or(0.0);
                        self.gc.concat_matrix(a, b, c, d, e, f);
                        path.set_ctm(*self.gc.ctm());
                    }
                }
                "w" => {
                    if let Some(v) = get_f64(&op.operands, 0) {
                        self.gc.set_line_width(v);
                    }
                }
                "d" => {
                    if op.operands.len() >= 2 {
                        if let Operand::Array(ref arr) = op.operands[0] {
                            let dash_array: Vec<f64> =
                                arr.iter().filter_map(operand_to_f64).collect();
                            let phase = get_f64(&op.operands, 1).unwrap_or(0.0);
                            self.gc.set_dash_pattern(dash_array, phase);
                        }
                    }
                }
                "gs" => {
                    if let Some(Operand::Name(name)) = op.operands.first() {
                        self.apply_ext_gstate(resources, name);
                    }
                }
                "J" | "j" | "M" | "i" | "ri" => {}

                // --- Color ---
                "G" => {
                    if let Some(g) = get_f32(&op.operands, 0) {
                        self.gc.set_stroke_gray(g);
                    }
                }
                "g" => {
                    if let Some(g) = get_f32(&op.operands, 0) {
                        self.gc.set_fill_gray(g);
                    }
                }
                "RG" => {
                    if op.operands.len() >= 3 {
                        let r = get_f32(&op.operands, 0).unwrap_or(0.0);
                        let g = get_f32(&op.operands, 1).unwrap_or(0.0);
                        let b = get_f32(&op.operands, 2).unwrap_or(0.0);
                        self.gc.set_stroke_rgb(r, g, b);
                    }
                }
                "rg" => {
                    if op.operands.len() >= 3 {
                        let r = get_f32(&op.operands, 0).unwrap_or(0.0);
                        let g = get_f32(&op.operands, 1).unwrap_or(0.0);
                        let b = get_f32(&op.operands, 2).unwrap_or(0.0);
                        self.gc.set_fill_rgb(r, g, b);
                    }
                }
                "K" => {
                    if op.operands.len() >= 4 {
                        let c = get_f32(&op.operands, 0).unwrap_or(0.0);
                        let m = get_f32(&op.operands, 1).unwrap_or(0.0);
                        let y = get_f32(&op.operands, 2).unwrap_or(0.0);
                        let k = get_f32(&op.operands, 3).unwrap_or(0.0);
                        self.gc.set_stroke_cmyk(c, m, y, k);
                    }
                }
                "k" => {
                    if op.operands.len() >= 4 {
                        let c = get_f32(&op.operands, 0).unwrap_or(0.0);
                        let m = get_f32(&op.operands, 1).unwrap_or(0.0);
                        let y = get_f32(&op.operands, 2).unwrap_or(0.0);
                        let k = get_f32(&op.operands, 3).unwrap_or(0.0);
                        self.gc.set_fill_cmyk(c, m, y, k);
                    }
                }
                "CS" => {
                    if let Some(Operand::Name(name)) = op.operands.first() {
                        if !self.gc.select_stroke_space(name) {
                            let name = name.clone();
                            self.note(format!("color space {name} not recognized"));
                        }
                    }
                }
                "cs" => {
                    if let Some(Operand::Name(name)) = op.operands.first() {
                        if !self.gc.select_fill_space(name) {
                            let name = name.clone();
                            self.note(format!("color space {name} not recognized"));
                        }
                    }
                }
                "SC" | "SCN" => {
                    let components: Vec<f64> =
                        op.operands.iter().filter_map(operand_to_f64).collect();
                    if !self.gc.set_stroke_components(&components) {
                        self.note(format!(
                            "stroke color with {} components left unchanged",
                            components.len()
                        ));
                    }
                }
                "sc" | "scn" => {
                    let components: Vec<f64> =
                        op.operands.iter().filter_map(operand_to_f64).collect();
                    if !self.gc.set_fill_components(&components) {
                        self.note(format!(
                            "fill color with {} components left unchanged",
                            components.len()
                        ));
                    }
                }

                // --- Text state ---
                "BT" => self.text.begin_text(),
                "ET" => self.text.end_text(),
                "Tf" => {
                    if op.operands.len() >= 2 {
                        let font_name = operand_to_name(&op.operands[0]);
                        let size = get_f64(&op.operands, 1).unwrap_or(0.0);
                        self.text.set_font(font_name.clone(), size);
                        self.ensure_font(resources, &mut fonts, &font_name);
                    }
                }
                "Tm" => {
                    if op.operands.len() >= 6 {
                        let a = get_f64(&op.operands, 0).unwrap_or(1.0);
                        let b = get_f64(&op.operands, 1).unwrap_or(0.0);
                        let c = get_f64(&op.operands, 2).unwrap_or(0.0);
                        let d = get_f64(&op.operands, 3).unwrap_or(1.0);
                        let e = get_f64(&op.operands, 4).unwrap_or(0.0);
                        let f = get_f64(&op.operands, 5).unwrap_or(0.0);
                        self.text.set_text_matrix(a, b, c, d, e, f);
                    }
                }
                "Td" => {
                    if op.operands.len() >= 2 {
                        let tx = get_f64(&op.operands, 0).unwrap_or(0.0);
                        let ty = get_f64(&op.operands, 1).unwrap_or(0.0);
                        self.text.next_line_offset(tx, ty);
                    }
                }
                "TD" => {
                    if op.operands.len() >= 2 {
                        let tx = get_f64(&op.operands, 0).unwrap_or(0.0);
                        let ty = get_f64(&op.operands, 1).unwrap_or(0.0);
                        self.text.next_line_offset_set_leading(tx, ty);
                    }
                }
                "T*" => self.text.next_line(),
                "Tc" => {
                    if let Some(v) = get_f64(&op.operands, 0) {
                        self.text.char_spacing = v;
                    }
                }
                "Tw" => {
                    if let Some(v) = get_f64(&op.operands, 0) {
                        self.text.word_spacing = v;
                    }
                }
                "Tz" => {
                    if let Some(v) = get_f64(&op.operands, 0) {
                        self.text.set_h_scale_percent(v);
                    }
                }
                "TL" => {
                    if let Some(v) = get_f64(&op.operands, 0) {
                        self.text.leading = v;
                    }
                }
                "Tr" => {
                    if let Some(v) = get_i64(&op.operands, 0) {
                        if let Some(mode) = TextRenderMode::from_i64(v) {
                            self.text.render_mode = mode;
                        }
                    }
                }
                "Ts" => {
                    if let Some(v) = get_f64(&op.operands, 0) {
                        self.text.rise = v;
                    }
                }

                // --- Text showing ---
                "Tj" => {
                    if let Some(bytes) = op.operands.first().and_then(operand_to_string_bytes) {
                        self.show_text(resources, &mut fonts, &[ShowPiece::Text(bytes)]);
                    }
                }
                "TJ" => {
                    if let Some(Operand::Array(parts)) = op.operands.first() {
                        let pieces: Vec<ShowPiece<'_>> = parts
                            .iter()
                            .filter_map(|part| match part {
                                Operand::Integer(i) => Some(ShowPiece::Adjust(*i as f64)),
                                Operand::Real(v) => Some(ShowPiece::Adjust(*v)),
                                Operand::LiteralString(s) | Operand::HexString(s) => {
                                    Some(ShowPiece::Text(s))
                                }
                                _ => None,
                            })
                            .collect();
                        self.show_text(resources, &mut fonts, &pieces);
                    }
                }
                "'" => {
                    self.text.next_line();
                    if let Some(bytes) = op.operands.first().and_then(operand_to_string_bytes) {
                        self.show_text(resources, &mut fonts, &[ShowPiece::Text(bytes)]);
                    }
                }
                "\"" => {
                    if op.operands.len() >= 3 {
                        if let Some(aw) = get_f64(&op.operands, 0) {
                            self.text.word_spacing = aw;
                        }
                        if let Some(ac) = get_f64(&op.operands, 1) {
                            self.text.char_spacing = ac;
                        }
                        self.text.next_line();
                        if let Some(bytes) = operand_to_string_bytes(&op.operands[2]) {
                            self.show_text(resources, &mut fonts, &[ShowPiece::Text(bytes)]);
                        }
                    }
                }

                // --- XObjects ---
                "Do" => {
                    if let Some(Operand::Name(name)) = op.operands.first() {
                        let name = name.clone();
                        self.do_xobject(resources, &name, depth)?;
                    }
                }

                // --- Path construction ---
                "m" => {
                    path.set_ctm(*self.gc.ctm());
                    if op.operands.len() >= 2 {
                        let x = get_f64(&op.operands, 0).unwrap_or(0.0);
                        let y = get_f64(&op.operands, 1).unwrap_or(0.0);
                        path.move_to(x, y);
                    }
                }
                "l" => {
                    path.set_ctm(*self.gc.ctm());
                    if op.operands.len() >= 2 {
                        let x = get_f64(&op.operands, 0).unwrap_or(0.0);
                        let y = get_f64(&op.operands, 1).unwrap_or(0.0);
                        path.line_to(x, y);
                    }
                }
                "c" => {
                    path.set_ctm(*self.gc.ctm());
                    if op.operands.len() >= 6 {
                        let x1 = get_f64(&op.operands, 0).unwrap_or(0.0);
                        let y1 = get_f64(&op.operands, 1).unwrap_or(0.0);
                        let x2 = get_f64(&op.operands, 2).unwrap_or(0.0);
                        let y2 = get_f64(&op.operands, 3).unwrap_or(0.0);
                        let x3 = get_f64(&op.operands, 4).unwrap_or(0.0);
                        let y3 = get_f64(&op.operands, 5).unwrap_or(0.0);
                        path.curve_to(x1, y1, x2, y2, x3, y3);
                    }
                }
                "v" => {
                    path.set_ctm(*self.gc.ctm());
                    if op.operands.len() >= 4 {
                        let x2 = get_f64(&op.operands, 0).unwrap_or(0.0);
                        let y2 = get_f64(&op.operands, 1).unwrap_or(0.0);
                        let x3 = get_f64(&op.operands, 2).unwrap_or(0.0);
                        let y3 = get_f64(&op.operands, 3).unwrap_or(0.0);
                        path.curve_to_v(x2, y2, x3, y3);
                    }
                }
                "y" => {
                    path.set_ctm(*self.gc.ctm());
                    if op.operands.len() >= 4 {
                        let x1 = get_f64(&op.operands, 0).unwrap_or(0.0);
                        let y1 = get_f64(&op.operands, 1).unwrap_or(0.0);
                        let x3 = get_f64(&op.operands, 2).unwrap_or(0.0);
                        let y3 = get_f64(&op.operands, 3).unwrap_or(0.0);
                        path.curve_to_y(x1, y1, x3, y3);
                    }
                }
                "re" => {
                    path.set_ctm(*self.gc.ctm());
                    if op.operands.len() >= 4 {
                        let x = get_f64(&op.operands, 0).unwrap_or(0.0);
                        let y = get_f64(&op.operands, 1).unwrap_or(0.0);
                        let w = get_f64(&op.operands, 2).unwrap_or(0.0);
                        let h = get_f64(&op.operands, 3).unwrap_or(0.0);
                        path.rectangle(x, y, w, h);
                    }
                }
                "h" => path.close_path(),

                // --- Path painting ---
                "S" => {
                    let painted = path.stroke(self.gc.state());
                    self.emit_path(painted);
                }
                "s" => {
                    let painted = path.close_and_stroke(self.gc.state());
                    self.emit_path(painted);
                }
                "f" | "F" => {
                    let painted = path.fill(self.gc.state());
                    self.emit_path(painted);
                }
                "f*" => {
                    let painted = path.fill_even_odd(self.gc.state());
                    self.emit_path(painted);
                }
                "B" => {
                    let painted = path.fill_and_stroke(self.gc.state());
                    self.emit_path(painted);
                }
                "B*" => {
                    let painted = path.fill_even_odd_and_stroke(self.gc.state());
                    self.emit_path(painted);
                }
                "b" => {
                    let painted = path.close_fill_and_stroke(self.gc.state());
                    self.emit_path(painted);
                }
                "b*" => {
                    let painted = path.close_fill_even_odd_and_stroke(self.gc.state());
                    self.emit_path(painted);
                }
                "n" => path.end_path(),

                // Clip paths only ever shrink what is visible; dropping them
                // keeps every drawn object, which errs on the side of
                // exporting too much rather than too little.
                "W" | "W*" => {}

                // --- Marked content ---
                "BMC" | "BDC" | "EMC" | "MP" | "DP" => {}

                // Inline image data was already skipped by the tokenizer.
                "BI" => self.note("inline image skipped".to_string()),

                "sh" => self.note("shading fill skipped".to_string()),

                _ => {}
            }
        }

        Ok(())
    }

    /// Load a font from `/Resources /Font` into the per-stream cache. A
    /// missing entry degrades to built-in defaults so text keeps flowing.
    fn ensure_font(
        &mut self,
        resources: &Dictionary,
        fonts: &mut HashMap<String, LoadedFont>,
        name: &str,
    ) {
        if name.is_empty() || fonts.contains_key(name) {
            return;
        }
        let doc = self.doc.inner();
        let font_dict = resources
            .get(b"Font")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|dict| dict.get(name.as_bytes()).ok())
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok());

        let mut font = match font_dict {
            Some(dict) => LoadedFont::load(doc, dict, &mut self.warnings),
            None => {
                self.note(format!("font {name} not found in resources, using defaults"));
                LoadedFont::load(doc, &Dictionary::new(), &mut self.warnings)
            }
        };
        if font.base_name.is_empty() {
            font.base_name = name.to_string();
        }
        fonts.insert(name.to_string(), font);
    }

    /// Show text at the current text position.
    ///
    /// Emits one [`TextRun`] per call. Glyph pen offsets, kerning
    /// adjustments, and advances are all recorded in text space units so
    /// the run can be re-laid-out later. Invisible render modes advance
    /// the text matrix without emitting anything.
    fn show_text(
        &mut self,
        resources: &Dictionary,
        fonts: &mut HashMap<String, LoadedFont>,
        pieces: &[ShowPiece<'_>],
    ) {
        let font_name = self.text.font_name.clone();
        if font_name.is_empty() {
            self.note("text shown before any font was selected".to_string());
            return;
        }
        self.ensure_font(resources, fonts, &font_name);
        let Some(font) = fonts.get_mut(&font_name) else {
            return;
        };

        let size = self.text.font_size;
        let h_scale = self.text.h_scale;
        let char_spacing = self.text.char_spacing;
        let word_spacing = self.text.word_spacing;
        let mode = self.text.render_mode;

        let run_matrix = Ctm::translation(0.0, self.text.rise)
            .concat(self.text.text_matrix())
            .concat(self.gc.ctm());

        let mut glyphs: Vec<Glyph> = Vec::new();
        let mut pen = 0.0_f64;
        let mut pending_kern = 0.0_f64;

        for piece in pieces {
            match piece {
                ShowPiece::Adjust(adj) => {
                    pending_kern += -adj / 1000.0 * size * h_scale;
                }
                ShowPiece::Text(bytes) => {
                    for decoded in font.decode(bytes) {
                        let mut advance = decoded.width / 1000.0 * size + char_spacing;
                        if decoded.word_break {
                            advance += word_spacing;
                        }
                        advance *= h_scale;

                        let (gid, outline) = font.glyph_outline(&decoded);
                        let kern = pending_kern;
                        pending_kern = 0.0;
                        pen += kern;
                        glyphs.push(Glyph {
                            code: decoded.code,
                            text: decoded.text,
                            dx: pen,
                            kern,
                            advance,
                            gid,
                            outline,
                        });
                        pen += advance;
                    }
                }
            }
        }

        // A trailing adjustment still moves the pen for whatever follows.
        self.text.advance(pen + pending_kern);

        if mode.is_invisible() || glyphs.is_empty() {
            return;
        }

        let state = self.gc.state();
        let (fill_color, fill_alpha) = if mode.uses_stroke_color() {
            (state.stroke_color, state.stroke_alpha)
        } else {
            (state.fill_color, state.fill_alpha)
        };

        self.items.push(PageItem::Text(TextRun {
            font: font.base_name.clone(),
            size,
            h_scale,
            matrix: run_matrix,
            fill_color,
            fill_alpha,
            glyphs,
        }));
    }

    /// `gs`: apply the parameters this crate models from an ExtGState
    /// dictionary (stroke/fill alpha and line width).
    fn apply_ext_gstate(&mut self, resources: &Dictionary, name: &str) {
        let doc = self.doc.inner();
        let gs_dict = resources
            .get(b"ExtGState")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|dict| dict.get(name.as_bytes()).ok())
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok());

        let Some(gs_dict) = gs_dict else {
            self.note(format!("graphics parameter set {name} not found"));
            return;
        };
        if let Some(v) = gs_dict
            .get(b"CA")
            .ok()
            .and_then(|obj| object_to_f64(resolve(doc, obj)))
        {
            self.gc.set_stroke_alpha(v);
        }
        if let Some(v) = gs_dict
            .get(b"ca")
            .ok()
            .and_then(|obj| object_to_f64(resolve(doc, obj)))
        {
            self.gc.set_fill_alpha(v);
        }
        if let Some(v) = gs_dict
            .get(b"LW")
            .ok()
            .and_then(|obj| object_to_f64(resolve(doc, obj)))
        {
            self.gc.set_line_width(v);
        }
    }

    /// `Do`: place an image XObject or recurse into a form XObject.
    fn do_xobject(
        &mut self,
        resources: &Dictionary,
        name: &str,
        depth: usize,
    ) -> Result<(), BackendError> {
        let doc = self.doc.inner();
        let stream = resources
            .get(b"XObject")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok())
            .and_then(|dict| dict.get(name.as_bytes()).ok())
            .map(|obj| resolve(doc, obj));

        let Some(Object::Stream(stream)) = stream else {
            self.note(format!("XObject {name} not found in resources"));
            return Ok(());
        };

        match stream
            .dict
            .get(b"Subtype")
            .ok()
            .and_then(name_string)
            .as_deref()
        {
            Some("Image") => {
                self.place_image(name, stream);
                Ok(())
            }
            Some("Form") => self.run_form(stream, resources, depth),
            other => {
                let subtype = other.unwrap_or("missing");
                self.note(format!("XObject {name} with subtype {subtype} skipped"));
                Ok(())
            }
        }
    }

    fn run_form(
        &mut self,
        stream: &lopdf::Stream,
        parent_resources: &Dictionary,
        depth: usize,
    ) -> Result<(), BackendError> {
        let doc = self.doc.inner();
        let form_resources = stream
            .dict
            .get(b"Resources")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok())
            .unwrap_or(parent_resources);
        let bytes = stream_bytes(stream);

        let depth_before = self.gc.depth();
        self.push_state();
        if let Some(m) = matrix_entry(doc, &stream.dict) {
            self.gc.concat_matrix(m.a, m.b, m.c, m.d, m.e, m.f);
        }
        let result = self.run(&bytes, form_resources, depth + 1);
        while self.gc.depth() > depth_before {
            self.pop_state();
        }
        result
    }

    /// Place a raster image under the current CTM.
    ///
    /// Only single-filter DCTDecode (baseline JPEG) streams carry their
    /// bytes through unchanged; anything else is skipped with a note so
    /// the export never embeds data it cannot label correctly.
    fn place_image(&mut self, name: &str, stream: &lopdf::Stream) {
        let doc = self.doc.inner();
        let dict = &stream.dict;

        if let Ok(Object::Boolean(true)) = dict.get(b"ImageMask").map(|obj| resolve(doc, obj)) {
            self.note(format!("stencil mask image {name} skipped"));
            return;
        }

        let width = dict
            .get(b"Width")
            .ok()
            .and_then(|obj| resolve(doc, obj).as_i64().ok());
        let height = dict
            .get(b"Height")
            .ok()
            .and_then(|obj| resolve(doc, obj).as_i64().ok());
        let (Some(width), Some(height)) = (width, height) else {
            self.note(format!("image {name} without pixel dimensions skipped"));
            return;
        };
        if width <= 0 || height <= 0 {
            self.note(format!("image {name} with empty pixel dimensions skipped"));
            return;
        }

        let filters = filter_names(doc, dict);
        if filters.len() != 1 || filters[0] != "DCTDecode" {
            self.note(format!("image {name} uses an unsupported encoding, skipped"));
            return;
        }

        self.items.push(PageItem::Image(PlacedImage {
            name: name.to_string(),
            matrix: *self.gc.ctm(),
            width_px: width as u32,
            height_px: height as u32,
            alpha: self.gc.state().fill_alpha,
            data: ImageData {
                format: ImageFormat::Jpeg,
                bytes: stream.content.clone(),
            },
        }));
    }

    fn emit_path(&mut self, painted: Option<PaintedPath>) {
        if let Some(p) = painted {
            self.items.push(PageItem::Path(p));
        }
    }
}

/// Read a six-number /Matrix entry from a form XObject dictionary.
fn matrix_entry(doc: &lopdf::Document, dict: &Dictionary) -> Option<Ctm> {
    let arr = dict.get(b"Matrix").ok().map(|obj| resolve(doc, obj))?;
    let arr = arr.as_array().ok()?;
    if arr.len() < 6 {
        return None;
    }
    let mut v = [0.0_f64; 6];
    for (slot, obj) in v.iter_mut().zip(arr.iter()) {
        *slot = object_to_f64(resolve(doc, obj))?;
    }
    Some(Ctm::new(v[0], v[1], v[2], v[3], v[4], v[5]))
}

/// Read /Filter as a list of filter names (empty when absent).
fn filter_names(doc: &lopdf::Document, dict: &Dictionary) -> Vec<String> {
    match dict.get(b"Filter").ok().map(|obj| resolve(doc, obj)) {
        Some(obj @ Object::Name(_)) => name_string(obj).into_iter().collect(),
        Some(Object::Array(arr)) => arr
            .iter()
            .filter_map(|obj| name_string(resolve(doc, obj)))
            .collect(),
        _ => Vec::new(),
    }
}

// --- Operand extraction helpers ---

fn get_f64(operands: &[Operand], index: usize) -> Option<f64> {
    operands.get(index).and_then(operand_to_f64)
}

fn get_f32(operands: &[Operand], index: usize) -> Option<f32> {
    get_f64(operands, index).map(|v| v as f32)
}

fn get_i64(operands: &[Operand], index: usize) -> Option<i64> {
    operands.get(index).and_then(|o| match o {
        Operand::Integer(i) => Some(*i),
        Operand::Real(v) => Some(*v as i64),
        _ => None,
    })
}

fn operand_to_f64(o: &Operand) -> Option<f64> {
    match o {
        Operand::Integer(i) => Some(*i as f64),
        Operand::Real(v) => Some(*v),
        _ => None,
    }
}

fn operand_to_name(o: &Operand) -> String {
    match o {
        Operand::Name(n) => n.clone(),
        _ => String::new(),
    }
}

fn operand_to_string_bytes(o: &Operand) -> Option<&[u8]> {
    match o {
        Operand::LiteralString(s) | Operand::HexString(s) => Some(s),
        _ => None,
    }
}
