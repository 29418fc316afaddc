//! Font loading for the content stream interpreter.
//!
//! Resolves a font resource dictionary into what text extraction needs:
//! glyph widths, a code-to-Unicode mapping, a show-string decoder, and
//! (for embedded TrueType programs) glyph outlines in normalized glyph
//! space. Simple and Type0/CID fonts are handled; Type1 and CFF font
//! programs contribute widths and text but no outlines.

use std::collections::HashMap;

use lopdf::{Dictionary, Document, Object};
use pdfsnip_core::{Ctm, Path, PathBuilder};

use crate::cmap::ToUnicodeMap;
use crate::document::{name_string, object_to_f64, resolve, stream_bytes};

/// Width used for simple-font codes outside the /Widths range when the
/// descriptor carries no /MissingWidth.
const DEFAULT_SIMPLE_WIDTH: f64 = 600.0;

/// Default width for CID fonts without /DW.
const DEFAULT_CID_WIDTH: f64 = 1000.0;

/// Byte decoder for simple fonts without a usable ToUnicode entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SimpleEncoding {
    /// WinAnsiEncoding, also the fallback for unrecognized encodings.
    #[default]
    WinAnsi,
    /// MacRomanEncoding.
    MacRoman,
}

impl SimpleEncoding {
    fn decode_byte(self, byte: u8) -> String {
        let encoding = match self {
            SimpleEncoding::WinAnsi => encoding_rs::WINDOWS_1252,
            SimpleEncoding::MacRoman => encoding_rs::MACINTOSH,
        };
        let bytes = [byte];
        let (text, _) = encoding.decode_without_bom_handling(&bytes);
        text.into_owned()
    }
}

/// CID-to-glyph-id mapping from /CIDToGIDMap.
#[derive(Debug, Clone, PartialEq)]
enum GidMap {
    Identity,
    Table(Vec<u16>),
}

impl GidMap {
    fn map(&self, cid: u32) -> u16 {
        match self {
            GidMap::Identity => cid as u16,
            GidMap::Table(table) => table.get(cid as usize).copied().unwrap_or(cid as u16),
        }
    }

    fn from_stream(data: &[u8]) -> Self {
        let table = data
            .chunks_exact(2)
            .map(|pair| u16::from_be_bytes([pair[0], pair[1]]))
            .collect();
        GidMap::Table(table)
    }
}

#[derive(Debug, Clone)]
enum Widths {
    Simple {
        first_char: u32,
        table: Vec<f64>,
        missing: f64,
    },
    Cid {
        table: HashMap<u32, f64>,
        default: f64,
    },
}

impl Widths {
    fn get(&self, code: u32) -> f64 {
        match self {
            Widths::Simple {
                first_char,
                table,
                missing,
            } => {
                if code >= *first_char {
                    if let Some(w) = table.get((code - first_char) as usize) {
                        return *w;
                    }
                }
                *missing
            }
            Widths::Cid { table, default } => table.get(&code).copied().unwrap_or(*default),
        }
    }
}

/// One code decoded from a show-string operand.
#[derive(Debug, Clone)]
pub struct DecodedChar {
    /// Raw character code (byte for simple fonts, two bytes for CID).
    pub code: u32,
    /// Unicode text, empty when no mapping exists.
    pub text: String,
    /// Width in glyph space units (1/1000 of text space).
    pub width: f64,
    /// Whether word spacing applies after this code (single byte 32).
    pub word_break: bool,
}

/// A font resource resolved for showing text.
pub struct LoadedFont {
    /// Base font name with any subset prefix stripped.
    pub base_name: String,
    /// Whether codes are two bytes (Type0/CID) rather than one.
    pub is_cid: bool,
    widths: Widths,
    to_unicode: Option<ToUnicodeMap>,
    encoding: SimpleEncoding,
    gid_map: GidMap,
    outlines: Option<OutlineSource>,
}

impl LoadedFont {
    /// Resolve a font dictionary. Never fails: anything missing degrades
    /// to defaults, with a note in `warnings` where it matters.
    pub fn load(doc: &Document, font_dict: &Dictionary, warnings: &mut Vec<String>) -> LoadedFont {
        let base_name = font_dict
            .get(b"BaseFont")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(name_string)
            .map(|name| strip_subset_prefix(&name).to_string())
            .unwrap_or_default();

        let subtype = font_dict
            .get(b"Subtype")
            .ok()
            .and_then(name_string)
            .unwrap_or_default();

        let to_unicode = font_dict
            .get(b"ToUnicode")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| match obj {
                Object::Stream(stream) => Some(ToUnicodeMap::parse(&stream_bytes(stream))),
                _ => None,
            })
            .filter(|map| !map.is_empty());

        if subtype == "Type0" {
            Self::load_cid(doc, font_dict, base_name, to_unicode, warnings)
        } else {
            Self::load_simple(doc, font_dict, base_name, to_unicode, warnings)
        }
    }

    fn load_simple(
        doc: &Document,
        font_dict: &Dictionary,
        base_name: String,
        to_unicode: Option<ToUnicodeMap>,
        warnings: &mut Vec<String>,
    ) -> LoadedFont {
        let first_char = font_dict
            .get(b"FirstChar")
            .ok()
            .and_then(|obj| object_to_f64(resolve(doc, obj)))
            .map(|v| v as u32)
            .unwrap_or(0);

        let table = font_dict
            .get(b"Widths")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .map(|arr| {
                arr.iter()
                    .map(|obj| object_to_f64(resolve(doc, obj)).unwrap_or(0.0))
                    .collect()
            })
            .unwrap_or_default();

        let descriptor = font_descriptor(doc, font_dict);
        let missing = descriptor
            .and_then(|desc| desc.get(b"MissingWidth").ok())
            .and_then(|obj| object_to_f64(resolve(doc, obj)))
            .unwrap_or(DEFAULT_SIMPLE_WIDTH);

        let encoding = simple_encoding(doc, font_dict, &base_name, warnings);
        let outlines = descriptor.and_then(|desc| load_outlines(doc, desc, &base_name, warnings));

        LoadedFont {
            base_name,
            is_cid: false,
            widths: Widths::Simple {
                first_char,
                table,
                missing,
            },
            to_unicode,
            encoding,
            gid_map: GidMap::Identity,
            outlines,
        }
    }

    fn load_cid(
        doc: &Document,
        font_dict: &Dictionary,
        base_name: String,
        to_unicode: Option<ToUnicodeMap>,
        warnings: &mut Vec<String>,
    ) -> LoadedFont {
        match font_dict.get(b"Encoding").ok().and_then(name_string) {
            Some(name) if name == "Identity-H" => {}
            Some(name) => warnings.push(format!(
                "font {base_name}: CMap encoding {name} treated as Identity-H"
            )),
            None => {}
        }

        let descendant = font_dict
            .get(b"DescendantFonts")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .and_then(|arr| arr.first())
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_dict().ok());

        let Some(descendant) = descendant else {
            warnings.push(format!("font {base_name}: Type0 without descendant font"));
            return LoadedFont {
                base_name,
                is_cid: true,
                widths: Widths::Cid {
                    table: HashMap::new(),
                    default: DEFAULT_CID_WIDTH,
                },
                to_unicode,
                encoding: SimpleEncoding::default(),
                gid_map: GidMap::Identity,
                outlines: None,
            };
        };

        let default = descendant
            .get(b"DW")
            .ok()
            .and_then(|obj| object_to_f64(resolve(doc, obj)))
            .unwrap_or(DEFAULT_CID_WIDTH);

        let table = descendant
            .get(b"W")
            .ok()
            .map(|obj| resolve(doc, obj))
            .and_then(|obj| obj.as_array().ok())
            .map(|arr| parse_cid_widths(doc, arr))
            .unwrap_or_default();

        let gid_map = match descendant.get(b"CIDToGIDMap").ok().map(|o| resolve(doc, o)) {
            Some(Object::Stream(stream)) => GidMap::from_stream(&stream_bytes(stream)),
            _ => GidMap::Identity,
        };

        let outlines = font_descriptor(doc, descendant)
            .and_then(|desc| load_outlines(doc, desc, &base_name, warnings));

        LoadedFont {
            base_name,
            is_cid: true,
            widths: Widths::Cid { table, default },
            to_unicode,
            encoding: SimpleEncoding::default(),
            gid_map,
            outlines,
        }
    }

    /// Width of a code in glyph space units (1/1000 of text space).
    pub fn width(&self, code: u32) -> f64 {
        self.widths.get(code)
    }

    /// Decode a show-string operand into per-code text and widths.
    ///
    /// CID fonts consume two bytes per code; a trailing odd byte is
    /// dropped. Simple fonts consume one byte per code, preferring the
    /// ToUnicode table and falling back to the font's byte encoding.
    pub fn decode(&self, bytes: &[u8]) -> Vec<DecodedChar> {
        if self.is_cid {
            bytes
                .chunks_exact(2)
                .map(|pair| {
                    let code = u32::from(pair[0]) << 8 | u32::from(pair[1]);
                    let text = self
                        .to_unicode
                        .as_ref()
                        .and_then(|map| map.lookup(code))
                        .unwrap_or_default()
                        .to_string();
                    DecodedChar {
                        code,
                        text,
                        width: self.width(code),
                        word_break: false,
                    }
                })
                .collect()
        } else {
            bytes
                .iter()
                .map(|&byte| {
                    let code = u32::from(byte);
                    let text = match self.to_unicode.as_ref().and_then(|map| map.lookup(code)) {
                        Some(mapped) => mapped.to_string(),
                        None => self.encoding.decode_byte(byte),
                    };
                    DecodedChar {
                        code,
                        text,
                        width: self.width(code),
                        word_break: byte == 32,
                    }
                })
                .collect()
        }
    }

    /// Whether the font carries an embedded TrueType program.
    pub fn has_outlines(&self) -> bool {
        self.outlines.is_some()
    }

    /// Resolve the glyph id and outline for a decoded code.
    ///
    /// CID fonts map through /CIDToGIDMap; simple fonts look the decoded
    /// character up in the font program's character map.
    pub fn glyph_outline(&mut self, decoded: &DecodedChar) -> (Option<u16>, Option<Path>) {
        let Some(source) = self.outlines.as_mut() else {
            return (None, None);
        };
        let gid = if self.is_cid {
            Some(self.gid_map.map(decoded.code))
        } else {
            decoded
                .text
                .chars()
                .next()
                .and_then(|c| source.glyph_id_for_char(c))
        };
        match gid {
            Some(gid) => (Some(gid), source.outline(gid)),
            None => (None, None),
        }
    }
}

/// Strip a subset tag (`ABCDEF+`) from a base font name.
pub fn strip_subset_prefix(name: &str) -> &str {
    match name.split_once('+') {
        Some((prefix, rest))
            if prefix.len() == 6 && prefix.chars().all(|c| c.is_ascii_uppercase()) =>
        {
            rest
        }
        _ => name,
    }
}

fn font_descriptor<'a>(doc: &'a Document, font_dict: &'a Dictionary) -> Option<&'a Dictionary> {
    font_dict
        .get(b"FontDescriptor")
        .ok()
        .map(|obj| resolve(doc, obj))
        .and_then(|obj| obj.as_dict().ok())
}

fn simple_encoding(
    doc: &Document,
    font_dict: &Dictionary,
    base_name: &str,
    warnings: &mut Vec<String>,
) -> SimpleEncoding {
    let encoding_obj = font_dict.get(b"Encoding").ok().map(|obj| resolve(doc, obj));
    let base = match encoding_obj {
        None => return SimpleEncoding::default(),
        Some(Object::Name(_)) => encoding_obj.and_then(name_string),
        Some(Object::Dictionary(dict)) => {
            if dict.has(b"Differences") {
                warnings.push(format!(
                    "font {base_name}: glyph renames in /Differences are not applied"
                ));
            }
            dict.get(b"BaseEncoding").ok().and_then(name_string)
        }
        Some(_) => None,
    };
    match base.as_deref() {
        Some("WinAnsiEncoding") | None => SimpleEncoding::WinAnsi,
        Some("MacRomanEncoding") => SimpleEncoding::MacRoman,
        Some(other) => {
            warnings.push(format!(
                "font {base_name}: encoding {other} read as WinAnsiEncoding"
            ));
            SimpleEncoding::WinAnsi
        }
    }
}

/// Parse the /W width overrides. Two entry forms are allowed:
/// `c [w1 w2 ...]` and `c_first c_last w`.
fn parse_cid_widths(doc: &Document, objects: &[Object]) -> HashMap<u32, f64> {
    let mut widths = HashMap::new();
    let mut i = 0;
    while i < objects.len() {
        let Some(start) = object_to_f64(resolve(doc, &objects[i])).map(|v| v as u32) else {
            i += 1;
            continue;
        };
        i += 1;
        let Some(next) = objects.get(i).map(|obj| resolve(doc, obj)) else {
            break;
        };
        if let Ok(per_cid) = next.as_array() {
            for (offset, obj) in per_cid.iter().enumerate() {
                if let Some(w) = object_to_f64(resolve(doc, obj)) {
                    widths.insert(start + offset as u32, w);
                }
            }
            i += 1;
        } else if let Some(end) = object_to_f64(next).map(|v| v as u32) {
            i += 1;
            if let Some(w) = objects
                .get(i)
                .and_then(|obj| object_to_f64(resolve(doc, obj)))
            {
                if end >= start && end - start <= 0xFFFF {
                    for cid in start..=end {
                        widths.insert(cid, w);
                    }
                }
                i += 1;
            }
        } else {
            i += 1;
        }
    }
    widths
}

fn load_outlines(
    doc: &Document,
    descriptor: &Dictionary,
    base_name: &str,
    warnings: &mut Vec<String>,
) -> Option<OutlineSource> {
    let stream = match descriptor.get(b"FontFile2").ok().map(|o| resolve(doc, o)) {
        Some(Object::Stream(stream)) => stream,
        _ => return None,
    };
    let data = stream_bytes(stream);
    match OutlineSource::new(data) {
        Some(source) => Some(source),
        None => {
            warnings.push(format!(
                "font {base_name}: embedded TrueType program is unreadable"
            ));
            None
        }
    }
}

/// Outline extraction from an embedded TrueType program.
///
/// Outlines are produced in normalized glyph space: 1 unit equals 1 point
/// at font size 1.0, origin on the baseline, y increasing downward. The
/// face header is re-parsed per lookup (it borrows the data), so results
/// are cached by glyph id.
struct OutlineSource {
    data: Vec<u8>,
    scale: f64,
    cache: HashMap<u16, Option<Path>>,
}

impl OutlineSource {
    fn new(data: Vec<u8>) -> Option<Self> {
        let face = ttf_parser::Face::parse(&data, 0).ok()?;
        let scale = 1.0 / f64::from(face.units_per_em().max(1));
        Some(Self {
            data,
            scale,
            cache: HashMap::new(),
        })
    }

    fn glyph_id_for_char(&self, c: char) -> Option<u16> {
        let face = ttf_parser::Face::parse(&self.data, 0).ok()?;
        face.glyph_index(c).map(|id| id.0)
    }

    fn outline(&mut self, gid: u16) -> Option<Path> {
        if let Some(cached) = self.cache.get(&gid) {
            return cached.clone();
        }
        let outline = self.extract(gid);
        self.cache.insert(gid, outline.clone());
        outline
    }

    fn extract(&self, gid: u16) -> Option<Path> {
        let face = ttf_parser::Face::parse(&self.data, 0).ok()?;
        let mut sink = OutlineSink {
            builder: PathBuilder::new(Ctm::new(self.scale, 0.0, 0.0, -self.scale, 0.0, 0.0)),
            last: None,
        };
        face.outline_glyph(ttf_parser::GlyphId(gid), &mut sink)?;
        let path = sink.builder.take_and_reset();
        if path.segments.is_empty() {
            None
        } else {
            Some(path)
        }
    }
}

/// Control points of the cubic equivalent of a quadratic Bezier.
fn quad_to_cubic(
    p0: (f64, f64),
    q: (f64, f64),
    p2: (f64, f64),
) -> ((f64, f64), (f64, f64)) {
    let cp1 = (
        p0.0 + 2.0 / 3.0 * (q.0 - p0.0),
        p0.1 + 2.0 / 3.0 * (q.1 - p0.1),
    );
    let cp2 = (
        p2.0 + 2.0 / 3.0 * (q.0 - p2.0),
        p2.1 + 2.0 / 3.0 * (q.1 - p2.1),
    );
    (cp1, cp2)
}

/// Feeds ttf-parser outline callbacks into a [`PathBuilder`] whose CTM
/// performs the scale and y flip. `last` tracks the pen in raw font
/// units for quadratic conversion.
struct OutlineSink {
    builder: PathBuilder,
    last: Option<(f64, f64)>,
}

impl ttf_parser::OutlineBuilder for OutlineSink {
    fn move_to(&mut self, x: f32, y: f32) {
        self.builder.move_to(f64::from(x), f64::from(y));
        self.last = Some((f64::from(x), f64::from(y)));
    }

    fn line_to(&mut self, x: f32, y: f32) {
        self.builder.line_to(f64::from(x), f64::from(y));
        self.last = Some((f64::from(x), f64::from(y)));
    }

    fn quad_to(&mut self, x1: f32, y1: f32, x: f32, y: f32) {
        let q = (f64::from(x1), f64::from(y1));
        let end = (f64::from(x), f64::from(y));
        let p0 = self.last.unwrap_or(end);
        let (cp1, cp2) = quad_to_cubic(p0, q, end);
        self.builder.curve_to(cp1.0, cp1.1, cp2.0, cp2.1, end.0, end.1);
        self.last = Some(end);
    }

    fn curve_to(&mut self, x1: f32, y1: f32, x2: f32, y2: f32, x: f32, y: f32) {
        self.builder.curve_to(
            f64::from(x1),
            f64::from(y1),
            f64::from(x2),
            f64::from(y2),
            f64::from(x),
            f64::from(y),
        );
        self.last = Some((f64::from(x), f64::from(y)));
    }

    fn close(&mut self) {
        self.builder.close_path();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lopdf::{Stream, dictionary};

    fn empty_doc() -> Document {
        Document::with_version("1.5")
    }

    fn load(doc: &Document, dict: &Dictionary) -> (LoadedFont, Vec<String>) {
        let mut warnings = Vec::new();
        let font = LoadedFont::load(doc, dict, &mut warnings);
        (font, warnings)
    }

    // --- subset prefixes ---

    #[test]
    fn strips_six_letter_subset_prefix() {
        assert_eq!(strip_subset_prefix("ABCDEF+Times-Roman"), "Times-Roman");
    }

    #[test]
    fn keeps_names_without_subset_prefix() {
        assert_eq!(strip_subset_prefix("Helvetica"), "Helvetica");
        assert_eq!(strip_subset_prefix("abcdef+Times"), "abcdef+Times");
        assert_eq!(strip_subset_prefix("AB+Times"), "AB+Times");
    }

    // --- simple font widths ---

    #[test]
    fn simple_widths_indexed_from_first_char() {
        let doc = empty_doc();
        let dict = dictionary! {
            "Type" => "Font",
            "Subtype" => "TrueType",
            "BaseFont" => "ABCDEF+Arial",
            "FirstChar" => 65,
            "LastChar" => 67,
            "Widths" => vec![500.into(), 600.into(), 700.into()],
        };
        let (font, warnings) = load(&doc, &dict);
        assert!(warnings.is_empty());
        assert_eq!(font.base_name, "Arial");
        assert!(!font.is_cid);
        assert_eq!(font.width(65), 500.0);
        assert_eq!(font.width(66), 600.0);
        assert_eq!(font.width(67), 700.0);
    }

    #[test]
    fn simple_width_outside_range_uses_missing_width() {
        let doc = empty_doc();
        let dict = dictionary! {
            "Subtype" => "TrueType",
            "FirstChar" => 65,
            "Widths" => vec![500.into()],
            "FontDescriptor" => Object::Dictionary(dictionary! {
                "MissingWidth" => 250,
            }),
        };
        let (font, _) = load(&doc, &dict);
        assert_eq!(font.width(64), 250.0);
        assert_eq!(font.width(90), 250.0);
    }

    #[test]
    fn simple_width_default_without_descriptor() {
        let doc = empty_doc();
        let dict = dictionary! { "Subtype" => "TrueType" };
        let (font, _) = load(&doc, &dict);
        assert_eq!(font.width(65), DEFAULT_SIMPLE_WIDTH);
    }

    #[test]
    fn widths_behind_reference_are_resolved() {
        let mut doc = empty_doc();
        let widths_id = doc.add_object(vec![
            Object::Integer(300),
            Object::Integer(400),
        ]);
        let dict = dictionary! {
            "Subtype" => "TrueType",
            "FirstChar" => 32,
            "Widths" => Object::Reference(widths_id),
        };
        let (font, _) = load(&doc, &dict);
        assert_eq!(font.width(32), 300.0);
        assert_eq!(font.width(33), 400.0);
    }

    // --- simple font decoding ---

    #[test]
    fn decode_win_ansi_bytes() {
        let doc = empty_doc();
        let dict = dictionary! { "Subtype" => "TrueType" };
        let (font, _) = load(&doc, &dict);
        let decoded = font.decode(b"Hi");
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].text, "H");
        assert_eq!(decoded[1].text, "i");
        assert!(!decoded[0].word_break);
    }

    #[test]
    fn decode_win_ansi_high_byte() {
        let doc = empty_doc();
        let dict = dictionary! {
            "Subtype" => "TrueType",
            "Encoding" => "WinAnsiEncoding",
        };
        let (font, _) = load(&doc, &dict);
        assert_eq!(font.decode(&[0x80])[0].text, "\u{20AC}");
    }

    #[test]
    fn decode_mac_roman_high_byte() {
        let doc = empty_doc();
        let dict = dictionary! {
            "Subtype" => "TrueType",
            "Encoding" => "MacRomanEncoding",
        };
        let (font, _) = load(&doc, &dict);
        assert_eq!(font.decode(&[0x8E])[0].text, "\u{00E9}");
    }

    #[test]
    fn decode_marks_word_breaks_on_space() {
        let doc = empty_doc();
        let dict = dictionary! { "Subtype" => "TrueType" };
        let (font, _) = load(&doc, &dict);
        let decoded = font.decode(b"a b");
        assert!(decoded[1].word_break);
        assert!(!decoded[0].word_break);
    }

    #[test]
    fn to_unicode_preferred_over_encoding() {
        let mut doc = empty_doc();
        let cmap = b"1 beginbfchar <41> <0058> endbfchar".to_vec();
        let cmap_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, cmap)));
        let dict = dictionary! {
            "Subtype" => "TrueType",
            "ToUnicode" => Object::Reference(cmap_id),
        };
        let (font, _) = load(&doc, &dict);
        let decoded = font.decode(b"AB");
        assert_eq!(decoded[0].text, "X");
        // Unmapped codes fall back to the byte encoding.
        assert_eq!(decoded[1].text, "B");
    }

    // --- encodings and warnings ---

    #[test]
    fn unknown_encoding_warns_and_falls_back() {
        let doc = empty_doc();
        let dict = dictionary! {
            "Subtype" => "Type1",
            "BaseFont" => "Symbol",
            "Encoding" => "FancyEncoding",
        };
        let (font, warnings) = load(&doc, &dict);
        assert_eq!(font.encoding, SimpleEncoding::WinAnsi);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("FancyEncoding"));
    }

    #[test]
    fn differences_array_warns() {
        let doc = empty_doc();
        let dict = dictionary! {
            "Subtype" => "Type1",
            "BaseFont" => "Custom",
            "Encoding" => Object::Dictionary(dictionary! {
                "BaseEncoding" => "MacRomanEncoding",
                "Differences" => vec![Object::Integer(65), Object::Name(b"alpha".to_vec())],
            }),
        };
        let (font, warnings) = load(&doc, &dict);
        assert_eq!(font.encoding, SimpleEncoding::MacRoman);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("Differences"));
    }

    #[test]
    fn unreadable_font_program_warns_without_outlines() {
        let mut doc = empty_doc();
        let program_id = doc.add_object(Object::Stream(Stream::new(
            dictionary! {},
            b"not a truetype file".to_vec(),
        )));
        let dict = dictionary! {
            "Subtype" => "TrueType",
            "BaseFont" => "Broken",
            "FontDescriptor" => Object::Dictionary(dictionary! {
                "FontFile2" => Object::Reference(program_id),
            }),
        };
        let (font, warnings) = load(&doc, &dict);
        assert!(!font.has_outlines());
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("unreadable"));
    }

    // --- CID fonts ---

    fn type0_dict(descendant: Dictionary) -> Dictionary {
        dictionary! {
            "Type" => "Font",
            "Subtype" => "Type0",
            "BaseFont" => "ABCDEF+NotoSans",
            "Encoding" => "Identity-H",
            "DescendantFonts" => vec![Object::Dictionary(descendant)],
        }
    }

    #[test]
    fn cid_default_width_without_dw() {
        let doc = empty_doc();
        let dict = type0_dict(dictionary! { "Subtype" => "CIDFontType2" });
        let (font, warnings) = load(&doc, &dict);
        assert!(warnings.is_empty());
        assert!(font.is_cid);
        assert_eq!(font.width(42), DEFAULT_CID_WIDTH);
    }

    #[test]
    fn cid_w_array_per_cid_form() {
        let doc = empty_doc();
        let dict = type0_dict(dictionary! {
            "Subtype" => "CIDFontType2",
            "DW" => 1000,
            "W" => vec![
                Object::Integer(5),
                Object::Array(vec![400.into(), 500.into(), 600.into()]),
            ],
        });
        let (font, _) = load(&doc, &dict);
        assert_eq!(font.width(5), 400.0);
        assert_eq!(font.width(6), 500.0);
        assert_eq!(font.width(7), 600.0);
        assert_eq!(font.width(8), 1000.0);
    }

    #[test]
    fn cid_w_array_range_form() {
        let doc = empty_doc();
        let dict = type0_dict(dictionary! {
            "Subtype" => "CIDFontType2",
            "W" => vec![10.into(), 12.into(), 750.into()],
        });
        let (font, _) = load(&doc, &dict);
        assert_eq!(font.width(10), 750.0);
        assert_eq!(font.width(11), 750.0);
        assert_eq!(font.width(12), 750.0);
        assert_eq!(font.width(13), DEFAULT_CID_WIDTH);
    }

    #[test]
    fn cid_w_array_mixed_forms() {
        let doc = empty_doc();
        let dict = type0_dict(dictionary! {
            "Subtype" => "CIDFontType2",
            "W" => vec![
                Object::Integer(1),
                Object::Array(vec![250.into()]),
                Object::Integer(100),
                Object::Integer(101),
                Object::Integer(880),
            ],
        });
        let (font, _) = load(&doc, &dict);
        assert_eq!(font.width(1), 250.0);
        assert_eq!(font.width(100), 880.0);
        assert_eq!(font.width(101), 880.0);
    }

    #[test]
    fn cid_decode_two_byte_codes() {
        let mut doc = empty_doc();
        let cmap = b"1 beginbfchar <0041> <0041> endbfchar".to_vec();
        let cmap_id = doc.add_object(Object::Stream(Stream::new(dictionary! {}, cmap)));
        let mut dict = type0_dict(dictionary! { "Subtype" => "CIDFontType2" });
        dict.set("ToUnicode", Object::Reference(cmap_id));

        let (font, _) = load(&doc, &dict);
        let decoded = font.decode(&[0x00, 0x41, 0x00, 0x42]);
        assert_eq!(decoded.len(), 2);
        assert_eq!(decoded[0].code, 0x41);
        assert_eq!(decoded[0].text, "A");
        // No ToUnicode entry: the text is empty rather than guessed.
        assert_eq!(decoded[1].code, 0x42);
        assert_eq!(decoded[1].text, "");
    }

    #[test]
    fn cid_decode_drops_trailing_odd_byte() {
        let doc = empty_doc();
        let dict = type0_dict(dictionary! { "Subtype" => "CIDFontType2" });
        let (font, _) = load(&doc, &dict);
        assert_eq!(font.decode(&[0x00, 0x41, 0x07]).len(), 1);
    }

    #[test]
    fn non_identity_cmap_warns() {
        let doc = empty_doc();
        let mut dict = type0_dict(dictionary! { "Subtype" => "CIDFontType2" });
        dict.set("Encoding", Object::Name(b"GBK-EUC-H".to_vec()));
        let (_, warnings) = load(&doc, &dict);
        assert_eq!(warnings.len(), 1);
        assert!(warnings[0].contains("GBK-EUC-H"));
    }

    #[test]
    fn type0_without_descendant_warns() {
        let doc = empty_doc();
        let dict = dictionary! {
            "Subtype" => "Type0",
            "BaseFont" => "Orphan",
        };
        let (font, warnings) = load(&doc, &dict);
        assert!(font.is_cid);
        assert_eq!(font.width(1), DEFAULT_CID_WIDTH);
        assert_eq!(warnings.len(), 1);
    }

    // --- gid mapping ---

    #[test]
    fn gid_map_identity() {
        assert_eq!(GidMap::Identity.map(7), 7);
        assert_eq!(GidMap::Identity.map(300), 300);
    }

    #[test]
    fn gid_map_table_lookup_with_fallback() {
        let map = GidMap::from_stream(&[0x00, 0x05, 0x00, 0x09]);
        assert_eq!(map.map(0), 5);
        assert_eq!(map.map(1), 9);
        // Past the table end the cid passes through.
        assert_eq!(map.map(2), 2);
    }

    // --- outline math ---

    #[test]
    fn quad_to_cubic_control_points() {
        let ((x1, y1), (x2, y2)) = quad_to_cubic((0.0, 0.0), (3.0, 3.0), (6.0, 0.0));
        assert!((x1 - 2.0).abs() < 1e-12);
        assert!((y1 - 2.0).abs() < 1e-12);
        assert!((x2 - 4.0).abs() < 1e-12);
        assert!((y2 - 2.0).abs() < 1e-12);
    }

    #[test]
    fn glyph_outline_without_program_is_none() {
        let doc = empty_doc();
        let dict = dictionary! { "Subtype" => "TrueType" };
        let (mut font, _) = load(&doc, &dict);
        let decoded = font.decode(b"A").remove(0);
        assert_eq!(font.glyph_outline(&decoded), (None, None));
    }
}
