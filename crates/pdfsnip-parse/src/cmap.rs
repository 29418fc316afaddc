//! ToUnicode CMap parsing.
//!
//! Maps character codes to Unicode strings using the `beginbfchar` /
//! `beginbfrange` sections of a `/ToUnicode` stream. CMap syntax is close
//! enough to content stream syntax that the tokenizer handles it: the hex
//! string entries pile up as operands and flush at the `endbfchar` /
//! `endbfrange` keywords.

use std::collections::HashMap;

use crate::tokenizer::{Operand, tokenize};

/// Largest bfrange span accepted. Ranges beyond this are discarded so a
/// corrupt header cannot balloon the table.
const MAX_RANGE_SPAN: u32 = 0xFFFF;

/// A code-to-Unicode table parsed from a ToUnicode stream.
///
/// Codes are the raw big-endian byte values from show-string operands,
/// typically 1 byte for simple fonts and 2 for CID fonts. Values may be
/// multi-character strings (ligatures expand to their letters).
#[derive(Debug, Clone, Default)]
pub struct ToUnicodeMap {
    mappings: HashMap<u32, String>,
}

impl ToUnicodeMap {
    /// Parse a ToUnicode stream. Malformed entries are skipped.
    pub fn parse(data: &[u8]) -> Self {
        let mut mappings = HashMap::new();
        for op in tokenize(data) {
            match op.name.as_str() {
                "endbfchar" => {
                    for pair in op.operands.chunks_exact(2) {
                        let (Operand::HexString(src), Operand::HexString(dst)) =
                            (&pair[0], &pair[1])
                        else {
                            continue;
                        };
                        if let Some(code) = code_value(src) {
                            mappings.insert(code, utf16be_string(dst));
                        }
                    }
                }
                "endbfrange" => {
                    for triple in op.operands.chunks_exact(3) {
                        let (Operand::HexString(lo), Operand::HexString(hi)) =
                            (&triple[0], &triple[1])
                        else {
                            continue;
                        };
                        let (Some(lo), Some(hi)) = (code_value(lo), code_value(hi)) else {
                            continue;
                        };
                        if hi < lo || hi - lo > MAX_RANGE_SPAN {
                            continue;
                        }
                        insert_range(&mut mappings, lo, hi, &triple[2]);
                    }
                }
                _ => {}
            }
        }
        Self { mappings }
    }

    /// Look up the Unicode string for a character code.
    pub fn lookup(&self, code: u32) -> Option<&str> {
        self.mappings.get(&code).map(String::as_str)
    }

    /// Look up a code, substituting U+FFFD when unmapped.
    pub fn lookup_or_replacement(&self, code: u32) -> String {
        match self.lookup(code) {
            Some(s) => s.to_string(),
            None => "\u{FFFD}".to_string(),
        }
    }

    pub fn len(&self) -> usize {
        self.mappings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mappings.is_empty()
    }
}

fn insert_range(mappings: &mut HashMap<u32, String>, lo: u32, hi: u32, dst: &Operand) {
    match dst {
        // <lo> <hi> <base>: successive codes increment the last UTF-16 unit.
        Operand::HexString(base) => {
            let mut units: Vec<u16> = utf16_units(base);
            if units.is_empty() {
                return;
            }
            for code in lo..=hi {
                mappings.insert(code, String::from_utf16_lossy(&units));
                if let Some(last) = units.last_mut() {
                    *last = last.wrapping_add(1);
                }
            }
        }
        // <lo> <hi> [<dst> ...]: one destination per code.
        Operand::Array(items) => {
            for (offset, item) in items.iter().enumerate() {
                if let Operand::HexString(bytes) = item {
                    let code = lo + offset as u32;
                    if code > hi {
                        break;
                    }
                    mappings.insert(code, utf16be_string(bytes));
                }
            }
        }
        _ => {}
    }
}

/// Big-endian code value of a 1-4 byte source string.
fn code_value(bytes: &[u8]) -> Option<u32> {
    if bytes.is_empty() || bytes.len() > 4 {
        return None;
    }
    Some(bytes.iter().fold(0u32, |acc, &b| acc << 8 | u32::from(b)))
}

fn utf16_units(bytes: &[u8]) -> Vec<u16> {
    bytes
        .chunks_exact(2)
        .map(|pair| u16::from(pair[0]) << 8 | u16::from(pair[1]))
        .collect()
}

fn utf16be_string(bytes: &[u8]) -> String {
    String::from_utf16_lossy(&utf16_units(bytes))
}
