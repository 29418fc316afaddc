//! Content stream tokenizer.
//!
//! Splits a decoded content stream into a flat sequence of [`Operator`]s,
//! each carrying the operand values that preceded it. The grammar is the
//! PDF object syntax restricted to what content streams actually contain:
//! numbers, names, strings, arrays, dictionaries, booleans and null.
//!
//! Inline images (`BI ... ID ... EI`) are consumed as a single unit; the
//! image payload is discarded and a bare `BI` operator is emitted so the
//! interpreter can record that one was skipped.

/// A single operand value on the content stream stack.
#[derive(Debug, Clone, PartialEq)]
pub enum Operand {
    /// Integer number.
    Integer(i64),
    /// Real (floating point) number.
    Real(f64),
    /// Name object, without the leading slash. `#xx` escapes are decoded.
    Name(String),
    /// Literal string `(...)` with escapes resolved, as raw bytes.
    LiteralString(Vec<u8>),
    /// Hex string `<...>` decoded to raw bytes.
    HexString(Vec<u8>),
    /// Array of operands.
    Array(Vec<Operand>),
    /// Boolean `true` / `false`.
    Boolean(bool),
    /// The `null` object.
    Null,
    /// Inline dictionary `<< ... >>`, as ordered key/value pairs.
    Dictionary(Vec<(String, Operand)>),
}

/// An operator together with the operands that preceded it.
#[derive(Debug, Clone, PartialEq)]
pub struct Operator {
    /// Operator name as written in the stream (`Tj`, `re`, `T*`, ...).
    pub name: String,
    /// Operand stack contents at the time the operator appeared.
    pub operands: Vec<Operand>,
}

/// Tokenize a decoded content stream into operators.
///
/// The tokenizer is lenient: malformed bytes are skipped rather than
/// reported, and an unterminated string or array extends to end of input.
/// Structural validation is left to the interpreter.
pub fn tokenize(bytes: &[u8]) -> Vec<Operator> {
    Lexer::new(bytes).run()
}

fn is_whitespace(b: u8) -> bool {
    matches!(b, b'\0' | b'\t' | b'\n' | b'\x0C' | b'\r' | b' ')
}

fn is_delimiter(b: u8) -> bool {
    matches!(
        b,
        b'(' | b')' | b'<' | b'>' | b'[' | b']' | b'{' | b'}' | b'/' | b'%'
    )
}

fn hex_value(b: u8) -> Option<u8> {
    match b {
        b'0'..=b'9' => Some(b - b'0'),
        b'a'..=b'f' => Some(b - b'a' + 10),
        b'A'..=b'F' => Some(b - b'A' + 10),
        _ => None,
    }
}

enum Item {
    Operand(Operand),
    Keyword(String),
}

struct Lexer<'a> {
    bytes: &'a [u8],
    pos: usize,
}

impl<'a> Lexer<'a> {
    fn new(bytes: &'a [u8]) -> Self {
        Self { bytes, pos: 0 }
    }

    fn run(mut self) -> Vec<Operator> {
        let mut operators = Vec::new();
        let mut stack: Vec<Operand> = Vec::new();
        while let Some(item) = self.next_item() {
            match item {
                Item::Operand(operand) => stack.push(operand),
                Item::Keyword(name) => {
                    if name == "BI" {
                        self.skip_inline_image();
                    }
                    operators.push(Operator {
                        name,
                        operands: std::mem::take(&mut stack),
                    });
                }
            }
        }
        operators
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    fn bump(&mut self) -> Option<u8> {
        let b = self.peek()?;
        self.pos += 1;
        Some(b)
    }

    fn skip_whitespace_and_comments(&mut self) {
        while let Some(b) = self.peek() {
            if is_whitespace(b) {
                self.pos += 1;
            } else if b == b'%' {
                while let Some(c) = self.peek() {
                    if c == b'\n' || c == b'\r' {
                        break;
                    }
                    self.pos += 1;
                }
            } else {
                break;
            }
        }
    }

    /// Read the next operand or keyword, skipping anything unrecognized.
    fn next_item(&mut self) -> Option<Item> {
        loop {
            self.skip_whitespace_and_comments();
            let b = self.peek()?;
            match b {
                b'/' => return Some(Item::Operand(Operand::Name(self.read_name()))),
                b'(' => {
                    return Some(Item::Operand(Operand::LiteralString(
                        self.read_literal_string(),
                    )));
                }
                b'<' => {
                    if self.bytes.get(self.pos + 1) == Some(&b'<') {
                        return Some(Item::Operand(Operand::Dictionary(self.read_dictionary())));
                    }
                    return Some(Item::Operand(Operand::HexString(self.read_hex_string())));
                }
                b'[' => return Some(Item::Operand(Operand::Array(self.read_array()))),
                b'0'..=b'9' | b'+' | b'-' | b'.' => {
                    if let Some(number) = self.read_number() {
                        return Some(Item::Operand(number));
                    }
                }
                _ if !is_delimiter(b) => {
                    let keyword = self.read_keyword();
                    return match keyword.as_str() {
                        "true" => Some(Item::Operand(Operand::Boolean(true))),
                        "false" => Some(Item::Operand(Operand::Boolean(false))),
                        "null" => Some(Item::Operand(Operand::Null)),
                        _ => Some(Item::Keyword(keyword)),
                    };
                }
                // Stray delimiter with no construct to open: skip it.
                _ => {
                    self.pos += 1;
                }
            }
        }
    }

    fn read_keyword(&mut self) -> String {
        let start = self.pos;
        while let Some(b) = self.peek() {
            if is_whitespace(b) || is_delimiter(b) {
                break;
            }
            self.pos += 1;
        }
        String::from_utf8_lossy(&self.bytes[start..self.pos]).into_owned()
    }

    /// Returns `None` when the sign/dot run contains no digits.
    fn read_number(&mut self) -> Option<Operand> {
        let start = self.pos;
        let mut has_digits = false;
        let mut has_dot = false;
        if matches!(self.peek(), Some(b'+') | Some(b'-')) {
            self.pos += 1;
        }
        while let Some(b) = self.peek() {
            match b {
                b'0'..=b'9' => {
                    has_digits = true;
                    self.pos += 1;
                }
                b'.' if !has_dot => {
                    has_dot = true;
                    self.pos += 1;
                }
                _ => break,
            }
        }
        if !has_digits {
            // Lone sign or dot: drop the bytes consumed so far.
            return None;
        }
        let text = String::from_utf8_lossy(&self.bytes[start..self.pos]);
        if has_dot {
            text.parse::<f64>().ok().map(Operand::Real)
        } else {
            match text.parse::<i64>() {
                Ok(i) => Some(Operand::Integer(i)),
                Err(_) => text.parse::<f64>().ok().map(Operand::Real),
            }
        }
    }

    fn read_name(&mut self) -> String {
        self.pos += 1; // slash
        let mut name = Vec::new();
        while let Some(b) = self.peek() {
            if is_whitespace(b) || is_delimiter(b) {
                break;
            }
            self.pos += 1;
            if b == b'#' {
                let hi = self.peek().and_then(hex_value);
                if let Some(hi) = hi {
                    self.pos += 1;
                    let lo = self.peek().and_then(hex_value);
                    if let Some(lo) = lo {
                        self.pos += 1;
                        name.push(hi << 4 | lo);
                        continue;
                    }
                }
                // Malformed escape: keep the hash literally.
                name.push(b'#');
            } else {
                name.push(b);
            }
        }
        String::from_utf8_lossy(&name).into_owned()
    }

    fn read_literal_string(&mut self) -> Vec<u8> {
        self.pos += 1; // opening paren
        let mut out = Vec::new();
        let mut depth = 1usize;
        while let Some(b) = self.bump() {
            match b {
                b'(' => {
                    depth += 1;
                    out.push(b);
                }
                b')' => {
                    depth -= 1;
                    if depth == 0 {
                        break;
                    }
                    out.push(b);
                }
                b'\\' => match self.bump() {
                    Some(b'n') => out.push(b'\n'),
                    Some(b'r') => out.push(b'\r'),
                    Some(b't') => out.push(b'\t'),
                    Some(b'b') => out.push(0x08),
                    Some(b'f') => out.push(0x0C),
                    Some(b'(') => out.push(b'('),
                    Some(b')') => out.push(b')'),
                    Some(b'\\') => out.push(b'\\'),
                    Some(d @ b'0'..=b'7') => {
                        let mut value = (d - b'0') as u32;
                        for _ in 0..2 {
                            match self.peek() {
                                Some(d @ b'0'..=b'7') => {
                                    value = value * 8 + (d - b'0') as u32;
                                    self.pos += 1;
                                }
                                _ => break,
                            }
                        }
                        out.push(value as u8);
                    }
                    // Backslash before a line end continues the line.
                    Some(b'\r') => {
                        if self.peek() == Some(b'\n') {
                            self.pos += 1;
                        }
                    }
                    Some(b'\n') => {}
                    // Backslash before anything else is dropped.
                    Some(other) => out.push(other),
                    None => break,
                },
                // Raw end-of-line inside a string normalizes to \n.
                b'\r' => {
                    if self.peek() == Some(b'\n') {
                        self.pos += 1;
                    }
                    out.push(b'\n');
                }
                _ => out.push(b),
            }
        }
        out
    }

    fn read_hex_string(&mut self) -> Vec<u8> {
        self.pos += 1; // opening angle
        let mut digits = Vec::new();
        while let Some(b) = self.bump() {
            if b == b'>' {
                break;
            }
            if let Some(v) = hex_value(b) {
                digits.push(v);
            }
        }
        if digits.len() % 2 == 1 {
            digits.push(0);
        }
        digits
            .chunks(2)
            .map(|pair| pair[0] << 4 | pair[1])
            .collect()
    }

    fn read_array(&mut self) -> Vec<Operand> {
        self.pos += 1; // opening bracket
        let mut items = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None | Some(b']') => {
                    self.pos = (self.pos + 1).min(self.bytes.len());
                    return items;
                }
                _ => match self.next_value() {
                    Some(value) => items.push(value),
                    None => return items,
                },
            }
        }
    }

    fn read_dictionary(&mut self) -> Vec<(String, Operand)> {
        self.pos += 2; // <<
        let mut entries = Vec::new();
        loop {
            self.skip_whitespace_and_comments();
            match self.peek() {
                None => return entries,
                Some(b'>') => {
                    self.pos += 1;
                    if self.peek() == Some(b'>') {
                        self.pos += 1;
                    }
                    return entries;
                }
                Some(b'/') => {
                    let key = self.read_name();
                    self.skip_whitespace_and_comments();
                    match self.next_value() {
                        Some(value) => entries.push((key, value)),
                        None => return entries,
                    }
                }
                // Anything that is not a key: drop and keep scanning.
                _ => {
                    self.pos += 1;
                }
            }
        }
    }

    /// Read a single operand value (for array and dictionary bodies).
    fn next_value(&mut self) -> Option<Operand> {
        let b = self.peek()?;
        match b {
            b'/' => Some(Operand::Name(self.read_name())),
            b'(' => Some(Operand::LiteralString(self.read_literal_string())),
            b'<' => {
                if self.bytes.get(self.pos + 1) == Some(&b'<') {
                    Some(Operand::Dictionary(self.read_dictionary()))
                } else {
                    Some(Operand::HexString(self.read_hex_string()))
                }
            }
            b'[' => Some(Operand::Array(self.read_array())),
            b'0'..=b'9' | b'+' | b'-' | b'.' => self.read_number(),
            _ if !is_delimiter(b) => match self.read_keyword().as_str() {
                "true" => Some(Operand::Boolean(true)),
                "false" => Some(Operand::Boolean(false)),
                _ => Some(Operand::Null),
            },
            _ => {
                self.pos += 1;
                None
            }
        }
    }

    /// Consume everything through the matching `EI` after a `BI` keyword.
    ///
    /// The image dictionary entries and the binary payload after `ID` are
    /// discarded. `EI` only counts when delimited by whitespace on the left
    /// and whitespace, a delimiter, or end of input on the right.
    fn skip_inline_image(&mut self) {
        let remaining = &self.bytes[self.pos..];
        let mut offset = 0usize;
        // Find the ID keyword that starts the binary payload.
        while offset + 2 <= remaining.len() {
            if &remaining[offset..offset + 2] == b"ID"
                && (offset == 0 || is_whitespace(remaining[offset - 1]))
                && remaining
                    .get(offset + 2)
                    .is_none_or(|&b| is_whitespace(b) || is_delimiter(b))
            {
                offset += 2;
                // One whitespace byte separates ID from the payload.
                if remaining.get(offset).copied().is_some_and(is_whitespace) {
                    offset += 1;
                }
                break;
            }
            offset += 1;
        }
        // Scan for the delimited EI terminator.
        while offset + 2 <= remaining.len() {
            if &remaining[offset..offset + 2] == b"EI"
                && offset > 0
                && is_whitespace(remaining[offset - 1])
                && remaining
                    .get(offset + 2)
                    .is_none_or(|&b| is_whitespace(b) || is_delimiter(b))
            {
                self.pos += offset + 2;
                return;
            }
            offset += 1;
        }
        self.pos = self.bytes.len();
    }
}
