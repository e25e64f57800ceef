//! Pull-based XML event reader
//!
//! Scans a byte slice and surfaces a flat stream of [`Event`]s with position
//! tracking for error reporting. Well-formedness that matters to the stream
//! is enforced here: tag balance, attribute quoting, entity syntax, UTF-8.
//! The XML declaration, processing instructions, comments, DOCTYPE and CDATA
//! sections are skipped.

use indexmap::IndexMap;

use crate::error::{Pos, XmlError, XmlErrorKind};
use crate::xml::event::Event;

type Result<T> = std::result::Result<T, XmlError>;

/// XML event reader over a byte slice
#[derive(Clone, Debug)]
pub struct Reader<'a> {
    input: &'a [u8],
    pos: usize,
    line: u32,
    col: u32,
    /// Names of elements opened but not yet closed
    open: Vec<String>,
    /// End event queued for a self-closing tag
    pending_end: Option<String>,
}

impl<'a> Reader<'a> {
    /// Create a reader over raw XML bytes
    pub const fn new(input: &'a [u8]) -> Self {
        Self {
            input,
            pos: 0,
            line: 1,
            col: 1,
            open: Vec::new(),
            pending_end: None,
        }
    }

    /// Pull the next event, or `None` at end of input
    pub fn next_event(&mut self) -> Result<Option<Event>> {
        if let Some(name) = self.pending_end.take() {
            return Ok(Some(Event::End { name }));
        }

        loop {
            if self.is_eof() {
                return if self.open.is_empty() {
                    Ok(None)
                } else {
                    Err(self.error_here(
                        XmlErrorKind::UnexpectedEof,
                        "input ended with unclosed elements",
                    ))
                };
            }

            if self.current() == Some(b'<') {
                match self.peek(1) {
                    Some(b'?') => {
                        self.advance_by(2);
                        self.skip_until(b"?>")?;
                    }
                    Some(b'!') => {
                        self.advance_by(2);
                        self.skip_declaration_or_comment()?;
                    }
                    Some(b'/') => return self.read_end_tag().map(Some),
                    _ => return self.read_start_tag().map(Some),
                }
                continue;
            }

            if let Some(text) = self.read_text()? {
                return Ok(Some(Event::Text(text)));
            }
        }
    }

    fn read_start_tag(&mut self) -> Result<Event> {
        self.expect(b'<')?;
        let name = self.read_name()?;
        let attributes = self.read_attributes()?;

        if self.current() == Some(b'/') {
            self.advance();
            self.expect(b'>')?;
            self.pending_end = Some(name.clone());
            return Ok(Event::Start { name, attributes });
        }

        self.expect(b'>')?;
        self.open.push(name.clone());
        Ok(Event::Start { name, attributes })
    }

    fn read_end_tag(&mut self) -> Result<Event> {
        self.advance_by(2); // "</"
        let pos = self.position();
        let name = self.read_name()?;
        self.skip_whitespace();
        self.expect(b'>')?;

        match self.open.pop() {
            Some(expected) if expected == name => Ok(Event::End { name }),
            Some(expected) => Err(XmlError::new(
                XmlErrorKind::MismatchedTag {
                    expected,
                    found: name,
                },
                pos,
            )),
            None => Err(XmlError::with_message(
                XmlErrorKind::InvalidToken,
                pos,
                "closing tag without a matching open tag",
            )),
        }
    }

    fn read_attributes(&mut self) -> Result<IndexMap<String, String>> {
        let mut attrs = IndexMap::new();

        loop {
            self.skip_whitespace();
            match self.current() {
                Some(b'/') | Some(b'>') => break,
                Some(_) => {}
                None => {
                    return Err(self.error_here(
                        XmlErrorKind::UnexpectedEof,
                        "unexpected end of input inside tag",
                    ))
                }
            }

            let name = self.read_name()?;
            self.skip_whitespace();
            self.expect(b'=')?;
            self.skip_whitespace();
            let value = self.read_attribute_value()?;

            // Repeated attribute names keep the last value.
            attrs.insert(name, value);
        }

        Ok(attrs)
    }

    fn read_attribute_value(&mut self) -> Result<String> {
        let quote = match self.current() {
            Some(b'"') => b'"',
            Some(b'\'') => b'\'',
            _ => {
                return Err(
                    self.error_here(XmlErrorKind::InvalidToken, "expected quoted attribute value")
                )
            }
        };
        self.advance();

        let start_pos = self.position();
        let start = self.pos;
        while let Some(b) = self.current() {
            if b == quote {
                let raw = self.slice_from(start);
                self.advance();
                let text = bytes_to_string(raw, start_pos)?;
                return decode_entities(&text, start_pos);
            }
            self.advance();
        }

        Err(self.error_here(XmlErrorKind::UnexpectedEof, "unterminated attribute value"))
    }

    fn read_text(&mut self) -> Result<Option<String>> {
        let start_pos = self.position();
        let start = self.pos;
        while let Some(b) = self.current() {
            if b == b'<' {
                break;
            }
            self.advance();
        }

        let raw = self.slice_from(start);
        let text = bytes_to_string(raw, start_pos)?;
        let text = decode_entities(&text, start_pos)?;

        if text.trim().is_empty() {
            return Ok(None);
        }
        if self.open.is_empty() {
            return Err(XmlError::with_message(
                XmlErrorKind::InvalidToken,
                start_pos,
                "text outside of the root element",
            ));
        }
        Ok(Some(text))
    }

    fn read_name(&mut self) -> Result<String> {
        let start_pos = self.position();
        let start = self.pos;

        let Some(first) = self.current() else {
            return Err(self.error_here(XmlErrorKind::UnexpectedEof, "expected name"));
        };
        if !is_name_start(first) {
            return Err(XmlError::with_message(
                XmlErrorKind::InvalidToken,
                start_pos,
                "expected name",
            ));
        }

        self.advance();
        while let Some(b) = self.current() {
            if is_name_char(b) {
                self.advance();
            } else {
                break;
            }
        }

        bytes_to_string(self.slice_from(start), start_pos)
    }

    fn skip_declaration_or_comment(&mut self) -> Result<()> {
        // cursor just past "<!"
        if self.current() == Some(b'-') && self.peek(1) == Some(b'-') {
            self.advance_by(2);
            return self.skip_until(b"-->");
        }

        if self.current() == Some(b'[') {
            // CDATA section; content is dropped
            return self.skip_until(b"]]>");
        }

        self.skip_until(b">")
    }

    fn skip_until(&mut self, pattern: &[u8]) -> Result<()> {
        while !self.is_eof() {
            if self.input.get(self.pos..self.pos + pattern.len()) == Some(pattern) {
                self.advance_by(pattern.len());
                return Ok(());
            }
            self.advance();
        }
        Err(self.error_here(XmlErrorKind::UnterminatedMarkup, "unterminated markup"))
    }

    fn expect(&mut self, expected: u8) -> Result<()> {
        if self.current() == Some(expected) {
            self.advance();
            Ok(())
        } else {
            Err(self.error_here(
                XmlErrorKind::InvalidToken,
                format!("expected '{}'", char::from(expected)),
            ))
        }
    }

    fn skip_whitespace(&mut self) {
        while let Some(b) = self.current() {
            if matches!(b, b' ' | b'\t' | b'\r' | b'\n') {
                self.advance();
            } else {
                break;
            }
        }
    }

    fn current(&self) -> Option<u8> {
        self.input.get(self.pos).copied()
    }

    fn peek(&self, ahead: usize) -> Option<u8> {
        self.input.get(self.pos.saturating_add(ahead)).copied()
    }

    fn advance(&mut self) {
        if let Some(b) = self.current() {
            self.pos += 1;
            if b == b'\n' {
                self.line += 1;
                self.col = 1;
            } else {
                self.col += 1;
            }
        }
    }

    fn advance_by(&mut self, count: usize) {
        for _ in 0..count {
            self.advance();
        }
    }

    fn slice_from(&self, start: usize) -> &'a [u8] {
        self.input.get(start..self.pos).unwrap_or_default()
    }

    const fn is_eof(&self) -> bool {
        self.pos >= self.input.len()
    }

    const fn position(&self) -> Pos {
        Pos::new(self.pos, self.line, self.col)
    }

    fn error_here(&self, kind: XmlErrorKind, message: impl Into<String>) -> XmlError {
        XmlError::with_message(kind, self.position(), message)
    }
}

fn bytes_to_string(bytes: &[u8], pos: Pos) -> Result<String> {
    std::str::from_utf8(bytes)
        .map(|s| s.to_string())
        .map_err(|_| XmlError::new(XmlErrorKind::InvalidUtf8, pos))
}

fn is_name_start(b: u8) -> bool {
    matches!(b, b'A'..=b'Z' | b'a'..=b'z' | b'_' | b':')
}

fn is_name_char(b: u8) -> bool {
    is_name_start(b) || matches!(b, b'0'..=b'9' | b'-' | b'.')
}

fn decode_entities(input: &str, pos: Pos) -> Result<String> {
    if !input.contains('&') {
        return Ok(input.to_string());
    }

    let mut result = String::with_capacity(input.len());
    let mut chars = input.chars();
    while let Some(ch) = chars.next() {
        if ch != '&' {
            result.push(ch);
            continue;
        }

        let mut entity = String::new();
        let mut terminated = false;
        for next in chars.by_ref() {
            if next == ';' {
                terminated = true;
                break;
            }
            entity.push(next);
        }

        let decoded = if terminated {
            match entity.as_str() {
                "amp" => Some('&'),
                "lt" => Some('<'),
                "gt" => Some('>'),
                "quot" => Some('"'),
                "apos" => Some('\''),
                _ => decode_numeric_entity(&entity),
            }
        } else {
            None
        };

        match decoded {
            Some(ch) => result.push(ch),
            None => {
                return Err(XmlError::with_message(
                    XmlErrorKind::InvalidEntity,
                    pos,
                    format!("invalid xml entity '&{entity};'"),
                ))
            }
        }
    }

    Ok(result)
}

fn decode_numeric_entity(entity: &str) -> Option<char> {
    if let Some(hex) = entity.strip_prefix("#x") {
        u32::from_str_radix(hex, 16).ok().and_then(char::from_u32)
    } else if let Some(dec) = entity.strip_prefix('#') {
        dec.parse::<u32>().ok().and_then(char::from_u32)
    } else {
        None
    }
}
