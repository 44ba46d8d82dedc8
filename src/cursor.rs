//! Source text with a read position and a stack of backtrack pins.
//!
//! Every speculative parse in the crate follows the same shape: take a
//! [`Pin`], try to consume, then either [`Cursor::release`] the pin on
//! success or [`Cursor::rewind`] to it on a shape mismatch. Pins nest and
//! must be resolved in reverse order of creation.

use crate::Span;
use crate::error::{Error, ErrorKind};

#[cfg(test)]
#[path = "./cursor_tests.rs"]
mod tests;

/// A saved cursor position. Consumed by [`Cursor::rewind`] or
/// [`Cursor::release`].
#[must_use = "a pin must be rewound to or released"]
#[derive(Debug)]
pub(crate) struct Pin {
    depth: usize,
}

pub(crate) struct Cursor<'a> {
    text: &'a str,
    bytes: &'a [u8],
    pos: usize,
    pins: Vec<usize>,
}

impl<'a> Cursor<'a> {
    pub(crate) fn new(text: &'a str) -> Self {
        Cursor {
            text,
            bytes: text.as_bytes(),
            pos: 0,
            pins: Vec::new(),
        }
    }

    #[inline]
    pub(crate) fn pos(&self) -> usize {
        self.pos
    }

    #[inline]
    pub(crate) fn is_eof(&self) -> bool {
        self.pos >= self.bytes.len()
    }

    #[inline]
    pub(crate) fn peek(&self) -> Option<u8> {
        self.bytes.get(self.pos).copied()
    }

    #[inline]
    pub(crate) fn peek_at(&self, offset: usize) -> Option<u8> {
        self.bytes.get(self.pos + offset).copied()
    }

    pub(crate) fn peek_char(&self) -> Option<char> {
        self.text.get(self.pos..)?.chars().next()
    }

    /// Consumes one character.
    pub(crate) fn bump(&mut self) -> Option<char> {
        let ch = self.peek_char()?;
        self.pos += ch.len_utf8();
        Some(ch)
    }

    /// Skips `n` bytes. Callers only step over ASCII they already peeked.
    #[inline]
    pub(crate) fn advance(&mut self, n: usize) {
        self.pos = (self.pos + n).min(self.bytes.len());
    }

    #[inline]
    pub(crate) fn eat(&mut self, b: u8) -> bool {
        if self.peek() == Some(b) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    pub(crate) fn starts_with(&self, s: &str) -> bool {
        self.bytes[self.pos..].starts_with(s.as_bytes())
    }

    pub(crate) fn eat_str(&mut self, s: &str) -> bool {
        if self.starts_with(s) {
            self.pos += s.len();
            true
        } else {
            false
        }
    }

    pub(crate) fn eat_spaces(&mut self) {
        while let Some(b' ' | b'\t') = self.peek() {
            self.pos += 1;
        }
    }

    /// Length of the newline at the cursor (`\n` or `\r\n`), if any.
    pub(crate) fn newline_len(&self) -> Option<usize> {
        match self.peek() {
            Some(b'\n') => Some(1),
            Some(b'\r') if self.peek_at(1) == Some(b'\n') => Some(2),
            _ => None,
        }
    }

    pub(crate) fn eat_newline(&mut self) -> bool {
        match self.newline_len() {
            Some(n) => {
                self.pos += n;
                true
            }
            None => false,
        }
    }

    /// Returns `true` if the cursor sits where a value may end.
    pub(crate) fn at_value_end(&self) -> bool {
        matches!(
            self.peek(),
            None | Some(b' ' | b'\t' | b'\n' | b'\r' | b',' | b']' | b'}' | b'#')
        )
    }

    #[inline]
    pub(crate) fn slice(&self, start: usize, end: usize) -> &'a str {
        self.text.get(start..end).unwrap_or("")
    }

    #[inline]
    pub(crate) fn span_from(&self, start: usize) -> Span {
        Span::at(start, self.pos)
    }

    // -- pins ---------------------------------------------------------------

    pub(crate) fn pin(&mut self) -> Pin {
        let depth = self.pins.len();
        self.pins.push(self.pos);
        Pin { depth }
    }

    /// Restores the position saved by `pin` and drops it.
    pub(crate) fn rewind(&mut self, pin: Pin) {
        debug_assert_eq!(pin.depth + 1, self.pins.len(), "pins resolved out of order");
        if let Some(pos) = self.pins.pop() {
            self.pos = pos;
        }
    }

    /// Drops `pin` without moving.
    pub(crate) fn release(&mut self, pin: Pin) {
        debug_assert_eq!(pin.depth + 1, self.pins.len(), "pins resolved out of order");
        self.pins.pop();
    }

    /// Runs `f` under a pin. A shape mismatch (`Ok(None)`) rewinds, a match
    /// or a fatal error keeps the progress made.
    pub(crate) fn attempt<T>(
        &mut self,
        f: impl FnOnce(&mut Self) -> Result<Option<T>, Error>,
    ) -> Result<Option<T>, Error> {
        let pin = self.pin();
        let result = f(self);
        match result {
            Ok(None) => self.rewind(pin),
            _ => self.release(pin),
        }
        result
    }

    #[cfg(test)]
    pub(crate) fn pin_depth(&self) -> usize {
        self.pins.len()
    }

    // -- errors -------------------------------------------------------------

    #[cold]
    pub(crate) fn error(&self, start: usize, end: Option<usize>, kind: ErrorKind) -> Error {
        let end = end.unwrap_or(start + 1).min(self.bytes.len().max(start));
        Error {
            kind,
            span: Span::at(start, end),
            line_info: Some(line_col(self.bytes, start)),
        }
    }

    /// Describes the lexeme at the cursor for "expected X, found Y"
    /// messages, together with the offset where it ends.
    pub(crate) fn describe_here(&self) -> (&'static str, usize) {
        let at = self.pos;
        match self.peek() {
            None => ("eof", self.bytes.len()),
            Some(b'\n' | b'\r') => ("a newline", at + 1),
            Some(b' ' | b'\t') => {
                let mut end = at + 1;
                while let Some(b' ' | b'\t') = self.bytes.get(end) {
                    end += 1;
                }
                ("whitespace", end)
            }
            Some(b'#') => ("a comment", at + 1),
            Some(b'=') => ("an equals", at + 1),
            Some(b'.') => ("a period", at + 1),
            Some(b',') => ("a comma", at + 1),
            Some(b':') => ("a colon", at + 1),
            Some(b'+') => ("a plus", at + 1),
            Some(b'{') => ("a left brace", at + 1),
            Some(b'}') => ("a right brace", at + 1),
            Some(b'[') => ("a left bracket", at + 1),
            Some(b']') => ("a right bracket", at + 1),
            Some(b'\'' | b'"') => ("a string", at + 1),
            Some(b) if is_keylike_byte(b) => {
                let mut end = at + 1;
                while end < self.bytes.len() && is_keylike_byte(self.bytes[end]) {
                    end += 1;
                }
                ("an identifier", end)
            }
            Some(_) => {
                let len = self.peek_char().map_or(1, char::len_utf8);
                ("a character", at + len)
            }
        }
    }
}

#[inline]
pub(crate) fn is_keylike_byte(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'-' || b == b'_'
}

/// Zero-based line and byte column of `offset`.
pub(crate) fn line_col(bytes: &[u8], offset: usize) -> (usize, usize) {
    let offset = offset.min(bytes.len());
    let before = &bytes[..offset];
    let line = before.iter().filter(|b| **b == b'\n').count();
    let line_start = before
        .iter()
        .rposition(|b| *b == b'\n')
        .map_or(0, |i| i + 1);
    (line, offset - line_start)
}
