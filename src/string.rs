//! Micro-parsers for the four string forms.
//!
//! Each function returns `Ok(None)` without consuming anything when the
//! opening delimiter does not match. Once the delimiter matched, any
//! failure is fatal.

use crate::Version;
use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind};

#[cfg(test)]
#[path = "./string_tests.rs"]
mod tests;

#[inline]
fn is_forbidden_control(c: char) -> bool {
    (c < '\u{20}' && c != '\t') || c == '\u{7f}'
}

/// `"..."`
pub(crate) fn try_basic(cur: &mut Cursor<'_>, version: Version) -> Result<Option<String>, Error> {
    if !cur.starts_with("\"") || cur.starts_with("\"\"\"") {
        return Ok(None);
    }
    let start = cur.pos();
    cur.advance(1);
    let mut out = String::new();
    loop {
        let at = cur.pos();
        let Some(ch) = cur.bump() else {
            return Err(cur.error(start, None, ErrorKind::UnterminatedString));
        };
        match ch {
            '"' => return Ok(Some(out)),
            '\\' => read_escape(cur, &mut out, start, version, false)?,
            c if is_forbidden_control(c) => {
                return Err(cur.error(at, None, ErrorKind::InvalidCharInString(c)));
            }
            c => out.push(c),
        }
    }
}

/// `'...'`
pub(crate) fn try_literal(cur: &mut Cursor<'_>) -> Result<Option<String>, Error> {
    if !cur.starts_with("'") || cur.starts_with("'''") {
        return Ok(None);
    }
    let start = cur.pos();
    cur.advance(1);
    let content = cur.pos();
    loop {
        let at = cur.pos();
        let Some(ch) = cur.bump() else {
            return Err(cur.error(start, None, ErrorKind::UnterminatedString));
        };
        match ch {
            '\'' => return Ok(Some(cur.slice(content, at).to_owned())),
            c if is_forbidden_control(c) => {
                return Err(cur.error(at, None, ErrorKind::InvalidCharInString(c)));
            }
            _ => {}
        }
    }
}

/// `"""..."""`
pub(crate) fn try_multiline_basic(
    cur: &mut Cursor<'_>,
    version: Version,
) -> Result<Option<String>, Error> {
    multiline(cur, b'"', Some(version))
}

/// `'''...'''`
pub(crate) fn try_multiline_literal(cur: &mut Cursor<'_>) -> Result<Option<String>, Error> {
    multiline(cur, b'\'', None)
}

/// Shared loop of the two multi-line forms. `escapes` is `None` for the
/// literal form.
fn multiline(
    cur: &mut Cursor<'_>,
    delim: u8,
    escapes: Option<Version>,
) -> Result<Option<String>, Error> {
    let opener = if delim == b'"' { "\"\"\"" } else { "'''" };
    if !cur.starts_with(opener) {
        return Ok(None);
    }
    let start = cur.pos();
    cur.advance(3);
    // a newline right after the opener is trimmed
    cur.eat_newline();

    let mut out = String::new();
    loop {
        let at = cur.pos();
        match cur.peek() {
            None => return Err(cur.error(start, None, ErrorKind::UnterminatedString)),
            Some(b) if b == delim => {
                let mut run = 0;
                while cur.peek_at(run) == Some(delim) {
                    run += 1;
                }
                if run < 3 {
                    for _ in 0..run {
                        out.push(delim as char);
                    }
                    cur.advance(run);
                    continue;
                }
                // up to two extra marks belong to the content
                let extra = (run - 3).min(2);
                for _ in 0..extra {
                    out.push(delim as char);
                }
                cur.advance(3 + extra);
                return Ok(Some(out));
            }
            Some(b'\\') if escapes.is_some() => {
                cur.advance(1);
                let version = escapes.unwrap_or_default();
                read_escape(cur, &mut out, start, version, true)?;
            }
            Some(b'\n') => {
                out.push('\n');
                cur.advance(1);
            }
            Some(b'\r') => {
                if cur.newline_len() != Some(2) {
                    return Err(cur.error(at, None, ErrorKind::InvalidCharInString('\r')));
                }
                out.push_str("\r\n");
                cur.advance(2);
            }
            Some(_) => {
                let Some(ch) = cur.bump() else {
                    return Err(cur.error(start, None, ErrorKind::UnterminatedString));
                };
                if is_forbidden_control(ch) {
                    return Err(cur.error(at, None, ErrorKind::InvalidCharInString(ch)));
                }
                out.push(ch);
            }
        }
    }
}

/// Decodes one escape sequence. The cursor sits just past the backslash.
fn read_escape(
    cur: &mut Cursor<'_>,
    out: &mut String,
    string_start: usize,
    version: Version,
    multiline: bool,
) -> Result<(), Error> {
    let escape_start = cur.pos() - 1;
    let Some(ch) = cur.bump() else {
        return Err(cur.error(string_start, None, ErrorKind::UnterminatedString));
    };
    match ch {
        '"' => out.push('"'),
        '\\' => out.push('\\'),
        'b' => out.push('\u{8}'),
        'f' => out.push('\u{c}'),
        'n' => out.push('\n'),
        'r' => out.push('\r'),
        't' => out.push('\t'),
        'e' if version.is_v1_1() => out.push('\u{1b}'),
        'x' if version.is_v1_1() => out.push(read_hex(cur, 2, string_start, escape_start)?),
        'u' => out.push(read_hex(cur, 4, string_start, escape_start)?),
        'U' => out.push(read_hex(cur, 8, string_start, escape_start)?),
        ' ' | '\t' | '\n' | '\r' if multiline => {
            // line-ending backslash: only whitespace may sit between the
            // backslash and the newline
            match ch {
                '\n' => {}
                '\r' => {
                    if !cur.eat(b'\n') {
                        return Err(cur.error(escape_start, None, ErrorKind::InvalidEscape(ch)));
                    }
                }
                _ => {
                    cur.eat_spaces();
                    if !cur.eat_newline() {
                        return Err(cur.error(escape_start, None, ErrorKind::InvalidEscape(ch)));
                    }
                }
            }
            loop {
                cur.eat_spaces();
                if !cur.eat_newline() {
                    break;
                }
            }
        }
        c => {
            return Err(cur.error(
                escape_start,
                Some(cur.pos()),
                ErrorKind::InvalidEscape(c),
            ));
        }
    }
    Ok(())
}

fn read_hex(
    cur: &mut Cursor<'_>,
    digits: usize,
    string_start: usize,
    escape_start: usize,
) -> Result<char, Error> {
    let mut value: u32 = 0;
    for _ in 0..digits {
        let at = cur.pos();
        match cur.peek_char() {
            None => return Err(cur.error(string_start, None, ErrorKind::UnterminatedString)),
            Some(c) => match c.to_digit(16) {
                Some(d) => {
                    value = value * 16 + d;
                    cur.advance(1);
                }
                None => {
                    return Err(cur.error(
                        at,
                        Some(at + c.len_utf8()),
                        ErrorKind::InvalidHexEscape(c),
                    ));
                }
            },
        }
    }
    match char::from_u32(value) {
        Some(ch) => Ok(ch),
        None => Err(cur.error(
            escape_start,
            Some(cur.pos()),
            ErrorKind::InvalidEscapeValue(value),
        )),
    }
}
