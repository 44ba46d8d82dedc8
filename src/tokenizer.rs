//! Context sensitive tokenizer.
//!
//! The tokenizer keeps the previous significant token and a stack of
//! bracket contexts. At every step it asks the previous token for its
//! legal successors in the current context and commits to the first one
//! whose micro-parser matches. Newlines are handled here rather than by
//! the successor sets, since their meaning depends only on the context.

use crate::config::{Config, Version};
use crate::cursor::{Cursor, is_keylike_byte};
use crate::error::{Error, ErrorKind};
use crate::span::Span;
use crate::token::{Context, Payload, Symbol, Token};
use crate::warning::{WarningKind, WarningSink, Warnings};
use crate::{number, string, time};

#[cfg(test)]
#[path = "./tokenizer_tests.rs"]
mod tests;

/// Splits `text` into tokens, delivering warnings to `sink`.
///
/// ```
/// use toml_lattice::{Config, Symbol, tokenize};
///
/// let mut sink = |_| {};
/// let tokens = tokenize("a = 1 # one", &Config::default(), &mut sink).unwrap();
/// let symbols: Vec<Symbol> = tokens.iter().map(|t| t.symbol).collect();
/// assert_eq!(
///     symbols,
///     [
///         Symbol::DocumentStart,
///         Symbol::BareKey,
///         Symbol::Equals,
///         Symbol::Integer,
///         Symbol::Comment,
///         Symbol::EndOfDocument,
///     ]
/// );
/// ```
pub fn tokenize(
    text: &str,
    config: &Config,
    sink: &mut dyn WarningSink,
) -> Result<Vec<Token>, Error> {
    check_size(text)?;
    let mut warnings = Warnings::new(text, config.warnings, sink);
    tokenize_with(text, config, &mut warnings)
}

pub(crate) fn check_size(text: &str) -> Result<(), Error> {
    if text.len() > u32::MAX as usize {
        return Err(Error::from((ErrorKind::FileTooLarge, Span::new(0, 0))));
    }
    Ok(())
}

pub(crate) fn tokenize_with<'a>(
    text: &'a str,
    config: &Config,
    warnings: &mut Warnings<'a>,
) -> Result<Vec<Token>, Error> {
    Tokenizer {
        cur: Cursor::new(text),
        version: config.version,
        max_depth: config.max_depth,
        warnings,
        contexts: vec![Context::Root],
        tokens: Vec::new(),
        prev: Symbol::DocumentStart,
    }
    .run()
}

struct Tokenizer<'a, 'w> {
    cur: Cursor<'a>,
    version: Version,
    max_depth: usize,
    warnings: &'w mut Warnings<'a>,
    contexts: Vec<Context>,
    tokens: Vec<Token>,
    /// Last token that was not a transparent comment.
    prev: Symbol,
}

impl<'a> Tokenizer<'a, '_> {
    fn run(mut self) -> Result<Vec<Token>, Error> {
        self.push(Symbol::DocumentStart, Span::new(0, 0), Payload::None);
        while self.prev != Symbol::EndOfDocument {
            self.cur.eat_spaces();
            if self.cur.newline_len().is_some() {
                self.newline()?;
                continue;
            }
            let candidates = self.prev.successors(self.context(), self.version);
            if !self.try_any(candidates)? {
                return Err(self.expected(candidates));
            }
        }
        Ok(self.tokens)
    }

    fn context(&self) -> Context {
        self.contexts.last().copied().unwrap_or(Context::Root)
    }

    fn push(&mut self, symbol: Symbol, span: Span, payload: Payload) {
        let transparent = symbol == Symbol::Comment && self.context() != Context::Root;
        if !transparent {
            self.prev = symbol;
        }
        self.tokens.push(Token {
            symbol,
            span,
            payload,
        });
    }

    fn push_from(&mut self, symbol: Symbol, start: usize, payload: Payload) {
        let span = self.cur.span_from(start);
        self.push(symbol, span, payload);
    }

    fn try_any(&mut self, candidates: &[Symbol]) -> Result<bool, Error> {
        for &symbol in candidates {
            if self.try_symbol(symbol)? {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn newline(&mut self) -> Result<(), Error> {
        let start = self.cur.pos();
        let len = self.cur.newline_len().unwrap_or(1);
        if self.prev.forbids_newline() {
            return Err(self.cur.error(
                start,
                Some(start + len),
                ErrorKind::UnexpectedNewline {
                    after: self.prev.name(),
                },
            ));
        }
        match self.context() {
            Context::Root => {
                self.cur.advance(len);
                self.push_from(Symbol::Newline, start, Payload::None);
            }
            Context::Array => self.cur.advance(len),
            Context::InlineTable => {
                if !self.version.is_v1_1() {
                    return Err(self.cur.error(
                        start,
                        Some(start + len),
                        ErrorKind::MultilineInlineTable,
                    ));
                }
                self.warnings.emit(
                    WarningKind::MultilineInlineTable,
                    Span::at(start, start + len),
                    None,
                );
                self.cur.advance(len);
            }
        }
        Ok(())
    }

    #[cold]
    fn expected(&self, candidates: &[Symbol]) -> Error {
        let mut names: Vec<&'static str> = candidates.iter().map(|s| s.name()).collect();
        let newline_ok = !self.prev.forbids_newline()
            && (self.context() != Context::InlineTable || self.version.is_v1_1());
        if newline_ok {
            names.push(Symbol::Newline.name());
        }
        let (found, end) = self.cur.describe_here();
        self.cur.error(
            self.cur.pos(),
            Some(end),
            ErrorKind::Expected {
                expected: names.into_boxed_slice(),
                found,
            },
        )
    }

    /// Attempts one token. Returns `Ok(false)` with the cursor untouched
    /// when the text does not have its shape.
    fn try_symbol(&mut self, symbol: Symbol) -> Result<bool, Error> {
        let start = self.cur.pos();
        let version = self.version;
        let payload = match symbol {
            Symbol::Comment => return self.comment(),
            Symbol::StartTable => {
                if !self.cur.starts_with("[") || self.cur.starts_with("[[") {
                    return Ok(false);
                }
                return self.header(false);
            }
            Symbol::StartArrayTable => {
                if !self.cur.starts_with("[[") {
                    return Ok(false);
                }
                return self.header(true);
            }
            Symbol::BareKey => {
                let mut end = start;
                while self.cur.peek_at(end - start).is_some_and(is_keylike_byte) {
                    end += 1;
                }
                if end == start {
                    return Ok(false);
                }
                self.cur.advance(end - start);
                Payload::Text(self.cur.slice(start, end).to_owned())
            }
            Symbol::QuotedKey => {
                if self.cur.starts_with("\"\"\"") {
                    return Err(self.cur.error(start, Some(start + 3), ErrorKind::MultilineStringKey));
                }
                match string::try_basic(&mut self.cur, version)? {
                    Some(s) => Payload::Text(s),
                    None => return Ok(false),
                }
            }
            Symbol::LiteralKey => {
                if self.cur.starts_with("'''") {
                    return Err(self.cur.error(start, Some(start + 3), ErrorKind::MultilineStringKey));
                }
                match string::try_literal(&mut self.cur)? {
                    Some(s) => Payload::Text(s),
                    None => return Ok(false),
                }
            }
            Symbol::MultilineBasicString => match string::try_multiline_basic(&mut self.cur, version)? {
                Some(s) => Payload::Text(s),
                None => return Ok(false),
            },
            Symbol::MultilineLiteralString => match string::try_multiline_literal(&mut self.cur)? {
                Some(s) => Payload::Text(s),
                None => return Ok(false),
            },
            Symbol::BasicString => match string::try_basic(&mut self.cur, version)? {
                Some(s) => Payload::Text(s),
                None => return Ok(false),
            },
            Symbol::LiteralString => match string::try_literal(&mut self.cur)? {
                Some(s) => Payload::Text(s),
                None => return Ok(false),
            },
            Symbol::KeySeparator => return Ok(self.punct(b'.', symbol)),
            Symbol::Equals => return Ok(self.punct(b'=', symbol)),
            Symbol::Separator => return Ok(self.punct(b',', symbol)),
            Symbol::StartArray => return self.open(b'[', symbol, Context::Array),
            Symbol::StartInlineTable => return self.open(b'{', symbol, Context::InlineTable),
            Symbol::EndArray => return Ok(self.close(b']', symbol)),
            Symbol::EndInlineTable => return Ok(self.close(b'}', symbol)),
            Symbol::Boolean => match number::try_boolean(&mut self.cur) {
                Some(b) => Payload::Boolean(b),
                None => return Ok(false),
            },
            Symbol::OffsetDateTime => match time::try_offset_datetime(&mut self.cur, version)? {
                Some(dt) => Payload::Datetime(dt),
                None => return Ok(false),
            },
            Symbol::LocalDateTime => match time::try_local_datetime(&mut self.cur, version)? {
                Some(dt) => Payload::Datetime(dt),
                None => return Ok(false),
            },
            Symbol::LocalDate => match time::try_local_date(&mut self.cur)? {
                Some(dt) => Payload::Datetime(dt),
                None => return Ok(false),
            },
            Symbol::LocalTime => match time::try_local_time(&mut self.cur, version)? {
                Some(dt) => Payload::Datetime(dt),
                None => return Ok(false),
            },
            Symbol::Float => match number::try_float(&mut self.cur)? {
                Some(lit) => {
                    if lit.negative_nan {
                        let span = self.cur.span_from(start);
                        self.warnings.emit(WarningKind::NegativeNan, span, None);
                    }
                    Payload::Float(lit.value)
                }
                None => return Ok(false),
            },
            Symbol::Integer => match number::try_integer(&mut self.cur)? {
                Some(i) => Payload::Integer(i),
                None => return Ok(false),
            },
            Symbol::EndOfDocument => {
                if !self.cur.is_eof() {
                    return Ok(false);
                }
                Payload::None
            }
            Symbol::DocumentStart | Symbol::Newline | Symbol::EndTable | Symbol::EndArrayTable => {
                return Ok(false);
            }
        };
        self.push_from(symbol, start, payload);
        Ok(true)
    }

    fn punct(&mut self, byte: u8, symbol: Symbol) -> bool {
        let start = self.cur.pos();
        if !self.cur.eat(byte) {
            return false;
        }
        self.push_from(symbol, start, Payload::None);
        true
    }

    fn open(&mut self, byte: u8, symbol: Symbol, context: Context) -> Result<bool, Error> {
        let start = self.cur.pos();
        if !self.punct(byte, symbol) {
            return Ok(false);
        }
        // the root context does not count towards the depth
        if self.contexts.len() > self.max_depth {
            return Err(self.cur.error(
                start,
                Some(start + 1),
                ErrorKind::NestingTooDeep(self.max_depth),
            ));
        }
        self.contexts.push(context);
        Ok(true)
    }

    fn close(&mut self, byte: u8, symbol: Symbol) -> bool {
        if self.contexts.len() <= 1 || !self.punct(byte, symbol) {
            return false;
        }
        self.contexts.pop();
        true
    }

    fn comment(&mut self) -> Result<bool, Error> {
        let start = self.cur.pos();
        if !self.cur.eat(b'#') {
            return Ok(false);
        }
        loop {
            let at = self.cur.pos();
            match self.cur.peek() {
                None | Some(b'\n') => break,
                Some(b'\r') => {
                    if self.cur.newline_len() == Some(2) {
                        break;
                    }
                    return Err(self.cur.error(at, None, ErrorKind::InvalidCharInComment('\r')));
                }
                Some(_) => {
                    let Some(ch) = self.cur.bump() else { break };
                    if (ch < '\u{20}' && ch != '\t') || ch == '\u{7f}' {
                        return Err(self.cur.error(at, None, ErrorKind::InvalidCharInComment(ch)));
                    }
                }
            }
        }
        let text = self.cur.slice(start + 1, self.cur.pos()).to_owned();
        self.push_from(Symbol::Comment, start, Payload::Text(text));
        Ok(true)
    }

    /// Reads a whole `[a.b]` or `[[a.b]]` header.
    fn header(&mut self, array: bool) -> Result<bool, Error> {
        let start = self.cur.pos();
        let (open, close, end) = if array {
            (Symbol::StartArrayTable, "]]", Symbol::EndArrayTable)
        } else {
            (Symbol::StartTable, "]", Symbol::EndTable)
        };
        self.cur.advance(if array { 2 } else { 1 });
        self.push_from(open, start, Payload::None);

        loop {
            self.skip_header_spaces()?;
            let keys = self.prev.successors(Context::Root, self.version);
            if !self.try_any(keys)? {
                return Err(self.header_expected(keys));
            }
            self.skip_header_spaces()?;
            let at = self.cur.pos();
            if self.cur.eat(b'.') {
                self.push_from(Symbol::KeySeparator, at, Payload::None);
                continue;
            }
            if self.cur.eat_str(close) {
                self.push_from(end, at, Payload::None);
                return Ok(true);
            }
            return Err(self.header_expected(Symbol::header_successors(array)));
        }
    }

    fn skip_header_spaces(&mut self) -> Result<(), Error> {
        self.cur.eat_spaces();
        if let Some(len) = self.cur.newline_len() {
            let at = self.cur.pos();
            return Err(self.cur.error(
                at,
                Some(at + len),
                ErrorKind::UnexpectedNewline {
                    after: self.prev.name(),
                },
            ));
        }
        Ok(())
    }

    #[cold]
    fn header_expected(&self, candidates: &[Symbol]) -> Error {
        let (found, end) = self.cur.describe_here();
        let expected: Vec<&'static str> = candidates.iter().map(|s| s.name()).collect();
        self.cur.error(
            self.cur.pos(),
            Some(end),
            ErrorKind::Expected {
                expected: expected.into_boxed_slice(),
                found,
            },
        )
    }
}
