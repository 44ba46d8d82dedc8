#![allow(clippy::question_mark)]
use crate::Span;
use crate::cursor::line_col;
use std::fmt::{self, Debug, Display};

#[cfg(test)]
#[path = "./error_tests.rs"]
mod tests;

/// Error produced while decoding a document or building a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Error {
    /// The error kind
    pub kind: ErrorKind,
    /// The span where the error occurs.
    ///
    /// Note some [`ErrorKind`] contain additional span information
    pub span: Span,
    /// Zero-based line and column of `span.start`, available for every error
    /// raised while decoding.
    pub line_info: Option<(usize, usize)>,
}

impl std::error::Error for Error {}

impl From<(ErrorKind, Span)> for Error {
    fn from((kind, span): (ErrorKind, Span)) -> Self {
        Self {
            kind,
            span,
            line_info: None,
        }
    }
}

/// The two fatal failure classes of a decode.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum ErrorClass {
    /// Lexical or structural failure.
    Syntax,
    /// Illegal reuse of a key or table.
    Redefinition,
}

/// Errors that can occur while decoding.
#[derive(Clone, PartialEq, Eq)]
pub enum ErrorKind {
    /// The input is larger than the maximum supported size of 4GiB.
    FileTooLarge,

    /// An invalid character not allowed in a string was found.
    InvalidCharInString(char),

    /// A control character appeared inside a comment.
    InvalidCharInComment(char),

    /// An invalid character was found as an escape.
    InvalidEscape(char),

    /// An invalid character was found in a hex escape.
    InvalidHexEscape(char),

    /// An invalid escape value was specified in a hex escape in a string.
    ///
    /// Valid values are in the plane of unicode codepoints, excluding
    /// surrogates.
    InvalidEscapeValue(u32),

    /// An unterminated string was found where EOF was found before the ending
    /// EOF mark.
    UnterminatedString,

    /// Multiline strings are not allowed for key.
    MultilineStringKey,

    /// A number literal broke the number grammar.
    InvalidNumber(&'static str),

    /// The number does not fit the named type.
    OutOfRange(&'static str),

    /// A date or time literal matched in shape but holds an impossible field.
    InvalidDatetime(&'static str),

    /// Wanted one sort of token, but found another.
    Wanted {
        /// Expected token type.
        expected: &'static str,
        /// Actually found token type.
        found: &'static str,
    },

    /// None of the tokens legal at this position matched.
    Expected {
        /// Descriptions of every legal token, in priority order.
        expected: Box<[&'static str]>,
        /// Description of what was found instead.
        found: &'static str,
    },

    /// A newline directly followed a token that must be continued on the
    /// same line.
    UnexpectedNewline {
        /// Description of the preceding token.
        after: &'static str,
    },

    /// A newline inside an inline table under TOML 1.0.
    MultilineInlineTable,

    /// Values nest deeper than the configured limit, counting brackets as
    /// well as key segments.
    NestingTooDeep(usize),

    /// A duplicate table definition was found.
    DuplicateTable {
        /// The name of the duplicate table
        name: String,
        /// The span where the table was first defined
        first: Span,
    },

    /// Duplicate key in table.
    DuplicateKey {
        /// The duplicate key
        key: String,
        /// The span where the first key is located
        first: Span,
    },

    /// An array-of-tables header names something that is not an array.
    RedefineAsArray {
        /// Dotted name of the header.
        name: String,
        /// Where the existing value was defined.
        first: Span,
    },

    /// A header tried to extend an array written as a value.
    ExtendStaticArray {
        /// Dotted name of the array.
        name: String,
        /// Where the array was defined.
        first: Span,
    },

    /// An inline table was extended after its closing brace.
    ExtendInlineTable {
        /// Dotted name of the inline table.
        name: String,
        /// Where the inline table was defined.
        first: Span,
    },

    /// Dotted key attempted to extend something that is not a table.
    DottedKeyInvalidType {
        /// The span where the non-table value was defined
        first: Span,
    },

    /// A dotted key reached an explicitly declared table through an
    /// implicitly created ancestor.
    DottedKeyIntoExplicitTable {
        /// Dotted name of the explicit table.
        name: String,
        /// Where the explicit table was declared.
        first: Span,
    },

    /// A dotted key passed through an array of tables.
    DottedKeyIntoArrayOfTables {
        /// Dotted name of the array of tables.
        name: String,
        /// Where the array of tables was first declared.
        first: Span,
    },

    /// A custom error, used by the tree building API.
    Custom(std::borrow::Cow<'static, str>),
}

impl ErrorKind {
    /// Which fatal class this kind belongs to.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::DuplicateTable { .. }
            | Self::DuplicateKey { .. }
            | Self::RedefineAsArray { .. }
            | Self::ExtendStaticArray { .. }
            | Self::ExtendInlineTable { .. }
            | Self::DottedKeyInvalidType { .. }
            | Self::DottedKeyIntoExplicitTable { .. }
            | Self::DottedKeyIntoArrayOfTables { .. } => ErrorClass::Redefinition,
            _ => ErrorClass::Syntax,
        }
    }

    /// Span of the earlier definition a redefinition collided with.
    pub fn first_definition(&self) -> Option<Span> {
        match self {
            Self::DuplicateTable { first, .. }
            | Self::DuplicateKey { first, .. }
            | Self::RedefineAsArray { first, .. }
            | Self::ExtendStaticArray { first, .. }
            | Self::ExtendInlineTable { first, .. }
            | Self::DottedKeyInvalidType { first }
            | Self::DottedKeyIntoExplicitTable { first, .. }
            | Self::DottedKeyIntoArrayOfTables { first, .. } => Some(*first),
            _ => None,
        }
    }
}

impl Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            Self::FileTooLarge => "file-too-large",
            Self::InvalidCharInString(..) => "invalid-char-in-string",
            Self::InvalidCharInComment(..) => "invalid-char-in-comment",
            Self::InvalidEscape(..) => "invalid-escape",
            Self::InvalidHexEscape(..) => "invalid-hex-escape",
            Self::InvalidEscapeValue(..) => "invalid-escape-value",
            Self::UnterminatedString => "unterminated-string",
            Self::MultilineStringKey => "multiline-string-key",
            Self::InvalidNumber(..) => "invalid-number",
            Self::OutOfRange(..) => "out-of-range",
            Self::InvalidDatetime(..) => "invalid-datetime",
            Self::Wanted { .. } => "wanted",
            Self::Expected { .. } => "expected",
            Self::UnexpectedNewline { .. } => "unexpected-newline",
            Self::MultilineInlineTable => "multiline-inline-table",
            Self::NestingTooDeep(..) => "nesting-too-deep",
            Self::DuplicateTable { .. } => "duplicate-table",
            Self::DuplicateKey { .. } => "duplicate-key",
            Self::RedefineAsArray { .. } => "redefine-as-array",
            Self::ExtendStaticArray { .. } => "extend-static-array",
            Self::ExtendInlineTable { .. } => "extend-inline-table",
            Self::DottedKeyInvalidType { .. } => "dotted-key-invalid-type",
            Self::DottedKeyIntoExplicitTable { .. } => "dotted-key-into-explicit-table",
            Self::DottedKeyIntoArrayOfTables { .. } => "dotted-key-into-array-of-tables",
            Self::Custom(..) => "custom",
        };
        f.write_str(text)
    }
}

impl Debug for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        Display::fmt(self, f)
    }
}

struct Escape(char);

impl fmt::Display for Escape {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        use std::fmt::Write as _;

        if self.0.is_whitespace() || self.0.is_control() {
            for esc in self.0.escape_default() {
                f.write_char(esc)?;
            }
            Ok(())
        } else {
            f.write_char(self.0)
        }
    }
}

macro_rules! rtry {
    ($($tt:tt)*) => {
        if let Err(err) = $($tt)* {
            return Err(err);
        }
    };
}

fn quoted(f: &mut fmt::Formatter<'_>, head: &str, name: &str, tail: &str) -> fmt::Result {
    rtry!(f.write_str(head));
    rtry!(f.write_str(" `"));
    rtry!(f.write_str(name));
    rtry!(f.write_str("`"));
    f.write_str(tail)
}

impl Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.kind {
            ErrorKind::FileTooLarge => f.write_str("file is too large (maximum 4GiB)"),
            ErrorKind::InvalidCharInString(c) => {
                rtry!(f.write_str("invalid character in string: `"));
                rtry!(Escape(*c).fmt(f));
                f.write_str("`")
            }
            ErrorKind::InvalidCharInComment(c) => {
                rtry!(f.write_str("invalid character in comment: `"));
                rtry!(Escape(*c).fmt(f));
                f.write_str("`")
            }
            ErrorKind::InvalidEscape(c) => {
                rtry!(f.write_str("invalid escape character in string: `"));
                rtry!(Escape(*c).fmt(f));
                f.write_str("`")
            }
            ErrorKind::InvalidHexEscape(c) => {
                rtry!(f.write_str("invalid hex escape character in string: `"));
                rtry!(Escape(*c).fmt(f));
                f.write_str("`")
            }
            ErrorKind::InvalidEscapeValue(c) => write!(f, "invalid escape value: `{c:#x}`"),
            ErrorKind::UnterminatedString => f.write_str("unterminated string"),
            ErrorKind::MultilineStringKey => {
                f.write_str("multiline strings are not allowed for key")
            }
            ErrorKind::InvalidNumber(reason) => {
                rtry!(f.write_str("invalid number: "));
                f.write_str(reason)
            }
            ErrorKind::OutOfRange(kind) => {
                rtry!(f.write_str("out of range of '"));
                rtry!(f.write_str(kind));
                f.write_str("'")
            }
            ErrorKind::InvalidDatetime(reason) => {
                rtry!(f.write_str("invalid date-time: "));
                f.write_str(reason)
            }
            ErrorKind::Wanted { expected, found } => {
                rtry!(f.write_str("expected "));
                rtry!(f.write_str(expected));
                rtry!(f.write_str(", found "));
                f.write_str(found)
            }
            ErrorKind::Expected { expected, found } => {
                rtry!(f.write_str("expected one of ["));
                let mut first = true;
                for name in expected.iter() {
                    if !first {
                        rtry!(f.write_str(", "));
                    }
                    first = false;
                    rtry!(f.write_str(name));
                }
                rtry!(f.write_str("], found "));
                f.write_str(found)
            }
            ErrorKind::UnexpectedNewline { after } => {
                rtry!(f.write_str("newline is not allowed after "));
                f.write_str(after)
            }
            ErrorKind::MultilineInlineTable => {
                f.write_str("inline tables cannot be broken into multiple lines in TOML 1.0")
            }
            ErrorKind::NestingTooDeep(limit) => {
                write!(f, "values nest deeper than {limit} levels")
            }
            ErrorKind::DuplicateTable { name, .. } => quoted(f, "redefinition of table", name, ""),
            ErrorKind::DuplicateKey { key, .. } => {
                rtry!(f.write_str("duplicate key: `"));
                rtry!(f.write_str(key));
                f.write_str("`")
            }
            ErrorKind::RedefineAsArray { name, .. } => {
                quoted(f, "cannot redefine", name, " as an array of tables")
            }
            ErrorKind::ExtendStaticArray { name, .. } => {
                quoted(f, "cannot extend static array", name, " with a table header")
            }
            ErrorKind::ExtendInlineTable { name, .. } => {
                quoted(f, "cannot extend inline table", name, "")
            }
            ErrorKind::DottedKeyInvalidType { .. } => {
                f.write_str("dotted key attempted to extend non-table type")
            }
            ErrorKind::DottedKeyIntoExplicitTable { name, .. } => quoted(
                f,
                "dotted keys cannot insert into already defined explicit table",
                name,
                "",
            ),
            ErrorKind::DottedKeyIntoArrayOfTables { name, .. } => quoted(
                f,
                "dotted keys cannot extend array of tables",
                name,
                " outside of its header",
            ),
            ErrorKind::Custom(message) => f.write_str(message),
        }
    }
}

impl Error {
    /// Which fatal class this error belongs to.
    pub fn class(&self) -> ErrorClass {
        self.kind.class()
    }

    /// Returns `true` for illegal key or table reuse.
    pub fn is_redefinition(&self) -> bool {
        self.class() == ErrorClass::Redefinition
    }

    /// Fills in `line_info` from `source` when it is missing.
    pub(crate) fn locate(mut self, source: &str) -> Self {
        if self.line_info.is_none() {
            self.line_info = Some(line_col(source.as_bytes(), self.span.start as usize));
        }
        self
    }

    /// Renders the error with a caret under the offending source text.
    ///
    /// ```
    /// let src = "a = 1\na = 2\n";
    /// let err = toml_lattice::decode(src, &Default::default()).unwrap_err();
    /// let rendered = err.snippet(src).to_string();
    /// assert!(rendered.starts_with("error[duplicate-key]: duplicate key: `a`"));
    /// assert!(rendered.ends_with("2 | a = 2\n  | ^"));
    /// ```
    pub fn snippet<'a>(&'a self, source: &'a str) -> Snippet<'a> {
        Snippet {
            error: self,
            source,
        }
    }
}

/// Caret-style rendering of an [`Error`] against its source text.
pub struct Snippet<'a> {
    error: &'a Error,
    source: &'a str,
}

impl Display for Snippet<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let err = self.error;
        let (line, col) = err
            .line_info
            .unwrap_or_else(|| line_col(self.source.as_bytes(), err.span.start as usize));
        let text = self.source.lines().nth(line).unwrap_or("");
        let col = floor_char_boundary(text, col);
        let end = floor_char_boundary(text, col + err.span.len());
        let before = &text[..col];
        let under = &text[col..end];

        let number = (line + 1).to_string();
        let gutter = " ".repeat(number.len());
        let indent: String = before
            .chars()
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let carets = "^".repeat(under.chars().count().max(1));

        writeln!(f, "error[{}]: {}", err.kind, err)?;
        writeln!(
            f,
            "{gutter}--> line {}, column {}",
            line + 1,
            before.chars().count() + 1
        )?;
        writeln!(f, "{gutter} |")?;
        writeln!(f, "{number} | {text}")?;
        write!(f, "{gutter} | {indent}{carets}")
    }
}

/// Largest char boundary of `text` at or below `index`.
fn floor_char_boundary(text: &str, index: usize) -> usize {
    let mut index = index.min(text.len());
    while !text.is_char_boundary(index) {
        index -= 1;
    }
    index
}

#[cfg(feature = "reporting")]
#[cfg_attr(docsrs, doc(cfg(feature = "reporting")))]
impl Error {
    /// Converts this [`Error`] into a [`codespan_reporting::diagnostic::Diagnostic`]
    pub fn to_diagnostic<FileId: Copy + PartialEq>(
        &self,
        fid: FileId,
    ) -> codespan_reporting::diagnostic::Diagnostic<FileId> {
        use codespan_reporting::diagnostic::{Diagnostic, Label};

        let diag = Diagnostic::error()
            .with_code(self.kind.to_string())
            .with_message(self.to_string());

        match &self.kind {
            ErrorKind::DuplicateKey { first, .. } => diag.with_labels(vec![
                Label::secondary(fid, *first).with_message("first key instance"),
                Label::primary(fid, self.span).with_message("duplicate key"),
            ]),
            ErrorKind::DuplicateTable { first, .. } => diag.with_labels(vec![
                Label::secondary(fid, *first).with_message("first table instance"),
                Label::primary(fid, self.span).with_message("duplicate table"),
            ]),
            ErrorKind::DottedKeyInvalidType { first } => diag.with_labels(vec![
                Label::primary(fid, self.span).with_message("attempted to extend table here"),
                Label::secondary(fid, *first).with_message("non-table"),
            ]),
            kind if kind.first_definition().is_some() => {
                let mut labels = vec![Label::primary(fid, self.span)];
                if let Some(first) = kind.first_definition() {
                    labels.push(Label::secondary(fid, first).with_message("first defined here"));
                }
                diag.with_labels(labels)
            }
            ErrorKind::Expected { found, .. } => diag.with_labels(vec![
                Label::primary(fid, self.span).with_message(format!("found {found}")),
            ]),
            ErrorKind::UnterminatedString => diag.with_labels(vec![
                Label::primary(fid, self.span).with_message("eof reached before string terminator"),
            ]),
            ErrorKind::InvalidEscape(c) => diag.with_labels(vec![Label::primary(fid, self.span)
                .with_message(format!("invalid escape character '{}' in string", Escape(*c)))]),
            _ => diag.with_labels(vec![Label::primary(fid, self.span)]),
        }
    }
}
