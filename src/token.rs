//! The closed set of token kinds and the grammar that links them.

use crate::config::Version;
use crate::number::Integer;
use crate::span::Span;
use crate::time::Datetime;

#[cfg(test)]
#[path = "./token_tests.rs"]
mod tests;

/// Every kind of token the tokenizer emits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Symbol {
    DocumentStart,
    Comment,
    Newline,
    StartTable,
    EndTable,
    StartArrayTable,
    EndArrayTable,
    BareKey,
    QuotedKey,
    LiteralKey,
    KeySeparator,
    Equals,
    MultilineBasicString,
    MultilineLiteralString,
    BasicString,
    LiteralString,
    StartArray,
    EndArray,
    StartInlineTable,
    EndInlineTable,
    Separator,
    Boolean,
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
    Float,
    Integer,
    EndOfDocument,
}

/// The bracket nesting a token sits in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Context {
    Root,
    Array,
    InlineTable,
}

use Symbol::*;

const KEYS: &[Symbol] = &[QuotedKey, LiteralKey, BareKey];

const VALUES: &[Symbol] = &[
    MultilineBasicString,
    MultilineLiteralString,
    BasicString,
    LiteralString,
    StartArray,
    StartInlineTable,
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
    Boolean,
    Float,
    Integer,
];

const LINE_START: &[Symbol] = &[
    Comment,
    StartArrayTable,
    StartTable,
    QuotedKey,
    LiteralKey,
    BareKey,
    EndOfDocument,
];

const AFTER_KEY: &[Symbol] = &[KeySeparator, Equals];
const HEADER_KEY: &[Symbol] = &[KeySeparator, EndTable];
const ARRAY_HEADER_KEY: &[Symbol] = &[KeySeparator, EndArrayTable];
const LINE_END: &[Symbol] = &[Comment, EndOfDocument];
const IN_ARRAY_AFTER_VALUE: &[Symbol] = &[Comment, Separator, EndArray];
const IN_TABLE_AFTER_VALUE: &[Symbol] = &[Separator, EndInlineTable];
const IN_TABLE_AFTER_VALUE_1_1: &[Symbol] = &[Comment, Separator, EndInlineTable];
const ARRAY_ITEM: &[Symbol] = &[
    Comment,
    EndArray,
    MultilineBasicString,
    MultilineLiteralString,
    BasicString,
    LiteralString,
    StartArray,
    StartInlineTable,
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
    Boolean,
    Float,
    Integer,
];
const TABLE_ITEM_1_1: &[Symbol] = &[Comment, EndInlineTable, QuotedKey, LiteralKey, BareKey];
const TABLE_OPEN: &[Symbol] = &[EndInlineTable, QuotedKey, LiteralKey, BareKey];
const NOTHING: &[Symbol] = &[];

impl Symbol {
    /// Human description used in error messages.
    pub fn name(self) -> &'static str {
        match self {
            DocumentStart => "start of document",
            Comment => "comment",
            Newline => "newline",
            StartTable => "table header",
            EndTable => "end of table header",
            StartArrayTable => "array of tables header",
            EndArrayTable => "end of array of tables header",
            BareKey => "bare key",
            QuotedKey => "quoted key",
            LiteralKey => "literal key",
            KeySeparator => "key separator",
            Equals => "equals sign",
            MultilineBasicString => "multi-line basic string",
            MultilineLiteralString => "multi-line literal string",
            BasicString => "basic string",
            LiteralString => "literal string",
            StartArray => "array",
            EndArray => "end of array",
            StartInlineTable => "inline table",
            EndInlineTable => "end of inline table",
            Separator => "comma",
            Boolean => "boolean",
            OffsetDateTime => "offset date-time",
            LocalDateTime => "local date-time",
            LocalDate => "local date",
            LocalTime => "local time",
            Float => "float",
            Integer => "integer",
            EndOfDocument => "end of document",
        }
    }

    pub fn is_key(self) -> bool {
        matches!(self, BareKey | QuotedKey | LiteralKey)
    }

    /// Scalars and the brackets opening a compound value.
    pub fn is_value(self) -> bool {
        VALUES.contains(&self)
    }

    /// Tokens after which the value or key must continue on the same line.
    pub fn forbids_newline(self) -> bool {
        self.is_key() || matches!(self, KeySeparator | Equals | StartTable | StartArrayTable)
    }

    /// The tokens that may legally follow `self` in `context`, in the order
    /// they are attempted. Newlines are handled by the tokenizer itself.
    ///
    /// Inside a header, a key is followed by a key separator or the end of
    /// the header; the header closer depends on the opener, so keys report
    /// the key/value continuation here.
    pub fn successors(self, context: Context, version: Version) -> &'static [Symbol] {
        let v1_1 = version.is_v1_1();
        match self {
            DocumentStart | Newline => LINE_START,
            Comment => match context {
                Context::Root => &[EndOfDocument],
                // comments are transparent in brackets
                _ => NOTHING,
            },
            StartTable | StartArrayTable | KeySeparator => KEYS,
            BareKey | QuotedKey | LiteralKey => AFTER_KEY,
            Equals => VALUES,
            EndTable | EndArrayTable => LINE_END,
            StartArray => ARRAY_ITEM,
            StartInlineTable => {
                if v1_1 {
                    TABLE_ITEM_1_1
                } else {
                    TABLE_OPEN
                }
            }
            Separator => match context {
                Context::Array => ARRAY_ITEM,
                Context::InlineTable if v1_1 => TABLE_ITEM_1_1,
                _ => KEYS,
            },
            MultilineBasicString | MultilineLiteralString | BasicString | LiteralString
            | EndArray | EndInlineTable | Boolean | OffsetDateTime | LocalDateTime
            | LocalDate | LocalTime | Float | Integer => match context {
                Context::Root => LINE_END,
                Context::Array => IN_ARRAY_AFTER_VALUE,
                Context::InlineTable if v1_1 => IN_TABLE_AFTER_VALUE_1_1,
                Context::InlineTable => IN_TABLE_AFTER_VALUE,
            },
            EndOfDocument => NOTHING,
        }
    }

    /// Follow set of a key inside a `[...]` or `[[...]]` header.
    pub(crate) fn header_successors(array: bool) -> &'static [Symbol] {
        if array { ARRAY_HEADER_KEY } else { HEADER_KEY }
    }
}

impl std::fmt::Display for Symbol {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Decoded content carried by a token.
#[derive(Clone, Debug, PartialEq)]
pub enum Payload {
    None,
    /// Keys, strings and comment text, with escapes resolved.
    Text(String),
    Integer(Integer),
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
}

/// One lexeme of the source.
#[derive(Clone, Debug, PartialEq)]
pub struct Token {
    pub symbol: Symbol,
    pub span: Span,
    pub payload: Payload,
}

impl Token {
    pub fn text(&self) -> Option<&str> {
        match &self.payload {
            Payload::Text(s) => Some(s),
            _ => None,
        }
    }
}
