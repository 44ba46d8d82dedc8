//! Non-fatal diagnostics raised while decoding.
//!
//! A warning never changes the decoded tree. Each enabled [`WarningKind`] is
//! delivered at most once per decode call; nothing is remembered between
//! calls.

use crate::Span;
use crate::cursor::line_col;
use std::fmt;

#[cfg(test)]
#[path = "./warning_tests.rs"]
mod tests;

/// Category of a [`Warning`].
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum WarningKind {
    /// A `[table]` header whose table only holds sub-tables, so the header
    /// could be dropped without changing the document.
    UnnecessaryExplicitSupertable,
    /// An inline table broken across several lines (TOML 1.1 only).
    MultilineInlineTable,
    /// A `-nan` literal, which is read as positive NaN.
    NegativeNan,
}

impl WarningKind {
    /// Every warning category.
    pub const ALL: [WarningKind; 3] = [
        WarningKind::UnnecessaryExplicitSupertable,
        WarningKind::MultilineInlineTable,
        WarningKind::NegativeNan,
    ];

    /// Stable short code for the category.
    pub fn code(self) -> &'static str {
        match self {
            WarningKind::UnnecessaryExplicitSupertable => "unnecessary-explicit-supertable",
            WarningKind::MultilineInlineTable => "multiline-inline-table",
            WarningKind::NegativeNan => "negative-nan",
        }
    }

    #[inline]
    fn bit(self) -> u8 {
        1 << self as u8
    }
}

impl fmt::Display for WarningKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A set of [`WarningKind`]s.
#[derive(Copy, Clone, PartialEq, Eq, Hash, Default)]
pub struct WarningSet(u8);

impl WarningSet {
    /// Every category.
    pub fn all() -> Self {
        let mut set = Self::empty();
        for kind in WarningKind::ALL {
            set = set.with(kind);
        }
        set
    }

    /// No categories.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Returns a copy with `kind` added.
    #[must_use]
    pub fn with(self, kind: WarningKind) -> Self {
        Self(self.0 | kind.bit())
    }

    /// Returns a copy with `kind` removed.
    #[must_use]
    pub fn without(self, kind: WarningKind) -> Self {
        Self(self.0 & !kind.bit())
    }

    pub fn contains(self, kind: WarningKind) -> bool {
        self.0 & kind.bit() != 0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl fmt::Debug for WarningSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set()
            .entries(WarningKind::ALL.iter().filter(|kind| self.contains(**kind)))
            .finish()
    }
}

/// A non-fatal diagnostic produced by the decoder.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Warning {
    /// The warning category.
    pub kind: WarningKind,
    /// Where in the source the warning was raised.
    pub span: Span,
    /// Zero-based line and column of `span.start`.
    pub line_info: Option<(usize, usize)>,
    /// Dotted name of the table involved, when there is one.
    pub table: Option<String>,
}

impl fmt::Display for Warning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.kind {
            WarningKind::UnnecessaryExplicitSupertable => {
                f.write_str("header `[")?;
                f.write_str(self.table.as_deref().unwrap_or(""))?;
                f.write_str("]` is unnecessary, the table only holds sub-tables")
            }
            WarningKind::MultilineInlineTable => f.write_str(
                "breaking an inline table across lines is discouraged, consider a regular table",
            ),
            WarningKind::NegativeNan => f.write_str("`-nan` was normalized to `nan`"),
        }
    }
}

/// Receiver of decoder warnings.
///
/// Implemented for closures taking a [`Warning`], and by [`LogSink`].
pub trait WarningSink {
    fn warn(&mut self, warning: Warning);
}

impl<F> WarningSink for F
where
    F: FnMut(Warning),
{
    fn warn(&mut self, warning: Warning) {
        self(warning)
    }
}

/// Forwards warnings to the [`log`] facade at `warn` level.
#[derive(Copy, Clone, Debug, Default)]
pub struct LogSink;

impl WarningSink for LogSink {
    fn warn(&mut self, warning: Warning) {
        match warning.line_info {
            Some((line, col)) => log::warn!(
                target: "toml_lattice",
                "{}: {} (line {}, column {})",
                warning.kind,
                warning,
                line + 1,
                col + 1
            ),
            None => log::warn!(target: "toml_lattice", "{}: {}", warning.kind, warning),
        }
    }
}

/// Per-decode warning state.
pub(crate) struct Warnings<'s> {
    sink: &'s mut dyn WarningSink,
    source: &'s str,
    enabled: WarningSet,
    delivered: WarningSet,
}

impl<'s> Warnings<'s> {
    pub(crate) fn new(source: &'s str, enabled: WarningSet, sink: &'s mut dyn WarningSink) -> Self {
        Self {
            sink,
            source,
            enabled,
            delivered: WarningSet::empty(),
        }
    }

    /// Returns `true` if a warning of `kind` would still be delivered.
    pub(crate) fn wants(&self, kind: WarningKind) -> bool {
        self.enabled.contains(kind) && !self.delivered.contains(kind)
    }

    pub(crate) fn emit(&mut self, kind: WarningKind, span: Span, table: Option<String>) {
        if !self.wants(kind) {
            return;
        }
        self.delivered = self.delivered.with(kind);
        let line_info = Some(line_col(self.source.as_bytes(), span.start as usize));
        self.sink.warn(Warning {
            kind,
            span,
            line_info,
            table,
        });
    }
}
