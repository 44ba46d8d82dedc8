//! Rebuilds the document tree from the token stream.
//!
//! The assembler never looks at source text. It replays the significant
//! tokens against a [`Tree`], using the recorded [`TableKind`] and
//! [`ArrayKind`] of existing nodes to decide whether a header or key may
//! reuse them.
//!
//! Every table or array sits at a depth below the root, counting one level
//! per key segment, array element and array-of-tables element. No container
//! may sit deeper than the configured `max_depth`.

use crate::encode::write_key;
use crate::error::{Error, ErrorKind};
use crate::span::Span;
use crate::token::{Payload, Symbol, Token};
use crate::tree::{ArrayKind, Key, NodeId, Shape, TableKind, Tree, Value};
use crate::warning::{WarningKind, Warnings};

#[cfg(test)]
#[path = "./assemble_tests.rs"]
mod tests;

/// How a key path is being placed into the tree.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Placement {
    /// `key = value`. `inline` is set when the value is an inline table.
    KeyValue { inline: bool },
    /// `[path]`
    Table,
    /// `[[path]]`
    ArrayTable,
}

impl Placement {
    fn is_header(self) -> bool {
        !matches!(self, Placement::KeyValue { .. })
    }
}

/// An open `[` or `{` value and its depth.
#[derive(Clone, Copy)]
enum Frame {
    Array(NodeId, usize),
    InlineTable(NodeId, usize),
}

/// A `[path]` header seen during assembly.
struct HeaderRecord {
    table: NodeId,
    span: Span,
    name: String,
    has_lines: bool,
}

pub(crate) fn assemble(
    tokens: Vec<Token>,
    max_depth: usize,
    warnings: &mut Warnings<'_>,
) -> Result<Tree, Error> {
    let mut asm = Assembler {
        tree: Tree::new(),
        max_depth,
        current: NodeId::ROOT,
        current_depth: 0,
        frames: Vec::new(),
        path: Vec::new(),
        header_start: None,
        headers: Vec::new(),
        current_header: None,
    };
    for token in tokens {
        asm.token(token)?;
    }
    asm.report_supertables(warnings);
    Ok(asm.tree)
}

struct Assembler {
    tree: Tree,
    max_depth: usize,
    /// Table receiving top level `key = value` lines.
    current: NodeId,
    current_depth: usize,
    frames: Vec<Frame>,
    /// Keys read since the last value or header.
    path: Vec<Key>,
    header_start: Option<Span>,
    headers: Vec<HeaderRecord>,
    /// Index into `headers` of the section being filled.
    current_header: Option<usize>,
}

impl Assembler {
    fn token(&mut self, token: Token) -> Result<(), Error> {
        let Token {
            symbol,
            span,
            payload,
        } = token;
        match symbol {
            Symbol::BareKey | Symbol::QuotedKey | Symbol::LiteralKey => {
                let Payload::Text(name) = payload else {
                    return Err(missing_payload(symbol, span));
                };
                self.path.push(Key { name, span });
            }
            Symbol::StartTable | Symbol::StartArrayTable => {
                self.header_start = Some(span);
            }
            Symbol::EndTable => {
                let span = self.header_span(span);
                let path = std::mem::take(&mut self.path);
                let (table, depth) = self.open_table(&path, span)?;
                self.headers.push(HeaderRecord {
                    table,
                    span,
                    name: dotted(&path),
                    has_lines: false,
                });
                self.current_header = Some(self.headers.len() - 1);
                self.current = table;
                self.current_depth = depth;
            }
            Symbol::EndArrayTable => {
                let span = self.header_span(span);
                let path = std::mem::take(&mut self.path);
                let (element, depth) = self.append_array_table(&path, span)?;
                self.current = element;
                self.current_depth = depth;
                self.current_header = None;
            }
            Symbol::StartArray => {
                let array = self.tree.new_array(ArrayKind::Regular, span);
                let depth = self.place_value(array, span, false)?;
                self.check_depth(depth, span)?;
                self.frames.push(Frame::Array(array, depth));
            }
            Symbol::StartInlineTable => {
                let table = self.tree.new_table(TableKind::Inline, span);
                let depth = self.place_value(table, span, true)?;
                self.check_depth(depth, span)?;
                self.frames.push(Frame::InlineTable(table, depth));
            }
            Symbol::EndArray | Symbol::EndInlineTable => {
                if let Some(Frame::Array(id, _) | Frame::InlineTable(id, _)) = self.frames.pop() {
                    let full = self.tree.span(id).join(span);
                    self.tree.set_span(id, full);
                }
            }
            symbol if symbol.is_value() => {
                let value = match payload {
                    Payload::Text(s) => Value::String(s),
                    Payload::Integer(i) => Value::Integer(i),
                    Payload::Float(f) => Value::Float(f),
                    Payload::Boolean(b) => Value::Boolean(b),
                    Payload::Datetime(d) => Value::Datetime(d),
                    Payload::None => return Err(missing_payload(symbol, span)),
                };
                let node = self.tree.alloc(value, Shape::Scalar, span);
                self.place_value(node, span, false)?;
            }
            // comments, newlines and punctuation carry no structure
            _ => {}
        }
        Ok(())
    }

    fn header_span(&mut self, end: Span) -> Span {
        match self.header_start.take() {
            Some(start) => start.join(end),
            None => end,
        }
    }

    fn check_depth(&self, depth: usize, span: Span) -> Result<(), Error> {
        if depth > self.max_depth {
            return Err(Error::from((ErrorKind::NestingTooDeep(self.max_depth), span)));
        }
        Ok(())
    }

    /// Attaches a freshly allocated node to whatever is open and returns
    /// the depth it landed at.
    fn place_value(&mut self, node: NodeId, span: Span, inline: bool) -> Result<usize, Error> {
        let path = std::mem::take(&mut self.path);
        let (target, target_depth) = match self.frames.last() {
            Some(&Frame::Array(array, depth)) => {
                self.tree.array_push(array, node);
                return Ok(depth + 1);
            }
            Some(&Frame::InlineTable(table, depth)) => (table, depth),
            None => {
                if let Some(i) = self.current_header {
                    self.headers[i].has_lines = true;
                }
                (self.current, self.current_depth)
            }
        };
        let Some((last, parents)) = path.split_last() else {
            return Err(Error::from((
                ErrorKind::Wanted {
                    expected: "a key",
                    found: "a value",
                },
                span,
            )));
        };
        let (parent, depth) =
            self.walk(target, target_depth, parents, Placement::KeyValue { inline })?;
        if let Some((first, _)) = self.find(parent, &last.name) {
            return Err(Error::from((
                ErrorKind::DuplicateKey {
                    key: last.name.clone(),
                    first,
                },
                last.span,
            )));
        }
        self.tree.table_insert(parent, last.clone(), node);
        Ok(depth + 1)
    }

    /// Span of the existing key and the node stored under `name`.
    fn find(&self, table: NodeId, name: &str) -> Option<(Span, NodeId)> {
        self.tree
            .lookup(table, name)
            .map(|(key, child)| (key.span, child))
    }

    /// Walks the non-terminal segments of a key path starting at `start`,
    /// creating implicit tables on the way, and returns the table that
    /// should receive the terminal segment along with its depth.
    fn walk(
        &mut self,
        start: NodeId,
        start_depth: usize,
        path: &[Key],
        placement: Placement,
    ) -> Result<(NodeId, usize), Error> {
        let mut table = start;
        let mut level = start_depth;
        let mut previous: Option<TableKind> = None;
        for (depth, key) in path.iter().enumerate() {
            level += 1;
            self.check_depth(level, key.span)?;
            let Some((first_key, child)) = self.find(table, &key.name) else {
                let kind = if placement.is_header() {
                    TableKind::TableImplicit
                } else {
                    TableKind::KeyValueImplicit
                };
                let child = self.tree.new_table(kind, key.span);
                self.tree.table_insert(table, key.clone(), child);
                previous = Some(kind);
                table = child;
                continue;
            };
            let first = self.tree.span(child);
            let kind = match self.tree.shape(child) {
                Shape::Table(TableKind::Inline) => ErrorKind::ExtendInlineTable {
                    name: dotted(&path[..=depth]),
                    first,
                },
                Shape::Table(kind) => {
                    if placement == (Placement::KeyValue { inline: false })
                        && previous == Some(TableKind::TableImplicit)
                        && kind == TableKind::Explicit
                    {
                        ErrorKind::DottedKeyIntoExplicitTable {
                            name: dotted(&path[..=depth]),
                            first,
                        }
                    } else {
                        previous = Some(kind);
                        table = child;
                        continue;
                    }
                }
                Shape::Array(ArrayKind::ArrayOfTables) => {
                    if placement.is_header() {
                        if let Some(last) = self.tree.array_last(child) {
                            level += 1;
                            self.check_depth(level, key.span)?;
                            table = last;
                            continue;
                        }
                        ErrorKind::ExtendStaticArray {
                            name: dotted(&path[..=depth]),
                            first,
                        }
                    } else {
                        ErrorKind::DottedKeyIntoArrayOfTables {
                            name: dotted(&path[..=depth]),
                            first,
                        }
                    }
                }
                Shape::Array(ArrayKind::Regular) if placement.is_header() => {
                    ErrorKind::ExtendStaticArray {
                        name: dotted(&path[..=depth]),
                        first,
                    }
                }
                Shape::Scalar if placement.is_header() => ErrorKind::DuplicateKey {
                    key: key.name.clone(),
                    first: first_key,
                },
                Shape::Array(_) | Shape::Scalar => {
                    ErrorKind::DottedKeyInvalidType { first: first_key }
                }
            };
            return Err(Error::from((kind, key.span)));
        }
        Ok((table, level))
    }

    /// Resolves `[path]` from the root.
    fn open_table(&mut self, path: &[Key], span: Span) -> Result<(NodeId, usize), Error> {
        let Some((last, parents)) = path.split_last() else {
            return Err(Error::from((
                ErrorKind::Wanted {
                    expected: "a table name",
                    found: "an empty header",
                },
                span,
            )));
        };
        let (parent, depth) = self.walk(NodeId::ROOT, 0, parents, Placement::Table)?;
        let depth = depth + 1;
        self.check_depth(depth, last.span)?;
        let Some((first_key, existing)) = self.find(parent, &last.name) else {
            let table = self.tree.new_table(TableKind::Explicit, span);
            self.tree.table_insert(parent, last.clone(), table);
            return Ok((table, depth));
        };
        let first = self.tree.span(existing);
        let (kind, at) = match self.tree.shape(existing) {
            Shape::Table(TableKind::TableImplicit) => {
                self.tree
                    .set_shape(existing, Shape::Table(TableKind::Explicit));
                self.tree.set_span(existing, span);
                return Ok((existing, depth));
            }
            Shape::Table(TableKind::Inline) => (
                ErrorKind::ExtendInlineTable {
                    name: dotted(path),
                    first,
                },
                span,
            ),
            Shape::Table(_) => (
                ErrorKind::DuplicateTable {
                    name: dotted(path),
                    first,
                },
                span,
            ),
            Shape::Array(_) | Shape::Scalar => (
                ErrorKind::DuplicateKey {
                    key: last.name.clone(),
                    first: first_key,
                },
                last.span,
            ),
        };
        Err(Error::from((kind, at)))
    }

    /// Resolves `[[path]]` from the root and returns the new element.
    fn append_array_table(&mut self, path: &[Key], span: Span) -> Result<(NodeId, usize), Error> {
        let Some((last, parents)) = path.split_last() else {
            return Err(Error::from((
                ErrorKind::Wanted {
                    expected: "a table name",
                    found: "an empty header",
                },
                span,
            )));
        };
        let (parent, depth) = self.walk(NodeId::ROOT, 0, parents, Placement::ArrayTable)?;
        // the array and its element
        let depth = depth + 2;
        self.check_depth(depth, last.span)?;
        let Some((first_key, existing)) = self.find(parent, &last.name) else {
            let array = self.tree.new_array(ArrayKind::ArrayOfTables, span);
            let element = self.tree.new_table(TableKind::Explicit, span);
            self.tree.array_push(array, element);
            self.tree.table_insert(parent, last.clone(), array);
            return Ok((element, depth));
        };
        let kind = match self.tree.shape(existing) {
            Shape::Array(ArrayKind::ArrayOfTables) => {
                let element = self.tree.new_table(TableKind::Explicit, span);
                self.tree.array_push(existing, element);
                return Ok((element, depth));
            }
            Shape::Array(ArrayKind::Regular) => ErrorKind::ExtendStaticArray {
                name: dotted(path),
                first: self.tree.span(existing),
            },
            Shape::Table(_) | Shape::Scalar => ErrorKind::RedefineAsArray {
                name: dotted(path),
                first: first_key,
            },
        };
        Err(Error::from((kind, span)))
    }

    fn report_supertables(&self, warnings: &mut Warnings<'_>) {
        if !warnings.wants(WarningKind::UnnecessaryExplicitSupertable) {
            return;
        }
        for header in &self.headers {
            if !header.has_lines && !self.tree.entries(header.table).is_empty() {
                warnings.emit(
                    WarningKind::UnnecessaryExplicitSupertable,
                    header.span,
                    Some(header.name.clone()),
                );
                return;
            }
        }
    }
}

#[cold]
fn missing_payload(symbol: Symbol, span: Span) -> Error {
    Error::from((
        ErrorKind::Wanted {
            expected: symbol.name(),
            found: "a token without its decoded content",
        },
        span,
    ))
}

/// `a."b c".d` style name of a key path, for messages.
fn dotted(path: &[Key]) -> String {
    let mut name = String::new();
    for (i, key) in path.iter().enumerate() {
        if i > 0 {
            name.push('.');
        }
        write_key(&mut name, &key.name);
    }
    name
}
