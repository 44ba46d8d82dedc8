//! Writes a [`Tree`] back out as TOML text.
//!
//! Every choice between header and inline syntax is read from the shapes
//! recorded in the tree, so a decoded document keeps its layout.

use crate::config::EncodeStyle;
use crate::cursor::is_keylike_byte;
use crate::number::{Base, Integer};
use crate::tree::{ArrayKind, Key, NodeId, Shape, TableKind, Tree, Value};

#[cfg(test)]
#[path = "./encode_tests.rs"]
mod tests;

pub(crate) fn encode(tree: &Tree, style: EncodeStyle) -> String {
    let mut encoder = Encoder {
        tree,
        style,
        out: String::new(),
        path: Vec::new(),
    };
    let root = tree.root_id();
    let lines = encoder.lines(root);
    encoder.write_lines(&lines);
    encoder.sections(tree.entries(root));
    encoder.out
}

/// One `key = value` line, already rendered.
struct Line {
    key: String,
    value: String,
}

struct Encoder<'t> {
    tree: &'t Tree,
    style: EncodeStyle,
    out: String,
    /// Key path of the section being written.
    path: Vec<&'t str>,
}

impl<'t> Encoder<'t> {
    /// Returns `true` for nodes written under their own header.
    fn is_section(&self, id: NodeId) -> bool {
        match self.tree.shape(id) {
            Shape::Table(TableKind::Explicit | TableKind::TableImplicit) => true,
            Shape::Array(ArrayKind::ArrayOfTables) => {
                let elements = self.tree.elements(id);
                !elements.is_empty() && elements.iter().all(|e| self.tree.table(*e).is_some())
            }
            _ => false,
        }
    }

    // -- key/value lines ----------------------------------------------------

    fn lines(&self, table: NodeId) -> Vec<Line> {
        let mut lines = Vec::new();
        let mut prefix = String::new();
        self.collect_lines(table, &mut prefix, false, &mut lines);
        lines
    }

    /// Renders the entries of `table` that are not sections. Dotted-key
    /// tables are flattened into `prefix`.
    fn collect_lines(&self, table: NodeId, prefix: &mut String, inline: bool, out: &mut Vec<Line>) {
        for (key, child) in self.tree.entries(table) {
            let child = *child;
            if !inline && self.is_section(child) {
                continue;
            }
            let mark = prefix.len();
            if mark > 0 {
                prefix.push('.');
            }
            write_key(prefix, &key.name);
            let dotted = self.tree.shape(child) == Shape::Table(TableKind::KeyValueImplicit)
                && !self.tree.entries(child).is_empty();
            if dotted {
                self.collect_lines(child, prefix, inline, out);
            } else {
                let mut value = String::new();
                self.value(child, &mut value, inline, 0);
                out.push(Line {
                    key: prefix.clone(),
                    value,
                });
            }
            prefix.truncate(mark);
        }
    }

    fn write_lines(&mut self, lines: &[Line]) {
        let width = if self.style.align_equals {
            lines.iter().map(|l| l.key.chars().count()).max().unwrap_or(0)
        } else {
            0
        };
        for line in lines {
            self.out.push_str(&line.key);
            for _ in line.key.chars().count()..width {
                self.out.push(' ');
            }
            self.out.push_str(" = ");
            self.out.push_str(&line.value);
            self.out.push('\n');
        }
    }

    // -- sections -----------------------------------------------------------

    fn sections(&mut self, entries: &'t [(Key, NodeId)]) {
        let tree = self.tree;
        for (key, child) in entries {
            let child = *child;
            match tree.shape(child) {
                Shape::Table(TableKind::KeyValueImplicit) => {
                    self.path.push(&key.name);
                    self.sections(tree.entries(child));
                    self.path.pop();
                }
                Shape::Table(TableKind::Explicit | TableKind::TableImplicit) => {
                    self.path.push(&key.name);
                    self.table_section(child);
                    self.path.pop();
                }
                Shape::Array(ArrayKind::ArrayOfTables) if self.is_section(child) => {
                    self.path.push(&key.name);
                    for &element in tree.elements(child) {
                        self.header(true);
                        let lines = self.lines(element);
                        self.write_lines(&lines);
                        self.sections(tree.entries(element));
                    }
                    self.path.pop();
                }
                _ => {}
            }
        }
    }

    fn table_section(&mut self, table: NodeId) {
        let tree = self.tree;
        let entries = tree.entries(table);
        let lines = self.lines(table);
        let needs_header = tree.shape(table) == Shape::Table(TableKind::Explicit)
            || !lines.is_empty()
            || entries.is_empty();
        if !needs_header {
            self.sections(entries);
            return;
        }
        // sub-tables declared before the first line of this table go first
        let split = if lines.is_empty() {
            0
        } else {
            entries
                .iter()
                .position(|(_, child)| !self.is_section(*child))
                .unwrap_or(0)
        };
        self.sections(&entries[..split]);
        self.header(false);
        self.write_lines(&lines);
        self.sections(&entries[split..]);
    }

    fn header(&mut self, array: bool) {
        if self.style.blank_line_before_tables && !self.out.is_empty() {
            self.out.push('\n');
        }
        self.out.push_str(if array { "[[" } else { "[" });
        for (i, name) in self.path.iter().enumerate() {
            if i > 0 {
                self.out.push('.');
            }
            write_key(&mut self.out, name);
        }
        self.out.push_str(if array { "]]\n" } else { "]\n" });
    }

    // -- values -------------------------------------------------------------

    fn value(&self, id: NodeId, out: &mut String, inline: bool, depth: usize) {
        match self.tree.value(id) {
            Value::String(s) => write_string(out, s),
            Value::Integer(i) => write_integer(out, *i, self.style.uppercase_hex),
            Value::Float(f) => write_float(out, *f),
            Value::Boolean(b) => out.push_str(if *b { "true" } else { "false" }),
            Value::Datetime(d) => out.push_str(&d.to_string()),
            Value::Table(_) => {
                let mut lines = Vec::new();
                self.collect_lines(id, &mut String::new(), true, &mut lines);
                if lines.is_empty() {
                    out.push_str("{}");
                    return;
                }
                out.push_str("{ ");
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        out.push_str(", ");
                    }
                    out.push_str(&line.key);
                    out.push_str(" = ");
                    out.push_str(&line.value);
                }
                out.push_str(" }");
            }
            Value::Array(items) => {
                if items.is_empty() {
                    out.push_str("[]");
                } else if self.style.break_arrays && !inline {
                    out.push_str("[\n");
                    for item in items {
                        push_tabs(out, depth + 1);
                        self.value(*item, out, inline, depth + 1);
                        out.push_str(",\n");
                    }
                    push_tabs(out, depth);
                    out.push(']');
                } else {
                    out.push('[');
                    for (i, item) in items.iter().enumerate() {
                        if i > 0 {
                            out.push_str(", ");
                        }
                        self.value(*item, out, inline, depth);
                    }
                    out.push(']');
                }
            }
        }
    }
}

fn push_tabs(out: &mut String, depth: usize) {
    for _ in 0..depth {
        out.push('\t');
    }
}

/// Writes `name` bare when it only holds key characters, quoted otherwise.
pub(crate) fn write_key(out: &mut String, name: &str) {
    if !name.is_empty() && name.bytes().all(is_keylike_byte) {
        out.push_str(name);
    } else {
        write_basic(out, name);
    }
}

fn is_control(c: char) -> bool {
    c != '\t' && (c < ' ' || c == '\u{7f}')
}

fn write_string(out: &mut String, s: &str) {
    if !s.contains('\'') && !s.chars().any(is_control) {
        out.push('\'');
        out.push_str(s);
        out.push('\'');
    } else if s.contains('\n')
        && !s.contains("'''")
        && !s.ends_with('\'')
        && !s.chars().any(|c| c != '\n' && is_control(c))
    {
        // the newline right after the opening quotes is dropped when read
        out.push_str("'''\n");
        out.push_str(s);
        out.push_str("'''");
    } else {
        write_basic(out, s);
    }
}

fn write_basic(out: &mut String, s: &str) {
    out.push('"');
    for c in s.chars() {
        match c {
            '"' => out.push_str("\\\""),
            '\\' => out.push_str("\\\\"),
            '\u{8}' => out.push_str("\\b"),
            '\t' => out.push_str("\\t"),
            '\n' => out.push_str("\\n"),
            '\u{c}' => out.push_str("\\f"),
            '\r' => out.push_str("\\r"),
            c if is_control(c) => out.push_str(&format!("\\u{:04X}", c as u32)),
            c => out.push(c),
        }
    }
    out.push('"');
}

fn write_integer(out: &mut String, integer: Integer, uppercase_hex: bool) {
    let Integer { value, base } = integer;
    if value < 0 || base == Base::Decimal {
        out.push_str(&value.to_string());
        return;
    }
    out.push_str(base.prefix());
    let digits = match base {
        Base::Hex if uppercase_hex => format!("{value:X}"),
        Base::Hex => format!("{value:x}"),
        Base::Octal => format!("{value:o}"),
        Base::Binary => format!("{value:b}"),
        Base::Decimal => value.to_string(),
    };
    out.push_str(&digits);
}

fn write_float(out: &mut String, value: f64) {
    if value.is_nan() {
        out.push_str("nan");
    } else if value.is_infinite() {
        out.push_str(if value > 0.0 { "+inf" } else { "-inf" });
    } else {
        let mut buffer = zmij::Buffer::new();
        let text = buffer.format(value);
        out.push_str(text);
        if !text.bytes().any(|b| matches!(b, b'.' | b'e' | b'E')) {
            out.push_str(".0");
        }
    }
}
