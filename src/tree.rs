//! The document tree.
//!
//! Nodes live in one arena and are addressed by [`NodeId`]. Next to every
//! node the tree records its [`Shape`]: how a table or array came to exist.
//! The shape is what decides whether a later header or dotted key may
//! extend a table, and how the encoder writes it back out.

use std::fmt;

use crate::error::{Error, ErrorKind};
use crate::number::Integer;
use crate::span::Span;
use crate::time::Datetime;

#[cfg(test)]
#[path = "./tree_tests.rs"]
mod tests;

/// Tables with at least this many entries use a hash index for lookups.
const INDEXED_TABLE_THRESHOLD: usize = 6;

/// Index of a node in its [`Tree`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) const ROOT: NodeId = NodeId(0);

    #[inline]
    fn index(self) -> usize {
        self.0 as usize
    }
}

/// How a table came to be defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TableKind {
    /// Declared by a `[header]`, or the document root.
    Explicit,
    /// Created as the parent of a dotted key, e.g. `a` in `a.b = 1`.
    KeyValueImplicit,
    /// Created as the parent of a header, e.g. `a` in `[a.b]`.
    TableImplicit,
    /// Written as `{ ... }`. Closed once written.
    Inline,
}

/// How an array came to be defined.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ArrayKind {
    /// Written as `[ ... ]`. Closed once written.
    Regular,
    /// Built from `[[header]]` sections.
    ArrayOfTables,
}

/// Side metadata recorded for each node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Shape {
    Scalar,
    Table(TableKind),
    Array(ArrayKind),
}

/// Coarse type of a node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ValueKind {
    String,
    Integer,
    Float,
    Boolean,
    Datetime,
    Table,
    Array,
}

impl ValueKind {
    pub fn name(self) -> &'static str {
        match self {
            ValueKind::String => "string",
            ValueKind::Integer => "integer",
            ValueKind::Float => "float",
            ValueKind::Boolean => "boolean",
            ValueKind::Datetime => "datetime",
            ValueKind::Table => "table",
            ValueKind::Array => "array",
        }
    }
}

/// A table key together with where it was written.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Key {
    pub name: String,
    pub span: Span,
}

#[derive(Clone, Debug, Default)]
pub(crate) struct Table {
    entries: Vec<(Key, NodeId)>,
    index: Option<foldhash::HashMap<Box<str>, u32>>,
}

impl Table {
    fn find(&self, name: &str) -> Option<usize> {
        match &self.index {
            Some(index) => index.get(name).map(|i| *i as usize),
            None => self.entries.iter().position(|(key, _)| key.name == name),
        }
    }

    fn push(&mut self, key: Key, child: NodeId) {
        self.entries.push((key, child));
        let len = self.entries.len();
        if len == INDEXED_TABLE_THRESHOLD {
            let index = self
                .entries
                .iter()
                .enumerate()
                .map(|(i, (key, _))| (key.name.clone().into_boxed_str(), i as u32))
                .collect();
            self.index = Some(index);
        } else if let Some(index) = &mut self.index {
            let (key, _) = &self.entries[len - 1];
            index.insert(key.name.clone().into_boxed_str(), (len - 1) as u32);
        }
    }
}

#[derive(Clone, Debug)]
pub(crate) enum Value {
    String(String),
    Integer(Integer),
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
    Table(Table),
    Array(Vec<NodeId>),
}

impl Value {
    fn kind(&self) -> ValueKind {
        match self {
            Value::String(_) => ValueKind::String,
            Value::Integer(_) => ValueKind::Integer,
            Value::Float(_) => ValueKind::Float,
            Value::Boolean(_) => ValueKind::Boolean,
            Value::Datetime(_) => ValueKind::Datetime,
            Value::Table(_) => ValueKind::Table,
            Value::Array(_) => ValueKind::Array,
        }
    }
}

#[derive(Clone, Debug)]
struct Node {
    value: Value,
    span: Span,
}

/// An ordered TOML document.
///
/// ```
/// use toml_lattice::{Config, TableKind, decode};
///
/// let tree = decode("[server]\nport = 8080\n", &Config::default()).unwrap();
/// let server = tree.root().get("server").unwrap().as_table().unwrap();
/// assert_eq!(server.kind(), TableKind::Explicit);
/// assert_eq!(server.get("port").and_then(|v| v.as_i64()), Some(8080));
/// ```
#[derive(Clone, Debug)]
pub struct Tree {
    nodes: Vec<Node>,
    shapes: Vec<Shape>,
}

impl Default for Tree {
    fn default() -> Self {
        Tree::new()
    }
}

/// A value handed to the building API.
#[derive(Clone, Debug, PartialEq)]
pub enum NewValue {
    String(String),
    Integer(Integer),
    Float(f64),
    Boolean(bool),
    Datetime(Datetime),
    /// An empty table of the given kind.
    Table(TableKind),
    /// An empty array of the given kind.
    Array(ArrayKind),
}

impl From<&str> for NewValue {
    fn from(s: &str) -> Self {
        NewValue::String(s.to_owned())
    }
}

impl From<String> for NewValue {
    fn from(s: String) -> Self {
        NewValue::String(s)
    }
}

impl From<i64> for NewValue {
    fn from(value: i64) -> Self {
        NewValue::Integer(Integer::from(value))
    }
}

impl From<Integer> for NewValue {
    fn from(value: Integer) -> Self {
        NewValue::Integer(value)
    }
}

impl From<f64> for NewValue {
    fn from(value: f64) -> Self {
        NewValue::Float(value)
    }
}

impl From<bool> for NewValue {
    fn from(value: bool) -> Self {
        NewValue::Boolean(value)
    }
}

impl From<Datetime> for NewValue {
    fn from(value: Datetime) -> Self {
        NewValue::Datetime(value)
    }
}

impl NewValue {
    fn into_parts(self) -> (Value, Shape) {
        match self {
            NewValue::String(s) => (Value::String(s), Shape::Scalar),
            NewValue::Integer(i) => (Value::Integer(i), Shape::Scalar),
            NewValue::Float(f) => (Value::Float(f), Shape::Scalar),
            NewValue::Boolean(b) => (Value::Boolean(b), Shape::Scalar),
            NewValue::Datetime(d) => (Value::Datetime(d), Shape::Scalar),
            NewValue::Table(kind) => (Value::Table(Table::default()), Shape::Table(kind)),
            NewValue::Array(kind) => (Value::Array(Vec::new()), Shape::Array(kind)),
        }
    }
}

impl Tree {
    /// Creates a tree holding only an empty root table.
    pub fn new() -> Tree {
        Tree {
            nodes: vec![Node {
                value: Value::Table(Table::default()),
                span: Span::default(),
            }],
            shapes: vec![Shape::Table(TableKind::Explicit)],
        }
    }

    pub fn root(&self) -> TableRef<'_> {
        TableRef {
            tree: self,
            id: NodeId::ROOT,
        }
    }

    pub fn root_id(&self) -> NodeId {
        NodeId::ROOT
    }

    /// Number of nodes, the root included.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if the root table has no entries.
    pub fn is_empty(&self) -> bool {
        self.root().is_empty()
    }

    /// Looks up a node by id. `None` for ids from another tree that are out
    /// of range.
    pub fn node(&self, id: NodeId) -> Option<Item<'_>> {
        if id.index() < self.nodes.len() {
            Some(Item { tree: self, id })
        } else {
            None
        }
    }

    /// Adds `key = value` to the table `table` and returns the new node.
    ///
    /// ```
    /// use toml_lattice::{Config, NewValue, TableKind, Tree, encode};
    ///
    /// let mut tree = Tree::new();
    /// let root = tree.root_id();
    /// tree.insert(root, "title", "example").unwrap();
    /// let owner = tree.insert(root, "owner", NewValue::Table(TableKind::Explicit)).unwrap();
    /// tree.insert(owner, "name", "Tom").unwrap();
    /// assert!(tree.insert(root, "title", 1i64).is_err());
    ///
    /// assert_eq!(
    ///     encode(&tree, &Config::default()),
    ///     "title = 'example'\n\n[owner]\nname = 'Tom'\n"
    /// );
    /// ```
    pub fn insert(
        &mut self,
        table: NodeId,
        key: impl Into<String>,
        value: impl Into<NewValue>,
    ) -> Result<NodeId, Error> {
        let name = key.into();
        let Some(Value::Table(t)) = self.nodes.get(table.index()).map(|n| &n.value) else {
            return Err(not_a(ValueKind::Table));
        };
        if let Some(i) = t.find(&name) {
            let first = t.entries[i].0.span;
            return Err(Error::from((
                ErrorKind::DuplicateKey { key: name, first },
                Span::default(),
            )));
        }
        let (value, shape) = value.into().into_parts();
        let child = self.alloc(value, shape, Span::default());
        self.table_insert(
            table,
            Key {
                name,
                span: Span::default(),
            },
            child,
        );
        Ok(child)
    }

    /// Appends `value` to the array `array` and returns the new node.
    pub fn push(&mut self, array: NodeId, value: impl Into<NewValue>) -> Result<NodeId, Error> {
        if !matches!(
            self.nodes.get(array.index()).map(|n| &n.value),
            Some(Value::Array(_))
        ) {
            return Err(not_a(ValueKind::Array));
        }
        let (value, shape) = value.into().into_parts();
        let child = self.alloc(value, shape, Span::default());
        self.array_push(array, child);
        Ok(child)
    }

    // -- crate internal building --------------------------------------------

    pub(crate) fn alloc(&mut self, value: Value, shape: Shape, span: Span) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(Node { value, span });
        self.shapes.push(shape);
        id
    }

    pub(crate) fn new_table(&mut self, kind: TableKind, span: Span) -> NodeId {
        self.alloc(Value::Table(Table::default()), Shape::Table(kind), span)
    }

    pub(crate) fn new_array(&mut self, kind: ArrayKind, span: Span) -> NodeId {
        self.alloc(Value::Array(Vec::new()), Shape::Array(kind), span)
    }

    #[inline]
    pub(crate) fn shape(&self, id: NodeId) -> Shape {
        self.shapes[id.index()]
    }

    pub(crate) fn set_shape(&mut self, id: NodeId, shape: Shape) {
        self.shapes[id.index()] = shape;
    }

    #[inline]
    pub(crate) fn span(&self, id: NodeId) -> Span {
        self.nodes[id.index()].span
    }

    pub(crate) fn set_span(&mut self, id: NodeId, span: Span) {
        self.nodes[id.index()].span = span;
    }

    pub(crate) fn value(&self, id: NodeId) -> &Value {
        &self.nodes[id.index()].value
    }

    pub(crate) fn table(&self, id: NodeId) -> Option<&Table> {
        match &self.nodes[id.index()].value {
            Value::Table(t) => Some(t),
            _ => None,
        }
    }

    /// The child stored under `name` in table `table`, with its key.
    pub(crate) fn lookup(&self, table: NodeId, name: &str) -> Option<(&Key, NodeId)> {
        let t = self.table(table)?;
        let i = t.find(name)?;
        let (key, child) = &t.entries[i];
        Some((key, *child))
    }

    /// Adds an entry. The caller has checked that `key` is absent.
    pub(crate) fn table_insert(&mut self, table: NodeId, key: Key, child: NodeId) {
        if let Value::Table(t) = &mut self.nodes[table.index()].value {
            debug_assert!(t.find(&key.name).is_none(), "duplicate key {}", key.name);
            t.push(key, child);
        }
    }

    pub(crate) fn array_push(&mut self, array: NodeId, child: NodeId) {
        if let Value::Array(items) = &mut self.nodes[array.index()].value {
            items.push(child);
        }
    }

    pub(crate) fn array_last(&self, array: NodeId) -> Option<NodeId> {
        match &self.nodes[array.index()].value {
            Value::Array(items) => items.last().copied(),
            _ => None,
        }
    }

    pub(crate) fn entries(&self, table: NodeId) -> &[(Key, NodeId)] {
        match self.table(table) {
            Some(t) => &t.entries,
            None => &[],
        }
    }

    pub(crate) fn elements(&self, array: NodeId) -> &[NodeId] {
        match &self.nodes[array.index()].value {
            Value::Array(items) => items,
            _ => &[],
        }
    }
}

#[cold]
fn not_a(kind: ValueKind) -> Error {
    Error::from((
        ErrorKind::Custom(format!("node is not {} {}", article(kind), kind.name()).into()),
        Span::default(),
    ))
}

fn article(kind: ValueKind) -> &'static str {
    match kind {
        ValueKind::Integer | ValueKind::Array => "an",
        _ => "a",
    }
}

// -- views ------------------------------------------------------------------

/// A borrowed node of a [`Tree`].
#[derive(Clone, Copy)]
pub struct Item<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> Item<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    /// Source span of the value; empty for built nodes.
    pub fn span(&self) -> Span {
        self.tree.span(self.id)
    }

    pub fn shape(&self) -> Shape {
        self.tree.shape(self.id)
    }

    pub fn kind(&self) -> ValueKind {
        self.tree.value(self.id).kind()
    }

    pub fn as_str(&self) -> Option<&'t str> {
        match self.tree.value(self.id) {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_integer(&self) -> Option<Integer> {
        match self.tree.value(self.id) {
            Value::Integer(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_integer().map(|i| i.value)
    }

    pub fn as_float(&self) -> Option<f64> {
        match self.tree.value(self.id) {
            Value::Float(f) => Some(*f),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self.tree.value(self.id) {
            Value::Boolean(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<Datetime> {
        match self.tree.value(self.id) {
            Value::Datetime(d) => Some(*d),
            _ => None,
        }
    }

    pub fn as_table(&self) -> Option<TableRef<'t>> {
        match self.tree.value(self.id) {
            Value::Table(_) => Some(TableRef {
                tree: self.tree,
                id: self.id,
            }),
            _ => None,
        }
    }

    pub fn as_array(&self) -> Option<ArrayRef<'t>> {
        match self.tree.value(self.id) {
            Value::Array(_) => Some(ArrayRef {
                tree: self.tree,
                id: self.id,
            }),
            _ => None,
        }
    }

    pub fn table_kind(&self) -> Option<TableKind> {
        match self.shape() {
            Shape::Table(kind) => Some(kind),
            _ => None,
        }
    }

    pub fn array_kind(&self) -> Option<ArrayKind> {
        match self.shape() {
            Shape::Array(kind) => Some(kind),
            _ => None,
        }
    }
}

impl fmt::Debug for Item<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.tree.value(self.id) {
            Value::String(s) => fmt::Debug::fmt(s, f),
            Value::Integer(i) => fmt::Debug::fmt(&i.value, f),
            Value::Float(v) => fmt::Debug::fmt(v, f),
            Value::Boolean(b) => fmt::Debug::fmt(b, f),
            Value::Datetime(d) => write!(f, "{d}"),
            Value::Table(_) => fmt::Debug::fmt(
                &TableRef {
                    tree: self.tree,
                    id: self.id,
                },
                f,
            ),
            Value::Array(_) => fmt::Debug::fmt(
                &ArrayRef {
                    tree: self.tree,
                    id: self.id,
                },
                f,
            ),
        }
    }
}

/// A borrowed table.
#[derive(Clone, Copy)]
pub struct TableRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> TableRef<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn span(&self) -> Span {
        self.tree.span(self.id)
    }

    pub fn kind(&self) -> TableKind {
        match self.tree.shape(self.id) {
            Shape::Table(kind) => kind,
            _ => TableKind::Explicit,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.entries(self.id).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, name: &str) -> Option<Item<'t>> {
        self.get_key_value(name).map(|(_, item)| item)
    }

    pub fn get_key_value(&self, name: &str) -> Option<(&'t Key, Item<'t>)> {
        let (key, id) = self.tree.lookup(self.id, name)?;
        Some((
            key,
            Item {
                tree: self.tree,
                id,
            },
        ))
    }

    pub fn contains_key(&self, name: &str) -> bool {
        self.tree.lookup(self.id, name).is_some()
    }

    /// Follows `path` through nested tables.
    ///
    /// ```
    /// use toml_lattice::{Config, decode};
    ///
    /// let tree = decode("a.b.c = 1", &Config::default()).unwrap();
    /// let c = tree.root().get_path(&["a", "b", "c"]).unwrap();
    /// assert_eq!(c.as_i64(), Some(1));
    /// assert!(tree.root().get_path(&["a", "c"]).is_none());
    /// ```
    pub fn get_path(&self, path: &[&str]) -> Option<Item<'t>> {
        let (first, rest) = path.split_first()?;
        let mut item = self.get(first)?;
        for name in rest {
            item = item.as_table()?.get(name)?;
        }
        Some(item)
    }

    /// Entries in insertion order.
    pub fn iter(&self) -> impl ExactSizeIterator<Item = (&'t Key, Item<'t>)> + 't {
        let tree = self.tree;
        tree.entries(self.id)
            .iter()
            .map(move |(key, id)| (key, Item { tree, id: *id }))
    }

    pub fn keys(&self) -> impl ExactSizeIterator<Item = &'t str> + 't {
        self.tree
            .entries(self.id)
            .iter()
            .map(|(key, _)| key.name.as_str())
    }

    pub fn as_item(&self) -> Item<'t> {
        Item {
            tree: self.tree,
            id: self.id,
        }
    }
}

impl fmt::Debug for TableRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map()
            .entries(self.iter().map(|(k, v)| (k.name.as_str(), v)))
            .finish()
    }
}

/// A borrowed array.
#[derive(Clone, Copy)]
pub struct ArrayRef<'t> {
    tree: &'t Tree,
    id: NodeId,
}

impl<'t> ArrayRef<'t> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn span(&self) -> Span {
        self.tree.span(self.id)
    }

    pub fn kind(&self) -> ArrayKind {
        match self.tree.shape(self.id) {
            Shape::Array(kind) => kind,
            _ => ArrayKind::Regular,
        }
    }

    pub fn len(&self) -> usize {
        self.tree.elements(self.id).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn get(&self, index: usize) -> Option<Item<'t>> {
        let id = *self.tree.elements(self.id).get(index)?;
        Some(Item {
            tree: self.tree,
            id,
        })
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = Item<'t>> + 't {
        let tree = self.tree;
        tree.elements(self.id)
            .iter()
            .map(move |id| Item { tree, id: *id })
    }

    pub fn as_item(&self) -> Item<'t> {
        Item {
            tree: self.tree,
            id: self.id,
        }
    }
}

impl fmt::Debug for ArrayRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list().entries(self.iter()).finish()
    }
}

// -- structural equality ----------------------------------------------------

impl PartialEq for Tree {
    /// Compares values and entry order. Spans and shapes are ignored and
    /// NaN equals NaN.
    fn eq(&self, other: &Self) -> bool {
        same_node(self, NodeId::ROOT, other, NodeId::ROOT)
    }
}

fn same_node(a: &Tree, a_id: NodeId, b: &Tree, b_id: NodeId) -> bool {
    let mut pending = vec![(a_id, b_id)];
    while let Some((x_id, y_id)) = pending.pop() {
        let same = match (a.value(x_id), b.value(y_id)) {
            (Value::String(x), Value::String(y)) => x == y,
            (Value::Integer(x), Value::Integer(y)) => x.value == y.value,
            (Value::Float(x), Value::Float(y)) => x == y || (x.is_nan() && y.is_nan()),
            (Value::Boolean(x), Value::Boolean(y)) => x == y,
            (Value::Datetime(x), Value::Datetime(y)) => same_datetime(x, y),
            (Value::Table(x), Value::Table(y)) => {
                if x.entries.len() != y.entries.len() {
                    return false;
                }
                for ((xk, xv), (yk, yv)) in x.entries.iter().zip(&y.entries) {
                    if xk.name != yk.name {
                        return false;
                    }
                    pending.push((*xv, *yv));
                }
                true
            }
            (Value::Array(x), Value::Array(y)) => {
                if x.len() != y.len() {
                    return false;
                }
                pending.extend(x.iter().copied().zip(y.iter().copied()));
                true
            }
            _ => false,
        };
        if !same {
            return false;
        }
    }
    true
}

/// Equal when the canonical text is equal; whether seconds were written
/// out does not matter.
fn same_datetime(x: &Datetime, y: &Datetime) -> bool {
    let time_eq = match (&x.time, &y.time) {
        (Some(a), Some(b)) => {
            (a.hour, a.minute, a.second, a.nanosecond, a.subsecond_precision())
                == (b.hour, b.minute, b.second, b.nanosecond, b.subsecond_precision())
        }
        (None, None) => true,
        _ => false,
    };
    time_eq && x.date == y.date && x.offset == y.offset
}
