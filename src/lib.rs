//! A TOML decoder and encoder that remembers how every table was defined.
//!
//! [`decode`] turns text into a [`Tree`]. Next to the plain values, the tree
//! records for each table whether it came from a `[header]`, a dotted key, an
//! inline `{ ... }` or was created implicitly as a parent, and for each array
//! whether it was written inline or built from `[[header]]` sections. Those
//! shapes drive the redefinition rules while decoding and let [`encode`]
//! write the document back out in the same layout.
//!
//! # Examples
//!
//! ```
//! use toml_lattice::{ArrayKind, Config, Error, decode, encode};
//!
//! let content = r#"
//! dev-mode = true
//! ports = [0x1F90, 8081]
//!
//! [[things]]
//! name = "hammer"
//! value = 43
//!
//! [[things]]
//! name = "drill"
//! color.name = "green"
//! "#;
//!
//! let config = Config::default();
//! let tree = decode(content, &config)?;
//! let root = tree.root();
//!
//! let things = root.get("things").unwrap();
//! assert_eq!(things.array_kind(), Some(ArrayKind::ArrayOfTables));
//! let drill = things.as_array().unwrap().get(1).unwrap();
//! assert_eq!(
//!     drill.as_table().unwrap().get_path(&["color", "name"]).unwrap().as_str(),
//!     Some("green")
//! );
//!
//! let text = encode(&tree, &config);
//! assert!(text.starts_with("dev-mode = true\nports = [0x1F90, 8081]\n"));
//! assert!(text.contains("color.name = 'green'"));
//! assert_eq!(decode(&text, &config)?, tree);
//! # Ok::<(), Error>(())
//! ```

mod assemble;
mod config;
mod cursor;
mod encode;
mod error;
mod number;
mod span;
mod string;
mod time;
mod token;
mod tokenizer;
mod tree;
mod warning;

#[cfg(feature = "serde")]
pub mod impl_serde;

pub use config::{Config, DEFAULT_MAX_DEPTH, EncodeStyle, Version};
pub use error::{Error, ErrorClass, ErrorKind, Snippet};
pub use number::{Base, Integer};
pub use span::Span;
pub use time::{Date, Datetime, DatetimeKind, Offset, Time};
pub use token::{Context, Payload, Symbol, Token};
pub use tokenizer::tokenize;
pub use tree::{
    ArrayKind, ArrayRef, Item, Key, NewValue, NodeId, Shape, TableKind, TableRef, Tree, ValueKind,
};
pub use warning::{LogSink, Warning, WarningKind, WarningSet, WarningSink};

use warning::Warnings;

/// Decodes `text`, sending warnings to the [`log`] facade through
/// [`LogSink`].
pub fn decode(text: &str, config: &Config) -> Result<Tree, Error> {
    decode_with(text, config, &mut LogSink)
}

/// Decodes `text`, sending warnings to `sink`.
///
/// Warnings never affect the result, and each enabled [`WarningKind`] is
/// delivered at most once per call.
///
/// ```
/// use toml_lattice::{Config, Warning, WarningKind, decode_with};
///
/// let mut warnings = Vec::new();
/// let tree = decode_with(
///     "[a]\n[a.b]\nx = 1\n",
///     &Config::default(),
///     &mut |w: Warning| warnings.push(w),
/// )
/// .unwrap();
/// assert_eq!(tree.root().get_path(&["a", "b", "x"]).unwrap().as_i64(), Some(1));
/// assert_eq!(warnings.len(), 1);
/// assert_eq!(warnings[0].kind, WarningKind::UnnecessaryExplicitSupertable);
/// assert_eq!(warnings[0].table.as_deref(), Some("a"));
/// ```
pub fn decode_with(
    text: &str,
    config: &Config,
    sink: &mut dyn WarningSink,
) -> Result<Tree, Error> {
    tokenizer::check_size(text)?;
    let mut warnings = Warnings::new(text, config.warnings, sink);
    let tokens = tokenizer::tokenize_with(text, config, &mut warnings)?;
    let token_count = tokens.len();
    let tree = assemble::assemble(tokens, config.max_depth, &mut warnings)
        .map_err(|e| e.locate(text))?;
    log::trace!(
        target: "toml_lattice",
        "decoded {} bytes: {} tokens, {} nodes",
        text.len(),
        token_count,
        tree.node_count()
    );
    Ok(tree)
}

/// Writes `tree` as TOML text using `config.style`.
pub fn encode(tree: &Tree, config: &Config) -> String {
    encode::encode(tree, config.style)
}
