#![allow(missing_docs)]

use codespan_reporting::diagnostic::{Diagnostic, Label};
use toml_lattice::{Config, Error, Item, Tree, ValueKind, Warning};

/// Decodes an inline document and asserts its JSON view against an inline
/// snapshot.
#[macro_export]
macro_rules! valid {
    ($name:ident, $toml:literal, @$snapshot:literal) => {
        #[test]
        fn $name() {
            let tree = $crate::decode_or_panic(stringify!($name), $toml);
            insta::assert_json_snapshot!(tree, @$snapshot);
        }
    };
}

/// Asserts that decoding fails with the given error code, and that the
/// rendered diagnostic carries that code.
#[macro_export]
macro_rules! invalid {
    ($name:ident, $toml:literal, $code:literal) => {
        #[test]
        fn $name() {
            let err = $crate::decode_err(stringify!($name), $toml);
            assert_eq!(err.kind.to_string(), $code);
            let file = $crate::File::new(stringify!($name), $toml);
            let rendered = $crate::emit_diags(&file, [err.to_diagnostic(())]);
            assert!(
                rendered.starts_with(concat!("error[", $code, "]")),
                "{rendered}"
            );
        }
    };
}

/// Asserts that encoding and decoding again yields an equal tree and that
/// a second encode is stable.
#[macro_export]
macro_rules! round_trip {
    ($name:ident, $toml:literal) => {
        #[test]
        fn $name() {
            let config = toml_lattice::Config::default();
            let first = $crate::decode_or_panic(stringify!($name), $toml);
            let text = toml_lattice::encode(&first, &config);
            let second = $crate::decode_or_panic(stringify!($name), &text);
            pretty_assertions::assert_eq!(
                format!("{:#?}", first.root()),
                format!("{:#?}", second.root())
            );
            assert!(first == second, "{text}");
            pretty_assertions::assert_eq!(toml_lattice::encode(&second, &config), text);
        }
    };
}

pub type File<'s> = codespan_reporting::files::SimpleFile<&'static str, &'s str>;

pub fn emit_diags(
    f: &File<'_>,
    error: impl IntoIterator<Item = Diagnostic<()>>,
) -> String {
    let mut output = codespan_reporting::term::termcolor::NoColor::new(Vec::new());

    for diag in error {
        codespan_reporting::term::emit_to_write_style(
            &mut output,
            &codespan_reporting::term::Config::default(),
            f,
            &diag,
        )
        .expect("failed to render diagnostic");
    }

    String::from_utf8(output.into_inner()).unwrap()
}

/// Decodes `toml` with every warning collected, panicking with rendered
/// diagnostics on failure.
pub fn decode_or_panic(name: &'static str, toml: &str) -> Tree {
    match toml_lattice::decode_with(toml, &Config::default(), &mut |_: Warning| {}) {
        Ok(tree) => tree,
        Err(err) => {
            let file = File::new(name, toml);
            let rendered = emit_diags(&file, [err.to_diagnostic(())]);
            panic!("unexpected decode error:\n{rendered}");
        }
    }
}

pub fn decode_err(name: &'static str, toml: &str) -> Error {
    match toml_lattice::decode_with(toml, &Config::default(), &mut |_: Warning| {}) {
        Ok(tree) => panic!("{name}: expected an error, decoded {:?}", tree.root()),
        Err(err) => err,
    }
}

/// Decodes `toml` and returns every warning delivered.
pub fn warnings(config: &Config, toml: &str) -> Vec<Warning> {
    let mut seen = Vec::new();
    toml_lattice::decode_with(toml, config, &mut |w: Warning| seen.push(w))
        .expect("failed to decode");
    seen
}

/// Adds a note labelled with the kind of every node under `val`.
pub fn collect_spans(key: &str, val: Item<'_>, diags: &mut Vec<Diagnostic<()>>) {
    let code = match val.kind() {
        ValueKind::String => "string",
        ValueKind::Integer => "integer",
        ValueKind::Float => "float",
        ValueKind::Boolean => "bool",
        ValueKind::Datetime => "datetime",
        ValueKind::Array => {
            if let Some(arr) = val.as_array() {
                for (i, v) in arr.iter().enumerate() {
                    collect_spans(&format!("{key}_{i}"), v, diags);
                }
            }
            "array"
        }
        ValueKind::Table => {
            if let Some(tab) = val.as_table() {
                for (k, v) in tab.iter() {
                    collect_spans(&format!("{key}_{}", k.name), v, diags);
                }
            }
            "table"
        }
    };

    diags.push(
        Diagnostic::note()
            .with_code(code)
            .with_message(key)
            .with_labels(vec![Label::primary((), val.span())]),
    );
}
