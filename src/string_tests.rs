use super::*;

#[track_caller]
fn basic(input: &str, version: Version) -> Result<Option<String>, Error> {
    try_basic(&mut Cursor::new(input), version)
}

#[track_caller]
fn ml_basic(input: &str) -> String {
    let mut cur = Cursor::new(input);
    match try_multiline_basic(&mut cur, Version::V1_0) {
        Ok(Some(s)) => s,
        other => panic!("{input:?} did not parse: {other:?}"),
    }
}

#[track_caller]
fn ml_literal(input: &str) -> String {
    let mut cur = Cursor::new(input);
    match try_multiline_literal(&mut cur) {
        Ok(Some(s)) => s,
        other => panic!("{input:?} did not parse: {other:?}"),
    }
}

#[track_caller]
fn err_kind(result: Result<Option<String>, Error>) -> ErrorKind {
    match result {
        Err(e) => e.kind,
        Ok(v) => panic!("expected an error, got {v:?}"),
    }
}

#[test]
fn basic_strings() {
    let cases = [
        (r#""""#, ""),
        (r#""hello""#, "hello"),
        (r#""tab\there""#, "tab\there"),
        (r#""quote \" and \\""#, "quote \" and \\"),
        (r#""\b\f\n\r""#, "\u{8}\u{c}\n\r"),
        (r#""\u00e9\U0001F600""#, "é😀"),
        ("\"raw\ttab\"", "raw\ttab"),
    ];
    for (input, expected) in cases {
        assert_eq!(
            basic(input, Version::V1_0).ok().flatten().as_deref(),
            Some(expected),
            "input: {input}"
        );
    }
}

#[test]
fn basic_consumes_only_the_string() {
    let mut cur = Cursor::new("\"ab\" # rest");
    assert_eq!(try_basic(&mut cur, Version::V1_0).ok().flatten().as_deref(), Some("ab"));
    assert_eq!(cur.pos(), 4);
}

#[test]
fn non_matching_openers_consume_nothing() {
    let mut cur = Cursor::new("abc");
    assert!(matches!(try_basic(&mut cur, Version::V1_0), Ok(None)));
    assert!(matches!(try_literal(&mut cur), Ok(None)));
    assert!(matches!(try_multiline_basic(&mut cur, Version::V1_0), Ok(None)));
    assert!(matches!(try_multiline_literal(&mut cur), Ok(None)));
    assert_eq!(cur.pos(), 0);

    let mut cur = Cursor::new("\"\"\"x\"\"\"");
    assert!(matches!(try_basic(&mut cur, Version::V1_0), Ok(None)));
    assert_eq!(cur.pos(), 0);
}

#[test]
fn escapes_by_version() {
    assert_eq!(
        basic(r#""\e\x41""#, Version::V1_1).ok().flatten().as_deref(),
        Some("\u{1b}A")
    );
    assert_eq!(
        err_kind(basic(r#""\e""#, Version::V1_0)),
        ErrorKind::InvalidEscape('e')
    );
    assert_eq!(
        err_kind(basic(r#""\x41""#, Version::V1_0)),
        ErrorKind::InvalidEscape('x')
    );
}

#[test]
fn bad_escapes() {
    assert_eq!(
        err_kind(basic(r#""\q""#, Version::V1_0)),
        ErrorKind::InvalidEscape('q')
    );
    assert_eq!(
        err_kind(basic(r#""\u12G4""#, Version::V1_0)),
        ErrorKind::InvalidHexEscape('G')
    );
    assert_eq!(
        err_kind(basic(r#""\uD800""#, Version::V1_0)),
        ErrorKind::InvalidEscapeValue(0xD800)
    );
    assert_eq!(
        err_kind(basic(r#""\U00110000""#, Version::V1_0)),
        ErrorKind::InvalidEscapeValue(0x110000)
    );
}

#[test]
fn escape_error_spans_cover_the_escape() {
    let Err(e) = basic(r#""ab\qz""#, Version::V1_0) else {
        panic!("expected an error");
    };
    assert_eq!(e.span, crate::Span::new(3, 5));
}

#[test]
fn control_characters_rejected() {
    assert_eq!(
        err_kind(basic("\"a\nb\"", Version::V1_0)),
        ErrorKind::InvalidCharInString('\n')
    );
    assert_eq!(
        err_kind(basic("\"a\u{7f}\"", Version::V1_0)),
        ErrorKind::InvalidCharInString('\u{7f}')
    );
    assert_eq!(
        err_kind(try_literal(&mut Cursor::new("'a\u{0}'"))),
        ErrorKind::InvalidCharInString('\u{0}')
    );
    assert_eq!(
        err_kind(try_multiline_basic(&mut Cursor::new("\"\"\"a\rb\"\"\""), Version::V1_0)),
        ErrorKind::InvalidCharInString('\r')
    );
}

#[test]
fn unterminated() {
    assert_eq!(
        err_kind(basic("\"abc", Version::V1_0)),
        ErrorKind::UnterminatedString
    );
    assert_eq!(
        err_kind(try_literal(&mut Cursor::new("'abc"))),
        ErrorKind::UnterminatedString
    );
    assert_eq!(
        err_kind(try_multiline_literal(&mut Cursor::new("'''abc''"))),
        ErrorKind::UnterminatedString
    );

    let mut cur = Cursor::new("x = \"abc");
    cur.advance(4);
    let Err(e) = try_basic(&mut cur, Version::V1_0) else {
        panic!("expected an error");
    };
    assert_eq!(e.span.start, 4);
}

#[test]
fn literal_strings_are_verbatim() {
    let mut cur = Cursor::new(r"'C:\Users\nobody'");
    assert_eq!(
        try_literal(&mut cur).ok().flatten().as_deref(),
        Some(r"C:\Users\nobody")
    );
}

#[test]
fn multiline_basic() {
    assert_eq!(ml_basic("\"\"\"\nline one\nline two\"\"\""), "line one\nline two");
    assert_eq!(ml_basic("\"\"\"\r\nwin\r\n\"\"\""), "win\r\n");
    assert_eq!(ml_basic("\"\"\"a \"\" b\"\"\""), "a \"\" b");
    assert_eq!(
        ml_basic("\"\"\"The quick \\\n\n   brown \\   \n  fox\"\"\""),
        "The quick brown fox"
    );
}

#[test]
fn multiline_closing_runs() {
    assert_eq!(ml_basic("\"\"\"x\"\"\"\""), "x\"");
    assert_eq!(ml_basic("\"\"\"x\"\"\"\"\""), "x\"\"");
    assert_eq!(ml_literal("'''x''''"), "x'");
    assert_eq!(ml_literal("'''x'''''"), "x''");

    let mut cur = Cursor::new("'''x''''''");
    assert_eq!(try_multiline_literal(&mut cur).ok().flatten().as_deref(), Some("x''"));
    assert_eq!(cur.pos(), 9);
}

#[test]
fn multiline_literal_keeps_backslashes() {
    assert_eq!(ml_literal("'''\n\\n is not \\t'''"), "\\n is not \\t");
}

#[test]
fn line_ending_backslash_needs_a_newline() {
    assert_eq!(
        err_kind(try_multiline_basic(
            &mut Cursor::new("\"\"\"a \\  b\"\"\""),
            Version::V1_0
        )),
        ErrorKind::InvalidEscape(' ')
    );
}
