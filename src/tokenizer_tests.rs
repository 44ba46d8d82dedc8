use super::*;
use crate::warning::Warning;

#[track_caller]
fn symbols_with(input: &str, version: Version) -> Vec<Symbol> {
    let mut sink = |_: Warning| {};
    match tokenize(input, &Config::new(version), &mut sink) {
        Ok(tokens) => tokens
            .into_iter()
            .map(|t| t.symbol)
            .filter(|s| !matches!(s, Symbol::DocumentStart | Symbol::EndOfDocument))
            .collect(),
        Err(e) => panic!("failed to tokenize {input:?}: {e:?}"),
    }
}

#[track_caller]
fn symbols(input: &str) -> Vec<Symbol> {
    symbols_with(input, Version::V1_0)
}

#[track_caller]
fn fail_with(input: &str, version: Version) -> Error {
    let mut sink = |_: Warning| {};
    match tokenize(input, &Config::new(version), &mut sink) {
        Ok(tokens) => panic!("expected {input:?} to fail, got {tokens:?}"),
        Err(e) => e,
    }
}

#[track_caller]
fn fail(input: &str) -> ErrorKind {
    fail_with(input, Version::V1_0).kind
}

use Symbol::*;

#[test]
fn key_value_lines() {
    assert_eq!(symbols("a = 1"), [BareKey, Equals, Integer]);
    assert_eq!(
        symbols("a.\"b\" . 'c' = true\n"),
        [BareKey, KeySeparator, QuotedKey, KeySeparator, LiteralKey, Equals, Boolean, Newline]
    );
    assert_eq!(
        symbols("# head\n\nx = 1.5 # tail"),
        [Comment, Newline, Newline, BareKey, Equals, Float, Comment]
    );
}

#[test]
fn every_scalar() {
    let cases = [
        ("\"s\"", BasicString),
        ("'s'", LiteralString),
        ("\"\"\"s\"\"\"", MultilineBasicString),
        ("'''s'''", MultilineLiteralString),
        ("true", Boolean),
        ("1979-05-27T07:32:00Z", OffsetDateTime),
        ("1979-05-27T07:32:00", LocalDateTime),
        ("1979-05-27", LocalDate),
        ("07:32:00", LocalTime),
        ("nan", Float),
        ("6.02e23", Float),
        ("0x1F", Integer),
        ("-12", Integer),
    ];
    for (value, symbol) in cases {
        let input = format!("k = {value}");
        assert_eq!(symbols(&input), [BareKey, Equals, symbol], "input: {input}");
    }
}

#[test]
fn payloads() {
    let mut sink = |_: Warning| {};
    let tokens = tokenize("'k' = \"a\\tb\"", &Config::default(), &mut sink).unwrap();
    assert_eq!(tokens[1].text(), Some("k"));
    assert_eq!(tokens[1].span, Span::new(0, 3));
    assert_eq!(tokens[3].text(), Some("a\tb"));
    assert_eq!(tokens[3].span, Span::new(6, 12));

    let tokens = tokenize("n = 0o17", &Config::default(), &mut sink).unwrap();
    assert_eq!(
        tokens[3].payload,
        Payload::Integer(crate::Integer::new(15, crate::Base::Octal))
    );
}

#[test]
fn headers() {
    assert_eq!(symbols("[a]"), [StartTable, BareKey, EndTable]);
    assert_eq!(
        symbols("[ a . \"b c\" ] # x"),
        [StartTable, BareKey, KeySeparator, QuotedKey, EndTable, Comment]
    );
    assert_eq!(
        symbols("[[fruit.variety]]\nname = 'x'"),
        [
            StartArrayTable,
            BareKey,
            KeySeparator,
            BareKey,
            EndArrayTable,
            Newline,
            BareKey,
            Equals,
            LiteralString
        ]
    );
}

#[test]
fn header_errors() {
    assert!(matches!(fail("[a"), ErrorKind::Expected { found: "eof", .. }));
    assert!(matches!(fail("[a]]"), ErrorKind::Expected { .. }));
    assert!(matches!(fail("[[a]"), ErrorKind::Expected { .. }));
    assert!(matches!(fail("[]"), ErrorKind::Expected { .. }));
    assert!(matches!(fail("[a.]"), ErrorKind::Expected { .. }));
    assert_eq!(
        fail("[a\n]"),
        ErrorKind::UnexpectedNewline { after: "bare key" }
    );
    assert_eq!(
        fail("[\na]"),
        ErrorKind::UnexpectedNewline {
            after: "table header"
        }
    );
}

#[test]
fn arrays() {
    assert_eq!(
        symbols("a = [1, [2], {x = 3},]"),
        [
            BareKey,
            Equals,
            StartArray,
            Integer,
            Separator,
            StartArray,
            Integer,
            EndArray,
            Separator,
            StartInlineTable,
            BareKey,
            Equals,
            Integer,
            EndInlineTable,
            Separator,
            EndArray
        ]
    );
    // newlines vanish inside arrays, comments stay as tokens
    assert_eq!(
        symbols("a = [\n  1, # one\n  2\n]\n"),
        [BareKey, Equals, StartArray, Integer, Separator, Comment, Integer, EndArray, Newline]
    );
    assert_eq!(symbols("a = []"), [BareKey, Equals, StartArray, EndArray]);
}

#[test]
fn array_errors() {
    assert!(matches!(fail("a = [1 2]"), ErrorKind::Expected { .. }));
    assert!(matches!(fail("a = [,]"), ErrorKind::Expected { .. }));
    assert!(matches!(fail("a = [1"), ErrorKind::Expected { found: "eof", .. }));
    assert!(matches!(fail("a = ]"), ErrorKind::Expected { .. }));
}

#[test]
fn inline_tables_by_version() {
    assert_eq!(
        symbols("t = {}"),
        [BareKey, Equals, StartInlineTable, EndInlineTable]
    );
    assert_eq!(fail("t = {\n}"), ErrorKind::MultilineInlineTable);
    assert!(matches!(fail("t = {a = 1,}"), ErrorKind::Expected { .. }));
    assert!(matches!(fail("t = {a = 1 # c\n}"), ErrorKind::Expected { .. }));

    assert_eq!(
        symbols_with("t = {\n  a = 1, # c\n  b = 2,\n}", Version::V1_1),
        [
            BareKey,
            Equals,
            StartInlineTable,
            BareKey,
            Equals,
            Integer,
            Separator,
            Comment,
            BareKey,
            Equals,
            Integer,
            Separator,
            EndInlineTable
        ]
    );
}

#[test]
fn multiline_inline_table_warns_once() {
    let mut seen = Vec::new();
    let mut sink = |w: Warning| seen.push(w);
    let config = Config::new(Version::V1_1);
    tokenize("a = {\nx = 1\n}\nb = {\ny = 2\n}", &config, &mut sink).unwrap();
    assert_eq!(seen.len(), 1);
    assert_eq!(seen[0].kind, WarningKind::MultilineInlineTable);
    assert_eq!(seen[0].span, Span::new(5, 6));
    assert_eq!(seen[0].line_info, Some((0, 5)));
}

#[test]
fn disabled_warnings_are_not_delivered() {
    let mut count = 0;
    let mut sink = |_: Warning| count += 1;
    let config = Config::new(Version::V1_1).without_warning(WarningKind::MultilineInlineTable);
    tokenize("a = {\nx = 1\n}", &config, &mut sink).unwrap();
    assert_eq!(count, 0);
}

#[test]
fn negative_nan_warns() {
    let mut seen = Vec::new();
    let mut sink = |w: Warning| seen.push(w.kind);
    tokenize("a = -nan\nb = -nan", &Config::default(), &mut sink).unwrap();
    assert_eq!(seen, [WarningKind::NegativeNan]);
}

#[test]
fn newline_after_partial_line() {
    let cases = [
        ("a\n= 1", "bare key"),
        ("a.\nb = 1", "key separator"),
        ("a =\n1", "equals sign"),
        ("\"a\"\n= 1", "quoted key"),
    ];
    for (input, after) in cases {
        assert_eq!(
            fail(input),
            ErrorKind::UnexpectedNewline { after },
            "input: {input:?}"
        );
    }
}

#[test]
fn expected_lists_legal_tokens() {
    let err = fail_with("a = 1 b = 2", Version::V1_0);
    assert_eq!(err.span, Span::new(6, 7));
    assert_eq!(err.line_info, Some((0, 6)));
    assert_eq!(
        err.to_string(),
        "expected one of [comment, end of document, newline], found an identifier"
    );

    let err = fail("= 1");
    let ErrorKind::Expected { expected, found } = err else {
        panic!("wrong error kind");
    };
    assert_eq!(found, "an equals");
    assert_eq!(expected.first(), Some(&"comment"));
    assert!(expected.contains(&"bare key"));
}

#[test]
fn keys_cannot_be_multiline_strings() {
    assert_eq!(fail("\"\"\"a\"\"\" = 1"), ErrorKind::MultilineStringKey);
    assert_eq!(fail("'''a''' = 1"), ErrorKind::MultilineStringKey);
}

#[test]
fn comments_reject_control_characters() {
    assert_eq!(fail("# a\u{1}b"), ErrorKind::InvalidCharInComment('\u{1}'));
    assert_eq!(fail("# a\rb"), ErrorKind::InvalidCharInComment('\r'));
    assert_eq!(symbols("# tab\there\r\n"), [Comment, Newline]);
}

#[test]
fn nesting_limit() {
    let config = Config::default().with_max_depth(3);
    let mut sink = |_: Warning| {};
    assert!(tokenize("a = [[[1]]]", &config, &mut sink).is_ok());
    let err = tokenize("a = [[[[1]]]]", &config, &mut sink).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NestingTooDeep(3));
    assert_eq!(err.span, Span::new(7, 8));
    let err = tokenize("a = [{b = [{}]}]", &config, &mut sink).unwrap_err();
    assert_eq!(err.kind, ErrorKind::NestingTooDeep(3));
}

#[test]
fn value_errors_propagate() {
    assert_eq!(fail("a = 012"), ErrorKind::InvalidNumber("leading zeros are not allowed"));
    assert_eq!(fail("a = 1979-13-01"), ErrorKind::InvalidDatetime("month out of range"));
    assert_eq!(fail("a = \"\\q\""), ErrorKind::InvalidEscape('q'));
}

#[test]
fn empty_documents() {
    assert!(symbols("").is_empty());
    assert_eq!(symbols("  \n\t\n"), [Newline, Newline]);
}
