use super::*;

#[test]
fn span_basics_and_conversions() {
    let s = Span::new(10, 20);
    assert_eq!(s.start, 10);
    assert_eq!(s.end, 20);
    assert_eq!(s.len(), 10);

    assert!(Span::new(0, 0).is_empty());
    assert!(!Span::new(0, 1).is_empty());

    // inverted spans never report a negative length
    assert_eq!(Span::new(5, 1).len(), 0);

    let t: (u32, u32) = Span::new(5, 10).into();
    assert_eq!(t, (5, 10));

    let t: (usize, usize) = Span::new(5, 10).into();
    assert_eq!(t, (5, 10));

    let s: Span = (3u32..7u32).into();
    assert_eq!(s, Span::new(3, 7));

    let r: std::ops::Range<usize> = Span::new(3, 7).into();
    assert_eq!(r, 3usize..7usize);

    assert_eq!(Span::at(4, 9), Span::new(4, 9));
}

#[test]
fn join_covers_both() {
    let cases = [
        ((0, 3), (5, 9), (0, 9)),
        ((5, 9), (0, 3), (0, 9)),
        ((2, 8), (3, 4), (2, 8)),
    ];
    for (a, b, expected) in cases {
        let joined = Span::new(a.0, a.1).join(Span::new(b.0, b.1));
        assert_eq!(joined, Span::new(expected.0, expected.1), "{a:?} + {b:?}");
    }
}
