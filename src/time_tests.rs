use super::*;

#[track_caller]
fn parse(input: &str) -> Datetime {
    match input.parse::<Datetime>() {
        Ok(dt) => dt,
        Err(e) => panic!("failed to parse {input:?}: {e}"),
    }
}

#[track_caller]
fn roundtrip(input: &str) {
    assert_eq!(parse(input).to_string(), input, "roundtrip mismatch for {input:?}");
}

#[track_caller]
fn roundtrip_lossy(input: &str, expected: &str) {
    assert_eq!(parse(input).to_string(), expected, "roundtrip mismatch for {input:?}");
}

#[track_caller]
fn expect_fatal(input: &str, reason: &str) {
    match input.parse::<Datetime>() {
        Err(Error {
            kind: ErrorKind::InvalidDatetime(r),
            ..
        }) => assert_eq!(r, reason, "wrong reason for {input:?}"),
        other => panic!("expected a fatal error for {input:?}, got {other:?}"),
    }
}

#[test]
fn roundtrips() {
    let exact = &[
        "1979-05-27T07:32:00Z",
        "1979-05-27T07:32:00+00:00",
        "1979-05-27T00:32:00-23:00",
        "2000-12-17T00:32:00.5-07:00",
        "1979-05-27T00:32:00.999999+21:20",
        "1979-05-27T07:32:00",
        "1979-05-27T07:32:00.123456789",
        "2023-01-01T00:00:00.001",
        "2023-01-01T00:00:00.000000000",
        "2023-01-01T00:00:00.10",
        "1979-05-27",
        "0000-01-01",
        "9999-12-31",
        "07:32:00",
        "00:32:00.999999",
        "23:59:59",
    ];
    for input in exact {
        roundtrip(input);
    }

    let lossy: &[(&str, &str)] = &[
        ("1979-05-27 07:32:00Z", "1979-05-27T07:32:00Z"),
        ("1987-07-05t17:45:00z", "1987-07-05T17:45:00Z"),
        ("2024-02-29 12:00+05:30", "2024-02-29T12:00:00+05:30"),
        ("1979-05-27T07:32", "1979-05-27T07:32:00"),
        ("12:30", "12:30:00"),
        ("1979-05-27T07:32:00.1234567891", "1979-05-27T07:32:00.123456789"),
        ("1979-05-27T07:32:00-00:00", "1979-05-27T07:32:00+00:00"),
    ];
    for (input, expected) in lossy {
        roundtrip_lossy(input, expected);
    }
}

#[test]
fn kinds() {
    let cases = [
        ("1979-05-27T07:32:00Z", DatetimeKind::OffsetDateTime),
        ("1979-05-27T07:32:00", DatetimeKind::LocalDateTime),
        ("1979-05-27", DatetimeKind::LocalDate),
        ("07:32:00", DatetimeKind::LocalTime),
    ];
    for (input, kind) in cases {
        assert_eq!(parse(input).kind(), kind, "input: {input}");
    }
}

#[test]
fn fields() {
    let dt = parse("2000-12-17T00:32:00.5-07:00");
    assert_eq!(
        dt.date,
        Some(Date {
            year: 2000,
            month: 12,
            day: 17
        })
    );
    let time = dt.time.unwrap();
    assert_eq!((time.hour, time.minute, time.second), (0, 32, 0));
    assert_eq!(time.nanosecond, 500_000_000);
    assert_eq!(time.subsecond_precision(), 1);
    assert!(time.has_seconds());
    assert_eq!(dt.offset, Some(Offset::Custom { minutes: -420 }));

    assert!(!parse("07:32").time.unwrap().has_seconds());
}

#[test]
fn calendar_validation_is_fatal() {
    expect_fatal("2023-13-01", "month out of range");
    expect_fatal("2023-00-01", "month out of range");
    expect_fatal("2023-04-31", "day out of range");
    expect_fatal("2023-02-29", "day out of range");
    expect_fatal("2023-01-00", "day out of range");
    parse("2024-02-29");
    parse("2000-02-29");
    expect_fatal("1900-02-29", "day out of range");
}

#[test]
fn time_validation() {
    expect_fatal("12:60:00", "minute out of range");
    expect_fatal("12:30:60", "second out of range");
    expect_fatal("12:30:00.", "empty fraction");
    expect_fatal("1979-05-27T07:32:00+24:00", "offset hour out of range");
    expect_fatal("1979-05-27T07:32:00+01:60", "offset minute out of range");
    // an hour past 23 is a shape mismatch, not a fatal error
    assert!(matches!(
        "24:00:00".parse::<Datetime>(),
        Err(Error {
            kind: ErrorKind::InvalidDatetime("unrecognized shape"),
            ..
        })
    ));
}

#[test]
fn seconds_are_required_in_toml_1_0() {
    let mut cur = Cursor::new("07:32");
    assert!(matches!(
        try_time(&mut cur, Version::V1_0),
        Err(Error {
            kind: ErrorKind::InvalidDatetime("missing seconds"),
            ..
        })
    ));

    let mut cur = Cursor::new("07:32");
    assert!(try_time(&mut cur, Version::V1_1).unwrap().is_some());

    // a short time must still end where a value may end
    let mut cur = Cursor::new("07:32x");
    assert!(try_time(&mut cur, Version::V1_1).is_err());
}

#[test]
fn shape_mismatch_rewinds() {
    let cases = ["1979", "1979-05", "12:3", "abc", "+1", "1979-05-27X"];
    for input in cases {
        let mut cur = Cursor::new(input);
        let got = try_offset_datetime(&mut cur, Version::V1_0).unwrap();
        assert!(got.is_none(), "input: {input}");
        assert_eq!(cur.pos(), 0, "input: {input}");
        assert_eq!(cur.pin_depth(), 0, "input: {input}");
    }
}

#[test]
fn variants_consume_only_their_text() {
    let mut cur = Cursor::new("1979-05-27T07:32:00 # comment");
    assert!(try_offset_datetime(&mut cur, Version::V1_0).unwrap().is_none());
    assert_eq!(cur.pos(), 0);
    let dt = try_local_datetime(&mut cur, Version::V1_0).unwrap().unwrap();
    assert_eq!(dt.kind(), DatetimeKind::LocalDateTime);
    assert_eq!(cur.pos(), 19);

    // a space followed by a non-digit does not join a time
    let mut cur = Cursor::new("1979-05-27 x");
    assert!(try_local_datetime(&mut cur, Version::V1_0).unwrap().is_none());
    assert!(try_local_date(&mut cur).unwrap().is_some());
    assert_eq!(cur.pos(), 10);
}

#[test]
fn trailing_text_is_rejected_by_from_str() {
    assert!(matches!(
        "1979-05-27 junk".parse::<Datetime>(),
        Err(Error {
            kind: ErrorKind::Wanted { .. },
            ..
        })
    ));
}

#[test]
fn leap_years() {
    assert!(is_leap_year(2000));
    assert!(is_leap_year(2024));
    assert!(!is_leap_year(1900));
    assert!(!is_leap_year(2023));
    assert_eq!(days_in_month(2024, 2), 29);
    assert_eq!(days_in_month(2023, 2), 28);
    assert_eq!(days_in_month(2023, 11), 30);
}

#[test]
fn constructed_time_precision() {
    assert_eq!(Time::new(1, 2, 3, 0).to_string(), "01:02:03");
    assert_eq!(Time::new(1, 2, 3, 500_000_000).to_string(), "01:02:03.5");
    assert_eq!(Time::new(1, 2, 3, 1).to_string(), "01:02:03.000000001");
}

#[test]
fn randomized_roundtrip_full_datetime() {
    let mut rng = oorandom::Rand32::new(3);
    for _ in 0..5000 {
        let year = (rng.rand_u32() % 10000) as u16;
        let month = (rng.rand_u32() % 12) as u8 + 1;
        let max_day = days_in_month(year, month);
        let day = (rng.rand_u32() % max_day as u32) as u8 + 1;
        let hour = (rng.rand_u32() % 24) as u8;
        let minute = (rng.rand_u32() % 60) as u8;

        let mut s = format!("{year:04}-{month:02}-{day:02}T{hour:02}:{minute:02}");
        let mut expected = s.clone();

        if rng.rand_u32() % 2 == 0 {
            let second = (rng.rand_u32() % 60) as u8;
            let sec_str = format!(":{second:02}");
            s += &sec_str;
            expected += &sec_str;
            let digit_count = rng.rand_u32() % 10;
            if digit_count > 0 {
                let frac = rng.rand_u32() % 10u32.pow(digit_count);
                let frac_str = format!(".{frac:0>width$}", width = digit_count as usize);
                s += &frac_str;
                expected += &frac_str;
            }
        } else {
            expected += ":00";
        }

        match rng.rand_u32() % 3 {
            0 => {}
            1 => {
                s += "Z";
                expected += "Z";
            }
            _ => {
                let sign = if rng.rand_u32() % 2 == 0 { '+' } else { '-' };
                let oh = (rng.rand_u32() % 24) as u8;
                let om = (rng.rand_u32() % 60) as u8;
                if oh == 0 && om == 0 {
                    s += "+00:00";
                    expected += "+00:00";
                } else {
                    let off_str = format!("{sign}{oh:02}:{om:02}");
                    s += &off_str;
                    expected += &off_str;
                }
            }
        }

        roundtrip_lossy(&s, &expected);
    }
}

#[test]
fn randomized_mutations_never_leak_pins() {
    const ALPHABET: &[u8] = b"0123456789-:T .Zz+x";
    let mut rng = oorandom::Rand32::new(0xdeadbeaf);
    let valid = b"2023-06-15T12:30:45.123+05:30";
    for _ in 0..5000 {
        let mut mutated = *valid;
        let pos = rng.rand_u32() as usize % mutated.len();
        mutated[pos] = ALPHABET[rng.rand_u32() as usize % ALPHABET.len()];
        let Ok(text) = std::str::from_utf8(&mutated) else {
            continue;
        };
        for version in [Version::V1_0, Version::V1_1] {
            let mut cur = Cursor::new(text);
            let _ = try_offset_datetime(&mut cur, version);
            assert_eq!(cur.pin_depth(), 0, "pin leaked for {text:?}");
        }
    }
}
