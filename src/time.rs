//! RFC 3339 date and time literals.

use std::fmt;
use std::str::FromStr;

use crate::Version;
use crate::cursor::Cursor;
use crate::error::{Error, ErrorKind};

#[cfg(test)]
#[path = "./time_tests.rs"]
mod tests;

/// A calendar date. Always valid for the proleptic Gregorian calendar.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Date {
    pub year: u16,
    pub month: u8,
    pub day: u8,
}

/// A time of day.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Time {
    pub hour: u8,
    pub minute: u8,
    pub second: u8,
    pub nanosecond: u32,
    precision: u8,
    has_seconds: bool,
}

impl Time {
    /// Creates a time whose fraction is written with as many digits as
    /// `nanosecond` needs.
    pub fn new(hour: u8, minute: u8, second: u8, nanosecond: u32) -> Self {
        let mut precision = 0;
        if nanosecond != 0 {
            precision = 9;
            let mut n = nanosecond;
            while n % 10 == 0 {
                n /= 10;
                precision -= 1;
            }
        }
        Time {
            hour,
            minute,
            second,
            nanosecond,
            precision,
            has_seconds: true,
        }
    }

    /// Number of fraction digits in the source text, zero if none.
    pub fn subsecond_precision(&self) -> u8 {
        self.precision
    }

    /// Whether the seconds field was written out, or defaulted to zero.
    pub fn has_seconds(&self) -> bool {
        self.has_seconds
    }
}

/// A UTC offset.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Offset {
    /// `Z`, UTC.
    Z,
    /// `+HH:MM` or `-HH:MM`, as signed minutes.
    Custom { minutes: i16 },
}

/// The four RFC 3339 variants TOML admits.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum DatetimeKind {
    OffsetDateTime,
    LocalDateTime,
    LocalDate,
    LocalTime,
}

/// A date, a time, or both, optionally with an offset.
///
/// The canonical text produced by `Display` always uses `T` as separator
/// and always writes seconds:
///
/// ```
/// use toml_lattice::Datetime;
///
/// let dt: Datetime = "1979-05-27 07:32Z".parse().unwrap();
/// assert_eq!(dt.to_string(), "1979-05-27T07:32:00Z");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Datetime {
    pub date: Option<Date>,
    pub time: Option<Time>,
    pub offset: Option<Offset>,
}

impl Datetime {
    pub fn kind(&self) -> DatetimeKind {
        match (self.date.is_some(), self.time.is_some(), self.offset.is_some()) {
            (true, true, true) => DatetimeKind::OffsetDateTime,
            (true, true, false) => DatetimeKind::LocalDateTime,
            (true, false, _) => DatetimeKind::LocalDate,
            (false, _, _) => DatetimeKind::LocalTime,
        }
    }
}

pub(crate) fn is_leap_year(year: u16) -> bool {
    (year % 4 == 0 && year % 100 != 0) || year % 400 == 0
}

pub(crate) fn days_in_month(year: u16, month: u8) -> u8 {
    const DAYS: [u8; 13] = [0, 31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];
    if month == 2 && is_leap_year(year) {
        29
    } else {
        DAYS.get(month as usize).copied().unwrap_or(0)
    }
}

// -- parsing ----------------------------------------------------------------

/// Reads exactly `n` ASCII digits.
fn digits(cur: &mut Cursor<'_>, n: usize) -> Option<u32> {
    let mut value = 0;
    for i in 0..n {
        match cur.peek_at(i) {
            Some(b @ b'0'..=b'9') => value = value * 10 + (b - b'0') as u32,
            _ => return None,
        }
    }
    cur.advance(n);
    Some(value)
}

/// `YYYY-MM-DD`. A well-shaped date outside the calendar is fatal.
pub(crate) fn try_date(cur: &mut Cursor<'_>) -> Result<Option<Date>, Error> {
    cur.attempt(|cur| {
        let start = cur.pos();
        let Some(year) = digits(cur, 4) else {
            return Ok(None);
        };
        if !cur.eat(b'-') {
            return Ok(None);
        }
        let Some(month) = digits(cur, 2) else {
            return Ok(None);
        };
        if !cur.eat(b'-') {
            return Ok(None);
        }
        let Some(day) = digits(cur, 2) else {
            return Ok(None);
        };
        let (year, month, day) = (year as u16, month as u8, day as u8);
        if !(1..=12).contains(&month) {
            return Err(invalid(cur, start, "month out of range"));
        }
        if day == 0 || day > days_in_month(year, month) {
            return Err(invalid(cur, start, "day out of range"));
        }
        Ok(Some(Date { year, month, day }))
    })
}

/// `HH:MM:SS[.fraction]`, with `HH:MM` accepted under TOML 1.1 when an
/// offset or the end of the value follows.
pub(crate) fn try_time(cur: &mut Cursor<'_>, version: Version) -> Result<Option<Time>, Error> {
    cur.attempt(|cur| {
        let start = cur.pos();
        let Some(hour) = digits(cur, 2) else {
            return Ok(None);
        };
        if !cur.eat(b':') {
            return Ok(None);
        }
        let Some(minute) = digits(cur, 2) else {
            return Ok(None);
        };
        if hour > 23 {
            return Ok(None);
        }
        if minute > 59 {
            return Err(invalid(cur, start, "minute out of range"));
        }
        let mut time = Time {
            hour: hour as u8,
            minute: minute as u8,
            second: 0,
            nanosecond: 0,
            precision: 0,
            has_seconds: false,
        };

        if !cur.eat(b':') {
            let offset_follows = matches!(cur.peek(), Some(b'Z' | b'z' | b'+' | b'-'));
            if version.is_v1_1() && (offset_follows || cur.at_value_end()) {
                return Ok(Some(time));
            }
            return Err(invalid(cur, start, "missing seconds"));
        }
        let Some(second) = digits(cur, 2) else {
            return Err(invalid(cur, start, "malformed seconds"));
        };
        if second > 59 {
            return Err(invalid(cur, start, "second out of range"));
        }
        time.second = second as u8;
        time.has_seconds = true;

        if cur.eat(b'.') {
            let mut count = 0;
            let mut nanos = 0;
            while let Some(b @ b'0'..=b'9') = cur.peek() {
                if count < 9 {
                    nanos = nanos * 10 + (b - b'0') as u32;
                    count += 1;
                }
                cur.advance(1);
            }
            if count == 0 {
                return Err(invalid(cur, start, "empty fraction"));
            }
            time.precision = count;
            for _ in count..9 {
                nanos *= 10;
            }
            time.nanosecond = nanos;
        }
        Ok(Some(time))
    })
}

/// `Z` or `±HH:MM`.
pub(crate) fn try_offset(cur: &mut Cursor<'_>) -> Result<Option<Offset>, Error> {
    if cur.eat(b'Z') || cur.eat(b'z') {
        return Ok(Some(Offset::Z));
    }
    cur.attempt(|cur| {
        let start = cur.pos();
        let sign = match cur.peek() {
            Some(b'+') => 1,
            Some(b'-') => -1,
            _ => return Ok(None),
        };
        cur.advance(1);
        let Some(hour) = digits(cur, 2) else {
            return Ok(None);
        };
        if !cur.eat(b':') {
            return Ok(None);
        }
        let Some(minute) = digits(cur, 2) else {
            return Ok(None);
        };
        if hour > 23 {
            return Err(invalid(cur, start, "offset hour out of range"));
        }
        if minute > 59 {
            return Err(invalid(cur, start, "offset minute out of range"));
        }
        Ok(Some(Offset::Custom {
            minutes: sign * (hour as i16 * 60 + minute as i16),
        }))
    })
}

/// The date/time delimiter: `T`, `t`, or a single space before a digit.
fn eat_delimiter(cur: &mut Cursor<'_>) -> bool {
    match cur.peek() {
        Some(b'T' | b't') => {
            cur.advance(1);
            true
        }
        Some(b' ') if cur.peek_at(1).is_some_and(|b| b.is_ascii_digit()) => {
            cur.advance(1);
            true
        }
        _ => false,
    }
}

/// Date and time, joined by the delimiter.
fn date_and_time(cur: &mut Cursor<'_>, version: Version) -> Result<Option<(Date, Time)>, Error> {
    let Some(date) = try_date(cur)? else {
        return Ok(None);
    };
    if !eat_delimiter(cur) {
        return Ok(None);
    }
    let Some(time) = try_time(cur, version)? else {
        return Ok(None);
    };
    Ok(Some((date, time)))
}

pub(crate) fn try_offset_datetime(
    cur: &mut Cursor<'_>,
    version: Version,
) -> Result<Option<Datetime>, Error> {
    cur.attempt(|cur| {
        let Some((date, time)) = date_and_time(cur, version)? else {
            return Ok(None);
        };
        let Some(offset) = try_offset(cur)? else {
            return Ok(None);
        };
        Ok(Some(Datetime {
            date: Some(date),
            time: Some(time),
            offset: Some(offset),
        }))
    })
}

pub(crate) fn try_local_datetime(
    cur: &mut Cursor<'_>,
    version: Version,
) -> Result<Option<Datetime>, Error> {
    cur.attempt(|cur| {
        Ok(date_and_time(cur, version)?.map(|(date, time)| Datetime {
            date: Some(date),
            time: Some(time),
            offset: None,
        }))
    })
}

pub(crate) fn try_local_date(cur: &mut Cursor<'_>) -> Result<Option<Datetime>, Error> {
    Ok(try_date(cur)?.map(|date| Datetime {
        date: Some(date),
        time: None,
        offset: None,
    }))
}

pub(crate) fn try_local_time(
    cur: &mut Cursor<'_>,
    version: Version,
) -> Result<Option<Datetime>, Error> {
    Ok(try_time(cur, version)?.map(|time| Datetime {
        date: None,
        time: Some(time),
        offset: None,
    }))
}

#[cold]
fn invalid(cur: &Cursor<'_>, start: usize, reason: &'static str) -> Error {
    cur.error(start, Some(cur.pos()), ErrorKind::InvalidDatetime(reason))
}

impl FromStr for Datetime {
    type Err = Error;

    /// Parses any of the four variants, accepting the TOML 1.1 forms.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut cur = Cursor::new(s);
        let version = Version::V1_1;
        let parsed = match try_offset_datetime(&mut cur, version)? {
            Some(dt) => Some(dt),
            None => match try_local_datetime(&mut cur, version)? {
                Some(dt) => Some(dt),
                None => match try_local_date(&mut cur)? {
                    Some(dt) => Some(dt),
                    None => try_local_time(&mut cur, version)?,
                },
            },
        };
        match parsed {
            Some(dt) if cur.is_eof() => Ok(dt),
            Some(_) => {
                let (found, end) = cur.describe_here();
                Err(cur.error(cur.pos(), Some(end), ErrorKind::Wanted {
                    expected: "end of date-time",
                    found,
                }))
            }
            None => Err(cur.error(0, Some(s.len()), ErrorKind::InvalidDatetime("unrecognized shape"))),
        }
    }
}

// -- formatting -------------------------------------------------------------

impl fmt::Display for Date {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:04}-{:02}-{:02}", self.year, self.month, self.day)
    }
}

impl fmt::Display for Time {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}:{:02}", self.hour, self.minute, self.second)?;
        if self.precision > 0 {
            let mut digits = [b'0'; 9];
            let mut n = self.nanosecond;
            for slot in digits.iter_mut().rev() {
                *slot = b'0' + (n % 10) as u8;
                n /= 10;
            }
            let shown = &digits[..(self.precision as usize).min(9)];
            f.write_str(".")?;
            for &d in shown {
                fmt::Write::write_char(f, d as char)?;
            }
        }
        Ok(())
    }
}

impl fmt::Display for Offset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Offset::Z => f.write_str("Z"),
            Offset::Custom { minutes } => {
                let sign = if minutes < 0 { '-' } else { '+' };
                let abs = minutes.unsigned_abs();
                write!(f, "{sign}{:02}:{:02}", abs / 60, abs % 60)
            }
        }
    }
}

impl fmt::Display for Datetime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(date) = &self.date {
            fmt::Display::fmt(date, f)?;
            if self.time.is_some() {
                f.write_str("T")?;
            }
        }
        if let Some(time) = &self.time {
            fmt::Display::fmt(time, f)?;
            if let Some(offset) = &self.offset {
                fmt::Display::fmt(offset, f)?;
            }
        }
        Ok(())
    }
}
