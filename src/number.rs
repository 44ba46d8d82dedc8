//! Integer, float and boolean literals.

use crate::cursor::{Cursor, is_keylike_byte};
use crate::error::{Error, ErrorKind};

#[cfg(test)]
#[path = "./number_tests.rs"]
mod tests;

/// Radix an integer literal was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Base {
    #[default]
    Decimal,
    Hex,
    Octal,
    Binary,
}

impl Base {
    pub fn radix(self) -> u32 {
        match self {
            Base::Decimal => 10,
            Base::Hex => 16,
            Base::Octal => 8,
            Base::Binary => 2,
        }
    }

    pub(crate) fn prefix(self) -> &'static str {
        match self {
            Base::Decimal => "",
            Base::Hex => "0x",
            Base::Octal => "0o",
            Base::Binary => "0b",
        }
    }
}

/// A 64-bit integer that remembers the base it was written in.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Integer {
    pub value: i64,
    pub base: Base,
}

impl Integer {
    pub fn new(value: i64, base: Base) -> Self {
        Integer { value, base }
    }

    /// Narrows the value to a smaller integer type.
    ///
    /// ```
    /// use toml_lattice::{Base, Integer};
    ///
    /// let port = Integer::new(8080, Base::Decimal);
    /// assert_eq!(port.to_width::<u16>(), Some(8080));
    /// assert_eq!(port.to_width::<i8>(), None);
    /// ```
    pub fn to_width<T: TryFrom<i64>>(self) -> Option<T> {
        T::try_from(self.value).ok()
    }
}

impl From<i64> for Integer {
    fn from(value: i64) -> Self {
        Integer::new(value, Base::Decimal)
    }
}

/// A parsed float, with a note when `-nan` lost its sign.
#[derive(Clone, Copy, Debug)]
pub(crate) struct FloatLiteral {
    pub(crate) value: f64,
    pub(crate) negative_nan: bool,
}

/// Consumes a run of `radix` digits in which every `_` sits between two
/// digits. The digits are appended to `out`; returns how many were read.
fn scan_digits(
    cur: &mut Cursor<'_>,
    start: usize,
    radix: u32,
    out: &mut String,
) -> Result<usize, Error> {
    let mut count = 0;
    loop {
        match cur.peek() {
            Some(b) if (b as char).is_digit(radix) => {
                out.push(b as char);
                count += 1;
                cur.advance(1);
            }
            Some(b'_') => {
                let next_is_digit = cur
                    .peek_at(1)
                    .is_some_and(|b| (b as char).is_digit(radix));
                if count == 0 || !next_is_digit {
                    cur.advance(1);
                    return Err(invalid(cur, start, "underscores must sit between digits"));
                }
                cur.advance(1);
            }
            _ => return Ok(count),
        }
    }
}

fn eat_sign(cur: &mut Cursor<'_>) -> Option<u8> {
    match cur.peek() {
        Some(b @ (b'+' | b'-')) => {
            cur.advance(1);
            Some(b)
        }
        _ => None,
    }
}

/// Eats `word` when it is not the prefix of a longer bare word.
fn eat_word(cur: &mut Cursor<'_>, word: &str) -> bool {
    if cur.starts_with(word) && !cur.peek_at(word.len()).is_some_and(is_keylike_byte) {
        cur.advance(word.len());
        true
    } else {
        false
    }
}

/// Floats need a fraction or an exponent; anything else is left for the
/// integer rule.
pub(crate) fn try_float(cur: &mut Cursor<'_>) -> Result<Option<FloatLiteral>, Error> {
    cur.attempt(|cur| {
        let start = cur.pos();
        let sign = eat_sign(cur);
        let negative = sign == Some(b'-');

        if eat_word(cur, "inf") {
            let value = if negative { f64::NEG_INFINITY } else { f64::INFINITY };
            return Ok(Some(FloatLiteral {
                value,
                negative_nan: false,
            }));
        }
        if eat_word(cur, "nan") {
            return Ok(Some(FloatLiteral {
                value: f64::NAN,
                negative_nan: negative,
            }));
        }

        let mut text = String::new();
        if negative {
            text.push('-');
        }
        let int_start = cur.pos();
        if scan_digits(cur, start, 10, &mut text)? == 0 {
            return Ok(None);
        }
        let int_len = cur.pos() - int_start;
        let has_fraction = cur.peek() == Some(b'.');
        let has_exponent = matches!(cur.peek(), Some(b'e' | b'E'));
        if !has_fraction && !has_exponent {
            return Ok(None);
        }
        if int_len > 1 && cur.slice(int_start, int_start + 1) == "0" {
            return Err(invalid(cur, start, "leading zeros are not allowed"));
        }

        if cur.eat(b'.') {
            text.push('.');
            if scan_digits(cur, start, 10, &mut text)? == 0 {
                return Err(invalid(cur, start, "a decimal point must be followed by digits"));
            }
        }
        if let Some(b'e' | b'E') = cur.peek() {
            cur.advance(1);
            text.push('e');
            if let Some(s) = eat_sign(cur) {
                text.push(s as char);
            }
            if scan_digits(cur, start, 10, &mut text)? == 0 {
                return Err(invalid(cur, start, "an exponent must have digits"));
            }
        }

        match text.parse::<f64>() {
            Ok(value) if value.is_finite() => Ok(Some(FloatLiteral {
                value,
                negative_nan: false,
            })),
            _ => Err(invalid(cur, start, "float out of range")),
        }
    })
}

pub(crate) fn try_integer(cur: &mut Cursor<'_>) -> Result<Option<Integer>, Error> {
    cur.attempt(|cur| {
        let start = cur.pos();
        let sign = eat_sign(cur);

        let base = match (cur.peek(), cur.peek_at(1)) {
            (Some(b'0'), Some(b'x')) => Some(Base::Hex),
            (Some(b'0'), Some(b'o')) => Some(Base::Octal),
            (Some(b'0'), Some(b'b')) => Some(Base::Binary),
            _ => None,
        };

        if let Some(base) = base {
            if sign.is_some() {
                cur.advance(2);
                return Err(invalid(cur, start, "base prefixes cannot carry a sign"));
            }
            cur.advance(2);
            let mut digits = String::new();
            if scan_digits(cur, start, base.radix(), &mut digits)? == 0 {
                return Err(invalid(cur, start, "missing digits after the base prefix"));
            }
            return match i64::from_str_radix(&digits, base.radix()) {
                Ok(value) => Ok(Some(Integer { value, base })),
                Err(_) => Err(cur.error(start, Some(cur.pos()), ErrorKind::OutOfRange("i64"))),
            };
        }

        match (cur.peek(), cur.peek_at(1)) {
            (Some(b'0'), Some(b'0'..=b'9' | b'_')) => {
                cur.advance(2);
                Err(invalid(cur, start, "leading zeros are not allowed"))
            }
            (Some(b'0'), Some(b'.' | b'-' | b':')) => Ok(None),
            (Some(b'0'), _) => {
                cur.advance(1);
                Ok(Some(Integer::new(0, Base::Decimal)))
            }
            (Some(b'1'..=b'9'), _) => {
                let mut digits = String::new();
                if sign == Some(b'-') {
                    digits.push('-');
                }
                scan_digits(cur, start, 10, &mut digits)?;
                match digits.parse::<i64>() {
                    Ok(value) => Ok(Some(Integer::new(value, Base::Decimal))),
                    Err(_) => Err(cur.error(start, Some(cur.pos()), ErrorKind::OutOfRange("i64"))),
                }
            }
            _ => Ok(None),
        }
    })
}

pub(crate) fn try_boolean(cur: &mut Cursor<'_>) -> Option<bool> {
    if eat_word(cur, "true") {
        Some(true)
    } else if eat_word(cur, "false") {
        Some(false)
    } else {
        None
    }
}

#[cold]
fn invalid(cur: &Cursor<'_>, start: usize, reason: &'static str) -> Error {
    cur.error(start, Some(cur.pos()), ErrorKind::InvalidNumber(reason))
}
