//! Line comparison for the supported sort modes
//!
//! Every mode reduces a key to an optional numeric value and shares one
//! fallback policy:
//!
//! * both keys parse: compare the values,
//! * only one parses: the parsed key sorts first,
//! * neither parses: compare the keys byte-wise.
//!
//! Partially numeric input (a header row above a column of numbers, say) never
//! fails a sort; numbers simply rank ahead of everything else.

use crate::config::{SortConfig, SortMode};
use crate::key;
use std::cmp::Ordering;

/// Month names recognised by month sort, with their 1-based month number
const MONTHS: [(&str, u8); 23] = [
    ("jan", 1),
    ("january", 1),
    ("feb", 2),
    ("february", 2),
    ("mar", 3),
    ("march", 3),
    ("apr", 4),
    ("april", 4),
    ("may", 5),
    ("jun", 6),
    ("june", 6),
    ("jul", 7),
    ("july", 7),
    ("aug", 8),
    ("august", 8),
    ("sep", 9),
    ("september", 9),
    ("oct", 10),
    ("october", 10),
    ("nov", 11),
    ("november", 11),
    ("dec", 12),
    ("december", 12),
];

/// Binary magnitude suffixes in rank order (k = 1024^1 .. e = 1024^6)
const UNITS: &[u8; 6] = b"kmgtpe";

/// Compares lines according to a [`SortConfig`].
///
/// The key ordering function is chosen once, when the comparator is built;
/// each comparison only extracts keys and calls it.
#[derive(Clone, Copy)]
pub struct Comparator<'a> {
    config: &'a SortConfig,
    key_order: fn(&str, &str) -> Ordering,
}

impl<'a> Comparator<'a> {
    pub fn new(config: &'a SortConfig) -> Self {
        let key_order: fn(&str, &str) -> Ordering = match config.mode {
            SortMode::Lexicographic => compare_lexical,
            SortMode::Numeric => compare_numeric,
            SortMode::Month => compare_month,
            SortMode::HumanNumeric => compare_human_numeric,
        };
        Self { config, key_order }
    }

    /// Three-way comparison of two whole lines
    #[inline]
    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        let key_a = key::extract(a, self.config);
        let key_b = key::extract(b, self.config);
        (self.key_order)(key_a, key_b)
    }

    /// True when `a` must sort strictly before `b`
    #[inline]
    pub fn less(&self, a: &str, b: &str) -> bool {
        self.compare(a, b) == Ordering::Less
    }
}

#[inline]
fn compare_lexical(a: &str, b: &str) -> Ordering {
    a.as_bytes().cmp(b.as_bytes())
}

fn compare_numeric(a: &str, b: &str) -> Ordering {
    compare_parsed(a, b, parse_numeric)
}

fn compare_month(a: &str, b: &str) -> Ordering {
    compare_parsed(a, b, |key| parse_month(key).map(f64::from))
}

fn compare_human_numeric(a: &str, b: &str) -> Ordering {
    compare_parsed(a, b, parse_human_numeric)
}

/// Shared fallback policy for all value-based modes
fn compare_parsed<F>(a: &str, b: &str, parse: F) -> Ordering
where
    F: Fn(&str) -> Option<f64>,
{
    match (parse(a), parse(b)) {
        (Some(x), Some(y)) => compare_values(x, y),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => compare_lexical(a, b),
    }
}

/// Numeric ordering where NaN ranks after every other value and ties with NaN
#[inline]
fn compare_values(x: f64, y: f64) -> Ordering {
    match (x.is_nan(), y.is_nan()) {
        (true, true) => Ordering::Equal,
        (true, false) => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => x.partial_cmp(&y).unwrap_or(Ordering::Equal),
    }
}

/// Parse a key as a floating point number, ignoring surrounding whitespace.
///
/// Decimal and hexadecimal (`0x1.8p3`) forms are accepted. A finite literal
/// too large for `f64` does not parse; only `inf`/`infinity` spell infinity.
pub fn parse_numeric(key: &str) -> Option<f64> {
    let key = key.trim();
    let value = match key.parse::<f64>() {
        Ok(value) => value,
        Err(_) => return parse_hex_float(key),
    };

    if value.is_infinite() && !names_infinity(key) {
        return None;
    }
    Some(value)
}

fn names_infinity(key: &str) -> bool {
    let unsigned = key.strip_prefix(['+', '-']).unwrap_or(key);
    unsigned.eq_ignore_ascii_case("inf") || unsigned.eq_ignore_ascii_case("infinity")
}

/// Hexadecimal float with a mandatory binary exponent, e.g. `-0x1Fp-2`
fn parse_hex_float(key: &str) -> Option<f64> {
    let (negative, unsigned) = match key.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, key.strip_prefix('+').unwrap_or(key)),
    };
    let digits = unsigned
        .strip_prefix("0x")
        .or_else(|| unsigned.strip_prefix("0X"))?;
    let (mantissa, exponent) = digits.split_once(['p', 'P'])?;
    let exponent: i32 = exponent.parse().ok()?;

    let (int_part, frac_part) = mantissa.split_once('.').unwrap_or((mantissa, ""));
    if int_part.is_empty() && frac_part.is_empty() {
        return None;
    }

    let mut value = 0f64;
    for c in int_part.chars().chain(frac_part.chars()) {
        value = value * 16.0 + f64::from(c.to_digit(16)?);
    }

    let frac_bits = i32::try_from(frac_part.len()).ok()?.checked_mul(4)?;
    let value = value * 2f64.powi(exponent.checked_sub(frac_bits)?);
    if value.is_infinite() {
        return None;
    }

    Some(if negative { -value } else { value })
}

/// Resolve a month name or three-letter abbreviation to 1..=12
pub fn parse_month(key: &str) -> Option<u8> {
    let key = key.trim();
    MONTHS
        .iter()
        .find(|(name, _)| name.eq_ignore_ascii_case(key))
        .map(|&(_, month)| month)
}

/// Parse sizes such as `500`, `1.5k`, `2Gi` or `10 MiB` (base 1024).
///
/// Accepted shape, case-insensitive: digits, an optional fraction, optional
/// blanks, then an optional unit from `kmgtpe`, an optional `i` and an
/// optional `b`. Signs are not accepted.
pub fn parse_human_numeric(key: &str) -> Option<f64> {
    let bytes = key.trim().as_bytes();

    let int_end = bytes
        .iter()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(bytes.len());
    if int_end == 0 {
        return None;
    }

    let mut end = int_end;
    if bytes.get(end) == Some(&b'.') {
        let frac_len = bytes[end + 1..]
            .iter()
            .take_while(|b| b.is_ascii_digit())
            .count();
        // A dangling dot is not part of the number and fails the suffix match below
        if frac_len > 0 {
            end += 1 + frac_len;
        }
    }

    // Digits and '.' are ASCII, so this slice is valid UTF-8
    let value = std::str::from_utf8(&bytes[..end]).ok()?.parse::<f64>().ok()?;

    let mut rest = &bytes[end..];
    while let [b, tail @ ..] = rest {
        if !b.is_ascii_whitespace() {
            break;
        }
        rest = tail;
    }

    let mut rank = 0;
    if let [b, tail @ ..] = rest {
        if let Some(pos) = UNITS.iter().position(|u| u == &b.to_ascii_lowercase()) {
            rank = pos as i32 + 1;
            rest = tail;
        }
    }
    if let [b'i' | b'I', tail @ ..] = rest {
        rest = tail;
    }
    if let [b'b' | b'B', tail @ ..] = rest {
        rest = tail;
    }

    if !rest.is_empty() {
        return None;
    }

    Some(value * 1024f64.powi(rank))
}
