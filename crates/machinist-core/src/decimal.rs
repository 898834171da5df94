//! # Fixed-Precision Decimals
//!
//! The catalog-native numeric type.
//!
//! Catalog columns such as `max_tolerance_mm` or `cost_per_kg` are stored as
//! exact decimals (`units / 10^scale`). All selection comparisons happen on
//! this type, so `0.02 <= 0.02` holds exactly. Conversion to `f64` is left to
//! the sanitizer at the output boundary.
//!
//! ## Text Forms
//!
//! - [`Decimal::parse`] is strict: optional sign, digits, optional fraction.
//! - [`Decimal::extract`] is lenient: it takes the first numeric substring of
//!   free text, so `"±0.01mm"` yields `0.01`.

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Maximum number of fractional digits a decimal may carry.
///
/// `i64::MAX * 10^18` still fits in an `i128`, which keeps comparisons exact.
pub const MAX_SCALE: u32 = 18;

/// Reasons text or a float could not become a [`Decimal`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DecimalError {
    /// The input was empty or whitespace only.
    #[error("empty numeric input")]
    Empty,

    /// No numeric value could be read from the input.
    #[error("no numeric value in {0:?}")]
    NotNumeric(String),

    /// The input has more than 18 significant fractional digits.
    #[error("more than 18 fractional digits in {0:?}")]
    TooPrecise(String),

    /// The value does not fit in 64-bit units.
    #[error("numeric value out of range: {0:?}")]
    OutOfRange(String),

    /// NaN or infinity.
    #[error("non-finite number")]
    NonFinite,
}

/// An exact decimal number: `units / 10^scale`.
///
/// Equality and ordering compare numeric value, so `0.020 == 0.02`.
#[derive(Debug, Clone, Copy)]
pub struct Decimal {
    units: i64,
    scale: u32,
}

impl Decimal {
    /// Zero.
    pub const ZERO: Self = Self { units: 0, scale: 0 };

    /// Build a decimal from raw units and a scale.
    pub fn new(units: i64, scale: u32) -> Result<Self, DecimalError> {
        if scale > MAX_SCALE {
            return Err(DecimalError::TooPrecise(format!("{units}e-{scale}")));
        }
        Ok(Self { units, scale })
    }

    /// Build an integral decimal.
    #[must_use]
    pub const fn from_int(value: i64) -> Self {
        Self {
            units: value,
            scale: 0,
        }
    }

    /// Raw units (value times `10^scale`).
    #[must_use]
    pub const fn units(self) -> i64 {
        self.units
    }

    /// Number of fractional digits.
    #[must_use]
    pub const fn scale(self) -> u32 {
        self.scale
    }

    #[must_use]
    pub const fn is_negative(self) -> bool {
        self.units < 0
    }

    /// Parse a strictly numeric string such as `"650"`, `"-12.5"` or `".25"`.
    ///
    /// Surrounding whitespace is ignored; anything else is rejected.
    /// Trailing fractional zeros are dropped, so the result is canonical.
    pub fn parse(text: &str) -> Result<Self, DecimalError> {
        let trimmed = text.trim();
        if trimmed.is_empty() {
            return Err(DecimalError::Empty);
        }

        let (negative, body) = match trimmed.as_bytes()[0] {
            b'-' => (true, &trimmed[1..]),
            b'+' => (false, &trimmed[1..]),
            _ => (false, trimmed),
        };

        let (int_part, frac_part) = match body.split_once('.') {
            Some((i, f)) => (i, f),
            None => (body, ""),
        };

        let all_digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
        if (int_part.is_empty() && frac_part.is_empty())
            || !all_digits(int_part)
            || !all_digits(frac_part)
        {
            return Err(DecimalError::NotNumeric(text.to_string()));
        }

        let frac_part = frac_part.trim_end_matches('0');
        let scale = u32::try_from(frac_part.len())
            .ok()
            .filter(|s| *s <= MAX_SCALE)
            .ok_or_else(|| DecimalError::TooPrecise(text.to_string()))?;

        let mut magnitude: i128 = 0;
        for digit in int_part.bytes().chain(frac_part.bytes()) {
            magnitude = magnitude
                .checked_mul(10)
                .and_then(|m| m.checked_add(i128::from(digit - b'0')))
                .ok_or_else(|| DecimalError::OutOfRange(text.to_string()))?;
        }
        let signed = if negative { -magnitude } else { magnitude };
        let units =
            i64::try_from(signed).map_err(|_| DecimalError::OutOfRange(text.to_string()))?;

        Ok(Self { units, scale })
    }

    /// Read the first numeric substring of free text.
    ///
    /// `"±0.01mm"` → `0.01`, `"tolerance 0.05 mm"` → `0.05`, `"-40 C"` → `-40`.
    /// The `±` sign is not a numeric sign, so it does not negate the value.
    pub fn extract(text: &str) -> Result<Self, DecimalError> {
        let bytes = text.as_bytes();
        let digit_at = |i: usize| bytes.get(i).is_some_and(u8::is_ascii_digit);
        let number_at = |i: usize| digit_at(i) || (bytes.get(i) == Some(&b'.') && digit_at(i + 1));

        let start = (0..bytes.len())
            .find(|&i| {
                number_at(i) || (matches!(bytes[i], b'-' | b'+') && number_at(i + 1))
            })
            .ok_or_else(|| {
                if text.trim().is_empty() {
                    DecimalError::Empty
                } else {
                    DecimalError::NotNumeric(text.to_string())
                }
            })?;

        let mut end = start;
        if matches!(bytes[end], b'-' | b'+') {
            end += 1;
        }
        while digit_at(end) {
            end += 1;
        }
        if bytes.get(end) == Some(&b'.') && digit_at(end + 1) {
            end += 1;
            while digit_at(end) {
                end += 1;
            }
        }

        Self::parse(&text[start..end])
    }

    /// Convert a float through its shortest round-trip text form.
    pub fn from_f64(value: f64) -> Result<Self, DecimalError> {
        if !value.is_finite() {
            return Err(DecimalError::NonFinite);
        }
        Self::parse(&value.to_string())
    }

    /// Nearest `f64` to this decimal.
    ///
    /// Goes through the canonical text so the result is correctly rounded.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        // Canonical decimal text is always valid float syntax.
        self.to_string().parse().unwrap_or_default()
    }

    fn widened(self, scale: u32) -> i128 {
        i128::from(self.units) * 10i128.pow(scale - self.scale)
    }
}

impl Default for Decimal {
    fn default() -> Self {
        Self::ZERO
    }
}

impl PartialEq for Decimal {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Decimal {}

impl PartialOrd for Decimal {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Decimal {
    fn cmp(&self, other: &Self) -> Ordering {
        let scale = self.scale.max(other.scale);
        self.widened(scale).cmp(&other.widened(scale))
    }
}

impl fmt::Display for Decimal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.units < 0 { "-" } else { "" };
        let digits = self.units.unsigned_abs().to_string();
        let scale = self.scale as usize;
        if scale == 0 {
            return write!(f, "{sign}{digits}");
        }
        let padded = format!("{digits:0>width$}", width = scale + 1);
        let (int_part, frac_part) = padded.split_at(padded.len() - scale);
        write!(f, "{sign}{int_part}.{frac_part}")
    }
}

impl FromStr for Decimal {
    type Err = DecimalError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

// =============================================================================
// SERDE
// =============================================================================
//
// Serialized as canonical text. Human-readable formats (JSON, TOML seed
// files) may also supply a plain number; binary formats (postcard) always
// carry the string.

impl Serialize for Decimal {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_string())
    }
}

impl<'de> Deserialize<'de> for Decimal {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        if deserializer.is_human_readable() {
            deserializer.deserialize_any(DecimalVisitor)
        } else {
            deserializer.deserialize_str(DecimalVisitor)
        }
    }
}

struct DecimalVisitor;

impl Visitor<'_> for DecimalVisitor {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a decimal number or numeric string")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        Decimal::parse(v).map_err(E::custom)
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from_int(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        i64::try_from(v)
            .map(Decimal::from_int)
            .map_err(|_| E::custom(DecimalError::OutOfRange(v.to_string())))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Decimal, E> {
        Decimal::from_f64(v).map_err(E::custom)
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(text: &str) -> Decimal {
        Decimal::parse(text).expect("parse")
    }

    #[test]
    fn parse_accepts_plain_forms() {
        assert_eq!(dec("650"), Decimal::from_int(650));
        assert_eq!(dec("-12.5").units(), -125);
        assert_eq!(dec("-12.5").scale(), 1);
        assert_eq!(dec(".25"), dec("0.25"));
        assert_eq!(dec("+7."), Decimal::from_int(7));
        assert_eq!(dec("  0.01 "), dec("0.01"));
    }

    #[test]
    fn parse_drops_trailing_fraction_zeros() {
        let d = dec("650.000");
        assert_eq!(d.scale(), 0);
        assert_eq!(d.to_string(), "650");
    }

    #[test]
    fn parse_rejects_garbage() {
        assert_eq!(Decimal::parse(""), Err(DecimalError::Empty));
        assert!(matches!(
            Decimal::parse("0.01mm"),
            Err(DecimalError::NotNumeric(_))
        ));
        assert!(matches!(Decimal::parse("."), Err(DecimalError::NotNumeric(_))));
        assert!(matches!(Decimal::parse("-"), Err(DecimalError::NotNumeric(_))));
        assert!(matches!(
            Decimal::parse("1.2.3"),
            Err(DecimalError::NotNumeric(_))
        ));
    }

    #[test]
    fn parse_rejects_out_of_range() {
        assert!(matches!(
            Decimal::parse("99999999999999999999"),
            Err(DecimalError::OutOfRange(_))
        ));
        assert!(matches!(
            Decimal::parse("0.0000000000000000001"),
            Err(DecimalError::TooPrecise(_))
        ));
    }

    #[test]
    fn equality_ignores_scale() {
        assert_eq!(Decimal::new(20, 3).expect("new"), dec("0.02"));
        assert!(dec("0.02") <= dec("0.02"));
        assert!(dec("0.02") > dec("0.01"));
        assert!(dec("-1") < dec("0.5"));
    }

    #[test]
    fn extract_reads_first_number() {
        assert_eq!(Decimal::extract("±0.01mm").expect("extract"), dec("0.01"));
        assert_eq!(
            Decimal::extract("tolerance 0.05 mm").expect("extract"),
            dec("0.05")
        );
        assert_eq!(Decimal::extract("-40 C").expect("extract"), dec("-40"));
        assert_eq!(Decimal::extract("approx .5").expect("extract"), dec("0.5"));
        assert_eq!(Decimal::extract("5. mm").expect("extract"), dec("5"));
    }

    #[test]
    fn extract_without_digits_fails() {
        assert!(matches!(
            Decimal::extract("tight"),
            Err(DecimalError::NotNumeric(_))
        ));
        assert_eq!(Decimal::extract("   "), Err(DecimalError::Empty));
    }

    #[test]
    fn display_pads_fraction() {
        assert_eq!(Decimal::new(5, 3).expect("new").to_string(), "0.005");
        assert_eq!(Decimal::new(-5, 3).expect("new").to_string(), "-0.005");
        assert_eq!(Decimal::new(12345, 2).expect("new").to_string(), "123.45");
    }

    #[test]
    fn float_conversion_round_trips_short_values() {
        assert_eq!(Decimal::from_f64(0.02).expect("from"), dec("0.02"));
        assert_eq!(dec("0.02").to_f64(), 0.02);
        assert_eq!(dec("650").to_f64(), 650.0);
        assert_eq!(Decimal::from_f64(f64::NAN), Err(DecimalError::NonFinite));
    }

    #[test]
    fn new_rejects_excess_scale() {
        assert!(Decimal::new(1, 19).is_err());
    }
}
