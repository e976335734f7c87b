//! Payoff values that keep both an exact and a floating-point reading.
//!
//! A payoff entered as `"1/4"`, `0.25` or `"3.14159265"` is stored as the
//! exact rational it denotes, together with the `f64` a float parser would
//! produce for the same input. Exact profiles compute with the former,
//! floating-point profiles with the latter.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use num_bigint::BigInt;
use num_rational::BigRational;
use num_traits::{pow, ToPrimitive, Zero};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::game::error::GameError;

/// Exact rational numbers used for payoffs and exact profiles.
pub type Rational = BigRational;

/// A payoff value.
#[derive(Debug, Clone)]
pub struct Number {
    exact: Rational,
    float: f64,
    text: String,
}

impl Number {
    /// The number zero.
    pub fn zero() -> Self {
        Self::from(0i64)
    }

    /// Exact value.
    pub fn exact(&self) -> &Rational {
        &self.exact
    }

    /// Floating-point value, as read from the original input.
    pub fn to_f64(&self) -> f64 {
        self.float
    }

    /// The text the value was entered as (or a canonical rendering).
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Returns true if the number is exactly zero.
    pub fn is_zero(&self) -> bool {
        self.exact.is_zero()
    }
}

impl Default for Number {
    fn default() -> Self {
        Self::zero()
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.exact == other.exact
    }
}

impl Eq for Number {}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Number {
    fn cmp(&self, other: &Self) -> Ordering {
        self.exact.cmp(&other.exact)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.text)
    }
}

impl From<Rational> for Number {
    fn from(exact: Rational) -> Self {
        let float = exact.to_f64().unwrap_or(f64::NAN);
        let text = exact.to_string();
        Self { exact, float, text }
    }
}

impl From<&Rational> for Number {
    fn from(exact: &Rational) -> Self {
        Self::from(exact.clone())
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self {
            exact: Rational::from_integer(BigInt::from(value)),
            float: value as f64,
            text: value.to_string(),
        }
    }
}

impl From<i32> for Number {
    fn from(value: i32) -> Self {
        Self::from(i64::from(value))
    }
}

impl From<u32> for Number {
    fn from(value: u32) -> Self {
        Self::from(i64::from(value))
    }
}

impl TryFrom<f64> for Number {
    type Error = GameError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let exact = Rational::from_float(value)
            .ok_or_else(|| GameError::InvalidNumber(value.to_string()))?;
        Ok(Self {
            exact,
            float: value,
            text: value.to_string(),
        })
    }
}

impl FromStr for Number {
    type Err = GameError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let invalid = || GameError::InvalidNumber(s.to_string());
        let exact = match trimmed.split_once('/') {
            Some((num, den)) => parse_fraction(num, den).ok_or_else(invalid)?,
            None => parse_decimal(trimmed).ok_or_else(invalid)?,
        };
        let float = if trimmed.contains('/') {
            exact.to_f64().unwrap_or(f64::NAN)
        } else {
            trimmed
                .parse::<f64>()
                .unwrap_or_else(|_| exact.to_f64().unwrap_or(f64::NAN))
        };
        Ok(Self {
            exact,
            float,
            text: trimmed.to_string(),
        })
    }
}

impl TryFrom<&str> for Number {
    type Error = GameError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl TryFrom<String> for Number {
    type Error = GameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl Serialize for Number {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.text)
    }
}

impl<'de> Deserialize<'de> for Number {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

fn parse_integer(s: &str) -> Option<BigInt> {
    let (negative, unsigned) = match s.as_bytes().first() {
        Some(b'-') => (true, &s[1..]),
        Some(b'+') => (false, &s[1..]),
        _ => (false, s),
    };
    if unsigned.is_empty() || !unsigned.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    let value = BigInt::from_str(unsigned).ok()?;
    Some(if negative { -value } else { value })
}

fn parse_fraction(num: &str, den: &str) -> Option<Rational> {
    let num = parse_integer(num.trim())?;
    let den = parse_integer(den.trim())?;
    if den.is_zero() {
        return None;
    }
    Some(Rational::new(num, den))
}

/// Largest power of ten a decimal literal may scale by.
const MAX_DECIMAL_SCALE: u64 = 10_000;

/// Reads `[+-]digits[.digits][(e|E)[+-]digits]` exactly.
fn parse_decimal(s: &str) -> Option<Rational> {
    let (mantissa, exponent) = match s.find(['e', 'E']) {
        Some(at) => (&s[..at], s[at + 1..].parse::<i64>().ok()?),
        None => (s, 0),
    };
    let (negative, unsigned) = match mantissa.as_bytes().first() {
        Some(b'-') => (true, &mantissa[1..]),
        Some(b'+') => (false, &mantissa[1..]),
        _ => (false, mantissa),
    };
    let (whole, fraction) = unsigned.split_once('.').unwrap_or((unsigned, ""));
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }
    if !whole.bytes().chain(fraction.bytes()).all(|b| b.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{}{}", whole, fraction);
    let mut value = BigInt::from_str(&digits).ok()?;
    if negative {
        value = -value;
    }
    let scale = exponent.checked_sub(i64::try_from(fraction.len()).ok()?)?;
    if scale.unsigned_abs() > MAX_DECIMAL_SCALE {
        return None;
    }
    let ten = BigInt::from(10);
    let magnitude = pow(ten, usize::try_from(scale.unsigned_abs()).ok()?);
    Some(if scale >= 0 {
        Rational::from_integer(value * magnitude)
    } else {
        Rational::new(value, magnitude)
    })
}
