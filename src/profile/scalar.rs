//! Numeric types profiles can compute in.

use std::fmt;

use num_bigint::BigInt;
use num_traits::{Num, Signed, Zero};

use crate::game::{Number, Rational};

/// A field profiles compute in: `f64` for floating-point profiles,
/// [`Rational`] for exact ones.
///
/// Both share the same code paths; only the reading of payoffs differs.
/// Floating-point profiles use the `f64` a payoff was entered as, exact
/// profiles its exact rational value.
pub trait Scalar: Num + Signed + Clone + PartialOrd + fmt::Debug + fmt::Display + 'static {
    /// Reads a payoff or chance probability.
    fn from_number(value: &Number) -> Self;

    /// Converts a configuration weight.
    fn from_f64(value: f64) -> Self;

    /// `num / den`, or zero when `den` is zero.
    fn ratio(num: usize, den: usize) -> Self;

    /// Square, used by the Liapunov function.
    fn square(&self) -> Self {
        self.clone() * self.clone()
    }
}

impl Scalar for f64 {
    fn from_number(value: &Number) -> Self {
        value.to_f64()
    }

    fn from_f64(value: f64) -> Self {
        value
    }

    fn ratio(num: usize, den: usize) -> Self {
        if den == 0 {
            return 0.0;
        }
        num as f64 / den as f64
    }
}

impl Scalar for Rational {
    fn from_number(value: &Number) -> Self {
        value.exact().clone()
    }

    fn from_f64(value: f64) -> Self {
        Rational::from_float(value).unwrap_or_else(Rational::zero)
    }

    fn ratio(num: usize, den: usize) -> Self {
        if den == 0 {
            return Rational::zero();
        }
        Rational::new(BigInt::from(num), BigInt::from(den))
    }
}

/// Largest element, if any.
pub(crate) fn max_of<T: Scalar>(values: impl IntoIterator<Item = T>) -> Option<T> {
    values
        .into_iter()
        .fold(None, |best, v| match best {
            Some(b) if b >= v => Some(b),
            _ => Some(v),
        })
}

/// Sum of all elements.
pub(crate) fn sum_of<'a, T: Scalar>(values: impl IntoIterator<Item = &'a T>) -> T {
    values
        .into_iter()
        .fold(T::zero(), |acc, v| acc + v.clone())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ratio() {
        assert_eq!(f64::ratio(1, 4), 0.25);
        assert_eq!(
            Rational::ratio(2, 6),
            Rational::new(BigInt::from(1), BigInt::from(3))
        );
        assert!(Rational::ratio(1, 0).is_zero());
    }

    #[test]
    fn test_payoff_readings_differ_by_scalar() {
        let number: Number = "3.14159265".parse().unwrap();
        assert_eq!(f64::from_number(&number), 3.14159265);
        assert_eq!(
            Rational::from_number(&number),
            Rational::new(BigInt::from(314159265), BigInt::from(100000000))
        );
    }

    #[test]
    fn test_max_and_sum() {
        assert_eq!(max_of(vec![1.0, 3.0, 2.0]), Some(3.0));
        assert_eq!(max_of(Vec::<f64>::new()), None);
        assert_eq!(sum_of(&[0.5, 0.25]), 0.75);
    }
}
