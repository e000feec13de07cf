//! Store-currency amounts.
//!
//! The store prices everything in Vietnamese đồng, which has no minor unit, so
//! a [`Money`] is a whole number of đồng. Arithmetic stays in integers; only
//! percentage discounts go through [`Decimal`] and are rounded back.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Deserializer, Serialize};

/// An amount of đồng.
///
/// Deserializes from JSON integers, floats or numeric strings (the backend
/// is not consistent), rounding half away from zero.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero đồng.
    pub const ZERO: Self = Self(0);

    /// Create an amount from whole đồng.
    #[must_use]
    pub const fn new(dong: i64) -> Self {
        Self(dong)
    }

    /// The amount in whole đồng.
    #[must_use]
    pub const fn amount(self) -> i64 {
        self.0
    }

    #[must_use]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }

    /// Round a decimal amount to whole đồng.
    ///
    /// Returns `None` if the value does not fit in an `i64`.
    #[must_use]
    pub fn from_decimal(value: Decimal) -> Option<Self> {
        value
            .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
            .to_i64()
            .map(Self)
    }

    /// Line total for `quantity` units at this unit price.
    #[must_use]
    pub fn times(self, quantity: u32) -> Self {
        Self(self.0.saturating_mul(i64::from(quantity)))
    }

    /// `percentage`% of this amount, rounded to whole đồng.
    ///
    /// A percentage too large to compute yields the whole amount.
    #[must_use]
    pub fn percent(self, percentage: Decimal) -> Self {
        Decimal::from(self.0)
            .checked_mul(percentage)
            .and_then(|raw| raw.checked_div(Decimal::ONE_HUNDRED))
            .and_then(Self::from_decimal)
            .unwrap_or(self)
    }

    /// Subtract, clamping at zero.
    #[must_use]
    pub const fn saturating_sub(self, other: Self) -> Self {
        let diff = self.0.saturating_sub(other.0);
        if diff < 0 { Self::ZERO } else { Self(diff) }
    }
}

impl Add for Money {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0.saturating_add(rhs.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Self) {
        *self = *self + rhs;
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl From<i64> for Money {
    fn from(dong: i64) -> Self {
        Self(dong)
    }
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let value = <Decimal as Deserialize>::deserialize(deserializer)?;
        Self::from_decimal(value)
            .ok_or_else(|| serde::de::Error::custom(format!("amount out of range: {value}")))
    }
}

/// Formats as `170.000 ₫` (dot-grouped thousands, symbol after).
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let digits = self.0.unsigned_abs().to_string();
        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push('.');
            }
            grouped.push(ch);
        }
        if self.0 < 0 {
            write!(f, "-{grouped} ₫")
        } else {
            write!(f, "{grouped} ₫")
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_display_groups_thousands() {
        assert_eq!(Money::new(170_000).to_string(), "170.000 ₫");
        assert_eq!(Money::new(1_234_567).to_string(), "1.234.567 ₫");
        assert_eq!(Money::new(999).to_string(), "999 ₫");
        assert_eq!(Money::ZERO.to_string(), "0 ₫");
        assert_eq!(Money::new(-5_000).to_string(), "-5.000 ₫");
    }

    #[test]
    fn test_deserialize_accepts_numbers_and_strings() {
        let from_int: Money = serde_json::from_str("100000").unwrap();
        let from_float: Money = serde_json::from_str("100000.0").unwrap();
        let from_str: Money = serde_json::from_str("\"100000\"").unwrap();
        assert_eq!(from_int, Money::new(100_000));
        assert_eq!(from_float, from_int);
        assert_eq!(from_str, from_int);
    }

    #[test]
    fn test_deserialize_rounds_half_away_from_zero() {
        let m: Money = serde_json::from_str("1500.5").unwrap();
        assert_eq!(m, Money::new(1501));
    }

    #[test]
    fn test_percent_rounds() {
        assert_eq!(Money::new(200_000).percent(Decimal::from(10)), Money::new(20_000));
        // 12.5% of 333 = 41.625
        assert_eq!(Money::new(333).percent(Decimal::new(125, 1)), Money::new(42));
    }

    #[test]
    fn test_percent_overflow_takes_whole_amount() {
        let huge = Decimal::from_str_exact("1000000000000000000000000000").unwrap();
        assert_eq!(Money::new(1_000).percent(huge), Money::new(1_000));
        assert_eq!(Money::new(i64::MAX).percent(Decimal::MAX), Money::new(i64::MAX));
    }

    #[test]
    fn test_saturating_sub_clamps_at_zero() {
        assert_eq!(Money::new(50_000).saturating_sub(Money::new(100_000)), Money::ZERO);
        assert_eq!(Money::new(5).saturating_sub(Money::new(3)), Money::new(2));
    }

    #[test]
    fn test_times_and_sum() {
        let total: Money = [Money::new(100).times(3), Money::new(50)].into_iter().sum();
        assert_eq!(total, Money::new(350));
    }
}
