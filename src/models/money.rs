//! Money type for representing currency amounts
//!
//! Internally stores amounts in cents (i64) to avoid floating-point precision
//! issues. Provides safe arithmetic operations and formatting.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Neg, Sub, SubAssign};

/// Represents a monetary amount stored as cents (hundredths of the currency unit)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Largest amount accepted from input: ten billion currency units.
    /// Sums of many such amounts stay far from `i64` overflow.
    pub const MAX: Money = Money(1_000_000_000_000);

    /// Create a Money amount from cents
    ///
    /// # Examples
    /// ```
    /// use moneynote::models::Money;
    /// let amount = Money::from_cents(1050); // 10.50
    /// assert_eq!(amount.to_string(), "$10.50");
    /// ```
    pub const fn from_cents(cents: i64) -> Self {
        Self(cents)
    }

    /// Create a Money amount from whole units and cents
    pub const fn from_units_cents(units: i64, cents: i64) -> Self {
        Self(units * 100 + cents)
    }

    pub const fn zero() -> Self {
        Self(0)
    }

    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Whole units portion (truncated toward zero)
    pub const fn units(&self) -> i64 {
        self.0 / 100
    }

    /// Cents portion (0-99)
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    pub const fn abs(&self) -> Self {
        Self(self.0.saturating_abs())
    }

    /// Whether the magnitude is within [`Money::MAX`]
    pub const fn is_within_limit(&self) -> bool {
        self.0.unsigned_abs() <= Self::MAX.0 as u64
    }

    /// Amount as a floating point number of units, for charts and CSV
    pub fn as_f64(&self) -> f64 {
        self.0 as f64 / 100.0
    }

    /// Percentage this amount represents of `total` (0.0 when total is zero)
    pub fn percentage_of(&self, total: Money) -> f64 {
        if total.is_zero() {
            0.0
        } else {
            self.0 as f64 / total.0 as f64 * 100.0
        }
    }

    /// Parse a money amount from a string
    ///
    /// Accepts formats: "10.50", "-10.50", "$10.50", "€1,250.5", "10".
    /// More than two fraction digits is an error, and so is anything
    /// beyond [`Money::MAX`].
    pub fn parse(s: &str) -> Result<Self, MoneyParseError> {
        let original = s.trim();

        let (negative, s) = if let Some(stripped) = original.strip_prefix('-') {
            (true, stripped)
        } else {
            (false, original)
        };

        // Drop any leading currency symbol and thousands separators
        let s = s.trim_start_matches(|c: char| !c.is_ascii_digit() && c != '.');
        let cleaned: String = s.chars().filter(|c| *c != ',').collect();

        if cleaned.is_empty() {
            return Err(MoneyParseError::InvalidFormat(original.to_string()));
        }

        let invalid = || MoneyParseError::InvalidFormat(original.to_string());

        let cents = if cleaned.contains('.') {
            let parts: Vec<&str> = cleaned.split('.').collect();
            if parts.len() != 2 {
                return Err(invalid());
            }

            let units: i64 = if parts[0].is_empty() {
                0
            } else {
                parts[0].parse().map_err(|_| invalid())?
            };

            let cents_str = parts[1];
            if !cents_str.chars().all(|c| c.is_ascii_digit()) {
                return Err(invalid());
            }
            let cents: i64 = match cents_str.len() {
                0 => 0,
                1 => cents_str.parse::<i64>().map_err(|_| invalid())? * 10,
                2 => cents_str.parse().map_err(|_| invalid())?,
                _ => return Err(invalid()),
            };

            units
                .checked_mul(100)
                .and_then(|u| u.checked_add(cents))
                .ok_or(MoneyParseError::Overflow)?
        } else {
            cleaned
                .parse::<i64>()
                .map_err(|_| invalid())?
                .checked_mul(100)
                .ok_or(MoneyParseError::Overflow)?
        };

        let money = Self(if negative { -cents } else { cents });
        if !money.is_within_limit() {
            return Err(MoneyParseError::Overflow);
        }
        Ok(money)
    }

    /// Format with a currency symbol
    pub fn format_with_symbol(&self, symbol: &str) -> String {
        if self.is_negative() {
            format!("-{}{}.{:02}", symbol, self.units().abs(), self.cents_part())
        } else {
            format!("{}{}.{:02}", symbol, self.units(), self.cents_part())
        }
    }
}

impl Default for Money {
    fn default() -> Self {
        Self::zero()
    }
}

impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.format_with_symbol("$"))
    }
}

// Arithmetic saturates at the i64 bounds instead of wrapping or panicking

impl Add for Money {
    type Output = Self;

    fn add(self, other: Self) -> Self {
        Self(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, other: Self) {
        *self = *self + other;
    }
}

impl Sub for Money {
    type Output = Self;

    fn sub(self, other: Self) -> Self {
        Self(self.0.saturating_sub(other.0))
    }
}

impl SubAssign for Money {
    fn sub_assign(&mut self, other: Self) {
        *self = *self - other;
    }
}

impl Neg for Money {
    type Output = Self;

    fn neg(self) -> Self {
        Self(self.0.saturating_neg())
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

impl<'a> std::iter::Sum<&'a Money> for Money {
    fn sum<I: Iterator<Item = &'a Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + *m)
    }
}

/// Error type for money parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MoneyParseError {
    InvalidFormat(String),
    Overflow,
}

impl fmt::Display for MoneyParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MoneyParseError::InvalidFormat(s) => write!(f, "Invalid money format: {}", s),
            MoneyParseError::Overflow => {
                write!(f, "Amount is too large (max {})", Money::MAX)
            }
        }
    }
}

impl std::error::Error for MoneyParseError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let m = Money::from_cents(1050);
        assert_eq!(m.cents(), 1050);
        assert_eq!(m.units(), 10);
        assert_eq!(m.cents_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1050)), "$10.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
        assert_eq!(format!("{}", Money::from_cents(-1050)), "-$10.50");
        assert_eq!(format!("{}", Money::from_cents(5)), "$0.05");
        assert_eq!(Money::from_cents(-5).format_with_symbol("€"), "-€0.05");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((-a).cents(), -1000);
    }

    #[test]
    fn test_parse() {
        assert_eq!(Money::parse("10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("$10.50").unwrap().cents(), 1050);
        assert_eq!(Money::parse("-10.50").unwrap().cents(), -1050);
        assert_eq!(Money::parse("10").unwrap().cents(), 1000);
        assert_eq!(Money::parse("10.5").unwrap().cents(), 1050);
        assert_eq!(Money::parse("0.05").unwrap().cents(), 5);
        assert_eq!(Money::parse(".75").unwrap().cents(), 75);
        assert_eq!(Money::parse("€1,250.00").unwrap().cents(), 125000);
    }

    #[test]
    fn test_parse_invalid() {
        assert!(Money::parse("").is_err());
        assert!(Money::parse("abc").is_err());
        assert!(Money::parse("1.2.3").is_err());
        assert!(Money::parse("12.x5").is_err());
        assert!(matches!(
            Money::parse("10.999"),
            Err(MoneyParseError::InvalidFormat(_))
        ));
    }

    #[test]
    fn test_parse_rejects_amounts_over_max() {
        assert_eq!(Money::parse("10000000000").unwrap(), Money::MAX);
        assert_eq!(
            Money::parse("10000000000.01"),
            Err(MoneyParseError::Overflow)
        );
        assert_eq!(
            Money::parse("90000000000000000"),
            Err(MoneyParseError::Overflow)
        );
        assert_eq!(
            Money::parse("-90000000000000000"),
            Err(MoneyParseError::Overflow)
        );
    }

    #[test]
    fn test_sum_saturates() {
        let huge = Money::from_cents(i64::MAX - 1);
        let total: Money = [huge, huge, Money::from_cents(5)].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN) - huge).cents(), i64::MIN);
        assert_eq!((-Money::from_cents(i64::MIN)).cents(), i64::MAX);
    }

    #[test]
    fn test_percentage_of() {
        let spent = Money::from_cents(7500);
        let budget = Money::from_cents(10000);
        assert!((spent.percentage_of(budget) - 75.0).abs() < f64::EPSILON);
        assert_eq!(spent.percentage_of(Money::zero()), 0.0);
    }

    #[test]
    fn test_sum() {
        let amounts = vec![
            Money::from_cents(100),
            Money::from_cents(200),
            Money::from_cents(300),
        ];
        let by_ref: Money = amounts.iter().sum();
        let total: Money = amounts.into_iter().sum();
        assert_eq!(total.cents(), 600);
        assert_eq!(by_ref, total);
    }

    #[test]
    fn test_serialization() {
        let m = Money::from_cents(1050);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(json, "1050");

        let deserialized: Money = serde_json::from_str(&json).unwrap();
        assert_eq!(m, deserialized);
    }
}
