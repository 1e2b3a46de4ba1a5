//! Money type for decimal currency values.
//!
//! This module provides the `Money` type, which wraps `Decimal` and is the single
//! coercion boundary for currency values entering the data model. Inputs may carry
//! a dollar sign and thousands commas; anything malformed coerces to zero via
//! [`Money::parse_or_zero`] so that every function downstream can assume a
//! well-formed, non-NaN value and never re-validate.

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::fmt::{Display, Formatter};
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use std::str::FromStr;

/// A non-NaN decimal currency value.
///
/// Two parsing paths exist on purpose:
/// - [`FromStr`] is strict and errors on malformed input. This is what the CLI
///   uses, because a typo should not silently become `$0.00`.
/// - [`Money::parse_or_zero`] is total and degrades malformed input to zero.
///   This is what the serde and database boundaries use, because stored data
///   may carry the original application's loosely-typed money fields.
///
/// ```
/// # use carryover::model::Money;
/// # use std::str::FromStr;
/// let strict = Money::from_str("-$1,250.00").unwrap();
/// let lenient = Money::parse_or_zero("not a number");
/// assert_eq!(strict.to_string(), "-$1,250.00");
/// assert!(lenient.is_zero());
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Money(Decimal);

impl Money {
    pub const ZERO: Money = Money(Decimal::ZERO);

    /// Creates a new `Money` from a `Decimal` value.
    pub const fn new(value: Decimal) -> Self {
        Self(value)
    }

    /// Returns the underlying `Decimal` value.
    pub fn value(&self) -> Decimal {
        self.0
    }

    /// Parses a currency string, coercing anything unparseable to zero.
    ///
    /// Accepts an optional leading `-`, an optional `$`, and thousands commas.
    /// Empty and whitespace-only input is zero.
    pub fn parse_or_zero(s: &str) -> Self {
        Self::from_str(s).unwrap_or_default()
    }

    /// Returns true if the amount is zero.
    pub fn is_zero(&self) -> bool {
        self.0.is_zero()
    }

    /// Returns true if the amount is strictly positive.
    pub fn is_positive(&self) -> bool {
        !self.is_zero() && self.0.is_sign_positive()
    }

    /// Returns true if the amount is negative.
    pub fn is_negative(&self) -> bool {
        !self.is_zero() && self.0.is_sign_negative()
    }

    /// Returns the larger of the two amounts.
    pub fn max(self, other: Money) -> Money {
        if other.0 > self.0 {
            other
        } else {
            self
        }
    }

    /// Returns `self` clamped to be no smaller than zero.
    pub fn floor_zero(self) -> Money {
        self.max(Money::ZERO)
    }
}

/// Strips the `$` sign and thousands commas from a currency string.
fn normalize(s: &str) -> String {
    let trimmed = s.trim();
    let without_dollar = if let Some(after_minus) = trimmed.strip_prefix('-') {
        if let Some(after_dollar) = after_minus.strip_prefix('$') {
            format!("-{after_dollar}")
        } else {
            trimmed.to_string()
        }
    } else if let Some(after_dollar) = trimmed.strip_prefix('$') {
        after_dollar.to_string()
    } else {
        trimmed.to_string()
    };
    without_dollar.replace(',', "")
}

impl FromStr for Money {
    type Err = rust_decimal::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let normalized = normalize(s);
        if normalized.is_empty() {
            return Ok(Money::ZERO);
        }
        Decimal::from_str(&normalized).map(Money)
    }
}

impl Display for Money {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        let (sign, num) = if self.is_negative() {
            ("-", self.0.abs())
        } else {
            ("", self.0)
        };
        write!(
            f,
            "{sign}${}",
            format_num::format_num!(",.2", num.to_f64().unwrap_or_default())
        )
    }
}

impl Add for Money {
    type Output = Money;

    fn add(self, rhs: Money) -> Money {
        Money(self.0 + rhs.0)
    }
}

impl AddAssign for Money {
    fn add_assign(&mut self, rhs: Money) {
        self.0 += rhs.0;
    }
}

impl Sub for Money {
    type Output = Money;

    fn sub(self, rhs: Money) -> Money {
        Money(self.0 - rhs.0)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Money {
        iter.fold(Money::ZERO, Add::add)
    }
}

impl From<Decimal> for Money {
    fn from(value: Decimal) -> Self {
        Money(value)
    }
}

impl From<i64> for Money {
    fn from(value: i64) -> Self {
        Money(Decimal::from(value))
    }
}

impl From<Money> for Decimal {
    fn from(money: Money) -> Self {
        money.value()
    }
}

impl Serialize for Money {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&self.0.to_string())
    }
}

/// The shapes a money value may take on the wire. The original application
/// stored money fields as numbers, strings, or nothing at all.
#[derive(Deserialize)]
#[serde(untagged)]
enum MoneyRepr {
    Number(f64),
    Text(String),
}

impl<'de> Deserialize<'de> for Money {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let repr = Option::<MoneyRepr>::deserialize(deserializer)?;
        Ok(match repr {
            None => Money::ZERO,
            Some(MoneyRepr::Number(n)) => {
                Money(Decimal::from_f64_retain(n).unwrap_or_default())
            }
            Some(MoneyRepr::Text(s)) => Money::parse_or_zero(&s),
        })
    }
}
