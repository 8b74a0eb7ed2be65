//! Money in integer minor currency units.
//!
//! All prices and totals in Sundry are integers in the smallest unit of the
//! currency (cents for USD). Floating point never touches an amount, and all
//! arithmetic is overflow-checked.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors from money arithmetic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MoneyError {
    /// A multiplication or addition overflowed `i64`.
    #[error("money arithmetic overflowed")]
    Overflow,
    /// An amount that must not be negative was negative.
    #[error("negative amount: {0}")]
    Negative(i64),
}

/// An amount of money in minor currency units (e.g. cents).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Money(i64);

impl Money {
    /// Zero amount.
    pub const ZERO: Self = Self(0);

    /// Create an amount from minor units.
    #[must_use]
    pub const fn from_minor(minor: i64) -> Self {
        Self(minor)
    }

    /// Get the amount in minor units.
    #[must_use]
    pub const fn as_minor(&self) -> i64 {
        self.0
    }

    /// Multiply a unit price by a quantity, checking for overflow.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the product exceeds `i64`.
    pub fn checked_mul(self, quantity: u32) -> Result<Self, MoneyError> {
        self.0
            .checked_mul(i64::from(quantity))
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Add two amounts, checking for overflow.
    ///
    /// # Errors
    ///
    /// Returns [`MoneyError::Overflow`] if the sum exceeds `i64`.
    pub fn checked_add(self, other: Self) -> Result<Self, MoneyError> {
        self.0
            .checked_add(other.0)
            .map(Self)
            .ok_or(MoneyError::Overflow)
    }

    /// Whether this amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl std::fmt::Display for Money {
    /// Format as a major-unit decimal, e.g. `13.00` for 1300 minor units.
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let abs = self.0.unsigned_abs();
        write!(f, "{sign}{}.{:02}", abs / 100, abs % 100)
    }
}

impl From<i64> for Money {
    fn from(minor: i64) -> Self {
        Self(minor)
    }
}

impl From<Money> for i64 {
    fn from(money: Money) -> Self {
        money.0
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Type<sqlx::Postgres> for Money {
    fn type_info() -> sqlx::postgres::PgTypeInfo {
        <i64 as sqlx::Type<sqlx::Postgres>>::type_info()
    }
}

#[cfg(feature = "postgres")]
impl<'r> sqlx::Decode<'r, sqlx::Postgres> for Money {
    fn decode(
        value: sqlx::postgres::PgValueRef<'r>,
    ) -> Result<Self, sqlx::error::BoxDynError> {
        let minor = <i64 as sqlx::Decode<sqlx::Postgres>>::decode(value)?;
        Ok(Self(minor))
    }
}

#[cfg(feature = "postgres")]
impl sqlx::Encode<'_, sqlx::Postgres> for Money {
    fn encode_by_ref(
        &self,
        buf: &mut sqlx::postgres::PgArgumentBuffer,
    ) -> Result<sqlx::encode::IsNull, sqlx::error::BoxDynError> {
        <i64 as sqlx::Encode<sqlx::Postgres>>::encode_by_ref(&self.0, buf)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_mul() {
        let price = Money::from_minor(500);
        assert_eq!(price.checked_mul(2).unwrap(), Money::from_minor(1000));
    }

    #[test]
    fn test_checked_mul_overflow() {
        let price = Money::from_minor(i64::MAX);
        assert_eq!(price.checked_mul(2), Err(MoneyError::Overflow));
    }

    #[test]
    fn test_checked_add() {
        let a = Money::from_minor(1000);
        let b = Money::from_minor(300);
        assert_eq!(a.checked_add(b).unwrap(), Money::from_minor(1300));
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_minor(1300).to_string(), "13.00");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_minor(-250).to_string(), "-2.50");
    }

    #[test]
    fn test_is_zero() {
        assert!(Money::ZERO.is_zero());
        assert!(!Money::from_minor(1).is_zero());
    }
}
