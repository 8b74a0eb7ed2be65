//! Cart quantity with the `>= 1` invariant enforced at the type level.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error constructing a [`Quantity`].
#[derive(Debug, Error, PartialEq, Eq)]
pub enum QuantityError {
    /// Quantities are always at least one.
    #[error("quantity must be at least 1, got {0}")]
    TooSmall(i32),
}

/// A cart-item quantity. Always `>= 1`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub struct Quantity(u32);

impl Quantity {
    /// The default quantity for a freshly added cart item.
    pub const ONE: Self = Self(1);

    /// Create a quantity from a raw count.
    ///
    /// # Errors
    ///
    /// Returns [`QuantityError::TooSmall`] for zero or negative counts.
    pub fn new(count: i32) -> Result<Self, QuantityError> {
        u32::try_from(count)
            .ok()
            .filter(|&c| c >= 1)
            .map(Self)
            .ok_or(QuantityError::TooSmall(count))
    }

    /// Get the count as `u32`.
    #[must_use]
    pub const fn get(&self) -> u32 {
        self.0
    }

    /// The quantity incremented by one, saturating at `u32::MAX`.
    #[must_use]
    pub const fn incremented(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl Default for Quantity {
    fn default() -> Self {
        Self::ONE
    }
}

impl std::fmt::Display for Quantity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i32> for Quantity {
    type Error = QuantityError;

    fn try_from(count: i32) -> Result<Self, Self::Error> {
        Self::new(count)
    }
}

impl From<Quantity> for i32 {
    fn from(quantity: Quantity) -> Self {
        // Postgres INT columns cap well below u32::MAX in practice; clamp on the way out.
        i32::try_from(quantity.0).unwrap_or(i32::MAX)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_new_rejects_zero_and_negative() {
        assert_eq!(Quantity::new(0), Err(QuantityError::TooSmall(0)));
        assert_eq!(Quantity::new(-3), Err(QuantityError::TooSmall(-3)));
    }

    #[test]
    fn test_new_accepts_positive() {
        assert_eq!(Quantity::new(2).unwrap().get(), 2);
    }

    #[test]
    fn test_default_is_one() {
        assert_eq!(Quantity::default(), Quantity::ONE);
    }

    #[test]
    fn test_incremented() {
        assert_eq!(Quantity::ONE.incremented().get(), 2);
    }
}
