//! Integer price representation.
//!
//! The REST API quotes every price in whole currency units (rupees), so the
//! wrapper is a plain `i64`. All arithmetic stays in integers; percentage
//! calculations round half-up to the nearest unit.

use core::fmt;
use core::iter::Sum;
use core::ops::{Add, AddAssign};

use serde::{Deserialize, Serialize};

/// A price in whole currency units.
///
/// Invariant: prices coming from the API boundary are validated to be
/// non-negative before a `Price` is constructed from them.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct Price(i64);

impl Price {
    /// A price of zero.
    pub const ZERO: Self = Self(0);

    /// Create a new price.
    #[must_use]
    pub const fn new(amount: i64) -> Self {
        Self(amount)
    }

    /// Get the amount in whole currency units.
    #[must_use]
    pub const fn amount(&self) -> i64 {
        self.0
    }

    /// Whether the amount is zero.
    #[must_use]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Multiply a unit price by a quantity.
    #[must_use]
    pub const fn times(self, quantity: u32) -> Self {
        Self(self.0 * quantity as i64)
    }

    /// Take a percentage of the price, rounded half-up to the nearest unit.
    ///
    /// ```
    /// use vexa_core::Price;
    ///
    /// // 18% of 599 is 107.82, which rounds to 108
    /// assert_eq!(Price::new(599).percent(18), Price::new(108));
    /// ```
    #[must_use]
    pub const fn percent(self, percent: u32) -> Self {
        Self((self.0 * percent as i64 + 50) / 100)
    }
}

impl Add for Price {
    type Output = Self;

    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl AddAssign for Price {
    fn add_assign(&mut self, rhs: Self) {
        self.0 += rhs.0;
    }
}

impl Sum for Price {
    fn sum<I: Iterator<Item = Self>>(iter: I) -> Self {
        iter.fold(Self::ZERO, Add::add)
    }
}

impl fmt::Display for Price {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "₹{}", self.0)
    }
}

impl From<i64> for Price {
    fn from(amount: i64) -> Self {
        Self(amount)
    }
}
