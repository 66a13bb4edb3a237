//! # Money
//!
//! Integer cents for every price, subtotal, total and report figure.
//!
//! Prices enter the system as text and are parsed straight into cents by
//! the validator, so no amount ever passes through `f64` on its way into the
//! ledger. A sale of 3 × $33.33 totals exactly $99.99, and a sale total
//! always equals the sum of its line subtotals.
//!
//! The only float in this module is [`Money::split_evenly_raw`], the
//! unrounded average shown next to the rounded one.
//!
//! ```rust
//! use cantina_core::money::Money;
//!
//! let price = Money::from_cents(10_000); // $100.00
//! let subtotal = price * 3;              // $300.00
//! assert_eq!(subtotal.cents(), 30_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};
use ts_rs::TS;

// =============================================================================
// Money
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// Product.price_cents ──► quantity × price ──► SaleLine.subtotal_cents
///                                                   │
///                                   Σ subtotals ──► Sale.total_cents
///                                                   │
///                         Σ totals per day/month ──► report values
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Wraps a raw cent amount.
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from whole units and cents.
    ///
    /// For negative amounts only the major unit carries the sign:
    /// `from_major_minor(-5, 50)` is -5.50.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Returns the value in cents.
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the whole-unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the cents portion (always 0-99).
    #[inline]
    pub const fn cents_part(&self) -> i64 {
        (self.0 % 100).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative.
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies a unit price by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use cantina_core::money::Money;
    ///
    /// let unit_price = Money::from_cents(299);
    /// assert_eq!(unit_price.multiply_quantity(3).cents(), 897);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }

    /// Splits the amount evenly over `count`, rounding half away from zero
    /// to the nearest cent. Returns zero when `count` is zero.
    ///
    /// Used for the average ticket: 350.00 over 3 sales is 116.67.
    ///
    /// ## Example
    /// ```rust
    /// use cantina_core::money::Money;
    ///
    /// let total = Money::from_cents(35_000);
    /// assert_eq!(total.split_evenly(3).cents(), 11_667);
    /// assert_eq!(total.split_evenly(0).cents(), 0);
    /// ```
    pub fn split_evenly(&self, count: i64) -> Money {
        if count == 0 {
            return Money::zero();
        }

        // Use i128 so a huge total cannot overflow while doubling
        let numerator = self.0 as i128 * 2;
        let denominator = count as i128 * 2;
        let half = count as i128;

        let rounded = if (numerator >= 0) == (denominator > 0) {
            (numerator + half) / denominator
        } else {
            (numerator - half) / denominator
        };

        Money::from_cents(rounded as i64)
    }

    /// Same as [`Money::split_evenly`] without rounding, in whole units.
    pub fn split_evenly_raw(&self, count: i64) -> f64 {
        if count == 0 {
            return 0.0;
        }
        self.0 as f64 / 100.0 / count as f64
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display shows money as `$1234.56`.
///
/// Locale formatting (thousands separators, comma decimals) belongs to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.cents_part())
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by a quantity.
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
