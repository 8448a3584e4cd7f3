//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  THE FLOATING POINT PROBLEM                                             │
//! │                                                                         │
//! │  In floating point:                                                     │
//! │    0.1 + 0.2 = 0.30000000000000004  ❌ WRONG!                           │
//! │                                                                         │
//! │  OUR SOLUTION: Integer minor units                                      │
//! │    Coupon amounts are stored as DECIMAL(12,2) upstream, so one          │
//! │    minor unit = 1/100 of the major unit. 50,000.00 = 5_000_000 minor.   │
//! │                                                                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use alo_core::money::Money;
//!
//! let subtotal = Money::from_major(120_000);
//! let fee = Money::from_minor(1_550_000); // 15,500.00
//!
//! assert_eq!((subtotal + fee).to_string(), "135,500");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Sub, SubAssign};
use ts_rs::TS;

use crate::types::Percent;

/// Minor units per major unit.
pub const MINOR_PER_MAJOR: i64 = 100;

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in minor currency units.
///
/// ## Design Decisions
/// - **i64 (signed)**: subtraction never panics on the way to a clamp
/// - **Single field tuple struct**: Zero-cost abstraction over i64
/// - **Ord**: `min`/`max`/`clamp` come for free, which the evaluator leans on
///
/// ## Where Money is Used
/// ```text
/// Cart subtotal ──► CheckoutContext.subtotal ──► evaluate() ──► discount
///                                                    ▲
/// Coupon.discount_value / min_order / max_discount ──┘
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from minor units.
    ///
    /// ```rust
    /// use alo_core::money::Money;
    ///
    /// let fee = Money::from_minor(1_550_000);
    /// assert_eq!(fee.minor_units(), 1_550_000);
    /// assert_eq!(fee.major(), 15_500);
    /// ```
    #[inline]
    pub const fn from_minor(minor: i64) -> Self {
        Money(minor)
    }

    /// Creates a Money value from whole major units.
    #[inline]
    pub const fn from_major(major: i64) -> Self {
        Money(major * MINOR_PER_MAJOR)
    }

    /// Like [`Money::from_major`], but `None` when the minor-unit value
    /// would not fit in an `i64`.
    #[inline]
    pub const fn checked_from_major(major: i64) -> Option<Self> {
        match major.checked_mul(MINOR_PER_MAJOR) {
            Some(minor) => Some(Money(minor)),
            None => None,
        }
    }

    /// Returns the value in minor units.
    #[inline]
    pub const fn minor_units(&self) -> i64 {
        self.0
    }

    /// Returns the whole major-unit portion (truncated toward zero).
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / MINOR_PER_MAJOR
    }

    /// Returns the minor-unit remainder (always 0-99).
    #[inline]
    pub const fn minor_part(&self) -> i64 {
        (self.0 % MINOR_PER_MAJOR).abs()
    }

    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns this value, or zero if it is negative.
    #[inline]
    pub const fn non_negative(self) -> Self {
        if self.0 < 0 {
            Money(0)
        } else {
            self
        }
    }

    /// Takes a percentage of this amount, rounding down to the minor unit.
    ///
    /// The result never exceeds the exact percentage.
    ///
    /// ```rust
    /// use alo_core::money::Money;
    /// use alo_core::types::Percent;
    ///
    /// let subtotal = Money::from_minor(12_345);
    /// // 12,345 × 10% = 1,234.5 → 1,234
    /// assert_eq!(subtotal.percent_of(Percent::from_whole(10)).minor_units(), 1_234);
    /// ```
    pub fn percent_of(&self, pct: Percent) -> Money {
        // i128 keeps large subtotals from overflowing before the divide
        let product = self.0 as i128 * pct.bps() as i128;
        Money::from_minor(product.div_euclid(10_000) as i64)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display groups thousands with commas and drops a zero fraction,
/// e.g. `50,000` or `1,234.50`.
///
/// This is what checkout messages embed; locale-aware formatting
/// belongs to the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        let digits = self.major().unsigned_abs().to_string();

        let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (digits.len() - i) % 3 == 0 {
                grouped.push(',');
            }
            grouped.push(ch);
        }

        if self.minor_part() == 0 {
            write!(f, "{}{}", sign, grouped)
        } else {
            write!(f, "{}{}.{:02}", sign, grouped, self.minor_part())
        }
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_checked_from_major() {
        assert_eq!(Money::checked_from_major(300_000), Some(Money::from_major(300_000)));
        assert_eq!(
            Money::checked_from_major(i64::MAX / 100),
            Some(Money::from_minor(i64::MAX / 100 * 100))
        );
        assert_eq!(Money::checked_from_major(i64::MAX / 100 + 1), None);
        assert_eq!(Money::checked_from_major(i64::MIN), None);
    }

    #[test]
    fn test_from_major_and_minor() {
        let money = Money::from_major(50_000);
        assert_eq!(money.minor_units(), 5_000_000);
        assert_eq!(money.major(), 50_000);
        assert_eq!(money.minor_part(), 0);

        let odd = Money::from_minor(123_450);
        assert_eq!(odd.major(), 1_234);
        assert_eq!(odd.minor_part(), 50);
    }

    #[test]
    fn test_display() {
        assert_eq!(Money::from_major(50_000).to_string(), "50,000");
        assert_eq!(Money::from_major(1_000_000).to_string(), "1,000,000");
        assert_eq!(Money::from_major(999).to_string(), "999");
        assert_eq!(Money::from_minor(123_450).to_string(), "1,234.50");
        assert_eq!(Money::from_minor(5).to_string(), "0.05");
        assert_eq!(Money::from_major(-2_500).to_string(), "-2,500");
        assert_eq!(Money::zero().to_string(), "0");
    }

    #[test]
    fn test_percent_of_rounds_down() {
        let subtotal = Money::from_major(1_000_000);
        assert_eq!(
            subtotal.percent_of(Percent::from_whole(20)),
            Money::from_major(200_000)
        );

        // 999 minor × 12.5% = 124.875 → 124
        let odd = Money::from_minor(999);
        assert_eq!(odd.percent_of(Percent::from_bps(1_250)).minor_units(), 124);
    }

    #[test]
    fn test_non_negative() {
        assert_eq!(Money::from_minor(-10).non_negative(), Money::zero());
        assert_eq!(Money::from_minor(10).non_negative(), Money::from_minor(10));
    }

    #[test]
    fn test_arithmetic_and_ordering() {
        let a = Money::from_major(100);
        let b = Money::from_major(30);

        assert_eq!(a + b, Money::from_major(130));
        assert_eq!(a - b, Money::from_major(70));
        assert_eq!(a.min(b), b);
        assert!((b - a).is_negative());
    }
}
