//! # Money Module
//!
//! Provides the `Money` type for handling monetary values safely.
//!
//! ## Why Integer Money?
//! Floating point cannot represent retail amounts exactly, and rounding
//! errors compound across a ledger. Rupiah has no sub-unit in practice, so
//! every value in the system is a whole-rupiah `i64`: the database, the
//! calculations, and the API all use the same integer representation.
//!
//! ## Usage
//! ```rust
//! use kaos_core::money::Money;
//!
//! let price = Money::from_rupiah(95_000);
//! let line_total = price.multiply_quantity(10);
//! assert_eq!(line_total.rupiah(), 950_000);
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in whole rupiah.
///
/// ## Design Decisions
/// - **i64 (signed)**: allows negative values for corrections and balances
/// - **Single field tuple struct**: zero-cost abstraction over i64
/// - **Derives**: full serde support for JSON serialization
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from whole rupiah.
    #[inline]
    pub const fn from_rupiah(amount: i64) -> Self {
        Money(amount)
    }

    /// Returns the value in whole rupiah.
    #[inline]
    pub const fn rupiah(&self) -> i64 {
        self.0
    }

    /// Zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is positive (greater than zero).
    #[inline]
    pub const fn is_positive(&self) -> bool {
        self.0 > 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Returns the absolute value.
    #[inline]
    pub const fn abs(&self) -> Self {
        Money(self.0.abs())
    }

    /// Multiplies money by a quantity.
    ///
    /// ## Example
    /// ```rust
    /// use kaos_core::money::Money;
    ///
    /// let unit_price = Money::from_rupiah(1_000);
    /// assert_eq!(unit_price.multiply_quantity(20).rupiah(), 20_000);
    /// ```
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Display implementation shows money as "Rp95.000" (Indonesian grouping).
///
/// ## Note
/// This is for logs and debugging. UI formatting handles localization.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}Rp{}", sign, group_thousands(self.0.unsigned_abs()))
    }
}

/// Groups digits with '.' separators: 2750000 -> "2.750.000".
fn group_thousands(mut value: u64) -> String {
    if value == 0 {
        return "0".to_string();
    }

    let mut groups = Vec::new();
    while value > 0 {
        groups.push(value % 1000);
        value /= 1000;
    }

    let mut out = String::new();
    for (i, group) in groups.iter().rev().enumerate() {
        if i == 0 {
            out.push_str(&group.to_string());
        } else {
            out.push_str(&format!(".{:03}", group));
        }
    }
    out
}

/// Addition of two Money values.
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0 + other.0)
    }
}

/// Addition assignment (+=).
impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 += other.0;
    }
}

/// Subtraction of two Money values.
impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0 - other.0)
    }
}

/// Subtraction assignment (-=).
impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 -= other.0;
    }
}

/// Multiplication by i64 (for quantity calculations).
impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0 * qty)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_rupiah() {
        let money = Money::from_rupiah(95_000);
        assert_eq!(money.rupiah(), 95_000);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_rupiah(95_000)), "Rp95.000");
        assert_eq!(format!("{}", Money::from_rupiah(2_750_000)), "Rp2.750.000");
        assert_eq!(format!("{}", Money::from_rupiah(500)), "Rp500");
        assert_eq!(format!("{}", Money::from_rupiah(0)), "Rp0");
        assert_eq!(format!("{}", Money::from_rupiah(-1_500)), "-Rp1.500");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_rupiah(100_000);
        let b = Money::from_rupiah(45_000);

        assert_eq!((a + b).rupiah(), 145_000);
        assert_eq!((a - b).rupiah(), 55_000);
        let result: Money = a * 3;
        assert_eq!(result.rupiah(), 300_000);
    }

    #[test]
    fn test_multiply_quantity() {
        let unit_price = Money::from_rupiah(110_000);
        assert_eq!(unit_price.multiply_quantity(15).rupiah(), 1_650_000);
    }

    #[test]
    fn test_zero_and_checks() {
        let zero = Money::zero();
        assert!(zero.is_zero());
        assert!(!zero.is_positive());
        assert!(!zero.is_negative());

        let negative = Money::from_rupiah(-100);
        assert!(negative.is_negative());
        assert_eq!(negative.abs().rupiah(), 100);
    }
}
