//! # Money
//!
//! Prices and totals as integer cents.
//!
//! ## Why Not f64?
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  The backend sends prices as JSON numbers:                              │
//! │    { "price": 19.99 }                                                   │
//! │                                                                         │
//! │  Summed as floats across a cart:                                        │
//! │    19.99 × 3 = 59.97000000000001  ❌ WRONG!                             │
//! │                                                                         │
//! │  Instead the API boundary converts 19.99 → 1999 once,                   │
//! │  and every total after that is exact integer math.                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use shopfront_core::money::Money;
//!
//! let line = Money::from_cents(1099).multiply_quantity(3);
//! assert_eq!(line.cents(), 3297);
//! assert_eq!(line.to_string(), "$32.97");
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::iter::Sum;
use std::ops::{Add, AddAssign, Sub};
use ts_rs::TS;

use crate::types::TaxRate;

// =============================================================================
// Money Type
// =============================================================================

/// Monetary value in the smallest currency unit (cents).
///
/// Serializes as a bare integer, so `checkoutData` carries `6000` for
/// $60.00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Money(i64);

impl Money {
    /// ```rust
    /// use shopfront_core::money::Money;
    ///
    /// assert_eq!(Money::from_cents(1099).to_string(), "$10.99");
    /// ```
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
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

    /// Tax owed on this amount at `rate`, rounded half up to the cent.
    ///
    /// ```rust
    /// use shopfront_core::money::Money;
    /// use shopfront_core::types::TaxRate;
    ///
    /// // $10.00 at 8.25%
    /// let tax = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825));
    /// assert_eq!(tax.cents(), 83);
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        // i128 so large carts at high rates cannot overflow
        let scaled = self.0 as i128 * rate.bps() as i128;
        Money::from_cents(((scaled + 5000) / 10000) as i64)
    }

    /// Price of `qty` units at this unit price.
    #[inline]
    pub const fn multiply_quantity(&self, qty: u32) -> Self {
        Money(self.0.saturating_mul(qty as i64))
    }
}

// =============================================================================
// Trait Implementations
// =============================================================================

/// Human-readable form, e.g. `$60.00`.
///
/// ## Note
/// Views do their own localized formatting; this is for logs and the CLI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let abs = self.0.unsigned_abs();
        if self.0 < 0 {
            f.write_str("-")?;
        }
        write!(f, "${}.{:02}", abs / 100, abs % 100)
    }
}

impl Default for Money {
    fn default() -> Self {
        Money::zero()
    }
}

/// Arithmetic saturates at the `i64` bounds, like [`Money::multiply_quantity`].
impl Add for Money {
    type Output = Self;

    #[inline]
    fn add(self, other: Self) -> Self {
        Money(self.0.saturating_add(other.0))
    }
}

impl AddAssign for Money {
    #[inline]
    fn add_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_add(other.0);
    }
}

impl Sub for Money {
    type Output = Self;

    #[inline]
    fn sub(self, other: Self) -> Self {
        Money(self.0.saturating_sub(other.0))
    }
}

impl Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), Add::add)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
