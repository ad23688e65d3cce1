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
//! │  Re-parsing a displayed "$2.916" back into a number loses the cents     │
//! │  that the display rounded away.                                         │
//! │                                                                         │
//! │  OUR SOLUTION: Integer Cents, formatted only at the render boundary     │
//! │    291_550 cents stays 291_550 cents through every calculation          │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//! ```rust
//! use gest_core::money::Money;
//!
//! let price = Money::from_cents(1099);     // 10.99
//! let doubled = price * 2;                 // 21.98
//! let total = price + Money::from_cents(500);
//! assert_eq!(total.cents(), 1599);
//! assert_eq!(doubled.cents(), 2198);
//!
//! // Decimal text (user input, JSON numbers) is parsed exactly
//! assert_eq!(Money::from_decimal_str("19.99"), Some(Money::from_cents(1999)));
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, AddAssign, Mul, Sub, SubAssign};

use crate::types::{DiscountRate, TaxRate};

// =============================================================================
// Money Type
// =============================================================================

/// A monetary value in the smallest currency unit (cents).
///
/// ## Where Money is Used
/// ```text
/// ProductHit.price ──► LineItem.unit_price ──► line subtotal
///                                                   │
///             SaleTotals.subtotal ◄─────────────────┘
///                    │
///                    ├──► order discount ──► tax ──► total ──► change
///                    │
///                    └──► formatted by CurrencyFormat for display only
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Money(i64);

impl Money {
    /// Creates a Money value from cents (the smallest currency unit).
    #[inline]
    pub const fn from_cents(cents: i64) -> Self {
        Money(cents)
    }

    /// Creates a Money value from major and minor units.
    ///
    /// ## Example
    /// ```rust
    /// use gest_core::money::Money;
    ///
    /// assert_eq!(Money::from_major_minor(10, 99).cents(), 1099);
    /// assert_eq!(Money::from_major_minor(-5, 50).cents(), -550);
    /// ```
    ///
    /// ## Note
    /// For negative amounts, only the major unit should be negative.
    #[inline]
    pub const fn from_major_minor(major: i64, minor: i64) -> Self {
        if major < 0 {
            Money(major * 100 - minor)
        } else {
            Money(major * 100 + minor)
        }
    }

    /// Parses decimal text such as `"2915.5"` or `"-3"` into Money.
    ///
    /// The text is parsed digit by digit, never through a float. A third
    /// fractional digit rounds half up; anything further is ignored.
    /// Returns `None` for empty or malformed text (including exponents and
    /// thousands separators).
    ///
    /// ## Example
    /// ```rust
    /// use gest_core::money::Money;
    ///
    /// assert_eq!(Money::from_decimal_str("3000"), Some(Money::from_cents(300_000)));
    /// assert_eq!(Money::from_decimal_str(" 84.5 "), Some(Money::from_cents(8_450)));
    /// assert_eq!(Money::from_decimal_str("1.005"), Some(Money::from_cents(101)));
    /// assert_eq!(Money::from_decimal_str("abc"), None);
    /// ```
    pub fn from_decimal_str(text: &str) -> Option<Money> {
        parse_hundredths(text).map(Money)
    }

    /// Returns the value in cents (smallest currency unit).
    #[inline]
    pub const fn cents(&self) -> i64 {
        self.0
    }

    /// Returns the major unit portion.
    #[inline]
    pub const fn major(&self) -> i64 {
        self.0 / 100
    }

    /// Returns the minor unit portion (always 0-99).
    #[inline]
    pub const fn minor(&self) -> i64 {
        (self.0 % 100).abs()
    }

    /// Returns zero money value.
    #[inline]
    pub const fn zero() -> Self {
        Money(0)
    }

    /// Checks if the value is zero.
    #[inline]
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }

    /// Checks if the value is negative (less than zero).
    #[inline]
    pub const fn is_negative(&self) -> bool {
        self.0 < 0
    }

    /// Clamps negative values to zero.
    #[inline]
    pub const fn non_negative(&self) -> Self {
        if self.is_negative() {
            Money(0)
        } else {
            *self
        }
    }

    /// Calculates tax on this amount.
    ///
    /// ## Implementation
    /// Integer math: `(amount * rate + 5000) / 10000`.
    /// The +5000 rounds the half cent up (5000/10000 = 0.5).
    ///
    /// ## Example
    /// ```rust
    /// use gest_core::money::Money;
    /// use gest_core::types::TaxRate;
    ///
    /// let base = Money::from_cents(245_000);  // 2450.00
    /// let tax = base.calculate_tax(TaxRate::from_bps(1900));
    /// assert_eq!(tax.cents(), 46_550);         // 465.50
    /// ```
    pub fn calculate_tax(&self, rate: TaxRate) -> Money {
        Money::from_cents(Self::percentage_of(self.0, rate.bps()))
    }

    /// Returns the amount a percentage discount takes off this value.
    ///
    /// ## Example
    /// ```rust
    /// use gest_core::money::Money;
    /// use gest_core::types::DiscountRate;
    ///
    /// let line = Money::from_cents(50_000);
    /// assert_eq!(line.discount_amount(DiscountRate::from_bps(1000)).cents(), 5_000);
    /// ```
    pub fn discount_amount(&self, rate: DiscountRate) -> Money {
        Money::from_cents(Self::percentage_of(self.0, rate.bps()))
    }

    /// Applies a percentage discount and returns the discounted amount.
    ///
    /// ## Example
    /// ```rust
    /// use gest_core::money::Money;
    /// use gest_core::types::DiscountRate;
    ///
    /// let subtotal = Money::from_cents(10_000);
    /// let discounted = subtotal.apply_percentage_discount(DiscountRate::from_bps(1000));
    /// assert_eq!(discounted.cents(), 9_000);
    /// ```
    pub fn apply_percentage_discount(&self, rate: DiscountRate) -> Money {
        *self - self.discount_amount(rate)
    }

    /// Multiplies money by a quantity, saturating at the i64 bounds.
    #[inline]
    pub const fn multiply_quantity(&self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }

    /// Multiplies money by a quantity, `None` on overflow.
    #[inline]
    pub const fn checked_multiply_quantity(&self, qty: i64) -> Option<Self> {
        match self.0.checked_mul(qty) {
            Some(cents) => Some(Money(cents)),
            None => None,
        }
    }

    /// Renders the amount as plain decimal text (`"1000.00"`, `"-5.50"`).
    ///
    /// Used for machine-readable fields such as form payloads.
    pub fn to_decimal_string(&self) -> String {
        let sign = if self.0 < 0 { "-" } else { "" };
        format!("{}{}.{:02}", sign, self.major().abs(), self.minor())
    }

    // i128 keeps large amounts from overflowing before the division
    fn percentage_of(cents: i64, bps: u32) -> i64 {
        let scaled = cents as i128 * bps as i128;
        let rounded = if scaled >= 0 {
            (scaled + 5000) / 10000
        } else {
            (scaled - 5000) / 10000
        };
        rounded.clamp(i64::MIN as i128, i64::MAX as i128) as i64
    }
}

/// Parses decimal text into hundredths (`"12.5"` → `1250`).
///
/// Shared by money amounts (cents) and percentages (basis points).
pub(crate) fn parse_hundredths(text: &str) -> Option<i64> {
    let text = text.trim();
    let (negative, body) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text.strip_prefix('+').unwrap_or(text)),
    };

    let (whole, frac) = body.split_once('.').unwrap_or((body, ""));

    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let major: i64 = if whole.is_empty() { 0 } else { whole.parse().ok()? };

    let mut digits = frac.bytes().map(|b| (b - b'0') as i64);
    let tenths = digits.next().unwrap_or(0);
    let hundredths = digits.next().unwrap_or(0);
    let round_up = digits.next().map(|d| d >= 5).unwrap_or(false);

    let mut value = major.checked_mul(100)?.checked_add(tenths * 10 + hundredths)?;
    if round_up {
        value = value.checked_add(1)?;
    }

    Some(if negative { -value } else { value })
}

/// Rewrites scientific notation as plain decimal text (`"2.5E2"` → `"250"`).
///
/// Text without an exponent is returned unchanged. Returns `None` when the
/// mantissa or the exponent is malformed, or the exponent is out of range.
pub(crate) fn expand_exponent(text: &str) -> Option<String> {
    let text = text.trim();
    let Some((mantissa, exponent)) = text.split_once(['e', 'E']) else {
        return Some(text.to_string());
    };

    let exponent: i32 = exponent.strip_prefix('+').unwrap_or(exponent).parse().ok()?;
    if exponent.unsigned_abs() > MAX_EXPONENT {
        return None;
    }

    let (sign, body) = match mantissa.strip_prefix('-') {
        Some(rest) => ("-", rest),
        None => ("", mantissa.strip_prefix('+').unwrap_or(mantissa)),
    };
    let (whole, frac) = body.split_once('.').unwrap_or((body, ""));
    if whole.is_empty() && frac.is_empty() {
        return None;
    }
    if !whole.chars().all(|c| c.is_ascii_digit()) || !frac.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let digits = format!("{}{}", whole, frac);
    // Position of the decimal point inside `digits` after the shift
    let point = whole.len() as i32 + exponent;

    let plain = if point <= 0 {
        format!("0.{}{}", "0".repeat(point.unsigned_abs() as usize), digits)
    } else if point as usize >= digits.len() {
        format!("{}{}", digits, "0".repeat(point as usize - digits.len()))
    } else {
        let (int_part, frac_part) = digits.split_at(point as usize);
        format!("{}.{}", int_part, frac_part)
    };

    Some(format!("{}{}", sign, plain))
}

/// Largest exponent magnitude accepted in scientific notation.
const MAX_EXPONENT: u32 = 30;

// =============================================================================
// Trait Implementations
// =============================================================================

/// Debug-friendly display. Use [`crate::format::CurrencyFormat`] for the UI.
impl fmt::Display for Money {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.0 < 0 { "-" } else { "" };
        write!(f, "{}${}.{:02}", sign, self.major().abs(), self.minor())
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

impl SubAssign for Money {
    #[inline]
    fn sub_assign(&mut self, other: Self) {
        self.0 = self.0.saturating_sub(other.0);
    }
}

impl Mul<i64> for Money {
    type Output = Self;

    #[inline]
    fn mul(self, qty: i64) -> Self {
        Money(self.0.saturating_mul(qty))
    }
}

impl std::iter::Sum for Money {
    fn sum<I: Iterator<Item = Money>>(iter: I) -> Self {
        iter.fold(Money::zero(), |acc, m| acc + m)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_cents() {
        let money = Money::from_cents(1099);
        assert_eq!(money.cents(), 1099);
        assert_eq!(money.major(), 10);
        assert_eq!(money.minor(), 99);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", Money::from_cents(1099)), "$10.99");
        assert_eq!(format!("{}", Money::from_cents(-550)), "-$5.50");
        assert_eq!(format!("{}", Money::from_cents(0)), "$0.00");
    }

    #[test]
    fn test_arithmetic() {
        let a = Money::from_cents(1000);
        let b = Money::from_cents(500);

        assert_eq!((a + b).cents(), 1500);
        assert_eq!((a - b).cents(), 500);
        assert_eq!((a * 3).cents(), 3000);

        let total: Money = vec![a, b, b].into_iter().sum();
        assert_eq!(total.cents(), 2000);
    }

    #[test]
    fn test_arithmetic_saturates_instead_of_panicking() {
        let huge = Money::from_cents(i64::MAX - 1);

        assert_eq!((huge + Money::from_cents(10)).cents(), i64::MAX);
        assert_eq!((Money::from_cents(i64::MIN + 1) - Money::from_cents(10)).cents(), i64::MIN);
        assert_eq!((huge * 2).cents(), i64::MAX);
        assert_eq!(huge.multiply_quantity(-2).cents(), i64::MIN);

        let mut acc = huge;
        acc += huge;
        assert_eq!(acc.cents(), i64::MAX);
        acc -= Money::from_cents(i64::MAX);
        assert_eq!(acc.cents(), 0);

        let total: Money = vec![huge, huge, huge].into_iter().sum();
        assert_eq!(total.cents(), i64::MAX);
    }

    #[test]
    fn test_checked_multiply_quantity() {
        let price = Money::from_cents(100_000);
        assert_eq!(price.checked_multiply_quantity(3), Some(Money::from_cents(300_000)));
        assert_eq!(price.checked_multiply_quantity(i64::MAX / 1000), None);
    }

    #[test]
    fn test_tax_on_saturated_amount_stays_in_range() {
        let tax = Money::from_cents(i64::MAX).calculate_tax(TaxRate::from_bps(10_000));
        assert_eq!(tax.cents(), i64::MAX);
    }

    #[test]
    fn test_iva_on_reference_sale() {
        // 2450.00 at 19% = 465.50
        let tax = Money::from_cents(245_000).calculate_tax(TaxRate::from_bps(1900));
        assert_eq!(tax.cents(), 46_550);
    }

    #[test]
    fn test_tax_rounds_half_cent_up() {
        // 10.00 at 8.25% = 0.825 → 0.83
        let tax = Money::from_cents(1000).calculate_tax(TaxRate::from_bps(825));
        assert_eq!(tax.cents(), 83);
    }

    #[test]
    fn test_percentage_discount() {
        let subtotal = Money::from_cents(10_000);
        assert_eq!(
            subtotal.apply_percentage_discount(DiscountRate::from_bps(1000)).cents(),
            9_000
        );
        assert_eq!(
            subtotal.apply_percentage_discount(DiscountRate::full()).cents(),
            0
        );
        assert_eq!(
            subtotal.apply_percentage_discount(DiscountRate::zero()).cents(),
            10_000
        );
    }

    #[test]
    fn test_from_decimal_str() {
        assert_eq!(Money::from_decimal_str("2000"), Some(Money::from_cents(200_000)));
        assert_eq!(Money::from_decimal_str("2915.50"), Some(Money::from_cents(291_550)));
        assert_eq!(Money::from_decimal_str(".5"), Some(Money::from_cents(50)));
        assert_eq!(Money::from_decimal_str("-5.5"), Some(Money::from_cents(-550)));
        assert_eq!(Money::from_decimal_str("19.994"), Some(Money::from_cents(1999)));
        assert_eq!(Money::from_decimal_str("19.995"), Some(Money::from_cents(2000)));

        assert_eq!(Money::from_decimal_str(""), None);
        assert_eq!(Money::from_decimal_str("."), None);
        assert_eq!(Money::from_decimal_str("1e3"), None);
        assert_eq!(Money::from_decimal_str("1.000,50"), None);
        assert_eq!(Money::from_decimal_str("$2.915"), None);
    }

    #[test]
    fn test_expand_exponent() {
        assert_eq!(expand_exponent("1e3").as_deref(), Some("1000"));
        assert_eq!(expand_exponent("2.5E2").as_deref(), Some("250"));
        assert_eq!(expand_exponent("1.2345e2").as_deref(), Some("123.45"));
        assert_eq!(expand_exponent("5e-3").as_deref(), Some("0.005"));
        assert_eq!(expand_exponent("-1.5E+1").as_deref(), Some("-15"));
        assert_eq!(expand_exponent("84.5").as_deref(), Some("84.5"));

        assert_eq!(expand_exponent("e3"), None);
        assert_eq!(expand_exponent("1e"), None);
        assert_eq!(expand_exponent("1x5e2"), None);
        assert_eq!(expand_exponent("1e400"), None);

        assert_eq!(
            expand_exponent("5e-3").and_then(|t| Money::from_decimal_str(&t)),
            Some(Money::from_cents(1))
        );
    }

    #[test]
    fn test_to_decimal_string() {
        assert_eq!(Money::from_cents(100_000).to_decimal_string(), "1000.00");
        assert_eq!(Money::from_cents(-550).to_decimal_string(), "-5.50");
        assert_eq!(Money::from_cents(7).to_decimal_string(), "0.07");
    }

    #[test]
    fn test_non_negative() {
        assert!(Money::from_cents(-10).is_negative());
        assert!(!Money::zero().is_negative());
        assert_eq!(Money::from_cents(-10).non_negative(), Money::zero());
        assert_eq!(Money::from_cents(10).non_negative().cents(), 10);
    }
}
