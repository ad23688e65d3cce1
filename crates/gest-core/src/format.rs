//! # Currency Display Format
//!
//! Turns [`Money`] into display text. Only the render layer calls this;
//! arithmetic and change calculation always work on the numeric values.

use serde::{Deserialize, Serialize};

use crate::money::Money;

/// Currency display settings.
///
/// Defaults to Chilean peso style: `$` symbol, no decimals, `.` for
/// thousands and `,` for decimals (`$1.234`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CurrencyFormat {
    pub symbol: String,
    /// Fraction digits shown (0 to 2).
    pub decimals: u8,
    pub thousands_separator: String,
    pub decimal_separator: String,
}

impl Default for CurrencyFormat {
    fn default() -> Self {
        CurrencyFormat {
            symbol: "$".to_string(),
            decimals: 0,
            thousands_separator: ".".to_string(),
            decimal_separator: ",".to_string(),
        }
    }
}

impl CurrencyFormat {
    /// Formats an amount for display.
    ///
    /// Cents beyond the shown precision are rounded half away from zero.
    ///
    /// ## Example
    /// ```rust
    /// use gest_core::{CurrencyFormat, Money};
    ///
    /// let clp = CurrencyFormat::default();
    /// assert_eq!(clp.format(Money::from_cents(291_550)), "$2.916");
    ///
    /// let usd = CurrencyFormat {
    ///     decimals: 2,
    ///     thousands_separator: ",".into(),
    ///     decimal_separator: ".".into(),
    ///     ..CurrencyFormat::default()
    /// };
    /// assert_eq!(usd.format(Money::from_cents(123_456)), "$1,234.56");
    /// ```
    pub fn format(&self, amount: Money) -> String {
        let decimals = self.decimals.min(2) as u32;
        let drop = 10_i64.pow(2 - decimals);
        let cents = amount.cents();

        let magnitude = cents.unsigned_abs() as i128;
        let scaled = (magnitude + (drop as i128) / 2) / drop as i128;

        let divisor = 10_i128.pow(decimals);
        let whole = scaled / divisor;
        let frac = scaled % divisor;

        let sign = if cents < 0 && scaled != 0 { "-" } else { "" };
        let grouped = self.group_thousands(&whole.to_string());

        if decimals > 0 {
            format!(
                "{}{}{}{}{:0width$}",
                sign,
                self.symbol,
                grouped,
                self.decimal_separator,
                frac,
                width = decimals as usize
            )
        } else {
            format!("{}{}{}", sign, self.symbol, grouped)
        }
    }

    fn group_thousands(&self, digits: &str) -> String {
        let len = digits.len();
        let mut out = String::with_capacity(len + len / 3 * self.thousands_separator.len());
        for (i, ch) in digits.chars().enumerate() {
            if i > 0 && (len - i) % 3 == 0 {
                out.push_str(&self.thousands_separator);
            }
            out.push(ch);
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn two_decimals() -> CurrencyFormat {
        CurrencyFormat {
            decimals: 2,
            ..CurrencyFormat::default()
        }
    }

    #[test]
    fn test_format_currency_positive() {
        let clp = CurrencyFormat::default();
        assert_eq!(clp.format(Money::from_cents(0)), "$0");
        assert_eq!(clp.format(Money::from_cents(99_900)), "$999");
        assert_eq!(clp.format(Money::from_cents(123_400)), "$1.234");
        assert_eq!(clp.format(Money::from_cents(123_456_789_00)), "$123.456.789");
    }

    #[test]
    fn test_format_currency_rounds_hidden_cents() {
        let clp = CurrencyFormat::default();
        assert_eq!(clp.format(Money::from_cents(46_550)), "$466");
        assert_eq!(clp.format(Money::from_cents(46_549)), "$465");
    }

    #[test]
    fn test_format_currency_negative() {
        let clp = CurrencyFormat::default();
        assert_eq!(clp.format(Money::from_cents(-123_400)), "-$1.234");
        // Rounds to zero, no sign
        assert_eq!(clp.format(Money::from_cents(-40)), "$0");
    }

    #[test]
    fn test_format_currency_with_decimals() {
        let fmt = two_decimals();
        assert_eq!(fmt.format(Money::from_cents(8_450)), "$84,50");
        assert_eq!(fmt.format(Money::from_cents(1)), "$0,01");
        assert_eq!(fmt.format(Money::from_cents(291_550)), "$2.915,50");
    }

    #[test]
    fn test_format_currency_one_decimal() {
        let fmt = CurrencyFormat {
            decimals: 1,
            ..CurrencyFormat::default()
        };
        assert_eq!(fmt.format(Money::from_cents(8_455)), "$84,6");
    }
}
