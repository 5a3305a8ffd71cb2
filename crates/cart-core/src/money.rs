//! # Money Representation
//!
//! Integer minor-unit (öre/cent) amounts for the storefront.
//! All arithmetic on amounts is integer-only; decimals exist solely at the
//! catalog boundary, where prices arrive as decimal values and are converted
//! once, at snapshot time.

use serde::{Deserialize, Serialize};

/// Display currency for the storefront
pub const CURRENCY: &str = "SEK";

/// Convert a decimal amount to minor units, rounding half away from zero.
///
/// `10.005` → `1001`, `19.995` → `2000`.
pub fn to_cents(amount: f64) -> i64 {
    (amount * 100.0).round() as i64
}

/// Convert minor units back to a decimal amount (display only)
pub fn from_cents(cents: i64) -> f64 {
    cents as f64 / 100.0
}

/// Format a minor-unit amount for display (e.g., "129.50 SEK")
pub fn format_price(cents: i64) -> String {
    format!("{:.2} {}", from_cents(cents), CURRENCY)
}

/// Price input accepted at the catalog boundary.
///
/// Catalog products carry either a pre-converted minor-unit amount or a
/// decimal price; decimal input is converted with [`to_cents`] when the
/// product is snapshotted into the cart.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PriceInput {
    /// Pre-converted minor-unit amount
    Cents(i64),
    /// Decimal amount, converted by rounding to the nearest minor unit
    Decimal(f64),
}

impl PriceInput {
    /// Resolve to a minor-unit amount
    pub fn cents(&self) -> i64 {
        match self {
            PriceInput::Cents(c) => *c,
            PriceInput::Decimal(d) => to_cents(*d),
        }
    }
}

impl From<i64> for PriceInput {
    fn from(cents: i64) -> Self {
        PriceInput::Cents(cents)
    }
}

impl From<f64> for PriceInput {
    fn from(decimal: f64) -> Self {
        PriceInput::Decimal(decimal)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_cents_rounding() {
        assert_eq!(to_cents(29.99), 2999);
        assert_eq!(to_cents(0.1), 10);
        assert_eq!(to_cents(1234.56), 123_456);
        assert_eq!(to_cents(0.0), 0);
    }

    #[test]
    fn test_to_cents_rounds_half_away_from_zero() {
        assert_eq!(to_cents(10.005), 1001);
        assert_eq!(to_cents(19.995), 2000);
        assert_eq!(to_cents(2.675), 268);
    }

    #[test]
    fn test_price_input_resolution() {
        assert_eq!(PriceInput::Cents(1250).cents(), 1250);
        assert_eq!(PriceInput::Decimal(12.50).cents(), 1250);
        assert_eq!(PriceInput::from(999_i64).cents(), 999);
        assert_eq!(PriceInput::from(9.99).cents(), 999);
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(12_950), "129.50 SEK");
        assert_eq!(format_price(100), "1.00 SEK");
        assert_eq!(format_price(0), "0.00 SEK");
    }
}
