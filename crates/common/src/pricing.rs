//! Cart price reconciliation
//!
//! Prices are read from the order overview as currency-prefixed strings,
//! summed client-side and compared against the labels the shop renders.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Sales tax applied at checkout
pub const TAX_RATE: f64 = 0.08;

/// Currency prefix stripped before parsing
pub const CURRENCY: char = '$';

/// One line of the cart as displayed
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CartLine {
    pub name: String,
    pub price: f64,
}

impl CartLine {
    pub fn parse(name: impl Into<String>, price_text: &str) -> Result<Self> {
        Ok(Self {
            name: name.into(),
            price: parse_price(price_text)?,
        })
    }
}

/// Parse a displayed price such as `"$29.99"`
pub fn parse_price(text: &str) -> Result<f64> {
    let trimmed = text.trim();
    let number = trimmed.strip_prefix(CURRENCY).unwrap_or(trimmed).trim();

    match number.parse::<f64>() {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(Error::PriceParse {
            text: text.to_string(),
        }),
    }
}

/// Round to cents, nudged by machine epsilon against representation error
pub fn round_cents(value: f64) -> f64 {
    ((value + f64::EPSILON) * 100.0).round() / 100.0
}

/// Tax owed on a subtotal
pub fn compute_tax(subtotal: f64) -> f64 {
    round_cents(subtotal * TAX_RATE)
}

/// Cents-rounded amount in its shortest decimal form, e.g. `10.4`, `54`
pub fn format_amount(value: f64) -> String {
    format!("{}", round_cents(value))
}

/// Computed subtotal, tax and grand total for a cart
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSummary {
    pub subtotal: f64,
    pub tax: f64,
    pub total: f64,
}

impl PriceSummary {
    /// Sum prices in display order and derive tax and total, all in cents
    pub fn from_prices<I>(prices: I) -> Self
    where
        I: IntoIterator<Item = f64>,
    {
        let subtotal = round_cents(prices.into_iter().fold(0.0, |acc, p| acc + p));
        let tax = compute_tax(subtotal);
        Self {
            subtotal,
            tax,
            total: round_cents(subtotal + tax),
        }
    }

    pub fn from_lines(lines: &[CartLine]) -> Self {
        Self::from_prices(lines.iter().map(|l| l.price))
    }

    pub fn subtotal_text(&self) -> String {
        format_amount(self.subtotal)
    }

    pub fn tax_text(&self) -> String {
        format_amount(self.tax)
    }

    pub fn total_text(&self) -> String {
        format_amount(self.total)
    }
}
