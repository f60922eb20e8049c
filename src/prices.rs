//! Prices
//!
//! Conversions between decimal amounts, price strings such as `"300000 VND"`
//! and [`Money`] in minor units.

use rust_decimal::{Decimal, RoundingStrategy, prelude::ToPrimitive};
use rusty_money::{
    Money,
    iso::{self, Currency},
};
use thiserror::Error;

/// Errors raised while reading prices.
#[derive(Debug, Error, PartialEq)]
pub enum PriceError {
    /// The price string was not in the `AMOUNT CURRENCY` format.
    #[error("invalid price format: {0}")]
    InvalidPrice(String),

    /// The currency code is not one the storefront trades in.
    #[error("unknown currency code: {0}")]
    UnknownCurrency(String),

    /// Prices must be zero or positive.
    #[error("price must not be negative: {0}")]
    Negative(Decimal),

    /// The amount cannot be represented in the currency's minor units.
    #[error("amount {0} does not fit in minor units")]
    OutOfRange(Decimal),
}

/// Looks up a supported ISO currency by its alpha code.
///
/// # Errors
///
/// Returns [`PriceError::UnknownCurrency`] for any code other than VND, USD, GBP or EUR.
pub fn currency_for_code(code: &str) -> Result<&'static Currency, PriceError> {
    match code.trim().to_ascii_uppercase().as_str() {
        "VND" => Ok(iso::VND),
        "USD" => Ok(iso::USD),
        "GBP" => Ok(iso::GBP),
        "EUR" => Ok(iso::EUR),
        other => Err(PriceError::UnknownCurrency(other.to_string())),
    }
}

/// Converts a non-negative decimal amount in major units to [`Money`].
///
/// Amounts finer than the currency's minor unit are rounded midpoint away from zero.
///
/// # Errors
///
/// - [`PriceError::Negative`]: the amount is below zero.
/// - [`PriceError::OutOfRange`]: the amount overflows `i64` minor units.
pub fn money_from_decimal(
    amount: Decimal,
    currency: &Currency,
) -> Result<Money<'_, Currency>, PriceError> {
    if amount.is_sign_negative() && !amount.is_zero() {
        return Err(PriceError::Negative(amount));
    }

    let minor = (0..currency.exponent)
        .try_fold(amount, |acc, _| acc.checked_mul(Decimal::TEN))
        .map(|scaled| scaled.round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero))
        .and_then(|scaled| scaled.to_i64())
        .ok_or(PriceError::OutOfRange(amount))?;

    Ok(Money::from_minor(minor, currency))
}

/// Parses a price string (e.g. `"20000 VND"` or `"2.99 GBP"`).
///
/// # Errors
///
/// Returns an error if the string is not `AMOUNT CURRENCY`, the amount is not a
/// non-negative decimal, or the currency is unsupported.
pub fn parse_price(s: &str) -> Result<Money<'static, Currency>, PriceError> {
    let mut parts = s.split_whitespace();

    let (Some(amount), Some(code), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(PriceError::InvalidPrice(format!(
            "expected format 'AMOUNT CURRENCY', got: {s}"
        )));
    };

    let amount = amount
        .parse::<Decimal>()
        .map_err(|_err| PriceError::InvalidPrice(s.to_string()))?;

    money_from_decimal(amount, currency_for_code(code)?)
}
