//! Discount utilities
//!
//! Shared arithmetic for voucher discounts.

use decimal_percentage::Percentage;
use rust_decimal::{
    Decimal, RoundingStrategy,
    prelude::{FromPrimitive, ToPrimitive},
};
use rusty_money::{Money, MoneyError, iso::Currency};
use thiserror::Error;

/// Errors specific to discount calculations.
#[derive(Debug, Error, PartialEq)]
pub enum DiscountError {
    /// Percentage calculation could not be safely converted.
    #[error("percentage conversion overflowed or was not finite")]
    PercentConversion,

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Calculate the discount amount in minor units based on a percentage and a minor unit amount.
///
/// Results are rounded to whole minor units, midpoint away from zero.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of_minor(percent: &Percentage, minor: i64) -> Result<i64, DiscountError> {
    let minor = Decimal::from_i64(minor).ok_or(DiscountError::PercentConversion)?;

    ((*percent) * Decimal::ONE) // decimal_percentage doesn't expose the underlying Decimal
        .checked_mul(minor)
        .ok_or(DiscountError::PercentConversion)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_i64()
        .ok_or(DiscountError::PercentConversion)
}

/// Calculate `percent` of `price`.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the calculation overflows.
pub fn percent_of<'a>(
    percent: &Percentage,
    price: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    let discount_minor = percent_of_minor(percent, price.to_minor_units())?;

    Ok(Money::from_minor(discount_minor, price.currency()))
}

/// Returns the smaller of `amount` and `cap`.
///
/// # Errors
///
/// Returns [`DiscountError::Money`] if the two amounts use different currencies.
pub fn capped_at<'a>(
    amount: Money<'a, Currency>,
    cap: Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    if amount.currency() != cap.currency() {
        return Err(DiscountError::Money(MoneyError::CurrencyMismatch {
            expected: cap.currency().iso_alpha_code,
            actual: amount.currency().iso_alpha_code,
        }));
    }

    if amount.to_minor_units() > cap.to_minor_units() {
        Ok(cap)
    } else {
        Ok(amount)
    }
}

/// Converts percent points (e.g. `10` for 10%) to a [`Percentage`] fraction.
///
/// # Errors
///
/// Returns [`DiscountError::PercentConversion`] if the value cannot be represented.
pub fn percentage_from_points(points: Decimal) -> Result<Percentage, DiscountError> {
    let fraction = points
        .checked_div(Decimal::ONE_HUNDRED)
        .ok_or(DiscountError::PercentConversion)?
        .normalize();

    Percentage::try_from(fraction.to_string().as_str())
        .map_err(|_err| DiscountError::PercentConversion)
}

/// Converts a [`Percentage`] fraction back to percent points for display.
pub fn percent_points(percent: Percentage) -> Decimal {
    ((percent * Decimal::ONE) * Decimal::ONE_HUNDRED).normalize()
}
