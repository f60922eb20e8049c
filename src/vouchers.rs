//! Vouchers
//!
//! Voucher codes, the backend voucher record and the discount a voucher
//! grants on a cart total.

use std::fmt;

use decimal_percentage::Percentage;
use jiff::Timestamp;
use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    discounts::{DiscountError, capped_at, percent_of, percent_points, percentage_from_points},
    prices::{PriceError, money_from_decimal},
};

/// Errors raised while reading or redeeming vouchers.
#[derive(Debug, Error, PartialEq)]
pub enum VoucherError {
    /// The customer submitted a blank code.
    #[error("voucher code is empty")]
    EmptyCode,

    /// Percentage vouchers must lie between 0 and 100 percent.
    #[error("voucher {0} has an invalid percentage: {1}")]
    InvalidPercent(VoucherCode, Decimal),

    /// Amount vouchers need a non-negative amount in the storefront currency.
    #[error("voucher {code} has an invalid amount: {source}")]
    InvalidAmount {
        /// Voucher code
        code: VoucherCode,

        /// Underlying price error
        #[source]
        source: PriceError,
    },

    /// The voucher expired before the order was placed.
    #[error("voucher {code} expired at {expired_at}")]
    Expired {
        /// Voucher code
        code: VoucherCode,

        /// Expiry instant
        expired_at: Timestamp,
    },

    /// The voucher has no uses left.
    #[error("voucher {0} has been used up")]
    Exhausted(VoucherCode),

    /// Errors bubbled up from discount arithmetic.
    #[error(transparent)]
    Discount(#[from] DiscountError),
}

/// A normalised voucher code: trimmed and upper-cased.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct VoucherCode(String);

impl VoucherCode {
    /// Normalises a code typed by a customer.
    ///
    /// # Errors
    ///
    /// Returns [`VoucherError::EmptyCode`] if nothing but whitespace was entered.
    pub fn parse(input: &str) -> Result<Self, VoucherError> {
        let code = input.trim();

        if code.is_empty() {
            return Err(VoucherError::EmptyCode);
        }

        Ok(Self(code.to_uppercase()))
    }

    /// Returns the code as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for VoucherCode {
    type Error = VoucherError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<VoucherCode> for String {
    fn from(code: VoucherCode) -> Self {
        code.0
    }
}

impl fmt::Display for VoucherCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// How a voucher's `discountAmount` is interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiscountType {
    /// Percent points off the cart total
    Percent,

    /// Fixed amount off the cart total
    Amount,
}

/// Voucher as exchanged with the storefront backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VoucherRecord {
    /// Voucher identifier
    #[serde(rename = "_id")]
    pub id: String,

    /// Code customers type at checkout
    pub code: VoucherCode,

    /// Discount kind
    pub discount_type: DiscountType,

    /// Percent points or major-unit amount, depending on `discount_type`
    pub discount_amount: Decimal,

    /// Remaining number of redemptions
    #[serde(default)]
    pub total_usage_limit: u32,

    /// Instant after which the voucher can no longer be redeemed
    #[serde(default)]
    pub expired_date: Option<Timestamp>,
}

/// The reduction a voucher grants.
#[derive(Debug, Clone, Copy)]
pub enum VoucherDiscount<'a> {
    /// Take a percentage off the cart total (e.g. "10% off")
    Percent(Percentage),

    /// Take a fixed amount off the cart total, never more than the total (e.g. "₫50,000 off")
    Amount(Money<'a, Currency>),
}

/// A validated voucher.
#[derive(Debug, Clone)]
pub struct Voucher<'a> {
    id: String,
    code: VoucherCode,
    discount: VoucherDiscount<'a>,
    total_usage_limit: u32,
    expired_date: Option<Timestamp>,
}

impl<'a> Voucher<'a> {
    /// Creates a voucher that never expires and has uses left.
    pub fn new(id: impl Into<String>, code: VoucherCode, discount: VoucherDiscount<'a>) -> Self {
        Self {
            id: id.into(),
            code,
            discount,
            total_usage_limit: 1,
            expired_date: None,
        }
    }

    /// Validates a wire record, pricing amount vouchers in `currency`.
    ///
    /// # Errors
    ///
    /// - [`VoucherError::InvalidPercent`]: a percentage outside `0..=100`.
    /// - [`VoucherError::InvalidAmount`]: a negative or unrepresentable amount.
    pub fn from_record(record: VoucherRecord, currency: &'a Currency) -> Result<Self, VoucherError> {
        let discount = match record.discount_type {
            DiscountType::Percent => {
                let points = record.discount_amount;

                if points < Decimal::ZERO || points > Decimal::ONE_HUNDRED {
                    return Err(VoucherError::InvalidPercent(record.code, points));
                }

                VoucherDiscount::Percent(percentage_from_points(points)?)
            }
            DiscountType::Amount => VoucherDiscount::Amount(
                money_from_decimal(record.discount_amount, currency).map_err(|source| {
                    VoucherError::InvalidAmount {
                        code: record.code.clone(),
                        source,
                    }
                })?,
            ),
        };

        Ok(Self {
            id: record.id,
            code: record.code,
            discount,
            total_usage_limit: record.total_usage_limit,
            expired_date: record.expired_date,
        })
    }

    /// Sets the expiry instant.
    #[must_use]
    pub fn expiring_at(mut self, expired_date: Timestamp) -> Self {
        self.expired_date = Some(expired_date);
        self
    }

    /// Sets the remaining number of redemptions.
    #[must_use]
    pub fn with_usage_limit(mut self, total_usage_limit: u32) -> Self {
        self.total_usage_limit = total_usage_limit;
        self
    }

    /// Backend identifier
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Normalised code
    pub fn code(&self) -> &VoucherCode {
        &self.code
    }

    /// Discount granted
    pub fn discount(&self) -> &VoucherDiscount<'a> {
        &self.discount
    }

    /// Kind of discount granted
    pub fn discount_type(&self) -> DiscountType {
        match self.discount {
            VoucherDiscount::Percent(_) => DiscountType::Percent,
            VoucherDiscount::Amount(_) => DiscountType::Amount,
        }
    }

    /// Short human-readable description, e.g. `10%` or `50.000 ₫`.
    pub fn describe(&self) -> String {
        match self.discount {
            VoucherDiscount::Percent(percent) => format!("{}%", percent_points(percent)),
            VoucherDiscount::Amount(amount) => amount.to_string(),
        }
    }

    /// Checks the voucher can still be redeemed at `now`.
    ///
    /// # Errors
    ///
    /// - [`VoucherError::Expired`]: `now` is past the expiry instant.
    /// - [`VoucherError::Exhausted`]: no redemptions are left.
    pub fn check_redeemable(&self, now: Timestamp) -> Result<(), VoucherError> {
        if let Some(expired_at) = self.expired_date
            && now > expired_at
        {
            return Err(VoucherError::Expired {
                code: self.code.clone(),
                expired_at,
            });
        }

        if self.total_usage_limit == 0 {
            return Err(VoucherError::Exhausted(self.code.clone()));
        }

        Ok(())
    }

    /// Discount this voucher grants on a cart totalling `total_price`.
    ///
    /// # Errors
    ///
    /// Returns a [`DiscountError`] if the amount is in another currency or the
    /// percentage calculation overflows.
    pub fn discount_on(
        &self,
        total_price: &Money<'a, Currency>,
    ) -> Result<Money<'a, Currency>, DiscountError> {
        match self.discount {
            VoucherDiscount::Percent(percent) => percent_of(&percent, total_price),
            VoucherDiscount::Amount(amount) => capped_at(amount, *total_price),
        }
    }
}

/// Discount for an optional voucher; no voucher means no discount.
///
/// # Errors
///
/// Returns a [`DiscountError`] if the voucher cannot be applied to `total_price`.
pub fn discount_for<'a>(
    voucher: Option<&Voucher<'a>>,
    total_price: &Money<'a, Currency>,
) -> Result<Money<'a, Currency>, DiscountError> {
    match voucher {
        Some(voucher) => voucher.discount_on(total_price),
        None => Ok(Money::from_minor(0, total_price.currency())),
    }
}
