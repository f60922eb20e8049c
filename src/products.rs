//! Products

use std::fmt;

use rust_decimal::Decimal;
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    content::LocalizedText,
    prices::{PriceError, money_from_decimal},
};

/// Errors raised while reading product records.
#[derive(Debug, Error, PartialEq)]
pub enum ProductError {
    /// The record carried an unusable price.
    #[error("product {id} has an invalid price: {source}")]
    Price {
        /// Product identifier
        id: ProductId,

        /// Underlying price error
        #[source]
        source: PriceError,
    },
}

/// Backend identifier of a product.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProductId(String);

impl ProductId {
    /// Wraps a backend identifier.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Returns the identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ProductId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Product
#[derive(Debug, Clone, PartialEq)]
pub struct Product<'a> {
    /// Product identifier
    pub id: ProductId,

    /// Product name
    pub name: LocalizedText,

    /// Product price
    pub price: Money<'a, Currency>,

    /// Whether the product can currently be ordered
    pub is_available: bool,

    /// Units in stock
    pub stocks: u32,
}

impl<'a> Product<'a> {
    /// Creates an available product with no recorded stock.
    ///
    /// `price` is not checked here; [`crate::pricing::value_cart`] rejects
    /// available products priced below zero.
    pub fn new(id: ProductId, name: LocalizedText, price: Money<'a, Currency>) -> Self {
        Self {
            id,
            name,
            price,
            is_available: true,
            stocks: 0,
        }
    }

    /// Marks the product as available or unavailable.
    #[must_use]
    pub fn with_availability(mut self, is_available: bool) -> Self {
        self.is_available = is_available;
        self
    }

    /// Converts a wire record, pricing it in `currency`.
    ///
    /// # Errors
    ///
    /// Returns [`ProductError::Price`] if the price is negative or out of range.
    pub fn from_record(
        record: ProductRecord,
        currency: &'a Currency,
    ) -> Result<Self, ProductError> {
        let price = money_from_decimal(record.price, currency).map_err(|source| {
            ProductError::Price {
                id: record.id.clone(),
                source,
            }
        })?;

        Ok(Self {
            id: record.id,
            name: record.name,
            price,
            is_available: record.is_available,
            stocks: record.stocks,
        })
    }
}

/// Product as exchanged with the storefront backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductRecord {
    /// Product identifier
    #[serde(rename = "_id")]
    pub id: ProductId,

    /// Localized name
    pub name: LocalizedText,

    /// Price in major units of the storefront currency
    pub price: Decimal,

    /// Availability flag
    pub is_available: bool,

    /// Units in stock
    #[serde(default)]
    pub stocks: u32,
}
