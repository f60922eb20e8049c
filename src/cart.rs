//! Cart

use rusty_money::iso::Currency;
use thiserror::Error;

use crate::{
    items::CartItem,
    pricing::{CartValuation, PricingError, ShippingPolicy, value_cart},
};

/// Errors related to cart construction.
#[derive(Debug, Error, PartialEq)]
pub enum CartError {
    /// A product's currency differs from the cart currency (index, item currency, cart currency).
    #[error("Item {0} has currency {1}, but cart has currency {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),
}

/// Snapshot of a customer's cart as last fetched from the backend.
#[derive(Debug, Clone)]
pub struct Cart<'a> {
    items: Vec<CartItem<'a>>,
    currency: &'static Currency,
}

impl<'a> Cart<'a> {
    /// Create an empty cart.
    pub fn new(currency: &'static Currency) -> Self {
        Cart {
            items: Vec::new(),
            currency,
        }
    }

    /// Create a cart with the given items.
    ///
    /// # Errors
    ///
    /// Returns a `CartError` if any product is priced in another currency.
    pub fn with_items(
        items: impl Into<Vec<CartItem<'a>>>,
        currency: &'static Currency,
    ) -> Result<Self, CartError> {
        let items = items.into();

        items.iter().enumerate().try_for_each(|(i, item)| {
            match item.unit_price().map(|price| price.currency()) {
                Some(item_currency) if item_currency != currency => Err(
                    CartError::CurrencyMismatch(i, item_currency.iso_alpha_code, currency.iso_alpha_code),
                ),
                _ => Ok(()),
            }
        })?;

        Ok(Cart { items, currency })
    }

    /// Value the cart under a shipping policy.
    ///
    /// # Errors
    ///
    /// Returns a `PricingError` if the policy is priced in another currency or the total overflows.
    pub fn value(&self, policy: &ShippingPolicy<'a>) -> Result<CartValuation<'a>, PricingError> {
        value_cart(&self.items, policy)
    }

    /// Iterate over the cart lines.
    pub fn iter(&self) -> impl Iterator<Item = &CartItem<'a>> {
        self.items.iter()
    }

    /// Total quantity requested across all lines, available or not.
    pub fn requested_quantity(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity())).sum()
    }

    /// Get the number of lines in the cart.
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Check if the cart is empty.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Get the currency of the cart.
    pub fn currency(&self) -> &'static Currency {
        self.currency
    }
}
