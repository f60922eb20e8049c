//! Items

use rusty_money::{Money, iso::Currency};

use crate::products::Product;

/// A cart line: a product reference and the quantity the customer asked for.
///
/// The product is `None` when it has been deleted from the catalog since it
/// was added to the cart.
#[derive(Clone, Debug, PartialEq)]
pub struct CartItem<'a> {
    product: Option<Product<'a>>,
    quantity: u32,
}

impl<'a> CartItem<'a> {
    /// Creates a cart line for `product`.
    pub fn new(product: Product<'a>, quantity: u32) -> Self {
        Self {
            product: Some(product),
            quantity,
        }
    }

    /// Creates a cart line whose product no longer exists.
    pub fn deleted(quantity: u32) -> Self {
        Self {
            product: None,
            quantity,
        }
    }

    /// Returns the product, if it still exists.
    pub fn product(&self) -> Option<&Product<'a>> {
        self.product.as_ref()
    }

    /// Returns the quantity the customer requested.
    pub fn quantity(&self) -> u32 {
        self.quantity
    }

    /// Whether the line can be ordered: its product exists and is available.
    pub fn is_available(&self) -> bool {
        self.product.as_ref().is_some_and(|product| product.is_available)
    }

    /// Quantity used for pricing; zero when the line is unavailable.
    pub fn effective_quantity(&self) -> u32 {
        if self.is_available() {
            self.quantity
        } else {
            0
        }
    }

    /// Returns the price of the product, if it still exists.
    pub fn unit_price(&self) -> Option<&Money<'a, Currency>> {
        self.product.as_ref().map(|product| &product.price)
    }

    /// Price of the line at its effective quantity, in minor units.
    ///
    /// Returns `None` when the multiplication overflows.
    pub fn line_total_minor(&self) -> Option<i64> {
        match self.unit_price() {
            Some(price) => price
                .to_minor_units()
                .checked_mul(i64::from(self.effective_quantity())),
            None => Some(0),
        }
    }
}
