//! Product Fixtures

use rustc_hash::FxHashMap;
use serde::Deserialize;

use crate::{
    content::LocalizedText,
    fixtures::FixtureError,
    prices::parse_price,
    products::{Product, ProductId},
};

/// Wrapper for products in YAML
#[derive(Debug, Deserialize)]
pub struct ProductsFixture {
    /// Map of product id -> product fixture
    pub products: FxHashMap<String, ProductFixture>,
}

/// Product Fixture
#[derive(Debug, Deserialize)]
pub struct ProductFixture {
    /// Localized product name
    pub name: LocalizedText,

    /// Product price (e.g., "35000 VND")
    pub price: String,

    /// Whether the product can be ordered
    #[serde(default = "available_by_default")]
    pub available: bool,

    /// Units in stock
    #[serde(default)]
    pub stocks: u32,
}

fn available_by_default() -> bool {
    true
}

impl ProductFixture {
    /// Builds the product identified by `id`.
    ///
    /// # Errors
    ///
    /// Returns [`FixtureError::Price`] if the price string is invalid.
    pub fn into_product(self, id: &str) -> Result<Product<'static>, FixtureError> {
        let price = parse_price(&self.price)?;

        Ok(Product {
            id: ProductId::new(id),
            name: self.name,
            price,
            is_available: self.available,
            stocks: self.stocks,
        })
    }
}
