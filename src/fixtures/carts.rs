//! Cart Fixtures

use serde::Deserialize;

/// Wrapper for cart lines in YAML
#[derive(Debug, Deserialize)]
pub struct CartFixture {
    /// Cart lines in display order
    pub items: Vec<CartLineFixture>,
}

/// Cart Line Fixture
#[derive(Debug, Deserialize)]
pub struct CartLineFixture {
    /// Product id reference, or `~` for a product deleted from the catalog
    pub product: Option<String>,

    /// Requested quantity
    pub quantity: u32,
}
