//! Fixtures
//!
//! YAML fixture sets describing a menu, a cart snapshot and vouchers, laid
//! out as `{base}/products/{set}.yml`, `{base}/carts/{set}.yml` and
//! `{base}/vouchers/{set}.yml`.

use std::{fs, path::PathBuf};

use rusty_money::iso::Currency;
use rustc_hash::FxHashMap;
use thiserror::Error;

use crate::{
    cart::{Cart, CartError},
    fixtures::{carts::CartFixture, products::ProductsFixture, vouchers::VouchersFixture},
    items::CartItem,
    prices::PriceError,
    products::Product,
    vouchers::{Voucher, VoucherCode, VoucherError},
};

pub mod carts;
pub mod products;
pub mod vouchers;

/// Fixture Parsing Errors
#[derive(Debug, Error)]
pub enum FixtureError {
    /// IO error reading fixture files
    #[error("Failed to read fixture file: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parsing error
    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// Invalid price
    #[error(transparent)]
    Price(#[from] PriceError),

    /// Invalid voucher
    #[error(transparent)]
    Voucher(#[from] VoucherError),

    /// Currency mismatch between products
    #[error("Currency mismatch: expected {0}, found {1}")]
    CurrencyMismatch(String, String),

    /// No products loaded yet
    #[error("No products loaded yet; currency unknown")]
    NoCurrency,

    /// Product not found
    #[error("Product not found: {0}")]
    ProductNotFound(String),

    /// Voucher not found
    #[error("Voucher not found: {0}")]
    VoucherNotFound(VoucherCode),

    /// Cart creation error
    #[error("Failed to create cart: {0}")]
    Cart(#[from] CartError),
}

/// Fixture
#[derive(Debug)]
pub struct Fixture {
    /// Base path for fixture files
    base_path: PathBuf,

    /// Products keyed by id
    products: FxHashMap<String, Product<'static>>,

    /// Cart lines (reference products by id)
    cart_items: Vec<CartItem<'static>>,

    /// Vouchers keyed by normalised code
    vouchers: FxHashMap<VoucherCode, Voucher<'static>>,

    /// Currency for the fixture set
    currency: Option<&'static Currency>,
}

impl Default for Fixture {
    fn default() -> Self {
        Self::new()
    }
}

impl Fixture {
    /// Create a new empty fixture with default base path
    pub fn new() -> Self {
        Self::with_base_path("./fixtures")
    }

    /// Create a new empty fixture with custom base path
    pub fn with_base_path(base_path: impl Into<PathBuf>) -> Self {
        Self {
            base_path: base_path.into(),
            products: FxHashMap::default(),
            cart_items: Vec::new(),
            vouchers: FxHashMap::default(),
            currency: None,
        }
    }

    /// Load products from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if there are currency mismatches.
    pub fn load_products(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("products").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: ProductsFixture = serde_norway::from_str(&contents)?;

        for (id, product_fixture) in fixture.products {
            let product = product_fixture.into_product(&id)?;
            let currency = product.price.currency();

            match self.currency {
                Some(existing) if existing != currency => {
                    return Err(FixtureError::CurrencyMismatch(
                        existing.iso_alpha_code.to_string(),
                        currency.iso_alpha_code.to_string(),
                    ));
                }
                Some(_) => {}
                None => self.currency = Some(currency),
            }

            self.products.insert(id, product);
        }

        Ok(self)
    }

    /// Load cart lines from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed, or if referenced products don't exist.
    pub fn load_cart(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let file_path = self.base_path.join("carts").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: CartFixture = serde_norway::from_str(&contents)?;

        for line in fixture.items {
            let item = match line.product {
                Some(id) => CartItem::new(self.product(&id)?.clone(), line.quantity),
                None => CartItem::deleted(line.quantity),
            };

            self.cart_items.push(item);
        }

        Ok(self)
    }

    /// Load vouchers from a YAML fixture file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed, if no products
    /// have been loaded to fix the currency, or if a voucher is invalid.
    pub fn load_vouchers(&mut self, name: &str) -> Result<&mut Self, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;
        let file_path = self.base_path.join("vouchers").join(format!("{name}.yml"));
        let contents = fs::read_to_string(&file_path)?;
        let fixture: VouchersFixture = serde_norway::from_str(&contents)?;

        for record in fixture.vouchers {
            let voucher = Voucher::from_record(record, currency)?;

            self.vouchers.insert(voucher.code().clone(), voucher);
        }

        Ok(self)
    }

    /// Load a complete fixture set (products, cart, and vouchers with the same name)
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set(name: &str) -> Result<Self, FixtureError> {
        Self::from_set_in("./fixtures", name)
    }

    /// Load a complete fixture set from a custom base path
    ///
    /// # Errors
    ///
    /// Returns an error if any of the fixture files cannot be loaded.
    pub fn from_set_in(base_path: impl Into<PathBuf>, name: &str) -> Result<Self, FixtureError> {
        let mut fixture = Self::with_base_path(base_path);

        fixture
            .load_products(name)?
            .load_cart(name)?
            .load_vouchers(name)?;

        Ok(fixture)
    }

    /// Get a product by its id
    ///
    /// # Errors
    ///
    /// Returns an error if the product is not found.
    pub fn product(&self, id: &str) -> Result<&Product<'static>, FixtureError> {
        self.products
            .get(id)
            .ok_or_else(|| FixtureError::ProductNotFound(id.to_string()))
    }

    /// Get a voucher by the code a customer typed
    ///
    /// # Errors
    ///
    /// Returns an error if the code is blank or no voucher matches it.
    pub fn voucher(&self, input: &str) -> Result<&Voucher<'static>, FixtureError> {
        let code = VoucherCode::parse(input)?;

        self.vouchers
            .get(&code)
            .ok_or(FixtureError::VoucherNotFound(code))
    }

    /// Get all cart lines
    pub fn cart_items(&self) -> &[CartItem<'static>] {
        &self.cart_items
    }

    /// Currency of the fixture set, once products are loaded
    pub fn currency(&self) -> Option<&'static Currency> {
        self.currency
    }

    /// Create a cart from the loaded lines
    ///
    /// # Errors
    ///
    /// Returns an error if no products were loaded or if cart creation fails.
    pub fn cart(&self) -> Result<Cart<'static>, FixtureError> {
        let currency = self.currency.ok_or(FixtureError::NoCurrency)?;

        Ok(Cart::with_items(self.cart_items.clone(), currency)?)
    }
}
