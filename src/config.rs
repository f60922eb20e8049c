//! Storefront configuration
//!
//! Read from YAML; every field falls back to the storefront's standard
//! values, so an empty file is a valid configuration.

use std::{fs, path::Path};

use rusty_money::iso::Currency;
use serde::Deserialize;
use thiserror::Error;

use crate::{
    content::Locale,
    fulfilment::OrderingHours,
    prices::{PriceError, currency_for_code, parse_price},
    pricing::{FLAT_SHIPPING_FEE, FREE_SHIPPING_THRESHOLD, PricingError, ShippingPolicy},
};

/// Errors raised while loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The configuration file could not be read.
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    /// The configuration file is not valid YAML for [`StorefrontConfig`].
    #[error("failed to parse config: {0}")]
    Yaml(#[from] serde_norway::Error),

    /// A configured price is invalid.
    #[error(transparent)]
    Price(#[from] PriceError),

    /// The shipping policy is inconsistent.
    #[error(transparent)]
    Pricing(#[from] PricingError),

    /// Shipping is priced in a different currency from the storefront.
    #[error("shipping is priced in {found}, but the storefront trades in {expected}")]
    CurrencyMismatch {
        /// Storefront currency
        expected: &'static str,

        /// Currency used by the shipping settings
        found: &'static str,
    },
}

/// Shipping settings, as price strings such as `"300000 VND"`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ShippingConfig {
    /// Cart total from which delivery is free
    pub free_shipping_threshold: String,

    /// Fee charged below the threshold
    pub flat_fee: String,
}

impl Default for ShippingConfig {
    fn default() -> Self {
        Self {
            free_shipping_threshold: format!("{FREE_SHIPPING_THRESHOLD} VND"),
            flat_fee: format!("{FLAT_SHIPPING_FEE} VND"),
        }
    }
}

/// Storefront configuration
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct StorefrontConfig {
    /// ISO code of the currency the store trades in
    pub currency: String,

    /// Default display locale
    pub locale: Locale,

    /// Shipping settings
    pub shipping: ShippingConfig,

    /// Online ordering hours
    pub hours: OrderingHours,
}

impl Default for StorefrontConfig {
    fn default() -> Self {
        Self {
            currency: "VND".to_string(),
            locale: Locale::default(),
            shipping: ShippingConfig::default(),
            hours: OrderingHours::default(),
        }
    }
}

impl StorefrontConfig {
    /// Load configuration from a YAML file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;

        Self::from_yaml(&contents)
    }

    /// Parse configuration from YAML text.
    ///
    /// # Errors
    ///
    /// Returns an error if the text is not a valid configuration.
    pub fn from_yaml(contents: &str) -> Result<Self, ConfigError> {
        if contents.trim().is_empty() {
            return Ok(Self::default());
        }

        Ok(serde_norway::from_str(contents)?)
    }

    /// The storefront currency.
    ///
    /// # Errors
    ///
    /// Returns an error if the currency code is unsupported.
    pub fn currency(&self) -> Result<&'static Currency, ConfigError> {
        Ok(currency_for_code(&self.currency)?)
    }

    /// Build the shipping policy.
    ///
    /// # Errors
    ///
    /// Returns an error if a shipping price is invalid or not in the storefront currency.
    pub fn shipping_policy(&self) -> Result<ShippingPolicy<'static>, ConfigError> {
        let currency = self.currency()?;
        let threshold = parse_price(&self.shipping.free_shipping_threshold)?;
        let flat_fee = parse_price(&self.shipping.flat_fee)?;

        if threshold.currency() != currency {
            return Err(ConfigError::CurrencyMismatch {
                expected: currency.iso_alpha_code,
                found: threshold.currency().iso_alpha_code,
            });
        }

        Ok(ShippingPolicy::new(threshold, flat_fee)?)
    }
}
