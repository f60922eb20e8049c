//! Platter
//!
//! Cart valuation and checkout pricing for a food-ordering storefront: line
//! totals over a cart snapshot, free-shipping thresholds, voucher discounts,
//! ordering hours and the checkout payload sent to the storefront backend.

pub mod cart;
pub mod checkout;
pub mod config;
pub mod content;
pub mod discounts;
pub mod fixtures;
pub mod fulfilment;
pub mod items;
pub mod observability;
pub mod orders;
pub mod prelude;
pub mod prices;
pub mod pricing;
pub mod products;
pub mod receipt;
pub mod vouchers;
