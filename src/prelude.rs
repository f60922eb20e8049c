//! Platter prelude.
//!
//! Convenience exports for common library consumers.

pub use crate::{
    cart::{Cart, CartError},
    checkout::{Checkout, CheckoutBuilder, CheckoutError, CheckoutRequest, CheckoutSummary, OrderLine},
    config::{ConfigError, StorefrontConfig},
    content::{Locale, LocalizedText},
    discounts::DiscountError,
    fixtures::{Fixture, FixtureError},
    fulfilment::{Fulfilment, FulfilmentOption, FulfilmentOptions, Notice, OrderingHours},
    items::CartItem,
    orders::{CheckoutResponse, Order, OrderStatus},
    prices::PriceError,
    pricing::{CartValuation, DetailedItem, PricingError, ShippingPolicy, value_cart},
    products::{Product, ProductId, ProductRecord},
    receipt::{Receipt, ReceiptError},
    vouchers::{DiscountType, Voucher, VoucherCode, VoucherError, VoucherRecord, discount_for},
};
