//! Pricing
//!
//! Cart valuation: per-line effective quantities, the cart total and the
//! shipping fee derived from a free-shipping threshold.

use rust_decimal::Decimal;
use rusty_money::{
    Money, MoneyError,
    iso::{Currency, VND},
};
use smallvec::SmallVec;
use thiserror::Error;
use tracing::debug;

use crate::{fulfilment::Fulfilment, items::CartItem, products::Product};

/// Cart total from which delivery is free, in VND.
pub const FREE_SHIPPING_THRESHOLD: i64 = 300_000;

/// Delivery fee charged below [`FREE_SHIPPING_THRESHOLD`], in VND.
pub const FLAT_SHIPPING_FEE: i64 = 20_000;

/// Errors that can occur while valuing a cart.
#[derive(Debug, Error, PartialEq)]
pub enum PricingError {
    /// A line's product is priced in a different currency (line index, line currency, policy currency).
    #[error("line {0} is priced in {1}, but shipping is priced in {2}")]
    CurrencyMismatch(usize, &'static str, &'static str),

    /// The running total no longer fits in minor units (line index).
    #[error("cart total overflowed at line {0}")]
    Overflow(usize),

    /// A shipping amount is below zero (which setting).
    #[error("{0} must not be negative")]
    NegativeShipping(&'static str),

    /// A line's product has a negative price (line index).
    #[error("line {0} has a negative price")]
    NegativePrice(usize),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Free-shipping threshold and the flat fee charged below it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ShippingPolicy<'a> {
    free_shipping_threshold: Money<'a, Currency>,
    flat_fee: Money<'a, Currency>,
}

impl<'a> ShippingPolicy<'a> {
    /// Creates a shipping policy.
    ///
    /// # Errors
    ///
    /// - [`PricingError::Money`]: the threshold and fee use different currencies.
    /// - [`PricingError::NegativeShipping`]: the threshold or fee is below zero.
    pub fn new(
        free_shipping_threshold: Money<'a, Currency>,
        flat_fee: Money<'a, Currency>,
    ) -> Result<Self, PricingError> {
        if free_shipping_threshold.currency() != flat_fee.currency() {
            return Err(PricingError::Money(MoneyError::CurrencyMismatch {
                expected: free_shipping_threshold.currency().iso_alpha_code,
                actual: flat_fee.currency().iso_alpha_code,
            }));
        }

        if free_shipping_threshold.to_minor_units() < 0 {
            return Err(PricingError::NegativeShipping("free shipping threshold"));
        }

        if flat_fee.to_minor_units() < 0 {
            return Err(PricingError::NegativeShipping("flat shipping fee"));
        }

        Ok(Self {
            free_shipping_threshold,
            flat_fee,
        })
    }

    /// Cart total from which shipping is free.
    pub fn free_shipping_threshold(&self) -> Money<'a, Currency> {
        self.free_shipping_threshold
    }

    /// Fee charged when the cart total is below the threshold.
    pub fn flat_fee(&self) -> Money<'a, Currency> {
        self.flat_fee
    }

    /// Currency the policy is priced in.
    pub fn currency(&self) -> &'a Currency {
        self.flat_fee.currency()
    }

    /// Shipping fee for a cart totalling `total_price`.
    pub fn fee_for(&self, total_price: &Money<'a, Currency>) -> Money<'a, Currency> {
        if total_price.to_minor_units() >= self.free_shipping_threshold.to_minor_units() {
            Money::from_minor(0, self.currency())
        } else {
            self.flat_fee
        }
    }
}

impl Default for ShippingPolicy<'static> {
    fn default() -> Self {
        Self {
            free_shipping_threshold: Money::from_minor(FREE_SHIPPING_THRESHOLD, VND),
            flat_fee: Money::from_minor(FLAT_SHIPPING_FEE, VND),
        }
    }
}

/// A cart line as displayed after valuation.
#[derive(Debug, Clone, PartialEq)]
pub struct DetailedItem<'a> {
    /// The product, if it still exists
    pub product: Option<Product<'a>>,

    /// Quantity the customer asked for
    pub requested_quantity: u32,

    /// Quantity used for pricing (zero when unavailable)
    pub quantity: u32,
}

impl<'a> From<&CartItem<'a>> for DetailedItem<'a> {
    fn from(item: &CartItem<'a>) -> Self {
        Self {
            product: item.product().cloned(),
            requested_quantity: item.quantity(),
            quantity: item.effective_quantity(),
        }
    }
}

impl DetailedItem<'_> {
    /// Whether the line counts towards the total.
    pub fn is_available(&self) -> bool {
        self.product.as_ref().is_some_and(|product| product.is_available)
    }
}

/// Result of valuing a cart snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct CartValuation<'a> {
    detailed_items: SmallVec<[DetailedItem<'a>; 8]>,
    total_price: Money<'a, Currency>,
    shipping_fee: Money<'a, Currency>,
    free_shipping_threshold: Money<'a, Currency>,
}

impl<'a> CartValuation<'a> {
    /// Every cart line in cart order, unavailable lines included.
    pub fn detailed_items(&self) -> &[DetailedItem<'a>] {
        &self.detailed_items
    }

    /// Sum of price × quantity over available lines.
    pub fn total_price(&self) -> Money<'a, Currency> {
        self.total_price
    }

    /// Shipping fee for delivering this cart.
    pub fn shipping_fee(&self) -> Money<'a, Currency> {
        self.shipping_fee
    }

    /// Shipping fee for the chosen fulfilment; pickup orders ship for free.
    pub fn shipping_fee_for(&self, fulfilment: Fulfilment) -> Money<'a, Currency> {
        match fulfilment {
            Fulfilment::Delivery => self.shipping_fee,
            Fulfilment::Pickup => Money::from_minor(0, self.currency()),
        }
    }

    /// Currency of every amount in the valuation.
    pub fn currency(&self) -> &'a Currency {
        self.total_price.currency()
    }

    /// Whether any available line has a non-zero quantity.
    pub fn has_available_items(&self) -> bool {
        self.detailed_items.iter().any(|item| item.quantity > 0)
    }

    /// How much more must be added to the cart to ship for free.
    pub fn amount_to_free_shipping(&self) -> Money<'a, Currency> {
        let missing = self.free_shipping_threshold.to_minor_units() - self.total_price.to_minor_units();

        Money::from_minor(missing.max(0), self.currency())
    }

    /// Progress towards free shipping as a fraction in `0..=1`.
    pub fn free_shipping_progress(&self) -> Decimal {
        let threshold = self.free_shipping_threshold.to_minor_units();

        if threshold <= 0 {
            return Decimal::ONE;
        }

        (Decimal::from(self.total_price.to_minor_units()) / Decimal::from(threshold))
            .min(Decimal::ONE)
    }
}

/// Values a cart snapshot.
///
/// Lines whose product is unavailable or deleted are kept in
/// [`CartValuation::detailed_items`] with a pricing quantity of zero and never
/// contribute to the total.
///
/// # Errors
///
/// - [`PricingError::CurrencyMismatch`]: a product is not priced in the policy currency.
/// - [`PricingError::Overflow`]: the total does not fit in minor units.
/// - [`PricingError::NegativePrice`]: an available product has a negative price.
#[tracing::instrument(
    level = "debug",
    skip_all,
    fields(
        lines = items.len(),
        total = tracing::field::Empty,
        shipping_fee = tracing::field::Empty
    )
)]
pub fn value_cart<'a>(
    items: &[CartItem<'a>],
    policy: &ShippingPolicy<'a>,
) -> Result<CartValuation<'a>, PricingError> {
    let currency = policy.currency();
    let mut detailed_items = SmallVec::with_capacity(items.len());

    let total_minor = items
        .iter()
        .enumerate()
        .try_fold(0_i64, |total, (idx, item)| {
            if let Some(price) = item.unit_price()
                && price.currency() != currency
            {
                return Err(PricingError::CurrencyMismatch(
                    idx,
                    price.currency().iso_alpha_code,
                    currency.iso_alpha_code,
                ));
            }

            if item.is_available()
                && item.unit_price().is_some_and(|price| price.to_minor_units() < 0)
            {
                return Err(PricingError::NegativePrice(idx));
            }

            detailed_items.push(DetailedItem::from(item));

            if !item.is_available() {
                debug!(
                    line = idx,
                    requested = item.quantity(),
                    deleted = item.product().is_none(),
                    "unavailable line excluded from total"
                );

                return Ok(total);
            }

            item.line_total_minor()
                .and_then(|line| total.checked_add(line))
                .ok_or(PricingError::Overflow(idx))
        })?;

    let total_price = Money::from_minor(total_minor, currency);
    let shipping_fee = policy.fee_for(&total_price);

    let span = tracing::Span::current();
    span.record("total", total_minor);
    span.record("shipping_fee", shipping_fee.to_minor_units());

    Ok(CartValuation {
        detailed_items,
        total_price,
        shipping_fee,
        free_shipping_threshold: policy.free_shipping_threshold(),
    })
}

#[cfg(test)]
mod tests {
    use rusty_money::iso::{USD, VND};
    use testresult::TestResult;

    use super::*;
    use crate::{content::LocalizedText, products::ProductId};

    fn product(id: &str, price: i64, is_available: bool) -> Product<'static> {
        Product::new(
            ProductId::new(id),
            LocalizedText::new(id, id),
            Money::from_minor(price, VND),
        )
        .with_availability(is_available)
    }

    fn mixed_cart(first_quantity: u32) -> [CartItem<'static>; 2] {
        [
            CartItem::new(product("bun-cha", 100_000, true), first_quantity),
            CartItem::new(product("banh-xeo", 50_000, false), 3),
        ]
    }

    #[test]
    fn unavailable_lines_are_listed_with_zero_quantity() -> TestResult {
        let valuation = value_cart(&mixed_cart(2), &ShippingPolicy::default())?;

        assert_eq!(valuation.total_price(), Money::from_minor(200_000, VND));
        assert_eq!(valuation.shipping_fee(), Money::from_minor(20_000, VND));

        let quantities: Vec<(u32, u32)> = valuation
            .detailed_items()
            .iter()
            .map(|item| (item.requested_quantity, item.quantity))
            .collect();

        assert_eq!(quantities, vec![(2, 2), (3, 0)]);

        Ok(())
    }

    #[test]
    fn reaching_threshold_waives_shipping() -> TestResult {
        let valuation = value_cart(&mixed_cart(4), &ShippingPolicy::default())?;

        assert_eq!(valuation.total_price(), Money::from_minor(400_000, VND));
        assert_eq!(valuation.shipping_fee(), Money::from_minor(0, VND));

        Ok(())
    }

    #[test]
    fn threshold_is_inclusive() -> TestResult {
        let items = [CartItem::new(product("com-ga", 150_000, true), 2)];

        let valuation = value_cart(&items, &ShippingPolicy::default())?;

        assert_eq!(valuation.total_price().to_minor_units(), FREE_SHIPPING_THRESHOLD);
        assert_eq!(valuation.shipping_fee().to_minor_units(), 0);

        Ok(())
    }

    #[test]
    fn all_available_total_is_sum_of_lines() -> TestResult {
        let items = [
            CartItem::new(product("a", 35_000, true), 3),
            CartItem::new(product("b", 12_500, true), 1),
            CartItem::new(product("c", 0, true), 7),
        ];

        let valuation = value_cart(&items, &ShippingPolicy::default())?;

        assert_eq!(valuation.total_price().to_minor_units(), 117_500);

        Ok(())
    }

    #[test]
    fn deleted_products_are_kept_and_ignored() -> TestResult {
        let items = [
            CartItem::deleted(5),
            CartItem::new(product("a", 10_000, true), 1),
        ];

        let valuation = value_cart(&items, &ShippingPolicy::default())?;

        assert_eq!(valuation.detailed_items().len(), 2);
        assert_eq!(
            valuation.detailed_items().first().map(|item| item.quantity),
            Some(0)
        );
        assert_eq!(valuation.total_price().to_minor_units(), 10_000);

        Ok(())
    }

    #[test]
    fn empty_cart_pays_flat_fee() -> TestResult {
        let valuation = value_cart(&[], &ShippingPolicy::default())?;

        assert_eq!(valuation.total_price().to_minor_units(), 0);
        assert_eq!(valuation.shipping_fee().to_minor_units(), FLAT_SHIPPING_FEE);
        assert!(
            !valuation.has_available_items(),
            "a cart of unavailable lines has nothing to order"
        );

        Ok(())
    }

    #[test]
    fn pickup_never_pays_shipping() -> TestResult {
        let valuation = value_cart(&mixed_cart(1), &ShippingPolicy::default())?;

        assert_eq!(
            valuation.shipping_fee_for(Fulfilment::Pickup),
            Money::from_minor(0, VND)
        );
        assert_eq!(
            valuation.shipping_fee_for(Fulfilment::Delivery),
            Money::from_minor(20_000, VND)
        );

        Ok(())
    }

    #[test]
    fn free_shipping_progress_is_capped() -> TestResult {
        let halfway = [CartItem::new(product("lau", 150_000, true), 1)];

        let below = value_cart(&halfway, &ShippingPolicy::default())?;
        let above = value_cart(&mixed_cart(5), &ShippingPolicy::default())?;

        assert_eq!(below.amount_to_free_shipping(), Money::from_minor(150_000, VND));
        assert_eq!(below.free_shipping_progress(), Decimal::new(5, 1));
        assert_eq!(above.amount_to_free_shipping(), Money::from_minor(0, VND));
        assert_eq!(above.free_shipping_progress(), Decimal::ONE);

        Ok(())
    }

    #[test]
    fn foreign_currency_line_is_rejected() {
        let mut foreign = product("imported", 500, true);
        foreign.price = Money::from_minor(500, USD);

        let items = [CartItem::new(foreign, 1)];

        assert_eq!(
            value_cart(&items, &ShippingPolicy::default()),
            Err(PricingError::CurrencyMismatch(
                0,
                USD.iso_alpha_code,
                VND.iso_alpha_code
            ))
        );
    }

    #[test]
    fn overflowing_total_is_rejected() {
        let items = [
            CartItem::new(product("a", i64::MAX / 2, true), 1),
            CartItem::new(product("b", i64::MAX / 2, true), 1),
            CartItem::new(product("c", 10, true), 1),
        ];

        assert_eq!(
            value_cart(&items, &ShippingPolicy::default()),
            Err(PricingError::Overflow(2))
        );
    }

    #[test]
    fn policy_rejects_mixed_currencies() {
        let result = ShippingPolicy::new(Money::from_minor(100, VND), Money::from_minor(1, USD));

        assert!(
            matches!(
                result,
                Err(PricingError::Money(MoneyError::CurrencyMismatch { .. }))
            ),
            "expected a currency mismatch, got {result:?}"
        );
    }

    #[test]
    fn policy_rejects_negative_amounts() {
        assert_eq!(
            ShippingPolicy::new(Money::from_minor(0, VND), Money::from_minor(-20_000, VND)),
            Err(PricingError::NegativeShipping("flat shipping fee"))
        );
        assert_eq!(
            ShippingPolicy::new(Money::from_minor(-1, VND), Money::from_minor(20_000, VND)),
            Err(PricingError::NegativeShipping("free shipping threshold"))
        );
    }

    #[test]
    fn negative_price_is_rejected() {
        let items = [
            CartItem::new(product("bun-cha", 100_000, true), 1),
            CartItem::new(product("refund", -5_000, true), 2),
        ];

        assert_eq!(
            value_cart(&items, &ShippingPolicy::default()),
            Err(PricingError::NegativePrice(1))
        );
    }
}
