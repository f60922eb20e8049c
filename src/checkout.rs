//! Checkout
//!
//! Order totals and the payload sent to the backend's checkout endpoint.

use jiff::{Timestamp, civil::Time};
use rusty_money::{Money, MoneyError, iso::Currency};
use serde::Serialize;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    fulfilment::{Fulfilment, Notice, OrderingHours},
    pricing::{CartValuation, ShippingPolicy},
    products::ProductId,
    vouchers::{Voucher, VoucherError, discount_for},
};

/// Errors that prevent an order from being placed.
#[derive(Debug, Error, PartialEq)]
pub enum CheckoutError {
    /// No cart line can currently be ordered.
    #[error("cart has no available items")]
    EmptyCart,

    /// The chosen fulfilment mode is closed at the time of ordering.
    #[error("{fulfilment:?} is not available: {notice}")]
    FulfilmentUnavailable {
        /// Requested mode
        fulfilment: Fulfilment,

        /// Reason shown to the customer
        notice: String,
    },

    /// Delivery orders need an address and a phone number.
    #[error("delivery orders need a {0}")]
    MissingDeliveryDetail(&'static str),

    /// The voucher cannot be redeemed.
    #[error(transparent)]
    Voucher(#[from] VoucherError),

    /// Wrapped money arithmetic or currency mismatch error.
    #[error(transparent)]
    Money(#[from] MoneyError),
}

/// Amounts shown on the checkout page.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CheckoutSummary<'a> {
    /// Total price of available cart lines
    pub subtotal: Money<'a, Currency>,

    /// Shipping charged for the chosen fulfilment
    pub shipping_fee: Money<'a, Currency>,

    /// Voucher discount, never more than the subtotal
    pub discount: Money<'a, Currency>,

    /// `subtotal + shipping_fee - discount`
    pub total: Money<'a, Currency>,
}

impl<'a> CheckoutSummary<'a> {
    /// Computes the checkout amounts for a valued cart.
    ///
    /// # Errors
    ///
    /// Returns an error if the voucher cannot be applied to the subtotal.
    pub fn new(
        valuation: &CartValuation<'a>,
        fulfilment: Fulfilment,
        voucher: Option<&Voucher<'a>>,
    ) -> Result<Self, CheckoutError> {
        let subtotal = valuation.total_price();
        let shipping_fee = valuation.shipping_fee_for(fulfilment);
        let discount = discount_for(voucher, &subtotal).map_err(VoucherError::from)?;
        let total = subtotal.add(shipping_fee)?.sub(discount)?;

        Ok(Self {
            subtotal,
            shipping_fee,
            discount,
            total,
        })
    }
}

/// One line of the checkout payload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderLine {
    /// Product identifier
    pub product: ProductId,

    /// Quantity ordered
    pub quantity: u32,
}

/// Body of the backend's `POST /checkout` request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    /// Ordering customer
    pub customer_id: String,

    /// Whether the order is delivered
    pub is_delivery: bool,

    /// Ordered lines
    pub items: Vec<OrderLine>,

    /// Delivery contact phone
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_phone: Option<String>,

    /// Delivery address
    #[serde(skip_serializing_if = "Option::is_none")]
    pub delivery_address: Option<String>,

    /// Identifier of the applied voucher
    #[serde(skip_serializing_if = "Option::is_none")]
    pub voucher: Option<String>,

    /// Free-form order note
    #[serde(skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// A validated order, ready to be confirmed by the customer and submitted.
#[derive(Debug, Clone)]
pub struct Checkout<'a> {
    /// Amounts to confirm
    pub summary: CheckoutSummary<'a>,

    /// Payload to submit
    pub request: CheckoutRequest,
}

/// Builds a [`Checkout`] from a valued cart.
#[derive(Debug, Clone)]
pub struct CheckoutBuilder<'v, 'a> {
    valuation: &'v CartValuation<'a>,
    customer_id: String,
    fulfilment: Fulfilment,
    voucher: Option<&'v Voucher<'a>>,
    delivery_phone: Option<String>,
    delivery_address: Option<String>,
    note: Option<String>,
}

impl<'v, 'a> CheckoutBuilder<'v, 'a> {
    /// Starts a pickup order for `customer_id`.
    pub fn new(valuation: &'v CartValuation<'a>, customer_id: impl Into<String>) -> Self {
        Self {
            valuation,
            customer_id: customer_id.into(),
            fulfilment: Fulfilment::Pickup,
            voucher: None,
            delivery_phone: None,
            delivery_address: None,
            note: None,
        }
    }

    /// Chooses pickup or delivery.
    #[must_use]
    pub fn fulfilment(mut self, fulfilment: Fulfilment) -> Self {
        self.fulfilment = fulfilment;
        self
    }

    /// Sets the delivery address and phone number.
    #[must_use]
    pub fn deliver_to(mut self, address: impl Into<String>, phone: impl Into<String>) -> Self {
        self.delivery_address = Some(address.into());
        self.delivery_phone = Some(phone.into());
        self
    }

    /// Applies a voucher.
    #[must_use]
    pub fn voucher(mut self, voucher: &'v Voucher<'a>) -> Self {
        self.voucher = Some(voucher);
        self
    }

    /// Attaches a note; blank notes are dropped.
    #[must_use]
    pub fn note(mut self, note: impl Into<String>) -> Self {
        let note = note.into();
        self.note = (!note.trim().is_empty()).then_some(note);
        self
    }

    /// Validates the order as placed at `now` (store-local time `local_time`).
    ///
    /// # Errors
    ///
    /// - [`CheckoutError::EmptyCart`]: no cart line is available.
    /// - [`CheckoutError::FulfilmentUnavailable`]: the chosen mode is closed.
    /// - [`CheckoutError::MissingDeliveryDetail`]: delivery without address or phone.
    /// - [`CheckoutError::Voucher`]: the voucher is expired, used up or inapplicable.
    #[tracing::instrument(
        level = "debug",
        skip_all,
        fields(
            customer_id = %self.customer_id,
            fulfilment = ?self.fulfilment,
            voucher = tracing::field::Empty,
            total = tracing::field::Empty
        )
    )]
    pub fn build(
        self,
        hours: &OrderingHours,
        policy: &ShippingPolicy<'a>,
        now: Timestamp,
        local_time: Time,
    ) -> Result<Checkout<'a>, CheckoutError> {
        let span = tracing::Span::current();

        if !self.valuation.has_available_items() {
            return Err(CheckoutError::EmptyCart);
        }

        let option = *hours.options_at(local_time, policy).get(self.fulfilment);

        if !option.available {
            return Err(unavailable(self.fulfilment, option.notice));
        }

        if self.fulfilment.is_delivery() {
            if blank(self.delivery_address.as_deref()) {
                return Err(CheckoutError::MissingDeliveryDetail("delivery address"));
            }

            if blank(self.delivery_phone.as_deref()) {
                return Err(CheckoutError::MissingDeliveryDetail("delivery phone"));
            }
        }

        if let Some(voucher) = self.voucher {
            span.record("voucher", voucher.code().as_str());

            if let Err(error) = voucher.check_redeemable(now) {
                warn!(code = %voucher.code(), %error, "voucher rejected at checkout");

                return Err(error.into());
            }
        }

        let summary = CheckoutSummary::new(self.valuation, self.fulfilment, self.voucher)?;

        let items = self
            .valuation
            .detailed_items()
            .iter()
            .filter(|item| item.quantity > 0)
            .filter_map(|item| {
                item.product.as_ref().map(|product| OrderLine {
                    product: product.id.clone(),
                    quantity: item.quantity,
                })
            })
            .collect::<Vec<_>>();

        let (delivery_address, delivery_phone) = if self.fulfilment.is_delivery() {
            (self.delivery_address, self.delivery_phone)
        } else {
            (None, None)
        };

        span.record("total", summary.total.to_minor_units());
        info!(lines = items.len(), total = %summary.total, "checkout ready");

        Ok(Checkout {
            summary,
            request: CheckoutRequest {
                customer_id: self.customer_id,
                is_delivery: self.fulfilment.is_delivery(),
                items,
                delivery_phone,
                delivery_address,
                voucher: self.voucher.map(|voucher| voucher.id().to_string()),
                note: self.note,
            },
        })
    }
}

fn unavailable(fulfilment: Fulfilment, notice: Notice<'_>) -> CheckoutError {
    CheckoutError::FulfilmentUnavailable {
        fulfilment,
        notice: notice.to_string(),
    }
}

fn blank(value: Option<&str>) -> bool {
    value.is_none_or(|value| value.trim().is_empty())
}

#[cfg(test)]
mod tests {
    use jiff::civil::time;
    use rust_decimal::Decimal;
    use rusty_money::iso::VND;
    use testresult::TestResult;

    use super::*;
    use crate::{
        content::LocalizedText,
        items::CartItem,
        pricing::value_cart,
        products::Product,
        vouchers::{DiscountType, VoucherCode, VoucherRecord},
    };

    fn valuation(first_quantity: u32) -> TestResult<CartValuation<'static>> {
        let items = [
            CartItem::new(
                Product::new(
                    ProductId::new("bun-bo"),
                    LocalizedText::new("Bún bò", "Beef noodle soup"),
                    Money::from_minor(100_000, VND),
                ),
                first_quantity,
            ),
            CartItem::new(
                Product::new(
                    ProductId::new("che"),
                    LocalizedText::new("Chè", "Sweet soup"),
                    Money::from_minor(50_000, VND),
                )
                .with_availability(false),
                3,
            ),
            CartItem::deleted(1),
        ];

        Ok(value_cart(&items, &ShippingPolicy::default())?)
    }

    fn voucher(discount_type: DiscountType, amount: i64) -> TestResult<Voucher<'static>> {
        Ok(Voucher::from_record(
            VoucherRecord {
                id: "v-42".to_string(),
                code: VoucherCode::parse("sale")?,
                discount_type,
                discount_amount: Decimal::new(amount, 0),
                total_usage_limit: 3,
                expired_date: None,
            },
            VND,
        )?)
    }

    fn build(builder: CheckoutBuilder<'_, 'static>, hour: i8) -> Result<Checkout<'static>, CheckoutError> {
        builder.build(
            &OrderingHours::default(),
            &ShippingPolicy::default(),
            Timestamp::UNIX_EPOCH,
            time(hour, 0, 0, 0),
        )
    }

    #[test]
    fn summary_adds_shipping_and_subtracts_discount() -> TestResult {
        let valuation = valuation(2)?;
        let voucher = voucher(DiscountType::Percent, 10)?;

        let summary = CheckoutSummary::new(&valuation, Fulfilment::Delivery, Some(&voucher))?;

        assert_eq!(summary.subtotal, Money::from_minor(200_000, VND));
        assert_eq!(summary.shipping_fee, Money::from_minor(20_000, VND));
        assert_eq!(summary.discount, Money::from_minor(20_000, VND));
        assert_eq!(summary.total, Money::from_minor(200_000, VND));

        Ok(())
    }

    #[test]
    fn capped_amount_voucher_leaves_only_shipping() -> TestResult {
        let valuation = valuation(2)?;
        let voucher = voucher(DiscountType::Amount, 500_000)?;

        let summary = CheckoutSummary::new(&valuation, Fulfilment::Delivery, Some(&voucher))?;

        assert_eq!(summary.discount, Money::from_minor(200_000, VND));
        assert_eq!(summary.total, Money::from_minor(20_000, VND));

        Ok(())
    }

    #[test]
    fn pickup_summary_has_no_shipping() -> TestResult {
        let summary = CheckoutSummary::new(&valuation(2)?, Fulfilment::Pickup, None)?;

        assert_eq!(summary.shipping_fee, Money::from_minor(0, VND));
        assert_eq!(summary.total, Money::from_minor(200_000, VND));

        Ok(())
    }

    #[test]
    fn build_sends_only_orderable_lines() -> TestResult {
        let valuation = valuation(2)?;
        let voucher = voucher(DiscountType::Amount, 30_000)?;

        let checkout = build(
            CheckoutBuilder::new(&valuation, "customer-1")
                .fulfilment(Fulfilment::Delivery)
                .deliver_to("12 Lý Thường Kiệt, Hà Nội", "0901234567")
                .voucher(&voucher)
                .note("less ice"),
            10,
        )?;

        assert_eq!(
            checkout.request.items,
            vec![OrderLine {
                product: ProductId::new("bun-bo"),
                quantity: 2,
            }]
        );
        assert_eq!(checkout.request.voucher.as_deref(), Some("v-42"));
        assert_eq!(checkout.summary.total, Money::from_minor(190_000, VND));

        Ok(())
    }

    #[test]
    fn request_serializes_backend_field_names() -> TestResult {
        let valuation = valuation(1)?;

        let checkout = build(CheckoutBuilder::new(&valuation, "c-9").note("  "), 9)?;
        let json = serde_json::to_value(&checkout.request)?;

        assert_eq!(
            json,
            serde_json::json!({
                "customerId": "c-9",
                "isDelivery": false,
                "items": [{ "product": "bun-bo", "quantity": 1 }]
            })
        );

        Ok(())
    }

    #[test]
    fn pickup_drops_delivery_details() -> TestResult {
        let valuation = valuation(1)?;

        let checkout = build(
            CheckoutBuilder::new(&valuation, "c").deliver_to("somewhere", "0900000000"),
            9,
        )?;

        assert_eq!(checkout.request.delivery_address, None);
        assert_eq!(checkout.request.delivery_phone, None);

        Ok(())
    }

    #[test]
    fn build_rejects_cart_without_available_items() -> TestResult {
        let valuation = valuation(0)?;

        assert_eq!(
            build(CheckoutBuilder::new(&valuation, "c"), 10).map(|checkout| checkout.request),
            Err(CheckoutError::EmptyCart)
        );

        Ok(())
    }

    #[test]
    fn build_rejects_delivery_after_cutoff() -> TestResult {
        let valuation = valuation(1)?;

        let result = build(
            CheckoutBuilder::new(&valuation, "c")
                .fulfilment(Fulfilment::Delivery)
                .deliver_to("address", "phone"),
            21,
        );

        assert!(result.is_ok(), "pickup at 21:30 should be accepted, got {result:?}");

        let late = CheckoutBuilder::new(&valuation, "c")
            .fulfilment(Fulfilment::Delivery)
            .deliver_to("address", "phone")
            .build(
                &OrderingHours::default(),
                &ShippingPolicy::default(),
                Timestamp::UNIX_EPOCH,
                time(21, 15, 0, 0),
            );

        assert!(
            matches!(
                late,
                Err(CheckoutError::FulfilmentUnavailable {
                    fulfilment: Fulfilment::Delivery,
                    ..
                })
            ),
            "expected delivery to be closed, got {late:?}"
        );

        Ok(())
    }

    #[test]
    fn build_requires_delivery_details() -> TestResult {
        let valuation = valuation(1)?;

        let result = build(
            CheckoutBuilder::new(&valuation, "c").fulfilment(Fulfilment::Delivery),
            12,
        );

        assert!(
            matches!(
                result,
                Err(CheckoutError::MissingDeliveryDetail("delivery address"))
            ),
            "expected a missing address error, got {result:?}"
        );

        Ok(())
    }

    #[test]
    fn build_rejects_used_up_voucher() -> TestResult {
        let valuation = valuation(1)?;
        let voucher = voucher(DiscountType::Percent, 10)?.with_usage_limit(0);

        let result = build(CheckoutBuilder::new(&valuation, "c").voucher(&voucher), 12);

        assert!(
            matches!(
                result,
                Err(CheckoutError::Voucher(VoucherError::Exhausted(_)))
            ),
            "expected a used-up voucher error, got {result:?}"
        );

        Ok(())
    }
}
