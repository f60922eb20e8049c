//! Orders
//!
//! Order records returned by the backend once checkout succeeds.

use std::fmt;

use jiff::Timestamp;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::{products::ProductId, vouchers::VoucherRecord};

/// Order lifecycle status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum OrderStatus {
    /// Received and being prepared
    Processing,

    /// Out for delivery
    Delivering,

    /// Handed over to the customer
    Done,

    /// Cancelled by the store or the customer
    Cancelled,
}

impl OrderStatus {
    /// Whether the order can no longer change.
    pub fn is_final(self) -> bool {
        matches!(self, OrderStatus::Done | OrderStatus::Cancelled)
    }
}

impl fmt::Display for OrderStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            OrderStatus::Processing => "Processing",
            OrderStatus::Delivering => "Delivering",
            OrderStatus::Done => "Done",
            OrderStatus::Cancelled => "Cancelled",
        };

        f.write_str(label)
    }
}

/// A line of a placed order.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderItem {
    /// Ordered product
    pub product_id: ProductId,

    /// Quantity ordered
    pub quantity: u32,
}

/// Voucher attached to an order: either its identifier or the full record.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum OrderVoucher {
    /// Voucher identifier only
    Id(String),

    /// Populated voucher record
    Record(VoucherRecord),
}

impl OrderVoucher {
    /// Identifier of the voucher either way.
    pub fn id(&self) -> &str {
        match self {
            OrderVoucher::Id(id) => id,
            OrderVoucher::Record(record) => &record.id,
        }
    }
}

/// Order as returned by the backend.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Order {
    /// Order identifier
    #[serde(rename = "_id")]
    pub id: String,

    /// Ordering customer
    pub customer_id: String,

    /// Ordered lines
    pub items: Vec<OrderItem>,

    /// Amount charged, in major units
    pub total_price: Decimal,

    /// Customer note
    #[serde(default)]
    pub note: Option<String>,

    /// Applied voucher
    #[serde(default)]
    pub voucher: Option<OrderVoucher>,

    /// Whether the order is delivered
    pub is_delivery: bool,

    /// Delivery address
    #[serde(default)]
    pub delivery_address: Option<String>,

    /// Delivery phone
    #[serde(default)]
    pub delivery_phone: Option<String>,

    /// Customer rating once done
    #[serde(default)]
    pub rating: Option<u8>,

    /// Current status
    pub status: OrderStatus,

    /// Creation instant
    #[serde(default)]
    pub created_at: Option<Timestamp>,
}

impl Order {
    /// Total number of units ordered.
    pub fn item_count(&self) -> u64 {
        self.items.iter().map(|item| u64::from(item.quantity)).sum()
    }
}

/// Response envelope of the backend's checkout endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct CheckoutResponse {
    /// Created order
    pub data: Order,

    /// Human-readable status message
    #[serde(default)]
    pub message: Option<String>,
}

#[cfg(test)]
mod tests {
    use testresult::TestResult;

    use super::*;

    #[test]
    fn checkout_response_deserializes() -> TestResult {
        let response: CheckoutResponse = serde_json::from_str(
            r#"{
                "message": "order created",
                "data": {
                    "_id": "ord-1",
                    "customerId": "c-1",
                    "items": [
                        { "productId": "bun-bo", "quantity": 2 },
                        { "productId": "tra-da", "quantity": 3 }
                    ],
                    "totalPrice": 220000,
                    "voucher": "v-42",
                    "isDelivery": true,
                    "deliveryAddress": "12 Lý Thường Kiệt",
                    "deliveryPhone": "0901234567",
                    "status": "Processing",
                    "createdAt": "2024-03-01T03:15:00Z"
                }
            }"#,
        )?;

        let order = response.data;

        assert_eq!(order.item_count(), 5);
        assert_eq!(order.total_price, Decimal::new(220_000, 0));
        assert_eq!(order.voucher.as_ref().map(OrderVoucher::id), Some("v-42"));
        assert_eq!(order.status, OrderStatus::Processing);
        assert!(!order.status.is_final(), "processing orders are still open");

        Ok(())
    }

    #[test]
    fn populated_voucher_is_accepted() -> TestResult {
        let order: Order = serde_json::from_str(
            r#"{
                "_id": "ord-2",
                "customerId": "c-1",
                "items": [],
                "totalPrice": 0,
                "voucher": {
                    "_id": "v-7",
                    "code": "free",
                    "discountType": "percent",
                    "discountAmount": 100,
                    "totalUsageLimit": 1
                },
                "isDelivery": false,
                "status": "Cancelled"
            }"#,
        )?;

        assert_eq!(order.voucher.as_ref().map(OrderVoucher::id), Some("v-7"));
        assert!(order.status.is_final(), "done orders are final");

        Ok(())
    }

    #[test]
    fn status_displays_backend_label() {
        assert_eq!(OrderStatus::Delivering.to_string(), "Delivering");
    }
}
