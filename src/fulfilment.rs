//! Fulfilment
//!
//! Pickup versus delivery, and which of the two the store accepts at a given
//! time of day.

use std::fmt;

use jiff::civil::{Time, time};
use rusty_money::{Money, iso::Currency};
use serde::{Deserialize, Serialize};

use crate::pricing::ShippingPolicy;

/// How an order reaches the customer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum Fulfilment {
    /// Customer collects the order from the store.
    Pickup,

    /// Store delivers the order; shipping fees apply.
    Delivery,
}

impl Fulfilment {
    /// Whether this is a delivery order.
    pub fn is_delivery(self) -> bool {
        matches!(self, Fulfilment::Delivery)
    }
}

/// Why a fulfilment option is or isn't offered, shown next to it at checkout.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Notice<'a> {
    /// Online ordering hasn't opened yet today.
    NotOpenYet {
        /// Time online ordering opens
        opens_at: Time,
    },

    /// Pickup orders must be collected within the hour.
    CollectWithinHour,

    /// Delivery costs extra below the free-shipping threshold.
    DeliverySurcharge {
        /// Flat fee charged
        fee: Money<'a, Currency>,

        /// Cart total from which delivery is free
        threshold: Money<'a, Currency>,
    },

    /// The store closes soon; pickup orders must be collected before then.
    StoreClosingSoon {
        /// Store closing time
        closes_at: Time,
    },

    /// Delivery has stopped for the day.
    DeliveryEnded {
        /// Last time a delivery order is accepted
        delivery_until: Time,
    },

    /// Online ordering has closed for the day.
    OrderingClosed {
        /// Time online ordering opens
        opens_at: Time,

        /// Last time any order is accepted
        orders_until: Time,
    },
}

impl fmt::Display for Notice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NotOpenYet { opens_at } => write!(
                f,
                "our store starts receiving online orders from {}",
                clock(*opens_at)
            ),
            Notice::CollectWithinHour => {
                f.write_str("please get your order within 1 hour, or we might cancel it")
            }
            Notice::DeliverySurcharge { fee, threshold } => write!(
                f,
                "you will have to pay extra {fee} if the total price is less than {threshold}"
            ),
            Notice::StoreClosingSoon { closes_at } => write!(
                f,
                "our store will be closed at {}, please get your order before that",
                clock(*closes_at)
            ),
            Notice::DeliveryEnded { delivery_until } => write!(
                f,
                "delivery service is not available after {}",
                clock(*delivery_until)
            ),
            Notice::OrderingClosed {
                opens_at,
                orders_until,
            } => write!(
                f,
                "sorry, we only receive online orders from {} to {}",
                clock(*opens_at),
                clock(*orders_until)
            ),
        }
    }
}

/// Whether one fulfilment mode is offered, and the notice shown with it.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FulfilmentOption<'a> {
    /// Whether the mode can be chosen
    pub available: bool,

    /// Notice displayed next to the mode
    pub notice: Notice<'a>,
}

impl<'a> FulfilmentOption<'a> {
    fn open(notice: Notice<'a>) -> Self {
        Self {
            available: true,
            notice,
        }
    }

    fn closed(notice: Notice<'a>) -> Self {
        Self {
            available: false,
            notice,
        }
    }
}

/// Pickup and delivery availability at one point in the day.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FulfilmentOptions<'a> {
    /// Pickup availability
    pub pickup: FulfilmentOption<'a>,

    /// Delivery availability
    pub delivery: FulfilmentOption<'a>,
}

impl<'a> FulfilmentOptions<'a> {
    /// Returns the option for `fulfilment`.
    pub fn get(&self, fulfilment: Fulfilment) -> &FulfilmentOption<'a> {
        match fulfilment {
            Fulfilment::Pickup => &self.pickup,
            Fulfilment::Delivery => &self.delivery,
        }
    }

    /// Whether at least one mode can be chosen.
    pub fn any_available(&self) -> bool {
        self.pickup.available || self.delivery.available
    }
}

/// Daily online ordering schedule, in store-local time.
///
/// Times are compared at minute precision, so an order at 21:00:59 still
/// counts as 21:00.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct OrderingHours {
    /// First minute online orders are accepted
    pub opens_at: Time,

    /// Last minute delivery orders are accepted
    pub delivery_until: Time,

    /// Last minute pickup orders are accepted
    pub orders_until: Time,

    /// Time the store closes
    pub closes_at: Time,
}

impl Default for OrderingHours {
    fn default() -> Self {
        Self {
            opens_at: time(7, 0, 0, 0),
            delivery_until: time(21, 0, 0, 0),
            orders_until: time(21, 30, 0, 0),
            closes_at: time(22, 0, 0, 0),
        }
    }
}

impl OrderingHours {
    /// Which fulfilment modes are offered at `at`.
    pub fn options_at<'a>(&self, at: Time, policy: &ShippingPolicy<'a>) -> FulfilmentOptions<'a> {
        let now = minute_of_day(at);

        if now < minute_of_day(self.opens_at) {
            let notice = Notice::NotOpenYet {
                opens_at: self.opens_at,
            };

            return FulfilmentOptions {
                pickup: FulfilmentOption::closed(notice),
                delivery: FulfilmentOption::closed(notice),
            };
        }

        if now <= minute_of_day(self.delivery_until) {
            return FulfilmentOptions {
                pickup: FulfilmentOption::open(Notice::CollectWithinHour),
                delivery: FulfilmentOption::open(Notice::DeliverySurcharge {
                    fee: policy.flat_fee(),
                    threshold: policy.free_shipping_threshold(),
                }),
            };
        }

        if now <= minute_of_day(self.orders_until) {
            return FulfilmentOptions {
                pickup: FulfilmentOption::open(Notice::StoreClosingSoon {
                    closes_at: self.closes_at,
                }),
                delivery: FulfilmentOption::closed(Notice::DeliveryEnded {
                    delivery_until: self.delivery_until,
                }),
            };
        }

        FulfilmentOptions {
            pickup: FulfilmentOption::closed(Notice::OrderingClosed {
                opens_at: self.opens_at,
                orders_until: self.orders_until,
            }),
            delivery: FulfilmentOption::closed(Notice::DeliveryEnded {
                delivery_until: self.delivery_until,
            }),
        }
    }
}

fn minute_of_day(at: Time) -> i32 {
    i32::from(at.hour()) * 60 + i32::from(at.minute())
}

fn clock(at: Time) -> String {
    format!("{}:{:02}", at.hour(), at.minute())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn options(hour: i8, minute: i8, second: i8) -> FulfilmentOptions<'static> {
        OrderingHours::default().options_at(time(hour, minute, second, 0), &ShippingPolicy::default())
    }

    #[test]
    fn before_opening_nothing_is_offered() {
        let options = options(6, 59, 59);

        assert!(!options.any_available(), "nothing should be offered before opening");
        assert_eq!(
            options.pickup.notice.to_string(),
            "our store starts receiving online orders from 7:00"
        );
    }

    #[test]
    fn opening_minute_offers_both_modes() {
        let options = options(7, 0, 0);

        assert!(options.get(Fulfilment::Pickup).available, "pickup should open at 7:00");
        assert!(options.get(Fulfilment::Delivery).available, "delivery should open at 7:00");
        assert_eq!(options.pickup.notice, Notice::CollectWithinHour);
    }

    #[test]
    fn delivery_notice_mentions_fee_and_threshold() {
        let options = options(12, 0, 0);

        assert!(
            matches!(
                options.delivery.notice,
                Notice::DeliverySurcharge { fee, threshold }
                    if fee.to_minor_units() == 20_000 && threshold.to_minor_units() == 300_000
            ),
            "expected the delivery surcharge notice"
        );
    }

    #[test]
    fn delivery_cutoff_is_minute_precise() {
        assert!(options(21, 0, 59).delivery.available, "21:00:59 still counts as 21:00");
        assert!(!options(21, 1, 0).delivery.available, "delivery should stop after 21:00");
    }

    #[test]
    fn late_evening_is_pickup_only() {
        let options = options(21, 30, 0);

        assert!(options.pickup.available, "pickup should stay open until 21:30");
        assert!(!options.delivery.available, "delivery should be closed after 21:00");
        assert_eq!(
            options.pickup.notice.to_string(),
            "our store will be closed at 22:00, please get your order before that"
        );
        assert_eq!(
            options.delivery.notice.to_string(),
            "delivery service is not available after 21:00"
        );
    }

    #[test]
    fn after_last_orders_nothing_is_offered() {
        let options = options(21, 31, 0);

        assert!(!options.any_available(), "nothing should be offered after 21:30");
        assert_eq!(
            options.pickup.notice.to_string(),
            "sorry, we only receive online orders from 7:00 to 21:30"
        );
        assert_eq!(
            options.delivery.notice.to_string(),
            "delivery service is not available after 21:00"
        );
    }

    #[test]
    fn fulfilment_is_delivery() {
        assert!(Fulfilment::Delivery.is_delivery(), "delivery ships the order");
        assert!(!Fulfilment::Pickup.is_delivery(), "pickup does not ship the order");
    }
}
