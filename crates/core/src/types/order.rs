//! Order shapes as the backend returns them.

use chrono::NaiveDateTime;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{Money, OrderId, OrderStatus, PaymentMethod, ProductId, UserId};
use crate::dates;

/// One purchased product within an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrderLine {
    pub product_id: ProductId,
    #[serde(default)]
    pub product_name: String,
    /// Unit price at the time of purchase.
    pub price: Money,
    pub quantity: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
}

impl OrderLine {
    /// `price × quantity`.
    #[must_use]
    pub fn line_total(&self) -> Money {
        self.price.times(self.quantity)
    }
}

/// A voucher as applied to an order.
///
/// Exactly one of the two discount fields is normally set; if both are,
/// the fixed amount wins.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct AppliedVoucher {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_amount: Option<Money>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discount_percentage: Option<Decimal>,
}

/// Delivery details collected at checkout.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ShippingInfo {
    pub full_name: String,
    pub phone_number: String,
    pub address: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,
}

/// An order.
///
/// Created server-side; the client only derives totals for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Order {
    pub id: OrderId,
    #[serde(default)]
    pub user_id: Option<UserId>,
    #[serde(default)]
    pub status: OrderStatus,
    #[serde(default)]
    pub order_details: Vec<OrderLine>,
    #[serde(default)]
    pub vouchers: Vec<AppliedVoucher>,
    #[serde(default)]
    pub payment_method: PaymentMethod,
    #[serde(flatten)]
    pub shipping: ShippingInfo,
    #[serde(default, with = "dates::flexible")]
    pub created_at: Option<NaiveDateTime>,
    /// Total as stored by the backend, when it sends one.
    #[serde(default)]
    pub total_money: Option<Money>,
}
