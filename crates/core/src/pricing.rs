//! Order totals and status aggregation.
//!
//! `subtotal = Σ price × quantity`, `discount = Σ voucher discounts`,
//! `total = max(0, subtotal − discount)`. Each voucher contributes its fixed
//! amount if it has one, otherwise its percentage of the subtotal, otherwise
//! nothing. Percentages are taken of the full subtotal, not of what earlier
//! vouchers left over.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::types::{AppliedVoucher, Money, Order, OrderLine, OrderStatus};

/// Derived money figures for an order or cart.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct OrderTotals {
    pub subtotal: Money,
    pub discount: Money,
    pub total: Money,
}

/// Discount one voucher grants on `subtotal`.
#[must_use]
pub fn voucher_discount(voucher: &AppliedVoucher, subtotal: Money) -> Money {
    match (voucher.discount_amount, voucher.discount_percentage) {
        (Some(amount), _) => amount,
        (None, Some(percentage)) => subtotal.percent(percentage),
        (None, None) => Money::ZERO,
    }
}

/// Compute subtotal, discount and total.
#[must_use]
pub fn order_totals(lines: &[OrderLine], vouchers: &[AppliedVoucher]) -> OrderTotals {
    let subtotal: Money = lines.iter().map(OrderLine::line_total).sum();
    let discount: Money = vouchers
        .iter()
        .map(|voucher| voucher_discount(voucher, subtotal))
        .sum();

    OrderTotals {
        subtotal,
        discount,
        total: subtotal.saturating_sub(discount),
    }
}

/// The amount the customer pays for `order`.
#[must_use]
pub fn calculate_order_total(order: &Order) -> Money {
    order.totals().total
}

impl Order {
    #[must_use]
    pub fn totals(&self) -> OrderTotals {
        order_totals(&self.order_details, &self.vouchers)
    }
}

/// Per-status counts and completed revenue over a set of orders.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct OrderStatusSummary {
    /// Orders per status; every status is present, possibly with 0.
    pub counts: BTreeMap<OrderStatus, usize>,
    pub total_orders: usize,
    /// Sum of computed totals of completed orders.
    pub revenue: Money,
}

impl OrderStatusSummary {
    #[must_use]
    pub fn from_orders<'a>(orders: impl IntoIterator<Item = &'a Order>) -> Self {
        let mut counts: BTreeMap<OrderStatus, usize> =
            OrderStatus::ALL.into_iter().map(|s| (s, 0)).collect();
        let mut total_orders = 0;
        let mut revenue = Money::ZERO;

        for order in orders {
            total_orders += 1;
            *counts.entry(order.status).or_default() += 1;
            if order.status == OrderStatus::Completed {
                revenue += calculate_order_total(order);
            }
        }

        Self {
            counts,
            total_orders,
            revenue,
        }
    }

    #[must_use]
    pub fn count(&self, status: OrderStatus) -> usize {
        self.counts.get(&status).copied().unwrap_or(0)
    }

    /// Orders that still need staff action.
    #[must_use]
    pub fn open_orders(&self) -> usize {
        OrderStatus::ALL
            .into_iter()
            .filter(|s| !s.is_terminal())
            .map(|s| self.count(s))
            .sum()
    }
}
