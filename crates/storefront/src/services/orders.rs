//! Checkout, order history and customer cancellation.

use bookstore_core::pagination::{Page, PageRequest};
use bookstore_core::pricing::OrderTotals;
use bookstore_core::validation::validate_shipping;
use bookstore_core::{
    AppliedVoucher, Money, Order, OrderId, OrderStatus, PaymentMethod, ProductId, ShippingInfo,
    UserId,
};
use serde::Serialize;
use tracing::{info, instrument, warn};

use crate::error::ServiceError;
use crate::state::Storefront;

/// What the checkout screen collects.
#[derive(Debug, Clone, Default)]
pub struct Checkout {
    pub shipping: ShippingInfo,
    pub payment_method: PaymentMethod,
    pub voucher_codes: Vec<String>,
}

#[derive(Debug, Serialize)]
struct OrderLineRequest {
    product_id: ProductId,
    quantity: u32,
    price: Money,
}

#[derive(Debug, Serialize)]
struct CreateOrderRequest<'a> {
    user_id: UserId,
    order_details: Vec<OrderLineRequest>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    voucher_codes: Vec<String>,
    payment_method: PaymentMethod,
    #[serde(flatten)]
    shipping: &'a ShippingInfo,
    total_money: Money,
}

#[derive(Clone)]
pub struct OrderService {
    state: Storefront,
}

impl OrderService {
    pub(crate) const fn new(state: Storefront) -> Self {
        Self { state }
    }

    /// Resolve voucher codes to applied vouchers, rejecting any that are
    /// unknown or not currently valid.
    async fn resolve_vouchers(&self, codes: &[String]) -> Result<Vec<AppliedVoucher>, ServiceError> {
        let vouchers = self.state.vouchers();
        let mut applied = Vec::with_capacity(codes.len());
        for code in codes.iter().map(|c| c.trim()).filter(|c| !c.is_empty()) {
            applied.push(vouchers.lookup(code).await?.as_applied());
        }
        Ok(applied)
    }

    /// Totals the checkout screen shows for the current cart.
    ///
    /// # Errors
    ///
    /// Returns an error if a voucher code is unknown or not valid now.
    pub async fn preview(&self, voucher_codes: &[String]) -> Result<OrderTotals, ServiceError> {
        let vouchers = self.resolve_vouchers(voucher_codes).await?;
        Ok(self.state.carts().load().totals(&vouchers))
    }

    /// Submit the cart as an order. The cart is cleared once the backend
    /// accepts it.
    ///
    /// # Errors
    ///
    /// Returns an error if nobody is signed in, the cart is empty, the
    /// shipping details are invalid, a voucher is unusable, or the backend
    /// rejects the order.
    #[instrument(skip(self, checkout), fields(payment = ?checkout.payment_method))]
    pub async fn place_order(&self, checkout: &Checkout) -> Result<Order, ServiceError> {
        let user = self.state.auth().require_user()?;
        let cart = self.state.carts().load();
        if cart.is_empty() {
            return Err(ServiceError::EmptyCart);
        }
        validate_shipping(&checkout.shipping)?;

        let vouchers = self.resolve_vouchers(&checkout.voucher_codes).await?;
        let totals = cart.totals(&vouchers);

        let request = CreateOrderRequest {
            user_id: user.id,
            order_details: cart
                .lines
                .iter()
                .map(|line| OrderLineRequest {
                    product_id: line.product_id,
                    quantity: line.quantity,
                    price: line.price,
                })
                .collect(),
            voucher_codes: vouchers.iter().filter_map(|v| v.code.clone()).collect(),
            payment_method: checkout.payment_method,
            shipping: &checkout.shipping,
            total_money: totals.total,
        };

        let order: Order = self.state.api().post("orders", &request).await?;
        if let Err(e) = self.state.cart().clear() {
            warn!(error = %e, "order placed but cart could not be cleared");
        }
        info!(order_id = %order.id, total = %totals.total, "order placed");
        Ok(order)
    }

    /// A customer's orders, newest first as the backend returns them.
    #[instrument(skip(self))]
    pub async fn history(&self, user: UserId, page: PageRequest) -> Page<Order> {
        self.state
            .api()
            .get_page(&format!("orders/user/{user}"), &page.query())
            .await
    }

    pub async fn order(&self, id: OrderId) -> Option<Order> {
        self.state.api().get_optional(&format!("orders/{id}")).await
    }

    /// Cancel a pending order.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::NotCancellable`] unless the order is still
    /// pending, or the backend's error.
    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn cancel(&self, order: &Order) -> Result<Order, ServiceError> {
        if !order.status.is_customer_cancellable() {
            return Err(ServiceError::NotCancellable(order.status));
        }
        let updated: Option<Order> = self
            .state
            .api()
            .put_empty(&format!("orders/{}/cancel", order.id))
            .await?;
        info!("order cancelled");
        Ok(updated.unwrap_or_else(|| Order {
            status: OrderStatus::Cancelled,
            ..order.clone()
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use bookstore_client::{ApiClient, ApiConfig};
    use bookstore_core::clock::SystemClock;
    use bookstore_core::storage::MemoryStore;
    use serde_json::json;

    use super::*;

    fn storefront() -> Storefront {
        let api = ApiClient::new(&ApiConfig::new("http://127.0.0.1:9").unwrap()).unwrap();
        Storefront::new(api, Arc::new(MemoryStore::new()), Arc::new(SystemClock))
    }

    fn order(status: OrderStatus) -> Order {
        serde_json::from_value(json!({
            "id": 12,
            "status": status,
            "order_details": [],
            "payment_method": "COD"
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_cancel_rejects_non_pending() {
        let sf = storefront();
        for status in [OrderStatus::Confirmed, OrderStatus::Delivering, OrderStatus::Cancelled] {
            let err = sf.orders().cancel(&order(status)).await.unwrap_err();
            assert!(matches!(err, ServiceError::NotCancellable(s) if s == status));
        }
    }

    #[tokio::test]
    async fn test_place_order_requires_login() {
        let sf = storefront();
        let err = sf.orders().place_order(&Checkout::default()).await.unwrap_err();
        assert!(matches!(err, ServiceError::NotAuthenticated));
    }

    #[test]
    fn test_request_flattens_shipping() {
        let shipping = ShippingInfo {
            full_name: "Nguyễn Văn A".to_string(),
            phone_number: "0901234567".to_string(),
            address: "1 Lê Lợi".to_string(),
            note: None,
        };
        let request = CreateOrderRequest {
            user_id: UserId::new(1),
            order_details: vec![OrderLineRequest {
                product_id: ProductId::new(2),
                quantity: 1,
                price: Money::new(50_000),
            }],
            voucher_codes: vec![],
            payment_method: PaymentMethod::BankTransfer,
            shipping: &shipping,
            total_money: Money::new(50_000),
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["full_name"], "Nguyễn Văn A");
        assert_eq!(value["payment_method"], "BANK_TRANSFER");
        assert_eq!(value["total_money"], 50_000);
        assert!(value.get("voucher_codes").is_none());
    }
}
