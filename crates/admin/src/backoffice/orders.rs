//! Order management and the order editor.

use bookstore_core::pagination::{Page, PageRequest};
use bookstore_core::pricing::OrderTotals;
use bookstore_core::{Order, OrderId, OrderLine, OrderStatus, Product};
use serde::Serialize;
use tracing::{debug, info, instrument};

use super::AdminClient;
use crate::error::AdminError;

/// One order line with the product as it is in the catalog today.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EditorLine {
    pub line: OrderLine,
    /// `None` if the product has since been deleted.
    pub product: Option<Product>,
}

/// Everything the order edit screen shows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderEditor {
    pub order: Order,
    pub lines: Vec<EditorLine>,
    pub totals: OrderTotals,
    /// Statuses the order may move to from where it is.
    pub allowed_transitions: Vec<OrderStatus>,
}

impl OrderEditor {
    fn new(order: Order, lines: Vec<EditorLine>) -> Self {
        let totals = order.totals();
        let allowed_transitions = OrderStatus::ALL
            .into_iter()
            .filter(|target| order.status.can_transition_to(*target))
            .collect();
        Self {
            order,
            lines,
            totals,
            allowed_transitions,
        }
    }

    /// Whether the order can still be edited at all.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        !self.allowed_transitions.is_empty()
    }
}

#[derive(Serialize)]
struct StatusUpdate {
    status: OrderStatus,
}

impl AdminClient {
    /// One page of orders, optionally filtered by status.
    #[instrument(skip(self))]
    pub async fn list_orders(&self, page: PageRequest, status: Option<OrderStatus>) -> Page<Order> {
        let mut params = page.query().to_vec();
        if let Some(status) = status {
            params.push(("status", status.as_str().to_string()));
        }
        self.api().get_page("orders", &params).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order(&self, id: OrderId) -> Option<Order> {
        self.api().get_optional(&format!("orders/{id}")).await
    }

    /// Load an order and each product it references, one request at a time,
    /// in line order.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::NotFound`] if the order does not exist.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn order_editor(&self, id: OrderId) -> Result<OrderEditor, AdminError> {
        let order = self
            .order(id)
            .await
            .ok_or_else(|| AdminError::NotFound(format!("đơn hàng #{id}")))?;

        let mut lines = Vec::with_capacity(order.order_details.len());
        for line in &order.order_details {
            let product = self.product(line.product_id).await;
            if product.is_none() {
                debug!(product_id = %line.product_id, "order references a missing product");
            }
            lines.push(EditorLine {
                line: line.clone(),
                product,
            });
        }

        Ok(OrderEditor::new(order, lines))
    }

    /// Move `order` to `target`.
    ///
    /// # Errors
    ///
    /// Returns [`AdminError::InvalidTransition`] for a backwards move or an
    /// edit of a completed or cancelled order, or the backend's error.
    #[instrument(skip(self, order), fields(order_id = %order.id, from = %order.status))]
    pub async fn update_order_status(
        &self,
        order: &Order,
        target: OrderStatus,
    ) -> Result<Order, AdminError> {
        self.require_admin()?;
        if !order.status.can_transition_to(target) {
            return Err(AdminError::InvalidTransition {
                from: order.status,
                to: target,
            });
        }

        let updated: Option<Order> = self
            .api()
            .put(&format!("orders/{}", order.id), &StatusUpdate { status: target })
            .await?;
        info!(to = %target, "order status updated");
        Ok(updated.unwrap_or_else(|| Order {
            status: target,
            ..order.clone()
        }))
    }

    /// # Errors
    ///
    /// Returns the backend's error.
    #[instrument(skip(self), fields(order_id = %id))]
    pub async fn delete_order(&self, id: OrderId) -> Result<(), AdminError> {
        self.require_admin()?;
        self.api().delete(&format!("orders/{id}")).await?;
        info!("order deleted");
        Ok(())
    }
}
