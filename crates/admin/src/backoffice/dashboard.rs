//! Dashboard figures.

use bookstore_core::pagination::{MAX_PAGE_SIZE, PageRequest};
use bookstore_core::pricing::OrderStatusSummary;
use bookstore_core::{Order, Product, UserProfile};
use serde::Serialize;
use tracing::{instrument, warn};

use super::AdminClient;

/// Upper bound on order pages walked for the dashboard.
const MAX_ORDER_PAGES: u32 = 50;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Dashboard {
    pub orders: OrderStatusSummary,
    pub product_count: u64,
    pub user_count: u64,
}

impl AdminClient {
    /// Every order, walking pages in sequence. Stops at the first failed page.
    async fn all_orders(&self) -> Vec<Order> {
        let mut orders = Vec::new();
        let mut request = PageRequest::new(0, MAX_PAGE_SIZE);
        loop {
            match self.api().try_get_page::<Order>("orders", &request.query()).await {
                Ok(page) => {
                    let more = page.has_next();
                    orders.extend(page.content);
                    if !more {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, page = request.page, "order page failed, dashboard is partial");
                    break;
                }
            }
            request = request.next();
            if request.page >= MAX_ORDER_PAGES {
                warn!("too many order pages, dashboard is partial");
                break;
            }
        }
        orders
    }

    /// Order counts by status, completed revenue, and catalog/user totals.
    #[instrument(skip(self))]
    pub async fn dashboard(&self) -> Dashboard {
        let orders = self.all_orders().await;
        let one = PageRequest::new(0, 1);
        let products = self.api().get_page::<Product>("products", &one.query()).await;
        let users = self.api().get_page::<UserProfile>("users", &one.query()).await;

        Dashboard {
            orders: OrderStatusSummary::from_orders(&orders),
            product_count: products.total_elements,
            user_count: users.total_elements,
        }
    }
}
