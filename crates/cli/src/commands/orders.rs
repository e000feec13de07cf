//! Checkout, order history and vouchers.

use bookstore_core::{OrderId, PaymentMethod, ShippingInfo};
use bookstore_storefront::Checkout;
use clap::Subcommand;
use serde_json::json;
use tracing::info;

use super::PageArgs;
use crate::context::Context;
use crate::error::CliError;
use crate::output::emit;

#[derive(Subcommand)]
pub enum OrdersAction {
    /// Place an order for the cart's contents
    Place {
        /// Recipient name
        #[arg(long)]
        name: String,
        #[arg(long)]
        phone: String,
        #[arg(long)]
        address: String,
        #[arg(long)]
        note: Option<String>,
        /// cod, vnpay or bank_transfer
        #[arg(long, default_value = "cod")]
        payment: PaymentMethod,
        /// Voucher code (repeatable)
        #[arg(long = "voucher")]
        vouchers: Vec<String>,
    },
    /// Your orders, newest first
    History {
        #[command(flatten)]
        page: PageArgs,
    },
    /// One order with its totals
    Show { id: OrderId },
    /// Cancel a pending order
    Cancel { id: OrderId },
    /// Vouchers that can be used now
    Vouchers,
    /// Check a voucher code
    Voucher { code: String },
}

pub async fn run(ctx: &Context, action: OrdersAction) -> Result<(), CliError> {
    let orders = ctx.storefront.orders();
    match action {
        OrdersAction::Place {
            name,
            phone,
            address,
            note,
            payment,
            vouchers,
        } => {
            let checkout = Checkout {
                shipping: ShippingInfo {
                    full_name: name,
                    phone_number: phone,
                    address,
                    note,
                },
                payment_method: payment,
                voucher_codes: vouchers,
            };
            let order = orders.place_order(&checkout).await?;
            info!("Order {} placed, total {}", order.id, order.totals().total);
            emit(&order)
        }
        OrdersAction::History { page } => {
            let user = ctx.storefront.auth().require_user()?;
            emit(&orders.history(user.id, page.request()).await)
        }
        OrdersAction::Show { id } => {
            let order = orders
                .order(id)
                .await
                .ok_or_else(|| CliError::NotFound(format!("Order {id}")))?;
            emit(&json!({
                "order": order,
                "status_label": order.status.label(),
                "totals": order.totals(),
            }))
        }
        OrdersAction::Cancel { id } => {
            let order = orders
                .order(id)
                .await
                .ok_or_else(|| CliError::NotFound(format!("Order {id}")))?;
            let order = orders.cancel(&order).await?;
            info!("Order {} cancelled", order.id);
            emit(&order)
        }
        OrdersAction::Vouchers => emit(&ctx.storefront.vouchers().available().await),
        OrdersAction::Voucher { code } => {
            let voucher = ctx.storefront.vouchers().lookup(&code).await?;
            info!("Voucher {} is valid", voucher.code);
            emit(&voucher)
        }
    }
}
