//! Shopping cart.

use bookstore_core::ProductId;
use clap::Subcommand;
use serde_json::json;
use tracing::info;

use crate::context::Context;
use crate::error::CliError;
use crate::output::emit;

#[derive(Subcommand)]
pub enum CartAction {
    /// Show the cart and its totals
    Show {
        /// Voucher code to price in (repeatable)
        #[arg(long = "voucher")]
        vouchers: Vec<String>,
    },
    /// Add a product at its current price
    Add {
        id: ProductId,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Change a line's quantity (0 removes it)
    Set { id: ProductId, quantity: u32 },
    /// Remove a line
    Remove { id: ProductId },
    /// Empty the cart
    Clear,
}

pub async fn run(ctx: &Context, action: CartAction) -> Result<(), CliError> {
    let carts = ctx.storefront.cart();
    let cart = match action {
        CartAction::Show { vouchers } => {
            let totals = if vouchers.is_empty() {
                carts.totals(&[])
            } else {
                ctx.storefront.orders().preview(&vouchers).await?
            };
            return emit(&json!({ "cart": carts.cart(), "totals": totals }));
        }
        CartAction::Add { id, quantity } => carts.add(id, quantity).await?,
        CartAction::Set { id, quantity } => carts.set_quantity(id, quantity)?,
        CartAction::Remove { id } => carts.remove(id)?,
        CartAction::Clear => {
            carts.clear()?;
            info!("Cart emptied");
            return Ok(());
        }
    };
    info!("{} items in cart", cart.item_count());
    emit(&json!({ "cart": cart, "totals": carts.totals(&[]) }))
}
