//! Cart edits. The cart lives in client storage; only adding a product
//! talks to the backend, to get its current price and stock.

use bookstore_core::cart::Cart;
use bookstore_core::pricing::OrderTotals;
use bookstore_core::{AppliedVoucher, ProductId};
use tracing::{debug, instrument};

use crate::error::ServiceError;
use crate::state::Storefront;

#[derive(Clone)]
pub struct CartService {
    state: Storefront,
}

impl CartService {
    pub(crate) const fn new(state: Storefront) -> Self {
        Self { state }
    }

    #[must_use]
    pub fn cart(&self) -> Cart {
        self.state.carts().load()
    }

    /// Add `quantity` of a product at its current price.
    ///
    /// # Errors
    ///
    /// Returns [`ServiceError::ProductUnavailable`] if the product does not
    /// exist or is out of stock.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn add(&self, product_id: ProductId, quantity: u32) -> Result<Cart, ServiceError> {
        let product = self
            .state
            .catalog()
            .product(product_id)
            .await
            .ok_or_else(|| ServiceError::ProductUnavailable(product_id.to_string()))?;
        if !product.in_stock() {
            return Err(ServiceError::ProductUnavailable(product.name));
        }

        let (cart, line_quantity) = self
            .state
            .carts()
            .update(|cart| cart.add(&product, quantity))?;
        debug!(line_quantity, items = cart.item_count(), "added to cart");
        Ok(cart)
    }

    /// Set a line's quantity; zero removes the line.
    ///
    /// # Errors
    ///
    /// Returns a storage error if the cart could not be saved.
    pub fn set_quantity(&self, product_id: ProductId, quantity: u32) -> Result<Cart, ServiceError> {
        let (cart, _) = self
            .state
            .carts()
            .update(|cart| cart.set_quantity(product_id, quantity))?;
        Ok(cart)
    }

    /// # Errors
    ///
    /// Returns a storage error if the cart could not be saved.
    pub fn remove(&self, product_id: ProductId) -> Result<Cart, ServiceError> {
        let (cart, _) = self.state.carts().update(|cart| cart.remove(product_id))?;
        Ok(cart)
    }

    /// # Errors
    ///
    /// Returns a storage error if the cart could not be saved.
    pub fn clear(&self) -> Result<(), ServiceError> {
        self.state.carts().save(&Cart::default())?;
        Ok(())
    }

    /// Cart totals with `vouchers` applied.
    #[must_use]
    pub fn totals(&self, vouchers: &[AppliedVoucher]) -> OrderTotals {
        self.cart().totals(vouchers)
    }
}
