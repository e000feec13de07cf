//! Client-side shopping cart.
//!
//! The cart never touches the backend until checkout; it is kept as JSON in
//! client storage under the `cart` key so it survives restarts.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::pricing::{OrderTotals, order_totals};
use crate::storage::{KeyValueStore, StorageError};
use crate::types::{AppliedVoucher, Money, OrderLine, Product, ProductId};

/// Storage key holding the serialized cart.
pub const CART_KEY: &str = "cart";

/// Upper bound on a single line's quantity.
pub const MAX_LINE_QUANTITY: u32 = 99;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CartLine {
    pub product_id: ProductId,
    pub product_name: String,
    pub price: Money,
    pub quantity: u32,
    #[serde(default)]
    pub image_url: Option<String>,
}

/// Ordered cart lines, at most one per product.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Cart {
    pub lines: Vec<CartLine>,
}

impl Cart {
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Total units across all lines.
    #[must_use]
    pub fn item_count(&self) -> u32 {
        self.lines.iter().map(|l| l.quantity).sum()
    }

    /// Add `quantity` of `product`, merging with an existing line.
    ///
    /// Quantities are capped by stock (when known) and [`MAX_LINE_QUANTITY`];
    /// returns the resulting line quantity.
    pub fn add(&mut self, product: &Product, quantity: u32) -> u32 {
        let cap = if product.stock_quantity > 0 {
            product.stock_quantity.min(MAX_LINE_QUANTITY)
        } else {
            MAX_LINE_QUANTITY
        };

        if let Some(line) = self.lines.iter_mut().find(|l| l.product_id == product.id) {
            line.quantity = line.quantity.saturating_add(quantity).min(cap);
            line.price = product.price;
            return line.quantity;
        }

        let quantity = quantity.min(cap);
        if quantity > 0 {
            self.lines.push(CartLine {
                product_id: product.id,
                product_name: product.name.clone(),
                price: product.price,
                quantity,
                image_url: product.image_url.clone(),
            });
        }
        quantity
    }

    /// Set a line's quantity; zero removes it. Returns `false` if the product
    /// is not in the cart.
    pub fn set_quantity(&mut self, product_id: ProductId, quantity: u32) -> bool {
        if quantity == 0 {
            return self.remove(product_id);
        }
        match self.lines.iter_mut().find(|l| l.product_id == product_id) {
            Some(line) => {
                line.quantity = quantity.min(MAX_LINE_QUANTITY);
                true
            }
            None => false,
        }
    }

    /// Remove a line. Returns `false` if it was not there.
    pub fn remove(&mut self, product_id: ProductId) -> bool {
        let before = self.lines.len();
        self.lines.retain(|l| l.product_id != product_id);
        self.lines.len() != before
    }

    pub fn clear(&mut self) {
        self.lines.clear();
    }

    /// Lines in the shape orders use.
    #[must_use]
    pub fn order_lines(&self) -> Vec<OrderLine> {
        self.lines
            .iter()
            .map(|l| OrderLine {
                product_id: l.product_id,
                product_name: l.product_name.clone(),
                price: l.price,
                quantity: l.quantity,
                image_url: l.image_url.clone(),
            })
            .collect()
    }

    #[must_use]
    pub fn subtotal(&self) -> Money {
        self.totals(&[]).subtotal
    }

    /// Totals with `vouchers` applied.
    #[must_use]
    pub fn totals(&self, vouchers: &[AppliedVoucher]) -> OrderTotals {
        order_totals(&self.order_lines(), vouchers)
    }
}

/// Loads and saves the cart in client storage.
#[derive(Clone)]
pub struct CartStore {
    store: Arc<dyn KeyValueStore>,
}

impl CartStore {
    #[must_use]
    pub fn new(store: Arc<dyn KeyValueStore>) -> Self {
        Self { store }
    }

    /// The saved cart; an unreadable cart is discarded with a warning.
    #[must_use]
    pub fn load(&self) -> Cart {
        self.store
            .get(CART_KEY)
            .and_then(|raw| {
                serde_json::from_str(&raw)
                    .inspect_err(|e| warn!(error = %e, "discarding unreadable cart"))
                    .ok()
            })
            .unwrap_or_default()
    }

    /// # Errors
    ///
    /// Returns a [`StorageError`] if the cart could not be written.
    pub fn save(&self, cart: &Cart) -> Result<(), StorageError> {
        if cart.is_empty() {
            return self.store.remove(CART_KEY);
        }
        self.store.set(CART_KEY, &serde_json::to_string(cart)?)
    }

    /// Load, apply `f`, save, and return the updated cart.
    ///
    /// # Errors
    ///
    /// Returns a [`StorageError`] if the updated cart could not be written.
    pub fn update<R>(&self, f: impl FnOnce(&mut Cart) -> R) -> Result<(Cart, R), StorageError> {
        let mut cart = self.load();
        let result = f(&mut cart);
        self.save(&cart)?;
        Ok((cart, result))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;

    fn product(id: i64, price: i64, stock: u32) -> Product {
        Product {
            id: ProductId::new(id),
            name: format!("Sách {id}"),
            author: None,
            publisher: None,
            description: None,
            price: Money::new(price),
            stock_quantity: stock,
            image_url: None,
            category_id: None,
            category_name: None,
        }
    }

    #[test]
    fn test_add_merges_lines_and_caps_by_stock() {
        let mut cart = Cart::default();
        assert_eq!(cart.add(&product(1, 80_000, 5), 2), 2);
        assert_eq!(cart.add(&product(1, 80_000, 5), 10), 5);
        assert_eq!(cart.add(&product(2, 20_000, 0), 1), 1);
        assert_eq!(cart.lines.len(), 2);
        assert_eq!(cart.item_count(), 6);
        assert_eq!(cart.subtotal(), Money::new(420_000));
    }

    #[test]
    fn test_set_quantity_and_remove() {
        let mut cart = Cart::default();
        cart.add(&product(1, 10_000, 10), 1);
        assert!(cart.set_quantity(ProductId::new(1), 4));
        assert_eq!(cart.item_count(), 4);
        assert!(!cart.set_quantity(ProductId::new(9), 4));
        assert!(cart.set_quantity(ProductId::new(1), 0));
        assert!(cart.is_empty());
        assert!(!cart.remove(ProductId::new(1)));
    }

    #[test]
    fn test_totals_with_voucher() {
        let mut cart = Cart::default();
        cart.add(&product(1, 100_000, 10), 2);
        let voucher = AppliedVoucher {
            discount_amount: Some(Money::new(30_000)),
            ..AppliedVoucher::default()
        };
        assert_eq!(cart.totals(&[voucher]).total, Money::new(170_000));
    }

    #[test]
    fn test_store_persists_and_discards_garbage() {
        let backing = Arc::new(MemoryStore::new());
        let carts = CartStore::new(backing.clone());

        let (cart, added) = carts.update(|c| c.add(&product(3, 5_000, 3), 1)).unwrap();
        assert_eq!(added, 1);
        assert_eq!(carts.load(), cart);

        carts.update(Cart::clear).unwrap();
        assert!(backing.get(CART_KEY).is_none());

        backing.set(CART_KEY, "{oops").unwrap();
        assert!(carts.load().is_empty());
    }
}
