//! Checkout engine: converts a cart into a persisted order.
//!
//! A checkout is a single linear flow with no persisted intermediate
//! state: validate and price every line, then decrement stock, create the
//! order, and clear the cart.
//!
//! # Failure semantics
//!
//! Validation and pricing touch nothing; a failure there leaves all state
//! as it was. The commit phase is not atomic across lines: stock is
//! decremented one line at a time, and a failure mid-loop (a crash, a
//! storage error, or a concurrent checkout draining a later line's stock)
//! leaves the earlier decrements applied with no rollback and no order
//! record. Reconciliation, or a multi-document transaction where the
//! backing store offers one, is the remedy if that gap ever matters.
//!
//! Each individual decrement is the storage layer's conditional
//! decrement-by-delta, so concurrent checkouts can fail but can never
//! drive stock negative.

use rust_decimal::Decimal;
use thiserror::Error;

use comercio_core::{ProductId, UserId};

use crate::models::{NewOrder, OrderLine, OrderView};
use crate::store::{Store, StoreError};

/// Errors from placing an order.
#[derive(Debug, Error)]
pub enum CheckoutError {
    /// The user has no cart, or the cart holds no lines.
    #[error("cart is empty or not found")]
    EmptyCart,

    /// A product referenced by the cart no longer exists.
    #[error("product {0} not found")]
    ProductNotFound(ProductId),

    /// A product does not have enough stock for its cart line.
    #[error("insufficient stock for product {name}")]
    InsufficientStock {
        /// Display name of the offending product.
        name: String,
    },

    /// Storage operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Checkout engine.
pub struct CheckoutService<'a> {
    store: &'a dyn Store,
}

impl<'a> CheckoutService<'a> {
    /// Create a new checkout service over a storage adapter.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Convert the user's cart into an order.
    ///
    /// Lines are processed in the cart's stored insertion order. Prices
    /// are recomputed from the live catalog at checkout time; the cached
    /// cart line prices are not trusted.
    ///
    /// # Errors
    ///
    /// Returns `EmptyCart` if there is nothing to check out,
    /// `ProductNotFound` if a referenced product vanished since it was
    /// added, and `InsufficientStock` when current stock cannot cover a
    /// line. Failures before the commit phase leave all state untouched.
    pub async fn place_order(&self, user_id: UserId) -> Result<OrderView, CheckoutError> {
        let cart = self
            .store
            .cart(user_id)
            .await?
            .filter(|cart| !cart.is_empty())
            .ok_or(CheckoutError::EmptyCart)?;

        // Price and validate every line before touching anything.
        let mut total = Decimal::ZERO;
        let mut lines = Vec::with_capacity(cart.lines.len());
        for item in &cart.lines {
            let product = self
                .store
                .product(item.product_id)
                .await?
                .ok_or(CheckoutError::ProductNotFound(item.product_id))?;

            if product.stock < item.quantity {
                return Err(CheckoutError::InsufficientStock { name: product.name });
            }

            let extended = product.price * Decimal::from(item.quantity);
            total += extended;
            lines.push(OrderLine {
                product_id: item.product_id,
                name: product.name,
                quantity: item.quantity,
                price: extended,
            });
        }

        // Commit stock, one conditional decrement per line. Not atomic
        // across lines; see the module docs.
        for line in &lines {
            let decremented = self
                .store
                .decrement_stock(line.product_id, line.quantity)
                .await?;
            if !decremented {
                return Err(CheckoutError::InsufficientStock {
                    name: line.name.clone(),
                });
            }
        }

        let order = self
            .store
            .insert_order(NewOrder {
                user_id,
                lines,
                total,
            })
            .await?;

        // Absence is fine here: emptying an already-absent cart is a no-op.
        self.store.delete_cart(user_id).await?;

        Ok(OrderView::from(&order))
    }
}
