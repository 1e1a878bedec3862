//! Cart manager: line-item mutation against live catalog data.
//!
//! Every mutation re-reads the product so quantities are validated against
//! current stock and extended prices are computed from the current unit
//! price. The stored line price is a cache of that computation; later
//! catalog price changes do not rewrite it.
//!
//! # Concurrency
//!
//! Mutations read the whole cart, edit the line list, and write it back.
//! Two concurrent mutations for the same user can both read the same
//! snapshot and the second write wins (lost update). The storage layer is
//! last-write-wins by design; callers needing stronger guarantees must
//! serialize per user upstream.

use rust_decimal::Decimal;
use thiserror::Error;

use comercio_core::{ProductId, UserId};

use crate::models::{Cart, CartLine, CartLineView, CartView};
use crate::store::{Store, StoreError};

/// Errors from cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The requested quantity is not a positive integer.
    #[error("quantity must be a positive integer")]
    InvalidQuantity,

    /// The referenced product does not exist.
    #[error("product not found")]
    ProductNotFound,

    /// The user has no cart.
    #[error("cart not found")]
    CartNotFound,

    /// The cart has no line for the referenced product.
    #[error("product not found in cart")]
    LineNotFound,

    /// The product does not have enough stock for the requested quantity.
    #[error("insufficient stock")]
    InsufficientStock,

    /// Storage operation failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Cart manager.
pub struct CartService<'a> {
    store: &'a dyn Store,
}

impl<'a> CartService<'a> {
    /// Create a new cart service over a storage adapter.
    #[must_use]
    pub const fn new(store: &'a dyn Store) -> Self {
        Self { store }
    }

    /// Add `quantity` units of a product to the user's cart.
    ///
    /// Creates the cart if the user has none. If the cart already holds a
    /// line for the product, the quantities merge and the line's extended
    /// price is recomputed at the current unit price; otherwise a new line
    /// is appended. The merged quantity is validated against current stock
    /// before anything is persisted, so a rejected call leaves the cart
    /// untouched.
    ///
    /// # Errors
    ///
    /// Returns `InvalidQuantity` for a zero quantity, `ProductNotFound` if
    /// the product is missing, and `InsufficientStock` when stock cannot
    /// cover the (merged) quantity.
    pub async fn add_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
        quantity: u32,
    ) -> Result<CartView, CartError> {
        if quantity == 0 {
            return Err(CartError::InvalidQuantity);
        }

        let product = self
            .store
            .product(product_id)
            .await?
            .ok_or(CartError::ProductNotFound)?;

        if product.stock < quantity {
            return Err(CartError::InsufficientStock);
        }

        let mut cart = self
            .store
            .cart(user_id)
            .await?
            .unwrap_or_else(|| Cart::empty(user_id));

        if let Some(line) = cart.line_mut(product_id) {
            let merged = line.quantity.saturating_add(quantity);
            if merged > product.stock {
                return Err(CartError::InsufficientStock);
            }
            line.quantity = merged;
            line.price = product.price * Decimal::from(merged);
        } else {
            cart.lines.push(CartLine {
                product_id,
                quantity,
                price: product.price * Decimal::from(quantity),
            });
        }

        self.store.put_cart(&cart).await?;

        Ok(CartView::from(&cart))
    }

    /// Remove a product's line from the user's cart.
    ///
    /// The cart record survives even when its last line goes; only the
    /// cart-clearing operation deletes the record.
    ///
    /// # Errors
    ///
    /// Returns `CartNotFound` if the user has no cart and `LineNotFound`
    /// if no line references the product.
    pub async fn remove_item(
        &self,
        user_id: UserId,
        product_id: ProductId,
    ) -> Result<CartView, CartError> {
        let mut cart = self
            .store
            .cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        let before = cart.lines.len();
        cart.lines.retain(|line| line.product_id != product_id);
        if cart.lines.len() == before {
            return Err(CartError::LineNotFound);
        }

        self.store.put_cart(&cart).await?;

        Ok(CartView::from(&cart))
    }

    /// The user's cart with display names and live extended prices.
    ///
    /// Each line is hydrated from the catalog: the view shows the current
    /// unit price × quantity, not the cached line price. A product that no
    /// longer exists degrades its line to price 0 with no name instead of
    /// failing the whole request.
    ///
    /// # Errors
    ///
    /// Returns `CartNotFound` if the user has no cart.
    pub async fn get_cart(&self, user_id: UserId) -> Result<CartView, CartError> {
        let cart = self
            .store
            .cart(user_id)
            .await?
            .ok_or(CartError::CartNotFound)?;

        let mut products = Vec::with_capacity(cart.lines.len());
        for line in &cart.lines {
            let view = match self.store.product(line.product_id).await? {
                Some(product) => CartLineView {
                    product_id: line.product_id,
                    name: Some(product.name),
                    quantity: line.quantity,
                    price: product.price * Decimal::from(line.quantity),
                },
                None => CartLineView {
                    product_id: line.product_id,
                    name: None,
                    quantity: line.quantity,
                    price: Decimal::ZERO,
                },
            };
            products.push(view);
        }

        Ok(CartView {
            user_id: cart.user_id,
            products,
        })
    }

    /// Delete the user's cart record entirely, whatever it contains.
    ///
    /// # Errors
    ///
    /// Returns `CartNotFound` if the user has no cart. Checkout clears
    /// carts through the storage layer directly and ignores absence.
    pub async fn clear_cart(&self, user_id: UserId) -> Result<(), CartError> {
        if !self.store.delete_cart(user_id).await? {
            return Err(CartError::CartNotFound);
        }
        Ok(())
    }
}
