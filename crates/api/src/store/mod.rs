//! Storage port for the four record collections.
//!
//! The cart manager and checkout engine are written against the [`Store`]
//! trait rather than a concrete backend; the server injects an adapter via
//! [`DynStore`]. Two adapters ship with the crate:
//!
//! - [`PgStore`] - `PostgreSQL` via sqlx, the production backend
//! - [`MemoryStore`] - in-process maps behind an `RwLock`, used by the test
//!   suites and as the fallback when no database is configured
//!
//! No cross-collection transactions are assumed: each method is a single
//! key-based lookup, insert, update, or delete, and callers sequence them.

pub mod memory;
pub mod postgres;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

pub use memory::MemoryStore;
pub use postgres::{PgStore, create_pool};

use comercio_core::{Email, ProductId, UserId};

use crate::models::{Cart, NewOrder, NewProduct, NewUser, Order, Product, ProductUpdate, User};

/// Errors that can occur during storage operations.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Constraint violation (e.g., unique email).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Shared handle to a storage adapter.
pub type DynStore = Arc<dyn Store>;

/// Key-based access to the users, products, carts, and orders collections.
#[async_trait]
pub trait Store: Send + Sync {
    // =========================================================================
    // Users
    // =========================================================================

    /// All users, in creation order.
    async fn list_users(&self) -> Result<Vec<User>, StoreError>;

    /// Look up a user by id.
    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Look up a user by email.
    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError>;

    /// Insert a user, assigning its id.
    ///
    /// Fails with [`StoreError::Conflict`] if the email is already taken.
    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError>;

    // =========================================================================
    // Products
    // =========================================================================

    /// All products, in creation order.
    async fn list_products(&self) -> Result<Vec<Product>, StoreError>;

    /// Look up a product by id.
    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError>;

    /// Insert a product, assigning its id.
    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError>;

    /// Apply a partial update, returning the updated product.
    ///
    /// Returns `None` if no product has the given id.
    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, StoreError>;

    /// Delete a product. Returns `false` if it did not exist.
    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError>;

    /// Atomically decrement a product's stock by `by`.
    ///
    /// This is the storage layer's conditional decrement-by-delta: it refuses
    /// to drive stock below zero. Returns `false` when the product is missing
    /// or has fewer than `by` units left, in which case nothing changes.
    async fn decrement_stock(&self, id: ProductId, by: u32) -> Result<bool, StoreError>;

    /// True if any cart line references the product id.
    async fn product_in_any_cart(&self, id: ProductId) -> Result<bool, StoreError>;

    /// True if any order line references the product id.
    async fn product_in_any_order(&self, id: ProductId) -> Result<bool, StoreError>;

    // =========================================================================
    // Carts
    // =========================================================================

    /// The cart owned by a user, if one exists.
    async fn cart(&self, user_id: UserId) -> Result<Option<Cart>, StoreError>;

    /// Persist a cart's full line list, creating the record if needed.
    async fn put_cart(&self, cart: &Cart) -> Result<(), StoreError>;

    /// Delete a user's cart record. Returns `false` if none existed.
    async fn delete_cart(&self, user_id: UserId) -> Result<bool, StoreError>;

    // =========================================================================
    // Orders
    // =========================================================================

    /// Insert an order, assigning its id and creation timestamp.
    async fn insert_order(&self, new: NewOrder) -> Result<Order, StoreError>;

    /// All orders placed by a user, oldest first.
    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError>;

    // =========================================================================
    // Health
    // =========================================================================

    /// Verify the backend is reachable.
    async fn ping(&self) -> Result<(), StoreError>;
}
