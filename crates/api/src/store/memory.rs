//! In-memory storage adapter.
//!
//! Keeps the four collections in process memory behind a single `RwLock`,
//! which makes every trait method individually atomic. Useful for the test
//! suites and for running the server without a database; nothing survives a
//! restart.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use uuid::Uuid;

use comercio_core::{Email, OrderId, ProductId, UserId};

use super::{Store, StoreError};
use crate::models::{Cart, NewOrder, NewProduct, NewUser, Order, Product, ProductUpdate, User};

/// Thread-safe in-memory store.
#[derive(Clone, Default)]
pub struct MemoryStore {
    inner: Arc<RwLock<Inner>>,
}

#[derive(Default)]
struct Inner {
    users: Vec<User>,
    products: Vec<Product>,
    // Keyed by owning user id; at most one cart per user.
    carts: HashMap<Uuid, Cart>,
    orders: Vec<Order>,
}

impl MemoryStore {
    /// Create a new empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> std::sync::RwLockReadGuard<'_, Inner> {
        self.inner.read().expect("lock poisoned")
    }

    fn write(&self) -> std::sync::RwLockWriteGuard<'_, Inner> {
        self.inner.write().expect("lock poisoned")
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        Ok(self.read().users.clone())
    }

    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read().users.iter().find(|u| u.id == id).cloned())
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        Ok(self.read().users.iter().find(|u| u.email == *email).cloned())
    }

    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        let mut inner = self.write();
        if inner.users.iter().any(|u| u.email == new.email) {
            return Err(StoreError::Conflict("email already exists".to_owned()));
        }
        let user = User {
            id: UserId::new(),
            name: new.name,
            email: new.email,
            password_hash: new.password_hash,
        };
        inner.users.push(user.clone());
        Ok(user)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        Ok(self.read().products.clone())
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        Ok(self.read().products.iter().find(|p| p.id == id).cloned())
    }

    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let product = Product {
            id: ProductId::new(),
            name: new.name,
            description: new.description,
            price: new.price,
            stock: new.stock,
        };
        self.write().products.push(product.clone());
        Ok(product)
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, StoreError> {
        let mut inner = self.write();
        let Some(product) = inner.products.iter_mut().find(|p| p.id == id) else {
            return Ok(None);
        };
        update.apply_to(product);
        Ok(Some(product.clone()))
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let mut inner = self.write();
        let before = inner.products.len();
        inner.products.retain(|p| p.id != id);
        Ok(inner.products.len() < before)
    }

    async fn decrement_stock(&self, id: ProductId, by: u32) -> Result<bool, StoreError> {
        let mut inner = self.write();
        let Some(product) = inner.products.iter_mut().find(|p| p.id == id) else {
            return Ok(false);
        };
        if product.stock < by {
            return Ok(false);
        }
        product.stock -= by;
        Ok(true)
    }

    async fn product_in_any_cart(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self
            .read()
            .carts
            .values()
            .any(|cart| cart.lines.iter().any(|line| line.product_id == id)))
    }

    async fn product_in_any_order(&self, id: ProductId) -> Result<bool, StoreError> {
        Ok(self
            .read()
            .orders
            .iter()
            .any(|order| order.lines.iter().any(|line| line.product_id == id)))
    }

    async fn cart(&self, user_id: UserId) -> Result<Option<Cart>, StoreError> {
        Ok(self.read().carts.get(&user_id.as_uuid()).cloned())
    }

    async fn put_cart(&self, cart: &Cart) -> Result<(), StoreError> {
        self.write()
            .carts
            .insert(cart.user_id.as_uuid(), cart.clone());
        Ok(())
    }

    async fn delete_cart(&self, user_id: UserId) -> Result<bool, StoreError> {
        Ok(self.write().carts.remove(&user_id.as_uuid()).is_some())
    }

    async fn insert_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let order = Order {
            id: OrderId::new(),
            user_id: new.user_id,
            lines: new.lines,
            total: new.total,
            created_at: Utc::now(),
        };
        self.write().orders.push(order.clone());
        Ok(order)
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        Ok(self
            .read()
            .orders
            .iter()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use rust_decimal::Decimal;

    use super::*;
    use crate::models::CartLine;

    fn new_product(stock: u32) -> NewProduct {
        NewProduct {
            name: "mate".to_owned(),
            description: String::new(),
            price: Decimal::from(10),
            stock,
        }
    }

    #[tokio::test]
    async fn test_insert_user_rejects_duplicate_email() {
        let store = MemoryStore::new();
        let new = NewUser {
            name: "Lucia".to_owned(),
            email: Email::parse("lucia@example.com").unwrap(),
            password_hash: "hash".to_owned(),
        };

        store.insert_user(new.clone()).await.unwrap();
        let err = store.insert_user(new).await.unwrap_err();
        assert!(matches!(err, StoreError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_decrement_stock_refuses_overdraw() {
        let store = MemoryStore::new();
        let product = store.insert_product(new_product(3)).await.unwrap();

        assert!(store.decrement_stock(product.id, 2).await.unwrap());
        assert!(!store.decrement_stock(product.id, 2).await.unwrap());

        let after = store.product(product.id).await.unwrap().unwrap();
        assert_eq!(after.stock, 1);
    }

    #[tokio::test]
    async fn test_decrement_stock_missing_product() {
        let store = MemoryStore::new();
        assert!(!store.decrement_stock(ProductId::new(), 1).await.unwrap());
    }

    #[tokio::test]
    async fn test_put_cart_replaces_line_list() {
        let store = MemoryStore::new();
        let user_id = UserId::new();
        let product_id = ProductId::new();

        let mut cart = Cart::empty(user_id);
        cart.lines.push(CartLine {
            product_id,
            quantity: 2,
            price: Decimal::from(20),
        });
        store.put_cart(&cart).await.unwrap();

        cart.lines.clear();
        store.put_cart(&cart).await.unwrap();

        let stored = store.cart(user_id).await.unwrap().unwrap();
        assert!(stored.is_empty());
        assert!(!store.product_in_any_cart(product_id).await.unwrap());
    }

    #[tokio::test]
    async fn test_referential_lookups_match_line_product_ids() {
        let store = MemoryStore::new();
        let user_id = UserId::new();
        let product_id = ProductId::new();

        let mut cart = Cart::empty(user_id);
        cart.lines.push(CartLine {
            product_id,
            quantity: 1,
            price: Decimal::from(10),
        });
        store.put_cart(&cart).await.unwrap();

        assert!(store.product_in_any_cart(product_id).await.unwrap());
        assert!(!store.product_in_any_cart(ProductId::new()).await.unwrap());
        assert!(!store.product_in_any_order(product_id).await.unwrap());
    }
}
