//! `PostgreSQL` storage adapter.
//!
//! Carts and orders are stored as a head row plus position-ordered line
//! rows, so `put_cart` rewrites the full line list and reads come back in
//! insertion order. Stock decrements use a conditional `UPDATE ... SET
//! stock = stock - $n ... AND stock >= $n`, the strongest single-statement
//! primitive the backend offers.
//!
//! Migrations live in `crates/api/migrations/` and are embedded into the
//! binary; the server applies them at startup.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use uuid::Uuid;

use comercio_core::{Email, OrderId, ProductId, UserId};

use super::{Store, StoreError};
use crate::models::{
    Cart, CartLine, NewOrder, NewProduct, NewUser, Order, OrderLine, Product, ProductUpdate, User,
};

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// `PostgreSQL`-backed [`Store`] implementation.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap an existing connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Apply the embedded migrations.
    ///
    /// # Errors
    ///
    /// Returns a migration error if a migration fails or the history table
    /// is inconsistent.
    pub async fn migrate(&self) -> Result<(), sqlx::migrate::MigrateError> {
        sqlx::migrate!().run(&self.pool).await
    }
}

#[derive(sqlx::FromRow)]
struct UserRow {
    id: Uuid,
    name: String,
    email: String,
    password_hash: String,
}

impl TryFrom<UserRow> for User {
    type Error = StoreError;

    fn try_from(row: UserRow) -> Result<Self, StoreError> {
        let email = Email::parse(&row.email).map_err(|e| {
            StoreError::DataCorruption(format!("invalid email in database: {e}"))
        })?;
        Ok(Self {
            id: UserId::from(row.id),
            name: row.name,
            email,
            password_hash: row.password_hash,
        })
    }
}

#[derive(sqlx::FromRow)]
struct ProductRow {
    id: Uuid,
    name: String,
    description: String,
    price: Decimal,
    stock: i64,
}

impl TryFrom<ProductRow> for Product {
    type Error = StoreError;

    fn try_from(row: ProductRow) -> Result<Self, StoreError> {
        Ok(Self {
            id: ProductId::from(row.id),
            name: row.name,
            description: row.description,
            price: row.price,
            stock: count_from_db(row.stock, "stock")?,
        })
    }
}

#[derive(sqlx::FromRow)]
struct CartItemRow {
    product_id: Uuid,
    quantity: i64,
    price: Decimal,
}

#[derive(sqlx::FromRow)]
struct OrderRow {
    id: Uuid,
    user_id: Uuid,
    total: Decimal,
    created_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct OrderItemRow {
    order_id: Uuid,
    product_id: Uuid,
    name: String,
    quantity: i64,
    price: Decimal,
}

/// Decode a non-negative count column.
fn count_from_db(value: i64, column: &str) -> Result<u32, StoreError> {
    u32::try_from(value)
        .map_err(|_| StoreError::DataCorruption(format!("invalid {column} in database: {value}")))
}

#[async_trait]
impl Store for PgStore {
    async fn list_users(&self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash FROM users ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(User::try_from).collect()
    }

    async fn user(&self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash FROM users WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn user_by_email(&self, email: &Email) -> Result<Option<User>, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "SELECT id, name, email, password_hash FROM users WHERE email = $1",
        )
        .bind(email.as_str())
        .fetch_optional(&self.pool)
        .await?;

        row.map(User::try_from).transpose()
    }

    async fn insert_user(&self, new: NewUser) -> Result<User, StoreError> {
        let row = sqlx::query_as::<_, UserRow>(
            "INSERT INTO users (name, email, password_hash) VALUES ($1, $2, $3) \
             RETURNING id, name, email, password_hash",
        )
        .bind(&new.name)
        .bind(new.email.as_str())
        .bind(&new.password_hash)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.is_unique_violation()
            {
                return StoreError::Conflict("email already exists".to_owned());
            }
            StoreError::Database(e)
        })?;

        User::try_from(row)
    }

    async fn list_products(&self) -> Result<Vec<Product>, StoreError> {
        let rows = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price, stock FROM products ORDER BY created_at",
        )
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Product::try_from).collect()
    }

    async fn product(&self, id: ProductId) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "SELECT id, name, description, price, stock FROM products WHERE id = $1",
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn insert_product(&self, new: NewProduct) -> Result<Product, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "INSERT INTO products (name, description, price, stock) VALUES ($1, $2, $3, $4) \
             RETURNING id, name, description, price, stock",
        )
        .bind(&new.name)
        .bind(&new.description)
        .bind(new.price)
        .bind(i64::from(new.stock))
        .fetch_one(&self.pool)
        .await?;

        Product::try_from(row)
    }

    async fn update_product(
        &self,
        id: ProductId,
        update: &ProductUpdate,
    ) -> Result<Option<Product>, StoreError> {
        let row = sqlx::query_as::<_, ProductRow>(
            "UPDATE products SET \
                 name = COALESCE($2, name), \
                 description = COALESCE($3, description), \
                 price = COALESCE($4, price), \
                 stock = COALESCE($5, stock) \
             WHERE id = $1 \
             RETURNING id, name, description, price, stock",
        )
        .bind(id.as_uuid())
        .bind(update.name.as_deref())
        .bind(update.description.as_deref())
        .bind(update.price)
        .bind(update.stock.map(i64::from))
        .fetch_optional(&self.pool)
        .await?;

        row.map(Product::try_from).transpose()
    }

    async fn delete_product(&self, id: ProductId) -> Result<bool, StoreError> {
        let result = sqlx::query("DELETE FROM products WHERE id = $1")
            .bind(id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn decrement_stock(&self, id: ProductId, by: u32) -> Result<bool, StoreError> {
        let result =
            sqlx::query("UPDATE products SET stock = stock - $2 WHERE id = $1 AND stock >= $2")
                .bind(id.as_uuid())
                .bind(i64::from(by))
                .execute(&self.pool)
                .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn product_in_any_cart(&self, id: ProductId) -> Result<bool, StoreError> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM cart_items WHERE product_id = $1)",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(referenced)
    }

    async fn product_in_any_order(&self, id: ProductId) -> Result<bool, StoreError> {
        let referenced = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM order_items WHERE product_id = $1)",
        )
        .bind(id.as_uuid())
        .fetch_one(&self.pool)
        .await?;

        Ok(referenced)
    }

    async fn cart(&self, user_id: UserId) -> Result<Option<Cart>, StoreError> {
        let exists =
            sqlx::query_scalar::<_, bool>("SELECT EXISTS(SELECT 1 FROM carts WHERE user_id = $1)")
                .bind(user_id.as_uuid())
                .fetch_one(&self.pool)
                .await?;

        if !exists {
            return Ok(None);
        }

        let rows = sqlx::query_as::<_, CartItemRow>(
            "SELECT product_id, quantity, price FROM cart_items \
             WHERE cart_user_id = $1 ORDER BY line_index",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        let mut lines = Vec::with_capacity(rows.len());
        for row in rows {
            lines.push(CartLine {
                product_id: ProductId::from(row.product_id),
                quantity: count_from_db(row.quantity, "quantity")?,
                price: row.price,
            });
        }

        Ok(Some(Cart {
            user_id,
            lines,
        }))
    }

    async fn put_cart(&self, cart: &Cart) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("INSERT INTO carts (user_id) VALUES ($1) ON CONFLICT (user_id) DO NOTHING")
            .bind(cart.user_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        sqlx::query("DELETE FROM cart_items WHERE cart_user_id = $1")
            .bind(cart.user_id.as_uuid())
            .execute(&mut *tx)
            .await?;

        for (position, line) in cart.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO cart_items (cart_user_id, line_index, product_id, quantity, price) \
                 VALUES ($1, $2, $3, $4, $5)",
            )
            .bind(cart.user_id.as_uuid())
            .bind(position as i64)
            .bind(line.product_id.as_uuid())
            .bind(i64::from(line.quantity))
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(())
    }

    async fn delete_cart(&self, user_id: UserId) -> Result<bool, StoreError> {
        // Line rows go with the head row via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM carts WHERE user_id = $1")
            .bind(user_id.as_uuid())
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn insert_order(&self, new: NewOrder) -> Result<Order, StoreError> {
        let mut tx = self.pool.begin().await?;

        let head = sqlx::query_as::<_, OrderRow>(
            "INSERT INTO orders (user_id, total) VALUES ($1, $2) \
             RETURNING id, user_id, total, created_at",
        )
        .bind(new.user_id.as_uuid())
        .bind(new.total)
        .fetch_one(&mut *tx)
        .await?;

        for (position, line) in new.lines.iter().enumerate() {
            sqlx::query(
                "INSERT INTO order_items (order_id, line_index, product_id, name, quantity, price) \
                 VALUES ($1, $2, $3, $4, $5, $6)",
            )
            .bind(head.id)
            .bind(position as i64)
            .bind(line.product_id.as_uuid())
            .bind(&line.name)
            .bind(i64::from(line.quantity))
            .bind(line.price)
            .execute(&mut *tx)
            .await?;
        }

        tx.commit().await?;

        Ok(Order {
            id: OrderId::from(head.id),
            user_id: new.user_id,
            lines: new.lines,
            total: head.total,
            created_at: head.created_at,
        })
    }

    async fn orders_for_user(&self, user_id: UserId) -> Result<Vec<Order>, StoreError> {
        let heads = sqlx::query_as::<_, OrderRow>(
            "SELECT id, user_id, total, created_at FROM orders \
             WHERE user_id = $1 ORDER BY created_at",
        )
        .bind(user_id.as_uuid())
        .fetch_all(&self.pool)
        .await?;

        if heads.is_empty() {
            return Ok(Vec::new());
        }

        let order_ids: Vec<Uuid> = heads.iter().map(|h| h.id).collect();
        let item_rows = sqlx::query_as::<_, OrderItemRow>(
            "SELECT order_id, product_id, name, quantity, price FROM order_items \
             WHERE order_id = ANY($1) ORDER BY line_index",
        )
        .bind(&order_ids)
        .fetch_all(&self.pool)
        .await?;

        let mut lines_by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
        for row in item_rows {
            lines_by_order
                .entry(row.order_id)
                .or_default()
                .push(OrderLine {
                    product_id: ProductId::from(row.product_id),
                    name: row.name,
                    quantity: count_from_db(row.quantity, "quantity")?,
                    price: row.price,
                });
        }

        Ok(heads
            .into_iter()
            .map(|head| Order {
                id: OrderId::from(head.id),
                user_id: UserId::from(head.user_id),
                lines: lines_by_order.remove(&head.id).unwrap_or_default(),
                total: head.total,
                created_at: head.created_at,
            })
            .collect())
    }

    async fn ping(&self) -> Result<(), StoreError> {
        sqlx::query("SELECT 1").fetch_one(&self.pool).await?;
        Ok(())
    }
}
