//! HTTP route handlers for the API.
//!
//! # Route Structure
//!
//! ```text
//! GET    /users                  - List users
//! POST   /users                  - Sign up
//!
//! GET    /products               - List products
//! POST   /products               - Create product
//! PUT    /products/{id}          - Partially update a product
//! DELETE /products/{id}          - Delete a product (refused while referenced)
//!
//! GET    /carts?userId=          - Cart with names and live prices
//! DELETE /carts?userId=          - Empty the cart (deletes the record)
//! POST   /carts/products?userId= - Add an item (merges existing lines)
//! DELETE /carts/products?userId=&productId= - Remove one line
//!
//! GET    /orders?userId=         - Order history
//! POST   /orders?userId=         - Checkout the cart into an order
//! ```
//!
//! Handlers stay thin: they resolve ids, check the user exists, and call
//! the cart manager / checkout engine or the store directly for plain CRUD.

pub mod carts;
pub mod orders;
pub mod products;
pub mod users;

use axum::{
    Router,
    routing::{get, post, put},
};
use serde::Deserialize;

use comercio_core::UserId;

use crate::error::{AppError, Result};
use crate::state::AppState;

/// Create the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/users", get(users::list).post(users::create))
        .route("/products", get(products::list).post(products::create))
        .route(
            "/products/{id}",
            put(products::update).delete(products::remove),
        )
        .route("/carts", get(carts::show).delete(carts::clear))
        .route(
            "/carts/products",
            post(carts::add_item).delete(carts::remove_item),
        )
        .route("/orders", get(orders::list).post(orders::create))
}

/// Query string carrying the acting user's id.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_id: String,
}

/// Resolve a raw user-id string and verify the user exists.
///
/// Malformed ids are 400; unknown users are 404.
pub(crate) async fn require_user(state: &AppState, raw_id: &str) -> Result<UserId> {
    let user_id = UserId::parse(raw_id)?;
    if state.store().user(user_id).await?.is_none() {
        return Err(AppError::NotFound("user not found".to_owned()));
    }
    Ok(user_id)
}
