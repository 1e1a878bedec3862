//! Cart route handlers.
//!
//! All cart endpoints act on behalf of the user named by the `userId`
//! query parameter, which must resolve to an existing user before the
//! cart manager is consulted.

use axum::{
    Json,
    extract::{Query, State},
};
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::instrument;

use comercio_core::ProductId;

use super::{UserQuery, require_user};
use crate::error::Result;
use crate::extract::ApiJson;
use crate::models::CartView;
use crate::services::CartService;
use crate::state::AppState;

/// Query string for removing one cart line.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineQuery {
    pub user_id: String,
    pub product_id: String,
}

/// Add-to-cart request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AddItemRequest {
    pub product_id: String,
    pub quantity: u32,
}

/// Show the user's cart with product names and live prices.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<CartView>> {
    let user_id = require_user(&state, &query.user_id).await?;

    let view = CartService::new(state.store()).get_cart(user_id).await?;
    Ok(Json(view))
}

/// Add an item to the user's cart, creating the cart if needed.
#[instrument(skip(state))]
pub async fn add_item(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
    ApiJson(req): ApiJson<AddItemRequest>,
) -> Result<Json<CartView>> {
    let user_id = require_user(&state, &query.user_id).await?;
    let product_id = ProductId::parse(&req.product_id)?;

    let view = CartService::new(state.store())
        .add_item(user_id, product_id, req.quantity)
        .await?;
    Ok(Json(view))
}

/// Remove one product's line from the user's cart.
#[instrument(skip(state))]
pub async fn remove_item(
    State(state): State<AppState>,
    Query(query): Query<LineQuery>,
) -> Result<Json<CartView>> {
    let user_id = require_user(&state, &query.user_id).await?;
    let product_id = ProductId::parse(&query.product_id)?;

    let view = CartService::new(state.store())
        .remove_item(user_id, product_id)
        .await?;
    Ok(Json(view))
}

/// Empty the user's cart, deleting the record.
#[instrument(skip(state))]
pub async fn clear(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Value>> {
    let user_id = require_user(&state, &query.user_id).await?;

    CartService::new(state.store()).clear_cart(user_id).await?;
    Ok(Json(json!({ "message": "Cart emptied successfully" })))
}
