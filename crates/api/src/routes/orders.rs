//! Order route handlers.

use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
};
use tracing::instrument;

use super::{UserQuery, require_user};
use crate::error::{AppError, Result};
use crate::models::OrderView;
use crate::services::CheckoutService;
use crate::state::AppState;

/// List the user's order history, oldest first.
#[instrument(skip(state))]
pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<Json<Vec<OrderView>>> {
    let user_id = require_user(&state, &query.user_id).await?;

    let orders = state.store().orders_for_user(user_id).await?;
    if orders.is_empty() {
        return Err(AppError::NotFound(
            "no orders found for this user".to_owned(),
        ));
    }

    Ok(Json(orders.iter().map(OrderView::from).collect()))
}

/// Check out the user's cart into a new order.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    Query(query): Query<UserQuery>,
) -> Result<(StatusCode, Json<OrderView>)> {
    let user_id = require_user(&state, &query.user_id).await?;

    let order = CheckoutService::new(state.store())
        .place_order(user_id)
        .await?;
    Ok((StatusCode::CREATED, Json(order)))
}
