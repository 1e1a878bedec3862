//! Product route handlers.
//!
//! Plain catalog CRUD, plus the referential guard on deletion: a product
//! stays deletable only while no cart line or order line references its id,
//! so historical records remain resolvable.

use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use rust_decimal::Decimal;
use serde::Deserialize;
use tracing::instrument;

use comercio_core::ProductId;

use crate::error::{AppError, Result};
use crate::extract::ApiJson;
use crate::models::{NewProduct, Product, ProductUpdate};
use crate::state::AppState;

/// Product creation request body.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateProductRequest {
    pub name: String,
    pub description: Option<String>,
    pub price: Decimal,
    pub stock: u32,
}

/// List all products.
#[instrument(skip(state))]
pub async fn list(State(state): State<AppState>) -> Result<Json<Vec<Product>>> {
    let products = state.store().list_products().await?;
    Ok(Json(products))
}

/// Create a product.
#[instrument(skip(state))]
pub async fn create(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<CreateProductRequest>,
) -> Result<(StatusCode, Json<Product>)> {
    if req.name.trim().is_empty() {
        return Err(AppError::BadRequest("name is required".to_owned()));
    }
    if req.price <= Decimal::ZERO {
        return Err(AppError::BadRequest("price must be positive".to_owned()));
    }

    let product = state
        .store()
        .insert_product(NewProduct {
            name: req.name,
            description: req.description.unwrap_or_default(),
            price: req.price,
            stock: req.stock,
        })
        .await?;

    Ok((StatusCode::CREATED, Json(product)))
}

/// Partially update a product.
///
/// At least one field must be present; absent fields keep their value.
#[instrument(skip(state))]
pub async fn update(
    State(state): State<AppState>,
    Path(id): Path<String>,
    ApiJson(update): ApiJson<ProductUpdate>,
) -> Result<Json<Product>> {
    let product_id = ProductId::parse(&id)?;

    if update.is_empty() {
        return Err(AppError::BadRequest(
            "need at least one field to update".to_owned(),
        ));
    }
    if let Some(price) = update.price
        && price <= Decimal::ZERO
    {
        return Err(AppError::BadRequest("price must be positive".to_owned()));
    }

    let product = state
        .store()
        .update_product(product_id, &update)
        .await?
        .ok_or_else(|| AppError::NotFound("product not found".to_owned()))?;

    Ok(Json(product))
}

/// Delete a product, unless a cart or order still references it.
#[instrument(skip(state))]
pub async fn remove(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<&'static str> {
    let product_id = ProductId::parse(&id)?;

    if state.store().product_in_any_cart(product_id).await? {
        return Err(AppError::Conflict(
            "cannot delete product: it's in carts".to_owned(),
        ));
    }
    if state.store().product_in_any_order(product_id).await? {
        return Err(AppError::Conflict(
            "cannot delete product: it's in orders".to_owned(),
        ));
    }

    if !state.store().delete_product(product_id).await? {
        return Err(AppError::NotFound("product not found".to_owned()));
    }

    Ok("Deleted")
}
