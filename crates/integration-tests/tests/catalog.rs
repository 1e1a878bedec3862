//! End-to-end tests for the product catalog: CRUD, partial updates, and
//! the referential deletion guard.

#![allow(clippy::unwrap_used)]

use axum::http::StatusCode;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use comercio_integration_tests::{
    add_to_cart, create_product, delete, get, post_empty, post_json, put_json, signup, test_app,
};

fn dec(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

#[tokio::test]
async fn test_create_and_list_products() {
    let app = test_app();

    let response = post_json(
        &app,
        "/products",
        json!({ "name": "mate", "description": "yerba mate", "price": 10, "stock": 5 }),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED);
    let created = response.json();
    assert_eq!(created["name"], "mate");
    assert_eq!(created["description"], "yerba mate");
    assert_eq!(dec(&created["price"]), Decimal::from(10));
    assert_eq!(created["stock"], 5);

    let response = get(&app, "/products").await;
    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_create_product_description_defaults_to_empty() {
    let app = test_app();

    let response = post_json(
        &app,
        "/products",
        json!({ "name": "bombilla", "price": 3, "stock": 7 }),
    )
    .await;

    assert_eq!(response.status, StatusCode::CREATED);
    assert_eq!(response.json()["description"], "");
}

#[tokio::test]
async fn test_create_product_validation() {
    let app = test_app();

    // Missing name field entirely.
    let response = post_json(&app, "/products", json!({ "price": 10, "stock": 5 })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Nonpositive price.
    let response = post_json(
        &app,
        "/products",
        json!({ "name": "mate", "price": 0, "stock": 5 }),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Negative stock fails deserialization.
    let response = post_json(
        &app,
        "/products",
        json!({ "name": "mate", "price": 10, "stock": -1 }),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_partial_update_touches_only_given_fields() {
    let app = test_app();
    let product_id = create_product(&app, "mate", 10, 5).await;

    let response = put_json(
        &app,
        &format!("/products/{product_id}"),
        json!({ "price": 12 }),
    )
    .await;

    assert_eq!(response.status, StatusCode::OK);
    let body = response.json();
    assert_eq!(dec(&body["price"]), Decimal::from(12));
    assert_eq!(body["name"], "mate");
    assert_eq!(body["stock"], 5);
}

#[tokio::test]
async fn test_update_requires_at_least_one_field() {
    let app = test_app();
    let product_id = create_product(&app, "mate", 10, 5).await;

    let response = put_json(&app, &format!("/products/{product_id}"), json!({})).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_update_unknown_or_malformed_id() {
    let app = test_app();

    let response = put_json(&app, "/products/not-a-uuid", json!({ "price": 12 })).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    let response = put_json(
        &app,
        "/products/00000000-0000-0000-0000-000000000000",
        json!({ "price": 12 }),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_unreferenced_product() {
    let app = test_app();
    let product_id = create_product(&app, "mate", 10, 5).await;

    let response = delete(&app, &format!("/products/{product_id}")).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = get(&app, "/products").await;
    assert!(response.json().as_array().unwrap().is_empty());

    // Gone means gone.
    let response = delete(&app, &format!("/products/{product_id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_product_referenced_by_cart_is_refused() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;
    let product_id = create_product(&app, "mate", 10, 5).await;
    add_to_cart(&app, &user_id, &product_id, 1).await;

    let response = delete(&app, &format!("/products/{product_id}")).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    // The product survived the attempt.
    let response = get(&app, "/products").await;
    assert_eq!(response.json().as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_delete_product_referenced_by_order_is_refused() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;
    let product_id = create_product(&app, "mate", 10, 5).await;
    add_to_cart(&app, &user_id, &product_id, 2).await;

    let response = post_empty(&app, &format!("/orders?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::CREATED);

    // The cart is gone, but the order still references the product.
    let response = delete(&app, &format!("/products/{product_id}")).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_delete_malformed_id_is_bad_request() {
    let app = test_app();
    let response = delete(&app, "/products/garbage").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
}
