//! End-to-end tests for the cart and checkout flows.

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

// =============================================================================
// Adding to the cart
// =============================================================================

#[tokio::test]
async fn test_add_to_cart_returns_extended_price() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;
    let product_id = create_product(&app, "mate", 10, 5).await;

    let response = add_to_cart(&app, &user_id, &product_id, 2).await;
    assert_eq!(response.status, StatusCode::OK);

    let body = response.json();
    assert_eq!(body["userId"], user_id.as_str());
    let products = body["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["productId"], product_id.as_str());
    assert_eq!(products[0]["quantity"], 2);
    assert_eq!(dec(&products[0]["price"]), Decimal::from(20));
    // Mutation responses carry no product name.
    assert!(products[0].get("name").is_none());
}

#[tokio::test]
async fn test_add_to_cart_merges_and_enforces_stock() {
    // price=10 stock=5: 2 then 2 merges to 4/40; one more 2 would need 6.
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;
    let product_id = create_product(&app, "mate", 10, 5).await;

    add_to_cart(&app, &user_id, &product_id, 2).await;
    let response = add_to_cart(&app, &user_id, &product_id, 2).await;
    assert_eq!(response.status, StatusCode::OK);
    let products = response.json()["products"].clone();
    assert_eq!(products[0]["quantity"], 4);
    assert_eq!(dec(&products[0]["price"]), Decimal::from(40));

    let response = add_to_cart(&app, &user_id, &product_id, 2).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    // The rejected call changed nothing.
    let response = get(&app, &format!("/carts?userId={user_id}")).await;
    assert_eq!(response.json()["products"][0]["quantity"], 4);
}

#[tokio::test]
async fn test_add_to_cart_input_validation() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;
    let product_id = create_product(&app, "mate", 10, 5).await;

    // Unknown user.
    let response = add_to_cart(
        &app,
        "00000000-0000-0000-0000-000000000000",
        &product_id,
        1,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Malformed user id.
    let response = add_to_cart(&app, "garbage", &product_id, 1).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Unknown product.
    let response = add_to_cart(
        &app,
        &user_id,
        "00000000-0000-0000-0000-000000000000",
        1,
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Zero and negative quantities.
    let response = add_to_cart(&app, &user_id, &product_id, 0).await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    let response = post_json(
        &app,
        &format!("/carts/products?userId={user_id}"),
        json!({ "productId": product_id, "quantity": -1 }),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Missing body field.
    let response = post_json(
        &app,
        &format!("/carts/products?userId={user_id}"),
        json!({ "quantity": 1 }),
    )
    .await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Quantity above stock.
    let response = add_to_cart(&app, &user_id, &product_id, 6).await;
    assert_eq!(response.status, StatusCode::CONFLICT);
}

// =============================================================================
// Reading the cart
// =============================================================================

#[tokio::test]
async fn test_get_cart_attaches_names_and_live_prices() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;
    let product_id = create_product(&app, "mate", 10, 10).await;
    add_to_cart(&app, &user_id, &product_id, 2).await;

    // Price change after the add: the view recomputes, the line cache stays.
    put_json(
        &app,
        &format!("/products/{product_id}"),
        json!({ "price": 15 }),
    )
    .await;

    let response = get(&app, &format!("/carts?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    let products = response.json()["products"].clone();
    assert_eq!(products[0]["name"], "mate");
    assert_eq!(dec(&products[0]["price"]), Decimal::from(30));
}

#[tokio::test]
async fn test_get_cart_errors() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;

    // Missing query parameter.
    let response = get(&app, "/carts").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Unknown user.
    let response = get(&app, "/carts?userId=00000000-0000-0000-0000-000000000000").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Known user, no cart yet.
    let response = get(&app, &format!("/carts?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Removing lines and clearing
// =============================================================================

#[tokio::test]
async fn test_remove_line_keeps_cart_record() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;
    let product_id = create_product(&app, "mate", 10, 5).await;
    add_to_cart(&app, &user_id, &product_id, 2).await;

    let response = delete(
        &app,
        &format!("/carts/products?userId={user_id}&productId={product_id}"),
    )
    .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["products"].as_array().unwrap().is_empty());

    // The emptied cart record is still there, distinct from a cleared one.
    let response = get(&app, &format!("/carts?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.json()["products"].as_array().unwrap().is_empty());

    // Removing the same line again is a 404.
    let response = delete(
        &app,
        &format!("/carts/products?userId={user_id}&productId={product_id}"),
    )
    .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_clear_cart_deletes_record() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;
    let product_id = create_product(&app, "mate", 10, 5).await;
    add_to_cart(&app, &user_id, &product_id, 2).await;

    let response = delete(&app, &format!("/carts?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.json()["message"], "Cart emptied successfully");

    let response = get(&app, &format!("/carts?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Clearing again is a user-facing 404.
    let response = delete(&app, &format!("/carts?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Checkout
// =============================================================================

#[tokio::test]
async fn test_checkout_creates_order_and_drains_stock() {
    // cart {mate: qty 3} with price=10 stock=3: total 30, stock 0, cart gone.
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;
    let product_id = create_product(&app, "mate", 10, 3).await;
    add_to_cart(&app, &user_id, &product_id, 3).await;

    let response = post_empty(&app, &format!("/orders?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let order = response.json();
    assert!(order["orderId"].is_string());
    assert_eq!(order["userId"], user_id.as_str());
    assert!(order["orderDate"].is_string());
    assert_eq!(dec(&order["total"]), Decimal::from(30));
    let products = order["products"].as_array().unwrap();
    assert_eq!(products.len(), 1);
    assert_eq!(products[0]["name"], "mate");
    assert_eq!(products[0]["quantity"], 3);
    assert_eq!(dec(&products[0]["price"]), Decimal::from(30));

    // Stock drained to zero, cart deleted.
    let response = get(&app, "/products").await;
    assert_eq!(response.json()[0]["stock"], 0);
    let response = get(&app, &format!("/carts?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // The order shows up in the history.
    let response = get(&app, &format!("/orders?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    let orders = response.json();
    assert_eq!(orders.as_array().unwrap().len(), 1);
    assert_eq!(dec(&orders[0]["total"]), Decimal::from(30));
}

#[tokio::test]
async fn test_checkout_sums_lines_in_insertion_order() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;
    let mate = create_product(&app, "mate", 10, 5).await;
    let bombilla = create_product(&app, "bombilla", 3, 5).await;
    add_to_cart(&app, &user_id, &mate, 2).await;
    add_to_cart(&app, &user_id, &bombilla, 3).await;

    let response = post_empty(&app, &format!("/orders?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::CREATED);

    let order = response.json();
    assert_eq!(dec(&order["total"]), Decimal::from(29));
    let products = order["products"].as_array().unwrap();
    assert_eq!(products[0]["name"], "mate");
    assert_eq!(products[1]["name"], "bombilla");
}

#[tokio::test]
async fn test_checkout_without_cart_is_not_found() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;

    let response = post_empty(&app, &format!("/orders?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_checkout_stale_cart_conflicts_without_side_effects() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;
    let product_id = create_product(&app, "mate", 10, 5).await;
    add_to_cart(&app, &user_id, &product_id, 4).await;

    // Stock shrank underneath the cart.
    put_json(
        &app,
        &format!("/products/{product_id}"),
        json!({ "stock": 2 }),
    )
    .await;

    let response = post_empty(&app, &format!("/orders?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::CONFLICT);

    // Nothing moved: stock intact, cart intact, no order.
    let response = get(&app, "/products").await;
    assert_eq!(response.json()[0]["stock"], 2);
    let response = get(&app, &format!("/carts?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::OK);
    let response = get(&app, &format!("/orders?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

// =============================================================================
// Order history
// =============================================================================

#[tokio::test]
async fn test_orders_list_errors() {
    let app = test_app();
    let user_id = signup(&app, "Lucia", "lucia@example.com").await;

    // Missing query parameter.
    let response = get(&app, "/orders").await;
    assert_eq!(response.status, StatusCode::BAD_REQUEST);

    // Unknown user.
    let response = get(&app, "/orders?userId=00000000-0000-0000-0000-000000000000").await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);

    // Known user with no orders.
    let response = get(&app, &format!("/orders?userId={user_id}")).await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
