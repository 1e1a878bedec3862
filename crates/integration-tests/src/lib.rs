//! Test support for driving the Comercio API in-process.
//!
//! Builds the full router over a fresh [`MemoryStore`] and sends requests
//! through `tower::ServiceExt::oneshot`, so the suites need no running
//! server or database.

#![allow(clippy::missing_panics_doc)]

use std::net::{IpAddr, Ipv4Addr};
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::Value;
use tower::ServiceExt;

use comercio_api::config::Config;
use comercio_api::routes;
use comercio_api::state::AppState;
use comercio_api::store::MemoryStore;

/// Build the API router over a fresh, empty in-memory store.
#[must_use]
pub fn test_app() -> Router {
    let config = Config {
        database_url: None,
        host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        port: 0,
        sentry_dsn: None,
        sentry_environment: None,
    };
    let state = AppState::new(config, Arc::new(MemoryStore::new()));
    routes::router().with_state(state)
}

/// A collected response: status plus the full body as text.
#[derive(Debug)]
pub struct TestResponse {
    pub status: StatusCode,
    pub body: String,
}

impl TestResponse {
    /// Parse the body as JSON.
    #[must_use]
    pub fn json(&self) -> Value {
        serde_json::from_str(&self.body)
            .unwrap_or_else(|e| panic!("expected JSON body, got {:?}: {e}", self.body))
    }
}

/// Send one request through the router and collect the response.
pub async fn request(
    app: &Router,
    method: Method,
    uri: &str,
    body: Option<Value>,
) -> TestResponse {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string())),
        None => builder.body(Body::empty()),
    }
    .expect("request should build");

    let response = app
        .clone()
        .oneshot(request)
        .await
        .expect("router is infallible");

    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body should collect");

    TestResponse {
        status,
        body: String::from_utf8(bytes.to_vec()).expect("body should be utf-8"),
    }
}

/// GET a path.
pub async fn get(app: &Router, uri: &str) -> TestResponse {
    request(app, Method::GET, uri, None).await
}

/// POST a JSON body.
pub async fn post_json(app: &Router, uri: &str, body: Value) -> TestResponse {
    request(app, Method::POST, uri, Some(body)).await
}

/// POST with no body.
pub async fn post_empty(app: &Router, uri: &str) -> TestResponse {
    request(app, Method::POST, uri, None).await
}

/// PUT a JSON body.
pub async fn put_json(app: &Router, uri: &str, body: Value) -> TestResponse {
    request(app, Method::PUT, uri, Some(body)).await
}

/// DELETE a path.
pub async fn delete(app: &Router, uri: &str) -> TestResponse {
    request(app, Method::DELETE, uri, None).await
}

// =============================================================================
// Seeding helpers
// =============================================================================

/// Sign up a user and return their id.
pub async fn signup(app: &Router, name: &str, email: &str) -> String {
    let response = post_json(
        app,
        "/users",
        serde_json::json!({ "name": name, "email": email, "password": "correct-horse" }),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.json()["id"]
        .as_str()
        .expect("user id should be a string")
        .to_owned()
}

/// Create a product and return its id.
pub async fn create_product(app: &Router, name: &str, price: u32, stock: u32) -> String {
    let response = post_json(
        app,
        "/products",
        serde_json::json!({ "name": name, "price": price, "stock": stock }),
    )
    .await;
    assert_eq!(response.status, StatusCode::CREATED, "{}", response.body);
    response.json()["id"]
        .as_str()
        .expect("product id should be a string")
        .to_owned()
}

/// Add `quantity` of a product to a user's cart.
pub async fn add_to_cart(
    app: &Router,
    user_id: &str,
    product_id: &str,
    quantity: u32,
) -> TestResponse {
    post_json(
        app,
        &format!("/carts/products?userId={user_id}"),
        serde_json::json!({ "productId": product_id, "quantity": quantity }),
    )
    .await
}
