//! Order record and view.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use comercio_core::{OrderId, ProductId, UserId};

/// A placed order.
///
/// An immutable snapshot created exactly once per checkout: the line prices
/// and product names are captured at checkout time and never change, even
/// if the catalog does.
#[derive(Debug, Clone)]
pub struct Order {
    pub id: OrderId,
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
    pub created_at: DateTime<Utc>,
}

/// One order entry: product reference, snapshot name, quantity, and the
/// extended price charged for the line.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
    pub product_id: ProductId,
    pub name: String,
    pub quantity: u32,
    pub price: Decimal,
}

/// Data needed to persist an order. The storage layer assigns the id and
/// the creation timestamp.
#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: UserId,
    pub lines: Vec<OrderLine>,
    pub total: Decimal,
}

/// JSON shape of an order.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderView {
    pub order_id: OrderId,
    pub user_id: UserId,
    pub products: Vec<OrderLine>,
    pub total: Decimal,
    pub order_date: DateTime<Utc>,
}

impl From<&Order> for OrderView {
    fn from(order: &Order) -> Self {
        Self {
            order_id: order.id,
            user_id: order.user_id,
            products: order.lines.clone(),
            total: order.total,
            order_date: order.created_at,
        }
    }
}
