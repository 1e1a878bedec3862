//! Shopping cart record and views.

use rust_decimal::Decimal;
use serde::Serialize;

use comercio_core::{ProductId, UserId};

/// A user's shopping cart.
///
/// Keyed by the owning user id; each user has at most one cart. Lines keep
/// their insertion order. The cart record is ephemeral: deleted when emptied
/// via the cart-clearing endpoint or converted to an order.
#[derive(Debug, Clone)]
pub struct Cart {
    pub user_id: UserId,
    pub lines: Vec<CartLine>,
}

/// One cart entry.
///
/// `price` is the *extended* price: unit price × quantity as observed at the
/// most recent mutation of this line. It is a denormalized cache; later
/// product price changes do not rewrite it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub product_id: ProductId,
    pub quantity: u32,
    pub price: Decimal,
}

impl Cart {
    /// An empty cart for the given user.
    #[must_use]
    pub const fn empty(user_id: UserId) -> Self {
        Self {
            user_id,
            lines: Vec::new(),
        }
    }

    /// True when the cart holds no lines.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    /// Mutable access to the line for a product, if present.
    pub fn line_mut(&mut self, product_id: ProductId) -> Option<&mut CartLine> {
        self.lines.iter_mut().find(|l| l.product_id == product_id)
    }
}

/// JSON shape of a cart.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartView {
    pub user_id: UserId,
    pub products: Vec<CartLineView>,
}

/// JSON shape of one cart line.
///
/// `name` is only attached by the cart-detail endpoint, which re-fetches
/// each product; mutation responses return the stored line as-is.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CartLineView {
    pub product_id: ProductId,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    pub quantity: u32,
    pub price: Decimal,
}

impl From<&Cart> for CartView {
    fn from(cart: &Cart) -> Self {
        Self {
            user_id: cart.user_id,
            products: cart
                .lines
                .iter()
                .map(|line| CartLineView {
                    product_id: line.product_id,
                    name: None,
                    quantity: line.quantity,
                    price: line.price,
                })
                .collect(),
        }
    }
}
