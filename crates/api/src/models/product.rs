//! Product record and partial-update struct.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use comercio_core::ProductId;

/// A catalog product.
///
/// `price` must be positive and `stock` is a non-negative count. Stock is
/// only ever decremented by checkout; price and stock are otherwise mutable
/// via [`ProductUpdate`]. Serializes directly as the wire shape.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    pub id: ProductId,
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
}

/// Data needed to create a product. The storage layer assigns the id.
#[derive(Debug, Clone)]
pub struct NewProduct {
    pub name: String,
    pub description: String,
    pub price: Decimal,
    pub stock: u32,
}

/// Partial update for a product: one optional per mutable attribute.
///
/// An update with every field absent is rejected at the boundary before it
/// reaches the storage layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductUpdate {
    pub name: Option<String>,
    pub description: Option<String>,
    pub price: Option<Decimal>,
    pub stock: Option<u32>,
}

impl ProductUpdate {
    /// True when no field is set.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.description.is_none()
            && self.price.is_none()
            && self.stock.is_none()
    }

    /// Apply the update to a product in place.
    pub fn apply_to(&self, product: &mut Product) {
        if let Some(name) = &self.name {
            product.name = name.clone();
        }
        if let Some(description) = &self.description {
            product.description = description.clone();
        }
        if let Some(price) = self.price {
            product.price = price;
        }
        if let Some(stock) = self.stock {
            product.stock = stock;
        }
    }
}
