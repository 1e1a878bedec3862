//! Domain models and their wire-facing views.
//!
//! Records are what the storage layer persists; views are the JSON shapes
//! handlers return. Wire field names are camelCase (`userId`, `productId`,
//! `orderDate`).

pub mod cart;
pub mod order;
pub mod product;
pub mod user;

pub use cart::{Cart, CartLine, CartLineView, CartView};
pub use order::{NewOrder, Order, OrderLine, OrderView};
pub use product::{NewProduct, Product, ProductUpdate};
pub use user::{NewUser, User, UserView};
