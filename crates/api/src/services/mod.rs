//! Business services.
//!
//! Two services carry the interesting logic: [`carts::CartService`] for
//! cart mutation and [`checkout::CheckoutService`] for converting a cart
//! into an order. Both are written against the storage port and hold no
//! state of their own; everything else in the API is plain CRUD done
//! directly by the route handlers.

pub mod carts;
pub mod checkout;

pub use carts::{CartError, CartService};
pub use checkout::{CheckoutError, CheckoutService};
