//! Comercio API library.
//!
//! This crate provides the backend functionality as a library, allowing it
//! to be tested and reused. The binary in `main.rs` wires configuration,
//! a storage adapter, and the router together.
//!
//! # Architecture
//!
//! - Axum web framework serving plain JSON
//! - A storage port ([`store::Store`]) with `PostgreSQL` and in-memory
//!   adapters
//! - Two services carrying the business logic: the cart manager and the
//!   checkout engine

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;
pub mod store;
