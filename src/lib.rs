//! Order management service.
//!
//! Normalizes a legacy flat `customer_orders` table into customers,
//! products, orders and order items, and serves the normalized data over
//! an HTTP API.

pub mod config;
pub mod handlers;
pub mod model;
pub mod services;
pub mod storage;
pub mod utils;
