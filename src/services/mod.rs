//! Order management services.

pub mod normalizer;
pub mod orders;

pub use normalizer::{MigrationError, MigrationReport, Normalizer};
pub use orders::{CreateOrderRequest, OrderService, OrderServiceError};
