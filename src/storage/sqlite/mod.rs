//! SQLite implementations of storage interfaces.

mod legacy_store;
mod order_store;

pub use legacy_store::SqliteLegacyStore;
pub use order_store::{SqliteOrderStore, SqliteOrderTransaction};
