//! Storage layer.
//!
//! Store contracts are async traits so the services can run against SQLite
//! in production and the in-memory mock in tests:
//!
//! - [`LegacyStore`]: read-only access to the flat `customer_orders` table
//! - [`OrderStore`]: the normalized customers/products/orders/order_items
//!   relations, with writes going through an explicit [`OrderTransaction`]

mod legacy_store;
pub mod mock;
mod order_store;
#[cfg(feature = "sqlite")]
pub mod schema;
#[cfg(feature = "sqlite")]
pub mod sqlite;
pub mod upsert;
#[cfg(feature = "sqlite")]
mod helpers;

use std::sync::Arc;

#[cfg(feature = "sqlite")]
use tracing::info;

#[cfg(feature = "sqlite")]
use crate::config::StorageConfig;

pub use legacy_store::LegacyStore;
pub use mock::MockOrderStore;
pub use order_store::{OrderStore, OrderTransaction};
#[cfg(feature = "sqlite")]
pub use sqlite::{SqliteLegacyStore, SqliteOrderStore};
pub use upsert::{get_or_create, NaturalKeyed, Upserted};

/// Result type for storage operations.
pub type Result<T> = std::result::Result<T, StorageError>;

/// Errors that can occur during storage operations.
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("{entity} not found: {key}")]
    NotFound { entity: &'static str, key: String },

    #[error("{entity} already exists: {key}")]
    Conflict { entity: &'static str, key: String },

    #[error("Invalid timestamp: {0}")]
    InvalidTimestamp(String),

    #[cfg(feature = "sqlite")]
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Failure raised on purpose by the mock store.
    #[error("Injected failure: {0}")]
    Injected(String),
}

impl StorageError {
    pub fn not_found(entity: &'static str, key: impl ToString) -> Self {
        Self::NotFound {
            entity,
            key: key.to_string(),
        }
    }
}

/// Store handles shared by the services and the HTTP layer.
#[derive(Clone)]
pub struct Stores {
    pub legacy: Arc<dyn LegacyStore>,
    pub orders: Arc<dyn OrderStore>,
}

/// Open the SQLite database described by `config` and create the schema.
#[cfg(feature = "sqlite")]
pub async fn init_storage(config: &StorageConfig) -> Result<Stores> {
    use std::time::Duration;

    use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};

    info!(path = %config.path, "Storage: sqlite");

    if let Some(parent) = std::path::Path::new(&config.path).parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent).map_err(sqlx::Error::Io)?;
        }
    }

    let opts = SqliteConnectOptions::new()
        .filename(&config.path)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(Duration::from_secs(config.busy_timeout_secs))
        .foreign_keys(true)
        .create_if_missing(true);

    let mut pool_opts = SqlitePoolOptions::new().max_connections(config.max_connections);
    if config.is_in_memory() {
        // The database is dropped with its last connection.
        pool_opts = pool_opts
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    let pool = pool_opts.connect_with(opts).await?;

    let orders = SqliteOrderStore::new(pool.clone());
    orders.init().await?;

    Ok(Stores {
        legacy: Arc::new(SqliteLegacyStore::new(pool)),
        orders: Arc::new(orders),
    })
}
