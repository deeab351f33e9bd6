//! LegacyStore trait definition.

use async_trait::async_trait;

use super::Result;
use crate::model::LegacyRecord;

/// Read-only access to the legacy flat `customer_orders` table.
///
/// Implementations:
/// - `SqliteLegacyStore`: SQLite storage
/// - `MockOrderStore`: In-memory mock for testing
#[async_trait]
pub trait LegacyStore: Send + Sync {
    /// Full scan of the legacy table, ordered by `order_id`.
    async fn list_all(&self) -> Result<Vec<LegacyRecord>>;
}
