//! Mock LegacyStore implementation for testing.

use async_trait::async_trait;

use super::MockOrderStore;
use crate::model::LegacyRecord;
use crate::storage::{LegacyStore, Result, StorageError};

#[async_trait]
impl LegacyStore for MockOrderStore {
    async fn list_all(&self) -> Result<Vec<LegacyRecord>> {
        if self.failures.read().await.fail_on_list_legacy {
            return Err(StorageError::Injected("list legacy records".to_string()));
        }
        let mut records = self.legacy.read().await.clone();
        records.sort_by_key(|r| r.order_id);
        Ok(records)
    }
}
