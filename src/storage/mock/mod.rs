//! Mock storage implementations for testing.
//!
//! `MockOrderStore` keeps every table in memory and implements both
//! [`LegacyStore`](super::LegacyStore) and [`OrderStore`](super::OrderStore).
//! A transaction works on a private copy of the tables and publishes it on
//! commit, so rollback and drop-without-commit leave the store untouched.

mod legacy_store;
mod order_store;

use std::collections::BTreeMap;
use std::sync::Arc;

use tokio::sync::RwLock;

use crate::model::{Customer, LegacyRecord, Order, OrderItem, Product, RowId};

pub use order_store::MockOrderTransaction;

/// Normalized tables plus id counters.
#[derive(Debug, Clone, Default)]
struct Tables {
    customers: BTreeMap<RowId, Customer>,
    products: BTreeMap<RowId, Product>,
    orders: BTreeMap<RowId, Order>,
    items: BTreeMap<RowId, OrderItem>,
    last_customer_id: RowId,
    last_product_id: RowId,
    last_item_id: RowId,
}

/// Failure switches copied into each transaction at `begin`.
#[derive(Debug, Clone, Copy, Default)]
struct Failures {
    fail_on_list_legacy: bool,
    fail_on_begin: bool,
    fail_on_commit: bool,
    /// Number of orders a transaction may insert before inserts start failing.
    order_insert_budget: Option<usize>,
}

/// In-memory store for tests.
#[derive(Default)]
pub struct MockOrderStore {
    tables: Arc<RwLock<Tables>>,
    legacy: RwLock<Vec<LegacyRecord>>,
    failures: RwLock<Failures>,
}

impl MockOrderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store whose legacy table holds `records`.
    pub fn with_legacy(records: Vec<LegacyRecord>) -> Self {
        Self {
            legacy: RwLock::new(records),
            ..Self::default()
        }
    }

    pub async fn add_legacy_record(&self, record: LegacyRecord) {
        self.legacy.write().await.push(record);
    }

    pub async fn set_fail_on_list_legacy(&self, fail: bool) {
        self.failures.write().await.fail_on_list_legacy = fail;
    }

    pub async fn set_fail_on_begin(&self, fail: bool) {
        self.failures.write().await.fail_on_begin = fail;
    }

    pub async fn set_fail_on_commit(&self, fail: bool) {
        self.failures.write().await.fail_on_commit = fail;
    }

    /// Let each transaction insert `count` orders, then fail the next one.
    pub async fn fail_order_inserts_after(&self, count: usize) {
        self.failures.write().await.order_insert_budget = Some(count);
    }

    pub async fn clear_failures(&self) {
        *self.failures.write().await = Failures::default();
    }

    pub async fn customers(&self) -> Vec<Customer> {
        self.tables.read().await.customers.values().cloned().collect()
    }

    pub async fn products(&self) -> Vec<Product> {
        self.tables.read().await.products.values().cloned().collect()
    }

    pub async fn orders(&self) -> Vec<Order> {
        self.tables.read().await.orders.values().cloned().collect()
    }

    pub async fn order_items(&self) -> Vec<OrderItem> {
        self.tables.read().await.items.values().cloned().collect()
    }
}

#[cfg(test)]
mod tests;
