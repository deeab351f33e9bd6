//! Legacy-to-normalized data migration.
//!
//! Reads the flat `customer_orders` table and writes deduplicated
//! customers and products plus one order and one order item per legacy
//! row. Order ids are carried over from the legacy rows.
//!
//! The whole run is one transaction. Customers are written before
//! products and products before orders so every foreign key resolves
//! inside the transaction, but nothing is visible to readers until the
//! final commit, and any failure leaves the normalized tables untouched.
//!
//! Re-running is safe: existing customers and products are reused, and a
//! legacy row whose order id already exists for the same customer is
//! skipped. An existing order under that id for a different customer fails
//! the run.

use std::collections::HashSet;
use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::model::{
    Customer, LegacyRecord, NewCustomer, NewOrder, NewOrderItem, NewProduct, Product,
};
use crate::storage::{get_or_create, LegacyStore, OrderStore, OrderTransaction, StorageError};

/// Result type for migration operations.
pub type Result<T> = std::result::Result<T, MigrationError>;

/// Errors that can occur during migration.
///
/// Every failure has already been rolled back when it reaches the caller.
#[derive(Debug, thiserror::Error)]
pub enum MigrationError {
    #[error("Store failure: {0}")]
    StoreFailure(#[from] StorageError),
}

/// Counts from a successful migration run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MigrationReport {
    pub records: usize,
    pub customers_created: usize,
    pub products_created: usize,
    pub orders_created: usize,
    pub orders_skipped: usize,
}

/// Migrates the legacy flat table into the normalized schema.
pub struct Normalizer {
    legacy: Arc<dyn LegacyStore>,
    orders: Arc<dyn OrderStore>,
}

impl Normalizer {
    pub fn new(legacy: Arc<dyn LegacyStore>, orders: Arc<dyn OrderStore>) -> Self {
        Self { legacy, orders }
    }

    /// Run the migration over every legacy record.
    pub async fn migrate(&self) -> Result<MigrationReport> {
        let records = self.legacy.list_all().await?;
        info!(records = records.len(), "Starting legacy migration");

        let mut tx = self.orders.begin().await?;

        let outcome = normalize(tx.as_mut(), &records).await;
        match outcome {
            Ok(report) => {
                tx.commit().await?;
                info!(
                    customers_created = report.customers_created,
                    products_created = report.products_created,
                    orders_created = report.orders_created,
                    orders_skipped = report.orders_skipped,
                    "Legacy migration committed"
                );
                Ok(report)
            }
            Err(e) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(error = %rollback_err, "Rollback after failed migration also failed");
                }
                error!(error = %e, "Legacy migration rolled back");
                Err(e.into())
            }
        }
    }
}

/// First record for each distinct key, in enumeration order.
fn first_seen_by<'a>(
    records: &'a [LegacyRecord],
    key: fn(&LegacyRecord) -> &str,
) -> Vec<&'a LegacyRecord> {
    let mut seen = HashSet::new();
    let mut firsts = Vec::new();
    for record in records {
        if seen.insert(key(record)) {
            firsts.push(record);
        }
    }
    firsts
}

async fn normalize(
    tx: &mut dyn OrderTransaction,
    records: &[LegacyRecord],
) -> std::result::Result<MigrationReport, StorageError> {
    let mut report = MigrationReport {
        records: records.len(),
        ..MigrationReport::default()
    };

    for record in first_seen_by(records, |r| r.customer_email.as_str()) {
        let draft = NewCustomer {
            name: record.customer_name.clone(),
            email: record.customer_email.clone(),
        };
        if get_or_create::<Customer>(tx, draft).await?.created {
            report.customers_created += 1;
        }
    }
    debug!(created = report.customers_created, "Customers migrated");

    for record in first_seen_by(records, |r| r.product_name.as_str()) {
        let draft = NewProduct {
            name: record.product_name.clone(),
        };
        if get_or_create::<Product>(tx, draft).await?.created {
            report.products_created += 1;
        }
    }
    debug!(created = report.products_created, "Products migrated");

    for record in records {
        let customer = tx
            .find_customer_by_email(&record.customer_email)
            .await?
            .ok_or_else(|| StorageError::not_found("customer", &record.customer_email))?;
        let product = tx
            .find_product_by_name(&record.product_name)
            .await?
            .ok_or_else(|| StorageError::not_found("product", &record.product_name))?;

        if let Some(existing) = tx.find_order_by_id(record.order_id).await? {
            // An order under this id that belongs to someone else was not
            // migrated from this record.
            if existing.customer_id != customer.id {
                return Err(StorageError::Conflict {
                    entity: "order",
                    key: record.order_id.to_string(),
                });
            }
            debug!(order_id = record.order_id, "Order already migrated, skipping");
            report.orders_skipped += 1;
            continue;
        }

        let order = tx
            .insert_order(NewOrder {
                id: Some(record.order_id),
                customer_id: customer.id,
                order_date: record.order_date,
            })
            .await?;
        tx.insert_order_item(NewOrderItem {
            order_id: order.id,
            product_id: product.id,
            quantity: record.quantity,
        })
        .await?;
        report.orders_created += 1;
    }

    Ok(report)
}
