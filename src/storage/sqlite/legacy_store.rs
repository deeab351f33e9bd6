//! SQLite LegacyStore implementation.

use async_trait::async_trait;
use sea_query::{Order, Query, SqliteQueryBuilder};
use sqlx::{Row, SqlitePool};

use crate::model::LegacyRecord;
use crate::storage::helpers::{format_timestamp, parse_timestamp};
use crate::storage::schema::CustomerOrders;
use crate::storage::{LegacyStore, Result};

/// SQLite implementation of LegacyStore.
pub struct SqliteLegacyStore {
    pool: SqlitePool,
}

impl SqliteLegacyStore {
    /// Create a new SQLite legacy store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Write a legacy row. Only fixtures and import tooling use this.
    pub async fn insert(&self, record: &LegacyRecord) -> Result<()> {
        let query = Query::insert()
            .into_table(CustomerOrders::Table)
            .columns([
                CustomerOrders::OrderId,
                CustomerOrders::CustomerName,
                CustomerOrders::CustomerEmail,
                CustomerOrders::ProductName,
                CustomerOrders::Quantity,
                CustomerOrders::OrderDate,
            ])
            .values_panic([
                record.order_id.into(),
                record.customer_name.clone().into(),
                record.customer_email.clone().into(),
                record.product_name.clone().into(),
                record.quantity.into(),
                format_timestamp(&record.order_date).into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&self.pool).await?;
        Ok(())
    }
}

#[async_trait]
impl LegacyStore for SqliteLegacyStore {
    async fn list_all(&self) -> Result<Vec<LegacyRecord>> {
        let query = Query::select()
            .columns([
                CustomerOrders::OrderId,
                CustomerOrders::CustomerName,
                CustomerOrders::CustomerEmail,
                CustomerOrders::ProductName,
                CustomerOrders::Quantity,
                CustomerOrders::OrderDate,
            ])
            .from(CustomerOrders::Table)
            .order_by(CustomerOrders::OrderId, Order::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            let order_date: String = row.get("order_date");
            records.push(LegacyRecord {
                order_id: row.get("order_id"),
                customer_name: row.get("customer_name"),
                customer_email: row.get("customer_email"),
                product_name: row.get("product_name"),
                quantity: row.get("quantity"),
                order_date: parse_timestamp(&order_date)?,
            });
        }

        Ok(records)
    }
}
