//! SQLite OrderStore implementation.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_query::{Alias, Expr, Func, Order as SortOrder, Query, SimpleExpr, SqliteQueryBuilder};
use sqlx::sqlite::SqliteRow;
use sqlx::{Row, Sqlite, SqlitePool, Transaction};
use tracing::debug;

use crate::model::{
    Customer, NewCustomer, NewOrder, NewOrderItem, NewProduct, Order, OrderDetails, OrderItem,
    OrderItemDetails, Product, RowId,
};
use crate::storage::helpers::{format_timestamp, parse_timestamp};
use crate::storage::schema::{
    CustomerOrders, Customers, OrderItems, Orders, Products, CREATE_TABLES,
};
use crate::storage::{OrderStore, OrderTransaction, Result};

/// SQLite implementation of OrderStore.
pub struct SqliteOrderStore {
    pool: SqlitePool,
}

impl SqliteOrderStore {
    /// Create a new SQLite order store.
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Initialize the database schema.
    pub async fn init(&self) -> Result<()> {
        for statement in CREATE_TABLES {
            sqlx::query(*statement).execute(&self.pool).await?;
        }
        Ok(())
    }

    /// Orders joined with customer and items, newest first, optionally
    /// narrowed by `filter`.
    async fn select_orders(&self, filter: Option<SimpleExpr>) -> Result<Vec<OrderDetails>> {
        let mut select = Query::select();
        select
            .expr_as(Expr::col((Orders::Table, Orders::Id)), Alias::new("order_id"))
            .column((Orders::Table, Orders::OrderDate))
            .expr_as(
                Expr::col((Customers::Table, Customers::Name)),
                Alias::new("customer_name"),
            )
            .expr_as(
                Expr::col((Customers::Table, Customers::Email)),
                Alias::new("customer_email"),
            )
            .from(Orders::Table)
            .inner_join(
                Customers::Table,
                Expr::col((Customers::Table, Customers::Id))
                    .equals((Orders::Table, Orders::CustomerId)),
            )
            .order_by((Orders::Table, Orders::OrderDate), SortOrder::Desc)
            .order_by((Orders::Table, Orders::Id), SortOrder::Asc);

        if let Some(filter) = filter {
            select.and_where(filter);
        }

        let query = select.to_string(SqliteQueryBuilder);
        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;

        let order_ids: Vec<RowId> = rows.iter().map(|row| row.get("order_id")).collect();
        let mut items = self.load_items(&order_ids).await?;

        let mut orders = Vec::with_capacity(rows.len());
        for row in rows {
            let order_id: RowId = row.get("order_id");
            let order_date: String = row.get("order_date");
            orders.push(OrderDetails {
                order_id,
                customer_name: row.get("customer_name"),
                customer_email: row.get("customer_email"),
                order_date: parse_timestamp(&order_date)?,
                items: items.remove(&order_id).unwrap_or_default(),
            });
        }

        Ok(orders)
    }

    async fn load_items(
        &self,
        order_ids: &[RowId],
    ) -> Result<HashMap<RowId, Vec<OrderItemDetails>>> {
        let mut items: HashMap<RowId, Vec<OrderItemDetails>> = HashMap::new();
        if order_ids.is_empty() {
            return Ok(items);
        }

        let query = Query::select()
            .column((OrderItems::Table, OrderItems::OrderId))
            .column((OrderItems::Table, OrderItems::Quantity))
            .expr_as(
                Expr::col((Products::Table, Products::Name)),
                Alias::new("product_name"),
            )
            .from(OrderItems::Table)
            .inner_join(
                Products::Table,
                Expr::col((Products::Table, Products::Id))
                    .equals((OrderItems::Table, OrderItems::ProductId)),
            )
            .and_where(
                Expr::col((OrderItems::Table, OrderItems::OrderId))
                    .is_in(order_ids.iter().copied()),
            )
            .order_by((OrderItems::Table, OrderItems::Id), SortOrder::Asc)
            .to_string(SqliteQueryBuilder);

        let rows = sqlx::query(&query).fetch_all(&self.pool).await?;
        for row in rows {
            let order_id: RowId = row.get("order_id");
            items.entry(order_id).or_default().push(OrderItemDetails {
                product_name: row.get("product_name"),
                quantity: row.get("quantity"),
            });
        }

        Ok(items)
    }
}

#[async_trait]
impl OrderStore for SqliteOrderStore {
    async fn begin(&self) -> Result<Box<dyn OrderTransaction>> {
        let tx = self.pool.begin().await?;
        Ok(Box::new(SqliteOrderTransaction { tx }))
    }

    async fn list_orders(&self, customer_email: Option<&str>) -> Result<Vec<OrderDetails>> {
        let filter =
            customer_email.map(|email| Expr::col((Customers::Table, Customers::Email)).eq(email));
        self.select_orders(filter).await
    }

    async fn get_order(&self, id: RowId) -> Result<Option<OrderDetails>> {
        let mut orders = self
            .select_orders(Some(Expr::col((Orders::Table, Orders::Id)).eq(id)))
            .await?;
        Ok(orders.pop())
    }

    async fn delete_order(&self, id: RowId) -> Result<bool> {
        let mut tx = self.pool.begin().await?;

        let delete_items = Query::delete()
            .from_table(OrderItems::Table)
            .and_where(Expr::col(OrderItems::OrderId).eq(id))
            .to_string(SqliteQueryBuilder);
        let items_removed = sqlx::query(&delete_items)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        let delete_order = Query::delete()
            .from_table(Orders::Table)
            .and_where(Expr::col(Orders::Id).eq(id))
            .to_string(SqliteQueryBuilder);
        let orders_removed = sqlx::query(&delete_order)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        tx.commit().await?;

        debug!(order_id = id, items_removed, "delete order");
        Ok(orders_removed > 0)
    }
}

/// Open SQLite transaction.
///
/// Wraps `sqlx::Transaction`, which rolls back when dropped uncommitted.
pub struct SqliteOrderTransaction {
    tx: Transaction<'static, Sqlite>,
}

impl SqliteOrderTransaction {
    /// One past the largest id in `orders` and in the legacy table, so a
    /// generated id never takes a legacy order id that is not migrated yet.
    async fn next_order_id(&mut self) -> Result<RowId> {
        let max_order = Query::select()
            .expr(Func::max(Expr::col(Orders::Id)))
            .from(Orders::Table)
            .to_string(SqliteQueryBuilder);
        let max_legacy = Query::select()
            .expr(Func::max(Expr::col(CustomerOrders::OrderId)))
            .from(CustomerOrders::Table)
            .to_string(SqliteQueryBuilder);

        let mut max: RowId = 0;
        for query in [max_order, max_legacy] {
            let row = sqlx::query(&query).fetch_one(&mut *self.tx).await?;
            let value: Option<RowId> = row.get(0usize);
            max = max.max(value.unwrap_or(0));
        }
        Ok(max + 1)
    }
}

fn customer_from_row(row: &SqliteRow) -> Customer {
    Customer {
        id: row.get("id"),
        name: row.get("name"),
        email: row.get("email"),
    }
}

fn product_from_row(row: &SqliteRow) -> Product {
    Product {
        id: row.get("id"),
        name: row.get("name"),
    }
}

#[async_trait]
impl OrderTransaction for SqliteOrderTransaction {
    async fn find_customer_by_email(&mut self, email: &str) -> Result<Option<Customer>> {
        let query = Query::select()
            .columns([Customers::Id, Customers::Name, Customers::Email])
            .from(Customers::Table)
            .and_where(Expr::col(Customers::Email).eq(email))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *self.tx).await?;
        Ok(row.as_ref().map(customer_from_row))
    }

    async fn insert_customer(&mut self, customer: NewCustomer) -> Result<Customer> {
        let query = Query::insert()
            .into_table(Customers::Table)
            .columns([Customers::Name, Customers::Email])
            .values_panic([customer.name.clone().into(), customer.email.clone().into()])
            .to_string(SqliteQueryBuilder);

        let id = sqlx::query(&query)
            .execute(&mut *self.tx)
            .await?
            .last_insert_rowid();

        Ok(Customer {
            id,
            name: customer.name,
            email: customer.email,
        })
    }

    async fn find_product_by_name(&mut self, name: &str) -> Result<Option<Product>> {
        let query = Query::select()
            .columns([Products::Id, Products::Name])
            .from(Products::Table)
            .and_where(Expr::col(Products::Name).eq(name))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *self.tx).await?;
        Ok(row.as_ref().map(product_from_row))
    }

    async fn insert_product(&mut self, product: NewProduct) -> Result<Product> {
        let query = Query::insert()
            .into_table(Products::Table)
            .columns([Products::Name])
            .values_panic([product.name.clone().into()])
            .to_string(SqliteQueryBuilder);

        let id = sqlx::query(&query)
            .execute(&mut *self.tx)
            .await?
            .last_insert_rowid();

        Ok(Product {
            id,
            name: product.name,
        })
    }

    async fn find_order_by_id(&mut self, id: RowId) -> Result<Option<Order>> {
        let query = Query::select()
            .columns([Orders::Id, Orders::CustomerId, Orders::OrderDate])
            .from(Orders::Table)
            .and_where(Expr::col(Orders::Id).eq(id))
            .to_string(SqliteQueryBuilder);

        let row = sqlx::query(&query).fetch_optional(&mut *self.tx).await?;
        match row {
            Some(row) => {
                let order_date: String = row.get("order_date");
                Ok(Some(Order {
                    id: row.get("id"),
                    customer_id: row.get("customer_id"),
                    order_date: parse_timestamp(&order_date)?,
                }))
            }
            None => Ok(None),
        }
    }

    async fn insert_order(&mut self, order: NewOrder) -> Result<Order> {
        let id = match order.id {
            Some(id) => id,
            None => self.next_order_id().await?,
        };

        let query = Query::insert()
            .into_table(Orders::Table)
            .columns([Orders::Id, Orders::CustomerId, Orders::OrderDate])
            .values_panic([
                id.into(),
                order.customer_id.into(),
                format_timestamp(&order.order_date).into(),
            ])
            .to_string(SqliteQueryBuilder);

        sqlx::query(&query).execute(&mut *self.tx).await?;

        Ok(Order {
            id,
            customer_id: order.customer_id,
            order_date: order.order_date,
        })
    }

    async fn insert_order_item(&mut self, item: NewOrderItem) -> Result<OrderItem> {
        let query = Query::insert()
            .into_table(OrderItems::Table)
            .columns([OrderItems::OrderId, OrderItems::ProductId, OrderItems::Quantity])
            .values_panic([
                item.order_id.into(),
                item.product_id.into(),
                item.quantity.into(),
            ])
            .to_string(SqliteQueryBuilder);

        let id = sqlx::query(&query)
            .execute(&mut *self.tx)
            .await?
            .last_insert_rowid();

        Ok(OrderItem {
            id,
            order_id: item.order_id,
            product_id: item.product_id,
            quantity: item.quantity,
        })
    }

    async fn commit(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.tx.commit().await?;
        Ok(())
    }

    async fn rollback(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.tx.rollback().await?;
        Ok(())
    }
}
